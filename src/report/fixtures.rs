//! In-memory record source and row builders for report tests.

use chrono::NaiveDate;

use crate::{
    error::AppError,
    model::{
        company_income::{CompanyIncomeRecord, JobStatus, PaymentType},
        expense::ExpenseEntry,
        studio_expense::{PersonalExpense, StudioExpense},
        timesheet::{TimesheetEntry, WorkType},
        vendor_bill::{BillStatus, VendorBill},
    },
    repo::RecordSource,
    utils::date_range::DateRange,
};

fn on(month: &str, day: u32) -> NaiveDate {
    NaiveDate::parse_from_str(&format!("{month}-{day:02}"), "%Y-%m-%d").unwrap()
}

pub fn hourly(month: &str, day: u32, user_id: u64, hours: f64, rate: f64) -> TimesheetEntry {
    TimesheetEntry {
        id: 0,
        user_id,
        date: on(month, day),
        work_type: WorkType::Hourly,
        job_description: "Studio session".into(),
        hours: Some(hours),
        hourly_rate: Some(rate),
        job_count: None,
        job_rate: None,
        start_time: None,
        end_time: None,
        total_salary: hours * rate,
    }
}

pub fn expense(month: &str, day: u32, user_id: u64, amount: f64) -> ExpenseEntry {
    ExpenseEntry {
        id: 0,
        user_id,
        date: on(month, day),
        description: "Parking".into(),
        amount,
        receipt_path: None,
    }
}

pub fn income(month: &str, day: u32, brand: &str, method: &str, amount: f64) -> CompanyIncomeRecord {
    CompanyIncomeRecord {
        id: 0,
        company_name: brand.into(),
        client: Some("Harbor Cafe".into()),
        amount,
        payment_type: PaymentType::Full,
        payment_method: method.into(),
        date: on(month, day),
        job_status: JobStatus::Completed,
        job_completion_date: None,
        payment_slip_path: None,
        created_by: 1,
    }
}

pub fn studio(month: &str, day: u32, method: &str, amount: f64) -> StudioExpense {
    StudioExpense {
        id: 0,
        merchant: "Camera Warehouse".into(),
        details: None,
        amount,
        method: method.into(),
        date: on(month, day),
        created_by: 1,
    }
}

pub fn personal(month: &str, day: u32, amount: f64) -> PersonalExpense {
    PersonalExpense {
        id: 0,
        merchant: "Hardware store".into(),
        details: None,
        amount,
        method: "cash".into(),
        date: on(month, day),
        created_by: 1,
        paid_by: Some("Sam".into()),
    }
}

pub fn bill(month: &str, day: u32, vendor_id: u64, amount: f64, status: BillStatus) -> VendorBill {
    VendorBill {
        id: 0,
        vendor_id,
        amount,
        due_date: on(month, day),
        status,
        invoice_path: None,
        created_by: 1,
        paid_by: None,
        paid_at: None,
    }
}

/// Filters in memory the way the database would. Months listed in `failing`
/// make the income fetch error out.
#[derive(Default)]
pub struct FakeSource {
    pub timesheets: Vec<TimesheetEntry>,
    pub expenses: Vec<ExpenseEntry>,
    pub income: Vec<CompanyIncomeRecord>,
    pub studio: Vec<StudioExpense>,
    pub personal: Vec<PersonalExpense>,
    pub bills: Vec<VendorBill>,
    pub failing: Vec<String>,
}

impl RecordSource for FakeSource {
    async fn timesheets(
        &self,
        range: &DateRange,
        user_id: Option<u64>,
    ) -> Result<Vec<TimesheetEntry>, AppError> {
        Ok(self
            .timesheets
            .iter()
            .filter(|t| range.contains(t.date) && user_id.is_none_or(|u| u == t.user_id))
            .cloned()
            .collect())
    }

    async fn expenses(
        &self,
        range: &DateRange,
        user_id: Option<u64>,
    ) -> Result<Vec<ExpenseEntry>, AppError> {
        Ok(self
            .expenses
            .iter()
            .filter(|e| range.contains(e.date) && user_id.is_none_or(|u| u == e.user_id))
            .cloned()
            .collect())
    }

    async fn company_income(
        &self,
        range: &DateRange,
        brand: Option<&str>,
    ) -> Result<Vec<CompanyIncomeRecord>, AppError> {
        if self.failing.contains(&range.month_token()) {
            return Err(AppError::Backend(sqlx::Error::PoolTimedOut));
        }
        Ok(self
            .income
            .iter()
            .filter(|r| range.contains(r.date) && brand.is_none_or(|b| b == r.company_name))
            .cloned()
            .collect())
    }

    async fn studio_expenses(&self, range: &DateRange) -> Result<Vec<StudioExpense>, AppError> {
        Ok(self.studio.iter().filter(|s| range.contains(s.date)).cloned().collect())
    }

    async fn personal_expenses(
        &self,
        range: &DateRange,
    ) -> Result<Vec<PersonalExpense>, AppError> {
        Ok(self.personal.iter().filter(|p| range.contains(p.date)).cloned().collect())
    }

    async fn vendor_bills(
        &self,
        range: &DateRange,
        status: Option<BillStatus>,
    ) -> Result<Vec<VendorBill>, AppError> {
        Ok(self
            .bills
            .iter()
            .filter(|b| range.contains(b.due_date) && status.is_none_or(|s| s == b.status))
            .cloned()
            .collect())
    }
}
