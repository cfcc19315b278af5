//! CSV and XLSX rendering of record sets for download.

pub mod csv;
pub mod xlsx;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::{
    error::AppError,
    model::{
        company_income::CompanyIncomeRecord,
        expense::ExpenseEntry,
        studio_expense::{PersonalExpense, StudioExpense},
        timesheet::TimesheetEntry,
        vendor_bill::VendorBill,
    },
    utils::date_range::DateRange,
};

/// One typed spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// Money and hours; two decimals in CSV.
    Number(f64),
    Integer(u64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(Cell::Empty, Cell::text)
    }

    pub fn opt_number(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }

    fn time(value: Option<NaiveTime>) -> Self {
        value.map_or(Cell::Empty, |t| Cell::Text(t.format("%H:%M").to_string()))
    }

    fn datetime(value: Option<NaiveDateTime>) -> Self {
        value.map_or(Cell::Empty, |t| Cell::Text(t.format("%Y-%m-%d %H:%M").to_string()))
    }

    /// Text form used by the CSV writer.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format!("{:.2}", n),
            Cell::Integer(i) => i.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// A record type that can be written as one row of a sheet.
pub trait Exportable {
    const SHEET: &'static str;

    fn headers() -> &'static [&'static str];

    fn cells(&self) -> Vec<Cell>;
}

/// One titled group of rows; a CSV block or an XLSX worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: &'static str,
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<Cell>>,
}

impl Section {
    pub fn of<T: Exportable>(records: &[T]) -> Self {
        Self {
            title: T::SHEET,
            headers: T::headers(),
            rows: records.iter().map(Exportable::cells).collect(),
        }
    }
}

impl Exportable for TimesheetEntry {
    const SHEET: &'static str = "Timesheets";

    fn headers() -> &'static [&'static str] {
        &[
            "ID",
            "Employee ID",
            "Date",
            "Work Type",
            "Job Description",
            "Hours",
            "Hourly Rate",
            "Job Count",
            "Job Rate",
            "Start",
            "End",
            "Total Salary",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.id),
            Cell::Integer(self.user_id),
            Cell::Date(self.date),
            Cell::text(self.work_type.as_ref()),
            Cell::text(&self.job_description),
            Cell::opt_number(self.hours),
            Cell::opt_number(self.hourly_rate),
            self.job_count.map_or(Cell::Empty, |c| Cell::Integer(u64::from(c))),
            Cell::opt_number(self.job_rate),
            Cell::time(self.start_time),
            Cell::time(self.end_time),
            Cell::Number(self.salary()),
        ]
    }
}

impl Exportable for ExpenseEntry {
    const SHEET: &'static str = "Expenses";

    fn headers() -> &'static [&'static str] {
        &["ID", "Employee ID", "Date", "Description", "Amount", "Receipt"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.id),
            Cell::Integer(self.user_id),
            Cell::Date(self.date),
            Cell::text(&self.description),
            Cell::Number(self.amount),
            Cell::opt_text(self.receipt_path.as_deref()),
        ]
    }
}

impl Exportable for CompanyIncomeRecord {
    const SHEET: &'static str = "Company Income";

    fn headers() -> &'static [&'static str] {
        &[
            "ID",
            "Brand",
            "Client",
            "Amount",
            "Payment Type",
            "Payment Method",
            "Date",
            "Job Status",
            "Completed On",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.id),
            Cell::text(&self.company_name),
            Cell::opt_text(self.client.as_deref()),
            Cell::Number(self.amount),
            Cell::text(self.payment_type.as_ref()),
            Cell::text(&self.payment_method),
            Cell::Date(self.date),
            Cell::text(self.job_status.as_ref()),
            self.job_completion_date.map_or(Cell::Empty, Cell::Date),
        ]
    }
}

impl Exportable for StudioExpense {
    const SHEET: &'static str = "Studio Expenses";

    fn headers() -> &'static [&'static str] {
        &["ID", "Date", "Merchant", "Details", "Method", "Amount"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.id),
            Cell::Date(self.date),
            Cell::text(&self.merchant),
            Cell::opt_text(self.details.as_deref()),
            Cell::text(&self.method),
            Cell::Number(self.amount),
        ]
    }
}

impl Exportable for PersonalExpense {
    const SHEET: &'static str = "Personal Expenses";

    fn headers() -> &'static [&'static str] {
        &["ID", "Date", "Merchant", "Details", "Method", "Paid By", "Amount"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.id),
            Cell::Date(self.date),
            Cell::text(&self.merchant),
            Cell::opt_text(self.details.as_deref()),
            Cell::text(&self.method),
            Cell::opt_text(self.paid_by.as_deref()),
            Cell::Number(self.amount),
        ]
    }
}

impl Exportable for VendorBill {
    const SHEET: &'static str = "Vendor Bills";

    fn headers() -> &'static [&'static str] {
        &["ID", "Vendor ID", "Due Date", "Status", "Amount", "Paid At"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.id),
            Cell::Integer(self.vendor_id),
            Cell::Date(self.due_date),
            Cell::text(self.status.as_ref()),
            Cell::Number(self.amount),
            Cell::datetime(self.paid_at),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn render(self, sections: &[Section]) -> Result<Vec<u8>, AppError> {
        match self {
            ExportFormat::Csv => Ok(csv::to_csv(sections)?.into_bytes()),
            ExportFormat::Xlsx => xlsx::to_xlsx(sections),
        }
    }
}

/// What a download covers. `All` mixes every record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema, Display, EnumString, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ExportEntity {
    Timesheets,
    Expenses,
    Income,
    StudioExpenses,
    PersonalExpenses,
    VendorBills,
    All,
}

impl ExportEntity {
    /// Only timesheets and expenses may be exported by non-admins.
    pub fn staff_visible(self) -> bool {
        matches!(self, ExportEntity::Timesheets | ExportEntity::Expenses)
    }
}

/// `<entity>-<YYYY-MM>.<ext>`
pub fn export_filename(entity: ExportEntity, range: &DateRange, format: ExportFormat) -> String {
    format!("{}-{}.{}", entity, range.month_token(), format)
}
