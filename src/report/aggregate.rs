use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{
    company_income::CompanyIncomeRecord,
    expense::ExpenseEntry,
    studio_expense::{PersonalExpense, StudioExpense},
    timesheet::TimesheetEntry,
    vendor_bill::{BillStatus, VendorBill},
};

/// Sums `value` over `rows`; `None` counts as zero.
pub fn sum_by<T>(rows: &[T], value: impl Fn(&T) -> Option<f64>) -> f64 {
    rows.iter().filter_map(&value).sum()
}

/// Running totals per key. Keys come from the data, so a group with no rows
/// is absent rather than present with zero.
pub fn group_by<T, K: Ord>(
    rows: &[T],
    key: impl Fn(&T) -> K,
    value: impl Fn(&T) -> Option<f64>,
) -> BTreeMap<K, f64> {
    let mut groups = BTreeMap::new();
    for row in rows {
        *groups.entry(key(row)).or_insert(0.0) += value(row).unwrap_or(0.0);
    }
    groups
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct TimesheetTotals {
    pub entries: usize,
    pub total_hours: f64,
    pub total_jobs: f64,
    pub total_salary: f64,
    #[schema(value_type = Object)]
    pub salary_by_employee: BTreeMap<u64, f64>,
    #[schema(value_type = Object)]
    pub hours_by_employee: BTreeMap<u64, f64>,
}

impl TimesheetTotals {
    pub fn from_rows(rows: &[TimesheetEntry]) -> Self {
        Self {
            entries: rows.len(),
            total_hours: sum_by(rows, |t| t.hours),
            total_jobs: sum_by(rows, |t| t.job_count.map(f64::from)),
            total_salary: sum_by(rows, |t| Some(t.salary())),
            salary_by_employee: group_by(rows, |t| t.user_id, |t| Some(t.salary())),
            hours_by_employee: group_by(rows, |t| t.user_id, |t| t.hours),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ExpenseTotals {
    pub entries: usize,
    pub total: f64,
    #[schema(value_type = Object)]
    pub by_employee: BTreeMap<u64, f64>,
}

impl ExpenseTotals {
    pub fn from_rows(rows: &[ExpenseEntry]) -> Self {
        Self {
            entries: rows.len(),
            total: sum_by(rows, |e| Some(e.amount)),
            by_employee: group_by(rows, |e| e.user_id, |e| Some(e.amount)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct IncomeTotals {
    pub entries: usize,
    pub total: f64,
    #[schema(value_type = Object)]
    pub by_brand: BTreeMap<String, f64>,
    #[schema(value_type = Object)]
    pub by_payment_method: BTreeMap<String, f64>,
    #[schema(value_type = Object)]
    pub by_payment_type: BTreeMap<String, f64>,
}

impl IncomeTotals {
    pub fn from_rows(rows: &[CompanyIncomeRecord]) -> Self {
        Self {
            entries: rows.len(),
            total: sum_by(rows, |r| Some(r.amount)),
            by_brand: group_by(rows, |r| r.company_name.clone(), |r| Some(r.amount)),
            by_payment_method: group_by(rows, |r| r.payment_method.clone(), |r| Some(r.amount)),
            by_payment_type: group_by(rows, |r| r.payment_type.to_string(), |r| Some(r.amount)),
        }
    }
}

/// Totals for studio and personal spend, which share a shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SpendTotals {
    pub entries: usize,
    pub total: f64,
    #[schema(value_type = Object)]
    pub by_method: BTreeMap<String, f64>,
}

impl SpendTotals {
    pub fn from_studio(rows: &[StudioExpense]) -> Self {
        Self {
            entries: rows.len(),
            total: sum_by(rows, |r| Some(r.amount)),
            by_method: group_by(rows, |r| r.method.clone(), |r| Some(r.amount)),
        }
    }

    pub fn from_personal(rows: &[PersonalExpense]) -> Self {
        Self {
            entries: rows.len(),
            total: sum_by(rows, |r| Some(r.amount)),
            by_method: group_by(rows, |r| r.method.clone(), |r| Some(r.amount)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct BillTotals {
    pub entries: usize,
    pub total: f64,
    pub pending: f64,
    pub paid: f64,
    #[schema(value_type = Object)]
    pub by_vendor: BTreeMap<u64, f64>,
}

impl BillTotals {
    pub fn from_rows(rows: &[VendorBill]) -> Self {
        let with_status =
            |status: BillStatus| move |b: &VendorBill| (b.status == status).then_some(b.amount);

        Self {
            entries: rows.len(),
            total: sum_by(rows, |b| Some(b.amount)),
            pending: sum_by(rows, with_status(BillStatus::Pending)),
            paid: sum_by(rows, with_status(BillStatus::Paid)),
            by_vendor: group_by(rows, |b| b.vendor_id, |b| Some(b.amount)),
        }
    }
}

/// Profit and loss for one period.
///
/// `net_profit = company_income - employee_salaries - employee_expenses - studio_expenses`
/// and `net_after_personal` additionally subtracts personal expenses. Vendor
/// bills are reported on their own line and are not subtracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct ProfitLoss {
    pub company_income: f64,
    pub employee_salaries: f64,
    pub employee_expenses: f64,
    pub studio_expenses: f64,
    pub personal_expenses: f64,
    pub vendor_bills: f64,
    pub net_profit: f64,
    pub net_after_personal: f64,
}

impl ProfitLoss {
    pub fn compute(
        company_income: f64,
        employee_salaries: f64,
        employee_expenses: f64,
        studio_expenses: f64,
        personal_expenses: f64,
        vendor_bills: f64,
    ) -> Self {
        let net_profit = company_income - employee_salaries - employee_expenses - studio_expenses;

        Self {
            company_income,
            employee_salaries,
            employee_expenses,
            studio_expenses,
            personal_expenses,
            vendor_bills,
            net_profit,
            net_after_personal: net_profit - personal_expenses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        company_income::{JobStatus, PaymentType},
        timesheet::WorkType,
    };
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn timesheet(user_id: u64, work_type: WorkType, hours: f64, rate: f64, jobs: u32) -> TimesheetEntry {
        TimesheetEntry {
            id: 0,
            user_id,
            date: day(1),
            work_type,
            job_description: "shoot".into(),
            hours: (hours > 0.0).then_some(hours),
            hourly_rate: Some(rate),
            job_count: (jobs > 0).then_some(jobs),
            job_rate: Some(rate),
            start_time: None,
            end_time: None,
            total_salary: 0.0,
        }
    }

    fn income(brand: &str, method: &str, amount: f64) -> CompanyIncomeRecord {
        CompanyIncomeRecord {
            id: 0,
            company_name: brand.into(),
            client: None,
            amount,
            payment_type: PaymentType::Full,
            payment_method: method.into(),
            date: day(3),
            job_status: JobStatus::Completed,
            job_completion_date: None,
            payment_slip_path: None,
            created_by: 1,
        }
    }

    #[test]
    fn empty_rows_give_zero_totals_and_empty_groups() {
        assert_eq!(TimesheetTotals::from_rows(&[]), TimesheetTotals::default());
        assert_eq!(ExpenseTotals::from_rows(&[]), ExpenseTotals::default());
        assert_eq!(IncomeTotals::from_rows(&[]), IncomeTotals::default());
        assert_eq!(SpendTotals::from_studio(&[]), SpendTotals::default());
        assert_eq!(BillTotals::from_rows(&[]), BillTotals::default());
        assert!(IncomeTotals::from_rows(&[]).by_brand.is_empty());
    }

    #[test]
    fn total_salary_matches_pay_inputs() {
        let rows = vec![
            timesheet(1, WorkType::Hourly, 4.0, 25.0, 0),
            timesheet(2, WorkType::Job, 0.0, 40.0, 3),
            timesheet(1, WorkType::Hourly, 2.5, 30.0, 0),
        ];
        let totals = TimesheetTotals::from_rows(&rows);

        let expected: f64 = rows
            .iter()
            .map(|t| match t.work_type {
                WorkType::Hourly => t.hours.unwrap() * t.hourly_rate.unwrap(),
                WorkType::Job => f64::from(t.job_count.unwrap()) * t.job_rate.unwrap(),
            })
            .sum();

        assert_eq!(totals.total_salary, expected);
        assert_eq!(totals.total_hours, 6.5);
        assert_eq!(totals.total_jobs, 3.0);
        assert_eq!(totals.salary_by_employee.get(&1), Some(&175.0));
        assert_eq!(totals.salary_by_employee.get(&2), Some(&120.0));
    }

    #[test]
    fn stored_total_salary_is_not_trusted() {
        let mut entry = timesheet(1, WorkType::Hourly, 2.0, 10.0, 0);
        entry.total_salary = 9999.0;
        assert_eq!(TimesheetTotals::from_rows(&[entry]).total_salary, 20.0);
    }

    #[test]
    fn groups_are_discovered_from_data() {
        let rows = vec![
            income("Studio North", "cash", 100.0),
            income("Studio North", "bank_transfer", 250.0),
            income("Lab South", "cash", 50.0),
        ];
        let totals = IncomeTotals::from_rows(&rows);

        assert_eq!(totals.total, 400.0);
        assert_eq!(totals.by_brand.len(), 2);
        assert_eq!(totals.by_brand["Studio North"], 350.0);
        assert_eq!(totals.by_payment_method["cash"], 150.0);
        assert!(!totals.by_payment_method.contains_key("card"));
        assert_eq!(totals.by_payment_type["full"], 400.0);
    }

    #[test]
    fn null_values_count_as_zero() {
        let rows = vec![
            timesheet(1, WorkType::Job, 0.0, 10.0, 2),
            timesheet(1, WorkType::Hourly, 3.0, 10.0, 0),
        ];
        assert_eq!(sum_by(&rows, |t| t.hours), 3.0);

        let hours = group_by(&rows, |t| t.user_id, |t| t.hours);
        assert_eq!(hours.get(&1), Some(&3.0));
    }

    #[test]
    fn bills_split_by_status() {
        let bill = |amount, status| VendorBill {
            id: 0,
            vendor_id: 9,
            amount,
            due_date: day(28),
            status,
            invoice_path: None,
            created_by: 1,
            paid_by: None,
            paid_at: None,
        };
        let totals = BillTotals::from_rows(&[
            bill(100.0, BillStatus::Pending),
            bill(40.0, BillStatus::Paid),
        ]);

        assert_eq!(totals.total, 140.0);
        assert_eq!(totals.pending, 100.0);
        assert_eq!(totals.paid, 40.0);
        assert_eq!(totals.by_vendor[&9], 140.0);
    }

    #[test]
    fn net_profit_subtracts_salaries_expenses_and_studio() {
        let pl = ProfitLoss::compute(1000.0, 300.0, 50.0, 100.0, 25.0, 500.0);
        assert_eq!(pl.net_profit, 550.0);
        assert_eq!(pl.net_after_personal, 525.0);
        assert_eq!(pl.vendor_bills, 500.0);
    }
}
