use serde::Serialize;
use utoipa::ToSchema;

use super::aggregate::{
    BillTotals, ExpenseTotals, IncomeTotals, ProfitLoss, SpendTotals, TimesheetTotals,
};
use crate::{
    error::AppError,
    model::{
        company_income::CompanyIncomeRecord,
        expense::ExpenseEntry,
        studio_expense::{PersonalExpense, StudioExpense},
        timesheet::TimesheetEntry,
        vendor_bill::VendorBill,
    },
    repo::RecordSource,
    utils::date_range::DateRange,
};

/// Every row that feeds the profit/loss figures for one period.
#[derive(Debug, Clone, Default)]
pub struct PeriodRecords {
    pub timesheets: Vec<TimesheetEntry>,
    pub expenses: Vec<ExpenseEntry>,
    pub income: Vec<CompanyIncomeRecord>,
    pub studio: Vec<StudioExpense>,
    pub personal: Vec<PersonalExpense>,
    pub bills: Vec<VendorBill>,
}

impl PeriodRecords {
    /// Runs the six fetches concurrently; the first failure wins.
    pub async fn fetch<S: RecordSource>(source: &S, range: &DateRange) -> Result<Self, AppError> {
        let (timesheets, expenses, income, studio, personal, bills) = futures::try_join!(
            source.timesheets(range, None),
            source.expenses(range, None),
            source.company_income(range, None),
            source.studio_expenses(range),
            source.personal_expenses(range),
            source.vendor_bills(range, None),
        )?;

        Ok(Self {
            timesheets,
            expenses,
            income,
            studio,
            personal,
            bills,
        })
    }

    pub fn profit_loss(&self) -> ProfitLoss {
        statement_figures(
            &TimesheetTotals::from_rows(&self.timesheets),
            &ExpenseTotals::from_rows(&self.expenses),
            &IncomeTotals::from_rows(&self.income),
            &SpendTotals::from_studio(&self.studio),
            &SpendTotals::from_personal(&self.personal),
            &BillTotals::from_rows(&self.bills),
        )
    }
}

fn statement_figures(
    timesheets: &TimesheetTotals,
    expenses: &ExpenseTotals,
    income: &IncomeTotals,
    studio: &SpendTotals,
    personal: &SpendTotals,
    bills: &BillTotals,
) -> ProfitLoss {
    ProfitLoss::compute(
        income.total,
        timesheets.total_salary,
        expenses.total,
        studio.total,
        personal.total,
        bills.total,
    )
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyStatement {
    #[schema(example = "2024-02")]
    pub month: String,
    pub range: DateRange,
    pub timesheets: TimesheetTotals,
    pub expenses: ExpenseTotals,
    pub income: IncomeTotals,
    pub studio_expenses: SpendTotals,
    pub personal_expenses: SpendTotals,
    pub vendor_bills: BillTotals,
    pub profit_loss: ProfitLoss,
}

impl MonthlyStatement {
    pub fn from_records(range: &DateRange, records: &PeriodRecords) -> Self {
        let timesheets = TimesheetTotals::from_rows(&records.timesheets);
        let expenses = ExpenseTotals::from_rows(&records.expenses);
        let income = IncomeTotals::from_rows(&records.income);
        let studio_expenses = SpendTotals::from_studio(&records.studio);
        let personal_expenses = SpendTotals::from_personal(&records.personal);
        let vendor_bills = BillTotals::from_rows(&records.bills);

        let profit_loss = statement_figures(
            &timesheets,
            &expenses,
            &income,
            &studio_expenses,
            &personal_expenses,
            &vendor_bills,
        );

        Self {
            month: range.month_token(),
            range: *range,
            timesheets,
            expenses,
            income,
            studio_expenses,
            personal_expenses,
            vendor_bills,
            profit_loss,
        }
    }
}

/// Single-month profit/loss statement. A failed fetch fails the statement.
pub async fn monthly_statement<S: RecordSource>(
    source: &S,
    range: &DateRange,
) -> Result<MonthlyStatement, AppError> {
    let records = PeriodRecords::fetch(source, range).await?;
    Ok(MonthlyStatement::from_records(range, &records))
}

/// What one employee (or, with no employee, the whole team) logged in a month.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeDashboard {
    #[schema(example = "2024-02")]
    pub month: String,
    pub employee_id: Option<u64>,
    pub timesheets: TimesheetTotals,
    pub expenses: ExpenseTotals,
    /// Salary plus reimbursable expenses.
    pub total_payout: f64,
}

pub async fn employee_dashboard<S: RecordSource>(
    source: &S,
    range: &DateRange,
    employee_id: Option<u64>,
) -> Result<EmployeeDashboard, AppError> {
    let (timesheets, expenses) = futures::try_join!(
        source.timesheets(range, employee_id),
        source.expenses(range, employee_id),
    )?;

    let timesheets = TimesheetTotals::from_rows(&timesheets);
    let expenses = ExpenseTotals::from_rows(&expenses);

    Ok(EmployeeDashboard {
        month: range.month_token(),
        employee_id,
        total_payout: timesheets.total_salary + expenses.total,
        timesheets,
        expenses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vendor_bill::BillStatus;
    use crate::report::fixtures::{FakeSource, bill, expense, hourly, income, personal, studio};
    use crate::utils::date_range::month_range;

    fn february() -> FakeSource {
        FakeSource {
            timesheets: vec![hourly("2024-02", 5, 1, 10.0, 20.0), hourly("2024-02", 6, 2, 5.0, 20.0)],
            expenses: vec![expense("2024-02", 7, 1, 30.0), expense("2024-02", 8, 2, 20.0)],
            income: vec![
                income("2024-02", 10, "Studio North", "cash", 600.0),
                income("2024-02", 11, "Lab South", "bank_transfer", 400.0),
                income("2024-03", 1, "Studio North", "cash", 9999.0),
            ],
            studio: vec![studio("2024-02", 12, "card", 100.0)],
            personal: vec![personal("2024-02", 13, 40.0)],
            bills: vec![bill("2024-02", 28, 3, 250.0, BillStatus::Pending)],
            failing: Vec::new(),
        }
    }

    #[actix_web::test]
    async fn statement_nets_income_against_costs() {
        let range = month_range("2024-02").unwrap();
        let statement = monthly_statement(&february(), &range).await.unwrap();

        let pl = statement.profit_loss;
        assert_eq!(pl.company_income, 1000.0);
        assert_eq!(pl.employee_salaries, 300.0);
        assert_eq!(pl.employee_expenses, 50.0);
        assert_eq!(pl.studio_expenses, 100.0);
        assert_eq!(pl.net_profit, 550.0);
        assert_eq!(pl.net_after_personal, 510.0);
        // reported, not subtracted
        assert_eq!(pl.vendor_bills, 250.0);

        assert_eq!(statement.month, "2024-02");
        assert_eq!(statement.income.by_brand["Lab South"], 400.0);
        assert_eq!(statement.timesheets.salary_by_employee[&2], 100.0);
    }

    #[actix_web::test]
    async fn statement_fails_when_a_fetch_fails() {
        let mut source = february();
        source.failing.push("2024-02".into());
        let range = month_range("2024-02").unwrap();

        assert!(monthly_statement(&source, &range).await.is_err());
    }

    #[actix_web::test]
    async fn empty_month_is_all_zero() {
        let range = month_range("2023-06").unwrap();
        let statement = monthly_statement(&february(), &range).await.unwrap();

        assert_eq!(statement.profit_loss, ProfitLoss::default());
        assert!(statement.income.by_brand.is_empty());
        assert!(statement.timesheets.salary_by_employee.is_empty());
    }

    #[actix_web::test]
    async fn dashboard_scopes_to_one_employee() {
        let range = month_range("2024-02").unwrap();
        let dashboard = employee_dashboard(&february(), &range, Some(1)).await.unwrap();

        assert_eq!(dashboard.timesheets.total_hours, 10.0);
        assert_eq!(dashboard.timesheets.total_salary, 200.0);
        assert_eq!(dashboard.expenses.total, 30.0);
        assert_eq!(dashboard.total_payout, 230.0);

        let team = employee_dashboard(&february(), &range, None).await.unwrap();
        assert_eq!(team.timesheets.entries, 2);
    }
}
