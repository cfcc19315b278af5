//! Record fetchers and the write interface to the database.

mod mysql;

pub use mysql::MySqlRecords;

use strum_macros::{AsRefStr, Display};

use crate::{
    error::AppError,
    model::{
        company_income::CompanyIncomeRecord,
        expense::ExpenseEntry,
        studio_expense::{PersonalExpense, StudioExpense},
        timesheet::TimesheetEntry,
        vendor_bill::{BillStatus, VendorBill},
    },
    utils::{
        date_range::DateRange,
        db_utils::{ColumnKind, ColumnSpec},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Table {
    Profiles,
    Vendors,
    Timesheets,
    Expenses,
    CompanyIncome,
    StudioExpenses,
    PersonalExpenses,
    VendorBills,
}

impl Table {
    /// Column the date-range filter applies to.
    pub fn date_column(self) -> Option<&'static str> {
        match self {
            Table::Profiles | Table::Vendors => None,
            Table::VendorBills => Some("due_date"),
            _ => Some("date"),
        }
    }

    /// Bills are listed by what falls due first; everything else newest first.
    pub fn ascending(self) -> bool {
        matches!(self, Table::VendorBills)
    }

    /// Columns a patch may touch. Ownership and audit columns are never listed.
    pub fn updatable_columns(self) -> &'static [ColumnSpec] {
        use ColumnKind::{Date, DateTime, Number, Text, Time};

        match self {
            Table::Profiles => &[("full_name", Text), ("role", Text)],
            Table::Vendors => &[("name", Text), ("contact_email", Text)],
            Table::Timesheets => &[
                ("date", Date),
                ("work_type", Text),
                ("job_description", Text),
                ("hours", Number),
                ("hourly_rate", Number),
                ("job_count", Number),
                ("job_rate", Number),
                ("start_time", Time),
                ("end_time", Time),
                ("total_salary", Number),
            ],
            Table::Expenses => &[
                ("date", Date),
                ("description", Text),
                ("amount", Number),
                ("receipt_path", Text),
            ],
            Table::CompanyIncome => &[
                ("company_name", Text),
                ("client", Text),
                ("amount", Number),
                ("payment_type", Text),
                ("payment_method", Text),
                ("date", Date),
                ("job_status", Text),
                ("job_completion_date", Date),
                ("payment_slip_path", Text),
            ],
            Table::StudioExpenses => &[
                ("merchant", Text),
                ("details", Text),
                ("amount", Number),
                ("method", Text),
                ("date", Date),
            ],
            Table::PersonalExpenses => &[
                ("merchant", Text),
                ("details", Text),
                ("amount", Number),
                ("method", Text),
                ("date", Date),
                ("paid_by", Text),
            ],
            Table::VendorBills => &[
                ("vendor_id", Number),
                ("amount", Number),
                ("due_date", Date),
                ("status", Text),
                ("invoice_path", Text),
                ("paid_by", Number),
                ("paid_at", DateTime),
            ],
        }
    }

    /// Human name used in "not found" messages.
    pub fn label(self) -> &'static str {
        match self {
            Table::Profiles => "Profile",
            Table::Vendors => "Vendor",
            Table::Timesheets => "Timesheet entry",
            Table::Expenses => "Expense",
            Table::CompanyIncome => "Income record",
            Table::StudioExpenses => "Studio expense",
            Table::PersonalExpenses => "Personal expense",
            Table::VendorBills => "Vendor bill",
        }
    }
}

/// Date-bounded reads for every entity that feeds the reports.
///
/// Implementations translate the parameters into a single backend query and
/// do no filtering of their own.
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    async fn timesheets(
        &self,
        range: &DateRange,
        user_id: Option<u64>,
    ) -> Result<Vec<TimesheetEntry>, AppError>;

    async fn expenses(
        &self,
        range: &DateRange,
        user_id: Option<u64>,
    ) -> Result<Vec<ExpenseEntry>, AppError>;

    async fn company_income(
        &self,
        range: &DateRange,
        brand: Option<&str>,
    ) -> Result<Vec<CompanyIncomeRecord>, AppError>;

    async fn studio_expenses(&self, range: &DateRange) -> Result<Vec<StudioExpense>, AppError>;

    async fn personal_expenses(&self, range: &DateRange)
    -> Result<Vec<PersonalExpense>, AppError>;

    async fn vendor_bills(
        &self,
        range: &DateRange,
        status: Option<BillStatus>,
    ) -> Result<Vec<VendorBill>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_match_schema() {
        assert_eq!(Table::CompanyIncome.to_string(), "company_income");
        assert_eq!(Table::VendorBills.as_ref(), "vendor_bills");
        assert_eq!(Table::VendorBills.date_column(), Some("due_date"));
        assert_eq!(Table::Timesheets.date_column(), Some("date"));
    }

    #[test]
    fn ownership_columns_are_not_updatable() {
        let updatable = |table: Table, column: &str| {
            table.updatable_columns().iter().any(|(name, _)| *name == column)
        };
        for table in [Table::Timesheets, Table::Expenses] {
            assert!(!updatable(table, "user_id"));
        }
        assert!(!updatable(Table::VendorBills, "created_by"));
    }

    #[test]
    fn free_text_columns_are_bound_as_text() {
        let kind = |table: Table, column: &str| {
            table
                .updatable_columns()
                .iter()
                .find(|(name, _)| *name == column)
                .map(|(_, kind)| *kind)
        };
        assert_eq!(kind(Table::Expenses, "description"), Some(ColumnKind::Text));
        assert_eq!(kind(Table::Timesheets, "job_description"), Some(ColumnKind::Text));
        assert_eq!(kind(Table::StudioExpenses, "details"), Some(ColumnKind::Text));
        assert_eq!(kind(Table::Timesheets, "start_time"), Some(ColumnKind::Time));
        assert_eq!(kind(Table::VendorBills, "paid_at"), Some(ColumnKind::DateTime));
    }
}
