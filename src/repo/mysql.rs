use serde_json::Value;
use sqlx::{FromRow, MySqlPool, mysql::MySqlRow};
use tracing::{debug, error};

use super::{RecordSource, Table};
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
        db_utils::{
            Columns, SqlValue, bind_query, bind_query_as, build_insert_sql, build_select_sql,
            build_update_sql,
        },
    },
};

/// MySQL-backed record store shared by every handler.
#[derive(Clone)]
pub struct MySqlRecords {
    pool: MySqlPool,
}

impl MySqlRecords {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_rows<T>(
        &self,
        table: Table,
        range: &DateRange,
        filters: Vec<(&'static str, SqlValue)>,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        let date_column = table.date_column().unwrap_or("created_at");
        let stmt = build_select_sql(table.as_ref(), date_column, range, filters, table.ascending());
        debug!(sql = %stmt.sql, bindings = ?stmt.values, "Fetching rows");

        bind_query_as(sqlx::query_as::<_, T>(&stmt.sql), stmt.values)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, table = %table, month = %range.month_token(), "Failed to fetch rows");
                AppError::from(e)
            })
    }

    /// Inserts a row and returns its new id.
    pub async fn insert(&self, table: Table, columns: Columns) -> Result<u64, AppError> {
        let stmt = build_insert_sql(table.as_ref(), columns);
        debug!(sql = %stmt.sql, "Inserting row");

        let result = bind_query(sqlx::query(&stmt.sql), stmt.values)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, table = %table, "Failed to insert row");
                AppError::from(e)
            })?;

        Ok(result.last_insert_id())
    }

    pub async fn find<T>(&self, table: Table, id: u64) -> Result<Option<T>, AppError>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} WHERE id = ?", table);

        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, table = %table, id, "Failed to fetch row");
                AppError::from(e)
            })
    }

    /// Like [`find`](Self::find) but a missing row is an error.
    pub async fn get<T>(&self, table: Table, id: u64) -> Result<T, AppError>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        self.find(table, id)
            .await?
            .ok_or(AppError::NotFound(table.label()))
    }

    /// Whole-table listing for the small reference tables (profiles, vendors).
    pub async fn list<T>(&self, table: Table) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} ORDER BY id ASC", table);

        sqlx::query_as::<_, T>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, table = %table, "Failed to list rows");
                AppError::from(e)
            })
    }

    /// Applies a JSON patch restricted to the table's updatable columns.
    /// Returns `false` when no row has that id.
    pub async fn update(&self, table: Table, id: u64, patch: &Value) -> Result<bool, AppError> {
        let stmt = build_update_sql(table.as_ref(), patch, table.updatable_columns(), id)?;
        debug!(sql = %stmt.sql, "Updating row");

        let result = bind_query(sqlx::query(&stmt.sql), stmt.values)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, table = %table, id, "Failed to update row");
                AppError::from(e)
            })?;

        // MySQL reports 0 affected rows when nothing changed, so check existence.
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        self.exists(table, id).await
    }

    /// Applies a patch only while `column` still holds `expected`. Returns
    /// `false` when the row is missing or the condition no longer holds.
    pub async fn update_where(
        &self,
        table: Table,
        id: u64,
        patch: &Value,
        column: &str,
        expected: SqlValue,
    ) -> Result<bool, AppError> {
        let stmt = build_update_sql(table.as_ref(), patch, table.updatable_columns(), id)?
            .guarded(column, expected);
        debug!(sql = %stmt.sql, "Updating row conditionally");

        let result = bind_query(sqlx::query(&stmt.sql), stmt.values)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, table = %table, id, "Failed to update row");
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, table: Table, id: u64) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table);

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, table = %table, id, "Failed to delete row");
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, table: Table, id: u64) -> Result<bool, AppError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ? LIMIT 1)", table);

        let found = sqlx::query_scalar::<_, i64>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(found > 0)
    }
}

impl RecordSource for MySqlRecords {
    async fn timesheets(
        &self,
        range: &DateRange,
        user_id: Option<u64>,
    ) -> Result<Vec<TimesheetEntry>, AppError> {
        self.fetch_rows(Table::Timesheets, range, vec![("user_id", user_id.into())])
            .await
    }

    async fn expenses(
        &self,
        range: &DateRange,
        user_id: Option<u64>,
    ) -> Result<Vec<ExpenseEntry>, AppError> {
        self.fetch_rows(Table::Expenses, range, vec![("user_id", user_id.into())])
            .await
    }

    async fn company_income(
        &self,
        range: &DateRange,
        brand: Option<&str>,
    ) -> Result<Vec<CompanyIncomeRecord>, AppError> {
        self.fetch_rows(Table::CompanyIncome, range, vec![("company_name", brand.into())])
            .await
    }

    async fn studio_expenses(&self, range: &DateRange) -> Result<Vec<StudioExpense>, AppError> {
        self.fetch_rows(Table::StudioExpenses, range, Vec::new()).await
    }

    async fn personal_expenses(
        &self,
        range: &DateRange,
    ) -> Result<Vec<PersonalExpense>, AppError> {
        self.fetch_rows(Table::PersonalExpenses, range, Vec::new()).await
    }

    async fn vendor_bills(
        &self,
        range: &DateRange,
        status: Option<BillStatus>,
    ) -> Result<Vec<VendorBill>, AppError> {
        let status = status.map(|s| s.to_string());
        self.fetch_rows(Table::VendorBills, range, vec![("status", status.into())])
            .await
    }
}
