use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use sqlx::{
    MySql,
    mysql::MySqlArguments,
    query::{Query, QueryAs},
};

use crate::{error::AppError, utils::date_range::DateRange};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    I64(i64),
    F64(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Null,
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::U64(v)
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        SqlValue::U64(u64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::F64(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveTime> for SqlValue {
    fn from(v: NaiveTime) -> Self {
        SqlValue::Time(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::DateTime(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// Column/value pairs for an INSERT.
pub type Columns = Vec<(&'static str, SqlValue)>;

/// ===============================
/// SQL statement container
/// ===============================
#[derive(Debug)]
pub struct SqlStatement {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// How a patch value is bound for a column. Strings are only parsed when the
/// column itself holds a date or time; text columns keep the text as sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Date,
    DateTime,
    Time,
}

/// An updatable column and its kind.
pub type ColumnSpec = (&'static str, ColumnKind);

fn json_to_sql(column: &str, kind: ColumnKind, value: &Value) -> Result<SqlValue, AppError> {
    let mismatch = |expected: &str| AppError::validation(format!("{column} must be {expected}"));

    Ok(match (kind, value) {
        (_, Value::Null) => SqlValue::Null,
        (ColumnKind::Text, Value::String(s)) => SqlValue::String(s.clone()),
        (ColumnKind::Text, _) => return Err(mismatch("text")),
        (ColumnKind::Number, Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                SqlValue::U64(u)
            } else if let Some(i) = n.as_i64() {
                SqlValue::I64(i)
            } else if let Some(f) = n.as_f64() {
                SqlValue::F64(f)
            } else {
                return Err(mismatch("a number"));
            }
        }
        (ColumnKind::Number, _) => return Err(mismatch("a number")),
        (ColumnKind::Date, Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(SqlValue::Date)
            .map_err(|_| mismatch("a date (YYYY-MM-DD)"))?,
        (ColumnKind::DateTime, Value::String(s)) => {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .map(SqlValue::DateTime)
                .map_err(|_| mismatch("a timestamp (YYYY-MM-DDTHH:MM:SS)"))?
        }
        (ColumnKind::Time, Value::String(s)) => NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map(SqlValue::Time)
            .map_err(|_| mismatch("a time (HH:MM:SS)"))?,
        (ColumnKind::Date | ColumnKind::DateTime | ColumnKind::Time, _) => {
            return Err(mismatch("a string"));
        }
    })
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
///
/// Only keys listed in `allowed` may be set; anything else is rejected before
/// it reaches the SQL text.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[ColumnSpec],
    id_value: u64,
) -> Result<SqlStatement, AppError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| AppError::validation("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(AppError::validation("No fields provided for update"));
    }

    let kind_of = |key: &str| {
        allowed
            .iter()
            .find(|(column, _)| *column == key)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| AppError::validation(format!("Field {key:?} cannot be updated")))
    };

    let mut assignments = Vec::with_capacity(obj.len());
    let mut values = Vec::with_capacity(obj.len() + 1);
    for (key, value) in obj {
        values.push(json_to_sql(key, kind_of(key)?, value)?);
        assignments.push(format!("{} = ?", key));
    }
    values.push(SqlValue::U64(id_value));

    let sql = format!("UPDATE {} SET {} WHERE id = ?", table, assignments.join(", "));

    Ok(SqlStatement { sql, values })
}

impl SqlStatement {
    /// Narrows an UPDATE to rows whose `column` still equals `expected`, so a
    /// check-then-write happens in one statement.
    pub fn guarded(mut self, column: &str, expected: SqlValue) -> Self {
        self.sql.push_str(&format!(" AND {} = ?", column));
        self.values.push(expected);
        self
    }
}

/// ===============================
/// Build date-bounded SELECT SQL
/// ===============================
///
/// Inclusive `BETWEEN` on `date_column`, one equality condition per filter
/// that carries a value (`Null` filters are skipped), ordered by the date
/// column then id.
pub fn build_select_sql(
    table: &str,
    date_column: &str,
    range: &DateRange,
    filters: Columns,
    ascending: bool,
) -> SqlStatement {
    let mut conditions = vec![format!("{date_column} BETWEEN ? AND ?")];
    let mut values = vec![SqlValue::Date(range.start_date), SqlValue::Date(range.end_date)];

    for (column, value) in filters {
        if value == SqlValue::Null {
            continue;
        }
        conditions.push(format!("{column} = ?"));
        values.push(value);
    }

    let order = if ascending { "ASC" } else { "DESC" };
    SqlStatement {
        sql: format!(
            "SELECT * FROM {} WHERE {} ORDER BY {} {}, id {}",
            table,
            conditions.join(" AND "),
            date_column,
            order,
            order
        ),
        values,
    }
}

/// ===============================
/// Build INSERT SQL
/// ===============================
pub fn build_insert_sql(table: &str, columns: Columns) -> SqlStatement {
    let names = columns.iter().map(|(c, _)| *c).collect::<Vec<_>>().join(", ");
    let marks = vec!["?"; columns.len()].join(", ");

    SqlStatement {
        sql: format!("INSERT INTO {} ({}) VALUES ({})", table, names, marks),
        values: columns.into_iter().map(|(_, v)| v).collect(),
    }
}

macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                SqlValue::String(v) => query.bind(v),
                SqlValue::U64(v) => query.bind(v),
                SqlValue::I64(v) => query.bind(v),
                SqlValue::F64(v) => query.bind(v),
                SqlValue::Date(v) => query.bind(v),
                SqlValue::Time(v) => query.bind(v),
                SqlValue::DateTime(v) => query.bind(v),
                SqlValue::Null => query.bind(None::<String>),
            };
        }
        query
    }};
}

pub fn bind_query<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    values: Vec<SqlValue>,
) -> Query<'q, MySql, MySqlArguments> {
    bind_values!(query, values)
}

pub fn bind_query_as<'q, O>(
    query: QueryAs<'q, MySql, O, MySqlArguments>,
    values: Vec<SqlValue>,
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    bind_values!(query, values)
}
