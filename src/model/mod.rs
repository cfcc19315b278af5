pub mod company_income;
pub mod expense;
pub mod profile;
pub mod studio_expense;
pub mod timesheet;
pub mod vendor;
pub mod vendor_bill;

/// Rounds a money value to whole cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
