use crate::api::{
    company_income::{CreateIncome, UpdateIncome},
    expense::{CreateExpense, UpdateExpense},
    personal_expense::CreatePersonalExpense,
    profile::UpdateProfile,
    storage::UploadResponse,
    studio_expense::{CreateStudioExpense, UpdateSpend},
    timesheet::{CreateTimesheet, UpdateTimesheet},
    vendor::CreateVendor,
    vendor_bill::{CreateVendorBill, UpdateVendorBill},
};
use crate::export::{ExportEntity, ExportFormat};
use crate::model::{
    company_income::{CompanyIncomeRecord, JobStatus, PaymentType},
    expense::ExpenseEntry,
    profile::{Profile, Role},
    studio_expense::{PersonalExpense, StudioExpense},
    timesheet::{TimesheetEntry, WorkType},
    vendor::Vendor,
    vendor_bill::{BillStatus, VendorBill},
};
use crate::models::MessageResponse;
use crate::report::{
    aggregate::{BillTotals, ExpenseTotals, IncomeTotals, ProfitLoss, SpendTotals, TimesheetTotals},
    statement::{EmployeeDashboard, MonthlyStatement},
    trend::TrendPoint,
};
use crate::storage::Bucket;
use crate::utils::date_range::DateRange;
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Opsdesk API",
        version = "1.0.0",
        description = r#"
## Studio Operations Back Office

Back-office API for a small creative studio: staff log their hours and
out-of-pocket expenses, admins book income and spend and read the monthly
profit and loss.

### 🔹 Key Features
- **Timesheets and Expenses**
  - Hourly or per-job entries with the salary computed server-side
  - Expense claims with receipt uploads
- **Company Books**
  - Income per brand, studio and personal spend, vendor bills
- **Reports**
  - Employee dashboard, monthly statement and a 12-month trend
- **Export**
  - Any month of any record type as CSV or XLSX

### 🔐 Security
Every endpoint expects a **JWT Bearer** token. Staff see their own
timesheets and expenses; everything else is admin only.

### 📅 Months
Endpoints that take `month` expect `YYYY-MM` and cover the first through the
last calendar day of that month.
"#,
    ),
    paths(
        crate::api::profile::me,
        crate::api::profile::list_profiles,
        crate::api::profile::update_profile,

        crate::api::timesheet::list_timesheets,
        crate::api::timesheet::create_timesheet,
        crate::api::timesheet::get_timesheet,
        crate::api::timesheet::update_timesheet,
        crate::api::timesheet::delete_timesheet,

        crate::api::expense::list_expenses,
        crate::api::expense::create_expense,
        crate::api::expense::get_expense,
        crate::api::expense::update_expense,
        crate::api::expense::delete_expense,

        crate::api::company_income::list_income,
        crate::api::company_income::create_income,
        crate::api::company_income::get_income,
        crate::api::company_income::update_income,
        crate::api::company_income::delete_income,

        crate::api::studio_expense::list_studio_expenses,
        crate::api::studio_expense::create_studio_expense,
        crate::api::studio_expense::update_studio_expense,
        crate::api::studio_expense::delete_studio_expense,

        crate::api::personal_expense::list_personal_expenses,
        crate::api::personal_expense::create_personal_expense,
        crate::api::personal_expense::update_personal_expense,
        crate::api::personal_expense::delete_personal_expense,

        crate::api::vendor::list_vendors,
        crate::api::vendor::create_vendor,

        crate::api::vendor_bill::list_vendor_bills,
        crate::api::vendor_bill::create_vendor_bill,
        crate::api::vendor_bill::update_vendor_bill,
        crate::api::vendor_bill::pay_vendor_bill,
        crate::api::vendor_bill::delete_vendor_bill,

        crate::api::report::dashboard,
        crate::api::report::statement,
        crate::api::report::trend,

        crate::api::export::export,

        crate::api::storage::upload,
        crate::api::storage::download
    ),
    components(
        schemas(
            MessageResponse,
            Role,
            Profile,
            UpdateProfile,
            WorkType,
            TimesheetEntry,
            CreateTimesheet,
            UpdateTimesheet,
            ExpenseEntry,
            CreateExpense,
            UpdateExpense,
            PaymentType,
            JobStatus,
            CompanyIncomeRecord,
            CreateIncome,
            UpdateIncome,
            StudioExpense,
            PersonalExpense,
            CreateStudioExpense,
            CreatePersonalExpense,
            UpdateSpend,
            Vendor,
            CreateVendor,
            BillStatus,
            VendorBill,
            CreateVendorBill,
            UpdateVendorBill,
            DateRange,
            TimesheetTotals,
            ExpenseTotals,
            IncomeTotals,
            SpendTotals,
            BillTotals,
            ProfitLoss,
            MonthlyStatement,
            EmployeeDashboard,
            TrendPoint,
            ExportEntity,
            ExportFormat,
            Bucket,
            UploadResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Profiles", description = "Who is signed in and who works here"),
        (name = "Timesheets", description = "Hours and jobs logged by staff"),
        (name = "Expenses", description = "Reimbursable staff expenses"),
        (name = "Company Income", description = "Income per brand"),
        (name = "Studio Expenses", description = "Studio spend"),
        (name = "Personal Expenses", description = "Business spend paid personally"),
        (name = "Vendors", description = "Vendor directory"),
        (name = "Vendor Bills", description = "Bills and their payment"),
        (name = "Reports", description = "Dashboard, statement and trend"),
        (name = "Export", description = "CSV and XLSX downloads"),
        (name = "Storage", description = "Receipts, invoices and payment slips"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_report_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/reports/trend"));
        assert!(doc.paths.paths.contains_key("/api/vendor-bills/{id}/pay"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
