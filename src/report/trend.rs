use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use super::{aggregate::ProfitLoss, statement::PeriodRecords};
use crate::{
    repo::RecordSource,
    utils::date_range::{DateRange, trailing_months},
};

/// Months fetched at the same time. Each month already runs six queries at once.
pub const TREND_CONCURRENCY: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrendPoint {
    #[schema(example = "2024-02")]
    pub month: String,
    /// `false` when the month could not be fetched and its figures are zeros.
    pub complete: bool,
    pub profit_loss: ProfitLoss,
}

/// Profit/loss for each of the `months` months ending with `anchor`, oldest
/// first.
///
/// At most [`TREND_CONCURRENCY`] months are in flight at once, so a long
/// window never asks the pool for more than one month of fetches.
/// A month whose fetch fails is logged and reported as zeros, the rest are
/// unaffected.
pub async fn monthly_trend<S: RecordSource>(
    source: &S,
    anchor: &DateRange,
    months: u32,
) -> Vec<TrendPoint> {
    let periods = trailing_months(anchor, months);

    let points = periods.iter().map(|range| async move {
        let month = range.month_token();
        match PeriodRecords::fetch(source, range).await {
            Ok(records) => TrendPoint {
                month,
                complete: true,
                profit_loss: records.profit_loss(),
            },
            Err(e) => {
                warn!(error = %e, month = %month, "Trend month failed, reporting zeros");
                TrendPoint {
                    month,
                    complete: false,
                    profit_loss: ProfitLoss::default(),
                }
            }
        }
    });

    stream::iter(points)
        .buffered(TREND_CONCURRENCY)
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::model::{
        company_income::CompanyIncomeRecord,
        expense::ExpenseEntry,
        studio_expense::{PersonalExpense, StudioExpense},
        timesheet::TimesheetEntry,
        vendor_bill::{BillStatus, VendorBill},
    };
    use crate::report::fixtures::{FakeSource, expense, hourly, income, studio};
    use crate::utils::date_range::month_range;
    use std::cell::Cell;

    /// Wraps a source and records how many months were being fetched at once.
    #[derive(Default)]
    struct InFlightSource {
        inner: FakeSource,
        in_flight: Cell<usize>,
        peak: Cell<usize>,
    }

    impl RecordSource for InFlightSource {
        async fn timesheets(
            &self,
            range: &DateRange,
            user_id: Option<u64>,
        ) -> Result<Vec<TimesheetEntry>, AppError> {
            self.inner.timesheets(range, user_id).await
        }

        async fn expenses(
            &self,
            range: &DateRange,
            user_id: Option<u64>,
        ) -> Result<Vec<ExpenseEntry>, AppError> {
            self.inner.expenses(range, user_id).await
        }

        async fn company_income(
            &self,
            range: &DateRange,
            brand: Option<&str>,
        ) -> Result<Vec<CompanyIncomeRecord>, AppError> {
            self.in_flight.set(self.in_flight.get() + 1);
            self.peak.set(self.peak.get().max(self.in_flight.get()));
            actix_web::rt::task::yield_now().await;
            self.in_flight.set(self.in_flight.get() - 1);
            self.inner.company_income(range, brand).await
        }

        async fn studio_expenses(&self, range: &DateRange) -> Result<Vec<StudioExpense>, AppError> {
            self.inner.studio_expenses(range).await
        }

        async fn personal_expenses(
            &self,
            range: &DateRange,
        ) -> Result<Vec<PersonalExpense>, AppError> {
            self.inner.personal_expenses(range).await
        }

        async fn vendor_bills(
            &self,
            range: &DateRange,
            status: Option<BillStatus>,
        ) -> Result<Vec<VendorBill>, AppError> {
            self.inner.vendor_bills(range, status).await
        }
    }

    fn seeded_year(failing: &[&str]) -> FakeSource {
        let mut source = FakeSource::default();
        for month in 1..=12 {
            let token = format!("2024-{month:02}");
            source.income.push(income(&token, 10, "Studio North", "cash", 1000.0));
            source.timesheets.push(hourly(&token, 12, 1, 10.0, 30.0));
            source.expenses.push(expense(&token, 5, 1, 50.0));
            source.studio.push(studio(&token, 8, "card", 100.0));
        }
        source.failing = failing.iter().map(|m| m.to_string()).collect();
        source
    }

    #[actix_web::test]
    async fn one_failed_month_does_not_blank_the_series() {
        let source = seeded_year(&["2024-07"]);
        let anchor = month_range("2024-12").unwrap();

        let trend = monthly_trend(&source, &anchor, 12).await;

        assert_eq!(trend.len(), 12);
        assert_eq!(trend[6].month, "2024-07");
        assert!(!trend[6].complete);
        assert_eq!(trend[6].profit_loss, ProfitLoss::default());

        for (i, point) in trend.iter().enumerate().filter(|(i, _)| *i != 6) {
            assert!(point.complete, "month {i} should be complete");
            assert_eq!(point.month, format!("2024-{:02}", i + 1));
            assert_eq!(point.profit_loss.company_income, 1000.0);
            assert_eq!(point.profit_loss.employee_salaries, 300.0);
            assert_eq!(point.profit_loss.net_profit, 550.0);
        }
    }

    #[actix_web::test]
    async fn trend_spans_year_boundary_oldest_first() {
        let source = seeded_year(&[]);
        let anchor = month_range("2025-02").unwrap();

        let trend = monthly_trend(&source, &anchor, 12).await;

        assert_eq!(trend.first().unwrap().month, "2024-03");
        assert_eq!(trend.last().unwrap().month, "2025-02");
        // No 2025 fixtures: those months are complete but empty.
        assert!(trend.last().unwrap().complete);
        assert_eq!(trend.last().unwrap().profit_loss.net_profit, 0.0);
        assert_eq!(trend[0].profit_loss.net_profit, 550.0);
    }

    #[actix_web::test]
    async fn long_window_keeps_few_months_in_flight() {
        let source = InFlightSource {
            inner: seeded_year(&[]),
            ..Default::default()
        };
        let anchor = month_range("2024-12").unwrap();

        let trend = monthly_trend(&source, &anchor, 36).await;

        assert_eq!(trend.len(), 36);
        assert_eq!(trend[35].profit_loss.net_profit, 550.0);
        assert!(source.peak.get() >= 1);
        assert!(source.peak.get() <= TREND_CONCURRENCY);
        assert_eq!(source.in_flight.get(), 0);
    }
}
