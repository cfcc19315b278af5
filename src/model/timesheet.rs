use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::round_cents;
use crate::error::AppError;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, sqlx::Type, Display,
    EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkType {
    Hourly,
    Job,
}

/// The inputs that determine what an entry pays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayBasis {
    pub work_type: WorkType,
    pub hours: Option<f64>,
    pub hourly_rate: Option<f64>,
    pub job_count: Option<u32>,
    pub job_rate: Option<f64>,
}

impl PayBasis {
    /// `hours * hourly_rate` for hourly work, `job_count * job_rate` for jobs.
    /// Missing inputs count as zero.
    pub fn salary(&self) -> f64 {
        let raw = match self.work_type {
            WorkType::Hourly => self.hours.unwrap_or(0.0) * self.hourly_rate.unwrap_or(0.0),
            WorkType::Job => f64::from(self.job_count.unwrap_or(0)) * self.job_rate.unwrap_or(0.0),
        };
        round_cents(raw)
    }

    /// Checks the fields the work type needs and returns the salary they produce.
    pub fn validated_salary(&self) -> Result<f64, AppError> {
        fn positive(value: Option<f64>, field: &str) -> Result<(), AppError> {
            match value {
                Some(v) if v.is_finite() && v > 0.0 => Ok(()),
                Some(_) => Err(AppError::validation(format!("{field} must be greater than zero"))),
                None => Err(AppError::validation(format!("{field} is required"))),
            }
        }

        match self.work_type {
            WorkType::Hourly => {
                positive(self.hours, "hours")?;
                positive(self.hourly_rate, "hourly_rate")?;
            }
            WorkType::Job => {
                positive(self.job_count.map(f64::from), "job_count")?;
                positive(self.job_rate, "job_rate")?;
            }
        }

        Ok(self.salary())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 10,
    "user_id": 3,
    "date": "2024-02-12",
    "work_type": "hourly",
    "job_description": "Retouching, wedding set",
    "hours": 6.5,
    "hourly_rate": 20.0,
    "job_count": null,
    "job_rate": null,
    "start_time": "09:00:00",
    "end_time": "15:30:00",
    "total_salary": 130.0
}))]
pub struct TimesheetEntry {
    pub id: u64,
    pub user_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub work_type: WorkType,
    pub job_description: String,
    pub hours: Option<f64>,
    pub hourly_rate: Option<f64>,
    pub job_count: Option<u32>,
    pub job_rate: Option<f64>,
    #[schema(value_type = Option<String>, format = "time")]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, format = "time")]
    pub end_time: Option<NaiveTime>,
    /// Stored copy written by the server at create/update time.
    pub total_salary: f64,
}

impl TimesheetEntry {
    pub fn pay_basis(&self) -> PayBasis {
        PayBasis {
            work_type: self.work_type,
            hours: self.hours,
            hourly_rate: self.hourly_rate,
            job_count: self.job_count,
            job_rate: self.job_rate,
        }
    }

    /// Salary derived from the pay inputs; reports use this instead of the
    /// stored `total_salary`.
    pub fn salary(&self) -> f64 {
        self.pay_basis().salary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly(hours: f64, rate: f64) -> PayBasis {
        PayBasis {
            work_type: WorkType::Hourly,
            hours: Some(hours),
            hourly_rate: Some(rate),
            job_count: None,
            job_rate: None,
        }
    }

    #[test]
    fn hourly_salary_is_hours_times_rate() {
        assert_eq!(hourly(6.5, 20.0).salary(), 130.0);
    }

    #[test]
    fn job_salary_ignores_hours() {
        let basis = PayBasis {
            work_type: WorkType::Job,
            hours: Some(99.0),
            hourly_rate: Some(99.0),
            job_count: Some(3),
            job_rate: Some(45.0),
        };
        assert_eq!(basis.salary(), 135.0);
    }

    #[test]
    fn salary_rounds_to_cents() {
        assert_eq!(hourly(1.0 / 3.0, 10.0).salary(), 3.33);
    }

    #[test]
    fn validation_requires_fields_of_the_work_type() {
        let missing_rate = PayBasis {
            hourly_rate: None,
            ..hourly(2.0, 1.0)
        };
        assert!(missing_rate.validated_salary().is_err());
        assert!(hourly(0.0, 10.0).validated_salary().is_err());
        assert!(hourly(-1.0, 10.0).validated_salary().is_err());

        let job_without_count = PayBasis {
            work_type: WorkType::Job,
            job_count: None,
            job_rate: Some(10.0),
            ..hourly(2.0, 1.0)
        };
        assert!(job_without_count.validated_salary().is_err());
        assert_eq!(hourly(2.0, 15.0).validated_salary().unwrap(), 30.0);
    }

    #[test]
    fn work_type_round_trips_through_text() {
        assert_eq!(WorkType::Hourly.to_string(), "hourly");
        assert_eq!("job".parse::<WorkType>().unwrap(), WorkType::Job);
    }
}
