use crate::{
    api::{
        company_income, expense, export, personal_expense, profile, report, storage,
        studio_expense, timesheet, vendor, vendor_bill,
    },
    auth::middleware::auth_middleware,
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::Context;
use std::sync::Arc;

/// Upper bound for uploaded receipts, invoices and payment slips.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let burst = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(burst)).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("invalid rate limiter settings")?;
    Ok(Arc::new(Governor::new(&cfg)))
}

/// Built once so every worker shares the same counters.
#[derive(Clone)]
pub struct Limiters {
    protected: Limiter,
    export: Limiter,
}

impl Limiters {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            protected: build_limiter(config.rate_protected_per_min)?,
            export: build_limiter(config.rate_export_per_min)?,
        })
    }
}

/// Malformed JSON, query strings and path segments come back as 400 with the
/// usual `{"message": ..}` body.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .app_data(
            web::JsonConfig::default()
                .error_handler(|err, _| AppError::validation(err.to_string()).into()),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _| AppError::validation(err.to_string()).into()),
        )
        .app_data(
            web::PathConfig::default()
                .error_handler(|err, _| AppError::validation(err.to_string()).into()),
        );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(limiters.protected.clone()) // rate limiting
            .service(web::resource("/me").route(web::get().to(profile::me)))
            .service(
                web::scope("/profiles")
                    .service(web::resource("").route(web::get().to(profile::list_profiles)))
                    .service(
                        web::resource("/{id}").route(web::put().to(profile::update_profile)),
                    ),
            )
            .service(
                web::scope("/timesheets")
                    // /timesheets
                    .service(
                        web::resource("")
                            .route(web::get().to(timesheet::list_timesheets))
                            .route(web::post().to(timesheet::create_timesheet)),
                    )
                    // /timesheets/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(timesheet::get_timesheet))
                            .route(web::put().to(timesheet::update_timesheet))
                            .route(web::delete().to(timesheet::delete_timesheet)),
                    ),
            )
            .service(
                web::scope("/expenses")
                    .service(
                        web::resource("")
                            .route(web::get().to(expense::list_expenses))
                            .route(web::post().to(expense::create_expense)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(expense::get_expense))
                            .route(web::put().to(expense::update_expense))
                            .route(web::delete().to(expense::delete_expense)),
                    ),
            )
            .service(
                web::scope("/income")
                    .service(
                        web::resource("")
                            .route(web::get().to(company_income::list_income))
                            .route(web::post().to(company_income::create_income)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(company_income::get_income))
                            .route(web::put().to(company_income::update_income))
                            .route(web::delete().to(company_income::delete_income)),
                    ),
            )
            .service(
                web::scope("/studio-expenses")
                    .service(
                        web::resource("")
                            .route(web::get().to(studio_expense::list_studio_expenses))
                            .route(web::post().to(studio_expense::create_studio_expense)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(studio_expense::update_studio_expense))
                            .route(web::delete().to(studio_expense::delete_studio_expense)),
                    ),
            )
            .service(
                web::scope("/personal-expenses")
                    .service(
                        web::resource("")
                            .route(web::get().to(personal_expense::list_personal_expenses))
                            .route(web::post().to(personal_expense::create_personal_expense)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(personal_expense::update_personal_expense))
                            .route(web::delete().to(personal_expense::delete_personal_expense)),
                    ),
            )
            .service(
                web::scope("/vendors").service(
                    web::resource("")
                        .route(web::get().to(vendor::list_vendors))
                        .route(web::post().to(vendor::create_vendor)),
                ),
            )
            .service(
                web::scope("/vendor-bills")
                    .service(
                        web::resource("")
                            .route(web::get().to(vendor_bill::list_vendor_bills))
                            .route(web::post().to(vendor_bill::create_vendor_bill)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(vendor_bill::update_vendor_bill))
                            .route(web::delete().to(vendor_bill::delete_vendor_bill)),
                    )
                    // /vendor-bills/{id}/pay
                    .service(
                        web::resource("/{id}/pay").route(web::put().to(vendor_bill::pay_vendor_bill)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .service(web::resource("/dashboard").route(web::get().to(report::dashboard)))
                    .service(web::resource("/statement").route(web::get().to(report::statement)))
                    .service(web::resource("/trend").route(web::get().to(report::trend))),
            )
            .service(
                web::resource("/export/{entity}")
                    .wrap(limiters.export.clone())
                    .route(web::get().to(export::export)),
            )
            .service(
                web::scope("/storage")
                    .service(web::resource("/{bucket}").route(web::post().to(storage::upload)))
                    .service(
                        web::resource("/{bucket}/{key:.*}").route(web::get().to(storage::download)),
                    ),
            ),
    );
}
