use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{AUTHORIZATION, HeaderMap},
    web::Data,
};
use serde_json::json;
use tracing::debug;

/// Pulls the token out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header encoding")?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or("Authorization header must start with Bearer")
}

fn reject(req: ServiceRequest, body: serde_json::Value) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(body);
    req.into_response(resp.map_into_boxed_body())
}

/// Verifies the bearer token and stores the caller as [`AuthUser`] in the
/// request extensions. Requests without a valid token never reach a handler.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let verified = bearer_token(req.headers())
        .map_err(|reason| json!({ "message": reason }))
        .and_then(|token| {
            verify_token(token, &config.jwt_secret).map_err(|e| {
                debug!(error = %e, "Rejected bearer token");
                json!({ "message": "Invalid or expired token", "details": e })
            })
        });

    let claims = match verified {
        Ok(claims) => claims,
        Err(body) => return Ok(reject(req, body)),
    };

    let user = AuthUser {
        user_id: claims.user_id,
        email: claims.sub,
        role: claims.role,
    };
    debug!(user_id = user.user_id, email = %user.email, role = %user.role, "Authenticated request");
    req.extensions_mut().insert(user);

    next.call(req).await
}
