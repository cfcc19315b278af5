use crate::{error::AppError, model::profile::Role};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// The caller, as established by the bearer-token middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or(AppError::Unauthorized("Missing token")),
        )
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin only"))
        }
    }

    /// Employee filter for list and report queries: admins may pick any
    /// employee (or none for everyone), staff always get their own rows.
    pub fn employee_scope(&self, requested: Option<u64>) -> Option<u64> {
        if self.is_admin() {
            requested
        } else {
            Some(self.user_id)
        }
    }

    /// Staff may only touch rows they own.
    pub fn require_owner(&self, owner_id: u64) -> Result<(), AppError> {
        if self.is_admin() || self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::Forbidden("Not your record"))
        }
    }
}
