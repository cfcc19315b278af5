use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::{require_text, to_patch};
use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::profile::{Profile, Role},
    repo::{MySqlRecords, Table},
};

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateProfile {
    #[schema(example = "Jane Doe")]
    pub full_name: Option<String>,
    pub role: Option<Role>,
}

impl UpdateProfile {
    /// An admin demoting themselves would lock the last admin out.
    pub fn validate(&self, auth: &AuthUser, target_id: u64) -> Result<(), AppError> {
        if let Some(name) = &self.full_name {
            require_text(name, "full_name")?;
        }
        if target_id == auth.user_id && self.role == Some(Role::Staff) {
            return Err(AppError::validation("Admins cannot demote themselves"));
        }
        Ok(())
    }
}

#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "The caller's profile", body = Profile),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn me(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
) -> actix_web::Result<impl Responder> {
    let profile: Profile = records.get(Table::Profiles, auth.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    get,
    path = "/api/profiles",
    responses(
        (status = 200, description = "Every profile", body = [Profile]),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn list_profiles(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let profiles: Vec<Profile> = records.list(Table::Profiles).await?;

    Ok(HttpResponse::Ok().json(profiles))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{id}",
    params(("id", Path, description = "Profile ID")),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = Profile),
        (status = 400, description = "Invalid update"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn update_profile(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
    body: web::Json<UpdateProfile>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();
    body.validate(&auth, id)?;

    if !records.update(Table::Profiles, id, &to_patch(&*body)?).await? {
        return Err(AppError::NotFound(Table::Profiles.label()).into());
    }
    let profile: Profile = records.get(Table::Profiles, id).await?;

    info!(id, name = %profile.display_name(), role = %profile.role, "Profile updated");
    Ok(HttpResponse::Ok().json(profile))
}
