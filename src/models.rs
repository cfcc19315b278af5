use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::profile::Role;

/// Bearer token claims. Tokens are issued by the identity provider in front of
/// this service; here they are only verified.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Email of the signed-in user
    pub sub: String,
    pub user_id: u64,
    pub role: Role,
    pub exp: usize,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Successfully deleted")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
