use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::helpers::now_rfc3339;

pub const DEFAULT_PROFILE_PHOTO: &str = "default_profile_photo.jpg";

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub profile_photo: String,
    pub created_at: String,
}

/// The profile shape clients see. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub profile_photo: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            profile_photo: user.profile_photo,
        }
    }
}

impl User {
    pub fn new(username: String, password_hash: String, email: String) -> Self {
        Self {
            username,
            password_hash,
            email,
            profile_photo: DEFAULT_PROFILE_PHOTO.to_string(),
            created_at: now_rfc3339(),
        }
    }
}
