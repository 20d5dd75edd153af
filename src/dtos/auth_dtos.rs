use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::profile::{MitraProfile, Profile, UserProfile};
use crate::repositories::store::StoreSession;
use crate::routing::AppRoute;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignupRole {
    User,
    Mitra,
}

#[derive(Deserialize)]
pub struct SignupIn {
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
    pub full_name: String,
    pub role: SignupRole,
}

#[derive(Deserialize)]
pub struct LoginIn {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SignupOut {
    pub user_id: Uuid,
    pub next_step: AppRoute,
}

#[derive(Serialize)]
pub struct LoginOut {
    pub session: StoreSession,
    pub profile: Option<Profile>,
    pub next_step: AppRoute,
}

/// Result of one session resolution pass (`GET /auth/session`).
#[derive(Serialize)]
pub struct SessionStateOut {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub profile: Option<Profile>,
    pub next_step: AppRoute,
}

/// Own profile together with the role extension row.
#[derive(Serialize)]
pub struct ProfileOut {
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mitra_profile: Option<MitraProfile>,
}

#[derive(Deserialize)]
pub struct UpdateProfileIn {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    /// Only applied for role=user.
    pub address: Option<String>,
}
