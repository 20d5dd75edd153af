use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::dtos::auth_dtos::{ProfileOut, SessionStateOut, SignupRole, UpdateProfileIn};
use crate::models::profile::{MitraProfile, Profile, Role, UserProfile};
use crate::repositories::store::{AuthUser, StoreError, StoreSession, SupabaseStore, eq};
use crate::routing::{self, AppRoute};

#[derive(Debug, Error)]
pub enum GateError {
    #[error("access denied")]
    Denied(AppRoute),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Session/profile resolver: owns the sign-up chain, sign-in/out, the
/// token → identity → profile resolution, and the role gates used by every
/// dashboard endpoint.
#[derive(Clone)]
pub struct AuthService {
    store: SupabaseStore,
}

impl AuthService {
    pub fn new(store: SupabaseStore) -> Self {
        Self { store }
    }

    /// Sign-up chain: identity first, then role + name onto the auto-created
    /// profile row, then the mitra extension row. A failure part-way leaves
    /// the earlier steps in place and surfaces the failing step's error;
    /// there is no rollback of the created identity.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: SignupRole,
    ) -> Result<Uuid, StoreError> {
        let role_str = match role {
            SignupRole::User => "user",
            SignupRole::Mitra => "mitra",
        };

        let user = self
            .store
            .sign_up(email, password, json!({ "full_name": full_name, "role": role_str }))
            .await?;

        let patched: Vec<Profile> = self
            .store
            .update(
                "profiles",
                &[("id", eq(user.id))],
                &json!({ "role": role_str, "full_name": full_name }),
            )
            .await?;
        if patched.is_empty() {
            // Deployment without the profile-on-signup trigger: create it.
            let _: Profile = self
                .store
                .insert(
                    "profiles",
                    &json!({ "id": user.id, "role": role_str, "full_name": full_name }),
                )
                .await?;
        }

        if role == SignupRole::Mitra {
            self.store
                .insert_only("mitra_profiles", &json!({ "mitra_id": user.id }))
                .await?;
        }

        Ok(user.id)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(StoreSession, AuthUser), StoreError> {
        self.store.sign_in(email, password).await
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), StoreError> {
        self.store.sign_out(access_token).await
    }

    /// Fetch the profile for an identity. Fetch failures resolve to `None`
    /// (the caller routes to the auth screen) rather than propagating; the
    /// error is logged at the call site of the store.
    pub async fn fetch_profile(&self, user_id: Uuid) -> Option<Profile> {
        match self
            .store
            .maybe_one::<Profile>("profiles", &[("id", eq(user_id))])
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                log::error!("profile fetch failed for {}: {}", user_id, e);
                None
            }
        }
    }

    /// One resolution pass: validate the token against the store, fetch the
    /// profile, compute the route. Always terminates in a definite route.
    pub async fn resolve_session(&self, access_token: &str) -> Result<SessionStateOut, StoreError> {
        let user = self.store.get_user(access_token).await?;
        let profile = self.fetch_profile(user.id).await;
        let next_step = routing::resolve(profile.as_ref());
        Ok(SessionStateOut {
            user_id: user.id,
            email: user.email,
            profile,
            next_step,
        })
    }

    /// Own profile plus the role extension row.
    pub async fn profile_overview(&self, user_id: Uuid) -> Result<ProfileOut, StoreError> {
        let profile: Profile = self
            .store
            .select_one("profiles", &[("id", eq(user_id))])
            .await?;

        let (user_profile, mitra_profile) = match profile.role() {
            Some(Role::User) => (
                self.store
                    .maybe_one::<UserProfile>("user_profiles", &[("user_id", eq(user_id))])
                    .await?,
                None,
            ),
            Some(Role::Mitra) => (
                None,
                self.store
                    .maybe_one::<MitraProfile>("mitra_profiles", &[("mitra_id", eq(user_id))])
                    .await?,
            ),
            _ => (None, None),
        };

        Ok(ProfileOut {
            profile,
            user_profile,
            mitra_profile,
        })
    }

    /// Self-service update of name/phone, plus the user-profile address for
    /// customers. Returns the refreshed overview.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: &UpdateProfileIn,
    ) -> Result<ProfileOut, StoreError> {
        let mut patch = serde_json::Map::new();
        if let Some(full_name) = &input.full_name {
            patch.insert("full_name".into(), json!(full_name));
        }
        if let Some(phone) = &input.phone {
            patch.insert("phone".into(), json!(phone));
        }
        if !patch.is_empty() {
            let _: Vec<Profile> = self
                .store
                .update("profiles", &[("id", eq(user_id))], &patch)
                .await?;
        }

        if let Some(address) = &input.address {
            let current = self.profile_overview(user_id).await?;
            if current.profile.role() == Some(Role::User) {
                let _: Vec<UserProfile> = self
                    .store
                    .update(
                        "user_profiles",
                        &[("user_id", eq(user_id))],
                        &json!({ "address": address }),
                    )
                    .await?;
            }
        }

        self.profile_overview(user_id).await
    }

    async fn load_profile(&self, user_id: Uuid) -> Result<Profile, GateError> {
        self.store
            .maybe_one::<Profile>("profiles", &[("id", eq(user_id))])
            .await?
            .ok_or(GateError::Denied(AppRoute::Auth))
    }

    /// Gate: the caller must currently resolve to the dashboard of `role`.
    pub async fn require_dashboard(&self, user_id: Uuid, role: Role) -> Result<Profile, GateError> {
        let profile = self.load_profile(user_id).await?;
        routing::require_dashboard(&profile, role).map_err(GateError::Denied)?;
        Ok(profile)
    }

    /// Gate for the verification flow: any non-blocked mitra, including one
    /// still waiting on verification.
    pub async fn require_mitra(&self, user_id: Uuid) -> Result<Profile, GateError> {
        let profile = self.load_profile(user_id).await?;
        match routing::resolve(Some(&profile)) {
            AppRoute::MitraDashboard | AppRoute::PendingVerification => Ok(profile),
            other => Err(GateError::Denied(other)),
        }
    }

    /// Gate for member-level endpoints (profile, chat, ledger): any
    /// existing, non-blocked profile.
    pub async fn require_member(&self, user_id: Uuid) -> Result<Profile, GateError> {
        let profile = self.load_profile(user_id).await?;
        match routing::resolve(Some(&profile)) {
            route @ (AppRoute::Blocked | AppRoute::InvalidRole) => Err(GateError::Denied(route)),
            _ => Ok(profile),
        }
    }
}
