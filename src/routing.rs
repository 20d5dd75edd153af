use serde::Serialize;

use crate::models::profile::{Profile, Role};

/// Where the client should land after session resolution. Serialized as the
/// `next_step` field of auth/session responses, and enforced server-side by
/// [`require_dashboard`] on every dashboard endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppRoute {
    Auth,
    Blocked,
    PendingVerification,
    InvalidRole,
    UserDashboard,
    MitraDashboard,
    AdminDashboard,
}

/// Resolve the route for a resolved-or-absent profile.
///
/// Precedence: no profile, then blocked, then unverified mitra, then
/// unknown role, then the role's dashboard. A blocked partner sees the
/// blocked screen, never "pending verification".
pub fn resolve(profile: Option<&Profile>) -> AppRoute {
    let Some(profile) = profile else {
        return AppRoute::Auth;
    };

    if profile.is_blocked {
        return AppRoute::Blocked;
    }

    match profile.role() {
        Some(Role::Mitra) if !profile.is_verified => AppRoute::PendingVerification,
        Some(Role::Mitra) => AppRoute::MitraDashboard,
        Some(Role::Admin) => AppRoute::AdminDashboard,
        Some(Role::User) => AppRoute::UserDashboard,
        None => AppRoute::InvalidRole,
    }
}

pub fn dashboard_for(role: Role) -> AppRoute {
    match role {
        Role::User => AppRoute::UserDashboard,
        Role::Mitra => AppRoute::MitraDashboard,
        Role::Admin => AppRoute::AdminDashboard,
    }
}

/// Gate for role-scoped endpoints: the profile must currently resolve to
/// exactly the dashboard of `role`. Blocked, unverified and mis-roled
/// profiles all fail closed.
pub fn require_dashboard(profile: &Profile, role: Role) -> Result<(), AppRoute> {
    let route = resolve(Some(profile));
    if route == dashboard_for(role) {
        Ok(())
    } else {
        Err(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile(role: &str, is_verified: bool, is_blocked: bool) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            full_name: Some("Tester".into()),
            phone: None,
            role: role.into(),
            is_verified,
            is_blocked,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn no_profile_routes_to_auth() {
        assert_eq!(resolve(None), AppRoute::Auth);
    }

    #[test]
    fn unknown_role_never_reaches_a_dashboard() {
        for role in ["superuser", "", "USER", "moderator"] {
            assert_eq!(resolve(Some(&profile(role, true, false))), AppRoute::InvalidRole);
        }
    }

    #[test]
    fn unverified_mitra_is_held_at_pending() {
        assert_eq!(
            resolve(Some(&profile("mitra", false, false))),
            AppRoute::PendingVerification
        );
        assert_eq!(resolve(Some(&profile("mitra", true, false))), AppRoute::MitraDashboard);
    }

    #[test]
    fn blocked_wins_over_everything_for_all_roles() {
        for role in ["user", "mitra", "admin", "garbage"] {
            assert_eq!(resolve(Some(&profile(role, true, true))), AppRoute::Blocked);
        }
        // Blocked AND unverified: blocked takes precedence.
        assert_eq!(resolve(Some(&profile("mitra", false, true))), AppRoute::Blocked);
    }

    #[test]
    fn verified_roles_reach_their_own_dashboard() {
        assert_eq!(resolve(Some(&profile("user", false, false))), AppRoute::UserDashboard);
        assert_eq!(resolve(Some(&profile("admin", false, false))), AppRoute::AdminDashboard);
    }

    #[test]
    fn cross_role_access_is_denied() {
        let user = profile("user", false, false);
        assert!(require_dashboard(&user, Role::User).is_ok());
        assert_eq!(require_dashboard(&user, Role::Admin), Err(AppRoute::UserDashboard));
        assert_eq!(require_dashboard(&user, Role::Mitra), Err(AppRoute::UserDashboard));

        let pending = profile("mitra", false, false);
        assert_eq!(
            require_dashboard(&pending, Role::Mitra),
            Err(AppRoute::PendingVerification)
        );

        let blocked = profile("admin", true, true);
        assert_eq!(require_dashboard(&blocked, Role::Admin), Err(AppRoute::Blocked));
    }
}
