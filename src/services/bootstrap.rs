use serde_json::json;

use crate::config::AppConfig;
use crate::models::profile::Profile;
use crate::repositories::store::{SupabaseStore, eq};

/// Provision the seed admin account when none exists yet. Credentials come
/// from the environment; without them the bootstrap is skipped. Best-effort:
/// every failure is logged and swallowed so startup never blocks on it.
pub async fn ensure_default_admin(store: &SupabaseStore, config: &AppConfig) {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        log::debug!("admin bootstrap skipped: no seed credentials configured");
        return;
    };

    let existing = match store
        .maybe_one::<Profile>("profiles", &[("role", eq("admin"))])
        .await
    {
        Ok(existing) => existing,
        Err(e) => {
            log::warn!("admin bootstrap skipped: admin lookup failed: {}", e);
            return;
        }
    };
    if existing.is_some() {
        return;
    }

    let user = match store
        .sign_up(email, password, json!({ "full_name": "GetLife Admin", "role": "admin" }))
        .await
    {
        Ok(user) => user,
        Err(e) => {
            log::warn!("admin bootstrap failed at signup: {}", e);
            return;
        }
    };

    let patched: Result<Vec<Profile>, _> = store
        .update(
            "profiles",
            &[("id", eq(user.id))],
            &json!({ "role": "admin", "full_name": "GetLife Admin" }),
        )
        .await;
    match patched {
        Ok(rows) if rows.is_empty() => {
            let inserted: Result<Profile, _> = store
                .insert(
                    "profiles",
                    &json!({ "id": user.id, "role": "admin", "full_name": "GetLife Admin" }),
                )
                .await;
            if let Err(e) = inserted {
                log::warn!("admin bootstrap failed to create profile: {}", e);
                return;
            }
        }
        Ok(_) => {}
        Err(e) => {
            log::warn!("admin bootstrap failed to promote profile: {}", e);
            return;
        }
    }

    log::info!("seed admin account provisioned");
}
