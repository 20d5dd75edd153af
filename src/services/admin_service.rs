use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::dtos::verification_dtos::AdminStatsOut;
use crate::models::profile::{Profile, Role};
use crate::repositories::store::{StoreError, SupabaseStore, eq};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("profile not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct AdminService {
    store: SupabaseStore,
}

impl AdminService {
    pub fn new(store: SupabaseStore) -> Self {
        Self { store }
    }

    /// Headline numbers for the admin dashboard. Revenue is the absolute sum
    /// of commission ledger rows.
    pub async fn stats(&self) -> Result<AdminStatsOut, StoreError> {
        let total_users = self
            .store
            .count("profiles", &[("role", eq(Role::User.as_str()))])
            .await?;
        let total_mitra = self
            .store
            .count(
                "profiles",
                &[("role", eq(Role::Mitra.as_str())), ("is_verified", eq(true))],
            )
            .await?;
        let total_orders = self.store.count("orders", &[]).await?;

        #[derive(serde::Deserialize)]
        struct AmountRow {
            amount: i64,
        }
        let commissions: Vec<AmountRow> = self
            .store
            .select(
                "balance_transactions",
                &[("type", eq("commission")), ("select", "amount".to_string())],
            )
            .await?;
        let total_revenue = commissions.iter().map(|row| row.amount.abs()).sum();

        Ok(AdminStatsOut {
            total_users,
            total_mitra,
            total_orders,
            total_revenue,
        })
    }

    /// Block or unblock an account. The role router turns the flag into the
    /// blocked screen on the account's next resolution.
    pub async fn set_blocked(&self, target_id: Uuid, blocked: bool) -> Result<Profile, AdminError> {
        let rows: Vec<Profile> = self
            .store
            .update("profiles", &[("id", eq(target_id))], &json!({ "is_blocked": blocked }))
            .await?;
        rows.into_iter().next().ok_or(AdminError::NotFound)
    }
}
