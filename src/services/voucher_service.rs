use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::balance::{NewBalanceTransaction, TransactionType};
use crate::models::voucher::{NewVoucherUsage, Voucher, VoucherUsage, normalize_code};
use crate::repositories::balance_repo::{self, BalanceWriteError};
use crate::repositories::store::{StoreError, SupabaseStore, eq, gte};

#[derive(Debug, Error)]
pub enum VoucherError {
    #[error("voucher not found or expired")]
    NotFoundOrExpired,
    #[error("voucher already used")]
    AlreadyUsed,
    #[error("voucher usage limit reached")]
    LimitReached,
    #[error("balance row missing")]
    ProfileMissing,
    #[error("balance update lost to concurrent writers")]
    Contention,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BalanceWriteError> for VoucherError {
    fn from(e: BalanceWriteError) -> Self {
        match e {
            BalanceWriteError::Missing => VoucherError::ProfileMissing,
            BalanceWriteError::Contention | BalanceWriteError::Insufficient { .. } => {
                VoucherError::Contention
            }
            BalanceWriteError::Store(e) => VoucherError::Store(e),
        }
    }
}

pub struct Redemption {
    pub voucher: Voucher,
    pub balance: i64,
}

#[derive(Clone)]
pub struct VoucherService {
    store: SupabaseStore,
}

impl VoucherService {
    pub fn new(store: SupabaseStore) -> Self {
        Self { store }
    }

    fn today() -> String {
        Utc::now().date_naive().to_string()
    }

    /// Vouchers a user could still attempt: active and not past their
    /// validity date.
    pub async fn list_available(&self) -> Result<Vec<Voucher>, StoreError> {
        self.store
            .select(
                "vouchers",
                &[
                    ("is_active", eq(true)),
                    ("valid_until", gte(Self::today())),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }

    /// Redeem a code for the calling user. Failure order: unknown/expired,
    /// already-used, limit reached. The usage row is inserted before the
    /// credit so the store's unique (voucher, user) constraint — not the
    /// pre-check — is the single-use gate; a conflict there reads as
    /// already-used. Later failures compensate the earlier writes.
    pub async fn redeem(&self, user_id: Uuid, raw_code: &str) -> Result<Redemption, VoucherError> {
        let code = normalize_code(raw_code);

        let voucher: Voucher = self
            .store
            .maybe_one(
                "vouchers",
                &[
                    ("code", eq(&code)),
                    ("is_active", eq(true)),
                    ("valid_until", gte(Self::today())),
                ],
            )
            .await?
            .ok_or(VoucherError::NotFoundOrExpired)?;

        let prior: Option<VoucherUsage> = self
            .store
            .maybe_one(
                "voucher_usage",
                &[("voucher_id", eq(voucher.id)), ("user_id", eq(user_id))],
            )
            .await?;
        if prior.is_some() {
            return Err(VoucherError::AlreadyUsed);
        }

        if voucher.limit_reached() {
            return Err(VoucherError::LimitReached);
        }

        let usage = NewVoucherUsage {
            voucher_id: voucher.id,
            user_id,
            amount: voucher.amount,
        };
        match self.store.insert::<VoucherUsage>("voucher_usage", &usage).await {
            Ok(_) => {}
            Err(StoreError::Conflict) => return Err(VoucherError::AlreadyUsed),
            Err(e) => return Err(VoucherError::Store(e)),
        }

        let balance = match balance_repo::adjust_balance(
            &self.store,
            "user_profiles",
            "user_id",
            user_id,
            voucher.amount,
        )
        .await
        {
            Ok(balance) => balance,
            Err(e) => {
                self.remove_usage(voucher.id, user_id).await;
                return Err(e.into());
            }
        };

        if let Err(e) = self.bump_used_count(voucher.id).await {
            self.compensate_credit(user_id, voucher.amount).await;
            self.remove_usage(voucher.id, user_id).await;
            return Err(e);
        }

        let ledger = NewBalanceTransaction {
            user_id,
            tx_type: TransactionType::Voucher,
            amount: voucher.amount,
            description: format!("Voucher {} - {}", voucher.code, voucher.title),
            order_id: None,
            voucher_id: Some(voucher.id),
        };
        if let Err(e) = balance_repo::append_ledger(&self.store, &ledger).await {
            self.unbump_used_count(voucher.id).await;
            self.compensate_credit(user_id, voucher.amount).await;
            self.remove_usage(voucher.id, user_id).await;
            return Err(VoucherError::Store(e));
        }

        Ok(Redemption { voucher, balance })
    }

    /// Guarded increment of `used_count`, retried on concurrent bumps.
    async fn bump_used_count(&self, voucher_id: Uuid) -> Result<(), VoucherError> {
        for _ in 0..3 {
            let current: Voucher = self
                .store
                .select_one("vouchers", &[("id", eq(voucher_id))])
                .await?;
            if current.limit_reached() {
                return Err(VoucherError::LimitReached);
            }
            let rows: Vec<Voucher> = self
                .store
                .update(
                    "vouchers",
                    &[("id", eq(voucher_id)), ("used_count", eq(current.used_count))],
                    &json!({ "used_count": current.used_count + 1 }),
                )
                .await?;
            if !rows.is_empty() {
                return Ok(());
            }
        }
        Err(VoucherError::Contention)
    }

    async fn unbump_used_count(&self, voucher_id: Uuid) {
        for _ in 0..3 {
            let Ok(current) = self
                .store
                .select_one::<Voucher>("vouchers", &[("id", eq(voucher_id))])
                .await
            else {
                break;
            };
            let rows: Result<Vec<Voucher>, StoreError> = self
                .store
                .update(
                    "vouchers",
                    &[("id", eq(voucher_id)), ("used_count", eq(current.used_count))],
                    &json!({ "used_count": current.used_count - 1 }),
                )
                .await;
            match rows {
                Ok(rows) if !rows.is_empty() => return,
                Ok(_) => continue,
                Err(e) => {
                    log::error!("failed to revert used_count for voucher {}: {}", voucher_id, e);
                    return;
                }
            }
        }
        log::error!("gave up reverting used_count for voucher {}", voucher_id);
    }

    async fn compensate_credit(&self, user_id: Uuid, amount: i64) {
        if let Err(e) =
            balance_repo::adjust_balance(&self.store, "user_profiles", "user_id", user_id, -amount)
                .await
        {
            log::error!("failed to revert voucher credit for {}: {}", user_id, e);
        }
    }

    async fn remove_usage(&self, voucher_id: Uuid, user_id: Uuid) {
        if let Err(e) = self
            .store
            .delete(
                "voucher_usage",
                &[("voucher_id", eq(voucher_id)), ("user_id", eq(user_id))],
            )
            .await
        {
            log::error!(
                "failed to remove usage row for voucher {} / user {}: {}",
                voucher_id,
                user_id,
                e
            );
        }
    }
}
