use thiserror::Error;
use uuid::Uuid;

use crate::models::balance::{BalanceTransaction, NewBalanceTransaction, TransactionType};
use crate::repositories::balance_repo::{self, BalanceWriteError};
use crate::repositories::store::{StoreError, SupabaseStore, eq};

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("balance row missing")]
    ProfileMissing,
    #[error("balance update lost to concurrent writers")]
    Contention,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BalanceWriteError> for BalanceError {
    fn from(e: BalanceWriteError) -> Self {
        match e {
            BalanceWriteError::Missing => BalanceError::ProfileMissing,
            BalanceWriteError::Contention => BalanceError::Contention,
            BalanceWriteError::Store(e) => BalanceError::Store(e),
            // Top-ups only credit; a debit guard here means a corrupted
            // delta and is reported as contention-class failure.
            BalanceWriteError::Insufficient { .. } => BalanceError::Contention,
        }
    }
}

#[derive(Clone)]
pub struct BalanceService {
    store: SupabaseStore,
}

impl BalanceService {
    pub fn new(store: SupabaseStore) -> Self {
        Self { store }
    }

    /// Credit a top-up and append its ledger row. Unconditional credit: no
    /// payment gateway sits behind this, the amount menu is validated at the
    /// handler. Returns the new balance.
    pub async fn top_up(&self, user_id: Uuid, amount: i64) -> Result<i64, BalanceError> {
        let balance =
            balance_repo::adjust_balance(&self.store, "user_profiles", "user_id", user_id, amount)
                .await?;

        let ledger = NewBalanceTransaction {
            user_id,
            tx_type: TransactionType::Topup,
            amount,
            description: "Balance top up".to_string(),
            order_id: None,
            voucher_id: None,
        };
        if let Err(e) = balance_repo::append_ledger(&self.store, &ledger).await {
            if let Err(debit_err) =
                balance_repo::adjust_balance(&self.store, "user_profiles", "user_id", user_id, -amount)
                    .await
            {
                log::error!(
                    "top-up ledger failed and compensation failed for {}: {}",
                    user_id,
                    debit_err
                );
            }
            return Err(BalanceError::Store(e));
        }

        Ok(balance)
    }

    /// Own ledger, newest first.
    pub async fn list_transactions(&self, user_id: Uuid) -> Result<Vec<BalanceTransaction>, StoreError> {
        self.store
            .select(
                "balance_transactions",
                &[("user_id", eq(user_id)), ("order", "created_at.desc".to_string())],
            )
            .await
    }
}
