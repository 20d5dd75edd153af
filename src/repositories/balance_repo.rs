use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::balance::NewBalanceTransaction;
use crate::models::profile::{MitraProfile, UserProfile};
use crate::repositories::store::{StoreError, SupabaseStore, eq};

/// Upper bound on compare-and-swap retries for a balance write.
const CAS_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum BalanceWriteError {
    #[error("balance row missing")]
    Missing,
    #[error("insufficient balance: have {balance}, need {required}")]
    Insufficient { balance: i64, required: i64 },
    #[error("balance update lost to concurrent writers")]
    Contention,
    #[error(transparent)]
    Store(#[from] StoreError),
}

async fn read_balance(
    store: &SupabaseStore,
    table: &'static str,
    key_col: &'static str,
    id: Uuid,
) -> Result<i64, BalanceWriteError> {
    let balance = match table {
        "mitra_profiles" => {
            store
                .maybe_one::<MitraProfile>(table, &[(key_col, eq(id))])
                .await?
                .map(|row| row.balance)
        }
        _ => {
            store
                .maybe_one::<UserProfile>(table, &[(key_col, eq(id))])
                .await?
                .map(|row| row.balance)
        }
    };
    balance.ok_or(BalanceWriteError::Missing)
}

/// Apply `delta` to a balance column as a compare-and-swap on the value we
/// last read: the update is filtered on `balance=eq.{seen}`, so a concurrent
/// writer makes it match zero rows and we re-read and retry. Returns the new
/// balance.
pub async fn adjust_balance(
    store: &SupabaseStore,
    table: &'static str,
    key_col: &'static str,
    id: Uuid,
    delta: i64,
) -> Result<i64, BalanceWriteError> {
    for _ in 0..CAS_ATTEMPTS {
        let seen = read_balance(store, table, key_col, id).await?;
        let next = seen + delta;
        if next < 0 {
            return Err(BalanceWriteError::Insufficient {
                balance: seen,
                required: -delta,
            });
        }

        let updated: Vec<serde_json::Value> = store
            .update(
                table,
                &[(key_col, eq(id)), ("balance", eq(seen))],
                &json!({ "balance": next }),
            )
            .await?;
        if !updated.is_empty() {
            return Ok(next);
        }
    }
    Err(BalanceWriteError::Contention)
}

/// Append one ledger row. The ledger is append-only; nothing in the service
/// ever updates or deletes `balance_transactions`.
pub async fn append_ledger(
    store: &SupabaseStore,
    tx: &NewBalanceTransaction,
) -> Result<(), StoreError> {
    store.insert_only("balance_transactions", tx).await
}
