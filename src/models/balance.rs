use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Commission withheld from a mitra on order acceptance, percent of the
/// order price. Fixed platform-wide.
pub const COMMISSION_RATE_PERCENT: i64 = 20;

/// The top-up menu, integer rupiah.
pub const TOPUP_AMOUNTS: [i64; 5] = [50_000, 100_000, 200_000, 500_000, 1_000_000];

pub fn commission_for(total_price: i64) -> i64 {
    total_price * COMMISSION_RATE_PERCENT / 100
}

pub fn is_valid_topup_amount(amount: i64) -> bool {
    TOPUP_AMOUNTS.contains(&amount)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Topup,
    Commission,
    Voucher,
}

/// Append-only ledger row (`balance_transactions`). Amounts are signed:
/// credits positive, the commission debit negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceTransaction {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: i64,
    pub description: Option<String>,
    pub order_id: Option<Uuid>,
    pub voucher_id: Option<Uuid>,
    pub created_at: Option<String>,
}

/// Insert shape for the ledger; `id`/`created_at` are store defaults.
#[derive(Debug, Serialize)]
pub struct NewBalanceTransaction {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub amount: i64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_id: Option<Uuid>,
}
