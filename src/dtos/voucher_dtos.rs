use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct RedeemIn {
    pub code: String,
}

#[derive(Serialize)]
pub struct RedeemOut {
    pub code: String,
    pub amount: i64,
    pub balance: i64,
}
