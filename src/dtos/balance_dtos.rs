use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct TopUpIn {
    pub amount: i64,
}

#[derive(Serialize)]
pub struct TopUpOut {
    pub balance: i64,
}
