use serde::Deserialize;
use uuid::Uuid;

use crate::models::order::PaymentMethod;

#[derive(Deserialize)]
pub struct CreateOrderIn {
    pub service_id: Uuid,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Best-effort device coordinates; absent when the client could not
    /// resolve a location.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Deserialize)]
pub struct RateOrderIn {
    pub rating: i64,
    pub review: Option<String>,
}

#[derive(Deserialize)]
pub struct SetActiveIn {
    pub is_active: bool,
}
