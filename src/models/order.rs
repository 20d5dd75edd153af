use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Balance,
    Cash,
}

/// Row of `orders`. Price and duration are copies taken from the service
/// catalog at booking time, not live references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub mitra_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub service_name: String,
    pub total_price: i64,
    pub duration_minutes: i64,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub payment_method: String,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub rating: Option<i64>,
    pub review: Option<String>,
    pub created_at: Option<String>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

/// Insert shape for a new booking; status defaults to `pending` and no
/// mitra is bound yet.
#[derive(Debug, Serialize)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub service_name: String,
    pub total_price: i64,
    pub duration_minutes: i64,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}
