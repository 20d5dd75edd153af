use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct SendMessageIn {
    pub receiver_id: Uuid,
    pub order_id: Option<Uuid>,
    pub message: String,
}

#[derive(Deserialize)]
pub struct ThreadQuery {
    pub order_id: Option<Uuid>,
}
