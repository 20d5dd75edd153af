use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of `chat_messages`; append-only, `is_read` never updated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender_id: Option<Uuid>,
    pub receiver_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewChatMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    pub message: String,
    pub is_read: bool,
}
