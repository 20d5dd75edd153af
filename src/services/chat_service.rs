use uuid::Uuid;

use crate::models::chat::{ChatMessage, NewChatMessage};
use crate::repositories::store::{StoreError, SupabaseStore, eq, is_null};

#[derive(Clone)]
pub struct ChatService {
    store: SupabaseStore,
}

impl ChatService {
    pub fn new(store: SupabaseStore) -> Self {
        Self { store }
    }

    /// Both directions of a two-party thread, oldest first. Without an order
    /// id the thread is the order-less one, not "any order".
    pub async fn list_thread(
        &self,
        self_id: Uuid,
        other_id: Uuid,
        order_id: Option<Uuid>,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let pair_filter = format!(
            "(and(sender_id.eq.{self_id},receiver_id.eq.{other_id}),and(sender_id.eq.{other_id},receiver_id.eq.{self_id}))"
        );
        let order_filter = match order_id {
            Some(id) => eq(id),
            None => is_null(),
        };
        self.store
            .select(
                "chat_messages",
                &[
                    ("or", pair_filter),
                    ("order_id", order_filter),
                    ("order", "created_at.asc".to_string()),
                ],
            )
            .await
    }

    /// Append one message. Messages start unread; no read-receipt flow
    /// updates them afterwards.
    pub async fn send(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        order_id: Option<Uuid>,
        message: &str,
    ) -> Result<ChatMessage, StoreError> {
        self.store
            .insert(
                "chat_messages",
                &NewChatMessage {
                    sender_id,
                    receiver_id,
                    order_id,
                    message: message.trim().to_string(),
                    is_read: false,
                },
            )
            .await
    }
}
