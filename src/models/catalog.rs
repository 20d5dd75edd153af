use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry (`services`), read-only from this side of the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub base_price: i64,
    pub duration_minutes: i64,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: Option<String>,
}

/// Marketing carousel entry (`banners`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub order_index: i64,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: Option<String>,
}
