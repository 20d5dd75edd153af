use crate::models::catalog::{Banner, Service};
use crate::repositories::store::{StoreError, SupabaseStore, eq};

#[derive(Clone)]
pub struct CatalogService {
    store: SupabaseStore,
}

impl CatalogService {
    pub fn new(store: SupabaseStore) -> Self {
        Self { store }
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, StoreError> {
        self.store
            .select(
                "services",
                &[("is_active", eq(true)), ("order", "name.asc".to_string())],
            )
            .await
    }

    pub async fn list_banners(&self) -> Result<Vec<Banner>, StoreError> {
        self.store
            .select(
                "banners",
                &[("is_active", eq(true)), ("order", "order_index.asc".to_string())],
            )
            .await
    }
}
