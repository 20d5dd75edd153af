use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::dtos::order_dtos::CreateOrderIn;
use crate::models::balance::{NewBalanceTransaction, TransactionType, commission_for};
use crate::models::catalog::Service;
use crate::models::order::{NewOrder, Order, OrderStatus};
use crate::models::profile::MitraProfile;
use crate::repositories::balance_repo::{self, BalanceWriteError};
use crate::repositories::store::{StoreError, SupabaseStore, eq};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("service not found or inactive")]
    ServiceNotFound,
    #[error("order not found")]
    NotFound,
    #[error("order is no longer available")]
    NotAvailable,
    #[error("insufficient balance for commission of {required}")]
    InsufficientBalance { required: i64 },
    #[error("balance update lost to concurrent writers")]
    Contention,
    #[error("rating must be between 1 and 5")]
    InvalidRating,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BalanceWriteError> for OrderError {
    fn from(e: BalanceWriteError) -> Self {
        match e {
            BalanceWriteError::Insufficient { required, .. } => {
                OrderError::InsufficientBalance { required }
            }
            BalanceWriteError::Contention => OrderError::Contention,
            BalanceWriteError::Missing => OrderError::Store(StoreError::NotFound),
            BalanceWriteError::Store(e) => OrderError::Store(e),
        }
    }
}

#[derive(Clone)]
pub struct OrderService {
    store: SupabaseStore,
}

impl OrderService {
    pub fn new(store: SupabaseStore) -> Self {
        Self { store }
    }

    /// Book a service. Price and duration are copied from the catalog row as
    /// it stands at submit time. No payment is captured here for either
    /// payment method; balance debiting happens in the partner commission
    /// flow only.
    pub async fn create_order(&self, user_id: Uuid, input: CreateOrderIn) -> Result<Order, OrderError> {
        let service: Service = self
            .store
            .maybe_one("services", &[("id", eq(input.service_id)), ("is_active", eq(true))])
            .await?
            .ok_or(OrderError::ServiceNotFound)?;

        let order: Order = self
            .store
            .insert(
                "orders",
                &NewOrder {
                    user_id,
                    service_id: service.id,
                    service_name: service.name,
                    total_price: service.base_price,
                    duration_minutes: service.duration_minutes,
                    scheduled_date: input.scheduled_date,
                    scheduled_time: input.scheduled_time,
                    address: input.address,
                    latitude: input.latitude,
                    longitude: input.longitude,
                    payment_method: input.payment_method,
                    notes: input.notes,
                },
            )
            .await?;
        Ok(order)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        self.store
            .select(
                "orders",
                &[("user_id", eq(user_id)), ("order", "created_at.desc".to_string())],
            )
            .await
    }

    /// Partner feed: own orders plus the unassigned pending pool.
    pub async fn list_for_mitra(&self, mitra_id: Uuid) -> Result<Vec<Order>, StoreError> {
        self.store
            .select(
                "orders",
                &[
                    (
                        "or",
                        format!(
                            "(mitra_id.eq.{},and(status.eq.pending,mitra_id.is.null))",
                            mitra_id
                        ),
                    ),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }

    /// Accept a pending order, withholding the platform commission from the
    /// partner's balance. Guard first (no writes on insufficient balance),
    /// then: conditional accept, balance debit, ledger row. Each later
    /// failure compensates the earlier writes so the order either lands
    /// fully accepted-and-charged or not at all.
    pub async fn accept_order(&self, mitra_id: Uuid, order_id: Uuid) -> Result<(Order, i64), OrderError> {
        let order: Order = self
            .store
            .maybe_one("orders", &[("id", eq(order_id))])
            .await?
            .ok_or(OrderError::NotFound)?;
        if order.status.as_deref() != Some(OrderStatus::Pending.as_str()) {
            return Err(OrderError::NotAvailable);
        }

        let commission = commission_for(order.total_price);
        let mitra: MitraProfile = self
            .store
            .select_one("mitra_profiles", &[("mitra_id", eq(mitra_id))])
            .await?;
        if mitra.balance < commission {
            return Err(OrderError::InsufficientBalance { required: commission });
        }

        // Single winner: the status guard makes a concurrent accept match
        // zero rows for everyone but the first.
        let accepted: Vec<Order> = self
            .store
            .update(
                "orders",
                &[("id", eq(order_id)), ("status", eq(OrderStatus::Pending.as_str()))],
                &json!({ "status": OrderStatus::Accepted.as_str(), "mitra_id": mitra_id }),
            )
            .await?;
        let Some(accepted) = accepted.into_iter().next() else {
            return Err(OrderError::NotAvailable);
        };

        if let Err(e) =
            balance_repo::adjust_balance(&self.store, "mitra_profiles", "mitra_id", mitra_id, -commission)
                .await
        {
            self.revert_accept(order_id, mitra_id).await;
            return Err(e.into());
        }

        let ledger = NewBalanceTransaction {
            user_id: mitra_id,
            tx_type: TransactionType::Commission,
            amount: -commission,
            description: "Service commission fee".to_string(),
            order_id: Some(order_id),
            voucher_id: None,
        };
        if let Err(e) = balance_repo::append_ledger(&self.store, &ledger).await {
            if let Err(credit_err) =
                balance_repo::adjust_balance(&self.store, "mitra_profiles", "mitra_id", mitra_id, commission)
                    .await
            {
                log::error!(
                    "commission ledger failed and re-credit failed for order {}: {}",
                    order_id,
                    credit_err
                );
            }
            self.revert_accept(order_id, mitra_id).await;
            return Err(OrderError::Store(e));
        }

        Ok((accepted, commission))
    }

    async fn revert_accept(&self, order_id: Uuid, mitra_id: Uuid) {
        let result: Result<Vec<Order>, StoreError> = self
            .store
            .update(
                "orders",
                &[
                    ("id", eq(order_id)),
                    ("status", eq(OrderStatus::Accepted.as_str())),
                    ("mitra_id", eq(mitra_id)),
                ],
                &json!({ "status": OrderStatus::Pending.as_str(), "mitra_id": null }),
            )
            .await;
        if let Err(e) = result {
            log::error!("failed to revert acceptance of order {}: {}", order_id, e);
        }
    }

    pub async fn start_order(&self, mitra_id: Uuid, order_id: Uuid) -> Result<Order, OrderError> {
        self.transition(
            mitra_id,
            order_id,
            OrderStatus::Accepted,
            json!({
                "status": OrderStatus::InProgress.as_str(),
                "started_at": chrono::Utc::now().to_rfc3339(),
            }),
        )
        .await
    }

    pub async fn complete_order(&self, mitra_id: Uuid, order_id: Uuid) -> Result<Order, OrderError> {
        self.transition(
            mitra_id,
            order_id,
            OrderStatus::InProgress,
            json!({
                "status": OrderStatus::Completed.as_str(),
                "completed_at": chrono::Utc::now().to_rfc3339(),
            }),
        )
        .await
    }

    async fn transition(
        &self,
        mitra_id: Uuid,
        order_id: Uuid,
        from: OrderStatus,
        patch: serde_json::Value,
    ) -> Result<Order, OrderError> {
        let rows: Vec<Order> = self
            .store
            .update(
                "orders",
                &[
                    ("id", eq(order_id)),
                    ("mitra_id", eq(mitra_id)),
                    ("status", eq(from.as_str())),
                ],
                &patch,
            )
            .await?;
        rows.into_iter().next().ok_or(OrderError::NotAvailable)
    }

    /// Rate an own, completed order.
    pub async fn rate_order(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        rating: i64,
        review: Option<String>,
    ) -> Result<Order, OrderError> {
        if !(1..=5).contains(&rating) {
            return Err(OrderError::InvalidRating);
        }
        let rows: Vec<Order> = self
            .store
            .update(
                "orders",
                &[
                    ("id", eq(order_id)),
                    ("user_id", eq(user_id)),
                    ("status", eq(OrderStatus::Completed.as_str())),
                ],
                &json!({ "rating": rating, "review": review }),
            )
            .await?;
        rows.into_iter().next().ok_or(OrderError::NotFound)
    }

    pub async fn set_active(&self, mitra_id: Uuid, is_active: bool) -> Result<MitraProfile, OrderError> {
        let rows: Vec<MitraProfile> = self
            .store
            .update(
                "mitra_profiles",
                &[("mitra_id", eq(mitra_id))],
                &json!({ "is_active": is_active }),
            )
            .await?;
        rows.into_iter().next().ok_or(OrderError::Store(StoreError::NotFound))
    }
}
