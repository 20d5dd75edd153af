use actix_web::{HttpResponse, Responder, post, web};
use uuid::Uuid;

use crate::dtos::ApiResponse;
use crate::dtos::order_dtos::SetActiveIn;
use crate::handlers::gate_failure;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::profile::Role;
use crate::services::auth_service::AuthService;
use crate::services::order_service::{OrderError, OrderService};

#[derive(serde::Serialize)]
struct AcceptedOrderOut {
    order: crate::models::order::Order,
    commission: i64,
}

/// POST /api/orders/{id}/accept
/// Accept a pending order; the platform commission is withheld from the
/// partner's balance, or the whole acceptance fails.
#[post("/api/orders/{id}/accept")]
pub async fn accept_order(
    auth: web::Data<AuthService>,
    svc: web::Data<OrderService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(e) = auth.require_dashboard(user.user_id, Role::Mitra).await {
        return gate_failure(e);
    }

    let order_id = path.into_inner();
    match svc.accept_order(user.user_id, order_id).await {
        Ok((order, commission)) => HttpResponse::Ok().json(ApiResponse::success(
            "Order accepted; the commission fee was deducted from your balance",
            AcceptedOrderOut { order, commission },
        )),
        Err(OrderError::InsufficientBalance { required }) => HttpResponse::BadRequest().json(
            ApiResponse::error(&format!(
                "Your balance does not cover the commission fee of {}",
                required
            )),
        ),
        Err(OrderError::NotFound) => {
            HttpResponse::NotFound().json(ApiResponse::error("Order not found"))
        }
        Err(OrderError::NotAvailable) => {
            HttpResponse::Conflict().json(ApiResponse::error("Order is no longer available"))
        }
        Err(OrderError::Contention) => HttpResponse::Conflict()
            .json(ApiResponse::error("Balance changed concurrently. Please try again.")),
        Err(e) => {
            log::error!("accept failed for order {}: {}", order_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to accept order"))
        }
    }
}

/// POST /api/orders/{id}/start
#[post("/api/orders/{id}/start")]
pub async fn start_order(
    auth: web::Data<AuthService>,
    svc: web::Data<OrderService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(e) = auth.require_dashboard(user.user_id, Role::Mitra).await {
        return gate_failure(e);
    }

    let order_id = path.into_inner();
    match svc.start_order(user.user_id, order_id).await {
        Ok(order) => HttpResponse::Ok().json(ApiResponse::success("Work started", order)),
        Err(OrderError::NotAvailable) => HttpResponse::Conflict()
            .json(ApiResponse::error("Order is not yours or not in an accepted state")),
        Err(e) => {
            log::error!("start failed for order {}: {}", order_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to start work"))
        }
    }
}

/// POST /api/orders/{id}/complete
#[post("/api/orders/{id}/complete")]
pub async fn complete_order(
    auth: web::Data<AuthService>,
    svc: web::Data<OrderService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(e) = auth.require_dashboard(user.user_id, Role::Mitra).await {
        return gate_failure(e);
    }

    let order_id = path.into_inner();
    match svc.complete_order(user.user_id, order_id).await {
        Ok(order) => HttpResponse::Ok().json(ApiResponse::success("Work completed", order)),
        Err(OrderError::NotAvailable) => HttpResponse::Conflict()
            .json(ApiResponse::error("Order is not yours or not in progress")),
        Err(e) => {
            log::error!("completion failed for order {}: {}", order_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to complete work"))
        }
    }
}

/// POST /api/mitra/active
/// Availability toggle, independent of any order.
#[post("/api/mitra/active")]
pub async fn set_active(
    auth: web::Data<AuthService>,
    svc: web::Data<OrderService>,
    user: AuthenticatedUser,
    body: web::Json<SetActiveIn>,
) -> impl Responder {
    if let Err(e) = auth.require_dashboard(user.user_id, Role::Mitra).await {
        return gate_failure(e);
    }

    match svc.set_active(user.user_id, body.is_active).await {
        Ok(profile) => {
            let message = if profile.is_active {
                "You are now receiving new orders"
            } else {
                "You will not receive new orders"
            };
            HttpResponse::Ok().json(ApiResponse::success(message, profile))
        }
        Err(e) => {
            log::error!("active toggle failed for {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to update status"))
        }
    }
}
