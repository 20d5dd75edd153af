use actix_web::{HttpResponse, Responder, get, post, web};
use uuid::Uuid;

use crate::dtos::ApiResponse;
use crate::dtos::order_dtos::{CreateOrderIn, RateOrderIn};
use crate::handlers::gate_failure;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::profile::Role;
use crate::routing::{self, AppRoute};
use crate::services::auth_service::AuthService;
use crate::services::order_service::{OrderError, OrderService};

/// POST /api/orders
/// Book a service: price and duration are copied from the catalog at submit
/// time, the order starts pending with no mitra bound.
#[post("/api/orders")]
pub async fn create_order(
    auth: web::Data<AuthService>,
    svc: web::Data<OrderService>,
    user: AuthenticatedUser,
    body: web::Json<CreateOrderIn>,
) -> impl Responder {
    if body.address.trim().is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("Address is required"));
    }
    if body.scheduled_date.trim().is_empty() || body.scheduled_time.trim().is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("Schedule is required"));
    }

    if let Err(e) = auth.require_dashboard(user.user_id, Role::User).await {
        return gate_failure(e);
    }

    match svc.create_order(user.user_id, body.into_inner()).await {
        Ok(order) => HttpResponse::Created().json(ApiResponse::success(
            "Order created and waiting for a partner",
            order,
        )),
        Err(OrderError::ServiceNotFound) => {
            HttpResponse::NotFound().json(ApiResponse::error("Service not found"))
        }
        Err(e) => {
            log::error!("order creation failed for {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to create order"))
        }
    }
}

/// GET /api/orders
/// Role-dependent listing: customers see their own orders, partners see
/// their own plus the unassigned pending pool.
#[get("/api/orders")]
pub async fn list_orders(
    auth: web::Data<AuthService>,
    svc: web::Data<OrderService>,
    user: AuthenticatedUser,
) -> impl Responder {
    let profile = match auth.require_member(user.user_id).await {
        Ok(profile) => profile,
        Err(e) => return gate_failure(e),
    };

    let orders = match routing::resolve(Some(&profile)) {
        AppRoute::UserDashboard => svc.list_for_user(user.user_id).await,
        AppRoute::MitraDashboard => svc.list_for_mitra(user.user_id).await,
        _ => {
            return HttpResponse::Forbidden().json(ApiResponse::error("Access denied"));
        }
    };

    match orders {
        Ok(orders) => HttpResponse::Ok().json(ApiResponse::success("Orders retrieved", orders)),
        Err(e) => {
            log::error!("order list failed for {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to retrieve orders"))
        }
    }
}

/// POST /api/orders/{id}/rate
/// Rating and optional review on an own, completed order.
#[post("/api/orders/{id}/rate")]
pub async fn rate_order(
    auth: web::Data<AuthService>,
    svc: web::Data<OrderService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<RateOrderIn>,
) -> impl Responder {
    if let Err(e) = auth.require_dashboard(user.user_id, Role::User).await {
        return gate_failure(e);
    }

    let order_id = path.into_inner();
    match svc
        .rate_order(user.user_id, order_id, body.rating, body.review.clone())
        .await
    {
        Ok(order) => HttpResponse::Ok().json(ApiResponse::success("Thanks for your rating", order)),
        Err(OrderError::InvalidRating) => {
            HttpResponse::BadRequest().json(ApiResponse::error("Rating must be between 1 and 5"))
        }
        Err(OrderError::NotFound) => HttpResponse::NotFound()
            .json(ApiResponse::error("Completed order not found for this account")),
        Err(e) => {
            log::error!("rating failed for order {}: {}", order_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to save rating"))
        }
    }
}
