use actix_web::{HttpResponse, Responder, get, post, web};

use crate::dtos::ApiResponse;
use crate::dtos::balance_dtos::{TopUpIn, TopUpOut};
use crate::handlers::gate_failure;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::balance::is_valid_topup_amount;
use crate::models::profile::Role;
use crate::services::auth_service::AuthService;
use crate::services::balance_service::{BalanceError, BalanceService};

/// POST /api/balance/topup
/// Simulated top-up from the fixed denomination menu; amount validation runs
/// before any store call.
#[post("/api/balance/topup")]
pub async fn top_up(
    auth: web::Data<AuthService>,
    svc: web::Data<BalanceService>,
    user: AuthenticatedUser,
    body: web::Json<TopUpIn>,
) -> impl Responder {
    if !is_valid_topup_amount(body.amount) {
        return HttpResponse::BadRequest()
            .json(ApiResponse::error("Amount must be one of the available denominations"));
    }

    if let Err(e) = auth.require_dashboard(user.user_id, Role::User).await {
        return gate_failure(e);
    }

    match svc.top_up(user.user_id, body.amount).await {
        Ok(balance) => HttpResponse::Ok().json(ApiResponse::success(
            "Balance topped up",
            TopUpOut { balance },
        )),
        Err(BalanceError::ProfileMissing) => {
            HttpResponse::NotFound().json(ApiResponse::error("Balance account not found"))
        }
        Err(BalanceError::Contention) => HttpResponse::Conflict()
            .json(ApiResponse::error("Balance changed concurrently. Please try again.")),
        Err(e) => {
            log::error!("top-up failed for {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to top up balance"))
        }
    }
}

/// GET /api/balance/transactions
/// Own ledger, newest first.
#[get("/api/balance/transactions")]
pub async fn list_transactions(
    auth: web::Data<AuthService>,
    svc: web::Data<BalanceService>,
    user: AuthenticatedUser,
) -> impl Responder {
    if let Err(e) = auth.require_member(user.user_id).await {
        return gate_failure(e);
    }

    match svc.list_transactions(user.user_id).await {
        Ok(transactions) => {
            HttpResponse::Ok().json(ApiResponse::success("Transactions retrieved", transactions))
        }
        Err(e) => {
            log::error!("ledger list failed for {}: {}", user.user_id, e);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to retrieve transactions"))
        }
    }
}
