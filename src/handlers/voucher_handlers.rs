use actix_web::{HttpResponse, Responder, get, post, web};

use crate::dtos::ApiResponse;
use crate::dtos::voucher_dtos::{RedeemIn, RedeemOut};
use crate::handlers::gate_failure;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::profile::Role;
use crate::services::auth_service::AuthService;
use crate::services::voucher_service::{VoucherError, VoucherService};

/// GET /api/vouchers
/// Active, unexpired vouchers for the redeem screen.
#[get("/api/vouchers")]
pub async fn list_vouchers(
    auth: web::Data<AuthService>,
    svc: web::Data<VoucherService>,
    user: AuthenticatedUser,
) -> impl Responder {
    if let Err(e) = auth.require_dashboard(user.user_id, Role::User).await {
        return gate_failure(e);
    }

    match svc.list_available().await {
        Ok(vouchers) => HttpResponse::Ok().json(ApiResponse::success("Vouchers retrieved", vouchers)),
        Err(e) => {
            log::error!("voucher list failed: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to retrieve vouchers"))
        }
    }
}

/// POST /api/vouchers/redeem
#[post("/api/vouchers/redeem")]
pub async fn redeem(
    auth: web::Data<AuthService>,
    svc: web::Data<VoucherService>,
    user: AuthenticatedUser,
    body: web::Json<RedeemIn>,
) -> impl Responder {
    if body.code.trim().is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("Voucher code is required"));
    }

    if let Err(e) = auth.require_dashboard(user.user_id, Role::User).await {
        return gate_failure(e);
    }

    match svc.redeem(user.user_id, &body.code).await {
        Ok(redemption) => HttpResponse::Ok().json(ApiResponse::success(
            "Voucher redeemed",
            RedeemOut {
                code: redemption.voucher.code,
                amount: redemption.voucher.amount,
                balance: redemption.balance,
            },
        )),
        Err(VoucherError::NotFoundOrExpired) => {
            HttpResponse::NotFound().json(ApiResponse::error("Voucher code is invalid or expired"))
        }
        Err(VoucherError::AlreadyUsed) => {
            HttpResponse::Conflict().json(ApiResponse::error("You have already used this voucher"))
        }
        Err(VoucherError::LimitReached) => {
            HttpResponse::Conflict().json(ApiResponse::error("Voucher has reached its usage limit"))
        }
        Err(VoucherError::Contention) => HttpResponse::Conflict()
            .json(ApiResponse::error("Balance changed concurrently. Please try again.")),
        Err(VoucherError::ProfileMissing) => {
            HttpResponse::NotFound().json(ApiResponse::error("Balance account not found"))
        }
        Err(e) => {
            log::error!("redeem failed for {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to redeem voucher"))
        }
    }
}
