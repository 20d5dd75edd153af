use actix_web::{HttpResponse, Responder, get, post, web};
use uuid::Uuid;

use crate::dtos::ApiResponse;
use crate::dtos::verification_dtos::{BlockIn, RejectIn};
use crate::handlers::gate_failure;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::profile::Role;
use crate::services::admin_service::{AdminError, AdminService};
use crate::services::auth_service::AuthService;
use crate::services::verification_service::{VerificationError, VerificationService};

/// GET /api/admin/verifications
/// Pending partner verifications with contact info, newest first.
#[get("/api/admin/verifications")]
pub async fn list_verifications(
    auth: web::Data<AuthService>,
    svc: web::Data<VerificationService>,
    user: AuthenticatedUser,
) -> impl Responder {
    if let Err(e) = auth.require_dashboard(user.user_id, Role::Admin).await {
        return gate_failure(e);
    }

    match svc.list_pending().await {
        Ok(pending) => HttpResponse::Ok().json(ApiResponse::success("Verifications retrieved", pending)),
        Err(e) => {
            log::error!("verification list failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to retrieve verifications"))
        }
    }
}

/// POST /api/admin/verifications/{id}/approve
#[post("/api/admin/verifications/{id}/approve")]
pub async fn approve_verification(
    auth: web::Data<AuthService>,
    svc: web::Data<VerificationService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(e) = auth.require_dashboard(user.user_id, Role::Admin).await {
        return gate_failure(e);
    }

    let verification_id = path.into_inner();
    match svc.approve(user.user_id, verification_id).await {
        Ok(verification) => HttpResponse::Ok().json(ApiResponse::success(
            "Partner approved and can start receiving orders",
            verification,
        )),
        Err(VerificationError::NotFound) => HttpResponse::NotFound()
            .json(ApiResponse::error("Verification not found or already reviewed")),
        Err(e) => {
            log::error!("approval failed for {}: {}", verification_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to approve partner"))
        }
    }
}

/// POST /api/admin/verifications/{id}/reject
#[post("/api/admin/verifications/{id}/reject")]
pub async fn reject_verification(
    auth: web::Data<AuthService>,
    svc: web::Data<VerificationService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<RejectIn>,
) -> impl Responder {
    if body.reason.trim().is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("A rejection reason is required"));
    }

    if let Err(e) = auth.require_dashboard(user.user_id, Role::Admin).await {
        return gate_failure(e);
    }

    let verification_id = path.into_inner();
    match svc.reject(user.user_id, verification_id, body.reason.trim()).await {
        Ok(verification) => {
            HttpResponse::Ok().json(ApiResponse::success("Partner rejected", verification))
        }
        Err(VerificationError::NotFound) => HttpResponse::NotFound()
            .json(ApiResponse::error("Verification not found or already reviewed")),
        Err(e) => {
            log::error!("rejection failed for {}: {}", verification_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to reject partner"))
        }
    }
}

/// GET /api/admin/stats
#[get("/api/admin/stats")]
pub async fn stats(
    auth: web::Data<AuthService>,
    svc: web::Data<AdminService>,
    user: AuthenticatedUser,
) -> impl Responder {
    if let Err(e) = auth.require_dashboard(user.user_id, Role::Admin).await {
        return gate_failure(e);
    }

    match svc.stats().await {
        Ok(stats) => HttpResponse::Ok().json(ApiResponse::success("Stats retrieved", stats)),
        Err(e) => {
            log::error!("stats failed: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to retrieve stats"))
        }
    }
}

/// POST /api/admin/users/{id}/block
#[post("/api/admin/users/{id}/block")]
pub async fn set_blocked(
    auth: web::Data<AuthService>,
    svc: web::Data<AdminService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<BlockIn>,
) -> impl Responder {
    if let Err(e) = auth.require_dashboard(user.user_id, Role::Admin).await {
        return gate_failure(e);
    }

    let target_id = path.into_inner();
    match svc.set_blocked(target_id, body.blocked).await {
        Ok(profile) => {
            let message = if body.blocked { "Account blocked" } else { "Account unblocked" };
            HttpResponse::Ok().json(ApiResponse::success(message, profile))
        }
        Err(AdminError::NotFound) => {
            HttpResponse::NotFound().json(ApiResponse::error("Profile not found"))
        }
        Err(e) => {
            log::error!("block toggle failed for {}: {}", target_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to update account"))
        }
    }
}
