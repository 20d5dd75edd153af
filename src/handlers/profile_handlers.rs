use actix_web::{HttpResponse, Responder, get, put, web};

use crate::dtos::ApiResponse;
use crate::dtos::auth_dtos::UpdateProfileIn;
use crate::handlers::gate_failure;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::store::StoreError;
use crate::services::auth_service::AuthService;

/// GET /api/profile
/// Own profile plus the role extension row. Repeated calls without an
/// intervening mutation return identical bodies.
#[get("/api/profile")]
pub async fn get_profile(svc: web::Data<AuthService>, user: AuthenticatedUser) -> impl Responder {
    match svc.profile_overview(user.user_id).await {
        Ok(overview) => HttpResponse::Ok().json(ApiResponse::success("Profile retrieved", overview)),
        Err(StoreError::NotFound) => {
            HttpResponse::NotFound().json(ApiResponse::error("Profile not found"))
        }
        Err(e) => {
            log::error!("profile fetch failed for {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to retrieve profile"))
        }
    }
}

/// PUT /api/profile
/// Self-service update of name/phone (and address for customers).
#[put("/api/profile")]
pub async fn update_profile(
    svc: web::Data<AuthService>,
    user: AuthenticatedUser,
    body: web::Json<UpdateProfileIn>,
) -> impl Responder {
    let input = body.into_inner();
    if let Some(full_name) = &input.full_name {
        if full_name.trim().is_empty() {
            return HttpResponse::BadRequest().json(ApiResponse::error("Full name cannot be empty"));
        }
    }

    if let Err(e) = svc.require_member(user.user_id).await {
        return gate_failure(e);
    }

    match svc.update_profile(user.user_id, &input).await {
        Ok(overview) => HttpResponse::Ok().json(ApiResponse::success("Profile updated", overview)),
        Err(e) => {
            log::error!("profile update failed for {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to update profile"))
        }
    }
}
