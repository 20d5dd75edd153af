use actix_web::{HttpResponse, Responder, post, web};

use crate::dtos::ApiResponse;
use crate::dtos::verification_dtos::SubmitDocumentsIn;
use crate::handlers::gate_failure;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::services::auth_service::AuthService;
use crate::services::verification_service::{VerificationError, VerificationService};

/// POST /api/verifications
/// Partner document submission: both blobs are uploaded under the caller's
/// already-resolved identity id, then the verification request is filed.
#[post("/api/verifications")]
pub async fn submit_documents(
    auth: web::Data<AuthService>,
    svc: web::Data<VerificationService>,
    user: AuthenticatedUser,
    body: web::Json<SubmitDocumentsIn>,
) -> impl Responder {
    if body.ktp.data.trim().is_empty() || body.kk.data.trim().is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("Both documents are required"));
    }

    if let Err(e) = auth.require_mitra(user.user_id).await {
        return gate_failure(e);
    }

    match svc.submit_documents(user.user_id, &body.ktp, &body.kk).await {
        Ok(verification) => HttpResponse::Created().json(ApiResponse::success(
            "Documents uploaded. Please wait for admin verification.",
            verification,
        )),
        Err(VerificationError::InvalidDocument(message)) => {
            HttpResponse::BadRequest().json(ApiResponse::error(&message))
        }
        Err(e) => {
            log::error!("document submission failed for {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to upload documents"))
        }
    }
}
