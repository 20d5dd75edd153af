pub mod admin_handlers;
pub mod auth_handlers;
pub mod balance_handlers;
pub mod catalog_handlers;
pub mod chat_handlers;
pub mod mitra_handlers;
pub mod order_handlers;
pub mod profile_handlers;
pub mod verification_handlers;
pub mod voucher_handlers;

use actix_web::HttpResponse;

use crate::dtos::ApiResponse;
use crate::services::auth_service::GateError;

/// Shared mapping for failed role gates: denial is a 403, a store failure
/// while checking is a 500 with a generic message.
pub(crate) fn gate_failure(err: GateError) -> HttpResponse {
    match err {
        GateError::Denied(route) => {
            log::debug!("access denied, caller resolves to {:?}", route);
            HttpResponse::Forbidden().json(ApiResponse::error("Access denied"))
        }
        GateError::Store(e) => {
            log::error!("gate check failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to verify account status"))
        }
    }
}
