use actix_web::{HttpResponse, Responder, get, post, web};
use uuid::Uuid;

use crate::dtos::ApiResponse;
use crate::dtos::chat_dtos::{SendMessageIn, ThreadQuery};
use crate::handlers::gate_failure;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::services::auth_service::AuthService;
use crate::services::chat_service::ChatService;

/// GET /api/chat/{other_id}?order_id=
/// The two-party thread with the given counterpart, oldest first.
#[get("/api/chat/{other_id}")]
pub async fn list_thread(
    auth: web::Data<AuthService>,
    svc: web::Data<ChatService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    query: web::Query<ThreadQuery>,
) -> impl Responder {
    if let Err(e) = auth.require_member(user.user_id).await {
        return gate_failure(e);
    }

    let other_id = path.into_inner();
    match svc.list_thread(user.user_id, other_id, query.order_id).await {
        Ok(messages) => HttpResponse::Ok().json(ApiResponse::success("Messages retrieved", messages)),
        Err(e) => {
            log::error!("thread fetch failed for {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to retrieve messages"))
        }
    }
}

/// POST /api/chat
#[post("/api/chat")]
pub async fn send_message(
    auth: web::Data<AuthService>,
    svc: web::Data<ChatService>,
    user: AuthenticatedUser,
    body: web::Json<SendMessageIn>,
) -> impl Responder {
    if body.message.trim().is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("Message cannot be empty"));
    }

    if let Err(e) = auth.require_member(user.user_id).await {
        return gate_failure(e);
    }

    match svc
        .send(user.user_id, body.receiver_id, body.order_id, &body.message)
        .await
    {
        Ok(message) => HttpResponse::Created().json(ApiResponse::success("Message sent", message)),
        Err(e) => {
            log::error!("send failed for {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to send message"))
        }
    }
}
