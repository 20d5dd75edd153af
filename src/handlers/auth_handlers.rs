use actix_web::{HttpResponse, Responder, get, post, web};
use regex::Regex;

use crate::dtos::ApiResponse;
use crate::dtos::auth_dtos::{LoginIn, LoginOut, SignupIn, SignupOut, SignupRole};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::store::StoreError;
use crate::routing::{self, AppRoute};
use crate::services::auth_service::AuthService;

fn looks_like_email(email: &str) -> bool {
    let re = Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap();
    re.is_match(email)
}

/// POST /auth/signup
/// Creates the identity and chains the profile writes. All input checks run
/// before the first store call.
#[post("/auth/signup")]
pub async fn signup(svc: web::Data<AuthService>, body: web::Json<SignupIn>) -> impl Responder {
    let email = body.email.trim().to_lowercase();

    if !looks_like_email(&email) {
        return HttpResponse::BadRequest().json(ApiResponse::error("Invalid email format"));
    }
    if body.password.len() < 6 {
        return HttpResponse::BadRequest()
            .json(ApiResponse::error("Password must be at least 6 characters long"));
    }
    if let Some(confirm) = &body.confirm_password {
        if confirm != &body.password {
            return HttpResponse::BadRequest().json(ApiResponse::error("Passwords do not match"));
        }
    }
    if body.full_name.trim().is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("Full name is required"));
    }

    match svc
        .sign_up(&email, &body.password, body.full_name.trim(), body.role)
        .await
    {
        Ok(user_id) => {
            let next_step = match body.role {
                // A new mitra goes straight into the verification flow.
                SignupRole::Mitra => AppRoute::PendingVerification,
                SignupRole::User => AppRoute::Auth,
            };
            HttpResponse::Created().json(ApiResponse::success(
                "Account created",
                SignupOut { user_id, next_step },
            ))
        }
        Err(e) => {
            log::error!("signup failed: {}", e);
            let message = if e.to_string().contains("already registered") {
                "Email already exists. Please login instead."
            } else {
                "Failed to create account. Please try again."
            };
            HttpResponse::BadRequest().json(ApiResponse::error(message))
        }
    }
}

/// POST /auth/login
/// Authenticates and resolves the profile in the same round-trip, returning
/// the route the client should land on.
#[post("/auth/login")]
pub async fn login(svc: web::Data<AuthService>, body: web::Json<LoginIn>) -> impl Responder {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("Email and password are required"));
    }

    let (store_session, user) = match svc.sign_in(&body.email, &body.password).await {
        Ok(result) => result,
        Err(StoreError::Auth(e)) => {
            log::debug!("login rejected: {}", e);
            // Credential failures are normalized to one message.
            return HttpResponse::Unauthorized().json(ApiResponse::error("Invalid email or password"));
        }
        Err(e) => {
            log::error!("login failed: {}", e);
            return HttpResponse::InternalServerError()
                .json(ApiResponse::error("Login is currently unavailable. Please try again."));
        }
    };

    let profile = svc.fetch_profile(user.id).await;
    let next_step = routing::resolve(profile.as_ref());

    HttpResponse::Ok().json(ApiResponse::success(
        "Login successful",
        LoginOut {
            session: store_session,
            profile,
            next_step,
        },
    ))
}

/// POST /auth/logout
#[post("/auth/logout")]
pub async fn logout(svc: web::Data<AuthService>, user: AuthenticatedUser) -> impl Responder {
    match svc.sign_out(&user.token).await {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::ok("Signed out")),
        Err(e) => {
            log::error!("logout failed for {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to sign out"))
        }
    }
}

/// GET /auth/session
/// One resolution pass: token -> identity -> profile -> route.
#[get("/auth/session")]
pub async fn session(svc: web::Data<AuthService>, user: AuthenticatedUser) -> impl Responder {
    match svc.resolve_session(&user.token).await {
        Ok(state) => HttpResponse::Ok().json(ApiResponse::success("Session resolved", state)),
        Err(StoreError::Auth(e)) => {
            log::debug!("session rejected: {}", e);
            HttpResponse::Unauthorized().json(ApiResponse::error("Session expired. Please login again."))
        }
        Err(e) => {
            log::error!("session resolution failed: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to resolve session"))
        }
    }
}
