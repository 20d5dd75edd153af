use actix_web::{HttpResponse, Responder, get, web};

use crate::dtos::ApiResponse;
use crate::services::catalog_service::CatalogService;

/// GET /api/services
#[get("/api/services")]
pub async fn list_services(svc: web::Data<CatalogService>) -> impl Responder {
    match svc.list_services().await {
        Ok(services) => HttpResponse::Ok().json(ApiResponse::success("Services retrieved", services)),
        Err(e) => {
            log::error!("service list failed: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to retrieve services"))
        }
    }
}

/// GET /api/banners
#[get("/api/banners")]
pub async fn list_banners(svc: web::Data<CatalogService>) -> impl Responder {
    match svc.list_banners().await {
        Ok(banners) => HttpResponse::Ok().json(ApiResponse::success("Banners retrieved", banners)),
        Err(e) => {
            log::error!("banner list failed: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to retrieve banners"))
        }
    }
}
