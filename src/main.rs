use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{error, info};
use reqwest::Client;

use getlife_be::config::AppConfig;
use getlife_be::handlers::admin_handlers::{
    approve_verification, list_verifications, reject_verification, set_blocked, stats,
};
use getlife_be::handlers::auth_handlers::{login, logout, session, signup};
use getlife_be::handlers::balance_handlers::{list_transactions, top_up};
use getlife_be::handlers::catalog_handlers::{list_banners, list_services};
use getlife_be::handlers::chat_handlers::{list_thread, send_message};
use getlife_be::handlers::mitra_handlers::{accept_order, complete_order, set_active, start_order};
use getlife_be::handlers::order_handlers::{create_order, list_orders, rate_order};
use getlife_be::handlers::profile_handlers::{get_profile, update_profile};
use getlife_be::handlers::verification_handlers::submit_documents;
use getlife_be::handlers::voucher_handlers::{list_vouchers, redeem};
use getlife_be::repositories::store::SupabaseStore;
use getlife_be::services::admin_service::AdminService;
use getlife_be::services::auth_service::AuthService;
use getlife_be::services::balance_service::BalanceService;
use getlife_be::services::bootstrap;
use getlife_be::services::catalog_service::CatalogService;
use getlife_be::services::chat_service::ChatService;
use getlife_be::services::order_service::OrderService;
use getlife_be::services::verification_service::VerificationService;
use getlife_be::services::voucher_service::VoucherService;

fn mask_key(k: &str) -> String {
    if k.len() <= 8 {
        "[REDACTED]".to_string()
    } else {
        format!("{}***{}", &k[..4], &k[k.len() - 4..])
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    dotenv::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Store URL: {}", config.supabase_url);
    info!("Service key: {}", mask_key(&config.supabase_service_role_key));

    let http_client = Client::builder()
        .user_agent("getlife-be/0.1")
        .build()
        .expect("failed to build http client");

    let store = SupabaseStore::new(&config, http_client);

    // Best-effort seed admin; never blocks serving.
    bootstrap::ensure_default_admin(&store, &config).await;

    let config_data = web::Data::new(config.clone());
    let auth_data = web::Data::new(AuthService::new(store.clone()));
    let order_data = web::Data::new(OrderService::new(store.clone()));
    let balance_data = web::Data::new(BalanceService::new(store.clone()));
    let voucher_data = web::Data::new(VoucherService::new(store.clone()));
    let verification_data = web::Data::new(VerificationService::new(store.clone()));
    let chat_data = web::Data::new(ChatService::new(store.clone()));
    let catalog_data = web::Data::new(CatalogService::new(store.clone()));
    let admin_data = web::Data::new(AdminService::new(store));

    let allowed_origins = config.allowed_origins.clone();
    let bind_address = format!("0.0.0.0:{}", config.port);
    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type", "accept", "x-requested-with"])
            .supports_credentials()
            .max_age(3600);

        for origin in allowed_origins.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(config_data.clone())
            .app_data(auth_data.clone())
            .app_data(order_data.clone())
            .app_data(balance_data.clone())
            .app_data(voucher_data.clone())
            .app_data(verification_data.clone())
            .app_data(chat_data.clone())
            .app_data(catalog_data.clone())
            .app_data(admin_data.clone())
            // auth
            .service(signup)
            .service(login)
            .service(logout)
            .service(session)
            // profile
            .service(get_profile)
            .service(update_profile)
            // catalog
            .service(list_services)
            .service(list_banners)
            // orders (user)
            .service(create_order)
            .service(list_orders)
            .service(rate_order)
            // orders (mitra)
            .service(accept_order)
            .service(start_order)
            .service(complete_order)
            .service(set_active)
            // balance
            .service(top_up)
            .service(list_transactions)
            // vouchers
            .service(list_vouchers)
            .service(redeem)
            // verification
            .service(submit_documents)
            // admin
            .service(list_verifications)
            .service(approve_verification)
            .service(reject_verification)
            .service(stats)
            .service(set_blocked)
            // chat
            .service(list_thread)
            .service(send_message)
    })
    .bind(&bind_address)?
    .run()
    .await
}
