pub mod admin_service;
pub mod auth_service;
pub mod balance_service;
pub mod bootstrap;
pub mod catalog_service;
pub mod chat_service;
pub mod order_service;
pub mod verification_service;
pub mod voucher_service;
