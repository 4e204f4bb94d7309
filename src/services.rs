pub mod auth;
pub mod content_service;
pub mod media_service;
pub mod product_service;
pub mod revalidation;
pub mod settings_service;
pub mod store_service;
pub mod translation_exchange;
pub mod translation_service;
