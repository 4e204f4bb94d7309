pub mod audit;
pub mod auth;
pub mod content;
pub mod media;
pub mod product;
pub mod settings;
pub mod store;
pub mod translation;
