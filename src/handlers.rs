pub mod audit;
pub mod auth;
pub mod pages;
pub mod products;
pub mod public;
pub mod revalidate;
pub mod settings;
pub mod static_files;
pub mod stores;
pub mod translations;
pub mod upload;
