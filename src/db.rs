pub mod audit_repo;
pub use audit_repo::{AuditRepository, PgAuditRepository};
pub mod page_repo;
pub use page_repo::{PageRepository, PgPageRepository};
pub mod product_repo;
pub use product_repo::{PgProductRepository, ProductRepository};
pub mod settings_repo;
pub use settings_repo::{PgSettingsRepository, SettingsRepository};
pub mod store_repo;
pub use store_repo::{PgStoreRepository, StoreRepository};
pub mod translation_repo;
pub use translation_repo::{PgTranslationRepository, KeyWrite, TranslationRepository};

use std::sync::Arc;

use sqlx::PgPool;

// Conjunto de repositórios injetado nos serviços.
// Em produção são os `Pg*`; nos testes, implementações em memória.
#[derive(Clone)]
pub struct Repositories {
    pub pages: Arc<dyn PageRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub stores: Arc<dyn StoreRepository>,
    pub translations: Arc<dyn TranslationRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub audit: Arc<dyn AuditRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            pages: Arc::new(PgPageRepository::new(pool.clone())),
            products: Arc::new(PgProductRepository::new(pool.clone())),
            stores: Arc::new(PgStoreRepository::new(pool.clone())),
            translations: Arc::new(PgTranslationRepository::new(pool.clone())),
            settings: Arc::new(PgSettingsRepository::new(pool.clone())),
            audit: Arc::new(PgAuditRepository::new(pool)),
        }
    }
}
