// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,

        // --- Pages ---
        handlers::pages::list_pages,
        handlers::pages::create_page,
        handlers::pages::get_page,
        handlers::pages::update_page,
        handlers::pages::replace_blocks,
        handlers::pages::update_block,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::add_image,
        handlers::products::reorder_images,
        handlers::products::delete_image,
        handlers::products::scan_products,

        // --- Stores ---
        handlers::stores::list_stores,
        handlers::stores::create_store,
        handlers::stores::get_store,
        handlers::stores::update_store,
        handlers::stores::delete_store,

        // --- Translations ---
        handlers::translations::list_translations,
        handlers::translations::create_translation,
        handlers::translations::update_translation,
        handlers::translations::delete_translation,
        handlers::translations::batch_translations,
        handlers::translations::export_translations,
        handlers::translations::import_translations,
        handlers::translations::create_missing_translations,
        handlers::translations::sync_json,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::settings::upload_favicon,

        // --- Media / Publish / Audit ---
        handlers::upload::upload,
        handlers::revalidate::revalidate,
        handlers::audit::list_audit,

        // --- Public ---
        handlers::public::list_products,
        handlers::public::list_stores,
        handlers::public::get_page,
        handlers::public::get_translations,
        handlers::public::get_settings,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::LoginResponse,

            // --- Content ---
            models::content::PageStatus,
            models::content::Page,
            models::content::PageSummary,
            models::content::Block,
            models::content::PageWithBlocks,
            models::content::BlockInput,
            models::content::CreatePagePayload,
            models::content::UpdatePagePayload,
            models::content::UpdateBlockPayload,

            // --- Products ---
            models::product::Media,
            models::product::Product,
            models::product::ProductImage,
            models::product::ProductWithImages,
            models::product::CreateProductPayload,
            models::product::UpdateProductPayload,
            models::product::ImagePosition,
            models::product::ReorderImagesPayload,
            models::product::ScanSummary,

            // --- Media ---
            models::media::VariantFormat,
            models::media::Variant,
            models::media::StoredFile,

            // --- Stores ---
            models::store::OpeningHours,
            models::store::StoreServices,
            models::store::Store,
            models::store::CreateStorePayload,
            models::store::UpdateStorePayload,

            // --- Translations ---
            models::translation::Locale,
            models::translation::TranslationPath,
            models::translation::TranslationKey,
            models::translation::TranslationValue,
            models::translation::TranslationEntry,
            models::translation::CreateTranslationPayload,
            models::translation::UpdateTranslationValuePayload,
            models::translation::BatchTranslationItem,
            models::translation::BatchTranslationPayload,
            models::translation::ExchangeFormat,
            models::translation::ImportPayload,
            models::translation::TranslationRecord,
            models::translation::ImportConflict,
            models::translation::ImportSummary,
            models::translation::CreateMissingPayload,
            models::translation::CreateMissingSummary,
            models::translation::SyncJsonResult,

            // --- Settings ---
            models::settings::SiteSettings,
            models::settings::UpdateSettingsRequest,

            // --- Audit ---
            models::audit::AuditEntry,

            // --- Payloads ---
            handlers::revalidate::RevalidatePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Sessão do administrador"),
        (name = "Pages", description = "Páginas e blocos de conteúdo"),
        (name = "Products", description = "Catálogo de tapetes e imagens"),
        (name = "Stores", description = "Lojas e pontos de venda"),
        (name = "Translations", description = "Textos do site em tk, ru e en"),
        (name = "Settings", description = "Identidade visual do site"),
        (name = "Media", description = "Upload de imagens e modelos 3D"),
        (name = "Publish", description = "Revalidação do site público"),
        (name = "Audit", description = "Histórico de operações em massa"),
        (name = "Public", description = "Leitura pública usada pelo site")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                crate::services::auth::SESSION_COOKIE,
            ))),
        );
    }
}
