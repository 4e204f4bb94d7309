// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::Repositories,
    middleware::rate_limit::LoginRateLimiter,
    services::{
        auth::AuthService, content_service::ContentService, media_service::MediaService,
        product_service::ProductService, revalidation::Revalidator, settings_service::SettingsService,
        store_service::StoreService, translation_service::TranslationService,
    },
};

// Como o cookie de sessão do admin é validado
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    // JWT assinado (HS256) com expiração
    Jwt { secret: String },
    // Valor opaco comparado literalmente
    Marker { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    Local,
    S3 {
        bucket: String,
        region: String,
        endpoint: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub admin_password: Option<String>,
    pub admin_password_hash: Option<String>,
    pub session_mode: SessionMode,
    pub secure_cookies: bool,
    // Atrás de proxy reverso: confia em X-Forwarded-For / X-Real-IP
    pub trust_proxy: bool,
    pub storage: StorageProvider,
    pub uploads_dir: PathBuf,
    pub uploads_url_prefix: String,
    pub static_dir: PathBuf,
    pub console_dir: PathBuf,
    pub product_images_dir: PathBuf,
    pub product_images_url_prefix: String,
    pub i18n_export_dir: PathBuf,
    pub public_site_url: Option<String>,
    pub revalidate_secret: Option<String>,
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    var(name).unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Lê a configuração das variáveis de ambiente (o `.env` já deve ter sido carregado).
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        let admin_password = var("ADMIN_PASSWORD");
        let admin_password_hash = var("ADMIN_PASSWORD_HASH");
        if admin_password.is_none() && admin_password_hash.is_none() {
            bail!("ADMIN_PASSWORD ou ADMIN_PASSWORD_HASH deve ser definido");
        }

        let session_mode = match var_or("ADMIN_SESSION_MODE", "jwt").as_str() {
            "jwt" => SessionMode::Jwt {
                secret: var("JWT_SECRET").context("JWT_SECRET deve ser definido no modo jwt")?,
            },
            "marker" => SessionMode::Marker { value: var_or("ADMIN_SESSION_MARKER", "1") },
            other => bail!("ADMIN_SESSION_MODE inválido: '{}' (use jwt ou marker)", other),
        };

        let storage = match var_or("STORAGE_PROVIDER", "local").as_str() {
            "local" => StorageProvider::Local,
            "s3" => StorageProvider::S3 {
                bucket: var("S3_BUCKET").context("S3_BUCKET deve ser definido")?,
                region: var("S3_REGION").context("S3_REGION deve ser definido")?,
                endpoint: var("S3_ENDPOINT"),
                access_key_id: var("S3_ACCESS_KEY_ID"),
                secret_access_key: var("S3_SECRET_ACCESS_KEY"),
            },
            other => return Err(anyhow!("STORAGE_PROVIDER não suportado: '{}'", other)),
        };

        Ok(Self {
            database_url,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            admin_password,
            admin_password_hash,
            session_mode,
            secure_cookies: var_or("APP_ENV", "development") == "production",
            trust_proxy: matches!(var_or("TRUST_PROXY", "false").as_str(), "1" | "true"),
            storage,
            uploads_dir: var_or("UPLOADS_DIR", "public/uploads").into(),
            uploads_url_prefix: var_or("UPLOADS_URL_PREFIX", "/uploads"),
            static_dir: var_or("STATIC_DIR", "../dist").into(),
            console_dir: var_or("CONSOLE_DIR", "console").into(),
            product_images_dir: var_or("PRODUCT_IMAGES_DIR", "public/Images/Halylar").into(),
            product_images_url_prefix: var_or("PRODUCT_IMAGES_URL_PREFIX", "/Images/Halylar"),
            i18n_export_dir: var_or("I18N_EXPORT_DIR", "content/i18n").into(),
            public_site_url: var("PUBLIC_SITE_URL"),
            revalidate_secret: var("REVALIDATE_SECRET"),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub content_service: ContentService,
    pub product_service: ProductService,
    pub store_service: StoreService,
    pub translation_service: TranslationService,
    pub settings_service: SettingsService,
    pub media_service: MediaService,
    pub revalidator: Arc<Revalidator>,
    pub login_limiter: Arc<LoginRateLimiter>,
    pub repos: Repositories,
}

impl AppState {
    // Conecta ao Postgres e monta o estado completo.
    pub async fn new(config: Config) -> anyhow::Result<(Self, PgPool)> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let repos = Repositories::postgres(db_pool.clone());
        let state = Self::from_parts(config, repos).await?;
        Ok((state, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub async fn from_parts(config: Config, repos: Repositories) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let revalidator = Arc::new(Revalidator::new(
            config.public_site_url.clone(),
            config.revalidate_secret.clone(),
        ));

        let media_service = MediaService::from_config(&config).await?;
        let auth_service = AuthService::new(
            config.session_mode.clone(),
            config.admin_password.clone(),
            config.admin_password_hash.clone(),
            config.secure_cookies,
        );

        let translation_service = TranslationService::new(
            repos.translations.clone(),
            repos.audit.clone(),
            revalidator.clone(),
            config.i18n_export_dir.clone(),
        );
        let content_service = ContentService::new(repos.pages.clone(), revalidator.clone());
        let product_service = ProductService::new(
            repos.products.clone(),
            repos.audit.clone(),
            media_service.clone(),
            revalidator.clone(),
            config.product_images_dir.clone(),
            config.product_images_url_prefix.clone(),
        );
        let store_service = StoreService::new(repos.stores.clone(), revalidator.clone());
        let settings_service =
            SettingsService::new(repos.settings.clone(), media_service.clone(), revalidator.clone());

        Ok(Self {
            config,
            auth_service,
            content_service,
            product_service,
            store_service,
            translation_service,
            settings_service,
            media_service,
            revalidator,
            login_limiter: Arc::new(LoginRateLimiter::default()),
            repos,
        })
    }
}
