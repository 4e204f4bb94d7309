// src/services/media_service.rs

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use tokio::fs;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::{Config, StorageProvider},
    models::{
        media::{StoredFile, Variant, VariantFormat},
        product::NewMedia,
    },
};

// --- DETECÇÃO DE TIPO ---

// Lista fechada do que pode ser enviado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Jpeg,
    Png,
    Webp,
    Ico,
    Glb,
    Gltf,
}

impl MediaKind {
    pub fn mime(self) -> &'static str {
        match self {
            MediaKind::Jpeg => "image/jpeg",
            MediaKind::Png => "image/png",
            MediaKind::Webp => "image/webp",
            MediaKind::Ico => "image/x-icon",
            MediaKind::Glb => "model/gltf-binary",
            MediaKind::Gltf => "model/gltf+json",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Jpeg => "jpg",
            MediaKind::Png => "png",
            MediaKind::Webp => "webp",
            MediaKind::Ico => "ico",
            MediaKind::Glb => "glb",
            MediaKind::Gltf => "gltf",
        }
    }

    // Formatos que o `image` decodifica neste build (geram variantes)
    fn raster_format(self) -> Option<ImageFormat> {
        match self {
            MediaKind::Jpeg => Some(ImageFormat::Jpeg),
            MediaKind::Png => Some(ImageFormat::Png),
            MediaKind::Webp => Some(ImageFormat::WebP),
            _ => None,
        }
    }
}

fn is_avif(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[4..8] == b"ftyp" && matches!(&bytes[8..12], b"avif" | b"avis")
}

/// Detecta o tipo real pelo conteúdo. O nome do arquivo só importa para `.gltf`,
/// que é JSON e não tem assinatura binária.
///
/// AVIF de entrada é recusado: o `image` deste build só codifica AVIF, não
/// decodifica, e toda imagem aceita precisa gerar a variante WebP.
pub fn sniff(bytes: &[u8], filename: &str) -> Result<MediaKind, AppError> {
    if is_avif(bytes) {
        return Err(AppError::UnsupportedFileType("image/avif".to_string()));
    }
    if bytes.starts_with(b"glTF") {
        return Ok(MediaKind::Glb);
    }

    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => return Ok(MediaKind::Jpeg),
        Ok(ImageFormat::Png) => return Ok(MediaKind::Png),
        Ok(ImageFormat::WebP) => return Ok(MediaKind::Webp),
        Ok(ImageFormat::Ico) => return Ok(MediaKind::Ico),
        _ => {}
    }

    let is_gltf_name = filename.to_ascii_lowercase().ends_with(".gltf");
    if is_gltf_name && serde_json::from_slice::<serde_json::Value>(bytes).is_ok_and(|v| v.is_object()) {
        return Ok(MediaKind::Gltf);
    }

    let detected = image::guess_format(bytes)
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string());
    Err(AppError::UnsupportedFileType(detected))
}

/// "Foto Çeper (1).exe" + Jpeg -> "<uuid>-Foto__eper__1_.jpg"
/// A extensão sempre reflete o conteúdo detectado.
pub fn stored_name(filename: &str, kind: MediaKind) -> String {
    let base = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let mut clean: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if clean.is_empty() {
        clean.push_str("file");
    }
    clean.truncate(64);
    format!("{}-{}.{}", Uuid::new_v4(), clean, kind.extension())
}

fn variant_name(stored: &str, format: VariantFormat) -> String {
    let stem = stored.rsplit_once('.').map(|(s, _)| s).unwrap_or(stored);
    match format {
        VariantFormat::Webp => format!("{}.webp", stem),
        VariantFormat::Avif => format!("{}.avif", stem),
    }
}

// --- VARIANTES ---

struct Derived {
    width: u32,
    height: u32,
    variants: Vec<(VariantFormat, Vec<u8>)>,
}

fn encode_webp(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    // O encoder WebP do `image` é lossless e só aceita RGB(A) 8 bits
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    rgba.write_with_encoder(image::codecs::webp::WebPEncoder::new_lossless(&mut out))?;
    Ok(out)
}

#[cfg(feature = "avif")]
fn encode_avif(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    rgba.write_with_encoder(image::codecs::avif::AvifEncoder::new_with_speed_quality(&mut out, 8, 60))?;
    Ok(out)
}

fn derive_variants(bytes: &[u8], kind: MediaKind, format: ImageFormat) -> Result<Derived, AppError> {
    // Leitura em memória: assinatura válida com corpo ilegível é erro do cliente
    let img = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        AppError::BadRequest(format!("Arquivo {} corrompido ou ilegível: {}", kind.mime(), e))
    })?;
    let webp = (VariantFormat::Webp, encode_webp(&img)?);

    #[cfg(feature = "avif")]
    let variants = vec![webp, (VariantFormat::Avif, encode_avif(&img)?)];
    #[cfg(not(feature = "avif"))]
    let variants = vec![webp];

    Ok(Derived { width: img.width(), height: img.height(), variants })
}

// --- ARMAZENAMENTO ---

/// Destino dos arquivos enviados. Retorna a URL pública do objeto.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, mime: &str) -> Result<String, AppError>;
}

pub struct LocalStorage {
    root: PathBuf,
    url_prefix: String,
}

impl LocalStorage {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self { root, url_prefix }
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>, _mime: &str) -> Result<String, AppError> {
        fs::create_dir_all(&self.root).await?;
        fs::write(self.root.join(key), bytes).await?;
        Ok(format!("{}/{}", self.url_prefix.trim_end_matches('/'), key))
    }
}

#[cfg(feature = "s3")]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base: String,
}

#[cfg(feature = "s3")]
impl S3Storage {
    pub async fn new(
        bucket: String,
        region: String,
        endpoint: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    ) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.clone()));
        if let (Some(id), Some(secret)) = (access_key_id, secret_access_key) {
            loader = loader.credentials_provider(aws_sdk_s3::config::Credentials::new(
                id, secret, None, None, "environment",
            ));
        }
        if let Some(endpoint) = &endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        // Endpoints compatíveis (MinIO, R2) usam path-style
        let conf = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(endpoint.is_some())
            .build();

        let public_base = match &endpoint {
            Some(ep) => format!("{}/{}", ep.trim_end_matches('/'), bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
        };

        Self { client: aws_sdk_s3::Client::from_conf(conf), bucket, public_base }
    }
}

#[cfg(feature = "s3")]
#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put(&self, key: &str, bytes: Vec<u8>, mime: &str) -> Result<String, AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(mime)
            .body(aws_sdk_s3::primitives::ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Falha no upload para o S3: {}", e))?;
        Ok(format!("{}/{}", self.public_base, key))
    }
}

// --- SERVIÇO ---

#[derive(Clone)]
pub struct MediaService {
    storage: Arc<dyn ObjectStorage>,
}

impl MediaService {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    pub fn local(root: PathBuf, url_prefix: String) -> Self {
        Self::new(Arc::new(LocalStorage::new(root, url_prefix)))
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        match &config.storage {
            StorageProvider::Local => {
                tracing::info!("📁 Uploads em disco: {}", config.uploads_dir.display());
                Ok(Self::local(config.uploads_dir.clone(), config.uploads_url_prefix.clone()))
            }
            #[cfg(feature = "s3")]
            StorageProvider::S3 { bucket, region, endpoint, access_key_id, secret_access_key } => {
                tracing::info!("☁️ Uploads no bucket S3 '{}'", bucket);
                let storage = S3Storage::new(
                    bucket.clone(),
                    region.clone(),
                    endpoint.clone(),
                    access_key_id.clone(),
                    secret_access_key.clone(),
                )
                .await;
                Ok(Self::new(Arc::new(storage)))
            }
            #[cfg(not(feature = "s3"))]
            StorageProvider::S3 { .. } => {
                anyhow::bail!("STORAGE_PROVIDER=s3 requer o build com a feature `s3`")
            }
        }
    }

    /// Valida pelo conteúdo, grava o original e as variantes derivadas.
    pub async fn store(&self, bytes: Vec<u8>, filename: &str) -> Result<StoredFile, AppError> {
        let kind = sniff(&bytes, filename)?;
        // .ico só como favicon
        if kind == MediaKind::Ico {
            return Err(AppError::UnsupportedFileType(kind.mime().to_string()));
        }
        let key = stored_name(filename, kind);
        let size_bytes = bytes.len() as u64;

        // Decodificar/codificar é CPU-bound: fora do runtime
        let derived = match kind.raster_format() {
            Some(format) => {
                let source = bytes.clone();
                let derived = tokio::task::spawn_blocking(move || derive_variants(&source, kind, format))
                    .await
                    .map_err(|e| anyhow::anyhow!("Falha na task de variantes: {}", e))??;
                Some(derived)
            }
            None => None,
        };

        let url = self.storage.put(&key, bytes, kind.mime()).await?;

        let mut variants = Vec::new();
        let (mut width, mut height) = (None, None);
        if let Some(derived) = derived {
            width = Some(derived.width);
            height = Some(derived.height);
            for (format, encoded) in derived.variants {
                let mime = match format {
                    VariantFormat::Webp => "image/webp",
                    VariantFormat::Avif => "image/avif",
                };
                let variant_size = encoded.len() as u64;
                let variant_url = self.storage.put(&variant_name(&key, format), encoded, mime).await?;
                variants.push(Variant {
                    format,
                    url: variant_url,
                    width: derived.width,
                    height: derived.height,
                    size_bytes: variant_size,
                    mime: mime.to_string(),
                });
            }
        }

        tracing::info!("🖼️ Upload salvo: {} ({}, {} variantes)", url, kind.mime(), variants.len());

        Ok(StoredFile { url, width, height, size_bytes, mime: kind.mime().to_string(), variants })
    }

    /// Favicon: apenas ico, png ou webp, sem variantes.
    pub async fn store_favicon(&self, bytes: Vec<u8>, filename: &str) -> Result<String, AppError> {
        let kind = sniff(&bytes, filename)?;
        if !matches!(kind, MediaKind::Ico | MediaKind::Png | MediaKind::Webp) {
            return Err(AppError::UnsupportedFileType(kind.mime().to_string()));
        }
        let key = format!("favicon-{}.{}", Uuid::new_v4(), kind.extension());
        self.storage.put(&key, bytes, kind.mime()).await
    }
}

impl From<StoredFile> for NewMedia {
    fn from(f: StoredFile) -> Self {
        NewMedia {
            url: f.url,
            mime: f.mime,
            width: f.width.map(|w| w as i32),
            height: f.height.map(|h| h as i32),
            size_bytes: f.size_bytes as i64,
            variants: f.variants,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = DynamicImage::new_rgb8(3, 2);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn sniffing_ignores_the_filename_for_images() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
        assert_eq!(sniff(&jpeg, "photo.exe").unwrap(), MediaKind::Jpeg);
        assert_eq!(sniff(&tiny_png(), "notes.txt").unwrap(), MediaKind::Png);
    }

    #[test]
    fn models_are_recognised() {
        assert_eq!(sniff(b"glTF\x02\x00\x00\x00", "chair.bin").unwrap(), MediaKind::Glb);
        assert_eq!(sniff(br#"{"asset":{"version":"2.0"}}"#, "Chair.GLTF").unwrap(), MediaKind::Gltf);
        // JSON sem a extensão .gltf não é aceito
        assert!(sniff(br#"{"asset":{}}"#, "chair.json").is_err());
    }

    #[tokio::test]
    async fn avif_uploads_are_refused() {
        let mut avif = vec![0, 0, 0, 0x1c];
        avif.extend_from_slice(b"ftypavif");
        avif.extend_from_slice(&[0; 16]);
        assert!(matches!(sniff(&avif, "x.avif"), Err(AppError::UnsupportedFileType(m)) if m == "image/avif"));

        let dir = tempfile::tempdir().unwrap();
        let media = MediaService::local(dir.path().to_path_buf(), "/uploads".into());
        assert!(media.store(avif, "rug.avif").await.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn corrupt_body_behind_valid_magic_is_a_client_error() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaService::local(dir.path().to_path_buf(), "/uploads".into());

        let mut broken = tiny_png();
        broken.truncate(20);
        let err = media.store(broken, "rug.png").await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.to_api_error().status, axum::http::StatusCode::BAD_REQUEST);
        // Nada é gravado quando a decodificação falha
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn everything_else_is_unsupported() {
        assert!(matches!(sniff(b"MZ\x90\x00", "photo.jpg"), Err(AppError::UnsupportedFileType(_))));
        assert!(matches!(sniff(b"GIF89a....", "a.gif"), Err(AppError::UnsupportedFileType(_))));
    }

    #[test]
    fn stored_names_are_sanitised_and_use_detected_extension() {
        let name = stored_name("../Foto Çeper (1).exe", MediaKind::Jpeg);
        let (uuid, rest) = name.split_at(36);
        assert!(Uuid::parse_str(uuid).is_ok());
        assert_eq!(rest, "-Foto__eper__1_.jpg");
        assert_eq!(variant_name(&name, VariantFormat::Webp), name.replace(".jpg", ".webp"));
    }

    #[tokio::test]
    async fn store_writes_original_and_webp_variant() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaService::local(dir.path().to_path_buf(), "/uploads".into());

        let stored = media.store(tiny_png(), "rug.png").await.unwrap();

        assert_eq!(stored.mime, "image/png");
        assert_eq!((stored.width, stored.height), (Some(3), Some(2)));
        assert!(stored.url.starts_with("/uploads/"));
        let webp = stored.variants.iter().find(|v| v.format == VariantFormat::Webp).unwrap();
        assert_eq!((webp.width, webp.height), (3, 2));

        let file = webp.url.trim_start_matches("/uploads/");
        let written = std::fs::read(dir.path().join(file)).unwrap();
        assert_eq!(written.len() as u64, webp.size_bytes);
        assert_eq!(image::guess_format(&written).unwrap(), ImageFormat::WebP);
    }
}
