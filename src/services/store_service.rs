// src/services/store_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, slug::slugify},
    db::StoreRepository,
    models::store::{CreateStorePayload, Store, StoreDraft, UpdateStorePayload, DEFAULT_PRIORITY},
    services::revalidation::{site_routes, CacheTag, Revalidator},
};

fn store_type(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("retail")
        .to_lowercase()
}

// Campo opcional de texto: string vazia vira NULL
fn opt(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// `mapsUrl` e, na falta dele, o nome antigo `googleMapsUrl`.
fn maps_url(maps: &Option<String>, google: &Option<String>) -> Option<String> {
    opt(maps).or_else(|| opt(google))
}

pub fn draft_from_create(p: &CreateStorePayload, slug: String) -> StoreDraft {
    StoreDraft {
        slug,
        name: p.name.trim().to_string(),
        store_type: store_type(p.store_type.as_deref()),
        address: p.address.trim().to_string(),
        district: opt(&p.district),
        city: p.city.trim().to_string(),
        country: opt(&p.country),
        phone: opt(&p.phone),
        whatsapp: opt(&p.whatsapp),
        email: opt(&p.email),
        maps_url: maps_url(&p.maps_url, &p.google_maps_url),
        latitude: p.latitude,
        longitude: p.longitude,
        hours: p.hours.clone().unwrap_or_default(),
        services: p.services.clone().unwrap_or_default(),
        delivery_km: p.delivery_km,
        priority: p.priority.unwrap_or(DEFAULT_PRIORITY),
        is_active: p.is_active.unwrap_or(true),
        seo_title: opt(&p.seo_title),
        seo_desc: opt(&p.seo_desc),
    }
}

pub fn merge_update(mut d: StoreDraft, p: &UpdateStorePayload) -> StoreDraft {
    if let Some(name) = &p.name {
        d.name = name.trim().to_string();
    }
    if p.store_type.is_some() {
        d.store_type = store_type(p.store_type.as_deref());
    }
    if let Some(address) = &p.address {
        d.address = address.trim().to_string();
    }
    if let Some(city) = &p.city {
        d.city = city.trim().to_string();
    }
    if p.district.is_some() {
        d.district = opt(&p.district);
    }
    if p.country.is_some() {
        d.country = opt(&p.country);
    }
    if p.phone.is_some() {
        d.phone = opt(&p.phone);
    }
    if p.whatsapp.is_some() {
        d.whatsapp = opt(&p.whatsapp);
    }
    if p.email.is_some() {
        d.email = opt(&p.email);
    }
    if p.maps_url.is_some() || p.google_maps_url.is_some() {
        d.maps_url = maps_url(&p.maps_url, &p.google_maps_url);
    }
    if p.latitude.is_some() {
        d.latitude = p.latitude;
    }
    if p.longitude.is_some() {
        d.longitude = p.longitude;
    }
    if let Some(hours) = &p.hours {
        d.hours = hours.clone();
    }
    if let Some(services) = &p.services {
        d.services = services.clone();
    }
    if p.delivery_km.is_some() {
        d.delivery_km = p.delivery_km;
    }
    if let Some(priority) = p.priority {
        d.priority = priority;
    }
    if let Some(active) = p.is_active {
        d.is_active = active;
    }
    if p.seo_title.is_some() {
        d.seo_title = opt(&p.seo_title);
    }
    if p.seo_desc.is_some() {
        d.seo_desc = opt(&p.seo_desc);
    }
    d
}

#[derive(Clone)]
pub struct StoreService {
    repo: Arc<dyn StoreRepository>,
    revalidator: Arc<Revalidator>,
}

impl StoreService {
    pub fn new(repo: Arc<dyn StoreRepository>, revalidator: Arc<Revalidator>) -> Self {
        Self { repo, revalidator }
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<Store>, AppError> {
        self.repo.list(active_only).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Store, AppError> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Loja".into()))
    }

    /// "ceper", "ceper-1", "ceper-2"... até achar um livre.
    async fn unique_slug(&self, name: &str) -> Result<String, AppError> {
        let mut base = slugify(name);
        if base.is_empty() {
            base = "store".to_string();
        }

        let mut slug = base.clone();
        let mut suffix = 1;
        while self.repo.slug_exists(&slug).await? {
            slug = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        Ok(slug)
    }

    pub async fn create(&self, payload: CreateStorePayload) -> Result<Store, AppError> {
        payload.validate()?;
        let slug = self.unique_slug(&payload.name).await?;

        let store = self.repo.create(&draft_from_create(&payload, slug)).await?;
        tracing::info!("🏬 Loja criada: {} ({})", store.name, store.slug);

        self.invalidate();
        Ok(store)
    }

    /// PATCH parcial; o slug não muda com o nome.
    pub async fn update(&self, id: Uuid, payload: UpdateStorePayload) -> Result<Store, AppError> {
        payload.validate()?;
        let current = self.get(id).await?;

        let draft = merge_update(StoreDraft::from(current), &payload);
        let store = self
            .repo
            .update(id, &draft)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Loja".into()))?;

        self.invalidate();
        Ok(store)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Loja".into()));
        }
        self.invalidate();
        Ok(())
    }

    fn invalidate(&self) {
        let mut paths = site_routes();
        paths.push("/public/stores".to_string());
        self.revalidator.revalidate(&[CacheTag::Stores], &paths);
    }
}
