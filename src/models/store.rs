// src/models/store.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PRIORITY: i32 = 100;

// Horário de funcionamento por dia da semana ("09:00-19:00", "Closed")
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct OpeningHours {
    pub mon: Option<String>,
    pub tue: Option<String>,
    pub wed: Option<String>,
    pub thu: Option<String>,
    pub fri: Option<String>,
    pub sat: Option<String>,
    pub sun: Option<String>,
}

// Serviços oferecidos pela loja
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreServices {
    pub free_measure: bool,
    pub delivery: bool,
    pub custom: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    #[schema(example = "ceper")]
    pub slug: String,
    #[schema(example = "Çeper Haly Dükany")]
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    #[schema(example = "retail")]
    pub store_type: String,
    pub address: String,
    pub district: Option<String>,
    #[schema(example = "Ashgabat")]
    pub city: String,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub maps_url: Option<String>,
    #[schema(example = 37.9609)]
    pub latitude: Option<Decimal>,
    #[schema(example = 58.3469)]
    pub longitude: Option<Decimal>,
    #[sqlx(json)]
    pub hours: OpeningHours,
    #[sqlx(json)]
    pub services: StoreServices,
    pub delivery_km: Option<Decimal>,
    pub priority: i32,
    pub is_active: bool,
    pub seo_title: Option<String>,
    pub seo_desc: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Loja normalizada, pronta para INSERT/UPDATE
#[derive(Debug, Clone, PartialEq)]
pub struct StoreDraft {
    pub slug: String,
    pub name: String,
    pub store_type: String,
    pub address: String,
    pub district: Option<String>,
    pub city: String,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub maps_url: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub hours: OpeningHours,
    pub services: StoreServices,
    pub delivery_km: Option<Decimal>,
    pub priority: i32,
    pub is_active: bool,
    pub seo_title: Option<String>,
    pub seo_desc: Option<String>,
}

impl From<Store> for StoreDraft {
    fn from(s: Store) -> Self {
        Self {
            slug: s.slug,
            name: s.name,
            store_type: s.store_type,
            address: s.address,
            district: s.district,
            city: s.city,
            country: s.country,
            phone: s.phone,
            whatsapp: s.whatsapp,
            email: s.email,
            maps_url: s.maps_url,
            latitude: s.latitude,
            longitude: s.longitude,
            hours: s.hours,
            services: s.services,
            delivery_km: s.delivery_km,
            priority: s.priority,
            is_active: s.is_active,
            seo_title: s.seo_title,
            seo_desc: s.seo_desc,
        }
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStorePayload {
    #[validate(length(min = 1, message = "O nome da loja é obrigatório."))]
    pub name: String,

    #[serde(rename = "type")]
    pub store_type: Option<String>,

    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,

    #[validate(length(min = 1, message = "A cidade é obrigatória."))]
    pub city: String,

    pub district: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub maps_url: Option<String>,
    // Nome antigo do campo, aceito como alternativa
    pub google_maps_url: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub hours: Option<OpeningHours>,
    pub services: Option<StoreServices>,
    pub delivery_km: Option<Decimal>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
    pub seo_title: Option<String>,
    pub seo_desc: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStorePayload {
    #[validate(length(min = 1, message = "O nome da loja não pode ser vazio."))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub store_type: Option<String>,
    #[validate(length(min = 1, message = "O endereço não pode ser vazio."))]
    pub address: Option<String>,
    #[validate(length(min = 1, message = "A cidade não pode ser vazia."))]
    pub city: Option<String>,
    pub district: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub maps_url: Option<String>,
    pub google_maps_url: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub hours: Option<OpeningHours>,
    pub services: Option<StoreServices>,
    pub delivery_km: Option<Decimal>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
    pub seo_title: Option<String>,
    pub seo_desc: Option<String>,
}
