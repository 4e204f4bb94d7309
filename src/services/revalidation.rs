// src/services/revalidation.rs

use std::time::Duration;

use dashmap::DashMap;
use serde_json::{json, Value};

// Rotas do site público que dependem do conteúdo gerenciado aqui
pub const SITE_ROUTES: &[&str] = &["/", "/gallery", "/about", "/collaboration", "/stores"];

// Famílias de conteúdo; cada escrita invalida uma ou mais
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Pages,
    Products,
    Stores,
    I18n,
    Settings,
}

impl CacheTag {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheTag::Pages => "pages",
            CacheTag::Products => "products",
            CacheTag::Stores => "stores",
            CacheTag::I18n => "i18n",
            CacheTag::Settings => "settings",
        }
    }
}

/// Carimbo das gerações das tags no momento em que a resposta foi montada.
pub type Stamp = Vec<(CacheTag, u64)>;

struct CachedResponse {
    stamp: Stamp,
    body: Value,
}

struct RemoteSite {
    client: reqwest::Client,
    endpoint: String,
    secret: Option<String>,
}

/// Cache das respostas públicas, invalidado por tag e por caminho.
///
/// Cada tag tem um contador de geração. Uma resposta guarda as gerações que
/// viu ao ser montada; se alguma mudou desde então ela é descartada na leitura.
/// Isso evita que uma leitura lenta, concorrente com uma escrita, grave no
/// cache um valor anterior à escrita.
pub struct Revalidator {
    generations: DashMap<CacheTag, u64>,
    responses: DashMap<String, CachedResponse>,
    remote: Option<RemoteSite>,
}

impl Revalidator {
    pub fn new(public_site_url: Option<String>, secret: Option<String>) -> Self {
        let remote = public_site_url.and_then(|base| {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .map_err(|e| tracing::warn!("⚠️ Cliente de revalidação indisponível: {}", e))
                .ok()?;
            Some(RemoteSite {
                client,
                endpoint: format!("{}/api/revalidate", base.trim_end_matches('/')),
                secret,
            })
        });

        Self { generations: DashMap::new(), responses: DashMap::new(), remote }
    }

    pub fn generation(&self, tag: CacheTag) -> u64 {
        self.generations.get(&tag).map(|g| *g).unwrap_or(0)
    }

    pub fn stamp(&self, tags: &[CacheTag]) -> Stamp {
        tags.iter().map(|t| (*t, self.generation(*t))).collect()
    }

    fn is_fresh(&self, stamp: &Stamp) -> bool {
        stamp.iter().all(|(tag, seen)| self.generation(*tag) == *seen)
    }

    /// Resposta em cache para `key` (caminho + query), se ainda válida.
    pub fn cached(&self, key: &str) -> Option<Value> {
        {
            // O guard precisa cair antes do remove (mesmo shard)
            let entry = self.responses.get(key)?;
            if self.is_fresh(&entry.stamp) {
                return Some(entry.body.clone());
            }
        }
        self.responses.remove(key);
        None
    }

    /// Guarda a resposta com o carimbo tirado ANTES da leitura no banco.
    pub fn store(&self, key: impl Into<String>, stamp: Stamp, body: Value) {
        if self.is_fresh(&stamp) {
            self.responses.insert(key.into(), CachedResponse { stamp, body });
        }
    }

    /// Invalida localmente e avisa o site público (sem bloquear a resposta).
    pub fn revalidate(&self, tags: &[CacheTag], paths: &[String]) {
        self.invalidate_local(tags, paths);

        if let Some(remote) = &self.remote {
            let client = remote.client.clone();
            let endpoint = remote.endpoint.clone();
            let body = json!({
                "secret": remote.secret,
                "paths": paths,
                "tags": tags.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            });

            tokio::spawn(async move {
                match client.post(&endpoint).json(&body).send().await {
                    Ok(res) if res.status().is_success() => {
                        tracing::debug!("🔄 Site público revalidado ({})", endpoint);
                    }
                    Ok(res) => {
                        tracing::warn!("⚠️ Revalidação recusada pelo site público: {}", res.status());
                    }
                    Err(e) => tracing::warn!("⚠️ Falha ao revalidar o site público: {}", e),
                }
            });
        }
    }

    pub fn invalidate_local(&self, tags: &[CacheTag], paths: &[String]) {
        for tag in tags {
            *self.generations.entry(*tag).or_insert(0) += 1;
        }

        for path in paths {
            let with_query = format!("{}?", path);
            self.responses.retain(|key, _| key != path && !key.starts_with(&with_query));
        }

        tracing::debug!(
            "🧹 Cache invalidado: tags={:?} paths={:?}",
            tags.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            paths
        );
    }

    /// Invalida todas as tags de uma vez (revalidação manual pelo console).
    pub fn revalidate_all(&self) {
        let tags = [
            CacheTag::Pages,
            CacheTag::Products,
            CacheTag::Stores,
            CacheTag::I18n,
            CacheTag::Settings,
        ];
        let paths: Vec<String> = SITE_ROUTES.iter().map(|p| p.to_string()).collect();
        self.revalidate(&tags, &paths);
    }
}

/// Rota do site público que renderiza a página `slug`.
pub fn route_for_page(slug: &str) -> String {
    if slug == "home" {
        "/".to_string()
    } else {
        format!("/{}", slug)
    }
}

pub fn site_routes() -> Vec<String> {
    SITE_ROUTES.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_between_stamp_and_store_discards_the_response() {
        let r = Revalidator::new(None, None);
        let stamp = r.stamp(&[CacheTag::Products]);

        r.invalidate_local(&[CacheTag::Products], &[]);
        r.store("/public/products", stamp, json!(["old"]));

        assert!(r.cached("/public/products").is_none());
    }

    #[test]
    fn tag_invalidation_only_hits_dependent_responses() {
        let r = Revalidator::new(None, None);
        r.store("/public/products", r.stamp(&[CacheTag::Products, CacheTag::I18n]), json!([1]));
        r.store("/public/stores", r.stamp(&[CacheTag::Stores]), json!([2]));

        r.invalidate_local(&[CacheTag::I18n], &[]);

        assert!(r.cached("/public/products").is_none());
        assert_eq!(r.cached("/public/stores"), Some(json!([2])));
    }

    #[test]
    fn path_invalidation_drops_every_query_variant() {
        let r = Revalidator::new(None, None);
        r.store("/public/pages/home?locale=tk", r.stamp(&[]), json!("tk"));
        r.store("/public/pages/home?locale=ru", r.stamp(&[]), json!("ru"));
        r.store("/public/pages/homely", r.stamp(&[]), json!("other"));

        r.invalidate_local(&[], &["/public/pages/home".to_string()]);

        assert!(r.cached("/public/pages/home?locale=tk").is_none());
        assert!(r.cached("/public/pages/home?locale=ru").is_none());
        assert_eq!(r.cached("/public/pages/homely"), Some(json!("other")));
    }

    #[test]
    fn home_page_maps_to_root_route() {
        assert_eq!(route_for_page("home"), "/");
        assert_eq!(route_for_page("about"), "/about");
    }
}
