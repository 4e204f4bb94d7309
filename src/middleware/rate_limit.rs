// src/middleware/rate_limit.rs

use std::{
    net::SocketAddr,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use dashmap::DashMap;

use crate::{common::error::AppError, config::AppState};

const MAX_ATTEMPTS: u32 = 5;
const WINDOW: Duration = Duration::from_secs(10 * 60);

struct Attempts {
    count: u32,
    reset_at: Instant,
}

/// Contador de tentativas de login por IP, em memória (zera no restart).
pub struct LoginRateLimiter {
    attempts: DashMap<String, Attempts>,
    max_attempts: u32,
    window: Duration,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(MAX_ATTEMPTS, WINDOW)
    }
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self { attempts: DashMap::new(), max_attempts, window }
    }

    /// Registra uma tentativa; erro se o IP passou do limite na janela.
    pub fn check(&self, ip: &str) -> Result<(), AppError> {
        let now = Instant::now();
        // Janelas vencidas saem do mapa antes da contagem
        self.attempts.retain(|_, attempts| attempts.reset_at > now);

        let mut entry = self
            .attempts
            .entry(ip.to_string())
            .or_insert(Attempts { count: 0, reset_at: now + self.window });
        entry.count += 1;

        if entry.count > self.max_attempts {
            tracing::warn!("🚫 Limite de login excedido para {}", ip);
            return Err(AppError::TooManyRequests);
        }
        Ok(())
    }
}

// IP do cliente. X-Forwarded-For / X-Real-IP só valem atrás de um proxy
// configurado (TRUST_PROXY); fora disso o endereço do socket.
pub struct ClientIp(pub String);

fn client_ip(parts: &Parts, trust_proxy: bool) -> String {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let forwarded = if trust_proxy {
        header("x-forwarded-for").or_else(|| header("x-real-ip"))
    } else {
        None
    };

    forwarded
        .or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(client_ip(parts, state.config.trust_proxy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixth_attempt_in_the_window_is_refused() {
        let limiter = LoginRateLimiter::default();
        for _ in 0..5 {
            assert!(limiter.check("10.0.0.1").is_ok());
        }
        assert!(matches!(limiter.check("10.0.0.1"), Err(AppError::TooManyRequests)));
        // Outros IPs não são afetados
        assert!(limiter.check("10.0.0.2").is_ok());
    }

    fn parts(forwarded_for: &str, peer: &str) -> Parts {
        let mut request = axum::http::Request::builder()
            .header("x-forwarded-for", forwarded_for)
            .body(())
            .unwrap();
        let addr: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        request.into_parts().0
    }

    #[test]
    fn forwarded_header_only_counts_behind_a_proxy() {
        let parts = parts("203.0.113.9, 10.0.0.1", "192.0.2.4:5120");
        assert_eq!(client_ip(&parts, false), "192.0.2.4");
        assert_eq!(client_ip(&parts, true), "203.0.113.9");
    }

    #[test]
    fn expired_windows_are_swept() {
        let limiter = LoginRateLimiter::new(5, Duration::from_millis(0));
        limiter.check("a").unwrap();
        limiter.check("b").unwrap();
        std::thread::sleep(Duration::from_millis(5));

        limiter.check("c").unwrap();
        assert_eq!(limiter.attempts.len(), 1);
        assert!(limiter.attempts.contains_key("c"));
    }

    #[test]
    fn window_expiry_resets_the_counter() {
        let limiter = LoginRateLimiter::new(1, Duration::from_millis(0));
        assert!(limiter.check("ip").is_ok());
        std::thread::sleep(Duration::from_millis(5));
        assert!(limiter.check("ip").is_ok());
    }
}
