//! Router completo: sessão do admin, leitura pública e arquivos estáticos.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use haly_cms::build_router;

async fn send(app: &Router, request: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn admin_api_without_session_is_401_json() {
    let env = common::test_env().await;
    let app = build_router(env.state.clone());

    let response = send(&app, get("/api/admin/products")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::LOCATION).is_none());

    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn console_without_session_redirects_to_login_with_next() {
    let env = common::test_env().await;
    let app = build_router(env.state.clone());

    let response = send(&app, get("/console/products?tab=images")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert_eq!(location, "/console/login?next=%2Fconsole%2Fproducts%3Ftab%3Dimages");
}

#[tokio::test]
async fn dot_segments_after_login_do_not_skip_the_gate() {
    let env = common::test_env().await;
    std::fs::write(env.dir.path().join("console/dashboard.html"), "<h1>painel</h1>").unwrap();
    let app = build_router(env.state.clone());

    for uri in [
        "/console/dashboard.html",
        "/console/login/../dashboard.html",
        "/console/login/%2e%2e/dashboard.html",
        "/console/login/",
    ] {
        let response = send(&app, get(uri)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
    }

    // Com sessão o arquivo é servido
    let mut request = get("/console/dashboard.html");
    request.headers_mut().insert(header::COOKIE, common::session_cookie().parse().unwrap());
    assert_eq!(send(&app, request).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_page_is_reachable_without_session() {
    let env = common::test_env().await;
    std::fs::write(env.dir.path().join("console/index.html"), "<div id=app></div>").unwrap();
    let app = build_router(env.state.clone());

    let response = send(&app, get("/console/login")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
}

#[tokio::test]
async fn login_sets_cookie_that_opens_the_admin_api() {
    let env = common::test_env().await;
    let app = build_router(env.state.clone());

    let wrong = send(&app, json_request("POST", "/api/admin/login", json!({ "password": "nope" }), None)).await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        json_request("POST", "/api/admin/login", json!({ "password": common::ADMIN_PASSWORD }), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("abadan_admin="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=43200"));

    let cookie = set_cookie.split(';').next().unwrap();
    let mut request = get("/api/admin/products");
    request.headers_mut().insert(header::COOKIE, cookie.parse().unwrap());
    assert_eq!(send(&app, request).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn sixth_login_attempt_from_one_ip_is_rate_limited() {
    let env = common::test_env().await;
    let app = build_router(env.state.clone());

    let attempt = || {
        let mut request = json_request("POST", "/api/admin/login", json!({ "password": "bad" }), None);
        request.headers_mut().insert("x-forwarded-for", "203.0.113.9".parse().unwrap());
        request
    };

    for _ in 0..5 {
        assert_eq!(send(&app, attempt()).await.status(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(send(&app, attempt()).await.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_reset_the_limit() {
    let env = common::test_env().await;
    let app = build_router(env.state.clone());

    // Sem TRUST_PROXY o cabeçalho é ignorado e todas contam para o mesmo cliente
    let mut statuses = Vec::new();
    for n in 0..6 {
        let mut request = json_request("POST", "/api/admin/login", json!({ "password": "bad" }), None);
        let ip = format!("198.51.100.{n}");
        request.headers_mut().insert("x-forwarded-for", ip.parse().unwrap());
        statuses.push(send(&app, request).await.status());
    }

    assert!(statuses[..5].iter().all(|s| *s == StatusCode::UNAUTHORIZED));
    assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn duplicate_sku_over_http_is_409() {
    let env = common::test_env().await;
    let app = build_router(env.state.clone());
    let cookie = common::session_cookie();

    let payload = json!({ "sku": "AH-900", "color": "red" });
    let created = send(&app, json_request("POST", "/api/admin/products", payload.clone(), Some(&cookie))).await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let again = send(&app, json_request("POST", "/api/admin/products", payload, Some(&cookie))).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(again).await["ok"], false);
    assert_eq!(env.products.count(), 1);
}

#[tokio::test]
async fn public_stores_are_active_only_and_sorted_by_priority() {
    let env = common::test_env().await;
    let app = build_router(env.state.clone());
    let cookie = common::session_cookie();

    let stores = [
        json!({ "name": "Aşgabat Merkez", "address": "Magtymguly 1", "city": "Aşgabat", "priority": 20 }),
        json!({ "name": "Mary", "address": "Bazar 4", "city": "Mary", "priority": 5 }),
        json!({ "name": "Ombar", "address": "Senagat 9", "city": "Aşgabat", "priority": 1, "isActive": false }),
    ];
    for store in stores {
        let response = send(&app, json_request("POST", "/api/admin/stores", store, Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let body = body_json(send(&app, get("/public/stores")).await).await;
    let names: Vec<&str> = body.as_array().unwrap().iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Mary", "Aşgabat Merkez"]);
}

#[tokio::test]
async fn admin_write_invalidates_cached_public_response() {
    let env = common::test_env().await;
    let app = build_router(env.state.clone());
    let cookie = common::session_cookie();

    let empty = body_json(send(&app, get("/public/products")).await).await;
    assert_eq!(empty, json!([]));

    let created = send(
        &app,
        json_request("POST", "/api/admin/products", json!({ "sku": "AH-3", "color": "green" }), Some(&cookie)),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let fresh = body_json(send(&app, get("/public/products")).await).await;
    assert_eq!(fresh.as_array().unwrap().len(), 1);
    assert_eq!(fresh[0]["sku"], "AH-3");
}

#[tokio::test]
async fn public_translations_reject_unknown_locale() {
    let env = common::test_env().await;
    let app = build_router(env.state.clone());

    assert_eq!(send(&app, get("/public/translations/de")).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(send(&app, get("/public/translations/ru")).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn static_fallback_serves_files_and_blocks_traversal() {
    let env = common::test_env().await;
    std::fs::write(env.dir.path().join("dist/index.html"), "<h1>Abadan Haly</h1>").unwrap();
    std::fs::write(env.dir.path().join("secret.env"), "KEY=1").unwrap();
    let app = build_router(env.state.clone());

    let index = send(&app, get("/")).await;
    assert_eq!(index.status(), StatusCode::OK);
    assert_eq!(index.headers()[header::CACHE_CONTROL], "public, max-age=31536000");

    let escaped = send(&app, get("/%2e%2e/secret.env")).await;
    assert_eq!(escaped.status(), StatusCode::FORBIDDEN);

    assert_eq!(send(&app, get("/missing.js")).await.status(), StatusCode::NOT_FOUND);
}
