//! HTTP surface tests: the axum router driven through `tower::ServiceExt`
//! on the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use erp_server::config::Settings;
use erp_server::http::AppState;
use erp_server::store::{MemoryStore, SharedStore};
use erp_server::{router, Store};

async fn app() -> (Router, AppState) {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let settings = Settings::default_settings();
    let state = AppState::new(store, &settings);
    state
        .users
        .ensure_admin(&settings.auth.admin_email, &settings.auth.admin_password)
        .await
        .unwrap();
    (router(state.clone()), state)
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Log in as the bootstrap admin and return the access token.
async fn admin_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "email": "admin@erp.local", "password": "admin1234" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["accessToken"].as_str().unwrap().to_string()
}

async fn seed_client(app: &Router, token: &str) -> String {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/clients",
            Some(token),
            Some(json!({ "name": "Acme", "email": "ops@acme.test" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn seed_product(app: &Router, token: &str, name: &str, price: &str, stock: i64) -> String {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/products",
            Some(token),
            Some(json!({ "name": name, "price": price, "stock": stock })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let (app, _) = app().await;
    let (status, _) = send(&app, request(Method::GET, "/api/products", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_list_users() {
    let (app, _) = app().await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({
                "name": "Jane",
                "email": "jane@example.com",
                "password": "hunter2345"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let token = admin_token(&app).await;
    let (status, body) = send(&app, request(Method::GET, "/api/users", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    // secrets never serialize
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn role_change_is_admin_only() {
    let (app, _) = app().await;
    let (_, registered) = send(
        &app,
        request(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({
                "name": "Jane",
                "email": "jane@example.com",
                "password": "hunter2345"
            })),
        ),
    )
    .await;
    let user_id = registered["id"].as_str().unwrap().to_string();

    // the new user may not promote themselves
    let (_, login) = send(
        &app,
        request(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "email": "jane@example.com", "password": "hunter2345" })),
        ),
    )
    .await;
    let user_token = login["accessToken"].as_str().unwrap();
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/users/{user_id}/role"),
            Some(user_token),
            Some(json!({ "role": "manager" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = admin_token(&app).await;
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/users/{user_id}/role"),
            Some(&admin),
            Some(json!({ "role": "manager" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "manager");

    // unknown role is a 400
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/users/{user_id}/role"),
            Some(&admin),
            Some(json!({ "role": "root" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_revokes_the_access_token() {
    let (app, _) = app().await;
    let token = admin_token(&app).await;

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/users/logout", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, request(Method::GET, "/api/users", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotates_tokens() {
    let (app, _) = app().await;
    let (_, login) = send(
        &app,
        request(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "email": "admin@erp.local", "password": "admin1234" })),
        ),
    )
    .await;
    let refresh = login["refreshToken"].as_str().unwrap().to_string();

    let (status, rotated) = send(
        &app,
        request(
            Method::POST,
            "/api/users/refresh",
            None,
            Some(json!({ "refreshToken": refresh })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(rotated["refreshToken"].as_str().unwrap(), refresh);

    // superseded token is refused
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/users/refresh",
            None,
            Some(json!({ "refreshToken": refresh })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn order_lifecycle_over_http() {
    let (app, state) = app().await;
    let token = admin_token(&app).await;
    let client = seed_client(&app, &token).await;
    let product = seed_product(&app, &token, "Widget", "10.00", 5).await;

    // create
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({
                "clientId": client,
                "items": [{ "product": product, "quantity": 3 }]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Order created");
    assert_eq!(body["order"]["total"], "30.00");
    assert!(body["order"]["createdAt"].is_string());
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    // populated read
    let (status, populated) = send(
        &app,
        request(Method::GET, &format!("/api/orders/{order_id}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(populated["items"][0]["product"]["name"], "Widget");

    // listing envelope
    let (status, listing) = send(
        &app,
        request(Method::GET, "/api/orders?page=1&limit=10", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["totalPages"], 1);
    assert_eq!(listing["currentPage"], 1);

    // cancel restores stock
    let (status, cancelled) = send(
        &app,
        request(
            Method::DELETE,
            &format!("/api/orders/{order_id}/cancel"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["order"]["status"], "cancelled");

    let stored = state
        .store
        .product(product.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.stock, 5);
}

#[tokio::test]
async fn insufficient_stock_is_a_400_with_details() {
    let (app, _) = app().await;
    let token = admin_token(&app).await;
    let client = seed_client(&app, &token).await;
    let product = seed_product(&app, &token, "Scarce", "99.00", 2).await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({
                "clientId": client,
                "items": [{ "product": product, "quantity": 3 }]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Needed: 3"));
    assert!(message.contains("Available: 2"));
}

#[tokio::test]
async fn cancelling_a_shipped_order_is_a_400() {
    let (app, _) = app().await;
    let token = admin_token(&app).await;
    let client = seed_client(&app, &token).await;
    let product = seed_product(&app, &token, "Widget", "10.00", 5).await;

    let (_, created) = send(
        &app,
        request(
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({
                "clientId": client,
                "items": [{ "product": product, "quantity": 1 }]
            })),
        ),
    )
    .await;
    let order_id = created["order"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            &format!("/api/orders/{order_id}"),
            Some(&token),
            Some(json!({ "status": "shipped" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(
            Method::DELETE,
            &format!("/api/orders/{order_id}/cancel"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn client_create_is_admin_only() {
    let (app, _) = app().await;
    send(
        &app,
        request(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({
                "name": "Jane",
                "email": "jane@example.com",
                "password": "hunter2345"
            })),
        ),
    )
    .await;
    let (_, login) = send(
        &app,
        request(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "email": "jane@example.com", "password": "hunter2345" })),
        ),
    )
    .await;
    let user_token = login["accessToken"].as_str().unwrap();

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/clients",
            Some(user_token),
            Some(json!({ "name": "Acme", "email": "ops@acme.test" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn product_filters_and_duplicate_names() {
    let (app, _) = app().await;
    let token = admin_token(&app).await;
    seed_product(&app, &token, "Blue Widget", "5.00", 10).await;
    seed_product(&app, &token, "Red Widget", "15.00", 0).await;
    seed_product(&app, &token, "Gadget", "50.00", 3).await;

    let (status, body) = send(
        &app,
        request(
            Method::GET,
            "/api/products?name=widget&minPrice=10",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["products"][0]["name"], "Red Widget");

    // duplicate name is refused
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/products",
            Some(&token),
            Some(json!({ "name": "Gadget", "price": "1.00", "stock": 1 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analytics_endpoints() {
    let (app, _) = app().await;
    let token = admin_token(&app).await;
    let client = seed_client(&app, &token).await;
    let product = seed_product(&app, &token, "Widget", "10.00", 50).await;

    send(
        &app,
        request(
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({
                "clientId": client,
                "items": [{ "product": product, "quantity": 4 }]
            })),
        ),
    )
    .await;

    let (status, revenue) = send(
        &app,
        request(Method::GET, "/api/analytics/revenue", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revenue["totalRevenue"], "40.00");

    let (status, per_client) = send(
        &app,
        request(
            Method::GET,
            &format!("/api/analytics/revenue/{client}"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(per_client["clientRevenue"], "40.00");

    let (status, stock) = send(
        &app,
        request(Method::GET, "/api/analytics/stock", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stock["products"][0]["name"], "Widget");
    assert_eq!(stock["products"][0]["stock"], 46);

    // inverted range is a 400
    let (status, _) = send(
        &app,
        request(
            Method::GET,
            "/api/analytics/revenue?from=2026-01-02T00:00:00Z&to=2026-01-01T00:00:00Z",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn client_history_endpoints() {
    let (app, _) = app().await;
    let token = admin_token(&app).await;
    let client = seed_client(&app, &token).await;
    let product = seed_product(&app, &token, "Widget", "10.00", 50).await;

    let (_, created) = send(
        &app,
        request(
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({
                "clientId": client,
                "items": [{ "product": product, "quantity": 2 }]
            })),
        ),
    )
    .await;
    let order_id = created["order"]["id"].as_str().unwrap().to_string();

    let (status, history) = send(
        &app,
        request(
            Method::GET,
            &format!("/api/clients/{client}/orders/history"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["id"].as_str().unwrap(), order_id);

    // manual removal then the list still shows the order (history list and
    // order records are reconciled only by cancel)
    let (status, _) = send(
        &app,
        request(
            Method::DELETE,
            &format!("/api/clients/{client}/orders/{order_id}"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // manual append puts an existing order back
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/clients/{client}/orders"),
            Some(&token),
            Some(json!({ "orderId": order_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // an order id that was never placed is refused
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/clients/{client}/orders"),
            Some(&token),
            Some(json!({ "orderId": uuid::Uuid::new_v4().to_string() })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("Order not found"));
}
