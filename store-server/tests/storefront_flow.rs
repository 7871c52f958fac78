//! End-to-end storefront flow against the full HTTP router
//! Run: cargo test -p store-server --test storefront_flow

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use store_server::core::{Config, ServerState};
use store_server::db::repository::OrderRepository;

async fn test_app() -> (Router, ServerState) {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = Config::with_overrides(tmp.path().to_string_lossy().to_string(), 0);
    config.jwt.secret = "integration-test-secret-32-bytes-min!".to_string();

    let state = ServerState::initialize_in_memory(&config).await;
    state.start_background_tasks().await;
    let app = store_server::api::build_app(&state).with_state(state.clone());
    (app, state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/auth/register",
            None,
            json!({
                "name": "Ada",
                "email": email,
                "password": "correct-horse-battery",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

async fn create_product(app: &Router, token: &str, name: &str, price: f64) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/products",
            Some(token),
            json!({
                "name": name,
                "price": price,
                "category": "Classic",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "product create failed: {}", body);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_me_round_trip() {
    let (app, _state) = test_app().await;

    let token = register(&app, "ada@example.com").await;

    // Duplicate email is rejected with a conflict
    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/register",
            None,
            json!({
                "name": "Ada Again",
                "email": "ada@example.com",
                "password": "correct-horse-battery",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Login with the right password
    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            None,
            json!({ "email": "ada@example.com", "password": "correct-horse-battery" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ada@example.com");

    // Wrong password: unified 401, no hint which part was wrong
    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/login",
            None,
            json!({ "email": "ada@example.com", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // /me returns the fresh account
    let (status, body) = send(&app, get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada");

    // No token: 401
    let (status, _) = send(&app, get("/api/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn checkout_clears_cart_and_persists_order() {
    let (app, _state) = test_app().await;
    let token = register(&app, "buyer@example.com").await;

    let tiramisu = create_product(&app, &token, "Tiramisu", 400.0).await;
    let opera = create_product(&app, &token, "Opera", 600.0).await;

    // Fill the cart: 2 x 400 + 1 x 600
    let (status, _) = send(
        &app,
        post_json(
            "/api/cart/items",
            Some(&token),
            json!({ "product": tiramisu, "quantity": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(
        &app,
        post_json(
            "/api/cart/items",
            Some(&token),
            json!({ "product": opera }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_amount"], 1400.0);
    assert_eq!(body["item_count"], 3);

    // Checkout
    let (status, body) = send(
        &app,
        post_json(
            "/api/orders/checkout",
            Some(&token),
            json!({
                "customer_name": "Ada",
                "customer_address": "1 Main St",
                "customer_phone": "555-0100",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "checkout failed: {}", body);
    assert_eq!(body["total_amount"], 1400.0);
    let order_id = body["order_id"].as_str().unwrap().to_string();

    // Cart is now empty
    let (status, body) = send(&app, get("/api/cart", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item_count"], 0);

    // Order is listed and carries its lines
    let (status, body) = send(&app, get("/api/orders", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["status"], "PENDING");

    let (status, body) = send(&app, get(&format!("/api/orders/{}", order_id), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_amount"], 1400.0);

    // A second checkout with an empty cart is rejected
    let (status, _) = send(
        &app,
        post_json(
            "/api/orders/checkout",
            Some(&token),
            json!({
                "customer_name": "Ada",
                "customer_address": "1 Main St",
                "customer_phone": "555-0100",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn buy_now_leaves_cart_untouched() {
    let (app, _state) = test_app().await;
    let token = register(&app, "direct@example.com").await;

    let tiramisu = create_product(&app, &token, "Tiramisu", 400.0).await;

    // One item parked in the cart
    let (status, _) = send(
        &app,
        post_json(
            "/api/cart/items",
            Some(&token),
            json!({ "product": tiramisu, "quantity": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Buy-now with explicit lines
    let (status, body) = send(
        &app,
        post_json(
            "/api/orders",
            Some(&token),
            json!({
                "customer_name": "Ada",
                "customer_address": "1 Main St",
                "customer_phone": "555-0100",
                "lines": [{ "product": tiramisu, "quantity": 3, "unit_price": 400.0 }],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "buy now failed: {}", body);
    assert_eq!(body["total_amount"], 1200.0);

    // The parked cart line is still there
    let (status, body) = send(&app, get("/api/cart", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item_count"], 1);
}

#[tokio::test]
async fn zero_line_order_is_readable() {
    let (app, state) = test_app().await;
    let token = register(&app, "stub@example.com").await;

    // Header written, line writes never happened (the unguarded second step)
    let (status, body) = send(&app, get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let owner: surrealdb::RecordId = body["id"].as_str().unwrap().parse().unwrap();

    let repo = OrderRepository::new(state.get_db());
    let order = repo
        .create_header(
            &owner,
            "Ada".into(),
            "1 Main St".into(),
            "555-0100".into(),
            String::new(),
            800.0,
            0,
        )
        .await
        .unwrap();
    let order_id = order.id.unwrap().to_string();

    let (status, body) = send(&app, get(&format!("/api/orders/{}", order_id), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"].as_array().unwrap().len(), 0);
    assert_eq!(body["total_amount"], 800.0);
}

#[tokio::test]
async fn favorites_toggle_round_trip() {
    let (app, _state) = test_app().await;
    let token = register(&app, "fan@example.com").await;
    let tiramisu = create_product(&app, &token, "Tiramisu", 400.0).await;

    let (status, body) = send(
        &app,
        post_json(
            &format!("/api/favorites/{}/toggle", tiramisu),
            Some(&token),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product_ids"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, get(&format!("/api/favorites/{}", tiramisu), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    // The list endpoint joins marks back to catalog records
    let (status, body) = send(&app, get("/api/favorites", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Tiramisu");

    let (status, body) = send(
        &app,
        post_json(
            &format!("/api/favorites/{}/toggle", tiramisu),
            Some(&token),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product_ids"].as_array().unwrap().len(), 0);
}

async fn next_sync(
    rx: &mut tokio::sync::broadcast::Receiver<shared::message::BusMessage>,
    resource: &str,
) -> shared::message::SyncPayload {
    loop {
        let msg = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
            .await
            .unwrap_or_else(|_| panic!("no '{}' sync broadcast arrived", resource))
            .unwrap();
        if let Ok(payload) = msg.parse_payload::<shared::message::SyncPayload>()
            && payload.resource == resource
        {
            return payload;
        }
    }
}

#[tokio::test]
async fn cart_and_favorite_mutations_are_broadcast() {
    let (app, state) = test_app().await;
    let token = register(&app, "sync@example.com").await;
    let tiramisu = create_product(&app, &token, "Tiramisu", 400.0).await;

    let mut rx = state.message_bus().subscribe();

    let (status, _) = send(
        &app,
        post_json(
            "/api/cart/items",
            Some(&token),
            json!({ "product": tiramisu, "quantity": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let payload = next_sync(&mut rx, "cart_line").await;
    assert_eq!(payload.action, "created");

    let (status, _) = send(
        &app,
        post_json(
            &format!("/api/favorites/{}/toggle", tiramisu),
            Some(&token),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let payload = next_sync(&mut rx, "favorite").await;
    assert_eq!(payload.action, "toggled");

    // Clearing the cart broadcasts too
    let req = Request::builder()
        .method("DELETE")
        .uri("/api/cart")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let payload = next_sync(&mut rx, "cart_line").await;
    assert_eq!(payload.action, "deleted");
}

#[tokio::test]
async fn catalog_is_public_but_profile_is_not() {
    let (app, _state) = test_app().await;
    let token = register(&app, "browser@example.com").await;
    create_product(&app, &token, "Tiramisu", 400.0).await;

    // Browsing works without any token
    let (status, body) = send(&app, get("/api/products", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, get("/api/products/by-category/Classic", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, get("/api/products/by-category/All", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Feed snapshot carries the same list
    let (status, body) = send(&app, get("/api/products/feed/Classic", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 1);

    // Profile requires a token
    let (status, _) = send(&app, get("/api/profile", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Profile update round trip
    let req = Request::builder()
        .method("PUT")
        .uri("/api/profile")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(json!({ "name": "Ada L." }).to_string()))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada L.");
    assert_eq!(body["email"], "browser@example.com");
}
