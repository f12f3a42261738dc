mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use common::TestApp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;
use tower::ServiceExt;

/// Decimal fields serialize as strings; parse for scale-insensitive compare.
fn decimal_field(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("expected a decimal value, got {}", other),
    }
}

async fn send_json(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            builder.body(Body::from(value.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("request should not fail at the transport level");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("response should carry an id").to_string()
}

#[tokio::test]
async fn product_crud_over_http() {
    let app = TestApp::new().await;

    let (status, product) = send_json(
        &app,
        "POST",
        "/api/v1/products",
        Some(json!({"name": "Camiseta", "price": "20.00", "stock": null})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["name"], "Camiseta");
    assert_eq!(product["effective_stock"], Value::Null);
    let product_id = id_of(&product);

    let (status, fetched) =
        send_json(&app, "GET", &format!("/api/v1/products/{}", product_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], product["id"]);

    let (status, _) = send_json(
        &app,
        "GET",
        &format!("/api/v1/products/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listed) = send_json(&app, "GET", "/api/v1/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn full_matrix_flow_over_http() {
    let app = TestApp::new().await;

    let (_, product) = send_json(
        &app,
        "POST",
        "/api/v1/products",
        Some(json!({"name": "Camiseta", "price": "20.00"})),
    )
    .await;
    let product_id = id_of(&product);

    // Options and values
    let (status, talla) = send_json(
        &app,
        "POST",
        &format!("/api/v1/products/{}/options", product_id),
        Some(json!({"name": "Talla", "position": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let talla_id = id_of(&talla);

    for (i, size) in ["S", "L"].iter().enumerate() {
        let (status, _) = send_json(
            &app,
            "POST",
            &format!("/api/v1/options/{}/values", talla_id),
            Some(json!({"value": size, "position": i})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, color) = send_json(
        &app,
        "POST",
        &format!("/api/v1/products/{}/options", product_id),
        Some(json!({"name": "Color", "position": 1})),
    )
    .await;
    let color_id = id_of(&color);
    let (status, rojo) = send_json(
        &app,
        "POST",
        &format!("/api/v1/options/{}/values", color_id),
        Some(json!({"value": "Rojo", "swatch_hex": "rgb(255, 0, 0)", "position": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    // rgb() input is normalized at write time
    assert_eq!(rojo["swatch_hex"], "#ff0000");

    // Generate the matrix
    let (status, generated) = send_json(
        &app,
        "POST",
        &format!("/api/v1/products/{}/variants/generate", product_id),
        Some(json!({
            "options": [
                {"option_id": talla_id},
                {"option_id": color_id}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generated["created"], 2);

    // Second run is idempotent
    let (status, regenerated) = send_json(
        &app,
        "POST",
        &format!("/api/v1/products/{}/variants/generate", product_id),
        Some(json!({
            "options": [
                {"option_id": talla_id},
                {"option_id": color_id}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(regenerated["created"], 0);

    // Read view resolves combinations and applies the L surcharge
    let (status, variants) = send_json(
        &app,
        "GET",
        &format!("/api/v1/products/{}/variants", product_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let variants = variants.as_array().expect("variant list").clone();
    assert_eq!(variants.len(), 2);

    let l_variant = variants
        .iter()
        .find(|v| v["display_name"].as_str().unwrap().contains("Talla: L"))
        .expect("L variant present");
    assert_eq!(decimal_field(&l_variant["price"]), dec!(21.00));
    assert_eq!(decimal_field(&l_variant["effective_price"]), dec!(21.00));

    // Patch semantics: zero stock and cleared stock are different states
    let variant_id = l_variant["id"].as_str().unwrap();
    let (status, updated) = send_json(
        &app,
        "PUT",
        &format!("/api/v1/variants/{}", variant_id),
        Some(json!({"stock": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["stock"], 0);

    let (status, updated) = send_json(
        &app,
        "PUT",
        &format!("/api/v1/variants/{}", variant_id),
        Some(json!({"stock": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["stock"], Value::Null);

    // Clearing the price falls back to the base price in the read view
    let (status, updated) = send_json(
        &app,
        "PUT",
        &format!("/api/v1/variants/{}", variant_id),
        Some(json!({"price": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], Value::Null);

    let (_, variants) = send_json(
        &app,
        "GET",
        &format!("/api/v1/products/{}/variants", product_id),
        None,
    )
    .await;
    let l_variant = variants
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["id"].as_str() == Some(variant_id))
        .unwrap()
        .clone();
    assert_eq!(l_variant["price"], Value::Null);
    assert_eq!(decimal_field(&l_variant["effective_price"]), dec!(20.00));

    // Deleting the Talla option cascades to every variant
    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/v1/options/{}", talla_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, variants) = send_json(
        &app,
        "GET",
        &format!("/api/v1/products/{}/variants", product_id),
        None,
    )
    .await;
    assert_eq!(variants.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn template_endpoint_flow() {
    let app = TestApp::new().await;

    let (_, product) = send_json(
        &app,
        "POST",
        "/api/v1/products",
        Some(json!({"name": "Sudadera", "price": "25.00"})),
    )
    .await;
    let product_id = id_of(&product);

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/v1/products/{}/template", product_id),
        Some(json!({"template": "ropa"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Applying again conflicts
    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/products/{}/template", product_id),
        Some(json!({"template": "ropa"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("already has"));

    // Unknown templates are a validation error
    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/v1/products/{}/template", product_id),
        Some(json!({"template": "electronics"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, options) = send_json(
        &app,
        "GET",
        &format!("/api/v1/products/{}/options", product_id),
        None,
    )
    .await;
    assert_eq!(options.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn generation_with_no_values_is_a_bad_request() {
    let app = TestApp::new().await;

    let (_, product) = send_json(
        &app,
        "POST",
        "/api/v1/products",
        Some(json!({"name": "Gorra", "price": "9.99"})),
    )
    .await;
    let product_id = id_of(&product);

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/products/{}/variants/generate", product_id),
        Some(json!({"options": []})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("no values to combine"));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
