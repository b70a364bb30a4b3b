use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use catalog_client::{CatalogApi, ClientConfig};

/// Request ids observed by the stub, in arrival order.
pub type SeenRequestIds = Arc<Mutex<Vec<String>>>;

/// Build a stub of the catalog service with a fixed data set:
/// category 1 "Shirts" binding attribute 3 "Color" as binding 7.
pub fn stub_router(seen: SeenRequestIds) -> Router {
    Router::new()
        .route("/", get(|| async { Json(json!({"status": "ok"})) }))
        .route("/categories/", get(list_categories).post(create_category))
        .route("/categories/{id}/attributes/", get(category_attributes))
        .route("/category-attributes/{id}/", delete(remove_binding))
        .route("/products/full/", post(create_product_full))
        .route("/products/{id}", get(get_product))
        .with_state(seen)
}

/// Serve the stub on an ephemeral port and return a client pointed at it.
pub async fn spawn_stub() -> (CatalogApi, SeenRequestIds) {
    let seen: SeenRequestIds = Arc::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = stub_router(Arc::clone(&seen));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig {
        api_url: format!("http://{addr}/"),
        ..ClientConfig::default()
    };
    (CatalogApi::new(&config).unwrap(), seen)
}

fn record(seen: &SeenRequestIds, headers: &HeaderMap) {
    if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        seen.lock().unwrap().push(id.to_string());
    }
}

async fn list_categories(State(seen): State<SeenRequestIds>, headers: HeaderMap) -> Json<Value> {
    record(&seen, &headers);
    Json(json!([
        {"id": 1, "name": "Shirts", "description": "Tops", "attributes": []},
        {"id": 2, "name": "Shoes", "description": null, "attributes": []}
    ]))
}

async fn create_category(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["name"].as_str().unwrap_or("").is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": [{"loc": ["body", "name"], "msg": "too short"}]})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"id": 3, "name": body["name"], "description": body["description"]})),
    )
}

async fn category_attributes(Path(id): Path<i64>) -> Json<Value> {
    if id != 1 {
        return Json(json!([]));
    }
    Json(json!([{
        "id": 7,
        "category_id": 1,
        "attribute_id": 3,
        "is_required": true,
        "attribute": {"id": 3, "name": "Color", "data_type": "text", "enum_values": null}
    }]))
}

async fn remove_binding(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    if id == 7 {
        (StatusCode::OK, Json(json!({"detail": "Category attribute removed"})))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "CategoryAttribute not found"})),
        )
    }
}

async fn create_product_full(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["sku"] == "DUP" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"detail": "SKU already exists"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": 10,
            "category_id": body["category_id"],
            "name": body["name"],
            "description": body["description"],
            "price": body["price"],
            "sku": body["sku"],
        })),
    )
}

async fn get_product(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    if id != 10 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Product not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "category_id": 1,
            "name": "Tee",
            "description": null,
            "price": 12.5,
            "sku": "TEE-1",
            "attribute_values": [
                {"id": 1, "product_id": 10, "category_attribute_id": 7, "value": "red"}
            ]
        })),
    )
}
