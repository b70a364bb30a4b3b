//! Integration tests for [`CatalogApi`] against an in-process stub of the
//! catalog service.

mod common;

use assert_matches::assert_matches;

use catalog_client::{CatalogApiError, CatalogBackend};
use catalog_core::models::{AttributeValue, CategoryInput, ProductSubmission};

fn submission(sku: &str) -> ProductSubmission {
    ProductSubmission {
        category_id: 1,
        name: "Tee".into(),
        description: None,
        price: 12.5,
        sku: sku.into(),
        attribute_values: vec![AttributeValue::new(7, "red")],
    }
}

#[tokio::test]
async fn health_check_succeeds() {
    let (api, _) = common::spawn_stub().await;
    api.health().await.unwrap();
}

#[tokio::test]
async fn list_categories_decodes_rows_and_sends_request_id() {
    let (api, seen) = common::spawn_stub().await;

    let categories = api.list_categories().await.unwrap();

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Shirts");
    assert_eq!(categories[1].description, None);

    let ids = seen.lock().unwrap().clone();
    assert_eq!(ids.len(), 1);
    assert!(uuid_like(&ids[0]), "unexpected request id {}", ids[0]);
}

#[tokio::test]
async fn category_attributes_embed_attribute() {
    let (api, _) = common::spawn_stub().await;

    let schema = api.list_category_attributes(1).await.unwrap();

    assert_eq!(schema.len(), 1);
    assert_eq!(schema[0].id, 7);
    assert!(schema[0].is_required);
    assert_eq!(schema[0].attribute.name, "Color");
    assert!(api.list_category_attributes(2).await.unwrap().is_empty());
}

#[tokio::test]
async fn structured_validation_error_is_surfaced() {
    let (api, _) = common::spawn_stub().await;

    let err = api
        .create_category(&CategoryInput::new("", ""))
        .await
        .unwrap_err();

    assert_matches!(err, CatalogApiError::ApiError { status: 422, .. });
    assert!(err.detail().contains("too short"));
}

#[tokio::test]
async fn conflict_on_duplicate_sku() {
    let (api, _) = common::spawn_stub().await;

    let created = api.create_product_full(&submission("TEE-1")).await.unwrap();
    assert_eq!(created.id, 10);

    let err = api.create_product_full(&submission("DUP")).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.detail(), "SKU already exists");
}

#[tokio::test]
async fn product_detail_includes_attribute_values() {
    let (api, _) = common::spawn_stub().await;

    let detail = api.get_product(10).await.unwrap();
    assert_eq!(detail.id, None);
    assert_eq!(detail.attribute_values, vec![AttributeValue::new(7, "red")]);

    let err = api.get_product(11).await.unwrap_err();
    assert_matches!(err, CatalogApiError::ApiError { status: 404, .. });
}

#[tokio::test]
async fn delete_binding_discards_body() {
    let (api, _) = common::spawn_stub().await;

    api.remove_category_attribute(7).await.unwrap();
    let err = api.remove_category_attribute(8).await.unwrap_err();
    assert_eq!(err.detail(), "CategoryAttribute not found");
}

#[tokio::test]
async fn unreachable_service_is_a_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = catalog_client::CatalogApi::with_client(reqwest_client(), format!("http://{addr}"));
    let err = api.list_products().await.unwrap_err();
    assert_matches!(err, CatalogApiError::Request(_));
}

fn reqwest_client() -> reqwest::Client {
    reqwest::Client::new()
}

fn uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().filter(|c| *c == '-').count() == 4
}
