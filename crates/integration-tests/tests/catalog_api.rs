//! End-to-end tests for the catalog API over HTTP.
//!
//! Each test starts its own server with the in-memory backend, so these run
//! without a database.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use serde_json::{Value, json};

use storedash_admin::client::{CatalogApi, CatalogClient};
use storedash_admin::models::{Billboard, CategoryWithBillboard, Color, ProductWithRelations};
use storedash_core::{EntityKind, ErrorKind, StoreId};
use storedash_integration_tests::TestServer;

fn store1() -> StoreId {
    StoreId::new("store1")
}

#[tokio::test]
async fn test_health_endpoints() {
    let server = TestServer::start().await;
    let http = reqwest::Client::new();

    let resp = http
        .get(format!("{}/health", server.base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");

    server.db.set_offline(true);
    let resp = http
        .get(format!("{}/health/ready", server.base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
}

#[tokio::test]
async fn test_owner_updates_color() {
    let server = TestServer::start().await;
    let client = server.client_for("user1");

    let updated = client
        .update(
            EntityKind::Color,
            &store1(),
            "color1",
            &json!({ "name": "Navy", "value": "#000080" }),
        )
        .await
        .unwrap();
    assert_eq!(updated["value"], "#000080");

    let color: Color = client
        .fetch(EntityKind::Color, &store1(), "color1")
        .await
        .unwrap();
    assert_eq!(color.name, "Navy");
    assert!(!color.is_locked);
}

#[tokio::test]
async fn test_locked_billboard_delete_conflicts() {
    let server = TestServer::start().await;
    let client = server.client_for("user1");

    let err = client
        .delete(EntityKind::Billboard, &store1(), "bb1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::LockConflict);
    assert_eq!(err.status, 409);

    let billboard: Billboard = client
        .fetch(EntityKind::Billboard, &store1(), "bb1")
        .await
        .unwrap();
    assert!(billboard.is_locked);
}

#[tokio::test]
async fn test_status_taxonomy() {
    let server = TestServer::start().await;
    let body = json!({ "name": "Navy", "value": "#000080" });

    let err = server
        .anonymous_client()
        .update(EntityKind::Color, &store1(), "color1", &body)
        .await
        .unwrap_err();
    assert_eq!((err.kind, err.status), (ErrorKind::Authentication, 403));

    let err = server
        .client_for("user2")
        .update(EntityKind::Color, &store1(), "color1", &body)
        .await
        .unwrap_err();
    assert_eq!((err.kind, err.status), (ErrorKind::Authorization, 405));

    let err = server
        .client_for("user1")
        .update(EntityKind::Color, &store1(), "color1", &json!({ "name": "Navy" }))
        .await
        .unwrap_err();
    assert_eq!((err.kind, err.status), (ErrorKind::Validation, 400));
    assert_eq!(err.message, "Value is required");

    let err = server
        .client_for("user1")
        .update(EntityKind::Color, &store1(), "color9", &body)
        .await
        .unwrap_err();
    assert_eq!((err.kind, err.status), (ErrorKind::NotFound, 404));

    server.db.set_offline(true);
    let err = server
        .client_for("user1")
        .update(EntityKind::Color, &store1(), "color1", &body)
        .await
        .unwrap_err();
    assert_eq!((err.kind, err.status), (ErrorKind::Internal, 500));
    assert_eq!(err.message, "Internal error");
}

#[tokio::test]
async fn test_transport_failure_is_internal() {
    // nothing listens on the discard port
    let client = CatalogClient::new("http://127.0.0.1:9", None).unwrap();

    let err = client
        .delete(EntityKind::Size, &store1(), "size1")
        .await
        .unwrap_err();
    assert_eq!((err.kind, err.status), (ErrorKind::Internal, 0));
}

#[tokio::test]
async fn test_product_lifecycle() {
    let server = TestServer::start().await;
    let client = server.client_for("user1");

    let created = client
        .create(
            EntityKind::Product,
            &store1(),
            &json!({
                "name": "Hoodie",
                "description": "Heavyweight fleece",
                "price": "59.00",
                "categoryId": "cat1",
                "subcategoryId": "sub1",
                "sizeId": "size1",
                "colorId": "color1",
                "isFeatured": true,
                "images": [{ "url": "https://images.example.com/hoodie.png" }],
            }),
        )
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_owned();

    let product: ProductWithRelations = client
        .fetch(EntityKind::Product, &store1(), &id)
        .await
        .unwrap();
    assert_eq!(product.product.name, "Hoodie");
    assert_eq!(product.product.description.as_deref(), Some("Heavyweight fleece"));
    assert_eq!(product.images.len(), 1);
    assert_eq!(product.size.unwrap().id.as_str(), "size1");
    assert_eq!(product.color.unwrap().id.as_str(), "color1");

    // the size is now in use
    let err = client
        .delete(EntityKind::Size, &store1(), "size1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);

    let deleted = client
        .delete(EntityKind::Product, &store1(), &id)
        .await
        .unwrap();
    assert_eq!(deleted["id"], Value::String(id.clone()));

    let err = client
        .fetch::<Value>(EntityKind::Product, &store1(), &id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    client
        .delete(EntityKind::Size, &store1(), "size1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_product_filters() {
    let server = TestServer::start().await;
    let client = server.client_for("user1");

    let all: Vec<ProductWithRelations> = client
        .list(EntityKind::Product, &store1())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let url = format!("{}/api/store1/products?isFeatured=true", server.base_url());
    let featured: Vec<Value> = reqwest::get(url).await.unwrap().json().await.unwrap();
    assert!(featured.is_empty());

    let url = format!("{}/api/store1/products?categoryId=cat1", server.base_url());
    let in_category: Vec<Value> = reqwest::get(url).await.unwrap().json().await.unwrap();
    assert_eq!(in_category.len(), 2);
}

#[tokio::test]
async fn test_categories_carry_billboard() {
    let server = TestServer::start().await;

    let categories: Vec<CategoryWithBillboard> = server
        .anonymous_client()
        .list(EntityKind::Category, &store1())
        .await
        .unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(
        categories[0].billboard.as_ref().map(|b| b.id.as_str()),
        Some("bb2")
    );
}

#[tokio::test]
async fn test_store_scoping() {
    let server = TestServer::start().await;
    let client = server.client_for("user1");

    let colors: Vec<Color> = client
        .list(EntityKind::Color, &StoreId::new("store2"))
        .await
        .unwrap();
    assert_eq!(colors.len(), 1);
    assert_eq!(colors[0].id.as_str(), "color9");

    let err = client
        .delete(EntityKind::Color, &StoreId::new("store2"), "color9")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_create_store_through_client() {
    let server = TestServer::start().await;
    let client = server.client_for("user7");

    let store: Value = client
        .create_store(&json!({ "name": "Pop-up" }))
        .await
        .unwrap();
    assert_eq!(store["userId"], "user7");

    let store_id = StoreId::new(store["id"].as_str().unwrap());
    let created = client
        .create(
            EntityKind::Size,
            &store_id,
            &json!({ "name": "Medium", "value": "M" }),
        )
        .await
        .unwrap();
    assert_eq!(created["storeId"], store_id.as_str());
}
