//! Router tests over the in-memory backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use storedash_core::{EntityKind, Price, UserId};

use crate::db::MemoryCatalogStore;
use crate::services::auth::TokenVerifier;
use crate::state::AppState;

const SECRET: &str = "k3Jx9!qLw2@ZpR7#vN5$tB8&mC4^yH6*";

struct Harness {
    db: Arc<MemoryCatalogStore>,
    router: Router,
    tokens: TokenVerifier,
}

/// store1 (owned by user1) with one row of every kind; bb1 is locked.
async fn harness() -> Harness {
    let db = Arc::new(MemoryCatalogStore::new());
    db.seed_store("store1", "user1", "Main").await.unwrap();
    db.seed_store("store2", "user2", "Other").await.unwrap();
    db.seed_billboard("store1", "bb1", true).await;
    db.seed_billboard("store1", "bb2", false).await;
    db.seed_category("store1", "cat1", "bb2", false).await;
    db.seed_subcategory("store1", "sub1", "cat1", false).await;
    db.seed_size("store1", "size1", false).await;
    db.seed_color("store1", "color1", false).await;
    db.seed_color("store1", "color2", true).await;
    db.seed_color("store2", "color9", false).await;
    db.seed_product(
        "store1",
        "prod1",
        ("cat1", "sub1"),
        Price::new(Decimal::new(1999, 2)).unwrap(),
        false,
    )
    .await;
    db.seed_product(
        "store1",
        "prod2",
        ("cat1", "sub1"),
        Price::new(Decimal::new(500, 2)).unwrap(),
        true,
    )
    .await;

    let tokens = TokenVerifier::new(SecretString::from(SECRET));
    let state = AppState::new(db.clone(), tokens.clone());
    Harness {
        db,
        router: crate::routes::routes().with_state(state),
        tokens,
    }
}

impl Harness {
    fn token(&self, user: &str) -> String {
        self.tokens.issue(&UserId::new(user)).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        caller: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, String) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = caller {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send(Method::GET, uri, None, None).await
    }

    async fn patch(&self, uri: &str, caller: Option<&str>, body: &Value) -> (StatusCode, String) {
        self.send(Method::PATCH, uri, caller, Some(body.to_string()))
            .await
    }

    async fn post(&self, uri: &str, caller: Option<&str>, body: &Value) -> (StatusCode, String) {
        self.send(Method::POST, uri, caller, Some(body.to_string()))
            .await
    }

    async fn delete(&self, uri: &str, caller: Option<&str>) -> (StatusCode, String) {
        self.send(Method::DELETE, uri, caller, None).await
    }
}

fn json_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

fn color_body() -> Value {
    json!({ "name": "Crimson", "value": "#dc143c" })
}

fn product_body(images: Value) -> Value {
    json!({
        "name": "Tee",
        "price": "24.99",
        "categoryId": "cat1",
        "subcategoryId": "sub1",
        "images": images,
    })
}

#[tokio::test]
async fn test_health() {
    let h = harness().await;
    assert_eq!(h.get("/health").await, (StatusCode::OK, "ok".to_owned()));
    assert_eq!(h.get("/health/ready").await.0, StatusCode::OK);

    h.db.set_offline(true);
    assert_eq!(
        h.get("/health/ready").await.0,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_owner_updates_unlocked_color() {
    let h = harness().await;

    let (status, body) = h
        .patch("/api/store1/colors/color1", Some("user1"), &color_body())
        .await;

    assert_eq!(status, StatusCode::OK);
    let color = json_body(&body);
    assert_eq!(color["name"], "Crimson");
    assert_eq!(color["value"], "#dc143c");
    assert_eq!(color["isLocked"], false);
}

#[tokio::test]
async fn test_mutation_without_caller_is_403() {
    let h = harness().await;

    let (status, body) = h
        .patch("/api/store1/colors/color1", None, &color_body())
        .await;
    assert_eq!((status, body.as_str()), (StatusCode::FORBIDDEN, "Unauthenticated"));

    let (status, _) = h.delete("/api/store1/colors/color1", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = h.get("/api/store1/colors/color1").await;
    assert_eq!(json_body(&body)["name"], "Color color1");
}

#[tokio::test]
async fn test_forged_token_is_403() {
    let h = harness().await;
    let forged = TokenVerifier::new(SecretString::from("Zq8#Lm2$Vx7!Rt4&Hp9*Wk3^Bn6@Jc5%"))
        .issue(&UserId::new("user1"))
        .unwrap();

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/store1/colors/color1")
        .header(header::AUTHORIZATION, format!("Bearer {forged}"))
        .body(Body::empty())
        .unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(h.db.is_locked(EntityKind::Color, "color1").await, Some(false));
}

#[tokio::test]
async fn test_foreign_store_is_405() {
    let h = harness().await;

    let (status, body) = h
        .patch("/api/store1/colors/color1", Some("user2"), &color_body())
        .await;
    assert_eq!((status, body.as_str()), (StatusCode::METHOD_NOT_ALLOWED, "Unauthorized"));

    let (status, _) = h.delete("/api/store1/billboards/bb2", Some("user2")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = h
        .patch("/api/nope/colors/color1", Some("user1"), &color_body())
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_locked_color_update_is_409() {
    let h = harness().await;

    let (status, body) = h
        .patch("/api/store1/colors/color2", Some("user1"), &color_body())
        .await;
    assert_eq!((status, body.as_str()), (StatusCode::CONFLICT, "Conflict"));

    let (_, body) = h.get("/api/store1/colors/color2").await;
    let color = json_body(&body);
    assert_eq!(color["name"], "Color color2");
    assert_eq!(color["isLocked"], true);
}

#[tokio::test]
async fn test_locked_billboard_delete_is_409_and_row_survives() {
    let h = harness().await;

    let (status, _) = h.delete("/api/store1/billboards/bb1", Some("user1")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = h.get("/api/store1/billboards/bb1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["id"], "bb1");
}

#[tokio::test]
async fn test_row_in_other_store_is_404() {
    let h = harness().await;

    let (status, body) = h
        .patch("/api/store1/colors/color9", Some("user1"), &color_body())
        .await;
    assert_eq!((status, body.as_str()), (StatusCode::NOT_FOUND, "Not found"));

    let (status, _) = h.delete("/api/store1/colors/missing", Some("user1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = h.get("/api/store2/colors/color9").await;
    assert_eq!(json_body(&body)["name"], "Color color9");
}

#[tokio::test]
async fn test_missing_field_is_400_before_persistence() {
    let h = harness().await;
    h.db.set_offline(true);

    let (status, body) = h
        .patch(
            "/api/store1/billboards/bb2",
            Some("user1"),
            &json!({ "imageUrl": "https://images.example.com/x.png" }),
        )
        .await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "Label is required"));

    let (status, body) = h
        .patch("/api/store1/sizes/size1", Some("user1"), &json!({ "name": "Small" }))
        .await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "Value is required"));
}

#[tokio::test]
async fn test_invalid_json_is_400() {
    let h = harness().await;

    let (status, body) = h
        .send(
            Method::PATCH,
            "/api/store1/colors/color1",
            Some("user1"),
            Some("{not json".to_owned()),
        )
        .await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "Invalid request body"));
}

#[tokio::test]
async fn test_blank_entity_id_is_400() {
    let h = harness().await;

    let (status, body) = h.delete("/api/store1/colors/%20", Some("user1")).await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "Color id is required"));
}

#[tokio::test]
async fn test_backend_failure_is_500() {
    let h = harness().await;
    h.db.set_offline(true);

    let (status, body) = h.delete("/api/store1/colors/color1", Some("user1")).await;
    assert_eq!((status, body.as_str()), (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"));

    let (status, _) = h.get("/api/store1/billboards").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_referenced_billboard_delete_is_500() {
    let h = harness().await;

    let (status, body) = h.delete("/api/store1/billboards/bb2", Some("user1")).await;
    assert_eq!((status, body.as_str()), (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"));
    assert_eq!(h.db.is_locked(EntityKind::Billboard, "bb2").await, Some(false));
}

#[tokio::test]
async fn test_create_then_fetch_round_trips_fields() {
    let h = harness().await;

    let (status, body) = h
        .post(
            "/api/store1/billboards",
            Some("user1"),
            &json!({
                "label": "Autumn",
                "imageUrl": "https://images.example.com/autumn.png",
                "isFeatured": true,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let created = json_body(&body);
    let id = created["id"].as_str().unwrap().to_owned();

    let (status, body) = h.get(&format!("/api/store1/billboards/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let fetched = json_body(&body);
    assert_eq!(fetched["label"], "Autumn");
    assert_eq!(fetched["imageUrl"], "https://images.example.com/autumn.png");
    assert_eq!(fetched["isFeatured"], true);
    assert_eq!(fetched["isLocked"], false);
    assert_eq!(fetched["storeId"], "store1");

    let (_, body) = h.get("/api/store1/billboards").await;
    let list = json_body(&body);
    assert_eq!(list[0]["id"], id.as_str());
}

#[tokio::test]
async fn test_create_checks_caller_then_body_then_store() {
    let h = harness().await;
    let body = json!({ "name": "Large", "value": "L" });

    assert_eq!(
        h.post("/api/store1/sizes", None, &json!({})).await.0,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        h.post("/api/store1/sizes", Some("user2"), &json!({})).await.0,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        h.post("/api/store1/sizes", Some("user2"), &body).await.0,
        StatusCode::METHOD_NOT_ALLOWED
    );
    assert_eq!(
        h.post("/api/store1/sizes", Some("user1"), &body).await.0,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_product_without_images_is_400() {
    let h = harness().await;

    let (status, body) = h
        .patch("/api/store1/products/prod1", Some("user1"), &product_body(json!([])))
        .await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "Images are required"));
}

#[tokio::test]
async fn test_product_update_replaces_images() {
    let h = harness().await;
    let images = json!([
        { "url": "https://images.example.com/a.png" },
        { "url": "https://images.example.com/b.png" },
    ]);

    let (status, body) = h
        .patch("/api/store1/products/prod1", Some("user1"), &product_body(images))
        .await;
    assert_eq!(status, StatusCode::OK);

    let product = json_body(&body);
    assert_eq!(product["name"], "Tee");
    assert_eq!(product["price"], "24.99");
    let urls: Vec<&str> = product["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["url"].as_str().unwrap())
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://images.example.com/a.png",
            "https://images.example.com/b.png"
        ]
    );
    assert_eq!(product["category"]["id"], "cat1");
}

#[tokio::test]
async fn test_locked_product_keeps_images() {
    let h = harness().await;
    let images = json!([{ "url": "https://images.example.com/new.png" }]);

    let (status, _) = h
        .patch("/api/store1/products/prod2", Some("user1"), &product_body(images))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = h.get("/api/store1/products/prod2").await;
    let product = json_body(&body);
    assert_eq!(product["name"], "Product prod2");
    assert_eq!(
        product["images"][0]["url"],
        "https://images.example.com/prod2.png"
    );
    assert_eq!(product["images"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_patch_can_lock_but_not_unlock() {
    let h = harness().await;

    let locking = json!({ "name": "Crimson", "value": "#dc143c", "isLocked": true });
    let (status, _) = h
        .patch("/api/store1/colors/color1", Some("user1"), &locking)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.db.is_locked(EntityKind::Color, "color1").await, Some(true));

    let unlocking = json!({ "name": "Crimson", "value": "#dc143c", "isLocked": false });
    let (status, _) = h
        .patch("/api/store1/colors/color1", Some("user1"), &unlocking)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(h.db.is_locked(EntityKind::Color, "color1").await, Some(true));
}

#[tokio::test]
async fn test_product_list_hides_archived() {
    let h = harness().await;
    let mut archived = product_body(json!([{ "url": "https://images.example.com/c.png" }]));
    archived["isArchived"] = json!(true);

    let (status, _) = h
        .patch("/api/store1/products/prod1", Some("user1"), &archived)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = h.get("/api/store1/products").await;
    let ids: Vec<Value> = json_body(&body)
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!("prod2")]);

    let (_, body) = h.get("/api/store1/products?includeArchived=true").await;
    assert_eq!(json_body(&body).as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_category_includes_billboard() {
    let h = harness().await;

    let (status, body) = h.get("/api/store1/categories/cat1").await;
    assert_eq!(status, StatusCode::OK);
    let category = json_body(&body);
    assert_eq!(category["billboardId"], "bb2");
    assert_eq!(category["billboard"]["id"], "bb2");
}

#[tokio::test]
async fn test_subcategory_lock_guard() {
    let h = harness().await;
    let body = json!({ "name": "Polos", "categoryId": "cat1", "isLocked": true });

    let (status, _) = h
        .patch("/api/store1/subcategories/sub1", Some("user1"), &body)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h.delete("/api/store1/subcategories/sub1", Some("user1")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_stores() {
    let h = harness().await;

    let (status, body) = h.send(Method::GET, "/api/stores", Some("user1"), None).await;
    assert_eq!(status, StatusCode::OK);
    let stores = json_body(&body);
    assert_eq!(stores.as_array().unwrap().len(), 1);
    assert_eq!(stores[0]["id"], "store1");

    assert_eq!(h.get("/api/stores").await.0, StatusCode::FORBIDDEN);

    let (status, _) = h
        .send(Method::GET, "/api/stores/store2", Some("user1"), None)
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, body) = h
        .patch("/api/stores/store1", Some("user1"), &json!({ "name": "Renamed" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["name"], "Renamed");

    let (status, body) = h.post("/api/stores", Some("user3"), &json!({})).await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "Name is required"));

    let (status, body) = h
        .post("/api/stores", Some("user3"), &json!({ "name": "Fresh" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let created = json_body(&body);
    assert_eq!(created["userId"], "user3");

    let id = created["id"].as_str().unwrap();
    let (status, _) = h.delete(&format!("/api/stores/{id}"), Some("user3")).await;
    assert_eq!(status, StatusCode::OK);

    // store1 still has catalog rows
    let (status, _) = h.delete("/api/stores/store1", Some("user1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

/// One locked row, one unlocked row and a valid body for every entity.
fn guarded_rows() -> Vec<(EntityKind, &'static str, &'static str, Value)> {
    vec![
        (
            EntityKind::Billboard,
            "bb1",
            "bb2",
            json!({ "label": "Spring", "imageUrl": "https://images.example.com/spring.png" }),
        ),
        (
            EntityKind::Category,
            "catL",
            "cat1",
            json!({ "name": "Shoes", "billboardId": "bb2" }),
        ),
        (
            EntityKind::Subcategory,
            "subL",
            "sub1",
            json!({ "name": "Polos", "categoryId": "cat1" }),
        ),
        (
            EntityKind::Size,
            "sizeL",
            "size1",
            json!({ "name": "Large", "value": "L" }),
        ),
        (EntityKind::Color, "color2", "color1", color_body()),
        (
            EntityKind::Product,
            "prod2",
            "prod1",
            product_body(json!([{ "url": "https://images.example.com/n.png" }])),
        ),
    ]
}

#[tokio::test]
async fn test_every_entity_guards_writes() {
    let h = harness().await;
    h.db.seed_category("store1", "catL", "bb2", true).await;
    h.db.seed_subcategory("store1", "subL", "cat1", true).await;
    h.db.seed_size("store1", "sizeL", true).await;

    for (kind, locked, unlocked, body) in guarded_rows() {
        let segment = kind.segment();
        let locked_uri = format!("/api/store1/{segment}/{locked}");
        let unlocked_uri = format!("/api/store1/{segment}/{unlocked}");
        let locked_before = h.get(&locked_uri).await;
        let unlocked_before = h.get(&unlocked_uri).await;
        assert_eq!(locked_before.0, StatusCode::OK, "{segment}");
        assert_eq!(unlocked_before.0, StatusCode::OK, "{segment}");

        let cases = [
            (Method::PATCH, &locked_uri, Some("user1"), StatusCode::CONFLICT),
            (Method::DELETE, &locked_uri, Some("user1"), StatusCode::CONFLICT),
            (Method::PATCH, &unlocked_uri, None, StatusCode::FORBIDDEN),
            (Method::DELETE, &unlocked_uri, None, StatusCode::FORBIDDEN),
            (Method::PATCH, &unlocked_uri, Some("user2"), StatusCode::METHOD_NOT_ALLOWED),
            (Method::DELETE, &unlocked_uri, Some("user2"), StatusCode::METHOD_NOT_ALLOWED),
        ];
        for (method, uri, caller, expected) in cases {
            let payload = (method == Method::PATCH).then(|| body.to_string());
            let (status, _) = h.send(method.clone(), uri, caller, payload).await;
            assert_eq!(status, expected, "{method} {uri} as {caller:?}");
        }

        assert_eq!(h.get(&locked_uri).await, locked_before, "{segment}");
        assert_eq!(h.get(&unlocked_uri).await, unlocked_before, "{segment}");
        assert_eq!(h.db.is_locked(kind, locked).await, Some(true), "{segment}");
    }
}

#[tokio::test]
async fn test_reference_into_other_store_is_400() {
    let h = harness().await;
    h.db.seed_billboard("store2", "bb9", false).await;

    let (status, body) = h
        .post(
            "/api/store1/categories",
            Some("user1"),
            &json!({ "name": "Shoes", "billboardId": "bb9" }),
        )
        .await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "Billboard id is invalid"));

    let (status, body) = h
        .patch(
            "/api/store1/categories/cat1",
            Some("user1"),
            &json!({ "name": "Shoes", "billboardId": "bb9" }),
        )
        .await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "Billboard id is invalid"));

    let mut product = product_body(json!([{ "url": "https://images.example.com/n.png" }]));
    product["colorId"] = json!("color9");
    let (status, body) = h.post("/api/store1/products", Some("user1"), &product).await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "Color id is invalid"));

    // nothing in store1 pins store2's billboard
    let (status, _) = h.delete("/api/store2/billboards/bb9", Some("user2")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_price_the_column_cannot_hold_is_400() {
    let h = harness().await;
    h.db.set_offline(true);

    let mut product = product_body(json!([{ "url": "https://images.example.com/n.png" }]));
    product["price"] = json!("0.001");
    let (status, body) = h
        .patch("/api/store1/products/prod1", Some("user1"), &product)
        .await;
    assert_eq!(
        (status, body.as_str()),
        (StatusCode::BAD_REQUEST, "Price must have at most 2 decimal places")
    );

    product["price"] = json!("10000000000");
    let (status, body) = h.post("/api/store1/products", Some("user1"), &product).await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "Price is too large"));
}
