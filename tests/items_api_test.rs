//! # 物品接口集成测试

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use entity::{Items, Logs};
use pretty_assertions::assert_eq;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};
use serde_json::json;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

#[tokio::test]
async fn report_and_browse_items() {
    let app = TestApp::new().await;
    let alice = app.student("Alice").await;

    let backpack = app.report_item(&alice.token, "Blue Backpack", "lost").await;
    app.report_item(&alice.token, "Umbrella", "found").await;

    let (status, body) = app.get("/api/items", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "Umbrella");
    assert_eq!(items[1]["creator"]["name"], "Alice");

    let (status, body) = app.get(&format!("/api/items/{backpack}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["status"], "lost");
    assert_eq!(body["item"]["creator"]["email"], "alice@campus.edu");

    let logs = Logs::find().all(app.db()).await.unwrap();
    assert!(logs.iter().any(|log| log.action == "Item lost reported"));
}

#[tokio::test]
async fn list_filters_by_status_category_and_search() {
    let app = TestApp::new().await;
    let alice = app.student("Alice").await;
    app.report_item(&alice.token, "Blue Backpack", "lost").await;
    app.report_item(&alice.token, "Red Scarf", "found").await;

    let (_, body) = app.get("/api/items?status=found", None).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Red Scarf");

    let (_, body) = app.get("/api/items?search=backpack", None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/items?category=Electronics", None).await;
    assert!(body["items"].as_array().unwrap().is_empty());

    let (_, body) = app.get("/api/items?status=&category=", None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let (status, _) = app.get("/api/items?status=stolen", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_item_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/items/424242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Item not found");
    assert!(body.get("item").is_none());

    let (status, body) = app.get("/api/items/not-a-number", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid id");
}

#[tokio::test]
async fn create_validates_fields() {
    let app = TestApp::new().await;
    let alice = app.student("Alice").await;

    let (status, _) = app
        .send(Method::POST, "/api/items", None, Some(json!({"title": "x"})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/items",
            Some(&alice.token),
            Some(json!({
                "title": "Keys",
                "description": "Car keys",
                "category": "Keys",
                "location": "Gym",
                "status": "matched",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Status must be either 'lost' or 'found'");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/items",
            Some(&alice.token),
            Some(json!({"title": "Keys", "description": "Car keys", "status": "lost"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "category is required");
}

#[tokio::test]
async fn my_items_only_lists_own() {
    let app = TestApp::new().await;
    let alice = app.student("Alice").await;
    let bob = app.student("Bob").await;
    app.report_item(&alice.token, "Wallet", "lost").await;
    app.report_item(&bob.token, "Phone", "found").await;

    let (status, body) = app.get("/api/items/user/my-items", Some(&bob.token)).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Phone");
}

#[tokio::test]
async fn owner_updates_item_and_keeps_blank_fields() {
    let app = TestApp::new().await;
    let alice = app.student("Alice").await;
    let id = app.report_item(&alice.token, "Wallet", "lost").await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/items/{id}"),
            Some(&alice.token),
            Some(json!({"title": "Brown Wallet", "location": "  "})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item updated successfully");
    assert_eq!(body["item"]["title"], "Brown Wallet");
    assert_eq!(body["item"]["location"], "Library");
}

#[tokio::test]
async fn other_students_cannot_modify_item() {
    let app = TestApp::new().await;
    let alice = app.student("Alice").await;
    let mallory = app.student("Mallory").await;
    let id = app.report_item(&alice.token, "Wallet", "lost").await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/items/{id}"),
            Some(&mallory.token),
            Some(json!({"title": "Mine now"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to update this item");

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/items/{id}"), Some(&mallory.token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to delete this item");

    let (status, body) = app.get(&format!("/api/items/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["title"], "Wallet");
}

#[tokio::test]
async fn owner_deletes_item() {
    let app = TestApp::new().await;
    let alice = app.student("Alice").await;
    let id = app.report_item(&alice.token, "Wallet", "lost").await;

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/items/{id}"), Some(&alice.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item deleted successfully");

    assert!(Items::find_by_id(id).one(app.db()).await.unwrap().is_none());
}

#[tokio::test]
async fn failed_audit_write_keeps_item() {
    let app = TestApp::new().await;
    let alice = app.student("Alice").await;
    let id = app.report_item(&alice.token, "Notebook", "lost").await;

    app.db()
        .execute_unprepared(
            "CREATE TRIGGER block_delete_log BEFORE INSERT ON logs \
             WHEN NEW.action = 'Item deleted' \
             BEGIN SELECT RAISE(ABORT, 'log insert blocked'); END;",
        )
        .await
        .unwrap();
    let logs_before = Logs::find().count(app.db()).await.unwrap();

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/items/{id}"), Some(&alice.token), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to delete item");

    assert!(Items::find_by_id(id).one(app.db()).await.unwrap().is_some());
    assert_eq!(Logs::find().count(app.db()).await.unwrap(), logs_before);
}

#[tokio::test]
async fn multipart_upload_stores_image() {
    let app = TestApp::new().await;
    let alice = app.student("Alice").await;

    let (status, body) = app
        .send_multipart(
            Method::POST,
            "/api/items",
            &alice.token,
            &[
                ("title", "Camera"),
                ("description", "Black compact camera"),
                ("category", "Electronics"),
                ("location", "Cafeteria"),
                ("status", "found"),
            ],
            Some(("camera.png", "image/png", PNG_BYTES)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let image_url = body["item"]["image_url"].as_str().unwrap();
    assert!(image_url.starts_with("/uploads/"));
    assert!(image_url.ends_with(".png"));

    let file_name = image_url.trim_start_matches("/uploads/");
    let stored = std::fs::read(app.uploads.path().join(file_name)).unwrap();
    assert_eq!(stored, PNG_BYTES);

    let (status, _) = app.get(image_url, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn multipart_rejects_non_image() {
    let app = TestApp::new().await;
    let alice = app.student("Alice").await;

    let (status, _) = app
        .send_multipart(
            Method::POST,
            "/api/items",
            &alice.token,
            &[
                ("title", "Script"),
                ("description", "Not an image"),
                ("category", "Misc"),
                ("location", "Lab"),
                ("status", "found"),
            ],
            Some(("run.sh", "text/x-shellscript", b"#!/bin/sh")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(Items::find().all(app.db()).await.unwrap().is_empty());
    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn replacing_image_removes_old_file() {
    let app = TestApp::new().await;
    let alice = app.student("Alice").await;

    let fields = [
        ("title", "Camera"),
        ("description", "Black compact camera"),
        ("category", "Electronics"),
        ("location", "Cafeteria"),
        ("status", "found"),
    ];
    let (_, body) = app
        .send_multipart(
            Method::POST,
            "/api/items",
            &alice.token,
            &fields,
            Some(("a.png", "image/png", PNG_BYTES)),
        )
        .await;
    let id = body["item"]["item_id"].as_i64().unwrap();
    let old_url = body["item"]["image_url"].as_str().unwrap().to_string();

    let (status, body) = app
        .send_multipart(
            Method::PUT,
            &format!("/api/items/{id}"),
            &alice.token,
            &[],
            Some(("b.jpg", "image/jpeg", b"\xff\xd8\xff-jpeg")),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let new_url = body["item"]["image_url"].as_str().unwrap();
    assert_ne!(new_url, old_url);

    let old_file = app.uploads.path().join(old_url.trim_start_matches("/uploads/"));
    assert!(!old_file.exists());
}
