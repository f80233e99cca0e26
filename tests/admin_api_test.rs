//! # 管理后台集成测试
//!
//! 角色分级、配对流程、统计与审计日志

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use entity::{ItemStatus, Items, Logs, MatchStatus, Matches, UserRole};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};
use serde_json::json;

async fn item_status(app: &TestApp, id: i32) -> ItemStatus {
    Items::find_by_id(id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap()
        .status
}

/// 安装一个在物品状态写入指定值时中止的触发器
async fn block_item_status(app: &TestApp, status: &str) {
    app.db()
        .execute_unprepared(&format!(
            "CREATE TRIGGER block_item_status BEFORE UPDATE ON items \
             WHEN NEW.status = '{status}' \
             BEGIN SELECT RAISE(ABORT, 'item status blocked'); END;"
        ))
        .await
        .unwrap();
}

#[rstest]
#[case(UserRole::Student, StatusCode::FORBIDDEN)]
#[case(UserRole::Admin, StatusCode::OK)]
#[case(UserRole::SuperAdmin, StatusCode::OK)]
#[tokio::test]
async fn admin_routes_require_admin_tier(#[case] role: UserRole, #[case] expected: StatusCode) {
    let app = TestApp::new().await;
    let user = app.seed_user("Someone", "someone@campus.edu", role).await;

    for uri in ["/api/admin/items", "/api/admin/matches", "/api/admin/stats", "/api/admin/logs"] {
        let (status, _) = app.get(uri, Some(&user.token)).await;
        assert_eq!(status, expected, "{uri}");
    }
}

#[tokio::test]
async fn admin_routes_reject_anonymous() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/admin/stats", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTH_ERROR");
}

#[tokio::test]
async fn student_is_told_admin_is_required() {
    let app = TestApp::new().await;
    let alice = app.student("Alice").await;

    let (status, body) = app.get("/api/admin/items", Some(&alice.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. Admin privileges required.");
}

#[tokio::test]
async fn blue_backpack_walkthrough() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let alice = app.student("Alice").await;
    let bob = app.student("Bob").await;

    let lost = app.report_item(&alice.token, "Blue Backpack", "lost").await;
    let found = app.report_item(&bob.token, "Blue Backpack", "lost").await;

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/admin/items/{found}/status"),
            Some(&admin.token),
            Some(json!({"status": "found"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["status"], "found");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/matches",
            Some(&admin.token),
            Some(json!({"lost_item_id": lost, "found_item_id": found})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Match created successfully");
    assert_eq!(body["match"]["status"], "matched");
    let match_id = body["match"]["match_id"].as_i64().unwrap();

    assert_eq!(item_status(&app, lost).await, ItemStatus::Matched);
    assert_eq!(item_status(&app, found).await, ItemStatus::Matched);

    let (status, body) = app.get("/api/admin/matches", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    let record = &body["matches"][0];
    assert_eq!(record["lostItem"]["creator"]["name"], "Alice");
    assert_eq!(record["foundItem"]["creator"]["name"], "Bob");
    assert_eq!(record["verifier"]["email"], "admin@campus.edu");

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/admin/matches/{match_id}/returned"),
            Some(&admin.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["match"]["status"], "returned");
    assert_eq!(item_status(&app, lost).await, ItemStatus::Resolved);
    assert_eq!(item_status(&app, found).await, ItemStatus::Resolved);

    let (status, body) = app.get("/api/admin/stats", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["stats"],
        json!({
            "totalLost": 0,
            "totalFound": 0,
            "totalMatched": 0,
            "totalResolved": 2,
            "totalUsers": 3,
            "totalMatches": 1,
        })
    );

    let (_, body) = app.get("/api/admin/logs", Some(&admin.token)).await;
    let actions: Vec<&str> = body["logs"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|log| log["action"].as_str())
        .collect();
    assert_eq!(actions[0], "Match marked as returned");
    assert!(actions.contains(&"Items matched"));
    assert!(actions.contains(&"Item status updated to found"));
}

#[tokio::test]
async fn match_requires_complementary_statuses() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let alice = app.student("Alice").await;
    let first = app.report_item(&alice.token, "Keys", "lost").await;
    let second = app.report_item(&alice.token, "Other keys", "lost").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/admin/matches",
            Some(&admin.token),
            Some(json!({"lost_item_id": first, "found_item_id": second})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/admin/matches",
            Some(&admin.token),
            Some(json!({"lost_item_id": first, "found_item_id": first})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/matches",
            Some(&admin.token),
            Some(json!({"lost_item_id": first, "found_item_id": 9999})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "One or both items not found");

    assert_eq!(item_status(&app, first).await, ItemStatus::Lost);
}

#[tokio::test]
async fn returned_match_cannot_be_returned_twice() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let alice = app.student("Alice").await;
    let lost = app.report_item(&alice.token, "Laptop", "lost").await;
    let found = app.report_item(&alice.token, "Laptop", "found").await;

    let (_, body) = app
        .send(
            Method::POST,
            "/api/admin/matches",
            Some(&admin.token),
            Some(json!({"lost_item_id": lost, "found_item_id": found})),
        )
        .await;
    let uri = format!(
        "/api/admin/matches/{}/returned",
        body["match"]["match_id"].as_i64().unwrap()
    );

    let (status, _) = app.send(Method::PATCH, &uri, Some(&admin.token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send(Method::PATCH, &uri, Some(&admin.token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(Method::PATCH, "/api/admin/matches/777/returned", Some(&admin.token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn matched_items_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let alice = app.student("Alice").await;
    let lost = app.report_item(&alice.token, "Watch", "lost").await;
    let found = app.report_item(&alice.token, "Watch", "found").await;

    app.send(
        Method::POST,
        "/api/admin/matches",
        Some(&admin.token),
        Some(json!({"lost_item_id": lost, "found_item_id": found})),
    )
    .await;

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/admin/items/{lost}"), Some(&admin.token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/items/{found}"), Some(&alice.token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn admin_deletes_any_item() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let alice = app.student("Alice").await;
    let id = app.report_item(&alice.token, "Bottle", "found").await;

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/admin/items/{id}"), Some(&admin.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item deleted successfully");

    let (status, _) = app.get(&format!("/api/items/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_status_update_validates_value() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let alice = app.student("Alice").await;
    let id = app.report_item(&alice.token, "Bottle", "found").await;

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/api/admin/items/{id}/status"),
            Some(&admin.token),
            Some(json!({"status": "archived"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PATCH,
            "/api/admin/items/5555/status",
            Some(&admin.token),
            Some(json!({"status": "resolved"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_count_reported_items_by_status() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let alice = app.student("Alice").await;

    for title in ["Keys", "Wallet", "Phone"] {
        app.report_item(&alice.token, title, "lost").await;
    }
    for title in ["Scarf", "Bottle"] {
        app.report_item(&alice.token, title, "found").await;
    }

    let (status, body) = app.get("/api/admin/stats", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["stats"],
        json!({
            "totalLost": 3,
            "totalFound": 2,
            "totalMatched": 0,
            "totalResolved": 0,
            "totalUsers": 2,
            "totalMatches": 0,
        })
    );
}

#[tokio::test]
async fn failed_match_creation_rolls_back() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let alice = app.student("Alice").await;
    let lost = app.report_item(&alice.token, "Headphones", "lost").await;
    let found = app.report_item(&alice.token, "Headphones", "found").await;

    block_item_status(&app, "matched").await;
    let logs_before = Logs::find().count(app.db()).await.unwrap();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/matches",
            Some(&admin.token),
            Some(json!({"lost_item_id": lost, "found_item_id": found})),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "DATABASE_ERROR");
    assert_eq!(body["message"], "Failed to create match");

    assert_eq!(Matches::find().count(app.db()).await.unwrap(), 0);
    assert_eq!(Logs::find().count(app.db()).await.unwrap(), logs_before);
    assert_eq!(item_status(&app, lost).await, ItemStatus::Lost);
    assert_eq!(item_status(&app, found).await, ItemStatus::Found);
}

#[tokio::test]
async fn failed_return_rolls_back() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let alice = app.student("Alice").await;
    let lost = app.report_item(&alice.token, "Jacket", "lost").await;
    let found = app.report_item(&alice.token, "Jacket", "found").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/matches",
            Some(&admin.token),
            Some(json!({"lost_item_id": lost, "found_item_id": found})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let match_id = i32::try_from(body["match"]["match_id"].as_i64().unwrap()).unwrap();

    block_item_status(&app, "resolved").await;
    let logs_before = Logs::find().count(app.db()).await.unwrap();

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/admin/matches/{match_id}/returned"),
            Some(&admin.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to mark as returned");

    let record = Matches::find_by_id(match_id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, MatchStatus::Matched);
    assert_eq!(Logs::find().count(app.db()).await.unwrap(), logs_before);
    assert_eq!(item_status(&app, lost).await, ItemStatus::Matched);
    assert_eq!(item_status(&app, found).await, ItemStatus::Matched);
}
