//! Integration tests for record browsing and upload recording

mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use tower::util::ServiceExt;

use anidex_server::db::animals::insert_animal;
use anidex_server::models::NewAnimal;
use helpers::*;

const TIGER_LABEL: &str = "Malayan_tiger, Panthera tigris";

async fn browse_app(record_uploads: bool) -> TestApp {
    create_test_app(
        StubClassifier::label(TIGER_LABEL),
        StubLookup::default().with(TIGER_LABEL, tiger_record()).into_arc(),
        record_uploads,
    )
    .await
}

async fn seed(app: &TestApp, label: &str, info: Option<&str>, minutes_ago: i64) -> i64 {
    let mut animal = NewAnimal::new(format!("animals/{}.jpg", label), Some(label.to_string()));
    animal.info = info.map(str::to_string);
    animal.created_at = Utc::now() - Duration::minutes(minutes_ago);
    insert_animal(&app.pool, &animal).await.unwrap().id
}

#[tokio::test]
async fn test_upload_recorded_when_enabled() {
    let app = browse_app(true).await;

    let response = app
        .router
        .clone()
        .oneshot(upload_request("image", Some("tiger.jpg"), b"jpeg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let upload = body_json(response).await;

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/animals"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["total_results"], 1);
    let record = &json["animals"][0];
    assert_eq!(record["predicted_label"], "Malayan_tiger");
    assert!(record["info"].is_null());
    assert_eq!(record["image_url"], upload["image_url"]);
    assert!(record["image"].as_str().unwrap().starts_with("animals/"));

    let id = record["id"].as_i64().unwrap();
    let response = app
        .router
        .oneshot(get_request(&format!("/api/animals/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["display_name"], "Malayan_tiger");
}

#[tokio::test]
async fn test_upload_not_recorded_by_default() {
    let app = browse_app(false).await;

    let response = app
        .router
        .clone()
        .oneshot(upload_request("image", Some("tiger.jpg"), b"jpeg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.router.oneshot(get_request("/api/animals")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total_results"], 0);
    assert_eq!(json["animals"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_failed_upload_not_recorded() {
    let app = create_test_app(
        StubClassifier::unavailable(),
        StubLookup::default().into_arc(),
        true,
    )
    .await;

    let response = app
        .router
        .clone()
        .oneshot(upload_request("image", Some("x.jpg"), b"garbage"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.router.oneshot(get_request("/api/animals")).await.unwrap();
    assert_eq!(body_json(response).await["total_results"], 0);
}

#[tokio::test]
async fn test_list_newest_first() {
    let app = browse_app(false).await;
    seed(&app, "zebra", None, 30).await;
    seed(&app, "tiger", None, 10).await;
    seed(&app, "koala", None, 20).await;

    let response = app.router.oneshot(get_request("/api/animals")).await.unwrap();
    let json = body_json(response).await;

    let labels: Vec<&str> = json["animals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["predicted_label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["tiger", "koala", "zebra"]);
}

#[tokio::test]
async fn test_filter_by_label() {
    let app = browse_app(false).await;
    seed(&app, "tiger", None, 3).await;
    seed(&app, "tiger_cat", None, 2).await;
    seed(&app, "zebra", None, 1).await;

    let response = app
        .router
        .oneshot(get_request("/api/animals?predicted_label=tiger"))
        .await
        .unwrap();
    let json = body_json(response).await;

    assert_eq!(json["total_results"], 1);
    assert_eq!(json["animals"][0]["predicted_label"], "tiger");
}

#[tokio::test]
async fn test_search_label_and_info() {
    let app = browse_app(false).await;
    seed(&app, "tiger", None, 3).await;
    seed(&app, "zebra", Some("Seen near the TIGER enclosure"), 2).await;
    seed(&app, "koala", Some("sleeping"), 1).await;

    let response = app
        .router
        .oneshot(get_request("/api/animals?search=tiger"))
        .await
        .unwrap();
    let json = body_json(response).await;

    assert_eq!(json["total_results"], 2);
}

#[tokio::test]
async fn test_pagination() {
    let app = browse_app(false).await;
    for i in 0..105 {
        seed(&app, &format!("animal{}", i), None, i).await;
    }

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/animals?page=2"))
        .await
        .unwrap();
    let json = body_json(response).await;

    assert_eq!(json["total_results"], 105);
    assert_eq!(json["total_pages"], 2);
    assert_eq!(json["page"], 2);
    assert_eq!(json["page_size"], 100);
    assert_eq!(json["animals"].as_array().unwrap().len(), 5);

    let response = app
        .router
        .oneshot(get_request("/api/animals?page=50"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["page"], 2);
}

#[tokio::test]
async fn test_get_missing_animal() {
    let app = browse_app(false).await;

    let response = app
        .router
        .oneshot(get_request("/api/animals/999"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Animal 999 not found");
}
