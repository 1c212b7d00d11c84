use axum_test::TestServer;
use serde_json::json;
use uuid::Uuid;

use bento_api::api::{create_router, AppState};
use bento_api::config::Config;

fn test_config() -> Config {
    Config {
        model_dir: std::env::temp_dir()
            .join(format!("bento-api-test-{}", Uuid::new_v4()))
            .display()
            .to_string(),
        ..Config::default()
    }
}

fn create_test_server() -> TestServer {
    let state = AppState::new(test_config());
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

async fn create_item(server: &TestServer, body: serde_json::Value) -> u32 {
    let response = server.post("/api/items").json(&body).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let item: serde_json::Value = response.json();
    item["id"].as_u64().unwrap() as u32
}

async fn create_user(server: &TestServer, name: &str) -> Uuid {
    let response = server.post("/api/users").json(&json!({ "name": name })).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let user: serde_json::Value = response.json();
    user["id"].as_str().unwrap().parse().unwrap()
}

fn menu_item(name: &str, price: f64, cuisine: &str, category: &str) -> serde_json::Value {
    json!({
        "name": name,
        "price": price,
        "cuisine": cuisine,
        "category": category,
        "tags": {
            "is_evening": true,
            "is_sunny": true
        }
    })
}

/// Seeds the catalog used by the recommendation flow tests
async fn seed_chinese_menu(server: &TestServer) -> Vec<u32> {
    let mut ids = Vec::new();
    for item in [
        menu_item("Chilli Chicken", 1800.0, "Chinese", "Main Course"),
        menu_item("Hot Garlic Beef", 2400.0, "Chinese", "Main Course"),
        menu_item("Vegetable Chow Mein", 1500.0, "Chinese", "Main Course"),
        menu_item("Sweet Corn Soup (S)", 900.0, "Chinese", "Soup"),
        menu_item("Sweet Corn Soup (L)", 1400.0, "Chinese", "Soup"),
        menu_item("Tom Yum Soup", 1200.0, "Chinese", "Soup"),
        menu_item("Gulab Jamun", 700.0, "International", "Dessert"),
    ] {
        ids.push(create_item(server, item).await);
    }
    ids
}

fn recommend_body(user_id: Uuid, budget: f64) -> serde_json::Value {
    json!({
        "user_id": user_id,
        "budget": budget,
        "cuisine": "Chinese",
        "categories": ["Main Course", "Soup"],
        "category_priority": ["Main Course", "Side dish"],
        "require_each_category": true,
        "time_of_day": "evening",
        "weather": "sunny"
    })
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_create_and_list_items() {
    let server = create_test_server();
    create_item(&server, menu_item("Fried Rice", 650.0, "Chinese", "Main Course")).await;

    let response = server.get("/api/items").await;
    response.assert_status_ok();
    let items: Vec<serde_json::Value> = response.json();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Fried Rice");
    assert_eq!(items[0]["price"], 650.0);
}

#[tokio::test]
async fn test_create_item_rejects_non_positive_price() {
    let server = create_test_server();
    let response = server
        .post("/api/items")
        .json(&menu_item("Free Lunch", 0.0, "Chinese", "Main Course"))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cuisines_and_categories() {
    let server = create_test_server();
    seed_chinese_menu(&server).await;

    let response = server.get("/api/cuisines").await;
    response.assert_status_ok();
    let cuisines: Vec<String> = response.json();
    assert_eq!(cuisines, vec!["Chinese", "International"]);

    let response = server.get("/api/categories").add_query_param("cuisine", "Chinese").await;
    response.assert_status_ok();
    let listing: serde_json::Value = response.json();
    assert_eq!(listing["native_categories"], json!(["Main Course", "Soup"]));
    assert_eq!(listing["supplemented_categories"], json!(["Dessert"]));
}

#[tokio::test]
async fn test_rate_validates_inputs() {
    let server = create_test_server();
    let ids = seed_chinese_menu(&server).await;
    let user_id = create_user(&server, "Asha").await;

    // Out-of-range rating
    let response = server
        .post("/api/rate")
        .json(&json!({ "user_id": user_id, "item_id": ids[0], "rating": 6.0 }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    // Unknown item
    let response = server
        .post("/api/rate")
        .json(&json!({ "user_id": user_id, "item_id": 9999, "rating": 4.0 }))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    // Unknown user
    let response = server
        .post("/api/rate")
        .json(&json!({ "user_id": Uuid::new_v4(), "item_id": ids[0], "rating": 4.0 }))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    // Valid rating
    let response = server
        .post("/api/rate")
        .json(&json!({ "user_id": user_id, "item_id": ids[0], "rating": 4.0 }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_user_rating_history() {
    let server = create_test_server();
    let ids = seed_chinese_menu(&server).await;
    let user_id = create_user(&server, "Ravi").await;

    server
        .post("/api/rate")
        .json(&json!({ "user_id": user_id, "item_id": ids[0], "rating": 2.0 }))
        .await
        .assert_status_ok();
    // Re-rating the same item overwrites, not appends.
    server
        .post("/api/rate")
        .json(&json!({ "user_id": user_id, "item_id": ids[0], "rating": 5.0 }))
        .await
        .assert_status_ok();

    let response = server.get(&format!("/api/users/{}/ratings", user_id)).await;
    response.assert_status_ok();
    let history: Vec<serde_json::Value> = response.json();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["rating"], 5.0);
    assert_eq!(history[0]["item_name"], "Chilli Chicken");
}

#[tokio::test]
async fn test_train_without_ratings_is_service_unavailable() {
    let server = create_test_server();
    seed_chinese_menu(&server).await;
    let response = server.post("/api/train").await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_info_reports_artifact_after_training() {
    let server = create_test_server();
    let ids = seed_chinese_menu(&server).await;
    let user_id = create_user(&server, "Mei").await;

    let response = server.get("/api/info").await;
    response.assert_status_ok();
    let info: serde_json::Value = response.json();
    assert_eq!(info["models"]["rating"]["exists"], false);

    server
        .post("/api/rate")
        .json(&json!({ "user_id": user_id, "item_id": ids[0], "rating": 5.0 }))
        .await
        .assert_status_ok();
    let response = server.post("/api/train").await;
    response.assert_status_ok();

    let response = server.get("/api/info").await;
    let info: serde_json::Value = response.json();
    assert_eq!(info["models"]["rating"]["exists"], true);
    assert!(info["models"]["rating"]["size"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_recommend_before_training_uses_cold_start() {
    let server = create_test_server();
    seed_chinese_menu(&server).await;

    let response = server
        .post("/api/recommend")
        .json(&recommend_body(Uuid::new_v4(), 8000.0))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    let recommendations = body["recommendations"].as_array().unwrap();
    assert!(!recommendations.is_empty());
    for item in recommendations {
        assert_eq!(item["predicted_rating"], 3.0);
    }
}

#[tokio::test]
async fn test_recommend_full_flow() {
    let server = create_test_server();
    let ids = seed_chinese_menu(&server).await;
    let user_id = create_user(&server, "Asha").await;

    for (item_id, rating) in [(ids[0], 5.0), (ids[3], 4.0), (ids[5], 2.0)] {
        server
            .post("/api/rate")
            .json(&json!({ "user_id": user_id, "item_id": item_id, "rating": rating }))
            .await
            .assert_status_ok();
    }
    server.post("/api/train").await.assert_status_ok();

    let response = server
        .post("/api/recommend")
        .json(&recommend_body(user_id, 8000.0))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    let recommendations = body["recommendations"].as_array().unwrap();
    assert!(!recommendations.is_empty());

    // Budget respected, both required categories covered.
    assert!(body["total_cost"].as_f64().unwrap() <= 8000.0);
    let categories: Vec<&str> = recommendations
        .iter()
        .map(|item| item["category"].as_str().unwrap())
        .collect();
    assert!(categories.contains(&"Main Course"));
    assert!(categories.contains(&"Soup"));

    // At most one portion size of the same dish.
    let corn_soups = recommendations
        .iter()
        .filter(|item| item["item_name"].as_str().unwrap().starts_with("Sweet Corn Soup"))
        .count();
    assert!(corn_soups <= 1);

    // Each explanation reconstructs its item's composite score.
    for item in recommendations {
        let id = item["item_id"].as_u64().unwrap().to_string();
        let explanation = &body["explanations"][&id];
        let base = explanation["base"].as_f64().unwrap();
        let contributions: f64 = explanation["contributions"]
            .as_object()
            .unwrap()
            .values()
            .map(|v| v.as_f64().unwrap())
            .sum();
        let composite = item["composite_score"].as_f64().unwrap();
        assert!((base + contributions - composite).abs() < 1e-6);
        assert!(!explanation["summary"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_recommend_is_deterministic_across_calls() {
    let server = create_test_server();
    seed_chinese_menu(&server).await;
    let user_id = Uuid::new_v4();

    let mut runs = Vec::new();
    for _ in 0..2 {
        let response = server
            .post("/api/recommend")
            .json(&recommend_body(user_id, 6000.0))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let ids: Vec<u64> = body["recommendations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["item_id"].as_u64().unwrap())
            .collect();
        runs.push((ids, body["total_cost"].as_f64().unwrap()));
    }
    assert_eq!(runs[0], runs[1]);
}

#[tokio::test]
async fn test_recommend_rejects_zero_budget() {
    let server = create_test_server();
    seed_chinese_menu(&server).await;
    let response = server
        .post("/api/recommend")
        .json(&recommend_body(Uuid::new_v4(), 0.0))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_rejects_empty_categories() {
    let server = create_test_server();
    seed_chinese_menu(&server).await;
    let mut body = recommend_body(Uuid::new_v4(), 5000.0);
    body["categories"] = json!([]);
    let response = server.post("/api/recommend").json(&body).await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_infeasible_required_categories() {
    let server = create_test_server();
    seed_chinese_menu(&server).await;
    // Cheapest Main Course (1500) + cheapest Soup (900) exceed the budget.
    let response = server
        .post("/api/recommend")
        .json(&recommend_body(Uuid::new_v4(), 2000.0))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}
