//! Integration tests for the expenses API and its statistics.

mod common;

use axum::http::StatusCode;
use common::TestClient;
use serde_json::json;

#[tokio::test]
async fn test_create_and_get_expense() {
    let client = TestClient::new();
    let id = client
        .create_expense("Lunch", 12.5, "Food", "2025-01-10", None)
        .await;

    let (status, body) = client.get_value(&format!("/api/expenses/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Lunch");
    assert_eq!(body["data"]["amount"], 12.5);
    assert_eq!(body["data"]["category"], "Food");
    assert_eq!(body["data"]["currency"], "USD");
    assert_eq!(body["data"]["paymentMethod"], "Cash");
}

#[tokio::test]
async fn test_create_expense_rejects_unknown_category() {
    let client = TestClient::new();
    let (status, body) = client
        .post_json(
            "/api/expenses",
            &json!({
                "title": "Mystery",
                "amount": 10.0,
                "category": "Bribes",
                "date": "2025-01-10",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid expense category"));
}

#[tokio::test]
async fn test_create_expense_unknown_trip() {
    let client = TestClient::new();
    let (status, body) = client
        .post_json(
            "/api/expenses",
            &json!({
                "title": "Orphan",
                "amount": 10.0,
                "category": "Food",
                "date": "2025-01-10",
                "tripId": 999,
            }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Trip not found"));
}

#[tokio::test]
async fn test_listing_filters() {
    let client = TestClient::new();
    let trip = client
        .create_trip("Filtered", "Galle", "2025-01-01", "2025-01-31", None)
        .await;

    client
        .create_expense("January lunch", 10.0, "Food", "2025-01-15", Some(trip))
        .await;
    client
        .create_expense("March lunch", 20.0, "Food", "2025-03-15", None)
        .await;
    client
        .create_expense("March bus", 5.0, "Transportation", "2025-03-16", None)
        .await;

    // Date range needs both bounds
    let (_, body) = client
        .get_value("/api/expenses?startDate=2025-01-01&endDate=2025-01-31")
        .await;
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"][0]["title"], "January lunch");

    // Category filter
    let (_, body) = client.get_value("/api/expenses?category=Food").await;
    assert_eq!(body["results"], 2);

    // Trip filter
    let (_, body) = client
        .get_value(&format!("/api/expenses?trip={}", trip))
        .await;
    assert_eq!(body["results"], 1);

    // Sort by amount ascending
    let (_, body) = client
        .get_value("/api/expenses?sortBy=amount&sortOrder=asc")
        .await;
    assert_eq!(body["data"][0]["amount"], 5.0);
}

#[tokio::test]
async fn test_pagination_defaults() {
    let client = TestClient::new();
    for i in 0..55 {
        client
            .create_expense(&format!("Expense {}", i), 1.0, "Other", "2025-01-01", None)
            .await;
    }

    // Default limit is 50
    let (_, body) = client.get_value("/api/expenses").await;
    assert_eq!(body["results"], 50);
    assert_eq!(body["total"], 55);
    assert_eq!(body["pages"], 2);
    assert_eq!(body["currentPage"], 1);

    let (_, body) = client.get_value("/api/expenses?page=2").await;
    assert_eq!(body["results"], 5);
    assert_eq!(body["currentPage"], 2);
}

#[tokio::test]
async fn test_stats_aggregation() {
    let client = TestClient::new();
    client
        .create_expense("Lunch", 10.0, "Food", "2025-01-02", None)
        .await;
    client
        .create_expense("Dinner", 5.0, "Food", "2025-01-01", None)
        .await;
    client
        .create_expense("Train", 20.0, "Transportation", "2025-01-01", None)
        .await;

    let (status, body) = client.get_value("/api/expenses/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalExpenses"], 3);
    assert_eq!(body["data"]["totalAmount"], 35.0);

    // Categories sorted descending by total
    let categories = body["data"]["categoryExpenses"].as_array().unwrap();
    assert_eq!(categories[0]["category"], "Transportation");
    assert_eq!(categories[0]["total"], 20.0);
    assert_eq!(categories[1]["category"], "Food");
    assert_eq!(categories[1]["total"], 15.0);
    assert_eq!(categories[1]["count"], 2);

    // Days sorted ascending by date
    let days = body["data"]["dailyExpenses"].as_array().unwrap();
    assert_eq!(days[0]["date"], "2025-01-01");
    assert_eq!(days[0]["total"], 25.0);
    assert_eq!(days[1]["date"], "2025-01-02");
}

#[tokio::test]
async fn test_stats_respects_filter() {
    let client = TestClient::new();
    let trip = client
        .create_trip("Tracked", "Ella", "2025-01-01", "2025-01-10", None)
        .await;
    client
        .create_expense("On trip", 10.0, "Food", "2025-01-02", Some(trip))
        .await;
    client
        .create_expense("Off trip", 99.0, "Food", "2025-01-02", None)
        .await;

    let (_, body) = client
        .get_value(&format!("/api/expenses/stats?trip={}", trip))
        .await;
    assert_eq!(body["data"]["totalExpenses"], 1);
    assert_eq!(body["data"]["totalAmount"], 10.0);
}

#[tokio::test]
async fn test_expenses_by_trip() {
    let client = TestClient::new();
    let trip = client
        .create_trip("Funded", "Galle", "2025-01-01", "2025-01-10", Some(100.0))
        .await;
    client
        .create_expense("Hotel", 60.0, "Accommodation", "2025-01-02", Some(trip))
        .await;
    client
        .create_expense("Lunch", 15.0, "Food", "2025-01-03", Some(trip))
        .await;

    let (status, body) = client
        .get_value(&format!("/api/expenses/trip/{}", trip))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 2);
    assert_eq!(body["data"]["total"], 75.0);
    assert_eq!(body["data"]["budgetRemaining"], 25.0);
    assert_eq!(body["data"]["budget"]["amount"], 100.0);
    // Newest first
    assert_eq!(body["data"]["expenses"][0]["title"], "Lunch");
}

#[tokio::test]
async fn test_expenses_by_trip_unknown_trip() {
    let client = TestClient::new();
    let (status, _) = client.get("/api/expenses/trip/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_expense_moves_trip_total() {
    let client = TestClient::new();
    let trip = client
        .create_trip("Adjusted", "Kandy", "2025-01-01", "2025-01-10", Some(100.0))
        .await;
    let expense = client
        .create_expense("Estimate", 40.0, "Activities", "2025-01-02", Some(trip))
        .await;

    let (status, _) = client
        .patch_json(
            &format!("/api/expenses/{}", expense),
            &json!({ "amount": 55.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Totals are recomputed from rows, so the change shows up immediately
    let (_, body) = client.get_value(&format!("/api/trips/{}", trip)).await;
    assert_eq!(body["data"]["totalExpenses"], 55.0);
    assert_eq!(body["data"]["budgetRemaining"], 45.0);
}

#[tokio::test]
async fn test_delete_expense_not_found() {
    let client = TestClient::new();
    let (status, _) = client.delete("/api/expenses/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
