//! Integration tests for the trips API: CRUD, pagination, derived expense
//! fields and the category aggregation report.

mod common;

use axum::http::StatusCode;
use common::TestClient;
use serde_json::json;

#[tokio::test]
async fn test_create_and_get_trip() {
    let client = TestClient::new();
    let id = client
        .create_trip("South coast", "Galle", "2025-03-01", "2025-03-10", None)
        .await;

    let (status, body) = client.get_value(&format!("/api/trips/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "South coast");
    assert_eq!(body["data"]["destination"], "Galle");
    assert_eq!(body["data"]["isActive"], true);
    assert_eq!(body["data"]["totalExpenses"], 0.0);
    assert_eq!(body["data"]["budgetRemaining"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_create_trip_rejects_reversed_dates() {
    let client = TestClient::new();
    let (status, body) = client
        .post_json(
            "/api/trips",
            &json!({
                "name": "Backwards",
                "destination": "Kandy",
                "startDate": "2025-03-10",
                "endDate": "2025-03-01",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Start date must not be after end date"));
}

#[tokio::test]
async fn test_budget_remaining_subtracts_expenses() {
    let client = TestClient::new();
    let id = client
        .create_trip("Budgeted", "Ella", "2025-04-01", "2025-04-10", Some(1000.0))
        .await;

    client
        .create_expense("Hotel", 200.0, "Accommodation", "2025-04-02", Some(id))
        .await;
    client
        .create_expense("Dinner", 100.0, "Food", "2025-04-02", Some(id))
        .await;

    let (_, body) = client.get_value(&format!("/api/trips/{}", id)).await;
    assert_eq!(body["data"]["totalExpenses"], 300.0);
    assert_eq!(body["data"]["totalExpensesCount"], 2);
    assert_eq!(body["data"]["budgetRemaining"], 700.0);
    assert_eq!(body["data"]["budget"]["amount"], 1000.0);
}

#[tokio::test]
async fn test_trip_listing_attaches_costs() {
    let client = TestClient::new();
    let with_budget = client
        .create_trip("Funded", "Galle", "2025-01-01", "2025-01-05", Some(500.0))
        .await;
    client
        .create_trip("Unfunded", "Jaffna", "2025-02-01", "2025-02-05", None)
        .await;

    client
        .create_expense("Bus", 30.0, "Transportation", "2025-01-02", Some(with_budget))
        .await;

    let (status, body) = client.get_value("/api/trips").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 2);

    let data = body["data"].as_array().unwrap();
    let funded = data.iter().find(|t| t["name"] == "Funded").unwrap();
    assert_eq!(funded["totalExpenses"], 30.0);
    assert_eq!(funded["budgetRemaining"], 470.0);

    let unfunded = data.iter().find(|t| t["name"] == "Unfunded").unwrap();
    assert_eq!(unfunded["totalExpenses"], 0.0);
    assert_eq!(unfunded["budgetRemaining"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_pagination_math() {
    let client = TestClient::new();
    for i in 0..45 {
        client
            .create_trip(
                &format!("Trip {}", i),
                "Colombo",
                "2025-01-01",
                "2025-01-02",
                None,
            )
            .await;
    }

    let (status, body) = client.get_value("/api/trips?page=2&limit=20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 20);
    assert_eq!(body["total"], 45);
    assert_eq!(body["pages"], 3);
    assert_eq!(body["currentPage"], 2);

    let (_, body) = client.get_value("/api/trips?page=3&limit=20").await;
    assert_eq!(body["results"], 5);
}

#[tokio::test]
async fn test_listing_filters_and_sort() {
    let client = TestClient::new();
    client
        .create_trip("Early", "Kandy", "2025-01-01", "2025-01-10", None)
        .await;
    client
        .create_trip("Late", "Kandy hills", "2025-06-01", "2025-06-10", None)
        .await;
    let inactive = client
        .create_trip("Shelved", "Galle", "2025-03-01", "2025-03-10", None)
        .await;
    client
        .patch_json(
            &format!("/api/trips/{}", inactive),
            &json!({ "isActive": false }),
        )
        .await;

    // destination substring
    let (_, body) = client.get_value("/api/trips?destination=kandy").await;
    assert_eq!(body["results"], 2);

    // active filter
    let (_, body) = client.get_value("/api/trips?isActive=false").await;
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"][0]["name"], "Shelved");

    // date containment
    let (_, body) = client.get_value("/api/trips?date=2025-06-05").await;
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"][0]["name"], "Late");

    // explicit ascending sort by start date
    let (_, body) = client
        .get_value("/api/trips?sortBy=startDate&sortOrder=asc")
        .await;
    assert_eq!(body["data"][0]["name"], "Early");

    // default sort is start date descending
    let (_, body) = client.get_value("/api/trips").await;
    assert_eq!(body["data"][0]["name"], "Late");
}

#[tokio::test]
async fn test_delete_trip_guarded_by_expenses() {
    let client = TestClient::new();
    let id = client
        .create_trip("Guarded", "Galle", "2025-01-01", "2025-01-05", None)
        .await;
    let expense = client
        .create_expense("Taxi", 20.0, "Transportation", "2025-01-02", Some(id))
        .await;

    let (status, body) = client.delete(&format!("/api/trips/{}", id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body.contains("Cannot delete trip with 1 expenses"),
        "body: {}",
        body
    );

    // After removing the expense the trip can go
    let (status, _) = client.delete(&format!("/api/expenses/{}", expense)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = client.delete(&format!("/api/trips/{}", id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = client.get(&format!("/api/trips/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_and_remove_place_membership() {
    let client = TestClient::new();
    let trip = client
        .create_trip("Sightseeing", "Kandy", "2025-01-01", "2025-01-05", None)
        .await;
    let place = client.create_place("Dalada Maligawa", "temple").await;

    let (status, body) = client
        .post_json(
            &format!("/api/trips/{}/places", trip),
            &json!({ "placeId": place }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);

    // Duplicate membership is rejected
    let (status, body) = client
        .post_json(
            &format!("/api/trips/{}/places", trip),
            &json!({ "placeId": place }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Place already added to this trip"));

    // The trip response embeds the place summary
    let (_, body) = client.get_value(&format!("/api/trips/{}", trip)).await;
    assert_eq!(body["data"]["places"][0]["name"], "Dalada Maligawa");

    let (status, _) = client
        .delete(&format!("/api/trips/{}/places/{}", trip, place))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Removing again is a 400, not a 404
    let (status, body) = client
        .delete(&format!("/api/trips/{}/places/{}", trip, place))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Place not found in this trip"));
}

#[tokio::test]
async fn test_category_report_groups_and_sums() {
    let client = TestClient::new();
    let id = client
        .create_trip("Reported", "Ella", "2025-01-01", "2025-01-10", Some(100.0))
        .await;

    client
        .create_expense("Lunch", 10.0, "Food", "2025-01-02", Some(id))
        .await;
    client
        .create_expense("Snacks", 5.0, "Food", "2025-01-03", Some(id))
        .await;
    client
        .create_expense("Train", 20.0, "Transportation", "2025-01-03", Some(id))
        .await;

    let (status, body) = client
        .get_value(&format!("/api/trips/{}/categories", id))
        .await;
    assert_eq!(status, StatusCode::OK);

    // results counts category buckets, not expenses
    assert_eq!(body["results"], 2);

    let categories = body["data"]["categories"].as_array().unwrap();
    let food = categories.iter().find(|c| c["category"] == "Food").unwrap();
    assert_eq!(food["totalAmount"], 15.0);
    assert_eq!(food["count"], 2);

    let transport = categories
        .iter()
        .find(|c| c["category"] == "Transportation")
        .unwrap();
    assert_eq!(transport["totalAmount"], 20.0);
    assert_eq!(transport["count"], 1);

    assert_eq!(body["data"]["totalSpent"], 35.0);
    assert_eq!(body["data"]["budgetRemaining"], 65.0);
    assert_eq!(body["data"]["budget"]["amount"], 100.0);
}

#[tokio::test]
async fn test_category_report_empty_trip() {
    let client = TestClient::new();
    let id = client
        .create_trip("Empty", "Galle", "2025-01-01", "2025-01-10", None)
        .await;

    let (status, body) = client
        .get_value(&format!("/api/trips/{}/categories", id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 0);
    assert_eq!(body["data"]["categories"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["totalSpent"], 0.0);
    assert_eq!(body["data"]["budgetRemaining"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_trip_stats() {
    let client = TestClient::new();
    // Past trip
    let past = client
        .create_trip("Past", "Galle", "2020-01-01", "2020-01-05", None)
        .await;
    // Far-future trip
    client
        .create_trip("Future", "Galle", "2099-01-01", "2099-01-05", None)
        .await;

    client
        .create_expense("Old hotel", 80.0, "Accommodation", "2020-01-02", Some(past))
        .await;

    let (status, body) = client.get_value("/api/trips/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalTrips"], 2);
    assert_eq!(body["data"]["upcomingTrips"], 1);
    assert_eq!(body["data"]["pastTrips"], 1);

    let destinations = body["data"]["destinationStats"].as_array().unwrap();
    assert_eq!(destinations[0]["destination"], "Galle");
    assert_eq!(destinations[0]["count"], 2);

    let trip_expenses = body["data"]["tripExpenses"].as_array().unwrap();
    assert_eq!(trip_expenses.len(), 1);
    assert_eq!(trip_expenses[0]["totalAmount"], 80.0);
    assert_eq!(trip_expenses[0]["trip"]["name"], "Past");
}

#[tokio::test]
async fn test_update_trip_not_found() {
    let client = TestClient::new();
    let (status, _) = client
        .patch_json("/api/trips/42", &json!({ "name": "Ghost" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
