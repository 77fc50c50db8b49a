pub mod ai;
pub mod expenses;
pub mod places;
pub mod trips;

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Places
        .route("/api/places", get(places::index))
        .route("/api/places", post(places::create))
        .route("/api/places/search", get(places::search))
        .route("/api/places/popular", get(places::popular))
        .route("/api/places/category/:category", get(places::by_category))
        .route("/api/places/:id", get(places::show))
        .route("/api/places/:id", patch(places::update))
        .route("/api/places/:id", delete(places::remove))
        .route("/api/places/:id/reviews", post(places::add_review))
        // Trips
        .route("/api/trips", get(trips::index))
        .route("/api/trips", post(trips::create))
        .route("/api/trips/active", get(trips::active))
        .route("/api/trips/stats", get(trips::stats))
        .route("/api/trips/mytrip", get(trips::my_trips))
        .route("/api/trips/:id", get(trips::show))
        .route("/api/trips/:id", patch(trips::update))
        .route("/api/trips/:id", delete(trips::remove))
        .route("/api/trips/:id/categories", get(trips::categories))
        // Older client paths for the same reports
        .route("/api/trips/category/:id", get(trips::categories))
        .route("/api/trips/expense/:id", get(expenses::by_trip))
        .route("/api/trips/:id/places", post(trips::add_place))
        .route("/api/trips/:id/places/:place_id", delete(trips::remove_place))
        .route("/api/trips/:id/generate-plan", post(ai::generate_trip_plan))
        // Expenses
        .route("/api/expenses", get(expenses::index))
        .route("/api/expenses", post(expenses::create))
        .route("/api/expenses/stats", get(expenses::stats))
        .route("/api/expenses/trip/:trip_id", get(expenses::by_trip))
        .route("/api/expenses/:id", get(expenses::show))
        .route("/api/expenses/:id", patch(expenses::update))
        .route("/api/expenses/:id", delete(expenses::remove))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/user/:id", get(auth::get_user))
        // AI plan generation
        .route("/api/ai/generate-plan", post(ai::generate_plan))
        .route("/api/ai/analyze-trip", post(ai::analyze_trip))
        .route("/api/gemini/generate-plan", post(ai::generate_travel_plan))
        .route("/api/ai-plan/generate", post(ai::generate_and_store_plan))
        .route("/api/ai-plan/:id", get(ai::show_plan))
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}
