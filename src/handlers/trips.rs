use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::db::queries::{expenses, places, trips};
use crate::error::{AppError, AppResult};
use crate::models::money;
use crate::models::{NewTrip, Trip, TripWithCosts, UpdateTrip};
use crate::response::{Envelope, ListEnvelope, PageEnvelope};
use crate::services::analytics;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub is_active: Option<String>,
    /// Keep trips whose date range contains this date (YYYY-MM-DD).
    pub date: Option<String>,
    pub destination: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn sort_sql(sort_by: Option<&str>, sort_order: Option<&str>) -> Option<String> {
    let column = match sort_by {
        Some("startDate") => "start_date",
        Some("name") => "name",
        _ => return None,
    };
    let direction = match sort_order {
        Some("asc") => "ASC",
        _ => "DESC",
    };
    Some(format!("{} {}", column, direction))
}

/// GET /api/trips
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PageEnvelope<TripWithCosts>>> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).max(1);

    let filter = trips::TripFilter {
        is_active: match params.is_active.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        },
        includes_date: params.date,
        destination: params.destination,
        sort_sql: sort_sql(params.sort_by.as_deref(), params.sort_order.as_deref()),
        limit: Some(limit),
        offset: Some((page - 1) * limit),
        ..Default::default()
    };

    let conn = state.db.get()?;
    let page_trips = trips::list_trips(&conn, &filter)?;
    let total = trips::count_trips(&conn, &filter)?;

    let data = attach_costs(&conn, page_trips)?;

    Ok(Json(PageEnvelope::success(
        total,
        analytics::page_count(total, limit),
        page,
        data,
    )))
}

/// GET /api/trips/active
pub async fn active(
    State(state): State<AppState>,
) -> AppResult<Json<ListEnvelope<Vec<Trip>>>> {
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let filter = trips::TripFilter {
        is_active: Some(true),
        includes_date: Some(today),
        ..Default::default()
    };

    let conn = state.db.get()?;
    let mut list = trips::list_trips(&conn, &filter)?;
    populate_places(&conn, &mut list)?;
    Ok(Json(ListEnvelope::success(list.len(), list)))
}

/// GET /api/trips/mytrip — trips owned by the bearer-token user.
pub async fn my_trips(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<ListEnvelope<Vec<TripWithCosts>>>> {
    let user_id = auth::authenticate(&state, &headers)?;

    let filter = trips::TripFilter {
        owner_id: Some(user_id),
        ..Default::default()
    };

    let conn = state.db.get()?;
    let list = trips::list_trips(&conn, &filter)?;
    let data = attach_costs(&conn, list)?;
    Ok(Json(ListEnvelope::success(data.len(), data)))
}

/// GET /api/trips/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<TripWithCosts>>> {
    let conn = state.db.get()?;
    let trip = trip_with_places(&conn, id)?;

    let totals = expenses::totals_for_trips(&conn, &[id])?;
    let total = totals.get(&id).copied().unwrap_or_default();

    Ok(Json(Envelope::success(TripWithCosts::new(
        trip,
        total.total_cents,
        total.count,
    ))))
}

/// POST /api/trips
pub async fn create(
    State(state): State<AppState>,
    Json(new_trip): Json<NewTrip>,
) -> AppResult<(StatusCode, Json<Envelope<Trip>>)> {
    if new_trip.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    if new_trip.destination.trim().is_empty() {
        return Err(AppError::Validation("Destination is required".into()));
    }
    if new_trip.start_date.is_empty() || new_trip.end_date.is_empty() {
        return Err(AppError::Validation(
            "Start date and end date are required".into(),
        ));
    }
    validate_date(&new_trip.start_date)?;
    validate_date(&new_trip.end_date)?;
    if new_trip.start_date > new_trip.end_date {
        return Err(AppError::Validation(
            "Start date must not be after end date".into(),
        ));
    }

    let conn = state.db.get()?;
    let id = trips::create_trip(&conn, &new_trip)?;
    let trip = trips::get_trip(&conn, id)?
        .ok_or_else(|| AppError::Internal("Trip vanished after insert".into()))?;

    Ok((StatusCode::CREATED, Json(Envelope::success(trip))))
}

/// PATCH /api/trips/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<UpdateTrip>,
) -> AppResult<Json<Envelope<Trip>>> {
    if let Some(ref start_date) = update.start_date {
        validate_date(start_date)?;
    }
    if let Some(ref end_date) = update.end_date {
        validate_date(end_date)?;
    }

    let conn = state.db.get()?;
    if !trips::update_trip(&conn, id, &update)? {
        return Err(AppError::NotFound("Trip not found".into()));
    }

    let trip = trips::get_trip(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Trip not found".into()))?;
    Ok(Json(Envelope::success(trip)))
}

/// DELETE /api/trips/:id
///
/// Refused while expenses still reference the trip.
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    let conn = state.db.get()?;
    if trips::get_trip(&conn, id)?.is_none() {
        return Err(AppError::NotFound("Trip not found".into()));
    }

    let expense_count = expenses::count_for_trip(&conn, id)?;
    if expense_count > 0 {
        return Err(AppError::Validation(format!(
            "Cannot delete trip with {} expenses. Delete expenses first or update them to \
             remove the trip reference.",
            expense_count
        )));
    }

    trips::delete_trip(&conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPlaceRequest {
    pub place_id: Option<i64>,
}

/// POST /api/trips/:id/places
pub async fn add_place(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AddPlaceRequest>,
) -> AppResult<Json<Envelope<Trip>>> {
    let place_id = request
        .place_id
        .ok_or_else(|| AppError::Validation("placeId is required".into()))?;

    let conn = state.db.get()?;
    if trips::get_trip(&conn, id)?.is_none() {
        return Err(AppError::NotFound("Trip not found".into()));
    }
    if places::get_place(&conn, place_id)?.is_none() {
        return Err(AppError::NotFound("Place not found".into()));
    }
    if trips::trip_has_place(&conn, id, place_id)? {
        return Err(AppError::Validation(
            "Place already added to this trip".into(),
        ));
    }

    trips::add_place(&conn, id, place_id)?;
    trip_with_places(&conn, id).map(|t| Json(Envelope::success(t)))
}

/// DELETE /api/trips/:id/places/:place_id
pub async fn remove_place(
    State(state): State<AppState>,
    Path((id, place_id)): Path<(i64, i64)>,
) -> AppResult<Json<Envelope<Trip>>> {
    let conn = state.db.get()?;
    if trips::get_trip(&conn, id)?.is_none() {
        return Err(AppError::NotFound("Trip not found".into()));
    }
    if !trips::remove_place(&conn, id, place_id)? {
        return Err(AppError::Validation("Place not found in this trip".into()));
    }

    trip_with_places(&conn, id).map(|t| Json(Envelope::success(t)))
}

/// GET /api/trips/:id/categories — spending grouped by expense category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub categories: Vec<analytics::CategoryTotal>,
    pub budget: Option<crate::models::Budget>,
    #[serde(rename = "totalSpent", serialize_with = "money::serialize_cents")]
    pub total_spent_cents: i64,
    #[serde(serialize_with = "money::serialize_opt_cents")]
    pub budget_remaining: Option<i64>,
}

pub async fn categories(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ListEnvelope<CategoryReport>>> {
    let conn = state.db.get()?;
    let trip = trips::get_trip(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Trip not found".into()))?;

    let trip_expenses = expenses::list_expenses(
        &conn,
        &expenses::ExpenseFilter {
            trip_id: Some(id),
            ..Default::default()
        },
    )?;

    let categories = analytics::category_totals(&trip_expenses);
    let total_spent_cents = analytics::total_spent(&trip_expenses);
    let budget_cents = trip.budget.as_ref().map(|b| b.amount_cents);

    let report = CategoryReport {
        budget_remaining: analytics::budget_remaining(budget_cents, total_spent_cents),
        budget: trip.budget,
        total_spent_cents,
        categories,
    };

    Ok(Json(ListEnvelope::success(
        report.categories.len(),
        report,
    )))
}

/// GET /api/trips/stats
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStats {
    pub total_trips: i64,
    pub active_trips: i64,
    pub upcoming_trips: i64,
    pub past_trips: i64,
    pub destination_stats: Vec<DestinationStat>,
    pub trip_expenses: Vec<TripExpenseStat>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationStat {
    pub destination: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripExpenseStat {
    #[serde(rename = "totalAmount", serialize_with = "money::serialize_cents")]
    pub total_cents: i64,
    pub count: i64,
    pub trip: Option<TripSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub id: i64,
    pub name: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
}

pub async fn stats(State(state): State<AppState>) -> AppResult<Json<Envelope<TripStats>>> {
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let conn = state.db.get()?;

    let counts = trips::count_by_status(&conn, &today)?;
    let destination_stats = trips::destination_counts(&conn, 10)?
        .into_iter()
        .map(|d| DestinationStat {
            destination: d.destination,
            count: d.count,
        })
        .collect();

    let trip_expenses = expenses::totals_by_trip(&conn)?
        .into_iter()
        .map(|r| TripExpenseStat {
            total_cents: r.total_cents,
            count: r.count,
            trip: match (r.trip_id, r.trip_name) {
                (Some(id), Some(name)) => Some(TripSummary {
                    id,
                    name,
                    destination: r.destination.unwrap_or_default(),
                    start_date: r.start_date.unwrap_or_default(),
                    end_date: r.end_date.unwrap_or_default(),
                }),
                _ => None,
            },
        })
        .collect();

    Ok(Json(Envelope::success(TripStats {
        total_trips: counts.total,
        active_trips: counts.active,
        upcoming_trips: counts.upcoming,
        past_trips: counts.past,
        destination_stats,
        trip_expenses,
    })))
}

/// Attach batched expense totals to a page of trips and populate places.
fn attach_costs(
    conn: &rusqlite::Connection,
    mut page: Vec<Trip>,
) -> AppResult<Vec<TripWithCosts>> {
    populate_places(conn, &mut page)?;

    let ids: Vec<i64> = page.iter().map(|t| t.id).collect();
    let totals = expenses::totals_for_trips(conn, &ids)?;

    Ok(page
        .into_iter()
        .map(|trip| {
            let total = totals.get(&trip.id).copied().unwrap_or_default();
            TripWithCosts::new(trip, total.total_cents, total.count)
        })
        .collect())
}

fn populate_places(conn: &rusqlite::Connection, trips_page: &mut [Trip]) -> AppResult<()> {
    let ids: Vec<i64> = trips_page.iter().map(|t| t.id).collect();
    let mut by_trip = places::summaries_for_trips(conn, &ids)?;
    for trip in trips_page {
        trip.places = by_trip.remove(&trip.id).unwrap_or_default();
    }
    Ok(())
}

fn trip_with_places(conn: &rusqlite::Connection, id: i64) -> AppResult<Trip> {
    let mut trip = trips::get_trip(conn, id)?
        .ok_or_else(|| AppError::NotFound("Trip not found".into()))?;
    let mut by_trip = places::summaries_for_trips(conn, &[trip.id])?;
    trip.places = by_trip.remove(&trip.id).unwrap_or_default();
    Ok(trip)
}

fn validate_date(date: &str) -> AppResult<()> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::Validation(format!("Invalid date: {}", date)))
}
