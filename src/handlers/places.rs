use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use crate::categories::{normalize_category, ALL_CATEGORIES};
use crate::db::queries::places;
use crate::error::{AppError, AppResult};
use crate::models::{NewPlace, NewReview, Place, UpdatePlace};
use crate::response::{Envelope, ListEnvelope};
use crate::state::AppState;

/// GET /api/places
pub async fn index(State(state): State<AppState>) -> AppResult<Json<ListEnvelope<Vec<Place>>>> {
    let conn = state.db.get()?;
    let list = places::list_places(&conn, &places::PlaceFilter::default())?;
    Ok(Json(ListEnvelope::success(list.len(), list)))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
}

/// GET /api/places/search?q=&category=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<ListEnvelope<Vec<Place>>>> {
    if params.q.is_none() && params.category.is_none() {
        return Err(AppError::Validation(
            "Search query or category parameter is required".into(),
        ));
    }

    let filter = places::PlaceFilter {
        search: params.q,
        category: params.category.and_then(|c| category_filter(&c)),
        ..Default::default()
    };

    let conn = state.db.get()?;
    let list = places::list_places(&conn, &filter)?;
    Ok(Json(ListEnvelope::success(list.len(), list)))
}

/// GET /api/places/popular
pub async fn popular(State(state): State<AppState>) -> AppResult<Json<ListEnvelope<Vec<Place>>>> {
    let conn = state.db.get()?;
    let list = places::list_places(
        &conn,
        &places::PlaceFilter {
            popular_only: true,
            ..Default::default()
        },
    )?;
    Ok(Json(ListEnvelope::success(list.len(), list)))
}

/// GET /api/places/category/:category
///
/// Accepts free-form input ("Beaches", "temple"); `all` lists everything.
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<ListEnvelope<Vec<Place>>>> {
    let filter = places::PlaceFilter {
        category: category_filter(&category),
        ..Default::default()
    };

    let conn = state.db.get()?;
    let list = places::list_places(&conn, &filter)?;
    Ok(Json(ListEnvelope::success(list.len(), list)))
}

/// GET /api/places/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<Place>>> {
    let conn = state.db.get()?;
    let place = places::get_place(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Place not found".into()))?;
    Ok(Json(Envelope::success(place)))
}

/// POST /api/places
pub async fn create(
    State(state): State<AppState>,
    Json(new_place): Json<NewPlace>,
) -> AppResult<(StatusCode, Json<Envelope<Place>>)> {
    if new_place.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    if new_place.location.trim().is_empty() {
        return Err(AppError::Validation("Location is required".into()));
    }
    if new_place.description.trim().is_empty() {
        return Err(AppError::Validation("Description is required".into()));
    }
    if new_place.category.trim().is_empty() {
        return Err(AppError::Validation("Category is required".into()));
    }

    let conn = state.db.get()?;

    if places::place_name_exists(&conn, &new_place.name)? {
        return Err(AppError::Conflict(format!(
            "A place named '{}' already exists",
            new_place.name
        )));
    }

    let category = normalize_category(&new_place.category);
    let id = places::create_place(&conn, &new_place, &category)?;
    let place = places::get_place(&conn, id)?
        .ok_or_else(|| AppError::Internal("Place vanished after insert".into()))?;

    Ok((StatusCode::CREATED, Json(Envelope::success(place))))
}

/// PATCH /api/places/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut update): Json<UpdatePlace>,
) -> AppResult<Json<Envelope<Place>>> {
    if let Some(ref category) = update.category {
        update.category = Some(normalize_category(category));
    }

    let conn = state.db.get()?;
    if !places::update_place(&conn, id, &update)? {
        return Err(AppError::NotFound("Place not found".into()));
    }

    let place = places::get_place(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Place not found".into()))?;
    Ok(Json(Envelope::success(place)))
}

/// DELETE /api/places/:id
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    let conn = state.db.get()?;
    let place = places::get_place(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Place not found".into()))?;

    if !place.images.is_empty() {
        // Stored image URLs are left behind; there is no cleanup job yet.
        tracing::info!(
            place_id = id,
            image_count = place.images.len(),
            "Deleting place without cleaning up stored images"
        );
    }

    places::delete_place(&conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/places/:id/reviews
pub async fn add_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(review): Json<NewReview>,
) -> AppResult<Json<Envelope<Place>>> {
    if !(1..=5).contains(&review.rating) {
        return Err(AppError::Validation(
            "Rating must be between 1 and 5".into(),
        ));
    }

    let conn = state.db.get()?;
    if places::get_place(&conn, id)?.is_none() {
        return Err(AppError::NotFound("Place not found".into()));
    }

    places::add_rating(&conn, id, review.rating, review.review.as_deref(), review.user_id)?;

    let place = places::get_place(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Place not found".into()))?;
    Ok(Json(Envelope::success(place)))
}

/// Turn free-form category input into a query filter; `all` means none.
fn category_filter(input: &str) -> Option<String> {
    let normalized = normalize_category(input);
    if normalized == ALL_CATEGORIES {
        None
    } else {
        Some(normalized)
    }
}
