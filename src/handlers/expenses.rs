use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries::{expenses, trips};
use crate::error::{AppError, AppResult};
use crate::models::expense::{validate_category, validate_payment_method};
use crate::models::money;
use crate::models::{Budget, Expense, NewExpense, UpdateExpense};
use crate::response::{Envelope, ListEnvelope, PageEnvelope};
use crate::services::analytics;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub trip: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListParams {
    fn to_filter(&self) -> expenses::ExpenseFilter {
        // Both bounds or neither, as in the original API.
        let (from_date, to_date) = match (&self.start_date, &self.end_date) {
            (Some(from), Some(to)) => (Some(from.clone()), Some(to.clone())),
            _ => (None, None),
        };

        expenses::ExpenseFilter {
            from_date,
            to_date,
            category: self.category.clone(),
            trip_id: self.trip,
            sort_sql: sort_sql(self.sort_by.as_deref(), self.sort_order.as_deref()),
            ..Default::default()
        }
    }
}

fn sort_sql(sort_by: Option<&str>, sort_order: Option<&str>) -> Option<String> {
    let column = match sort_by {
        Some("amount") => "amount_cents",
        Some("date") => "date",
        _ => return None,
    };
    let direction = match sort_order {
        Some("asc") => "ASC",
        _ => "DESC",
    };
    Some(format!("{} {}", column, direction))
}

/// GET /api/expenses
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PageEnvelope<Expense>>> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(50).max(1);

    let mut filter = params.to_filter();
    filter.limit = Some(limit);
    filter.offset = Some((page - 1) * limit);

    let conn = state.db.get()?;
    let list = expenses::list_expenses(&conn, &filter)?;
    let total = expenses::count_expenses(&conn, &filter)?;

    Ok(Json(PageEnvelope::success(
        total,
        analytics::page_count(total, limit),
        page,
        list,
    )))
}

/// GET /api/expenses/stats
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStats {
    pub total_expenses: i64,
    #[serde(rename = "totalAmount", serialize_with = "money::serialize_cents")]
    pub total_cents: i64,
    pub category_expenses: Vec<analytics::CategorySpending>,
    pub daily_expenses: Vec<analytics::DailySpending>,
}

pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Envelope<ExpenseStats>>> {
    let filter = params.to_filter();

    let conn = state.db.get()?;
    let list = expenses::list_expenses(&conn, &filter)?;

    Ok(Json(Envelope::success(ExpenseStats {
        total_expenses: list.len() as i64,
        total_cents: analytics::total_spent(&list),
        category_expenses: analytics::spending_by_category(&list),
        daily_expenses: analytics::spending_by_day(&list),
    })))
}

/// GET /api/expenses/trip/:trip_id
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripExpenses {
    pub expenses: Vec<Expense>,
    #[serde(rename = "total", serialize_with = "money::serialize_cents")]
    pub total_cents: i64,
    #[serde(serialize_with = "money::serialize_opt_cents")]
    pub budget_remaining: Option<i64>,
    pub budget: Option<Budget>,
}

pub async fn by_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
) -> AppResult<Json<ListEnvelope<TripExpenses>>> {
    let conn = state.db.get()?;
    let trip = trips::get_trip(&conn, trip_id)?
        .ok_or_else(|| AppError::NotFound("Trip not found".into()))?;

    let list = expenses::list_expenses(
        &conn,
        &expenses::ExpenseFilter {
            trip_id: Some(trip_id),
            ..Default::default()
        },
    )?;

    let total_cents = analytics::total_spent(&list);
    let budget_cents = trip.budget.as_ref().map(|b| b.amount_cents);

    let results = list.len();
    Ok(Json(ListEnvelope::success(
        results,
        TripExpenses {
            expenses: list,
            total_cents,
            budget_remaining: analytics::budget_remaining(budget_cents, total_cents),
            budget: trip.budget,
        },
    )))
}

/// GET /api/expenses/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<Expense>>> {
    let conn = state.db.get()?;
    let expense = expenses::get_expense(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Expense not found".into()))?;
    Ok(Json(Envelope::success(expense)))
}

/// POST /api/expenses
pub async fn create(
    State(state): State<AppState>,
    Json(mut new_expense): Json<NewExpense>,
) -> AppResult<(StatusCode, Json<Envelope<Expense>>)> {
    if new_expense.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }
    if new_expense.amount.is_none() {
        return Err(AppError::Validation("Amount is required".into()));
    }
    validate_category(&new_expense.category)?;
    validate_payment_method(&new_expense.payment_method)?;
    if new_expense.date.trim().is_empty() {
        new_expense.date = chrono::Local::now()
            .date_naive()
            .format("%Y-%m-%d")
            .to_string();
    }

    let conn = state.db.get()?;

    if let Some(trip_id) = new_expense.trip_id {
        if trips::get_trip(&conn, trip_id)?.is_none() {
            return Err(AppError::NotFound("Trip not found".into()));
        }
    }

    let id = expenses::create_expense(&conn, &new_expense)?;
    let expense = expenses::get_expense(&conn, id)?
        .ok_or_else(|| AppError::Internal("Expense vanished after insert".into()))?;

    Ok((StatusCode::CREATED, Json(Envelope::success(expense))))
}

/// PATCH /api/expenses/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<UpdateExpense>,
) -> AppResult<Json<Envelope<Expense>>> {
    if let Some(ref category) = update.category {
        validate_category(category)?;
    }
    if let Some(ref payment_method) = update.payment_method {
        validate_payment_method(payment_method)?;
    }

    let conn = state.db.get()?;

    if let Some(trip_id) = update.trip_id {
        if trips::get_trip(&conn, trip_id)?.is_none() {
            return Err(AppError::NotFound("Trip not found".into()));
        }
    }

    if !expenses::update_expense(&conn, id, &update)? {
        return Err(AppError::NotFound("Expense not found".into()));
    }

    let expense = expenses::get_expense(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Expense not found".into()))?;
    Ok(Json(Envelope::success(expense)))
}

/// DELETE /api/expenses/:id
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    let conn = state.db.get()?;
    if !expenses::delete_expense(&conn, id)? {
        return Err(AppError::NotFound("Expense not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
