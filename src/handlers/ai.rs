//! Endpoints wrapping the generative-language API.
//!
//! These are thin: validate input, build a prompt, forward, return text.
//! Upstream failures surface to the caller without retries.

use axum::extract::{Path, State};
use axum::response::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::queries::{ai_plans, trips};
use crate::error::{AppError, AppResult};
use crate::models::{AiPlan, NewAiPlan};
use crate::response::Envelope;
use crate::services::ai_client::{
    build_analysis_prompt, build_travel_form_prompt, build_trip_prompt, TravelFormPrompt,
    TripDetails,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan: String,
}

/// POST /api/ai/generate-plan — raw prompt pass-through.
pub async fn generate_plan(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> AppResult<Json<Envelope<PlanResponse>>> {
    let prompt = request
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Prompt is required".into()))?;

    let plan = state.ai.generate_content(&prompt).await?;
    Ok(Json(Envelope::success(PlanResponse { plan })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub trip_data: Option<Value>,
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

/// POST /api/ai/analyze-trip
pub async fn analyze_trip(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> AppResult<Json<Envelope<AnalysisResponse>>> {
    let (trip_data, question) = match (request.trip_data, request.question) {
        (Some(data), Some(q)) if !q.trim().is_empty() => (data, q),
        _ => {
            return Err(AppError::Validation(
                "Trip data and question are required".into(),
            ))
        }
    };

    let prompt = build_analysis_prompt(&trip_data, &question);
    let analysis = state.ai.generate_content(&prompt).await?;
    Ok(Json(Envelope::success(AnalysisResponse { analysis })))
}

/// POST /api/gemini/generate-plan — structured trip details, all required.
pub async fn generate_travel_plan(
    State(state): State<AppState>,
    Json(details): Json<TripDetails>,
) -> AppResult<Json<Envelope<PlanResponse>>> {
    if let Err(field) = details.require_all() {
        return Err(AppError::Validation(format!(
            "Missing required field: {}",
            field
        )));
    }

    let prompt = build_trip_prompt(&details);
    let plan = state.ai.generate_content(&prompt).await?;
    Ok(Json(Envelope::success(PlanResponse { plan })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPlanResponse {
    pub plan: String,
    pub plan_id: i64,
}

/// POST /api/ai-plan/generate — build prompt with defaults, persist the
/// result, return text plus the stored row id.
pub async fn generate_and_store_plan(
    State(state): State<AppState>,
    Json(input): Json<NewAiPlan>,
) -> AppResult<Json<Envelope<StoredPlanResponse>>> {
    if input.destination.trim().is_empty() || input.days.trim().is_empty() {
        return Err(AppError::Validation(
            "Destination and days are required".into(),
        ));
    }

    let details = TripDetails {
        traveler_category: input.traveler_category.clone(),
        trip_type: input.trip_type.clone(),
        destination: Some(input.destination.clone()),
        from: None,
        days: Some(input.days.clone()),
        budget: input.budget.clone(),
        vehicle: input.vehicle.clone(),
    };

    let prompt = build_trip_prompt(&details);
    let plan = state.ai.generate_content(&prompt).await?;

    let conn = state.db.get()?;
    let plan_id = ai_plans::create_plan(&conn, &input, &plan)?;

    Ok(Json(Envelope::success(StoredPlanResponse { plan, plan_id })))
}

/// GET /api/ai-plan/:id
pub async fn show_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<AiPlan>>> {
    let conn = state.db.get()?;
    let plan = ai_plans::get_plan(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Plan not found".into()))?;
    Ok(Json(Envelope::success(plan)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelFormRequest {
    pub start_location: Option<String>,
    pub end_location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub num_persons: Option<i64>,
    pub traveler_type: Option<String>,
    pub trip_preference: Option<String>,
    pub transport_mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedMessage {
    pub status: &'static str,
    pub message: &'static str,
}

/// POST /api/trips/:id/generate-plan — generate an itinerary from the travel
/// form and store it on the trip.
pub async fn generate_trip_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<TravelFormRequest>,
) -> AppResult<Json<GeneratedMessage>> {
    let (start_location, end_location, start_date, end_date, traveler_type) = match (
        &form.start_location,
        &form.end_location,
        &form.start_date,
        &form.end_date,
        &form.traveler_type,
    ) {
        (Some(sl), Some(el), Some(sd), Some(ed), Some(tt)) => (sl, el, sd, ed, tt),
        _ => return Err(AppError::Validation("Missing required fields".into())),
    };

    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;
    let duration_days = (end - start).num_days().max(1);

    // Check the trip exists before paying for the upstream call.
    {
        let conn = state.db.get()?;
        if trips::get_trip(&conn, id)?.is_none() {
            return Err(AppError::NotFound("Trip not found".into()));
        }
    }

    let prompt = build_travel_form_prompt(&TravelFormPrompt {
        start_location,
        end_location,
        start_date,
        end_date,
        duration_days,
        num_persons: form.num_persons.unwrap_or(1),
        traveler_type,
        trip_preference: form.trip_preference.as_deref(),
        transport_mode: form.transport_mode.as_deref(),
    });

    let plan = state.ai.generate_content(&prompt).await?;

    let conn = state.db.get()?;
    if !trips::store_plan(&conn, id, &plan)? {
        return Err(AppError::NotFound("Trip not found".into()));
    }

    Ok(Json(GeneratedMessage {
        status: "success",
        message: "Plan generated & saved successfully",
    }))
}

fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date: {}", date)))
}
