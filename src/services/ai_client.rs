//! Client for the generative-language API.
//!
//! Thin pass-through: build a prompt, POST it, pull the text out of the
//! first candidate. No retries; a transient upstream failure surfaces
//! directly to the caller (503 unreachable, 502 bad status or shape).

use crate::config::GeminiConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "topK")]
    top_k: i64,
    #[serde(rename = "topP")]
    top_p: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: i64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Generate text for a prompt. Errors when no API key is configured.
    pub async fn generate_content(&self, prompt: &str) -> AppResult<String> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            AppError::ServiceUnavailable("AI service is not configured".to_string())
        })?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 8192,
            },
        };

        debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending generation request"
        );

        let response = self.http.post(&url).json(&request).send().await.map_err(|e| {
            warn!("No response from AI service: {}", e);
            AppError::ServiceUnavailable(
                "No response received from AI service. Please try again later.".to_string(),
            )
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "AI service returned {}: {}",
                status, body
            )));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse AI response: {}", e)))?;

        extract_text(generated)
            .ok_or_else(|| AppError::Upstream("Invalid response from AI service".to_string()))
    }
}

fn extract_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts?
        .into_iter()
        .next()?
        .text
}

/// Details for the structured itinerary prompt.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetails {
    pub traveler_category: Option<String>,
    pub trip_type: Option<String>,
    pub destination: Option<String>,
    pub from: Option<String>,
    pub days: Option<String>,
    pub budget: Option<String>,
    pub vehicle: Option<String>,
}

impl TripDetails {
    /// Every field is required here; the caller turns the field name into a
    /// 400 response.
    pub fn require_all(&self) -> Result<(), &'static str> {
        if self.traveler_category.is_none() {
            return Err("travelerCategory");
        }
        if self.trip_type.is_none() {
            return Err("tripType");
        }
        if self.destination.is_none() {
            return Err("destination");
        }
        if self.from.is_none() {
            return Err("from");
        }
        if self.days.is_none() {
            return Err("days");
        }
        if self.budget.is_none() {
            return Err("budget");
        }
        if self.vehicle.is_none() {
            return Err("vehicle");
        }
        Ok(())
    }
}

pub fn build_trip_prompt(details: &TripDetails) -> String {
    let traveler_category = details.traveler_category.as_deref().unwrap_or("traveler");
    let trip_type = details.trip_type.as_deref().unwrap_or("general");
    let destination = details.destination.as_deref().unwrap_or_default();
    let from = details.from.as_deref().unwrap_or_default();
    let days = details.days.as_deref().unwrap_or_default();
    let budget = details.budget.as_deref().unwrap_or("moderate");
    let vehicle = details.vehicle.as_deref().unwrap_or("mixed");

    format!(
        "Create a detailed {days}-day travel itinerary for a {traveler_category} traveling \
from {from} to {destination} in Sri Lanka.
This is a {trip_type} focused trip with a budget of {budget} LKR using {vehicle} as the \
primary mode of transportation.

Please include:
1. Day-by-day breakdown with morning, afternoon, and evening activities
2. Recommended religious and cultural sites to visit based on the {trip_type} theme
3. Estimated costs for activities, meals, and transportation
4. Suggestions for local experiences and food to try
5. Tips for traveling with {traveler_category} in Sri Lanka
6. How to best utilize {vehicle} for this journey

Format the response as a detailed itinerary with clear headings for each day and provide \
a total cost estimate to ensure it stays within the {budget} LKR budget."
    )
}

pub fn build_analysis_prompt(trip_data: &serde_json::Value, question: &str) -> String {
    format!(
        "As a Sri Lankan travel expert, analyze this trip plan and answer the following \
question:

Trip Details:
{}

Question: {}

Please provide a comprehensive answer with specific recommendations for Sri Lanka.",
        serde_json::to_string_pretty(trip_data).unwrap_or_default(),
        question
    )
}

/// Prompt for the travel-form flow: origin/destination plus concrete dates.
pub struct TravelFormPrompt<'a> {
    pub start_location: &'a str,
    pub end_location: &'a str,
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub duration_days: i64,
    pub num_persons: i64,
    pub traveler_type: &'a str,
    pub trip_preference: Option<&'a str>,
    pub transport_mode: Option<&'a str>,
}

pub fn build_travel_form_prompt(form: &TravelFormPrompt) -> String {
    format!(
        "Generate a Sri Lanka travel itinerary based on these details:
- Start: {}
- End: {}
- Dates: {} to {} ({} days)
- Travelers: {} ({})
- Preference: {}
- Transport: {}

Provide:
1. **Low Budget Plan** (hostels, budget food, public transport)
2. **Normal Budget Plan** (3-star hotels, restaurants, taxis)
3. **Expensive Plan** (luxury hotels, fine dining, private transport)
4. **Shopping Recommendations** (best local markets)
5. **Emergency Contacts** (nearest police, hospital)
6. **Entry Tickets** (places requiring tickets and prices)

Format the response with clear headings and daily itineraries.",
        form.start_location,
        form.end_location,
        form.start_date,
        form.end_date,
        form.duration_days,
        form.num_persons,
        form.traveler_type,
        form.trip_preference.unwrap_or("General sightseeing"),
        form.transport_mode.unwrap_or("Mixed"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_prompt_includes_all_details() {
        let details = TripDetails {
            traveler_category: Some("family".into()),
            trip_type: Some("cultural".into()),
            destination: Some("Kandy".into()),
            from: Some("Colombo".into()),
            days: Some("5".into()),
            budget: Some("50000".into()),
            vehicle: Some("van".into()),
        };

        let prompt = build_trip_prompt(&details);
        assert!(prompt.contains("5-day"));
        assert!(prompt.contains("family"));
        assert!(prompt.contains("from Colombo to Kandy"));
        assert!(prompt.contains("50000 LKR"));
        assert!(prompt.contains("van"));
    }

    #[test]
    fn require_all_names_first_missing_field() {
        let details = TripDetails {
            traveler_category: Some("couple".into()),
            trip_type: None,
            destination: Some("Ella".into()),
            from: Some("Colombo".into()),
            days: Some("3".into()),
            budget: Some("20000".into()),
            vehicle: Some("train".into()),
        };
        assert_eq!(details.require_all(), Err("tripType"));
    }

    #[test]
    fn travel_form_prompt_defaults_optionals() {
        let prompt = build_travel_form_prompt(&TravelFormPrompt {
            start_location: "Colombo",
            end_location: "Galle",
            start_date: "2025-03-01",
            end_date: "2025-03-05",
            duration_days: 4,
            num_persons: 2,
            traveler_type: "couple",
            trip_preference: None,
            transport_mode: None,
        });
        assert!(prompt.contains("General sightseeing"));
        assert!(prompt.contains("Mixed"));
        assert!(prompt.contains("(4 days)"));
    }
}
