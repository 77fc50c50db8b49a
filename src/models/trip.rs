use crate::models::money;
use crate::models::place::PlaceSummary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(rename = "amount", serialize_with = "money::serialize_cents")]
    pub amount_cents: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub origin: Option<String>,
    pub destination: String,
    pub budget: Option<Budget>,
    pub owner_id: Option<i64>,
    pub is_active: bool,
    pub cover_image: Option<String>,
    pub notes: Option<String>,
    pub plan: Option<String>,
    pub places: Vec<PlaceSummary>,
    pub created_at: String,
    pub updated_at: String,
}

/// A trip with the expense totals derived from its expense rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripWithCosts {
    #[serde(flatten)]
    pub trip: Trip,
    #[serde(
        rename = "totalExpenses",
        serialize_with = "money::serialize_cents"
    )]
    pub total_expense_cents: i64,
    pub total_expenses_count: i64,
    #[serde(serialize_with = "money::serialize_opt_cents")]
    pub budget_remaining: Option<i64>,
}

impl TripWithCosts {
    /// Attach expense totals to a trip. `budget_remaining` stays `None`
    /// when the trip has no declared budget.
    pub fn new(trip: Trip, total_expense_cents: i64, total_expenses_count: i64) -> Self {
        let budget_remaining = trip
            .budget
            .as_ref()
            .map(|b| b.amount_cents - total_expense_cents);
        Self {
            trip,
            total_expense_cents,
            total_expenses_count,
            budget_remaining,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: String,
    pub budget: Option<NewBudget>,
    pub owner_id: Option<i64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub cover_image: Option<String>,
    pub notes: Option<String>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrip {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub budget: Option<NewBudget>,
    pub is_active: Option<bool>,
    pub cover_image: Option<String>,
    pub notes: Option<String>,
}
