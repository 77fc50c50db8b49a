use serde::{Deserialize, Serialize};

/// A stored AI plan: the input parameters plus the generated text verbatim.
/// Append-only; there is no update path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPlan {
    pub id: i64,
    pub destination: String,
    pub days: String,
    pub traveler_category: Option<String>,
    pub trip_type: Option<String>,
    pub vehicle: Option<String>,
    pub budget: Option<String>,
    pub generated_plan: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAiPlan {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub days: String,
    pub traveler_category: Option<String>,
    pub trip_type: Option<String>,
    pub vehicle: Option<String>,
    pub budget: Option<String>,
}
