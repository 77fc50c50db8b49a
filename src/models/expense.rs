use crate::error::{AppError, AppResult};
use crate::models::money;
use serde::{Deserialize, Serialize};

/// The fixed expense categories. Free text is rejected, not normalized —
/// unlike place categories these come from a form picker.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Transportation",
    "Accommodation",
    "Activities",
    "Shopping",
    "Entertainment",
    "Souvenirs",
    "Other",
];

pub const PAYMENT_METHODS: &[&str] = &[
    "Cash",
    "Credit Card",
    "Debit Card",
    "Mobile Payment",
    "Other",
];

pub fn validate_category(category: &str) -> AppResult<()> {
    if EXPENSE_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Invalid expense category: {}",
            category
        )))
    }
}

pub fn validate_payment_method(method: &str) -> AppResult<()> {
    if PAYMENT_METHODS.contains(&method) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Invalid payment method: {}",
            method
        )))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub title: String,
    #[serde(rename = "amount", serialize_with = "money::serialize_cents")]
    pub amount_cents: i64,
    pub category: String,
    pub date: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub trip_id: Option<i64>,
    pub place_id: Option<i64>,
    pub currency: String,
    pub payment_method: String,
    pub receipt_image: Option<String>,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    #[serde(default)]
    pub title: String,
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "trip")]
    pub trip_id: Option<i64>,
    #[serde(alias = "place")]
    pub place_id: Option<i64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    pub receipt_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewExpense {
    pub fn amount_cents(&self) -> i64 {
        money::to_cents(self.amount.unwrap_or(0.0))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpense {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "trip")]
    pub trip_id: Option<i64>,
    #[serde(alias = "place")]
    pub place_id: Option<i64>,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
    pub receipt_image: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_payment_method() -> String {
    "Cash".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_validate() {
        for category in EXPENSE_CATEGORIES {
            assert!(validate_category(category).is_ok());
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(validate_category("Bribes").is_err());
        assert!(validate_category("food").is_err());
    }

    #[test]
    fn amount_converts_to_cents() {
        let expense = NewExpense {
            title: "Lunch".into(),
            amount: Some(12.5),
            category: "Food".into(),
            date: "2025-01-10".into(),
            location: None,
            description: None,
            trip_id: None,
            place_id: None,
            currency: "USD".into(),
            payment_method: "Cash".into(),
            receipt_image: None,
            tags: Vec::new(),
        };
        assert_eq!(expense.amount_cents(), 1250);
    }
}
