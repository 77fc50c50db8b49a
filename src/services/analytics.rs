//! Expense and budget aggregation.
//!
//! Pure functions over expense rows; handlers feed them the filtered result
//! of a query and serialize what comes back. All amounts are cents.

use crate::models::money;
use crate::models::Expense;
use serde::Serialize;
use std::collections::HashMap;

/// One category bucket of a trip's spending.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    #[serde(rename = "totalAmount", serialize_with = "money::serialize_cents")]
    pub total_cents: i64,
    pub count: i64,
}

/// Group expenses by category in a single pass. Buckets keep the order in
/// which their category first appears.
pub fn category_totals(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for expense in expenses {
        match totals.iter_mut().find(|t| t.category == expense.category) {
            Some(bucket) => {
                bucket.total_cents += expense.amount_cents;
                bucket.count += 1;
            }
            None => totals.push(CategoryTotal {
                category: expense.category.clone(),
                total_cents: expense.amount_cents,
                count: 1,
            }),
        }
    }

    totals
}

pub fn total_spent(expenses: &[Expense]) -> i64 {
    expenses.iter().map(|e| e.amount_cents).sum()
}

/// `None` when the trip has no declared budget.
pub fn budget_remaining(budget_cents: Option<i64>, spent_cents: i64) -> Option<i64> {
    budget_cents.map(|budget| budget - spent_cents)
}

/// Per-category sums over a filtered expense set, descending by total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpending {
    pub category: String,
    #[serde(rename = "total", serialize_with = "money::serialize_cents")]
    pub total_cents: i64,
    pub count: i64,
}

pub fn spending_by_category(expenses: &[Expense]) -> Vec<CategorySpending> {
    let mut data: HashMap<String, (i64, i64)> = HashMap::new();

    for expense in expenses {
        let entry = data.entry(expense.category.clone()).or_insert((0, 0));
        entry.0 += expense.amount_cents;
        entry.1 += 1;
    }

    let mut result: Vec<CategorySpending> = data
        .into_iter()
        .map(|(category, (total_cents, count))| CategorySpending {
            category,
            total_cents,
            count,
        })
        .collect();

    result.sort_by(|a, b| b.total_cents.cmp(&a.total_cents));
    result
}

/// Per-day sums over a filtered expense set, ascending by date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySpending {
    pub date: String,
    #[serde(rename = "total", serialize_with = "money::serialize_cents")]
    pub total_cents: i64,
    pub count: i64,
}

pub fn spending_by_day(expenses: &[Expense]) -> Vec<DailySpending> {
    let mut data: HashMap<String, (i64, i64)> = HashMap::new();

    for expense in expenses {
        let entry = data.entry(expense.date.clone()).or_insert((0, 0));
        entry.0 += expense.amount_cents;
        entry.1 += 1;
    }

    let mut result: Vec<DailySpending> = data
        .into_iter()
        .map(|(date, (total_cents, count))| DailySpending {
            date,
            total_cents,
            count,
        })
        .collect();

    result.sort_by(|a, b| a.date.cmp(&b.date));
    result
}

/// Ceiling division for pagination; 0 items is 0 pages.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}
