use crate::models::ai_plan::{AiPlan, NewAiPlan};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

pub fn create_plan(conn: &Connection, input: &NewAiPlan, generated: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO ai_plans (destination, days, traveler_category, trip_type, vehicle,
         budget, generated_plan)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            input.destination,
            input.days,
            input.traveler_category,
            input.trip_type,
            input.vehicle,
            input.budget,
            generated,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(plan_id = id, destination = %input.destination, "Stored AI plan");
    Ok(id)
}

pub fn get_plan(conn: &Connection, id: i64) -> rusqlite::Result<Option<AiPlan>> {
    conn.query_row(
        "SELECT id, destination, days, traveler_category, trip_type, vehicle, budget,
                generated_plan, created_at
         FROM ai_plans WHERE id = ?",
        [id],
        |row| {
            Ok(AiPlan {
                id: row.get(0)?,
                destination: row.get(1)?,
                days: row.get(2)?,
                traveler_category: row.get(3)?,
                trip_type: row.get(4)?,
                vehicle: row.get(5)?,
                budget: row.get(6)?,
                generated_plan: row.get(7)?,
                created_at: row.get(8)?,
            })
        },
    )
    .optional()
}
