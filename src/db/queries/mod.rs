pub mod ai_plans;
pub mod expenses;
pub mod places;
pub mod trips;
pub mod users;
