pub mod ai_client;
pub mod analytics;
