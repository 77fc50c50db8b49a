use std::env;
use std::path::PathBuf;

/// Settings for the generative-language API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; `None` disables the AI endpoints (they answer 503).
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub migrations_path: PathBuf,
    pub gemini: GeminiConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let gemini = GeminiConfig {
            api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("WAYFARER_GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.into()),
            model: env::var("WAYFARER_GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into()),
        };

        if gemini.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set, AI plan endpoints will be unavailable");
        }

        Self {
            host: env::var("WAYFARER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("WAYFARER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            database_path: env::var("WAYFARER_DATABASE_URL")
                .map(|v| {
                    PathBuf::from(
                        v.strip_prefix("sqlite://")
                            .or_else(|| v.strip_prefix("sqlite:"))
                            .unwrap_or(&v),
                    )
                })
                .unwrap_or_else(|_| PathBuf::from("data/wayfarer.db")),
            migrations_path: env::var("WAYFARER_MIGRATIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("migrations")),
            gemini,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
