use std::env;

/// Process configuration, read once at startup. Every value has a
/// development default so a bare environment still boots.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub completion: CompletionConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            database: DatabaseConfig {
                host: env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
                port: env::var("DB_PORT")
                    .unwrap_or_else(|_| "5432".to_string())
                    .parse()
                    .unwrap_or(5432),
                dbname: env::var("DB_NAME").unwrap_or_else(|_| "intervue_db".to_string()),
                user: env::var("DB_USER").unwrap_or_else(|_| "intervue_user".to_string()),
                password: env::var("DB_PASSWORD").unwrap_or_else(|_| "".to_string()),
            },
            completion: CompletionConfig {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_else(|_| "".to_string()),
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
                temperature: env::var("OPENAI_TEMPERATURE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.7),
                max_tokens: env::var("OPENAI_MAX_TOKENS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1500),
                timeout_secs: env::var("OPENAI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
            },
        }
    }
}
