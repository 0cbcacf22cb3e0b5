use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub database_url: String,
    pub chat_base_url: String,
    pub chat_endpoint: String,
    pub chat_api_key: Option<String>,
    pub chat_model: String,
    pub chat_temperature: f64,
    pub chat_top_p: f64,
    pub chat_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env::var("APP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("APP_PORT must be a number"),
            environment: env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            chat_base_url: env::var("CHAT_BASE_URL")
                .unwrap_or_else(|_| "https://qianfan.baidubce.com".to_string()),
            chat_endpoint: env::var("CHAT_ENDPOINT")
                .unwrap_or_else(|_| "/v2/chat/completions".to_string()),
            chat_api_key: env::var("CHAT_API_KEY").ok(),
            chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| "ernie-3.5-8k".to_string()),
            chat_temperature: env::var("CHAT_TEMPERATURE")
                .unwrap_or_else(|_| "0.7".to_string())
                .parse()
                .expect("CHAT_TEMPERATURE must be a number"),
            chat_top_p: env::var("CHAT_TOP_P")
                .unwrap_or_else(|_| "0.8".to_string())
                .parse()
                .expect("CHAT_TOP_P must be a number"),
            chat_timeout_secs: env::var("CHAT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("CHAT_TIMEOUT_SECS must be a number"),
        }
    }
}
