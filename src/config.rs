use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

/// Fixed sampling parameters for one kind of upstream call.
#[derive(Debug, Clone)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub openai: OpenAiConfig,
    pub chat: ModelParams,
    pub analysis: ModelParams,
    pub text_document_char_limit: usize,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        let base_url = lookup("OPENAI_BASE_URL")
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();

        AppConfig {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080),
            openai: OpenAiConfig {
                api_key,
                base_url,
                timeout: parsed("UPSTREAM_TIMEOUT_SECS")
                    .filter(|s| *s > 0)
                    .map(Duration::from_secs),
            },
            chat: ModelParams {
                model: lookup("OPENAI_CHAT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
                temperature: 0.7,
                max_tokens: 4096,
                top_p: Some(0.95),
            },
            analysis: ModelParams {
                model: lookup("OPENAI_ANALYSIS_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
                temperature: 0.4,
                max_tokens: 16384,
                top_p: None,
            },
            text_document_char_limit: parsed("TEXT_DOCUMENT_CHAR_LIMIT")
                .map(|n| n as usize)
                .unwrap_or(5000),
            max_body_bytes: parsed("MAX_BODY_BYTES")
                .map(|n| n as usize)
                .unwrap_or(10 * 1024 * 1024),
        }
    }
}
