use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Settings for the external text generation service.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// `None` disables AI features; every call then fails with a generic error.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_files: usize,
    pub max_file_bytes: usize,
}

impl UploadConfig {
    /// Whole multipart body limit: every file at its maximum plus some slack
    /// for multipart framing.
    pub fn body_limit(&self) -> usize {
        self.max_files
            .saturating_mul(self.max_file_bytes)
            .saturating_add(64 * 1024)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub ai: AiConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "scheduler-pro".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "scheduler-pro-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
        };
        let ai = AiConfig {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".into()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
            timeout_secs: env_parse("AI_TIMEOUT_SECS").unwrap_or(60),
        };
        let upload = UploadConfig {
            max_files: env_parse("UPLOAD_MAX_FILES").unwrap_or(10),
            max_file_bytes: env_parse("UPLOAD_MAX_FILE_BYTES").unwrap_or(20 * 1024 * 1024),
        };
        Ok(Self {
            database_url,
            jwt,
            ai,
            upload,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
