use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub frame_base_url: String,
    pub frame_signing_secret: String,
    pub frame_url_ttl_seconds: u64,
    pub guess_min_interval_ms: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            frame_base_url: env::var("FRAME_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:9000/frames".to_string()),
            frame_signing_secret: env::var("FRAME_SIGNING_SECRET")
                .unwrap_or_else(|_| "dev-secret".to_string()),
            frame_url_ttl_seconds: env::var("FRAME_URL_TTL_SECONDS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .expect("Invalid FRAME_URL_TTL_SECONDS"),
            guess_min_interval_ms: env::var("GUESS_MIN_INTERVAL_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .expect("Invalid GUESS_MIN_INTERVAL_MS"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
