use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub long_url: String,
    /// Zero, negative or missing selects the service default.
    #[serde(default)]
    pub expiration_seconds: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub long_url: String,
    pub short_code: String,
    pub short_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsageResponse {
    pub short_code: String,
    pub usage_count: u64,
}
