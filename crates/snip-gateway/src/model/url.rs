use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use snip_core::UrlMapping;

#[derive(Debug, Deserialize)]
pub struct AddUrlForm {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddUrlResponse {
    pub result: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MappingResponse {
    pub short_key: String,
    pub long_url: String,
    pub created_at: Timestamp,
}

impl From<UrlMapping> for MappingResponse {
    fn from(mapping: UrlMapping) -> Self {
        Self {
            short_key: mapping.short_key.into(),
            long_url: mapping.long_url,
            created_at: mapping.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
