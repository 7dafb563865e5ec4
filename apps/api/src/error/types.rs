use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
    /// Machine-readable reason for token rejections and authority outages.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    error_code: Option<String>,
}

impl ErrorResponse {
    pub(super) fn new(message: String, error_code: Option<String>) -> Self {
        Self {
            message,
            error_code,
        }
    }
}
