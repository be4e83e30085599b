// src/models/admin.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO for admin login.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, max = 256))]
    pub secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// DTO for a manual Telegram broadcast.
#[derive(Debug, Deserialize, Validate)]
pub struct NotifyRequest {
    /// Telegram caps message text at 4096 characters.
    #[validate(length(min = 1, max = 4096, message = "Message must be 1 to 4096 characters."))]
    pub message: String,
}
