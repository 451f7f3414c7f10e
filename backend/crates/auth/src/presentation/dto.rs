//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn default_role() -> String {
    "customer".to_string()
}

/// Only the self-service roles may be requested at sign up
fn self_service_role(role: &str) -> Result<(), ValidationError> {
    match kernel::role::UserRole::from_code(role.trim()) {
        Some(role) if role.is_self_service() => Ok(()),
        _ => Err(ValidationError::new("role_not_allowed")
            .with_message("only customer and provider can sign up".into())),
    }
}

// ============================================================================
// Sign Up
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "must be 8 to 128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub display_name: String,
    #[serde(default = "default_role")]
    #[validate(custom(function = "self_service_role"))]
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub public_id: String,
    pub role: String,
}

// ============================================================================
// Sign In / Session
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
    /// Required on the second round for TOTP accounts
    #[validate(length(min = 6, max = 6))]
    pub totp_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub public_id: String,
    /// True when the request must be repeated with `totpCode`
    pub requires_2fa: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub pending_deletion: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_scheduled_for_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub public_id: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub expires_at_ms: Option<i64>,
    pub pending_deletion: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutAllResponse {
    pub revoked: u64,
}

// ============================================================================
// TOTP
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpSetupResponse {
    /// Base64 PNG
    pub qr_code: String,
    /// For manual entry
    pub secret: String,
    pub otpauth_url: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TotpCodeRequest {
    #[validate(length(min = 6, max = 6, message = "must be 6 digits"))]
    pub code: String,
}

// ============================================================================
// MFA Bootstrap
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MfaBootstrapRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaBootstrapAccepted {
    pub expires_at_ms: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MfaIssueRequest {
    #[validate(length(min = 1, max = 64))]
    pub user_public_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaIssueResponse {
    pub token: String,
    pub user_public_id: String,
    pub expires_at_ms: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[validate(length(min = 1, max = 256))]
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaRedeemResponse {
    pub public_id: String,
    pub qr_code: String,
    pub secret: String,
    pub otpauth_url: String,
}

// ============================================================================
// Delete Account
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCodeSentResponse {
    pub expires_at_ms: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVerifyRequest {
    #[validate(length(min = 6, max = 6, message = "must be 6 digits"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVerifyResponse {
    pub delete_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteConfirmRequest {
    #[validate(length(min = 1, max = 256))]
    pub delete_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteConfirmResponse {
    pub deletion_scheduled_for_ms: i64,
}

// ============================================================================
// Password / Email
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, max = 256))]
    pub token: String,
    #[validate(length(min = 8, max = 128, message = "must be 8 to 128 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmailChangeRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub new_email: String,
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailChangedResponse {
    pub email: String,
}
