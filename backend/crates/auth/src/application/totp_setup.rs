//! TOTP Setup Use Case
//!
//! Enrol, confirm and remove an authenticator for a signed-in user.

use std::sync::Arc;

use crate::domain::entity::auth::{Auth, TotpState};
use crate::domain::entity::user::User;
use crate::domain::repository::AuthRepository;
use crate::domain::value_object::totp_secret::TotpSecret;
use crate::error::{AuthError, AuthResult};

/// Provisioning material for an authenticator app
pub struct TotpSetupOutput {
    /// Base64 PNG
    pub qr_code_base64: String,
    /// Base32 secret for manual entry
    pub secret: String,
    /// `otpauth://` provisioning URI
    pub otpauth_url: String,
}

impl TotpSetupOutput {
    pub fn for_secret(secret: &TotpSecret, account_name: &str) -> AuthResult<Self> {
        Ok(Self {
            qr_code_base64: secret.qr_code_base64(account_name)?,
            secret: secret.as_base32().to_string(),
            otpauth_url: secret.otpauth_url(account_name)?,
        })
    }
}

pub struct TotpSetupUseCase<A>
where
    A: AuthRepository,
{
    auth_repo: Arc<A>,
}

impl<A> TotpSetupUseCase<A>
where
    A: AuthRepository,
{
    pub fn new(auth_repo: Arc<A>) -> Self {
        Self { auth_repo }
    }

    async fn load(&self, user: &User) -> AuthResult<Auth> {
        self.auth_repo
            .find_auth(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials missing for user".to_string()))
    }

    /// New pending secret; replaces an unconfirmed one
    pub async fn setup(&self, user: &User) -> AuthResult<TotpSetupOutput> {
        let mut auth = self.load(user).await?;
        if auth.totp_state() == TotpState::Enabled {
            return Err(AuthError::TwoFactorAlreadyEnabled);
        }

        let secret = auth.setup_totp();
        self.auth_repo.update_auth(&auth).await?;

        TotpSetupOutput::for_secret(&secret, user.email.as_str())
    }

    /// Confirm the pending secret with a code
    pub async fn verify(&self, user: &User, code: &str) -> AuthResult<()> {
        let mut auth = self.load(user).await?;
        let secret = auth.totp_secret.clone().ok_or(AuthError::TwoFactorNotSetup)?;
        if auth.totp_state() == TotpState::Enabled {
            return Err(AuthError::TwoFactorAlreadyEnabled);
        }

        if !secret.verify(code, user.email.as_str())? {
            return Err(AuthError::InvalidTwoFactorCode);
        }

        auth.enable_totp();
        self.auth_repo.update_auth(&auth).await?;
        tracing::info!(public_id = %user.public_id, "TOTP enabled");
        Ok(())
    }

    /// Remove TOTP; staff accounts must keep it
    pub async fn disable(&self, user: &User, code: &str) -> AuthResult<()> {
        if user.requires_2fa() {
            return Err(AuthError::TwoFactorMandatory);
        }

        let mut auth = self.load(user).await?;
        let secret = auth.totp_secret.clone().ok_or(AuthError::TwoFactorNotSetup)?;
        if !secret.verify(code, user.email.as_str())? {
            return Err(AuthError::InvalidTwoFactorCode);
        }

        auth.disable_totp();
        self.auth_repo.update_auth(&auth).await?;
        tracing::info!(public_id = %user.public_id, "TOTP disabled");
        Ok(())
    }
}
