//! Sign In Use Case
//!
//! Password check with lockout, then the second factor for staff roles or
//! anyone who enabled TOTP. A pending TOTP secret (fresh from an MFA
//! bootstrap) becomes enabled with its first valid code.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::role::UserRole;

use crate::application::config::AuthConfig;
use crate::application::credentials::verify_credentials;
use crate::application::session_token;
use crate::domain::entity::auth::TotpState;
use crate::domain::entity::auth_session::{AuthSession, SessionClient};
use crate::domain::repository::{AuthRepository, AuthSessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    /// Email address, matched case-insensitively
    pub email: String,
    /// Password
    pub password: String,
    /// Persistent cookie instead of a browser-session one
    pub remember_me: bool,
    /// TOTP code (second step for accounts with 2FA)
    pub totp_code: Option<String>,
}

pub enum SignInOutput {
    /// Password accepted; submit again with a TOTP code
    TwoFactorRequired { public_id: String },
    SignedIn(SignedIn),
}

/// Established session
pub struct SignedIn {
    /// Session token for cookie
    pub session_token: String,
    /// Remember me flag, echoed for the cookie lifetime
    pub remember_me: bool,
    /// Public ID
    pub public_id: String,
    pub role: UserRole,
    /// Account is scheduled for deletion and may still cancel it
    pub pending_deletion: bool,
    /// When the scheduled purge runs
    pub deletion_scheduled_for: Option<DateTime<Utc>>,
}

pub struct SignInUseCase<U, A, S>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, A, S> SignInUseCase<U, A, S>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        auth_repo: Arc<A>,
        session_repo: Arc<S>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            auth_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput, client: SessionClient) -> AuthResult<SignInOutput> {
        let (mut user, mut auth) = verify_credentials(
            &*self.user_repo,
            &*self.auth_repo,
            &self.config,
            &input.email,
            input.password,
        )
        .await?;

        let needs_totp = user.requires_2fa() || auth.totp_state() == TotpState::Enabled;
        if needs_totp {
            let secret = auth.totp_secret.clone().ok_or(AuthError::TwoFactorNotSetup)?;

            let Some(code) = input.totp_code.as_deref() else {
                return Ok(SignInOutput::TwoFactorRequired {
                    public_id: user.public_id.to_string(),
                });
            };

            if !secret.verify(code, user.email.as_str())? {
                self.auth_repo
                    .record_login_failure(&user.user_id, Utc::now())
                    .await?;
                return Err(AuthError::InvalidTwoFactorCode);
            }

            if auth.totp_state() == TotpState::Pending {
                auth.enable_totp();
                self.auth_repo.update_auth(&auth).await?;
                tracing::info!(public_id = %user.public_id, "TOTP activated on first sign in");
            }
        }

        self.auth_repo
            .reset_login_failures(&user.user_id, Utc::now())
            .await?;

        user.record_login();
        self.user_repo.update_user(&user).await?;

        let session = AuthSession::new(
            user.user_id,
            input.remember_me,
            client,
            self.config.session_ttl(input.remember_me),
        );
        self.session_repo.create_session(&session).await?;
        let session_token = session_token::sign(&self.config.session_secret, session.session_id)?;

        tracing::info!(
            public_id = %user.public_id,
            session_id = %session.session_id,
            remember_me = input.remember_me,
            "User signed in"
        );

        Ok(SignInOutput::SignedIn(SignedIn {
            session_token,
            remember_me: input.remember_me,
            public_id: user.public_id.to_string(),
            role: user.role,
            pending_deletion: user.is_pending_deletion(),
            deletion_scheduled_for: user.deletion_scheduled_for,
        }))
    }
}
