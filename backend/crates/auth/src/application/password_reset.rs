//! Password Reset Use Case

use std::sync::Arc;

use chrono::Utc;
use platform::crypto::hash_secret;
use platform::mailer::{Email as Mail, Mailer};

use crate::application::config::AuthConfig;
use crate::domain::entity::action_token::{ActionPurpose, ActionToken};
use crate::domain::repository::{
    ActionTokenRepository, AuthRepository, AuthSessionRepository, UserRepository,
};
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct PasswordResetUseCase<U, A, S, T>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
    T: ActionTokenRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    session_repo: Arc<S>,
    token_repo: Arc<T>,
    mailer: Mailer,
    config: Arc<AuthConfig>,
}

impl<U, A, S, T> PasswordResetUseCase<U, A, S, T>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
    T: ActionTokenRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        auth_repo: Arc<A>,
        session_repo: Arc<S>,
        token_repo: Arc<T>,
        mailer: Mailer,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            auth_repo,
            session_repo,
            token_repo,
            mailer,
            config,
        }
    }

    /// Mail a reset link when the address belongs to an account.
    /// The outcome is never revealed to the caller.
    pub async fn forgot(&self, email: &str) -> AuthResult<()> {
        let Ok(email) = Email::new(email) else {
            return Ok(());
        };
        let Some(user) = self.user_repo.find_user_by_email(&email).await? else {
            tracing::debug!(email = %email.masked(), "Password reset for unknown address");
            return Ok(());
        };
        if !user.can_login() {
            return Ok(());
        }

        self.token_repo
            .revoke_action_tokens(&user.user_id, ActionPurpose::PasswordReset)
            .await?;
        let (token, secret) =
            ActionToken::issue(user.user_id, ActionPurpose::PasswordReset, None, Utc::now());
        self.token_repo.create_action_token(&token).await?;

        let mail = Mail::new(
            user.email.as_str(),
            "Reset your password",
            format!(
                "Someone asked to reset the password of your account.\n\nChoose a new password here:\n{}\n\nThe link is valid for one hour. If it was not you, ignore this message.",
                self.config.link("/reset-password", &secret)
            ),
        );
        if let Err(e) = self.mailer.send(&mail).await {
            tracing::error!(error = %e, public_id = %user.public_id, "Password reset email not sent");
        } else {
            tracing::info!(public_id = %user.public_id, "Password reset requested");
        }
        Ok(())
    }

    /// Set a new password; every session of the user ends
    pub async fn reset(&self, token: &str, new_password: String) -> AuthResult<()> {
        // Policy first, so a weak password does not burn the token
        let raw = RawPassword::new(new_password)?;

        let consumed = self
            .token_repo
            .consume_action_token(ActionPurpose::PasswordReset, &hash_secret(token), Utc::now())
            .await?
            .ok_or(AuthError::TokenGone)?;

        let user = self
            .user_repo
            .find_user_by_id(&consumed.user_id)
            .await?
            .ok_or(AuthError::TokenGone)?;
        let mut auth = self
            .auth_repo
            .find_auth(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials missing for user".to_string()))?;

        auth.update_password(UserPassword::from_raw(&raw, self.config.pepper())?);
        self.auth_repo.update_auth(&auth).await?;
        self.auth_repo
            .reset_login_failures(&user.user_id, Utc::now())
            .await?;

        let revoked = self
            .session_repo
            .delete_sessions_for_user(&user.user_id, None)
            .await?;

        tracing::info!(public_id = %user.public_id, sessions_revoked = revoked, "Password reset");
        Ok(())
    }
}
