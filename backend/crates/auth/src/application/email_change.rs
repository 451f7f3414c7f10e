//! Email Change and Verification Use Case
//!
//! A change is requested with the password and takes effect once the new
//! address follows the mailed link. The old address gets a notice.

use std::sync::Arc;

use chrono::Utc;
use platform::crypto::hash_secret;
use platform::mailer::{Email as Mail, Mailer};

use crate::application::config::AuthConfig;
use crate::application::credentials::verify_password;
use crate::domain::entity::action_token::{ActionPurpose, ActionToken};
use crate::domain::entity::user::User;
use crate::domain::repository::{ActionTokenRepository, AuthRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct EmailChangeUseCase<U, A, T>
where
    U: UserRepository,
    A: AuthRepository,
    T: ActionTokenRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    token_repo: Arc<T>,
    mailer: Mailer,
    config: Arc<AuthConfig>,
}

impl<U, A, T> EmailChangeUseCase<U, A, T>
where
    U: UserRepository,
    A: AuthRepository,
    T: ActionTokenRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        auth_repo: Arc<A>,
        token_repo: Arc<T>,
        mailer: Mailer,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            auth_repo,
            token_repo,
            mailer,
            config,
        }
    }

    pub async fn request_change(
        &self,
        user: &User,
        new_email: &str,
        password: String,
    ) -> AuthResult<()> {
        let new_email = Email::new(new_email)?;
        if new_email == user.email {
            return Err(AuthError::EmailTaken);
        }

        verify_password(&*self.auth_repo, &self.config, user, password).await?;

        if self.user_repo.email_exists(&new_email).await? {
            return Err(AuthError::EmailTaken);
        }

        self.token_repo
            .revoke_action_tokens(&user.user_id, ActionPurpose::EmailChange)
            .await?;
        let (token, secret) = ActionToken::issue(
            user.user_id,
            ActionPurpose::EmailChange,
            Some(new_email.as_str().to_string()),
            Utc::now(),
        );
        self.token_repo.create_action_token(&token).await?;

        let confirm = Mail::new(
            new_email.as_str(),
            "Confirm your new email address",
            format!(
                "Follow this link to use this address for your account:\n{}\n\nThe link is valid for 24 hours.",
                self.config.link("/confirm-email", &secret)
            ),
        );
        if let Err(e) = self.mailer.send(&confirm).await {
            tracing::error!(error = %e, public_id = %user.public_id, "Email change confirmation not sent");
            return Err(AuthError::Internal("Could not deliver the confirmation".to_string()));
        }

        let notice = Mail::new(
            user.email.as_str(),
            "Email change requested",
            format!(
                "A change of your account address to {} was requested. If it was not you, reset your password.",
                new_email.masked()
            ),
        );
        if let Err(e) = self.mailer.send(&notice).await {
            tracing::warn!(error = %e, public_id = %user.public_id, "Email change notice not sent");
        }

        tracing::info!(
            public_id = %user.public_id,
            new_email = %new_email.masked(),
            "Email change requested"
        );
        Ok(())
    }

    /// Apply the change behind `token`; returns the new address
    pub async fn confirm_change(&self, token: &str) -> AuthResult<String> {
        let consumed = self
            .token_repo
            .consume_action_token(ActionPurpose::EmailChange, &hash_secret(token), Utc::now())
            .await?
            .ok_or(AuthError::TokenGone)?;

        let new_email = consumed
            .new_email
            .as_deref()
            .map(Email::new)
            .transpose()?
            .ok_or(AuthError::TokenGone)?;

        let mut user = self
            .user_repo
            .find_user_by_id(&consumed.user_id)
            .await?
            .ok_or(AuthError::TokenGone)?;

        // Someone may have registered the address in the meantime
        if self.user_repo.email_exists(&new_email).await? {
            return Err(AuthError::EmailTaken);
        }

        user.change_email(new_email);
        self.user_repo.update_user(&user).await?;

        tracing::info!(public_id = %user.public_id, "Email changed");
        Ok(user.email.as_str().to_string())
    }

    pub async fn verify_email(&self, token: &str) -> AuthResult<()> {
        let consumed = self
            .token_repo
            .consume_action_token(
                ActionPurpose::EmailVerification,
                &hash_secret(token),
                Utc::now(),
            )
            .await?
            .ok_or(AuthError::TokenGone)?;

        let mut user = self
            .user_repo
            .find_user_by_id(&consumed.user_id)
            .await?
            .ok_or(AuthError::TokenGone)?;

        user.mark_email_verified();
        self.user_repo.update_user(&user).await?;

        tracing::info!(public_id = %user.public_id, "Email verified");
        Ok(())
    }
}
