//! Delete Account Use Case
//!
//! request (code mailed) → verify (code for delete token) → confirm (user
//! enters the grace period, sessions revoked). Cancel restores the account
//! while the grace period runs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::mailer::{Email as Mail, Mailer};

use crate::domain::entity::delete_request::{DeleteRequest, FailedAttempt};
use crate::domain::entity::user::User;
use crate::domain::repository::{AuthSessionRepository, DeleteRequestRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

pub struct DeleteAccountUseCase<U, S, D>
where
    U: UserRepository,
    S: AuthSessionRepository,
    D: DeleteRequestRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    request_repo: Arc<D>,
    mailer: Mailer,
}

impl<U, S, D> DeleteAccountUseCase<U, S, D>
where
    U: UserRepository,
    S: AuthSessionRepository,
    D: DeleteRequestRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, request_repo: Arc<D>, mailer: Mailer) -> Self {
        Self {
            user_repo,
            session_repo,
            request_repo,
            mailer,
        }
    }

    /// Mail a fresh code; returns its expiry
    pub async fn request(&self, user: &User) -> AuthResult<DateTime<Utc>> {
        let now = Utc::now();
        if let Some(existing) = self.request_repo.find_delete_request(&user.user_id).await? {
            if existing.blocks_resend_at(now) {
                return Err(AuthError::Cooldown);
            }
        }

        let (request, code) = DeleteRequest::new(user.user_id, user.email.as_str().to_string(), now);
        self.request_repo.save_delete_request(&request).await?;

        let mail = Mail::new(
            &request.email,
            "Confirm account deletion",
            format!(
                "Your account deletion code is {code}.\n\nIt expires in {} minutes. If you did not ask to delete your account, change your password.",
                DeleteRequest::CODE_TTL_MINUTES
            ),
        );
        if let Err(e) = self.mailer.send(&mail).await {
            tracing::error!(error = %e, public_id = %user.public_id, "Deletion code email not sent");
            self.request_repo.remove_delete_request(&user.user_id).await?;
            return Err(AuthError::Internal("Could not deliver the code".to_string()));
        }

        tracing::info!(public_id = %user.public_id, "Account deletion requested");
        Ok(request.expires_at)
    }

    /// Exchange the mailed code for a delete token. Attempts are counted
    /// by the store, so parallel guesses each use up one of the five.
    pub async fn verify(&self, user: &User, code: &str) -> AuthResult<String> {
        let now = Utc::now();
        let request = self
            .request_repo
            .find_delete_request(&user.user_id)
            .await?
            .ok_or(AuthError::TokenGone)?;

        if request.is_expired_at(now) {
            self.request_repo
                .discard_delete_request(request.request_id)
                .await?;
            return Err(AuthError::TokenGone);
        }

        if request.matches_code(code) {
            let (token, token_hash) = DeleteRequest::new_delete_token();
            let stored = self
                .request_repo
                .mark_delete_verified(request.request_id, &token_hash, now)
                .await?;
            if !stored {
                return Err(AuthError::TokenGone);
            }
            tracing::info!(public_id = %user.public_id, "Account deletion verified");
            return Ok(token);
        }

        let attempts = self
            .request_repo
            .record_delete_attempt(request.request_id, now)
            .await?
            .ok_or(AuthError::TokenGone)?;

        match DeleteRequest::after_failed_attempt(attempts) {
            FailedAttempt::Wrong { remaining } => {
                tracing::warn!(public_id = %user.public_id, remaining, "Wrong deletion code");
                Err(AuthError::InvalidCode)
            }
            FailedAttempt::Exhausted => {
                self.request_repo
                    .discard_delete_request(request.request_id)
                    .await?;
                tracing::warn!(public_id = %user.public_id, "Deletion code attempts exhausted");
                Err(AuthError::TooManyAttempts)
            }
        }
    }

    /// Schedule the deletion; returns the purge date
    pub async fn confirm(&self, user: &User, delete_token: &str) -> AuthResult<DateTime<Utc>> {
        let now = Utc::now();
        let request = self
            .request_repo
            .find_delete_request(&user.user_id)
            .await?
            .filter(|r| !r.is_expired_at(now))
            .ok_or(AuthError::TokenGone)?;

        if !request.verified {
            return Err(AuthError::DeletionNotVerified);
        }
        if !request.accepts_delete_token(delete_token) {
            return Err(AuthError::InvalidDeleteToken);
        }

        let mut user = user.clone();
        let scheduled_for = user.schedule_deletion(now);
        self.user_repo.update_user(&user).await?;
        self.request_repo.remove_delete_request(&user.user_id).await?;
        let revoked = self
            .session_repo
            .delete_sessions_for_user(&user.user_id, None)
            .await?;

        tracing::info!(
            public_id = %user.public_id,
            scheduled_for = %scheduled_for,
            sessions_revoked = revoked,
            "Account deletion scheduled"
        );
        Ok(scheduled_for)
    }

    pub async fn cancel(&self, user: &User) -> AuthResult<()> {
        let mut user = user.clone();
        if !user.cancel_deletion() {
            return Err(AuthError::NotPendingDeletion);
        }
        self.user_repo.update_user(&user).await?;
        self.request_repo.remove_delete_request(&user.user_id).await?;
        tracing::info!(public_id = %user.public_id, "Account deletion cancelled");
        Ok(())
    }
}
