//! Check Session Use Case
//!
//! Resolves a cookie token to its session and user.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

pub struct CheckSessionUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> CheckSessionUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    /// Valid session and its (still active) user
    pub async fn authenticate(
        &self,
        token: &str,
        fingerprint_hash: &[u8],
    ) -> AuthResult<(AuthSession, User)> {
        let session_id = session_token::verify(&self.config.session_secret, token)?;

        let mut session = self
            .session_repo
            .find_session(session_id, fingerprint_hash)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        let now = Utc::now();
        if session.is_expired_at(now) {
            self.session_repo.delete_session(session_id).await?;
            return Err(AuthError::SessionInvalid);
        }

        let user = self
            .user_repo
            .find_user_by_id(&session.user_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;
        if !user.can_login() {
            self.session_repo.delete_session(session_id).await?;
            return Err(AuthError::SessionInvalid);
        }

        session.touch(now, self.config.session_ttl(true));
        self.session_repo.update_session(&session).await?;

        Ok((session, user))
    }
}
