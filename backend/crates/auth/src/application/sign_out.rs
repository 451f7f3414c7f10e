//! Sign Out Use Case

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::repository::AuthSessionRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

pub struct SignOutUseCase<S>
where
    S: AuthSessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SignOutUseCase<S>
where
    S: AuthSessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// End the session behind `token`; an unknown token is not an error
    pub async fn execute(&self, token: &str) -> AuthResult<()> {
        let session_id = session_token::verify(&self.config.session_secret, token)?;
        self.session_repo.delete_session(session_id).await?;
        tracing::info!(session_id = %session_id, "User signed out");
        Ok(())
    }

    /// End every session of the user
    pub async fn execute_all(&self, user_id: &UserId) -> AuthResult<u64> {
        let revoked = self.session_repo.delete_sessions_for_user(user_id, None).await?;
        tracing::info!(user_id = %user_id, revoked, "User signed out everywhere");
        Ok(revoked)
    }
}
