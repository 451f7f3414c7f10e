//! Repository Traits
//!
//! Persistence interfaces; the PostgreSQL implementation is in `infra`.
//! Single-use secrets are consumed atomically by the repository so a token
//! can never be redeemed twice under concurrency.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entity::{
    action_token::{ActionPurpose, ActionToken},
    auth::Auth,
    auth_session::AuthSession,
    delete_request::DeleteRequest,
    mfa_bootstrap_token::MfaBootstrapToken,
    user::User,
};
use crate::domain::value_object::{email::Email, public_id::PublicId, user_id::UserId};
use crate::error::AuthResult;

#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn create_user(&self, user: &User) -> AuthResult<()>;

    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_user_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>>;

    async fn find_user_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn email_exists(&self, email: &Email) -> AuthResult<bool>;

    async fn update_user(&self, user: &User) -> AuthResult<()>;

    /// Remove users whose deletion date has passed, with everything they own
    async fn purge_deleted_users(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

#[trait_variant::make(AuthRepository: Send)]
pub trait LocalAuthRepository {
    async fn create_auth(&self, auth: &Auth) -> AuthResult<()>;

    async fn find_auth(&self, user_id: &UserId) -> AuthResult<Option<Auth>>;

    /// Password hash and TOTP state; the failure counter is left alone
    async fn update_auth(&self, auth: &Auth) -> AuthResult<()>;

    /// Count one failed attempt in a single write and return the result,
    /// so parallel guesses cannot overwrite each other's count
    async fn record_login_failure(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Auth>>;

    async fn reset_login_failures(&self, user_id: &UserId, now: DateTime<Utc>) -> AuthResult<()>;
}

#[trait_variant::make(AuthSessionRepository: Send)]
pub trait LocalAuthSessionRepository {
    async fn create_session(&self, session: &AuthSession) -> AuthResult<()>;

    /// Session by id, only when the fingerprint matches
    async fn find_session(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>>;

    async fn update_session(&self, session: &AuthSession) -> AuthResult<()>;

    async fn delete_session(&self, session_id: Uuid) -> AuthResult<()>;

    /// Every session of the user, optionally sparing one
    async fn delete_sessions_for_user(
        &self,
        user_id: &UserId,
        except: Option<Uuid>,
    ) -> AuthResult<u64>;

    async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

#[trait_variant::make(MfaTokenRepository: Send)]
pub trait LocalMfaTokenRepository {
    async fn create_mfa_token(&self, token: &MfaBootstrapToken) -> AuthResult<()>;

    /// Most recently issued token of the user, used or not
    async fn latest_mfa_token(&self, user_id: &UserId) -> AuthResult<Option<MfaBootstrapToken>>;

    /// Delete the user's unused tokens
    async fn revoke_mfa_tokens(&self, user_id: &UserId) -> AuthResult<u64>;

    /// Mark the token with this secret hash used, if usable at `now`
    async fn consume_mfa_token(
        &self,
        secret_hash: &[u8],
        now: DateTime<Utc>,
    ) -> AuthResult<Option<MfaBootstrapToken>>;

    async fn cleanup_expired_mfa_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

#[trait_variant::make(DeleteRequestRepository: Send)]
pub trait LocalDeleteRequestRepository {
    /// Insert or replace the user's request
    async fn save_delete_request(&self, request: &DeleteRequest) -> AuthResult<()>;

    async fn find_delete_request(&self, user_id: &UserId) -> AuthResult<Option<DeleteRequest>>;

    /// Increment the attempt count of a live request; the new count, or
    /// `None` once the request is gone or expired
    async fn record_delete_attempt(
        &self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<i16>>;

    /// Store the delete token if the request is live and has attempts left
    async fn mark_delete_verified(
        &self,
        request_id: Uuid,
        delete_token_hash: &[u8],
        now: DateTime<Utc>,
    ) -> AuthResult<bool>;

    async fn remove_delete_request(&self, user_id: &UserId) -> AuthResult<()>;

    /// Remove this request only, leaving any newer one in place
    async fn discard_delete_request(&self, request_id: Uuid) -> AuthResult<()>;

    async fn cleanup_expired_delete_requests(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

#[trait_variant::make(ActionTokenRepository: Send)]
pub trait LocalActionTokenRepository {
    async fn create_action_token(&self, token: &ActionToken) -> AuthResult<()>;

    /// Delete the user's unused tokens for `purpose`
    async fn revoke_action_tokens(&self, user_id: &UserId, purpose: ActionPurpose)
    -> AuthResult<u64>;

    async fn consume_action_token(
        &self,
        purpose: ActionPurpose,
        secret_hash: &[u8],
        now: DateTime<Utc>,
    ) -> AuthResult<Option<ActionToken>>;

    async fn cleanup_expired_action_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Everything the auth service persists, implemented by one store
pub trait AuthStore:
    UserRepository
    + AuthRepository
    + AuthSessionRepository
    + MfaTokenRepository
    + DeleteRequestRepository
    + ActionTokenRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + MfaTokenRepository
        + DeleteRequestRepository
        + ActionTokenRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
