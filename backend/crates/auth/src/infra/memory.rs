//! In-memory auth store for tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use platform::crypto::constant_time_eq;
use uuid::Uuid;

use crate::domain::entity::{
    action_token::{ActionPurpose, ActionToken},
    auth::Auth,
    auth_session::AuthSession,
    delete_request::DeleteRequest,
    mfa_bootstrap_token::MfaBootstrapToken,
    user::User,
};
use crate::domain::repository::{
    ActionTokenRepository, AuthRepository, AuthSessionRepository, DeleteRequestRepository,
    MfaTokenRepository, UserRepository,
};
use crate::domain::value_object::{email::Email, public_id::PublicId, user_id::UserId};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    auths: HashMap<UserId, Auth>,
    sessions: HashMap<Uuid, AuthSession>,
    mfa_tokens: Vec<MfaBootstrapToken>,
    delete_requests: HashMap<UserId, DeleteRequest>,
    action_tokens: Vec<ActionToken>,
}

#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.lock()
            .users
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned()
    }

    pub fn auth_of(&self, user_id: &UserId) -> Option<Auth> {
        self.lock().auths.get(user_id).cloned()
    }

    /// Move every deletion date and token expiry to `when`
    pub fn expire_everything_at(&self, when: DateTime<Utc>) {
        let mut t = self.lock();
        for user in t.users.values_mut() {
            if user.deletion_scheduled_for.is_some() {
                user.deletion_scheduled_for = Some(when);
            }
        }
        for session in t.sessions.values_mut() {
            session.expires_at = when;
        }
        for token in t.mfa_tokens.iter_mut() {
            token.expires_at = when;
        }
        for request in t.delete_requests.values_mut() {
            request.expires_at = when;
        }
        for token in t.action_tokens.iter_mut() {
            token.expires_at = when;
        }
    }
}

impl UserRepository for MemoryAuthRepository {
    async fn create_user(&self, user: &User) -> AuthResult<()> {
        let mut t = self.lock();
        if t.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        t.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.lock().users.get(user_id).cloned())
    }

    async fn find_user_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| &u.public_id == public_id)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn email_exists(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.lock().users.values().any(|u| &u.email == email))
    }

    async fn update_user(&self, user: &User) -> AuthResult<()> {
        self.lock().users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn purge_deleted_users(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut t = self.lock();
        let doomed: Vec<UserId> = t
            .users
            .values()
            .filter(|u| u.is_pending_deletion() && u.deletion_scheduled_for.is_some_and(|d| d <= now))
            .map(|u| u.user_id)
            .collect();
        for id in &doomed {
            t.users.remove(id);
            t.auths.remove(id);
            t.sessions.retain(|_, s| &s.user_id != id);
            t.mfa_tokens.retain(|m| &m.user_id != id);
            t.delete_requests.remove(id);
            t.action_tokens.retain(|a| &a.user_id != id);
        }
        Ok(doomed.len() as u64)
    }
}

impl AuthRepository for MemoryAuthRepository {
    async fn create_auth(&self, auth: &Auth) -> AuthResult<()> {
        self.lock().auths.insert(auth.user_id, auth.clone());
        Ok(())
    }

    async fn find_auth(&self, user_id: &UserId) -> AuthResult<Option<Auth>> {
        Ok(self.lock().auths.get(user_id).cloned())
    }

    async fn update_auth(&self, auth: &Auth) -> AuthResult<()> {
        let mut t = self.lock();
        if let Some(stored) = t.auths.get_mut(&auth.user_id) {
            stored.password_hash = auth.password_hash.clone();
            stored.totp_secret = auth.totp_secret.clone();
            stored.totp_enabled = auth.totp_enabled;
            stored.updated_at = auth.updated_at;
        }
        Ok(())
    }

    async fn record_login_failure(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Auth>> {
        Ok(self.lock().auths.get_mut(user_id).map(|auth| {
            auth.record_failure(now);
            auth.clone()
        }))
    }

    async fn reset_login_failures(&self, user_id: &UserId, now: DateTime<Utc>) -> AuthResult<()> {
        if let Some(auth) = self.lock().auths.get_mut(user_id) {
            auth.reset_failures();
            auth.updated_at = now;
        }
        Ok(())
    }
}

impl AuthSessionRepository for MemoryAuthRepository {
    async fn create_session(&self, session: &AuthSession) -> AuthResult<()> {
        self.lock().sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_session(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        Ok(self
            .lock()
            .sessions
            .get(&session_id)
            .filter(|s| s.client_fingerprint_hash == fingerprint_hash)
            .cloned())
    }

    async fn update_session(&self, session: &AuthSession) -> AuthResult<()> {
        self.lock().sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> AuthResult<()> {
        self.lock().sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_sessions_for_user(
        &self,
        user_id: &UserId,
        except: Option<Uuid>,
    ) -> AuthResult<u64> {
        let mut t = self.lock();
        let before = t.sessions.len();
        t.sessions
            .retain(|id, s| &s.user_id != user_id || Some(*id) == except);
        Ok((before - t.sessions.len()) as u64)
    }

    async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut t = self.lock();
        let before = t.sessions.len();
        t.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - t.sessions.len()) as u64)
    }
}

impl MfaTokenRepository for MemoryAuthRepository {
    async fn create_mfa_token(&self, token: &MfaBootstrapToken) -> AuthResult<()> {
        self.lock().mfa_tokens.push(token.clone());
        Ok(())
    }

    async fn latest_mfa_token(&self, user_id: &UserId) -> AuthResult<Option<MfaBootstrapToken>> {
        Ok(self
            .lock()
            .mfa_tokens
            .iter()
            .filter(|t| &t.user_id == user_id)
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    async fn revoke_mfa_tokens(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut t = self.lock();
        let before = t.mfa_tokens.len();
        t.mfa_tokens
            .retain(|m| &m.user_id != user_id || m.used_at.is_some());
        Ok((before - t.mfa_tokens.len()) as u64)
    }

    async fn consume_mfa_token(
        &self,
        secret_hash: &[u8],
        now: DateTime<Utc>,
    ) -> AuthResult<Option<MfaBootstrapToken>> {
        let mut t = self.lock();
        let found = t
            .mfa_tokens
            .iter_mut()
            .find(|m| constant_time_eq(&m.secret_hash, secret_hash) && m.is_usable_at(now));
        Ok(found.map(|m| {
            m.used_at = Some(now);
            m.clone()
        }))
    }

    async fn cleanup_expired_mfa_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut t = self.lock();
        let before = t.mfa_tokens.len();
        t.mfa_tokens.retain(|m| m.expires_at > now);
        Ok((before - t.mfa_tokens.len()) as u64)
    }
}

impl DeleteRequestRepository for MemoryAuthRepository {
    async fn save_delete_request(&self, request: &DeleteRequest) -> AuthResult<()> {
        self.lock()
            .delete_requests
            .insert(request.user_id, request.clone());
        Ok(())
    }

    async fn find_delete_request(&self, user_id: &UserId) -> AuthResult<Option<DeleteRequest>> {
        Ok(self.lock().delete_requests.get(user_id).cloned())
    }

    async fn record_delete_attempt(
        &self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<i16>> {
        let mut t = self.lock();
        let live = t
            .delete_requests
            .values_mut()
            .find(|r| r.request_id == request_id && !r.is_expired_at(now));
        Ok(live.map(|r| {
            r.attempts += 1;
            r.attempts
        }))
    }

    async fn mark_delete_verified(
        &self,
        request_id: Uuid,
        delete_token_hash: &[u8],
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let mut t = self.lock();
        let live = t.delete_requests.values_mut().find(|r| {
            r.request_id == request_id && !r.is_expired_at(now) && r.has_attempts_left()
        });
        Ok(live
            .map(|r| r.mark_verified(delete_token_hash.to_vec()))
            .is_some())
    }

    async fn remove_delete_request(&self, user_id: &UserId) -> AuthResult<()> {
        self.lock().delete_requests.remove(user_id);
        Ok(())
    }

    async fn discard_delete_request(&self, request_id: Uuid) -> AuthResult<()> {
        self.lock()
            .delete_requests
            .retain(|_, r| r.request_id != request_id);
        Ok(())
    }

    async fn cleanup_expired_delete_requests(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut t = self.lock();
        let before = t.delete_requests.len();
        t.delete_requests.retain(|_, r| r.expires_at > now);
        Ok((before - t.delete_requests.len()) as u64)
    }
}

impl ActionTokenRepository for MemoryAuthRepository {
    async fn create_action_token(&self, token: &ActionToken) -> AuthResult<()> {
        self.lock().action_tokens.push(token.clone());
        Ok(())
    }

    async fn revoke_action_tokens(
        &self,
        user_id: &UserId,
        purpose: ActionPurpose,
    ) -> AuthResult<u64> {
        let mut t = self.lock();
        let before = t.action_tokens.len();
        t.action_tokens.retain(|a| {
            &a.user_id != user_id || a.purpose != purpose || a.used_at.is_some()
        });
        Ok((before - t.action_tokens.len()) as u64)
    }

    async fn consume_action_token(
        &self,
        purpose: ActionPurpose,
        secret_hash: &[u8],
        now: DateTime<Utc>,
    ) -> AuthResult<Option<ActionToken>> {
        let mut t = self.lock();
        let found = t.action_tokens.iter_mut().find(|a| {
            a.purpose == purpose
                && constant_time_eq(&a.secret_hash, secret_hash)
                && a.is_usable_at(now)
        });
        Ok(found.map(|a| {
            a.used_at = Some(now);
            a.clone()
        }))
    }

    async fn cleanup_expired_action_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut t = self.lock();
        let before = t.action_tokens.len();
        t.action_tokens.retain(|a| a.expires_at > now);
        Ok((before - t.action_tokens.len()) as u64)
    }
}
