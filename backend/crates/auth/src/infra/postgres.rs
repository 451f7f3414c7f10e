//! PostgreSQL Repository Implementations

use chrono::{DateTime, Duration, Utc};
use kernel::role::UserRole;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    action_token::{ActionPurpose, ActionToken},
    auth::Auth,
    auth_session::AuthSession,
    delete_request::DeleteRequest,
    mfa_bootstrap_token::{BootstrapChannel, MfaBootstrapToken},
    user::User,
};
use crate::domain::repository::{
    ActionTokenRepository, AuthRepository, AuthSessionRepository, DeleteRequestRepository,
    MfaTokenRepository, UserRepository,
};
use crate::domain::value_object::{
    email::Email, public_id::PublicId, totp_secret::TotpSecret, user_id::UserId,
    user_password::UserPassword, user_status::UserStatus,
};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = r#"
    user_id,
    public_id,
    email,
    email_verified,
    display_name,
    user_role,
    user_status,
    deletion_scheduled_for,
    last_login_at,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create_user(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                public_id,
                email,
                email_verified,
                display_name,
                user_role,
                user_status,
                deletion_scheduled_for,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.public_id.as_str())
        .bind(user.email.as_str())
        .bind(user.email_verified)
        .bind(&user.display_name)
        .bind(user.role.id())
        .bind(user.status.id())
        .bind(user.deletion_scheduled_for)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // Lost a race on the unique email index
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AuthError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_user_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE public_id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(public_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_user_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn email_exists(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update_user(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                email_verified = $3,
                display_name = $4,
                user_role = $5,
                user_status = $6,
                deletion_scheduled_for = $7,
                last_login_at = $8,
                updated_at = $9
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.email_verified)
        .bind(&user.display_name)
        .bind(user.role.id())
        .bind(user.status.id())
        .bind(user.deletion_scheduled_for)
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AuthError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    async fn purge_deleted_users(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        // Credentials, sessions and tokens go with the user (ON DELETE CASCADE)
        let deleted = sqlx::query(
            "DELETE FROM users WHERE user_status = $1 AND deletion_scheduled_for <= $2",
        )
        .bind(UserStatus::PendingDeletion.id())
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if deleted > 0 {
            tracing::info!(users_purged = deleted, "Purged users past their deletion date");
        }
        Ok(deleted)
    }
}

// ============================================================================
// Auth Repository Implementation
// ============================================================================

impl AuthRepository for PgAuthRepository {
    async fn create_auth(&self, auth: &Auth) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_credentials (
                user_id,
                password_hash,
                totp_secret,
                totp_enabled,
                login_failed_count,
                last_failed_at,
                locked_until,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(auth.user_id.as_uuid())
        .bind(auth.password_hash.as_phc_string())
        .bind(auth.totp_secret.as_ref().map(|s| s.as_base32()))
        .bind(auth.totp_enabled)
        .bind(auth.login_failed_count as i16)
        .bind(auth.last_failed_at)
        .bind(auth.locked_until)
        .bind(auth.created_at)
        .bind(auth.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_auth(&self, user_id: &UserId) -> AuthResult<Option<Auth>> {
        let row = sqlx::query_as::<_, AuthRow>(
            r#"
            SELECT
                user_id,
                password_hash,
                totp_secret,
                totp_enabled,
                login_failed_count,
                last_failed_at,
                locked_until,
                created_at,
                updated_at
            FROM auth_credentials
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_auth()).transpose()
    }

    async fn update_auth(&self, auth: &Auth) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_credentials SET
                password_hash = $2,
                totp_secret = $3,
                totp_enabled = $4,
                updated_at = $5
            WHERE user_id = $1
            "#,
        )
        .bind(auth.user_id.as_uuid())
        .bind(auth.password_hash.as_phc_string())
        .bind(auth.totp_secret.as_ref().map(|s| s.as_base32()))
        .bind(auth.totp_enabled)
        .bind(auth.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn record_login_failure(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Auth>> {
        // Right-hand sides see the row as it was before this statement;
        // an expired lock starts a fresh window
        let row = sqlx::query_as::<_, AuthRow>(
            r#"
            UPDATE auth_credentials SET
                login_failed_count = CASE
                    WHEN locked_until IS NOT NULL AND locked_until <= $2 THEN 1
                    ELSE login_failed_count + 1
                END,
                locked_until = CASE
                    WHEN locked_until IS NOT NULL AND locked_until <= $2 THEN NULL
                    WHEN login_failed_count + 1 >= $3 THEN $4
                    ELSE locked_until
                END,
                last_failed_at = $2,
                updated_at = $2
            WHERE user_id = $1
            RETURNING
                user_id,
                password_hash,
                totp_secret,
                totp_enabled,
                login_failed_count,
                last_failed_at,
                locked_until,
                created_at,
                updated_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .bind(Auth::MAX_LOGIN_FAILURES as i16)
        .bind(now + Duration::minutes(Auth::LOCKOUT_MINUTES))
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_auth()).transpose()
    }

    async fn reset_login_failures(&self, user_id: &UserId, now: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_credentials SET
                login_failed_count = 0,
                last_failed_at = NULL,
                locked_until = NULL,
                updated_at = $2
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Auth Session Repository Implementation
// ============================================================================

impl AuthSessionRepository for PgAuthRepository {
    async fn create_session(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                user_id,
                remember_me,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                expires_at,
                created_at,
                last_activity_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session.session_id)
        .bind(session.user_id.as_uuid())
        .bind(session.remember_me)
        .bind(&session.client_fingerprint_hash)
        .bind(&session.client_ip)
        .bind(&session.user_agent)
        .bind(session.expires_at)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                remember_me,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                expires_at,
                created_at,
                last_activity_at
            FROM auth_sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) if r.client_fingerprint_hash != fingerprint_hash => {
                tracing::warn!(session_id = %session_id, "Auth session fingerprint mismatch");
                Ok(None)
            }
            Some(r) => Ok(Some(r.into_session())),
            None => Ok(None),
        }
    }

    async fn update_session(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_sessions SET
                expires_at = $2,
                last_activity_at = $3
            WHERE session_id = $1
            "#,
        )
        .bind(session.session_id)
        .bind(session.expires_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_sessions_for_user(
        &self,
        user_id: &UserId,
        except: Option<Uuid>,
    ) -> AuthResult<u64> {
        let deleted = match except {
            Some(except_id) => {
                sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1 AND session_id != $2")
                    .bind(user_id.as_uuid())
                    .bind(except_id)
                    .execute(&self.pool)
                    .await?
                    .rows_affected()
            }
            None => sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .execute(&self.pool)
                .await?
                .rows_affected(),
        };

        Ok(deleted)
    }

    async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// MFA Bootstrap Token Repository Implementation
// ============================================================================

impl MfaTokenRepository for PgAuthRepository {
    async fn create_mfa_token(&self, token: &MfaBootstrapToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO mfa_bootstrap_tokens (
                token_id,
                user_id,
                secret_hash,
                channel,
                expires_at,
                used_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(token.token_id)
        .bind(token.user_id.as_uuid())
        .bind(&token.secret_hash)
        .bind(token.channel.to_string())
        .bind(token.expires_at)
        .bind(token.used_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn latest_mfa_token(&self, user_id: &UserId) -> AuthResult<Option<MfaBootstrapToken>> {
        let row = sqlx::query_as::<_, MfaTokenRow>(
            r#"
            SELECT token_id, user_id, secret_hash, channel, expires_at, used_at, created_at
            FROM mfa_bootstrap_tokens
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MfaTokenRow::into_token).transpose()
    }

    async fn revoke_mfa_tokens(&self, user_id: &UserId) -> AuthResult<u64> {
        let deleted =
            sqlx::query("DELETE FROM mfa_bootstrap_tokens WHERE user_id = $1 AND used_at IS NULL")
                .bind(user_id.as_uuid())
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(deleted)
    }

    async fn consume_mfa_token(
        &self,
        secret_hash: &[u8],
        now: DateTime<Utc>,
    ) -> AuthResult<Option<MfaBootstrapToken>> {
        let row = sqlx::query_as::<_, MfaTokenRow>(
            r#"
            UPDATE mfa_bootstrap_tokens SET used_at = $2
            WHERE secret_hash = $1 AND used_at IS NULL AND expires_at > $2
            RETURNING token_id, user_id, secret_hash, channel, expires_at, used_at, created_at
            "#,
        )
        .bind(secret_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MfaTokenRow::into_token).transpose()
    }

    async fn cleanup_expired_mfa_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM mfa_bootstrap_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Delete Request Repository Implementation
// ============================================================================

impl DeleteRequestRepository for PgAuthRepository {
    async fn save_delete_request(&self, request: &DeleteRequest) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO delete_requests (
                request_id,
                user_id,
                email,
                code_hash,
                attempts,
                verified,
                delete_token_hash,
                expires_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id) DO UPDATE SET
                request_id = EXCLUDED.request_id,
                email = EXCLUDED.email,
                code_hash = EXCLUDED.code_hash,
                attempts = EXCLUDED.attempts,
                verified = EXCLUDED.verified,
                delete_token_hash = EXCLUDED.delete_token_hash,
                expires_at = EXCLUDED.expires_at,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(request.request_id)
        .bind(request.user_id.as_uuid())
        .bind(&request.email)
        .bind(&request.code_hash)
        .bind(request.attempts)
        .bind(request.verified)
        .bind(&request.delete_token_hash)
        .bind(request.expires_at)
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_delete_request(&self, user_id: &UserId) -> AuthResult<Option<DeleteRequest>> {
        let row = sqlx::query_as::<_, DeleteRequestRow>(
            r#"
            SELECT
                request_id,
                user_id,
                email,
                code_hash,
                attempts,
                verified,
                delete_token_hash,
                expires_at,
                created_at
            FROM delete_requests
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DeleteRequestRow::into_request))
    }

    async fn record_delete_attempt(
        &self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<i16>> {
        let attempts = sqlx::query_scalar::<_, i16>(
            r#"
            UPDATE delete_requests SET attempts = attempts + 1
            WHERE request_id = $1 AND expires_at > $2
            RETURNING attempts
            "#,
        )
        .bind(request_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempts)
    }

    async fn mark_delete_verified(
        &self,
        request_id: Uuid,
        delete_token_hash: &[u8],
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE delete_requests SET verified = TRUE, delete_token_hash = $2
            WHERE request_id = $1 AND expires_at > $3 AND attempts < $4
            "#,
        )
        .bind(request_id)
        .bind(delete_token_hash)
        .bind(now)
        .bind(DeleteRequest::MAX_ATTEMPTS)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn discard_delete_request(&self, request_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM delete_requests WHERE request_id = $1")
            .bind(request_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove_delete_request(&self, user_id: &UserId) -> AuthResult<()> {
        sqlx::query("DELETE FROM delete_requests WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired_delete_requests(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM delete_requests WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Action Token Repository Implementation
// ============================================================================

impl ActionTokenRepository for PgAuthRepository {
    async fn create_action_token(&self, token: &ActionToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO action_tokens (
                token_id,
                user_id,
                purpose,
                secret_hash,
                new_email,
                expires_at,
                used_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(token.token_id)
        .bind(token.user_id.as_uuid())
        .bind(token.purpose.code())
        .bind(&token.secret_hash)
        .bind(&token.new_email)
        .bind(token.expires_at)
        .bind(token.used_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke_action_tokens(
        &self,
        user_id: &UserId,
        purpose: ActionPurpose,
    ) -> AuthResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM action_tokens WHERE user_id = $1 AND purpose = $2 AND used_at IS NULL",
        )
        .bind(user_id.as_uuid())
        .bind(purpose.code())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted)
    }

    async fn consume_action_token(
        &self,
        purpose: ActionPurpose,
        secret_hash: &[u8],
        now: DateTime<Utc>,
    ) -> AuthResult<Option<ActionToken>> {
        let row = sqlx::query_as::<_, ActionTokenRow>(
            r#"
            UPDATE action_tokens SET used_at = $3
            WHERE purpose = $1 AND secret_hash = $2 AND used_at IS NULL AND expires_at > $3
            RETURNING token_id, user_id, purpose, secret_hash, new_email, expires_at, used_at, created_at
            "#,
        )
        .bind(purpose.code())
        .bind(secret_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ActionTokenRow::into_token).transpose()
    }

    async fn cleanup_expired_action_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM action_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    public_id: String,
    email: String,
    email_verified: bool,
    display_name: String,
    user_role: i16,
    user_status: i16,
    deletion_scheduled_for: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let public_id: PublicId = self
            .public_id
            .parse()
            .map_err(|_| AuthError::Internal(format!("Invalid public_id: {}", self.public_id)))?;
        let role = UserRole::from_id(self.user_role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid user_role: {}", self.user_role)))?;
        let status = UserStatus::from_id(self.user_status).ok_or_else(|| {
            AuthError::Internal(format!("Invalid user_status: {}", self.user_status))
        })?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            public_id,
            email: Email::from_db(self.email),
            email_verified: self.email_verified,
            display_name: self.display_name,
            role,
            status,
            deletion_scheduled_for: self.deletion_scheduled_for,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthRow {
    user_id: Uuid,
    password_hash: String,
    totp_secret: Option<String>,
    totp_enabled: bool,
    login_failed_count: i16,
    last_failed_at: Option<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AuthRow {
    fn into_auth(self) -> AuthResult<Auth> {
        let totp_secret = self.totp_secret.map(TotpSecret::from_base32).transpose()?;

        Ok(Auth {
            user_id: UserId::from_uuid(self.user_id),
            password_hash: UserPassword::from_phc_string(self.password_hash)?,
            totp_secret,
            totp_enabled: self.totp_enabled,
            login_failed_count: self.login_failed_count.max(0) as u16,
            last_failed_at: self.last_failed_at,
            locked_until: self.locked_until,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    user_id: Uuid,
    remember_me: bool,
    client_fingerprint_hash: Vec<u8>,
    client_ip: Option<String>,
    user_agent: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthSession {
        AuthSession {
            session_id: self.session_id,
            user_id: UserId::from_uuid(self.user_id),
            remember_me: self.remember_me,
            client_fingerprint_hash: self.client_fingerprint_hash,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            expires_at: self.expires_at,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MfaTokenRow {
    token_id: Uuid,
    user_id: Uuid,
    secret_hash: Vec<u8>,
    channel: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl MfaTokenRow {
    fn into_token(self) -> AuthResult<MfaBootstrapToken> {
        let channel = BootstrapChannel::from_code(&self.channel)
            .ok_or_else(|| AuthError::Internal(format!("Invalid MFA channel: {}", self.channel)))?;

        Ok(MfaBootstrapToken {
            token_id: self.token_id,
            user_id: UserId::from_uuid(self.user_id),
            secret_hash: self.secret_hash,
            channel,
            expires_at: self.expires_at,
            used_at: self.used_at,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DeleteRequestRow {
    request_id: Uuid,
    user_id: Uuid,
    email: String,
    code_hash: Vec<u8>,
    attempts: i16,
    verified: bool,
    delete_token_hash: Option<Vec<u8>>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl DeleteRequestRow {
    fn into_request(self) -> DeleteRequest {
        DeleteRequest {
            request_id: self.request_id,
            user_id: UserId::from_uuid(self.user_id),
            email: self.email,
            code_hash: self.code_hash,
            attempts: self.attempts,
            verified: self.verified,
            delete_token_hash: self.delete_token_hash,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ActionTokenRow {
    token_id: Uuid,
    user_id: Uuid,
    purpose: String,
    secret_hash: Vec<u8>,
    new_email: Option<String>,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl ActionTokenRow {
    fn into_token(self) -> AuthResult<ActionToken> {
        let purpose = ActionPurpose::from_code(&self.purpose)
            .ok_or_else(|| AuthError::Internal(format!("Invalid token purpose: {}", self.purpose)))?;

        Ok(ActionToken {
            token_id: self.token_id,
            user_id: UserId::from_uuid(self.user_id),
            purpose,
            secret_hash: self.secret_hash,
            new_email: self.new_email,
            expires_at: self.expires_at,
            used_at: self.used_at,
            created_at: self.created_at,
        })
    }
}
