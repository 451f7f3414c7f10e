//! MFA Bootstrap Use Case
//!
//! Staff must sign in with TOTP, so a staff account without a secret needs
//! another way in. A bootstrap token, mailed after a password check or
//! handed out by an administrator, is redeemed once for a pending TOTP
//! secret. The first sign in with a valid code activates it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::crypto::hash_secret;
use platform::mailer::{Email as Mail, Mailer};

use crate::application::config::AuthConfig;
use crate::application::credentials::verify_credentials;
use crate::application::totp_setup::TotpSetupOutput;
use crate::domain::entity::mfa_bootstrap_token::{BootstrapChannel, MfaBootstrapToken};
use crate::domain::entity::user::User;
use crate::domain::repository::{AuthRepository, MfaTokenRepository, UserRepository};
use crate::domain::value_object::public_id::PublicId;
use crate::error::{AuthError, AuthResult};

/// Bootstrap token handed to a staff member by an admin
pub struct IssuedBootstrapToken {
    /// Plaintext token; only its hash is stored
    pub token: String,
    /// Token expiry
    pub expires_at: DateTime<Utc>,
    /// Staff account the token enrols
    pub user_public_id: String,
}

/// Result of redeeming a bootstrap token
pub struct RedeemedBootstrap {
    /// Enrolled account
    pub user_public_id: String,
    /// Pending TOTP secret to confirm at sign-in
    pub setup: TotpSetupOutput,
}

pub struct MfaBootstrapUseCase<U, A, M>
where
    U: UserRepository,
    A: AuthRepository,
    M: MfaTokenRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    token_repo: Arc<M>,
    mailer: Mailer,
    config: Arc<AuthConfig>,
}

impl<U, A, M> MfaBootstrapUseCase<U, A, M>
where
    U: UserRepository,
    A: AuthRepository,
    M: MfaTokenRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        auth_repo: Arc<A>,
        token_repo: Arc<M>,
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

    /// Self-service: password check, then a token by email
    pub async fn request(&self, email: &str, password: String) -> AuthResult<DateTime<Utc>> {
        let (user, _) = verify_credentials(
            &*self.user_repo,
            &*self.auth_repo,
            &self.config,
            email,
            password,
        )
        .await?;

        let now = Utc::now();
        if let Some(latest) = self.token_repo.latest_mfa_token(&user.user_id).await? {
            if latest.blocks_new_request_at(now) {
                return Err(AuthError::Cooldown);
            }
        }

        let issued = self.issue(&user, BootstrapChannel::Email, now).await?;

        let mail = Mail::new(
            user.email.as_str(),
            "Your two-factor setup token",
            format!(
                "Use this one-time token to set up two-factor authentication:\n\n{}\n\nIt expires in 15 minutes. If you did not ask for it, change your password.",
                issued.token
            ),
        );
        if let Err(e) = self.mailer.send(&mail).await {
            tracing::error!(error = %e, public_id = %user.public_id, "MFA bootstrap email not sent");
            return Err(AuthError::Internal("Could not deliver the token".to_string()));
        }

        Ok(issued.expires_at)
    }

    /// Administrator hands a token to `user_public_id`
    pub async fn issue_by_admin(
        &self,
        admin: &User,
        user_public_id: &str,
    ) -> AuthResult<IssuedBootstrapToken> {
        if !admin.role.is_admin() {
            return Err(AuthError::AdminRequired);
        }

        let public_id: PublicId = user_public_id.parse()?;
        let user = self
            .user_repo
            .find_user_by_public_id(&public_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let issued = self.issue(&user, BootstrapChannel::Admin, Utc::now()).await?;
        tracing::info!(
            admin = %admin.public_id,
            public_id = %user.public_id,
            "MFA bootstrap token issued by administrator"
        );
        Ok(issued)
    }

    async fn issue(
        &self,
        user: &User,
        channel: BootstrapChannel,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedBootstrapToken> {
        let revoked = self.token_repo.revoke_mfa_tokens(&user.user_id).await?;
        let (token, secret) = MfaBootstrapToken::issue(user.user_id, channel, now);
        self.token_repo.create_mfa_token(&token).await?;

        tracing::info!(
            public_id = %user.public_id,
            channel = %channel,
            revoked,
            "MFA bootstrap token issued"
        );

        Ok(IssuedBootstrapToken {
            token: secret,
            expires_at: token.expires_at,
            user_public_id: user.public_id.to_string(),
        })
    }

    /// Consume the token and hand out a pending TOTP secret
    pub async fn redeem(&self, token: &str) -> AuthResult<RedeemedBootstrap> {
        let consumed = self
            .token_repo
            .consume_mfa_token(&hash_secret(token), Utc::now())
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

        let secret = auth.setup_totp();
        self.auth_repo.update_auth(&auth).await?;

        tracing::info!(
            public_id = %user.public_id,
            channel = %consumed.channel,
            "MFA bootstrap token redeemed"
        );

        Ok(RedeemedBootstrap {
            user_public_id: user.public_id.to_string(),
            setup: TotpSetupOutput::for_secret(&secret, user.email.as_str())?,
        })
    }
}
