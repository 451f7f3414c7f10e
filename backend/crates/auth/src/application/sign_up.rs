//! Sign Up Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::role::UserRole;
use platform::mailer::{Email as Mail, Mailer};

use crate::application::config::AuthConfig;
use crate::domain::entity::action_token::{ActionPurpose, ActionToken};
use crate::domain::entity::{auth::Auth, user::User};
use crate::domain::repository::{ActionTokenRepository, AuthRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    /// Email address; must not belong to another account
    pub email: String,
    /// Password, checked against the strength policy
    pub password: String,
    /// Display name
    pub display_name: String,
    /// Role code; only self-service roles are accepted
    pub role: String,
}

/// Sign up output
pub struct SignUpOutput {
    /// Public ID of the new account
    pub public_id: String,
    /// Role the account was created with
    pub role: UserRole,
}

pub struct SignUpUseCase<U, A, T>
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

impl<U, A, T> SignUpUseCase<U, A, T>
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

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let role = UserRole::from_code(input.role.trim())
            .filter(UserRole::is_self_service)
            .ok_or(AuthError::RoleNotAllowed)?;

        let email = Email::new(&input.email)?;
        if self.user_repo.email_exists(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let raw_password = RawPassword::new(input.password)?;
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let user = User::new(email, input.display_name.trim().to_string(), role);
        let auth = Auth::new(user.user_id, password_hash);

        self.user_repo.create_user(&user).await?;
        self.auth_repo.create_auth(&auth).await?;

        let (token, secret) = ActionToken::issue(
            user.user_id,
            ActionPurpose::EmailVerification,
            None,
            Utc::now(),
        );
        self.token_repo.create_action_token(&token).await?;

        let mail = Mail::new(
            user.email.as_str(),
            "Verify your email address",
            format!(
                "Welcome, {}.\n\nConfirm your address to finish setting up your account:\n{}\n\nThe link is valid for 24 hours.",
                user.display_name,
                self.config.link("/verify-email", &secret)
            ),
        );
        if let Err(e) = self.mailer.send(&mail).await {
            tracing::warn!(error = %e, public_id = %user.public_id, "Verification email not sent");
        }

        tracing::info!(
            public_id = %user.public_id,
            email = %user.email.masked(),
            role = %user.role,
            "User signed up"
        );

        Ok(SignUpOutput {
            public_id: user.public_id.to_string(),
            role,
        })
    }
}
