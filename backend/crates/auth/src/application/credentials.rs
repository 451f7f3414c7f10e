//! Email and password check shared by sign in, MFA bootstrap and email
//! change. Failures count toward the lockout.

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{auth::Auth, user::User};
use crate::domain::repository::{AuthRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

pub async fn verify_credentials<U, A>(
    user_repo: &U,
    auth_repo: &A,
    config: &AuthConfig,
    email: &str,
    password: String,
) -> AuthResult<(User, Auth)>
where
    U: UserRepository,
    A: AuthRepository,
{
    let email = Email::new(email).map_err(|_| AuthError::InvalidCredentials)?;

    let user = user_repo
        .find_user_by_email(&email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !user.can_login() {
        return Err(AuthError::AccountDisabled);
    }

    let auth = verify_password(auth_repo, config, &user, password).await?;
    Ok((user, auth))
}

/// Password check for a known user
pub async fn verify_password<A>(
    auth_repo: &A,
    config: &AuthConfig,
    user: &User,
    password: String,
) -> AuthResult<Auth>
where
    A: AuthRepository,
{
    let auth = auth_repo
        .find_auth(&user.user_id)
        .await?
        .ok_or_else(|| AuthError::Internal("Credentials missing for user".to_string()))?;

    let now = Utc::now();
    if auth.is_locked_at(now) {
        return Err(AuthError::AccountLocked);
    }

    // Policy-violating input cannot match a stored hash
    let valid = RawPassword::new(password)
        .map(|raw| auth.password_hash.verify(&raw, config.pepper()))
        .unwrap_or(false);

    if !valid {
        let counted = auth_repo
            .record_login_failure(&user.user_id, now)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials missing for user".to_string()))?;
        if counted.is_locked_at(now) {
            tracing::warn!(public_id = %user.public_id, "Account locked after repeated failures");
            return Err(AuthError::AccountLocked);
        }
        return Err(AuthError::InvalidCredentials);
    }

    Ok(auth)
}
