//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use platform::audit_events::{AuditEmitter, AuditEvent};
use platform::client::ClientInfo;
use platform::mailer::Mailer;
use platform::validation::ValidatedJson;
use serde_json::json;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    CheckSessionUseCase, DeleteAccountUseCase, EmailChangeUseCase, MfaBootstrapUseCase,
    PasswordResetUseCase, SignInInput, SignInOutput, SignInUseCase, SignOutUseCase, SignUpInput,
    SignUpUseCase, TotpSetupUseCase,
};
use crate::domain::entity::{
    auth_session::{AuthSession, SessionClient},
    user::User,
};
use crate::domain::repository::AuthStore;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    DeleteCodeSentResponse, DeleteConfirmRequest, DeleteConfirmResponse, DeleteVerifyRequest,
    DeleteVerifyResponse, EmailChangeRequest, EmailChangedResponse, ForgotPasswordRequest,
    MfaBootstrapAccepted, MfaBootstrapRequest, MfaIssueRequest, MfaIssueResponse,
    MfaRedeemResponse, ResetPasswordRequest, SessionStatusResponse, SignInRequest, SignInResponse,
    SignOutAllResponse, SignUpRequest, SignUpResponse, TokenRequest, TotpCodeRequest,
    TotpSetupResponse,
};

const AUDIT_SOURCE: &str = "auth";

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: AuthStore,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub mailer: Mailer,
    pub audit: AuditEmitter,
}

impl<R: AuthStore> AuthAppState<R> {
    /// Session behind the request cookie
    async fn current_session(
        &self,
        headers: &HeaderMap,
        client: &ClientInfo,
    ) -> AuthResult<(AuthSession, User)> {
        let token = self
            .config
            .session_cookie
            .read(headers)
            .ok_or(AuthError::SessionInvalid)?;

        CheckSessionUseCase::new(self.repo.clone(), self.repo.clone(), self.config.clone())
            .authenticate(&token, &client.fingerprint())
            .await
    }

    fn record(&self, event: &str, user: &User, client: &ClientInfo) -> AuditEvent {
        AuditEvent::new(AUDIT_SOURCE, event)
            .actor(user.public_id.as_str(), user.role)
            .target(user.public_id.as_str())
            .ip(client.ip_string())
    }
}

fn session_client(client: &ClientInfo) -> SessionClient {
    SessionClient {
        fingerprint_hash: client.fingerprint().to_vec(),
        ip: client.ip_string(),
        user_agent: client.user_agent.clone(),
    }
}

// ============================================================================
// Sign Up / Sign In / Sign Out
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<SignUpRequest>,
) -> AuthResult<(StatusCode, Json<SignUpResponse>)> {
    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
            display_name: req.display_name,
            role: req.role,
        })
        .await?;

    state.audit.emit(
        AuditEvent::new(AUDIT_SOURCE, "auth.signup")
            .actor(output.public_id.as_str(), output.role)
            .target(output.public_id.as_str())
            .ip(client.ip_string()),
    );

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            public_id: output.public_id,
            role: output.role.code().to_string(),
        }),
    ))
}

/// POST /api/auth/signin
pub async fn sign_in<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<SignInRequest>,
) -> AuthResult<Response> {
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let input = SignInInput {
        email: req.email,
        password: req.password,
        remember_me: req.remember_me,
        totp_code: req.totp_code,
    };

    let signed_in = match use_case.execute(input, session_client(&client)).await? {
        SignInOutput::TwoFactorRequired { public_id } => {
            return Ok(Json(SignInResponse {
                public_id,
                requires_2fa: true,
                role: None,
                pending_deletion: false,
                deletion_scheduled_for_ms: None,
            })
            .into_response());
        }
        SignInOutput::SignedIn(signed_in) => signed_in,
    };

    state.audit.emit(
        AuditEvent::new(AUDIT_SOURCE, "auth.signin")
            .actor(signed_in.public_id.as_str(), signed_in.role)
            .ip(client.ip_string())
            .metadata(json!({ "rememberMe": signed_in.remember_me })),
    );

    let cookie = state.config.session_cookie.issue(
        &signed_in.session_token,
        state.config.cookie_max_age(signed_in.remember_me),
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SignInResponse {
            public_id: signed_in.public_id,
            requires_2fa: false,
            role: Some(signed_in.role.code().to_string()),
            pending_deletion: signed_in.pending_deletion,
            deletion_scheduled_for_ms: signed_in
                .deletion_scheduled_for
                .map(|d| d.timestamp_millis()),
        }),
    )
        .into_response())
}

/// POST /api/auth/signout
pub async fn sign_out<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(token) = state.config.session_cookie.read(&headers) {
        let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
        // A stale or forged cookie is cleared all the same
        if let Err(e) = use_case.execute(&token).await {
            tracing::debug!(error = %e, "Sign out with unusable session token");
        }
    }

    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, state.config.session_cookie.clear())],
    )
}

/// POST /api/auth/signout/all
pub async fn sign_out_all<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    client: ClientInfo,
) -> AuthResult<impl IntoResponse> {
    let (_, user) = state.current_session(&headers, &client).await?;

    let revoked = SignOutUseCase::new(state.repo.clone(), state.config.clone())
        .execute_all(&user.user_id)
        .await?;

    state.audit.emit(
        state
            .record("auth.signout_all", &user, &client)
            .metadata(json!({ "revoked": revoked })),
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, state.config.session_cookie.clear())],
        Json(SignOutAllResponse { revoked }),
    ))
}

/// GET /api/auth/status
pub async fn session_status<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    client: ClientInfo,
) -> Json<SessionStatusResponse> {
    match state.current_session(&headers, &client).await {
        Ok((session, user)) => Json(SessionStatusResponse {
            authenticated: true,
            public_id: Some(user.public_id.to_string()),
            role: Some(user.role.code().to_string()),
            email: Some(user.email.as_str().to_string()),
            email_verified: Some(user.email_verified),
            expires_at_ms: Some(session.expires_at.timestamp_millis()),
            pending_deletion: user.is_pending_deletion(),
        }),
        Err(_) => Json(SessionStatusResponse::default()),
    }
}

// ============================================================================
// TOTP (requires authentication)
// ============================================================================

/// POST /api/auth/totp/setup
pub async fn totp_setup<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    client: ClientInfo,
) -> AuthResult<Json<TotpSetupResponse>> {
    let (_, user) = state.current_session(&headers, &client).await?;

    let output = TotpSetupUseCase::new(state.repo.clone())
        .setup(&user)
        .await?;

    Ok(Json(TotpSetupResponse {
        qr_code: output.qr_code_base64,
        secret: output.secret,
        otpauth_url: output.otpauth_url,
    }))
}

/// POST /api/auth/totp/verify
pub async fn totp_verify<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<TotpCodeRequest>,
) -> AuthResult<StatusCode> {
    let (_, user) = state.current_session(&headers, &client).await?;

    TotpSetupUseCase::new(state.repo.clone())
        .verify(&user, &req.code)
        .await?;

    state.audit.emit(state.record("auth.totp_enabled", &user, &client));
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/totp/disable
pub async fn totp_disable<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<TotpCodeRequest>,
) -> AuthResult<StatusCode> {
    let (_, user) = state.current_session(&headers, &client).await?;

    TotpSetupUseCase::new(state.repo.clone())
        .disable(&user, &req.code)
        .await?;

    state.audit.emit(state.record("auth.totp_disabled", &user, &client));
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// MFA Bootstrap
// ============================================================================

fn mfa_use_case<R: AuthStore>(state: &AuthAppState<R>) -> MfaBootstrapUseCase<R, R, R> {
    MfaBootstrapUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    )
}

/// POST /api/auth/mfa/bootstrap
pub async fn mfa_bootstrap_request<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    ValidatedJson(req): ValidatedJson<MfaBootstrapRequest>,
) -> AuthResult<(StatusCode, Json<MfaBootstrapAccepted>)> {
    let expires_at = mfa_use_case(&state)
        .request(&req.email, req.password)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MfaBootstrapAccepted {
            expires_at_ms: expires_at.timestamp_millis(),
        }),
    ))
}

/// POST /api/auth/mfa/bootstrap/issue
pub async fn mfa_bootstrap_issue<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<MfaIssueRequest>,
) -> AuthResult<(StatusCode, Json<MfaIssueResponse>)> {
    let (_, admin) = state.current_session(&headers, &client).await?;

    let issued = mfa_use_case(&state)
        .issue_by_admin(&admin, &req.user_public_id)
        .await?;

    state.audit.emit(
        AuditEvent::new(AUDIT_SOURCE, "auth.mfa_bootstrap_issued")
            .actor(admin.public_id.as_str(), admin.role)
            .target(issued.user_public_id.as_str())
            .ip(client.ip_string())
            .metadata(json!({ "channel": "admin" })),
    );

    Ok((
        StatusCode::CREATED,
        Json(MfaIssueResponse {
            token: issued.token,
            user_public_id: issued.user_public_id,
            expires_at_ms: issued.expires_at.timestamp_millis(),
        }),
    ))
}

/// POST /api/auth/mfa/bootstrap/redeem
pub async fn mfa_bootstrap_redeem<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<TokenRequest>,
) -> AuthResult<Json<MfaRedeemResponse>> {
    let redeemed = mfa_use_case(&state).redeem(&req.token).await?;

    state.audit.emit(
        AuditEvent::new(AUDIT_SOURCE, "auth.mfa_bootstrap_redeemed")
            .target(redeemed.user_public_id.as_str())
            .ip(client.ip_string()),
    );

    Ok(Json(MfaRedeemResponse {
        public_id: redeemed.user_public_id,
        qr_code: redeemed.setup.qr_code_base64,
        secret: redeemed.setup.secret,
        otpauth_url: redeemed.setup.otpauth_url,
    }))
}

// ============================================================================
// Delete Account (requires authentication)
// ============================================================================

fn delete_use_case<R: AuthStore>(state: &AuthAppState<R>) -> DeleteAccountUseCase<R, R, R> {
    DeleteAccountUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
    )
}

/// POST /api/auth/delete-account/request
pub async fn delete_account_request<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    client: ClientInfo,
) -> AuthResult<(StatusCode, Json<DeleteCodeSentResponse>)> {
    let (_, user) = state.current_session(&headers, &client).await?;

    let expires_at = delete_use_case(&state).request(&user).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DeleteCodeSentResponse {
            expires_at_ms: expires_at.timestamp_millis(),
        }),
    ))
}

/// POST /api/auth/delete-account/verify
pub async fn delete_account_verify<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<DeleteVerifyRequest>,
) -> AuthResult<Json<DeleteVerifyResponse>> {
    let (_, user) = state.current_session(&headers, &client).await?;

    let delete_token = delete_use_case(&state).verify(&user, &req.code).await?;

    Ok(Json(DeleteVerifyResponse { delete_token }))
}

/// POST /api/auth/delete-account/confirm
pub async fn delete_account_confirm<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<DeleteConfirmRequest>,
) -> AuthResult<impl IntoResponse> {
    let (_, user) = state.current_session(&headers, &client).await?;

    let scheduled_for = delete_use_case(&state)
        .confirm(&user, &req.delete_token)
        .await?;

    state.audit.emit(
        state
            .record("auth.account_deletion_scheduled", &user, &client)
            .metadata(json!({ "scheduledFor": scheduled_for.to_rfc3339() })),
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, state.config.session_cookie.clear())],
        Json(DeleteConfirmResponse {
            deletion_scheduled_for_ms: scheduled_for.timestamp_millis(),
        }),
    ))
}

/// POST /api/auth/delete-account/cancel
pub async fn delete_account_cancel<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    client: ClientInfo,
) -> AuthResult<StatusCode> {
    let (_, user) = state.current_session(&headers, &client).await?;

    delete_use_case(&state).cancel(&user).await?;

    state
        .audit
        .emit(state.record("auth.account_deletion_cancelled", &user, &client));
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Password Reset
// ============================================================================

fn password_use_case<R: AuthStore>(state: &AuthAppState<R>) -> PasswordResetUseCase<R, R, R, R> {
    PasswordResetUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    )
}

/// POST /api/auth/password/forgot
pub async fn forgot_password<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> AuthResult<StatusCode> {
    password_use_case(&state).forgot(&req.email).await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/auth/password/reset
pub async fn reset_password<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> AuthResult<StatusCode> {
    password_use_case(&state)
        .reset(&req.token, req.new_password)
        .await?;

    state.audit.emit(
        AuditEvent::new(AUDIT_SOURCE, "auth.password_reset").ip(client.ip_string()),
    );
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Email Change / Verification
// ============================================================================

fn email_use_case<R: AuthStore>(state: &AuthAppState<R>) -> EmailChangeUseCase<R, R, R> {
    EmailChangeUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    )
}

/// POST /api/auth/email/change
pub async fn email_change<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<EmailChangeRequest>,
) -> AuthResult<StatusCode> {
    let (_, user) = state.current_session(&headers, &client).await?;

    email_use_case(&state)
        .request_change(&user, &req.new_email, req.password)
        .await?;

    state
        .audit
        .emit(state.record("auth.email_change_requested", &user, &client));
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/auth/email/confirm
pub async fn email_confirm<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    ValidatedJson(req): ValidatedJson<TokenRequest>,
) -> AuthResult<Json<EmailChangedResponse>> {
    let email = email_use_case(&state).confirm_change(&req.token).await?;
    Ok(Json(EmailChangedResponse { email }))
}

/// POST /api/auth/email/verify
pub async fn email_verify<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    ValidatedJson(req): ValidatedJson<TokenRequest>,
) -> AuthResult<StatusCode> {
    email_use_case(&state).verify_email(&req.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
