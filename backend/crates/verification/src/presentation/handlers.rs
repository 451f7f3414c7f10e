//! HTTP Handlers
//!
//! Identity comes from `ActorContext`, i.e. the `x-user-*` headers set by
//! the auth middleware.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use platform::actor::ActorContext;
use platform::audit_events::{AuditEmitter, AuditEvent};
use platform::client::ClientInfo;
use platform::validation::{ValidatedJson, validation_error};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::application::{
    MyVerificationUseCase, ReviewVerificationUseCase, UploadInput, UploadVerificationUseCase,
    VerificationConfig,
};
use crate::domain::entity::id_verification::{DocumentImages, IdVerification};
use crate::domain::repository::VerificationStore;
use crate::error::VerificationResult;
use crate::presentation::dto::{
    ListVerificationsQuery, ListVerificationsResponse, MyVerificationResponse, ReviewRequest,
    UploadVerificationRequest, VerificationResponse,
};

const AUDIT_SOURCE: &str = "verification";
const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Clone)]
pub struct VerificationAppState<R>
where
    R: VerificationStore,
{
    pub repo: Arc<R>,
    pub config: Arc<VerificationConfig>,
    pub audit: AuditEmitter,
}

fn event(name: &str, actor: &ActorContext, v: &IdVerification, client: &ClientInfo) -> AuditEvent {
    AuditEvent::new(AUDIT_SOURCE, name)
        .actor(actor.user_id.as_str(), actor.role)
        .target(v.id.to_string())
        .ip(client.ip_string())
}

/// POST /api/verifications
pub async fn upload<R: VerificationStore>(
    State(state): State<VerificationAppState<R>>,
    actor: ActorContext,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<UploadVerificationRequest>,
) -> VerificationResult<(StatusCode, Json<VerificationResponse>)> {
    let verification = UploadVerificationUseCase::new(state.repo.clone(), state.config.clone())
        .execute(
            &actor.user_id,
            UploadInput {
                document_type: req.document_type,
                images: DocumentImages {
                    front: req.front_image_url,
                    back: req.back_image_url,
                    selfie: req.selfie_image_url,
                },
            },
        )
        .await?;

    state.audit.emit(
        event("verification.uploaded", &actor, &verification, &client)
            .metadata(json!({ "documentType": verification.document_type.code() })),
    );

    Ok((
        StatusCode::CREATED,
        Json(VerificationResponse::at(verification, Utc::now())),
    ))
}

/// GET /api/verifications/me
pub async fn my_verification<R: VerificationStore>(
    State(state): State<VerificationAppState<R>>,
    actor: ActorContext,
) -> VerificationResult<Json<MyVerificationResponse>> {
    let latest = MyVerificationUseCase::new(state.repo.clone())
        .latest(&actor.user_id)
        .await?;
    let now = Utc::now();

    Ok(Json(MyVerificationResponse {
        verification: latest.map(|v| VerificationResponse::at(v, now)),
    }))
}

/// POST /api/verifications/me/revert
pub async fn revert<R: VerificationStore>(
    State(state): State<VerificationAppState<R>>,
    actor: ActorContext,
    client: ClientInfo,
) -> VerificationResult<StatusCode> {
    let reverted = MyVerificationUseCase::new(state.repo.clone())
        .revert_now(&actor.user_id)
        .await?;

    state
        .audit
        .emit(event("verification.reverted", &actor, &reverted, &client));
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/verifications
pub async fn list<R: VerificationStore>(
    State(state): State<VerificationAppState<R>>,
    actor: ActorContext,
    Query(query): Query<ListVerificationsQuery>,
) -> VerificationResult<Json<ListVerificationsResponse>> {
    query.validate().map_err(validation_error)?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(state.config.max_page_size);
    let rows = ReviewVerificationUseCase::new(state.repo.clone())
        .list(&actor, query.status, limit)
        .await?;
    let now = Utc::now();

    Ok(Json(ListVerificationsResponse {
        verifications: rows
            .into_iter()
            .map(|v| VerificationResponse::at(v, now))
            .collect(),
    }))
}

/// POST /api/verifications/{id}/review
pub async fn review<R: VerificationStore>(
    State(state): State<VerificationAppState<R>>,
    actor: ActorContext,
    client: ClientInfo,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReviewRequest>,
) -> VerificationResult<Json<VerificationResponse>> {
    let reviewed = ReviewVerificationUseCase::new(state.repo.clone())
        .review(&actor, &id, req.decision, req.reason)
        .await?;

    state.audit.emit(
        event("verification.reviewed", &actor, &reviewed, &client).metadata(json!({
            "userId": reviewed.user_id,
            "status": reviewed.status.code(),
            "reason": reviewed.rejection_reason,
        })),
    );

    Ok(Json(VerificationResponse::at(reviewed, Utc::now())))
}
