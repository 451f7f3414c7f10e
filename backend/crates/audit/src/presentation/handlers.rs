//! HTTP Handlers
//!
//! Every route sits behind `require_service_auth`; callers are services,
//! not browsers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use platform::validation::{ValidatedJson, validation_error};
use std::sync::Arc;
use validator::Validate;

use crate::application::config::AuditConfig;
use crate::application::{AnchorUseCase, AuditQueryUseCase, RecordLogUseCase};
use crate::domain::anchor::AnchorClient;
use crate::domain::entity::audit_log::AuditRecord;
use crate::domain::repository::{AuditStore, LogFilter};
use crate::error::AuditResult;
use crate::presentation::dto::{
    AuditLogResponse, ListLogsQuery, ListLogsResponse, RecordLogRequest, RecordLogResponse,
    VerifyLogResponse,
};

const DEFAULT_PAGE_SIZE: i64 = 50;

pub struct AuditAppState<R, A>
where
    R: AuditStore,
    A: AnchorClient,
{
    pub repo: Arc<R>,
    /// `None` while no ledger is configured
    pub anchor: Option<Arc<A>>,
    pub config: Arc<AuditConfig>,
}

impl<R: AuditStore, A: AnchorClient> Clone for AuditAppState<R, A> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            anchor: self.anchor.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R: AuditStore, A: AnchorClient> AuditAppState<R, A> {
    pub fn new(repo: R, anchor: Option<A>, config: AuditConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            anchor: anchor.map(Arc::new),
            config: Arc::new(config),
        }
    }

    pub fn anchoring(&self) -> Option<AnchorUseCase<R, A>> {
        self.anchor
            .as_ref()
            .map(|anchor| AnchorUseCase::new(self.repo.clone(), anchor.clone(), self.config.clone()))
    }
}

/// POST /api/audit/logs
pub async fn record_log<R: AuditStore, A: AnchorClient>(
    State(state): State<AuditAppState<R, A>>,
    ValidatedJson(req): ValidatedJson<RecordLogRequest>,
) -> AuditResult<(StatusCode, Json<RecordLogResponse>)> {
    let mut record = AuditRecord::new(req.event_type, req.source, req.occurred_at.unwrap_or_else(Utc::now));
    record.actor_id = req.actor_id;
    record.actor_role = req.actor_role;
    record.target_id = req.target_id;
    record.ip_address = req.ip_address;
    record.metadata = req.metadata;

    let anchoring = state.anchoring();
    let log = RecordLogUseCase::new(state.repo.clone(), anchoring.is_some())
        .execute(record)
        .await?;

    let response = RecordLogResponse {
        id: log.id.to_string(),
        content_hash: log.content_hash.to_hex(),
        anchor_status: log.anchor.status.code().to_string(),
    };
    if let Some(anchoring) = anchoring {
        anchoring.spawn(log);
    }

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/audit/logs
pub async fn list_logs<R: AuditStore, A: AnchorClient>(
    State(state): State<AuditAppState<R, A>>,
    Query(query): Query<ListLogsQuery>,
) -> AuditResult<Json<ListLogsResponse>> {
    query.validate().map_err(validation_error)?;

    let filter = LogFilter {
        actor_id: query.actor_id.filter(|s| !s.is_empty()),
        event_type: query.event_type.filter(|s| !s.is_empty()),
        limit: query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(state.config.max_page_size),
    };
    let logs = AuditQueryUseCase::new(state.repo.clone()).list(&filter).await?;

    Ok(Json(ListLogsResponse {
        logs: logs.into_iter().map(AuditLogResponse::from).collect(),
    }))
}

/// GET /api/audit/logs/{id}
pub async fn get_log<R: AuditStore, A: AnchorClient>(
    State(state): State<AuditAppState<R, A>>,
    Path(id): Path<String>,
) -> AuditResult<Json<AuditLogResponse>> {
    let log = AuditQueryUseCase::new(state.repo.clone()).get(&id).await?;
    Ok(Json(log.into()))
}

/// GET /api/audit/logs/{id}/verify
pub async fn verify_log<R: AuditStore, A: AnchorClient>(
    State(state): State<AuditAppState<R, A>>,
    Path(id): Path<String>,
) -> AuditResult<Json<VerifyLogResponse>> {
    let report = AuditQueryUseCase::new(state.repo.clone()).verify(&id).await?;

    Ok(Json(VerifyLogResponse {
        id: report.log.id.to_string(),
        intact: report.intact,
        stored_hash: report.log.content_hash.to_hex(),
        computed_hash: report.computed_hash.to_hex(),
        anchor_status: report.log.anchor.status.code().to_string(),
        anchor_tx_hash: report.log.anchor.tx_hash,
    }))
}
