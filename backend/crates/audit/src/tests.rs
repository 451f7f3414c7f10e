//! Use case and router tests for the audit crate

#[cfg(test)]
mod support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::domain::anchor::Anchor;
    use crate::domain::value_object::content_hash::ContentHash;
    use crate::error::{AuditError, AuditResult};

    /// Accepts every hash and remembers it
    #[derive(Clone, Default)]
    pub struct RecordingAnchor {
        pub calls: Arc<Mutex<Vec<(ContentHash, String)>>>,
    }

    impl Anchor for RecordingAnchor {
        async fn anchor(&self, hash: &ContentHash, source: &str) -> AuditResult<String> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((*hash, source.to_string()));
            Ok(format!("0x{:064x}", calls.len()))
        }
    }

    /// A node that never answers
    #[derive(Clone, Default)]
    pub struct FailingAnchor {
        pub attempts: Arc<AtomicUsize>,
    }

    impl Anchor for FailingAnchor {
        async fn anchor(&self, _hash: &ContentHash, _source: &str) -> AuditResult<String> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(AuditError::Anchor("connection refused".to_string()))
        }
    }
}

#[cfg(test)]
mod use_case_tests {
    use super::support::*;
    use chrono::{Duration, Utc};
    use kernel::role::UserRole;
    use platform::audit_events::{AuditEmitter, AuditEvent};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use crate::application::{
        AnchorUseCase, AuditConfig, AuditQueryUseCase, RecordLogUseCase, run_forwarder,
    };
    use crate::domain::entity::audit_log::{AuditLog, AuditRecord};
    use crate::domain::value_object::anchor_status::AnchorStatus;
    use crate::error::AuditError;
    use crate::infra::memory::MemoryAuditRepository;

    fn record() -> AuditRecord {
        let mut record = AuditRecord::new("verification.reviewed", "verification", Utc::now());
        record.actor_id = Some("staff-7".into());
        record.actor_role = Some(UserRole::LguStaff);
        record.target_id = Some("user-9".into());
        record.metadata = json!({ "decision": "verified", "documentType": "passport" });
        record
    }

    #[tokio::test]
    async fn test_record_without_ledger_is_disabled_and_verifiable() {
        let repo = Arc::new(MemoryAuditRepository::new());
        let log = RecordLogUseCase::new(repo.clone(), false)
            .execute(record())
            .await
            .unwrap();
        assert_eq!(log.anchor.status, AnchorStatus::Disabled);

        let query = AuditQueryUseCase::new(repo.clone());
        let report = query.verify(&log.id.to_string()).await.unwrap();
        assert!(report.intact);
        assert_eq!(report.computed_hash, log.content_hash);

        repo.tamper(&log.id, |l| l.record.metadata = json!({ "decision": "rejected" }));
        let report = query.verify(&log.id.to_string()).await.unwrap();
        assert!(!report.intact);
    }

    #[tokio::test]
    async fn test_lookup_errors() {
        let query = AuditQueryUseCase::new(Arc::new(MemoryAuditRepository::new()));
        assert!(matches!(
            query.get(&uuid::Uuid::new_v4().to_string()).await,
            Err(AuditError::LogNotFound)
        ));
        assert!(matches!(query.get("not-a-uuid").await, Err(AuditError::App(_))));
    }

    #[tokio::test]
    async fn test_successful_anchor_is_stored() {
        let repo = Arc::new(MemoryAuditRepository::new());
        let anchor = RecordingAnchor::default();
        let anchoring = AnchorUseCase::new(
            repo.clone(),
            Arc::new(anchor.clone()),
            Arc::new(AuditConfig::default()),
        );

        let log = RecordLogUseCase::new(repo.clone(), true)
            .execute(record())
            .await
            .unwrap();
        assert_eq!(log.anchor.status, AnchorStatus::Pending);

        let anchored = anchoring.anchor_log(log.clone()).await.unwrap();
        assert_eq!(anchored.anchor.status, AnchorStatus::Anchored);

        let calls = anchor.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![(log.content_hash, "verification".to_string())]);

        let stored = AuditQueryUseCase::new(repo)
            .get(&log.id.to_string())
            .await
            .unwrap();
        assert_eq!(stored.anchor.status, AnchorStatus::Anchored);
        assert!(stored.anchor.tx_hash.is_some());
    }

    #[tokio::test]
    async fn test_backlog_gives_up_after_max_attempts() {
        let repo = Arc::new(MemoryAuditRepository::new());
        let anchor = FailingAnchor::default();
        let anchoring = AnchorUseCase::new(
            repo.clone(),
            Arc::new(anchor.clone()),
            Arc::new(AuditConfig::default()),
        );

        let log = RecordLogUseCase::new(repo.clone(), true)
            .execute(record())
            .await
            .unwrap();
        let failed = anchoring.anchor_log(log).await.unwrap();
        assert_eq!(failed.anchor.status, AnchorStatus::Failed);
        assert_eq!(failed.anchor.attempts, 1);

        for _ in 1..AuditLog::MAX_ANCHOR_ATTEMPTS {
            let report = anchoring.retry_backlog(Utc::now()).await.unwrap();
            assert_eq!(report.attempted, 1);
            assert_eq!(report.failed, 1);
        }

        let report = anchoring.retry_backlog(Utc::now()).await.unwrap();
        assert_eq!(report.attempted, 0);
        assert_eq!(
            anchor.attempts.load(Ordering::SeqCst),
            AuditLog::MAX_ANCHOR_ATTEMPTS as usize
        );
    }

    #[tokio::test]
    async fn test_fresh_pending_logs_wait_for_grace_period() {
        let repo = Arc::new(MemoryAuditRepository::new());
        let anchor = RecordingAnchor::default();
        let anchoring = AnchorUseCase::new(
            repo.clone(),
            Arc::new(anchor.clone()),
            Arc::new(AuditConfig::default()),
        );
        RecordLogUseCase::new(repo.clone(), true)
            .execute(record())
            .await
            .unwrap();

        let now = anchoring.retry_backlog(Utc::now()).await.unwrap();
        assert_eq!(now.attempted, 0);

        let later = anchoring
            .retry_backlog(Utc::now() + Duration::minutes(2))
            .await
            .unwrap();
        assert_eq!(later.anchored, 1);
    }

    #[tokio::test]
    async fn test_forwarder_drains_emitted_events() {
        let repo = Arc::new(MemoryAuditRepository::new());
        let (emitter, rx) = AuditEmitter::channel();

        emitter.emit(AuditEvent::new("auth", "auth.signin").actor("u1", UserRole::Customer));
        emitter.emit(
            AuditEvent::new("provider", "provider.created")
                .metadata(json!({ "businessName": "Sari-Sari" })),
        );
        drop(emitter);

        let forwarded =
            run_forwarder::<MemoryAuditRepository, RecordingAnchor>(rx, repo.clone(), None).await;
        assert_eq!(forwarded, 2);
        assert_eq!(repo.len(), 2);
    }
}

#[cfg(test)]
mod router_tests {
    use super::support::*;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use platform::env::Environment;
    use platform::service_auth::{API_KEY_HEADER, ServiceAuthConfig};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::application::AuditConfig;
    use crate::infra::memory::MemoryAuditRepository;
    use crate::presentation::handlers::AuditAppState;
    use crate::presentation::router::audit_routes;

    const KEY: &str = "audit-test-key";

    fn app() -> Router {
        let state: AuditAppState<MemoryAuditRepository, RecordingAnchor> =
            AuditAppState::new(MemoryAuditRepository::new(), None, AuditConfig::development());
        audit_routes(
            state,
            ServiceAuthConfig::new(Some(KEY.into()), Environment::Production),
        )
    }

    fn request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(API_KEY_HEADER, KEY)
            .header(header::CONTENT_TYPE, "application/json");
        builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_default())
            .unwrap()
    }

    async fn json(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_requires_service_key() {
        let resp = app()
            .oneshot(Request::builder().uri("/logs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_record_list_and_verify() {
        let app = app();

        let created = app
            .clone()
            .oneshot(request(
                "POST",
                "/logs",
                Some(r#"{"eventType":"auth.signin","source":"auth","actorId":"u1","actorRole":"customer","metadata":{"b":2,"a":1}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = json(created).await;
        assert_eq!(created["anchorStatus"], "disabled");
        let id = created["id"].as_str().unwrap().to_string();

        let listed = app
            .clone()
            .oneshot(request("GET", "/logs?actorId=u1", None))
            .await
            .unwrap();
        assert_eq!(json(listed).await["logs"].as_array().unwrap().len(), 1);

        let verified = app
            .clone()
            .oneshot(request("GET", &format!("/logs/{id}/verify"), None))
            .await
            .unwrap();
        let verified = json(verified).await;
        assert_eq!(verified["intact"], true);
        assert_eq!(verified["storedHash"], created["contentHash"]);
    }

    #[tokio::test]
    async fn test_bad_input() {
        let app = app();

        let missing = app
            .clone()
            .oneshot(request("POST", "/logs", Some(r#"{"eventType":"","source":"auth"}"#)))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let limit = app
            .clone()
            .oneshot(request("GET", "/logs?limit=0", None))
            .await
            .unwrap();
        assert_eq!(limit.status(), StatusCode::BAD_REQUEST);

        let bad_id = app
            .clone()
            .oneshot(request("GET", "/logs/nope", None))
            .await
            .unwrap();
        assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);

        let unknown = app
            .oneshot(request("GET", &format!("/logs/{}", uuid::Uuid::new_v4()), None))
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    }
}
