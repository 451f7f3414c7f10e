//! Use case and router tests for the provider crate

#[cfg(test)]
mod support {
    use kernel::id::CategoryId;
    use kernel::role::UserRole;
    use platform::actor::ActorContext;
    use std::sync::Arc;

    use crate::application::{CatalogUseCase, ProviderConfig, ProviderProfileUseCase};
    use crate::domain::entity::provider::{Provider, ProviderProfile};
    use crate::domain::value_object::ProviderStatus;
    use crate::infra::memory::MemoryProviderRepository;

    pub fn actor(user_id: &str, role: UserRole) -> ActorContext {
        ActorContext {
            user_id: user_id.to_string(),
            role,
            email: None,
        }
    }

    pub fn admin() -> ActorContext {
        actor("admin-1", UserRole::Admin)
    }

    pub struct Fixture {
        pub repo: Arc<MemoryProviderRepository>,
        pub config: Arc<ProviderConfig>,
        pub category: CategoryId,
    }

    impl Fixture {
        pub async fn new() -> Self {
            let repo = Arc::new(MemoryProviderRepository::new());
            let category = CatalogUseCase::new(repo.clone())
                .create_category(&admin(), "Catering", None)
                .await
                .unwrap();
            Self {
                repo,
                config: Arc::new(ProviderConfig::default()),
                category: category.id,
            }
        }

        pub fn profile(&self, name: &str) -> ProviderProfile {
            ProviderProfile {
                business_name: name.to_string(),
                description: None,
                category_id: self.category,
                service_area_ids: Vec::new(),
                contact_phone: None,
            }
        }

        /// Registered and approved provider owned by `owner`
        pub async fn active_provider(&self, owner: &str) -> Provider {
            let profiles = ProviderProfileUseCase::new(self.repo.clone());
            let provider = profiles
                .register(&actor(owner, UserRole::Provider), self.profile(owner))
                .await
                .unwrap();
            profiles
                .set_status(&admin(), &provider.id.to_string(), ProviderStatus::Active)
                .await
                .unwrap()
        }
    }
}

#[cfg(test)]
mod catalog_tests {
    use super::support::*;
    use axum::http::StatusCode;
    use kernel::role::UserRole;
    use std::sync::Arc;

    use crate::application::CatalogUseCase;
    use crate::error::ProviderError;
    use crate::infra::memory::MemoryProviderRepository;

    #[tokio::test]
    async fn test_category_rules() {
        let catalog = CatalogUseCase::new(Arc::new(MemoryProviderRepository::new()));

        let staff = actor("staff-1", UserRole::LguStaff);
        let err = catalog.create_category(&staff, "Plumbing", None).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        catalog.create_category(&admin(), " Plumbing ", None).await.unwrap();
        assert!(matches!(
            catalog.create_category(&admin(), "plumbing", None).await,
            Err(ProviderError::DuplicateName(_))
        ));

        let names: Vec<_> = catalog
            .categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Plumbing"]);
    }

    #[tokio::test]
    async fn test_staff_may_add_service_areas() {
        let catalog = CatalogUseCase::new(Arc::new(MemoryProviderRepository::new()));
        let staff = actor("staff-1", UserRole::LguStaff);

        catalog
            .create_service_area(&staff, "Poblacion", Some("Makati".into()))
            .await
            .unwrap();
        catalog
            .create_service_area(&staff, "Poblacion", Some("Davao".into()))
            .await
            .unwrap();
        assert!(matches!(
            catalog
                .create_service_area(&admin(), "poblacion", Some("MAKATI".into()))
                .await,
            Err(ProviderError::DuplicateName(_))
        ));

        let customer = actor("cust-1", UserRole::Customer);
        assert!(catalog.create_service_area(&customer, "Bel-Air", None).await.is_err());
        assert_eq!(catalog.service_areas().await.unwrap().len(), 2);
    }
}

#[cfg(test)]
mod profile_tests {
    use super::support::*;
    use axum::http::StatusCode;
    use kernel::id::{CategoryId, ServiceAreaId};
    use kernel::role::UserRole;

    use crate::application::{CatalogUseCase, ProviderProfileUseCase};
    use crate::domain::value_object::ProviderStatus;
    use crate::error::ProviderError;

    #[tokio::test]
    async fn test_one_profile_per_owner() {
        let fx = Fixture::new().await;
        let profiles = ProviderProfileUseCase::new(fx.repo.clone());
        let owner = actor("owner-1", UserRole::Provider);

        let provider = profiles.register(&owner, fx.profile("Lechon ni Mang Juan")).await.unwrap();
        assert_eq!(provider.status, ProviderStatus::PendingApproval);

        assert!(matches!(
            profiles.register(&owner, fx.profile("Second shop")).await,
            Err(ProviderError::ProfileExists)
        ));
    }

    #[tokio::test]
    async fn test_only_provider_accounts_register() {
        let fx = Fixture::new().await;
        let err = ProviderProfileUseCase::new(fx.repo.clone())
            .register(&actor("cust-1", UserRole::Customer), fx.profile("Shop"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_references_rejected() {
        let fx = Fixture::new().await;
        let profiles = ProviderProfileUseCase::new(fx.repo.clone());
        let owner = actor("owner-1", UserRole::Provider);

        let mut profile = fx.profile("Shop");
        profile.category_id = CategoryId::new();
        assert!(matches!(
            profiles.register(&owner, profile).await,
            Err(ProviderError::UnknownReference("categoryId"))
        ));

        let area = CatalogUseCase::new(fx.repo.clone())
            .create_service_area(&admin(), "San Roque", None)
            .await
            .unwrap();
        let mut profile = fx.profile("Shop");
        profile.service_area_ids = vec![area.id, ServiceAreaId::new()];
        assert!(matches!(
            profiles.register(&owner, profile).await,
            Err(ProviderError::UnknownReference("serviceAreaIds"))
        ));

        let mut profile = fx.profile("Shop");
        profile.service_area_ids = vec![area.id, area.id];
        let provider = profiles.register(&owner, profile).await.unwrap();
        assert_eq!(provider.profile.service_area_ids, vec![area.id]);
    }

    #[tokio::test]
    async fn test_visibility_and_search() {
        let fx = Fixture::new().await;
        let profiles = ProviderProfileUseCase::new(fx.repo.clone());
        let owner = actor("owner-1", UserRole::Provider);
        let pending = profiles.register(&owner, fx.profile("Pending Shop")).await.unwrap();
        let active = fx.active_provider("owner-2").await;

        let stranger = actor("cust-1", UserRole::Customer);
        assert!(matches!(
            profiles.get(&pending.id.to_string(), Some(&stranger)).await,
            Err(ProviderError::ProviderNotFound)
        ));
        assert!(matches!(
            profiles.get(&pending.id.to_string(), None).await,
            Err(ProviderError::ProviderNotFound)
        ));
        profiles.get(&pending.id.to_string(), Some(&owner)).await.unwrap();
        profiles.get(&pending.id.to_string(), Some(&admin())).await.unwrap();
        profiles.get(&active.id.to_string(), None).await.unwrap();

        let listed = profiles.search(Some(fx.category), None, 50).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, active.id);
        assert!(profiles.search(Some(CategoryId::new()), None, 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_changes_need_moderator() {
        let fx = Fixture::new().await;
        let profiles = ProviderProfileUseCase::new(fx.repo.clone());
        let owner = actor("owner-1", UserRole::Provider);
        let provider = profiles.register(&owner, fx.profile("Shop")).await.unwrap();
        let id = provider.id.to_string();

        let err = profiles
            .set_status(&owner, &id, ProviderStatus::Active)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let staff = actor("staff-1", UserRole::LguStaff);
        profiles.set_status(&staff, &id, ProviderStatus::Active).await.unwrap();
        profiles.set_status(&staff, &id, ProviderStatus::Suspended).await.unwrap();
        assert!(matches!(
            profiles.set_status(&staff, &id, ProviderStatus::PendingApproval).await,
            Err(ProviderError::InvalidProviderTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_mine() {
        let fx = Fixture::new().await;
        let profiles = ProviderProfileUseCase::new(fx.repo.clone());
        let owner = actor("owner-1", UserRole::Provider);

        assert!(matches!(
            profiles.update_mine(&owner, fx.profile("Shop")).await,
            Err(ProviderError::ProviderNotFound)
        ));

        profiles.register(&owner, fx.profile("Shop")).await.unwrap();
        let mut profile = fx.profile("Shop & Sons");
        profile.contact_phone = Some(" 0917 000 1111 ".into());
        let updated = profiles.update_mine(&owner, profile).await.unwrap();
        assert_eq!(updated.profile.business_name, "Shop & Sons");
        assert_eq!(updated.profile.contact_phone.as_deref(), Some("0917 000 1111"));
        assert_eq!(profiles.mine(&owner).await.unwrap().profile.business_name, "Shop & Sons");
    }
}

#[cfg(test)]
mod appointment_tests {
    use super::support::*;
    use axum::http::StatusCode;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use kernel::id::ProviderId;
    use kernel::role::UserRole;

    use crate::application::{AppointmentUseCase, BookingInput, ProviderProfileUseCase};
    use crate::domain::value_object::{AppointmentAction, AppointmentStatus, ProviderStatus};
    use crate::error::ProviderError;
    use crate::infra::memory::MemoryProviderRepository;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 8, 0, 0).unwrap()
    }

    fn booking(provider_id: ProviderId, hour: u32, minutes: i32) -> BookingInput {
        BookingInput {
            provider_id,
            scheduled_at: Utc.with_ymd_and_hms(2026, 5, 5, hour, 0, 0).unwrap(),
            duration_minutes: minutes,
            notes: None,
        }
    }

    fn use_case(fx: &Fixture) -> AppointmentUseCase<MemoryProviderRepository> {
        AppointmentUseCase::new(fx.repo.clone(), fx.config.clone())
    }

    #[tokio::test]
    async fn test_booking_rules() {
        let fx = Fixture::new().await;
        let provider = fx.active_provider("owner-1").await;
        let appointments = use_case(&fx);
        let customer = actor("cust-1", UserRole::Customer);

        for minutes in [14, 481] {
            assert!(matches!(
                appointments.book(&customer, booking(provider.id, 9, minutes), now()).await,
                Err(ProviderError::DurationOutOfRange { min: 15, max: 480 })
            ));
        }

        let mut past = booking(provider.id, 9, 60);
        past.scheduled_at = now() - Duration::minutes(1);
        assert!(matches!(
            appointments.book(&customer, past, now()).await,
            Err(ProviderError::ScheduleInPast)
        ));

        assert!(matches!(
            appointments.book(&customer, booking(ProviderId::new(), 9, 60), now()).await,
            Err(ProviderError::ProviderNotFound)
        ));

        let owner = actor("owner-1", UserRole::Provider);
        let err = appointments
            .book(&owner, booking(provider.id, 9, 60), now())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let booked = appointments
            .book(&customer, booking(provider.id, 9, 15), now())
            .await
            .unwrap();
        assert_eq!(booked.status, AppointmentStatus::Requested);
    }

    #[tokio::test]
    async fn test_inactive_provider_not_bookable() {
        let fx = Fixture::new().await;
        let provider = ProviderProfileUseCase::new(fx.repo.clone())
            .register(&actor("owner-1", UserRole::Provider), fx.profile("Shop"))
            .await
            .unwrap();
        assert_eq!(provider.status, ProviderStatus::PendingApproval);

        assert!(matches!(
            use_case(&fx)
                .book(&actor("cust-1", UserRole::Customer), booking(provider.id, 9, 60), now())
                .await,
            Err(ProviderError::ProviderNotActive)
        ));
    }

    #[tokio::test]
    async fn test_confirmed_slots_do_not_overlap() {
        let fx = Fixture::new().await;
        let provider = fx.active_provider("owner-1").await;
        let owner = actor("owner-1", UserRole::Provider);
        let appointments = use_case(&fx);
        let ana = actor("cust-1", UserRole::Customer);
        let ben = actor("cust-2", UserRole::Customer);

        // two overlapping requests are fine while neither is confirmed
        let first = appointments.book(&ana, booking(provider.id, 9, 60), now()).await.unwrap();
        let second = appointments.book(&ben, booking(provider.id, 9, 30), now()).await.unwrap();

        appointments
            .act(&owner, &first.id.to_string(), AppointmentAction::Confirm, now())
            .await
            .unwrap();
        assert!(matches!(
            appointments
                .act(&owner, &second.id.to_string(), AppointmentAction::Confirm, now())
                .await,
            Err(ProviderError::SlotTaken)
        ));
        assert!(matches!(
            appointments.book(&ben, booking(provider.id, 9, 120), now()).await,
            Err(ProviderError::SlotTaken)
        ));

        // back to back is free
        let next = appointments.book(&ben, booking(provider.id, 10, 60), now()).await.unwrap();
        appointments
            .act(&owner, &next.id.to_string(), AppointmentAction::Confirm, now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_party_permissions_and_transitions() {
        let fx = Fixture::new().await;
        let provider = fx.active_provider("owner-1").await;
        let owner = actor("owner-1", UserRole::Provider);
        let appointments = use_case(&fx);
        let customer = actor("cust-1", UserRole::Customer);
        let stranger = actor("cust-2", UserRole::Customer);

        let booked = appointments.book(&customer, booking(provider.id, 9, 60), now()).await.unwrap();
        let id = booked.id.to_string();

        assert!(matches!(
            appointments.act(&customer, &id, AppointmentAction::Confirm, now()).await,
            Err(ProviderError::NotParty)
        ));
        assert!(matches!(
            appointments.act(&stranger, &id, AppointmentAction::Cancel, now()).await,
            Err(ProviderError::NotParty)
        ));

        appointments.act(&owner, &id, AppointmentAction::Confirm, now()).await.unwrap();
        assert!(matches!(
            appointments.act(&owner, &id, AppointmentAction::Decline, now()).await,
            Err(ProviderError::InvalidTransition { .. })
        ));

        let cancelled = appointments
            .act(&customer, &id, AppointmentAction::Cancel, now())
            .await
            .unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert!(matches!(
            appointments.act(&owner, &id, AppointmentAction::Complete, now()).await,
            Err(ProviderError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_mine_for_each_party() {
        let fx = Fixture::new().await;
        let provider = fx.active_provider("owner-1").await;
        let appointments = use_case(&fx);
        let customer = actor("cust-1", UserRole::Customer);

        appointments.book(&customer, booking(provider.id, 11, 60), now()).await.unwrap();
        appointments.book(&customer, booking(provider.id, 9, 60), now()).await.unwrap();

        let mine = appointments.mine(&customer, 50).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].scheduled_at < mine[1].scheduled_at);

        let owner = actor("owner-1", UserRole::Provider);
        assert_eq!(appointments.mine(&owner, 50).await.unwrap().len(), 2);

        let other_owner = actor("owner-9", UserRole::Provider);
        assert!(appointments.mine(&other_owner, 50).await.unwrap().is_empty());
        assert!(appointments.mine(&actor("cust-2", UserRole::Customer), 50).await.unwrap().is_empty());
    }
}

#[cfg(test)]
mod router_tests {
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use chrono::{Duration, SecondsFormat, Utc};
    use platform::actor::{USER_ID_HEADER, USER_ROLE_HEADER};
    use platform::audit_events::AuditEmitter;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::application::ProviderConfig;
    use crate::infra::memory::MemoryProviderRepository;
    use crate::presentation::handlers::ProviderAppState;
    use crate::presentation::router::provider_routes;

    fn app() -> Router {
        provider_routes(ProviderAppState {
            repo: Arc::new(MemoryProviderRepository::new()),
            config: Arc::new(ProviderConfig::development()),
            audit: AuditEmitter::disabled(),
        })
    }

    fn request(method: &str, uri: &str, as_user: Option<(&str, &str)>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some((id, role)) = as_user {
            builder = builder.header(USER_ID_HEADER, id).header(USER_ROLE_HEADER, role);
        }
        builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_default())
            .unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    const ADMIN: Option<(&str, &str)> = Some(("admin-1", "admin"));
    const OWNER: Option<(&str, &str)> = Some(("owner-1", "provider"));
    const CUSTOMER: Option<(&str, &str)> = Some(("cust-1", "customer"));

    #[tokio::test]
    async fn test_catalog_is_public_to_read() {
        let app = app();

        let (status, _) = send(
            &app,
            request("POST", "/categories", None, Some(json!({ "name": "Laundry" }))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            request("POST", "/categories", ADMIN, Some(json!({ "name": "Laundry" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, request("GET", "/categories", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["categories"][0]["name"], "Laundry");

        let (status, _) = send(
            &app,
            request("POST", "/service-areas", CUSTOMER, Some(json!({ "name": "Malate" }))),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_register_approve_book_confirm() {
        let app = app();

        let (_, category) = send(
            &app,
            request("POST", "/categories", ADMIN, Some(json!({ "name": "Tailoring" }))),
        )
        .await;
        let profile = json!({ "businessName": "Tahi Tailoring", "categoryId": category["id"] });

        let (status, provider) = send(&app, request("POST", "/providers", OWNER, Some(profile.clone()))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(provider["status"], "pending_approval");
        let provider_id = provider["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, request("POST", "/providers", OWNER, Some(profile))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, listed) = send(&app, request("GET", "/providers", None, None)).await;
        assert!(listed["providers"].as_array().unwrap().is_empty());

        let (status, _) = send(&app, request("GET", &format!("/providers/{provider_id}"), None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, request("GET", &format!("/providers/{provider_id}"), OWNER, None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            request(
                "POST",
                &format!("/providers/{provider_id}/status"),
                Some(("staff-1", "lgu_staff")),
                Some(json!({ "status": "active" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, listed) = send(&app, request("GET", "/providers?limit=10", None, None)).await;
        assert_eq!(listed["providers"].as_array().unwrap().len(), 1);

        let scheduled_at = (Utc::now() + Duration::days(2)).to_rfc3339_opts(SecondsFormat::Secs, true);
        let (status, appointment) = send(
            &app,
            request(
                "POST",
                "/appointments",
                CUSTOMER,
                Some(json!({ "providerId": provider_id, "scheduledAt": scheduled_at, "durationMinutes": 45 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(appointment["status"], "requested");
        let appointment_id = appointment["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            request("POST", &format!("/appointments/{appointment_id}/reschedule"), OWNER, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, confirmed) = send(
            &app,
            request("POST", &format!("/appointments/{appointment_id}/confirm"), OWNER, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(confirmed["status"], "confirmed");

        let (status, _) = send(
            &app,
            request("POST", &format!("/appointments/{appointment_id}/decline"), OWNER, None),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, mine) = send(&app, request("GET", "/appointments/mine", CUSTOMER, None)).await;
        assert_eq!(mine["appointments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bad_input() {
        let app = app();

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/providers",
                OWNER,
                Some(json!({ "businessName": "Shop", "categoryId": "nope" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/providers",
                OWNER,
                Some(json!({ "businessName": "Shop", "categoryId": uuid::Uuid::new_v4() })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(&app, request("GET", "/providers?limit=500", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, request("GET", "/providers/not-a-uuid", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
