//! User Entity
//!
//! Profile data; credentials live in [`super::auth::Auth`].

use chrono::{DateTime, Duration, Utc};
use kernel::role::UserRole;

use crate::domain::value_object::{
    email::Email, public_id::PublicId, user_id::UserId, user_status::UserStatus,
};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub public_id: PublicId,
    /// Unique, also the sign-in identifier
    pub email: Email,
    pub email_verified: bool,
    pub display_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    /// Set while `status == PendingDeletion`
    pub deletion_scheduled_for: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Grace period between confirming deletion and the purge
    pub const DELETION_GRACE_DAYS: i64 = 30;

    pub fn new(email: Email, display_name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            public_id: PublicId::new(),
            email,
            email_verified: false,
            display_name,
            role,
            status: UserStatus::Active,
            deletion_scheduled_for: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    /// Staff roles must sign in with TOTP
    pub fn requires_2fa(&self) -> bool {
        self.role.is_staff()
    }

    pub fn is_pending_deletion(&self) -> bool {
        self.status == UserStatus::PendingDeletion
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn schedule_deletion(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let when = now + Duration::days(Self::DELETION_GRACE_DAYS);
        self.status = UserStatus::PendingDeletion;
        self.deletion_scheduled_for = Some(when);
        self.updated_at = now;
        when
    }

    /// Returns false when there is nothing to cancel
    pub fn cancel_deletion(&mut self) -> bool {
        if !self.is_pending_deletion() {
            return false;
        }
        self.status = UserStatus::Active;
        self.deletion_scheduled_for = None;
        self.updated_at = Utc::now();
        true
    }

    /// A confirmed change of address is also a verified address
    pub fn change_email(&mut self, email: Email) {
        self.email = email;
        self.email_verified = true;
        self.updated_at = Utc::now();
    }

    pub fn mark_email_verified(&mut self) {
        self.email_verified = true;
        self.updated_at = Utc::now();
    }
}
