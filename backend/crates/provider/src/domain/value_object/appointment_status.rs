//! Appointment lifecycle
//!
//! ```text
//! requested ──► confirmed ──► completed
//!     │             │
//!     ├──► declined └──► cancelled
//!     └──► cancelled
//! ```

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[display("requested")]
    Requested,
    #[display("confirmed")]
    Confirmed,
    #[display("declined")]
    Declined,
    #[display("cancelled")]
    Cancelled,
    #[display("completed")]
    Completed,
}

impl AppointmentStatus {
    pub fn code(&self) -> &'static str {
        match self {
            AppointmentStatus::Requested => "requested",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Declined => "declined",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "requested" => Some(AppointmentStatus::Requested),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "declined" => Some(AppointmentStatus::Declined),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            "completed" => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }

    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Requested, Confirmed)
                | (Requested, Declined)
                | (Requested, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Declined | AppointmentStatus::Cancelled | AppointmentStatus::Completed
        )
    }
}

/// What a party asks to do with an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AppointmentAction {
    #[display("confirm")]
    Confirm,
    #[display("decline")]
    Decline,
    #[display("complete")]
    Complete,
    #[display("cancel")]
    Cancel,
}

impl AppointmentAction {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "confirm" => Some(AppointmentAction::Confirm),
            "decline" => Some(AppointmentAction::Decline),
            "complete" => Some(AppointmentAction::Complete),
            "cancel" => Some(AppointmentAction::Cancel),
            _ => None,
        }
    }

    pub fn target(self) -> AppointmentStatus {
        match self {
            AppointmentAction::Confirm => AppointmentStatus::Confirmed,
            AppointmentAction::Decline => AppointmentStatus::Declined,
            AppointmentAction::Complete => AppointmentStatus::Completed,
            AppointmentAction::Cancel => AppointmentStatus::Cancelled,
        }
    }

    /// Only cancelling is open to the customer
    pub fn provider_only(self) -> bool {
        !matches!(self, AppointmentAction::Cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    const ALL: [AppointmentStatus; 5] = [Requested, Confirmed, Declined, Cancelled, Completed];

    #[test]
    fn test_terminal_states_are_final() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_allowed_transitions() {
        let allowed: Vec<_> = ALL
            .into_iter()
            .flat_map(|from| ALL.into_iter().map(move |to| (from, to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .collect();
        assert_eq!(
            allowed,
            vec![
                (Requested, Confirmed),
                (Requested, Declined),
                (Requested, Cancelled),
                (Confirmed, Cancelled),
                (Confirmed, Completed),
            ]
        );
    }

    #[test]
    fn test_actions() {
        assert_eq!(AppointmentAction::from_code("decline"), Some(AppointmentAction::Decline));
        assert_eq!(AppointmentAction::from_code("reschedule"), None);
        assert!(AppointmentAction::Complete.provider_only());
        assert!(!AppointmentAction::Cancel.provider_only());
    }
}
