//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod cleanup;
pub mod config;
pub mod credentials;
pub mod delete_account;
pub mod email_change;
pub mod mfa_bootstrap;
pub mod password_reset;
pub mod session_token;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod totp_setup;

// Re-exports
pub use check_session::CheckSessionUseCase;
pub use cleanup::{CleanupReport, cleanup_now, run_cleanup};
pub use config::AuthConfig;
pub use delete_account::DeleteAccountUseCase;
pub use email_change::EmailChangeUseCase;
pub use mfa_bootstrap::{IssuedBootstrapToken, MfaBootstrapUseCase, RedeemedBootstrap};
pub use password_reset::PasswordResetUseCase;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase, SignedIn};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use totp_setup::{TotpSetupOutput, TotpSetupUseCase};
