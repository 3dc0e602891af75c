//! Admin login check against the configured static credentials.

use crate::config::AdminConfig;

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    /// Id or password blank after trimming
    MissingCredentials,
    InvalidCredentials,
}

impl LoginOutcome {
    /// User-facing message for this outcome.
    pub fn message(&self) -> &'static str {
        match self {
            LoginOutcome::Success => "Login successful",
            LoginOutcome::MissingCredentials => "Admin ID and Password are required",
            LoginOutcome::InvalidCredentials => "Invalid Admin ID or Password",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success)
    }
}

/// Compare trimmed credentials with the trimmed configured ones.
///
/// Attempts are logged with the submitted id and the outcome; the password
/// is never logged.
pub fn check_admin_login(
    admin: &AdminConfig,
    admin_id: Option<&str>,
    password: Option<&str>,
) -> LoginOutcome {
    let received_id = admin_id.unwrap_or_default().trim();
    let received_password = password.unwrap_or_default().trim();

    let outcome = if received_id.is_empty() || received_password.is_empty() {
        LoginOutcome::MissingCredentials
    } else if received_id == admin.id.trim() && received_password == admin.password.trim() {
        LoginOutcome::Success
    } else {
        LoginOutcome::InvalidCredentials
    };

    if outcome.is_success() {
        tracing::info!(admin_id = received_id, "Admin login succeeded");
    } else {
        tracing::warn!(admin_id = received_id, ?outcome, "Admin login rejected");
    }

    outcome
}
