//! Email alerts for high-risk assessments.
//!
//! Delivery failures are logged and swallowed; an assessment never fails
//! because an email could not be sent.

pub mod smtp;
pub mod template;

pub use smtp::SmtpMailer;

use thiserror::Error;

use crate::models::RiskLabel;
use crate::outcome::{Boundary, Recovered};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("EMAIL_SENDER / EMAIL_PASSWORD are not configured")]
    MissingCredentials,

    #[error("Invalid email address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Cannot build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// A rendered alert ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Mail delivery backend (allows mocking).
pub trait Mailer: Send + Sync {
    fn send(&self, email: &AlertEmail) -> Result<(), NotifyError>;
}

/// What the alert says about one assessment.
#[derive(Debug, Clone, Copy)]
pub struct AlertContent<'a> {
    pub recipient: &'a str,
    pub risk: RiskLabel,
    pub explanation: &'a str,
    pub next_steps: &'a [String],
    pub display_name: &'a str,
}

pub struct NotificationGateway {
    mailer: Box<dyn Mailer>,
}

impl NotificationGateway {
    pub fn new(mailer: Box<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Render and send one alert. Makes exactly one delivery attempt.
    pub fn notify(&self, content: &AlertContent<'_>) -> Recovered<()> {
        let email = template::render_alert(content);
        let result = self.mailer.send(&email);
        if result.is_ok() {
            tracing::info!(risk = content.risk.as_str(), "Alert email sent");
        }
        Recovered::from_result(result, Boundary::Notification, || ())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::{AlertEmail, Mailer, NotifyError};

    /// Records every email it is asked to send; optionally fails each attempt.
    #[derive(Clone, Default)]
    pub struct RecordingMailer {
        pub sent: Arc<Mutex<Vec<AlertEmail>>>,
        pub fail: bool,
    }

    impl RecordingMailer {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn attempts(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl Mailer for RecordingMailer {
        fn send(&self, email: &AlertEmail) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(email.clone());
            if self.fail {
                Err(NotifyError::Transport("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }
}
