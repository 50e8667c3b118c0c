//! Outbound email abstraction.
//!
//! Password reset links are handed to an `EmailSender` as soon as they are
//! generated. The default sender for local dev is `LogEmailSender`, which logs
//! the payload and returns `Ok(())`. A real deployment plugs in an SMTP or
//! provider API client behind the same trait.

use anyhow::Result;
use tracing::info;

pub const RESET_PASSWORD_TEMPLATE: &str = "reset_password";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub to_email: String,
    pub template: String,
    pub payload_json: String,
}

/// Email delivery abstraction.
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error.
    ///
    /// # Errors
    /// Returns an error when the message could not be handed off.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to_email = %message.to_email,
            template = %message.template,
            payload = %message.payload_json,
            "email send stub"
        );
        Ok(())
    }
}

/// Keeps every message in memory so tests can read reset links back.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryEmailSender {
    sent: std::sync::Mutex<Vec<EmailMessage>>,
}

#[cfg(test)]
impl MemoryEmailSender {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl EmailSender for MemoryEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("email sender poisoned"))?
            .push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            to_email: "alice@example.com".to_string(),
            template: RESET_PASSWORD_TEMPLATE.to_string(),
            payload_json: r#"{"reset_url":"http://localhost:5173/reset-password?token=t"}"#
                .to_string(),
        }
    }

    #[test]
    fn log_sender_accepts_messages() {
        assert!(LogEmailSender.send(&message()).is_ok());
    }

    #[test]
    fn memory_sender_records_messages() {
        let sender = MemoryEmailSender::default();
        assert!(sender.send(&message()).is_ok());
        assert_eq!(sender.sent(), vec![message()]);
    }
}
