//! SMTP notification dispatcher using Lettre.

use crate::config::SmtpConfig;
use crate::error::NotificationError;
use crate::providers::{MailInfo, NotificationDispatcher};
use lettre::message::header::ContentType;
use lettre::address::AddressError;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};

/// SMTP dispatcher.
///
/// Sends each notice as a `multipart/alternative` message (plain text and
/// HTML) through an authenticated relay.
///
/// # Examples
///
/// ```ignore
/// use guildhack_recruit::providers::SmtpNotificationDispatcher;
///
/// let dispatcher = SmtpNotificationDispatcher::new(&SmtpConfig {
///     server: "email-smtp.ap-northeast-1.amazonaws.com".to_string(),
///     port: 587,
///     username: "user".to_string(),
///     password: "secret".to_string(),
/// });
/// ```
#[derive(Clone)]
pub struct SmtpNotificationDispatcher {
    /// SMTP server address.
    smtp_server: String,

    /// SMTP server port.
    smtp_port: u16,

    /// SMTP credentials.
    credentials: Credentials,
}

impl SmtpNotificationDispatcher {
    /// Create a dispatcher for a relay.
    #[must_use]
    pub fn new(config: &SmtpConfig) -> Self {
        Self {
            smtp_server: config.server.clone(),
            smtp_port: config.port,
            credentials: Credentials::new(config.username.clone(), config.password.clone()),
        }
    }

    /// Build SMTP transport for sending emails.
    fn build_transport(&self) -> Result<SmtpTransport, NotificationError> {
        Ok(SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| NotificationError::Configuration(format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }
}

/// Parse `Name<address>` (or a bare address) into a mailbox.
fn parse_sender(sender: &str) -> Result<Mailbox, NotificationError> {
    let invalid = |e: AddressError| NotificationError::Configuration(format!("Invalid sender {sender}: {e}"));

    match sender.split_once('<') {
        Some((name, rest)) => {
            let address: Address = rest.trim_end_matches('>').trim().parse().map_err(invalid)?;
            let name = name.trim();
            Ok(Mailbox::new((!name.is_empty()).then(|| name.to_string()), address))
        },
        None => Ok(Mailbox::new(None, sender.trim().parse().map_err(invalid)?)),
    }
}

fn content_type(mime: &str, charset: &str) -> Result<ContentType, NotificationError> {
    ContentType::parse(&format!("{mime}; charset={charset}"))
        .map_err(|e| NotificationError::Configuration(format!("Invalid charset {charset}: {e}")))
}

fn build_message(message: &MailInfo) -> Result<Message, NotificationError> {
    let to: Mailbox = message.recipient.parse().map_err(|e: AddressError| {
        NotificationError::MessageRejected(format!("Invalid recipient {}: {e}", message.recipient))
    })?;

    let body = MultiPart::alternative()
        .singlepart(
            SinglePart::builder()
                .header(content_type("text/plain", &message.charset)?)
                .body(message.text_body.clone()),
        )
        .singlepart(
            SinglePart::builder()
                .header(content_type("text/html", &message.charset)?)
                .body(message.html_body.clone()),
        );

    Message::builder()
        .from(parse_sender(&message.sender)?)
        .to(to)
        .subject(message.subject.clone())
        .multipart(body)
        .map_err(|e| NotificationError::Configuration(format!("Failed to build email: {e}")))
}

/// Map an SMTP reply code to a failure category.
///
/// ```
/// # use guildhack_recruit::providers::smtp::classify_reply_code;
/// # use guildhack_recruit::NotificationError;
/// assert!(matches!(
///     classify_reply_code("553", "sender not verified".into()),
///     NotificationError::SenderDomainUnverified(_)
/// ));
/// ```
#[must_use]
pub fn classify_reply_code(code: &str, detail: String) -> NotificationError {
    match code {
        "553" => NotificationError::SenderDomainUnverified(detail),
        "550" | "552" | "554" => NotificationError::MessageRejected(detail),
        "530" | "534" | "535" => NotificationError::Configuration(detail),
        _ => NotificationError::Transport(detail),
    }
}

fn classify(error: &lettre::transport::smtp::Error) -> NotificationError {
    let detail = error.to_string();
    match error.status() {
        Some(code) => classify_reply_code(&code.to_string(), detail),
        None if error.is_client() => NotificationError::Configuration(detail),
        None => NotificationError::Transport(detail),
    }
}

impl NotificationDispatcher for SmtpNotificationDispatcher {
    async fn send(&self, message: &MailInfo) -> Result<(), NotificationError> {
        let email = build_message(message)?;
        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || mailer.send(&email).map_err(|e| classify(&e)))
            .await
            .map_err(|e| NotificationError::Transport(format!("Email task failed: {e}")))?
            .map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mail() -> MailInfo {
        MailInfo {
            sender: "GuildHack<info@raityupiyo.dev>".to_string(),
            recipient: "member@example.com".to_string(),
            subject: "【GuildHack】参加完了の通知".to_string(),
            html_body: "<p>hello</p>".to_string(),
            text_body: "hello".to_string(),
            charset: "UTF-8".to_string(),
        }
    }

    #[test]
    fn sender_without_space_parses() {
        let mailbox = parse_sender("GuildHack<info@raityupiyo.dev>").unwrap();
        assert_eq!(mailbox.name.as_deref(), Some("GuildHack"));
        assert_eq!(mailbox.email.to_string(), "info@raityupiyo.dev");
        assert!(parse_sender("info@raityupiyo.dev").unwrap().name.is_none());
    }

    #[test]
    fn bad_sender_is_configuration() {
        let err = parse_sender("GuildHack<not an address>").unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn bad_recipient_is_rejected() {
        let mut info = mail();
        info.recipient = "nobody".to_string();
        assert_eq!(build_message(&info).unwrap_err().category(), "message_rejected");
    }

    #[test]
    fn message_builds_with_both_bodies() {
        let formatted = String::from_utf8(build_message(&mail()).unwrap().formatted()).unwrap();
        assert!(formatted.contains("multipart/alternative"));
        assert!(formatted.contains("text/plain"));
        assert!(formatted.contains("text/html"));
    }

    #[test]
    fn reply_codes_map_to_categories() {
        assert_eq!(classify_reply_code("554", String::new()).category(), "message_rejected");
        assert_eq!(classify_reply_code("535", String::new()).category(), "configuration");
        assert_eq!(classify_reply_code("421", String::new()).category(), "transport");
    }
}
