//! Recruit board configuration.
//!
//! Library code takes the structs below; only the binary reads the process
//! environment, through [`AppConfig::from_env`].

use crate::state::RecruitId;
use std::env;
use std::time::Duration;

/// Board-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Public host serving the board pages (no scheme).
    pub host: String,

    /// Counter key used to number recruits.
    ///
    /// Default: `Recruits`
    pub sequence_name: String,

    /// Fixed offset used for `created`/`updated`.
    ///
    /// Default: `+9`
    pub utc_offset_hours: i32,
}

impl BoardConfig {
    /// Create board configuration for a host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Set the public host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the counter key.
    #[must_use]
    pub fn with_sequence_name(mut self, name: impl Into<String>) -> Self {
        self.sequence_name = name.into();
        self
    }

    /// Set the timestamp offset.
    #[must_use]
    pub const fn with_utc_offset_hours(mut self, hours: i32) -> Self {
        self.utc_offset_hours = hours;
        self
    }

    /// Public page of one board.
    ///
    /// ```
    /// # use guildhack_recruit::{BoardConfig, RecruitId};
    /// let board = BoardConfig::new("raityupiyo.dev");
    /// assert_eq!(board.board_url(RecruitId(12)), "https://raityupiyo.dev/quest_bord/12");
    /// ```
    #[must_use]
    pub fn board_url(&self, id: RecruitId) -> String {
        format!("https://{}/quest_bord/{id}", self.host)
    }

    /// Site root.
    #[must_use]
    pub fn site_url(&self) -> String {
        format!("https://{}", self.host)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            host: "raityupiyo.dev".to_string(),
            sequence_name: "Recruits".to_string(),
            utc_offset_hours: 9,
        }
    }
}

/// Outgoing mail identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    /// Display name of the sender.
    pub sender_name: String,

    /// Sender address (must be verified with the transport).
    pub sender_address: String,

    /// Character set announced for both bodies.
    pub charset: String,

    /// Address printed in the footer for support requests.
    pub support_address: String,
}

impl MailConfig {
    /// Create mail configuration.
    #[must_use]
    pub fn new(sender_name: impl Into<String>, sender_address: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            sender_address: sender_address.into(),
            ..Self::default()
        }
    }

    /// Set the character set.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Set the support address.
    #[must_use]
    pub fn with_support_address(mut self, address: impl Into<String>) -> Self {
        self.support_address = address.into();
        self
    }

    /// Sender header value, `Name<address>`.
    ///
    /// ```
    /// # use guildhack_recruit::MailConfig;
    /// assert_eq!(MailConfig::default().sender(), "GuildHack<info@raityupiyo.dev>");
    /// ```
    #[must_use]
    pub fn sender(&self) -> String {
        format!("{}<{}>", self.sender_name, self.sender_address)
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender_name: "GuildHack".to_string(),
            sender_address: "info@raityupiyo.dev".to_string(),
            charset: "UTF-8".to_string(),
            support_address: "support@raityupiyo.dev".to_string(),
        }
    }
}

/// SMTP relay settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    /// Relay host.
    pub server: String,
    /// Relay port.
    pub port: u16,
    /// Login.
    pub username: String,
    /// Password.
    pub password: String,
}

/// `PostgreSQL` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection URL.
    pub url: String,
    /// Pool size.
    pub max_connections: u32,
}

/// Everything the binary needs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Board settings.
    pub board: BoardConfig,
    /// Mail identity.
    pub mail: MailConfig,
    /// SMTP relay; `None` logs mail to the console instead.
    pub smtp: Option<SmtpConfig>,
    /// Database; `None` keeps records in memory.
    pub database: Option<DatabaseConfig>,
    /// How long a request waits for its workflow to finish.
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to defaults. SMTP is enabled
    /// when `SMTP_SERVER` is set, the database when `DATABASE_URL` is set.
    #[must_use]
    pub fn from_env() -> Self {
        let board_defaults = BoardConfig::default();
        let mail_defaults = MailConfig::default();

        Self {
            board: BoardConfig {
                host: env::var("BOARD_HOST").unwrap_or(board_defaults.host),
                sequence_name: env::var("BOARD_SEQUENCE_NAME")
                    .unwrap_or(board_defaults.sequence_name),
                utc_offset_hours: env::var("BOARD_UTC_OFFSET_HOURS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(board_defaults.utc_offset_hours),
            },
            mail: MailConfig {
                sender_name: env::var("MAIL_SENDER_NAME").unwrap_or(mail_defaults.sender_name),
                sender_address: env::var("MAIL_SENDER_ADDRESS")
                    .unwrap_or(mail_defaults.sender_address),
                charset: env::var("MAIL_CHARSET").unwrap_or(mail_defaults.charset),
                support_address: env::var("MAIL_SUPPORT_ADDRESS")
                    .unwrap_or(mail_defaults.support_address),
            },
            smtp: env::var("SMTP_SERVER").ok().map(|server| SmtpConfig {
                server,
                port: env::var("SMTP_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(587),
                username: env::var("SMTP_USERNAME").unwrap_or_default(),
                password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            }),
            database: env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
                url,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            }),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            mail: MailConfig::default(),
            smtp: None,
            database: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let board = BoardConfig::new("staging.example")
            .with_sequence_name("StagingRecruits")
            .with_utc_offset_hours(0);
        assert_eq!(board.board_url(RecruitId(3)), "https://staging.example/quest_bord/3");
        assert_eq!(board.site_url(), "https://staging.example");
        assert_eq!(board.sequence_name, "StagingRecruits");

        let mail = MailConfig::new("Ops", "ops@example.com").with_charset("ISO-2022-JP");
        assert_eq!(mail.sender(), "Ops<ops@example.com>");
        assert_eq!(mail.charset, "ISO-2022-JP");
        assert_eq!(mail.support_address, "support@raityupiyo.dev");
    }

    #[test]
    fn defaults_match_production_board() {
        let config = AppConfig::default();
        assert_eq!(config.board.host, "raityupiyo.dev");
        assert_eq!(config.board.sequence_name, "Recruits");
        assert_eq!(config.board.utc_offset_hours, 9);
        assert!(config.smtp.is_none());
    }
}
