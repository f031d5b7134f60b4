//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a default so the bot runs without a config file.

use serde::{Deserialize, Serialize};

use super::nickname::generate_nickname;
use crate::error::ConfigError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ConnectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()
    }
}

/// Where to connect and who to be once connected. Read-only after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Hostname or IP address of the IRC server.
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub tls: bool,
    #[serde(default = "default_nickname")]
    pub nickname: String,
    /// The single channel joined after registration.
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls: true,
            nickname: default_nickname(),
            channel: default_channel(),
            accept_invalid_certs: false,
        }
    }
}

impl ConnectionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if !is_token(&self.nickname) {
            return Err(ConfigError::InvalidNickname(self.nickname.clone()));
        }
        if !is_token(&self.channel) {
            return Err(ConfigError::InvalidChannel(self.channel.clone()));
        }
        Ok(())
    }

    /// `host:port`, as used in status lines and for connecting.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Non-empty, with nothing that would split or terminate a protocol line.
fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.starts_with(':') && !s.chars().any(|c| c.is_whitespace() || c == '\0')
}

/// Wire transcript settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also append the transcript to daily files on disk.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
        }
    }
}

fn default_host() -> String {
    "irc.esper.net".to_string()
}
fn default_port() -> u16 {
    6697
}
fn default_true() -> bool {
    true
}
fn default_nickname() -> String {
    generate_nickname()
}
fn default_channel() -> String {
    "#channel".to_string()
}
fn default_log_dir() -> String {
    "~/.local/share/crabbot/logs".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.host, "irc.esper.net");
        assert_eq!(cfg.server.port, 6697);
        assert!(cfg.server.tls);
        assert_eq!(cfg.server.channel, "#channel");
        assert!(!cfg.server.accept_invalid_certs);
        assert!(!cfg.logging.enabled);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let cfg: AppConfig = toml::from_str(
            r##"
            [server]
            host = "irc.example.org"
            port = 6667
            tls = false
            nickname = "nick"
            "##,
        )
        .unwrap();
        assert_eq!(cfg.server.address(), "irc.example.org:6667");
        assert!(!cfg.server.tls);
        assert_eq!(cfg.server.nickname, "nick");
        assert_eq!(cfg.server.channel, "#channel");
        assert_eq!(cfg.logging.log_dir, "~/.local/share/crabbot/logs");
    }

    #[test]
    fn test_validate_rejects_bad_identity() {
        let mut cfg = ConnectionConfig {
            nickname: "two words".into(),
            ..ConnectionConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidNickname(_))));

        cfg.nickname = "nick".into();
        cfg.channel = String::new();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidChannel(_))));

        cfg.channel = "#chan\r\nQUIT".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidChannel(_))));

        cfg.channel = "#chan".into();
        cfg.port = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidPort)));

        cfg.port = 6667;
        cfg.host = " ".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyHost)));
    }
}
