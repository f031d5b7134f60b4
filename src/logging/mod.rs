//! Wire transcript logging.
//!
//! Every inbound line is logged as `<< line`, every outbound line as
//! `>> line`, and connection status as `-- text`. Entries go to `tracing` and,
//! when enabled, to daily transcript files named `<host>_<date>.log` in the
//! configured log directory (default: `~/.local/share/crabbot/logs/`).

use crate::config::LoggingConfig;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

/// Sink for the wire transcript. The session writes to it but does not own
/// where the entries end up.
pub trait WireLog {
    fn inbound(&mut self, line: &str);
    /// `raw` is the outbound text as written, terminators included.
    fn outbound(&mut self, raw: &str);
    fn status(&mut self, text: &str);
}

impl<T: WireLog + ?Sized> WireLog for &mut T {
    fn inbound(&mut self, line: &str) {
        (**self).inbound(line);
    }

    fn outbound(&mut self, raw: &str) {
        (**self).outbound(raw);
    }

    fn status(&mut self, text: &str) {
        (**self).status(text);
    }
}

pub fn format_inbound(line: &str) -> String {
    format!("<< {}", line)
}

/// Every non-empty line of `raw` gets its own `>> ` marker.
pub fn format_outbound(raw: &str) -> String {
    let lines: Vec<&str> = raw.split("\r\n").filter(|l| !l.is_empty()).collect();
    format!(">> {}", lines.join("\r\n>> "))
}

pub fn format_status(text: &str) -> String {
    format!("-- {}", text)
}

/// Writes the transcript through `tracing` and, optionally, to disk.
///
/// File handles are cached for the lifetime of the logger. Filesystem
/// failures are reported with `warn!` and the entry is only traced.
pub struct TranscriptLogger {
    enabled: bool,
    log_dir: String,
    name: String,
    file_handles: HashMap<String, fs::File>,
}

impl TranscriptLogger {
    /// `name` identifies the connection in file names, usually the host.
    pub fn new(config: &LoggingConfig, name: &str) -> Self {
        Self {
            enabled: config.enabled,
            log_dir: config.log_dir.clone(),
            name: name.to_string(),
            file_handles: HashMap::new(),
        }
    }

    fn record(&mut self, entry: &str) {
        info!(target: "crabbot::wire", "{}", entry);
        if !self.enabled {
            return;
        }

        // Sanitize name for filename
        let safe_name: String = self
            .name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();

        let now = chrono::Local::now();
        let filename = format!("{}_{}.log", safe_name, now.format("%Y-%m-%d"));
        let log_dir = expand_home(&self.log_dir);
        let filepath = log_dir.join(&filename);

        if !self.file_handles.contains_key(&filename) {
            if let Err(e) = fs::create_dir_all(&log_dir) {
                warn!(path = %log_dir.display(), error = %e, "Cannot create log directory");
            }
            match OpenOptions::new().create(true).append(true).open(&filepath) {
                Ok(file) => {
                    self.file_handles.insert(filename.clone(), file);
                }
                Err(e) => {
                    warn!(path = %filepath.display(), error = %e, "Cannot open transcript file");
                    return;
                }
            }
        }

        if let Some(handle) = self.file_handles.get_mut(&filename) {
            if let Err(e) = writeln!(handle, "[{}] {}", now.format("%H:%M:%S"), entry) {
                warn!(file = %filename, error = %e, "Failed to write transcript entry");
            }
        }
    }
}

impl WireLog for TranscriptLogger {
    fn inbound(&mut self, line: &str) {
        self.record(&format_inbound(line));
    }

    fn outbound(&mut self, raw: &str) {
        self.record(&format_outbound(raw));
    }

    fn status(&mut self, text: &str) {
        self.record(&format_status(text));
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(dir: &str) -> PathBuf {
    match dir.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(dir),
        },
        None => PathBuf::from(dir),
    }
}

/// Collects formatted entries in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingLog {
    pub entries: Vec<String>,
}

#[cfg(test)]
impl WireLog for RecordingLog {
    fn inbound(&mut self, line: &str) {
        self.entries.push(format_inbound(line));
    }

    fn outbound(&mut self, raw: &str) {
        self.entries.push(format_outbound(raw));
    }

    fn status(&mut self, text: &str) {
        self.entries.push(format_status(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_outbound() {
        assert_eq!(format_outbound("NICK nick\r\n"), ">> NICK nick");
        assert_eq!(
            format_outbound(":prefix CMD params\r\nfollowup\r\n"),
            ">> :prefix CMD params\r\n>> followup"
        );
    }

    #[test]
    fn test_format_inbound_and_status() {
        assert_eq!(format_inbound("PING :x"), "<< PING :x");
        assert_eq!(format_status("Exiting"), "-- Exiting");
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/var/log/bot"), PathBuf::from("/var/log/bot"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/logs"), home.join("logs"));
        }
    }

    #[test]
    fn test_transcript_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            enabled: true,
            log_dir: dir.path().to_string_lossy().into_owned(),
        };
        let mut logger = TranscriptLogger::new(&config, "irc.example.org");
        logger.status("Connected to irc.example.org:6667");
        logger.inbound("PING :x");
        logger.outbound("PONG :x\r\n");

        let date = chrono::Local::now().format("%Y-%m-%d");
        let path = dir.path().join(format!("irc.example.org_{}.log", date));
        let contents = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("] -- Connected to irc.example.org:6667"));
        assert!(lines[1].ends_with("] << PING :x"));
        assert!(lines[2].ends_with("] >> PONG :x"));
    }

    #[test]
    fn test_disabled_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            enabled: false,
            log_dir: dir.path().to_string_lossy().into_owned(),
        };
        let mut logger = TranscriptLogger::new(&config, "host");
        logger.inbound("PING :x");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    // A log directory that cannot be created must not take the bot down.
    #[test]
    fn test_unwritable_log_dir_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let config = LoggingConfig {
            enabled: true,
            log_dir: blocker.join("logs").to_string_lossy().into_owned(),
        };
        let mut logger = TranscriptLogger::new(&config, "host");
        logger.inbound("PING :x");
        logger.outbound("PONG :x\r\n");

        assert!(logger.file_handles.is_empty());
        assert!(fs::metadata(&blocker).unwrap().is_file());
    }
}
