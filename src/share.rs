//! Sharing a tip list.
//!
//! Tips are rendered into one text blob with a header and handed to a
//! primary [`ShareSink`]. When there is no primary sink, or it fails, the
//! same text goes to the fallback sink. Failures are logged and reported
//! through [`ShareOutcome`], never raised.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

pub const SHARE_HEADER: &str = "Health Tips from Virtual Health Buddy:";

/// Render tips for sharing: header, blank line, tips separated by blank lines.
pub fn format_for_sharing(tips: &[String]) -> String {
    format!("{}\n\n{}", SHARE_HEADER, tips.join("\n\n"))
}

/// A destination for shared text.
pub trait ShareSink {
    fn name(&self) -> String;
    fn deliver(&self, text: &str) -> Result<()>;
}

/// Writes the text to a file, replacing any previous content.
pub struct FileSink {
    pub path: PathBuf,
}

impl ShareSink for FileSink {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn deliver(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, text)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

/// Prints the text on stdout.
pub struct StdoutSink;

impl ShareSink for StdoutSink {
    fn name(&self) -> String {
        "stdout".to_string()
    }

    fn deliver(&self, text: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", text)?;
        out.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The primary sink accepted the text.
    Shared { sink: String },
    /// The fallback sink accepted the text.
    Copied { sink: String },
    /// Neither sink accepted the text.
    Failed,
}

impl ShareOutcome {
    /// User-facing confirmation or failure line.
    pub fn message(&self) -> String {
        match self {
            ShareOutcome::Shared { sink } => format!("Health tips shared to {}", sink),
            ShareOutcome::Copied { sink } => format!("Health tips copied to {}", sink),
            ShareOutcome::Failed => "Failed to share health tips".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ShareOutcome::Failed)
    }
}

/// Deliver `text` to `primary`, falling back to `fallback`.
pub fn share(text: &str, primary: Option<&dyn ShareSink>, fallback: &dyn ShareSink) -> ShareOutcome {
    if let Some(sink) = primary {
        match sink.deliver(text) {
            Ok(()) => return ShareOutcome::Shared { sink: sink.name() },
            Err(e) => {
                tracing::warn!(sink = %sink.name(), error = %e, "share failed; falling back");
            }
        }
    }

    match fallback.deliver(text) {
        Ok(()) => ShareOutcome::Copied {
            sink: fallback.name(),
        },
        Err(e) => {
            tracing::warn!(sink = %fallback.name(), error = %e, "fallback share failed");
            ShareOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct Recorder {
        fail: bool,
        seen: RefCell<Vec<String>>,
    }

    impl Recorder {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ShareSink for Recorder {
        fn name(&self) -> String {
            "recorder".into()
        }
        fn deliver(&self, text: &str) -> Result<()> {
            if self.fail {
                anyhow::bail!("share sheet dismissed");
            }
            self.seen.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_format_for_sharing() {
        let text = format_for_sharing(&["Rest.".to_string(), "Drink water.".to_string()]);
        assert_eq!(
            text,
            "Health Tips from Virtual Health Buddy:\n\nRest.\n\nDrink water."
        );
    }

    #[test]
    fn test_primary_success() {
        let primary = Recorder::new(false);
        let fallback = Recorder::new(false);
        let outcome = share("hello", Some(&primary), &fallback);
        assert_eq!(outcome, ShareOutcome::Shared { sink: "recorder".into() });
        assert_eq!(primary.seen.borrow().len(), 1);
        assert!(fallback.seen.borrow().is_empty());
    }

    #[test]
    fn test_falls_back_when_primary_fails() {
        let primary = Recorder::new(true);
        let fallback = Recorder::new(false);
        let outcome = share("hello", Some(&primary), &fallback);
        assert!(matches!(outcome, ShareOutcome::Copied { .. }));
        assert_eq!(fallback.seen.borrow().as_slice(), ["hello".to_string()]);
    }

    #[test]
    fn test_falls_back_without_primary() {
        let fallback = Recorder::new(false);
        let outcome = share("hello", None, &fallback);
        assert!(outcome.message().contains("copied"));
    }

    #[test]
    fn test_both_fail() {
        let outcome = share("hello", Some(&Recorder::new(true)), &Recorder::new(true));
        assert_eq!(outcome, ShareOutcome::Failed);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_file_sink_writes_text() {
        let tmp = TempDir::new().unwrap();
        let sink = FileSink {
            path: tmp.path().join("out").join("tips.txt"),
        };
        sink.deliver("abc").unwrap();
        assert_eq!(std::fs::read_to_string(&sink.path).unwrap(), "abc");
    }
}
