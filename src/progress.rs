//! Upload progress reporting.
//!
//! `qw upload` reports each file as it is sent so users see how much is
//! left. Progress is emitted on **stderr** so stdout remains parseable for
//! scripts.

use std::io::Write;

/// A single progress event for a multi-file upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadProgressEvent {
    /// File `n` of `total` (1-based) is being uploaded.
    Uploading { name: String, n: u64, total: u64 },
    /// The upload loop finished.
    Finished { uploaded: u64, failed: u64 },
}

/// Reports upload progress. Implementations write to stderr (human or JSON).
pub trait UploadProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the controller's upload loop.
    fn report(&self, event: UploadProgressEvent);
}

/// Human-friendly progress on stderr: "upload  3 / 10  report.pdf".
pub struct StderrProgress;

impl UploadProgressReporter for StderrProgress {
    fn report(&self, event: UploadProgressEvent) {
        let _ = std::io::stderr()
            .lock()
            .write_all(human_line(&event).as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

fn human_line(event: &UploadProgressEvent) -> String {
    match event {
        UploadProgressEvent::Uploading { name, n, total } => format!(
            "upload  {} / {}  {}\n",
            format_number(*n),
            format_number(*total),
            name
        ),
        UploadProgressEvent::Finished { uploaded, failed } => format!(
            "upload  done  {} uploaded, {} failed\n",
            format_number(*uploaded),
            format_number(*failed)
        ),
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl UploadProgressReporter for JsonProgress {
    fn report(&self, event: UploadProgressEvent) {
        if let Ok(line) = serde_json::to_string(&json_event(&event)) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

fn json_event(event: &UploadProgressEvent) -> serde_json::Value {
    match event {
        UploadProgressEvent::Uploading { name, n, total } => serde_json::json!({
            "event": "progress",
            "phase": "uploading",
            "file": name,
            "n": n,
            "total": total
        }),
        UploadProgressEvent::Finished { uploaded, failed } => serde_json::json!({
            "event": "progress",
            "phase": "finished",
            "uploaded": uploaded,
            "failed": failed
        }),
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl UploadProgressReporter for NoProgress {
    fn report(&self, _event: UploadProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn UploadProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
