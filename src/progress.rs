//! Progress-callback trait for notebook report stages.
//!
//! Inject an [`Arc<dyn ReportProgressCallback>`] via
//! [`crate::config::ReportConfigBuilder::progress_callback`] to be told when
//! each stage of the report pipeline starts and finishes. Execution can take
//! minutes for heavy notebooks, so front-ends use this to show which stage
//! is running.
//!
//! # Example
//!
//! ```rust
//! use docreport::{ReportConfig, ReportProgressCallback, ReportStage};
//! use std::sync::Arc;
//!
//! struct Logger;
//!
//! impl ReportProgressCallback for Logger {
//!     fn on_stage_complete(&self, stage: ReportStage, elapsed_ms: u64) {
//!         eprintln!("{stage} done in {elapsed_ms}ms");
//!     }
//! }
//!
//! let config = ReportConfig::builder()
//!     .progress_callback(Arc::new(Logger))
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// The stages of a notebook report run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStage {
    Execute,
    Export,
    Clean,
}

impl fmt::Display for ReportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportStage::Execute => "execute",
            ReportStage::Export => "export",
            ReportStage::Clean => "clean",
        })
    }
}

/// Called by [`crate::report::NotebookReport`] around each stage.
///
/// All methods default to no-ops so implementors override only what they use.
pub trait ReportProgressCallback: Send + Sync {
    /// Called just before `stage` begins.
    fn on_stage_start(&self, stage: ReportStage) {
        let _ = stage;
    }

    /// Called when `stage` succeeded.
    fn on_stage_complete(&self, stage: ReportStage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called when `stage` failed; the error is also returned to the caller.
    fn on_stage_error(&self, stage: ReportStage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once the cleaned report is on disk.
    fn on_report_complete(&self, report_path: &Path) {
        let _ = report_path;
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl ReportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReportConfig`].
pub type ProgressCallback = Arc<dyn ReportProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ReportProgressCallback for Recorder {
        fn on_stage_start(&self, stage: ReportStage) {
            self.events.lock().unwrap().push(format!("start {stage}"));
        }

        fn on_stage_error(&self, stage: ReportStage, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error {stage}: {error}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(ReportStage::Execute);
        cb.on_stage_complete(ReportStage::Execute, 12);
        cb.on_stage_error(ReportStage::Export, "boom");
        cb.on_report_complete(Path::new("/reports/a.html"));
    }

    #[test]
    fn overridden_methods_receive_events() {
        let rec = Recorder::default();
        rec.on_stage_start(ReportStage::Clean);
        rec.on_stage_complete(ReportStage::Clean, 3);
        rec.on_stage_error(ReportStage::Export, "missing");
        assert_eq!(
            *rec.events.lock().unwrap(),
            vec!["start clean".to_string(), "error export: missing".to_string()]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_stage_start(ReportStage::Export);
    }
}
