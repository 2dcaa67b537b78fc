//! Result types returned by the report pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of a full notebook report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    /// Where the cleaned report was written.
    pub report_path: PathBuf,
    /// Title passed to the exporter.
    pub title: String,
    /// Kernel the notebook was executed with.
    pub kernel_name: String,
    pub stats: ReportStats,
}

/// Wall-clock timings and cleanup counts for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportStats {
    pub execute_duration_ms: u64,
    pub export_duration_ms: u64,
    pub clean_duration_ms: u64,
    pub total_duration_ms: u64,
    /// Cells in the executed notebook.
    pub cells: usize,
    /// Elements deleted by cleanup (prompts, text outputs).
    pub removed_elements: usize,
    /// Wrapper elements replaced by their children.
    pub unwrapped_elements: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_to_json() {
        let out = ReportOutput {
            report_path: PathBuf::from("/reports/sales.html"),
            title: "sales".into(),
            kernel_name: "python3".into(),
            stats: ReportStats {
                cells: 4,
                ..Default::default()
            },
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"report_path\":\"/reports/sales.html\""));
        assert!(json.contains("\"cells\":4"));
    }
}
