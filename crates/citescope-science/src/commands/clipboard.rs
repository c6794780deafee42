use citescope_core::CitationResult;

use crate::error::Result;

pub const COPIED_LABEL: &str = "Copied!";

/// Write-only system clipboard.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Copies a rendered citation.
///
/// Returns the label the copy button should show afterwards, or `None`
/// when the result has no copy control (error and status messages).
pub fn copy_citation(
    result: &CitationResult,
    sink: &mut dyn ClipboardSink,
) -> Result<Option<&'static str>> {
    if !result.copy_visible {
        return Ok(None);
    }
    sink.write_text(&result.text)?;
    Ok(Some(COPIED_LABEL))
}
