// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Failures a probe can raise without producing a classified symptom.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// `lsof` timed out, was missing, or produced unparseable output. The
    /// state machine only treats this as fatal when a repair explicitly
    /// requires killing holders.
    #[error("file-handle inspector unavailable: {0}")]
    InspectorUnavailable(String),
}
