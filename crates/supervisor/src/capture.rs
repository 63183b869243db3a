// SPDX-License-Identifier: MIT

//! Bounded stdout/stderr capture, shared by every stream the supervisor drains.

use dcrpm_core::{MAX_CAPTURED_BYTES, TRUNCATION_MARKER};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Reads `reader` to completion (or until the child closes the pipe),
/// keeping at most [`MAX_CAPTURED_BYTES`] of it. Never buffers the whole
/// stream unbounded — a chatty subprocess must not be able to exhaust
/// memory on its own.
pub async fn drain_bounded<R: AsyncRead + Unpin>(mut reader: R) -> (Vec<u8>, bool) {
    let mut buf = Vec::new();
    let mut truncated = false;
    let mut chunk = [0u8; 8192];

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if buf.len() + n > MAX_CAPTURED_BYTES {
                    let remaining = MAX_CAPTURED_BYTES.saturating_sub(buf.len());
                    buf.extend_from_slice(&chunk[..remaining.min(n)]);
                    truncated = true;
                    // Keep reading and discarding so the child never blocks on a full pipe.
                    let mut sink = [0u8; 8192];
                    while reader.read(&mut sink).await.unwrap_or(0) > 0 {}
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            Err(_) => break,
        }
    }

    if truncated {
        buf.extend_from_slice(TRUNCATION_MARKER);
    }
    (buf, truncated)
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
