// SPDX-License-Identifier: MIT
//! Empty library target so this package can be used as a path dependency
//! (e.g. by the workspace-level end-to-end tests) — see the `[[bin]]`
//! target above for the actual `dcrpm` binary.
