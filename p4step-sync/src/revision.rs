//! Revision extraction from `p4 changes -m1 #have` output.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::SyncError;

// `p4 changes` truncates long descriptions, so the closing quote is optional.
static CHANGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Change (\S+) on .+? by \S+@\S+ '.*$").expect("change line pattern is valid")
});

/// The revision a workspace was synced to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionInfo {
    /// Changelist identifier, verbatim. Treat as opaque.
    pub revision: String,
    /// The output line it was read from.
    pub line: String,
}

/// Return the revision from the first matching changelist line in `stdout`.
pub fn extract_revision(stdout: &str) -> Result<RevisionInfo, SyncError> {
    stdout
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .find_map(|line| {
            CHANGE_LINE.captures(line).map(|caps| RevisionInfo {
                revision: caps[1].to_string(),
                line: line.to_string(),
            })
        })
        .ok_or_else(|| SyncError::Parse {
            output: stdout.to_string(),
        })
}
