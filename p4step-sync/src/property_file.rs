//! Property file — JSON persistence for build properties between runs.
//!
//! Structured form, as written by [`save_at`]:
//!
//! ```json
//! { "updated_at": "2024-01-01T00:00:00Z",
//!   "properties": { "got_revision": { "value": "100", "source": "P4" } } }
//! ```
//!
//! A flat `{ "builddir": "/home/user/workspace" }` map is also accepted so
//! property files can be written by hand; its entries get source `file`.
//! Writes use a `.tmp` sibling + rename.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use p4step_core::{Properties, PropertyStore};

use crate::error::{io_err, SyncError};

/// Source recorded for entries read from a flat property file.
pub const FILE_SOURCE: &str = "file";

/// On-disk property file payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertyFile {
    pub updated_at: DateTime<Utc>,
    pub properties: Properties,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PropertyFileCompat {
    Structured(PropertyFileStructuredCompat),
    Flat(BTreeMap<String, String>),
}

#[derive(Debug, Deserialize)]
struct PropertyFileStructuredCompat {
    pub updated_at: Option<DateTime<Utc>>,
    pub properties: Properties,
}

/// Load the property file at `path`.
///
/// Returns an empty set if the file does not yet exist.
pub fn load_at(path: &Path) -> Result<PropertyFile, SyncError> {
    if !path.exists() {
        return Ok(PropertyFile {
            updated_at: Utc::now(),
            properties: Properties::new(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    match serde_json::from_str::<PropertyFileCompat>(&contents)? {
        PropertyFileCompat::Structured(file) => Ok(PropertyFile {
            updated_at: file.updated_at.unwrap_or_else(Utc::now),
            properties: file.properties,
        }),
        PropertyFileCompat::Flat(values) => {
            let mut properties = Properties::new();
            for (key, value) in values {
                properties.set(&key, value, FILE_SOURCE);
            }
            Ok(PropertyFile {
                updated_at: Utc::now(),
                properties,
            })
        }
    }
}

/// Save `properties` to `path` atomically, stamping `updated_at` with now.
pub fn save_at(path: &Path, properties: &Properties) -> Result<(), SyncError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }

    let file = PropertyFile {
        updated_at: Utc::now(),
        properties: properties.clone(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}
