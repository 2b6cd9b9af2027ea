//! YAML step files.
//!
//! A step file holds one [`RawStepConfig`]:
//!
//! ```yaml
//! name: P4
//! port: localhost:12000
//! user: user
//! password: pass
//! client: p4_client1
//! mode: incremental
//! base: //depot
//! branch: trunk
//! extra_views:
//!   - ["-//depot/trunk/test", test]
//! workdir: wkdir
//! ```
//!
//! Every loader has an `_at(path)` form; there is no implicit default location.

use std::path::Path;

use crate::error::LoadError;
use crate::types::{RawStepConfig, StepConfig};

/// Parse a step file without validating it.
pub fn load_raw_at(path: &Path) -> Result<RawStepConfig, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse and validate a step file.
pub fn load_at(path: &Path) -> Result<StepConfig, LoadError> {
    let raw = load_raw_at(path)?;
    StepConfig::new(raw).map_err(|source| LoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a step file. Writes a `.tmp` sibling and renames it into place.
pub fn save_raw_at(path: &Path, raw: &RawStepConfig) -> Result<(), LoadError> {
    let io = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let yaml = serde_yaml::to_string(raw).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io)?;
    }
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(io)?;
    std::fs::rename(&tmp, path).map_err(io)?;
    Ok(())
}
