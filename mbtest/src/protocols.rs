//! Lookup of out-of-process protocols.
//!
//! The server reports its working directory and the (relative) name of its
//! protocol file through `GET /config`. A protocol file maps protocol names to
//! the settings of the helper process implementing them. No file means no
//! out-of-process protocols are configured.

use crate::errors::MbResult;
use log::debug;
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub type ProtocolRegistry = Map<String, Value>;

/// `<process.cwd>/<options.protofile>` from a `GET /config` body, joined as is.
/// Returns `None` when either field is missing or not a string.
pub fn protofile_path(config: &Value) -> Option<PathBuf> {
    let cwd = config.pointer("/process/cwd")?.as_str()?;
    let protofile = config.pointer("/options/protofile")?.as_str()?;
    Some(PathBuf::from(format!("{}/{}", cwd, protofile)))
}

/// Reads the protocol file, `Ok(None)` if there is none.
pub fn read_protocols(path: &Path) -> MbResult<Option<ProtocolRegistry>> {
    if !path.exists() {
        debug!("No protocol file at {:?}", path);
        return Ok(None);
    }

    let content = fs::read(path)?;
    let protocols: ProtocolRegistry = serde_json::from_slice(&content)?;
    debug!(
        "Protocol file {:?} lists {:?}",
        path,
        protocols.keys().collect::<Vec<_>>()
    );
    Ok(Some(protocols))
}

pub fn is_registered(path: &Path, protocol: &str) -> MbResult<bool> {
    let registered = read_protocols(path)?
        .map(|protocols| protocols.contains_key(protocol))
        .unwrap_or_default();
    Ok(registered)
}
