//! System gate: the two operator flag files.
//!
//! `estado.json` carries `{ "activo": bool }` and can take the whole
//! application offline; the maintenance sentinel (`ON` after trimming)
//! blocks only the inventory views. Both files are re-read on every
//! request so an operator can flip them without a redeploy. Unreadable
//! or malformed files fall back to "active / not in maintenance".

use std::fs;
use std::path::Path;

use log::warn;
use serde::Deserialize;

pub const MAINTENANCE_SENTINEL: &str = "ON";

/// Snapshot of both flags, taken at request time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemGate {
    pub active: bool,
    pub maintenance: bool,
}

#[derive(Debug, Deserialize)]
struct EstadoFile {
    #[serde(default = "default_activo")]
    activo: bool,
}

fn default_activo() -> bool {
    true
}

impl SystemGate {
    pub fn load(estado_path: &Path, maintenance_path: &Path) -> Self {
        Self {
            active: read_active(estado_path),
            maintenance: read_maintenance(maintenance_path),
        }
    }
}

/// Missing file means nobody paused the system; a malformed file is
/// reported but treated the same way.
fn read_active(path: &Path) -> bool {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return true,
    };
    match serde_json::from_str::<EstadoFile>(&raw) {
        Ok(estado) => estado.activo,
        Err(err) => {
            warn!("estado file {} malformed, assuming active: {}", path.display(), err);
            true
        }
    }
}

fn read_maintenance(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|raw| raw.trim() == MAINTENANCE_SENTINEL)
        .unwrap_or(false)
}
