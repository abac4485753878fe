//! Movement log.
//!
//! Append-only CSV journal of stock changes. The header row is written
//! once, when the file is first created; rows are never updated or
//! deleted individually — the only way to clear the journal is
//! [`MovementLog::truncate`], which removes the file.

use std::fs::OpenOptions;
use std::path::PathBuf;

use chrono::Local;
use csv::{ReaderBuilder, WriterBuilder};
use log::info;

use crate::error::StoreError;

/// Canonical column order of the journal
pub const MOVEMENT_HEADER: [&str; 6] = ["Fecha", "Empleado", "Inventario", "Pieza", "Cantidad", "Accion"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementAction {
    /// Stock increase
    Entrada,
    /// Stock decrease
    Salida,
}

impl MovementAction {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementAction::Entrada => "ENTRADA",
            MovementAction::Salida => "SALIDA",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ENTRADA" => Some(MovementAction::Entrada),
            "SALIDA" => Some(MovementAction::Salida),
            _ => None,
        }
    }
}

/// One journal row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    /// Local wall clock at append time, second resolution
    pub timestamp: String,
    pub actor: String,
    pub inventory_file: String,
    pub part_number: String,
    pub quantity: i64,
    pub action: MovementAction,
}

pub struct MovementLog {
    path: PathBuf,
}

impl MovementLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Append one movement, creating the file (and its header) on first use
    pub fn append(
        &self,
        actor: &str,
        inventory_file: &str,
        part_number: &str,
        quantity: i64,
        action: MovementAction,
    ) -> Result<(), StoreError> {
        let is_new = !self.path.exists();
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            writer.write_record(MOVEMENT_HEADER)?;
        }
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let qty = quantity.to_string();
        writer.write_record([
            timestamp.as_str(),
            actor,
            inventory_file,
            part_number,
            qty.as_str(),
            action.as_str(),
        ])?;
        writer.flush()?;
        info!(
            "{} {} x{} en {} por {}",
            action.as_str(),
            part_number,
            quantity,
            inventory_file,
            actor
        );
        Ok(())
    }

    /// Every journal row, oldest first. A missing file is an empty journal.
    pub fn read_all(&self) -> Result<Vec<Movement>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(&self.path)?;
        let mut movements = Vec::new();
        for result in reader.records() {
            let record = result?;
            let field = |i: usize| record.get(i).unwrap_or("").to_string();
            let raw_qty = field(4);
            let quantity = raw_qty.parse::<i64>().map_err(|_| StoreError::Corrupt {
                file: self.path.display().to_string(),
                detail: format!("cantidad ilegible '{}'", raw_qty),
            })?;
            let raw_action = field(5);
            let action = MovementAction::parse(&raw_action).ok_or_else(|| StoreError::Corrupt {
                file: self.path.display().to_string(),
                detail: format!("acción desconocida '{}'", raw_action),
            })?;
            movements.push(Movement {
                timestamp: field(0),
                actor: field(1),
                inventory_file: field(2),
                part_number: field(3),
                quantity,
                action,
            });
        }
        Ok(movements)
    }

    /// Delete the journal file entirely. The next append recreates the header.
    pub fn truncate(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            info!("registro de movimientos borrado");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn log(dir: &tempfile::TempDir) -> MovementLog {
        MovementLog::new(dir.path().join("movimientos.csv"))
    }

    #[test]
    fn append_writes_header_exactly_once() {
        let dir = tempdir().unwrap();
        let log = log(&dir);

        log.append("ana", "inventario_a.csv", "100", 3, MovementAction::Salida).unwrap();
        log.append("luis", "inventario_a.csv", "100", 1, MovementAction::Entrada).unwrap();

        let raw = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Fecha,Empleado,Inventario,Pieza,Cantidad,Accion");
        assert!(lines[1].ends_with("ana,inventario_a.csv,100,3,SALIDA"));
        assert!(lines[2].ends_with("luis,inventario_a.csv,100,1,ENTRADA"));
    }

    #[test]
    fn read_all_preserves_order_and_fields() {
        let dir = tempdir().unwrap();
        let log = log(&dir);

        log.append("ana", "inventario_a.csv", "100", 3, MovementAction::Salida).unwrap();
        log.append("ana", "inventario_a.csv", "200", 2, MovementAction::Entrada).unwrap();

        let movements = log.read_all().unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].part_number, "100");
        assert_eq!(movements[0].quantity, 3);
        assert_eq!(movements[0].action, MovementAction::Salida);
        assert_eq!(movements[1].action, MovementAction::Entrada);
        // Second-resolution local timestamp, e.g. 2026-08-06 14:03:59
        assert_eq!(movements[0].timestamp.len(), 19);
    }

    #[test]
    fn truncate_removes_everything_and_append_recreates_header() {
        let dir = tempdir().unwrap();
        let log = log(&dir);

        log.append("ana", "inventario_a.csv", "100", 3, MovementAction::Salida).unwrap();
        log.truncate().unwrap();
        assert!(!log.path().exists());
        assert!(log.read_all().unwrap().is_empty());

        log.append("eva", "inventario_b.csv", "7", 1, MovementAction::Entrada).unwrap();
        let raw = std::fs::read_to_string(log.path()).unwrap();
        assert!(raw.starts_with("Fecha,Empleado,Inventario,Pieza,Cantidad,Accion"));
        assert_eq!(raw.lines().count(), 2);
    }

    #[test]
    fn truncating_a_missing_log_is_fine() {
        let dir = tempdir().unwrap();
        log(&dir).truncate().unwrap();
    }

    #[test]
    fn unknown_action_is_corrupt() {
        let dir = tempdir().unwrap();
        let log = log(&dir);
        std::fs::write(
            log.path(),
            "Fecha,Empleado,Inventario,Pieza,Cantidad,Accion\n2026-01-01 10:00:00,ana,inv.csv,1,2,ROBO\n",
        )
        .unwrap();
        assert!(matches!(log.read_all(), Err(StoreError::Corrupt { .. })));
    }
}
