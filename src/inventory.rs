//! Inventory store.
//!
//! Each inventory is one CSV file named `inventario*.csv` inside the data
//! directory, with the columns `Numero de pieza, Nombre, Cantidad, Estado`.
//! `Estado` is derived: it is recomputed from the quantity on every save,
//! so whatever a hand edit left there is overwritten.
//!
//! Saving always rewrites the whole file. There is no merge or row-level
//! update, so the last writer wins when two requests race on one file.

use std::cmp::Ordering;
use std::fs;
use std::path::PathBuf;

use csv::{ReaderBuilder, WriterBuilder};
use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::StoreError;

/// Canonical column order of an inventory file
pub const INVENTORY_HEADER: [&str; 4] = ["Numero de pieza", "Nombre", "Cantidad", "Estado"];

pub const STATUS_OK: &str = "OK";
pub const STATUS_OUT_OF_STOCK: &str = "OUT_OF_STOCK";

/// Filename convention for inventory files. The character class keeps
/// path separators out, so a form value can never escape the data dir.
static INVENTORY_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^inventario[A-Za-z0-9_.\- ]*\.csv$").expect("inventory filename regex"));

/// One part row, keyed externally by its part number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub quantity: i64,
}

impl Part {
    /// Derived stock status, recomputed on every save
    pub fn status(&self) -> &'static str {
        if self.quantity > 0 {
            STATUS_OK
        } else {
            STATUS_OUT_OF_STOCK
        }
    }
}

/// Ordered mapping of part number to part, in display order
pub type PartMap = IndexMap<String, Part>;

/// Integer part numbers sort first, numerically; everything else sorts
/// after them, lexicographically.
pub fn compare_part_numbers(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

pub struct InventoryStore {
    data_dir: PathBuf,
}

impl InventoryStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Whether `name` is a well-formed inventory filename
    pub fn is_inventory_name(name: &str) -> bool {
        INVENTORY_FILE_RE.is_match(name)
    }

    pub fn path_of(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// List the inventory files in the data directory, sorted by name
    pub fn list_files(&self) -> Result<Vec<String>, StoreError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = match name.to_str() {
                Some(name) => name,
                None => continue,
            };
            if INVENTORY_FILE_RE.is_match(name) {
                files.push(name.to_string());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Create an empty inventory file from a form name.
    ///
    /// The name is normalized to `inventario_<nombre>.csv` unless it already
    /// follows the convention. Returns the filename actually created.
    pub fn create(&self, display_name: &str) -> Result<String, StoreError> {
        let trimmed = display_name.trim();
        if trimmed.is_empty() {
            return Err(StoreError::Validation("El nombre del inventario está vacío".to_string()));
        }
        let file = if Self::is_inventory_name(trimmed) {
            trimmed.to_string()
        } else {
            let slug = trimmed.replace(char::is_whitespace, "_");
            format!("inventario_{}.csv", slug)
        };
        if !Self::is_inventory_name(&file) {
            return Err(StoreError::Validation(format!(
                "Nombre de inventario inválido: '{}'",
                trimmed
            )));
        }
        let path = self.path_of(&file);
        if path.exists() {
            return Err(StoreError::Validation(format!("El inventario '{}' ya existe", file)));
        }
        self.save(&file, &PartMap::new())?;
        debug!("created inventory {}", file);
        Ok(file)
    }

    /// Load one inventory file into an ordered part map.
    ///
    /// The header must carry the part-number, name and quantity columns;
    /// anything else in the header (like `Estado`) is ignored, since it is
    /// derived again on save. Rows come back sorted numeric-first.
    ///
    /// # Errors
    ///
    /// `NotFound` if the file is missing, `BadHeader` if the columns are
    /// wrong, `Corrupt` if a quantity does not parse.
    pub fn load(&self, file: &str) -> Result<PartMap, StoreError> {
        let path = self.path_of(file);
        if !path.exists() {
            return Err(StoreError::NotFound(file.to_string()));
        }

        let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(&path)?;
        let headers = reader.headers()?.clone();
        let col = |wanted: &str| headers.iter().position(|h| h == wanted);
        let (num_idx, name_idx, qty_idx) = match (
            col(INVENTORY_HEADER[0]),
            col(INVENTORY_HEADER[1]),
            col(INVENTORY_HEADER[2]),
        ) {
            (Some(n), Some(na), Some(q)) => (n, na, q),
            _ => {
                return Err(StoreError::BadHeader {
                    file: file.to_string(),
                    expected: "Numero de pieza, Nombre, Cantidad",
                })
            }
        };

        let mut rows: Vec<(String, Part)> = Vec::new();
        for result in reader.records() {
            let record = result?;
            let number = record.get(num_idx).unwrap_or("").to_string();
            if number.is_empty() {
                continue;
            }
            let name = record.get(name_idx).unwrap_or("").to_string();
            let raw_qty = record.get(qty_idx).unwrap_or("");
            let quantity = raw_qty.parse::<i64>().map_err(|_| StoreError::Corrupt {
                file: file.to_string(),
                detail: format!("cantidad ilegible '{}' para la pieza '{}'", raw_qty, number),
            })?;
            rows.push((number, Part { name, quantity }));
        }

        rows.sort_by(|(a, _), (b, _)| compare_part_numbers(a, b));
        Ok(rows.into_iter().collect())
    }

    /// Rewrite the whole file from the in-memory map, recomputing `Estado`
    pub fn save(&self, file: &str, parts: &PartMap) -> Result<(), StoreError> {
        let path = self.path_of(file);
        let mut writer = WriterBuilder::new().from_path(&path)?;
        writer.write_record(INVENTORY_HEADER)?;
        for (number, part) in parts {
            let quantity = part.quantity.to_string();
            writer.write_record([
                number.as_str(),
                part.name.as_str(),
                quantity.as_str(),
                part.status(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
