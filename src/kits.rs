//! Kit store.
//!
//! A kit is a named bundle of parts with a description and a target
//! availability count. On disk the table is flat: one row per
//! (kit, part) pair, with the kit's description and availability repeated
//! on every row. In memory the rows fold into one [`Kit`] per name.
//!
//! A consequence of the flat shape: a kit whose last part line is removed
//! has no row left to carry it, so it disappears from the file on save.

use std::path::PathBuf;

use csv::{ReaderBuilder, WriterBuilder};
use indexmap::IndexMap;

use crate::error::StoreError;

/// Canonical column order of the kit file
pub const KIT_HEADER: [&str; 5] = ["Nombre del kit", "Descripcion", "Disponibles", "Pieza", "Cantidad"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Kit {
    pub description: String,
    pub available: i64,
    /// part number -> quantity needed for one kit
    pub parts: IndexMap<String, i64>,
}

/// Kits keyed by name, in file order
pub type KitMap = IndexMap<String, Kit>;

pub struct KitStore {
    path: PathBuf,
}

impl KitStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load every kit. A missing file is an empty store, not an error.
    pub fn load_all(&self) -> Result<KitMap, StoreError> {
        if !self.path.exists() {
            return Ok(KitMap::new());
        }

        let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(&self.path)?;
        let headers = reader.headers()?.clone();
        let col = |wanted: &str| headers.iter().position(|h| h == wanted);
        let idx: Vec<usize> = match KIT_HEADER.iter().map(|&c| col(c)).collect::<Option<Vec<_>>>() {
            Some(idx) => idx,
            None => {
                return Err(StoreError::BadHeader {
                    file: self.path.display().to_string(),
                    expected: "Nombre del kit, Descripcion, Disponibles, Pieza, Cantidad",
                })
            }
        };

        let parse_count = |raw: &str, what: &str| -> Result<i64, StoreError> {
            raw.parse::<i64>().map_err(|_| StoreError::Corrupt {
                file: self.path.display().to_string(),
                detail: format!("{} ilegible: '{}'", what, raw),
            })
        };

        let mut kits = KitMap::new();
        for result in reader.records() {
            let record = result?;
            let field = |i: usize| record.get(idx[i]).unwrap_or("").to_string();
            let name = field(0);
            if name.is_empty() {
                continue;
            }
            let available = parse_count(&field(2), "disponibles")?;
            let quantity = parse_count(&field(4), "cantidad")?;
            let kit = kits.entry(name).or_insert_with(|| Kit {
                description: field(1),
                available,
                parts: IndexMap::new(),
            });
            kit.parts.insert(field(3), quantity);
        }
        Ok(kits)
    }

    /// Rewrite the whole kit file, one row per (kit, part) pair
    pub fn save_all(&self, kits: &KitMap) -> Result<(), StoreError> {
        let mut writer = WriterBuilder::new().from_path(&self.path)?;
        writer.write_record(KIT_HEADER)?;
        for (name, kit) in kits {
            let available = kit.available.to_string();
            for (part, quantity) in &kit.parts {
                let quantity = quantity.to_string();
                writer.write_record([
                    name.as_str(),
                    kit.description.as_str(),
                    available.as_str(),
                    part.as_str(),
                    quantity.as_str(),
                ])?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Create the kit if absent (with the supplied description and
    /// availability), then set one part's quantity. An existing kit keeps
    /// its description and availability untouched.
    pub fn upsert_part(
        &self,
        kit_name: &str,
        part: &str,
        quantity: i64,
        description: &str,
        available: i64,
    ) -> Result<(), StoreError> {
        let name = kit_name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("El nombre del kit está vacío".to_string()));
        }
        let mut kits = self.load_all()?;
        let kit = kits.entry(name.to_string()).or_insert_with(|| Kit {
            description: description.to_string(),
            available,
            parts: IndexMap::new(),
        });
        kit.parts.insert(part.to_string(), quantity);
        self.save_all(&kits)
    }

    /// Remove one part line. Absent kit or part is a no-op.
    pub fn remove_part(&self, kit_name: &str, part: &str) -> Result<(), StoreError> {
        let mut kits = self.load_all()?;
        if let Some(kit) = kits.get_mut(kit_name) {
            kit.parts.shift_remove(part);
        }
        self.save_all(&kits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &tempfile::TempDir) -> KitStore {
        KitStore::new(dir.path().join("kits.csv"))
    }

    #[test]
    fn upsert_creates_kit_with_one_part() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        store.upsert_part("Reparacion", "100", 2, "Kit de reparación", 4).unwrap();
        let kits = store.load_all().unwrap();

        assert_eq!(kits.len(), 1);
        let kit = &kits["Reparacion"];
        assert_eq!(kit.description, "Kit de reparación");
        assert_eq!(kit.available, 4);
        assert_eq!(kit.parts.len(), 1);
        assert_eq!(kit.parts["100"], 2);
    }

    #[test]
    fn upsert_on_existing_kit_keeps_description_and_availability() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        store.upsert_part("Arranque", "100", 2, "Original", 3).unwrap();
        store.upsert_part("Arranque", "200", 1, "Otra descripción", 99).unwrap();
        // Same part again: quantity simply overwritten
        store.upsert_part("Arranque", "100", 5, "", 0).unwrap();

        let kits = store.load_all().unwrap();
        let kit = &kits["Arranque"];
        assert_eq!(kit.description, "Original");
        assert_eq!(kit.available, 3);
        assert_eq!(kit.parts["100"], 5);
        assert_eq!(kit.parts["200"], 1);
    }

    #[test]
    fn file_is_denormalized_one_row_per_part() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        store.upsert_part("Frenos", "F1", 2, "Juego de frenos", 1).unwrap();
        store.upsert_part("Frenos", "F2", 4, "", 0).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("kits.csv")).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Nombre del kit,Descripcion,Disponibles,Pieza,Cantidad");
        assert_eq!(lines[1], "Frenos,Juego de frenos,1,F1,2");
        assert_eq!(lines[2], "Frenos,Juego de frenos,1,F2,4");
    }

    #[test]
    fn remove_part_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        store.upsert_part("Kit", "A", 1, "d", 1).unwrap();
        store.upsert_part("Kit", "B", 2, "", 0).unwrap();

        store.remove_part("Kit", "A").unwrap();
        store.remove_part("Kit", "A").unwrap();
        store.remove_part("NoExiste", "A").unwrap();

        let kits = store.load_all().unwrap();
        assert_eq!(kits["Kit"].parts.len(), 1);
        assert_eq!(kits["Kit"].parts["B"], 2);
    }

    #[test]
    fn removing_the_last_part_drops_the_kit_row() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        store.upsert_part("Solo", "X", 1, "d", 1).unwrap();
        store.remove_part("Solo", "X").unwrap();

        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempdir().unwrap();
        assert!(store(&dir).load_all().unwrap().is_empty());
    }
}
