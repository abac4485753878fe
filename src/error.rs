//! Store error types

use std::fmt;
use std::io;

/// Errors produced by the flat-file stores and the export service
#[derive(Debug)]
pub enum StoreError {
    /// Missing file, part, or kit. The payload finishes the sentence
    /// "no existe ...", e.g. `la pieza '100' en inventario_taller.csv`.
    NotFound(String),
    /// Header row does not carry the expected columns
    BadHeader { file: String, expected: &'static str },
    /// A row could not be interpreted (unparsable quantity, unknown action)
    Corrupt { file: String, detail: String },
    /// Rejected user input (empty name, insufficient stock, bad number)
    Validation(String),
    /// Filesystem error
    Io(io::Error),
    /// CSV read/write error
    Csv(csv::Error),
    /// Workbook generation error
    Xlsx(rust_xlsxwriter::XlsxError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(what) => write!(f, "No existe {}", what),
            StoreError::BadHeader { file, expected } => write!(
                f,
                "Cabecera inválida en {}: se esperaban las columnas {}",
                file, expected
            ),
            StoreError::Corrupt { file, detail } => {
                write!(f, "Archivo corrupto {}: {}", file, detail)
            }
            StoreError::Validation(msg) => write!(f, "{}", msg),
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Csv(e) => write!(f, "CSV error: {}", e),
            StoreError::Xlsx(e) => write!(f, "XLSX error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        StoreError::Csv(err)
    }
}

impl From<rust_xlsxwriter::XlsxError> for StoreError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        StoreError::Xlsx(err)
    }
}

impl StoreError {
    /// HTTP status this error maps to at the route boundary
    pub fn status(&self) -> (u16, &'static str) {
        match self {
            StoreError::NotFound(_) => (404, "Not Found"),
            StoreError::Validation(_) => (400, "Bad Request"),
            _ => (500, "Internal Server Error"),
        }
    }
}
