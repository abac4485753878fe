//! # Almacén
//!
//! CSV-backed warehouse inventory web application for the `may` runtime.
//!
//! Every table is a flat CSV file inside one data directory: any number of
//! `inventario*.csv` part tables, one `kits.csv`, and an append-only
//! `movimientos.csv` journal. The HTTP layer is a thin router over those
//! stores plus an XLSX export, gated by two operator flag files.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod gate;
pub mod http;
pub mod inventory;
pub mod kits;
pub mod movements;

pub use config::AppConfig;
pub use error::StoreError;
pub use http::{AlmacenService, Router};
