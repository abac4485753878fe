//! Database connectivity diagnostic.
//!
//! Backs the `/test-db` endpoint only; nothing in the stores touches
//! Postgres. The connection string comes from `DATABASE_URL` (loaded via
//! dotenv by the binary).

use std::env;
use std::fmt;

#[derive(Debug)]
pub enum DiagnosticError {
    /// `DATABASE_URL` is not set
    MissingDatabaseUrl,
    /// Connection attempt failed
    Postgres(may_postgres::Error),
}

impl fmt::Display for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL no está configurada")
            }
            DiagnosticError::Postgres(e) => write!(f, "Error de conexión: {}", e),
        }
    }
}

impl std::error::Error for DiagnosticError {}

/// Attempt a blocking Postgres connection and report the outcome.
///
/// The connection is dropped immediately; this only answers "can the
/// server reach the database right now".
pub fn test_db() -> Result<String, DiagnosticError> {
    let url = env::var("DATABASE_URL").map_err(|_| DiagnosticError::MissingDatabaseUrl)?;
    let client = may_postgres::connect(&url).map_err(DiagnosticError::Postgres)?;
    drop(client);
    Ok("✅ Conexión a la base de datos OK".to_string())
}
