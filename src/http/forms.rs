//! Decoding of urlencoded form bodies and path segments.

use std::collections::HashMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::StoreError;

/// Characters that cannot ride in a path segment unescaped
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'#')
    .add(b'%')
    .add(b'/');

/// Parsed `application/x-www-form-urlencoded` body.
///
/// Repeated keys keep the last value, which is what the HTML forms here
/// produce anyway.
pub struct Form {
    fields: HashMap<String, String>,
}

impl Form {
    pub fn parse(body: &str) -> Self {
        let fields = form_urlencoded::parse(body.as_bytes()).into_owned().collect();
        Self { fields }
    }

    /// Raw field value; empty string if absent
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    /// Trimmed, non-empty field value
    pub fn require(&self, key: &str) -> Result<&str, StoreError> {
        let value = self.get(key).trim();
        if value.is_empty() {
            Err(StoreError::Validation(format!("Falta el campo '{}'", key)))
        } else {
            Ok(value)
        }
    }

    /// Field value coerced to an integer. No range checks beyond the parse.
    pub fn require_i64(&self, key: &str) -> Result<i64, StoreError> {
        let raw = self.require(key)?;
        raw.parse::<i64>().map_err(|_| {
            StoreError::Validation(format!("El campo '{}' no es un número: '{}'", key, raw))
        })
    }
}

/// Percent-decode one path segment (e.g. the `<archivo>` in
/// `/inventario/descargar/<archivo>`).
pub fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// Percent-encode a filename for use as a path segment in a URL
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}
