//! Route dispatch.
//!
//! Transport-free: handlers take `(method, path, form-body)` and return a
//! [`Reply`], so the whole surface is exercisable in tests without a
//! socket. The may_minihttp adapter in the parent module copies a `Reply`
//! onto the wire.

use std::fs;
use std::path::PathBuf;

use log::error;

use crate::config::AppConfig;
use crate::diagnostics;
use crate::error::StoreError;
use crate::export;
use crate::gate::SystemGate;
use crate::http::forms::{self, Form};
use crate::http::views;
use crate::inventory::{InventoryStore, Part};
use crate::kits::KitStore;
use crate::movements::{MovementAction, MovementLog};

pub const PAUSED_MESSAGE: &str = "🛑 Sistema pausado por el administrador";
pub const MAINTENANCE_MESSAGE: &str = "🛑 Sistema en mantenimiento";

const OK: (u16, &str) = (200, "OK");
const SEE_OTHER: (u16, &str) = (303, "See Other");
const NOT_FOUND: (u16, &str) = (404, "Not Found");
const SERVER_ERROR: (u16, &str) = (500, "Internal Server Error");

/// One finished response, independent of the HTTP library
#[derive(Debug)]
pub struct Reply {
    pub status: (u16, &'static str),
    /// Full header line, e.g. `Content-Type: text/html; charset=utf-8`
    pub content_type: &'static str,
    /// Redirect target, if any
    pub location: Option<String>,
    /// Download filename for attachment responses
    pub disposition: Option<String>,
    pub body: Vec<u8>,
}

impl Reply {
    fn html(body: String) -> Self {
        Self {
            status: OK,
            content_type: "Content-Type: text/html; charset=utf-8",
            location: None,
            disposition: None,
            body: body.into_bytes(),
        }
    }

    fn text(status: (u16, &'static str), body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "Content-Type: text/plain; charset=utf-8",
            location: None,
            disposition: None,
            body: body.into().into_bytes(),
        }
    }

    fn redirect(target: impl Into<String>) -> Self {
        Self {
            status: SEE_OTHER,
            content_type: "Content-Type: text/plain; charset=utf-8",
            location: Some(target.into()),
            disposition: None,
            body: Vec::new(),
        }
    }

    fn xlsx(filename: String, body: Vec<u8>) -> Self {
        Self {
            status: OK,
            content_type:
                "Content-Type: application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            location: None,
            disposition: Some(filename),
            body,
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct Router {
    config: AppConfig,
    inventories: InventoryStore,
    kits: KitStore,
    movements: MovementLog,
}

impl Router {
    pub fn new(config: AppConfig) -> Self {
        let inventories = InventoryStore::new(config.data_dir());
        let kits = KitStore::new(config.kits_path());
        let movements = MovementLog::new(config.movements_path());
        Self {
            config,
            inventories,
            kits,
            movements,
        }
    }

    /// Handle one request. The gate files are re-read here, per request.
    pub fn dispatch(&self, method: &str, path: &str, body: &str) -> Reply {
        let gate = SystemGate::load(&self.config.estado_path(), &self.config.maintenance_path());
        if !gate.active {
            return Reply::text(OK, PAUSED_MESSAGE);
        }
        let path = path.split('?').next().unwrap_or(path);
        match self.route(method, path, body, gate) {
            Ok(reply) => reply,
            Err(err) => {
                let status = err.status();
                if status.0 >= 500 {
                    error!("{} {} failed: {}", method, path, err);
                }
                Reply::text(status, format!("❌ {}", err))
            }
        }
    }

    fn route(
        &self,
        method: &str,
        path: &str,
        body: &str,
        gate: SystemGate,
    ) -> Result<Reply, StoreError> {
        match (method, path) {
            ("GET", "/") => Ok(Reply::html(views::index_page())),

            ("GET", "/inventarios") => {
                if gate.maintenance {
                    return Ok(Reply::text(OK, MAINTENANCE_MESSAGE));
                }
                let files = self.inventories.list_files()?;
                Ok(Reply::html(views::inventories_page(&files)))
            }
            ("POST", "/inventarios/crear") => {
                let form = Form::parse(body);
                let nombre = form.require("nombre")?;
                self.inventories.create(nombre)?;
                Ok(Reply::redirect("/inventarios"))
            }
            ("POST", "/inventario/editar") => self.edit_part(body),
            ("POST", "/inventario/eliminar") => self.delete_part(body),
            ("POST", "/inventario/agregar_stock") => self.add_stock(body),

            ("GET", "/kits") => {
                let kits = self.kits.load_all()?;
                Ok(Reply::html(views::kits_page(&kits)))
            }
            ("POST", "/kits/guardar") => {
                let form = Form::parse(body);
                let nombre = form.require("nombre")?;
                let pieza = form.require("pieza")?;
                let cantidad = form.require_i64("cantidad")?;
                let disponibles = form.require_i64("disponibles")?;
                let descripcion = form.get("descripcion").trim();
                self.kits
                    .upsert_part(nombre, pieza, cantidad, descripcion, disponibles)?;
                Ok(Reply::redirect("/kits"))
            }
            ("POST", "/kits/eliminar_pieza") => {
                let form = Form::parse(body);
                let kit = form.require("kit")?;
                let pieza = form.require("pieza")?;
                self.kits.remove_part(kit, pieza)?;
                Ok(Reply::redirect("/kits"))
            }

            ("GET", "/movimientos") => {
                let movements = self.movements.read_all()?;
                let files = self.inventories.list_files()?;
                Ok(Reply::html(views::movements_page(&movements, &files)))
            }
            ("POST", "/movimientos/registrar") => self.register_exit(body),
            ("POST", "/movimientos/borrar") => {
                self.movements.truncate()?;
                Ok(Reply::redirect("/movimientos"))
            }
            ("GET", "/movimientos/descargar") => self.download(self.config.movements_path()),

            ("GET", "/test-db") => match diagnostics::test_db() {
                Ok(msg) => Ok(Reply::text(OK, msg)),
                Err(err) => Ok(Reply::text(SERVER_ERROR, format!("❌ {}", err))),
            },

            _ => {
                if method == "GET" {
                    if let Some(segment) = path.strip_prefix("/inventario/descargar/") {
                        return self.download_inventory(segment);
                    }
                    if let Some(segment) = path.strip_prefix("/inventario/") {
                        return self.show_inventory(segment, gate);
                    }
                }
                Ok(Reply::text(NOT_FOUND, "Ruta no encontrada"))
            }
        }
    }

    fn show_inventory(&self, segment: &str, gate: SystemGate) -> Result<Reply, StoreError> {
        if gate.maintenance {
            return Ok(Reply::text(OK, MAINTENANCE_MESSAGE));
        }
        let file = forms::decode_segment(segment);
        if !InventoryStore::is_inventory_name(&file) {
            return Err(StoreError::NotFound(file));
        }
        let parts = self.inventories.load(&file)?;
        Ok(Reply::html(views::inventory_page(&file, &parts)))
    }

    /// Upsert one part. This is the only path that may create a part, and
    /// it accepts a negative quantity as typed.
    fn edit_part(&self, body: &str) -> Result<Reply, StoreError> {
        let form = Form::parse(body);
        let archivo = form.require("archivo")?;
        let pieza = form.require("pieza")?;
        let nombre = form.get("nombre").trim().to_string();
        let cantidad = form.require_i64("cantidad")?;

        let mut parts = self.inventories.load(archivo)?;
        parts.insert(
            pieza.to_string(),
            Part {
                name: nombre,
                quantity: cantidad,
            },
        );
        self.inventories.save(archivo, &parts)?;
        Ok(Reply::redirect(format!(
            "/inventario/{}",
            forms::encode_segment(archivo)
        )))
    }

    fn delete_part(&self, body: &str) -> Result<Reply, StoreError> {
        let form = Form::parse(body);
        let archivo = form.require("archivo")?;
        let pieza = form.require("pieza")?;

        let mut parts = self.inventories.load(archivo)?;
        parts.shift_remove(pieza);
        self.inventories.save(archivo, &parts)?;
        Ok(Reply::redirect(format!(
            "/inventario/{}",
            forms::encode_segment(archivo)
        )))
    }

    /// Stock increment. Never creates a part.
    fn add_stock(&self, body: &str) -> Result<Reply, StoreError> {
        let form = Form::parse(body);
        let archivo = form.require("archivo")?;
        let pieza = form.require("pieza")?;
        let cantidad = form.require_i64("cantidad")?;

        let mut parts = self.inventories.load(archivo)?;
        let part = parts.get_mut(pieza).ok_or_else(|| {
            StoreError::NotFound(format!("la pieza '{}' en {}", pieza, archivo))
        })?;
        part.quantity += cantidad;
        self.inventories.save(archivo, &parts)?;
        // The add-stock form carries no employee field; the journal row is
        // attributed to the system itself.
        self.movements
            .append("sistema", archivo, pieza, cantidad, MovementAction::Entrada)?;
        Ok(Reply::redirect(format!(
            "/inventario/{}",
            forms::encode_segment(archivo)
        )))
    }

    /// Stock decrement. Inventory is persisted before the journal entry, so
    /// a crash between the two writes leaves the movement unlogged.
    fn register_exit(&self, body: &str) -> Result<Reply, StoreError> {
        let form = Form::parse(body);
        let empleado = form.require("empleado")?;
        let inventario = form.require("inventario")?;
        let pieza = form.require("pieza")?;
        let cantidad = form.require_i64("cantidad")?;

        let mut parts = self.inventories.load(inventario)?;
        let part = parts.get_mut(pieza).ok_or_else(|| {
            StoreError::NotFound(format!("la pieza '{}' en {}", pieza, inventario))
        })?;
        if cantidad > part.quantity {
            return Err(StoreError::Validation(format!(
                "Stock insuficiente de '{}': quedan {}",
                pieza, part.quantity
            )));
        }
        part.quantity -= cantidad;
        self.inventories.save(inventario, &parts)?;
        self.movements
            .append(empleado, inventario, pieza, cantidad, MovementAction::Salida)?;
        Ok(Reply::redirect("/movimientos"))
    }

    fn download_inventory(&self, segment: &str) -> Result<Reply, StoreError> {
        let file = forms::decode_segment(segment);
        if !InventoryStore::is_inventory_name(&file) {
            return Err(StoreError::NotFound(file));
        }
        self.download(self.inventories.path_of(&file))
    }

    fn download(&self, source: PathBuf) -> Result<Reply, StoreError> {
        let dest = export::export_to_xlsx(&source)?;
        let bytes = fs::read(&dest)?;
        let filename = dest
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("export.xlsx")
            .to_string();
        Ok(Reply::xlsx(filename, bytes))
    }
}
