//! End-to-end tests of the route surface, driven through the dispatch
//! layer without a network socket.

use almacen::http::Router;
use almacen::inventory::InventoryStore;
use almacen::movements::{MovementAction, MovementLog};
use almacen::AppConfig;
use tempfile::TempDir;

fn setup() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let config = AppConfig {
        data_dir: dir.path().display().to_string(),
        ..AppConfig::default()
    };
    let router = Router::new(config);
    (dir, router)
}

fn post(router: &Router, path: &str, body: &str) -> almacen::http::Reply {
    router.dispatch("POST", path, body)
}

fn get(router: &Router, path: &str) -> almacen::http::Reply {
    router.dispatch("GET", path, "")
}

#[test]
fn salida_flow_decrements_and_journals() {
    let (dir, router) = setup();

    let reply = post(&router, "/inventarios/crear", "nombre=taller");
    assert_eq!(reply.status.0, 303);

    let reply = post(
        &router,
        "/inventario/editar",
        "archivo=inventario_taller.csv&pieza=100&nombre=Bolt&cantidad=5",
    );
    assert_eq!(reply.status.0, 303);

    let reply = post(
        &router,
        "/movimientos/registrar",
        "empleado=alice&inventario=inventario_taller.csv&pieza=100&cantidad=3",
    );
    assert_eq!(reply.status.0, 303);

    let store = InventoryStore::new(dir.path());
    let parts = store.load("inventario_taller.csv").unwrap();
    assert_eq!(parts["100"].quantity, 2);
    assert_eq!(parts["100"].status(), "OK");

    let log = MovementLog::new(dir.path().join("movimientos.csv"));
    let movements = log.read_all().unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].actor, "alice");
    assert_eq!(movements[0].inventory_file, "inventario_taller.csv");
    assert_eq!(movements[0].part_number, "100");
    assert_eq!(movements[0].quantity, 3);
    assert_eq!(movements[0].action, MovementAction::Salida);

    // Over-decrement: rejected, file unchanged, no new journal row
    let reply = post(
        &router,
        "/movimientos/registrar",
        "empleado=alice&inventario=inventario_taller.csv&pieza=100&cantidad=10",
    );
    assert_eq!(reply.status.0, 400);
    assert!(reply.body_text().contains("Stock insuficiente"));
    assert_eq!(store.load("inventario_taller.csv").unwrap()["100"].quantity, 2);
    assert_eq!(log.read_all().unwrap().len(), 1);
}

#[test]
fn stock_mutations_on_unknown_parts_touch_nothing() {
    let (dir, router) = setup();
    post(&router, "/inventarios/crear", "nombre=a");

    let reply = post(
        &router,
        "/inventario/agregar_stock",
        "archivo=inventario_a.csv&pieza=999&cantidad=4",
    );
    assert_eq!(reply.status.0, 404);
    assert!(reply.body_text().contains("No existe la pieza '999'"));

    let reply = post(
        &router,
        "/movimientos/registrar",
        "empleado=eva&inventario=inventario_a.csv&pieza=999&cantidad=1",
    );
    assert_eq!(reply.status.0, 404);

    // Nothing was journaled, so the log file was never created
    assert!(!dir.path().join("movimientos.csv").exists());
}

#[test]
fn add_stock_increments_and_logs_entrada() {
    let (dir, router) = setup();
    post(&router, "/inventarios/crear", "nombre=a");
    post(
        &router,
        "/inventario/editar",
        "archivo=inventario_a.csv&pieza=7&nombre=Eje&cantidad=1",
    );

    let reply = post(
        &router,
        "/inventario/agregar_stock",
        "archivo=inventario_a.csv&pieza=7&cantidad=4",
    );
    assert_eq!(reply.status.0, 303);

    let parts = InventoryStore::new(dir.path()).load("inventario_a.csv").unwrap();
    assert_eq!(parts["7"].quantity, 5);

    let movements = MovementLog::new(dir.path().join("movimientos.csv")).read_all().unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].action, MovementAction::Entrada);
    assert_eq!(movements[0].quantity, 4);
}

#[test]
fn registrar_on_missing_inventory_is_not_found() {
    let (_dir, router) = setup();
    let reply = post(
        &router,
        "/movimientos/registrar",
        "empleado=eva&inventario=inventario_x.csv&pieza=1&cantidad=1",
    );
    assert_eq!(reply.status.0, 404);
    assert!(reply.body_text().contains("No existe inventario_x.csv"));
}

#[test]
fn delete_part_rewrites_the_file() {
    let (dir, router) = setup();
    post(&router, "/inventarios/crear", "nombre=a");
    post(
        &router,
        "/inventario/editar",
        "archivo=inventario_a.csv&pieza=1&nombre=Uno&cantidad=1",
    );
    post(
        &router,
        "/inventario/editar",
        "archivo=inventario_a.csv&pieza=2&nombre=Dos&cantidad=2",
    );

    let reply = post(&router, "/inventario/eliminar", "archivo=inventario_a.csv&pieza=1");
    assert_eq!(reply.status.0, 303);

    let parts = InventoryStore::new(dir.path()).load("inventario_a.csv").unwrap();
    assert_eq!(parts.len(), 1);
    assert!(parts.get("1").is_none());
    assert!(parts.get("2").is_some());
}

#[test]
fn kit_routes_upsert_and_remove() {
    let (_dir, router) = setup();

    let reply = post(
        &router,
        "/kits/guardar",
        "nombre=Repair&descripcion=Kit+de+reparacion&disponibles=2&pieza=100&cantidad=2",
    );
    assert_eq!(reply.status.0, 303);

    let html = get(&router, "/kits").body_text();
    assert!(html.contains("Repair"));
    assert!(html.contains("Kit de reparacion"));

    let reply = post(&router, "/kits/eliminar_pieza", "kit=Repair&pieza=100");
    assert_eq!(reply.status.0, 303);
    // Removing the absent part again is still fine
    let reply = post(&router, "/kits/eliminar_pieza", "kit=Repair&pieza=100");
    assert_eq!(reply.status.0, 303);
}

#[test]
fn paused_system_blocks_every_route() {
    let (dir, router) = setup();
    std::fs::write(dir.path().join("estado.json"), r#"{ "activo": false }"#).unwrap();

    for (method, path) in [
        ("GET", "/"),
        ("GET", "/kits"),
        ("GET", "/movimientos"),
        ("POST", "/inventarios/crear"),
    ] {
        let reply = router.dispatch(method, path, "nombre=x");
        assert!(
            reply.body_text().contains("Sistema pausado"),
            "{} {} was not blocked",
            method,
            path
        );
    }
}

#[test]
fn maintenance_blocks_only_inventory_views() {
    let (dir, router) = setup();
    post(&router, "/inventarios/crear", "nombre=a");
    std::fs::write(dir.path().join("maintenance.txt"), "ON").unwrap();

    assert!(get(&router, "/inventarios").body_text().contains("mantenimiento"));
    assert!(get(&router, "/inventario/inventario_a.csv")
        .body_text()
        .contains("mantenimiento"));

    assert!(get(&router, "/kits").body_text().contains("Kits"));
    assert!(get(&router, "/").body_text().contains("Inventario"));
}

#[test]
fn inventory_download_serves_a_workbook() {
    let (_dir, router) = setup();
    post(&router, "/inventarios/crear", "nombre=a");
    post(
        &router,
        "/inventario/editar",
        "archivo=inventario_a.csv&pieza=100&nombre=Bolt&cantidad=5",
    );

    let reply = get(&router, "/inventario/descargar/inventario_a.csv");
    assert_eq!(reply.status.0, 200);
    assert_eq!(reply.disposition.as_deref(), Some("inventario_a.xlsx"));
    // XLSX is a zip container
    assert_eq!(&reply.body[..2], b"PK");
}

#[test]
fn movements_download_requires_an_existing_journal() {
    let (_dir, router) = setup();
    let reply = get(&router, "/movimientos/descargar");
    assert_eq!(reply.status.0, 404);

    post(&router, "/inventarios/crear", "nombre=a");
    post(
        &router,
        "/inventario/editar",
        "archivo=inventario_a.csv&pieza=1&nombre=Uno&cantidad=3",
    );
    post(
        &router,
        "/inventario/agregar_stock",
        "archivo=inventario_a.csv&pieza=1&cantidad=1",
    );

    let reply = get(&router, "/movimientos/descargar");
    assert_eq!(reply.status.0, 200);
    assert_eq!(reply.disposition.as_deref(), Some("movimientos.xlsx"));
}

#[test]
fn unknown_routes_are_404() {
    let (_dir, router) = setup();
    assert_eq!(get(&router, "/nada").status.0, 404);
    assert_eq!(post(&router, "/inventario/otra", "").status.0, 404);
}

#[test]
fn edit_accepts_negative_quantities() {
    let (dir, router) = setup();
    post(&router, "/inventarios/crear", "nombre=a");
    let reply = post(
        &router,
        "/inventario/editar",
        "archivo=inventario_a.csv&pieza=1&nombre=Raro&cantidad=-3",
    );
    assert_eq!(reply.status.0, 303);

    let parts = InventoryStore::new(dir.path()).load("inventario_a.csv").unwrap();
    assert_eq!(parts["1"].quantity, -3);
    assert_eq!(parts["1"].status(), "OUT_OF_STOCK");
}

#[test]
fn empty_inventory_name_is_rejected() {
    let (_dir, router) = setup();
    let reply = post(&router, "/inventarios/crear", "nombre=");
    assert_eq!(reply.status.0, 400);
}
