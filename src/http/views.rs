//! Inline HTML views.
//!
//! No template engine; each page is assembled with `format!` over
//! escaped values and handed back as a complete document.

use std::fmt::Write;

use crate::inventory::PartMap;
use crate::kits::KitMap;
use crate::movements::Movement;

/// Minimal HTML escaping for text nodes and attribute values
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape(title),
        body = body
    )
}

pub fn index_page() -> String {
    page(
        "Almacén",
        "<h1>Inventario funcionando 🔥</h1>\n\
         <ul>\n\
         <li><a href=\"/inventarios\">Inventarios</a></li>\n\
         <li><a href=\"/kits\">Kits</a></li>\n\
         <li><a href=\"/movimientos\">Movimientos</a></li>\n\
         </ul>",
    )
}

pub fn inventories_page(files: &[String]) -> String {
    let mut body = String::from("<h1>Inventarios</h1>\n<ul>\n");
    for file in files {
        let name = escape(file);
        let _ = write!(
            body,
            "<li><a href=\"/inventario/{name}\">{name}</a> \
             (<a href=\"/inventario/descargar/{name}\">descargar</a>)</li>\n",
        );
    }
    body.push_str("</ul>\n");
    body.push_str(
        "<h2>Crear inventario</h2>\n\
         <form method=\"post\" action=\"/inventarios/crear\">\n\
         <input name=\"nombre\" placeholder=\"nombre\">\n\
         <button type=\"submit\">Crear</button>\n\
         </form>",
    );
    page("Inventarios", &body)
}

pub fn inventory_page(file: &str, parts: &PartMap) -> String {
    let file_esc = escape(file);
    let mut body = format!("<h1>{}</h1>\n", file_esc);
    body.push_str(
        "<table border=\"1\">\n<tr><th>Numero de pieza</th><th>Nombre</th>\
         <th>Cantidad</th><th>Estado</th><th></th></tr>\n",
    );
    for (number, part) in parts {
        let _ = write!(
            body,
            "<tr><td>{num}</td><td>{name}</td><td>{qty}</td><td>{status}</td>\
             <td><form method=\"post\" action=\"/inventario/eliminar\">\
             <input type=\"hidden\" name=\"archivo\" value=\"{file}\">\
             <input type=\"hidden\" name=\"pieza\" value=\"{num}\">\
             <button type=\"submit\">Eliminar</button></form></td></tr>\n",
            num = escape(number),
            name = escape(&part.name),
            qty = part.quantity,
            status = part.status(),
            file = file_esc,
        );
    }
    body.push_str("</table>\n");
    let _ = write!(
        body,
        "<h2>Editar / agregar pieza</h2>\n\
         <form method=\"post\" action=\"/inventario/editar\">\n\
         <input type=\"hidden\" name=\"archivo\" value=\"{file}\">\n\
         <input name=\"pieza\" placeholder=\"numero de pieza\">\n\
         <input name=\"nombre\" placeholder=\"nombre\">\n\
         <input name=\"cantidad\" placeholder=\"cantidad\">\n\
         <button type=\"submit\">Guardar</button>\n\
         </form>\n\
         <h2>Agregar stock</h2>\n\
         <form method=\"post\" action=\"/inventario/agregar_stock\">\n\
         <input type=\"hidden\" name=\"archivo\" value=\"{file}\">\n\
         <input name=\"pieza\" placeholder=\"numero de pieza\">\n\
         <input name=\"cantidad\" placeholder=\"cantidad\">\n\
         <button type=\"submit\">Agregar</button>\n\
         </form>\n\
         <p><a href=\"/inventario/descargar/{file}\">Descargar XLSX</a> | \
         <a href=\"/inventarios\">Volver</a></p>",
        file = file_esc,
    );
    page(file, &body)
}

pub fn kits_page(kits: &KitMap) -> String {
    let mut body = String::from(
        "<h1>Kits</h1>\n<table border=\"1\">\n\
         <tr><th>Nombre del kit</th><th>Descripcion</th><th>Disponibles</th>\
         <th>Pieza</th><th>Cantidad</th><th></th></tr>\n",
    );
    for (name, kit) in kits {
        for (part, quantity) in &kit.parts {
            let _ = write!(
                body,
                "<tr><td>{kit}</td><td>{desc}</td><td>{avail}</td><td>{part}</td>\
                 <td>{qty}</td>\
                 <td><form method=\"post\" action=\"/kits/eliminar_pieza\">\
                 <input type=\"hidden\" name=\"kit\" value=\"{kit}\">\
                 <input type=\"hidden\" name=\"pieza\" value=\"{part}\">\
                 <button type=\"submit\">Quitar pieza</button></form></td></tr>\n",
                kit = escape(name),
                desc = escape(&kit.description),
                avail = kit.available,
                part = escape(part),
                qty = quantity,
            );
        }
    }
    body.push_str("</table>\n");
    body.push_str(
        "<h2>Guardar pieza de kit</h2>\n\
         <form method=\"post\" action=\"/kits/guardar\">\n\
         <input name=\"nombre\" placeholder=\"nombre del kit\">\n\
         <input name=\"descripcion\" placeholder=\"descripcion\">\n\
         <input name=\"disponibles\" placeholder=\"disponibles\">\n\
         <input name=\"pieza\" placeholder=\"pieza\">\n\
         <input name=\"cantidad\" placeholder=\"cantidad\">\n\
         <button type=\"submit\">Guardar</button>\n\
         </form>",
    );
    page("Kits", &body)
}

pub fn movements_page(movements: &[Movement], inventories: &[String]) -> String {
    let mut body = String::from(
        "<h1>Movimientos</h1>\n<table border=\"1\">\n\
         <tr><th>Fecha</th><th>Empleado</th><th>Inventario</th><th>Pieza</th>\
         <th>Cantidad</th><th>Accion</th></tr>\n",
    );
    for m in movements {
        let _ = write!(
            body,
            "<tr><td>{ts}</td><td>{actor}</td><td>{inv}</td><td>{part}</td>\
             <td>{qty}</td><td>{action}</td></tr>\n",
            ts = escape(&m.timestamp),
            actor = escape(&m.actor),
            inv = escape(&m.inventory_file),
            part = escape(&m.part_number),
            qty = m.quantity,
            action = m.action.as_str(),
        );
    }
    body.push_str("</table>\n");
    body.push_str(
        "<h2>Registrar salida</h2>\n\
         <form method=\"post\" action=\"/movimientos/registrar\">\n\
         <input name=\"empleado\" placeholder=\"empleado\">\n\
         <select name=\"inventario\">\n",
    );
    for file in inventories {
        let _ = write!(body, "<option>{}</option>\n", escape(file));
    }
    body.push_str(
        "</select>\n\
         <input name=\"pieza\" placeholder=\"pieza\">\n\
         <input name=\"cantidad\" placeholder=\"cantidad\">\n\
         <button type=\"submit\">Registrar</button>\n\
         </form>\n\
         <form method=\"post\" action=\"/movimientos/borrar\">\n\
         <button type=\"submit\">Borrar registro</button>\n\
         </form>\n\
         <p><a href=\"/movimientos/descargar\">Descargar XLSX</a></p>",
    );
    page("Movimientos", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Part;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
        assert_eq!(escape("sin cambios"), "sin cambios");
    }

    #[test]
    fn inventory_page_escapes_part_fields() {
        let mut parts = PartMap::new();
        parts.insert(
            "100".to_string(),
            Part {
                name: "<script>alert(1)</script>".to_string(),
                quantity: 5,
            },
        );
        let html = inventory_page("inventario_a.csv", &parts);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("OK"));
    }
}
