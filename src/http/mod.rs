//! HTTP service on may_minihttp.
//!
//! The service itself is a thin adapter: it pulls method, path and body
//! off the wire, hands them to [`Router::dispatch`], and copies the
//! resulting [`Reply`] into the response. may_minihttp response headers
//! are `&'static str`, so the few dynamic ones (Location,
//! Content-Disposition) are interned once per distinct value — bounded by
//! the number of inventory files.

pub mod forms;
pub mod router;
pub mod views;

use std::collections::HashSet;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

use log::debug;
use may_minihttp::{HttpService, Request, Response};
use once_cell::sync::Lazy;

pub use router::{Reply, Router};

static HEADER_CACHE: Lazy<Mutex<HashSet<&'static str>>> = Lazy::new(|| Mutex::new(HashSet::new()));

fn intern_header(value: String) -> &'static str {
    let mut cache = HEADER_CACHE.lock().unwrap();
    if let Some(existing) = cache.get(value.as_str()) {
        return existing;
    }
    let leaked: &'static str = Box::leak(value.into_boxed_str());
    cache.insert(leaked);
    leaked
}

#[derive(Clone)]
pub struct AlmacenService {
    router: Arc<Router>,
}

impl AlmacenService {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }
}

impl HttpService for AlmacenService {
    fn call(&mut self, req: Request, rsp: &mut Response) -> io::Result<()> {
        let method = req.method().to_owned();
        let path = req.path().to_owned();

        let mut body = String::new();
        if method == "POST" {
            req.body().read_to_string(&mut body)?;
        }
        debug!("{} {}", method, path);

        let reply = self.router.dispatch(&method, &path, &body);
        write_reply(reply, rsp)
    }
}

fn write_reply(reply: Reply, rsp: &mut Response) -> io::Result<()> {
    let (code, reason) = reply.status;
    rsp.status_code(code as usize, reason);
    rsp.header(reply.content_type);
    if let Some(target) = reply.location {
        rsp.header(intern_header(format!("Location: {}", target)));
    }
    if let Some(filename) = reply.disposition {
        rsp.header(intern_header(format!(
            "Content-Disposition: attachment; filename=\"{}\"",
            filename
        )));
    }
    rsp.body_mut().write_all(&reply.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_interning_reuses_the_same_allocation() {
        let a = intern_header("Location: /kits".to_string());
        let b = intern_header("Location: /kits".to_string());
        assert!(std::ptr::eq(a, b));
    }
}
