//! Almacén server binary.

use std::path::PathBuf;

use clap::Parser;
use may_minihttp::HttpServer;

use almacen::http::AlmacenService;
use almacen::{AppConfig, Router};

#[derive(Parser)]
#[command(name = "almacen")]
#[command(about = "Inventario de almacén sobre archivos CSV", version)]
struct Cli {
    /// Listen address (overrides config)
    #[arg(long)]
    listen: Option<String>,

    /// Data directory (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    // DATABASE_URL for the /test-db diagnostic, if a .env file provides it
    dotenv::dotenv().ok();

    let mut config = AppConfig::load().map_err(|e| anyhow::anyhow!("configuration error: {}", e))?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir.display().to_string();
    }

    std::fs::create_dir_all(config.data_dir())?;

    // Request handlers do file I/O and build workbooks; the default
    // coroutine stack is too tight for that.
    may::config().set_stack_size(0x10000);

    let listen_addr = config.listen_addr.clone();
    let service = AlmacenService::new(Router::new(config));

    println!("📦 Almacén escuchando en http://{}", listen_addr);
    let server = HttpServer(service)
        .start(&listen_addr)
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;
    server
        .join()
        .map_err(|e| anyhow::anyhow!("Server encountered an error: {:?}", e))?;
    Ok(())
}
