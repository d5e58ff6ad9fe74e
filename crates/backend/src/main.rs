pub mod domain;
pub mod shared;
pub mod system;
pub mod usecases;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contracts::domain::a001_productos_vender::{CatalogFilter, CatalogView};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::shared::config::{self, Config};
use crate::usecases::u501_import_productos::{ImportExecutor, SeaOrmCatalogStore};

#[derive(Parser)]
#[command(name = "canastas")]
#[command(version, about = "Canastas Verdes catalog import and refresh")]
pub struct Cli {
    /// Excel file with the catalog (overrides config.toml)
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace the catalog with the contents of the Excel file once
    Import {
        /// Do not log progress, only errors
        #[arg(short, long)]
        quiet: bool,
    },
    /// Refresh the catalog on a cron schedule (plus once at start)
    Cron {
        /// 5-field cron expression (overrides PRODUCTOS_CRON_EXPRESSION)
        #[arg(long)]
        expression: Option<String>,
    },
    /// Refresh the catalog whenever the Excel file changes
    Watch {
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
    /// Show the imported catalog
    Catalog {
        /// Substring of product name or code
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        municipio: Option<String>,
        #[arg(long)]
        categoria: Option<String>,
        /// Minimum sale price
        #[arg(long)]
        min: Option<f64>,
        /// Maximum sale price
        #[arg(long)]
        max: Option<f64>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    system::tracing::initialize()?;

    let cfg = config::load_config()?;
    let source = match cli.file {
        Some(file) => file,
        None => config::get_excel_path(&cfg)?,
    };
    let db = connect(&cfg).await?;

    match cli.command {
        Commands::Import { quiet } => cmd_import(db, source, quiet).await,
        Commands::Cron { expression } => {
            let expression = expression.unwrap_or_else(|| config::cron_expression(&cfg));
            cmd_cron(db, source, &expression).await
        }
        Commands::Watch { debounce_ms } => {
            let window = Duration::from_millis(debounce_ms.unwrap_or(cfg.import.debounce_ms));
            cmd_watch(db, source, window).await
        }
        Commands::Catalog {
            search,
            municipio,
            categoria,
            min,
            max,
            json,
        } => {
            let filter = CatalogFilter {
                search,
                municipio,
                categoria,
                precio_min: min,
                precio_max: max,
            };
            cmd_catalog(db, &filter, json).await
        }
    }
}

async fn connect(cfg: &Config) -> Result<DatabaseConnection> {
    let db_path = config::get_database_path(cfg)?;
    shared::data::db::initialize_database(&db_path)
        .await
        .context("Failed to initialize database")
}

async fn cmd_import(db: DatabaseConnection, source: PathBuf, quiet: bool) -> Result<()> {
    let executor = ImportExecutor::new(Arc::new(SeaOrmCatalogStore::new(db.clone())));
    let imported = executor
        .run(&source, quiet)
        .await
        .context("Error importing products")?;
    if !quiet {
        let total = domain::a001_productos_vender::service::count(&db).await?;
        tracing::info!("Import finished: {} imported, {} in catalog", imported, total);
    }
    Ok(())
}

async fn cmd_cron(db: DatabaseConnection, source: PathBuf, expression: &str) -> Result<()> {
    let (worker, coalescer) =
        system::tasks::initialization::initialize_scheduled_refresh(db, source, expression)?;

    tokio::select! {
        _ = worker.run_loop() => {}
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("Catalog refresh scheduler stopped by SIGINT");
        }
    }
    coalescer.shutdown();
    Ok(())
}

async fn cmd_watch(db: DatabaseConnection, source: PathBuf, window: Duration) -> Result<()> {
    let (worker, coalescer) =
        system::tasks::initialization::initialize_file_watch(db, source, window);

    tokio::select! {
        res = worker.run_loop() => res?,
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("Stopping catalog file watcher...");
        }
    }
    coalescer.shutdown();
    Ok(())
}

async fn cmd_catalog(db: DatabaseConnection, filter: &CatalogFilter, json: bool) -> Result<()> {
    let view = domain::a001_productos_vender::service::query_catalog(&db, filter).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_catalog(&view);
    }
    Ok(())
}

fn print_catalog(view: &CatalogView) {
    println!(
        "Showing {} of {} products",
        view.productos.len(),
        view.total
    );
    println!("Municipios: {}", view.facets.municipios.join(", "));
    println!("Categorías: {}", view.facets.categorias.join(", "));
    println!();
    println!(
        "{:>5} | {:<12} | {:<30} | {:<16} | {:<18} | {:>12}",
        "#", "Código", "Producto", "Municipio", "Presentación", "Precio"
    );
    for row in &view.productos {
        let p = &row.producto;
        println!(
            "{:>5} | {:<12} | {:<30} | {:<16} | {:<18} | {:>12.2}",
            p.item_number, p.codigo, p.producto, p.municipio, p.presentacion, p.precio_venta
        );
    }
}
