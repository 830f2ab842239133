use crate::{
    controllers::demo_router,
    dispatcher::Dispatcher,
    logging::{init_logging_with_config, LogConfig},
    middleware::TracingMiddleware,
    openapi::DocumentService,
    runtime_config::RuntimeConfig,
    server::{AppService, HttpServer, ServerHandle},
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command-line interface of the demo service
#[derive(Parser)]
#[command(name = "routedoc-demo")]
#[command(about = "Serve and document the routedoc demo groups", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the demo groups and the live document
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:4000")]
        addr: String,

        /// Overlay file merged into the document (default: OpenAPI.json next to the binary)
        #[arg(long, env = "ROUTEDOC_OPENAPI_JSON")]
        overlay: Option<PathBuf>,

        /// Request path serving the document
        #[arg(long, env = "ROUTEDOC_DOCS_PATH")]
        docs_path: Option<String>,
    },
    /// Print the synthesized document
    Document {
        /// Overlay file merged into the document
        #[arg(long, env = "ROUTEDOC_OPENAPI_JSON")]
        overlay: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// List the wired routes
    Routes,
}

/// Parse the process arguments and run the selected command
///
/// # Errors
///
/// Propagates registration, overlay, logging and server failures.
pub fn run_cli() -> Result<()> {
    run(Cli::parse())
}

/// Run an already parsed command line
///
/// # Errors
///
/// Propagates registration, overlay, logging and server failures.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            addr,
            overlay,
            docs_path,
        } => serve(&addr, overlay, docs_path),
        Commands::Document { overlay, pretty } => {
            let docs = document_service(overlay);
            demo_router(&docs).context("Failed to register demo groups")?;
            let document = docs
                .get_document()
                .context("Failed to load the document overlay")?
                .render()?;
            let rendered = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            println!("{rendered}");
            Ok(())
        }
        Commands::Routes => {
            let docs = DocumentService::new();
            let router = demo_router(&docs).context("Failed to register demo groups")?;
            router.dump_routes();
            Ok(())
        }
    }
}

fn document_service(overlay: Option<PathBuf>) -> DocumentService {
    match overlay {
        Some(path) => DocumentService::with_overlay_path(path),
        None => DocumentService::new(),
    }
}

fn serve(addr: &str, overlay: Option<PathBuf>, docs_path: Option<String>) -> Result<()> {
    let _log_guard = init_logging_with_config(&LogConfig::from_env())?;
    let config = RuntimeConfig::from_env();
    may::config().set_stack_size(config.stack_size);

    let docs = document_service(overlay.or_else(|| config.overlay_path.clone()));
    let docs_path = docs_path.unwrap_or_else(|| config.docs_path.clone());
    let router = demo_router(&docs).context("Failed to register demo groups")?;

    let mut dispatcher = Dispatcher::with_config(&config);
    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    // SAFETY: the may runtime is configured above and the route handlers
    // are Send + 'static.
    unsafe {
        dispatcher.register_router(&router);
    }

    let handler = docs
        .get_document()
        .context("Failed to load the document overlay")?;
    let service = AppService::new(Arc::new(router), Arc::new(dispatcher)).with_docs(&docs_path, handler);
    let handle = HttpServer(service)
        .start(addr)
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        addr = %handle.addr(),
        docs_path = %docs_path,
        overlay = %docs.overlay_path().display(),
        "routedoc-demo listening"
    );
    run_until_signal(handle)
}

#[cfg(unix)]
fn run_until_signal(handle: ServerHandle) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal = signal, "Shutdown signal received");
    }
    handle.stop();
    Ok(())
}

#[cfg(not(unix))]
fn run_until_signal(handle: ServerHandle) -> Result<()> {
    handle
        .join()
        .map_err(|e| anyhow::anyhow!("Server coroutine panicked: {e:?}"))
}
