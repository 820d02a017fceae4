//! Qishui song extraction server.

use axum::Router;
use axum::routing::get;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qishui::api::{AppState, handlers};
use qishui::extract::{
    DEFAULT_LOADER_KEY, ExtractOptions, extract_inline_data, project_song_info,
};
use qishui::fetch::PageFetcher;

/// Extracts song metadata and timed lyrics from Qishui (Douyin) song pages.
#[derive(Parser)]
#[command(name = "qishui")]
#[command(about = "A Qishui song page extraction server written in Rust")]
struct Cli {
    /// Server port
    #[arg(short, long, default_value = "3000")]
    port: u16,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server (default)
    Serve,

    /// Run the extraction pipeline over a saved HTML document
    Extract {
        /// Path to the HTML file
        file: std::path::PathBuf,

        /// Print intermediate extraction artifacts to stderr
        #[arg(long)]
        debug: bool,

        /// Output format: json or js
        #[arg(long, default_value = "json")]
        format: String,

        /// Variable name for the js format
        #[arg(long, default_value = "song")]
        var: String,
    },
}

/// Create the router with the song and audio relay routes.
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/song/{id}", get(handlers::get_song))
        .route("/api/proxy/audio", get(handlers::proxy_audio))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qishui=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Some(Commands::Extract {
            file,
            debug,
            format,
            var,
        }) => {
            extract_file(&file, debug, &format, &var);
        }
        Some(Commands::Serve) | None => {
            run_server(cli.port).await;
        }
    }
}

fn extract_file(file: &std::path::Path, debug: bool, format: &str, var: &str) {
    let html = match std::fs::read_to_string(file) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("Failed to read {}: {}", file.display(), e);
            std::process::exit(1);
        }
    };

    let options = ExtractOptions {
        debug,
        expected_loader_key: Some(DEFAULT_LOADER_KEY.to_string()),
    };
    let inline = extract_inline_data(&html, &options);
    if let Some(artifacts) = &inline.debug {
        match serde_json::to_string_pretty(artifacts) {
            Ok(text) => eprintln!("{}", text),
            Err(e) => eprintln!("Failed to render debug artifacts: {}", e),
        }
    }

    let song = inline
        .parsed
        .as_ref()
        .and_then(|parsed| project_song_info(parsed, DEFAULT_LOADER_KEY));
    let Some(song) = song else {
        eprintln!("Could not extract song information from {}", file.display());
        std::process::exit(1);
    };

    match format {
        "js" => print!("{}", song.to_js_module(var)),
        _ => match serde_json::to_string_pretty(&song) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to serialize song info: {}", e);
                std::process::exit(1);
            }
        },
    }
}

async fn run_server(port: u16) {
    let fetcher = match PageFetcher::new() {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    let state = AppState::new(fetcher);
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            tracing::error!("Is another process already using port {}?", port);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Qishui extraction server listening on {}",
        listener
            .local_addr()
            .expect("listener should have local addr")
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
