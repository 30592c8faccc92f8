//! # Canvas - expression-tree editor
//!
//! The command-line front end of the canvas engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/canvas (THE BINARY)            │
//! │                                               │
//! │   ┌─────────────┐        ┌──────────────┐     │
//! │   │    CLI      │        │ canvas.toml  │     │
//! │   │   (clap)    │        │   (toml)     │     │
//! │   └──────┬──────┘        └──────┬───────┘     │
//! │          └───────────┬──────────┘             │
//! │                      ▼                        │
//! │              ┌───────────────┐                │
//! │              │  canvas-core  │                │
//! │              │ (THE ENGINE)  │                │
//! │              └───────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! canvas new "Limit Bid Order" -o order.json
//! canvas convert -i order.json -p quantity -t Decimal
//! canvas show -i order.json
//! canvas encode -i order.json -o order.clip
//! ```

use canvas::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // CANVAS_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CANVAS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "canvas=info,canvas_core=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
