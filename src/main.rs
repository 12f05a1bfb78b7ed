//! Math tutor backend
//!
//! - Axum HTTP + WebSocket API: problem catalog, themes, whiteboard player
//! - Photo-to-whiteboard solving via Gemini or OpenAI (environment variables)
//! - Static front end fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   GEMINI_API_KEY    : selects Gemini (checked first)
//!   GEMINI_BASE_URL   : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_MODEL      : default "gemini-flash-latest"
//!   OPENAI_API_KEY    : selects OpenAI when no Gemini key is set
//!   OPENAI_BASE_URL   : default "https://api.openai.com/v1"
//!   OPENAI_MODEL      : default "gpt-4o"
//!   TUTOR_CONFIG_PATH : path to TOML config (prompts, assets, player, extra problems)
//!   STATIC_DIR        : front end root (default "./static")
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"
//!
//! Without either key, solve requests return a built-in demo solution.

mod assets;
mod catalog;
mod config;
mod domain;
mod error;
mod gemini;
mod markup;
mod openai;
mod player;
mod protocol;
mod render;
mod routes;
mod schema;
mod seeds;
mod solver;
mod state;
mod telemetry;
mod theme;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Catalog verification and theme build happen here; a broken page table stops startup.
  let state = match AppState::from_env() {
    Ok(s) => Arc::new(s),
    Err(e) => {
      error!(target: "tutor_backend", error = %e, "Startup failed");
      return Err(e.into());
    }
  };

  let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into());
  let app = build_router(state, &static_dir);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "tutor_backend", %addr, %static_dir, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
