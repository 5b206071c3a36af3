//! `finbot-server` exposes the financial literacy RAG chatbot over HTTP.
//! It loads a knowledge document at startup, indexes it through
//! `finbot-rag`, and serves two routes: a welcome message and `/ask`.

pub mod knowledge;
pub mod server;

pub use server::{AppState, ServerConfig, app_router, build_state, run_server};
