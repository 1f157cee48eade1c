//! `lightmap-server` – HTTP surface of the memory graph.
//!
//! Boots an axum HTTP server (default port `8080`) over a shared
//! [`MindMapService`][lightmap_memory::MindMapService]:
//!
//! 1. **`POST`** with a JSON body dispatches on its `action` field:
//!    `add_memory`, `get_mindmap`, or `find_connections`.
//! 2. **`GET ?format=tree|graph|light`** returns the matching projection of
//!    the store; any other format returns the raw node array.
//!
//! # Modules
//!
//! - [`handlers`] – maps decoded requests onto the service.
//! - [`server`] – [`router`][server::router] and [`Server`], which serves it
//!   on a tokio listener.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs
//!   the `tracing` subscriber, optionally exporting spans over OTLP.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lightmap_encoder::LightEncoder;
//! use lightmap_memory::MindMapService;
//! use lightmap_server::Server;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = Arc::new(MindMapService::in_memory(Arc::new(LightEncoder::new())));
//!     Server::new(service)
//!         .with_port(8080)
//!         .run()
//!         .await
//!         .expect("lightmap server failed");
//! }
//! ```

pub mod handlers;
pub mod server;
pub mod telemetry;

pub use server::{DEFAULT_PORT, MAX_BODY_BYTES, MINDMAP_PATH, Server, router};
pub use telemetry::{TracerProviderGuard, init_tracing};
