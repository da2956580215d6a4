//! # Vanguard Portal
//!
//! Backend for the internal team portal: a document browser/editor backed
//! by a GitHub repository used as the content store, plus project-management
//! views derived from a single Markdown task-tracker file.
//!
//! ## Architecture
//!
//! ```text
//!   GitHub repo (content store)
//!         │
//!         ▼
//!   ┌───────────────┐     ┌──────────────────────┐
//!   │ ContentStore  │────▶│  Task parser          │
//!   │ (reqwest)     │     │  Dependency engine    │
//!   └───────────────┘     │  Derived views        │
//!         ▲               └──────────┬───────────┘
//!         │                          │
//!   ┌─────┴──────────────────────────▼───────────┐
//!   │ HTTP API (axum): /api/files, /api/tracker  │
//!   └────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - `store`: typed client for the GitHub Contents/Commits API
//! - `tracker`: tracker parsing, dependency graph, critical path, views
//! - `api`: HTTP route handlers and the application state
//! - `refresh`: cached documents with periodic background re-polling

pub mod api;
pub mod config;
pub mod refresh;
pub mod store;
pub mod tracker;

pub use config::Config;
