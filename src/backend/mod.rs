//! Development Stub Backend
//!
//! Serves the dashboard's HTTP routes from an in-memory catalog so the HTTP
//! client can be exercised end to end.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  Stub Server                     │
//! ├──────────────────────────────────────────────────┤
//! │  POST /login               → Issue JWT           │
//! │  GET  /me                  → Current identity    │
//! │  GET  /courses             → Course list         │
//! │  POST /courses             → Add course (admin)  │
//! │  GET  /education-progress  → Programs (admin)    │
//! │  POST /education-progress  → Multipart upload    │
//! │  GET  /paying/students     → Payers (admin)      │
//! │  GET  /hostel              → Hostel assignment   │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod server;

pub use api::{api_router, ServerState};
pub use auth::{AuthState, Claims, ErrorResponse, ServerError};
pub use config::ServerConfig;
pub use server::StubServer;
