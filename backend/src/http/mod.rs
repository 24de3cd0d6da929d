//! HTTP server module for the night-sky engine.
//!
//! An axum REST surface over [`crate::services::NightSkyService`]. Angles on
//! the wire are degrees and instants are RFC 3339; the conversion to the
//! engine's radians happens in [`dto`].
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP layer (axum handlers, DTOs)            │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  NightSkyService + cache                     │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  Store layer (db/)                           │
//! └──────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
