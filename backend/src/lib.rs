//! # nightsky
//!
//! Computes the sky seen by an observer standing on a planet of another star
//! system: which catalog stars are above the local horizon, where they
//! appear, how bright they look and what color they have.
//!
//! ## Pipeline
//!
//! 1. **Time**: UTC instant → Julian Date (UTC/TT) and sidereal time.
//! 2. **Ephemeris**: Keplerian elements → planet position, spin axis and
//!    prime meridian → the observer's East-North-Up frame.
//! 3. **Star query**: stream candidate stars around the planet from the
//!    store, cut by level of detail.
//! 4. **Sky transform**: world position → azimuth / altitude.
//! 5. **Photometry**: distance modulus, atmospheric extinction, color.
//! 6. **Cache**: results are cached per quantized request fingerprint.
//!
//! ## Modules
//!
//! - [`api`]: identifiers and the value types crossing the crate boundary
//! - [`models`]: request/result, store row and frame types
//! - [`db`]: store traits and the in-memory implementation
//! - [`services`]: the pipeline stages and the orchestrator
//! - [`config`]: TOML configuration
//! - [`http`]: axum REST surface (feature `http-server`)
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use nightsky::api::NightSkyRequest;
//! use nightsky::db::LocalRepository;
//! use nightsky::services::{NightSkyCache, NightSkyService, TimeContext, TimeScales};
//!
//! # async fn run() -> Result<(), nightsky::services::NightSkyError> {
//! let repo = LocalRepository::new();
//! let service = NightSkyService::new(
//!     Arc::new(repo),
//!     Arc::new(TimeContext::initialized(TimeScales::default())),
//!     Arc::new(NightSkyCache::default()),
//! );
//! let request = NightSkyRequest::builder("kepler-22b", "kepler-22", chrono::Utc::now())
//!     .observer(0.3, 1.2)
//!     .build()?;
//! let sky = service.compute_night_sky(&request).await?;
//! println!("{} stars visible", sky.visible_count);
//! # Ok(())
//! # }
//! ```

// RepositoryError carries a structured context
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
