//! Reciclo - recycling management service.
//!
//! Producers publish waste materials, curators review them, admins run the
//! program. The heart of the service is the material review workflow:
//!
//! ```text
//! ┌──────────┐   approve   ┌──────────┐
//! │          ├────────────►│ approved │──► +points, Collection row
//! │ pending  │             └──────────┘
//! │          ├────────────►┌──────────┐
//! └──────────┘   reject    │ rejected │
//!                          └──────────┘
//! ```
//!
//! A material is reviewed at most once. Approval awards points to the
//! producer and appends an immutable Collection record, all inside one
//! database transaction. Achievements are never stored per user - they are
//! derived from the point balance on every read.
//!
//! Authentication is handled upstream: the fronting gateway authenticates
//! the session and forwards the user id with each request. This service
//! owns role and account-status enforcement only.

// === Core Modules ===

/// Achievement evaluation (pure, derived from points).
pub mod achievements;

/// REST API.
pub mod api;

/// Runtime configuration.
pub mod config;

/// Database pool, schema, and catalog seeds.
pub mod db;

/// Error taxonomy shared across the service.
pub mod error;

/// Entity types and their enumerations.
pub mod models;

/// Material review workflow.
pub mod review;

/// Demo data for the `seed` subcommand.
pub mod seed;

/// Typed queries over the entity tables.
pub mod store;
