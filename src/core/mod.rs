//! Core coordination logic for envguard
//!
//! All external interactions are abstracted through port traits.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (contexts, verifications, statuses, leases, vetoes)
//! - `services/` - Verification runner, exclusion enforcer, unhappy veto
//! - `ports/` - Trait definitions for storage, evaluators, events, clock, config

pub mod models;
pub mod ports;
pub mod services;
