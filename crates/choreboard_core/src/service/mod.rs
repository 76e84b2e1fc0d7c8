//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the HTTP layer decoupled from storage details.
//!
//! # Invariants
//! - `family_id` and `now` are explicit parameters of every call; services
//!   hold no session state.

pub mod active_view;
pub mod chore_service;
pub mod family_service;
