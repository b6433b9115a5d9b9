//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep binary/caller layers decoupled from storage details.

pub mod person_service;
