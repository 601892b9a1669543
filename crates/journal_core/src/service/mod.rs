//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and organizer views into use-case APIs.
//! - Keep CLI/UI layers decoupled from storage details.

pub mod journal_service;
