//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate registry mutations with save-through persistence.
//! - Hold client-side state for the remote feed variant.
//! - Keep front ends (FFI, CLI) decoupled from storage and sync details.

pub mod remote_session;
pub mod todo_service;
