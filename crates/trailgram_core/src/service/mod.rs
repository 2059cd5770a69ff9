//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate forest mutations, persistence and change notification.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod folder_store;
