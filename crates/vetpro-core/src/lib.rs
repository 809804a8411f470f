//! VetPro Core Library
//!
//! This crate provides the entity schemas, form validation, error types, configuration
//! and the notification link builder shared by every VetPro component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod notification;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use notification::{appointment_reminder_message, budget_message, build_whatsapp_link};
pub use validation::FormInput;
