//! VetPro feature modules
//!
//! One service per clinic feature: clients, pets, appointments, medical records, settings
//! and the dashboard. Each is built from a [`TenantContext`] and talks to storage only
//! through the gateway it carries. Form validation happens here, before any gateway call,
//! and deletes go through a [`Confirmation`] step first.

pub mod confirm;
pub mod context;
pub mod services;

pub use confirm::{Confirmation, DeleteOutcome};
pub use context::TenantContext;
pub use services::{
    AppointmentService, ClientService, DashboardService, MedicalRecordService, PetService,
    SettingsService,
};
