//! VetPro Database Layer
//!
//! Postgres repositories for the hosted backend. Every clinical query is scoped by
//! `tenant_id`; rows of other tenants are never returned or mutated.

pub mod db;
pub mod setup;

// Re-exports: repositories
pub use db::{
    AppointmentRepository, ClientRepository, MedicalRecordRepository, PetRepository,
    TenantRepository, UserProfileRepository,
};

// Re-exports: pool setup
pub use setup::{connect, run_migrations, setup_database};
