//! Database repositories
//!
//! One repository per table. Joined listings (pets with owners, appointments with pet and
//! client) are resolved with SQL joins and mapped into the core view models here.

pub mod appointment;
pub mod client;
pub mod medical_record;
pub mod pet;
pub mod tenant;
pub mod user_profile;

pub use appointment::AppointmentRepository;
pub use client::ClientRepository;
pub use medical_record::MedicalRecordRepository;
pub use pet::PetRepository;
pub use tenant::TenantRepository;
pub use user_profile::UserProfileRepository;
