//! VetPro Persistence Gateway
//!
//! Feature modules read and write entities only through the [`Gateway`] trait. A gateway is
//! bound to one tenant when it is built, so every call is implicitly scoped to that tenant.
//!
//! Two backends implement it:
//!
//! - [`RemoteGateway`]: tenant-scoped queries against the hosted Postgres database.
//! - [`LocalGateway`]: demo mode. Each collection is one JSON snapshot under a
//!   tenant-namespaced key, seeded with a fixed demo dataset on first load.
//!
//! [`GatewayFactory`] picks one of them from the tenant's demo flag.

pub mod factory;
pub mod local;
#[cfg(feature = "remote")]
pub mod remote;
pub mod seed;
pub mod traits;

// Re-export commonly used types
pub use factory::GatewayFactory;
pub use local::LocalGateway;
#[cfg(feature = "remote")]
pub use remote::RemoteGateway;
pub use traits::{
    AppointmentGateway, ClientGateway, DashboardGateway, Gateway, GatewayMode,
    MedicalRecordGateway, PetGateway, SettingsGateway, TenantScoped,
};
