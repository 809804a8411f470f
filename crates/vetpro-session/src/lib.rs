//! VetPro session handling
//!
//! Talks to the authentication service and turns the current session into the active
//! tenant. [`TenantResolver`] owns that lifecycle: it resolves once on start, then follows
//! session changes until it is shut down.

pub mod directory;
pub mod error;
pub mod gotrue;
pub mod memory;
pub mod provider;
pub mod resolver;

pub use directory::{EmptyDirectory, TenantDirectory};
#[cfg(feature = "postgres")]
pub use directory::PgTenantDirectory;
pub use error::AuthError;
pub use gotrue::GoTrueClient;
pub use memory::InMemoryAuthProvider;
pub use provider::{AuthProvider, AuthUser, Session, SessionEvent};
pub use resolver::{ResolverState, TenantResolver};
