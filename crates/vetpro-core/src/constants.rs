//! Application-wide constants.

use uuid::Uuid;

/// Identifier of the built-in demo clinic that is activated when nobody is signed in.
/// Format: 11111111-1111-1111-1111-111111111111
pub const DEMO_TENANT_ID: Uuid = Uuid::from_u128(0x11111111_1111_1111_1111_111111111111);

/// Schema tag embedded in every local snapshot key. Bumping it orphans old snapshots
/// so that a fresh demo dataset is seeded.
pub const SNAPSHOT_SCHEMA_VERSION: &str = "v10";

pub const DEFAULT_PRIMARY_COLOR: &str = "#10b981";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_TIMEZONE: &str = "UTC";

pub const DEFAULT_PET_SPECIES: &str = "Perro";

/// Pet name used in reminder messages when the appointment has no pet attached.
pub const FALLBACK_PET_NAME: &str = "Mascota";

/// Number of upcoming appointments shown on the dashboard.
pub const DASHBOARD_UPCOMING_LIMIT: usize = 5;
