pub mod appointment;
pub mod client;
pub mod dashboard;
pub mod medical_record;
pub mod pet;
pub mod tenant;
pub mod user;

pub use appointment::*;
pub use client::*;
pub use dashboard::*;
pub use medical_record::*;
pub use pet::*;
pub use tenant::*;
pub use user::*;
