pub mod appointments;
pub mod clients;
pub mod dashboard;
pub mod pets;
pub mod records;
pub mod settings;

pub use appointments::AppointmentService;
pub use clients::ClientService;
pub use dashboard::DashboardService;
pub use pets::PetService;
pub use records::MedicalRecordService;
pub use settings::SettingsService;

use vetpro_core::AppError;

/// Log a failed operation before handing the error back to the caller.
pub(crate) fn logged<T>(action: &str, result: Result<T, AppError>) -> Result<T, AppError> {
    result.map_err(|e| {
        e.log(action);
        e
    })
}
