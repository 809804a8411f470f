use chrono::{DateTime, Utc};
use vetpro_core::constants::DASHBOARD_UPCOMING_LIMIT;
use vetpro_core::models::{local_day_bounds, AppointmentStatus, Dashboard, DashboardStats};
use vetpro_core::AppError;
use vetpro_gateway::DashboardGateway;

use super::logged;
use crate::context::TenantContext;

#[derive(Clone)]
pub struct DashboardService {
    ctx: TenantContext,
}

impl DashboardService {
    pub fn new(ctx: TenantContext) -> Self {
        Self { ctx }
    }

    /// Stats for the clinic's current calendar day and the next few appointments.
    pub async fn load(&self, now: DateTime<Utc>) -> Result<Dashboard, AppError> {
        let gateway = self.ctx.gateway();
        let (start, end) = local_day_bounds(self.ctx.timezone(), now);

        let stats = DashboardStats {
            total_patients: logged("count pets", gateway.count_pets().await)?,
            appointments_today: logged(
                "count today's appointments",
                gateway.count_appointments_between(start, end).await,
            )?,
            pending_appointments: logged(
                "count pending appointments",
                gateway
                    .count_appointments_by_status(AppointmentStatus::Pending)
                    .await,
            )?,
        };
        let upcoming = logged(
            "list upcoming appointments",
            gateway.list_upcoming(now, DASHBOARD_UPCOMING_LIMIT).await,
        )?;

        Ok(Dashboard { stats, upcoming })
    }
}
