use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::client::ClientSummary;
use crate::models::pet::PetSummary;
use crate::validation::{normalize_optional, FormInput};

/// Appointment status. Any status may change to any other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "appt_status", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(AppointmentStatus::Pending),
            "CONFIRMED" => Ok(AppointmentStatus::Confirmed),
            "CANCELLED" => Ok(AppointmentStatus::Cancelled),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            other => Err(AppError::validation(format!(
                "Unknown appointment status '{}'",
                other
            ))),
        }
    }
}

/// Status filter used by the appointment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AppointmentStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: AppointmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Appointment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub pet_id: Uuid,
    /// Owner of the pet at booking time.
    pub client_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    pub date_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub reason: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(tenant_id: Uuid, input: AppointmentInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            pet_id: input.pet_id,
            client_id: input.client_id,
            veterinarian_id: input.veterinarian_id,
            date_time: input.date_time,
            status: input.status,
            reason: input.reason,
            notes: input.notes,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, input: AppointmentInput) {
        self.pet_id = input.pet_id;
        self.client_id = input.client_id;
        self.veterinarian_id = input.veterinarian_id;
        self.date_time = input.date_time;
        self.status = input.status;
        self.reason = input.reason;
        self.notes = input.notes;
    }
}

/// Appointment joined with its pet and client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentWithDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub pet: Option<PetSummary>,
    pub client: Option<ClientSummary>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AppointmentForm {
    #[validate(required(message = "Client is required"))]
    pub client_id: Option<Uuid>,
    #[validate(required(message = "Pet is required"))]
    pub pet_id: Option<Uuid>,
    #[validate(required(message = "Date is required"))]
    pub date: Option<NaiveDate>,
    #[validate(required(message = "Time is required"))]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub veterinarian_id: Option<Uuid>,
}

/// Appointment form after the presence checks, still in wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub client_id: Uuid,
    pub pet_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub veterinarian_id: Option<Uuid>,
}

impl AppointmentDraft {
    /// Resolve the wall-clock date and time in the clinic's timezone.
    pub fn scheduled_in(self, tz: Tz) -> Result<AppointmentInput, AppError> {
        let local = self.date.and_time(self.time);
        let date_time = tz
            .from_local_datetime(&local)
            .earliest()
            .ok_or_else(|| {
                AppError::validation(format!(
                    "{} does not exist in timezone {}",
                    local.format("%d/%m/%Y %H:%M"),
                    tz.name()
                ))
            })?
            .with_timezone(&Utc);

        Ok(AppointmentInput {
            client_id: self.client_id,
            pet_id: self.pet_id,
            veterinarian_id: self.veterinarian_id,
            date_time,
            status: self.status,
            reason: self.reason,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentInput {
    pub client_id: Uuid,
    pub pet_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    pub date_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub reason: String,
    pub notes: Option<String>,
}

impl FormInput for AppointmentForm {
    type Output = AppointmentDraft;

    fn normalize(&mut self) {
        self.reason = self.reason.trim().to_string();
        self.notes = normalize_optional(self.notes.take());
    }

    fn build(self) -> Result<Self::Output, AppError> {
        let missing = |what: &str| AppError::validation(format!("{} is required", what));
        Ok(AppointmentDraft {
            client_id: self.client_id.ok_or_else(|| missing("Client"))?,
            pet_id: self.pet_id.ok_or_else(|| missing("Pet"))?,
            date: self.date.ok_or_else(|| missing("Date"))?,
            time: self.time.ok_or_else(|| missing("Time"))?,
            reason: self.reason,
            notes: self.notes,
            status: self.status.unwrap_or_default(),
            veterinarian_id: self.veterinarian_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(
            "pending".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Pending
        );
        assert_eq!(
            "Confirmed".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Confirmed
        );
        assert!("rescheduled".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_status_filter() {
        let filter: StatusFilter = "all".parse().unwrap();
        assert!(filter.matches(AppointmentStatus::Cancelled));
        let filter: StatusFilter = "pending".parse().unwrap();
        assert!(filter.matches(AppointmentStatus::Pending));
        assert!(!filter.matches(AppointmentStatus::Confirmed));
    }

    #[test]
    fn test_form_defaults_to_pending() {
        let form = AppointmentForm {
            client_id: Some(Uuid::new_v4()),
            pet_id: Some(Uuid::new_v4()),
            date: NaiveDate::from_ymd_opt(2026, 3, 10),
            time: NaiveTime::from_hms_opt(9, 30, 0),
            reason: " Vacunación ".to_string(),
            ..Default::default()
        };
        let draft = form.into_input().unwrap();
        assert_eq!(draft.status, AppointmentStatus::Pending);
        assert_eq!(draft.reason, "Vacunación");
    }

    #[test]
    fn test_form_requires_date_and_time() {
        let form = AppointmentForm {
            client_id: Some(Uuid::new_v4()),
            pet_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let err = form.into_input().unwrap_err().to_string();
        assert!(err.contains("Date is required"));
        assert!(err.contains("Time is required"));
    }

    #[test]
    fn test_scheduled_in_tenant_timezone() {
        let draft = AppointmentDraft {
            client_id: Uuid::new_v4(),
            pet_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            reason: String::new(),
            notes: None,
            status: AppointmentStatus::Pending,
            veterinarian_id: None,
        };
        let input = draft
            .scheduled_in(chrono_tz::America::Argentina::Buenos_Aires)
            .unwrap();
        // Buenos Aires is UTC-3 without daylight saving.
        assert_eq!(input.date_time.to_rfc3339(), "2026-03-10T12:30:00+00:00");
    }
}
