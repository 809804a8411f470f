use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::validation::{normalize_optional, FormInput};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MedicalRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub pet_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    /// Set at creation and never changed by edits.
    pub date: DateTime<Utc>,
    pub diagnosis: String,
    pub treatment: String,
    pub symptoms: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl MedicalRecord {
    pub fn new(tenant_id: Uuid, input: MedicalRecordInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            pet_id: input.pet_id,
            veterinarian_id: input.veterinarian_id,
            date: now,
            diagnosis: input.diagnosis,
            treatment: input.treatment,
            symptoms: input.symptoms,
            attachments: input.attachments,
            created_at: now,
        }
    }

    /// Records stay attached to their pet; `input.pet_id` is ignored.
    pub fn apply(&mut self, input: MedicalRecordInput) {
        self.veterinarian_id = input.veterinarian_id;
        self.diagnosis = input.diagnosis;
        self.treatment = input.treatment;
        self.symptoms = input.symptoms;
        self.attachments = input.attachments;
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MedicalRecordForm {
    #[validate(required(message = "Patient is required"))]
    pub pet_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Diagnosis is required"))]
    pub diagnosis: String,
    #[validate(length(min = 1, message = "Treatment is required"))]
    pub treatment: String,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub veterinarian_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecordInput {
    pub pet_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    pub diagnosis: String,
    pub treatment: String,
    pub symptoms: Option<String>,
    pub attachments: Vec<String>,
}

impl FormInput for MedicalRecordForm {
    type Output = MedicalRecordInput;

    fn normalize(&mut self) {
        self.diagnosis = self.diagnosis.trim().to_string();
        self.treatment = self.treatment.trim().to_string();
        self.symptoms = normalize_optional(self.symptoms.take());
        self.attachments = std::mem::take(&mut self.attachments)
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
    }

    fn build(self) -> Result<Self::Output, AppError> {
        Ok(MedicalRecordInput {
            pet_id: self
                .pet_id
                .ok_or_else(|| AppError::validation("Patient is required"))?,
            veterinarian_id: self.veterinarian_id,
            diagnosis: self.diagnosis,
            treatment: self.treatment,
            symptoms: self.symptoms,
            attachments: self.attachments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(pet_id: Uuid) -> MedicalRecordInput {
        MedicalRecordInput {
            pet_id,
            veterinarian_id: None,
            diagnosis: "Otitis".to_string(),
            treatment: "Gotas".to_string(),
            symptoms: None,
            attachments: vec![],
        }
    }

    #[test]
    fn test_update_keeps_original_date() {
        let pet_id = Uuid::new_v4();
        let mut record = MedicalRecord::new(Uuid::new_v4(), input(pet_id));
        let original = record.date;
        let mut changed = input(pet_id);
        changed.treatment = "Antibiótico".to_string();
        record.apply(changed);
        assert_eq!(record.date, original);
        assert_eq!(record.treatment, "Antibiótico");
    }

    #[test]
    fn test_form_requires_diagnosis_and_treatment() {
        let form = MedicalRecordForm {
            pet_id: Some(Uuid::new_v4()),
            diagnosis: "Otitis".to_string(),
            treatment: "   ".to_string(),
            ..Default::default()
        };
        let err = form.into_input().unwrap_err();
        assert!(err.to_string().contains("Treatment is required"));
    }
}
