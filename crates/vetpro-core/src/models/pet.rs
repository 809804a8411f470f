use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::DEFAULT_PET_SPECIES;
use crate::error::AppError;
use crate::models::client::ClientSummary;
use crate::validation::{normalize_optional, FormInput};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "pet_gender"))]
pub enum PetGender {
    #[default]
    #[serde(rename = "M")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "M"))]
    Male,
    #[serde(rename = "F")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "F"))]
    Female,
}

impl fmt::Display for PetGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PetGender::Male => write!(f, "M"),
            PetGender::Female => write!(f, "F"),
        }
    }
}

impl FromStr for PetGender {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "M" | "MALE" | "MACHO" => Ok(PetGender::Male),
            "F" | "FEMALE" | "HEMBRA" => Ok(PetGender::Female),
            other => Err(AppError::validation(format!(
                "Unknown pet gender '{}', expected M or F",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Pet {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: f64,
    pub weight: f64,
    pub gender: PetGender,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Pet {
    pub fn new(tenant_id: Uuid, input: PetInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            client_id: input.client_id,
            name: input.name,
            species: input.species,
            breed: input.breed,
            age: input.age,
            weight: input.weight,
            gender: input.gender,
            photo_url: input.photo_url,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, input: PetInput) {
        self.client_id = input.client_id;
        self.name = input.name;
        self.species = input.species;
        self.breed = input.breed;
        self.age = input.age;
        self.weight = input.weight;
        self.gender = input.gender;
        self.photo_url = input.photo_url;
    }

    pub fn summary(&self) -> PetSummary {
        PetSummary {
            id: self.id,
            name: self.name.clone(),
            species: self.species.clone(),
        }
    }
}

/// Pet joined with its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetWithOwner {
    #[serde(flatten)]
    pub pet: Pet,
    pub owner: Option<ClientSummary>,
}

impl PetWithOwner {
    /// Match on pet name or owner full name, case-insensitive.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.pet.name.to_lowercase().contains(&term)
            || self
                .owner
                .as_ref()
                .is_some_and(|o| o.full_name().to_lowercase().contains(&term))
    }
}

/// Pet fields joined into appointment listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetSummary {
    pub id: Uuid,
    pub name: String,
    pub species: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PetForm {
    #[validate(required(message = "Owner is required"))]
    pub client_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Pet name is required"))]
    pub name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    /// Years, fractional allowed. Unparsable input counts as 0.
    #[serde(default)]
    pub age: Option<String>,
    /// Kilograms, fractional allowed. Unparsable input counts as 0.
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub gender: Option<PetGender>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetInput {
    pub client_id: Uuid,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: f64,
    pub weight: f64,
    pub gender: PetGender,
    pub photo_url: Option<String>,
}

fn parse_measure(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().replace(',', ".").parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

impl FormInput for PetForm {
    type Output = PetInput;

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.species = self.species.trim().to_string();
        if self.species.is_empty() {
            self.species = DEFAULT_PET_SPECIES.to_string();
        }
        self.breed = normalize_optional(self.breed.take());
        self.photo_url = normalize_optional(self.photo_url.take());
    }

    fn build(self) -> Result<Self::Output, AppError> {
        let client_id = self
            .client_id
            .ok_or_else(|| AppError::validation("Owner is required"))?;
        Ok(PetInput {
            client_id,
            name: self.name,
            species: self.species,
            breed: self.breed,
            age: parse_measure(self.age.as_deref()),
            weight: parse_measure(self.weight.as_deref()),
            gender: self.gender.unwrap_or_default(),
            photo_url: self.photo_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_defaults() {
        let form = PetForm {
            client_id: Some(Uuid::new_v4()),
            name: "Rocco".to_string(),
            age: Some("abc".to_string()),
            weight: Some("32,5".to_string()),
            ..Default::default()
        };
        let input = form.into_input().unwrap();
        assert_eq!(input.species, "Perro");
        assert_eq!(input.gender, PetGender::Male);
        assert_eq!(input.age, 0.0);
        assert_eq!(input.weight, 32.5);
    }

    #[test]
    fn test_form_requires_owner_and_name() {
        let form = PetForm {
            name: "Luna".to_string(),
            ..Default::default()
        };
        let err = form.into_input().unwrap_err();
        assert!(err.to_string().contains("Owner is required"));

        let form = PetForm {
            client_id: Some(Uuid::new_v4()),
            name: " ".to_string(),
            ..Default::default()
        };
        assert!(form.into_input().is_err());
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!("f".parse::<PetGender>().unwrap(), PetGender::Female);
        assert_eq!(PetGender::Male.to_string(), "M");
        assert_eq!(serde_json::to_string(&PetGender::Female).unwrap(), "\"F\"");
        assert!("x".parse::<PetGender>().is_err());
    }
}
