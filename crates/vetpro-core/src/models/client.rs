use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::validation::{normalize_optional, FormInput};

/// Pet owner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn new(tenant_id: Uuid, input: ClientInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, input: ClientInput) {
        self.first_name = input.first_name;
        self.last_name = input.last_name;
        self.email = input.email;
        self.phone = input.phone;
        self.address = input.address;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive match on full name or email, substring match on phone.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        let lowered = term.to_lowercase();
        self.full_name().to_lowercase().contains(&lowered)
            || self
                .email
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&lowered))
            || self.phone.as_deref().is_some_and(|p| p.contains(term))
    }

    pub fn summary(&self) -> ClientSummary {
        ClientSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Client listed together with the number of pets it owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ClientWithStats {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub client: Client,
    pub pet_count: i64,
}

/// Owner fields joined into pet and appointment listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl ClientSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ClientForm {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Validated client fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl FormInput for ClientForm {
    type Output = ClientInput;

    fn normalize(&mut self) {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = normalize_optional(self.email.take());
        self.phone = normalize_optional(self.phone.take());
        self.address = normalize_optional(self.address.take());
    }

    fn build(self) -> Result<Self::Output, AppError> {
        Ok(ClientInput {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn juan() -> Client {
        Client::new(
            Uuid::new_v4(),
            ClientInput {
                first_name: "Juan".to_string(),
                last_name: "Pérez".to_string(),
                email: Some("juan.perez@email.com".to_string()),
                phone: Some("+54 11 5555-0101".to_string()),
                address: None,
            },
        )
    }

    #[test]
    fn test_search_matches_name_email_and_phone() {
        let client = juan();
        assert!(client.matches_search("juan pé"));
        assert!(client.matches_search("EMAIL.COM"));
        assert!(client.matches_search("5555-0101"));
        assert!(client.matches_search(""));
        assert!(!client.matches_search("marta"));
    }

    #[test]
    fn test_form_requires_names() {
        let form = ClientForm {
            first_name: "  ".to_string(),
            last_name: "Pérez".to_string(),
            ..Default::default()
        };
        let err = form.into_input().unwrap_err();
        assert!(err.to_string().contains("First name is required"));
    }

    #[test]
    fn test_form_stores_blank_optionals_as_absent() {
        let form = ClientForm {
            first_name: " Marta ".to_string(),
            last_name: "Sánchez".to_string(),
            email: Some(String::new()),
            phone: Some(" +54 11 5555-0202 ".to_string()),
            address: Some("   ".to_string()),
        };
        let input = form.into_input().unwrap();
        assert_eq!(input.first_name, "Marta");
        assert_eq!(input.email, None);
        assert_eq!(input.phone.as_deref(), Some("+54 11 5555-0202"));
        assert_eq!(input.address, None);
    }
}
