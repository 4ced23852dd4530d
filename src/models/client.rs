use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let first_name = first_name.into();
        if first_name.trim().is_empty() {
            return Err(ValidationError::EmptyFirstName);
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            first_name,
            last_name: last_name.into(),
            date_of_birth,
            diagnosis: None,
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_first_name() {
        let dob = NaiveDate::from_ymd_opt(2018, 3, 14).unwrap();
        assert_eq!(
            Client::new("  ", "Nguyen", dob).unwrap_err(),
            ValidationError::EmptyFirstName
        );
    }

    #[test]
    fn new_client_starts_active_with_unique_id() {
        let dob = NaiveDate::from_ymd_opt(2017, 9, 2).unwrap();
        let a = Client::new("Mia", "Ward", dob).unwrap();
        let b = Client::new("Mia", "Ward", dob).unwrap();
        assert!(a.is_active);
        assert_ne!(a.id, b.id);
    }
}
