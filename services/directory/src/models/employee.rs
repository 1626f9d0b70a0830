//! Employee model and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validation::{self, ValidationError, non_blank};

const MISSING_FIELDS: &str = "All fields are required";

/// Employee entity as stored and listed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub address: String,
    pub exact_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_data: Option<String>,
    pub photo_name: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

/// Coordinate as sent by the client: a JSON number or the geocoder's text form
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn value(&self) -> Result<f64, ValidationError> {
        match self {
            Coordinate::Number(n) => Ok(*n),
            Coordinate::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ValidationError::new("Invalid coordinates")),
        }
    }
}

/// Create/edit request body; every field is checked by [`EmployeePayload::validate`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    pub name: Option<String>,
    pub position: Option<String>,
    pub address: Option<String>,
    pub exact_address: Option<String>,
    pub latitude: Option<Coordinate>,
    pub longitude: Option<Coordinate>,
    pub photo_data: Option<String>,
    pub photo_name: Option<String>,
}

/// Every mutable employee field, validated and trimmed
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeFields {
    pub name: String,
    pub position: String,
    pub address: String,
    pub exact_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_data: Option<String>,
    pub photo_name: Option<String>,
}

impl EmployeePayload {
    /// Check the payload for a create or a full-replace edit.
    ///
    /// A missing or blank required field is rejected, never defaulted.
    pub fn validate(self) -> Result<EmployeeFields, ValidationError> {
        let missing = || ValidationError::new(MISSING_FIELDS);

        let name = non_blank(self.name).ok_or_else(missing)?;
        let position = non_blank(self.position).ok_or_else(missing)?;
        let address = non_blank(self.address).ok_or_else(missing)?;
        let exact_address = non_blank(self.exact_address).ok_or_else(missing)?;

        let latitude = match self.latitude {
            Some(Coordinate::Text(ref s)) if s.trim().is_empty() => return Err(missing()),
            Some(ref c) => c.value()?,
            None => return Err(missing()),
        };
        let longitude = match self.longitude {
            Some(Coordinate::Text(ref s)) if s.trim().is_empty() => return Err(missing()),
            Some(ref c) => c.value()?,
            None => return Err(missing()),
        };
        validation::validate_coordinates(latitude, longitude)?;

        let photo_data = non_blank(self.photo_data);
        if let Some(data) = &photo_data {
            validation::validate_photo_data(data)?;
        }

        Ok(EmployeeFields {
            name,
            position,
            address,
            exact_address,
            latitude,
            longitude,
            photo_data,
            photo_name: non_blank(self.photo_name),
        })
    }
}
