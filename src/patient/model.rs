//! Patient record and its transfer shape

use serde::{Deserialize, Serialize};

/// Persisted patient record
///
/// `id` is `None` until the record has been saved; storage assigns it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default)]
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Patient {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            ..Default::default()
        }
    }

    /// Overwrite every mutable field from `incoming`, keeping this record's id
    pub fn replace_fields(&mut self, incoming: Patient) {
        self.first_name = incoming.first_name;
        self.last_name = incoming.last_name;
        self.address = incoming.address;
        self.city = incoming.city;
        self.state = incoming.state;
        self.zip_code = incoming.zip_code;
        self.phone_number = incoming.phone_number;
        self.email = incoming.email;
    }
}

/// Wire representation used by list and search responses
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDto {
    #[serde(default)]
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
