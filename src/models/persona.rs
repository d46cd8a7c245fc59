use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Age below which a person counts as a minor.
pub const ADULT_AGE: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "masculino")]
    Male,
    #[serde(rename = "femenino")]
    Female,
}

impl Gender {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Gender::Male => "masculino",
            Gender::Female => "femenino",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "masculino" => Ok(Gender::Male),
            "female" | "f" | "femenino" => Ok(Gender::Female),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

/// Server-owned person record as returned by `/api/personas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "edad")]
    pub age: u32,
    #[serde(rename = "genero")]
    pub gender: Gender,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: String,
}

impl PersonRecord {
    pub fn is_minor(&self) -> bool {
        self.age < ADULT_AGE
    }
}

/// New record. Like updates, only populated fields go on the wire; the
/// backend reports anything required but missing as a 422.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePersonRequest {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "edad", skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(rename = "genero", skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// Partial update: absent fields are never sent, so the backend patches only what is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePersonRequest {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "edad", skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(rename = "genero", skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl UpdatePersonRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.gender.is_none()
    }
}

/// Raw form input for the person editor. Nothing is validated locally;
/// the backend answers with 422 field errors instead.
#[derive(Debug, Clone, Default)]
pub struct PersonForm {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
}

impl PersonForm {
    pub fn to_create(&self) -> CreatePersonRequest {
        CreatePersonRequest {
            name: self.trimmed_name(),
            age: self.age,
            gender: self.gender,
        }
    }

    pub fn to_update(&self) -> UpdatePersonRequest {
        UpdatePersonRequest {
            name: self.trimmed_name(),
            age: self.age,
            gender: self.gender,
        }
    }

    // Blank names count as not filled in.
    fn trimmed_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}
