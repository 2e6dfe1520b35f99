//! Customer profile: purchase-relevant attributes kept apart from the identity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Gender choices offered on the account form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    #[default]
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
}

impl Gender {
    /// Single-letter code stored in the database
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
        }
    }
}

impl From<&str> for Gender {
    fn from(code: &str) -> Self {
        match code {
            "M" => Gender::Male,
            _ => Gender::Female,
        }
    }
}

/// Profile-level fields of an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomerProfile {
    #[schema(example = "12345678")]
    pub document_id: String,
    pub gender: Gender,
    #[schema(example = "+1 555 0100")]
    pub phone: String,
    #[schema(value_type = Option<String>, example = "1990-04-21")]
    pub birthdate: Option<NaiveDate>,
    #[schema(example = "221B Baker Street")]
    pub address: String,
}

/// Customer profile linked 1:1 to a user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i32,
    pub user_id: Uuid,
    pub profile: CustomerProfile,
}
