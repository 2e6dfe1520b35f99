//! Account form: the combined identity + profile payload and its partition.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::customer::{Customer, CustomerProfile, Gender};
use super::user::User;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ()\-]{3,20}$").expect("phone pattern is valid"));

/// Identity-level fields of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IdentityFields {
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john@example.com")]
    pub email: String,
}

impl From<&User> for IdentityFields {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Account update payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AccountForm {
    #[validate(length(min = 1, max = 30, message = "First name must be 1-30 characters"))]
    #[schema(example = "John")]
    pub first_name: String,
    #[validate(length(min = 1, max = 30, message = "Last name must be 1-30 characters"))]
    #[schema(example = "Doe")]
    pub last_name: String,
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    #[schema(example = "john@example.com")]
    pub email: String,
    #[validate(length(min = 1, max = 12, message = "Document id must be 1-12 characters"))]
    #[schema(example = "12345678")]
    pub document_id: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "1990-04-21")]
    pub birthdate: Option<NaiveDate>,
    #[validate(regex(path = *PHONE_RE, message = "Enter a valid phone number"))]
    #[schema(example = "+1 555 0100")]
    pub phone: String,
    #[validate(length(min = 1, message = "Address is required"))]
    #[schema(example = "221B Baker Street")]
    pub address: String,
}

impl AccountForm {
    /// Partition the form into identity-level and profile-level fields.
    pub fn split(self) -> (IdentityFields, CustomerProfile) {
        let identity = IdentityFields {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        };
        let profile = CustomerProfile {
            document_id: self.document_id,
            gender: self.gender,
            phone: self.phone,
            birthdate: self.birthdate,
            address: self.address,
        };
        (identity, profile)
    }
}

/// Account as presented back to the user.
///
/// Profile fields are only present once a customer profile exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    #[serde(flatten)]
    pub identity: IdentityFields,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub profile: Option<CustomerProfile>,
}

impl AccountView {
    /// Merge the identity with its profile, if any.
    pub fn new(user: &User, customer: Option<Customer>) -> Self {
        Self {
            identity: IdentityFields::from(user),
            profile: customer.map(|c| c.profile),
        }
    }
}
