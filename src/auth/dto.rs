use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{
    users::User,
    validation::{FieldRule, Fields, Rule},
};

/// Request body for user registration. Missing and `null` fields decode as
/// empty so they surface as field errors.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub password: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub const REGISTER_RULES: &[FieldRule] = &[
    FieldRule::new("name", Rule::Required, "Name must be specified."),
    FieldRule::new("email", Rule::Required, "Email must be specified."),
    FieldRule::new("email", Rule::Email, "Email must be a valid email address."),
    FieldRule::new("password", Rule::MinChars(6), "Password Must Be at Least 6 Characters"),
    FieldRule::new("password", Rule::HasDigit, "Password Must Contain a Number"),
    FieldRule::new("password", Rule::HasUppercase, "Password Must Contain an Uppercase Letter"),
    FieldRule::new("password", Rule::HasLowercase, "Password Must Contain a Lowercase Letter"),
];

pub const LOGIN_RULES: &[FieldRule] = &[
    FieldRule::new("email", Rule::Required, "Email must be specified."),
    FieldRule::new("email", Rule::Email, "Email must be a valid email address."),
    FieldRule::new("password", Rule::Required, "Password must be specified."),
];

impl Fields for RegisterRequest {
    fn field(&self, name: &str) -> &str {
        match name {
            "name" => &self.name,
            "email" => &self.email,
            "password" => &self.password,
            _ => "",
        }
    }
}

impl Fields for LoginRequest {
    fn field(&self, name: &str) -> &str {
        match name {
            "email" => &self.email,
            "password" => &self.password,
            _ => "",
        }
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Login payload: the public user plus its signed token.
#[derive(Debug, Serialize)]
pub struct LoginData {
    #[serde(flatten)]
    pub user: PublicUser,
    pub token: String,
}
