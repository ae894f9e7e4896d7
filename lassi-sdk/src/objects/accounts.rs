//! Sign-up, sign-in and profile types.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::empty_string_as_none;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub mobile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Public part of a user returned on sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInResponse {
    pub message: String,
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub user: UserSummary,
}

/// Generic `{"message": "..."}` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A user profile without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: String,
    /// ISO date (`YYYY-MM-DD`).
    pub dob: Option<time::Date>,
    pub address: Option<String>,
}

/// `PUT /users/profile` request body.
///
/// An absent `name` or `mobile` keeps the stored value. `dob` and `address`
/// are always replaced; blank or missing values clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    pub dob: Option<time::Date>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub address: Option<String>,
}

fn optional_date<'de, D>(deserializer: D) -> Result<Option<time::Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let format = time::macros::format_description!("[year]-[month]-[day]");
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        // Date pickers sometimes send a full timestamp; keep the date part.
        Some(s) => time::Date::parse(s.get(..10).unwrap_or(s), format)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_profile_blank_fields() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"name":"Meera","mobile":"555","dob":"","address":""}"#)
                .unwrap();
        assert_eq!(req.name.as_deref(), Some("Meera"));
        assert_eq!(req.dob, None);
        assert_eq!(req.address, None);
    }

    #[test]
    fn test_update_profile_dob_from_timestamp() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"dob":"1999-12-31T00:00:00.000Z"}"#).unwrap();
        assert_eq!(req.dob, Some(time::macros::date!(1999 - 12 - 31)));
        assert_eq!(req.mobile, None);
    }

    #[test]
    fn test_profile_dob_serializes_as_iso_date() {
        let profile = ProfileResponse {
            id: Uuid::nil(),
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
            mobile: "555".to_string(),
            dob: Some(time::macros::date!(2000 - 01 - 15)),
            address: None,
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["dob"], "2000-01-15");
    }
}
