//! Member records as exported by the membership database.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a member id is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid member id '{0}': expected a positive integer")]
pub struct InvalidMemberId(pub String);

/// Membership number.
///
/// Doubles as the entry's `cn`, `uid` and `uidNumber`, so it must be a
/// positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MemberId(u64);

impl MemberId {
    /// Create a member id; zero is rejected.
    pub fn new(value: u64) -> Result<Self, InvalidMemberId> {
        if value == 0 {
            return Err(InvalidMemberId(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Get the numeric value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MemberId {
    type Err = InvalidMemberId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = trimmed
            .parse::<u64>()
            .map_err(|_| InvalidMemberId(s.to_string()))?;
        Self::new(value).map_err(|_| InvalidMemberId(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for MemberId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The membership database exports ids as numbers or numeric strings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => MemberId::new(n).map_err(de::Error::custom),
            Raw::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

/// A member to provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "numero_membre", alias = "id")]
    pub id: MemberId,

    #[serde(rename = "nom", alias = "last_name")]
    pub last_name: String,

    #[serde(rename = "prenom", alias = "first_name")]
    pub first_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Member {
    /// Create a member without email.
    pub fn new(id: MemberId, last_name: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            id,
            last_name: last_name.into(),
            first_name: first_name.into(),
            email: None,
        }
    }

    /// Set email using builder pattern.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The member's email, if one is set and non-blank.
    pub fn contact_email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }
}

/// Contact fields pushed onto an existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileData {
    #[serde(rename = "nom", alias = "last_name")]
    pub last_name: String,

    #[serde(rename = "prenom", alias = "first_name")]
    pub first_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProfileData {
    /// Create profile data without email.
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            email: None,
        }
    }

    /// Set email using builder pattern.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The email, if one is set and non-blank.
    pub fn contact_email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    /// Turn into a full member record.
    #[must_use]
    pub fn into_member(self, id: MemberId) -> Member {
        Member {
            id,
            last_name: self.last_name,
            first_name: self.first_name,
            email: self.email,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_id_parsing() {
        assert_eq!("1234".parse::<MemberId>().unwrap().get(), 1234);
        assert_eq!(" 42 ".parse::<MemberId>().unwrap().get(), 42);
        assert!("".parse::<MemberId>().is_err());
        assert!("0".parse::<MemberId>().is_err());
        assert!("12a".parse::<MemberId>().is_err());
        assert!("-5".parse::<MemberId>().is_err());
    }

    #[test]
    fn test_member_deserializes_database_export() {
        let member: Member = serde_json::from_str(
            r#"{"numero_membre": "1234", "nom": "Dupont", "prenom": "Jean", "email": ""}"#,
        )
        .unwrap();

        assert_eq!(member.id.get(), 1234);
        assert_eq!(member.last_name, "Dupont");
        assert_eq!(member.first_name, "Jean");
        assert_eq!(member.contact_email(), None);
    }

    #[test]
    fn test_member_accepts_numeric_id_and_english_names() {
        let member: Member = serde_json::from_str(
            r#"{"id": 77, "last_name": "Martin", "first_name": "Alice", "email": "alice@example.org"}"#,
        )
        .unwrap();

        assert_eq!(member.id.to_string(), "77");
        assert_eq!(member.contact_email(), Some("alice@example.org"));
    }

    #[test]
    fn test_member_rejects_zero_id() {
        let result: Result<Member, _> =
            serde_json::from_str(r#"{"numero_membre": 0, "nom": "X", "prenom": "Y"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_into_member() {
        let id = MemberId::new(9).unwrap();
        let member = ProfileData::new("Durand", "Paul")
            .with_email("   ")
            .into_member(id);

        assert_eq!(member.id, id);
        assert_eq!(member.last_name, "Durand");
        assert_eq!(member.contact_email(), None);
    }
}
