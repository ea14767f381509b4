use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Followers of one profile, unique by user id.
pub type FollowerSet = HashSet<Follower>;

/// An account that follows a profile.
///
/// Identity is the numeric user id (`pk`); two records with the same id are the
/// same follower even if the username changed between pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follower {
    #[serde(rename = "pk", deserialize_with = "deserialize_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Follower {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            full_name: None,
        }
    }

    /// Name written to the results file
    pub fn display_name(&self) -> &str {
        &self.username
    }
}

impl PartialEq for Follower {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Follower {}

impl Hash for Follower {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// One page of `/api/v1/friendships/<id>/followers/`
#[derive(Debug, Clone, Deserialize)]
pub struct FollowersPage {
    #[serde(default)]
    pub users: Vec<Follower>,
    #[serde(default, deserialize_with = "deserialize_cursor")]
    pub next_max_id: Option<String>,
}

// Instagram sends `pk` as a number on some endpoints and a string on others
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_string_or_number(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("empty user id"))
}

fn deserialize_cursor<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_string_or_number(deserializer)
}

// Helper to deserialize string or number as Option<String>
fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct StringOrNumberVisitor;

    impl<'de> de::Visitor<'de> for StringOrNumberVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            if v.is_empty() {
                Ok(None)
            } else {
                Ok(Some(v.to_string()))
            }
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrNumberVisitor)
}
