//! Allow-list of searchable place names.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown next to the search control when a submission is rejected.
pub const UNKNOWN_PLACE_MESSAGE: &str = "해당하는 지역이 없습니다";

/// The submitted value is not on the allow-list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("해당하는 지역이 없습니다: '{value}'")]
pub struct UnknownPlace {
    pub value: String,
}

/// Ordered, case-sensitive list of places the search accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList(Vec<String>);

impl Default for AllowList {
    fn default() -> Self {
        Self(vec!["seoul".to_string(), "incheon".to_string()])
    }
}

impl AllowList {
    pub fn new(cities: Vec<String>) -> Self {
        Self(cities)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|city| city == value)
    }

    /// Accept `value` only on an exact match.
    pub fn validate<'a>(&self, value: &'a str) -> Result<&'a str, UnknownPlace> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(UnknownPlace { value: value.to_string() })
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cities_in_order() {
        let list = AllowList::default();
        assert_eq!(list.iter().collect::<Vec<_>>(), ["seoul", "incheon"]);
    }

    #[test]
    fn exact_match_is_accepted() {
        assert_eq!(AllowList::default().validate("incheon"), Ok("incheon"));
    }

    #[test]
    fn match_is_case_sensitive() {
        let err = AllowList::default().validate("Seoul").unwrap_err();
        assert_eq!(err.value, "Seoul");
        assert!(err.to_string().starts_with(UNKNOWN_PLACE_MESSAGE));
    }

    #[test]
    fn partial_and_padded_values_are_rejected() {
        let list = AllowList::default();
        assert!(list.validate("seo").is_err());
        assert!(list.validate(" seoul").is_err());
        assert!(list.validate("").is_err());
    }
}
