/// Value objects for the domain layer
use super::base::{DomainError, DomainResult, ValueObject};
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

/// Page titles that arrive through a request path
const PATH_TITLE_PATTERN: &str = r"^[a-zA-Z0-9]+$";

/// Opaque, globally unique identifier shared by pages and comments.
///
/// The nil identifier marks a record that has not been persisted yet.
/// Rendered as 32 lowercase hex digits; parsing also accepts the hyphenated
/// UUID form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        ObjectId(Uuid::new_v4())
    }

    /// The "not yet persisted" identifier
    pub fn nil() -> Self {
        ObjectId(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Parse an identifier from its hex form.
    pub fn parse(value: &str) -> DomainResult<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(DomainError::InvalidValue("ObjectId cannot be empty".to_string()));
        }
        Uuid::parse_str(value)
            .map(ObjectId)
            .map_err(|e| DomainError::InvalidValue(format!("Invalid ObjectId '{}': {}", value, e)))
    }

    pub fn to_hex(&self) -> String {
        self.0.simple().to_string()
    }
}

impl ValueObject for ObjectId {}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        ObjectId::parse(&value).map_err(de::Error::custom)
    }
}

/// A page title taken from a request path such as `/view/<title>`.
///
/// Only ASCII letters and digits are accepted. The repository itself stores
/// any title; this restriction belongs to the request flows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageTitle(String);

impl PageTitle {
    pub fn parse(title: impl Into<String>) -> DomainResult<Self> {
        static TITLE_REGEX: OnceLock<Regex> = OnceLock::new();
        let title_regex = TITLE_REGEX.get_or_init(|| Regex::new(PATH_TITLE_PATTERN).unwrap());

        let title = title.into();
        if !title_regex.is_match(&title) {
            return Err(DomainError::InvalidValue(format!(
                "Page title must be letters and digits only: '{}'",
                title
            )));
        }
        Ok(PageTitle(title))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValueObject for PageTitle {}

impl fmt::Display for PageTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
