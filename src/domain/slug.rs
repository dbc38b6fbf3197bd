use crate::error::{Result, RetroError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Short public identifier of a board, used in URLs and topic paths
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub const LENGTH: usize = 8;
    pub const ALPHABET: &'static [u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

    /// Draws a fresh slug; uniqueness is checked against storage by the caller
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let slug = (0..Self::LENGTH)
            .map(|_| char::from(Self::ALPHABET[rng.random_range(0..Self::ALPHABET.len())]))
            .collect();
        Self(slug)
    }

    pub fn parse(value: &str) -> Result<Self> {
        let valid = value.len() == Self::LENGTH
            && value.bytes().all(|b| Self::ALPHABET.contains(&b));
        if valid {
            Ok(Self(value.to_string()))
        } else {
            Err(RetroError::bad_request(format!("Invalid board slug '{}'", value)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = RetroError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}
