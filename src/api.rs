//! Access to the dog.ceo breed API.
//!
//! Screens never talk HTTP directly; they go through the [`DogApi`] trait so
//! tests can swap in a mock. Every call returns an explicit
//! `Result<_, FetchError>` instead of swallowing the failure.

mod client;
mod model;

use std::fmt::{self, Display};

use async_trait::async_trait;
use thiserror::Error;

pub use client::DogCeoClient;

/// Default base URL of the public dog.ceo API.
pub const DEFAULT_BASE_URL: &str = "https://dog.ceo/api";

/// A breed key as reported by the API (e.g. `"akita"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BreedName(String);

impl BreedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BreedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BreedName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BreedName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// URL of a dog picture. Opaque: never parsed or validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageUrl {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Why a fetch did not produce a value.
///
/// Network errors, non-2xx responses and unexpected bodies all end up here.
/// The variants only exist so the failure can be logged and, optionally,
/// shown; no caller treats them differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("request timed out")]
    TimedOut,
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::TimedOut
        } else if let Some(status) = error.status() {
            Self::Status(status.as_u16())
        } else if error.is_decode() {
            Self::Malformed(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// The operations the screens need from the outside world.
#[async_trait]
pub trait DogApi: Send + Sync {
    /// All breed keys, in the order the API reports them.
    async fn list_breeds(&self) -> Result<Vec<BreedName>, FetchError>;

    /// A random picture of `breed`. The breed is used verbatim as a path segment.
    async fn random_image(&self, breed: &BreedName) -> Result<ImageUrl, FetchError>;

    /// Raw bytes behind an image URL.
    async fn image_bytes(&self, url: &ImageUrl) -> Result<Vec<u8>, FetchError>;
}
