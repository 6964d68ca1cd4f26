use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::api::model::{parse_breed_list, parse_random_image};
use crate::api::{BreedName, DogApi, FetchError, ImageUrl};

/// HTTP client for the dog.ceo API.
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct DogCeoClient {
    http: Client,
    base_url: String,
}

impl DogCeoClient {
    /// Build a client for `base_url`. Without a timeout a stalled request
    /// stays pending until the server gives up.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> color_eyre::Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("lazydog/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let base_url: String = base_url.into();
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn breed_list_url(&self) -> String {
        format!("{}/breeds/list/all", self.base_url)
    }

    pub fn random_image_url(&self, breed: &BreedName) -> String {
        format!("{}/breed/{}/images/random", self.base_url, breed)
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!(url, "GET");
        let response = self.http.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DogApi for DogCeoClient {
    async fn list_breeds(&self) -> Result<Vec<BreedName>, FetchError> {
        let body = self.get(&self.breed_list_url()).await?;
        parse_breed_list(&body)
    }

    async fn random_image(&self, breed: &BreedName) -> Result<ImageUrl, FetchError> {
        let body = self.get(&self.random_image_url(breed)).await?;
        parse_random_image(&body)
    }

    async fn image_bytes(&self, url: &ImageUrl) -> Result<Vec<u8>, FetchError> {
        self.get(url.as_str()).await
    }
}
