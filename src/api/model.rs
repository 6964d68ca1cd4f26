use serde::Deserialize;
use serde_json::{Map, Value};

use crate::api::{BreedName, FetchError, ImageUrl};

/// Body of `GET /breeds/list/all`.
///
/// `message` maps breed → sub-breeds. `serde_json` is built with
/// `preserve_order`, so the map keeps the order of the response.
#[derive(Debug, Deserialize)]
struct BreedListResponse {
    message: Map<String, Value>,
}

/// Body of `GET /breed/{breed}/images/random`.
#[derive(Debug, Deserialize)]
struct RandomImageResponse {
    message: String,
}

pub fn parse_breed_list(body: &[u8]) -> Result<Vec<BreedName>, FetchError> {
    let response: BreedListResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    // Sub-breeds are not used anywhere
    Ok(response.message.into_iter().map(|(key, _)| BreedName::from(key)).collect())
}

pub fn parse_random_image(body: &[u8]) -> Result<ImageUrl, FetchError> {
    let response: RandomImageResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    Ok(ImageUrl::new(response.message))
}
