//! Commands that talk to the dog API.
//!
//! Each one runs under a [`Ticket`] from the owning screen's `RequestSlot`
//! and reports a [`Fetched`] tagged with the ticket's id. A cancelled ticket
//! ends the command without reporting anything.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use image::DynamicImage;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::api::{BreedName, DogApi, FetchError, ImageUrl};
use crate::app::AppMessage;
use crate::commands::Command;
use crate::request::{RequestId, Ticket};

/// Outcome of a supervised request.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub id: RequestId,
    pub result: Result<T, FetchError>,
}

async fn until_cancelled<T>(ticket: &Ticket, request: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        () = ticket.cancelled() => None,
        value = request => Some(value),
    }
}

fn report<T, M: From<Fetched<T>>>(tx: &UnboundedSender<M>, id: RequestId, result: Result<T, FetchError>) {
    if tx.send(Fetched { id, result }.into()).is_err() {
        debug!("receiver gone, dropping result");
    }
}

/// `GET /breeds/list/all`
pub struct FetchBreedsCmd<M> {
    api: Arc<dyn DogApi>,
    ticket: Ticket,
    tx: UnboundedSender<M>,
}

impl<M> FetchBreedsCmd<M> {
    pub fn new(api: Arc<dyn DogApi>, ticket: Ticket, tx: UnboundedSender<M>) -> Self {
        Self { api, ticket, tx }
    }
}

#[async_trait]
impl<M> Command for FetchBreedsCmd<M>
where
    M: From<Fetched<Vec<BreedName>>> + Send + 'static,
{
    fn name(&self) -> String {
        "Loading breeds".to_string()
    }

    async fn execute(self: Box<Self>, _app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let Some(result) = until_cancelled(&self.ticket, self.api.list_breeds()).await else {
            debug!("breed list request cancelled");
            return Ok(());
        };
        report(&self.tx, self.ticket.id(), result);
        Ok(())
    }
}

/// `GET /breed/{breed}/images/random`
pub struct FetchRandomImageCmd<M> {
    api: Arc<dyn DogApi>,
    breed: BreedName,
    ticket: Ticket,
    tx: UnboundedSender<M>,
}

impl<M> FetchRandomImageCmd<M> {
    pub fn new(api: Arc<dyn DogApi>, breed: BreedName, ticket: Ticket, tx: UnboundedSender<M>) -> Self {
        Self {
            api,
            breed,
            ticket,
            tx,
        }
    }
}

#[async_trait]
impl<M> Command for FetchRandomImageCmd<M>
where
    M: From<Fetched<ImageUrl>> + Send + 'static,
{
    fn name(&self) -> String {
        format!("Fetching a {} picture", self.breed)
    }

    async fn execute(self: Box<Self>, _app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let request = self.api.random_image(&self.breed);
        let Some(result) = until_cancelled(&self.ticket, request).await else {
            debug!(breed = %self.breed, "random image request cancelled");
            return Ok(());
        };
        report(&self.tx, self.ticket.id(), result);
        Ok(())
    }
}

/// Download and decode the picture behind an image URL.
pub struct LoadPixelsCmd<M> {
    api: Arc<dyn DogApi>,
    url: ImageUrl,
    ticket: Ticket,
    tx: UnboundedSender<M>,
}

impl<M> LoadPixelsCmd<M> {
    pub fn new(api: Arc<dyn DogApi>, url: ImageUrl, ticket: Ticket, tx: UnboundedSender<M>) -> Self {
        Self {
            api,
            url,
            ticket,
            tx,
        }
    }

    async fn load(&self) -> Result<DynamicImage, FetchError> {
        let bytes = self.api.image_bytes(&self.url).await?;
        tokio::task::spawn_blocking(move || decode_image(&bytes))
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
    }
}

#[async_trait]
impl<M> Command for LoadPixelsCmd<M>
where
    M: From<Fetched<DynamicImage>> + Send + 'static,
{
    fn name(&self) -> String {
        "Loading picture".to_string()
    }

    async fn execute(self: Box<Self>, _app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let Some(result) = until_cancelled(&self.ticket, self.load()).await else {
            debug!(url = %self.url, "picture download cancelled");
            return Ok(());
        };
        report(&self.tx, self.ticket.id(), result);
        Ok(())
    }
}

/// Decode image bytes in any of the enabled formats.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, FetchError> {
    image::load_from_memory(bytes).map_err(|e| FetchError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::request::{RequestPolicy, RequestSlot};
    use crate::testing::{ApiCall, MockDogApi, png_bytes};

    fn app_tx() -> UnboundedSender<AppMessage> {
        mpsc::unbounded_channel().0
    }

    #[tokio::test]
    async fn test_fetch_breeds_reports_ticket_id() {
        let api = Arc::new(MockDogApi::new().with_breeds(&["akita", "beagle"]));
        let mut slot = RequestSlot::new(RequestPolicy::Supersede);
        let ticket = slot.begin().unwrap();
        let id = ticket.id();
        let (tx, mut rx) = mpsc::unbounded_channel::<Fetched<Vec<BreedName>>>();

        Box::new(FetchBreedsCmd::new(api, ticket, tx))
            .execute(app_tx())
            .await
            .unwrap();

        let fetched = rx.try_recv().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(
            fetched.result.unwrap(),
            vec![BreedName::from("akita"), BreedName::from("beagle")]
        );
    }

    #[tokio::test]
    async fn test_cancelled_request_reports_nothing() {
        let api = Arc::new(MockDogApi::new().with_image("pug", "https://x/pug.jpg"));
        let mut slot = RequestSlot::new(RequestPolicy::Supersede);
        let ticket = slot.begin().unwrap();
        slot.cancel();
        let (tx, mut rx) = mpsc::unbounded_channel::<Fetched<ImageUrl>>();

        Box::new(FetchRandomImageCmd::new(api, "pug".into(), ticket, tx))
            .execute(app_tx())
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_random_image_error_is_reported() {
        let api = Arc::new(MockDogApi::new());
        let mut slot = RequestSlot::new(RequestPolicy::Supersede);
        let (tx, mut rx) = mpsc::unbounded_channel::<Fetched<ImageUrl>>();

        Box::new(FetchRandomImageCmd::new(api.clone(), "nope".into(), slot.begin().unwrap(), tx))
            .execute(app_tx())
            .await
            .unwrap();

        assert_eq!(rx.try_recv().unwrap().result, Err(FetchError::Status(404)));
        assert_eq!(api.calls(), vec![ApiCall::RandomImage("nope".to_string())]);
    }

    #[tokio::test]
    async fn test_load_pixels_decodes() {
        let api = Arc::new(MockDogApi::new().with_bytes(png_bytes(3, 2)));
        let mut slot = RequestSlot::new(RequestPolicy::Supersede);
        let (tx, mut rx) = mpsc::unbounded_channel::<Fetched<DynamicImage>>();

        Box::new(LoadPixelsCmd::new(api, "https://x/a.png".into(), slot.begin().unwrap(), tx))
            .execute(app_tx())
            .await
            .unwrap();

        let image = rx.try_recv().unwrap().result.unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        assert!(matches!(decode_image(b"not a picture"), Err(FetchError::Malformed(_))));
    }
}
