//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tokio::sync::mpsc;

use crate::api::{BreedName, DogApi, FetchError, ImageUrl};
use crate::app::AppMessage;
use crate::commands::Command;
use crate::config::KeyResolver;
use crate::keyboard::Keyboard;
use crate::request::RequestPolicy;
use crate::screen::{Screen, ScreenContext, ScreenMsg, ScreenSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListBreeds,
    RandomImage(String),
    ImageBytes(String),
}

/// Canned dog API that records every call.
///
/// Unknown breeds answer with a 404, like the real service.
pub struct MockDogApi {
    breeds: Result<Vec<BreedName>, FetchError>,
    images: HashMap<String, Result<ImageUrl, FetchError>>,
    bytes: Result<Vec<u8>, FetchError>,
    calls: Mutex<Vec<ApiCall>>,
}

impl Default for MockDogApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDogApi {
    pub fn new() -> Self {
        Self {
            breeds: Ok(Vec::new()),
            images: HashMap::new(),
            bytes: Err(FetchError::Status(404)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_breeds(mut self, breeds: &[&str]) -> Self {
        self.breeds = Ok(breeds.iter().map(|b| BreedName::from(*b)).collect());
        self
    }

    pub fn with_breeds_error(mut self, error: FetchError) -> Self {
        self.breeds = Err(error);
        self
    }

    pub fn with_image(mut self, breed: &str, url: &str) -> Self {
        self.images.insert(breed.to_string(), Ok(ImageUrl::from(url)));
        self
    }

    pub fn with_image_error(mut self, breed: &str, error: FetchError) -> Self {
        self.images.insert(breed.to_string(), Err(error));
        self
    }

    pub fn with_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.bytes = Ok(bytes);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DogApi for MockDogApi {
    async fn list_breeds(&self) -> Result<Vec<BreedName>, FetchError> {
        self.record(ApiCall::ListBreeds);
        self.breeds.clone()
    }

    async fn random_image(&self, breed: &BreedName) -> Result<ImageUrl, FetchError> {
        self.record(ApiCall::RandomImage(breed.to_string()));
        self.images
            .get(breed.as_str())
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }

    async fn image_bytes(&self, url: &ImageUrl) -> Result<Vec<u8>, FetchError> {
        self.record(ApiCall::ImageBytes(url.to_string()));
        self.bytes.clone()
    }
}

/// Run commands one after another, as the App would, and collect what they
/// sent to the App.
pub async fn run_commands(commands: Vec<Box<dyn Command>>) -> Vec<AppMessage> {
    let (app_tx, mut app_rx) = mpsc::unbounded_channel();
    for command in commands {
        command.execute(app_tx.clone()).await.unwrap();
    }
    drop(app_tx);

    let mut sent = Vec::new();
    while let Some(message) = app_rx.recv().await {
        sent.push(message);
    }
    sent
}

/// Screen context around `api` with default keys, silent errors and no pixels.
pub fn context(api: Arc<MockDogApi>) -> ScreenContext {
    context_with(api, RequestPolicy::Supersede)
}

pub fn context_with(api: Arc<MockDogApi>, request_policy: RequestPolicy) -> ScreenContext {
    ScreenContext {
        api,
        resolver: Arc::new(KeyResolver::default()),
        keyboard: Keyboard::new(),
        settings: ScreenSettings {
            request_policy,
            show_fetch_errors: false,
            render_images: false,
        },
    }
}

/// Run the commands among `msgs` and return the rest.
pub async fn run_screen_commands(msgs: Vec<ScreenMsg>) -> Vec<ScreenMsg> {
    let mut commands = Vec::new();
    let mut rest = Vec::new();
    for msg in msgs {
        match msg {
            ScreenMsg::Run(cmds) => commands.extend(cmds),
            other => rest.push(other),
        }
    }
    run_commands(commands).await;
    rest
}

/// Update `screen` and run what it asks for until it stops asking.
/// Returns every message that is not a command.
pub async fn settle(screen: &mut dyn Screen) -> Vec<ScreenMsg> {
    let mut out = Vec::new();
    loop {
        let msgs = screen.update().unwrap();
        let ran = msgs.iter().any(|m| matches!(m, ScreenMsg::Run(_)));
        out.extend(run_screen_commands(msgs).await);
        if !ran {
            return out;
        }
    }
}

/// A PNG of the given size, red on top and blue at the bottom.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |_, y| {
        if y < height / 2 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}
