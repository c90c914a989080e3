use crate::{error::ProviderError, models::ImagesResponse, provider::ImageProvider};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

type Reply = std::result::Result<ImagesResponse, ProviderError>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub size: String,
}

/// Test provider that replays queued replies per model and records every call.
/// A model with an empty queue answers with `fallback`.
pub struct ScriptedProvider {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    fallback: Reply,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fallback: Err(ProviderError::api(Some(404), "model not scripted")),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call on every unscripted model succeeds with `url`.
    pub fn always_ok(url: &str) -> Self {
        Self {
            fallback: Ok(ImagesResponse::with_urls([url])),
            ..Self::new()
        }
    }

    pub fn script(self, model: &str, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .extend(replies);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, model: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.model == model)
            .count()
    }
}

pub fn ok(url: &str) -> Reply {
    Ok(ImagesResponse::with_urls([url]))
}

pub fn connection_error() -> Reply {
    Err(ProviderError::ConnectionFailed("connection reset by peer".into()))
}

#[async_trait]
impl ImageProvider for ScriptedProvider {
    async fn generate_image(&self, model: &str, prompt: &str, _n: u32, size: &str) -> Reply {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
            size: size.to_string(),
        });

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model)
            .and_then(VecDeque::pop_front);
        next.unwrap_or_else(|| self.fallback.clone())
    }
}
