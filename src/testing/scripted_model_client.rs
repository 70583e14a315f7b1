use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::domain::ModelCallError;
use crate::ports::{ChatRequest, ModelClient};

/// One scripted reaction to a model call.
#[derive(Debug, Clone)]
pub enum Scripted {
    Text(String),
    Fail(ModelCallError),
    Delayed(Duration, Box<Scripted>),
}

impl Scripted {
    pub fn reply(value: Value) -> Self {
        Scripted::Text(value.to_string())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Scripted::Text(text.into())
    }

    pub fn fail(error: ModelCallError) -> Self {
        Scripted::Fail(error)
    }

    pub fn delayed(delay: Duration, then: Scripted) -> Self {
        Scripted::Delayed(delay, Box::new(then))
    }

    fn resolve(self) -> Result<String, ModelCallError> {
        match self {
            Scripted::Text(text) => Ok(text),
            Scripted::Fail(error) => Err(error),
            Scripted::Delayed(delay, then) => {
                thread::sleep(delay);
                then.resolve()
            }
        }
    }
}

/// Model client that answers calls from a fixed script, in order.
pub struct ScriptedModelClient {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModelClient {
    pub fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }

    /// Model identifiers in call order.
    pub fn models(&self) -> Vec<String> {
        self.requests().into_iter().map(|request| request.model).collect()
    }
}

impl ModelClient for ScriptedModelClient {
    fn complete(&self, request: ChatRequest) -> Result<String, ModelCallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().expect("requests lock poisoned").push(request);
        let next = self.script.lock().expect("script lock poisoned").pop_front();
        match next {
            Some(scripted) => scripted.resolve(),
            None => Err(ModelCallError::Provider {
                status: Some(500),
                code: None,
                message: "test: unexpected extra call".to_string(),
                retry_after: None,
            }),
        }
    }
}
