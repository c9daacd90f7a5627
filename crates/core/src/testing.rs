//! Test doubles for the collaborator contracts.
//!
//! `MockBackend` counts open and closed connections so tests can check that
//! cancellation releases the transport. `ScriptedPrompter` answers prompts
//! from a queue and records what it was asked.

use crate::{
    Backend, Completion, CompletionChoice, CompletionRequest, Endpoint, Error, PickItem,
    PickOptions, ProgressOptions, ProgressReporter, PromptOptions, Prompter, Result,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// How the mock answers a completion.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Return a single choice with this text.
    Text(String),
    /// Succeed with no choices.
    Empty,
    /// Fail with a transport error carrying this message.
    Fail(String),
    /// Never resolve.
    Pending,
}

#[derive(Debug)]
struct State {
    models: Mutex<std::result::Result<Vec<String>, String>>,
    reply: Mutex<Reply>,
    listings: Mutex<Vec<Endpoint>>,
    requests: Mutex<Vec<(Endpoint, CompletionRequest)>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Scriptable in-process [`Backend`].
#[derive(Debug, Clone)]
pub struct MockBackend {
    state: Arc<State>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// A backend listing no models and replying with empty text.
    pub fn new() -> Self {
        Self {
            state: Arc::new(State {
                models: Mutex::new(Ok(Vec::new())),
                reply: Mutex::new(Reply::Text(String::new())),
                listings: Mutex::new(Vec::new()),
                requests: Mutex::new(Vec::new()),
                opened: AtomicUsize::new(0),
                closed: AtomicUsize::new(0),
            }),
        }
    }

    /// Serve `models` from the listing endpoint.
    pub fn with_models<I, S>(self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.state.models.lock() = Ok(models.into_iter().map(Into::into).collect());
        self
    }

    /// Fail the listing endpoint with `message`.
    pub fn with_listing_error(self, message: impl Into<String>) -> Self {
        *self.state.models.lock() = Err(message.into());
        self
    }

    /// Answer completions with `reply`.
    pub fn with_reply(self, reply: Reply) -> Self {
        *self.state.reply.lock() = reply;
        self
    }

    /// Endpoints the listing endpoint was called with.
    pub fn listings(&self) -> Vec<Endpoint> {
        self.state.listings.lock().clone()
    }

    /// Completion requests received so far.
    pub fn requests(&self) -> Vec<(Endpoint, CompletionRequest)> {
        self.state.requests.lock().clone()
    }

    /// Total network calls of either kind.
    pub fn calls(&self) -> usize {
        self.state.listings.lock().len() + self.state.requests.lock().len()
    }

    /// Connections opened so far.
    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Connections opened but not yet released.
    pub fn open_connections(&self) -> usize {
        self.opened() - self.state.closed.load(Ordering::SeqCst)
    }
}

/// Released on drop, like a socket owned by an in-flight request.
struct Connection(Arc<State>);

impl Connection {
    fn open(state: &Arc<State>) -> Self {
        state.opened.fetch_add(1, Ordering::SeqCst);
        Self(state.clone())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.0.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl Backend for MockBackend {
    async fn list_models(&self, endpoint: &Endpoint) -> Result<Vec<String>> {
        let _conn = Connection::open(&self.state);
        self.state.listings.lock().push(endpoint.clone());
        tokio::task::yield_now().await;
        let models = self.state.models.lock().clone();
        models.map_err(|message| Error::transport(anyhow::anyhow!(message)))
    }

    async fn complete(&self, endpoint: &Endpoint, request: &CompletionRequest) -> Result<Completion> {
        let _conn = Connection::open(&self.state);
        self.state
            .requests
            .lock()
            .push((endpoint.clone(), request.clone()));
        let reply = self.state.reply.lock().clone();
        match reply {
            Reply::Text(text) => Ok(Completion {
                choices: vec![CompletionChoice {
                    text,
                    index: 0,
                    finish_reason: Some("length".into()),
                }],
            }),
            Reply::Empty => Ok(Completion::default()),
            Reply::Fail(message) => Err(Error::transport(anyhow::anyhow!(message))),
            Reply::Pending => std::future::pending().await,
        }
    }
}

/// A scripted answer to the next prompt.
#[derive(Debug, Clone)]
pub enum Answer {
    /// Type this text into a string prompt.
    Text(String),
    /// Pick the item with this label.
    Pick(String),
    /// Dismiss the prompt.
    Cancel,
}

/// A recorded string prompt.
#[derive(Debug, Clone)]
pub struct Asked {
    pub title: String,
    pub initial_value: Option<String>,
    /// Validator verdict on the answer that was given.
    pub rejected: Option<String>,
}

/// [`Prompter`] answering from a queue. An exhausted queue cancels.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<Asked>>,
    picks: Mutex<Vec<Vec<String>>>,
    progress: Arc<Mutex<Vec<(ProgressOptions, Vec<String>)>>>,
    abort_progress: bool,
}

impl ScriptedPrompter {
    /// Answer prompts with `answers`, in order.
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Abort every cancellable progress as soon as it starts.
    pub fn aborting_progress(mut self) -> Self {
        self.abort_progress = true;
        self
    }

    /// String prompts shown so far.
    pub fn asked(&self) -> Vec<Asked> {
        self.asked.lock().clone()
    }

    /// Labels offered by each single-choice prompt.
    pub fn picks(&self) -> Vec<Vec<String>> {
        self.picks.lock().clone()
    }

    /// Progress indications started so far, with their reported messages.
    pub fn progress_log(&self) -> Vec<(ProgressOptions, Vec<String>)> {
        self.progress.lock().clone()
    }

    fn next(&self) -> Option<Answer> {
        self.answers.lock().pop_front()
    }
}

impl Prompter for ScriptedPrompter {
    type Reporter = MockProgress;

    async fn prompt_string(&self, options: PromptOptions) -> Option<String> {
        let answer = self.next();
        let text = match &answer {
            Some(Answer::Text(text)) => Some(text.clone()),
            _ => None,
        };
        self.asked.lock().push(Asked {
            title: options.title.clone(),
            initial_value: options.initial_value.clone(),
            rejected: text.as_deref().and_then(|text| options.validate(text)),
        });
        text
    }

    async fn pick_one(&self, items: &[PickItem], _options: PickOptions) -> Option<usize> {
        self.picks
            .lock()
            .push(items.iter().map(|item| item.label.clone()).collect());
        match self.next() {
            Some(Answer::Pick(label)) => items.iter().position(|item| item.label == label),
            _ => None,
        }
    }

    fn progress(&self, options: ProgressOptions) -> MockProgress {
        let cancel = CancellationToken::new();
        if self.abort_progress && options.cancellable {
            cancel.cancel();
        }
        let mut log = self.progress.lock();
        log.push((options, Vec::new()));
        MockProgress {
            log: self.progress.clone(),
            slot: log.len() - 1,
            cancel,
        }
    }
}

/// Progress handed out by [`ScriptedPrompter`].
#[derive(Debug)]
pub struct MockProgress {
    log: Arc<Mutex<Vec<(ProgressOptions, Vec<String>)>>>,
    slot: usize,
    cancel: CancellationToken,
}

impl ProgressReporter for MockProgress {
    fn report(&self, message: &str) {
        if let Some((_, messages)) = self.log.lock().get_mut(self.slot) {
            messages.push(message.to_owned());
        }
    }

    fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
