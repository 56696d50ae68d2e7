// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    CompletionProvider, FetchedPage, MemoryUrlRepository, PageFetcher, ServerDeps, UrlRepository,
};

/// Called with the 1-based call number each time a mock is used
type CallHook = Box<dyn Fn(usize) + Send + Sync>;

// =============================================================================
// Mock Page Fetcher
// =============================================================================

enum MockPage {
    Page { status: u16, html: String },
    Failure(String),
}

/// Serves canned HTML per URL; unknown URLs fail like an unreachable host.
pub struct MockPageFetcher {
    pages: Arc<Mutex<HashMap<String, MockPage>>>,
    calls: Arc<Mutex<Vec<String>>>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    on_call: Mutex<Option<CallHook>>,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            latency: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            on_call: Mutex::new(None),
        }
    }

    /// Every fetch takes at least this long
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Run `hook` on every fetch, before the page is served. Settable after
    /// the mock is wired into a pipeline, so the hook may drive that pipeline.
    pub fn set_on_call(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.on_call.lock().unwrap() = Some(Box::new(hook));
    }

    /// Serve `html` with status 200
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_status_page(url, 200, html)
    }

    pub fn with_status_page(self, url: &str, status: u16, html: &str) -> Self {
        self.pages.lock().unwrap().insert(
            url.to_string(),
            MockPage::Page {
                status,
                html: html.to_string(),
            },
        );
        self
    }

    /// Make fetching `url` fail with a transport error
    pub fn with_failure(self, url: &str, message: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), MockPage::Failure(message.to_string()));
        self
    }

    /// URLs fetched so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Most fetches that were ever running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(url.to_string());
            calls.len()
        };
        if let Some(hook) = self.on_call.lock().unwrap().as_ref() {
            hook(call);
        }

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.pages.lock().unwrap().get(url) {
            Some(MockPage::Page { status, html }) => Ok(FetchedPage {
                final_url: url.to_string(),
                status: *status,
                body: html.clone(),
            }),
            Some(MockPage::Failure(message)) => Err(anyhow!("{}", message)),
            None => Err(anyhow!("error sending request for url ({})", url)),
        }
    }
}

// =============================================================================
// Mock Completion Provider
// =============================================================================

/// Answers prompts from a queue, then with the fallback answer.
pub struct MockCompletionProvider {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    fallback: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
    on_call: Mutex<Option<CallHook>>,
}

impl MockCompletionProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            fallback: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
            on_call: Mutex::new(None),
        }
    }

    /// Run `hook` on every completion, before the answer is returned
    pub fn set_on_call(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.on_call.lock().unwrap() = Some(Box::new(hook));
    }

    /// Queue one answer
    pub fn with_response(self, response: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(response.to_string()));
        self
    }

    /// Queue one failed call
    pub fn with_error(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    /// Answer used once the queue is empty
    pub fn with_fallback(mut self, response: &str) -> Self {
        self.fallback = Some(response.to_string());
        self
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };
        if let Some(hook) = self.on_call.lock().unwrap().as_ref() {
            hook(call);
        }

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow!("{}", message)),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| anyhow!("MockCompletionProvider: no response queued")),
        }
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub repo: Arc<MemoryUrlRepository>,
    pub ai: Arc<MockCompletionProvider>,
    pub fetcher: Arc<MockPageFetcher>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            repo: Arc::new(MemoryUrlRepository::new()),
            ai: Arc::new(MockCompletionProvider::new()),
            fetcher: Arc::new(MockPageFetcher::new()),
        }
    }

    /// Set a mock completion provider
    pub fn mock_ai(mut self, ai: MockCompletionProvider) -> Self {
        self.ai = Arc::new(ai);
        self
    }

    /// Set a mock page fetcher
    pub fn mock_fetcher(mut self, fetcher: MockPageFetcher) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    /// Wire the mocks into ServerDeps. The Arcs stay shared, so the
    /// mocks can still be inspected afterwards.
    pub fn deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.repo.clone() as Arc<dyn UrlRepository>,
            self.ai.clone() as Arc<dyn CompletionProvider>,
            self.fetcher.clone() as Arc<dyn PageFetcher>,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
