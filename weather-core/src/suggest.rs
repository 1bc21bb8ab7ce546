//! Incremental place search.
//!
//! [`SuggestionProvider`] is the stateless lookup: one query in, at most
//! [`MAX_SUGGESTIONS`] candidates out, never an error. [`SuggestionFeed`] is
//! what an input field drives on every keystroke: it debounces, numbers each
//! fired request and only publishes the response to the newest one.

use parking_lot::Mutex;
use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{runtime::Handle, sync::watch};

use crate::{PlaceCandidate, debounce::Debouncer, provider::Geocoder};

/// Shorter input is answered locally with an empty list.
pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone)]
pub struct SuggestionProvider {
    geocoder: Arc<dyn Geocoder>,
}

impl SuggestionProvider {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Candidates for `partial`, in upstream relevance order.
    ///
    /// The input is not trimmed. Failures yield an empty list.
    pub async fn suggest(&self, partial: &str) -> Vec<PlaceCandidate> {
        if partial.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        match self.geocoder.search(partial, MAX_SUGGESTIONS).await {
            Ok(mut found) => {
                found.truncate(MAX_SUGGESTIONS);
                found
            }
            Err(e) => {
                tracing::warn!(query = partial, error = %e.diagnostic(), "suggestions unavailable");
                Vec::new()
            }
        }
    }
}

#[derive(Debug)]
struct FeedInner {
    provider: SuggestionProvider,
    debouncer: Mutex<Debouncer>,
    /// Sequence number of the newest request scheduled (or invalidated).
    issued: AtomicU64,
    results: watch::Sender<Vec<PlaceCandidate>>,
}

impl FeedInner {
    fn next_ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publishes only if nothing was scheduled or invalidated after `ticket`.
    async fn fetch(&self, query: String, ticket: u64) {
        let found = self.provider.suggest(&query).await;

        if self.issued.load(Ordering::SeqCst) == ticket {
            self.results.send_replace(found);
        } else {
            tracing::debug!(query = %query, ticket, "discarding stale suggestions");
        }
    }

    fn invalidate(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
    }
}

/// Debounced, stale-safe suggestion stream for one input field.
#[derive(Debug, Clone)]
pub struct SuggestionFeed {
    inner: Arc<FeedInner>,
}

impl SuggestionFeed {
    /// Binds the debounce timer to the current tokio runtime.
    pub fn new(provider: SuggestionProvider, delay: Duration) -> Self {
        Self::with_handle(provider, delay, Handle::current())
    }

    pub fn with_handle(provider: SuggestionProvider, delay: Duration, runtime: Handle) -> Self {
        let (results, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(FeedInner {
                provider,
                debouncer: Mutex::new(Debouncer::with_handle(delay, runtime)),
                issued: AtomicU64::new(0),
                results,
            }),
        }
    }

    /// Feed the latest input text.
    ///
    /// Input below [`MIN_QUERY_CHARS`] clears the list right away and
    /// invalidates anything in flight; anything else (re)starts the timer.
    pub fn on_input(&self, query: &str) {
        let mut debouncer = self.inner.debouncer.lock();

        if query.chars().count() < MIN_QUERY_CHARS {
            debouncer.cancel();
            self.inner.invalidate();
            self.inner.results.send_if_modified(|current| {
                let changed = !current.is_empty();
                current.clear();
                changed
            });
            return;
        }

        let ticket = self.inner.next_ticket();
        let weak: Weak<FeedInner> = Arc::downgrade(&self.inner);
        let query = query.to_string();
        debouncer.schedule(async move {
            if let Some(inner) = weak.upgrade() {
                inner.fetch(query, ticket).await;
            }
        });
    }

    /// Latest published list.
    pub fn current(&self) -> Vec<PlaceCandidate> {
        self.inner.results.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<PlaceCandidate>> {
        self.inner.results.subscribe()
    }

    /// Cancel the pending timer, drop in-flight responses, empty the list.
    pub fn clear(&self) {
        self.inner.debouncer.lock().cancel();
        self.inner.invalidate();
        self.inner.results.send_replace(Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        LookupError,
        error::{Service, ServiceError},
        http::stub::StubTransport,
        provider::geocoding::OpenMeteoGeocoder,
    };
    use async_trait::async_trait;
    use serde_json::json;

    fn place(name: &str, lat: f64) -> PlaceCandidate {
        PlaceCandidate {
            name: name.to_string(),
            country: "Testland".to_string(),
            latitude: lat,
            longitude: 0.0,
        }
    }

    /// Answers every search after a per-query delay; counts calls.
    #[derive(Debug, Default)]
    struct ScriptedGeocoder {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl ScriptedGeocoder {
        fn latency(query: &str) -> Duration {
            // Shorter prefixes are slower, so older requests finish last.
            let len = query.len() as u64;
            Duration::from_millis(2000 / (len * len))
        }
    }

    #[async_trait]
    impl Geocoder for ScriptedGeocoder {
        async fn resolve(&self, place: &str) -> Result<PlaceCandidate, LookupError> {
            Err(LookupError::NotFound { query: place.to_string() })
        }

        async fn search(&self, query: &str, count: usize) -> Result<Vec<PlaceCandidate>, LookupError> {
            self.calls.lock().push(query.to_string());
            tokio::time::sleep(Self::latency(query)).await;
            if self.fail {
                return Err(ServiceError::status(Service::Geocoding, 503, "").into());
            }
            Ok((0..count + 2).map(|i| place(query, i as f64)).collect())
        }
    }

    fn stub_provider(stub: StubTransport) -> (Arc<StubTransport>, SuggestionProvider) {
        let stub = Arc::new(stub);
        let geo = OpenMeteoGeocoder::new(stub.clone(), "https://geo.test");
        (stub, SuggestionProvider::new(Arc::new(geo)))
    }

    #[tokio::test]
    async fn short_input_never_hits_the_network() {
        let (stub, provider) = stub_provider(StubTransport::new());

        for query in ["", "L", " ", "é"] {
            assert!(provider.suggest(query).await.is_empty());
        }
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn asks_for_five_and_keeps_order() {
        let (stub, provider) = stub_provider(StubTransport::new().respond(
            "/v1/search",
            200,
            json!({"results": [
                {"name": "London", "country": "United Kingdom", "latitude": 51.5, "longitude": -0.12},
                {"name": "London", "country": "Canada", "latitude": 42.98, "longitude": -81.23},
                {"name": "Londonderry", "country": "United Kingdom", "latitude": 55.0, "longitude": -7.3}
            ]}),
        ));

        let found = provider.suggest("Lon").await;

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].country, "United Kingdom");
        assert_eq!(found[1].country, "Canada");
        assert_eq!(found[2].name, "Londonderry");

        let calls = stub.calls();
        assert_eq!(calls[0].param("count"), Some("5"));
        assert_eq!(calls[0].param("name"), Some("Lon"));
    }

    #[tokio::test]
    async fn whitespace_is_sent_untrimmed() {
        let (stub, provider) = stub_provider(StubTransport::new());

        provider.suggest("  ").await;
        assert_eq!(stub.calls()[0].param("name"), Some("  "));
    }

    #[tokio::test]
    async fn failures_become_empty_lists() {
        let (_, provider) = stub_provider(StubTransport::new().respond("/v1/search", 500, json!({})));
        assert!(provider.suggest("Paris").await.is_empty());

        let (_, provider) = stub_provider(StubTransport::new().unreachable("/v1/search"));
        assert!(provider.suggest("Paris").await.is_empty());

        let (_, provider) = stub_provider(StubTransport::new().respond_raw("/v1/search", 200, "not json"));
        assert!(provider.suggest("Paris").await.is_empty());
    }

    #[tokio::test]
    async fn no_results_is_empty() {
        let (_, provider) = stub_provider(StubTransport::new().respond("/v1/search", 200, json!({})));
        assert!(provider.suggest("Qwxz").await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn never_more_than_five() {
        let provider = SuggestionProvider::new(Arc::new(ScriptedGeocoder::default()));
        assert_eq!(provider.suggest("Springfield").await.len(), MAX_SUGGESTIONS);
    }

    #[tokio::test(start_paused = true)]
    async fn feed_debounces_keystrokes() {
        let geo = Arc::new(ScriptedGeocoder::default());
        let feed = SuggestionFeed::new(SuggestionProvider::new(geo.clone()), Duration::from_millis(300));

        for typed in ["Pa", "Par", "Pari", "Paris"] {
            feed.on_input(typed);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(*geo.calls.lock(), vec!["Paris".to_string()]);
        let shown = feed.current();
        assert_eq!(shown.len(), MAX_SUGGESTIONS);
        assert_eq!(shown[0].name, "Paris");
    }

    #[tokio::test(start_paused = true)]
    async fn feed_discards_stale_responses() {
        let geo = Arc::new(ScriptedGeocoder::default());
        let feed = SuggestionFeed::new(SuggestionProvider::new(geo.clone()), Duration::from_millis(300));
        let mut rx = feed.subscribe();

        // "Be" fires at 300ms and answers at 800ms.
        feed.on_input("Be");
        tokio::time::sleep(Duration::from_millis(350)).await;
        // "Berlin" fires at 650ms and answers first, at 705ms.
        feed.on_input("Berlin");
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(*geo.calls.lock(), vec!["Be".to_string(), "Berlin".to_string()]);
        assert!(rx.has_changed().expect("sender alive"));
        let shown = rx.borrow_and_update().clone();
        assert!(shown.iter().all(|p| p.name == "Berlin"));
        assert_eq!(feed.current()[0].name, "Berlin");
    }

    #[tokio::test(start_paused = true)]
    async fn short_input_clears_and_invalidates() {
        let geo = Arc::new(ScriptedGeocoder::default());
        let feed = SuggestionFeed::new(SuggestionProvider::new(geo.clone()), Duration::from_millis(300));

        feed.on_input("Rome");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!feed.current().is_empty());

        // Fire another request, then shrink the input while it is in flight.
        feed.on_input("Ro");
        tokio::time::sleep(Duration::from_millis(350)).await;
        feed.on_input("R");
        assert!(feed.current().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(feed.current().is_empty());
        assert_eq!(geo.calls.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shrinking_input_as_the_timer_fires_keeps_list_empty() {
        let geo = Arc::new(ScriptedGeocoder::default());
        let feed = SuggestionFeed::new(SuggestionProvider::new(geo.clone()), Duration::from_millis(300));

        feed.on_input("Rome");
        tokio::time::sleep(Duration::from_millis(300)).await;
        feed.on_input("R");
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(feed.current().is_empty());
        assert!(geo.calls.lock().len() <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fired_fetch_does_not_publish_after_clear() {
        let geo = Arc::new(ScriptedGeocoder::default());
        let feed = SuggestionFeed::new(SuggestionProvider::new(geo.clone()), Duration::from_millis(300));

        // The timer has fired but the fetch has not started yet.
        let ticket = feed.inner.next_ticket();
        feed.clear();
        feed.inner.fetch("Rome".into(), ticket).await;

        assert_eq!(*geo.calls.lock(), vec!["Rome".to_string()]);
        assert!(feed.current().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn feed_failure_publishes_empty_list() {
        let geo = Arc::new(ScriptedGeocoder { fail: true, ..Default::default() });
        let feed = SuggestionFeed::new(SuggestionProvider::new(geo), Duration::from_millis(300));

        feed.on_input("Oslo");
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(feed.current().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cancels_pending_timer() {
        let geo = Arc::new(ScriptedGeocoder::default());
        let feed = SuggestionFeed::new(SuggestionProvider::new(geo.clone()), Duration::from_millis(300));

        feed.on_input("Madrid");
        feed.clear();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(geo.calls.lock().is_empty());
        assert!(feed.current().is_empty());
    }
}
