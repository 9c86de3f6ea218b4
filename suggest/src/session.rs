use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use crate::SuggestClient;

/// How long to wait after the last keystroke before fetching.
pub const SUGGEST_DEBOUNCE: Duration = Duration::from_millis(200);

/// Receives results for the query that was still current when the fetch
/// finished. Stale results are dropped inside the session and never reach
/// the reporter.
pub trait SuggestReporter: Send + Sync + 'static {
    fn on_results(&self, query: &str, candidates: Vec<String>);
}

struct SessionState {
    latest_query: String,
    generation: u64,
}

/// Debounced suggestion fetches with staleness discard.
///
/// Every query change bumps a generation counter. The spawned fetch task
/// re-checks the counter after the debounce sleep and again after the network
/// round trip, so a response for a superseded query is dropped regardless of
/// arrival order. There is no explicit request cancellation; a hung fetch
/// simply never applies its result.
pub struct SuggestSession {
    state: Arc<Mutex<SessionState>>,
    client: SuggestClient,
    reporter: Arc<dyn SuggestReporter>,
    debounce: Duration,
}

impl SuggestSession {
    pub fn new(client: SuggestClient, reporter: Arc<dyn SuggestReporter>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                latest_query: String::new(),
                generation: 0,
            })),
            client,
            reporter,
            debounce: SUGGEST_DEBOUNCE,
        }
    }

    /// Override the debounce interval (tests use a short one).
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Call on every change of the free-text query. The query is compared
    /// trimmed and lower-cased, matching how the composer tracks it.
    pub fn on_user_query(&self, query: &str) {
        let query = query.trim().to_lowercase();
        let generation = {
            #[expect(clippy::unwrap_used)]
            let mut st = self.state.lock().unwrap();
            if query == st.latest_query {
                return;
            }
            st.latest_query.clear();
            st.latest_query.push_str(&query);
            st.generation = st.generation.wrapping_add(1);
            st.generation
        };

        if query.is_empty() {
            return;
        }

        let state = Arc::clone(&self.state);
        let client = self.client.clone();
        let reporter = Arc::clone(&self.reporter);
        let debounce = self.debounce;
        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if !is_current(&state, generation) {
                return;
            }
            let candidates = match client.fetch(&query).await {
                Ok(candidates) => candidates,
                Err(err) => {
                    tracing::warn!("suggestion fetch for {query:?} failed: {err}");
                    Vec::new()
                }
            };
            if !is_current(&state, generation) {
                return;
            }
            reporter.on_results(&query, candidates);
        });
    }
}

fn is_current(state: &Arc<Mutex<SessionState>>, generation: u64) -> bool {
    #[expect(clippy::unwrap_used)]
    let st = state.lock().unwrap();
    st.generation == generation
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;
    use wiremock::matchers::method;
    use wiremock::matchers::query_param;

    #[derive(Default)]
    struct CollectingReporter {
        results: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl SuggestReporter for CollectingReporter {
        fn on_results(&self, query: &str, candidates: Vec<String>) {
            #[expect(clippy::unwrap_used)]
            self.results
                .lock()
                .unwrap()
                .push((query.to_string(), candidates));
        }
    }

    impl CollectingReporter {
        fn snapshot(&self) -> Vec<(String, Vec<String>)> {
            #[expect(clippy::unwrap_used)]
            self.results.lock().unwrap().clone()
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn debounce_collapses_rapid_keystrokes_into_one_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "hel"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!(["hel", ["hello world"]])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let reporter = Arc::new(CollectingReporter::default());
        let session = SuggestSession::new(SuggestClient::new(server.uri()), reporter.clone())
            .with_debounce(Duration::from_millis(50));

        session.on_user_query("h");
        session.on_user_query("he");
        session.on_user_query("hel");
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(
            reporter.snapshot(),
            vec![("hel".to_string(), vec!["hello world".to_string()])]
        );
        // `.expect(1)` on the mock asserts no fetch happened for "h"/"he".
        server.verify().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stale_response_is_discarded() {
        let server = MockServer::start().await;
        // The older query answers slowly, after the newer one.
        Mock::given(method("GET"))
            .and(query_param("q", "older"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!(["older", ["older result"]]))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "newer"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!(["newer", ["newer result"]])),
            )
            .mount(&server)
            .await;

        let reporter = Arc::new(CollectingReporter::default());
        let session = SuggestSession::new(SuggestClient::new(server.uri()), reporter.clone())
            .with_debounce(Duration::from_millis(10));

        session.on_user_query("older");
        // Let the first fetch get in flight before superseding it.
        tokio::time::sleep(Duration::from_millis(60)).await;
        session.on_user_query("newer");
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(
            reporter.snapshot(),
            vec![("newer".to_string(), vec!["newer result".to_string()])]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn clearing_the_query_drops_pending_work() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["x", ["y"]])))
            .expect(0)
            .mount(&server)
            .await;

        let reporter = Arc::new(CollectingReporter::default());
        let session = SuggestSession::new(SuggestClient::new(server.uri()), reporter.clone())
            .with_debounce(Duration::from_millis(50));

        session.on_user_query("something");
        session.on_user_query("");
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(reporter.snapshot().is_empty());
        server.verify().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn network_failure_reports_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let reporter = Arc::new(CollectingReporter::default());
        let session = SuggestSession::new(SuggestClient::new(server.uri()), reporter.clone())
            .with_debounce(Duration::from_millis(10));

        session.on_user_query("oops");
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(reporter.snapshot(), vec![("oops".to_string(), Vec::new())]);
    }
}
