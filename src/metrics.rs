use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const SOURCE_FETCH_TOTAL: &str = "source_fetch_total";
pub const COMPLETION_ATTEMPTS_TOTAL: &str = "completion_attempts_total";
pub const COMPLETION_FAILURES_TOTAL: &str = "completion_failures_total";
pub const SUMMARY_REQUESTS_TOTAL: &str = "summary_requests_total";
pub const SUMMARY_DURATION_MS: &str = "summary_duration_ms";

// A process has exactly one global recorder; every app() built in the same
// process (tests included) shares this handle.
static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (first call only) and describe the series.
    pub fn init() -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new().install_recorder()?;
                describe_series();
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe_series() {
    describe_counter!(
        SOURCE_FETCH_TOTAL,
        "Source adapter calls by source and outcome."
    );
    describe_counter!(
        COMPLETION_ATTEMPTS_TOTAL,
        "Calls made to the completion backend, retries included."
    );
    describe_counter!(
        COMPLETION_FAILURES_TOTAL,
        "Completion invocations that exhausted their attempts."
    );
    describe_counter!(
        SUMMARY_REQUESTS_TOTAL,
        "Summary requests by terminal outcome."
    );
    describe_histogram!(
        SUMMARY_DURATION_MS,
        "End-to-end summary pipeline time in milliseconds."
    );
}
