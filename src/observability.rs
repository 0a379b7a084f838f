use biometrics::{Collector, Counter};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("quaero.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("quaero.client.request_errors");

pub(crate) static STREAM_FRAGMENTS: Counter = Counter::new("quaero.stream.fragments");
pub(crate) static STREAM_ABORTS: Counter = Counter::new("quaero.stream.aborts");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_FRAGMENTS);
    collector.register_counter(&STREAM_ABORTS);
}
