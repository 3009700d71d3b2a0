use tracing::info;

/// Progress sink handed to long-running operations such as loading.
pub trait StatusReporter {
    fn report(&self, message: &str);
}

/// Forwards status messages to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatus;

impl StatusReporter for TracingStatus {
    fn report(&self, message: &str) {
        info!(target: "acudb::status", "{message}");
    }
}

impl<F> StatusReporter for F
where
    F: Fn(&str),
{
    fn report(&self, message: &str) {
        self(message)
    }
}
