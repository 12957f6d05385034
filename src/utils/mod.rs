use std::time::Instant;
use tracing::info;

/// Logs how long a run step took once it goes out of scope.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    pub fn start(label: &'static str) -> Self {
        info!("Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!("Finished: {} in {:.2?}", self.label, self.start.elapsed());
    }
}
