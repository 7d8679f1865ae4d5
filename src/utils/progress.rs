// utils/progress.rs

/// Status notification emitted on chunk completion and merge completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub status: String,
    /// Whether a presentation layer should redraw its views now.
    pub refresh: bool,
}

impl ProgressUpdate {
    pub fn status<S: Into<String>>(status: S) -> Self {
        Self { status: status.into(), refresh: false }
    }

    pub fn refresh<S: Into<String>>(status: S) -> Self {
        Self { status: status.into(), refresh: true }
    }
}

/// Receives progress from worker threads, so implementations must be `Sync`.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, update: ProgressUpdate);
}

impl<F> ProgressObserver for F
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn on_progress(&self, update: ProgressUpdate) {
        self(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closures_are_observers() {
        let seen = Mutex::new(Vec::new());
        let observer = |update: ProgressUpdate| seen.lock().unwrap().push(update);
        observer.on_progress(ProgressUpdate::status("chunk 1/2"));
        observer.on_progress(ProgressUpdate::refresh("merged"));

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(!seen[0].refresh);
        assert!(seen[1].refresh);
    }
}
