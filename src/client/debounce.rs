use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::lock;

/// Emits the most recent pushed value once `delay` has passed without a
/// newer push. Each push cancels the previously scheduled emission.
pub struct Debouncer<T> {
    delay: Duration,
    emit: Arc<dyn Fn(T) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, emit: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            emit: Arc::new(emit),
            pending: Mutex::new(None),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn push(&self, value: T) {
        let mut pending = lock(&self.pending);
        if let Some(timer) = pending.take() {
            timer.abort();
        }

        let emit = Arc::clone(&self.emit);
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            emit(value);
        }));
    }

    /// Drop the scheduled emission, if any.
    pub fn cancel(&self) {
        if let Some(timer) = lock(&self.pending).take() {
            timer.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.pending).take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> (Arc<Mutex<Vec<String>>>, impl Fn(String) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |v| sink.lock().unwrap().push(v))
    }

    #[tokio::test(start_paused = true)]
    async fn only_latest_value_after_quiet_period() {
        let (seen, emit) = collector();
        let debouncer = Debouncer::new(Duration::from_millis(300), emit);

        debouncer.push("y".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("ya".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("yam".to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(seen.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["yam".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_emission() {
        let (seen, emit) = collector();
        let debouncer = Debouncer::new(Duration::from_millis(50), emit);
        debouncer.push("x".to_string());
        drop(debouncer);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_then_push_again() {
        let (seen, emit) = collector();
        let debouncer = Debouncer::new(Duration::from_millis(50), emit);
        debouncer.push("a".to_string());
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("b".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["b".to_string()]);
    }
}
