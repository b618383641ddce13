//! Model Selection
//!
//! Owned configuration cell shared by handle between the gateway and the
//! HTTP layer. Readers take lock-free snapshots; writers must hold an
//! update token, so at most one switch is in progress at a time.

use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

pub struct ModelSelection {
    base_url: String,
    request_timeout: Duration,
    active: ArcSwap<String>,
    writer: Mutex<()>,
}

impl ModelSelection {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            request_timeout,
            active: ArcSwap::from_pointee(model.into()),
            writer: Mutex::new(()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bound for prompt generation
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Snapshot of the active model; a concurrent switch may land right after
    pub fn current_model(&self) -> String {
        String::clone(&self.active.load())
    }

    /// Wait for exclusive write access
    pub async fn begin_update(&self) -> ModelUpdateToken<'_> {
        ModelUpdateToken { selection: self, _guard: self.writer.lock().await }
    }
}

/// Proof of exclusive write access to a `ModelSelection`
pub struct ModelUpdateToken<'a> {
    selection: &'a ModelSelection,
    _guard: MutexGuard<'a, ()>,
}

impl ModelUpdateToken<'_> {
    /// Returns the previously active model
    pub fn set_model(&self, name: &str) -> String {
        let previous = self.selection.active.swap(Arc::new(name.to_string()));
        String::clone(&previous)
    }

    pub fn current_model(&self) -> String {
        self.selection.current_model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let selection =
            ModelSelection::new("http://localhost:11434/", "llama3.2", Duration::from_secs(600));
        assert_eq!(selection.base_url(), "http://localhost:11434");
        assert_eq!(selection.request_timeout(), Duration::from_secs(600));
    }

    #[tokio::test]
    async fn test_update_token_swaps_model() {
        let selection = ModelSelection::new("http://x", "llama3.2", Duration::from_secs(1));

        let token = selection.begin_update().await;
        let previous = token.set_model("mistral:latest");

        assert_eq!(previous, "llama3.2");
        assert_eq!(token.current_model(), "mistral:latest");
        drop(token);
        assert_eq!(selection.current_model(), "mistral:latest");
    }

    #[tokio::test]
    async fn test_second_writer_waits_for_token() {
        let selection = Arc::new(ModelSelection::new("http://x", "a", Duration::from_secs(1)));
        let token = selection.begin_update().await;

        let other = Arc::clone(&selection);
        let pending = tokio::spawn(async move {
            let token = other.begin_update().await;
            token.set_model("c");
        });

        tokio::task::yield_now().await;
        token.set_model("b");
        assert_eq!(selection.current_model(), "b");
        drop(token);

        pending.await.unwrap();
        assert_eq!(selection.current_model(), "c");
    }
}
