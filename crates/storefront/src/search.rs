//! Search-as-you-type.
//!
//! Every keystroke reschedules a delayed search; only the last query typed
//! within the debounce window reaches the API. Suggestions are published on
//! a `watch` channel so any number of views can follow the latest set.

use std::future::Future;
use std::time::Duration;

use barely_used_core::Product;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::auth::IdentityProvider;
use crate::config::SearchConfig;

/// Runs a task after a quiet period, cancelling any task still pending.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Run `task` after the delay unless another call supersedes it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Drop the pending task, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a scheduled task has not finished yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Latest suggestion state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions {
    /// Trimmed query the products belong to.
    pub query: String,
    /// A search for `query` is scheduled or in flight.
    pub searching: bool,
    pub products: Vec<Product>,
}

/// Debounced product suggestions for a search box.
pub struct SearchSuggester<I: IdentityProvider> {
    client: ApiClient<I>,
    config: SearchConfig,
    debouncer: Debouncer,
    tx: watch::Sender<Suggestions>,
}

impl<I: IdentityProvider> SearchSuggester<I> {
    #[must_use]
    pub fn new(client: ApiClient<I>, config: SearchConfig) -> Self {
        let (tx, _rx) = watch::channel(Suggestions::default());
        Self {
            client,
            config,
            debouncer: Debouncer::new(config.debounce),
            tx,
        }
    }

    /// Follow suggestion updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Suggestions> {
        self.tx.subscribe()
    }

    /// Current suggestions.
    #[must_use]
    pub fn current(&self) -> Suggestions {
        self.tx.borrow().clone()
    }

    /// Handle a change to the search box contents.
    ///
    /// Queries shorter than the configured minimum clear the suggestions
    /// immediately; longer ones are searched after the debounce delay.
    pub fn input(&mut self, raw: &str) {
        let query = raw.trim().to_string();

        if query.chars().count() < self.config.min_chars {
            self.debouncer.cancel();
            self.tx.send_replace(Suggestions {
                query,
                ..Suggestions::default()
            });
            return;
        }

        self.tx.send_modify(|s| {
            s.query.clone_from(&query);
            s.searching = true;
        });

        let client = self.client.clone();
        let tx = self.tx.clone();
        let limit = self.config.max_suggestions;
        self.debouncer.schedule(async move {
            let products = match client.search_products(&query).await {
                Ok(mut products) => {
                    products.truncate(limit);
                    products
                }
                Err(e) => {
                    warn!(error = %e, query = %query, "Search error");
                    Vec::new()
                }
            };
            debug!(query = %query, count = products.len(), "Publishing suggestions");
            tx.send_replace(Suggestions {
                query,
                searching: false,
                products,
            });
        });
    }

    /// Clear the box: drop any pending search and empty the suggestions.
    pub fn clear(&mut self) {
        self.input("");
    }
}
