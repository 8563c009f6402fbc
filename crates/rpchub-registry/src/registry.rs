//! Concurrent multi-source discovery with partial-failure semantics.

use crate::catalog::Catalog;
use crate::error::{DiscoveryError, SourceFailure};
use async_trait::async_trait;
use futures::future::join_all;
use rpchub_core::{CallResult, RemoteCall};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A unit of discovery work: queries one configured backend source and
/// returns the procedures it finds. Implementations close over a backend
/// client and, usually, a set of tag filters.
#[async_trait]
pub trait DiscoverySource: Send + Sync {
    /// Stable name of the source, used in aggregated error messages.
    fn name(&self) -> &str;

    async fn discover(&self) -> CallResult<Vec<Arc<dyn RemoteCall>>>;
}

/// Holds the configured discovery sources and the current catalog snapshot.
///
/// Readers always observe a complete catalog: lookups clone an `Arc` to the
/// current immutable snapshot, and `reload` publishes a fully-built
/// replacement in a single swap.
pub struct Registry {
    sources: Vec<Arc<dyn DiscoverySource>>,
    catalog: RwLock<Arc<Catalog>>,
}

impl Registry {
    pub fn new(sources: Vec<Arc<dyn DiscoverySource>>) -> Self {
        Self { sources, catalog: RwLock::new(Arc::new(Catalog::new())) }
    }

    /// Run every discovery source concurrently and replace the catalog with
    /// the merged results.
    ///
    /// A failing source does not discard the results of succeeding ones: the
    /// catalog is swapped in either way, and all failures are aggregated into
    /// the returned [`DiscoveryError`]. Callers decide whether a partial
    /// reload is fatal.
    pub async fn reload(&self) -> Result<(), DiscoveryError> {
        let results = join_all(self.sources.iter().map(|s| s.discover())).await;

        // All tasks have completed; fold sequentially, so no synchronization
        // is needed around the merge.
        let mut catalog = Catalog::new();
        let mut failures = Vec::new();
        for (source, result) in self.sources.iter().zip(results) {
            match result {
                Ok(calls) => {
                    tracing::debug!(source = source.name(), count = calls.len(), "source discovered");
                    for call in calls {
                        catalog.insert(call);
                    }
                }
                Err(err) => {
                    tracing::warn!(source = source.name(), error = %err, "source discovery failed");
                    failures.push(SourceFailure {
                        source: source.name().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        *self.catalog.write().await = Arc::new(catalog);

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DiscoveryError { failures })
        }
    }

    /// Snapshot of the current catalog.
    pub async fn catalog(&self) -> Arc<Catalog> {
        self.catalog.read().await.clone()
    }

    /// Look up one procedure by name in the current snapshot.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn RemoteCall>> {
        self.catalog.read().await.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpchub_core::testing::StaticCall;
    use rpchub_core::CallError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ListSource {
        name: String,
        calls: Vec<String>,
    }

    impl ListSource {
        fn new(name: &str, calls: &[&str]) -> Arc<dyn DiscoverySource> {
            Arc::new(Self {
                name: name.to_string(),
                calls: calls.iter().map(|c| c.to_string()).collect(),
            })
        }
    }

    #[async_trait]
    impl DiscoverySource for ListSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn discover(&self) -> CallResult<Vec<Arc<dyn RemoteCall>>> {
            Ok(self
                .calls
                .iter()
                .map(|c| Arc::new(StaticCall::new(c)) as Arc<dyn RemoteCall>)
                .collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl DiscoverySource for FailingSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn discover(&self) -> CallResult<Vec<Arc<dyn RemoteCall>>> {
            Err(CallError::SchemaFetch("connection refused".to_string()))
        }
    }

    /// Returns a growing number of calls on each discovery cycle.
    struct CountingSource {
        reloads: AtomicUsize,
    }

    #[async_trait]
    impl DiscoverySource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn discover(&self) -> CallResult<Vec<Arc<dyn RemoteCall>>> {
            let n = self.reloads.fetch_add(1, Ordering::SeqCst) + 1;
            Ok((0..n)
                .map(|i| Arc::new(StaticCall::new(format!("call-{i}"))) as Arc<dyn RemoteCall>)
                .collect())
        }
    }

    #[tokio::test]
    async fn reload_merges_all_sources() {
        let registry = Registry::new(vec![
            ListSource::new("empty", &[]),
            ListSource::new("two", &["a", "b"]),
            ListSource::new("one", &["c"]),
        ]);

        registry.reload().await.unwrap();

        let catalog = registry.catalog().await;
        assert_eq!(catalog.len(), 3);
        for name in ["a", "b", "c"] {
            assert!(catalog.get(name).is_some(), "missing {name}");
        }
    }

    #[tokio::test]
    async fn reload_keeps_successes_when_one_source_fails() {
        let registry = Registry::new(vec![
            ListSource::new("two", &["a", "b"]),
            Arc::new(FailingSource),
            ListSource::new("one", &["c"]),
        ]);

        let err = registry.reload().await.unwrap_err();
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].source, "broken");
        assert!(err.to_string().contains("connection refused"));

        let catalog = registry.catalog().await;
        assert_eq!(catalog.len(), 3);
        assert!(registry.get("a").await.is_some());
    }

    #[tokio::test]
    async fn readers_keep_their_snapshot_across_reloads() {
        let registry = Registry::new(vec![Arc::new(CountingSource { reloads: AtomicUsize::new(0) })]);

        registry.reload().await.unwrap();
        let before = registry.catalog().await;
        assert_eq!(before.len(), 1);

        registry.reload().await.unwrap();

        // The old snapshot is untouched; the fresh one reflects the new cycle.
        assert_eq!(before.len(), 1);
        assert_eq!(registry.catalog().await.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_names_across_sources_keep_the_later_source() {
        let registry = Registry::new(vec![
            ListSource::new("first", &["dup"]),
            ListSource::new("second", &["dup"]),
        ]);
        registry.reload().await.unwrap();
        assert_eq!(registry.catalog().await.len(), 1);
    }
}
