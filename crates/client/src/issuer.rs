//! Issuing sequence identifiers against a shared store.
//!
//! [`SequenceRegistry::next`] only computes the successor of a value. Two
//! sessions reading the same latest identifier compute the same successor,
//! so issuance needs a store that can claim a value conditionally. The
//! [`SequenceIssuer`] reads, computes, and claims, retrying when another
//! issuer got there first.

use std::collections::HashMap;

use async_trait::async_trait;
use salesdesk_core::sequence::SequenceRegistry;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::ClientError;
use crate::ports::LatestIdentifierSource;

/// Backing store for issued identifiers.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// The latest identifier issued for `prefix`.
    async fn latest(&self, prefix: &str) -> Result<Option<String>, ClientError>;

    /// Record `candidate` as issued if the latest is still `expected`.
    ///
    /// Returns `false` when another issuer moved the sequence first.
    async fn claim(
        &self,
        prefix: &str,
        expected: Option<&str>,
        candidate: &str,
    ) -> Result<bool, ClientError>;
}

/// An in-process store with atomic compare-and-set claims.
#[derive(Debug, Default)]
pub struct MemorySequenceStore {
    latest: Mutex<HashMap<String, String>>,
}

impl MemorySequenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a sequence from an already-issued identifier.
    #[must_use]
    pub fn with_latest(mut self, prefix: &str, latest: &str) -> Self {
        self.latest
            .get_mut()
            .insert(prefix.to_string(), latest.to_string());
        self
    }
}

#[async_trait]
impl SequenceStore for MemorySequenceStore {
    async fn latest(&self, prefix: &str) -> Result<Option<String>, ClientError> {
        Ok(self.latest.lock().await.get(prefix).cloned())
    }

    async fn claim(
        &self,
        prefix: &str,
        expected: Option<&str>,
        candidate: &str,
    ) -> Result<bool, ClientError> {
        let mut map = self.latest.lock().await;
        if map.get(prefix).map(String::as_str) != expected {
            return Ok(false);
        }
        map.insert(prefix.to_string(), candidate.to_string());
        Ok(true)
    }
}

/// A store that can only report the latest identifier.
///
/// Claims always succeed, so two sessions that read the same latest value
/// will issue the same identifier. Every claim logs a warning to keep that
/// visible.
#[derive(Debug, Clone)]
pub struct UnguardedSequenceStore<S> {
    source: S,
}

impl<S> UnguardedSequenceStore<S> {
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: LatestIdentifierSource> SequenceStore for UnguardedSequenceStore<S> {
    async fn latest(&self, prefix: &str) -> Result<Option<String>, ClientError> {
        self.source.latest(prefix).await
    }

    async fn claim(
        &self,
        prefix: &str,
        _expected: Option<&str>,
        candidate: &str,
    ) -> Result<bool, ClientError> {
        warn!(
            prefix,
            candidate, "Issuing identifier without a conditional claim; concurrent sessions may collide"
        );
        Ok(true)
    }
}

/// Issues identifiers from a [`SequenceStore`].
#[derive(Debug)]
pub struct SequenceIssuer<S> {
    store: S,
    registry: SequenceRegistry,
    max_attempts: u32,
}

impl<S: SequenceStore> SequenceIssuer<S> {
    /// Create an issuer. `max_attempts` is raised to at least one.
    #[must_use]
    pub fn new(store: S, registry: SequenceRegistry, max_attempts: u32) -> Self {
        Self {
            store,
            registry,
            max_attempts: max_attempts.max(1),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn registry(&self) -> &SequenceRegistry {
        &self.registry
    }

    /// Issue the next identifier for `prefix`.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or `SequenceExhausted` if every attempt
    /// lost its claim.
    #[instrument(skip(self))]
    pub async fn issue(&self, prefix: &str) -> Result<String, ClientError> {
        for attempt in 1..=self.max_attempts {
            let latest = self.store.latest(prefix).await?;
            let candidate = self.registry.next(prefix, latest.as_deref());
            if self
                .store
                .claim(prefix, latest.as_deref(), &candidate)
                .await?
            {
                info!(identifier = %candidate, attempt, "Issued identifier");
                return Ok(candidate);
            }
            debug!(
                latest = ?latest,
                candidate = %candidate,
                attempt,
                "Lost identifier claim, retrying"
            );
        }
        Err(ClientError::SequenceExhausted {
            prefix: prefix.to_string(),
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_issues_in_sequence() {
        let issuer = SequenceIssuer::new(
            MemorySequenceStore::new().with_latest("LD", "LD-998"),
            SequenceRegistry::default(),
            3,
        );
        assert_eq!(issuer.issue("LD").await.unwrap(), "LD-999");
        assert_eq!(issuer.issue("LD").await.unwrap(), "LD-1000");
        assert_eq!(issuer.issue("DO").await.unwrap(), "DO-01");
    }

    #[tokio::test]
    async fn test_with_latest_seeds_each_prefix() {
        let store = MemorySequenceStore::new()
            .with_latest("LD", "LD-041")
            .with_latest("DO", "DO-07")
            .with_latest("LD", "LD-042");
        assert_eq!(store.latest("LD").await.unwrap().as_deref(), Some("LD-042"));
        assert_eq!(store.latest("DO").await.unwrap().as_deref(), Some("DO-07"));
        assert_eq!(store.latest("QN").await.unwrap(), None);
    }

    /// Loses the first `losses` claims, as if another session won them.
    struct ContendedStore {
        inner: MemorySequenceStore,
        losses: AtomicU32,
    }

    #[async_trait]
    impl SequenceStore for ContendedStore {
        async fn latest(&self, prefix: &str) -> Result<Option<String>, ClientError> {
            self.inner.latest(prefix).await
        }

        async fn claim(
            &self,
            prefix: &str,
            expected: Option<&str>,
            candidate: &str,
        ) -> Result<bool, ClientError> {
            if self.losses.load(Ordering::SeqCst) > 0 {
                self.losses.fetch_sub(1, Ordering::SeqCst);
                let rival = SequenceRegistry::default().next(prefix, expected);
                self.inner.claim(prefix, expected, &rival).await?;
                return Ok(false);
            }
            self.inner.claim(prefix, expected, candidate).await
        }
    }

    #[tokio::test]
    async fn test_retries_after_lost_claim() {
        let issuer = SequenceIssuer::new(
            ContendedStore {
                inner: MemorySequenceStore::new(),
                losses: AtomicU32::new(2),
            },
            SequenceRegistry::default(),
            3,
        );
        assert_eq!(issuer.issue("QN").await.unwrap(), "QN-003");
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let issuer = SequenceIssuer::new(
            ContendedStore {
                inner: MemorySequenceStore::new(),
                losses: AtomicU32::new(10),
            },
            SequenceRegistry::default(),
            2,
        );
        assert!(matches!(
            issuer.issue("QN").await,
            Err(ClientError::SequenceExhausted { attempts: 2, .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_issuers_never_collide() {
        const SESSIONS: u32 = 16;
        let issuer = Arc::new(SequenceIssuer::new(
            MemorySequenceStore::new(),
            SequenceRegistry::default(),
            SESSIONS,
        ));

        let handles: Vec<_> = (0..SESSIONS)
            .map(|_| {
                let issuer = Arc::clone(&issuer);
                tokio::spawn(async move { issuer.issue("QN").await })
            })
            .collect();

        let mut issued = Vec::new();
        for handle in handles {
            issued.push(handle.await.unwrap().unwrap());
        }
        issued.sort();
        issued.dedup();
        assert_eq!(issued.len(), SESSIONS as usize);
        assert_eq!(
            issuer.store().latest("QN").await.unwrap().as_deref(),
            Some("QN-016")
        );
    }
}
