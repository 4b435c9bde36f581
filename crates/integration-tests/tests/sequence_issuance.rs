//! Integration tests for identifier issuance.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::HashSet;
use std::sync::Arc;

use salesdesk_client::{MemorySequenceStore, SequenceIssuer, SequenceStore};
use salesdesk_core::SequenceRegistry;
use salesdesk_core::sequence::latest_of;

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_documented_successors() {
    let registry = SequenceRegistry::default();
    assert_eq!(registry.next("LD", None), "LD-001");
    assert_eq!(registry.next("LD", Some("LD-001")), "LD-002");
    assert_eq!(registry.next("LD", Some("LD-999")), "LD-1000");
    assert_eq!(registry.next("DO", Some("DO-00")), "DO-01");
    assert_eq!(registry.next("LD", Some("XX-005")), "LD-001");
}

#[test]
fn test_latest_is_numeric_not_lexical() {
    let listed = ["QN-099", "QN-1000", "QN-998", "LD-5000", "QN-abc"];
    assert_eq!(
        latest_of("QN", listed.iter().copied()).as_deref(),
        Some("QN-1000")
    );
    assert_eq!(latest_of("DO", listed.iter().copied()), None);
}

// =============================================================================
// Concurrent Issuance Tests
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_sessions_get_distinct_identifiers() {
    const SESSIONS: u32 = 64;
    let issuer = Arc::new(SequenceIssuer::new(
        MemorySequenceStore::new().with_latest("LD", "LD-990"),
        SequenceRegistry::default(),
        SESSIONS,
    ));

    let mut handles = Vec::new();
    for _ in 0..SESSIONS {
        let issuer = Arc::clone(&issuer);
        handles.push(tokio::spawn(async move { issuer.issue("LD").await }));
    }

    let mut issued = HashSet::new();
    for handle in handles {
        let id = handle.await.unwrap().unwrap();
        assert!(issued.insert(id.clone()), "{id} issued twice");
    }

    assert_eq!(issued.len(), SESSIONS as usize);
    assert!(issued.contains("LD-991"));
    assert!(issued.contains("LD-1054"));
    assert_eq!(
        issuer.store().latest("LD").await.unwrap().as_deref(),
        Some("LD-1054")
    );
}

#[tokio::test]
async fn test_prefixes_are_independent() {
    let issuer = SequenceIssuer::new(
        MemorySequenceStore::new(),
        SequenceRegistry::default().with_width("QN", 4),
        1,
    );
    assert_eq!(issuer.issue("QN").await.unwrap(), "QN-0001");
    assert_eq!(issuer.issue("DO").await.unwrap(), "DO-01");
    assert_eq!(issuer.issue("QN").await.unwrap(), "QN-0002");
}
