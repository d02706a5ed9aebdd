//! Integration tests for the owned-movie indexer.
//!
//! Tests cover:
//! - Idempotence over a fixed snapshot set
//! - Deduplication by (title, year)
//! - Selection filtering and the empty-selection shortcut
//! - Last-write-wins in server/library order
//! - Propagation of snapshot read failures

mod common;

use collection_gaps::core::indexer::build_owned_index;
use collection_gaps::models::{Movie, MovieKey, ServerRegistry};
use collection_gaps::Error;
use common::*;
use std::sync::atomic::Ordering;

// ========== TEST FIXTURES ==========

/// Two servers, each with one selected and one unselected library.
fn two_server_registry() -> ServerRegistry {
    registry(vec![
        server("b", "Basement")
            .with_library(movie_library("b", "1", "Films", true))
            .with_library(movie_library("b", "2", "Kids", false)),
        server("a", "Attic")
            .with_library(movie_library("a", "1", "Movies", true))
            .with_library(movie_library("a", "2", "Trash", false)),
    ])
}

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.seed(
        "a",
        "1",
        vec![
            Movie::new("Heat", Some(1995)).with_tmdb_id(949),
            Movie::new("Ronin", Some(1998)),
        ],
    );
    store.seed("a", "2", vec![Movie::new("Unwanted", Some(2010))]);
    store.seed(
        "b",
        "1",
        vec![
            Movie::new("HEAT", Some(1995)).with_tmdb_id(1949),
            Movie::new("Alien", Some(1979)),
        ],
    );
    store.seed("b", "2", vec![Movie::new("Cars", Some(2006))]);
    store
}

// ========== TESTS ==========

#[test]
fn test_index_is_idempotent() {
    let registry = two_server_registry();
    let store = seeded_store();

    let first = build_owned_index(&registry, &store).unwrap();
    let second = build_owned_index(&registry, &store).unwrap();

    let a: Vec<_> = first.iter().map(|(k, m)| (k.clone(), m.tmdb_id)).collect();
    let b: Vec<_> = second.iter().map(|(k, m)| (k.clone(), m.tmdb_id)).collect();
    assert_eq!(a, b);
}

#[test]
fn test_index_has_no_duplicate_keys() {
    let index = build_owned_index(&two_server_registry(), &seeded_store()).unwrap();

    // Heat appears on both servers under different casing.
    assert_eq!(index.len(), 3);
    let keys: Vec<_> = index.iter().map(|(k, _)| k.clone()).collect();
    let mut deduped = keys.clone();
    deduped.dedup();
    assert_eq!(keys, deduped);
}

#[test]
fn test_only_selected_libraries_are_indexed() {
    let index = build_owned_index(&two_server_registry(), &seeded_store()).unwrap();

    assert!(index.contains(&MovieKey::new("Ronin", Some(1998))));
    assert!(index.contains(&MovieKey::new("Alien", Some(1979))));
    assert!(!index.contains(&MovieKey::new("Unwanted", Some(2010))));
    assert!(!index.contains(&MovieKey::new("Cars", Some(2006))));
}

#[test]
fn test_later_server_wins_on_equal_keys() {
    // Registry order is by server id, so "b" overwrites "a" whatever the config order.
    let index = build_owned_index(&two_server_registry(), &seeded_store()).unwrap();

    let heat = index.get(&MovieKey::new("Heat", Some(1995))).unwrap();
    assert_eq!(heat.tmdb_id, Some(1949));
    assert!(index.tmdb_ids().contains(&1949));
    assert!(!index.tmdb_ids().contains(&949));
}

#[test]
fn test_no_selected_libraries_skips_reading() {
    let registry = registry(vec![server("a", "Attic").with_library(movie_library("a", "1", "Movies", false))]);
    let store = seeded_store();

    let index = build_owned_index(&registry, &store).unwrap();

    assert!(index.is_empty());
    assert_eq!(store.global_reads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unsynced_selected_library_contributes_nothing() {
    let registry = registry(vec![server("z", "New").with_library(movie_library("z", "1", "Movies", true))]);

    let index = build_owned_index(&registry, &seeded_store()).unwrap();

    assert!(index.is_empty());
}

#[test]
fn test_read_failure_is_reported() {
    let result = build_owned_index(&two_server_registry(), &BrokenStore::Snapshot);
    match result {
        Err(Error::SnapshotRead(msg)) => assert_eq!(msg, "disk on fire"),
        other => panic!("expected a snapshot read error, got {:?}", other.map(|i| i.len())),
    }
}

#[test]
fn test_other_read_failures_become_snapshot_read_errors() {
    let result = build_owned_index(&two_server_registry(), &BrokenStore::Io);
    match result {
        Err(Error::SnapshotRead(msg)) => assert!(msg.contains("no access")),
        other => panic!("expected a snapshot read error, got {:?}", other.map(|i| i.len())),
    }
}
