//! Integration tests for the persistence layer.

use dossier::persistence::{
    associations, information, locations, rings, subjects, times, EntityKind, InfoKind, Store,
};
use tempfile::tempdir;

async fn create_test_store() -> (Store, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test_dossier.db");
    let store = Store::open(&path).await.unwrap();
    (store, dir)
}

#[tokio::test]
async fn test_store_creation_in_nested_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("dossier.db");

    let store = Store::open(&path).await.unwrap();
    assert!(path.exists());
    store.close().await;
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dossier.db");

    let store = Store::open(&path).await.unwrap();
    rings::create_ring(store.pool(), "berlin", "field office")
        .await
        .unwrap();
    store.close().await;

    let store = Store::open(&path).await.unwrap();
    let all = rings::list_rings(store.pool()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "berlin");
    assert_eq!(all[0].note, "field office");
    store.close().await;
}

#[tokio::test]
async fn test_ring_deletion_cascades() {
    let (store, _dir) = create_test_store().await;
    let pool = store.pool();

    let ring = rings::create_ring(pool, "berlin", "").await.unwrap();
    let subject = subjects::create_subject(pool, ring, "WOLF", "").await.unwrap();
    let info = information::create_information(pool, subject, InfoKind::Text, "phone", b"555", "")
        .await
        .unwrap();
    let location = locations::create_location(pool, ring, "cafe", 52.5, 13.4, "")
        .await
        .unwrap();
    let time = times::create_time(pool, ring, "2024-01-03", "").await.unwrap();
    let assoc = associations::create_association(pool, ring, 1, "meeting")
        .await
        .unwrap();
    associations::add_member(pool, assoc, EntityKind::Subject, subject)
        .await
        .unwrap();

    assert!(rings::delete_ring(pool, ring).await.unwrap());

    assert!(subjects::get_subject(pool, subject).await.unwrap().is_none());
    assert!(information::get_information(pool, info).await.unwrap().is_none());
    assert!(locations::list_locations(pool, ring).await.unwrap().is_empty());
    assert!(times::list_times(pool, ring).await.unwrap().is_empty());
    assert!(associations::get_association(pool, assoc).await.unwrap().is_none());
    assert!(associations::list_members(pool, assoc).await.unwrap().is_empty());
    assert!(!associations::entity_in_ring(pool, EntityKind::Location, location, ring)
        .await
        .unwrap());
    assert!(!associations::entity_in_ring(pool, EntityKind::Time, time, ring)
        .await
        .unwrap());

    store.close().await;
}

#[tokio::test]
async fn test_subject_deletion_unlinks_information() {
    let (store, _dir) = create_test_store().await;
    let pool = store.pool();

    let ring = rings::create_ring(pool, "berlin", "").await.unwrap();
    let wolf = subjects::create_subject(pool, ring, "WOLF", "").await.unwrap();
    let hawk = subjects::create_subject(pool, ring, "HAWK", "").await.unwrap();
    let info = information::create_information(pool, wolf, InfoKind::Text, "phone", b"555", "")
        .await
        .unwrap();
    let assoc = associations::create_association(pool, ring, 2, "calls")
        .await
        .unwrap();
    associations::add_member(pool, assoc, EntityKind::Information, info)
        .await
        .unwrap();
    associations::add_member(pool, assoc, EntityKind::Subject, hawk)
        .await
        .unwrap();

    assert!(subjects::delete_subject(pool, wolf).await.unwrap());

    let members = associations::list_members(pool, assoc).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].kind, EntityKind::Subject);
    assert_eq!(members[0].target_id, hawk);

    store.close().await;
}

#[tokio::test]
async fn test_duplicate_codename_in_ring() {
    let (store, _dir) = create_test_store().await;
    let pool = store.pool();

    let berlin = rings::create_ring(pool, "berlin", "").await.unwrap();
    let vienna = rings::create_ring(pool, "vienna", "").await.unwrap();
    subjects::create_subject(pool, berlin, "WOLF", "").await.unwrap();

    let err = subjects::create_subject(pool, berlin, "WOLF", "")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    // The same codename may exist in another ring.
    subjects::create_subject(pool, vienna, "WOLF", "").await.unwrap();

    store.close().await;
}

#[tokio::test]
async fn test_information_update_bumps_value() {
    let (store, _dir) = create_test_store().await;
    let pool = store.pool();

    let ring = rings::create_ring(pool, "berlin", "").await.unwrap();
    let subject = subjects::create_subject(pool, ring, "WOLF", "").await.unwrap();
    let id = information::create_information(pool, subject, InfoKind::Text, "alias", b"old", "")
        .await
        .unwrap();

    assert!(information::update_information_value(pool, id, b"new")
        .await
        .unwrap());
    let entry = information::get_information(pool, id).await.unwrap().unwrap();
    assert_eq!(entry.value, b"new");
    assert!(!information::update_information_value(pool, 999, b"x")
        .await
        .unwrap());

    store.close().await;
}
