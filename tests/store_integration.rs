//! Integration tests for the document store.
//!
//! Each test bootstraps a store in a temp directory and drives it the way
//! the TUI does: writes go through the store, snapshots come back from
//! `load_all`, and external edits (another user on the shared folder) are
//! simulated by touching the documents directly.

use std::fs;
use std::time::{Duration, Instant};

use funnel::model::bank::{BankFields, BankPatch, Stage};
use funnel::store::{Store, Subscription, discover_store, open_or_init};
use tempfile::TempDir;

fn fields(name: &str) -> BankFields {
    BankFields {
        name: name.into(),
        ..Default::default()
    }
}

#[test]
fn bootstrap_then_reopen() {
    let tmp = TempDir::new().unwrap();

    // First launch creates the store
    let store = open_or_init(tmp.path()).unwrap();
    store.create(fields("Alpha")).unwrap();
    drop(store);

    // Second launch discovers and reopens it
    let root = discover_store(tmp.path()).unwrap();
    let store = Store::open(&root).unwrap();
    let banks = store.load_all().unwrap();
    assert_eq!(banks.len(), 1);
    assert_eq!(banks[0].name, "Alpha");
}

#[test]
fn create_update_delete_round_trip() {
    let tmp = TempDir::new().unwrap();
    let store = open_or_init(tmp.path()).unwrap();

    let bank = store.create(fields("Bank A")).unwrap();
    assert_eq!(bank.stage, Stage::Unknown);
    assert_eq!(bank.created_at, bank.updated_at);

    let updated = store
        .update(
            &bank.id,
            BankPatch {
                stage: Some(Stage::Converted),
                volume_potential: Some(300),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.stage, Stage::Converted);
    assert_eq!(updated.volume_potential, 300);
    assert_eq!(updated.name, "Bank A");
    assert!(updated.updated_at >= bank.updated_at);

    store.delete(&bank.id).unwrap();
    assert!(store.load_all().unwrap().is_empty());
    // Idempotent
    store.delete(&bank.id).unwrap();
}

#[test]
fn two_stores_on_the_same_folder_see_each_other() {
    let tmp = TempDir::new().unwrap();
    let ours = open_or_init(tmp.path()).unwrap();
    let theirs = Store::open(tmp.path()).unwrap();

    let bank = theirs.create(fields("From Them")).unwrap();
    let banks = ours.load_all().unwrap();
    assert_eq!(banks.len(), 1);
    assert_eq!(banks[0].id, bank.id);

    // Last write wins: both sides update the same record, the later
    // update's fields land
    ours.update(
        &bank.id,
        BankPatch {
            stage: Some(Stage::Compatible),
            ..Default::default()
        },
    )
    .unwrap();
    theirs
        .update(
            &bank.id,
            BankPatch {
                stage: Some(Stage::Sampled),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(ours.load_all().unwrap()[0].stage, Stage::Sampled);
}

#[test]
fn subscription_reports_external_writes() {
    let tmp = TempDir::new().unwrap();
    let store = open_or_init(tmp.path()).unwrap();
    let subscription = Subscription::start(store.collection_dir()).unwrap();

    // Another user writes a document into the shared folder
    let other = Store::open(tmp.path()).unwrap();
    other.create(fields("From Elsewhere")).unwrap();

    // The watcher delivers asynchronously; poll the way the event loop does
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut changed = false;
    while Instant::now() < deadline {
        if subscription.poll_changed() {
            changed = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(changed, "subscription never reported the external write");

    let banks = store.load_all().unwrap();
    assert_eq!(banks.len(), 1);
    assert_eq!(banks[0].name, "From Elsewhere");
}

#[test]
fn corrupt_documents_do_not_poison_the_snapshot() {
    let tmp = TempDir::new().unwrap();
    let store = open_or_init(tmp.path()).unwrap();
    store.create(fields("Good")).unwrap();

    fs::write(store.collection_dir().join("half-written.json"), "{\"id\": \"x").unwrap();

    let banks = store.load_all().unwrap();
    assert_eq!(banks.len(), 1);
    assert_eq!(banks[0].name, "Good");
}

#[test]
fn snapshot_order_is_name_ascending() {
    let tmp = TempDir::new().unwrap();
    let store = open_or_init(tmp.path()).unwrap();
    for name in ["zeta", "Echo", "alpha"] {
        store.create(fields(name)).unwrap();
    }
    let names: Vec<String> = store
        .load_all()
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(names, vec!["alpha", "Echo", "zeta"]);
}
