//! End-to-end replay tests: the reducer driven through the batch adapter
//! against the in-memory revertable store.

use serde_json::json;

use tokenstate_core::{
    Address, BatchDriver, RawTransferEvent, RecordId, TransferProcessor, ZERO_ADDRESS,
};
use tokenstate_storage::InMemoryStore;

const CONTRACT: &str = "0xcccc567890123456789012345678901234567890";
const ALICE: &str = "0x1111567890123456789012345678901234567890";
const BOB: &str = "0x2222567890123456789012345678901234567890";

fn raw(n: u64, from: &str, to: &str, token_id: &str) -> RawTransferEvent {
    RawTransferEvent {
        address: CONTRACT.into(),
        args: json!({ "from": from, "to": to, "id": token_id }),
        event_id: format!("ev-{n}"),
        block_number: 100 + n,
    }
}

fn token_key(token_id: &str) -> RecordId {
    RecordId::token(&Address::parse(CONTRACT).unwrap(), token_id)
}

async fn fresh_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    TransferProcessor::new().setup(&store).await.unwrap();
    store
}

async fn apply(store: &InMemoryStore, events: &[RawTransferEvent]) {
    BatchDriver::new(store).run(events).await.unwrap();
}

#[tokio::test]
async fn mint_transfer_burn_lifecycle() {
    let store = fresh_store().await;

    apply(&store, &[raw(1, ZERO_ADDRESS, ALICE, "7")]).await;
    let minted = store.get_token(&token_key("7")).unwrap();
    assert_eq!(minted.owner, Address::parse(ALICE).unwrap());
    assert_eq!(minted.token_id, "7");

    apply(&store, &[raw(2, ALICE, BOB, "7")]).await;
    let transferred = store.get_token(&token_key("7")).unwrap();
    assert_eq!(transferred.owner, Address::parse(BOB).unwrap());
    // Everything but the owner is untouched.
    assert_eq!(transferred.token_id, minted.token_id);
    assert_eq!(transferred.token_contract, minted.token_contract);

    apply(&store, &[raw(3, BOB, ZERO_ADDRESS, "7")]).await;
    assert!(store.get_token(&token_key("7")).is_none());
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn burn_of_nonexistent_token_leaves_no_trace() {
    let store = fresh_store().await;

    let outcome = BatchDriver::new(&store)
        .run(&[raw(1, ALICE, ZERO_ADDRESS, "9")])
        .await
        .unwrap();

    assert_eq!(outcome.noops, 1);
    assert_eq!(store.record_count(), 0);
    // No mutation was committed, so there is nothing to revert either.
    assert_eq!(store.journal_len(), 0);
    assert_eq!(store.revert_event("ev-1"), 0);
}

#[tokio::test]
async fn replaying_the_same_sequence_is_deterministic() {
    let sequence = vec![
        raw(1, ZERO_ADDRESS, ALICE, "1"),
        raw(2, ZERO_ADDRESS, ALICE, "2"),
        raw(3, ALICE, BOB, "1"),
        raw(4, ALICE, ZERO_ADDRESS, "2"),
        raw(5, ZERO_ADDRESS, BOB, "3"),
    ];

    let first = fresh_store().await;
    apply(&first, &sequence).await;
    let second = fresh_store().await;
    apply(&second, &sequence).await;

    assert_eq!(first.all_tokens(), second.all_tokens());
}

#[tokio::test]
async fn reordering_unrelated_events_commutes() {
    let a = raw(1, ZERO_ADDRESS, ALICE, "1");
    let b = raw(2, ZERO_ADDRESS, BOB, "2");

    let first = fresh_store().await;
    apply(&first, &[a.clone(), b.clone()]).await;
    let second = fresh_store().await;
    apply(&second, &[b, a]).await;

    assert_eq!(first.all_tokens(), second.all_tokens());
}

#[tokio::test]
async fn reordering_same_key_events_does_not_commute() {
    let mint = raw(1, ZERO_ADDRESS, ALICE, "7");
    let transfer = raw(2, ALICE, BOB, "7");
    let burn = raw(3, ALICE, ZERO_ADDRESS, "7");

    // transfer then burn: the token ends up absent.
    let first = fresh_store().await;
    apply(&first, &[mint.clone(), transfer.clone(), burn.clone()]).await;
    assert!(first.get_token(&token_key("7")).is_none());

    // burn then transfer: the burn deletes, the transfer re-creates.
    let second = fresh_store().await;
    apply(&second, &[mint, burn, transfer]).await;
    let resurrected = second.get_token(&token_key("7")).unwrap();
    assert_eq!(resurrected.owner, Address::parse(BOB).unwrap());

    assert_ne!(first.all_tokens(), second.all_tokens());
}

#[tokio::test]
async fn mint_then_burn_round_trips_to_absent() {
    let store = fresh_store().await;
    apply(
        &store,
        &[raw(1, ZERO_ADDRESS, ALICE, "7"), raw(2, ALICE, ZERO_ADDRESS, "7")],
    )
    .await;

    let never_seen = fresh_store().await;
    assert_eq!(store.all_tokens(), never_seen.all_tokens());
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn reverting_a_retracted_event_restores_prior_owner() {
    let store = fresh_store().await;
    apply(
        &store,
        &[raw(1, ZERO_ADDRESS, ALICE, "7"), raw(2, ALICE, BOB, "7")],
    )
    .await;
    assert_eq!(
        store.get_token(&token_key("7")).unwrap().owner,
        Address::parse(BOB).unwrap()
    );

    // The chain retracts ev-2: ownership goes back to Alice.
    assert_eq!(store.revert_event("ev-2"), 1);
    assert_eq!(
        store.get_token(&token_key("7")).unwrap().owner,
        Address::parse(ALICE).unwrap()
    );
}

#[tokio::test]
async fn reorg_rollback_unwinds_past_a_block() {
    let store = fresh_store().await;
    // Blocks 101, 102, 103 (raw() maps n → block 100 + n).
    apply(
        &store,
        &[
            raw(1, ZERO_ADDRESS, ALICE, "7"),
            raw(2, ALICE, BOB, "7"),
            raw(3, BOB, ZERO_ADDRESS, "7"),
        ],
    )
    .await;
    assert!(store.get_token(&token_key("7")).is_none());

    // Reorg back to block 101: only the mint survives.
    store.rollback_after(101);
    assert_eq!(
        store.get_token(&token_key("7")).unwrap().owner,
        Address::parse(ALICE).unwrap()
    );
    assert_eq!(store.journal_len(), 1);
}

#[tokio::test]
async fn malformed_event_fails_the_batch_without_mutating() {
    let store = fresh_store().await;
    let mut bad = raw(2, ALICE, BOB, "7");
    bad.args = json!({ "to": BOB, "id": "7" }); // missing `from`

    let err = BatchDriver::new(&store)
        .run(&[raw(1, ZERO_ADDRESS, ALICE, "7"), bad])
        .await
        .unwrap_err();

    assert!(err.is_malformed());
    assert_eq!(store.record_count(), 0);
}
