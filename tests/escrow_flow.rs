//! End-to-end escrow lifecycle scenarios.
//!
//! Exercises the whole stack (service + ledger + policies + mock ports)
//! against the properties the engine guarantees: uniqueness, conservation,
//! at-most-once release, deadline gating and secret authorization.

use std::sync::Arc;

use rand::RngCore;

use remitlock::ports::mock::{MockBank, MockClock, MockGuard};
use remitlock::{
    AccountId, DurationMs, EntryStatus, EscrowConfig, EscrowError, EscrowService, RemitId, Secret,
};

const ADMIN: AccountId = 1;
const ALICE: AccountId = 1001;
const BOB: AccountId = 2002;
const CAROL: AccountId = 3003;
const DAY: DurationMs = 86_400_000;

struct World {
    service: EscrowService,
    bank: Arc<MockBank>,
    clock: Arc<MockClock>,
    guard: Arc<MockGuard>,
    scope: u64,
}

fn world() -> World {
    let config = EscrowConfig::default();
    let bank = Arc::new(MockBank::new());
    let clock = Arc::new(MockClock::new(1_000));
    let guard = Arc::new(MockGuard::new(ADMIN));
    let service =
        EscrowService::new(&config, guard.clone(), bank.clone(), clock.clone()).unwrap();
    World {
        service,
        bank,
        clock,
        guard,
        scope: config.scope,
    }
}

fn random_secret() -> Secret {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    Secret::from_bytes(bytes)
}

/// Helper: derive + initiate in one step, returning the identifier.
fn open_transfer(
    w: &World,
    sender: AccountId,
    recipient: AccountId,
    deposit: u64,
    secret: &Secret,
) -> RemitId {
    let id = RemitId::derive(w.scope, sender, recipient, secret).unwrap();
    w.service.initiate(sender, id, recipient, deposit, DAY).unwrap();
    id
}

#[test]
fn scenario_alice_pays_bob() {
    // initiate(Alice, Bob, deposit=100, fee=5, duration=1 day)
    let w = world();
    let secret = random_secret();
    let id = open_transfer(&w, ALICE, BOB, 100, &secret);

    let entry = w.service.entry(&id).unwrap().unwrap();
    assert_eq!(entry.amount, 95, "principal is net of fee");
    assert_eq!(entry.fee, 5);
    assert_eq!(entry.status, EntryStatus::Created);
    assert_eq!(entry.deadline, 1_000 + DAY);

    // Bob claims with the secret and receives 95
    assert_eq!(w.service.claim(BOB, id, &secret).unwrap(), 95);
    assert_eq!(w.bank.paid_to(BOB), 95);
    assert_eq!(
        w.service.entry(&id).unwrap().unwrap().status,
        EntryStatus::Claimed
    );

    // second claim fails
    assert_eq!(
        w.service.claim(BOB, id, &secret).unwrap_err(),
        EscrowError::AlreadyClaimed
    );
    assert_eq!(w.bank.transfer_count(), 1, "exactly one payout, ever");
}

#[test]
fn scenario_uniqueness_and_no_replay() {
    let w = world();
    let secret = random_secret();
    let id = open_transfer(&w, ALICE, BOB, 100, &secret);

    // same identifier again, even by another sender, is rejected
    assert_eq!(
        w.service.initiate(CAROL, id, BOB, 500, DAY).unwrap_err(),
        EscrowError::DuplicateIdentifier
    );

    // ... and still rejected after the entry is closed
    w.service.claim(BOB, id, &secret).unwrap();
    assert_eq!(
        w.service.initiate(ALICE, id, BOB, 500, DAY).unwrap_err(),
        EscrowError::DuplicateIdentifier
    );
}

#[test]
fn scenario_conservation() {
    let w = world();
    let s1 = random_secret();
    let s2 = random_secret();

    // two deposits: escrowed total tracks net principal, fees accrue apart
    open_transfer(&w, ALICE, BOB, 100, &s1);
    let id2 = open_transfer(&w, CAROL, BOB, 60, &s2);
    assert_eq!(w.service.escrowed_total().unwrap(), 95 + 55);
    assert_eq!(w.service.fee_balance().unwrap(), 10);

    // a release decreases the total by exactly the entry's amount
    w.service.claim(BOB, id2, &s2).unwrap();
    assert_eq!(w.service.escrowed_total().unwrap(), 95);

    // fee settlement does not touch principal
    assert_eq!(w.service.withdraw_fees(ADMIN).unwrap(), 10);
    assert_eq!(w.service.escrowed_total().unwrap(), 95);
    assert_eq!(w.service.fee_balance().unwrap(), 0);
}

#[test]
fn scenario_reclaim_after_timeout() {
    let w = world();
    let secret = random_secret();
    let id = open_transfer(&w, ALICE, BOB, 100, &secret);

    // before and exactly at the deadline: too early
    assert_eq!(
        w.service.reclaim(ALICE, id, &secret).unwrap_err(),
        EscrowError::TooEarly
    );
    w.clock.set(1_000 + DAY);
    assert_eq!(
        w.service.reclaim(ALICE, id, &secret).unwrap_err(),
        EscrowError::TooEarly
    );

    // strictly after: the sender gets the principal back
    w.clock.advance(1);
    assert_eq!(w.service.reclaim(ALICE, id, &secret).unwrap(), 95);
    assert_eq!(w.bank.paid_to(ALICE), 95);

    // Bob is locked out now
    assert_eq!(
        w.service.claim(BOB, id, &secret).unwrap_err(),
        EscrowError::AlreadyClaimed
    );
}

#[test]
fn scenario_authorization() {
    let w = world();
    let secret = random_secret();
    let id = open_transfer(&w, ALICE, BOB, 100, &secret);

    // a wrong secret never opens the entry, regardless of caller
    assert_eq!(
        w.service.claim(BOB, id, &random_secret()).unwrap_err(),
        EscrowError::IdentifierMismatch
    );

    // the right secret in the wrong hands fails on identity
    assert_eq!(
        w.service.claim(CAROL, id, &secret).unwrap_err(),
        EscrowError::AccountMismatch
    );
    w.clock.advance(2 * DAY);
    assert_eq!(
        w.service.reclaim(BOB, id, &secret).unwrap_err(),
        EscrowError::AccountMismatch
    );

    // nothing leaked out along the way
    assert_eq!(w.bank.transfer_count(), 0);
    assert_eq!(w.service.escrowed_total().unwrap(), 95);
}

#[test]
fn scenario_rejected_initiations_leave_no_trace() {
    let w = world();
    let secret = random_secret();
    let id = RemitId::derive(w.scope, ALICE, BOB, &secret).unwrap();

    // duration below the window
    assert_eq!(
        w.service.initiate(ALICE, id, BOB, 100, 1_000).unwrap_err(),
        EscrowError::DeadlineOutOfRange
    );
    // deposit not exceeding the fee
    assert_eq!(
        w.service.initiate(ALICE, id, BOB, 5, DAY).unwrap_err(),
        EscrowError::InsufficientValue
    );

    assert!(w.service.entry(&id).unwrap().is_none(), "no entry created");
    assert_eq!(w.service.escrowed_total().unwrap(), 0);
    assert_eq!(w.service.fee_balance().unwrap(), 0, "no value retained");
    assert!(w.service.drain_events().is_empty());
}

#[test]
fn scenario_pause_halts_state_changes() {
    let w = world();
    let secret = random_secret();
    let id = open_transfer(&w, ALICE, BOB, 100, &secret);

    w.guard.set_paused(true);
    assert_eq!(
        w.service.claim(BOB, id, &secret).unwrap_err(),
        EscrowError::ServicePaused
    );
    assert_eq!(
        w.service.withdraw_fees(ADMIN).unwrap_err(),
        EscrowError::ServicePaused
    );
    // reads stay open under the default policy
    assert_eq!(w.service.escrowed_total().unwrap(), 95);

    w.guard.set_paused(false);
    w.service.claim(BOB, id, &secret).unwrap();
}

#[test]
fn scenario_post_commit_transfer_failure_is_final() {
    let w = world();
    let secret = random_secret();
    let id = open_transfer(&w, ALICE, BOB, 100, &secret);

    w.bank.set_fail_next(true);
    let err = w.service.claim(BOB, id, &secret).unwrap_err();
    assert_eq!(err.code(), "TRANSFER_FAILED");

    // the claim is committed: Bob cannot retry through the engine, and the
    // sender cannot reclaim what was already released on paper
    assert_eq!(
        w.service.claim(BOB, id, &secret).unwrap_err(),
        EscrowError::AlreadyClaimed
    );
    w.clock.advance(2 * DAY);
    assert_eq!(
        w.service.reclaim(ALICE, id, &secret).unwrap_err(),
        EscrowError::AlreadyClaimed
    );
}

#[test]
fn scenario_event_stream_for_indexing() {
    let w = world();
    let secret = random_secret();
    let id = open_transfer(&w, ALICE, BOB, 100, &secret);
    w.service.claim(BOB, id, &secret).unwrap();
    w.service.set_fee(ADMIN, 7).unwrap();
    w.service.withdraw_fees(ADMIN).unwrap();

    let events = w.service.drain_events();
    let names: Vec<_> = events.iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec![
            "transfer_created",
            "transfer_claimed",
            "fee_changed",
            "fees_withdrawn"
        ]
    );

    // every event serializes with a type tag for downstream consumers
    for event in &events {
        let json = serde_json::to_string(event).unwrap();
        assert!(json.contains("\"type\":"), "missing tag in {}", json);
    }
}

#[test]
fn scenario_many_independent_transfers() {
    let w = world();
    let mut open = Vec::new();

    for i in 0..50u64 {
        let secret = random_secret();
        let sender = 10_000 + i;
        let id = open_transfer(&w, sender, BOB, 100 + i, &secret);
        open.push((id, sender, secret, 95 + i));
    }
    let expected_total: u64 = open.iter().map(|(_, _, _, net)| net).sum();
    assert_eq!(w.service.escrowed_total().unwrap(), expected_total);

    // Bob claims every other transfer; the rest time out and are reclaimed
    for (i, (id, _, secret, net)) in open.iter().enumerate() {
        if i % 2 == 0 {
            assert_eq!(w.service.claim(BOB, *id, secret).unwrap(), *net);
        }
    }
    w.clock.advance(2 * DAY);
    for (i, (id, sender, secret, net)) in open.iter().enumerate() {
        if i % 2 != 0 {
            assert_eq!(w.service.reclaim(*sender, *id, secret).unwrap(), *net);
        }
    }

    assert_eq!(w.service.escrowed_total().unwrap(), 0);
    assert_eq!(w.bank.transfer_count(), 50);
}
