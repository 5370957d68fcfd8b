
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use binding::{supercluster::ISuperCluster, token::IERC20};
use setup::{hash, Event, Harness};
use staking::Notice;
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::test]
async fn test_deposit_approves_then_deposits() {
    let harness = Harness::new(|_, _| {}).await;
    let contracts = harness.network.contracts.clone();

    let receipt = harness
        .session
        .deposit("100", None)
        .await
        .unwrap()
        .expect("submission should run");

    assert!(receipt.confirmed);
    assert_eq!(receipt.tx_hash, hash(1));

    let transactions = harness.transactions();
    assert_eq!(transactions.len(), 4);
    assert!(matches!(&transactions[0], Event::Sent { target, .. } if *target == contracts.usdc));
    assert_eq!(transactions[1], Event::Waited(hash(0)));
    assert!(
        matches!(&transactions[2], Event::Sent { target, .. } if *target == contracts.super_cluster)
    );
    assert_eq!(transactions[3], Event::Waited(hash(1)));

    let sent = harness.sent();
    let approve = IERC20::approveCall::abi_decode(&sent[0].1).unwrap();
    assert_eq!(approve.spender, contracts.super_cluster);
    assert_eq!(approve.amount, U256::from(100_000_000u64));

    let deposit = ISuperCluster::depositCall::abi_decode(&sent[1].1).unwrap();
    assert_eq!(deposit.pilot, contracts.default_pilot);
    assert_eq!(deposit.token, contracts.usdc);
    assert_eq!(deposit.amount, U256::from(100_000_000u64));

    let form = harness.session.deposit_form.snapshot();
    assert!(!form.is_submitting);
    assert_eq!(form.tx_hash, Some(hash(1)));
    assert!(form.error.is_none());
    assert!(matches!(form.notice, Some(Notice::Success(_))));
}

#[tokio::test]
async fn test_balances_refetched_after_success() {
    let harness = Harness::new(|_, _| {}).await;
    let contracts = harness.network.contracts.clone();

    harness.session.deposit("100", None).await.unwrap();

    let events = harness.events.lock().unwrap().clone();
    let last_wait = events
        .iter()
        .rposition(|e| *e == Event::Waited(hash(1)))
        .unwrap();
    let after: Vec<_> = events[last_wait + 1..].to_vec();
    assert!(after.contains(&Event::BalanceRead(contracts.usdc)));
    assert!(after.contains(&Event::BalanceRead(contracts.s_token)));
}

#[tokio::test]
async fn test_deposit_uses_selected_pilot() {
    let harness = Harness::new(|_, _| {}).await;
    let selected = Address::repeat_byte(0x42);
    harness.session.pilots().select(selected).await.unwrap();

    harness.session.deposit("1", None).await.unwrap();
    let deposit = ISuperCluster::depositCall::abi_decode(&harness.sent()[1].1).unwrap();
    assert_eq!(deposit.pilot, selected);

    // explicit override wins
    harness.clear_events();
    let explicit = Address::repeat_byte(0x43);
    harness.session.deposit("1", Some(explicit)).await.unwrap();
    let deposit = ISuperCluster::depositCall::abi_decode(&harness.sent()[1].1).unwrap();
    assert_eq!(deposit.pilot, explicit);
}

#[tokio::test]
async fn test_deposit_follows_selection_written_elsewhere() {
    let harness = Harness::new(|_, _| {}).await;
    let selected = Address::repeat_byte(0x44);

    // another process rewrites the store after the session opened it
    std::fs::write(
        harness.store_dir.path().join("store.json"),
        format!(r#"{{"supercluster.selectedPilot":"{selected}"}}"#),
    )
    .unwrap();

    harness.session.deposit("1", None).await.unwrap();
    let deposit = ISuperCluster::depositCall::abi_decode(&harness.sent()[1].1).unwrap();
    assert_eq!(deposit.pilot, selected);
    assert_eq!(harness.session.pilots().current(), selected);
}

#[tokio::test]
async fn test_malformed_pilot_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("store.json"),
        r#"{"supercluster.selectedPilot":"not-an-address"}"#,
    )
    .unwrap();
    let harness = Harness::with_store(dir, |_, _| {}).await;

    harness.session.deposit("1", None).await.unwrap();
    let deposit = ISuperCluster::depositCall::abi_decode(&harness.sent()[1].1).unwrap();
    assert_eq!(deposit.pilot, harness.network.contracts.default_pilot);
}

#[tokio::test]
async fn test_invalid_amounts_send_nothing() {
    let harness = Harness::new(|_, _| {}).await;

    for amount in ["0", "-5", "abc", "1.0000001", ""] {
        let err = harness.session.deposit(amount, None).await.unwrap_err();
        assert_eq!(err.message, "Enter a valid amount.", "{amount:?}");
        assert!(!err.is_user_rejection);
    }

    let err = harness.session.deposit("250.6", None).await.unwrap_err();
    assert_eq!(err.message, "Amount exceeds your USDC balance.");

    assert!(harness.sent().is_empty());
    assert_eq!(
        harness.session.deposit_form.snapshot().error.as_deref(),
        Some("Amount exceeds your USDC balance.")
    );
}

#[tokio::test]
async fn test_wrong_network() {
    let harness = Harness::new(|wallet, _| wallet.chain_id = 1).await;

    let err = harness.session.deposit("100", None).await.unwrap_err();
    assert_eq!(err.message, "Please switch to the correct network first.");
    assert!(harness.sent().is_empty());
}

#[tokio::test]
async fn test_not_connected() {
    let harness = Harness::new(|wallet, _| wallet.account = None).await;

    let err = harness.session.deposit("100", None).await.unwrap_err();
    assert_eq!(err.message, "Wallet is not connected.");
    assert_eq!(*harness.events.lock().unwrap(), vec![Event::AccountRead]);
}

#[tokio::test]
async fn test_rejected_deposit_after_approve() {
    let harness = Harness::new(|wallet, _| wallet.reject_at(1)).await;

    let err = harness.session.deposit("100", None).await.unwrap_err();
    assert!(err.is_user_rejection);
    assert_eq!(harness.sent().len(), 1);

    let form = harness.session.deposit_form.snapshot();
    assert!(form.error.is_none());
    assert_eq!(form.notice, Some(Notice::Dismissed));
}

#[tokio::test]
async fn test_final_step_timeout_is_pending() {
    let harness = Harness::new(|_, receipts| {
        receipts.timed_out.insert(hash(1));
    })
    .await;

    let receipt = harness.session.deposit("100", None).await.unwrap().unwrap();
    assert!(!receipt.confirmed);
    assert_eq!(receipt.tx_hash, hash(1));
    assert!(harness
        .session
        .explorer_url(receipt.tx_hash)
        .ends_with(&format!("/tx/{}", hash(1))));
}

#[tokio::test]
async fn test_approve_timeout_stops_sequence() {
    let harness = Harness::new(|_, receipts| {
        receipts.timed_out.insert(hash(0));
    })
    .await;

    let err = harness.session.deposit("100", None).await.unwrap_err();
    assert!(!err.is_user_rejection);
    assert_eq!(harness.sent().len(), 1);
}

#[tokio::test]
async fn test_reentrant_submission_is_ignored() {
    let gate = Arc::new(Notify::new());
    let wallet_gate = gate.clone();
    let harness = Harness::new(move |wallet, _| wallet.gate = Some(wallet_gate)).await;

    let release = async {
        tokio::task::yield_now().await;
        assert!(harness.session.deposit_form.is_submitting());
        // one permit per submission
        gate.notify_one();
        tokio::task::yield_now().await;
        gate.notify_one();
    };

    let (first, second, _) = tokio::join!(
        harness.session.deposit("100", None),
        harness.session.deposit("100", None),
        release
    );

    assert!(first.unwrap().is_some());
    assert!(second.unwrap().is_none());
    assert_eq!(harness.sent().len(), 2);
}
