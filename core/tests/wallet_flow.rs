//! End-to-end tests for the wallet against a mock Solana cluster.
//!
//! The mock is a real HTTP JSON-RPC server (axum on an ephemeral port)
//! that decodes submitted transactions, checks their signatures, and
//! moves lamports between accounts. The wallet talks to it through the
//! production `RpcClient`, so everything from the SDK's wire encoding to
//! confirmation polling is exercised.
//!
//! Each test gets its own server and its own on-disk database.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::RwLock;
use serde_json::{json, Value};
use solana_system_interface::instruction::SystemInstruction;

use cryptonow_core::config::{WalletConfig, AIRDROP_LAMPORTS, LAMPORTS_PER_SOL};
use cryptonow_core::crypto::address::{Address, SYSTEM_PROGRAM_ID};
use cryptonow_core::crypto::keys::{TxSignature, WalletKeypair};
use cryptonow_core::crypto::mnemonic::{generate_mnemonic, mnemonic_to_seed, RecoveryPhrase};
use cryptonow_core::rpc::RpcError;
use cryptonow_core::storage::{TransferKind, TransferStatus, WalletDb};
use cryptonow_core::transaction::Transaction;
use cryptonow_core::{Chain, WalletError, WalletStore};

// ---------------------------------------------------------------------------
// Mock Cluster
// ---------------------------------------------------------------------------

const BLOCKHASH: &str = "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N";

#[derive(Default)]
struct MockCluster {
    balances: HashMap<String, u64>,
    /// Signatures the cluster has seen, all executed successfully.
    landed: Vec<String>,
    slot: u64,
    airdrop_counter: u8,
}

type SharedCluster = Arc<RwLock<MockCluster>>;

fn ok(id: &Value, result: Value) -> Json<Value> {
    Json(json!({"jsonrpc": "2.0", "result": result, "id": id}))
}

fn err(id: &Value, code: i64, message: &str) -> Json<Value> {
    Json(json!({"jsonrpc": "2.0", "error": {"code": code, "message": message}, "id": id}))
}

/// `(from, to, lamports)` of a single system transfer.
fn decode_transfer(tx: &Transaction) -> Option<(Address, Address, u64)> {
    let keys = &tx.message.account_keys;
    let ix = tx.message.instructions.first()?;
    if *keys.get(ix.program_id_index as usize)? != SYSTEM_PROGRAM_ID {
        return None;
    }
    let SystemInstruction::Transfer { lamports } = bincode::deserialize(&ix.data).ok()? else {
        return None;
    };
    let from = *keys.get(*ix.accounts.first()? as usize)?;
    let to = *keys.get(*ix.accounts.get(1)? as usize)?;
    Some((from, to, lamports))
}

async fn rpc_handler(State(cluster): State<SharedCluster>, Json(req): Json<Value>) -> Json<Value> {
    let mut c = cluster.write();
    c.slot += 1;
    let slot = c.slot;
    let id = req["id"].clone();
    let method = req["method"].as_str().unwrap_or_default();
    let params = req["params"].as_array().cloned().unwrap_or_default();
    let str_param = |i: usize| params.get(i).and_then(Value::as_str).unwrap_or_default().to_string();

    match method {
        "getVersion" => ok(&id, json!({"solana-core": "2.2.0", "feature-set": 0})),
        "getBalance" => {
            let balance = c.balances.get(&str_param(0)).copied().unwrap_or(0);
            ok(&id, json!({"context": {"slot": slot}, "value": balance}))
        }
        "getLatestBlockhash" => ok(
            &id,
            json!({"context": {"slot": slot}, "value": {"blockhash": BLOCKHASH, "lastValidBlockHeight": slot + 150}}),
        ),
        "sendTransaction" => {
            let decoded = STANDARD
                .decode(str_param(0))
                .ok()
                .and_then(|bytes| bincode::deserialize::<Transaction>(&bytes).ok());
            let Some(tx) = decoded else {
                return err(&id, -32602, "invalid transaction: failed to deserialize");
            };
            if tx.verify().is_err() {
                return err(&id, -32003, "Transaction signature verification failure");
            }
            if tx.message.recent_blockhash.to_string() != BLOCKHASH {
                return err(&id, -32002, "Blockhash not found");
            }
            let Some((from, to, lamports)) = decode_transfer(&tx) else {
                return err(&id, -32602, "unsupported instruction");
            };
            let from = from.to_string();
            let available = c.balances.get(&from).copied().unwrap_or(0);
            if available < lamports {
                return err(
                    &id,
                    -32002,
                    "Transaction simulation failed: Attempt to debit an account but found no record of a prior credit.",
                );
            }
            *c.balances.entry(from).or_default() -= lamports;
            *c.balances.entry(to.to_string()).or_default() += lamports;

            let sig = tx.signatures[0].to_string();
            c.landed.push(sig.clone());
            ok(&id, json!(sig))
        }
        "requestAirdrop" => {
            let lamports = params.get(1).and_then(Value::as_u64).unwrap_or(0);
            *c.balances.entry(str_param(0)).or_default() += lamports;
            c.airdrop_counter += 1;
            let sig = TxSignature::from([c.airdrop_counter; 64]).to_string();
            c.landed.push(sig.clone());
            ok(&id, json!(sig))
        }
        "getSignatureStatuses" => {
            let wanted: Vec<String> = params
                .first()
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                .unwrap_or_default();
            let statuses: Vec<Value> = wanted
                .iter()
                .map(|sig| {
                    if c.landed.contains(sig) {
                        json!({
                            "slot": slot,
                            "confirmations": 1,
                            "status": {"Ok": null},
                            "err": null,
                            "confirmationStatus": "confirmed",
                        })
                    } else {
                        Value::Null
                    }
                })
                .collect();
            ok(&id, json!({"context": {"slot": slot}, "value": statuses}))
        }
        _ => err(&id, -32601, "Method not found"),
    }
}

/// Starts the mock cluster and returns its URL and shared state.
async fn spawn_cluster() -> (String, SharedCluster) {
    let cluster: SharedCluster = Arc::new(RwLock::new(MockCluster::default()));
    let app = Router::new()
        .route("/", post(rpc_handler))
        .with_state(Arc::clone(&cluster));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock cluster");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock cluster");
    });
    (format!("http://{addr}"), cluster)
}

fn config_for(url: &str) -> WalletConfig {
    WalletConfig {
        rpc_url: Some(url.to_string()),
        confirmation_timeout_ms: 5_000,
        poll_interval_ms: 20,
        ..WalletConfig::default()
    }
}

fn balance_on(cluster: &SharedCluster, address: &Address) -> u64 {
    cluster
        .read()
        .balances
        .get(&address.to_string())
        .copied()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_airdrop_send_and_reload() {
    let (url, cluster) = spawn_cluster().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("db");

    let store = WalletStore::new(
        WalletDb::open(&db_path).expect("open db"),
        Chain::connect(config_for(&url)),
    );

    // Onboarding.
    let phrase = store.create_wallet().await.expect("create wallet");
    assert_eq!(phrase.word_count(), 24);
    let me = store.snapshot().public_key.expect("address");

    // Faucet.
    assert!(store.request_airdrop().await.expect("airdrop"));
    assert_eq!(balance_on(&cluster, &me), AIRDROP_LAMPORTS);
    assert_eq!(store.refresh_balance().await.unwrap(), AIRDROP_LAMPORTS);

    // Send a quarter SOL.
    let friend = WalletKeypair::generate().address();
    let sig = store
        .send_transaction(&friend.to_string(), LAMPORTS_PER_SOL / 4)
        .await
        .expect("send");
    assert!(cluster.read().landed.contains(&sig.to_string()));
    assert_eq!(balance_on(&cluster, &friend), LAMPORTS_PER_SOL / 4);
    assert_eq!(
        store.refresh_balance().await.unwrap(),
        AIRDROP_LAMPORTS - LAMPORTS_PER_SOL / 4
    );

    let history = store.transactions().unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|r| r.status == TransferStatus::Confirmed));
    let send = history
        .iter()
        .find(|r| r.kind == TransferKind::Send)
        .expect("send record");
    assert_eq!(send.signature, sig);
    assert_eq!(send.to, friend);
    assert_eq!(send.from, Some(me));

    // Restart: a fresh store over the same database picks the wallet up.
    drop(store);
    let store = WalletStore::new(
        WalletDb::open(&db_path).expect("reopen db"),
        Chain::connect(config_for(&url)),
    );
    assert!(store.load_wallet().await.unwrap());
    let state = store.snapshot();
    assert_eq!(state.public_key, Some(me));
    assert_eq!(state.mnemonic.as_ref(), Some(&phrase));
    assert_eq!(state.balance, AIRDROP_LAMPORTS - LAMPORTS_PER_SOL / 4);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn cluster_rejection_surfaces_as_rpc_error() {
    let (url, _cluster) = spawn_cluster().await;
    let chain = Chain::connect(config_for(&url));

    let seed = mnemonic_to_seed(&generate_mnemonic());
    let me = WalletKeypair::account_from_seed(seed.as_str()).unwrap().address();

    let err = chain
        .submit_transfer(&seed, &me, &Address::new_from_array([3; 32]), 1)
        .await
        .unwrap_err();
    match err {
        WalletError::Rpc(RpcError::Server { code, message }) => {
            assert_eq!(code, -32002);
            assert!(message.contains("simulation failed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn stale_cached_balance_is_caught_by_cluster() {
    let (url, cluster) = spawn_cluster().await;
    let dir = tempfile::tempdir().unwrap();
    let store = WalletStore::new(
        WalletDb::open(dir.path()).unwrap(),
        Chain::connect(config_for(&url)),
    );
    store.create_wallet().await.unwrap();
    let me = store.snapshot().public_key.unwrap();

    cluster.write().balances.insert(me.to_string(), LAMPORTS_PER_SOL);
    store.refresh_balance().await.unwrap();
    // Funds leave through another device.
    cluster.write().balances.insert(me.to_string(), 0);

    let err = store
        .send_transaction(&Address::new_from_array([3; 32]).to_string(), LAMPORTS_PER_SOL / 2)
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::Rpc(RpcError::Server { .. })));
    let state = store.snapshot();
    assert!(state.error.is_some());
    assert!(!state.is_loading);
    assert!(store.transactions().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_cluster_records_error_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let db = WalletDb::open(dir.path()).unwrap();

    // Create the wallet against a live cluster, then point at a dead port.
    let (url, _cluster) = spawn_cluster().await;
    let store = WalletStore::new(db.clone(), Chain::connect(config_for(&url)));
    store.create_wallet().await.unwrap();
    drop(store);

    let store = WalletStore::new(db, Chain::connect(config_for("http://127.0.0.1:9")));
    assert!(store.load_wallet().await.unwrap());
    let state = store.snapshot();
    assert!(state.is_loaded());
    assert!(state.error.unwrap().contains("network error"));
}

#[tokio::test]
async fn import_picks_up_existing_funds() {
    const PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    let (url, cluster) = spawn_cluster().await;
    let seed = mnemonic_to_seed(&RecoveryPhrase::parse(PHRASE).unwrap());
    let me = WalletKeypair::account_from_seed(seed.as_str()).unwrap().address();
    cluster.write().balances.insert(me.to_string(), 2 * LAMPORTS_PER_SOL);

    let dir = tempfile::tempdir().unwrap();
    let store = WalletStore::new(WalletDb::open(dir.path()).unwrap(), Chain::connect(config_for(&url)));
    assert_eq!(store.import_wallet(PHRASE).await.unwrap(), me);

    let state = store.snapshot();
    assert_eq!(state.known_balance(), Some(2 * LAMPORTS_PER_SOL));
    assert!(state.error.is_none());
}
