//! # Screens
//!
//! One handler per subcommand. Handlers print to the writer they are
//! given and leave prompting to the caller, so they can be driven from
//! tests against a temporary database.

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use cryptonow_core::config::{Cluster, WalletConfig, AIRDROP_LAMPORTS, CONFIG_FILE_NAME, DB_DIR_NAME};
use cryptonow_core::crypto::address::{public_key_from_string, short_address};
use cryptonow_core::crypto::keys::TxSignature;
use cryptonow_core::crypto::mnemonic::RecoveryPhrase;
use cryptonow_core::qr::PaymentRequest;
use cryptonow_core::storage::{TransferKind, WalletDb};
use cryptonow_core::transaction::{format_sol, parse_sol};
use cryptonow_core::{Chain, WalletError, WalletState, WalletStore};

use crate::cli::{
    BackupArgs, HistoryArgs, ImportArgs, ReceiveArgs, ResetArgs, ScanArgs, SendArgs, SetPinArgs,
    SettingsArgs,
};

const DEFAULT_DATA_DIR: &str = ".cryptonow";

/// `--data-dir`, else `$HOME/.cryptonow`, else `./.cryptonow`.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(DEFAULT_DATA_DIR),
        None => PathBuf::from(DEFAULT_DATA_DIR),
    })
}

/// Reads `config.json` from the data directory and applies CLI overrides.
pub fn load_config(
    data_dir: &Path,
    cluster: Option<Cluster>,
    rpc_url: Option<String>,
) -> Result<WalletConfig> {
    let mut config = WalletConfig::load(data_dir.join(CONFIG_FILE_NAME))?;
    if let Some(cluster) = cluster {
        config.cluster = cluster;
    }
    if rpc_url.is_some() {
        config.rpc_url = rpc_url;
    }
    Ok(config)
}

/// An opened wallet: database, cluster connection and the store on top.
pub struct Session {
    store: WalletStore,
    data_dir: PathBuf,
}

impl Session {
    pub fn open(data_dir: &Path, config: WalletConfig) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;
        let db_path = data_dir.join(DB_DIR_NAME);
        let db = WalletDb::open(&db_path)
            .with_context(|| format!("failed to open wallet database at {}", db_path.display()))?;
        Self::with_db(db, data_dir.to_path_buf(), config)
    }

    pub fn with_db(db: WalletDb, data_dir: PathBuf, config: WalletConfig) -> Result<Self> {
        Ok(Self {
            store: WalletStore::new(db, Chain::connect(config)),
            data_dir,
        })
    }

    pub fn store(&self) -> &WalletStore {
        &self.store
    }

    fn config(&self) -> &WalletConfig {
        self.store.chain().config()
    }

    /// Loads the persisted wallet or explains how to get one.
    async fn require_wallet(&self) -> Result<WalletState> {
        if !self.store.load_wallet().await.context("failed to load wallet")? {
            bail!("no wallet on this device; run `cryptonow create` or `cryptonow import`");
        }
        Ok(self.store.snapshot())
    }

    /// Block explorer link for `signature`, when the cluster is a public one.
    fn explorer_url(&self, signature: &TxSignature) -> Option<String> {
        let config = self.config();
        if config.rpc_url.is_some() {
            return None;
        }
        Some(match config.cluster {
            Cluster::MainnetBeta => format!("https://explorer.solana.com/tx/{signature}"),
            cluster => format!("https://explorer.solana.com/tx/{signature}?cluster={cluster}"),
        })
    }
}

fn print_phrase(out: &mut impl Write, phrase: &RecoveryPhrase) -> Result<()> {
    for (i, word) in phrase.words().iter().enumerate() {
        write!(out, "{:>3}. {:<10}", i + 1, word)?;
        if (i + 1) % 4 == 0 {
            writeln!(out)?;
        }
    }
    if phrase.word_count() % 4 != 0 {
        writeln!(out)?;
    }
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

// ---------------------------------------------------------------------------
// Onboarding
// ---------------------------------------------------------------------------

pub async fn create(session: &Session, out: &mut impl Write) -> Result<()> {
    let phrase = session
        .store
        .create_wallet()
        .await
        .context("failed to create wallet")?;
    let state = session.store.snapshot();
    let address = state.public_key.context("wallet has no address after creation")?;

    writeln!(out, "Wallet created.")?;
    writeln!(out, "  Address : {address}")?;
    writeln!(out)?;
    writeln!(out, "Recovery phrase. Write it down and keep it offline:")?;
    writeln!(out)?;
    print_phrase(out, &phrase)?;
    writeln!(out)?;
    writeln!(out, "Anyone with these words controls the funds.")?;
    writeln!(out, "Next: `cryptonow set-pin <pin> <pin>` to protect the backup screen.")?;
    Ok(())
}

pub async fn import(session: &Session, args: &ImportArgs, out: &mut impl Write) -> Result<()> {
    let address = session
        .store
        .import_wallet(&args.joined())
        .await
        .context("failed to import wallet")?;

    let state = session.store.snapshot();
    writeln!(out, "Wallet imported.")?;
    writeln!(out, "  Address : {address}")?;
    match state.known_balance() {
        Some(lamports) => writeln!(out, "  Balance : {} SOL", format_sol(lamports))?,
        None => writeln!(
            out,
            "  Balance : unavailable ({})",
            state.error.as_deref().unwrap_or("not fetched")
        )?,
    }
    Ok(())
}

pub async fn set_pin(session: &Session, args: &SetPinArgs, out: &mut impl Write) -> Result<()> {
    session.require_wallet().await?;
    session
        .store
        .set_pin(&args.pin, &args.confirm)
        .context("failed to set PIN")?;
    writeln!(out, "PIN set.")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub async fn dashboard(session: &Session, out: &mut impl Write) -> Result<()> {
    let state = session.require_wallet().await?;
    let address = state.public_key.context("wallet has no address")?;
    let biometric = session.store.db().is_biometric_enabled()?;

    writeln!(out, "CryptoNow ({})", session.config().cluster)?;
    writeln!(out, "  Address   : {}  ({address})", short_address(&address.to_string()))?;
    match state.known_balance() {
        Some(lamports) => writeln!(out, "  Balance   : {} SOL", format_sol(lamports))?,
        None => writeln!(out, "  Balance   : unavailable")?,
    }
    writeln!(out, "  PIN       : {}", if state.is_pin_set { "set" } else { "not set" })?;
    writeln!(out, "  Biometric : {}", on_off(biometric))?;
    if let Some(error) = &state.error {
        writeln!(out)?;
        writeln!(out, "Last error: {error}")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Send / Receive / Airdrop
// ---------------------------------------------------------------------------

/// Sends SOL. `confirm` is asked the question unless `--yes` was given
/// and returns whether to go ahead.
pub async fn send(
    session: &Session,
    args: &SendArgs,
    out: &mut impl Write,
    confirm: impl FnOnce(&str) -> Result<bool>,
) -> Result<()> {
    let state = session.require_wallet().await?;
    let to = public_key_from_string(&args.to)
        .with_context(|| format!("invalid recipient address: {}", args.to))?;
    let lamports = parse_sol(&args.amount)
        .with_context(|| format!("invalid amount: {}", args.amount))?;
    let available = match state.known_balance() {
        Some(lamports) => lamports,
        None => session
            .store
            .refresh_balance()
            .await
            .context("balance unavailable, cannot check the amount")?,
    };
    if lamports > available {
        return Err(WalletError::InsufficientFunds {
            requested: lamports,
            available,
        }
        .into());
    }

    let question = format!("Send {} SOL to {to}?", format_sol(lamports));
    if !args.yes && !confirm(&question)? {
        writeln!(out, "Cancelled.")?;
        return Ok(());
    }

    let signature = session
        .store
        .send_transaction(&args.to, lamports)
        .await
        .context("transfer failed")?;
    tracing::info!(%signature, %to, lamports, "transfer confirmed");

    writeln!(out, "Sent {} SOL to {}.", format_sol(lamports), short_address(&to.to_string()))?;
    writeln!(out, "  Signature : {signature}")?;
    if let Some(url) = session.explorer_url(&signature) {
        writeln!(out, "  Explorer  : {url}")?;
    }
    // The store also schedules a delayed refresh, but that only matters to
    // long-lived front-ends. This process exits right after printing.
    if let Ok(balance) = session.store.refresh_balance().await {
        writeln!(out, "  Balance   : {} SOL", format_sol(balance))?;
    }
    Ok(())
}

pub async fn receive(session: &Session, args: &ReceiveArgs, out: &mut impl Write) -> Result<()> {
    let state = session.require_wallet().await?;
    let mut request = PaymentRequest::new(state.public_key.context("wallet has no address")?);
    request.amount = args
        .amount
        .as_deref()
        .map(parse_sol)
        .transpose()
        .context("invalid amount")?;
    request.label = args.label.clone();
    request.message = args.message.clone();

    writeln!(out, "Receive on {}", session.config().cluster)?;
    writeln!(out, "  Address : {}", request.address)?;
    if let Some(lamports) = request.amount {
        writeln!(out, "  Amount  : {} SOL", format_sol(lamports))?;
    }
    writeln!(out, "  QR      : {request}")?;
    Ok(())
}

pub async fn airdrop(session: &Session, out: &mut impl Write) -> Result<()> {
    session.require_wallet().await?;
    let landed = session
        .store
        .request_airdrop()
        .await
        .context("airdrop request failed")?;
    if !landed {
        let reason = session.store.snapshot().error.unwrap_or_default();
        bail!("the faucet transaction did not go through: {reason}");
    }

    writeln!(out, "Airdrop of {} SOL confirmed.", format_sol(AIRDROP_LAMPORTS))?;
    // Same as `send`: the store's scheduled refresh would never fire here.
    if let Ok(balance) = session.store.refresh_balance().await {
        writeln!(out, "  Balance : {} SOL", format_sol(balance))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Backup / History / Scan
// ---------------------------------------------------------------------------

pub async fn backup(session: &Session, args: &BackupArgs, out: &mut impl Write) -> Result<()> {
    session.require_wallet().await?;
    let phrase = session
        .store
        .reveal_mnemonic(&args.pin)
        .context("cannot reveal recovery phrase")?;
    writeln!(out, "Recovery phrase ({} words):", phrase.word_count())?;
    writeln!(out)?;
    print_phrase(out, &phrase)?;
    Ok(())
}

pub fn history(session: &Session, args: &HistoryArgs, out: &mut impl Write) -> Result<()> {
    let records = session.store.transactions()?;
    if records.is_empty() {
        writeln!(out, "No transactions yet.")?;
        return Ok(());
    }

    for record in records.iter().take(args.limit) {
        let when = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(record.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "?".into());
        let what = match record.kind {
            TransferKind::Send => format!("sent to {}", short_address(&record.to.to_string())),
            TransferKind::Airdrop => "airdrop".to_string(),
        };
        writeln!(
            out,
            "{when}  {:>14} SOL  {:<22} {:<9} {}",
            format_sol(record.lamports),
            what,
            record.status.to_string(),
            short_address(&record.signature.to_string()),
        )?;
    }
    if records.len() > args.limit {
        writeln!(out, "({} older entries not shown)", records.len() - args.limit)?;
    }
    Ok(())
}

/// Checks a scanned payload without touching the wallet.
pub fn scan(args: &ScanArgs, out: &mut impl Write) -> Result<()> {
    let request = PaymentRequest::parse(&args.payload).context("unreadable QR payload")?;
    writeln!(out, "Valid Solana address.")?;
    writeln!(out, "  To      : {}", request.address)?;
    if let Some(lamports) = request.amount {
        writeln!(out, "  Amount  : {} SOL", format_sol(lamports))?;
    }
    if let Some(label) = &request.label {
        writeln!(out, "  Label   : {label}")?;
    }
    if let Some(message) = &request.message {
        writeln!(out, "  Message : {message}")?;
    }
    match request.amount {
        Some(lamports) => writeln!(
            out,
            "Pay with: cryptonow send {} {}",
            request.address,
            format_sol(lamports)
        )?,
        None => writeln!(out, "Pay with: cryptonow send {} <amount>", request.address)?,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Settings / Reset
// ---------------------------------------------------------------------------

pub fn settings(session: &Session, args: &SettingsArgs, out: &mut impl Write) -> Result<()> {
    let db = session.store.db();
    if let Some(toggle) = args.biometric {
        db.set_biometric_enabled(toggle.enabled())?;
    }

    let config = session.config();
    writeln!(out, "Settings")?;
    writeln!(out, "  Data directory : {}", session.data_dir.display())?;
    writeln!(out, "  Cluster        : {}", config.cluster)?;
    writeln!(out, "  RPC endpoint   : {}", config.rpc_endpoint())?;
    writeln!(out, "  Commitment     : {}", config.commitment.as_str())?;
    writeln!(out, "  Wallet         : {}", if db.is_wallet_created()? { "present" } else { "none" })?;
    writeln!(out, "  PIN            : {}", if db.is_pin_set()? { "set" } else { "not set" })?;
    writeln!(out, "  Biometric      : {}", on_off(db.is_biometric_enabled()?))?;
    Ok(())
}

pub async fn reset(
    session: &Session,
    args: &ResetArgs,
    out: &mut impl Write,
    confirm: impl FnOnce(&str) -> Result<bool>,
) -> Result<()> {
    if !session.store.db().is_wallet_created()? {
        writeln!(out, "No wallet to remove.")?;
        return Ok(());
    }
    let question = "Remove the wallet from this device? Funds are only recoverable with the recovery phrase.";
    if !args.yes && !confirm(question)? {
        writeln!(out, "Cancelled.")?;
        return Ok(());
    }
    session
        .store
        .clear_wallet()
        .await
        .context("failed to remove wallet")?;
    writeln!(out, "Wallet removed.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Toggle;
    use cryptonow_core::crypto::address::Address;

    // Connection refused straight away: balance reads fail fast.
    const DEAD_RPC: &str = "http://127.0.0.1:9";

    fn session() -> Session {
        let config = WalletConfig {
            rpc_url: Some(DEAD_RPC.into()),
            ..WalletConfig::default()
        };
        Session::with_db(WalletDb::open_temporary().unwrap(), PathBuf::from("/tmp/cryptonow-test"), config)
            .unwrap()
    }

    fn text(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    fn never_asked(_: &str) -> Result<bool> {
        panic!("prompt should not be shown")
    }

    #[test]
    fn data_dir_prefers_explicit() {
        assert_eq!(
            resolve_data_dir(Some(PathBuf::from("/srv/wallet"))),
            PathBuf::from("/srv/wallet")
        );
        assert!(resolve_data_dir(None).ends_with(DEFAULT_DATA_DIR));
    }

    #[test]
    fn cli_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"cluster": "testnet", "confirmation_timeout_ms": 1000}"#,
        )
        .unwrap();

        let config = load_config(dir.path(), None, None).unwrap();
        assert_eq!(config.cluster, Cluster::Testnet);
        assert_eq!(config.confirmation_timeout_ms, 1000);

        let config = load_config(
            dir.path(),
            Some(Cluster::Devnet),
            Some("http://127.0.0.1:8899".into()),
        )
        .unwrap();
        assert_eq!(config.cluster, Cluster::Devnet);
        assert_eq!(config.rpc_endpoint(), "http://127.0.0.1:8899");
        assert_eq!(config.confirmation_timeout_ms, 1000);
    }

    #[tokio::test]
    async fn create_then_backup_with_pin() {
        let s = session();
        let mut out = Vec::new();
        create(&s, &mut out).await.unwrap();
        let printed = text(out);
        assert!(printed.contains("Wallet created."));
        assert!(printed.contains(" 24. "));

        let pin = SetPinArgs {
            pin: "1234".into(),
            confirm: "1234".into(),
        };
        set_pin(&s, &pin, &mut Vec::new()).await.unwrap();

        let wrong = BackupArgs { pin: "0000".into() };
        assert!(backup(&s, &wrong, &mut Vec::new()).await.is_err());

        let mut out = Vec::new();
        backup(&s, &BackupArgs { pin: "1234".into() }, &mut out).await.unwrap();
        let phrase = s.store().snapshot().mnemonic.unwrap();
        let printed = text(out);
        for word in phrase.words() {
            assert!(printed.contains(word));
        }
    }

    #[tokio::test]
    async fn import_reports_balance_from_the_store() {
        let s = session();
        let args = ImportArgs {
            phrase: vec![
                "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
                    .into(),
            ],
        };
        let mut out = Vec::new();
        import(&s, &args, &mut out).await.unwrap();
        let printed = text(out);
        assert!(printed.contains("Wallet imported."));
        assert!(printed.contains("Balance : unavailable (network error"));
    }

    #[tokio::test]
    async fn commands_need_a_wallet() {
        let s = session();
        let err = dashboard(&s, &mut Vec::new()).await.unwrap_err();
        assert!(err.to_string().contains("cryptonow create"));
    }

    #[tokio::test]
    async fn dashboard_reports_unreachable_cluster() {
        let s = session();
        create(&s, &mut Vec::new()).await.unwrap();
        let mut out = Vec::new();
        dashboard(&s, &mut out).await.unwrap();
        let printed = text(out);
        assert!(printed.contains("Balance   : unavailable"));
        assert!(printed.contains("PIN       : not set"));
        assert!(printed.contains("Last error: network error"));
    }

    #[tokio::test]
    async fn send_checks_before_prompting() {
        let s = session();
        create(&s, &mut Vec::new()).await.unwrap();
        let to = Address::new_from_array([7; 32]).to_string();

        let bad_address = SendArgs {
            to: "nope".into(),
            amount: "1".into(),
            yes: false,
        };
        assert!(send(&s, &bad_address, &mut Vec::new(), never_asked).await.is_err());

        // The balance was never fetched: say so instead of claiming the
        // wallet is empty.
        let unknown_balance = SendArgs {
            to: to.clone(),
            amount: "1".into(),
            yes: false,
        };
        let err = send(&s, &unknown_balance, &mut Vec::new(), never_asked).await.unwrap_err();
        assert!(err.to_string().contains("balance unavailable"), "got {err:#}");
        assert!(!format!("{err:#}").contains("insufficient"));
        assert!(s.store().transactions().unwrap().is_empty());
    }

    #[tokio::test]
    async fn receive_builds_payment_uri() {
        let s = session();
        create(&s, &mut Vec::new()).await.unwrap();
        let args = ReceiveArgs {
            amount: Some("0.5".into()),
            label: Some("Coffee".into()),
            message: None,
        };
        let mut out = Vec::new();
        receive(&s, &args, &mut out).await.unwrap();
        let printed = text(out);
        let address = s.store().snapshot().public_key.unwrap();
        assert!(printed.contains(&format!("solana:{address}?amount=0.5&label=Coffee")));
    }

    #[test]
    fn scan_reads_payment_request() {
        let addr = Address::new_from_array([7; 32]).to_string();
        let mut out = Vec::new();
        scan(
            &ScanArgs {
                payload: format!("solana:{addr}?amount=0.25&message=Lunch"),
            },
            &mut out,
        )
        .unwrap();
        let printed = text(out);
        assert!(printed.contains("Valid Solana address."));
        assert!(printed.contains("Amount  : 0.25 SOL"));
        assert!(printed.contains(&format!("cryptonow send {addr} 0.25")));

        assert!(scan(&ScanArgs { payload: "hello".into() }, &mut Vec::new()).is_err());
    }

    #[test]
    fn settings_toggle_biometric() {
        let s = session();
        let args = SettingsArgs {
            biometric: Some(Toggle::On),
        };
        let mut out = Vec::new();
        settings(&s, &args, &mut out).unwrap();
        assert!(text(out).contains("Biometric      : on"));
        assert!(s.store().db().is_biometric_enabled().unwrap());
    }

    #[test]
    fn empty_history() {
        let s = session();
        let mut out = Vec::new();
        history(&s, &HistoryArgs { limit: 5 }, &mut out).unwrap();
        assert_eq!(text(out), "No transactions yet.\n");
    }

    #[tokio::test]
    async fn reset_respects_the_prompt() {
        let s = session();
        create(&s, &mut Vec::new()).await.unwrap();

        let mut out = Vec::new();
        reset(&s, &ResetArgs { yes: false }, &mut out, |_| Ok(false))
            .await
            .unwrap();
        assert!(text(out).contains("Cancelled."));
        assert!(s.store().db().is_wallet_created().unwrap());

        reset(&s, &ResetArgs { yes: true }, &mut Vec::new(), never_asked)
            .await
            .unwrap();
        assert!(!s.store().db().is_wallet_created().unwrap());
        assert!(!s.store().snapshot().is_wallet_created);
    }
}
