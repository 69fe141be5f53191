//! # Golden Path Demo
//!
//! Ticket → Draw → Reserve → Vault Transfer → XP → Outcome Row
//!
//! Loads the demo deployment, grants credits to a few players, and runs
//! concurrent plays against the simulated chain. A chain outage is then
//! simulated for one play. Finally the durable outcome log, balances, the
//! reconciliation report and refund candidates are printed.
//!
//! Usage: `golden_path [config.toml]`. Logging follows `RUST_LOG`.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use shardvault::blockchain::{SimulatedChain, VaultAccount};
use shardvault::economy::{AccountStore, DeploymentConfig, OutcomeLog, XpStore};
use shardvault::shared::WalletAddress;
use shardvault::{in_memory, reconciliation_report, refund_totals, PlayError};
use tracing_subscriber::EnvFilter;

/// Demo deployment shipped with the workspace.
const DEFAULT_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/shardvault.toml");

/// Players with credits (devnet accounts, mixed casing on purpose).
const PLAYERS: [&str; 3] = [
    "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
    "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc",
    "0x90F79bf6EB2c4f870365E785982E1f101E93b906",
];

/// A player whose account exists but holds no credit.
const BROKE_PLAYER: &str = "0x15d34AAf54267DB7D7c367839AAf71A00a2C6A65";

const CREDITS_PER_PLAYER: u32 = 4;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║           SHARDVAULT GOLDEN PATH                                 ║");
    println!("║           Ticket → Draw → Vault Transfer → Outcome Row           ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║  INVARIANT: every consumed ticket leaves exactly one outcome row ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    match run().await {
        Ok(()) => {
            println!();
            println!("✅ GOLDEN PATH PASSED");
        }
        Err(message) => {
            println!();
            println!("❌ GOLDEN PATH FAILED: {message}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<(), String> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = DeploymentConfig::load(&config_path).map_err(|e| e.to_string())?;

    let vault_address = config.vault_address().map_err(|e| e.to_string())?;
    let vault = VaultAccount::from_env(vault_address, &config.vault.credential_env).or_else(|| {
        tracing::warn!(
            var = %config.vault.credential_env,
            "vault credential not set, using a simulator-only key"
        );
        Some(VaultAccount::new(vault_address, "simulator-only-key"))
    });

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let log_path = std::env::temp_dir().join(format!("shardvault_golden_path_{nanos}.log"));
    let outcome_log = Arc::new(OutcomeLog::open(&log_path).map_err(|e| e.to_string())?);

    let chain = SimulatedChain::new().with_latency(Duration::from_millis(5));
    let deployment = Arc::new(
        in_memory(&config, chain, vault, outcome_log).map_err(|e| e.to_string())?,
    );

    for player in PLAYERS {
        deployment
            .accounts
            .grant_play_credits(&WalletAddress::new(player), CREDITS_PER_PLAYER)
            .map_err(|e| e.to_string())?;
    }
    deployment
        .accounts
        .grant_play_credits(&WalletAddress::new(BROKE_PLAYER), 0)
        .map_err(|e| e.to_string())?;

    // =========================================================================
    // STEP 1: Concurrent plays
    // =========================================================================
    println!("┌─ CONCURRENT PLAYS ──────────────────────────────────────────────┐");
    let started = Instant::now();
    let mut tasks = Vec::new();
    for player in PLAYERS {
        for _ in 0..CREDITS_PER_PLAYER {
            let deployment = Arc::clone(&deployment);
            tasks.push(tokio::spawn(async move { (player, deployment.pipeline.play(player).await) }));
        }
    }

    let mut consumed = 0u64;
    for task in tasks {
        let (player, result) = task.await.map_err(|e| e.to_string())?;
        match result {
            Ok(response) => {
                consumed += 1;
                let mark = if response.success { "✓" } else { "✗" };
                println!(
                    "│ {mark} {}…  {:<14} shards +{:<3} xp +{:<4} credits left {}",
                    &player[..10],
                    response.prize.slug,
                    response.shards_gained,
                    response.xp_gained,
                    response.new_balance
                );
            }
            Err(PlayError::Internal(message)) => {
                consumed += 1;
                println!("│ ! {}…  internal error: {message}", &player[..10]);
            }
            Err(other) => return Err(format!("unexpected refusal for {player}: {other}")),
        }
    }
    println!("│ {consumed} plays in {:.1} ms", started.elapsed().as_secs_f64() * 1000.0);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    // =========================================================================
    // STEP 2: Refused play (no credit, no row)
    // =========================================================================
    println!("┌─ REFUSED PLAY ──────────────────────────────────────────────────┐");
    match deployment.pipeline.play(BROKE_PLAYER).await {
        Err(PlayError::Forbidden(reason)) => println!("│ ✓ {}…  refused: {reason}", &BROKE_PLAYER[..10]),
        other => return Err(format!("broke player was not refused: {other:?}")),
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    // =========================================================================
    // STEP 3: Chain outage (credit consumed, transfer_failed row)
    // =========================================================================
    println!("┌─ CHAIN OUTAGE ──────────────────────────────────────────────────┐");
    let unlucky = WalletAddress::new(PLAYERS[0]);
    deployment
        .accounts
        .grant_play_credits(&unlucky, 1)
        .map_err(|e| e.to_string())?;
    let chain = deployment.pipeline.dispatcher().client();
    chain.reject_all("node unreachable");
    let outage = deployment.pipeline.play(unlucky.as_str()).await;
    chain.accept_all();
    match outage {
        Ok(response) if !response.success => {
            consumed += 1;
            println!("│ ✓ delivery failed as expected: {}", response.message.unwrap_or_default());
        }
        Err(PlayError::Internal(message)) => {
            consumed += 1;
            println!("│ ✓ play failed during outage: {message}");
        }
        other => return Err(format!("outage play should not succeed: {other:?}")),
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    // =========================================================================
    // STEP 4: Ledgers and reports
    // =========================================================================
    let rows = OutcomeLog::read_all(&log_path).map_err(|e| e.to_string())?;

    println!("┌─ OUTCOME LEDGER ({}) ────────────────────────────────────────────", log_path.display());
    for row in &rows {
        println!(
            "│ {:<16} {:<14} {:<8} {}",
            row.status,
            row.prize_slug.as_deref().unwrap_or("-"),
            row.amount_or_id.as_deref().unwrap_or("-"),
            row.error_message.as_deref().unwrap_or("")
        );
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    println!("┌─ PLAYERS ───────────────────────────────────────────────────────┐");
    for player in PLAYERS {
        let wallet = WalletAddress::new(player);
        let account = deployment
            .accounts
            .account(&wallet)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("account {player} vanished"))?;
        let xp = deployment.xp.xp(&wallet).map_err(|e| e.to_string())?;
        println!(
            "│ {}…  credits {}  shards {:<4} xp {}",
            &player[..10],
            account.play_credits,
            account.shard_balance,
            xp
        );
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let report = reconciliation_report(
        deployment.inventory.as_ref(),
        SystemTime::now(),
        deployment.reservation_timeout,
    )
    .map_err(|e| e.to_string())?;
    println!("┌─ RECONCILIATION ────────────────────────────────────────────────┐");
    println!("│ stale reservations: {}", report.stale_reservations.len());
    for unit in &report.failed_transfers {
        println!(
            "│ transfer_failed: unit {} ({}) → {}",
            unit.unit_id,
            unit.prize_slug,
            unit.winner_wallet.as_deref().unwrap_or("-")
        );
    }
    for (wallet, credits) in refund_totals(&rows) {
        println!("│ refund candidate: {wallet} ({credits} credit(s))");
    }
    println!("└──────────────────────────────────────────────────────────────────┘");

    if rows.len() as u64 != consumed {
        return Err(format!(
            "{consumed} credits consumed but {} outcome rows written",
            rows.len()
        ));
    }
    Ok(())
}
