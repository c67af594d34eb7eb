//! Shade CLI
//!
//! Command-line interface for ECDH stealth-address payments.

mod config;
mod keyfile;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shade_core::traits::{AnnouncementRegistry, ProgressCallback};
use shade_core::types::{Address, PrivateKey, PublicKey, PublicMetaAddress};
use shade_crypto::private_key_to_address;
use shade_registry::MemoryRegistry;
use shade_scanner::{Scanner, ScannerConfig};
use shade_stealth::{
    generate_meta_address, parse_public_meta_address, ScanKeys, SchemeKind, StealthPaymentBuilder,
    StealthService,
};

use crate::config::CliConfig;
use crate::keyfile::KeyFile;

/// Shade - stealth addresses for private payments
#[derive(Parser)]
#[command(name = "shade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Stealth key scheme (overrides SHADE_SCHEME)
    #[arg(long, global = true)]
    scheme: Option<SchemeKind>,

    /// View hint width in bytes (overrides SHADE_VIEW_HINT_BYTES)
    #[arg(long, global = true)]
    view_hint_bytes: Option<u8>,

    #[command(subcommand)]
    command: Commands,
}

/// Identifies one payment.
#[derive(Args)]
struct PaymentArgs {
    /// Path to keys file
    #[arg(short, long)]
    keys: PathBuf,
    /// Ephemeral public key from the announcement
    #[arg(short, long)]
    ephemeral_key: String,
    /// Stealth address the payment was sent to
    #[arg(short, long)]
    address: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new meta-address
    Generate {
        /// Output file for keys (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Derive a stealth address for a recipient
    Send {
        /// Recipient's meta-address (st:eth:0x...)
        recipient: String,
        /// Announcement file to append to
        #[arg(short, long)]
        registry: Option<PathBuf>,
        /// Use this ephemeral private key instead of a fresh one
        #[arg(long)]
        ephemeral_private_key: Option<String>,
        /// Informational amount
        #[arg(long)]
        amount: Option<String>,
        /// Informational token symbol
        #[arg(long)]
        token: Option<String>,
        /// Memo (kept locally, never announced)
        #[arg(long)]
        memo: Option<String>,
    },

    /// Reconstruct the private key of a stealth address
    Recover(PaymentArgs),

    /// Check whether a payment belongs to these keys (view-only)
    Check(PaymentArgs),

    /// Scan an announcement file for payments
    Scan {
        /// Path to keys file
        #[arg(short, long)]
        keys: PathBuf,
        /// Announcement file
        #[arg(short, long)]
        registry: PathBuf,
        /// Announcements per batch (overrides SHADE_SCAN_BATCH_SIZE)
        #[arg(long)]
        batch_size: Option<usize>,
        /// Batches scanned at once (overrides SHADE_SCAN_PARALLELISM)
        #[arg(long)]
        parallelism: Option<usize>,
        /// Earliest announcement timestamp
        #[arg(long)]
        from: Option<u64>,
        /// Latest announcement timestamp
        #[arg(long)]
        to: Option<u64>,
        /// Derive an address for every announcement
        #[arg(long)]
        no_view_hint: bool,
        /// Do not reconstruct private keys
        #[arg(long)]
        view_only: bool,
    },

    /// Run a scanning benchmark
    Bench {
        /// Number of announcements to generate
        #[arg(short, long, default_value = "10000")]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "shade_cli=debug,shade_scanner=debug,shade_registry=debug,shade_stealth=debug,info"
    } else {
        "shade_cli=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = CliConfig::from_env()?;
    if let Some(scheme) = cli.scheme {
        config.scheme = scheme;
    }
    if let Some(width) = cli.view_hint_bytes {
        config.view_hint_bytes = width;
    }
    let service = StealthService::new(config.stealth_config()).context("invalid configuration")?;
    info!(scheme = %config.scheme, view_hint_bytes = config.view_hint_bytes, "Configured");

    match cli.command {
        Commands::Generate { output } => cmd_generate(output.as_deref()),
        Commands::Send {
            recipient,
            registry,
            ephemeral_private_key,
            amount,
            token,
            memo,
        } => {
            let mut builder = StealthPaymentBuilder::new().service(service);
            if let Some(key) = ephemeral_private_key {
                builder = builder.ephemeral_private_key(
                    PrivateKey::from_hex(&key).context("invalid ephemeral private key")?,
                );
            }
            if let Some(amount) = amount {
                builder = builder.amount(amount);
            }
            if let Some(token) = token {
                builder = builder.token(token);
            }
            if let Some(memo) = memo {
                builder = builder.memo(memo);
            }
            cmd_send(&recipient, builder, registry.as_deref()).await
        }
        Commands::Recover(args) => cmd_recover(&service, &args),
        Commands::Check(args) => cmd_check(&service, &args),
        Commands::Scan {
            keys,
            registry,
            batch_size,
            parallelism,
            from,
            to,
            no_view_hint,
            view_only,
        } => {
            let mut scan_config = config.scanner_config();
            if let Some(size) = batch_size {
                scan_config = scan_config.batch_size(size);
            }
            if let Some(n) = parallelism {
                scan_config = scan_config.parallelism(n);
            }
            scan_config.from_timestamp = from;
            scan_config.to_timestamp = to;
            if no_view_hint {
                scan_config = scan_config.without_view_hint();
            }

            let keys = KeyFile::load(&keys)?.scan_keys(view_only)?;
            let scanner = Scanner::new(service, keys);
            cmd_scan(&scanner, &registry, scan_config).await
        }
        Commands::Bench { count } => cmd_bench(service, count).await,
    }
}

fn parse_payment(args: &PaymentArgs) -> Result<(KeyFile, PublicKey)> {
    let keys = KeyFile::load(&args.keys)?;
    let ephemeral: PublicKey = args
        .ephemeral_key
        .parse()
        .context("invalid ephemeral public key")?;
    Ok((keys, ephemeral))
}

fn progress_style(template: &str) -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template(template)?
        .progress_chars("#>-"))
}

/// Generate a new meta-address
fn cmd_generate(output: Option<&Path>) -> Result<()> {
    println!("{}", "🔑 Generating Shade keys...".cyan().bold());

    let meta = generate_meta_address()?;
    let file = KeyFile::from_meta_address(&meta);

    if let Some(path) = output {
        file.save(path)?;
        println!("{} {}", "✅ Keys saved to:".green(), path.display());
    } else {
        println!("\n{}", "Keys (JSON):".yellow().bold());
        println!("{}", file.to_json()?);
    }

    println!("\n{}", "Meta-address (share this):".cyan().bold());
    println!("   {}", file.meta_address);
    println!("\n{}", "⚠️  IMPORTANT: Keep your private keys safe!".red().bold());
    println!("   spend_private_key and viewing_private_key must never be shared.");

    Ok(())
}

/// Derive a stealth address and announcement
async fn cmd_send(
    recipient: &str,
    builder: StealthPaymentBuilder,
    registry_path: Option<&Path>,
) -> Result<()> {
    let meta: PublicMetaAddress =
        parse_public_meta_address(recipient).context("invalid meta-address")?;
    println!("{} {}", "💸 Creating stealth payment to:".cyan().bold(), recipient);

    let payment = builder
        .recipient(meta)
        .build()
        .context("failed to create stealth payment")?;

    println!("\n{}", "✅ Stealth payment created:".green().bold());
    println!("   {} {}", "Address:".yellow(), payment.stealth_address);
    println!("   {} {}", "Ephemeral key:".dimmed(), payment.announcement.ephemeral_public_key);
    println!("   {} {:#x}", "View hint:".dimmed(), payment.announcement.view_hint);

    if let Some(path) = registry_path {
        let registry = MemoryRegistry::load_from_file(path)
            .await
            .context("failed to load announcement file")?;
        let id = registry.publish(payment.announcement.clone()).await?;
        registry.save_to_file(path).await?;
        println!("   {} #{} in {}", "Announced:".dimmed(), id, path.display());
    } else {
        println!("\n{}", "📋 Announcement (JSON):".yellow().bold());
        println!("{}", serde_json::to_string_pretty(&payment.announcement)?);
    }

    println!("\n{}", "ℹ️  Next steps:".cyan());
    println!("   1. Send funds to the stealth address above");
    println!("   2. Publish the announcement");

    Ok(())
}

/// Reconstruct a stealth private key
fn cmd_recover(service: &StealthService, args: &PaymentArgs) -> Result<()> {
    let (keys, ephemeral) = parse_payment(args)?;
    let meta = keys.to_meta_address()?;
    let expected: Address = args.address.parse().context("invalid stealth address")?;

    let stealth_key = service
        .recover_stealth_private_key(
            meta.spend_private_key(),
            &ephemeral,
            meta.viewing_private_key(),
            &expected,
        )
        .context("key reconstruction failed")?;

    println!("{}", "✅ Stealth key recovered".green().bold());
    println!("   {} {}", "Address:".yellow(), private_key_to_address(&stealth_key)?);
    println!("   {} {}", "Private key:".red(), stealth_key.to_hex());
    println!("\n{}", "⚠️  Anyone with this key controls the funds.".red().bold());

    Ok(())
}

/// View-only ownership check
fn cmd_check(service: &StealthService, args: &PaymentArgs) -> Result<()> {
    let (keys, ephemeral) = parse_payment(args)?;
    let meta = keys.to_meta_address()?;

    let owned = service.check_payment_ownership(
        &ephemeral,
        &args.address,
        meta.viewing_private_key(),
        meta.spend_public_key(),
    )?;

    if owned {
        println!("{} {}", "✅ Payment is yours:".green().bold(), args.address);
    } else {
        println!("{} {}", "❌ Not your payment:".yellow(), args.address);
    }
    Ok(())
}

/// Scan for payments
async fn cmd_scan(
    scanner: &Scanner,
    registry_path: &Path,
    config: ScannerConfig,
) -> Result<()> {
    println!("{}", "🔎 Scanning for payments...".cyan().bold());

    let registry = MemoryRegistry::load_from_file(registry_path)
        .await
        .context("failed to load announcement file")?;
    if registry.is_empty() {
        println!("\n{}", "⚠️  No announcements to scan.".yellow());
        return Ok(());
    }
    println!("   Loaded {} announcements from {}", registry.len(), registry_path.display());

    let pb = ProgressBar::new(registry.len() as u64);
    pb.set_style(progress_style(
        "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    )?);
    let bar = pb.clone();
    let callback: ProgressCallback = Box::new(move |progress| {
        bar.set_length(progress.total);
        bar.set_position(progress.scanned);
    });

    let summary = scanner
        .scan_with_progress(&registry, config, callback)
        .await
        .context("scan failed")?;
    pb.finish_and_clear();

    if summary.discoveries.is_empty() {
        println!("\n{}", "No payments found.".yellow());
    } else {
        println!("\n{} {} payment(s) found:", "✅".green(), summary.discoveries.len());
        for payment in &summary.discoveries {
            println!("   {} {}", "Address:".green(), payment.stealth_address);
            println!("      Announcement #{}", payment.announcement.id);
            if let Some(key) = &payment.private_key {
                println!("      {} {}", "Private key:".red(), key.to_hex());
            }
        }
    }

    println!(
        "\n   {} scanned, {:.1}% rejected by view hint, {:.0}/s",
        summary.stats.total_scanned,
        summary.stats.filter_efficiency(),
        summary.stats.rate()
    );
    Ok(())
}

/// Run benchmarks
async fn cmd_bench(service: StealthService, count: usize) -> Result<()> {
    anyhow::ensure!(count > 0, "count must be positive");
    println!("{} {} announcements", "📊 Benchmarking with".cyan().bold(), count);

    println!("\n{}", "1. Generating keys...".dimmed());
    let start = Instant::now();
    let ours = generate_meta_address()?;
    let others = generate_meta_address()?;
    println!("   ✓ Key generation: {:?}", start.elapsed());

    println!("\n{}", "2. Creating announcements...".dimmed());
    let registry = MemoryRegistry::with_capacity(count);
    let pb = ProgressBar::new(count as u64);
    pb.set_style(progress_style("   [{bar:40.cyan/blue}] {pos}/{len}")?);

    let start = Instant::now();
    for i in 0..count {
        let recipient = if i % 100 == 0 { &ours } else { &others };
        let payment = StealthPaymentBuilder::new()
            .service(service.clone())
            .recipient(recipient.public())
            .build()?;
        registry.publish(payment.announcement).await?;
        pb.inc(1);
    }
    pb.finish();
    println!("   ✓ Created {} announcements: {:?}", count, start.elapsed());

    println!("\n{}", "3. Scanning...".dimmed());
    let scanner = Scanner::new(service, ScanKeys::from_meta_address(&ours));
    let start = Instant::now();
    let summary = scanner.scan_all(&registry).await?;
    let scan_time = start.elapsed();

    println!("   ✓ Scanned {} announcements: {:?}", count, scan_time);
    println!("   ✓ Found {} payments", summary.discoveries.len());
    println!("\n{}", "📈 Results:".green().bold());
    println!("   Scan rate: {:.0} announcements/sec", count as f64 / scan_time.as_secs_f64());
    println!("   View hint filtered: {:.1}%", summary.stats.filter_efficiency());

    let expected = count.div_ceil(100);
    if summary.discoveries.len() == expected {
        println!("   {} All expected payments found!", "✅".green());
    } else {
        println!(
            "   {} Expected {}, found {}",
            "❌".red(),
            expected,
            summary.discoveries.len()
        );
    }

    Ok(())
}
