//! brain-wallet - derive a Bitcoin wallet from text and check its history

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use brain_wallet::utils::logging::enable_debug;
use brain_wallet::{
    format_balance, generate_brain_wallet, input_strength, AddressEncoding, BrainWallet, BrainWalletError,
    BrainWalletResult, ErrorCode, Network, UsageChecker, UsageConfig, UsageReport, UsageVerdict,
};
use clap::Parser;

/// Derive a BIP39/BIP32 Bitcoin wallet from a sentence
#[derive(Parser)]
#[command(name = "brain-wallet", version, about, long_about = None)]
struct Cli {
    /// Source text (read from stdin when omitted)
    text: Option<String>,

    /// Read the source text from stdin
    #[arg(long)]
    stdin: bool,

    /// Receive addresses to derive per account
    #[arg(short = 'n', long)]
    addresses: Option<u32>,

    /// bitcoin or testnet
    #[arg(long, default_value = "bitcoin")]
    network: Network,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Include the BIP39 seed in the output
    #[arg(long)]
    show_seed: bool,

    /// Query public indexers for prior on-chain activity
    #[arg(long)]
    check: bool,

    /// Usage-check configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.verbose {
        enable_debug();
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.code == ErrorCode::InvalidInput {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> BrainWalletResult<()> {
    let text = read_text(&cli)?;
    if text.is_empty() {
        return Err(BrainWalletError::invalid_input("Input text must not be empty"));
    }

    let strength = input_strength(&text);
    if strength.weak {
        eprintln!(
            "Warning: input is only {} characters. Short phrases are easily guessed and any funds sent to this wallet can be stolen.",
            strength.chars
        );
    }

    let config = match &cli.config {
        Some(path) => UsageConfig::load(path)?,
        None => UsageConfig::default(),
    };
    let address_count = cli.addresses.unwrap_or(config.address_count);
    if cli.check && address_count == 0 {
        return Err(BrainWalletError::invalid_input("--check needs at least one address per account"));
    }

    let mut wallet = generate_brain_wallet(&text, address_count, cli.network)?;
    if !cli.show_seed {
        wallet = wallet.without_seed();
    }

    let usage = if cli.check {
        Some(check_usage(&wallet, config, cli.json)?)
    } else {
        None
    };

    if cli.json {
        let mut doc = serde_json::json!({ "wallet": wallet });
        if let Some(report) = &usage {
            doc["usage"] = serde_json::to_value(report)?;
        }
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print_wallet(&wallet);
        if let Some(report) = &usage {
            print_usage(report);
        }
    }

    Ok(())
}

/// Argument text is used as-is; stdin loses its trailing newline
fn read_text(cli: &Cli) -> BrainWalletResult<String> {
    if let (Some(text), false) = (&cli.text, cli.stdin) {
        return Ok(text.clone());
    }

    if !cli.stdin && io::stdin().is_terminal() {
        return Err(BrainWalletError::invalid_input("No input text given"));
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.strip_suffix('\n').unwrap_or(&buffer);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(trimmed.to_string())
}

fn check_usage(wallet: &BrainWallet, config: UsageConfig, quiet: bool) -> BrainWalletResult<UsageReport> {
    let checker = UsageChecker::new(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    runtime.block_on(checker.check_wallet(wallet, |done, total| {
        if !quiet {
            eprintln!("Checking usage... {}/{}", done, total);
        }
    }))
}

fn print_wallet(wallet: &BrainWallet) {
    println!("Network:  {}", wallet.network);
    println!("Mnemonic: {}", wallet.mnemonic.as_str());
    if let Some(seed) = &wallet.seed_hex {
        println!("Seed:     {}", seed.as_str());
    }

    for account in &wallet.accounts {
        println!();
        println!("{}  {}", account.name, account.path);
        match (&account.xpub, &account.error) {
            (Some(xpub), _) => println!("  xpub: {}", xpub),
            (None, Some(error)) => println!("  error: {}", error),
            (None, None) => {}
        }
        for address in &account.addresses {
            let flag = match address.encoding {
                AddressEncoding::Standard => "",
                AddressEncoding::ManualBech32m => "  (manual bech32m)",
                AddressEncoding::Placeholder => "  [INVALID PLACEHOLDER - DO NOT USE]",
            };
            println!("  {:<18} {}{}", address.path, address.address, flag);
        }
    }
}

fn print_usage(report: &UsageReport) {
    println!();
    for result in &report.results {
        let status = match (&result.error, result.has_transactions) {
            (Some(error), _) => format!("error: {}", error),
            (None, true) => format!("USED ({})", format_balance(result.balance_satoshis)),
            (None, false) => "unused".to_string(),
        };
        println!("  {:<32} {}", result.unit.label, status);
    }

    println!();
    let aggregate = &report.aggregate;
    match aggregate.verdict {
        UsageVerdict::Used => {
            println!("Wallet has been used. Balance: {}", format_balance(aggregate.total_balance));
            match aggregate.earliest_activity {
                Some(at) => println!("First activity: {}", at.format("%Y-%m-%d %H:%M UTC")),
                None => println!("First activity: unknown"),
            }
        }
        UsageVerdict::Unused => println!("No on-chain activity found."),
        UsageVerdict::Undetermined => println!("Could not determine usage: every check failed."),
    }
    if aggregate.failed_units > 0 && aggregate.verdict != UsageVerdict::Undetermined {
        println!("({} checks failed)", aggregate.failed_units);
    }
}
