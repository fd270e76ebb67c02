/// Matcha
///
/// Bootstraps an HD wallet against a local bitcoind: imports and funds the
/// first addresses of an account, then mines a block every few seconds while
/// printing the blocks and transactions the node publishes over ZMQ.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use matcha::{
    bootstrap, generate_mnemonic, new_hd_wallet, print_summary, run, AccountLayout, AddressType,
    BitcoinRpcClient, Config, ConfigOverrides, Network, ZmqSubscriber, INITIAL_BLOCKS,
};

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"), about = env!("CARGO_PKG_DESCRIPTION"), version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Config file (default is $HOME/.matcha.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Default)]
struct Settings {
    #[arg(long, global = true, help = "bitcoind RPC host")]
    host: Option<String>,
    #[arg(long, global = true, help = "bitcoind RPC port")]
    port: Option<u16>,
    #[arg(long, global = true, help = "bitcoind RPC user")]
    user: Option<String>,
    #[arg(long, global = true, help = "bitcoind RPC password")]
    password: Option<String>,
    #[arg(long, global = true, help = "mainnet, testnet, regtest or simnet")]
    network: Option<Network>,
    #[arg(long, global = true, help = "BIP-39 passphrase")]
    wallet_password: Option<String>,
    #[arg(long, global = true, help = "bech32, p2pkh or p2sh")]
    address_type: Option<AddressType>,
    #[arg(long, global = true, help = "Mnemonic to restore; a new one is generated if empty")]
    mnemonic: Option<String>,
    #[arg(long, global = true, help = "bitcoind ZMQ endpoint; empty disables block/tx output")]
    zmq_address: Option<String>,
    #[arg(long, global = true, help = "Entropy bits for a generated mnemonic")]
    bit_size: Option<usize>,
    #[arg(long, global = true, help = "Seconds between mined blocks")]
    second: Option<u64>,
    #[arg(long, global = true, help = "Number of addresses to fund")]
    address_count: Option<u32>,
    #[arg(long, global = true, help = "Print verbose block and tx JSON")]
    verbose: Option<bool>,
    #[arg(long, global = true, help = "bip44 or legacy")]
    account_layout: Option<AccountLayout>,
    #[arg(long, global = true, help = "BIP-44 account index")]
    account: Option<u32>,
}

impl From<Settings> for ConfigOverrides {
    fn from(s: Settings) -> Self {
        ConfigOverrides {
            host: s.host,
            port: s.port,
            user: s.user,
            password: s.password,
            network: s.network,
            wallet_password: s.wallet_password,
            address_type: s.address_type,
            mnemonic: s.mnemonic,
            zmq_address: s.zmq_address,
            bit_size: s.bit_size,
            second: s.second,
            address_count: s.address_count,
            verbose: s.verbose,
            account_layout: s.account_layout,
            account: s.account,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Wallet utilities that do not need a node
    Wallet {
        #[command(subcommand)]
        command: WalletCommands,
    },
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Print a freshly generated mnemonic
    Mnemonic {
        #[arg(short, long, default_value = "128", help = "Entropy bits (128-256, multiple of 32)")]
        size: usize,
    },
    /// Derive child wallets from the configured mnemonic
    Derive {
        #[arg(long, default_value = "0", help = "0 for receiving, 1 for change")]
        change: u32,
        #[arg(long, default_value = "0", help = "First address index")]
        index: u32,
        #[arg(long, default_value = "1", help = "Number of addresses")]
        count: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env file if present

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Wallet {
            command: WalletCommands::Mnemonic { size },
        }) => {
            let mnemonic = generate_mnemonic(size).context("Failed to generate mnemonic")?;
            println!("{}", mnemonic);
            Ok(())
        }
        Some(Commands::Wallet {
            command: WalletCommands::Derive { change, index, count },
        }) => {
            let (config, _) = load_config(cli.config, cli.settings)?;
            derive_offline(&config, change, index, count)
        }
        None => {
            let (config, path) = load_config(cli.config, cli.settings)?;
            run_node(config, path).await
        }
    }
}

fn load_config(path: Option<PathBuf>, settings: Settings) -> Result<(Config, PathBuf)> {
    let path = match path {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&path)
        .context("Failed to load configuration")?
        .apply(settings.into());
    config.validate().context("Invalid configuration")?;
    log::debug!("{:?}", config);
    Ok((config, path))
}

async fn run_node(mut config: Config, path: PathBuf) -> Result<()> {
    log::info!("Network: {}, address type: {}", config.network, config.address_type);

    let rpc = BitcoinRpcClient::new(&config.rpc_url(), &config.user, &config.password)
        .context("Failed to connect to bitcoind - is it running?")?;

    let wallet = new_hd_wallet(
        config.bit_size,
        Some(config.mnemonic.as_str()),
        config.network,
        &config.wallet_password,
    )
    .context("Failed to open HD wallet")?;

    // Persist the mnemonic so the next run reuses this wallet
    config.mnemonic = wallet.mnemonic().to_string();
    config
        .save(&path)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;

    let (purpose, coin_type, account_index) =
        config.account_layout.path_args(config.network, config.account);
    let account = wallet.account(purpose, coin_type, account_index)?;
    log::info!("Using account {} ({} layout)", account.path(), config.account_layout);

    let mut out = std::io::stdout();
    let addresses = bootstrap(
        &account,
        &rpc,
        config.address_count,
        config.address_type,
        INITIAL_BLOCKS,
        &mut out,
    )
    .context("Failed to fund wallet addresses")?;
    print_summary(&wallet, &account, &mut out)?;

    if config.zmq_address.is_empty() {
        log::info!("No ZMQ address configured, exiting");
        return Ok(());
    }

    let mut subscriber = ZmqSubscriber::connect(&config.zmq_address)
        .await
        .context("Failed to subscribe to bitcoind notifications")?;

    run(
        &mut subscriber,
        &rpc,
        &addresses,
        Duration::from_secs(config.second),
        config.verbose,
        &mut out,
    )
    .await
    .context("Event loop stopped")?;

    Ok(())
}

fn derive_offline(config: &Config, change: u32, index: u32, count: u32) -> Result<()> {
    if config.mnemonic.trim().is_empty() {
        bail!("No mnemonic configured; pass --mnemonic or run matcha once to create a wallet");
    }

    let wallet = new_hd_wallet(
        config.bit_size,
        Some(config.mnemonic.as_str()),
        config.network,
        &config.wallet_password,
    )?;
    let (purpose, coin_type, account_index) =
        config.account_layout.path_args(config.network, config.account);
    let account = wallet.account(purpose, coin_type, account_index)?;

    println!("Account xpub: {}", account.xpub());
    for i in index..index.saturating_add(count) {
        let child = account.derive_address(change, i, config.address_type)?;
        println!(
            "{}/{}/{}  {}  {}  {}",
            account.path(),
            change,
            i,
            child.address(),
            child.public_key_hex(),
            child.wif()
        );
    }
    Ok(())
}
