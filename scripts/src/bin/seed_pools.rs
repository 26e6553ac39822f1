//! SimpleDEX Bootstrap
//!
//! Brings up an in-process exchange with the local development deployment:
//! three pools (ETH/USDT, ETH/DAI, USDT/DAI), seed liquidity from a deployer
//! account, a funded trader, and an optional smoke swap and routed swap.
//!
//! ```text
//! cargo run -p dex-scripts --bin seed_pools -- --route
//! DEX_ENGINE__DEFAULT_FEE_BPS=25 cargo run -p dex-scripts --bin seed_pools
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use dex_amm::{AmmResult, AssetLedger, Decimal, Exchange, InMemoryLedger, SettlementError};
use dex_config::{load_config, seed, DexConfig, PRICE_SCALE};
use dex_types::{AccountId, Amount, AssetId, PoolKey};

/// Token addresses of the local development deployment
const ETH: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const USDT: &str = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512";
const DAI: &str = "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0";

/// Exchange vault, deployer and trader accounts
const VAULT: &str = "0xCf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9";
const DEPLOYER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
const TRADER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "seed_pools")]
#[command(about = "Seed SimpleDEX pools and run a smoke swap")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment (development, staging, production)
    #[arg(short, long)]
    environment: Option<String>,

    /// Also swap ETH -> USDT -> DAI through two pools
    #[arg(long)]
    route: bool,
}

struct Assets {
    eth: AssetId,
    usdt: AssetId,
    dai: AssetId,
}

impl Assets {
    fn parse() -> Result<Self> {
        Ok(Self {
            eth: ETH.parse().context("ETH address")?,
            usdt: USDT.parse().context("USDT address")?,
            dai: DAI.parse().context("DAI address")?,
        })
    }

    fn symbol(&self, asset: AssetId) -> &'static str {
        if asset == self.eth {
            "ETH"
        } else if asset == self.usdt {
            "USDT"
        } else if asset == self.dai {
            "DAI"
        } else {
            "?"
        }
    }
}

fn account(address: &str) -> Result<AccountId> {
    address
        .parse()
        .with_context(|| format!("Invalid account address {}", address))
}

fn seed_liquidity(
    exchange: &Exchange<InMemoryLedger>,
    assets: &Assets,
    deployer: AccountId,
) -> Result<()> {
    let deposits: [(AssetId, AssetId, Amount, Amount); 3] = [
        (assets.eth, assets.usdt, seed::ETH_RESERVE, seed::STABLE_RESERVE),
        (assets.eth, assets.dai, seed::ETH_RESERVE, seed::STABLE_RESERVE),
        (assets.usdt, assets.dai, seed::STABLE_RESERVE, seed::STABLE_RESERVE),
    ];

    for (x, y, amount_x, amount_y) in deposits {
        exchange.ledger().mint(&deployer, &x, amount_x)?;
        exchange.ledger().mint(&deployer, &y, amount_y)?;

        let receipt = exchange
            .add_liquidity(deployer, x, y, amount_x, amount_y)
            .with_context(|| {
                format!("Seeding {}/{}", assets.symbol(x), assets.symbol(y))
            })?;

        info!(
            pool = %receipt.key,
            pair = %format!("{}/{}", assets.symbol(x), assets.symbol(y)),
            shares = receipt.shares_minted,
            "Seeded pool"
        );
    }
    Ok(())
}

/// Spot price of `base` in `quote`, as the 1e18-scaled integer and as a decimal
fn spot_readout(
    exchange: &Exchange<InMemoryLedger>,
    base: AssetId,
    quote: AssetId,
) -> AmmResult<(Amount, Option<Decimal>)> {
    let key = PoolKey::new(base, quote)?;
    let ratio = exchange.registry().spot_price(&key, base)?;
    Ok((ratio.scaled(PRICE_SCALE)?, ratio.to_decimal()))
}

fn log_prices(exchange: &Exchange<InMemoryLedger>, assets: &Assets) {
    for (base, quote) in [
        (assets.eth, assets.usdt),
        (assets.eth, assets.dai),
        (assets.usdt, assets.dai),
    ] {
        match spot_readout(exchange, base, quote) {
            Ok((price_e18, Some(price))) => info!(
                base = assets.symbol(base),
                quote = assets.symbol(quote),
                price_e18,
                price = %price,
                "Spot price"
            ),
            Ok((price_e18, None)) => info!(
                base = assets.symbol(base),
                quote = assets.symbol(quote),
                price_e18,
                "Spot price (beyond decimal range)"
            ),
            Err(e) => warn!(
                base = assets.symbol(base),
                quote = assets.symbol(quote),
                error = %e,
                "No price available"
            ),
        }
    }
}

fn smoke_swap(exchange: &Exchange<InMemoryLedger>, assets: &Assets, trader: AccountId) -> Result<()> {
    let amount_in = seed::SMOKE_SWAP_AMOUNT;
    let expected = exchange.quote(assets.eth, assets.usdt, amount_in)?;
    info!(amount_in, expected_out = expected, "Quoted ETH -> USDT");

    let outcome = exchange
        .swap(trader, assets.eth, assets.usdt, amount_in, expected)
        .context("Smoke swap failed")?;

    info!(
        amount_in = outcome.amount_in,
        amount_out = outcome.amount_out,
        eth_balance = exchange.ledger().balance_of(&trader, &assets.eth),
        usdt_balance = exchange.ledger().balance_of(&trader, &assets.usdt),
        "Smoke swap settled"
    );
    Ok(())
}

fn routed_swap(exchange: &Exchange<InMemoryLedger>, assets: &Assets, trader: AccountId) -> Result<()> {
    let path = [assets.eth, assets.usdt, assets.dai];

    match exchange.swap_route(trader, &path, seed::SMOKE_SWAP_AMOUNT, 1) {
        Ok(route) => {
            info!(
                legs = route.legs.len(),
                amount_in = route.amount_in,
                amount_out = route.amount_out,
                "Routed ETH -> USDT -> DAI"
            );
            Ok(())
        }
        Err(SettlementError::PartialRoute {
            completed_legs,
            held_asset,
            held_amount,
            source,
        }) => {
            warn!(
                completed = completed_legs.len(),
                held = assets.symbol(held_asset),
                held_amount,
                error = %source,
                "Route stopped part way"
            );
            Ok(())
        }
        Err(e) => Err(e).context("Routed swap failed"),
    }
}

fn run(config: DexConfig, route: bool) -> Result<()> {
    let assets = Assets::parse()?;
    let vault = account(VAULT)?;
    let deployer = account(DEPLOYER)?;
    let trader = account(TRADER)?;

    let exchange = Exchange::new(config.engine, InMemoryLedger::new(), vault);

    for (x, y) in [
        (assets.eth, assets.usdt),
        (assets.eth, assets.dai),
        (assets.usdt, assets.dai),
    ] {
        let key = exchange.create_pool(x, y)?;
        info!(pool = %key, pair = %format!("{}/{}", assets.symbol(x), assets.symbol(y)), "Created pool");
    }

    if !config.seed.seed_liquidity {
        info!("Seeding disabled, leaving pools empty");
        return Ok(());
    }
    seed_liquidity(&exchange, &assets, deployer)?;

    exchange.ledger().mint(&trader, &assets.eth, seed::TRADER_FUNDING)?;
    exchange.ledger().mint(&trader, &assets.usdt, seed::TRADER_STABLE_FUNDING)?;
    exchange.ledger().mint(&trader, &assets.dai, seed::TRADER_STABLE_FUNDING)?;

    log_prices(&exchange, &assets);

    if config.seed.smoke_swap {
        smoke_swap(&exchange, &assets, trader)?;
        log_prices(&exchange, &assets);
    }

    if route {
        routed_swap(&exchange, &assets, trader)?;
    }

    let stats = exchange.registry().stats();
    info!(
        pools = stats.total_pools,
        swaps = stats.swaps,
        deposits = stats.deposits,
        rejected = stats.rejected,
        "Bootstrap complete"
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("seed_pools=info".parse()?)
                .add_directive("dex_amm=info".parse()?),
        )
        .init();

    info!("SimpleDEX bootstrap starting");
    info!("Config file: {:?}", args.config);
    info!("Environment: {}", args.environment.as_deref().unwrap_or("default"));

    let config = load_config(args.config.as_deref(), args.environment.as_deref())?;
    run(config, args.route)
}
