// src/bin/damm_v2_quoter.rs
//
// Usage : damm_v2_quoter <POOL | MINT_A:MINT_B | MINT_A> <AMOUNT_IN> <a2b|b2a> [--referral]

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use tracing::info;

use damm_quote::{
    config::Config,
    data_pipeline::discovery::meteora_damm_v2::{self, FetchedPool},
    decoders::meteora::damm_v2::{math::sqrt_price_to_price, PoolQuote},
    monitoring::logging::{setup_logging, LogFormat},
};

#[derive(Serialize)]
struct QuoteReport {
    pool: String,
    mint_in: String,
    mint_out: String,
    amount_in: u64,
    current_point: u64,
    quote: PoolQuote,
    price_before: f64,
    price_after: f64,
}

struct Args {
    target: String,
    amount_in: u64,
    a_to_b: bool,
    has_referral: bool,
}

fn parse_args() -> Result<Args> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        bail!("Usage : damm_v2_quoter <POOL | MINT_A:MINT_B | MINT_A> <AMOUNT_IN> <a2b|b2a> [--referral]");
    }
    let a_to_b = match args[2].as_str() {
        "a2b" => true,
        "b2a" => false,
        other => bail!("Direction inconnue: {} (attendu a2b ou b2a)", other),
    };
    Ok(Args {
        target: args[0].clone(),
        amount_in: args[1].parse()?,
        a_to_b,
        has_referral: args.iter().skip(3).any(|a| a == "--referral"),
    })
}

async fn resolve_pool(rpc_client: &RpcClient, target: &str, default_quote_mint: &Pubkey) -> Result<FetchedPool> {
    let (mint_a, mint_b) = match target.split_once(':') {
        Some((a, b)) => (Pubkey::from_str(a)?, Pubkey::from_str(b)?),
        None => {
            let key = Pubkey::from_str(target)?;
            // Si c'est un compte Pool, on le prend tel quel ; sinon on le traite comme un mint A.
            let account = rpc_client.get_account(&key).await?;
            if account.owner == damm_quote::decoders::meteora::damm_v2::PROGRAM_ID {
                let state = meteora_damm_v2::decode_pool_account(&key, &account.data)?;
                return Ok(FetchedPool { address: key, state });
            }
            (key, *default_quote_mint)
        }
    };
    meteora_damm_v2::find_best_pool(rpc_client, &mint_a, &mint_b)
        .await?
        .ok_or_else(|| anyhow!("Aucun pool DAMM v2 pour la paire {} / {}", mint_a, mint_b))
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging(LogFormat::Pretty);
    let config = Config::load()?;
    let args = parse_args()?;

    let rpc_client = RpcClient::new_with_commitment(config.solana_rpc_url.clone(), config.commitment()?);
    let default_quote_mint = Pubkey::from_str(&config.quote_mint)?;

    let FetchedPool { address, state } = resolve_pool(&rpc_client, &args.target, &default_quote_mint).await?;
    info!(pool = %address, liquidity = %state.liquidity, fee_percent = state.fee_as_percent(), "Pool DAMM v2 chargé");

    let current_point = meteora_damm_v2::fetch_current_point(&rpc_client, &state).await?;
    let quote = state.quote(args.amount_in, args.a_to_b, current_point, args.has_referral)?;

    let (mint_in, mint_out) = if args.a_to_b {
        (state.token_a_mint, state.token_b_mint)
    } else {
        (state.token_b_mint, state.token_a_mint)
    };
    let report = QuoteReport {
        pool: address.to_string(),
        mint_in: mint_in.to_string(),
        mint_out: mint_out.to_string(),
        amount_in: args.amount_in,
        current_point,
        quote,
        // Prix brut (sans décimales) : les mints ne sont pas chargés ici.
        price_before: sqrt_price_to_price(state.sqrt_price, 0, 0),
        price_after: sqrt_price_to_price(quote.result.next_sqrt_price, 0, 0),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
