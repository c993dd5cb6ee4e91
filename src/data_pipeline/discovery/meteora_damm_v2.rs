// src/data_pipeline/discovery/meteora_damm_v2.rs

use anyhow::{anyhow, bail, Result};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::account::from_account;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::sysvar::clock::{self, Clock};
use tracing::{debug, info, instrument};

use crate::data_pipeline::onchain_scanner::{self, RawPoolData};
use crate::decoders::meteora::damm_v2::pool::{TOKEN_A_MINT_OFFSET, TOKEN_B_MINT_OFFSET};
use crate::decoders::meteora::damm_v2::{decode_pool, ActivationType, PoolSnapshot, POOL_ACCOUNT_LEN, PROGRAM_ID};

/// Pool décodé avec l'adresse de son compte.
#[derive(Debug, Clone)]
pub struct FetchedPool {
    pub address: Pubkey,
    pub state: PoolSnapshot,
}

pub async fn fetch_bytes(rpc_client: &RpcClient, address: &Pubkey) -> Result<Vec<u8>> {
    let account = rpc_client.get_account(address).await?;
    if account.owner != PROGRAM_ID {
        bail!("Le compte {} n'appartient pas au programme DAMM v2 (owner: {}).", address, account.owner);
    }
    Ok(account.data)
}

/// Décode un compte déjà récupéré, en vérifiant le discriminateur Anchor.
pub fn decode_pool_account(address: &Pubkey, data: &[u8]) -> Result<PoolSnapshot> {
    let state = decode_pool(data)?;
    if !state.has_pool_discriminator() {
        bail!("Invalid discriminator. {} n'est pas un compte Pool Meteora DAMM v2.", address);
    }
    Ok(state)
}

pub async fn fetch_pool_state(rpc_client: &RpcClient, address: &Pubkey) -> Result<FetchedPool> {
    let data = fetch_bytes(rpc_client, address).await?;
    let state = decode_pool_account(address, &data)?;
    Ok(FetchedPool { address: *address, state })
}

pub fn candidate_filters(mint_a: &Pubkey, mint_b: &Pubkey) -> Vec<RpcFilterType> {
    vec![
        RpcFilterType::DataSize(POOL_ACCOUNT_LEN as u64),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(TOKEN_A_MINT_OFFSET, mint_a.as_ref())),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(TOKEN_B_MINT_OFFSET, mint_b.as_ref())),
    ]
}

async fn find_candidate_pools(rpc_client: &RpcClient, mint_a: &Pubkey, mint_b: &Pubkey) -> Result<Vec<RawPoolData>> {
    onchain_scanner::find_pools_by_program_id_with_filters(rpc_client, &PROGRAM_ID, candidate_filters(mint_a, mint_b)).await
}

/// Adresses de tous les pools (mint_a, mint_b) dans cet ordre exact.
pub async fn find_candidate_addresses(rpc_client: &RpcClient, mint_a: &Pubkey, mint_b: &Pubkey) -> Result<Vec<Pubkey>> {
    let candidates = find_candidate_pools(rpc_client, mint_a, mint_b).await?;
    Ok(candidates.into_iter().map(|raw| raw.address).collect())
}

/// Garde le pool avec la plus grande `liquidity`. À égalité, le premier rencontré gagne.
pub fn select_deepest_pool(pools: impl IntoIterator<Item = FetchedPool>) -> Option<FetchedPool> {
    pools.into_iter().fold(None, |best: Option<FetchedPool>, candidate| match best {
        Some(current) if current.state.liquidity >= candidate.state.liquidity => Some(current),
        _ => Some(candidate),
    })
}

/// Le pool le plus profond pour la paire. `Ok(None)` seulement s'il n'existe aucun candidat :
/// une erreur RPC ou un compte illisible est remonté tel quel.
#[instrument(skip_all, fields(mint_a = %mint_a, mint_b = %mint_b))]
pub async fn find_best_pool(rpc_client: &RpcClient, mint_a: &Pubkey, mint_b: &Pubkey) -> Result<Option<FetchedPool>> {
    let candidates = find_candidate_pools(rpc_client, mint_a, mint_b).await?;
    info!(candidate_count = candidates.len(), "Candidats DAMM v2 trouvés");

    let mut decoded = Vec::with_capacity(candidates.len());
    for raw in candidates {
        let state = decode_pool_account(&raw.address, &raw.data)?;
        debug!(pool = %raw.address, liquidity = %state.liquidity, "Candidat décodé");
        decoded.push(FetchedPool { address: raw.address, state });
    }
    Ok(select_deepest_pool(decoded))
}

/// Point courant à comparer à `activation_point` : slot ou timestamp selon le pool.
/// Le sysvar Clock donne les deux en une seule lecture.
pub async fn fetch_current_point(rpc_client: &RpcClient, pool: &PoolSnapshot) -> Result<u64> {
    let account = rpc_client.get_account(&clock::ID).await?;
    let clock: Clock = from_account(&account).ok_or_else(|| anyhow!("Sysvar Clock illisible"))?;
    current_point_from_clock(pool, &clock)
}

pub fn current_point_from_clock(pool: &PoolSnapshot, clock: &Clock) -> Result<u64> {
    match pool.activation_kind() {
        Ok(ActivationType::Slot) => Ok(clock.slot),
        Ok(ActivationType::Timestamp) => Ok(u64::try_from(clock.unix_timestamp)?),
        Err(tag) => bail!("Activation type inconnu: {}", tag),
    }
}
