// src/data_pipeline/onchain_scanner.rs

use anyhow::Result;
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::RpcFilterType;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RawPoolData {
    pub address: Pubkey,
    pub data: Vec<u8>,
}

/// Scan des comptes d'un programme, restreint par des filtres memcmp / taille côté RPC.
pub async fn find_pools_by_program_id_with_filters(
    rpc_client: &RpcClient,
    program_id: &Pubkey,
    filters: Vec<RpcFilterType>,
) -> Result<Vec<RawPoolData>> {
    debug!(program_id = %program_id, filter_count = filters.len(), "Scan on-chain des comptes du programme");

    let account_config = RpcAccountInfoConfig {
        encoding: Some(UiAccountEncoding::Base64),
        data_slice: None,
        commitment: Some(rpc_client.commitment()),
        min_context_slot: None,
    };

    let config = RpcProgramAccountsConfig {
        filters: Some(filters),
        account_config,
        with_context: Some(false),
        sort_results: None,
    };

    let accounts = rpc_client.get_program_accounts_with_config(program_id, config).await?;

    debug!(account_count = accounts.len(), "Scan terminé");

    Ok(accounts
        .into_iter()
        .map(|(address, account)| RawPoolData { address, data: account.data })
        .collect())
}
