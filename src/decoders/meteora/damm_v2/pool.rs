// DANS: src/decoders/meteora/damm_v2/pool.rs

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use super::codec::{ByteReader, ByteWriter};
use super::error::{DammV2Error, Result};

pub const PROGRAM_ID: Pubkey = solana_sdk::pubkey!("cpamdpZCGKUy5JxQXB4dcpGPiikHawvSWAd6mEn1sGG");
pub const POOL_STATE_DISCRIMINATOR: [u8; 8] = [241, 154, 109, 4, 17, 177, 109, 188];
pub const DISCRIMINATOR_LEN: usize = 8;

const PUBKEY_LEN: usize = 32;

/// Un bloc à position fixe du compte Pool. `LEN` est la somme des largeurs
/// des champs, lus dans l'ordre exact de `read`.
pub trait OnchainLayout: Sized {
    const LEN: usize;
    fn read(reader: &mut ByteReader) -> Result<Self>;
    fn write(&self, writer: &mut ByteWriter);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseFeeStruct {
    pub cliff_fee_numerator: u64,
    pub fee_scheduler_mode: u8,
    pub padding_0: [u8; 5],
    pub number_of_period: u16,
    pub period_frequency: u64,
    pub reduction_factor: u64,
    pub padding_1: u64,
}

impl OnchainLayout for BaseFeeStruct {
    const LEN: usize = 8 + 1 + 5 + 2 + 8 + 8 + 8;

    fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            cliff_fee_numerator: reader.read_u64()?,
            fee_scheduler_mode: reader.read_u8()?,
            padding_0: reader.read_array()?,
            number_of_period: reader.read_u16()?,
            period_frequency: reader.read_u64()?,
            reduction_factor: reader.read_u64()?,
            padding_1: reader.read_u64()?,
        })
    }

    fn write(&self, writer: &mut ByteWriter) {
        writer.write_u64(self.cliff_fee_numerator);
        writer.write_u8(self.fee_scheduler_mode);
        writer.write_bytes(&self.padding_0);
        writer.write_u16(self.number_of_period);
        writer.write_u64(self.period_frequency);
        writer.write_u64(self.reduction_factor);
        writer.write_u64(self.padding_1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicFeeStruct {
    pub initialized: u8,
    pub padding: [u8; 7],
    pub max_volatility_accumulator: u32,
    pub variable_fee_control: u32,
    pub bin_step: u16,
    pub filter_period: u16,
    pub decay_period: u16,
    pub reduction_factor: u16,
    pub last_update_timestamp: u64,
    pub bin_step_u128: u128,
    pub sqrt_price_reference: u128,
    pub volatility_accumulator: u128,
    pub volatility_reference: u128,
}

impl OnchainLayout for DynamicFeeStruct {
    const LEN: usize = 1 + 7 + 4 + 4 + 2 * 4 + 8 + 16 * 4;

    fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            initialized: reader.read_u8()?,
            padding: reader.read_array()?,
            max_volatility_accumulator: reader.read_u32()?,
            variable_fee_control: reader.read_u32()?,
            bin_step: reader.read_u16()?,
            filter_period: reader.read_u16()?,
            decay_period: reader.read_u16()?,
            reduction_factor: reader.read_u16()?,
            last_update_timestamp: reader.read_u64()?,
            bin_step_u128: reader.read_u128()?,
            sqrt_price_reference: reader.read_u128()?,
            volatility_accumulator: reader.read_u128()?,
            volatility_reference: reader.read_u128()?,
        })
    }

    fn write(&self, writer: &mut ByteWriter) {
        writer.write_u8(self.initialized);
        writer.write_bytes(&self.padding);
        writer.write_u32(self.max_volatility_accumulator);
        writer.write_u32(self.variable_fee_control);
        writer.write_u16(self.bin_step);
        writer.write_u16(self.filter_period);
        writer.write_u16(self.decay_period);
        writer.write_u16(self.reduction_factor);
        writer.write_u64(self.last_update_timestamp);
        writer.write_u128(self.bin_step_u128);
        writer.write_u128(self.sqrt_price_reference);
        writer.write_u128(self.volatility_accumulator);
        writer.write_u128(self.volatility_reference);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolFeesStruct {
    pub base_fee: BaseFeeStruct,
    pub protocol_fee_percent: u8,
    pub partner_fee_percent: u8,
    pub referral_fee_percent: u8,
    pub padding_0: [u8; 5],
    pub dynamic_fee: DynamicFeeStruct,
    pub padding_1: [u64; 2],
}

impl OnchainLayout for PoolFeesStruct {
    const LEN: usize = BaseFeeStruct::LEN + 1 + 1 + 1 + 5 + DynamicFeeStruct::LEN + 8 * 2;

    fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            base_fee: BaseFeeStruct::read(reader)?,
            protocol_fee_percent: reader.read_u8()?,
            partner_fee_percent: reader.read_u8()?,
            referral_fee_percent: reader.read_u8()?,
            padding_0: reader.read_array()?,
            dynamic_fee: DynamicFeeStruct::read(reader)?,
            padding_1: reader.read_u64_array()?,
        })
    }

    fn write(&self, writer: &mut ByteWriter) {
        self.base_fee.write(writer);
        writer.write_u8(self.protocol_fee_percent);
        writer.write_u8(self.partner_fee_percent);
        writer.write_u8(self.referral_fee_percent);
        writer.write_bytes(&self.padding_0);
        self.dynamic_fee.write(writer);
        writer.write_u64_array(&self.padding_1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMetrics {
    pub total_lp_a_fee: u128,
    pub total_lp_b_fee: u128,
    pub total_protocol_a_fee: u64,
    pub total_protocol_b_fee: u64,
    pub total_partner_a_fee: u64,
    pub total_partner_b_fee: u64,
    pub total_position: u64,
    pub padding: u64,
}

impl OnchainLayout for PoolMetrics {
    const LEN: usize = 16 * 2 + 8 * 6;

    fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            total_lp_a_fee: reader.read_u128()?,
            total_lp_b_fee: reader.read_u128()?,
            total_protocol_a_fee: reader.read_u64()?,
            total_protocol_b_fee: reader.read_u64()?,
            total_partner_a_fee: reader.read_u64()?,
            total_partner_b_fee: reader.read_u64()?,
            total_position: reader.read_u64()?,
            padding: reader.read_u64()?,
        })
    }

    fn write(&self, writer: &mut ByteWriter) {
        writer.write_u128(self.total_lp_a_fee);
        writer.write_u128(self.total_lp_b_fee);
        writer.write_u64(self.total_protocol_a_fee);
        writer.write_u64(self.total_protocol_b_fee);
        writer.write_u64(self.total_partner_a_fee);
        writer.write_u64(self.total_partner_b_fee);
        writer.write_u64(self.total_position);
        writer.write_u64(self.padding);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardInfo {
    pub initialized: u8,
    pub reward_token_flag: u8,
    pub padding_0: [u8; 6],
    pub padding_1: [u8; 8],
    pub mint: Pubkey,
    pub vault: Pubkey,
    pub funder: Pubkey,
    pub reward_duration: u64,
    pub reward_duration_end: u64,
    pub reward_rate: u128,
    pub reward_per_token_stored: [u8; 32],
    pub last_update_time: u64,
    pub cumulative_seconds_with_empty_liquidity_reward: u64,
}

impl OnchainLayout for RewardInfo {
    const LEN: usize = 1 + 1 + 6 + 8 + PUBKEY_LEN * 3 + 8 + 8 + 16 + 32 + 8 + 8;

    fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            initialized: reader.read_u8()?,
            reward_token_flag: reader.read_u8()?,
            padding_0: reader.read_array()?,
            padding_1: reader.read_array()?,
            mint: reader.read_pubkey()?,
            vault: reader.read_pubkey()?,
            funder: reader.read_pubkey()?,
            reward_duration: reader.read_u64()?,
            reward_duration_end: reader.read_u64()?,
            reward_rate: reader.read_u128()?,
            reward_per_token_stored: reader.read_array()?,
            last_update_time: reader.read_u64()?,
            cumulative_seconds_with_empty_liquidity_reward: reader.read_u64()?,
        })
    }

    fn write(&self, writer: &mut ByteWriter) {
        writer.write_u8(self.initialized);
        writer.write_u8(self.reward_token_flag);
        writer.write_bytes(&self.padding_0);
        writer.write_bytes(&self.padding_1);
        writer.write_pubkey(&self.mint);
        writer.write_pubkey(&self.vault);
        writer.write_pubkey(&self.funder);
        writer.write_u64(self.reward_duration);
        writer.write_u64(self.reward_duration_end);
        writer.write_u128(self.reward_rate);
        writer.write_bytes(&self.reward_per_token_stored);
        writer.write_u64(self.last_update_time);
        writer.write_u64(self.cumulative_seconds_with_empty_liquidity_reward);
    }
}

/// État complet d'un pool DAMM v2 tel qu'il était au moment de la lecture du compte.
/// Les champs `padding*` sont conservés tels quels pour que `encode` soit l'inverse exact de `decode_pool`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub discriminator: [u8; 8],
    pub pool_fees: PoolFeesStruct,
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    pub token_a_vault: Pubkey,
    pub token_b_vault: Pubkey,
    pub whitelisted_vault: Pubkey,
    pub partner: Pubkey,
    pub liquidity: u128,
    pub padding: u128,
    pub protocol_a_fee: u64,
    pub protocol_b_fee: u64,
    pub partner_a_fee: u64,
    pub partner_b_fee: u64,
    pub sqrt_min_price: u128,
    pub sqrt_max_price: u128,
    pub sqrt_price: u128,
    pub activation_point: u64,
    pub activation_type: u8,
    pub pool_status: u8,
    pub token_a_flag: u8,
    pub token_b_flag: u8,
    pub collect_fee_mode: u8,
    pub pool_type: u8,
    pub padding_0: [u8; 2],
    pub fee_a_per_liquidity: [u8; 32],
    pub fee_b_per_liquidity: [u8; 32],
    pub permanent_lock_liquidity: u128,
    pub metrics: PoolMetrics,
    pub creator: Pubkey,
    pub padding_1: [u64; 6],
    pub reward_infos: [RewardInfo; 2],
}

impl OnchainLayout for PoolSnapshot {
    const LEN: usize = DISCRIMINATOR_LEN
        + PoolFeesStruct::LEN
        + PUBKEY_LEN * 6
        + 16 * 2
        + 8 * 4
        + 16 * 3
        + 8 + 1 * 6 + 2
        + 32 * 2
        + 16
        + PoolMetrics::LEN
        + PUBKEY_LEN
        + 8 * 6
        + RewardInfo::LEN * 2;

    fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            discriminator: reader.read_array()?,
            pool_fees: PoolFeesStruct::read(reader)?,
            token_a_mint: reader.read_pubkey()?,
            token_b_mint: reader.read_pubkey()?,
            token_a_vault: reader.read_pubkey()?,
            token_b_vault: reader.read_pubkey()?,
            whitelisted_vault: reader.read_pubkey()?,
            partner: reader.read_pubkey()?,
            liquidity: reader.read_u128()?,
            padding: reader.read_u128()?,
            protocol_a_fee: reader.read_u64()?,
            protocol_b_fee: reader.read_u64()?,
            partner_a_fee: reader.read_u64()?,
            partner_b_fee: reader.read_u64()?,
            sqrt_min_price: reader.read_u128()?,
            sqrt_max_price: reader.read_u128()?,
            sqrt_price: reader.read_u128()?,
            activation_point: reader.read_u64()?,
            activation_type: reader.read_u8()?,
            pool_status: reader.read_u8()?,
            token_a_flag: reader.read_u8()?,
            token_b_flag: reader.read_u8()?,
            collect_fee_mode: reader.read_u8()?,
            pool_type: reader.read_u8()?,
            padding_0: reader.read_array()?,
            fee_a_per_liquidity: reader.read_array()?,
            fee_b_per_liquidity: reader.read_array()?,
            permanent_lock_liquidity: reader.read_u128()?,
            metrics: PoolMetrics::read(reader)?,
            creator: reader.read_pubkey()?,
            padding_1: reader.read_u64_array()?,
            reward_infos: [RewardInfo::read(reader)?, RewardInfo::read(reader)?],
        })
    }

    fn write(&self, writer: &mut ByteWriter) {
        writer.write_bytes(&self.discriminator);
        self.pool_fees.write(writer);
        writer.write_pubkey(&self.token_a_mint);
        writer.write_pubkey(&self.token_b_mint);
        writer.write_pubkey(&self.token_a_vault);
        writer.write_pubkey(&self.token_b_vault);
        writer.write_pubkey(&self.whitelisted_vault);
        writer.write_pubkey(&self.partner);
        writer.write_u128(self.liquidity);
        writer.write_u128(self.padding);
        writer.write_u64(self.protocol_a_fee);
        writer.write_u64(self.protocol_b_fee);
        writer.write_u64(self.partner_a_fee);
        writer.write_u64(self.partner_b_fee);
        writer.write_u128(self.sqrt_min_price);
        writer.write_u128(self.sqrt_max_price);
        writer.write_u128(self.sqrt_price);
        writer.write_u64(self.activation_point);
        writer.write_u8(self.activation_type);
        writer.write_u8(self.pool_status);
        writer.write_u8(self.token_a_flag);
        writer.write_u8(self.token_b_flag);
        writer.write_u8(self.collect_fee_mode);
        writer.write_u8(self.pool_type);
        writer.write_bytes(&self.padding_0);
        writer.write_bytes(&self.fee_a_per_liquidity);
        writer.write_bytes(&self.fee_b_per_liquidity);
        writer.write_u128(self.permanent_lock_liquidity);
        self.metrics.write(writer);
        writer.write_pubkey(&self.creator);
        writer.write_u64_array(&self.padding_1);
        for reward in &self.reward_infos {
            reward.write(writer);
        }
    }
}

pub const POOL_ACCOUNT_LEN: usize = PoolSnapshot::LEN;

// Offsets utilisés par les filtres memcmp et par les tests.
pub const TOKEN_A_MINT_OFFSET: usize = DISCRIMINATOR_LEN + PoolFeesStruct::LEN;
pub const TOKEN_B_MINT_OFFSET: usize = TOKEN_A_MINT_OFFSET + PUBKEY_LEN;
pub const LIQUIDITY_OFFSET: usize = TOKEN_A_MINT_OFFSET + PUBKEY_LEN * 6;
pub const SQRT_MIN_PRICE_OFFSET: usize = LIQUIDITY_OFFSET + 16 * 2 + 8 * 4;
pub const SQRT_PRICE_OFFSET: usize = SQRT_MIN_PRICE_OFFSET + 16 * 2;
pub const ACTIVATION_POINT_OFFSET: usize = SQRT_PRICE_OFFSET + 16;
pub const COLLECT_FEE_MODE_OFFSET: usize = ACTIVATION_POINT_OFFSET + 8 + 4;
pub const CREATOR_OFFSET: usize = COLLECT_FEE_MODE_OFFSET + 2 + 2 + 32 * 2 + 16 + PoolMetrics::LEN;
pub const REWARD_INFOS_OFFSET: usize = CREATOR_OFFSET + PUBKEY_LEN + 8 * 6;

// Toute dérive du schéma casse la compilation, pas le décodage.
const _: () = assert!(BaseFeeStruct::LEN == 40);
const _: () = assert!(DynamicFeeStruct::LEN == 96);
const _: () = assert!(PoolFeesStruct::LEN == 160);
const _: () = assert!(PoolMetrics::LEN == 80);
const _: () = assert!(RewardInfo::LEN == 192);
const _: () = assert!(TOKEN_A_MINT_OFFSET == 168);
const _: () = assert!(TOKEN_B_MINT_OFFSET == 200);
const _: () = assert!(REWARD_INFOS_OFFSET + RewardInfo::LEN * 2 == POOL_ACCOUNT_LEN);
const _: () = assert!(POOL_ACCOUNT_LEN == 1112);

/// Source du "point" courant comparé à `activation_point` : slot ou timestamp unix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationType {
    Slot,
    Timestamp,
}

impl TryFrom<u8> for ActivationType {
    type Error = u8;

    fn try_from(tag: u8) -> std::result::Result<Self, u8> {
        match tag {
            0 => Ok(ActivationType::Slot),
            1 => Ok(ActivationType::Timestamp),
            other => Err(other),
        }
    }
}

/// Décode un compte Pool DAMM v2. Seule la longueur est validée : un buffer plus court
/// que le schéma est rejeté en bloc, les octets en trop sont ignorés.
pub fn decode_pool(data: &[u8]) -> Result<PoolSnapshot> {
    if data.len() < POOL_ACCOUNT_LEN {
        return Err(DammV2Error::Layout { expected: POOL_ACCOUNT_LEN, actual: data.len() });
    }
    let mut reader = ByteReader::new(&data[..POOL_ACCOUNT_LEN]);
    let pool = PoolSnapshot::read(&mut reader)?;
    debug_assert_eq!(reader.offset(), POOL_ACCOUNT_LEN);
    Ok(pool)
}

/// Inverse exact de `decode_pool`.
pub fn encode_pool(pool: &PoolSnapshot) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(POOL_ACCOUNT_LEN);
    pool.write(&mut writer);
    debug_assert_eq!(writer.len(), POOL_ACCOUNT_LEN);
    writer.into_inner()
}

impl PoolSnapshot {
    pub fn has_pool_discriminator(&self) -> bool {
        self.discriminator == POOL_STATE_DISCRIMINATOR
    }

    pub fn get_mints(&self) -> (Pubkey, Pubkey) { (self.token_a_mint, self.token_b_mint) }
    pub fn get_vaults(&self) -> (Pubkey, Pubkey) { (self.token_a_vault, self.token_b_vault) }

    pub fn has_partner(&self) -> bool {
        self.partner != Pubkey::default()
    }

    pub fn activation_kind(&self) -> std::result::Result<ActivationType, u8> {
        ActivationType::try_from(self.activation_type)
    }

    pub fn fee_as_percent(&self) -> f64 {
        let base_fee = self.pool_fees.base_fee.cliff_fee_numerator;
        if base_fee == 0 { return 0.0; }
        (base_fee as f64 / super::fees::FEE_DENOMINATOR as f64) * 100.0
    }
}
