// DANS : src/decoders/meteora/damm_v2/fees.rs

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use super::error::{DammV2Error, Result};
use super::math::U256;
use super::pool::{DynamicFeeStruct, PoolFeesStruct};

pub const BASIS_POINT_MAX: u64 = 10_000;
pub const FEE_DENOMINATOR: u64 = 1_000_000_000;
pub const MAX_FEE_NUMERATOR: u64 = 500_000_000;
const DYNAMIC_FEE_SCALE: u128 = 100_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeSchedulerMode {
    Constant,
    Linear,
    Exponential,
}

impl TryFrom<u8> for FeeSchedulerMode {
    type Error = DammV2Error;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(FeeSchedulerMode::Constant),
            1 => Ok(FeeSchedulerMode::Linear),
            2 => Ok(FeeSchedulerMode::Exponential),
            other => Err(DammV2Error::UnknownFeeSchedulerMode(other)),
        }
    }
}

/// Paramètres de la part dynamique (volatilité) des frais.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicFeeParams {
    pub volatility_accumulator: u128,
    pub bin_step: u16,
    pub variable_fee_control: u32,
}

impl From<&DynamicFeeStruct> for DynamicFeeParams {
    fn from(dynamic_fee: &DynamicFeeStruct) -> Self {
        Self {
            volatility_accumulator: dynamic_fee.volatility_accumulator,
            bin_step: dynamic_fee.bin_step,
            variable_fee_control: dynamic_fee.variable_fee_control,
        }
    }
}

/// Nombre de périodes à partir duquel `cliff * (1 - r/10000)^n` est < 1, donc nul au plancher.
/// Borne large (+1 %) : elle ne sert qu'à éviter un `pow` inutile, jamais à arrondir.
fn exponential_zero_after_periods(cliff_fee_numerator: u64, reduction_factor: u64) -> u64 {
    let cliff_bits = (u64::BITS - cliff_fee_numerator.leading_zeros()) as f64;
    let bits_lost_per_period = -(1.0 - reduction_factor as f64 / BASIS_POINT_MAX as f64).log2();
    (cliff_bits / bits_lost_per_period * 1.01).ceil() as u64 + 1
}

/// Numérateur de base après `period` périodes écoulées.
///
/// En mode exponentiel, un `reduction_factor >= 10000` donne 0 dès la première période :
/// la formule brute alternerait de signe au-delà, le numérateur est borné à 0.
pub fn get_base_fee_numerator(mode: FeeSchedulerMode, cliff_fee_numerator: u64, period: u64, reduction_factor: u64) -> u64 {
    match mode {
        FeeSchedulerMode::Constant => cliff_fee_numerator,
        FeeSchedulerMode::Linear => {
            let reduction = period as u128 * reduction_factor as u128;
            (cliff_fee_numerator as u128).saturating_sub(reduction) as u64
        }
        FeeSchedulerMode::Exponential => {
            if period == 0 || reduction_factor == 0 { return cliff_fee_numerator; }
            if reduction_factor >= BASIS_POINT_MAX { return 0; }
            if period >= exponential_zero_after_periods(cliff_fee_numerator, reduction_factor) { return 0; }
            // Fraction exacte : cliff * (10000 - r)^n / 10000^n, arrondie au plancher.
            let exponent = period as u32;
            let numerator = BigUint::from(cliff_fee_numerator) * BigUint::from(BASIS_POINT_MAX - reduction_factor).pow(exponent);
            let denominator = BigUint::from(BASIS_POINT_MAX).pow(exponent);
            let fee: BigUint = numerator / denominator;
            // fee <= cliff, donc tient toujours sur un u64
            u64::try_from(fee).unwrap_or(cliff_fee_numerator)
        }
    }
}

/// ceil(variable_fee_control * (volatility_accumulator * bin_step)^2 / 1e11)
pub fn get_dynamic_fee_numerator(volatility_accumulator: u128, bin_step: u16, variable_fee_control: u32) -> Result<u128> {
    if variable_fee_control == 0 { return Ok(0); }
    let square_vfa_bin = U256::from(volatility_accumulator)
        .checked_mul(U256::from(bin_step))
        .ok_or(DammV2Error::MathOverflow)?;
    let square_vfa_bin = square_vfa_bin.checked_mul(square_vfa_bin).ok_or(DammV2Error::MathOverflow)?;
    let v_fee = square_vfa_bin
        .checked_mul(U256::from(variable_fee_control))
        .ok_or(DammV2Error::MathOverflow)?;
    let scale = U256::from(DYNAMIC_FEE_SCALE);
    let (quotient, remainder) = v_fee.div_mod(scale);
    let scaled_v_fee = if remainder.is_zero() { quotient } else { quotient + U256::one() };
    u128::try_from(scaled_v_fee).map_err(|_| DammV2Error::MathOverflow)
}

/// Numérateur de frais effectif au point `current_point` (slot ou timestamp).
/// Tant que le planning n'a pas démarré (ou s'il est désactivé), c'est le cliff brut.
#[allow(clippy::too_many_arguments)]
pub fn get_fee_numerator(
    current_point: u64,
    activation_point: u64,
    number_of_period: u16,
    period_frequency: u64,
    mode: FeeSchedulerMode,
    cliff_fee_numerator: u64,
    reduction_factor: u64,
    dynamic_params: Option<DynamicFeeParams>,
) -> Result<u64> {
    if period_frequency == 0 || current_point < activation_point {
        return Ok(cliff_fee_numerator);
    }
    let period = ((current_point - activation_point) / period_frequency).min(number_of_period as u64);
    let mut fee_numerator = get_base_fee_numerator(mode, cliff_fee_numerator, period, reduction_factor) as u128;
    if let Some(params) = dynamic_params {
        // Une part dynamique hors bornes sature : le plafond ci-dessous s'applique de toute façon.
        let dynamic_fee = get_dynamic_fee_numerator(params.volatility_accumulator, params.bin_step, params.variable_fee_control)
            .unwrap_or(u128::MAX);
        fee_numerator = fee_numerator.saturating_add(dynamic_fee);
    }
    Ok(fee_numerator.min(MAX_FEE_NUMERATOR as u128) as u64)
}

/// ceil(amount * fee_numerator / FEE_DENOMINATOR) : l'arrondi protège le protocole.
pub fn get_fee_on_amount(amount: u64, fee_numerator: u64) -> Result<u64> {
    let product = amount as u128 * fee_numerator as u128;
    let fee = product.div_ceil(FEE_DENOMINATOR as u128);
    u64::try_from(fee).map_err(|_| DammV2Error::MathOverflow)
}

impl PoolFeesStruct {
    /// Applique le planning du pool ; la part dynamique n'est comptée que si elle est initialisée.
    pub fn fee_numerator_at(&self, current_point: u64, activation_point: u64) -> Result<u64> {
        let base_fee = &self.base_fee;
        let mode = FeeSchedulerMode::try_from(base_fee.fee_scheduler_mode)?;
        let dynamic_params = (self.dynamic_fee.initialized != 0).then(|| DynamicFeeParams::from(&self.dynamic_fee));
        get_fee_numerator(
            current_point,
            activation_point,
            base_fee.number_of_period,
            base_fee.period_frequency,
            mode,
            base_fee.cliff_fee_numerator,
            base_fee.reduction_factor,
            dynamic_params,
        )
    }
}

/// Répartition des frais d'un swap entre LP, protocole, partenaire et parrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub lp_fee: u64,
    pub protocol_fee: u64,
    pub partner_fee: u64,
    pub referral_fee: u64,
}

pub fn split_fee(total_fee: u64, fees: &PoolFeesStruct, has_partner: bool, has_referral: bool) -> FeeBreakdown {
    let protocol_fee = (total_fee as u128 * fees.protocol_fee_percent as u128 / 100) as u64;
    let protocol_fee = protocol_fee.min(total_fee);
    let lp_fee = total_fee - protocol_fee;

    let referral_fee = if has_referral {
        ((protocol_fee as u128 * fees.referral_fee_percent as u128 / 100) as u64).min(protocol_fee)
    } else { 0 };
    let protocol_after_referral = protocol_fee - referral_fee;

    let partner_fee = if has_partner {
        ((protocol_after_referral as u128 * fees.partner_fee_percent as u128 / 100) as u64).min(protocol_after_referral)
    } else { 0 };

    FeeBreakdown {
        lp_fee,
        protocol_fee: protocol_after_referral - partner_fee,
        partner_fee,
        referral_fee,
    }
}
