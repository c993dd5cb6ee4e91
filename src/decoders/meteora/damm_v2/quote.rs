// DANS : src/decoders/meteora/damm_v2/quote.rs

use serde::{Deserialize, Serialize};
use tracing::debug;
use super::error::{DammV2Error, Result};
use super::fees::{get_fee_on_amount, split_fee, FeeBreakdown};
use super::math::{self, Rounding};
use super::pool::PoolSnapshot;

/// Token sur lequel le pool prélève ses frais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectFeeMode {
    BothToken,
    OnlyB,
}

impl TryFrom<u8> for CollectFeeMode {
    type Error = DammV2Error;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(CollectFeeMode::BothToken),
            1 => Ok(CollectFeeMode::OnlyB),
            other => Err(DammV2Error::UnknownCollectFeeMode(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeMode {
    pub fee_on_input: bool,
    pub fees_on_token_a: bool,
}

/// Les frais ne sont pris sur l'input que pour un swap B -> A d'un pool `OnlyB`.
/// Dans les trois autres cas ils sont pris sur l'output.
pub fn get_fee_mode(collect_fee_mode: CollectFeeMode, b_to_a: bool) -> FeeMode {
    match (collect_fee_mode, b_to_a) {
        (CollectFeeMode::OnlyB, true) => FeeMode { fee_on_input: true, fees_on_token_a: false },
        (CollectFeeMode::BothToken, true) => FeeMode { fee_on_input: false, fees_on_token_a: true },
        (_, false) => FeeMode { fee_on_input: false, fees_on_token_a: false },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResult {
    pub amount_out: u64,
    pub total_fee: u64,
    pub next_sqrt_price: u128,
}

/// Quote d'un swap exact-in, sans traversée de bornes de prix.
pub fn quote_swap(
    amount_in: u64,
    sqrt_price: u128,
    liquidity: u128,
    trade_fee_numerator: u64,
    a_to_b: bool,
    collect_fee_mode: CollectFeeMode,
) -> Result<SwapResult> {
    let fee_mode = get_fee_mode(collect_fee_mode, !a_to_b);

    let (actual_amount_in, fee_on_input) = if fee_mode.fee_on_input {
        let fee = get_fee_on_amount(amount_in, trade_fee_numerator)?;
        (amount_in.checked_sub(fee).ok_or(DammV2Error::MathOverflow)?, fee)
    } else {
        (amount_in, 0)
    };

    let next_sqrt_price = math::get_next_sqrt_price_from_input(actual_amount_in, sqrt_price, liquidity, a_to_b)?;

    let raw_amount_out = if a_to_b {
        math::get_amount_b_from_liquidity_delta(liquidity, sqrt_price, next_sqrt_price, Rounding::Down)?
    } else {
        math::get_amount_a_from_liquidity_delta(liquidity, next_sqrt_price, sqrt_price, Rounding::Down)?
    };

    let (amount_out, total_fee) = if fee_mode.fee_on_input {
        (raw_amount_out, fee_on_input)
    } else {
        let fee = get_fee_on_amount(raw_amount_out, trade_fee_numerator)?;
        (raw_amount_out.checked_sub(fee).ok_or(DammV2Error::MathOverflow)?, fee)
    };

    Ok(SwapResult { amount_out, total_fee, next_sqrt_price })
}

/// Quote complet calculé à partir d'un snapshot de pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolQuote {
    pub result: SwapResult,
    pub trade_fee_numerator: u64,
    pub fee_mode: FeeMode,
    pub fee_breakdown: FeeBreakdown,
}

impl PoolSnapshot {
    pub fn current_fee_numerator(&self, current_point: u64) -> Result<u64> {
        self.pool_fees.fee_numerator_at(current_point, self.activation_point)
    }

    /// `current_point` est un slot ou un timestamp selon `activation_type`.
    pub fn quote(&self, amount_in: u64, a_to_b: bool, current_point: u64, has_referral: bool) -> Result<PoolQuote> {
        let collect_fee_mode = CollectFeeMode::try_from(self.collect_fee_mode)?;
        let trade_fee_numerator = self.current_fee_numerator(current_point)?;
        let result = quote_swap(amount_in, self.sqrt_price, self.liquidity, trade_fee_numerator, a_to_b, collect_fee_mode)?;
        let fee_breakdown = split_fee(result.total_fee, &self.pool_fees, self.has_partner(), has_referral);
        debug!(
            amount_in,
            a_to_b,
            current_point,
            trade_fee_numerator,
            amount_out = result.amount_out,
            total_fee = result.total_fee,
            "Quote DAMM v2 calculé"
        );
        Ok(PoolQuote {
            result,
            trade_fee_numerator,
            fee_mode: get_fee_mode(collect_fee_mode, !a_to_b),
            fee_breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoders::meteora::damm_v2::{decode_pool, POOL_ACCOUNT_LEN};
    use crate::decoders::meteora::damm_v2::math::ONE_Q64;
    use proptest::prelude::*;

    const LIQUIDITY: u128 = 1_000_000_000_000u128 << 64;

    #[test]
    fn test_fee_mode_truth_table() {
        assert_eq!(get_fee_mode(CollectFeeMode::BothToken, false), FeeMode { fee_on_input: false, fees_on_token_a: false });
        assert_eq!(get_fee_mode(CollectFeeMode::OnlyB, false), FeeMode { fee_on_input: false, fees_on_token_a: false });
        assert_eq!(get_fee_mode(CollectFeeMode::BothToken, true), FeeMode { fee_on_input: false, fees_on_token_a: true });
        assert_eq!(get_fee_mode(CollectFeeMode::OnlyB, true), FeeMode { fee_on_input: true, fees_on_token_a: false });
    }

    #[test]
    fn test_quote_a_to_b_fee_on_output() {
        for mode in [CollectFeeMode::BothToken, CollectFeeMode::OnlyB] {
            let result = quote_swap(1_000_000, ONE_Q64, LIQUIDITY, 2_500_000, true, mode).unwrap();
            assert_eq!(result, SwapResult { amount_out: 997_499, total_fee: 2_500, next_sqrt_price: 18_446_725_626_983_924_633 });
        }
    }

    #[test]
    fn test_quote_b_to_a_fee_on_output() {
        let result = quote_swap(1_000_000, ONE_Q64, LIQUIDITY, 2_500_000, false, CollectFeeMode::BothToken).unwrap();
        assert_eq!(result, SwapResult { amount_out: 997_499, total_fee: 2_500, next_sqrt_price: 18_446_762_520_453_625_325 });
    }

    #[test]
    fn test_quote_b_to_a_fee_on_input() {
        // le prix bouge moins : seuls 997_500 B entrent dans la courbe
        let result = quote_swap(1_000_000, ONE_Q64, LIQUIDITY, 2_500_000, false, CollectFeeMode::OnlyB).unwrap();
        assert_eq!(result, SwapResult { amount_out: 997_499, total_fee: 2_500, next_sqrt_price: 18_446_762_474_336_765_141 });
    }

    #[test]
    fn test_quote_zero_liquidity_propagates() {
        let result = quote_swap(1_000, ONE_Q64, 0, 2_500_000, true, CollectFeeMode::BothToken);
        assert_eq!(result, Err(DammV2Error::DivisionByZero));
    }

    #[test]
    fn test_quote_fee_above_denominator_is_error() {
        let result = quote_swap(1_000, ONE_Q64, LIQUIDITY, 2_000_000_000, false, CollectFeeMode::OnlyB);
        assert_eq!(result, Err(DammV2Error::MathOverflow));
    }

    fn pool_snapshot() -> PoolSnapshot {
        let mut pool = decode_pool(&vec![0u8; POOL_ACCOUNT_LEN]).unwrap();
        pool.liquidity = LIQUIDITY;
        pool.sqrt_price = ONE_Q64;
        pool.sqrt_min_price = 4_295_048_016;
        pool.sqrt_max_price = 79_226_673_521_066_979_257_578_248_091;
        pool.activation_point = 1_000;
        pool.pool_fees.base_fee.cliff_fee_numerator = 2_500_000;
        pool.pool_fees.base_fee.period_frequency = 60;
        pool.pool_fees.base_fee.number_of_period = 10;
        pool.pool_fees.protocol_fee_percent = 20;
        pool
    }

    #[test]
    fn test_pool_quote_uses_schedule() {
        let pool = pool_snapshot();
        let quote = pool.quote(1_000_000, true, 5_000, false).unwrap();
        assert_eq!(quote.trade_fee_numerator, 2_500_000);
        assert_eq!(quote.result.amount_out, 997_499);
        assert_eq!(quote.fee_breakdown, FeeBreakdown { lp_fee: 2_000, protocol_fee: 500, partner_fee: 0, referral_fee: 0 });
    }

    #[test]
    fn test_pool_quote_adds_dynamic_fee() {
        let mut pool = pool_snapshot();
        pool.pool_fees.dynamic_fee.initialized = 1;
        pool.pool_fees.dynamic_fee.volatility_accumulator = 1_000;
        pool.pool_fees.dynamic_fee.bin_step = 10;
        pool.pool_fees.dynamic_fee.variable_fee_control = 2_000_000_000;
        let quote = pool.quote(1_000_000, true, 5_000, false).unwrap();
        assert_eq!(quote.trade_fee_numerator, 4_500_000);
        assert_eq!(quote.result, SwapResult { amount_out: 995_499, total_fee: 4_500, next_sqrt_price: 18_446_725_626_983_924_633 });

        // avant activation : cliff brut, sans la part dynamique
        assert_eq!(pool.current_fee_numerator(999).unwrap(), 2_500_000);
    }

    #[test]
    fn test_pool_quote_rejects_unknown_tags() {
        let mut pool = pool_snapshot();
        pool.collect_fee_mode = 7;
        assert_eq!(pool.quote(1, true, 5_000, false), Err(DammV2Error::UnknownCollectFeeMode(7)));

        let mut pool = pool_snapshot();
        pool.pool_fees.base_fee.fee_scheduler_mode = 9;
        assert_eq!(pool.quote(1, true, 5_000, false), Err(DammV2Error::UnknownFeeSchedulerMode(9)));
    }

    proptest! {
        #[test]
        fn prop_zero_input_is_free(
            sqrt_price in 1u128..=u64::MAX as u128 * 1_000,
            liquidity in 1u128..=u128::MAX,
            fee in 0u64..=500_000_000,
            a_to_b in any::<bool>(),
            only_b in any::<bool>(),
        ) {
            let mode = if only_b { CollectFeeMode::OnlyB } else { CollectFeeMode::BothToken };
            let result = quote_swap(0, sqrt_price, liquidity, fee, a_to_b, mode).unwrap();
            prop_assert_eq!(result, SwapResult { amount_out: 0, total_fee: 0, next_sqrt_price: sqrt_price });
        }
    }
}
