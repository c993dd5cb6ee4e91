// tests/damm_v2_quote.rs
//
// Du compte brut jusqu'au quote, uniquement via l'API publique.

use damm_quote::decoders::meteora::damm_v2::pool::{
    ACTIVATION_POINT_OFFSET, COLLECT_FEE_MODE_OFFSET, LIQUIDITY_OFFSET, POOL_STATE_DISCRIMINATOR, SQRT_PRICE_OFFSET,
};
use damm_quote::decoders::meteora::damm_v2::{
    decode_pool, encode_pool, CollectFeeMode, DammV2Error, FeeSchedulerMode, SwapResult, POOL_ACCOUNT_LEN,
};

const LIQUIDITY: u128 = 1_000_000_000_000u128 << 64;
const ONE_Q64: u128 = 1u128 << 64;

/// Pool à prix 1, planning linéaire : 10_000_000 au départ, -1_000_000 toutes les 60 s, 5 périodes max.
fn linear_schedule_account(collect_fee_mode: u8) -> Vec<u8> {
    let mut data = vec![0u8; POOL_ACCOUNT_LEN];
    data[..8].copy_from_slice(&POOL_STATE_DISCRIMINATOR);
    // base fee : cliff @8, mode @16, number_of_period @22, period_frequency @24, reduction @32
    data[8..16].copy_from_slice(&10_000_000u64.to_le_bytes());
    data[16] = 1;
    data[22..24].copy_from_slice(&5u16.to_le_bytes());
    data[24..32].copy_from_slice(&60u64.to_le_bytes());
    data[32..40].copy_from_slice(&1_000_000u64.to_le_bytes());
    data[LIQUIDITY_OFFSET..LIQUIDITY_OFFSET + 16].copy_from_slice(&LIQUIDITY.to_le_bytes());
    data[SQRT_PRICE_OFFSET..SQRT_PRICE_OFFSET + 16].copy_from_slice(&ONE_Q64.to_le_bytes());
    data[ACTIVATION_POINT_OFFSET..ACTIVATION_POINT_OFFSET + 8].copy_from_slice(&1_000u64.to_le_bytes());
    data[ACTIVATION_POINT_OFFSET + 8] = 1;
    data[COLLECT_FEE_MODE_OFFSET] = collect_fee_mode;
    data
}

#[test]
fn quote_b_to_a_fee_on_input_mid_schedule() {
    let pool = decode_pool(&linear_schedule_account(1)).unwrap();
    assert_eq!(FeeSchedulerMode::try_from(pool.pool_fees.base_fee.fee_scheduler_mode), Ok(FeeSchedulerMode::Linear));
    assert_eq!(CollectFeeMode::try_from(pool.collect_fee_mode), Ok(CollectFeeMode::OnlyB));

    // 150 s après l'activation : 2 périodes écoulées
    let quote = pool.quote(50_000_000, false, 1_150, false).unwrap();
    assert_eq!(quote.trade_fee_numerator, 8_000_000);
    assert!(quote.fee_mode.fee_on_input);
    assert_eq!(
        quote.result,
        SwapResult { amount_out: 49_597_539, total_fee: 400_000, next_sqrt_price: 18_447_659_032_215_607_609 }
    );
}

#[test]
fn quote_a_to_b_after_schedule_end() {
    let pool = decode_pool(&linear_schedule_account(1)).unwrap();
    let quote = pool.quote(50_000_000, true, 100_000, false).unwrap();
    assert_eq!(quote.trade_fee_numerator, 5_000_000);
    assert!(!quote.fee_mode.fee_on_input);
    assert_eq!(
        quote.result,
        SwapResult { amount_out: 49_747_512, total_fee: 249_988, next_sqrt_price: 18_445_821_782_620_420_595 }
    );
    assert_eq!(quote.fee_breakdown.lp_fee, 249_988);
}

#[test]
fn decoded_account_re_encodes_identically() {
    let data = linear_schedule_account(0);
    let pool = decode_pool(&data).unwrap();
    assert!(pool.has_pool_discriminator());
    assert_eq!(encode_pool(&pool), data);
}

#[test]
fn drained_pool_surfaces_division_by_zero() {
    let mut data = linear_schedule_account(0);
    data[LIQUIDITY_OFFSET..LIQUIDITY_OFFSET + 16].fill(0);
    let pool = decode_pool(&data).unwrap();
    assert_eq!(pool.quote(1_000, true, 2_000, false), Err(DammV2Error::DivisionByZero));
}
