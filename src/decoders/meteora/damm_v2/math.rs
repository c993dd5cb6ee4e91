// DANS : src/decoders/meteora/damm_v2/math.rs

use super::error::{DammV2Error, Result};

// Module à part : la macro utilise `Result<T, E>` non qualifié, que notre alias masquerait.
mod u256 {
    // Les produits L * sqrt_price et montant << 128 dépassent largement 128 bits.
    uint::construct_uint! { pub struct U256(4); }
}
pub use u256::U256;

/// Prix Q64.64 : 64 bits entiers, 64 bits fractionnaires.
pub const SCALE_OFFSET: usize = 64;
pub const RESOLUTION: usize = SCALE_OFFSET * 2;
pub const ONE_Q64: u128 = 1u128 << SCALE_OFFSET;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Rounding { Up, Down }

fn div_rounding(numerator: U256, denominator: U256, rounding: Rounding) -> Result<U256> {
    if denominator.is_zero() { return Err(DammV2Error::DivisionByZero); }
    let (quotient, remainder) = numerator.div_mod(denominator);
    match rounding {
        Rounding::Up if !remainder.is_zero() => Ok(quotient + U256::one()),
        _ => Ok(quotient),
    }
}

fn to_u128(value: U256) -> Result<u128> {
    u128::try_from(value).map_err(|_| DammV2Error::MathOverflow)
}

fn to_u64(value: U256) -> Result<u64> {
    u64::try_from(value).map_err(|_| DammV2Error::MathOverflow)
}

/// Prix après avoir injecté `amount_in` dans le pool.
/// A -> B : ceil(L * P / (L + amount * P)), arrondi en faveur du pool.
/// B -> A : P + floor((amount << 128) / L).
pub fn get_next_sqrt_price_from_input(amount_in: u64, sqrt_price: u128, liquidity: u128, a_to_b: bool) -> Result<u128> {
    if liquidity == 0 { return Err(DammV2Error::DivisionByZero); }
    let sqrt_price_u256 = U256::from(sqrt_price);
    let liquidity_u256 = U256::from(liquidity);
    let amount_in_u256 = U256::from(amount_in);
    if a_to_b {
        let product = amount_in_u256 * sqrt_price_u256;
        let denominator = liquidity_u256 + product;
        let numerator = liquidity_u256 * sqrt_price_u256;
        to_u128(div_rounding(numerator, denominator, Rounding::Up)?)
    } else {
        let quotient = (amount_in_u256 << RESOLUTION) / liquidity_u256;
        to_u128(sqrt_price_u256 + quotient)
    }
}

/// L * (high - low) / (high * low).
pub fn get_amount_a_from_liquidity_delta(liquidity: u128, upper_sqrt_price: u128, lower_sqrt_price: u128, rounding: Rounding) -> Result<u64> {
    let delta = upper_sqrt_price
        .checked_sub(lower_sqrt_price)
        .ok_or(DammV2Error::InvalidPrice("upper sqrt price below lower sqrt price"))?;
    let product = U256::from(liquidity) * U256::from(delta);
    let denominator = U256::from(upper_sqrt_price) * U256::from(lower_sqrt_price);
    to_u64(div_rounding(product, denominator, rounding)?)
}

/// L * (high - low) >> 128.
pub fn get_amount_b_from_liquidity_delta(liquidity: u128, upper_sqrt_price: u128, lower_sqrt_price: u128, rounding: Rounding) -> Result<u64> {
    let delta = upper_sqrt_price
        .checked_sub(lower_sqrt_price)
        .ok_or(DammV2Error::InvalidPrice("upper sqrt price below lower sqrt price"))?;
    let product = U256::from(liquidity) * U256::from(delta);
    to_u64(div_rounding(product, U256::one() << RESOLUTION, rounding)?)
}

/// Prix nécessaire pour sortir exactement `amount_out` du pool.
/// Échoue si le pool ne peut pas fournir ce montant au prix courant.
pub fn get_next_sqrt_price_from_output(sqrt_price: u128, liquidity: u128, amount_out: u64, output_is_token_b: bool) -> Result<u128> {
    if sqrt_price == 0 { return Err(DammV2Error::InvalidPrice("sqrt price must be > 0")); }
    let sqrt_price_u256 = U256::from(sqrt_price);
    let liquidity_u256 = U256::from(liquidity);
    let amount_out_u256 = U256::from(amount_out);

    if output_is_token_b {
        // P' = P - ceil((amount << 128) / L)
        let quotient = div_rounding(amount_out_u256 << RESOLUTION, liquidity_u256, Rounding::Up)?;
        let next = sqrt_price_u256
            .checked_sub(quotient)
            .ok_or(DammV2Error::InvalidPrice("sqrt price would be negative"))?;
        to_u128(next)
    } else {
        // P' = floor(L * P / (L - amount * P))
        if amount_out == 0 { return Ok(sqrt_price); }
        let product = amount_out_u256 * sqrt_price_u256;
        if product >= liquidity_u256 {
            return Err(DammV2Error::InvalidPrice("output exceeds available liquidity"));
        }
        let denominator = liquidity_u256 - product;
        let numerator = liquidity_u256 * sqrt_price_u256;
        to_u128(div_rounding(numerator, denominator, Rounding::Down)?)
    }
}

/// Prix "humain" de A en B. Affichage seulement, jamais utilisé dans un quote.
pub fn sqrt_price_to_price(sqrt_price: u128, decimals_a: u8, decimals_b: u8) -> f64 {
    let sqrt = sqrt_price as f64 / ONE_Q64 as f64;
    sqrt * sqrt * 10f64.powi(decimals_a as i32 - decimals_b as i32)
}
