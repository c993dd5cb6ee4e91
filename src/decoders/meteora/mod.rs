// DANS: src/decoders/meteora/mod.rs

pub mod damm_v2;
