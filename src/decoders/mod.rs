// src/decoders/mod.rs

// Chaque DEX a son propre sous-module : layout du compte, maths du swap, quote.
pub mod meteora;
