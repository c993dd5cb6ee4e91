// src/data_pipeline/mod.rs

// Tout ce qui parle au RPC : le cœur de calcul ne reçoit que des octets déjà récupérés.
pub mod discovery;
pub mod onchain_scanner;
