// src/lib.rs

// Le cœur (décodage + quote) est dans `decoders` et ne fait aucune I/O.
// `data_pipeline` va chercher les octets des comptes sur le RPC.
pub mod config;
pub mod data_pipeline;
pub mod decoders;
pub mod monitoring;
