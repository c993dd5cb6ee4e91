// src/data_pipeline/discovery/mod.rs

// Un fichier par type de pool à retrouver on-chain à partir d'une paire de mints.
pub mod meteora_damm_v2;
