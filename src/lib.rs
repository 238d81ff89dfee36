#![allow(clippy::useless_vec)]
#![allow(clippy::doc_lazy_continuation)]
// src/lib.rs

pub mod blockchain;
pub mod cli;
pub mod core;
// Vault balance, watch and deposit/withdraw actions
pub mod vault;
pub mod wallet;
