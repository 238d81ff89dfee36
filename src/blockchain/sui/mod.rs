//! Sui full node access: JSON-RPC client, transaction building and
//! return value decoding.

pub mod builder;
pub mod client;
pub mod decode;
pub mod rpc_types;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use builder::TransactionBlock;
pub use client::{SuiClient, SUI_COIN_TYPE};
pub use decode::ReturnValueDecoder;
pub use rpc_types::{
    DevInspectResults, ExecuteRequestType, TransactionBlockResponse, TransactionResponseOptions,
};
