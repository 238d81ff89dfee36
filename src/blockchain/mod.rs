pub mod sui;
pub mod traits;

pub use sui::{SuiClient, TransactionBlock};
pub use traits::SuiReadApi;
