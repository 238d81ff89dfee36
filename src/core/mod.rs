pub mod config;
pub mod domain;
pub mod errors;
pub mod result_ext;
pub mod validation;

pub use config::VaultConfig;
pub use domain::{ObjectDigest, ObjectId, SuiAddress, MIST_PER_SUI};
pub use errors::VaultError;
