//! Decoding of Move return values reported by dev-inspect.

use super::types::TypeTag;
use crate::core::errors::VaultError;
use tracing::debug;

/// Decodes BCS-encoded return values into numbers.
///
/// The node reports its RPC API version alongside results; every released
/// version shares the primitive BCS layout, so the version only travels with
/// the decoder for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnValueDecoder {
    api_version: Option<String>,
}

impl ReturnValueDecoder {
    pub fn for_api_version(version: Option<String>) -> Self {
        Self { api_version: version }
    }

    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// Decode `bytes` as the numeric Move type named by `type_tag`.
    pub fn decode_u64(&self, bytes: &[u8], type_tag: &str) -> Result<u64, VaultError> {
        let tag: TypeTag = type_tag.parse()?;
        debug!(
            type_tag = %tag,
            len = bytes.len(),
            api_version = self.api_version.as_deref().unwrap_or("unknown"),
            "decoding return value"
        );

        let value = match tag {
            TypeTag::Bool => u64::from(decode::<bool>(bytes)?),
            TypeTag::U8 => u64::from(decode::<u8>(bytes)?),
            TypeTag::U16 => u64::from(decode::<u16>(bytes)?),
            TypeTag::U32 => u64::from(decode::<u32>(bytes)?),
            TypeTag::U64 => decode::<u64>(bytes)?,
            TypeTag::U128 => {
                let wide = decode::<u128>(bytes)?;
                u64::try_from(wide)
                    .map_err(|_| VaultError::Decode(format!("u128 value {} overflows u64", wide)))?
            }
            TypeTag::U256 => decode_u256(bytes)?,
            other => {
                return Err(VaultError::Decode(format!(
                    "unsupported return type '{}', expected an integer",
                    other
                )))
            }
        };
        Ok(value)
    }
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, VaultError> {
    bcs::from_bytes(bytes).map_err(|e| VaultError::Decode(e.to_string()))
}

/// u256 is 32 little-endian bytes.
fn decode_u256(bytes: &[u8]) -> Result<u64, VaultError> {
    if bytes.len() != 32 {
        return Err(VaultError::Decode(format!("u256 needs 32 bytes, got {}", bytes.len())));
    }
    if bytes[8..].iter().any(|b| *b != 0) {
        return Err(VaultError::Decode("u256 value overflows u64".to_string()));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&bytes[..8]);
    Ok(u64::from_le_bytes(low))
}
