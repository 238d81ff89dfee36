//! External transaction signers
//!
//! Key material never enters this process. A signer receives the BCS bytes
//! of the transaction data and returns a serialized Sui signature (base64
//! of `flag || signature || public key`).

use crate::core::config::SignerConfig;
use crate::core::domain::SuiAddress;
use crate::core::errors::VaultError;
use async_trait::async_trait;
use base64::Engine as _;
use serde_json::Value;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Sign `tx_data` for `signer` and return the base64 serialized signature.
    async fn sign_transaction(
        &self,
        signer: &SuiAddress,
        tx_data: &[u8],
    ) -> Result<String, VaultError>;
}

/// Runs an external program to sign, e.g.
/// `sui keytool sign --address {address} --data {tx_bytes} --json`.
///
/// `{address}` and `{tx_bytes}` are substituted in the arguments. Without a
/// `{tx_bytes}` placeholder the base64 bytes are written to stdin instead.
/// Stdout is either a JSON object carrying `suiSignature` or the bare
/// base64 signature.
#[derive(Debug, Clone)]
pub struct CommandSigner {
    program: String,
    args: Vec<String>,
}

impl CommandSigner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    pub fn from_config(config: &SignerConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    fn render_args(&self, signer: &SuiAddress, tx_bytes: &str) -> (Vec<String>, bool) {
        let mut uses_placeholder = false;
        let args = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains("{tx_bytes}") {
                    uses_placeholder = true;
                }
                arg.replace("{address}", &signer.to_string()).replace("{tx_bytes}", tx_bytes)
            })
            .collect();
        (args, uses_placeholder)
    }
}

/// Pull the signature out of the signer's stdout.
pub(crate) fn parse_signer_output(stdout: &str) -> Result<String, VaultError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(VaultError::Signer("signer produced no output".to_string()));
    }

    let signature = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => map
            .get("suiSignature")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                VaultError::Signer("signer JSON output has no 'suiSignature'".to_string())
            })?,
        _ => trimmed.lines().last().unwrap_or_default().trim().to_string(),
    };

    base64::engine::general_purpose::STANDARD
        .decode(&signature)
        .map_err(|e| VaultError::Signer(format!("signature is not base64: {}", e)))?;
    Ok(signature)
}

#[async_trait]
impl TransactionSigner for CommandSigner {
    async fn sign_transaction(
        &self,
        signer: &SuiAddress,
        tx_data: &[u8],
    ) -> Result<String, VaultError> {
        let tx_bytes = base64::engine::general_purpose::STANDARD.encode(tx_data);
        let (args, uses_placeholder) = self.render_args(signer, &tx_bytes);
        info!(program = %self.program, signer = %signer, "requesting signature from external signer");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VaultError::Signer(format!("failed to start '{}': {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            if !uses_placeholder {
                stdin
                    .write_all(tx_bytes.as_bytes())
                    .await
                    .map_err(|e| VaultError::Signer(format!("failed to write to signer: {}", e)))?;
            }
            // dropping stdin closes the pipe
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| VaultError::Signer(format!("signer did not finish: {}", e)))?;

        if !output.status.success() {
            return Err(VaultError::Signer(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(len = stdout.len(), "signer finished");
        parse_signer_output(&stdout)
    }
}
