use crate::core::domain::ObjectId;
use crate::core::errors::VaultError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9_]*|_[a-zA-Z0-9_]+)$")
        .expect("Hardcoded regex should always compile")
});

/// Validates a Move identifier (module or function name).
pub fn validate_identifier(ident: &str) -> Result<(), VaultError> {
    if IDENTIFIER.is_match(ident) {
        Ok(())
    } else {
        Err(VaultError::Builder(format!("Invalid Move identifier: '{}'", ident)))
    }
}

/// A fully qualified entry point, `package::module::function`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoveTarget {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
}

impl MoveTarget {
    pub fn new(
        package: ObjectId,
        module: impl Into<String>,
        function: impl Into<String>,
    ) -> Result<Self, VaultError> {
        let module = module.into();
        let function = function.into();
        validate_identifier(&module)?;
        validate_identifier(&function)?;
        Ok(Self { package, module, function })
    }
}

impl FromStr for MoveTarget {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split("::").collect();
        if parts.len() != 3 {
            return Err(VaultError::Builder(format!(
                "Move call target must be 'package::module::function', got '{}'",
                s
            )));
        }
        Self::new(parts[0].parse()?, parts[1], parts[2])
    }
}

impl fmt::Display for MoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}
