//! Sui programmable transaction wire types.
//!
//! Field and variant order matches the on-chain BCS layout; do not reorder.

use crate::core::domain::{ObjectDigest, ObjectId, SuiAddress};
use crate::core::errors::VaultError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type SequenceNumber = u64;

/// `(id, version, digest)`
pub type ObjectRef = (ObjectId, SequenceNumber, ObjectDigest);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    /// BCS bytes of a primitive value
    Pure(Vec<u8>),
    Object(ObjectArg),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectArg {
    ImmOrOwnedObject(ObjectRef),
    SharedObject {
        id: ObjectId,
        initial_shared_version: SequenceNumber,
        mutable: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveCall(Box<ProgrammableMoveCall>),
    TransferObjects(Vec<Argument>, Argument),
    SplitCoins(Argument, Vec<Argument>),
    MergeCoins(Argument, Vec<Argument>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Argument {
    /// The coin paying for gas
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableMoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionData {
    V1(TransactionDataV1),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDataV1 {
    pub kind: TransactionKind,
    pub sender: SuiAddress,
    pub gas_data: GasData,
    pub expiration: TransactionExpiration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    pub owner: SuiAddress,
    pub price: u64,
    pub budget: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionExpiration {
    None,
    Epoch(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructTag {
    pub address: SuiAddress,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

/// Split `a, b<c, d>, e` on top-level commas.
fn split_type_params(s: &str) -> Result<Vec<&str>, VaultError> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth < 0 {
                    return Err(VaultError::Decode(format!("unbalanced type parameters: '{}'", s)));
                }
            }
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(VaultError::Decode(format!("unbalanced type parameters: '{}'", s)));
    }
    parts.push(s[start..].trim());
    Ok(parts)
}

impl FromStr for TypeTag {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let tag = match s {
            "bool" => TypeTag::Bool,
            "u8" => TypeTag::U8,
            "u16" => TypeTag::U16,
            "u32" => TypeTag::U32,
            "u64" => TypeTag::U64,
            "u128" => TypeTag::U128,
            "u256" => TypeTag::U256,
            "address" => TypeTag::Address,
            "signer" => TypeTag::Signer,
            _ => match s.strip_prefix("vector<").and_then(|r| r.strip_suffix('>')) {
                Some(inner) => TypeTag::Vector(Box::new(inner.parse()?)),
                None => TypeTag::Struct(Box::new(s.parse()?)),
            },
        };
        Ok(tag)
    }
}

impl FromStr for StructTag {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, type_params) = match s.find('<') {
            Some(i) => {
                let inner = s[i + 1..]
                    .strip_suffix('>')
                    .ok_or_else(|| VaultError::Decode(format!("malformed struct tag: '{}'", s)))?;
                let params = split_type_params(inner)?
                    .into_iter()
                    .map(str::parse)
                    .collect::<Result<Vec<TypeTag>, _>>()?;
                (&s[..i], params)
            }
            None => (s, Vec::new()),
        };

        let parts: Vec<&str> = head.split("::").collect();
        if parts.len() != 3 || parts[1].is_empty() || parts[2].is_empty() {
            return Err(VaultError::Decode(format!("malformed struct tag: '{}'", s)));
        }

        Ok(StructTag {
            address: parts[0].parse()?,
            module: parts[1].to_string(),
            name: parts[2].to_string(),
            type_params,
        })
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::U8 => write!(f, "u8"),
            TypeTag::U16 => write!(f, "u16"),
            TypeTag::U32 => write!(f, "u32"),
            TypeTag::U64 => write!(f, "u64"),
            TypeTag::U128 => write!(f, "u128"),
            TypeTag::U256 => write!(f, "u256"),
            TypeTag::Address => write!(f, "address"),
            TypeTag::Signer => write!(f, "signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{}>", inner),
            TypeTag::Struct(tag) => write!(f, "{}", tag),
        }
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)?;
        if !self.type_params.is_empty() {
            let params: Vec<String> = self.type_params.iter().map(ToString::to_string).collect();
            write!(f, "<{}>", params.join(", "))?;
        }
        Ok(())
    }
}
