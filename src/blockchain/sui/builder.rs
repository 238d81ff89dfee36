//! Programmable transaction block builder.
//!
//! Inputs are collected unresolved: object ids become concrete object
//! arguments only when the block is built against a node, which fills in
//! versions, digests, shared-object metadata and mutability.

use super::client::SUI_COIN_TYPE;
use super::rpc_types::{NormalizedMoveFunction, Owner};
use super::types::{
    Argument, CallArg, Command, GasData, ObjectArg, ObjectRef, ProgrammableMoveCall,
    ProgrammableTransaction, TransactionData, TransactionDataV1, TransactionExpiration,
    TransactionKind, TypeTag,
};
use crate::blockchain::traits::SuiReadApi;
use crate::core::domain::{ObjectId, SuiAddress};
use crate::core::errors::VaultError;
use crate::core::validation::MoveTarget;
use base64::Engine as _;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Upper bound on gas payment objects per transaction.
const MAX_GAS_OBJECTS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BuilderInput {
    Pure(Vec<u8>),
    Object(ObjectId),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionBlock {
    inputs: Vec<BuilderInput>,
    commands: Vec<Command>,
    sender: Option<SuiAddress>,
    gas_budget: Option<u64>,
    gas_price: Option<u64>,
    gas_payment: Option<Vec<ObjectRef>>,
}

impl TransactionBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The coin that pays for gas.
    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    /// A `u64` pure input.
    pub fn pure_u64(&mut self, value: u64) -> Argument {
        self.pure_bytes(value.to_le_bytes().to_vec())
    }

    /// A pure input from already BCS-encoded bytes.
    pub fn pure_bytes(&mut self, bcs_bytes: Vec<u8>) -> Argument {
        self.push_input(BuilderInput::Pure(bcs_bytes))
    }

    /// An object input. The same id always maps to the same input.
    pub fn object(&mut self, id: ObjectId) -> Argument {
        let existing = self
            .inputs
            .iter()
            .position(|input| matches!(input, BuilderInput::Object(o) if *o == id));
        match existing {
            Some(index) => Argument::Input(index as u16),
            None => self.push_input(BuilderInput::Object(id)),
        }
    }

    /// Split `amounts` off `coin`. Each new coin is a nested result of the
    /// returned argument.
    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> Argument {
        self.push_command(Command::SplitCoins(coin, amounts))
    }

    pub fn move_call(
        &mut self,
        target: MoveTarget,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> Argument {
        self.push_command(Command::MoveCall(Box::new(ProgrammableMoveCall {
            package: target.package,
            module: target.module,
            function: target.function,
            type_arguments,
            arguments,
        })))
    }

    /// The `index`-th value produced by command result `result`.
    pub fn nested_result(result: Argument, index: u16) -> Result<Argument, VaultError> {
        match result {
            Argument::Result(cmd) => Ok(Argument::NestedResult(cmd, index)),
            other => Err(VaultError::Builder(format!(
                "{:?} is not a command result",
                other
            ))),
        }
    }

    pub fn set_sender(&mut self, sender: SuiAddress) {
        self.sender = Some(sender);
    }

    pub fn set_gas_budget(&mut self, budget: u64) {
        self.gas_budget = Some(budget);
    }

    pub fn set_gas_price(&mut self, price: u64) {
        self.gas_price = Some(price);
    }

    pub fn set_gas_payment(&mut self, payment: Vec<ObjectRef>) {
        self.gas_payment = Some(payment);
    }

    pub fn sender(&self) -> Option<SuiAddress> {
        self.sender
    }

    pub fn gas_budget(&self) -> Option<u64> {
        self.gas_budget
    }

    pub fn inputs(&self) -> &[BuilderInput] {
        &self.inputs
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    fn push_input(&mut self, input: BuilderInput) -> Argument {
        self.inputs.push(input);
        Argument::Input((self.inputs.len() - 1) as u16)
    }

    fn push_command(&mut self, command: Command) -> Argument {
        self.commands.push(command);
        Argument::Result((self.commands.len() - 1) as u16)
    }

    fn object_ids(&self) -> Vec<ObjectId> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                BuilderInput::Object(id) => Some(*id),
                BuilderInput::Pure(_) => None,
            })
            .collect()
    }

    /// MIST split off the gas coin by pure `u64` amounts. Any other amount
    /// argument is only known on-chain and is not counted.
    fn gas_coin_spend(&self) -> u64 {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::SplitCoins(Argument::GasCoin, amounts) => Some(amounts),
                _ => None,
            })
            .flatten()
            .filter_map(|amount| match amount {
                Argument::Input(index) => match self.inputs.get(*index as usize) {
                    Some(BuilderInput::Pure(bytes)) => {
                        <[u8; 8]>::try_from(bytes.as_slice()).ok().map(u64::from_le_bytes)
                    }
                    _ => None,
                },
                _ => None,
            })
            .fold(0u64, u64::saturating_add)
    }

    fn check_limits(&self) -> Result<(), VaultError> {
        let limit = u16::MAX as usize + 1;
        if self.inputs.len() > limit || self.commands.len() > limit {
            return Err(VaultError::Builder("too many inputs or commands".to_string()));
        }
        Ok(())
    }

    /// Resolve inputs and produce the transaction kind.
    pub async fn build_kind(&self, api: &dyn SuiReadApi) -> Result<TransactionKind, VaultError> {
        self.check_limits()?;
        let inputs = self.resolve_inputs(api).await?;
        Ok(TransactionKind::ProgrammableTransaction(ProgrammableTransaction {
            inputs,
            commands: self.commands.clone(),
        }))
    }

    /// Base64 BCS of the transaction kind, the form dev-inspect accepts.
    pub async fn build_kind_base64(&self, api: &dyn SuiReadApi) -> Result<String, VaultError> {
        let kind = self.build_kind(api).await?;
        Ok(base64::engine::general_purpose::STANDARD.encode(bcs::to_bytes(&kind)?))
    }

    /// Full transaction data ready for signing. Gas price and payment are
    /// fetched from the node unless set explicitly.
    pub async fn build(&self, api: &dyn SuiReadApi) -> Result<TransactionData, VaultError> {
        let sender = self
            .sender
            .ok_or_else(|| VaultError::Builder("sender is not set".to_string()))?;
        let budget = self
            .gas_budget
            .ok_or_else(|| VaultError::Builder("gas budget is not set".to_string()))?;

        let kind = self.build_kind(api).await?;

        let price = match self.gas_price {
            Some(price) => price,
            None => api.get_reference_gas_price().await?,
        };

        let payment = match &self.gas_payment {
            Some(payment) => payment.clone(),
            None => {
                let required = budget.saturating_add(self.gas_coin_spend());
                select_gas_coins(api, &sender, required, &self.object_ids()).await?
            }
        };

        Ok(TransactionData::V1(TransactionDataV1 {
            kind,
            sender,
            gas_data: GasData { payment, owner: sender, price, budget },
            expiration: TransactionExpiration::None,
        }))
    }

    /// BCS bytes of [`TransactionBlock::build`].
    pub async fn build_bytes(&self, api: &dyn SuiReadApi) -> Result<Vec<u8>, VaultError> {
        let data = self.build(api).await?;
        Ok(bcs::to_bytes(&data)?)
    }

    async fn resolve_inputs(&self, api: &dyn SuiReadApi) -> Result<Vec<CallArg>, VaultError> {
        let object_ids = self.object_ids();
        let responses = api.multi_get_objects(&object_ids).await?;
        if responses.len() != object_ids.len() {
            return Err(VaultError::Deserialization(format!(
                "requested {} objects, node returned {}",
                object_ids.len(),
                responses.len()
            )));
        }
        let mut objects = object_ids.iter().zip(responses);

        let mut functions: HashMap<MoveTarget, NormalizedMoveFunction> = HashMap::new();
        let mut resolved = Vec::with_capacity(self.inputs.len());

        for (index, input) in self.inputs.iter().enumerate() {
            let arg = match input {
                BuilderInput::Pure(bytes) => CallArg::Pure(bytes.clone()),
                BuilderInput::Object(id) => {
                    let (_, response) = objects
                        .next()
                        .ok_or_else(|| VaultError::ObjectNotFound(id.to_string()))?;
                    let data = response
                        .data
                        .ok_or_else(|| VaultError::ObjectNotFound(id.to_string()))?;

                    match &data.owner {
                        Some(Owner::Shared { initial_shared_version }) => {
                            let initial_shared_version = *initial_shared_version;
                            let mutable =
                                self.input_is_mutable(index as u16, api, &mut functions).await?;
                            debug!(object = %id, initial_shared_version, mutable, "resolved shared object");
                            CallArg::Object(ObjectArg::SharedObject {
                                id: *id,
                                initial_shared_version,
                                mutable,
                            })
                        }
                        _ => {
                            debug!(object = %id, version = data.version, "resolved owned object");
                            CallArg::Object(ObjectArg::ImmOrOwnedObject(data.object_ref()))
                        }
                    }
                }
            };
            resolved.push(arg);
        }

        Ok(resolved)
    }

    /// A shared input needs mutable access if any command may mutate it.
    async fn input_is_mutable(
        &self,
        index: u16,
        api: &dyn SuiReadApi,
        functions: &mut HashMap<MoveTarget, NormalizedMoveFunction>,
    ) -> Result<bool, VaultError> {
        let input = Argument::Input(index);
        let mut mutable = false;

        for command in &self.commands {
            match command {
                Command::MoveCall(call) => {
                    for (position, arg) in call.arguments.iter().enumerate() {
                        if *arg != input {
                            continue;
                        }
                        let target = MoveTarget {
                            package: call.package,
                            module: call.module.clone(),
                            function: call.function.clone(),
                        };
                        if !functions.contains_key(&target) {
                            let normalized = api.get_normalized_move_function(&target).await?;
                            functions.insert(target.clone(), normalized);
                        }
                        if functions[&target].parameter_is_mutable(position) {
                            mutable = true;
                        }
                    }
                }
                Command::SplitCoins(coin, _) | Command::MergeCoins(coin, _) => {
                    if *coin == input {
                        mutable = true;
                    }
                }
                Command::TransferObjects(objects, _) => {
                    if objects.contains(&input) {
                        mutable = true;
                    }
                }
            }
        }

        Ok(mutable)
    }
}

/// Pay with every SUI coin `owner` holds, up to [`MAX_GAS_OBJECTS`], so the
/// merged gas coin can cover both the budget and any amounts split off it.
/// Coins that are also transaction inputs are skipped.
async fn select_gas_coins(
    api: &dyn SuiReadApi,
    owner: &SuiAddress,
    required: u64,
    exclude: &[ObjectId],
) -> Result<Vec<ObjectRef>, VaultError> {
    let mut selected = Vec::new();
    let mut total: u64 = 0;
    let mut cursor: Option<String> = None;

    'pages: loop {
        let page = api.get_coins(owner, SUI_COIN_TYPE, cursor.as_deref()).await?;
        for coin in page.data.iter().filter(|c| !exclude.contains(&c.coin_object_id)) {
            if selected.len() >= MAX_GAS_OBJECTS {
                break 'pages;
            }
            selected.push(coin.object_ref());
            total = total.saturating_add(coin.balance);
        }
        if !page.has_next_page || page.next_cursor.is_none() {
            break;
        }
        cursor = page.next_cursor;
    }

    if total < required {
        return Err(VaultError::Builder(format!(
            "insufficient SUI for gas: have {} MIST, need {}",
            total, required
        )));
    }
    debug!(coins = selected.len(), total, required, "selected gas payment");
    Ok(selected)
}
