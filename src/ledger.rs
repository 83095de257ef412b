//! Seam between the arena client and the chain: the browser wallet extension
//! that signs, and the fullnode client that answers queries.

use crate::types::{
    Address,
    ObjectId,
    TxDigest,
};
use color_eyre::eyre::Result;
use serde::{
    Deserialize,
    Serialize,
};
use std::future::Future;

pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";
pub const KIOSK_LISTING_PREFIX: &str = "0x2::kiosk::Listing<";

/// Argument to a move call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CallArg {
    Object(ObjectId),
    U64(u64),
    U8(u8),
    String(String),
    /// Output of an earlier command in the same transaction.
    Result(u16),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub type_arguments: Vec<String>,
    pub arguments: Vec<CallArg>,
}

impl MoveCall {
    pub fn new(package: &ObjectId, module: &str, function: &str) -> Self {
        Self {
            package: package.clone(),
            module: module.to_string(),
            function: function.to_string(),
            type_arguments: Vec::new(),
            arguments: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: CallArg) -> Self {
        self.arguments.push(arg);
        self
    }

    pub fn type_arg(mut self, type_tag: impl Into<String>) -> Self {
        self.type_arguments.push(type_tag.into());
        self
    }

    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    MoveCall(MoveCall),
    /// Splits the given amounts off the gas coin.
    SplitGas { amounts: Vec<u64> },
}

/// Unsigned transaction handed to the wallet for approval.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIntent {
    pub commands: Vec<Command>,
}

impl TransactionIntent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(call: MoveCall) -> Self {
        Self {
            commands: vec![Command::MoveCall(call)],
        }
    }

    /// Appends a command and returns a reference to its result.
    pub fn push(&mut self, command: Command) -> CallArg {
        let index = self.commands.len() as u16;
        self.commands.push(command);
        CallArg::Result(index)
    }

    pub fn move_calls(&self) -> impl Iterator<Item = &MoveCall> {
        self.commands.iter().filter_map(|command| match command {
            Command::MoveCall(call) => Some(call),
            Command::SplitGas { .. } => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failure(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: u64,
}

/// Effects of a finalized transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEffects {
    pub digest: TxDigest,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub created: Vec<ObjectRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevInspectResults {
    pub status: ExecutionStatus,
    /// BCS encoded return values of the first command.
    #[serde(default)]
    pub return_values: Vec<Vec<u8>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinObject {
    pub coin_object_id: ObjectId,
    pub balance: u64,
}

/// Move object with its content fields as returned by the fullnode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveObject {
    pub object_id: ObjectId,
    #[serde(rename = "type")]
    pub type_: String,
    pub fields: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicField {
    pub object_id: ObjectId,
    pub object_type: String,
    pub name: serde_json::Value,
}

/// Browser wallet extension.
pub trait WalletProvider {
    /// Names of the wallets registered with the page.
    fn wallets(&self) -> Vec<String>;

    /// Runs the approval flow and yields the approved account.
    fn connect(&self, wallet: &str) -> impl Future<Output = Result<Address>> + Send;

    fn disconnect(&self) -> impl Future<Output = Result<()>> + Send;

    /// Asks the user to approve, then executes the transaction.
    fn sign_and_execute(
        &self,
        intent: &TransactionIntent,
    ) -> impl Future<Output = Result<TxDigest>> + Send;
}

/// Fullnode client.
pub trait Ledger {
    fn coins(
        &self,
        owner: &Address,
        coin_type: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<CoinObject>>> + Send;

    fn balance(
        &self,
        owner: &Address,
        coin_type: &str,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Resolves once the transaction is final.
    fn wait_for_transaction(
        &self,
        digest: &TxDigest,
    ) -> impl Future<Output = Result<TransactionEffects>> + Send;

    fn dev_inspect(
        &self,
        sender: &Address,
        intent: &TransactionIntent,
    ) -> impl Future<Output = Result<DevInspectResults>> + Send;

    fn owned_objects(
        &self,
        owner: &Address,
        struct_type: &str,
    ) -> impl Future<Output = Result<Vec<MoveObject>>> + Send;

    fn dynamic_fields(
        &self,
        parent: &ObjectId,
    ) -> impl Future<Output = Result<Vec<DynamicField>>> + Send;

    fn object(&self, id: &ObjectId) -> impl Future<Output = Result<Option<MoveObject>>> + Send;
}
