use crate::error::{
    ChainError,
    Result,
};
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};
use std::{
    fmt,
    str::FromStr,
};

pub const MIST_PER_SUI: u64 = 1_000_000_000;
pub const ODDS_SCALE: u64 = 1_000_000;
pub const MIN_PARTICIPANT_ID: u8 = 1;
pub const MAX_PARTICIPANT_ID: u8 = 8;

/// Hex encoded 32 byte ledger object id, always stored with a `0x` prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ObjectId {
    type Err = ChainError;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .ok_or_else(|| ChainError::InvalidInput(format!("object id '{raw}' lacks 0x")))?;
        if digits.is_empty() || digits.len() > 64 {
            return Err(ChainError::InvalidInput(format!(
                "object id '{raw}' has {} hex digits",
                digits.len()
            )));
        }
        // Short ids such as `0x2` are left padded the way the ledger does.
        let padded = format!("{digits:0>64}");
        let bytes = hex::decode(&padded)
            .map_err(|e| ChainError::InvalidInput(format!("object id '{raw}': {e}")))?;
        let mut id = [0u8; 32];
        id.copy_from_slice(&bytes);
        Ok(Self::from_bytes(id))
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account address; shares the object id encoding.
pub type Address = ObjectId;

pub fn zero_address() -> Address {
    ObjectId::from_bytes([0u8; 32])
}

/// Id of the betting pool object created on chain for a match.
pub type ChainGameId = ObjectId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxDigest(pub String);

impl fmt::Display for TxDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room id handed out by the game server. The iframe sends it either as a
/// string or as a bare number, both are accepted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BackendRoomId(String);

impl BackendRoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for BackendRoomId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        let id = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        };
        if id.trim().is_empty() {
            return Err(serde::de::Error::custom("room id must not be empty"));
        }
        Ok(Self(id))
    }
}

impl fmt::Display for BackendRoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Arena participant slot accepted by the betting module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ParticipantId(u8);

impl ParticipantId {
    pub fn new(id: u8) -> Result<Self> {
        if (MIN_PARTICIPANT_ID..=MAX_PARTICIPANT_ID).contains(&id) {
            Ok(Self(id))
        } else {
            Err(ChainError::InvalidInput(format!(
                "participant id {id} outside {MIN_PARTICIPANT_ID}..={MAX_PARTICIPANT_ID}"
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u64> for ParticipantId {
    type Error = ChainError;

    fn try_from(raw: u64) -> Result<Self> {
        let id = u8::try_from(raw).map_err(|_| {
            ChainError::InvalidInput(format!("participant id {raw} does not fit in u8"))
        })?;
        Self::new(id)
    }
}

impl From<ParticipantId> for u64 {
    fn from(id: ParticipantId) -> Self {
        u64::from(id.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spendable coin picked by the gateway. Moved into the transaction that spends it.
#[derive(Debug, PartialEq, Eq)]
pub struct CoinHandle {
    pub object_id: ObjectId,
    pub balance: u64,
}

/// Bet submitted to the wallet but not yet final on chain. Never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingBet {
    pub game: ChainGameId,
    pub participant: ParticipantId,
    pub amount: u64,
    pub coin: ObjectId,
    pub submitted_at: DateTime<Utc>,
}

pub fn sui_to_mist(sui: f64) -> Option<u64> {
    if !sui.is_finite() || sui < 0.0 {
        return None;
    }
    let mist = (sui * MIST_PER_SUI as f64).floor();
    if mist > u64::MAX as f64 {
        return None;
    }
    Some(mist as u64)
}

pub fn mist_to_sui(mist: u64) -> f64 {
    mist as f64 / MIST_PER_SUI as f64
}
