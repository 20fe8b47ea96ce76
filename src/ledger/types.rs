use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RFQ_STATUS_OPEN: &str = "open";
pub const BID_STATUS_SUBMITTED: &str = "submitted";

pub const RFQ_ID_PREFIX: &str = "RFQ";
pub const BID_ID_PREFIX: &str = "BID";

pub const RFQ_CREATED_MESSAGE: &str = "RFQ created successfully on blockchain";
pub const BID_SUBMITTED_MESSAGE: &str = "Bid submitted successfully on blockchain";

// RFQ as submitted by the frontend. Nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RfqRequest {
    pub title: String,
    pub scope: String,
    pub deadline: String,
    pub evaluation_criteria: String,
    pub budget: String,
    pub category: String,
    pub location: String,
}

// RFQ as read back from the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqRecord {
    pub id: String,
    pub title: String,
    pub scope: String,
    /// ISO-8601, millisecond precision, `Z` suffix.
    pub deadline: String,
    pub evaluation_criteria: String,
    pub budget: String,
    pub category: String,
    pub location: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BidRequest {
    /// Not checked against any existing RFQ.
    pub rfq_id: String,
    pub price: String,
    pub timeline: String,
    pub qualifications: String,
    pub document_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRecord {
    pub id: String,
    pub rfq_id: String,
    pub price: String,
    pub timeline: String,
    pub qualifications: String,
    pub document_hash: String,
    pub status: String,
}

/// Id of the entity a transaction created, keyed by kind on the wire
/// (`rfqId` / `bidId`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityId {
    #[serde(rename = "rfqId")]
    Rfq(String),
    #[serde(rename = "bidId")]
    Bid(String),
}

impl EntityId {
    pub fn as_str(&self) -> &str {
        match self {
            EntityId::Rfq(id) | EntityId::Bid(id) => id,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            EntityId::Rfq(id) | EntityId::Bid(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub success: bool,
    #[serde(flatten)]
    pub entity: EntityId,
    pub tx_hash: String,
    pub message: String,
}

impl TransactionResult {
    pub fn id(&self) -> &str {
        self.entity.as_str()
    }
}

// Fetch envelopes as the frontend receives them: `{"success": true, "rfq": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfqResponse {
    pub success: bool,
    pub rfq: RfqRecord,
}

impl From<RfqRecord> for RfqResponse {
    fn from(rfq: RfqRecord) -> Self {
        Self { success: true, rfq }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidResponse {
    pub success: bool,
    pub bid: BidRecord,
}

impl From<BidRecord> for BidResponse {
    fn from(bid: BidRecord) -> Self {
        Self { success: true, bid }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateRfq,
    GetRfq,
    SubmitBid,
    GetBid,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateRfq => "create_rfq",
            Operation::GetRfq => "get_rfq",
            Operation::SubmitBid => "submit_bid",
            Operation::GetBid => "get_bid",
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Operation::CreateRfq | Operation::SubmitBid)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that went wrong inside a simulated ledger call.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    #[error("clock reported {0}, which is before the Unix epoch")]
    ClockBeforeEpoch(DateTime<Utc>),
    #[error("deadline {days} days after {from} is out of range")]
    DeadlineOverflow { from: DateTime<Utc>, days: u32 },
}

/// Operation-level failure. The message names the ledger call and embeds the cause.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Failed to create RFQ on blockchain: {0}")]
    CreateRfq(#[source] Fault),
    #[error("Failed to fetch RFQ from blockchain: {0}")]
    GetRfq(#[source] Fault),
    #[error("Failed to submit bid on blockchain: {0}")]
    SubmitBid(#[source] Fault),
    #[error("Failed to fetch bid from blockchain: {0}")]
    GetBid(#[source] Fault),
}

impl LedgerError {
    pub fn wrap(op: Operation, fault: Fault) -> Self {
        match op {
            Operation::CreateRfq => LedgerError::CreateRfq(fault),
            Operation::GetRfq => LedgerError::GetRfq(fault),
            Operation::SubmitBid => LedgerError::SubmitBid(fault),
            Operation::GetBid => LedgerError::GetBid(fault),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            LedgerError::CreateRfq(_) => Operation::CreateRfq,
            LedgerError::GetRfq(_) => Operation::GetRfq,
            LedgerError::SubmitBid(_) => Operation::SubmitBid,
            LedgerError::GetBid(_) => Operation::GetBid,
        }
    }

    pub fn fault(&self) -> &Fault {
        match self {
            LedgerError::CreateRfq(f)
            | LedgerError::GetRfq(f)
            | LedgerError::SubmitBid(f)
            | LedgerError::GetBid(f) => f,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
