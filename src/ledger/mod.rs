pub mod types;
pub use types::*;
pub mod clock;
pub mod ids;
pub mod mock;

pub use clock::{Clock, ManualClock, SystemClock};
pub use mock::{MockLedgerClient, SimulationProfile};

use async_trait::async_trait;

/// Request/response surface of the RFQ bidding ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn create_rfq(&self, request: &RfqRequest) -> LedgerResult<TransactionResult>;
    async fn get_rfq(&self, id: &str) -> LedgerResult<RfqRecord>;
    async fn submit_bid(&self, request: &BidRequest) -> LedgerResult<TransactionResult>;
    async fn get_bid(&self, id: &str) -> LedgerResult<BidRecord>;
}
