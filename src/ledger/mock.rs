use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use tracing::{debug, error, info, instrument};

use crate::ledger::clock::{Clock, SystemClock};
use crate::ledger::ids;
use crate::ledger::types::*;
use crate::ledger::LedgerClient;

pub const DEFAULT_WRITE_LATENCY: Duration = Duration::from_millis(1000);
pub const DEFAULT_READ_LATENCY: Duration = Duration::from_millis(500);
pub const DEFAULT_DEADLINE_DAYS: u32 = 30;

/// How the mock pretends to be a ledger: per-call latency and the deadline
/// horizon stamped on fetched RFQs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationProfile {
    pub write_latency: Duration,
    pub read_latency: Duration,
    pub deadline_days: u32,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        Self {
            write_latency: DEFAULT_WRITE_LATENCY,
            read_latency: DEFAULT_READ_LATENCY,
            deadline_days: DEFAULT_DEADLINE_DAYS,
        }
    }
}

impl SimulationProfile {
    fn latency_for(&self, op: Operation) -> Duration {
        if op.is_write() {
            self.write_latency
        } else {
            self.read_latency
        }
    }
}

/// Ledger client that never talks to a ledger. Every call waits out the
/// simulated latency and returns fabricated data; nothing is remembered between calls.
pub struct MockLedgerClient<C: Clock = SystemClock> {
    clock: Arc<C>,
    profile: SimulationProfile,
}

impl<C: Clock> Clone for MockLedgerClient<C> {
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
            profile: self.profile,
        }
    }
}

impl MockLedgerClient<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), SimulationProfile::default())
    }
}

impl Default for MockLedgerClient<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MockLedgerClient<C> {
    pub fn with_clock(clock: Arc<C>, profile: SimulationProfile) -> Self {
        Self { clock, profile }
    }

    pub fn profile(&self) -> &SimulationProfile {
        &self.profile
    }

    async fn simulate_latency(&self, op: Operation) {
        let latency = self.profile.latency_for(op);
        metrics::counter!("rfq_ledger_requests_total", "op" => op.as_str()).increment(1);
        metrics::histogram!("rfq_ledger_simulated_latency_ms", "op" => op.as_str())
            .record(latency.as_secs_f64() * 1000.0);
        self.clock.sleep(latency).await;
    }

    // Operation boundary: log the fault and wrap it with the operation that failed
    fn finish<T>(op: Operation, result: Result<T, Fault>) -> LedgerResult<T> {
        result.map_err(|fault| {
            error!(op = %op, error = %fault, "ledger call failed");
            metrics::counter!("rfq_ledger_failures_total", "op" => op.as_str()).increment(1);
            LedgerError::wrap(op, fault)
        })
    }

    fn fabricate_transaction(
        &self,
        prefix: &str,
        keyed: fn(String) -> EntityId,
        message: &str,
    ) -> Result<TransactionResult, Fault> {
        let mut rng = rand::thread_rng();
        let id = ids::entity_id(prefix, self.clock.now(), &mut rng)?;
        let tx_hash = ids::tx_hash(&mut rng);
        debug!(%id, %tx_hash, "fabricated transaction");
        Ok(TransactionResult {
            success: true,
            entity: keyed(id),
            tx_hash,
            message: message.to_string(),
        })
    }

    fn fabricate_rfq(&self, id: &str) -> Result<RfqRecord, Fault> {
        let now = self.clock.now();
        let days = self.profile.deadline_days;
        let deadline = chrono::Duration::try_days(i64::from(days))
            .and_then(|horizon| now.checked_add_signed(horizon))
            .ok_or(Fault::DeadlineOverflow { from: now, days })?;

        Ok(RfqRecord {
            id: id.to_string(),
            title: "Sample RFQ".into(),
            scope: "Sample project scope".into(),
            deadline: deadline.to_rfc3339_opts(SecondsFormat::Millis, true),
            evaluation_criteria: "Sample criteria".into(),
            budget: "10000".into(),
            category: "Technology".into(),
            location: "Remote".into(),
            status: RFQ_STATUS_OPEN.into(),
        })
    }

    fn fabricate_bid(&self, id: &str) -> BidRecord {
        BidRecord {
            id: id.to_string(),
            rfq_id: "RFQ_123".into(),
            price: "9500".into(),
            timeline: "3 months".into(),
            qualifications: "Experienced contractor".into(),
            document_hash: "0x1234567890abcdef".into(),
            status: BID_STATUS_SUBMITTED.into(),
        }
    }
}

#[async_trait]
impl<C: Clock + 'static> LedgerClient for MockLedgerClient<C> {
    #[instrument(skip_all, fields(title = %request.title))]
    async fn create_rfq(&self, request: &RfqRequest) -> LedgerResult<TransactionResult> {
        info!(?request, "Creating RFQ on blockchain");
        self.simulate_latency(Operation::CreateRfq).await;
        let result = self.fabricate_transaction(RFQ_ID_PREFIX, EntityId::Rfq, RFQ_CREATED_MESSAGE);
        Self::finish(Operation::CreateRfq, result)
    }

    #[instrument(skip(self))]
    async fn get_rfq(&self, id: &str) -> LedgerResult<RfqRecord> {
        info!("Fetching RFQ from blockchain");
        self.simulate_latency(Operation::GetRfq).await;
        Self::finish(Operation::GetRfq, self.fabricate_rfq(id))
    }

    #[instrument(skip_all, fields(rfq_id = %request.rfq_id))]
    async fn submit_bid(&self, request: &BidRequest) -> LedgerResult<TransactionResult> {
        info!(?request, "Submitting bid on blockchain");
        self.simulate_latency(Operation::SubmitBid).await;
        let result = self.fabricate_transaction(BID_ID_PREFIX, EntityId::Bid, BID_SUBMITTED_MESSAGE);
        Self::finish(Operation::SubmitBid, result)
    }

    #[instrument(skip(self))]
    async fn get_bid(&self, id: &str) -> LedgerResult<BidRecord> {
        info!("Fetching bid from blockchain");
        self.simulate_latency(Operation::GetBid).await;
        Self::finish(Operation::GetBid, Ok(self.fabricate_bid(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::clock::ManualClock;
    use crate::ledger::ids::{is_entity_id, is_tx_hash};
    use chrono::{DateTime, TimeZone, Utc};
    use futures::future::join_all;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn manual_client(start: DateTime<Utc>) -> (ManualClock, MockLedgerClient<ManualClock>) {
        let clock = ManualClock::new(start);
        let client = MockLedgerClient::with_clock(Arc::new(clock.clone()), SimulationProfile::default());
        (clock, client)
    }

    fn roof_repair() -> RfqRequest {
        RfqRequest {
            title: "Roof repair".into(),
            scope: "Replace damaged shingles".into(),
            deadline: "2025-01-01".into(),
            evaluation_criteria: "lowest price".into(),
            budget: "5000".into(),
            category: "Construction".into(),
            location: "Remote".into(),
        }
    }

    fn sample_bid() -> BidRequest {
        BidRequest {
            rfq_id: "RFQ_does_not_exist".into(),
            price: "4800".into(),
            timeline: "2 weeks".into(),
            qualifications: "Licensed roofer".into(),
            document_hash: "QmNotReallyAHash".into(),
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[tokio::test]
    async fn test_create_rfq_returns_fabricated_transaction() {
        let (clock, client) = manual_client(start());
        let result = client.create_rfq(&roof_repair()).await.unwrap();

        assert!(result.success);
        assert!(is_entity_id("RFQ", result.id()), "bad id {}", result.id());
        assert!(is_tx_hash(&result.tx_hash), "bad hash {}", result.tx_hash);
        assert_eq!(result.message, "RFQ created successfully on blockchain");
        assert_eq!(clock.slept(), Duration::from_millis(1000));

        // Timestamp part is taken after the simulated latency
        let expected_millis = (start() + chrono::Duration::seconds(1)).timestamp_millis();
        assert!(result.id().starts_with(&format!("RFQ_{expected_millis}_")));
    }

    #[tokio::test]
    async fn test_get_rfq_echoes_id_with_future_deadline() {
        let (clock, client) = manual_client(start());
        let called_at = clock.now();
        let rfq = client.get_rfq("RFQ_anything").await.unwrap();

        assert_eq!(rfq.id, "RFQ_anything");
        assert_eq!(rfq.status, "open");
        assert_eq!(rfq.title, "Sample RFQ");
        assert_eq!(clock.slept(), Duration::from_millis(500));

        let deadline = DateTime::parse_from_rfc3339(&rfq.deadline).unwrap();
        assert!(deadline > called_at);
        assert_eq!(rfq.deadline, "2025-04-13T09:26:53.500Z");
    }

    #[tokio::test]
    async fn test_get_rfq_does_not_reflect_created_rfq() {
        let (_clock, client) = manual_client(start());
        let created = client.create_rfq(&roof_repair()).await.unwrap();
        let fetched = client.get_rfq(created.id()).await.unwrap();
        assert_eq!(fetched.id, created.id());
        assert_eq!(fetched.title, "Sample RFQ");
        assert_ne!(fetched.title, "Roof repair");
    }

    #[tokio::test]
    async fn test_submit_bid_ignores_unknown_rfq() {
        let (clock, client) = manual_client(start());
        let result = client.submit_bid(&sample_bid()).await.unwrap();
        assert!(result.success);
        assert!(is_entity_id("BID", result.id()));
        assert!(is_tx_hash(&result.tx_hash));
        assert_eq!(result.message, "Bid submitted successfully on blockchain");
        assert_eq!(clock.slept(), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_get_bid_returns_sample_record() {
        let (clock, client) = manual_client(start());
        let bid = client.get_bid("BID_42").await.unwrap();
        assert_eq!(bid.id, "BID_42");
        assert_eq!(bid.status, "submitted");
        assert_eq!(bid.rfq_id, "RFQ_123");
        assert_eq!(bid.document_hash, "0x1234567890abcdef");
        assert_eq!(clock.sleep_count(), 1);
    }

    #[tokio::test]
    async fn test_create_rfq_fails_when_clock_before_epoch() {
        let (_clock, client) = manual_client(Utc.with_ymd_and_hms(1969, 12, 31, 0, 0, 0).unwrap());
        let err = client.create_rfq(&roof_repair()).await.unwrap_err();
        assert_eq!(err.operation(), Operation::CreateRfq);
        assert!(matches!(err, LedgerError::CreateRfq(Fault::ClockBeforeEpoch(_))));
        assert!(err.to_string().starts_with("Failed to create RFQ on blockchain: "));
    }

    #[tokio::test]
    async fn test_submit_bid_fault_is_wrapped_per_operation() {
        let (_clock, client) = manual_client(Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap());
        let err = client.submit_bid(&sample_bid()).await.unwrap_err();
        assert!(matches!(err, LedgerError::SubmitBid(Fault::ClockBeforeEpoch(_))));
    }

    #[tokio::test]
    async fn test_get_rfq_fails_when_deadline_overflows() {
        let (_clock, client) = manual_client(DateTime::<Utc>::MAX_UTC);
        let err = client.get_rfq("RFQ_late").await.unwrap_err();
        assert!(matches!(err, LedgerError::GetRfq(Fault::DeadlineOverflow { days: 30, .. })));
        assert!(err.to_string().starts_with("Failed to fetch RFQ from blockchain: "));
    }

    #[tokio::test]
    async fn test_custom_profile_is_honoured() {
        let clock = ManualClock::new(start());
        let profile = SimulationProfile {
            write_latency: Duration::from_millis(20),
            read_latency: Duration::from_millis(5),
            deadline_days: 1,
        };
        let client = MockLedgerClient::with_clock(Arc::new(clock.clone()), profile);
        client.create_rfq(&RfqRequest::default()).await.unwrap();
        let rfq = client.get_rfq("x").await.unwrap();
        assert_eq!(clock.slept(), Duration::from_millis(25));
        assert_eq!(rfq.deadline, "2025-03-15T09:26:53.025Z");
    }

    #[tokio::test(start_paused = true)]
    async fn test_system_clock_latency() {
        let client = MockLedgerClient::new();

        let started = tokio::time::Instant::now();
        client.create_rfq(&roof_repair()).await.unwrap();
        let write = started.elapsed();
        assert!(write >= Duration::from_millis(1000) && write < Duration::from_millis(1100));

        let started = tokio::time::Instant::now();
        client.get_bid("BID_1").await.unwrap();
        let read = started.elapsed();
        assert!(read >= Duration::from_millis(500) && read < Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_creates_are_independent() {
        let client = MockLedgerClient::new();
        let request = roof_repair();

        let started = tokio::time::Instant::now();
        let results = join_all((0..16).map(|_| client.create_rfq(&request))).await;
        // All sixteen wait out the same second rather than queueing
        assert!(started.elapsed() < Duration::from_millis(1100));

        let ids: HashSet<String> = results.into_iter().map(|r| r.unwrap().entity.into_string()).collect();
        assert_eq!(ids.len(), 16);
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let (_clock, client) = manual_client(start());
        let client: Arc<dyn LedgerClient> = Arc::new(client);
        let bid = client.get_bid("BID_dyn").await.unwrap();
        assert_eq!(bid.id, "BID_dyn");
    }

    #[tokio::test]
    async fn test_transaction_json_keys_by_entity_kind() {
        let (_clock, client) = manual_client(start());

        let created = client.create_rfq(&roof_repair()).await.unwrap();
        let value = serde_json::to_value(&created).unwrap();
        assert_eq!(value["rfqId"], created.id());
        assert_eq!(value["success"], true);
        assert!(value["txHash"].as_str().is_some_and(is_tx_hash));
        assert_eq!(value["message"], "RFQ created successfully on blockchain");
        assert!(value.get("id").is_none());
        assert!(value.get("bidId").is_none());

        let submitted = client.submit_bid(&sample_bid()).await.unwrap();
        let value = serde_json::to_value(&submitted).unwrap();
        assert_eq!(value["bidId"], submitted.id());
        assert!(value.get("id").is_none());
        assert!(value.get("rfqId").is_none());
    }

    #[tokio::test]
    async fn test_fetched_records_serialize_camel_case() {
        let (_clock, client) = manual_client(start());

        let rfq = serde_json::to_value(client.get_rfq("RFQ_7").await.unwrap()).unwrap();
        assert_eq!(rfq["id"], "RFQ_7");
        assert_eq!(rfq["evaluationCriteria"], "Sample criteria");
        assert_eq!(rfq["status"], "open");
        assert!(rfq.get("evaluation_criteria").is_none());

        let bid = serde_json::to_value(client.get_bid("BID_7").await.unwrap()).unwrap();
        assert_eq!(bid["rfqId"], "RFQ_123");
        assert_eq!(bid["documentHash"], "0x1234567890abcdef");
        assert_eq!(bid["status"], "submitted");
        assert!(bid.get("rfq_id").is_none());
        assert!(bid.get("document_hash").is_none());
    }

    #[tokio::test]
    async fn test_deadline_follows_clock_jumps() {
        let (clock, client) = manual_client(start());
        assert_eq!(client.profile().deadline_days, 30);
        assert_eq!(client.clone().profile(), client.profile());

        clock.set(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
        let rfq = client.get_rfq("RFQ_jump").await.unwrap();
        assert_eq!(rfq.deadline, "2030-01-31T00:00:00.500Z");
    }

    fn block_on<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(fut)
    }

    proptest! {
        #[test]
        fn prop_any_rfq_request_succeeds(title in ".*", budget in ".*", deadline in ".*") {
            let (_clock, client) = manual_client(start());
            let request = RfqRequest { title, budget, deadline, ..RfqRequest::default() };
            let result = block_on(client.create_rfq(&request)).unwrap();
            prop_assert!(result.success);
            prop_assert!(is_entity_id("RFQ", result.id()));
        }

        #[test]
        fn prop_fetches_echo_any_id(id in ".*") {
            let (_clock, client) = manual_client(start());
            let rfq = block_on(client.get_rfq(&id)).unwrap();
            let bid = block_on(client.get_bid(&id)).unwrap();
            prop_assert_eq!(&rfq.id, &id);
            prop_assert_eq!(rfq.status.as_str(), "open");
            prop_assert_eq!(&bid.id, &id);
            prop_assert_eq!(bid.status.as_str(), "submitted");
        }
    }
}
