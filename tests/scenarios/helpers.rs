//! Test utility functions for atelier scenarios

use async_trait::async_trait;
use atelier::core::{BreakpointRequest, InvocationSpec, ResumeDecision, StepResult};
use atelier::execution::{Clock, ExecutionContext};
use atelier::invoker::{BreakpointInvoker, InvokeError, TaskInvoker};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Invoker that returns predefined raw results, validated per contract
pub struct MockInvoker {
    results: Vec<Value>,
    index: AtomicUsize,
}

impl MockInvoker {
    pub fn new(results: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            results,
            index: AtomicUsize::new(0),
        })
    }

    /// How many invocations were issued
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskInvoker for MockInvoker {
    async fn invoke(&self, spec: &InvocationSpec) -> Result<StepResult, InvokeError> {
        let idx = self.index.fetch_add(1, Ordering::SeqCst);

        let raw = self.results.get(idx).cloned().ok_or_else(|| {
            InvokeError::InvocationFailure(format!(
                "MockInvoker: no result for call {} ({})",
                idx + 1,
                spec.invocation_id
            ))
        })?;

        StepResult::parse(raw, spec.kind.contract()).map_err(Into::into)
    }
}

/// Gate that records the request it was shown and answers from a script
pub struct RecordingGate {
    decision: ResumeDecision,
    requests: Mutex<Vec<BreakpointRequest>>,
}

impl RecordingGate {
    pub fn new(decision: ResumeDecision) -> Arc<Self> {
        Arc::new(Self {
            decision,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn approve() -> Arc<Self> {
        Self::new(ResumeDecision::Approve)
    }

    /// The request captured at the gate, if the run reached it
    pub fn request(&self) -> Option<BreakpointRequest> {
        self.requests.lock().unwrap().first().cloned()
    }

    pub fn presented(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl BreakpointInvoker for RecordingGate {
    async fn present(&self, request: BreakpointRequest) -> Result<ResumeDecision, InvokeError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.decision.clone())
    }
}

/// Gate that raises the run's cancellation flag before answering
///
/// The approval it returns must be discarded by the context.
pub struct CancellingGate {
    pub flag: Arc<AtomicBool>,
}

#[async_trait]
impl BreakpointInvoker for CancellingGate {
    async fn present(&self, _request: BreakpointRequest) -> Result<ResumeDecision, InvokeError> {
        self.flag.store(true, Ordering::SeqCst);
        Ok(ResumeDecision::Approve)
    }
}

/// Deterministic clock ticking a fixed step per `now()` call
pub struct FixedClock {
    start: DateTime<Utc>,
    step_ms: i64,
    ticks: AtomicI64,
}

impl FixedClock {
    pub fn new() -> Arc<Self> {
        Self::with_step_ms(1_000)
    }

    pub fn with_step_ms(step_ms: i64) -> Arc<Self> {
        Arc::new(Self {
            start: Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap(),
            step_ms,
            ticks: AtomicI64::new(0),
        })
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::milliseconds(tick * self.step_ms)
    }
}

/// Context with a nil run id and a fixed clock, for deterministic runs
pub fn fixed_context(
    invoker: Arc<dyn TaskInvoker>,
    gate: Arc<dyn BreakpointInvoker>,
) -> ExecutionContext {
    ExecutionContext::new(invoker, gate)
        .with_run_id(Uuid::nil())
        .with_clock(FixedClock::new())
}

/// Standard budgeting fixture: FY2025 against a 500000 budget
pub fn budgeting_config() -> Value {
    serde_json::json!({ "fiscalYear": "2025", "annualBudget": 500000 })
}

/// Scripted results for a full successful budgeting run
pub fn budgeting_results() -> Vec<Value> {
    vec![
        serde_json::json!({
            "success": true,
            "totalRevenue": 520000,
            "artifacts": [{ "path": "rev.md" }]
        }),
        serde_json::json!({
            "totalExpenses": 480000,
            "artifacts": [{ "path": "exp.md" }]
        }),
        serde_json::json!({
            "allocations": [
                { "department": "curatorial", "amount": 180000 },
                { "department": "learning", "amount": 120000 }
            ],
            "artifacts": [{ "path": "alloc.md" }]
        }),
        serde_json::json!({
            "narrative": "A modest surplus year.",
            "artifacts": [{ "path": "narrative.md", "format": "markdown" }]
        }),
    ]
}
