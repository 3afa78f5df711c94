//! Optional per-request/per-round/per-execution timing and value-transition
//! recording.

use std::collections::VecDeque;
use std::time::Instant;

use cortex_core::{format_duration, SignalId, SignalMetadata, SignalValue, SignalVariant};
use cortex_model::VariableId;

/// One signal computation within a round.
#[derive(Debug, Clone)]
pub struct ExecutionTrace {
    pub variable_id: Option<VariableId>,
    pub signal_id: SignalId,
    pub variant: SignalVariant,
    pub metadata: SignalMetadata,
    pub value_before: SignalValue,
    pub value_after: SignalValue,
    pub elapsed_ns: u64,
}

/// One round of an [`crate::request::InferenceRequest`].
#[derive(Debug, Clone, Default)]
pub struct RoundTrace {
    pub elapsed_ns: u64,
    pub executions: Vec<ExecutionTrace>,
}

/// One `update_marginals` call.
#[derive(Debug, Clone)]
pub struct RequestTrace {
    pub targets: Vec<VariableId>,
    pub timestamp_ns: u64,
    pub rounds: Vec<RoundTrace>,
}

/// A bounded ring buffer of recent request traces, plus the in-progress
/// bookkeeping for whichever request is currently running.
///
/// When disabled, every hook is a single `if self.enabled` check, so tracing
/// adds O(1) overhead per signal whether or not it's turned on.
pub struct Tracer {
    enabled: bool,
    capacity: usize,
    requests: VecDeque<RequestTrace>,
    origin: Instant,
    current_request: Option<RequestTrace>,
    current_round: Option<RoundTrace>,
    round_started_at: Option<Instant>,
    execution_started_at: Option<Instant>,
}

impl Tracer {
    pub fn new(enabled: bool) -> Self {
        Self::with_capacity(enabled, 256)
    }

    pub fn with_capacity(enabled: bool, capacity: usize) -> Self {
        Self {
            enabled,
            capacity,
            requests: VecDeque::new(),
            origin: Instant::now(),
            current_request: None,
            current_round: None,
            round_started_at: None,
            execution_started_at: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn begin_request(&mut self, targets: &[VariableId]) {
        if !self.enabled {
            return;
        }
        self.current_request = Some(RequestTrace {
            targets: targets.to_vec(),
            timestamp_ns: self.origin.elapsed().as_nanos() as u64,
            rounds: Vec::new(),
        });
    }

    pub fn begin_round(&mut self) {
        if !self.enabled {
            return;
        }
        self.current_round = Some(RoundTrace::default());
        self.round_started_at = Some(Instant::now());
    }

    pub fn begin_execution(&mut self) {
        if !self.enabled {
            return;
        }
        self.execution_started_at = Some(Instant::now());
    }

    #[allow(clippy::too_many_arguments)]
    pub fn end_execution(
        &mut self,
        variable_id: Option<VariableId>,
        signal_id: SignalId,
        variant: SignalVariant,
        metadata: SignalMetadata,
        value_before: SignalValue,
        value_after: SignalValue,
    ) {
        if !self.enabled {
            return;
        }
        let elapsed_ns = self
            .execution_started_at
            .take()
            .map(|t| t.elapsed().as_nanos() as u64)
            .unwrap_or(0);
        if let Some(round) = self.current_round.as_mut() {
            round.executions.push(ExecutionTrace {
                variable_id,
                signal_id,
                variant,
                metadata,
                value_before,
                value_after,
                elapsed_ns,
            });
        }
    }

    pub fn end_round(&mut self) {
        if !self.enabled {
            return;
        }
        let elapsed_ns = self
            .round_started_at
            .take()
            .map(|t| t.elapsed().as_nanos() as u64)
            .unwrap_or(0);
        if let Some(mut round) = self.current_round.take() {
            round.elapsed_ns = elapsed_ns;
            if let Some(request) = self.current_request.as_mut() {
                request.rounds.push(round);
            }
        }
    }

    pub fn end_request(&mut self) {
        if !self.enabled {
            return;
        }
        if let Some(request) = self.current_request.take() {
            if self.requests.len() >= self.capacity {
                self.requests.pop_front();
            }
            self.requests.push_back(request);
        }
    }

    pub fn requests(&self) -> impl Iterator<Item = &RequestTrace> {
        self.requests.iter()
    }

    pub fn last_request(&self) -> Option<&RequestTrace> {
        self.requests.back()
    }

    /// Render every recorded request as a human-readable dump: one line per
    /// request, round, and execution.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (i, request) in self.requests.iter().enumerate() {
            out.push_str(&format!(
                "request #{i} targets={:?} rounds={}\n",
                request.targets,
                request.rounds.len()
            ));
            for (r, round) in request.rounds.iter().enumerate() {
                out.push_str(&format!(
                    "  round {r}: {} execution(s), {}\n",
                    round.executions.len(),
                    format_duration(round.elapsed_ns)
                ));
                for exec in &round.executions {
                    out.push_str(&format!(
                        "    {variant} {meta:?} {before:?} -> {after:?} ({elapsed})\n",
                        variant = exec.variant,
                        meta = exec.metadata,
                        before = exec.value_before,
                        after = exec.value_after,
                        elapsed = format_duration(exec.elapsed_ns),
                    ));
                }
            }
        }
        out
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_tracer_records_nothing() {
        let mut tracer = Tracer::new(false);
        tracer.begin_request(&[VariableId(0)]);
        tracer.begin_round();
        tracer.begin_execution();
        tracer.end_execution(
            None,
            SignalId::default(),
            SignalVariant::Unspecified,
            SignalMetadata::Undef,
            SignalValue::Undef,
            SignalValue::Undef,
        );
        tracer.end_round();
        tracer.end_request();
        assert_eq!(tracer.requests().count(), 0);
    }

    #[test]
    fn enabled_tracer_records_structure() {
        let mut tracer = Tracer::new(true);
        tracer.begin_request(&[VariableId(0)]);
        tracer.begin_round();
        tracer.begin_execution();
        tracer.end_execution(
            Some(VariableId(0)),
            SignalId::default(),
            SignalVariant::IndividualMarginal,
            SignalMetadata::Undef,
            SignalValue::Undef,
            SignalValue::F64(9.0),
        );
        tracer.end_round();
        tracer.end_request();

        let req = tracer.last_request().unwrap();
        assert_eq!(req.rounds.len(), 1);
        assert_eq!(req.rounds[0].executions.len(), 1);
    }

    #[test]
    fn ring_buffer_evicts_oldest() {
        let mut tracer = Tracer::with_capacity(true, 2);
        for i in 0..3 {
            tracer.begin_request(&[VariableId(i)]);
            tracer.end_request();
        }
        assert_eq!(tracer.requests().count(), 2);
        let targets: Vec<_> = tracer.requests().map(|r| r.targets[0]).collect();
        assert_eq!(targets, vec![VariableId(1), VariableId(2)]);
    }
}
