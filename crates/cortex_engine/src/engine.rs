//! The inference engine: owns the model adapter, the dependency resolver,
//! and the compute strategy; assigns signal variants and wires dependencies
//! at construction, then drives `update_marginals`.

use cortex_core::{SignalId, SignalMetadata, SignalValue, SignalVariant};
use cortex_model::{edge_from_metadata, Connection, Factor, GraphAdapter, Variable, VariableId, FactorId};
use cortex_resolver::DependencyResolver;
use rustc_hash::FxHashMap;
use tracing::{info_span, warn};

use crate::error::{EngineError, Result};
use crate::request::InferenceRequest;
use crate::strategy::InferenceStrategy;
use crate::tracer::Tracer;

/// Construction-time options.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub prepare_signals_metadata: bool,
    pub resolve_dependencies: bool,
    pub trace: bool,
    /// Upper bound on rounds per `update_marginals` call before a
    /// [`EngineError::StalledInference`] is raised.
    pub max_rounds: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            prepare_signals_metadata: true,
            resolve_dependencies: true,
            trace: false,
            max_rounds: 1000,
        }
    }
}

/// Owns a model adapter, a dependency resolver, and a compute strategy.
pub struct InferenceEngine<A, R, S> {
    adapter: A,
    resolver: R,
    strategy: S,
    max_rounds: usize,
    warnings: Vec<String>,
    tracer: Tracer,
    marginal_owner: FxHashMap<SignalId, VariableId>,
}

impl<A, R, S> InferenceEngine<A, R, S>
where
    A: GraphAdapter,
    R: DependencyResolver<A>,
    S: InferenceStrategy<A>,
{
    pub fn new(adapter: A, resolver: R, strategy: S, opts: EngineOptions) -> Result<Self> {
        let mut engine = Self {
            adapter,
            resolver,
            strategy,
            max_rounds: opts.max_rounds,
            warnings: Vec::new(),
            tracer: Tracer::new(opts.trace),
            marginal_owner: FxHashMap::default(),
        };

        let var_ids = engine.adapter.get_variable_ids();
        for &id in &var_ids {
            let marginal = engine.adapter.get_variable(id)?.marginal;
            engine.marginal_owner.insert(marginal, id);
        }

        if opts.prepare_signals_metadata {
            engine.prepare_signals_metadata()?;
        }
        if opts.resolve_dependencies {
            engine.resolve_dependencies()?;
        }

        Ok(engine)
    }

    fn prepare_signals_metadata(&mut self) -> Result<()> {
        let _span = info_span!("prepare_signals_metadata").entered();
        let var_ids = self.adapter.get_variable_ids();

        for &var in &var_ids {
            let marginal = self.adapter.get_variable(var)?.marginal;
            self.adapter
                .signals_mut()
                .set_variant(marginal, SignalVariant::IndividualMarginal)?;

            let factors = self.adapter.get_connected_factor_ids(var);
            if factors.is_empty() {
                let message = format!("variable {var:?} has no connected factors");
                warn!("{message}");
                self.warnings.push(message);
            }

            for &fac in &factors {
                let connection = self.adapter.get_connection(var, fac)?;
                let msg_to_var = connection.message_to_variable;
                let msg_to_fac = connection.message_to_factor;
                let meta = SignalMetadata::Pair(var.into(), fac.into());

                self.adapter
                    .signals_mut()
                    .set_variant(msg_to_var, SignalVariant::MessageToVariable)?;
                self.adapter.signals_mut().set_metadata(msg_to_var, meta);

                self.adapter
                    .signals_mut()
                    .set_variant(msg_to_fac, SignalVariant::MessageToFactor)?;
                self.adapter.signals_mut().set_metadata(msg_to_fac, meta);
            }
        }

        let fac_ids = self.adapter.get_factor_ids();
        for &fac in &fac_ids {
            if self.adapter.get_connected_variable_ids(fac).is_empty() {
                let message = format!("factor {fac:?} has no connected variables");
                warn!("{message}");
                self.warnings.push(message);
            }
        }

        Ok(())
    }

    fn resolve_dependencies(&mut self) -> Result<()> {
        let _span = info_span!("resolve_dependencies").entered();
        let var_ids = self.adapter.get_variable_ids();
        for &var in &var_ids {
            self.resolver
                .resolve_variable_dependencies(&mut self.adapter, var)?;
        }
        let fac_ids = self.adapter.get_factor_ids();
        for &fac in &fac_ids {
            self.resolver
                .resolve_factor_dependencies(&mut self.adapter, fac)?;
        }
        Ok(())
    }

    pub fn get_warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Mutable access to the model adapter, for external code setting
    /// observation/prior input signals via `adapter_mut().signals_mut()`.
    /// External code owns top-level input signals; the engine owns the
    /// variant-tagged signals it creates itself.
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn get_variable(&self, id: VariableId) -> Result<&Variable> {
        Ok(self.adapter.get_variable(id)?)
    }

    pub fn get_factor(&self, id: FactorId) -> Result<&Factor> {
        Ok(self.adapter.get_factor(id)?)
    }

    pub fn get_connection(&self, var: VariableId, fac: FactorId) -> Result<&Connection> {
        Ok(self.adapter.get_connection(var, fac)?)
    }

    pub fn get_marginal(&self, id: VariableId) -> Result<SignalValue> {
        let marginal = self.adapter.get_variable(id)?.marginal;
        Ok(self.adapter.signals().get_value(marginal))
    }

    pub fn is_pending(&self, id: SignalId) -> bool {
        self.adapter.signals().is_pending(id)
    }

    /// Run rounds until every target's marginal is computed and non-pending.
    pub fn update_marginals(&mut self, targets: &[VariableId]) -> Result<InferenceRequest> {
        let mut request = InferenceRequest::new(targets.to_vec(), self.max_rounds);
        self.tracer.begin_request(&request.targets);

        loop {
            if request.is_satisfied(&self.adapter)? {
                break;
            }

            let round = request.scan_round(&self.adapter)?;
            if round.is_empty() {
                self.tracer.end_request();
                return Err(EngineError::StalledInference {
                    targets: request.targets,
                    rounds_elapsed: request.rounds_elapsed,
                });
            }

            self.execute_round(&round);
            request.rounds_elapsed += 1;

            if request.rounds_elapsed >= request.max_rounds
                && !request.is_satisfied(&self.adapter)?
            {
                self.tracer.end_request();
                return Err(EngineError::StalledInference {
                    targets: request.targets,
                    rounds_elapsed: request.rounds_elapsed,
                });
            }
        }

        self.tracer.end_request();
        Ok(request)
    }

    fn execute_round(&mut self, round: &[SignalId]) {
        self.tracer.begin_round();

        for &id in round {
            self.tracer.begin_execution();

            let signal_view = self.adapter.signals().view(id);
            let dep_views: Vec<_> = self
                .adapter
                .signals()
                .get_dependencies(id)
                .iter()
                .map(|d| self.adapter.signals().view(*d))
                .collect();

            let value_before = signal_view.value.clone();
            let new_value = self.strategy.apply(&self.adapter, &signal_view, &dep_views);
            self.adapter.signals_mut().set_value(id, new_value.clone());

            let variable_id = self
                .marginal_owner
                .get(&id)
                .copied()
                .or_else(|| edge_from_metadata(signal_view.metadata).map(|(v, _)| v));

            self.tracer.end_execution(
                variable_id,
                id,
                signal_view.variant,
                signal_view.metadata,
                value_before,
                new_value,
            );
        }

        self.tracer.end_round();
    }
}
