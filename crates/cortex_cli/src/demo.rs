//! A small Beta-Bernoulli graph used by `cortex run` to exercise the engine
//! end to end without requiring a model file format of its own yet.

use cortex_core::{SignalValue, SignalVariant};
use cortex_engine::{EngineOptions, InferenceEngine};
use cortex_model::{FactorGraph, FunctionalForm, GraphAdapter, VariableId};
use cortex_resolver::BeliefPropagationResolver;

fn beta_sum_strategy(
    _model: &FactorGraph,
    signal: &cortex_core::SignalView,
    deps: &[cortex_core::SignalView],
) -> SignalValue {
    match signal.variant {
        SignalVariant::IndividualMarginal => {
            let (mut alpha, mut beta) = (0.0, 0.0);
            for dep in deps {
                if let Some((a, b)) = dep.value.as_beta() {
                    alpha += a;
                    beta += b;
                }
            }
            SignalValue::Beta { alpha, beta }
        }
        _ => SignalValue::Undef,
    }
}

/// Build a coin-bias model with a flat prior and the given observations,
/// run inference to a fixed point, and return the engine (so the caller can
/// print the marginal and, if enabled, the trace).
pub fn run_coin_bias(
    observations: &[bool],
    max_rounds: usize,
    trace: bool,
) -> anyhow::Result<(InferenceEngine<FactorGraph, BeliefPropagationResolver, fn(&FactorGraph, &cortex_core::SignalView, &[cortex_core::SignalView]) -> SignalValue>, VariableId)> {
    let mut graph = FactorGraph::new();
    let p = graph.add_variable("p");
    let prior = graph.add_factor(FunctionalForm::new(()));
    graph.connect(p, prior, "prior")?;

    let mut factors = Vec::with_capacity(observations.len());
    for i in 0..observations.len() {
        let f = graph.add_factor(FunctionalForm::new(()));
        graph.connect(p, f, format!("obs{i}"))?;
        factors.push(f);
    }

    let mut engine = InferenceEngine::new(
        graph,
        BeliefPropagationResolver,
        beta_sum_strategy as fn(&FactorGraph, &cortex_core::SignalView, &[cortex_core::SignalView]) -> SignalValue,
        EngineOptions {
            trace,
            max_rounds,
            ..EngineOptions::default()
        },
    )?;

    let prior_signal = engine.get_connection(p, prior)?.message_to_variable;
    engine
        .adapter_mut()
        .signals_mut()
        .set_value(prior_signal, SignalValue::Beta { alpha: 1.0, beta: 1.0 });

    for (&fac, &observed) in factors.iter().zip(observations.iter()) {
        let signal = engine.get_connection(p, fac)?.message_to_variable;
        let value = if observed {
            SignalValue::Beta { alpha: 1.0, beta: 0.0 }
        } else {
            SignalValue::Beta { alpha: 0.0, beta: 1.0 }
        };
        engine.adapter_mut().signals_mut().set_value(signal, value);
    }

    engine.update_marginals(&[p])?;
    Ok((engine, p))
}
