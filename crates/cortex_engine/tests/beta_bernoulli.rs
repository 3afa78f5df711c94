//! End-to-end Beta-Bernoulli conjugate update over a 100-sample dataset,
//! driven entirely through the default belief-propagation resolver and a
//! strategy that sums Beta parameters (the standard exponential-family
//! "message product = parameter sum" trick).

use cortex_core::{SignalValue, SignalVariant};
use cortex_engine::{EngineOptions, InferenceEngine};
use cortex_model::{FactorGraph, FunctionalForm, GraphAdapter};
use cortex_resolver::BeliefPropagationResolver;

/// Deterministic fair-coin-like samples: a cheap xorshift so the test
/// doesn't need an RNG dependency the rest of the workspace doesn't carry.
fn seeded_samples(n: usize, mut seed: u64) -> Vec<bool> {
    let mut samples = Vec::with_capacity(n);
    for _ in 0..n {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        samples.push(seed % 2 == 0);
    }
    samples
}

fn sum_beta_strategy(
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

#[test]
fn beta_bernoulli_posterior_matches_conjugate_update() {
    let samples = seeded_samples(100, 0x1234_5678_9abc_def0);
    let n_true = samples.iter().filter(|&&b| b).count();
    let n_false = samples.len() - n_true;

    let mut graph = FactorGraph::new();
    let p = graph.add_variable("p");
    let prior = graph.add_factor(FunctionalForm::new(()));
    graph.connect(p, prior, "prior").unwrap();

    let mut obs_factors = Vec::with_capacity(samples.len());
    for i in 0..samples.len() {
        let f = graph.add_factor(FunctionalForm::new(()));
        graph.connect(p, f, format!("obs{i}")).unwrap();
        obs_factors.push(f);
    }

    let mut engine = InferenceEngine::new(
        graph,
        BeliefPropagationResolver,
        sum_beta_strategy,
        EngineOptions::default(),
    )
    .unwrap();

    let prior_signal = engine.get_connection(p, prior).unwrap().message_to_variable;
    engine
        .adapter_mut()
        .signals_mut()
        .set_value(prior_signal, SignalValue::Beta { alpha: 1.0, beta: 1.0 });

    for (&fac, &sample) in obs_factors.iter().zip(samples.iter()) {
        let signal = engine.get_connection(p, fac).unwrap().message_to_variable;
        let value = if sample {
            SignalValue::Beta { alpha: 1.0, beta: 0.0 }
        } else {
            SignalValue::Beta { alpha: 0.0, beta: 1.0 }
        };
        engine.adapter_mut().signals_mut().set_value(signal, value);
    }

    engine.update_marginals(&[p]).unwrap();

    let (alpha, beta) = engine.get_marginal(p).unwrap().as_beta().unwrap();
    assert!((alpha - (1.0 + n_true as f64)).abs() < 1e-9);
    assert!((beta - (1.0 + n_false as f64)).abs() < 1e-9);
}
