//! Two-observation IID scenario with tracing enabled, exercising both the
//! round scanner and the ring-buffered tracer together.

use cortex_core::{AddDependencyOptions, SignalValue, SignalVariant};
use cortex_engine::{EngineOptions, InferenceEngine};
use cortex_model::{FactorGraph, FunctionalForm, GraphAdapter};
use cortex_resolver::BeliefPropagationResolver;

fn double_or_sum_strategy(
    _model: &FactorGraph,
    signal: &cortex_core::SignalView,
    deps: &[cortex_core::SignalView],
) -> SignalValue {
    match signal.variant {
        SignalVariant::MessageToVariable => {
            SignalValue::F64(deps[0].value.as_f64().unwrap() * 2.0)
        }
        SignalVariant::IndividualMarginal => {
            let total: f64 = deps.iter().filter_map(|d| d.value.as_f64()).sum();
            SignalValue::F64(total)
        }
        _ => SignalValue::Undef,
    }
}

#[test]
fn traced_iid_converges_in_two_rounds() {
    let mut graph = FactorGraph::new();
    let p = graph.add_variable("p");
    let prior = graph.add_factor(FunctionalForm::new(()));
    let f1 = graph.add_factor(FunctionalForm::new(()));
    let f2 = graph.add_factor(FunctionalForm::new(()));
    graph.connect(p, prior, "prior").unwrap();
    graph.connect(p, f1, "obs1").unwrap();
    graph.connect(p, f2, "obs2").unwrap();

    let obs1 = graph.signals_mut().create_undef();
    let obs2 = graph.signals_mut().create_undef();

    let msg_to_var_f1 = graph.get_connection(p, f1).unwrap().message_to_variable;
    let msg_to_var_f2 = graph.get_connection(p, f2).unwrap().message_to_variable;
    graph
        .signals_mut()
        .add_dependency(msg_to_var_f1, obs1, AddDependencyOptions::default());
    graph
        .signals_mut()
        .add_dependency(msg_to_var_f2, obs2, AddDependencyOptions::default());

    let mut engine = InferenceEngine::new(
        graph,
        BeliefPropagationResolver,
        double_or_sum_strategy,
        EngineOptions {
            trace: true,
            ..EngineOptions::default()
        },
    )
    .unwrap();

    let prior_signal = engine.get_connection(p, prior).unwrap().message_to_variable;
    engine
        .adapter_mut()
        .signals_mut()
        .set_value(prior_signal, SignalValue::F64(3.0));
    engine.adapter_mut().signals_mut().set_value(obs1, SignalValue::F64(1.0));
    engine.adapter_mut().signals_mut().set_value(obs2, SignalValue::F64(2.0));

    engine.update_marginals(&[p]).unwrap();

    let marginal = engine.get_marginal(p).unwrap().as_f64().unwrap();
    assert_eq!(marginal, 9.0);

    let trace = engine.tracer().last_request().unwrap();
    assert_eq!(trace.rounds.len(), 2);
    assert_eq!(trace.rounds[0].executions.len(), 2);
    assert!(trace.rounds[0]
        .executions
        .iter()
        .all(|e| e.variant == SignalVariant::MessageToVariable));
    assert_eq!(trace.rounds[1].executions.len(), 1);
    assert_eq!(
        trace.rounds[1].executions[0].variant,
        SignalVariant::IndividualMarginal
    );
    assert_eq!(
        trace.rounds[1].executions[0].value_after.as_f64(),
        Some(9.0)
    );
}
