//! The user-supplied computation rule the engine drives per pending signal.
//!
//! Conceptually this is a callable `(engine, signal, deps) -> value`.
//! Threading the whole engine through would force `InferenceStrategy` to
//! name its own implementor in a recursive generic bound, so the model
//! adapter (the part of the engine a compute rule actually needs: variable
//! names, connection labels, factor functional forms) is passed instead.
//! See `DESIGN.md` for the rationale.

use cortex_core::{SignalValue, SignalView};
use cortex_model::GraphAdapter;

/// A pluggable computation rule invoked once per pending signal.
pub trait InferenceStrategy<A: GraphAdapter> {
    fn apply(&self, model: &A, signal: &SignalView, dependencies: &[SignalView]) -> SignalValue;
}

impl<A, F> InferenceStrategy<A> for F
where
    A: GraphAdapter,
    F: Fn(&A, &SignalView, &[SignalView]) -> SignalValue,
{
    fn apply(&self, model: &A, signal: &SignalView, dependencies: &[SignalView]) -> SignalValue {
        self(model, signal, dependencies)
    }
}
