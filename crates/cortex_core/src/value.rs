//! The dynamically-typed payload a [`crate::signal::Signal`] carries, and the
//! small closed set of role tags ("variants") inference assigns to signals.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A signal's value.
///
/// Common numeric-distribution shapes used by belief-propagation style
/// inference get dedicated variants for cheap cloning and matching; anything
/// else escapes to [`SignalValue::Opaque`], a heap-owned `dyn Any` the caller
/// downcasts on the way back out.
#[derive(Clone)]
pub enum SignalValue {
    /// No value has been produced yet.
    Undef,
    F64(f64),
    Bool(bool),
    /// A Beta(alpha, beta) distribution, as used by the Beta-Bernoulli
    /// conjugate pair.
    Beta { alpha: f64, beta: f64 },
    /// An unnormalized categorical distribution over a fixed support.
    Category(Vec<f64>),
    /// Escape hatch for user-defined value types.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl SignalValue {
    pub fn is_undef(&self) -> bool {
        matches!(self, SignalValue::Undef)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SignalValue::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_beta(&self) -> Option<(f64, f64)> {
        match self {
            SignalValue::Beta { alpha, beta } => Some((*alpha, *beta)),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&[f64]> {
        match self {
            SignalValue::Category(v) => Some(v),
            _ => None,
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            SignalValue::Opaque(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn opaque<T: Send + Sync + 'static>(value: T) -> Self {
        SignalValue::Opaque(Arc::new(value))
    }
}

impl fmt::Debug for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Undef => write!(f, "Undef"),
            SignalValue::F64(v) => write!(f, "F64({v})"),
            SignalValue::Bool(v) => write!(f, "Bool({v})"),
            SignalValue::Beta { alpha, beta } => write!(f, "Beta({alpha}, {beta})"),
            SignalValue::Category(v) => write!(f, "Category({v:?})"),
            SignalValue::Opaque(_) => write!(f, "Opaque(..)"),
        }
    }
}

impl Default for SignalValue {
    fn default() -> Self {
        SignalValue::Undef
    }
}

/// The closed set of roles a signal plays in message-passing inference.
///
/// The `Display` impl produces the exact diagnostic strings callers may
/// match on: `""`, `"MessageToVariable"`, `"MessageToFactor"`,
/// `"ProductOfMessages"`, `"IndividualMarginal"`, `"JointMarginal"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalVariant {
    Unspecified,
    MessageToFactor,
    MessageToVariable,
    ProductOfMessages,
    IndividualMarginal,
    JointMarginal,
}

impl Default for SignalVariant {
    fn default() -> Self {
        SignalVariant::Unspecified
    }
}

impl fmt::Display for SignalVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalVariant::Unspecified => "",
            SignalVariant::MessageToFactor => "MessageToFactor",
            SignalVariant::MessageToVariable => "MessageToVariable",
            SignalVariant::ProductOfMessages => "ProductOfMessages",
            SignalVariant::IndividualMarginal => "IndividualMarginal",
            SignalVariant::JointMarginal => "JointMarginal",
        };
        write!(f, "{s}")
    }
}

/// Diagnostic label for a raw variant discriminant that doesn't decode to a
/// known [`SignalVariant`], e.g. one persisted by a newer version of this
/// crate. `cortex_core` itself never produces this; it exists so tooling
/// built on top of the crate has a stable way to render unknown tags.
pub fn unknown_variant_label(raw: u8) -> String {
    format!("UnknownType(0x{raw:02x})")
}

/// Opaque metadata a signal carries alongside its value: for message
/// signals, the `(variable_id, factor_id)` pair that created them. The ids
/// are deliberately untyped `u64`s here: `cortex_core` has no notion of
/// variables or factors, those concepts live in `cortex_model`, whose
/// `VariableId`/`FactorId` newtypes convert to and from `u64` at the
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalMetadata {
    #[default]
    Undef,
    Pair(u64, u64),
}

impl SignalMetadata {
    pub fn as_pair(&self) -> Option<(u64, u64)> {
        match self {
            SignalMetadata::Pair(a, b) => Some((*a, *b)),
            SignalMetadata::Undef => None,
        }
    }
}
