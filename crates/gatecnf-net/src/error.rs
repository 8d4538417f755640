//! Error types for network construction and premapping.

use crate::gate::{Arity, GateId, GateSymbol};
use thiserror::Error;

/// Errors raised while building, ordering or rewriting a network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetError {
    /// The upstream producer used a function name this model does not know.
    #[error("unknown gate symbol '{0}'")]
    UnknownSymbol(String),

    /// A gate was given the wrong number of inputs for its function.
    #[error("{symbol} expects {expected} inputs, got {actual}")]
    Arity {
        symbol: GateSymbol,
        expected: Arity,
        actual: usize,
    },

    /// An input or output refers to a gate that is not in the network.
    #[error("reference to unknown gate {0}")]
    UnknownGate(GateId),

    /// A gate whose stored identity disagrees with its arena slot.
    #[error("gate at position {position} claims identity {claimed}")]
    MisplacedGate { position: usize, claimed: GateId },

    /// Feedback that does not pass through a sequential gate.
    #[error("combinational cycle through gate {0}")]
    CombinationalCycle(GateId),

    /// A premapper saw an input whose driver has not been mapped yet.
    #[error("input {input} of gate {gate} has not been mapped")]
    Unmapped { gate: GateId, input: GateId },
}

pub type NetResult<T> = Result<T, NetError>;
