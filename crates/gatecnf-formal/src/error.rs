use crate::context::{VarKey, Version};
use gatecnf_net::{Arity, GateId, GateSymbol};
use thiserror::Error;

/// Contract violations that abort an encoding session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("sequential gate {gate} ({symbol}) cannot be encoded at version 0")]
    SequentialAtVersionZero { gate: GateId, symbol: GateSymbol },

    #[error("gate {gate} ({symbol}): expected {expected} inputs, got {actual}")]
    Arity {
        gate: GateId,
        symbol: GateSymbol,
        version: Version,
        expected: Arity,
        actual: usize,
    },

    #[error("gate at slot {slot} claims identity {claimed} (version {version})")]
    MisplacedGate {
        slot: GateId,
        claimed: GateId,
        version: Version,
    },

    #[error("gate {gate} is not in the network (version {version})")]
    UnknownGate { gate: GateId, version: Version },

    #[error("gate {gate} at version {version} reads unknown gate {input}")]
    UnknownInput {
        gate: GateId,
        input: GateId,
        version: Version,
    },

    #[error("{count} value(s) read but never defined, first {first}")]
    Undriven {
        count: usize,
        first: VarKey,
        keys: Vec<VarKey>,
    },
}

pub type EncodeResult<T> = Result<T, EncodeError>;
