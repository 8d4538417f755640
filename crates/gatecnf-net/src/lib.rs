//! Gate-level network model for SAT-based verification
//!
//! This crate provides:
//! - Gate identities, sign-carrying signals and function symbols
//! - A gate network arena with combinational and sequential gates
//! - Dependency ordering with sequential gates as cut points
//! - AIG premapping (rewriting arbitrary gates into 2-input ANDs)
//!
//! # Example
//!
//! ```
//! use gatecnf_net::{Network, Signal};
//! use gatecnf_net::premapper::{AigMapper, PreMapper};
//!
//! let mut net = Network::new("top");
//! let a = net.add_in();
//! let b = net.add_in();
//! let c = net.add_in();
//! let y = net
//!     .add_or(&[Signal::new(a), Signal::new(b), Signal::new(c)])
//!     .unwrap();
//! net.add_output(Signal::new(y));
//!
//! let premapped = AigMapper::new().premap(&net).unwrap();
//! assert_eq!(premapped.net.and_count(), 2);
//! ```

pub mod error;
pub mod gate;
pub mod network;
pub mod premapper;

pub use error::{NetError, NetResult};
pub use gate::{Arity, Gate, GateId, GateKind, GateSymbol, LogicOp, Signal};
pub use network::Network;
