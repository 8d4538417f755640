//! Tseitin CNF encoding of gate networks
//!
//! This crate provides:
//! - An encoding [`Context`] mapping gate values at time steps to SAT variables
//! - A Tseitin [`Encoder`] emitting an equisatisfiable clause set per gate
//! - [`ClauseSink`] implementations for an in-memory [`Cnf`] and varisat
//!
//! Sequential designs are unrolled by encoding the same network at versions
//! 1, 2, ... with one context. Latch and flip-flop outputs at version v read
//! their own state from version v-1.
//!
//! # Example
//!
//! ```
//! use gatecnf_formal::{Cnf, Encoder};
//! use gatecnf_net::{Network, Signal};
//!
//! let mut net = Network::new("and3");
//! let ins: Vec<Signal> = (0..3).map(|_| Signal::new(net.add_in())).collect();
//! net.add_and(&ins).unwrap();
//!
//! let mut encoder = Encoder::new(Cnf::new());
//! encoder.encode(&net, 0).unwrap();
//! assert_eq!(encoder.sink().len(), 4);
//! ```

pub mod context;
pub mod encoder;
pub mod error;
pub mod sat;

pub use context::{Context, Role, VarKey, Version};
pub use encoder::{EncodeStats, Encoder, EncoderConfig};
pub use error::{EncodeError, EncodeResult};
pub use sat::{ClauseSink, Cnf, Lit, Var};
