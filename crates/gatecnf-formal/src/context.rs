//! Encoding context: the bijection between gate values and SAT variables
//!
//! Every gate value is identified by a [`VarKey`], a gate at a time step. The
//! context allocates one variable per key on first use and never renames or
//! reuses it.
//!
//! # Roles
//!
//! A gate is accessed in one of two [`Role`]s:
//!
//! - `Current` - the value as seen by readers at a version
//! - `Next` - the value the gate's own encoding defines at a version
//!
//! For combinational gates both roles name the same key. For triggers, `Next`
//! at version v is the state after step v, and `Current` at version v is the
//! state after step v-1:
//!
//! ```text
//! version:        0      1      2      3
//! Next(q, v):     -     q@1    q@2    q@3
//! Current(q, v): q@0    q@0    q@1    q@2
//! ```
//!
//! `q@0` is the initial state. It is never defined by an encoding and is left
//! free for the caller to constrain.

use crate::sat::{Lit, Var};
use gatecnf_net::{Gate, GateId};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time step of an unrolled design (0 = no unrolling)
pub type Version = u32;

/// How a gate value is accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The value observed by readers
    Current,
    /// The value being defined
    Next,
}

/// A gate value at a time step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarKey {
    pub gate: GateId,
    pub version: Version,
}

impl VarKey {
    /// Key for accessing `gate` at `version` in the given role
    pub fn of(gate: &Gate, version: Version, role: Role) -> Self {
        let version = match role {
            Role::Current if gate.is_trigger() => version.saturating_sub(1),
            _ => version,
        };
        VarKey {
            gate: gate.id(),
            version,
        }
    }
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.gate, self.version)
    }
}

/// Variable table for one encoding session
#[derive(Debug, Clone)]
pub struct Context {
    /// Bound variables in allocation order
    vars: IndexMap<VarKey, Var>,
    /// First variable index of this context
    first_var: u32,
    /// Next free variable index
    next_var: u32,
    /// Keys defined by some gate encoding
    defined: IndexSet<VarKey>,
    /// Keys read that must be defined by some gate encoding
    read: IndexSet<VarKey>,
}

impl Context {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create a context whose variables start at `first`
    ///
    /// Two contexts feeding one sink stay disjoint if the second starts at the
    /// first's [`next_free`](Self::next_free).
    pub fn starting_at(first: u32) -> Self {
        let first = first.max(1);
        Self {
            vars: IndexMap::new(),
            first_var: first,
            next_var: first,
            defined: IndexSet::new(),
            read: IndexSet::new(),
        }
    }

    /// Variable for `gate` at `version` in `role`, allocated on first use
    pub fn var(&mut self, gate: &Gate, version: Version, role: Role) -> Var {
        let key = VarKey::of(gate, version, role);

        match role {
            Role::Next => {
                self.defined.insert(key);
            }
            Role::Current => {
                // Sources and initial trigger states are free by definition
                let initial_state = gate.is_trigger() && key.version == 0;
                if !gate.is_source() && !initial_state {
                    self.read.insert(key);
                }
            }
        }

        if let Some(&var) = self.vars.get(&key) {
            return var;
        }
        let var = self.alloc();
        self.vars.insert(key, var);
        var
    }

    /// Variable already bound for `gate` at `version` in `role`
    pub fn lookup(&self, gate: &Gate, version: Version, role: Role) -> Option<Var> {
        self.vars.get(&VarKey::of(gate, version, role)).copied()
    }

    /// Variable bound to a key
    pub fn get(&self, key: VarKey) -> Option<Var> {
        self.vars.get(&key).copied()
    }

    /// Fresh variable bound to no gate (Tseitin auxiliary)
    pub fn new_var(&mut self) -> Var {
        self.alloc()
    }

    /// Literal of `var` with polarity `sign`
    pub fn lit(var: Var, sign: bool) -> Lit {
        Lit::new(var, sign)
    }

    /// Number of variables allocated by this context
    pub fn num_vars(&self) -> u32 {
        self.next_var - self.first_var
    }

    /// Number of variables bound to gate values
    pub fn num_bound(&self) -> usize {
        self.vars.len()
    }

    /// First index not used by this context
    pub fn next_free(&self) -> u32 {
        self.next_var
    }

    /// Iterate over bound keys in allocation order
    pub fn bindings(&self) -> impl Iterator<Item = (VarKey, Var)> + '_ {
        self.vars.iter().map(|(&k, &v)| (k, v))
    }

    pub fn is_defined(&self, key: VarKey) -> bool {
        self.defined.contains(&key)
    }

    /// Keys that were read but never defined, in first-read order
    ///
    /// Their variables are unconstrained in the emitted formula.
    pub fn undriven(&self) -> Vec<VarKey> {
        self.read
            .iter()
            .filter(|key| !self.defined.contains(*key))
            .copied()
            .collect()
    }

    fn alloc(&mut self) -> Var {
        let var = Var::from_raw(self.next_var);
        self.next_var += 1;
        var
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
