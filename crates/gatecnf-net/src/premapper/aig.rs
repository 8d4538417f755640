//! AIG premapper
//!
//! Rewrites a network so that every gate other than inputs, constants and
//! triggers is a 2-input AND. Buffers and inverters disappear into signed
//! references, OR is expressed through De Morgan and XOR through three ANDs.
//!
//! # Folding n-ary gates
//!
//! An n-input gate becomes a binary tree of n-1 two-input steps. The shape is
//! chosen by [`SplitPolicy`]:
//!
//! - `Balanced` pairs operands level by level (depth ceil(log2 n))
//! - `LeftDeep` chains operands in input order (depth n-1)
//!
//! Constant inputs are folded away before the tree is built.

use super::{remap_inputs, GateIdMap, PreMapper};
use crate::error::{NetError, NetResult};
use crate::gate::{Gate, GateKind, LogicOp, Signal};
use crate::network::Network;
use serde::{Deserialize, Serialize};

/// Tree shape for n-ary gate folding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SplitPolicy {
    /// Minimum depth
    #[default]
    Balanced,
    /// Operands combined in input order
    LeftDeep,
}

/// AIG premapper configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AigMapperConfig {
    /// Tree shape for n-ary gates
    pub split: SplitPolicy,
    /// Fold constant inputs and trivial 2-input cases (x&x, x&~x)
    pub fold_constants: bool,
}

impl Default for AigMapperConfig {
    fn default() -> Self {
        Self {
            split: SplitPolicy::Balanced,
            fold_constants: true,
        }
    }
}

impl AigMapperConfig {
    /// Structure-preserving mapping: left-deep trees, no folding
    pub fn literal() -> Self {
        Self {
            split: SplitPolicy::LeftDeep,
            fold_constants: false,
        }
    }

    pub fn with_split(mut self, split: SplitPolicy) -> Self {
        self.split = split;
        self
    }

    pub fn with_fold_constants(mut self, fold: bool) -> Self {
        self.fold_constants = fold;
        self
    }
}

/// Netlist-to-AIG premapper
#[derive(Debug, Clone, Default)]
pub struct AigMapper {
    config: AigMapperConfig,
}

impl AigMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AigMapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AigMapperConfig {
        &self.config
    }

    /// 2-input AND with local simplification
    fn and2(&self, net: &mut Network, a: Signal, b: Signal) -> NetResult<Signal> {
        if self.config.fold_constants {
            match (net.const_value(a), net.const_value(b)) {
                (Some(false), _) | (_, Some(false)) => return Ok(net.constant(false)),
                (Some(true), _) => return Ok(b),
                (_, Some(true)) => return Ok(a),
                _ => {}
            }
            if a == b {
                return Ok(a);
            }
            if a == b.invert() {
                return Ok(net.constant(false));
            }
        }
        Ok(Signal::new(net.add_and(&[a, b])?))
    }

    /// 2-input XOR: (a & ~b) | (~a & b)
    fn xor2(&self, net: &mut Network, a: Signal, b: Signal) -> NetResult<Signal> {
        if self.config.fold_constants {
            if let Some(av) = net.const_value(a) {
                return Ok(b.invert_if(av));
            }
            if let Some(bv) = net.const_value(b) {
                return Ok(a.invert_if(bv));
            }
            if a == b {
                return Ok(net.constant(false));
            }
            if a == b.invert() {
                return Ok(net.constant(true));
            }
        }
        let t1 = self.and2(net, a, b.invert())?;
        let t2 = self.and2(net, a.invert(), b)?;
        Ok(self.and2(net, t1.invert(), t2.invert())?.invert())
    }

    /// N-input AND
    fn map_and(&self, net: &mut Network, inputs: Vec<Signal>) -> NetResult<Signal> {
        let mut operands = Vec::with_capacity(inputs.len());
        for input in inputs {
            match self.fold(net, input) {
                Some(false) => return Ok(net.constant(false)),
                Some(true) => {}
                None => operands.push(input),
            }
        }
        if operands.is_empty() {
            return Ok(net.constant(true));
        }
        self.reduce(net, operands, |m, net, a, b| m.and2(net, a, b))
    }

    /// N-input OR: ~AND(~x1, ..., ~xn)
    fn map_or(&self, net: &mut Network, inputs: Vec<Signal>) -> NetResult<Signal> {
        let inverted = inputs.into_iter().map(Signal::invert).collect();
        Ok(self.map_and(net, inverted)?.invert())
    }

    /// N-input XOR; constant-one inputs flip the result
    fn map_xor(&self, net: &mut Network, inputs: Vec<Signal>) -> NetResult<Signal> {
        let mut parity = false;
        let mut operands = Vec::with_capacity(inputs.len());
        for input in inputs {
            match self.fold(net, input) {
                Some(value) => parity ^= value,
                None => operands.push(input),
            }
        }
        if operands.is_empty() {
            return Ok(net.constant(parity));
        }
        let result = self.reduce(net, operands, |m, net, a, b| m.xor2(net, a, b))?;
        Ok(result.invert_if(parity))
    }

    fn fold(&self, net: &Network, signal: Signal) -> Option<bool> {
        if self.config.fold_constants {
            net.const_value(signal)
        } else {
            None
        }
    }

    /// Combine a non-empty operand list into a binary tree
    fn reduce<F>(&self, net: &mut Network, mut lits: Vec<Signal>, mut op: F) -> NetResult<Signal>
    where
        F: FnMut(&Self, &mut Network, Signal, Signal) -> NetResult<Signal>,
    {
        match self.config.split {
            SplitPolicy::Balanced => {
                while lits.len() > 1 {
                    let mut next_level = Vec::with_capacity(lits.len().div_ceil(2));
                    for pair in lits.chunks(2) {
                        match *pair {
                            [a, b] => next_level.push(op(self, net, a, b)?),
                            [a] => next_level.push(a),
                            _ => unreachable!(),
                        }
                    }
                    lits = next_level;
                }
                Ok(lits[0])
            }
            SplitPolicy::LeftDeep => {
                let mut acc = lits[0];
                for &x in &lits[1..] {
                    acc = op(self, net, acc, x)?;
                }
                Ok(acc)
            }
        }
    }
}

impl PreMapper for AigMapper {
    fn name(&self) -> &str {
        "aig"
    }

    fn map_gate(
        &self,
        old_gate: &Gate,
        old_to_new: &GateIdMap,
        new_net: &mut Network,
    ) -> NetResult<Signal> {
        match old_gate.kind() {
            GateKind::Source => Ok(Signal::new(new_net.add_in())),
            GateKind::Constant(value) => Ok(new_net.constant(*value)),
            GateKind::Logic { op, negated, .. } => {
                let inputs = remap_inputs(old_gate, old_to_new)?;
                let mapped = match op {
                    LogicOp::Buf => match inputs[..] {
                        [x] => x,
                        _ => {
                            return Err(NetError::Arity {
                                symbol: old_gate.symbol(),
                                expected: old_gate.symbol().arity(),
                                actual: inputs.len(),
                            })
                        }
                    },
                    LogicOp::And => self.map_and(new_net, inputs)?,
                    LogicOp::Or => self.map_or(new_net, inputs)?,
                    LogicOp::Xor => self.map_xor(new_net, inputs)?,
                };
                Ok(mapped.invert_if(*negated))
            }
            GateKind::Latch { .. } | GateKind::Dff { .. } | GateKind::DffRs { .. } => {
                let inputs = remap_inputs(old_gate, old_to_new)?;
                Ok(Signal::new(new_net.add_gate(old_gate.symbol(), inputs)?))
            }
        }
    }
}
