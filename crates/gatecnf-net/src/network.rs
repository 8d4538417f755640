//! Gate Network
//!
//! An arena of gates indexed by [`GateId`]. Feedback is only legal through
//! sequential gates; a flip-flop whose data input depends on its own output is
//! built by adding the flip-flop first and wiring it up with
//! [`Network::reconnect`] once the driving logic exists.

use crate::error::{NetError, NetResult};
use crate::gate::{Gate, GateId, GateKind, GateSymbol, LogicOp, Signal};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Gate-level network
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    /// Design name
    pub name: String,

    /// All gates, indexed by `GateId`
    gates: Vec<Gate>,

    /// Primary inputs in creation order
    inputs: Vec<GateId>,

    /// Declared outputs
    outputs: Vec<Signal>,

    /// Shared constant-zero leaf (created on first use)
    const_zero: Option<GateId>,
}

impl Network {
    /// Create an empty network
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get the number of gates
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Get a gate by ID
    pub fn gate(&self, id: GateId) -> Option<&Gate> {
        self.gates.get(id.index())
    }

    /// Iterate over all gates in ID order
    pub fn gates(&self) -> impl Iterator<Item = &Gate> + '_ {
        self.gates.iter()
    }

    /// Primary inputs
    pub fn inputs(&self) -> &[GateId] {
        &self.inputs
    }

    /// Declared outputs
    pub fn outputs(&self) -> &[Signal] {
        &self.outputs
    }

    /// Iterate over latches and flip-flops
    pub fn triggers(&self) -> impl Iterator<Item = &Gate> + '_ {
        self.gates.iter().filter(|g| g.is_trigger())
    }

    /// Get the number of AND gates (any arity, either output sign)
    pub fn and_count(&self) -> usize {
        self.gates
            .iter()
            .filter(|g| {
                matches!(
                    g.kind(),
                    GateKind::Logic {
                        op: LogicOp::And,
                        ..
                    }
                )
            })
            .count()
    }

    /// Add a primary input
    pub fn add_in(&mut self) -> GateId {
        let id = self.push(GateKind::Source);
        self.inputs.push(id);
        id
    }

    /// Add a dedicated constant gate
    pub fn add_const(&mut self, value: bool) -> GateId {
        self.push(GateKind::Constant(value))
    }

    /// Reference to a constant value through the shared zero leaf
    pub fn constant(&mut self, value: bool) -> Signal {
        let zero = match self.const_zero {
            Some(id) => id,
            None => {
                let id = self.add_const(false);
                self.const_zero = Some(id);
                id
            }
        };
        Signal::new(zero).invert_if(value)
    }

    /// Constant value carried by a signal, if its driver is a constant gate
    pub fn const_value(&self, signal: Signal) -> Option<bool> {
        match self.gate(signal.gate)?.kind() {
            GateKind::Constant(value) => Some(*value ^ signal.inverted),
            _ => None,
        }
    }

    /// Add a gate from a flat symbol and input list
    pub fn add_gate(&mut self, symbol: GateSymbol, inputs: Vec<Signal>) -> NetResult<GateId> {
        self.check_refs(&inputs)?;
        let kind = GateKind::from_symbol(symbol, inputs)?;
        let id = self.push(kind);
        if symbol == GateSymbol::In {
            self.inputs.push(id);
        }
        Ok(id)
    }

    pub fn add_buf(&mut self, x: Signal) -> NetResult<GateId> {
        self.add_gate(GateSymbol::Buf, vec![x])
    }

    pub fn add_not(&mut self, x: Signal) -> NetResult<GateId> {
        self.add_gate(GateSymbol::Not, vec![x])
    }

    pub fn add_and(&mut self, inputs: &[Signal]) -> NetResult<GateId> {
        self.add_gate(GateSymbol::And, inputs.to_vec())
    }

    pub fn add_nand(&mut self, inputs: &[Signal]) -> NetResult<GateId> {
        self.add_gate(GateSymbol::Nand, inputs.to_vec())
    }

    pub fn add_or(&mut self, inputs: &[Signal]) -> NetResult<GateId> {
        self.add_gate(GateSymbol::Or, inputs.to_vec())
    }

    pub fn add_nor(&mut self, inputs: &[Signal]) -> NetResult<GateId> {
        self.add_gate(GateSymbol::Nor, inputs.to_vec())
    }

    pub fn add_xor(&mut self, inputs: &[Signal]) -> NetResult<GateId> {
        self.add_gate(GateSymbol::Xor, inputs.to_vec())
    }

    pub fn add_xnor(&mut self, inputs: &[Signal]) -> NetResult<GateId> {
        self.add_gate(GateSymbol::Xnor, inputs.to_vec())
    }

    /// Add a D latch (Q; D, ENA)
    pub fn add_latch(&mut self, d: Signal, ena: Signal) -> NetResult<GateId> {
        self.add_gate(GateSymbol::Latch, vec![d, ena])
    }

    /// Add a D flip-flop (Q; D, CLK)
    pub fn add_dff(&mut self, d: Signal, clk: Signal) -> NetResult<GateId> {
        self.add_gate(GateSymbol::Dff, vec![d, clk])
    }

    /// Add a D flip-flop with reset and set (Q; D, CLK, RST, SET)
    pub fn add_dffrs(
        &mut self,
        d: Signal,
        clk: Signal,
        rst: Signal,
        set: Signal,
    ) -> NetResult<GateId> {
        self.add_gate(GateSymbol::DffRs, vec![d, clk, rst, set])
    }

    /// Declare an output
    pub fn add_output(&mut self, signal: Signal) {
        self.outputs.push(signal);
    }

    /// Replace the inputs of an existing gate, keeping its function
    pub fn reconnect(&mut self, id: GateId, inputs: Vec<Signal>) -> NetResult<()> {
        self.check_refs(&inputs)?;
        let symbol = self.gate(id).ok_or(NetError::UnknownGate(id))?.symbol();
        let kind = GateKind::from_symbol(symbol, inputs)?;
        self.gates[id.index()].set_kind(kind);
        Ok(())
    }

    /// Check that every gate sits at the slot its identity names, every
    /// reference (inputs and outputs) points into the network and every gate
    /// has a legal input count
    ///
    /// Networks built through the API always pass; deserialized ones may not.
    pub fn validate(&self) -> NetResult<()> {
        for (position, gate) in self.gates.iter().enumerate() {
            if gate.id().index() != position {
                return Err(NetError::MisplacedGate {
                    position,
                    claimed: gate.id(),
                });
            }
            let inputs = gate.inputs();
            let expected = gate.symbol().arity();
            if !expected.accepts(inputs.len()) {
                return Err(NetError::Arity {
                    symbol: gate.symbol(),
                    expected,
                    actual: inputs.len(),
                });
            }
            self.check_refs(&inputs)?;
        }
        for &input in &self.inputs {
            if self.gate(input).is_none() {
                return Err(NetError::UnknownGate(input));
            }
        }
        self.check_refs(&self.outputs)
    }

    /// Gates in the transitive fanin of the outputs, in ID order
    ///
    /// Sequential feedback is followed, so the state logic of every reachable
    /// trigger is included.
    pub fn reachable(&self) -> Vec<GateId> {
        let mut seen = vec![false; self.gates.len()];
        let mut stack: Vec<GateId> = self.outputs.iter().map(|s| s.gate).collect();

        while let Some(id) = stack.pop() {
            let Some(gate) = self.gate(id) else {
                continue;
            };
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            stack.extend(gate.inputs().iter().map(|s| s.gate));
        }

        seen.iter()
            .enumerate()
            .filter(|(_, visited)| **visited)
            .map(|(i, _)| GateId(i as u32))
            .collect()
    }

    /// Order gates so that every combinational gate follows its drivers
    ///
    /// Sources, constants and triggers have no ordering constraints: a trigger's
    /// output is the state from the previous step, so its inputs may come later.
    pub fn topological_order(&self) -> NetResult<Vec<GateId>> {
        let n = self.gates.len();
        let mut pending = vec![0usize; n];
        let mut fanouts: Vec<Vec<GateId>> = vec![Vec::new(); n];

        // Slots, not stored identities, so a corrupt identity cannot index out
        // of bounds
        for (position, gate) in self.gates.iter().enumerate() {
            if gate.is_trigger() {
                continue;
            }
            for input in gate.inputs() {
                if input.gate.index() >= n {
                    return Err(NetError::UnknownGate(input.gate));
                }
                pending[position] += 1;
                fanouts[input.gate.index()].push(GateId(position as u32));
            }
        }

        let mut ready: VecDeque<GateId> = (0..n)
            .filter(|&i| pending[i] == 0)
            .map(|i| GateId(i as u32))
            .collect();
        let mut order = Vec::with_capacity(n);

        while let Some(id) = ready.pop_front() {
            order.push(id);
            for &next in &fanouts[id.index()] {
                pending[next.index()] -= 1;
                if pending[next.index()] == 0 {
                    ready.push_back(next);
                }
            }
        }

        if order.len() < n {
            let stuck = (0..n)
                .find(|&i| pending[i] > 0)
                .map(|i| GateId(i as u32))
                .unwrap_or(GateId(0));
            return Err(NetError::CombinationalCycle(stuck));
        }

        Ok(order)
    }

    fn push(&mut self, kind: GateKind) -> GateId {
        let id = GateId(self.gates.len() as u32);
        self.gates.push(Gate::from_kind(id, kind));
        id
    }

    fn check_refs(&self, signals: &[Signal]) -> NetResult<()> {
        match signals.iter().find(|s| s.gate.index() >= self.gates.len()) {
            Some(bad) => Err(NetError::UnknownGate(bad.gate)),
            None => Ok(()),
        }
    }
}
