//! Tseitin encoder for gate networks
//!
//! Each gate at each version gets an output variable constrained to equal the
//! gate's function of its input variables. Inverted input references fold into
//! literal signs and cost nothing.
//!
//! # Clause budget per gate
//!
//! | Function                  | Clauses   | Auxiliaries |
//! |---------------------------|-----------|-------------|
//! | ZERO / ONE                | 1         | 0           |
//! | BUF / NOT                 | 2         | 0           |
//! | AND / NAND / OR / NOR (n) | n + 1     | 0           |
//! | XOR / XNOR (n >= 2)       | 4 (n - 1) | n - 2       |
//! | LATCH                     | 9         | 2           |
//! | DFF                       | 2         | 0           |
//! | DFFRS                     | 6         | 1           |
//!
//! # Sequential semantics
//!
//! Triggers are only encoded at versions > 0. A latch is lowered to
//! `Q(t) = ENA ? D : Q(t-1)`. Flip-flops assume a synchronous design, so the
//! clock is not modeled: `Q(t) = D` and `Q(t) = ~RST & (SET | D)`.

use crate::context::{Context, Role, Version};
use crate::error::{EncodeError, EncodeResult};
use crate::sat::{ClauseSink, Lit};
use gatecnf_net::{Gate, GateId, GateKind, LogicOp, Network, Signal};
use serde::{Deserialize, Serialize};

/// Encoder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Reject values that are read but never defined when the session finishes
    pub strict_reads: bool,
    /// Check every gate of a network before emitting the first clause
    pub validate_first: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            strict_reads: false,
            validate_first: true,
        }
    }
}

impl EncoderConfig {
    /// Strict preset: every read value must be defined by some encoding
    pub fn strict() -> Self {
        Self {
            strict_reads: true,
            ..Default::default()
        }
    }

    pub fn with_strict_reads(mut self, strict: bool) -> Self {
        self.strict_reads = strict;
        self
    }

    pub fn with_validate_first(mut self, validate: bool) -> Self {
        self.validate_first = validate;
        self
    }
}

/// Encoding statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Gates encoded (sources excluded)
    pub gates: usize,
    /// Clauses emitted
    pub clauses: usize,
    /// Auxiliary variables allocated
    pub aux_vars: usize,
}

/// Tseitin encoder
pub struct Encoder<S: ClauseSink> {
    context: Context,
    sink: S,
    config: EncoderConfig,
    stats: EncodeStats,
}

impl<S: ClauseSink> Encoder<S> {
    /// Create an encoder with a fresh context
    pub fn new(sink: S) -> Self {
        Self::with_context(Context::new(), sink)
    }

    /// Create an encoder continuing an existing context
    pub fn with_context(context: Context, sink: S) -> Self {
        Self {
            context,
            sink,
            config: EncoderConfig::default(),
            stats: EncodeStats::default(),
        }
    }

    pub fn with_config(mut self, config: EncoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn stats(&self) -> EncodeStats {
        self.stats
    }

    /// Split into context and sink without further checks
    pub fn into_parts(self) -> (Context, S) {
        (self.context, self.sink)
    }

    /// End the session, checking for undriven reads in strict mode
    pub fn finish(self) -> EncodeResult<(Context, S)> {
        if self.config.strict_reads {
            let keys = self.context.undriven();
            if let Some(&first) = keys.first() {
                log::warn!("{} undriven value(s), first {}", keys.len(), first);
                return Err(EncodeError::Undriven {
                    count: keys.len(),
                    first,
                    keys,
                });
            }
        }
        Ok(self.into_parts())
    }

    // ------------------------------------------------------------------------
    // Gate-level encoding
    // ------------------------------------------------------------------------

    /// Encode every non-source gate of `net` at `version`
    pub fn encode(&mut self, net: &Network, version: Version) -> EncodeResult<()> {
        if self.config.validate_first {
            for (slot, gate) in net.gates().enumerate() {
                self.check_gate(net, GateId(slot as u32), gate, version)?;
            }
        }

        let before = self.stats;
        for (slot, gate) in net.gates().enumerate() {
            if !self.config.validate_first {
                self.check_gate(net, GateId(slot as u32), gate, version)?;
            }
            self.encode_checked(net, gate, version)?;
        }

        log::debug!(
            "encoded '{}' at version {}: {} gates, {} clauses, {} aux vars",
            net.name,
            version,
            self.stats.gates - before.gates,
            self.stats.clauses - before.clauses,
            self.stats.aux_vars - before.aux_vars
        );
        Ok(())
    }

    /// Encode a single gate of `net` at `version`
    pub fn encode_gate(
        &mut self,
        net: &Network,
        id: GateId,
        version: Version,
    ) -> EncodeResult<()> {
        let gate = net
            .gate(id)
            .ok_or(EncodeError::UnknownGate { gate: id, version })?;
        self.check_gate(net, id, gate, version)?;
        self.encode_checked(net, gate, version)
    }

    /// `slot` is the arena position `gate` was found at
    fn check_gate(
        &self,
        net: &Network,
        slot: GateId,
        gate: &Gate,
        version: Version,
    ) -> EncodeResult<()> {
        // Variables are keyed by the stored identity, so it must name the slot
        if gate.id() != slot {
            return Err(EncodeError::MisplacedGate {
                slot,
                claimed: gate.id(),
                version,
            });
        }

        let symbol = gate.symbol();
        let inputs = gate.inputs();

        let expected = symbol.arity();
        if !expected.accepts(inputs.len()) {
            return Err(EncodeError::Arity {
                gate: gate.id(),
                symbol,
                version,
                expected,
                actual: inputs.len(),
            });
        }

        if gate.is_trigger() && version == 0 {
            return Err(EncodeError::SequentialAtVersionZero {
                gate: gate.id(),
                symbol,
            });
        }

        if let Some(bad) = inputs.iter().find(|s| net.gate(s.gate).is_none()) {
            return Err(EncodeError::UnknownInput {
                gate: gate.id(),
                input: bad.gate,
                version,
            });
        }

        Ok(())
    }

    fn encode_checked(&mut self, net: &Network, gate: &Gate, version: Version) -> EncodeResult<()> {
        match gate.kind() {
            GateKind::Source => return Ok(()),
            GateKind::Constant(value) => {
                let y = self.output(gate, version, *value);
                self.encode_fix(y);
            }
            GateKind::Logic {
                op,
                negated,
                inputs,
            } => {
                let y = self.output(gate, version, !negated);
                let xs = self.inputs(net, inputs, version)?;
                match op {
                    LogicOp::Buf => self.encode_buf(y, xs[0]),
                    LogicOp::And => self.encode_and(y, &xs),
                    LogicOp::Or => self.encode_or(y, &xs),
                    LogicOp::Xor => self.encode_xor(y, &xs),
                }
            }
            GateKind::Latch { d, ena } => {
                // Q(t) = ENA ? D : Q(t-1)
                let qt = self.output(gate, version, true);
                let qp = Lit::positive(self.context.var(gate, version, Role::Current));
                let d = self.input(net, *d, version)?;
                let ena = self.input(net, *ena, version)?;
                self.encode_mux(qt, ena, d, qp);
            }
            GateKind::Dff { d, .. } => {
                // Synchronous design: Q(t) = D
                let qt = self.output(gate, version, true);
                let d = self.input(net, *d, version)?;
                self.encode_buf(qt, d);
            }
            GateKind::DffRs { d, rst, set, .. } => {
                // Synchronous design: Q(t) = ~RST & (SET | D)
                let qt = self.output(gate, version, true);
                let d = self.input(net, *d, version)?;
                let rst = self.input(net, *rst, version)?;
                let set = self.input(net, *set, version)?;
                let tmp = self.aux();
                self.encode_and2(qt, !rst, tmp);
                self.encode_or2(tmp, set, d);
            }
        }

        self.stats.gates += 1;
        Ok(())
    }

    /// Output literal of `gate` with polarity `sign`
    fn output(&mut self, gate: &Gate, version: Version, sign: bool) -> Lit {
        Context::lit(self.context.var(gate, version, Role::Next), sign)
    }

    /// Literal that is true when `signal` is true
    fn input(&mut self, net: &Network, signal: Signal, version: Version) -> EncodeResult<Lit> {
        let gate = net.gate(signal.gate).ok_or(EncodeError::UnknownGate {
            gate: signal.gate,
            version,
        })?;
        let x = self.context.var(gate, version, Role::Current);
        Ok(Context::lit(x, !signal.inverted))
    }

    fn inputs(
        &mut self,
        net: &Network,
        signals: &[Signal],
        version: Version,
    ) -> EncodeResult<Vec<Lit>> {
        signals
            .iter()
            .map(|&s| self.input(net, s, version))
            .collect()
    }

    fn aux(&mut self) -> Lit {
        self.stats.aux_vars += 1;
        Lit::positive(self.context.new_var())
    }

    fn emit(&mut self, clause: &[Lit]) {
        self.stats.clauses += 1;
        self.sink.add_clause(clause);
    }

    // ------------------------------------------------------------------------
    // Clause-level rules
    //
    // Every rule constrains the literal `y` to a function of the operand
    // literals. Passing `!y` or `!x` encodes the complemented form.
    // ------------------------------------------------------------------------

    /// y
    pub fn encode_fix(&mut self, y: Lit) {
        self.emit(&[y]);
    }

    /// y <-> x
    pub fn encode_buf(&mut self, y: Lit, x: Lit) {
        self.emit(&[!y, x]);
        self.emit(&[y, !x]);
    }

    /// y <-> x1 & ... & xn
    pub fn encode_and(&mut self, y: Lit, xs: &[Lit]) {
        let mut clause = Vec::with_capacity(xs.len() + 1);
        clause.push(y);
        for &x in xs {
            clause.push(!x);
            self.emit(&[!y, x]);
        }
        self.emit(&clause);
    }

    /// y <-> x1 | ... | xn
    pub fn encode_or(&mut self, y: Lit, xs: &[Lit]) {
        let mut clause = Vec::with_capacity(xs.len() + 1);
        clause.push(!y);
        for &x in xs {
            clause.push(x);
            self.emit(&[y, !x]);
        }
        self.emit(&clause);
    }

    /// y <-> x1 ^ ... ^ xn
    ///
    /// Folded as y = x1 ^ t2, t2 = x2 ^ t3, ..., t(n-1) = x(n-1) ^ xn.
    pub fn encode_xor(&mut self, y: Lit, xs: &[Lit]) {
        match xs.len() {
            0 => self.encode_fix(!y),
            1 => self.encode_buf(y, xs[0]),
            n => {
                let mut y = y;
                for i in 0..n - 1 {
                    let x1 = xs[i];
                    let x2 = if i == n - 2 { xs[n - 1] } else { self.aux() };
                    self.encode_xor2(y, x1, x2);
                    y = x2;
                }
            }
        }
    }

    /// y <-> x1 & x2
    pub fn encode_and2(&mut self, y: Lit, x1: Lit, x2: Lit) {
        self.emit(&[y, !x1, !x2]);
        self.emit(&[!y, x1]);
        self.emit(&[!y, x2]);
    }

    /// y <-> x1 | x2
    pub fn encode_or2(&mut self, y: Lit, x1: Lit, x2: Lit) {
        self.emit(&[!y, x1, x2]);
        self.emit(&[y, !x1]);
        self.emit(&[y, !x2]);
    }

    /// y <-> x1 ^ x2
    pub fn encode_xor2(&mut self, y: Lit, x1: Lit, x2: Lit) {
        self.emit(&[!y, !x1, !x2]);
        self.emit(&[!y, x1, x2]);
        self.emit(&[y, !x1, x2]);
        self.emit(&[y, x1, !x2]);
    }

    /// y <-> c ? x1 : x2
    pub fn encode_mux(&mut self, y: Lit, c: Lit, x1: Lit, x2: Lit) {
        // y = t1 | t2, where t1 = c & x1 and t2 = ~c & x2
        let t1 = self.aux();
        let t2 = self.aux();
        self.encode_or2(y, t1, t2);
        self.encode_and2(t1, c, x1);
        self.encode_and2(t2, !c, x2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::Cnf;
    use gatecnf_net::GateSymbol;

    fn s(id: GateId) -> Signal {
        Signal::new(id)
    }

    fn single_gate(symbol: GateSymbol, arity: usize) -> (Network, GateId) {
        let mut net = Network::new(symbol.name());
        let inputs: Vec<Signal> = (0..arity).map(|_| s(net.add_in())).collect();
        let y = net.add_gate(symbol, inputs).unwrap();
        (net, y)
    }

    #[test]
    fn test_clause_counts() {
        for arity in 1..=5 {
            for symbol in [GateSymbol::And, GateSymbol::Nand, GateSymbol::Or, GateSymbol::Nor] {
                let (net, _) = single_gate(symbol, arity);
                let mut enc = Encoder::new(Cnf::new());
                enc.encode(&net, 0).unwrap();
                assert_eq!(enc.sink().len(), arity + 1, "{} arity {}", symbol, arity);
                assert_eq!(enc.stats().aux_vars, 0);
            }
        }

        for arity in 2..=5 {
            for symbol in [GateSymbol::Xor, GateSymbol::Xnor] {
                let (net, _) = single_gate(symbol, arity);
                let mut enc = Encoder::new(Cnf::new());
                enc.encode(&net, 0).unwrap();
                assert_eq!(enc.sink().len(), 4 * (arity - 1));
                assert_eq!(enc.stats().aux_vars, arity - 2);
            }
        }

        let (net, _) = single_gate(GateSymbol::Xor, 1);
        let mut enc = Encoder::new(Cnf::new());
        enc.encode(&net, 0).unwrap();
        assert_eq!(enc.sink().len(), 2);
    }

    #[test]
    fn test_sequential_clause_counts() {
        let cases = [
            (GateSymbol::Latch, 2, 9, 2),
            (GateSymbol::Dff, 2, 2, 0),
            (GateSymbol::DffRs, 4, 6, 1),
        ];
        for (symbol, arity, clauses, aux) in cases {
            let (net, _) = single_gate(symbol, arity);
            let mut enc = Encoder::new(Cnf::new());
            enc.encode(&net, 1).unwrap();
            assert_eq!(enc.sink().len(), clauses, "{}", symbol);
            assert_eq!(enc.stats().aux_vars, aux, "{}", symbol);
            assert_eq!(enc.stats().gates, 1);
        }
    }

    #[test]
    fn test_three_input_and_clauses() {
        let (net, y) = single_gate(GateSymbol::And, 3);
        let mut enc = Encoder::new(Cnf::new());
        enc.encode_gate(&net, y, 0).unwrap();

        let ctx = enc.context();
        let yv = ctx.lookup(net.gate(y).unwrap(), 0, Role::Next).unwrap();
        let xs: Vec<Lit> = net
            .inputs()
            .iter()
            .map(|&i| Lit::positive(ctx.lookup(net.gate(i).unwrap(), 0, Role::Current).unwrap()))
            .collect();

        let clauses = enc.sink().clauses();
        assert_eq!(clauses.len(), 4);
        assert!(clauses.contains(&vec![Lit::positive(yv), !xs[0], !xs[1], !xs[2]]));
        for x in xs {
            assert!(clauses.contains(&vec![Lit::negative(yv), x]));
        }
    }

    #[test]
    fn test_inverted_inputs_fold_into_literals() {
        let mut net = Network::new("inv");
        let a = net.add_in();
        let b = net.add_in();
        let y = net.add_and(&[Signal::not(a), s(b)]).unwrap();

        let mut enc = Encoder::new(Cnf::new());
        enc.encode(&net, 0).unwrap();

        let ctx = enc.context();
        let av = ctx.lookup(net.gate(a).unwrap(), 0, Role::Current).unwrap();
        let yv = ctx.lookup(net.gate(y).unwrap(), 0, Role::Next).unwrap();

        assert_eq!(enc.sink().len(), 3);
        assert!(enc
            .sink()
            .clauses()
            .contains(&vec![Lit::negative(yv), Lit::negative(av)]));
    }

    #[test]
    fn test_constant_unit_clauses() {
        let mut net = Network::new("consts");
        let zero = net.add_const(false);
        let one = net.add_const(true);

        let mut enc = Encoder::new(Cnf::new());
        enc.encode(&net, 0).unwrap();

        let ctx = enc.context();
        let z = ctx.lookup(net.gate(zero).unwrap(), 0, Role::Next).unwrap();
        let o = ctx.lookup(net.gate(one).unwrap(), 0, Role::Next).unwrap();
        assert_eq!(
            enc.sink().clauses(),
            &[vec![Lit::negative(z)], vec![Lit::positive(o)]]
        );
    }

    #[test]
    fn test_sequential_at_version_zero() {
        let mut net = Network::new("seq");
        let d = net.add_in();
        let ena = net.add_in();
        let x = net.add_not(s(d)).unwrap();
        let q = net.add_latch(s(x), s(ena)).unwrap();

        let mut enc = Encoder::new(Cnf::new());
        let err = enc.encode(&net, 0).unwrap_err();
        assert_eq!(
            err,
            EncodeError::SequentialAtVersionZero {
                gate: q,
                symbol: GateSymbol::Latch,
            }
        );
        // Nothing emitted for the gates before the latch
        assert!(enc.sink().is_empty());

        let err = enc.encode_gate(&net, q, 0).unwrap_err();
        assert!(matches!(err, EncodeError::SequentialAtVersionZero { .. }));

        // Combinational gates alone are fine at version 0
        enc.encode_gate(&net, x, 0).unwrap();
        assert_eq!(enc.sink().len(), 2);
    }

    #[test]
    fn test_unknown_gate() {
        let (net, _) = single_gate(GateSymbol::And, 2);
        let mut enc = Encoder::new(Cnf::new());

        let err = enc.encode_gate(&net, GateId(42), 3).unwrap_err();
        assert_eq!(
            err,
            EncodeError::UnknownGate {
                gate: GateId(42),
                version: 3,
            }
        );
    }

    #[test]
    fn test_lazy_order_independence() {
        let mut net = Network::new("chain");
        let a = net.add_in();
        let b = net.add_in();
        let x = net.add_xor(&[s(a), s(b)]).unwrap();
        let y = net.add_or(&[s(x), s(a)]).unwrap();

        let mut forward = Encoder::new(Cnf::new());
        forward.encode_gate(&net, x, 0).unwrap();
        forward.encode_gate(&net, y, 0).unwrap();

        let mut backward = Encoder::new(Cnf::new());
        backward.encode_gate(&net, y, 0).unwrap();
        backward.encode_gate(&net, x, 0).unwrap();

        assert_eq!(forward.sink().len(), backward.sink().len());
        assert_eq!(forward.context().num_vars(), backward.context().num_vars());
        assert!(forward.context().undriven().is_empty());
        assert!(backward.context().undriven().is_empty());
    }

    #[test]
    fn test_strict_reads() {
        let mut net = Network::new("partial");
        let a = net.add_in();
        let x = net.add_not(s(a)).unwrap();
        let y = net.add_buf(s(x)).unwrap();

        // Only y is encoded; x stays free
        let mut lenient = Encoder::new(Cnf::new());
        lenient.encode_gate(&net, y, 0).unwrap();
        assert!(lenient.finish().is_ok());

        let mut strict = Encoder::new(Cnf::new()).with_config(EncoderConfig::strict());
        strict.encode_gate(&net, y, 0).unwrap();
        match strict.finish() {
            Err(EncodeError::Undriven { count, first, .. }) => {
                assert_eq!(count, 1);
                assert_eq!(first.gate, x);
                assert_eq!(first.version, 0);
            }
            other => panic!("expected undriven error, got {:?}", other.map(|_| ())),
        }

        let mut complete = Encoder::new(Cnf::new()).with_config(EncoderConfig::strict());
        complete.encode(&net, 0).unwrap();
        assert!(complete.finish().is_ok());
    }

    #[test]
    fn test_stats_accumulate() {
        let (net, _) = single_gate(GateSymbol::Nor, 3);
        let mut enc = Encoder::new(Cnf::new());
        enc.encode(&net, 0).unwrap();
        enc.encode(&net, 1).unwrap();

        let stats = enc.stats();
        assert_eq!(stats.gates, 2);
        assert_eq!(stats.clauses, 8);
        assert_eq!(enc.sink().len(), 8);
    }
}
