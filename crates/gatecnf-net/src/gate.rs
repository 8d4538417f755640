//! Gates, signals and function symbols
//!
//! A gate's function is stored in tagged form ([`GateKind`]): each sequential
//! function carries exactly its named inputs, and combinational functions carry
//! an operator, an output sign and an input list. Arity is checked once, when the
//! gate is built from a flat [`GateSymbol`] and an input list.

use crate::error::{NetError, NetResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a gate within its network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GateId(pub u32);

impl GateId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

/// A reference to a gate output, optionally inverted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal {
    /// The driving gate
    pub gate: GateId,
    /// True if the reference reads the complement of the gate output
    pub inverted: bool,
}

impl Signal {
    /// Create a direct reference
    pub fn new(gate: GateId) -> Self {
        Self {
            gate,
            inverted: false,
        }
    }

    /// Create an inverted reference
    pub fn not(gate: GateId) -> Self {
        Self {
            gate,
            inverted: true,
        }
    }

    /// Flip the sign of this reference
    pub fn invert(self) -> Self {
        Self {
            gate: self.gate,
            inverted: !self.inverted,
        }
    }

    /// Flip the sign if `flip` is set
    pub fn invert_if(self, flip: bool) -> Self {
        Self {
            gate: self.gate,
            inverted: self.inverted ^ flip,
        }
    }
}

impl From<GateId> for Signal {
    fn from(gate: GateId) -> Self {
        Signal::new(gate)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            write!(f, "~{}", self.gate)
        } else {
            write!(f, "{}", self.gate)
        }
    }
}

/// Number of inputs a function accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }

    pub fn min_inputs(&self) -> usize {
        match *self {
            Arity::Exact(k) | Arity::AtLeast(k) => k,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(k) => write!(f, "exactly {}", k),
            Arity::AtLeast(k) => write!(f, "at least {}", k),
        }
    }
}

/// Flat gate function symbol, as handed over by a network producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateSymbol {
    /// Primary input
    In,
    Zero,
    One,
    Buf,
    Not,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,
    /// Level-sensitive latch (D, ENA)
    Latch,
    /// D flip-flop (D, CLK)
    Dff,
    /// D flip-flop with reset and set (D, CLK, RST, SET)
    DffRs,
}

impl GateSymbol {
    pub const ALL: [GateSymbol; 14] = [
        GateSymbol::In,
        GateSymbol::Zero,
        GateSymbol::One,
        GateSymbol::Buf,
        GateSymbol::Not,
        GateSymbol::And,
        GateSymbol::Nand,
        GateSymbol::Or,
        GateSymbol::Nor,
        GateSymbol::Xor,
        GateSymbol::Xnor,
        GateSymbol::Latch,
        GateSymbol::Dff,
        GateSymbol::DffRs,
    ];

    /// Number of inputs the function takes
    pub fn arity(&self) -> Arity {
        match self {
            GateSymbol::In | GateSymbol::Zero | GateSymbol::One => Arity::Exact(0),
            GateSymbol::Buf | GateSymbol::Not => Arity::Exact(1),
            GateSymbol::And
            | GateSymbol::Nand
            | GateSymbol::Or
            | GateSymbol::Nor
            | GateSymbol::Xor
            | GateSymbol::Xnor => Arity::AtLeast(1),
            GateSymbol::Latch | GateSymbol::Dff => Arity::Exact(2),
            GateSymbol::DffRs => Arity::Exact(4),
        }
    }

    /// Check if this is a state-holding function
    pub fn is_sequential(&self) -> bool {
        matches!(self, GateSymbol::Latch | GateSymbol::Dff | GateSymbol::DffRs)
    }

    pub fn name(&self) -> &'static str {
        match self {
            GateSymbol::In => "IN",
            GateSymbol::Zero => "ZERO",
            GateSymbol::One => "ONE",
            GateSymbol::Buf => "BUF",
            GateSymbol::Not => "NOT",
            GateSymbol::And => "AND",
            GateSymbol::Nand => "NAND",
            GateSymbol::Or => "OR",
            GateSymbol::Nor => "NOR",
            GateSymbol::Xor => "XOR",
            GateSymbol::Xnor => "XNOR",
            GateSymbol::Latch => "LATCH",
            GateSymbol::Dff => "DFF",
            GateSymbol::DffRs => "DFFRS",
        }
    }
}

impl fmt::Display for GateSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GateSymbol {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let symbol = match upper.as_str() {
            "IN" | "INPUT" | "SOURCE" => GateSymbol::In,
            "ZERO" | "0" | "GND" => GateSymbol::Zero,
            "ONE" | "1" | "VCC" => GateSymbol::One,
            "BUF" | "NOP" => GateSymbol::Buf,
            "NOT" | "INV" => GateSymbol::Not,
            "AND" => GateSymbol::And,
            "NAND" => GateSymbol::Nand,
            "OR" => GateSymbol::Or,
            "NOR" => GateSymbol::Nor,
            "XOR" => GateSymbol::Xor,
            "XNOR" => GateSymbol::Xnor,
            "LATCH" => GateSymbol::Latch,
            "DFF" => GateSymbol::Dff,
            "DFFRS" => GateSymbol::DffRs,
            _ => return Err(NetError::UnknownSymbol(s.to_string())),
        };
        Ok(symbol)
    }
}

/// Combinational operator family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOp {
    Buf,
    And,
    Or,
    Xor,
}

/// Tagged gate function with its inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateKind {
    /// Primary input
    Source,

    /// Constant value
    Constant(bool),

    /// Combinational gate; `negated` complements the output
    /// (NOT, NAND, NOR, XNOR)
    Logic {
        op: LogicOp,
        negated: bool,
        inputs: Vec<Signal>,
    },

    /// Q(t) = ENA ? D : Q(t-1)
    Latch { d: Signal, ena: Signal },

    /// Q(t) = D on the active clock edge
    Dff { d: Signal, clk: Signal },

    /// Q(t) = RST ? 0 : (SET ? 1 : D)
    DffRs {
        d: Signal,
        clk: Signal,
        rst: Signal,
        set: Signal,
    },
}

impl GateKind {
    /// Build the tagged form from a flat symbol and input list
    pub fn from_symbol(symbol: GateSymbol, inputs: Vec<Signal>) -> NetResult<Self> {
        let expected = symbol.arity();
        if !expected.accepts(inputs.len()) {
            return Err(NetError::Arity {
                symbol,
                expected,
                actual: inputs.len(),
            });
        }

        let logic = |op, negated, inputs| GateKind::Logic {
            op,
            negated,
            inputs,
        };

        let kind = match symbol {
            GateSymbol::In => GateKind::Source,
            GateSymbol::Zero => GateKind::Constant(false),
            GateSymbol::One => GateKind::Constant(true),
            GateSymbol::Buf => logic(LogicOp::Buf, false, inputs),
            GateSymbol::Not => logic(LogicOp::Buf, true, inputs),
            GateSymbol::And => logic(LogicOp::And, false, inputs),
            GateSymbol::Nand => logic(LogicOp::And, true, inputs),
            GateSymbol::Or => logic(LogicOp::Or, false, inputs),
            GateSymbol::Nor => logic(LogicOp::Or, true, inputs),
            GateSymbol::Xor => logic(LogicOp::Xor, false, inputs),
            GateSymbol::Xnor => logic(LogicOp::Xor, true, inputs),
            GateSymbol::Latch => GateKind::Latch {
                d: inputs[0],
                ena: inputs[1],
            },
            GateSymbol::Dff => GateKind::Dff {
                d: inputs[0],
                clk: inputs[1],
            },
            GateSymbol::DffRs => GateKind::DffRs {
                d: inputs[0],
                clk: inputs[1],
                rst: inputs[2],
                set: inputs[3],
            },
        };

        Ok(kind)
    }

    /// The flat function symbol
    pub fn symbol(&self) -> GateSymbol {
        match self {
            GateKind::Source => GateSymbol::In,
            GateKind::Constant(false) => GateSymbol::Zero,
            GateKind::Constant(true) => GateSymbol::One,
            GateKind::Logic { op, negated, .. } => match (op, negated) {
                (LogicOp::Buf, false) => GateSymbol::Buf,
                (LogicOp::Buf, true) => GateSymbol::Not,
                (LogicOp::And, false) => GateSymbol::And,
                (LogicOp::And, true) => GateSymbol::Nand,
                (LogicOp::Or, false) => GateSymbol::Or,
                (LogicOp::Or, true) => GateSymbol::Nor,
                (LogicOp::Xor, false) => GateSymbol::Xor,
                (LogicOp::Xor, true) => GateSymbol::Xnor,
            },
            GateKind::Latch { .. } => GateSymbol::Latch,
            GateKind::Dff { .. } => GateSymbol::Dff,
            GateKind::DffRs { .. } => GateSymbol::DffRs,
        }
    }

    /// Inputs in positional order (D, CLK, RST, SET for flip-flops)
    pub fn inputs(&self) -> Vec<Signal> {
        match self {
            GateKind::Source | GateKind::Constant(_) => vec![],
            GateKind::Logic { inputs, .. } => inputs.clone(),
            GateKind::Latch { d, ena } => vec![*d, *ena],
            GateKind::Dff { d, clk } => vec![*d, *clk],
            GateKind::DffRs { d, clk, rst, set } => vec![*d, *clk, *rst, *set],
        }
    }

    pub fn is_sequential(&self) -> bool {
        matches!(
            self,
            GateKind::Latch { .. } | GateKind::Dff { .. } | GateKind::DffRs { .. }
        )
    }
}

/// A gate in a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    id: GateId,
    kind: GateKind,
}

impl Gate {
    /// Create a gate, checking the input count against the symbol's arity
    pub fn new(id: GateId, symbol: GateSymbol, inputs: Vec<Signal>) -> NetResult<Self> {
        Ok(Self {
            id,
            kind: GateKind::from_symbol(symbol, inputs)?,
        })
    }

    pub(crate) fn from_kind(id: GateId, kind: GateKind) -> Self {
        Self { id, kind }
    }

    pub fn id(&self) -> GateId {
        self.id
    }

    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    pub fn symbol(&self) -> GateSymbol {
        self.kind.symbol()
    }

    pub fn inputs(&self) -> Vec<Signal> {
        self.kind.inputs()
    }

    pub fn arity(&self) -> usize {
        match &self.kind {
            GateKind::Logic { inputs, .. } => inputs.len(),
            other => other.symbol().arity().min_inputs(),
        }
    }

    /// Primary inputs have no function of their own
    pub fn is_source(&self) -> bool {
        matches!(self.kind, GateKind::Source)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, GateKind::Constant(_))
    }

    /// Latches and flip-flops
    pub fn is_trigger(&self) -> bool {
        self.kind.is_sequential()
    }

    pub(crate) fn set_kind(&mut self, kind: GateKind) {
        self.kind = kind;
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}(", self.id, self.symbol())?;
        for (i, input) in self.inputs().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", input)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_arity() {
        assert_eq!(GateSymbol::Latch.arity(), Arity::Exact(2));
        assert_eq!(GateSymbol::Dff.arity(), Arity::Exact(2));
        assert_eq!(GateSymbol::DffRs.arity(), Arity::Exact(4));
        assert_eq!(GateSymbol::In.arity(), Arity::Exact(0));
        assert!(GateSymbol::Xor.arity().accepts(5));
        assert!(!GateSymbol::Not.arity().accepts(2));
    }

    #[test]
    fn test_symbol_parse() {
        assert_eq!("nand".parse::<GateSymbol>().unwrap(), GateSymbol::Nand);
        assert_eq!("DFFrs".parse::<GateSymbol>().unwrap(), GateSymbol::DffRs);
        assert_eq!("NOP".parse::<GateSymbol>().unwrap(), GateSymbol::Buf);

        let err = "MAJ".parse::<GateSymbol>().unwrap_err();
        assert_eq!(err, NetError::UnknownSymbol("MAJ".to_string()));
    }

    #[test]
    fn test_symbol_round_trip_through_kind() {
        let x = Signal::new(GateId(0));
        for symbol in GateSymbol::ALL {
            let inputs = match symbol.arity() {
                Arity::Exact(k) => vec![x; k],
                Arity::AtLeast(k) => vec![x; k + 2],
            };
            let kind = GateKind::from_symbol(symbol, inputs).unwrap();
            assert_eq!(kind.symbol(), symbol);
            assert_eq!(kind.is_sequential(), symbol.is_sequential());
        }
    }

    #[test]
    fn test_dffrs_input_roles() {
        let s = |i| Signal::new(GateId(i));
        let gate = Gate::new(GateId(9), GateSymbol::DffRs, vec![s(1), s(2), s(3), s(4)]).unwrap();

        match gate.kind() {
            GateKind::DffRs { d, clk, rst, set } => {
                assert_eq!(d.gate, GateId(1));
                assert_eq!(clk.gate, GateId(2));
                assert_eq!(rst.gate, GateId(3));
                assert_eq!(set.gate, GateId(4));
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(gate.arity(), 4);
        assert!(gate.is_trigger());
    }

    #[test]
    fn test_arity_mismatch() {
        let x = Signal::new(GateId(0));
        let err = Gate::new(GateId(1), GateSymbol::Latch, vec![x]).unwrap_err();
        assert_eq!(
            err,
            NetError::Arity {
                symbol: GateSymbol::Latch,
                expected: Arity::Exact(2),
                actual: 1,
            }
        );

        assert!(Gate::new(GateId(1), GateSymbol::And, vec![]).is_err());
        assert!(Gate::new(GateId(1), GateSymbol::DffRs, vec![x; 3]).is_err());
    }

    #[test]
    fn test_signal_sign() {
        let s = Signal::new(GateId(3));
        assert!(!s.inverted);
        assert!(s.invert().inverted);
        assert_eq!(s.invert().invert(), s);
        assert_eq!(s.invert_if(false), s);
        assert_eq!(s.invert_if(true), Signal::not(GateId(3)));
        assert_eq!(format!("{}", s.invert()), "~G3");
    }
}
