//! Variables, literals and clause sinks
//!
//! The encoder never solves; it hands clauses to a [`ClauseSink`]. Sinks are
//! provided for an in-memory [`Cnf`] and for varisat's incremental solver and
//! formula types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use varisat::ExtendFormula;

/// A propositional variable (1-based, DIMACS numbering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Var(u32);

impl Var {
    /// Create a variable from its DIMACS index; index 0 is not a variable
    pub fn new(index: u32) -> Option<Self> {
        (index > 0).then_some(Var(index))
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub(crate) fn from_raw(index: u32) -> Self {
        debug_assert!(index > 0);
        Var(index)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A literal: a variable with a polarity (`sign == true` is the positive literal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lit {
    var: Var,
    sign: bool,
}

impl Lit {
    pub fn new(var: Var, sign: bool) -> Self {
        Lit { var, sign }
    }

    pub fn positive(var: Var) -> Self {
        Lit { var, sign: true }
    }

    pub fn negative(var: Var) -> Self {
        Lit { var, sign: false }
    }

    pub fn var(&self) -> Var {
        self.var
    }

    pub fn sign(&self) -> bool {
        self.sign
    }

    pub fn is_positive(&self) -> bool {
        self.sign
    }

    pub fn is_negative(&self) -> bool {
        !self.sign
    }

    /// DIMACS form (negative for negation)
    pub fn to_dimacs(&self) -> i64 {
        let v = self.var.0 as i64;
        if self.sign {
            v
        } else {
            -v
        }
    }
}

impl std::ops::Not for Lit {
    type Output = Lit;

    fn not(self) -> Self::Output {
        Lit {
            var: self.var,
            sign: !self.sign,
        }
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign {
            write!(f, "{}", self.var)
        } else {
            write!(f, "~{}", self.var)
        }
    }
}

impl From<Lit> for varisat::Lit {
    fn from(lit: Lit) -> Self {
        varisat::Lit::from_dimacs(lit.to_dimacs() as isize)
    }
}

/// Receiver of encoded clauses
pub trait ClauseSink {
    /// Add one clause (a disjunction of literals)
    fn add_clause(&mut self, clause: &[Lit]);
}

impl<S: ClauseSink + ?Sized> ClauseSink for &mut S {
    fn add_clause(&mut self, clause: &[Lit]) {
        (**self).add_clause(clause);
    }
}

fn to_varisat(clause: &[Lit]) -> Vec<varisat::Lit> {
    clause.iter().map(|&lit| lit.into()).collect()
}

impl ClauseSink for varisat::Solver<'_> {
    fn add_clause(&mut self, clause: &[Lit]) {
        ExtendFormula::add_clause(self, &to_varisat(clause));
    }
}

impl ClauseSink for varisat::CnfFormula {
    fn add_clause(&mut self, clause: &[Lit]) {
        ExtendFormula::add_clause(self, &to_varisat(clause));
    }
}

/// In-memory CNF formula
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cnf {
    clauses: Vec<Vec<Lit>>,
    max_var: u32,
}

impl Cnf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    /// Number of clauses
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Highest variable index mentioned
    pub fn max_var(&self) -> u32 {
        self.max_var
    }

    /// Render in DIMACS CNF format
    pub fn to_dimacs(&self) -> String {
        let mut out = format!("p cnf {} {}\n", self.max_var, self.clauses.len());
        for clause in &self.clauses {
            for lit in clause {
                let _ = write!(out, "{} ", lit.to_dimacs());
            }
            out.push_str("0\n");
        }
        out
    }
}

impl ClauseSink for Cnf {
    fn add_clause(&mut self, clause: &[Lit]) {
        for lit in clause {
            self.max_var = self.max_var.max(lit.var.0);
        }
        self.clauses.push(clause.to_vec());
    }
}
