//! Shared helpers for solver-backed encoding tests

#![allow(dead_code)]

use gatecnf_formal::{Context, Lit, Role, Version};
use gatecnf_net::{GateId, Network};
use varisat::Solver;

/// Value forced on `target` by the formula under `assumptions`
///
/// Returns `None` when both values are consistent. Panics if the assumptions
/// themselves are contradictory.
pub fn value_under(solver: &mut Solver, assumptions: &[Lit], target: Lit) -> Option<bool> {
    let can_be = |solver: &mut Solver, value: Lit| {
        let mut lits: Vec<varisat::Lit> = assumptions.iter().map(|&l| l.into()).collect();
        lits.push(value.into());
        solver.assume(&lits);
        solver.solve().unwrap()
    };

    let can_be_true = can_be(solver, target);
    let can_be_false = can_be(solver, !target);
    match (can_be_true, can_be_false) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        (true, true) => None,
        (false, false) => panic!("assumptions are contradictory"),
    }
}

/// Whether the formula is satisfiable under `assumptions`
pub fn sat_under(solver: &mut Solver, assumptions: &[Lit]) -> bool {
    let lits: Vec<varisat::Lit> = assumptions.iter().map(|&l| l.into()).collect();
    solver.assume(&lits);
    solver.solve().unwrap()
}

/// Literal read by consumers of `id` at `version`
pub fn current(ctx: &Context, net: &Network, id: GateId, version: Version) -> Lit {
    let gate = net.gate(id).unwrap();
    Lit::positive(ctx.lookup(gate, version, Role::Current).unwrap())
}

/// Literal defined by the encoding of `id` at `version`
pub fn next(ctx: &Context, net: &Network, id: GateId, version: Version) -> Lit {
    let gate = net.gate(id).unwrap();
    Lit::positive(ctx.lookup(gate, version, Role::Next).unwrap())
}

/// Literal `lit` constrained to `value`
pub fn fix(lit: Lit, value: bool) -> Lit {
    if value {
        lit
    } else {
        !lit
    }
}

/// All assignments of `n` variables, least significant first
pub fn assignments(n: usize) -> impl Iterator<Item = Vec<bool>> {
    (0..1u32 << n).map(move |bits| (0..n).map(|i| bits >> i & 1 == 1).collect())
}
