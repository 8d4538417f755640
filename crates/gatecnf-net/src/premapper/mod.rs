//! Network premappers
//!
//! A premapper rewrites a network gate by gate into a restricted basis. The
//! per-gate contract is [`PreMapper::map_gate`]: given an old gate, the
//! already-computed old-to-new mapping of its inputs and the new network under
//! construction, return the signal in the new network that reproduces the old
//! gate's function.
//!
//! [`PreMapper::premap`] drives a whole network through that contract:
//!
//! ```text
//! 1. pre-create every trigger with placeholder inputs (feedback resolves)
//! 2. map combinational gates in topological order
//! 3. rewire trigger inputs through the finished mapping
//! 4. remap outputs
//! ```
//!
//! Premappers are plain values. They hold configuration only, so one value can
//! serve any number of independent sessions.

mod aig;

pub use aig::{AigMapper, AigMapperConfig, SplitPolicy};

use crate::error::{NetError, NetResult};
use crate::gate::{Gate, GateId, Signal};
use crate::network::Network;
use indexmap::IndexMap;

/// Old gate identity to signal in the new network
pub type GateIdMap = IndexMap<GateId, Signal>;

/// Result of premapping a network
#[derive(Debug, Clone)]
pub struct Premapped {
    /// The rewritten network
    pub net: Network,
    /// Mapping from every old gate to its replacement signal
    pub map: GateIdMap,
    /// Size statistics
    pub stats: PremapStats,
}

/// Size statistics of a premapping run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PremapStats {
    /// Gates in the source network
    pub gates_before: usize,
    /// Gates in the rewritten network
    pub gates_after: usize,
    /// AND gates in the rewritten network
    pub ands_after: usize,
    /// Triggers carried over
    pub triggers: usize,
}

/// A gate-by-gate network rewrite
pub trait PreMapper {
    /// Name of the premapper (for logging)
    fn name(&self) -> &str;

    /// Map one gate into `new_net`
    fn map_gate(
        &self,
        old_gate: &Gate,
        old_to_new: &GateIdMap,
        new_net: &mut Network,
    ) -> NetResult<Signal>;

    /// Map a whole network
    ///
    /// The network is validated first, so a malformed (deserialized) network
    /// is rejected before anything is built.
    fn premap(&self, old_net: &Network) -> NetResult<Premapped> {
        old_net.validate()?;
        let order = old_net.topological_order()?;
        let mut new_net = Network::new(old_net.name.clone());
        let mut map = GateIdMap::new();

        // Sources first, so input order survives the rewrite
        for &input in old_net.inputs() {
            let gate = old_net.gate(input).ok_or(NetError::UnknownGate(input))?;
            let mapped = self.map_gate(gate, &map, &mut new_net)?;
            map.insert(input, mapped);
        }

        // Placeholders for triggers; their outputs are read before their inputs
        // are known
        let mut triggers = Vec::new();
        for old in old_net.triggers() {
            let placeholder = new_net.constant(false);
            let arity = old.symbol().arity().min_inputs();
            let id = new_net.add_gate(old.symbol(), vec![placeholder; arity])?;
            map.insert(old.id(), Signal::new(id));
            triggers.push((old, id));
        }

        for id in order {
            if map.contains_key(&id) {
                continue;
            }
            let gate = old_net.gate(id).ok_or(NetError::UnknownGate(id))?;
            let mapped = self.map_gate(gate, &map, &mut new_net)?;
            map.insert(id, mapped);
        }

        for (old, new_id) in &triggers {
            let inputs = remap_inputs(old, &map)?;
            new_net.reconnect(*new_id, inputs)?;
        }

        for &output in old_net.outputs() {
            let mapped = map
                .get(&output.gate)
                .ok_or(NetError::UnknownGate(output.gate))?;
            new_net.add_output(mapped.invert_if(output.inverted));
        }

        let stats = PremapStats {
            gates_before: old_net.len(),
            gates_after: new_net.len(),
            ands_after: new_net.and_count(),
            triggers: triggers.len(),
        };

        log::info!(
            "{}: premapped '{}': {} gates -> {} gates ({} ANDs, {} triggers)",
            self.name(),
            old_net.name,
            stats.gates_before,
            stats.gates_after,
            stats.ands_after,
            stats.triggers
        );

        Ok(Premapped {
            net: new_net,
            map,
            stats,
        })
    }
}

/// Translate a gate's inputs through the mapping, composing signs
pub fn remap_inputs(gate: &Gate, old_to_new: &GateIdMap) -> NetResult<Vec<Signal>> {
    gate.inputs()
        .iter()
        .map(|input| {
            old_to_new
                .get(&input.gate)
                .map(|mapped| mapped.invert_if(input.inverted))
                .ok_or(NetError::Unmapped {
                    gate: gate.id(),
                    input: input.gate,
                })
        })
        .collect()
}
