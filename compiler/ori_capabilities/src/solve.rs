//! Requirement propagation over the call graph.
//!
//! `required(f) = direct(f) ∪ ⋃ (required(g) − discharged(edge))` for every
//! edge `f -> g`. Sets only grow and are bounded by the finite set of
//! capability names in the module, so a worklist over the reversed call
//! graph reaches the least fixed point.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tracing::trace;

use ori_ir::{CapabilitySet, FunctionId, Name};

use crate::collect::FunctionFacts;

/// Where a capability first entered a function's requirement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Provenance {
    /// Index into `FunctionFacts::sites`.
    Site(usize),
    /// Index into `FunctionFacts::edges`.
    Edge(usize),
}

pub(crate) struct Solution {
    pub required: Vec<CapabilitySet>,
    pub provenance: FxHashMap<(FunctionId, Name), Provenance>,
    pub iterations: usize,
}

fn fid(index: usize) -> FunctionId {
    FunctionId::new(u32::try_from(index).unwrap_or(u32::MAX))
}

pub(crate) fn solve(facts: &[FunctionFacts]) -> Solution {
    let mut required = Vec::with_capacity(facts.len());
    let mut provenance = FxHashMap::default();
    let mut callers: Vec<Vec<usize>> = vec![Vec::new(); facts.len()];

    for (index, f) in facts.iter().enumerate() {
        let mut set = CapabilitySet::new();
        for (site_index, site) in f.sites.iter().enumerate() {
            for cap in &site.caps {
                if set.insert(cap) {
                    provenance.insert((fid(index), cap), Provenance::Site(site_index));
                }
            }
        }
        required.push(set);
        for edge in &f.edges {
            let callee = edge.callee.index();
            if callee != index && !callers[callee].contains(&index) {
                callers[callee].push(index);
            }
        }
    }

    let mut queued = vec![true; facts.len()];
    let mut worklist: VecDeque<usize> = (0..facts.len()).collect();
    let mut iterations = 0;

    while let Some(index) = worklist.pop_front() {
        queued[index] = false;
        iterations += 1;
        let mut changed = false;
        for (edge_index, edge) in facts[index].edges.iter().enumerate() {
            let callee = edge.callee.index();
            if callee == index {
                continue;
            }
            let incoming = required[callee].difference(&edge.discharged);
            for cap in &incoming {
                if required[index].insert(cap) {
                    provenance.insert((fid(index), cap), Provenance::Edge(edge_index));
                    changed = true;
                }
            }
        }
        if changed {
            trace!(function = index, "requirement grew");
            for &caller in &callers[index] {
                if !queued[caller] {
                    queued[caller] = true;
                    worklist.push_back(caller);
                }
            }
        }
    }

    Solution {
        required,
        provenance,
        iterations,
    }
}
