//! Liveness analysis
//!
//! Standard backward dataflow over temporaries. Registers named directly in
//! operands are not tracked.

use std::collections::BTreeSet;
use log::{debug, trace};
use tacc_common::Temp;
use super::basicblock::BasicBlock;
use super::cfg::Cfg;

pub struct LivenessAnalyzer;

impl LivenessAnalyzer {
    /// Fill in `live_in`/`live_out` of every reachable block and every Loc
    /// inside it. Unreachable blocks are left untouched.
    pub fn analyze(cfg: &mut Cfg) {
        let ids: Vec<usize> = cfg.reachable_ids().collect();
        let summaries: Vec<(usize, BTreeSet<Temp>, BTreeSet<Temp>)> = ids
            .iter()
            .map(|&id| {
                let (def, used) = Self::def_use(cfg.block(id));
                (id, def, used)
            })
            .collect();

        let mut rounds = 0;
        let mut changed = true;
        while changed {
            changed = false;
            rounds += 1;

            for (id, def, used) in summaries.iter().rev() {
                let live_out: BTreeSet<Temp> = cfg
                    .succ(*id)
                    .iter()
                    .flat_map(|&s| cfg.block(s).live_in.iter().copied())
                    .collect();
                let mut live_in: BTreeSet<Temp> = live_out.difference(def).copied().collect();
                live_in.extend(used.iter().copied());

                let block = cfg.block_mut(*id);
                if block.live_in != live_in || block.live_out != live_out {
                    block.live_in = live_in;
                    block.live_out = live_out;
                    changed = true;
                }
            }
        }
        debug!("liveness reached a fixpoint after {rounds} rounds");

        for id in ids {
            Self::analyze_locs(cfg.block_mut(id));
        }
    }

    /// Temporaries defined in the block, and those read before any
    /// definition in it
    fn def_use(block: &BasicBlock) -> (BTreeSet<Temp>, BTreeSet<Temp>) {
        let mut def = BTreeSet::new();
        let mut used = BTreeSet::new();

        for loc in block.all_seq() {
            for temp in loc.instr.uses() {
                if !def.contains(&temp) {
                    used.insert(temp);
                }
            }
            def.extend(loc.instr.defs());
        }

        (def, used)
    }

    fn analyze_locs(block: &mut BasicBlock) {
        let mut live = block.live_out.clone();

        for loc in block.locs.iter_mut().rev() {
            loc.live_out = live.clone();
            for temp in loc.instr.defs() {
                live.remove(&temp);
            }
            live.extend(loc.instr.uses());
            loc.live_in = live.clone();
        }

        trace!("block {}: live_in {:?} live_out {:?}", block.id, block.live_in, block.live_out);
    }
}
