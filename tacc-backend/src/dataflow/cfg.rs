//! Control Flow Graph
//!
//! `nodes` are the basic blocks of one function; an edge `(u, v)` means that
//! block `v` may execute right after block `u`. Block 0 is the entry.

use std::collections::BTreeSet;
use log::trace;
use crate::error::BackendError;
use super::basicblock::BasicBlock;

#[derive(Debug, Clone)]
pub struct Cfg {
    nodes: Vec<BasicBlock>,
    edges: Vec<(usize, usize)>,

    /// Per block: (predecessors, successors)
    links: Vec<(BTreeSet<usize>, BTreeSet<usize>)>,

    /// Blocks reachable from the entry
    reachable: BTreeSet<usize>,
}

impl Cfg {
    /// Build adjacency and compute reachability from block 0.
    pub fn new(nodes: Vec<BasicBlock>, edges: Vec<(usize, usize)>) -> Result<Self, BackendError> {
        let mut links = vec![(BTreeSet::new(), BTreeSet::new()); nodes.len()];

        for &(u, v) in &edges {
            if u >= nodes.len() || v >= nodes.len() {
                return Err(BackendError::DanglingEdge(u, v));
            }
            links[u].1.insert(v);
            links[v].0.insert(u);
        }

        let mut reachable = BTreeSet::new();
        if !nodes.is_empty() {
            let mut stack = vec![0];
            while let Some(top) = stack.pop() {
                if !reachable.insert(top) {
                    continue;
                }
                stack.extend(links[top].1.iter().filter(|n| !reachable.contains(*n)));
            }
        }
        trace!("CFG: {} blocks, {} reachable, edges {:?}", nodes.len(), reachable.len(), edges);

        Ok(Self { nodes, edges, links, reachable })
    }

    /// Block `id`, reachable or not
    pub fn block(&self, id: usize) -> &BasicBlock {
        &self.nodes[id]
    }

    pub(crate) fn block_mut(&mut self, id: usize) -> &mut BasicBlock {
        &mut self.nodes[id]
    }

    pub fn prev(&self, id: usize) -> &BTreeSet<usize> {
        &self.links[id].0
    }

    pub fn succ(&self, id: usize) -> &BTreeSet<usize> {
        &self.links[id].1
    }

    pub fn in_degree(&self, id: usize) -> usize {
        self.links[id].0.len()
    }

    pub fn out_degree(&self, id: usize) -> usize {
        self.links[id].1.len()
    }

    pub fn is_reachable(&self, id: usize) -> bool {
        self.reachable.contains(&id)
    }

    /// Ids of reachable blocks, ascending
    pub fn reachable_ids(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.reachable.iter().copied()
    }

    /// Reachable blocks, ascending by id
    pub fn iter(&self) -> impl Iterator<Item = &BasicBlock> + '_ {
        self.reachable.iter().map(move |&id| &self.nodes[id])
    }

    /// All blocks including unreachable ones
    pub fn nodes(&self) -> &[BasicBlock] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
