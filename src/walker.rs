extern crate rand;

use std::hash::Hash;

use rand::prelude::*;

use crate::error::N2vErr;
use crate::graph::Graph;
use crate::transition::TransitionTables;

/// Generates single second order walks over precomputed transition tables.
pub struct BiasedWalker<'a, K> {
    graph: &'a Graph<K>,
    tables: &'a TransitionTables
}

impl <'a, K: Hash + Eq + Clone> BiasedWalker<'a, K> {

    pub fn new(graph: &'a Graph<K>, tables: &'a TransitionTables) -> Self {
        BiasedWalker { graph, tables }
    }

    pub fn gen_biased_walk<R: Rng>(
        &self,
        start: usize,
        rng: &mut R,
        walk_len: usize
    ) -> Result<Vec<&'a K>, N2vErr> {
        let mut walk = Vec::with_capacity(walk_len);
        self.gen_biased_walk_with_buff(start, rng, walk_len, &mut walk)?;
        Ok(walk.into_iter().map(|idx| self.graph.node_key(idx)).collect())
    }

    /// Fills `walk` with vertex indices.  The walk has `walk_len` vertices
    /// unless it reaches a vertex with no outbound edges first.
    pub fn gen_biased_walk_with_buff<R: Rng>(
        &self,
        start: usize,
        rng: &mut R,
        walk_len: usize,
        walk: &mut Vec<usize>
    ) -> Result<(), N2vErr> {
        walk.clear();
        walk.push(start);
        if walk_len < 2 || self.graph.degree(start) == 0 {
            return Ok(())
        }

        // No previous vertex yet, so the first hop is purely weight proportional
        let table = self.tables.first_step(start)
            .ok_or(N2vErr::MissingTransition { prev: start, cur: start })?;
        let mut pos = table.draw(rng);
        let mut prev = start;
        let mut cur = self.graph.neighbors(start).edges().get(pos)
            .ok_or(N2vErr::MissingTransition { prev: start, cur: start })?.0;
        walk.push(cur);

        while walk.len() < walk_len && self.graph.degree(cur) > 0 {
            let table = self.tables.second_order(prev, pos)
                .ok_or(N2vErr::MissingTransition { prev, cur })?;
            pos = table.draw(rng);
            let next = self.graph.neighbors(cur).edges().get(pos)
                .ok_or(N2vErr::MissingTransition { prev, cur })?.0;
            prev = cur;
            cur = next;
            walk.push(cur);
        }
        Ok(())
    }

}
