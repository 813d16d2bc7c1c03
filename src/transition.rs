extern crate rayon;
extern crate thread_local;

use std::cell::RefCell;
use std::hash::Hash;

use rayon::prelude::*;
use thread_local::ThreadLocal;

use crate::alias::AliasTable;
use crate::error::{N2vErr,check_positive,check_nonzero};
use crate::graph::Graph;
use crate::pb;

/// Alias tables for every vertex and every directed edge of a graph.
///
/// `second_order[prev][i]` is the table for the edge from `prev` to the i-th
/// vertex in prev's adjacency list, sampling over that vertex's own adjacency
/// list.  Vertices without outbound edges get no tables.
#[derive(Debug)]
pub struct TransitionTables {
    p: f32,
    q: f32,
    degrees: Vec<usize>,
    first_step: Vec<Option<AliasTable>>,
    second_order: Vec<Vec<Option<AliasTable>>>
}

impl TransitionTables {

    #[inline]
    pub fn first_step(&self, node: usize) -> Option<&AliasTable> {
        self.first_step.get(node).and_then(|t| t.as_ref())
    }

    #[inline]
    pub fn second_order(&self, prev: usize, pos: usize) -> Option<&AliasTable> {
        self.second_order.get(prev)
            .and_then(|tables| tables.get(pos))
            .and_then(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.first_step.len()
    }

    /// True if the tables were built from a graph with the same out-degree
    /// for every vertex.  Table positions index adjacency lists, so
    /// anything else can't be walked.
    pub fn fits<K: Hash + Eq + Clone>(&self, graph: &Graph<K>) -> bool {
        self.degrees.len() == graph.len()
            && self.degrees.iter().enumerate().all(|(i, d)| graph.degree(i) == *d)
    }

    pub fn table_count(&self) -> usize {
        let first = self.first_step.iter().filter(|t| t.is_some()).count();
        let second: usize = self.second_order.iter()
            .map(|ts| ts.iter().filter(|t| t.is_some()).count())
            .sum();
        first + second
    }

    pub fn p(&self) -> f32 { self.p }

    pub fn q(&self) -> f32 { self.q }
}

/// Writes the node2vec biased weights for stepping from `cur` having arrived
/// from `prev` into `out`, in cur's adjacency order.
pub fn second_order_weights<K: Hash + Eq + Clone>(
    graph: &Graph<K>,
    prev: usize,
    cur: usize,
    p: f32,
    q: f32,
    out: &mut Vec<f64>
) {
    // Small p or q can push f32 weights past f32::MAX
    let (p, q) = (p as f64, q as f64);
    let prev_adj = graph.neighbors(prev);
    out.clear();
    out.extend(graph.neighbors(cur).edges().iter().map(|(next, w)| {
        let w = *w as f64;
        if *next == prev {
            w / p
        } else if prev_adj.contains(*next) {
            w
        } else {
            w / q
        }
    }));
}

pub struct TransitionBuilder {
    pub p: f32,
    pub q: f32,
    pub workers: usize
}

impl Default for TransitionBuilder {
    fn default() -> Self {
        TransitionBuilder { p: 1., q: 1., workers: 8 }
    }
}

impl TransitionBuilder {

    pub fn build<K: Hash + Eq + Clone + Send + Sync>(
        &self,
        graph: &Graph<K>
    ) -> Result<TransitionTables, N2vErr> {
        let p = check_positive("p", self.p)?;
        let q = check_positive("q", self.q)?;
        let workers = check_nonzero("workers", self.workers)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| N2vErr::ThreadPool(e.to_string()))?;

        eprintln!("Building transition tables: {} vertices, {} edges, p={}, q={}",
                  graph.len(), graph.edge_count(), p, q);

        let tables = pool.install(|| build_tables(graph, p, q))?;
        eprintln!("Built {} alias tables", tables.table_count());
        Ok(tables)
    }

}

fn build_tables<K: Hash + Eq + Clone + Send + Sync>(
    graph: &Graph<K>,
    p: f32,
    q: f32
) -> Result<TransitionTables, N2vErr> {
    let pb = pb::simple_pb(graph.len() as u64, "Transition tables");

    // Scratch weight buffers, one per worker thread
    let scratch = ThreadLocal::new();

    let per_node = (0..graph.len()).into_par_iter().map(|node| -> Result<_, N2vErr> {
        let mut weights = scratch.get_or(|| RefCell::new(Vec::new())).borrow_mut();

        let adj = graph.neighbors(node);
        let first = if adj.is_empty() {
            None
        } else {
            weights.clear();
            weights.extend(adj.edges().iter().map(|(_, w)| *w as f64));
            Some(AliasTable::new(&weights)?)
        };

        let mut second = Vec::with_capacity(adj.len());
        for (cur, _) in adj.edges().iter() {
            if graph.degree(*cur) == 0 {
                second.push(None);
            } else {
                second_order_weights(graph, node, *cur, p, q, &mut weights);
                second.push(Some(AliasTable::new(&weights)?));
            }
        }

        pb.inc(1);
        Ok((first, second))
    }).collect::<Result<Vec<_>, N2vErr>>()?;

    pb.finish();

    let (first_step, second_order) = per_node.into_iter().unzip();
    let degrees = (0..graph.len()).map(|i| graph.degree(i)).collect();
    Ok(TransitionTables { p, q, degrees, first_step, second_order })
}
