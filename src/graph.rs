extern crate hashbrown;

use std::hash::Hash;

use hashbrown::HashMap;

use crate::error::N2vErr;

/// Outbound edges of a single vertex.  Edge order is insertion order and is
/// what alias table indices refer to, so it never changes once built.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    edges: Vec<(usize, f32)>,
    index: HashMap<usize, usize>
}

impl Adjacency {

    // Returns true if an existing edge had its weight changed
    fn upsert(&mut self, to: usize, weight: f32) -> bool {
        if let Some(&pos) = self.index.get(&to) {
            let old = std::mem::replace(&mut self.edges[pos].1, weight);
            old != weight
        } else {
            self.index.insert(to, self.edges.len());
            self.edges.push((to, weight));
            false
        }
    }

    #[inline]
    pub fn edges(&self) -> &[(usize, f32)] {
        self.edges.as_slice()
    }

    #[inline]
    pub fn position(&self, node: usize) -> Option<usize> {
        self.index.get(&node).cloned()
    }

    #[inline]
    pub fn contains(&self, node: usize) -> bool {
        self.index.contains_key(&node)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Weighted adjacency graph.  Vertices are stored densely by index in the
/// order they were first seen; `node_key` maps back to the caller's key.
#[derive(Debug)]
pub struct Graph<K> {
    keys: Vec<K>,
    ids: HashMap<K, usize>,
    adj: Vec<Adjacency>,
    directed: bool,
    n_edges: usize,
    conflicts: usize
}

impl <K: Hash + Eq + Clone> Graph<K> {

    pub fn from_edges(
        edges: impl Iterator<Item=(K, K, Option<f32>)>,
        directed: bool,
        weighted: bool
    ) -> Result<Self, N2vErr> {
        let mut builder = GraphBuilder::new(directed, weighted);
        for (f_node, t_node, weight) in edges {
            builder.add_edge(f_node, t_node, weight)?;
        }
        Ok(builder.build())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of directed edges; undirected edges count twice unless self-loops
    pub fn edge_count(&self) -> usize {
        self.n_edges
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of edges which were listed more than once with differing weights
    pub fn weight_conflicts(&self) -> usize {
        self.conflicts
    }

    #[inline]
    pub fn node_key(&self, idx: usize) -> &K {
        &self.keys[idx]
    }

    pub fn node_index(&self, key: &K) -> Option<usize> {
        self.ids.get(key).cloned()
    }

    pub fn keys(&self) -> &[K] {
        self.keys.as_slice()
    }

    #[inline]
    pub fn neighbors(&self, idx: usize) -> &Adjacency {
        &self.adj[idx]
    }

    #[inline]
    pub fn degree(&self, idx: usize) -> usize {
        self.adj[idx].len()
    }

    #[inline]
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.adj[from].contains(to)
    }

    pub fn weight(&self, from: usize, to: usize) -> Option<f32> {
        let adj = &self.adj[from];
        adj.position(to).map(|pos| adj.edges[pos].1)
    }
}

pub struct GraphBuilder<K> {
    directed: bool,
    weighted: bool,
    keys: Vec<K>,
    ids: HashMap<K, usize>,
    adj: Vec<Adjacency>,
    conflicts: usize
}

impl <K: Hash + Eq + Clone> GraphBuilder<K> {
    pub fn new(directed: bool, weighted: bool) -> Self {
        GraphBuilder {
            directed,
            weighted,
            keys: Vec::new(),
            ids: HashMap::new(),
            adj: Vec::new(),
            conflicts: 0
        }
    }

    /// Registers a vertex, returning its index.  Vertices added without
    /// edges are valid and walks starting on them have length 1.
    pub fn add_node(&mut self, key: K) -> usize {
        if let Some(&idx) = self.ids.get(&key) {
            return idx
        }
        let idx = self.keys.len();
        self.ids.insert(key.clone(), idx);
        self.keys.push(key);
        self.adj.push(Adjacency::default());
        idx
    }

    /// Adds an edge.  Unweighted graphs ignore `weight` and use 1.  Undirected
    /// edges are inserted in both directions with the same weight; repeated
    /// edges overwrite the previous weight in place.
    pub fn add_edge(&mut self, from: K, to: K, weight: Option<f32>) -> Result<(), N2vErr> {
        let weight = match weight {
            Some(w) if self.weighted => {
                if !(w.is_finite() && w > 0.) {
                    return Err(N2vErr::MalformedEdge { weight: w })
                }
                w
            },
            _ => 1.
        };

        let f_idx = self.add_node(from);
        let t_idx = self.add_node(to);
        let mut changed = self.adj[f_idx].upsert(t_idx, weight);
        if !self.directed {
            changed |= self.adj[t_idx].upsert(f_idx, weight);
        }

        if changed {
            self.conflicts += 1;
        }
        Ok(())
    }

    pub fn build(mut self) -> Graph<K> {
        self.adj.iter_mut().for_each(|a| {
            a.edges.shrink_to_fit();
            a.index.shrink_to_fit();
        });
        let n_edges = self.adj.iter().map(|a| a.len()).sum();

        if self.conflicts > 0 {
            eprintln!("Warning: {} edges were listed with conflicting weights; kept the last weight seen",
                      self.conflicts);
        }

        Graph {
            keys: self.keys,
            ids: self.ids,
            adj: self.adj,
            directed: self.directed,
            n_edges,
            conflicts: self.conflicts
        }
    }
}
