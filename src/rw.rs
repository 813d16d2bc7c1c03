extern crate rand;
extern crate rand_xorshift;
extern crate rayon;
extern crate indicatif;

use std::collections::VecDeque;
use std::hash::Hash;

use indicatif::ProgressBar;
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;

use crate::error::{N2vErr,check_nonzero};
use crate::graph::Graph;
use crate::pb;
use crate::transition::TransitionTables;
use crate::walker::BiasedWalker;

const SHUFFLE_SALT: u64 = 0x5DEE_CE66_D1CE_4E5B;

// Derives an independent stream seed for a single unit of work (splitmix64)
fn item_seed(seed: u64, offset: u64) -> u64 {
    let mut z = seed ^ offset.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub struct RandomWalkIterator<'a, K> {
    graph: &'a Graph<K>,
    tables: &'a TransitionTables,
    pool: rayon::ThreadPool,
    starts: Vec<usize>,
    order: Vec<usize>,
    rep: Option<usize>,
    offset: usize,
    total: usize,
    buffer: VecDeque<Vec<K>>,
    walk_len: usize,
    buffer_size: usize,
    shuffle: bool,
    seed: u64,
    pb: ProgressBar
}

impl <'a, K: Hash + Eq + Clone + Send + Sync> RandomWalkIterator<'a, K> {

    // Start order for the given repetition
    fn load_order(&mut self, rep: usize) {
        self.order.clear();
        self.order.extend_from_slice(&self.starts);
        if self.shuffle {
            let mut rng = XorShiftRng::seed_from_u64(item_seed(self.seed ^ SHUFFLE_SALT, rep as u64));
            self.order.shuffle(&mut rng);
        }
        self.rep = Some(rep);
    }

    // Generates the next chunk of walks in parallel.  A chunk never crosses a
    // repetition boundary.
    fn fill(&mut self) -> Result<(), N2vErr> {
        let n = self.starts.len();
        let rep = self.offset / n;
        if self.rep != Some(rep) {
            self.load_order(rep);
        }

        let lbound = self.offset;
        let rbound = (lbound + self.buffer_size).min((rep + 1) * n);

        let walker = BiasedWalker::new(self.graph, self.tables);
        let order = &self.order;
        let (seed, walk_len, pb) = (self.seed, self.walk_len, &self.pb);
        let walks = self.pool.install(|| {
            (lbound..rbound).into_par_iter().map(|offset| -> Result<Vec<K>, N2vErr> {
                let mut rng = XorShiftRng::seed_from_u64(item_seed(seed, offset as u64));
                let start = order[offset % n];
                let walk = walker.gen_biased_walk(start, &mut rng, walk_len)?;
                pb.inc(1);
                Ok(walk.into_iter().cloned().collect())
            }).collect::<Result<Vec<Vec<K>>, N2vErr>>()
        })?;

        self.buffer.extend(walks);
        self.offset = rbound;
        Ok(())
    }
}

impl <'a, K: Hash + Eq + Clone + Send + Sync> Iterator for RandomWalkIterator<'a, K> {
    type Item = Result<Vec<K>, N2vErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() {
            if self.offset >= self.total {
                self.pb.finish();
                return None
            }

            if let Err(e) = self.fill() {
                // Abort the corpus entirely
                self.offset = self.total;
                self.buffer.clear();
                return Some(Err(e))
            }
        }
        self.buffer.pop_front().map(Ok)
    }

}

/// Simulates `num_walks` node2vec walks from every start vertex.
pub struct RandomWalk {
    pub num_walks: usize,
    pub walk_len: usize,
    pub workers: usize,
    pub buffer_size: usize,
    pub shuffle: bool,
    pub seed: u64
}

impl Default for RandomWalk {
    fn default() -> Self {
        RandomWalk {
            num_walks: 10,
            walk_len: 80,
            workers: 8,
            buffer_size: 10000,
            shuffle: false,
            seed: 2019
        }
    }
}

impl RandomWalk {

    /// Streams walks from every vertex in graph order.  Walks are yielded
    /// repetition by repetition; within a repetition, in start order.
    pub fn walks<'a, K: Hash + Eq + Clone + Send + Sync>(
        &self,
        graph: &'a Graph<K>,
        tables: &'a TransitionTables
    ) -> Result<RandomWalkIterator<'a, K>, N2vErr> {
        self.walks_from(graph, tables, (0..graph.len()).collect())
    }

    pub fn walks_from<'a, K: Hash + Eq + Clone + Send + Sync>(
        &self,
        graph: &'a Graph<K>,
        tables: &'a TransitionTables,
        starts: Vec<usize>
    ) -> Result<RandomWalkIterator<'a, K>, N2vErr> {
        check_nonzero("num_walks", self.num_walks)?;
        check_nonzero("walk_len", self.walk_len)?;
        check_nonzero("workers", self.workers)?;
        check_nonzero("buffer_size", self.buffer_size)?;

        if !tables.fits(graph) {
            return Err(N2vErr::InvalidParameter(
                "transition tables were built from a different graph".into()))
        }

        if let Some(bad) = starts.iter().find(|s| **s >= graph.len()) {
            return Err(N2vErr::InvalidParameter(format!("start vertex {} is not in the graph", bad)))
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| N2vErr::ThreadPool(e.to_string()))?;

        let total = starts.len() * self.num_walks;
        eprintln!("Generating {} walks of length {} from {} vertices", total, self.walk_len, starts.len());

        Ok(RandomWalkIterator {
            graph,
            tables,
            pool,
            order: Vec::with_capacity(starts.len()),
            starts,
            rep: None,
            offset: 0,
            total,
            buffer: VecDeque::with_capacity(self.buffer_size),
            walk_len: self.walk_len,
            buffer_size: self.buffer_size,
            shuffle: self.shuffle,
            seed: self.seed,
            pb: pb::simple_pb(total as u64, "Walks")
        })
    }

    /// Collects the full corpus from every vertex
    pub fn simulate<K: Hash + Eq + Clone + Send + Sync>(
        &self,
        graph: &Graph<K>,
        tables: &TransitionTables
    ) -> Result<Vec<Vec<K>>, N2vErr> {
        self.walks(graph, tables)?.collect()
    }

    pub fn simulate_from<K: Hash + Eq + Clone + Send + Sync>(
        &self,
        graph: &Graph<K>,
        tables: &TransitionTables,
        starts: &[K]
    ) -> Result<Vec<Vec<K>>, N2vErr> {
        let idxs = starts.iter()
            .map(|k| graph.node_index(k)
                 .ok_or_else(|| N2vErr::InvalidParameter("start vertex is not in the graph".into())))
            .collect::<Result<Vec<_>, N2vErr>>()?;
        self.walks_from(graph, tables, idxs)?.collect()
    }
}

#[cfg(test)]
mod test_random_walk {
    use super::*;
    use hashbrown::{HashMap,HashSet};
    use statrs::distribution::{ChiSquared,ContinuousCDF};
    use crate::graph::GraphBuilder;
    use crate::transition::TransitionBuilder;

    fn setup(list: &[(u32, u32)], p: f32, q: f32) -> (Graph<u32>, TransitionTables) {
        let g = Graph::from_edges(list.iter().map(|(f, t)| (*f, *t, None)), false, false).unwrap();
        let tables = TransitionBuilder { p, q, workers: 2 }.build(&g).unwrap();
        (g, tables)
    }

    fn settings(num_walks: usize, walk_len: usize, seed: u64) -> RandomWalk {
        RandomWalk { num_walks, walk_len, seed, workers: 4, ..RandomWalk::default() }
    }

    const CYCLE: &[(u32, u32)] = &[(0, 1), (1, 2), (2, 3), (3, 0)];

    #[test]
    fn test_path_scenario() {
        let (g, tables) = setup(&[(0, 1), (1, 2)], 1., 1.);
        let allowed: HashMap<u32, Vec<Vec<u32>>> = vec![
            (0, vec![vec![0, 1, 0], vec![0, 1, 2]]),
            (1, vec![vec![1, 0, 1], vec![1, 2, 1]]),
            (2, vec![vec![2, 1, 0], vec![2, 1, 2]])
        ].into_iter().collect();

        // One walk per vertex, in graph order
        let walks = settings(1, 3, 2019).simulate(&g, &tables).unwrap();
        assert_eq!(walks.len(), 3);
        for (i, walk) in walks.iter().enumerate() {
            assert_eq!(walk[0], i as u32);
            assert!(allowed[&walk[0]].contains(walk), "{:?}", walk);
        }

        // Each of the two options is equally likely
        let n = 4000;
        let walks = settings(n, 3, 2020).simulate(&g, &tables).unwrap();
        let mut counts = HashMap::new();
        for walk in walks.iter() {
            assert!(allowed[&walk[0]].contains(walk), "{:?}", walk);
            *counts.entry(walk.clone()).or_insert(0usize) += 1;
        }
        for options in allowed.values() {
            for option in options {
                let ratio = counts[option] as f32 / n as f32;
                assert!((ratio - 0.5).abs() < 0.05, "{:?}: {}", option, ratio);
            }
        }
    }

    #[test]
    fn test_corpus_order() {
        let (g, tables) = setup(CYCLE, 1., 1.);
        let walks = settings(3, 5, 1).simulate(&g, &tables).unwrap();
        assert_eq!(walks.len(), 12);
        for (i, walk) in walks.iter().enumerate() {
            assert_eq!(walk[0], *g.node_key(i % 4));
            assert_eq!(walk.len(), 5);
        }
    }

    #[test]
    fn test_isolated_vertex() {
        let mut builder = GraphBuilder::new(false, false);
        builder.add_edge(0u32, 1u32, None).unwrap();
        builder.add_node(7u32);
        let g = builder.build();
        let tables = TransitionBuilder { p: 1., q: 1., workers: 1 }.build(&g).unwrap();

        let walks = settings(5, 40, 2019).simulate(&g, &tables).unwrap();
        assert_eq!(walks.len(), 15);
        for walk in walks.iter() {
            if walk[0] == 7 {
                assert_eq!(walk, &vec![7]);
            } else {
                assert_eq!(walk.len(), 40);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let (g, tables) = setup(&[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (3, 4)], 0.5, 2.);
        let base = settings(7, 20, 42).simulate(&g, &tables).unwrap();

        // Same seed with different parallelism and chunking
        for (workers, buffer_size) in &[(1, 10000), (3, 7), (8, 1)] {
            let rw = RandomWalk { workers: *workers, buffer_size: *buffer_size, ..settings(7, 20, 42) };
            assert_eq!(rw.simulate(&g, &tables).unwrap(), base);
        }

        let other = settings(7, 20, 43).simulate(&g, &tables).unwrap();
        assert_ne!(other, base);
    }

    #[test]
    fn test_shuffle() {
        let (g, tables) = setup(CYCLE, 1., 1.);
        let rw = RandomWalk { shuffle: true, ..settings(50, 4, 11) };
        let walks = rw.simulate(&g, &tables).unwrap();
        assert_eq!(walks, rw.simulate(&g, &tables).unwrap());

        // Every repetition still starts once from each vertex
        for rep in walks.chunks(4) {
            let starts: HashSet<_> = rep.iter().map(|w| w[0]).collect();
            assert_eq!(starts.len(), 4);
        }

        // And at least one repetition isn't in graph order
        let in_order = walks.chunks(4)
            .all(|rep| rep.iter().enumerate().all(|(i, w)| w[0] == *g.node_key(i)));
        assert!(!in_order);
    }

    #[test]
    fn test_large_p_rarely_returns() {
        let (g, tables) = setup(CYCLE, 100., 1.);
        let walks = settings(200, 20, 2019).simulate(&g, &tables).unwrap();
        let (mut returns, mut steps) = (0, 0);
        for walk in walks.iter() {
            for w in walk.windows(3) {
                steps += 1;
                if w[2] == w[0] {
                    returns += 1;
                }
            }
        }
        let ratio = returns as f32 / steps as f32;
        assert!(ratio < 0.03, "Return ratio {}", ratio);
    }

    #[test]
    fn test_large_q_stays_local() {
        let (g, tables) = setup(CYCLE, 1., 100.);
        let walks = settings(200, 20, 2019).simulate(&g, &tables).unwrap();
        let (mut local, mut steps) = (0, 0);
        for walk in walks.iter() {
            for w in walk.windows(3) {
                steps += 1;
                let (prev, next) = (g.node_index(&w[0]).unwrap(), g.node_index(&w[2]).unwrap());
                if prev == next || g.has_edge(prev, next) {
                    local += 1;
                }
            }
        }
        let ratio = local as f32 / steps as f32;
        assert!(ratio > 0.97, "Local ratio {}", ratio);
    }

    #[test]
    fn test_unbiased_frequencies() {
        let g = Graph::from_edges(vec![
            (0u32, 1u32, Some(1.)),
            (1, 2, Some(3.)),
            (1, 3, Some(0.5)),
            (2, 3, Some(1.))
        ].into_iter(), false, true).unwrap();
        let tables = TransitionBuilder { p: 1., q: 1., workers: 2 }.build(&g).unwrap();

        let walks = settings(30000, 3, 7).simulate_from(&g, &tables, &[0]).unwrap();
        let mut counts = vec![0usize; 4];
        for walk in walks.iter() {
            assert_eq!(&walk[..2], &[0, 1]);
            counts[walk[2] as usize] += 1;
        }

        // Neighbors of 1 are 0, 2 and 3 with weights 1, 3 and 0.5
        let observed = [counts[0], counts[2], counts[3]];
        let expected = [1., 3., 0.5];
        let total: f64 = expected.iter().sum();
        let n = walks.len() as f64;
        let stat: f64 = observed.iter().zip(expected.iter())
            .map(|(o, e)| (*o as f64 - n * e / total).powi(2) / (n * e / total))
            .sum();
        let dist = ChiSquared::new(2.).unwrap();
        assert!(1. - dist.cdf(stat) > 0.001, "{:?}", counts);
    }

    #[test]
    fn test_invalid_settings() {
        let (g, tables) = setup(CYCLE, 1., 1.);
        for rw in vec![settings(0, 10, 1), settings(1, 0, 1), RandomWalk { workers: 0, ..settings(1, 1, 1) }] {
            match rw.simulate(&g, &tables) {
                Err(N2vErr::InvalidParameter(_)) => (),
                other => panic!("Expected invalid parameter, got {:?}", other)
            }
        }
        assert!(settings(1, 10, 1).simulate_from(&g, &tables, &[9]).is_err());

        // Tables from another graph
        let (_, small) = setup(&[(0, 1)], 1., 1.);
        assert!(settings(1, 10, 1).simulate(&g, &small).is_err());
    }

    #[test]
    fn test_same_size_other_graph() {
        let (_, star) = setup(&[(0, 1), (0, 2), (0, 3)], 1., 1.);
        let (pairs, _) = setup(&[(0, 1), (2, 3)], 1., 1.);
        match settings(2, 20, 1).simulate(&pairs, &star) {
            Err(N2vErr::InvalidParameter(_)) => (),
            other => panic!("Expected invalid parameter, got {:?}", other)
        }
    }

    #[test]
    fn test_empty_graph() {
        let g: Graph<u32> = GraphBuilder::new(false, false).build();
        let tables = TransitionBuilder::default().build(&g).unwrap();
        assert!(settings(3, 10, 1).simulate(&g, &tables).unwrap().is_empty());
    }
}
