extern crate rand;

use rand::prelude::*;

use crate::error::N2vErr;

/// Walker's alias method.  O(k) to build, O(1) per draw: pick a bin
/// uniformly, then flip a biased coin between the bin and its alias.
#[derive(Debug, Clone)]
pub struct AliasTable {
    prob: Vec<f32>,
    alias: Vec<u32>
}

impl AliasTable {

    /// Builds a table from non-negative weights.  Weights don't need to be
    /// normalized.
    pub fn new(weights: &[f64]) -> Result<Self, N2vErr> {
        let k = weights.len();
        if k == 0 || weights.iter().any(|w| !(w.is_finite() && *w >= 0.)) {
            return Err(N2vErr::EmptyDistribution)
        }

        let total: f64 = weights.iter().sum();
        if total <= 0. {
            return Err(N2vErr::EmptyDistribution)
        }

        let mut scaled: Vec<f64> = weights.iter()
            .map(|w| *w * k as f64 / total)
            .collect();

        // Bins which never get paired keep themselves
        let mut prob = vec![1f32; k];
        let mut alias: Vec<u32> = (0..k as u32).collect();

        let mut small = Vec::with_capacity(k);
        let mut large = Vec::with_capacity(k);
        for (i, s) in scaled.iter().enumerate() {
            if *s < 1. {
                small.push(i);
            } else {
                large.push(i);
            }
        }

        while let Some(s) = small.pop() {
            let l = match large.last() {
                Some(&l) => l,
                None     => break
            };
            prob[s] = scaled[s] as f32;
            alias[s] = l as u32;
            scaled[l] -= 1. - scaled[s];
            if scaled[l] < 1. {
                large.pop();
                small.push(l);
            }
        }

        Ok(AliasTable { prob, alias })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.prob.len()
    }

    /// Resolves a draw from an already sampled bin and coin flip in [0, 1).
    #[inline]
    pub fn draw_with(&self, idx: usize, coin: f32) -> usize {
        if coin < self.prob[idx] {
            idx
        } else {
            self.alias[idx] as usize
        }
    }

    #[inline]
    pub fn draw<R: Rng>(&self, rng: &mut R) -> usize {
        let idx = rng.gen_range(0, self.prob.len());
        let coin: f32 = rng.gen();
        self.draw_with(idx, coin)
    }

    /// Reconstructs the distribution encoded by the table
    pub fn probabilities(&self) -> Vec<f32> {
        let k = self.len() as f32;
        let mut out = vec![0f32; self.len()];
        for (i, (p, a)) in self.prob.iter().zip(self.alias.iter()).enumerate() {
            out[i] += p / k;
            out[*a as usize] += (1. - p) / k;
        }
        out
    }

}
