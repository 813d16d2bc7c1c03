use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;

use crate::error::N2vErr;
use crate::graph::{Graph,GraphBuilder};

pub type Edge = (u32, u32, Option<f32>);

/// Reads an edge list of `from to [weight]` rows.  Blank lines and lines
/// starting with '#' are skipped.
pub fn read_edges<R: BufRead>(br: R) -> Result<Vec<Edge>, N2vErr> {
    let mut edges = Vec::new();
    for line in br.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue
        }

        let p: Vec<&str> = trimmed.split_whitespace().collect();
        if p.len() < 2 || p.len() > 3 {
            return Err(N2vErr::BadRowFormat(line.to_owned()))
        }

        let f_node = p[0].parse::<u32>()
            .map_err(|_| N2vErr::BadRowFormat(line.to_owned()))?;
        let t_node = p[1].parse::<u32>()
            .map_err(|_| N2vErr::BadRowFormat(line.to_owned()))?;

        let weight = if p.len() == 3 {
            Some(p[2].parse::<f32>().map_err(|_| N2vErr::BadRowFormat(line.to_owned()))?)
        } else {
            None
        };

        edges.push((f_node, t_node, weight));
    }
    Ok(edges)
}

/// Loads a graph from one or more edge list files
pub fn read_graph(paths: &[String], directed: bool, weighted: bool) -> Result<Graph<u32>, N2vErr> {
    let mut builder = GraphBuilder::new(directed, weighted);
    for path in paths.iter() {
        let f = File::open(path)?;
        let edges = read_edges(BufReader::new(f))?;
        eprintln!("{}: Read in {} edges", path, edges.len());
        for (f_node, t_node, weight) in edges.into_iter() {
            builder.add_edge(f_node, t_node, weight)?;
        }
    }
    Ok(builder.build())
}
