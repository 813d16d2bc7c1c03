use std::fmt::{Display,Write as FmtWrite};
use std::io::Write;

use crate::error::N2vErr;

/// Formats a walk as space separated tokens, the sentence form skip-gram
/// trainers expect.
pub fn format_walk<K: Display>(walk: &[K], s: &mut String) {
    s.clear();
    for (i, k) in walk.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        write!(s, "{}", k).expect("Should never fail!");
    }
}

/// Writes one walk per line, returning the number of walks written
pub fn write_corpus<K: Display, W: Write>(
    walks: impl Iterator<Item=Result<Vec<K>, N2vErr>>,
    out: &mut W
) -> Result<usize, N2vErr> {
    let mut s = String::new();
    let mut n_walks = 0;
    for walk in walks {
        format_walk(&walk?, &mut s);
        writeln!(out, "{}", s)?;
        n_walks += 1;
    }
    out.flush()?;
    Ok(n_walks)
}
