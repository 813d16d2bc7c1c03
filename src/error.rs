use std::fmt;
use std::io;

#[derive(Debug)]
pub enum N2vErr {
    // Weight on an input edge was zero, negative, NaN or infinite
    MalformedEdge { weight: f32 },

    InvalidParameter(String),

    // A weight vector with no mass reached alias table construction
    EmptyDistribution,

    // Walk visited an edge with no second order table.  Always a code bug.
    MissingTransition { prev: usize, cur: usize },

    BadRowFormat(String),
    ThreadPool(String),
    Io(io::Error)
}

impl fmt::Display for N2vErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            N2vErr::MalformedEdge { weight } =>
                write!(f, "Edge weights must be positive and finite, got {}", weight),
            N2vErr::InvalidParameter(msg) =>
                write!(f, "Invalid parameter: {}", msg),
            N2vErr::EmptyDistribution =>
                write!(f, "Cannot build an alias table from an empty or zero-mass distribution"),
            N2vErr::MissingTransition { prev, cur } =>
                write!(f, "No transition table for edge {} -> {}", prev, cur),
            N2vErr::BadRowFormat(line) =>
                write!(f, "Malformed edge row: '{}'", line),
            N2vErr::ThreadPool(msg) =>
                write!(f, "Unable to start worker pool: {}", msg),
            N2vErr::Io(err) =>
                write!(f, "IO error: {}", err)
        }
    }
}

impl std::error::Error for N2vErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            N2vErr::Io(err) => Some(err),
            _ => None
        }
    }
}

impl From<io::Error> for N2vErr {
    fn from(err: io::Error) -> Self {
        N2vErr::Io(err)
    }
}

/// Checks a walk/builder parameter is strictly positive and finite
pub fn check_positive(name: &str, value: f32) -> Result<f32, N2vErr> {
    if value.is_finite() && value > 0. {
        Ok(value)
    } else {
        Err(N2vErr::InvalidParameter(format!("{} must be positive and finite, got {}", name, value)))
    }
}

pub fn check_nonzero(name: &str, value: usize) -> Result<usize, N2vErr> {
    if value > 0 {
        Ok(value)
    } else {
        Err(N2vErr::InvalidParameter(format!("{} must be greater than zero", name)))
    }
}
