#[macro_use]
extern crate clap;
extern crate n2v;

use std::fs::File;
use std::io::{self,BufWriter,Write};
use std::str::FromStr;

use clap::{Arg, App, ArgMatches, ErrorKind};

use n2v::{corpus,reader,rw,transition,N2vErr};

fn build_app<'a, 'b>() -> App<'a, 'b> {
    App::new("n2v")
        .version("0.1.0")
        .author("Andrew S. <refefer@gmail.com>")
        .about("Generates node2vec biased random walks from an edge list")
        .arg(Arg::with_name("input")
             .long("input")
             .min_values(1)
             .required(true)
             .help("Path to edges.  Rows are 'from to [weight]'"))
        .arg(Arg::with_name("output")
             .long("output")
             .takes_value(true)
             .help("Path to write walks to.  Defaults to stdout"))
        .arg(Arg::with_name("walk-length")
             .long("walk-length")
             .takes_value(true)
             .help("Number of vertices in each walk.  Default is 80"))
        .arg(Arg::with_name("num-walks")
             .long("num-walks")
             .takes_value(true)
             .help("Number of walks per source vertex.  Default is 10"))
        .arg(Arg::with_name("workers")
             .long("workers")
             .takes_value(true)
             .help("Number of worker threads.  Default is 8"))
        .arg(Arg::with_name("p")
             .long("p")
             .takes_value(true)
             .help("Return parameter.  Higher values discourage backtracking.  Default is 1"))
        .arg(Arg::with_name("q")
             .long("q")
             .takes_value(true)
             .help("In-out parameter.  Lower values explore outward, higher stay local.  Default is 1"))
        .arg(Arg::with_name("weighted")
             .long("weighted")
             .help("Reads the third column as edge weights.  Default is unweighted"))
        .arg(Arg::with_name("directed")
             .long("directed")
             .help("Treats edges as directed.  Default is undirected"))
        .arg(Arg::with_name("seed")
             .long("seed")
             .takes_value(true)
             .help("Random seed.  Default is 2019"))
        .arg(Arg::with_name("shuffle")
             .long("shuffle")
             .help("Visits start vertices in a random order each pass"))
        .arg(Arg::with_name("buffer-size")
             .long("buffer-size")
             .takes_value(true)
             .help("Number of walks to generate in parallel before writing.  Default is 10000"))
}

// Absent arguments take the default; present but unparseable ones are errors
fn value_or<T: FromStr>(args: &ArgMatches<'_>, name: &str, default: T) -> Result<T, N2vErr> {
    match value_t!(args, name, T) {
        Ok(v) => Ok(v),
        Err(ref e) if e.kind == ErrorKind::ArgumentNotFound => Ok(default),
        Err(e) => Err(N2vErr::InvalidParameter(format!("--{}: {}", name, e.message)))
    }
}

fn run(args: &ArgMatches<'_>) -> Result<(), N2vErr> {
    let paths: Vec<String> = args.values_of("input")
        .expect("Need a path to edges")
        .map(|x| x.into())
        .collect();

    let directed = args.is_present("directed");
    let weighted = args.is_present("weighted");

    let builder = transition::TransitionBuilder {
        p:       value_or(args, "p", 1f32)?,
        q:       value_or(args, "q", 1f32)?,
        workers: value_or(args, "workers", 8usize)?
    };

    let random_walk = rw::RandomWalk {
        num_walks:   value_or(args, "num-walks", 10usize)?,
        walk_len:    value_or(args, "walk-length", 80usize)?,
        workers:     builder.workers,
        buffer_size: value_or(args, "buffer-size", 10000usize)?,
        shuffle:     args.is_present("shuffle"),
        seed:        value_or(args, "seed", 2019u64)?
    };

    let graph = reader::read_graph(&paths, directed, weighted)?;
    eprintln!("Number of Vertices: {}, Number of Edges: {}, Directed: {}",
              graph.len(), graph.edge_count(), graph.is_directed());

    let tables = builder.build(&graph)?;
    eprintln!("Transition tables: {}, p: {}, q: {}", tables.table_count(), tables.p(), tables.q());
    let walks = random_walk.walks(&graph, &tables)?;

    let n_walks = if let Some(path) = args.value_of("output") {
        let mut out = BufWriter::new(File::create(path)?);
        corpus::write_corpus(walks, &mut out)?
    } else {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        corpus::write_corpus(walks, &mut out)?
    };
    eprintln!("Wrote {} walks", n_walks);
    Ok(())
}

fn main() {
    let args = build_app().get_matches();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        io::stderr().flush().ok();
        std::process::exit(1);
    }
}
