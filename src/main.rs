use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use quadrangle::cache::{CACHE_DIR, RecordCache};
use quadrangle::config::{Family, SessionConfig, WeightClaim};
use quadrangle::correspond::{SpectrumPolicy, Target, search};
use quadrangle::field::Field;
use quadrangle::geometry::IncidenceStructure;
use quadrangle::graph::{Graph, Spectrum};
use quadrangle::ingest;
use quadrangle::roots::{InnerProductRule, RootSystem, RootSystemGraph};
use quadrangle::schema::{
    CodeRecord, GeneratorRecord, GeometryRecord, GraphRecord, MatrixRecord, RootSystemRecord,
    SpectrumRecord,
};
use quadrangle::session::code_record;
use quadrangle::{KernelResult, Session};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quadrangle")]
#[command(about = "Invariants, automorphisms and root-system correspondences of generalized quadrangles", long_about = None)]
struct Cli {
    /// Raise the log level (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a geometry and print its record
    Build {
        #[command(flatten)]
        geometry: GeometryArgs,

        /// Include the point lists of every line
        #[arg(long)]
        lines: bool,
    },

    /// Run the full invariant pipeline
    Analyze {
        /// Session config (TOML); defaults reproduce the W(3) study
        #[arg(short, long)]
        config: Option<Utf8PathBuf>,

        /// Skip the record cache even if the config enables it
        #[arg(long)]
        no_cache: bool,
    },

    /// Invariants of an explicit adjacency table
    Graph {
        /// Whitespace- or comma-separated 0/1 table
        file: Utf8PathBuf,

        /// Eigenvalue grouping tolerance
        #[arg(short, long, default_value_t = quadrangle::graph::DEFAULT_TOLERANCE)]
        tolerance: f64,

        /// Largest clique size to count
        #[arg(long, default_value_t = 4)]
        max_clique: usize,
    },

    /// Kernel code of an adjacency matrix over a finite field
    Code {
        /// Table or JSON matrix record
        file: Utf8PathBuf,

        /// Field order for tables (JSON records carry their own)
        #[arg(short, long, default_value_t = 2)]
        field: u32,

        /// Largest number of codewords to enumerate
        #[arg(long, default_value_t = 1 << 25)]
        budget: u64,

        /// Claimed minimum weight to verify
        #[arg(long)]
        min_weight: Option<usize>,

        /// Claimed number of minimum-weight codewords
        #[arg(long, requires = "min_weight")]
        min_weight_count: Option<u64>,
    },

    /// Order, orbits and a point stabilizer of a generated permutation group
    Group {
        /// JSON generator record
        file: Utf8PathBuf,

        /// Point whose stabilizer is computed
        #[arg(short, long, default_value_t = 0)]
        point: usize,

        /// Largest group the closure may enumerate
        #[arg(long, default_value_t = 200_000)]
        limit: usize,
    },

    /// Search a geometry's edge relations for a root-system correspondence
    Search {
        #[command(flatten)]
        geometry: GeometryArgs,

        /// Built-in root system (A<n>, D<n>, E6, E7, E8)
        #[arg(short, long, default_value = "E8", conflicts_with = "roots")]
        system: String,

        /// JSON root-system record instead of a built-in system
        #[arg(long)]
        roots: Option<Utf8PathBuf>,

        /// Join roots whose inner product has this absolute value [default: 1]
        #[arg(long, conflicts_with = "any_of")]
        abs: Option<i64>,

        /// Join roots whose inner product is one of these values
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        any_of: Vec<i64>,

        /// When candidate spectra are computed
        #[arg(long, value_enum, default_value_t = PolicyArg::Always)]
        spectrum: PolicyArg,

        /// Largest number of class subsets to evaluate
        #[arg(long)]
        max_subsets: Option<u64>,
    },

    /// Manage the record cache
    Cache {
        /// Cache directory
        #[arg(long, default_value = CACHE_DIR, global = true)]
        dir: Utf8PathBuf,

        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache statistics
    Stats,
    /// Remove all cached records
    Clear,
}

#[derive(clap::Args)]
struct GeometryArgs {
    /// Geometry family
    #[arg(long, value_enum, default_value_t = FamilyArg::Symplectic)]
    family: FamilyArg,

    /// q for W(q) and Q(4,q), s or t for grids
    #[arg(short = 'q', long, default_value_t = 3)]
    order: u32,

    /// Build GQ(s,t) from its parameters instead of a family
    #[arg(long, num_args = 2, value_names = ["S", "T"], conflicts_with = "family")]
    parameters: Option<Vec<usize>>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FamilyArg {
    Symplectic,
    Parabolic,
    Grid,
    DualGrid,
}

impl From<FamilyArg> for Family {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Symplectic => Family::Symplectic,
            FamilyArg::Parabolic => Family::Parabolic,
            FamilyArg::Grid => Family::Grid,
            FamilyArg::DualGrid => Family::DualGrid,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Always,
    OnDegreeMatch,
}

impl From<PolicyArg> for SpectrumPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Always => SpectrumPolicy::Always,
            PolicyArg::OnDegreeMatch => SpectrumPolicy::OnDegreeMatch,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Build { geometry, lines } => cmd_build(&geometry, lines),
        Commands::Analyze { config, no_cache } => cmd_analyze(config.as_deref(), no_cache),
        Commands::Graph {
            file,
            tolerance,
            max_clique,
        } => cmd_graph(&file, tolerance, max_clique),
        Commands::Code {
            file,
            field,
            budget,
            min_weight,
            min_weight_count,
        } => {
            let claim = min_weight.map(|weight| WeightClaim {
                field,
                weight,
                count: min_weight_count,
            });
            cmd_code(&file, field, budget, claim)
        }
        Commands::Group { file, point, limit } => cmd_group(&file, point, limit),
        Commands::Search {
            geometry,
            system,
            roots,
            abs,
            any_of,
            spectrum,
            max_subsets,
        } => {
            let rule = if any_of.is_empty() {
                abs.map(InnerProductRule::Abs)
            } else {
                Some(InnerProductRule::AnyOf(any_of))
            };
            cmd_search(&geometry, &system, roots.as_deref(), rule, spectrum.into(), max_subsets)
        }
        Commands::Cache { dir, action } => match action {
            CacheAction::Stats => cmd_cache_stats(&dir),
            CacheAction::Clear => cmd_cache_clear(&dir),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_geometry(args: &GeometryArgs) -> Result<IncidenceStructure, Box<dyn std::error::Error>> {
    if let Some(st) = &args.parameters {
        return Ok(IncidenceStructure::from_parameters(st[0], st[1])?);
    }
    let geometry = match Family::from(args.family) {
        Family::Symplectic => IncidenceStructure::symplectic(args.order)?,
        Family::Parabolic => IncidenceStructure::parabolic(args.order)?,
        Family::Grid => IncidenceStructure::grid(args.order as usize)?,
        Family::DualGrid => IncidenceStructure::dual_grid(args.order as usize)?,
    };
    Ok(geometry)
}

fn cmd_build(args: &GeometryArgs, lines: bool) -> Result<(), Box<dyn std::error::Error>> {
    let geometry = build_geometry(args)?;
    let record = GeometryRecord::of(&geometry);
    if lines {
        print_json(&json!({ "geometry": record, "lines": geometry.lines() }))
    } else {
        print_json(&record)
    }
}

fn cmd_analyze(config: Option<&Utf8Path>, no_cache: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    let cache_dir = (config.cache.enabled && !no_cache).then(|| config.cache.dir.clone());
    let session = Session::new(config)?;
    let report = match cache_dir {
        Some(dir) => {
            let cache = RecordCache::open(&dir)?;
            session.pipeline_cached(&cache)?
        }
        None => session.pipeline()?,
    };
    print_json(&report)
}

fn cmd_graph(file: &Utf8Path, tolerance: f64, max_clique: usize) -> Result<(), Box<dyn std::error::Error>> {
    let graph = ingest::adjacency_graph_from_str(&ingest::read_text(file)?)?;
    info!(vertices = graph.order(), edges = graph.edge_count(), "adjacency table read");
    let spectrum = Spectrum::compute(&graph, tolerance);
    let srg = graph.srg_verdict(&spectrum);
    print_json(&json!({
        "graph": GraphRecord::of(&graph, max_clique),
        "spectrum": SpectrumRecord::of(&spectrum),
        "srg": srg,
    }))
}

fn code_for<F: Field>(
    record: &MatrixRecord,
    claim: Option<&WeightClaim>,
    budget: u64,
) -> KernelResult<CodeRecord> {
    let adjacency = ingest::matrix::<F>(record)?;
    code_record(&adjacency, claim, budget)
}

fn cmd_code(
    file: &Utf8Path,
    field: u32,
    budget: u64,
    claim: Option<WeightClaim>,
) -> Result<(), Box<dyn std::error::Error>> {
    let record = ingest::read_matrix_record(file, field)?;
    let code: KernelResult<CodeRecord> =
        quadrangle::with_field!(record.field_order, F => code_for::<F>(&record, claim.as_ref(), budget));
    print_json(&code?)
}

fn cmd_group(file: &Utf8Path, point: usize, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let record: GeneratorRecord = ingest::read_json(file)?;
    let group = ingest::generator_group(&record)?;
    if point >= group.degree() {
        return Err(format!("point {point} is outside 0..{}", group.degree()).into());
    }
    let order = group.order(limit)?;
    group.check_orbit_stabilizer(point, limit)?;
    let mut orbits: Vec<usize> = group.orbits().iter().map(Vec::len).collect();
    orbits.sort_unstable_by(|a, b| b.cmp(a));
    let orbit = group.orbit(point)?;
    let stabilizer = group.stabilizer(point)?;
    let stabilizer_generators = GeneratorRecord {
        degree: stabilizer.degree(),
        generators: stabilizer.generators().iter().map(|g| g.images().to_vec()).collect(),
    };
    print_json(&json!({
        "degree": group.degree(),
        "generators": group.generators().len(),
        "order": order.to_string(),
        "orbits": orbits,
        "point": point,
        "orbit": orbit,
        "stabilizer_order": stabilizer.order(limit)?.to_string(),
        "stabilizer_generators": stabilizer_generators,
    }))
}

fn cmd_search(
    args: &GeometryArgs,
    system: &str,
    roots: Option<&Utf8Path>,
    rule: Option<InnerProductRule>,
    policy: SpectrumPolicy,
    max_subsets: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let geometry = build_geometry(args)?;
    let graph = Graph::collinearity(&geometry);

    let mut config = SessionConfig::default();
    config.search.spectrum = policy;
    if let Some(cap) = max_subsets {
        config.search.max_subsets = cap;
    }
    let options = config.search_options();

    let target = match roots {
        Some(path) => {
            let mut record: RootSystemRecord = ingest::read_json(path)?;
            if let Some(rule) = rule {
                record.rule = rule;
            }
            ingest::root_system_graph(&record)?
        }
        None => RootSystemGraph::new(
            RootSystem::by_name(system)?,
            rule.unwrap_or(InnerProductRule::Abs(1)),
        ),
    };
    let targets = [Target::from_roots(&target, options.tolerance)];
    let report = search(geometry.name(), &graph, &targets, &options);
    print_json(&report)
}

fn cmd_cache_stats(dir: &Utf8Path) -> Result<(), Box<dyn std::error::Error>> {
    let cache = RecordCache::open_existing(dir)?;
    let stats = cache.stats()?;

    println!("Records cached: {}", stats.record_count);
    for (operation, count) in &stats.operations {
        println!("  {operation}: {count}");
    }
    println!(
        "Database size:  {:.2} MB",
        stats.db_size_bytes as f64 / 1_000_000.0
    );
    Ok(())
}

fn cmd_cache_clear(dir: &Utf8Path) -> Result<(), Box<dyn std::error::Error>> {
    let cache = RecordCache::open(dir)?;
    let removed = cache.clear()?;
    eprintln!("Cache cleared ({removed} records)");
    Ok(())
}
