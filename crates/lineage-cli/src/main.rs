use lineage::{Chart, LayoutOptions, ReferencePolicy, people_from_json};
use serde::Serialize;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Lineage(lineage::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Lineage(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<lineage::Error> for CliError {
    fn from(value: lineage::Error) -> Self {
        Self::Lineage(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Chart,
    Generations,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    config: Option<String>,
    strict: bool,
    pretty: bool,
}

fn usage() -> &'static str {
    "lineage-cli\n\
\n\
USAGE:\n\
  lineage-cli [chart] [--strict] [--pretty] [--config <options.json>] [<path>|-]\n\
  lineage-cli generations [--strict] [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the dataset is read from stdin.\n\
  - The dataset is a JSON array of people: id, name, gender, dob, father, mother, partner.\n\
  - chart prints {\"nodes\": [...], \"edges\": [...]}; generations prints {id: level}.\n\
  - --strict rejects father/mother/partner ids that are not in the dataset.\n\
  - Set RUST_LOG (e.g. RUST_LOG=lineage=debug) for diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "chart" => args.command = Command::Chart,
            "generations" => args.command = Command::Generations,
            "--strict" => args.strict = true,
            "--pretty" => args.pretty = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn load_options(args: &Args) -> Result<LayoutOptions, CliError> {
    let mut options = match args.config.as_deref() {
        Some(path) => LayoutOptions::from_json(&std::fs::read_to_string(path)?)?,
        None => LayoutOptions::default(),
    };
    if args.strict {
        options.reference_policy = ReferencePolicy::Strict;
    }
    Ok(options)
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let people = people_from_json(&text)?;
    let options = load_options(&args)?;
    tracing::debug!(
        people = people.len(),
        policy = ?options.reference_policy,
        "loaded dataset"
    );

    match args.command {
        Command::Chart => {
            let chart: Chart = lineage::chart(&people, &options)?;
            write_json(&chart, args.pretty)
        }
        Command::Generations => {
            let generations = lineage::resolve(&people, options.reference_policy)?;
            write_json(&generations, args.pretty)
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
