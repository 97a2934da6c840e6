use colloquy::{
    BoundingBoxConfig, ConversationIndex, DepthSortKey, Pipeline, PipelineConfig, PipelineError,
    SpeakerRegistry,
};
use futures::executor::block_on;
use futures::io::AllowStdIo;
use serde::Serialize;
use serde_json::Value;
use std::io::{BufReader, Write};
use std::path::Path;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Pipeline(PipelineError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Pipeline(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<PipelineError> for CliError {
    fn from(value: PipelineError) -> Self {
        Self::Pipeline(value)
    }
}

impl From<colloquy::Error> for CliError {
    fn from(value: colloquy::Error) -> Self {
        Self::Pipeline(value.into())
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
    Layout,
    Conversations,
}

#[derive(Debug, Clone, Copy)]
struct DepthSortArg(DepthSortKey);

impl FromStr for DepthSortArg {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insertion" => Ok(Self(DepthSortKey::Insertion)),
            "id" => Ok(Self(DepthSortKey::Id)),
            "degree" => Ok(Self(DepthSortKey::Degree)),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    speakers: Option<String>,
    utterances: Option<String>,
    index: Option<String>,
    config: Option<String>,
    movies: Vec<String>,
    roots: Vec<String>,
    directed: bool,
    spacing_factor: Option<f64>,
    depth_sort: Option<DepthSortKey>,
    viewport_width: Option<f64>,
    viewport_height: Option<f64>,
    pretty: bool,
    out: Option<String>,
}

#[derive(Serialize)]
struct ConversationOut<'a> {
    id: &'a str,
    meta: &'a Value,
}

fn usage() -> &'static str {
    "colloquy-cli\n\
\n\
USAGE:\n\
  colloquy-cli [layout] --speakers <path> [--utterances <path>|-] [--index <path>] [--config <path>] [--movie <id>]... [--root <id>]... [--directed] [--spacing-factor <n>] [--depth-sort insertion|id|degree] [--viewport-width <w>] [--viewport-height <h>] [--pretty] [--out <path>]\n\
  colloquy-cli conversations --index <path> [--pretty]\n\
\n\
NOTES:\n\
  - If --utterances is omitted or '-', the utterance stream is read from stdin.\n\
  - --config accepts JSON or YAML (by extension); flags override values from the file.\n\
  - --movie may be repeated; when given, it replaces the configured conversation filter.\n\
  - --viewport-width/--viewport-height fit the layout into a box anchored at (0, 0).\n\
  - Diagnostics are logged to stderr; set COLLOQUY_LOG (e.g. COLLOQUY_LOG=debug) to adjust.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_f64(raw: &str) -> Result<f64, CliError> {
    raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "conversations" => args.command = Command::Conversations,
            "--pretty" => args.pretty = true,
            "--directed" => args.directed = true,
            "--speakers" => args.speakers = Some(next_value(&mut it)?.clone()),
            "--utterances" => args.utterances = Some(next_value(&mut it)?.clone()),
            "--index" => args.index = Some(next_value(&mut it)?.clone()),
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--movie" => args.movies.push(next_value(&mut it)?.clone()),
            "--root" => args.roots.push(next_value(&mut it)?.clone()),
            "--spacing-factor" => {
                args.spacing_factor = Some(parse_f64(next_value(&mut it)?)?);
            }
            "--viewport-width" => {
                args.viewport_width = Some(parse_f64(next_value(&mut it)?)?);
            }
            "--viewport-height" => {
                args.viewport_height = Some(parse_f64(next_value(&mut it)?)?);
            }
            "--depth-sort" => {
                let DepthSortArg(key) = next_value(&mut it)?
                    .parse::<DepthSortArg>()
                    .map_err(|_| CliError::Usage(usage()))?;
                args.depth_sort = Some(key);
            }
            _ => return Err(CliError::Usage(usage())),
        }
    }

    Ok(args)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("COLLOQUY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&str>) -> Result<PipelineConfig, CliError> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = std::fs::read_to_string(path)?;
    let is_yaml = Path::new(path)
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    let config = if is_yaml {
        PipelineConfig::from_yaml_str(&text)?
    } else {
        PipelineConfig::from_json_str(&text)?
    };
    Ok(config)
}

fn apply_overrides(config: &mut PipelineConfig, args: &Args) -> Result<(), CliError> {
    if !args.movies.is_empty() {
        config.movies = args.movies.clone();
    }
    if !args.roots.is_empty() {
        config.layout.roots = Some(args.roots.clone());
    }
    if args.directed {
        config.layout.directed = true;
    }
    if let Some(factor) = args.spacing_factor {
        config.layout.spacing_factor = factor;
    }
    if let Some(key) = args.depth_sort {
        config.layout.depth_sort = Some(key);
    }
    match (args.viewport_width, args.viewport_height) {
        (None, None) => {}
        (Some(w), Some(h)) => {
            config.layout.bounding_box = Some(BoundingBoxConfig {
                x1: 0.0,
                y1: 0.0,
                w,
                h,
            });
        }
        _ => {
            return Err(CliError::Usage(
                "--viewport-width and --viewport-height must be given together",
            ));
        }
    }
    config.validate()?;
    Ok(())
}

fn read_index(path: Option<&str>) -> Result<Option<ConversationIndex>, CliError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = std::fs::read_to_string(path)?;
    Ok(Some(ConversationIndex::from_json_str(&text)?))
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None | Some("-") => {
            let stdout = std::io::stdout().lock();
            if pretty {
                serde_json::to_writer_pretty(stdout, value)?;
            } else {
                serde_json::to_writer(stdout, value)?;
            }
            println!();
        }
        Some(path) => {
            let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
            if pretty {
                serde_json::to_writer_pretty(&mut file, value)?;
            } else {
                serde_json::to_writer(&mut file, value)?;
            }
            file.flush()?;
            tracing::info!(path, "wrote output");
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Conversations => {
            let Some(index) = read_index(args.index.as_deref())? else {
                return Err(CliError::Usage("conversations requires --index <path>"));
            };
            let out: Vec<ConversationOut<'_>> = index
                .iter()
                .map(|(id, meta)| ConversationOut { id, meta })
                .collect();
            write_json(&out, args.pretty, args.out.as_deref())
        }
        Command::Layout => {
            let Some(speakers_path) = args.speakers.as_deref() else {
                return Err(CliError::Usage("layout requires --speakers <path>"));
            };
            let mut config = load_config(args.config.as_deref())?;
            apply_overrides(&mut config, &args)?;

            let registry = SpeakerRegistry::from_json_str(&std::fs::read_to_string(speakers_path)?)?;
            let index = read_index(args.index.as_deref())?;
            let pipeline = Pipeline::new(config)?;

            let dataset = match args.utterances.as_deref() {
                None | Some("-") => {
                    let reader = AllowStdIo::new(std::io::stdin().lock());
                    block_on(pipeline.run(&registry, index.as_ref(), reader))?
                }
                Some(path) => {
                    let file = std::fs::File::open(path)?;
                    let reader = AllowStdIo::new(BufReader::new(file));
                    block_on(pipeline.run(&registry, index.as_ref(), reader))?
                }
            };

            write_json(&dataset, args.pretty, args.out.as_deref())
        }
    }
}

fn main() {
    init_logging();

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

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
