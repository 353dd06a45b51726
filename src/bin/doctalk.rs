use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde_json::Value;

use doctalk::color::ColorSystem;
use doctalk::config::{Config, parse_api_url, parse_timeout};
use doctalk::export::{OutputFormat, legend_ansi, legend_html, write_segments};
use doctalk::logging::{Logger, parse_level};
use doctalk::session::{SAMPLE_TEXT, Session};
use doctalk::span::{Span, spans_from_value};
use doctalk::terminal::{detect_color_system, get_terminal_width};
use doctalk::DetectClient;

/// Command-line front end: annotate a note and print it highlighted.
///
/// Uses a small hand-rolled parser; the flag set is tiny.
fn main() {
    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(args) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };

    if cli.help {
        print!("{HELP_TEXT}");
        return;
    }

    let color_system = cli.color_mode.resolve();

    if cli.log_level != LevelFilter::Off {
        let logger = Logger::new()
            .level(cli.log_level)
            .color_system(color_system);
        if let Err(err) = logger.init() {
            eprintln!("Failed to install logger: {err}");
        }
    }

    match run(&cli, color_system) {
        Ok(code) => std::process::exit(code),
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, color_system: Option<ColorSystem>) -> Result<i32, String> {
    let config = build_config(cli)?;
    let text = read_text(cli)?;
    let mut session = Session::new(text);

    if let Some(path) = &cli.spans {
        let spans = load_spans(path)?;
        let ticket = session.begin_request();
        session.finish_request::<String>(ticket, Ok(spans));
    } else if session.can_explain() {
        let client = DetectClient::new(&config).map_err(|e| e.to_string())?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to start runtime: {e}"))?;
        log::info!("explaining {} chars via {}", session.text().chars().count(), client.url());
        runtime.block_on(client.explain(&mut session));
    }

    let exit_code = match session.error() {
        Some(message) => {
            eprintln!("{message}");
            1
        }
        None => 0,
    };

    let segments = session.segments();
    let body = write_segments(&segments, cli.format, color_system)
        .map_err(|e| format!("Failed to encode output: {e}"))?;
    println!("{body}");

    if cli.legend {
        match cli.format {
            OutputFormat::Ansi => {
                println!();
                println!("{}", legend_ansi(color_system, get_terminal_width()));
            }
            OutputFormat::Html => println!("{}", legend_html()),
            OutputFormat::Plain | OutputFormat::Json => {}
        }
    }

    Ok(exit_code)
}

fn build_config(cli: &Cli) -> Result<Config, String> {
    let mut config = Config::from_env().map_err(|e| e.to_string())?;
    if let Some(raw) = &cli.api_url {
        config.api_url = parse_api_url(raw).map_err(|e| e.to_string())?;
    }
    if let Some(raw) = &cli.timeout {
        config.timeout = parse_timeout(raw).map_err(|e| e.to_string())?;
    }
    if let Some(doc_uuid) = &cli.doc_uuid {
        config.doc_uuid = Some(doc_uuid.clone());
    }
    Ok(config)
}

/// Text comes from `--text`, then `--file`, then piped stdin, then the
/// built-in sample note.
fn read_text(cli: &Cli) -> Result<String, String> {
    if let Some(text) = &cli.text {
        return Ok(text.clone());
    }
    if let Some(path) = &cli.file {
        return std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()));
    }
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        let mut text = String::new();
        stdin
            .lock()
            .read_to_string(&mut text)
            .map_err(|e| format!("Failed to read stdin: {e}"))?;
        return Ok(text);
    }
    Ok(SAMPLE_TEXT.to_string())
}

fn load_spans(path: &Path) -> Result<Vec<Span>, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| format!("Invalid spans file {}: {e}", path.display()))?;
    Ok(spans_from_value(&value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ColorMode {
    #[default]
    Auto,
    None,
    Standard,
    EightBit,
    TrueColor,
}

impl ColorMode {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "eight_bit" | "256" => Ok(Self::EightBit),
            "truecolor" => Ok(Self::TrueColor),
            _ => Err(format!(
                "Invalid --color-system value `{raw}` (expected auto|none|standard|eight_bit|truecolor)."
            )),
        }
    }

    fn resolve(self) -> Option<ColorSystem> {
        match self {
            Self::Auto => detect_color_system(),
            Self::None => None,
            Self::Standard => Some(ColorSystem::Standard),
            Self::EightBit => Some(ColorSystem::EightBit),
            Self::TrueColor => Some(ColorSystem::TrueColor),
        }
    }
}

#[derive(Debug, Clone)]
struct Cli {
    help: bool,
    text: Option<String>,
    file: Option<PathBuf>,
    spans: Option<PathBuf>,
    api_url: Option<String>,
    doc_uuid: Option<String>,
    timeout: Option<String>,
    format: OutputFormat,
    legend: bool,
    color_mode: ColorMode,
    log_level: LevelFilter,
}

impl Cli {
    fn with_defaults() -> Self {
        Self {
            help: false,
            text: None,
            file: None,
            spans: None,
            api_url: None,
            doc_uuid: None,
            timeout: None,
            format: OutputFormat::Ansi,
            legend: true,
            color_mode: ColorMode::Auto,
            log_level: LevelFilter::Off,
        }
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Cli, String> {
    let mut iter = args.into_iter();
    // Drop binary name if present.
    let _ = iter.next();

    let mut cli = Cli::with_defaults();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => cli.help = true,
            "--text" => {
                if cli.text.is_some() || cli.file.is_some() {
                    return Err("`--text`/`--file` provided more than once.".to_string());
                }
                cli.text = Some(next_value(&mut iter, "--text")?);
            }
            "--file" => {
                if cli.text.is_some() || cli.file.is_some() {
                    return Err("`--text`/`--file` provided more than once.".to_string());
                }
                cli.file = Some(PathBuf::from(next_value(&mut iter, "--file")?));
            }
            "--spans" => {
                cli.spans = Some(PathBuf::from(next_value(&mut iter, "--spans")?));
            }
            "--api-url" => {
                let raw = next_value(&mut iter, "--api-url")?;
                parse_api_url(&raw).map_err(|e| e.to_string())?;
                cli.api_url = Some(raw);
            }
            "--doc-uuid" => {
                let raw = next_value(&mut iter, "--doc-uuid")?;
                if raw.trim().is_empty() {
                    return Err("Invalid --doc-uuid value (expected a non-empty id).".to_string());
                }
                cli.doc_uuid = Some(raw);
            }
            "--timeout" => {
                let raw = next_value(&mut iter, "--timeout")?;
                parse_timeout(&raw).map_err(|e| e.to_string())?;
                cli.timeout = Some(raw);
            }
            "--format" => {
                let raw = next_value(&mut iter, "--format")?;
                cli.format = raw.parse::<OutputFormat>()?;
            }
            "--no-legend" => cli.legend = false,
            "--color-system" => {
                let raw = next_value(&mut iter, "--color-system")?;
                cli.color_mode = ColorMode::parse(&raw)?;
            }
            "--log-level" => {
                let raw = next_value(&mut iter, "--log-level")?;
                cli.log_level = parse_level(&raw)?;
            }

            "--" => {
                return Err(
                    "Unexpected positional arguments (this CLI has no positional args)."
                        .to_string(),
                );
            }

            _ => {
                return Err(format!(
                    "Unknown flag: {arg}\n\nRun with `--help` to see valid options."
                ));
            }
        }
    }

    Ok(cli)
}

fn next_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    iter.next()
        .ok_or_else(|| format!("Missing value for `{flag}`."))
}

const HELP_TEXT: &str = r"doctalk - highlight clinical concepts in a note

USAGE:
    doctalk [OPTIONS]

INPUT:
    --text <text>               Note text to explain
    --file <path>               Read the note from a file
                                (default: stdin when piped, else a sample note)
    --spans <path>              Render spans from a JSON file instead of calling the API

API:
    --api-url <url>             Annotation API base URL (env: DOCTALK_API_URL)
    --doc-uuid <id>             Document id sent with the request (env: DOCTALK_DOC_UUID)
    --timeout <secs>            Request timeout, 0 disables (env: DOCTALK_TIMEOUT_SECS)

OUTPUT:
    --format <fmt>              ansi|plain|html|json (default: ansi)
    --no-legend                 Do not print the category legend
    --color-system <mode>       auto|none|standard|eight_bit|truecolor

    --log-level <level>         Log to stderr (off|error|warn|info|debug|trace)

    -h, --help                  Print help and exit

EXIT STATUS:
    0 on success, 1 if the API call or input failed, 2 on invalid arguments.
";
