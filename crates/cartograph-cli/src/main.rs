use cartograph::{
    CartographyConfig, CartographyPage, Controls, DiagramSource, FileSource, FixedSurface,
    IdentifierMap, PageError, PageState, StaticSource, activity_url,
};
use futures::executor::block_on;
use serde::Serialize;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Cartograph(cartograph::Error),
    Page(PageError),
    Json(serde_json::Error),
    Load(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Cartograph(err) => write!(f, "{err}"),
            CliError::Page(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Load(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<cartograph::Error> for CliError {
    fn from(value: cartograph::Error) -> Self {
        Self::Cartograph(value)
    }
}

impl From<PageError> for CliError {
    fn from(value: PageError) -> Self {
        Self::Page(value)
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
    Bind,
    Fit,
    Annotate,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    map: Option<String>,
    config: Option<String>,
    pretty: bool,
    viewport_width: f64,
    viewport_height: f64,
    out: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BindingOut {
    element: String,
    embedded_id: String,
    activity_id: i64,
    offset: usize,
    url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BindOut {
    state: &'static str,
    bindings: Vec<BindingOut>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FitOut {
    outcome: &'static str,
    scale: f64,
    pan_x: f64,
    pan_y: f64,
    transform: String,
    readout: String,
}

fn usage() -> &'static str {
    "cartograph-cli\n\
\n\
USAGE:\n\
  cartograph-cli [bind] [--map <json-path>] [--config <json-path>] [--pretty] [<path>|-]\n\
  cartograph-cli fit [--config <json-path>] [--viewport-width <w>] [--viewport-height <h>] [--pretty] [<path>|-]\n\
  cartograph-cli annotate --map <json-path> [--config <json-path>] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the diagram is read from stdin.\n\
  - --map is the shape-identifier -> activity-id JSON object; without it nothing binds.\n\
  - --config is a partial JSON override of the viewport/binder/navigation settings.\n\
  - bind prints bindings as JSON; fit prints the initial transform for the viewport size.\n\
  - Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Bind,
        viewport_width: 800.0,
        viewport_height: 600.0,
        ..Default::default()
    };

    // Command words are only recognized as the first positional argument.
    let mut positional_seen = false;
    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            word @ ("bind" | "fit" | "annotate") if !positional_seen => {
                positional_seen = true;
                args.command = match word {
                    "fit" => Command::Fit,
                    "annotate" => Command::Annotate,
                    _ => Command::Bind,
                };
            }
            "--pretty" => args.pretty = true,
            "--map" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.map = Some(path.clone());
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--viewport-width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport_width = w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--viewport-height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport_height = h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    positional_seen = true;
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                positional_seen = true;
                args.input = Some(path.to_string());
            }
        }
    }

    if matches!(args.command, Command::Annotate) && args.map.is_none() {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn read_stdin() -> Result<String, CliError> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
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

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn load_config(path: Option<&str>) -> Result<CartographyConfig, CliError> {
    match path {
        None => Ok(CartographyConfig::default()),
        Some(path) => Ok(CartographyConfig::from_json_str(&std::fs::read_to_string(
            path,
        )?)?),
    }
}

fn load_map(path: Option<&str>) -> Result<IdentifierMap, CliError> {
    match path {
        None => Ok(IdentifierMap::new()),
        Some(path) => Ok(IdentifierMap::from_json_str(&std::fs::read_to_string(
            path,
        )?)?),
    }
}

fn load_page(
    args: &Args,
    config: CartographyConfig,
    map: IdentifierMap,
) -> Result<CartographyPage<FixedSurface>, CliError> {
    let surface = FixedSurface::new(args.viewport_width, args.viewport_height);
    let mut page = CartographyPage::new(config, map, surface, Controls::all());
    match args.input.as_deref() {
        None | Some("-") => load_from(&mut page, &StaticSource::markup(read_stdin()?)),
        Some(path) => load_from(&mut page, &FileSource::new(path)),
    }?;
    Ok(page)
}

fn load_from<D: DiagramSource>(
    page: &mut CartographyPage<FixedSurface>,
    source: &D,
) -> Result<(), CliError> {
    match block_on(page.load(source)) {
        PageState::Ready | PageState::Empty => Ok(()),
        PageState::Absent => Err(CliError::Load("diagram not found".to_string())),
        PageState::Failed { message } => Err(CliError::Load(message.clone())),
        PageState::Loading => Err(CliError::Load("diagram did not load".to_string())),
    }
}

fn state_name(state: &PageState) -> &'static str {
    match state {
        PageState::Loading => "loading",
        PageState::Ready => "ready",
        PageState::Empty => "empty",
        PageState::Absent => "absent",
        PageState::Failed { .. } => "failed",
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let map = load_map(args.map.as_deref())?;
    let page = load_page(&args, config, map)?;

    match args.command {
        Command::Bind => {
            let navigation = &page.config().navigation;
            let bindings = page
                .bindings()
                .iter()
                .map(|b| BindingOut {
                    element: b.element.clone(),
                    embedded_id: b.embedded_id.clone(),
                    activity_id: b.activity_id.0,
                    offset: b.range.start,
                    url: activity_url(navigation, b.activity_id)
                        .ok()
                        .map(|u| u.to_string()),
                })
                .collect();
            write_json(
                &BindOut {
                    state: state_name(page.state()),
                    bindings,
                },
                args.pretty,
            )
        }
        Command::Fit => {
            let outcome = match page.viewport().state().content {
                Some(_) if page.viewport().is_fit_pending() => "deferred",
                Some(_) => "applied",
                None => "default",
            };
            let transform = page.viewport().state().transform();
            write_json(
                &FitOut {
                    outcome,
                    scale: transform.scale,
                    pan_x: transform.pan_x,
                    pan_y: transform.pan_y,
                    transform: transform.to_css(),
                    readout: transform.readout(),
                },
                args.pretty,
            )
        }
        Command::Annotate => {
            let markup = page.annotated_markup()?.unwrap_or_default();
            write_text(&markup, args.out.as_deref())
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
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
