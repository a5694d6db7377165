use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgGroup, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use linear_easing::{
    Config, Coordinator, EvaluationRequest, InputKind, SimplifyParams, WorkerProgram,
};

#[derive(Parser, Debug)]
#[command(name = "linear-easing", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a CSS `linear()` easing from a script, an SVG path, or a demo.
    Generate(GenerateArgs),
    /// List built-in demos.
    Demos,
    /// Serve one sandboxed evaluation over stdin/stdout.
    #[command(hide = true)]
    Worker,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["script", "svg", "demo"])))]
struct GenerateArgs {
    /// Easing script (Rhai) defining exactly one public function; helpers must be `private fn`.
    #[arg(long)]
    script: Option<PathBuf>,

    /// File containing SVG path data.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Built-in demo id (see `linear-easing demos`).
    #[arg(long)]
    demo: Option<String>,

    /// Simplification tolerance (0.00001..=0.025).
    #[arg(long)]
    tolerance: Option<f64>,

    /// Rounding precision in decimal digits (2..=5).
    #[arg(long)]
    precision: Option<u32>,

    /// Override the custom property name (`--<name>-easing`).
    #[arg(long)]
    name: Option<String>,

    /// Wrap `linear()` arguments at 80 columns.
    #[arg(long)]
    line_breaks: bool,

    /// Also emit `--<name>-duration` for this duration in milliseconds.
    #[arg(long)]
    duration_ms: Option<f64>,

    /// Configuration JSON; command-line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of CSS.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct GenerateOutput<'a> {
    name: &'a str,
    tokens: &'a [String],
    css: &'a str,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Demos => cmd_demos(),
        Command::Worker => Ok(linear_easing::run_sandboxed_worker()?),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read '{}'", path.display()))
}

fn load_config(args: &GenerateArgs) -> anyhow::Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };

    if args.tolerance.is_some() || args.precision.is_some() {
        let params = SimplifyParams::new(
            args.tolerance.unwrap_or(cfg.simplify.tolerance),
            args.precision.unwrap_or(cfg.simplify.precision),
        );
        let clamped = params.clamped();
        if clamped != params {
            tracing::warn!(?params, ?clamped, "simplification parameters clamped");
        }
        cfg.simplify = clamped;
    }
    if args.line_breaks {
        cfg.css.line_breaks = true;
    }
    if args.duration_ms.is_some() {
        cfg.css.ideal_duration_ms = args.duration_ms;
    }

    cfg.validate()?;
    Ok(cfg)
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;

    let (kind, source) = if let Some(path) = &args.script {
        (InputKind::Script, read_source(path)?)
    } else if let Some(path) = &args.svg {
        (InputKind::SvgPath, read_source(path)?)
    } else if let Some(id) = &args.demo {
        let demo = linear_easing::find_demo(id).with_context(|| format!("unknown demo '{id}'"))?;
        (demo.kind, demo.source.to_string())
    } else {
        anyhow::bail!("one of --script, --svg or --demo is required");
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build async runtime")?;
    let coordinator = Coordinator::from_config(WorkerProgram::current_exe()?, &cfg);
    let evaluation = runtime
        .block_on(coordinator.evaluate(EvaluationRequest::new(kind, source)))
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let tokens = linear_easing::optimize(&evaluation.points, &cfg.simplify);
    let name = args.name.as_deref().unwrap_or(&evaluation.name);
    let css = linear_easing::format_css(&tokens, name, &cfg.css);

    if args.json {
        let out = GenerateOutput {
            name,
            tokens: &tokens,
            css: &css,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{css}");
    }
    Ok(())
}

fn cmd_demos() -> anyhow::Result<()> {
    for demo in linear_easing::DEMOS {
        let kind = match demo.kind {
            InputKind::Script => "script",
            InputKind::SvgPath => "svg-path",
        };
        println!("{}\t{kind}\t{}", demo.id, demo.title);
    }
    Ok(())
}
