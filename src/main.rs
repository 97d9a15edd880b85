use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::debug;

use templatize::build::{self, BuildError, BuildOptions, BuildReport};
use templatize::diagnostic::{Diagnostic, ansi::AnsiRenderer, json, registry};
use templatize::logging;
use templatize::manifest::Manifest;
use templatize::{Defines, PlaceholderMap, Template};

/// Conditional-block and placeholder preprocessor for packaging templates
#[derive(Parser, Debug)]
#[command(
    name = "templatize",
    version,
    long_about = "Renders packaging templates: keeps `#IF FLAG` ... `#ENDIF` blocks whose flag \
                  is defined, drops the rest, then replaces `{%Name%}` placeholders with values \
                  from the command line or a manifest."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Print diagnostics as JSON lines")]
    json: bool,

    #[arg(long, global = true, help = "Disable coloured diagnostics")]
    no_color: bool,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Verbose logging")]
    verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only errors"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Render a single template",
        long_about = "Renders one template to stdout or to --output.\n\n\
                      Examples:\n  \
                      templatize render Product.wxs.template -D WINDOWS --set Version=0.24.0\n  \
                      templatize render control.template --manifest templates.toml -o control"
    )]
    Render(RenderArgs),

    #[command(about = "Render every template listed in a manifest")]
    Build(BuildArgs),

    #[command(about = "Render every template in a manifest without writing anything")]
    Check(CheckArgs),

    #[command(about = "Explain an error code")]
    Explain(ExplainArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(value_name = "TEMPLATE")]
    template: PathBuf,

    #[arg(short = 'D', long = "define", value_name = "FLAG", help = "Define a flag (repeatable)")]
    defines: Vec<String>,

    #[arg(
        long = "set",
        value_name = "NAME=VALUE",
        value_parser = parse_assignment,
        help = "Supply a placeholder value (repeatable, overrides the manifest)"
    )]
    values: Vec<(String, String)>,

    #[arg(long, value_name = "MANIFEST", help = "Take placeholder values from a manifest")]
    manifest: Option<PathBuf>,

    #[arg(short = 'o', long, value_name = "PATH", help = "Write here instead of stdout")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BuildArgs {
    #[arg(value_name = "MANIFEST")]
    manifest: PathBuf,

    #[arg(long, help = "Keep rendering the remaining templates after a failure")]
    keep_going: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[arg(value_name = "MANIFEST")]
    manifest: PathBuf,
}

#[derive(Args, Debug)]
struct ExplainArgs {
    #[arg(value_name = "CODE", required_unless_present = "list")]
    code: Option<String>,

    #[arg(long, help = "List every error code")]
    list: bool,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(logging::level_from_flags(cli.log_level.as_deref(), cli.verbose, cli.quiet));
    debug!("templatize v{} starting", env!("CARGO_PKG_VERSION"));

    let code = match &cli.command {
        Commands::Render(args) => run_render(&cli, args),
        Commands::Build(args) => run_build(&cli, &args.manifest, BuildOptions {
            keep_going: args.keep_going,
            dry_run: false,
        }),
        Commands::Check(args) => run_build(&cli, &args.manifest, BuildOptions {
            keep_going: true,
            dry_run: true,
        }),
        Commands::Explain(args) => run_explain(args),
    };
    std::process::exit(code);
}

fn report(cli: &Cli, d: &Diagnostic) {
    if cli.json {
        eprintln!("{}", json::render(d));
    } else {
        let use_color = !cli.no_color && std::io::stderr().is_terminal();
        eprint!("{}", AnsiRenderer { use_color }.render(d));
    }
}

fn run_render(cli: &Cli, args: &RenderArgs) -> i32 {
    let mut values = PlaceholderMap::new();
    if let Some(path) = &args.manifest {
        match Manifest::load(path).and_then(|m| m.resolve_values()) {
            Ok(resolved) => values = resolved,
            Err(e) => {
                report(cli, &Diagnostic::from(&e));
                return 1;
            }
        }
    }
    values.extend(args.values.iter().cloned());

    let text = match fs::read_to_string(&args.template) {
        Ok(text) => text,
        Err(source) => {
            let e = BuildError::Read { path: args.template.clone(), source };
            report(cli, &Diagnostic::from(&e));
            return 1;
        }
    };

    let template = Template::new(args.template.display().to_string(), text);
    let defines: Defines = args.defines.iter().cloned().collect();
    let rendered = match template.render(&defines, &values) {
        Ok(out) => out,
        Err(e) => {
            report(cli, &Diagnostic::from(&e).with_source(template.text()));
            return 1;
        }
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = build::write(path, &rendered) {
                report(cli, &Diagnostic::from(&e));
                return 1;
            }
        }
        None => print!("{rendered}"),
    }
    0
}

fn run_build(cli: &Cli, manifest: &Path, options: BuildOptions) -> i32 {
    let result = Manifest::load(manifest)
        .map_err(BuildError::from)
        .and_then(|m| build::build(&m, &options));
    let outcome = match result {
        Ok(r) => r,
        Err(e) => {
            report(cli, &Diagnostic::from(&e));
            return 1;
        }
    };
    summarize(cli, &outcome, options.dry_run)
}

fn summarize(cli: &Cli, build_report: &BuildReport, dry_run: bool) -> i32 {
    for failure in &build_report.failures {
        let mut d = Diagnostic::from(&failure.error);
        if let Some(text) = &failure.text {
            d = d.with_source(text.as_str());
        }
        report(cli, &d);
    }

    if !cli.quiet && !cli.json {
        let verb = if dry_run { "checked" } else { "rendered" };
        eprintln!(
            "{} {} template(s), {} failed",
            verb,
            build_report.rendered.len(),
            build_report.failures.len()
        );
    }

    if build_report.is_success() { 0 } else { 1 }
}

fn run_explain(args: &ExplainArgs) -> i32 {
    if args.list {
        for entry in registry::REGISTRY {
            println!("{}  {}", entry.code, entry.short);
        }
        return 0;
    }
    let code = args.code.as_deref().unwrap_or_default();
    match registry::lookup(code) {
        Some(entry) => {
            print!("{}", entry.long);
            0
        }
        None => {
            eprintln!("unknown error code '{code}'; try `templatize explain --list`");
            1
        }
    }
}
