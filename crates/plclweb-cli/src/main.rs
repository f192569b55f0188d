mod compile;
mod logger;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use compile::{compile_file, validate, SourceFile};
use plclweb_codegen::RenderOptions;

#[derive(Parser)]
#[command(name = "plcltoweb")]
#[command(about = "Render PLCL document trees to HTML and CSS")]
#[command(version)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render .plclhtml.json / .plclcss.json files and write the results
    Build {
        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Keep whitespace and indentation in the output
        #[arg(long)]
        dont_minify: bool,

        /// Spaces per nesting level when not minifying
        #[arg(short, long, default_value_t = 4)]
        indent: usize,

        /// Fail when any diagnostic is reported
        #[arg(long)]
        strict: bool,
    },

    /// Render files without writing anything, failing on any diagnostic
    Check {
        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init(logger::level_for(cli.verbose, cli.quiet)) {
        eprintln!("Error: {e}");
    }

    let ok = match cli.command {
        Command::Build {
            files,
            output,
            dont_minify,
            indent,
            strict,
        } => {
            let options = if dont_minify {
                RenderOptions::pretty(indent)
            } else {
                RenderOptions::minified()
            };
            cmd_build(&files, &output, &options, strict, cli.quiet)
        }
        Command::Check { files } => cmd_check(&files, cli.quiet),
    };

    if !ok {
        std::process::exit(1);
    }
}

/// Validate every path, reporting and dropping the ones that can't be used.
fn collect_sources(files: &[PathBuf]) -> (Vec<SourceFile>, bool) {
    let mut sources = Vec::with_capacity(files.len());
    let mut all_valid = true;
    for path in files {
        match validate(path) {
            Ok(source) => sources.push(source),
            Err(e) => {
                eprintln!("Error: {e}");
                all_valid = false;
            }
        }
    }
    (sources, all_valid)
}

fn print_diagnostics(diagnostics: &[plclweb_codegen::Diagnostic], quiet: bool) {
    if quiet {
        return;
    }
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}");
    }
}

fn cmd_build(
    files: &[PathBuf],
    output: &Path,
    options: &RenderOptions,
    strict: bool,
    quiet: bool,
) -> bool {
    let (sources, _) = collect_sources(files);
    if sources.is_empty() {
        eprintln!("Error: no valid files given");
        return false;
    }

    if let Err(e) = std::fs::create_dir_all(output) {
        eprintln!("Error creating {}: {e}", output.display());
        return false;
    }

    let mut ok = true;
    for source in &sources {
        match compile_file(source, Some(output), options) {
            Ok(report) => {
                print_diagnostics(&report.diagnostics, quiet);
                if strict && !report.diagnostics.is_empty() {
                    ok = false;
                }
                if let (Some(path), false) = (report.written, quiet) {
                    eprintln!("Built: {}", path.display());
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ok = false;
            }
        }
    }
    ok
}

fn cmd_check(files: &[PathBuf], quiet: bool) -> bool {
    let (sources, mut ok) = collect_sources(files);
    let options = RenderOptions::minified();

    for source in &sources {
        match compile_file(source, None, &options) {
            Ok(report) if report.diagnostics.is_empty() => {
                if !quiet {
                    eprintln!("OK: {}", source.path.display());
                }
            }
            Ok(report) => {
                print_diagnostics(&report.diagnostics, quiet);
                ok = false;
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ok = false;
            }
        }
    }
    ok && !sources.is_empty()
}
