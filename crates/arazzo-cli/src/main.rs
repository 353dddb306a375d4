//! Arazzo test generator CLI

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use arazzo_ast::Span;
use arazzo_codegen::{generate_program, split_regex_literal, Diagnostic, GeneratorOptions, Severity, DEFAULT_API_KEY_ENV};
use arazzo_document::load_sources;
use arazzo_parser::{has_top_level_comparison, parse_condition, split_comparison, ConditionError};
use arazzo_runtime_expr::{parse, resolve_parsed};

#[derive(Parser)]
#[command(name = "arazzo-testgen")]
#[command(about = "Generate Deno tests from Arazzo workflow descriptions", long_about = None)]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Deno test file from an Arazzo document
    Generate {
        /// Arazzo document (YAML)
        input: PathBuf,
        /// Test file to write
        output: PathBuf,
        /// Environment variable the generated tests read the API key from
        #[arg(long, env = "ARAZZO_API_KEY_ENV", default_value = DEFAULT_API_KEY_ENV)]
        api_key_env: String,
        /// Base URL for requests, instead of the OpenAPI document's first server
        #[arg(long, env = "ARAZZO_SERVER_URL")]
        server_url: Option<String>,
    },
    /// Parse a runtime expression and output it with its access descriptor as JSON
    Expr {
        expression: String,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Parse a success-criterion condition and output it as JSON
    Condition {
        text: String,
        /// Criterion type the condition belongs to
        #[arg(short = 't', long = "type", value_enum, default_value_t = CriterionType::Simple)]
        criterion_type: CriterionType,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CriterionType {
    Simple,
    Regex,
    Jsonpath,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            input,
            output,
            api_key_env,
            server_url,
        } => {
            let mut options = GeneratorOptions::default().with_api_key_env(api_key_env);
            options.server_url = server_url;
            cmd_generate(&input, &output, &options)
        }
        Commands::Expr { expression, pretty } => cmd_expr(&expression, pretty),
        Commands::Condition {
            text,
            criterion_type,
            pretty,
        } => cmd_condition(&text, criterion_type, pretty),
    }
}

/// Logs go to stderr; `RUST_LOG` wins over the default level
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_generate(input: &Path, output: &Path, options: &GeneratorOptions) {
    let sources = match load_sources(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error[{}]: {}", e.code(), e);
            std::process::exit(1);
        }
    };
    debug!(openapi = %sources.openapi_path.display(), "loaded source documents");

    let generation = generate_program(&sources.arazzo, &sources.openapi, options);
    for diagnostic in &generation.diagnostics {
        report_diagnostic(diagnostic);
    }

    let Some(text) = generation.render() else {
        println!(
            "No assertions were produced from {}; nothing written",
            input.display()
        );
        return;
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Error creating {}: {}", parent.display(), e);
            std::process::exit(1);
        }
    }
    if let Err(e) = fs::write(output, &text) {
        eprintln!("Error writing {}: {}", output.display(), e);
        std::process::exit(1);
    }

    let warnings = generation.diagnostics.iter().filter(|d| !d.is_error()).count();
    let errors = generation.diagnostics.len() - warnings;
    println!(
        "Generated {} ({} workflows, {} warnings, {} errors)",
        output.display(),
        sources.arazzo.workflows.len(),
        warnings,
        errors
    );
    if generation.has_errors() {
        std::process::exit(1);
    }
}

fn cmd_expr(expression: &str, pretty: bool) {
    match parse(expression) {
        Ok(parsed) => {
            let descriptor = resolve_parsed(expression, &parsed);
            print_json(
                &serde_json::json!({
                    "expression": parsed,
                    "root": parsed.root(),
                    "descriptor": descriptor,
                }),
                pretty,
            );
        }
        Err(e) => {
            report_error(
                ReportKind::Error,
                "expression",
                expression,
                e.span(),
                &format!("[{}] {}", e.code(), e),
                &e.label(),
            );
            std::process::exit(1);
        }
    }
}

fn cmd_condition(text: &str, criterion_type: CriterionType, pretty: bool) {
    match criterion_type {
        CriterionType::Simple => match parse_condition(text) {
            Ok(condition) => print_json(&condition, pretty),
            Err(e) => exit_with_condition_error(text, &e),
        },
        CriterionType::Jsonpath if has_top_level_comparison(text) => match split_comparison(text) {
            Ok(comparison) => print_json(&comparison, pretty),
            Err(e) => exit_with_condition_error(text, &e),
        },
        CriterionType::Jsonpath => print_json(&serde_json::json!({ "path": text, "expected": true }), pretty),
        CriterionType::Regex => match split_regex_literal(text) {
            Ok((pattern, flags)) => {
                print_json(&serde_json::json!({ "pattern": pattern, "flags": flags }), pretty)
            }
            Err(e) => {
                eprintln!("error[{}]: {}", e.code(), e);
                std::process::exit(1);
            }
        },
    }
}

fn exit_with_condition_error(text: &str, error: &ConditionError) -> ! {
    report_error(
        ReportKind::Error,
        "condition",
        text,
        error.span(),
        &format!("[{}] {}", error.code(), error),
        &error.to_string(),
    );
    std::process::exit(1);
}

fn print_json<T: Serialize>(value: &T, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

/// Diagnostics that point into a condition get a caret report; the rest print as one line
fn report_diagnostic(diagnostic: &Diagnostic) {
    match (&diagnostic.source, diagnostic.span) {
        (Some(source), Some(span)) => {
            let kind = match diagnostic.severity {
                Severity::Warning => ReportKind::Warning,
                Severity::Error => ReportKind::Error,
            };
            let name = match &diagnostic.step_id {
                Some(step) => format!("{}/{}", diagnostic.workflow_id, step),
                None => diagnostic.workflow_id.clone(),
            };
            let message = match diagnostic.code {
                Some(code) => format!("[{}] {}", code, diagnostic.message),
                None => diagnostic.message.clone(),
            };
            report_error(kind, &name, source, span, &message, &diagnostic.message);
        }
        _ => eprintln!("{}", diagnostic),
    }
}

/// Spans are byte offsets; ariadne counts chars
fn char_range(source: &str, span: Span) -> Range<usize> {
    let to_char = |byte: usize| source.char_indices().take_while(|(i, _)| *i < byte).count();
    let start = to_char(span.start);
    start..to_char(span.end).max(start)
}

fn report_error(kind: ReportKind, name: &str, source: &str, span: Span, message: &str, label: &str) {
    let range = char_range(source, span);
    let result = Report::build(kind, name.to_string(), range.start)
        .with_message(message)
        .with_label(
            Label::new((name.to_string(), range))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((name.to_string(), Source::from(source)));
    if result.is_err() {
        eprintln!("{}: {}", name, message);
    }
}
