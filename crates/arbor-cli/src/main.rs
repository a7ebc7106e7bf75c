use clap::{Args, Parser, Subcommand};
use std::path::Path;
use std::sync::Once;

use arbor_lexer::Scanner;
use arbor_parser::ast::render_list;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Arbor front end: tokenize and parse expressions and patterns")]
#[command(version)]
struct Cli {
    /// Log parser activity at debug level (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token stream, one token per line
    Tokens(Input),

    /// Parse a single expression
    Expr(Input),

    /// Parse a comma-separated expression list
    List(Input),

    /// Parse an identifier pattern with an optional type annotation
    Pattern(Input),
}

#[derive(Args)]
struct Input {
    /// Inline source text
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    source: Option<String>,

    /// Read the source from a file instead
    #[arg(long)]
    file: Option<String>,
}

static TRACING_INIT: Once = Once::new();

fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = if verbose {
            EnvFilter::new("debug")
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Tokens(input) => cmd_tokens(&read_input(input)),
        Command::Expr(input) => cmd_expr(&read_input(input)),
        Command::List(input) => cmd_list(&read_input(input)),
        Command::Pattern(input) => cmd_pattern(&read_input(input)),
    }
}

fn read_input(input: Input) -> String {
    match (input.source, input.file) {
        (Some(source), _) => source,
        (None, Some(path)) => read_source(&path),
        (None, None) => {
            eprintln!("Error: no source given");
            std::process::exit(1);
        }
    }
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_tokens(source: &str) {
    let tokens = match Scanner::tokenize(source) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    for token in tokens {
        let span = token.span;
        println!(
            "{:?} {}:{} [{}..{}]",
            token.kind, span.line, span.column, span.start, span.end
        );
    }
}

fn cmd_expr(source: &str) {
    match arbor_parser::Parser::parse_expression_source(source) {
        Ok(expr) => {
            println!("{expr}");
            println!("{expr:#?}");
        }
        Err(e) => fail(e),
    }
}

fn cmd_list(source: &str) {
    match arbor_parser::Parser::parse_expression_list_source(source) {
        Ok(list) => {
            println!("{}", render_list(&list));
            println!("{list:#?}");
        }
        Err(e) => fail(e),
    }
}

fn cmd_pattern(source: &str) {
    match arbor_parser::Parser::parse_pattern_source(source) {
        Ok(pattern) => {
            println!("{pattern}");
            println!("{pattern:#?}");
        }
        Err(e) => fail(e),
    }
}

fn fail(e: arbor_parser::ParseError) -> ! {
    eprintln!("{e}");
    std::process::exit(1);
}
