use clap::{Args, Parser as ClapParser, Subcommand};
use sieve_expr::cli::{self, CliError, ExplainOptions, FilterOptions};
use sieve_expr::output::{to_json, to_json_pretty};
use std::io::{self, Read};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(ClapParser)]
#[command(name = "sieve")]
#[command(about = "Sieve - compile JSON filter expressions and run them over records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Compile {
    /// Make every path step null-safe
    #[arg(long)]
    chain: bool,

    /// Fail on malformed nodes instead of letting them never match
    #[arg(long)]
    strict: bool,

    /// Input is an array of columns
    #[arg(long)]
    columnar: bool,

    /// Field path of each column, in order (columnar only)
    #[arg(long, value_delimiter = ',')]
    names: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a JSON array of records
    Filter {
        /// The expression, as JSON
        expr: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Print matching positions instead of records
        #[arg(long)]
        indices: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        #[command(flatten)]
        compile: Compile,
    },

    /// Show the compiled form of an expression
    Explain {
        /// The expression, as JSON
        expr: String,

        #[command(flatten)]
        compile: Compile,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'sieve docs' to list categories)
        category: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_env("SIEVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).compact().init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Filter {
            expr,
            input,
            indices,
            pretty,
            compile,
        } => run_filter(expr, input, indices, pretty, compile),
        Commands::Explain { expr, compile } => {
            let options = ExplainOptions {
                expr,
                chain: compile.chain,
                strict: compile.strict,
                columnar: compile.columnar,
                names: compile.names,
            };
            cli::execute_explain(&options).map(|text| print!("{}", text))
        }
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_filter(
    expr: String,
    input: Option<String>,
    indices: bool,
    pretty: bool,
    compile: Compile,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = FilterOptions {
        expr,
        input,
        indices,
        chain: compile.chain,
        strict: compile.strict,
        columnar: compile.columnar,
        names: compile.names,
    };

    let output = cli::execute_filter(&options)?;
    if pretty {
        println!("{}", to_json_pretty(&output));
    } else {
        println!("{}", to_json(&output));
    }
    Ok(())
}
