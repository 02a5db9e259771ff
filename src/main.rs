//! CLI front-end for the causal-identification engine.
//!
//! The concrete-syntax parser, CLI, and pretty-printing are external
//! collaborators around the core: this binary is a thin driver that reads
//! text, hands it to [`causal_identify`], and prints one result per line.

mod result_print;

use causal_identify::parser::parse_expression;
use causal_identify::variable::var_set;
use causal_identify::{backdoor_sets, frontdoor_expression, idc, identify, Graph};
use clap::{Parser, Subcommand};
use std::fs;
use std::process::ExitCode;

#[derive(Parser)]
#[clap(
    author,
    version,
    about = "Decide whether a causal-effect query is identifiable from observational data."
)]
struct Arguments {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for a hat-free derivation of a query.
    Identify {
        /// Path to a file containing graph text.
        graph: String,
        /// The query, e.g. "P(Y|do(X))".
        query: String,
        /// Comma-separated latent variable names.
        #[clap(long, default_value = "")]
        latents: String,
        /// Optional cap on the number of derivations visited before giving up.
        #[clap(long)]
        visited_limit: Option<usize>,
    },
    /// Enumerate sufficient backdoor adjustment sets for X → Y.
    BackdoorSets {
        graph: String,
        x: String,
        y: String,
        #[clap(long, default_value = "")]
        latents: String,
    },
    /// Print a frontdoor-adjustment expression for X → Y, if one exists.
    Frontdoor {
        graph: String,
        x: String,
        y: String,
        #[clap(long, default_value = "")]
        latents: String,
    },
    /// Run the ID/IDC recursion directly for P(Y|do(X),Z) instead of the
    /// forward BFS search.
    Idc {
        graph: String,
        y: String,
        x: String,
        /// Comma-separated conditioning-set variable names (may be empty).
        #[clap(long, default_value = "")]
        z: String,
        #[clap(long, default_value = "")]
        latents: String,
    },
}

fn parse_latents(text: &str) -> Result<causal_identify::VarSet, causal_identify::IdentifyError> {
    if text.is_empty() {
        Ok(causal_identify::VarSet::new())
    } else {
        var_set(text.split(','))
    }
}

fn load_graph(path: &str, latents: &str) -> Result<Graph, causal_identify::IdentifyError> {
    let text = fs::read_to_string(path).map_err(|e| causal_identify::IdentifyError::ParseError {
        position: 0,
        message: format!("could not read '{path}': {e}"),
    })?;
    let graph = Graph::parse(&text)?;
    graph.with_latents(parse_latents(latents)?)
}

fn run(args: Arguments) -> Result<(), causal_identify::IdentifyError> {
    match args.command {
        Command::Identify {
            graph,
            query,
            latents,
            visited_limit,
        } => {
            let graph = load_graph(&graph, &latents)?;
            let query = parse_expression(&query)?;
            let outcome = identify(query, &graph, graph.latents(), visited_limit);
            result_print::print_outcome(&outcome);
            Ok(())
        }
        Command::BackdoorSets { graph, x, y, latents } => {
            let graph = load_graph(&graph, &latents)?;
            let x = var_set(x.split(','))?;
            let y = var_set(y.split(','))?;
            for set in backdoor_sets(&graph, &x, &y, graph.latents()) {
                let names: Vec<String> = set.iter().map(|v| v.name().to_string()).collect();
                println!("{{{}}}", names.join(","));
            }
            Ok(())
        }
        Command::Frontdoor { graph, x, y, latents } => {
            let graph = load_graph(&graph, &latents)?;
            let x = var_set(x.split(','))?;
            let y = var_set(y.split(','))?;
            match frontdoor_expression(&graph, &x, &y, graph.latents()) {
                Some(expr) => println!("{expr}"),
                None => println!("NO FRONTDOOR ADJUSTMENT"),
            }
            Ok(())
        }
        Command::Idc { graph, y, x, z, latents } => {
            let graph = load_graph(&graph, &latents)?;
            let y = var_set(y.split(','))?;
            let x = var_set(x.split(','))?;
            let z = parse_latents(&z)?;
            match idc(&graph, &y, &x, &z, graph.latents()) {
                Ok(expr) => println!("{expr}"),
                Err(hedge) => println!(
                    "NOT IDENTIFIABLE (hedge F={:?}, F'={:?})",
                    hedge.f(),
                    hedge.f_prime()
                ),
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Arguments::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
