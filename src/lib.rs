use crate::cli::{Args, Process};
use crate::helpers::fmt_error;
use clap::{Command, CommandFactory, Parser};
use clap_complete::{Generator, generate};
use std::io;
use tracing_subscriber::EnvFilter;

pub mod cleanup;
pub mod cli;
pub mod commands;
pub mod error;
pub mod helpers;
pub mod prompt;
pub mod purge;
pub mod s3;
pub mod storage;

pub fn print_completions<G: Generator>(
    generator: G,
    cmd: &mut Command,
) {
    // get_name returns a str, to_owned = to_string (but restriction::str_to_string)
    generate(generator, cmd, cmd.get_name().to_owned(), &mut io::stdout());
}

/// `RUST_LOG` if set, otherwise warnings only. Logs go to stderr so they don't mix with prompts.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

pub async fn main_rs() -> i32 {
    // AWS_PROFILE, AWS_REGION, credentials etc. may live in a local .env
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("{}", fmt_error(&err.into()));
            return 1;
        }
    }

    init_tracing();

    let args = Args::parse();

    if let Some(generator) = args.generator {
        let mut cmd = Args::command();

        print_completions(generator, &mut cmd);
        return 0;
    }

    let Some(cmd) = args.cmd else {
        // no subcommand: behave like --help
        let _ = Args::command().print_help();
        return 2;
    };

    cmd.process().await.unwrap_or_else(|msg| {
        eprintln!("{}", fmt_error(&msg));
        1
    })
}
