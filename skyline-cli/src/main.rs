//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::{error::Error, process};

use env_logger::Env;
use skyline_cli::CliError;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match skyline_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("skyline: {}", render_chain(&err));
            process::exit(1);
        }
    }
}

fn render_chain(err: &CliError) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        cause = inner.source();
    }
    message
}
