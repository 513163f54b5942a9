// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

mod variable_arg;

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Error};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yaml_updater::{env, read_str, write_file, write_into, Substitution};

use variable_arg::{collect_variables, VariableArg};

fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "yaml_updater=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let matches = command().get_matches();
    run(&matches)
}

fn command() -> Command {
    Command::new("yaml-updater")
        .about("Replaces variables in a yaml file while keeping its comments and formatting")
        .arg(
            Arg::new("input")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Yaml file to process"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(value_parser!(PathBuf))
                .help("Write the result into this file instead of stdout"),
        )
        .arg(
            Arg::new("var")
                .long("var")
                .action(ArgAction::Append)
                .value_name("NAME=VALUE")
                .help("Variable value; 'NAME' or 'NAME=' replaces with empty"),
        )
        .arg(
            Arg::new("var-file")
                .long("var-file")
                .action(ArgAction::Append)
                .value_name("NAME=PATH")
                .help("Variable value read from a file"),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .default_value(env::DEFAULT_PREFIX)
                .help("Variable prefix"),
        )
        .arg(
            Arg::new("postfix")
                .long("postfix")
                .default_value(env::DEFAULT_POSTFIX)
                .help("Variable postfix"),
        )
        .arg(
            Arg::new("roundtrip")
                .long("roundtrip")
                .action(ArgAction::SetTrue)
                .help("Pass the result through the comments preserving reader and writer"),
        )
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let mut args = Vec::new();
    for (value, index) in indexed_values(matches, "var") {
        args.push(VariableArg::parse_literal(index, value)?);
    }
    for (value, index) in indexed_values(matches, "var-file") {
        args.push(VariableArg::parse_file(index, value)?);
    }
    let variables = collect_variables(args)?;

    let input = matches.get_one::<PathBuf>("input").context("input file is required")?;
    let text = fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;

    let prefix = matches.get_one::<String>("prefix").context("prefix is required")?;
    let postfix = matches.get_one::<String>("postfix").context("postfix is required")?;
    let substitution = Substitution::with_syntax(prefix.as_str(), postfix.as_str());
    let text = substitution.apply_str(&text, &variables);

    let output = matches.get_one::<PathBuf>("output");
    if matches.get_flag("roundtrip") {
        let tree = read_str(&text).with_context(|| format!("failed to read yaml from {}", input.display()))?;
        match output {
            Some(path) => write_file(&tree, path)?,
            None => write_into(&tree, io::stdout().lock())?,
        }
    } else {
        match output {
            Some(path) => fs::write(path, text.as_bytes()).with_context(|| format!("failed to write {}", path.display()))?,
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
            }
        }
    }
    Ok(())
}

fn indexed_values<'a>(matches: &'a ArgMatches, id: &str) -> Vec<(&'a str, usize)> {
    match (matches.get_many::<String>(id), matches.indices_of(id)) {
        (Some(values), Some(indices)) => values.map(String::as_str).zip(indices).collect(),
        _ => Vec::new(),
    }
}
