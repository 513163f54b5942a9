// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{cmp::Ordering, fs, path::PathBuf};

use anyhow::{anyhow, Context, Error};
use yaml_updater::Variables;

pub enum VariableValue {
    // `None` for `NAME` or `NAME=` without a value.
    Literal(Option<String>),
    File(PathBuf),
}

// Used to sort args from clap, so that variables apply in command line order.
pub struct VariableArg {
    pub index: usize,
    pub name: String,
    pub value: VariableValue,
}

impl VariableArg {
    pub fn parse_literal(index: usize, arg: &str) -> Result<VariableArg, Error> {
        let (name, value) = split_arg(arg)?;
        let value = value.filter(|value| !value.is_empty()).map(str::to_string);
        Ok(VariableArg {
            index,
            name: name.to_string(),
            value: VariableValue::Literal(value),
        })
    }

    pub fn parse_file(index: usize, arg: &str) -> Result<VariableArg, Error> {
        let (name, path) = split_arg(arg)?;
        let path = path.ok_or_else(|| anyhow!("variable file for '{}' must be given as NAME=PATH", name))?;
        Ok(VariableArg {
            index,
            name: name.to_string(),
            value: VariableValue::File(PathBuf::from(path)),
        })
    }
}

fn split_arg(arg: &str) -> Result<(&str, Option<&str>), Error> {
    let (name, value) = match arg.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (arg, None),
    };
    if name.is_empty() {
        return Err(anyhow!("variable name is missing in '{}'", arg));
    }
    Ok((name, value))
}

pub fn collect_variables(mut args: Vec<VariableArg>) -> Result<Variables, Error> {
    args.sort();

    let mut env = Variables::new();
    for arg in args {
        let value = match arg.value {
            VariableValue::Literal(value) => value,
            VariableValue::File(path) => {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read variable '{}' from {}", arg.name, path.display()))?;
                Some(content.trim_end_matches(['\r', '\n']).to_string())
            }
        };
        // Later arguments override earlier ones but keep the first position.
        match env.get_mut(&arg.name) {
            Some(existing) => *existing = value,
            None => {
                env.insert(arg.name, value);
            }
        }
    }
    Ok(env)
}

impl PartialEq for VariableArg {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl PartialOrd for VariableArg {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VariableArg {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl Eq for VariableArg {}
