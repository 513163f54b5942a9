// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Rewrites yaml configuration files while keeping their comments and layout
// intact, and fills in `#{name}` variables.

pub mod env;
mod error;
pub mod model;
pub mod reader;
pub mod writer;

pub use env::{apply, apply_with, Substitution, SubstitutionObserver, Variables};
pub use error::Error;
pub use model::{YamlNode, YamlTree};
pub use reader::read_str;
pub use writer::{write_file, write_into, write_to, write_to_string, LINE_SEPARATOR};
