// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("can't write yaml to file {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write node: {node}")]
    Node {
        node: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write yaml output")]
    Output(#[source] io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}
