// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Writes a yaml tree back to text, line by line, exactly as it was stored.

#[cfg(test)]
mod tests;

use std::{
    fs::File,
    io::{self, Write},
    path::Path,
};

use crate::{
    error::Error,
    model::{YamlNode, YamlTree},
};

pub const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

pub fn write_to_string(tree: &YamlTree) -> Result<String, Error> {
    let mut out = Vec::new();
    write_to(tree, &mut out)?;

    // Every byte comes from a &str, so the buffer is valid utf-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Writes the tree into a sink owned by the caller. The sink is flushed but
/// stays open.
pub fn write_to<W: Write + ?Sized>(tree: &YamlTree, out: &mut W) -> Result<(), Error> {
    tracing::trace!(nodes = tree.node_count(), "Writing yaml tree");
    for node in &tree.nodes {
        write_node(node, out)?;
    }
    out.flush().map_err(Error::Output)
}

/// Writes the tree and closes the sink once done.
pub fn write_into<W: Write>(tree: &YamlTree, mut out: W) -> Result<(), Error> {
    write_to(tree, &mut out)?;
    drop(out);
    Ok(())
}

/// Creates (or truncates) the file and writes the tree into it.
///
/// The tree is rendered in memory first, so a node failure leaves the file
/// untouched. A failed write after the file was opened may leave it
/// truncated.
pub fn write_file(tree: &YamlTree, path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();

    let mut rendered = Vec::new();
    write_to(tree, &mut rendered)?;

    let mut file = File::create(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(&rendered).map_err(Error::Output)?;
    file.flush().map_err(Error::Output)?;

    tracing::debug!(path = %path.display(), "Yaml written");
    Ok(())
}

fn write_node<W: Write + ?Sized>(node: &YamlNode, out: &mut W) -> Result<(), Error> {
    write_node_lines(node, out).map_err(|source| Error::Node {
        node: node.to_string(),
        source,
    })?;
    if node.comment_only {
        return Ok(());
    }

    for child in &node.children {
        write_node(child, out)?;
    }
    Ok(())
}

fn write_node_lines<W: Write + ?Sized>(node: &YamlNode, out: &mut W) -> io::Result<()> {
    for comment in &node.top_comment {
        write_line(0, comment, out)?;
    }
    if node.comment_only {
        return Ok(());
    }

    let mut line = String::new();
    if node.list_value {
        line.push('-');
    }
    if let Some(key) = &node.key {
        line.push_str(key);
        line.push(':');
    }
    if let Some(value) = node.value.first() {
        line.push_str(value);
    }
    write_line(node.padding, &line, out)?;

    // Multiline value lines keep their own indentation.
    for value in node.value.iter().skip(1) {
        write_line(0, value, out)?;
    }
    Ok(())
}

fn write_line<W: Write + ?Sized>(padding: usize, line: &str, out: &mut W) -> io::Result<()> {
    write!(out, "{:padding$}{}{}", "", line, LINE_SEPARATOR)
}
