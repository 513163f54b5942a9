// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Reads yaml text into a tree of raw line fragments. Only the layout is
// recognized (indentation, list markers, keys, comments and multiline values);
// values are never interpreted.


use crate::{
    error::Error,
    model::{YamlNode, YamlTree},
};

/// Reads yaml text into a tree that writes back to the same text.
///
/// Nesting is read recursively, one level per indentation step, so documents
/// nested thousands of levels deep can exhaust the stack. Writing the tree
/// recurses the same way.
pub fn read_str(text: &str) -> Result<YamlTree, Error> {
    let lines: Vec<&str> = text.lines().collect();
    let mut run = ReaderRun { lines, pos: 0 };
    let nodes = run.read_nodes(None)?;

    let tree = YamlTree::new(nodes);
    tracing::trace!(nodes = tree.node_count(), "Yaml read");
    Ok(tree)
}

#[derive(Clone, Copy)]
struct Parent {
    padding: usize,
    // Allows `key:` to be followed by `- item` lines at the same indentation.
    list_at_same_indent: bool,
}

struct ReaderRun<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl ReaderRun<'_> {
    fn read_nodes(&mut self, parent: Option<Parent>) -> Result<Vec<YamlNode>, Error> {
        let mut nodes = Vec::new();
        loop {
            let start = self.pos;
            while self.pos < self.lines.len() && is_comment_line(self.lines[self.pos]) {
                self.pos += 1;
            }

            if self.pos == self.lines.len() {
                // Trailing comments belong to the document end.
                if parent.is_some() {
                    self.pos = start;
                } else if start < self.pos {
                    nodes.push(YamlNode::comment(self.lines[start..self.pos].iter().copied()));
                }
                break;
            }

            let line = self.lines[self.pos];
            if let Some(parent) = parent {
                let indent = indent_of(line);
                let nested = indent > parent.padding
                    || (parent.list_at_same_indent && indent == parent.padding && is_list_item(&line[indent..]));
                if !nested {
                    // Comments go to the next node of an outer level.
                    self.pos = start;
                    break;
                }
            }

            let comments = self.lines[start..self.pos].iter().map(|line| line.to_string()).collect();
            let node = self.read_node(comments)?;
            nodes.push(node);
        }
        Ok(nodes)
    }

    fn read_node(&mut self, top_comment: Vec<String>) -> Result<YamlNode, Error> {
        let line_num = self.pos + 1;
        let line = self.lines[self.pos];
        self.pos += 1;

        let padding = indent_of(line);
        let mut rest = &line[padding..];
        if rest.starts_with('\t') {
            return Err(Error::Parse {
                line: line_num,
                message: "tabs are not allowed for indentation".to_string(),
            });
        }

        let list_value = is_list_item(rest);
        if list_value {
            rest = &rest[1..];
        }

        let (key, inline) = match find_key_separator(rest) {
            Some(idx) => (Some(rest[..idx].to_string()), &rest[idx + 1..]),
            None => (None, rest),
        };

        // Column that multiline value lines must be indented past.
        let value_column = match (&key, list_value) {
            (Some(key), true) => padding + 1 + indent_of(key),
            _ => padding,
        };

        let mut value = vec![inline.to_string()];
        let inline = strip_comment(inline).trim();
        let block = is_block_header(inline);
        if block || !opens_collection(inline) {
            self.read_value_lines(value_column, block, &mut value);
        }

        let parent = Parent {
            padding,
            list_at_same_indent: key.is_some() && !list_value && opens_collection(inline),
        };
        let children = self.read_nodes(Some(parent))?;

        let node = YamlNode {
            top_comment,
            key,
            value,
            padding,
            list_value,
            comment_only: false,
            children,
        };
        Ok(node)
    }

    fn read_value_lines(&mut self, column: usize, block: bool, value: &mut Vec<String>) {
        let is_value_line = |line: &str| indent_of(line) > column && (block || !is_comment_line(line));

        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            if line.trim().is_empty() {
                // Empty lines are kept inside the value only when it continues after them.
                let next = self.lines[self.pos..].iter().position(|line| !line.trim().is_empty());
                match next {
                    Some(offset) if is_value_line(self.lines[self.pos + offset]) => {
                        let end = self.pos + offset;
                        value.extend(self.lines[self.pos..end].iter().map(|line| line.to_string()));
                        self.pos = end;
                    }
                    _ => break,
                }
            } else if is_value_line(line) {
                value.push(line.to_string());
                self.pos += 1;
            } else {
                break;
            }
        }
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || line.starts_with('%')
        || is_document_marker(line, "---")
        || is_document_marker(line, "...")
}

fn is_document_marker(line: &str, marker: &str) -> bool {
    match line.strip_prefix(marker) {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t']),
        None => false,
    }
}

fn is_list_item(rest: &str) -> bool {
    rest == "-" || rest.starts_with("- ")
}

fn is_block_header(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some('|' | '>')) && chars.all(|c| c.is_ascii_digit() || c == '+' || c == '-')
}

// Empty values, possibly carrying an anchor or a tag, are followed by nested nodes.
fn opens_collection(value: &str) -> bool {
    value.split_whitespace().all(|token| token.starts_with('&') || token.starts_with('!'))
}

// Position of the `:` ending a mapping key, if the line has one.
fn find_key_separator(rest: &str) -> Option<usize> {
    let content_start = rest.len() - rest.trim_start().len();
    let content = &rest[content_start..];

    let scan_from = match content.chars().next()? {
        '{' | '[' | '#' => return None,
        quote @ ('\'' | '"') => content_start + 1 + closing_quote(&content[1..], quote)? + 1,
        _ => content_start,
    };

    let bytes = rest.as_bytes();
    for (idx, c) in rest[scan_from..].char_indices() {
        let idx = scan_from + idx;
        match c {
            '#' if idx > 0 && bytes[idx - 1].is_ascii_whitespace() => return None,
            ':' if bytes.get(idx + 1).map_or(true, |next| next.is_ascii_whitespace()) => return Some(idx),
            _ => {}
        }
    }
    None
}

fn closing_quote(text: &str, quote: char) -> Option<usize> {
    let mut chars = text.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' if quote == '"' => {
                chars.next();
            }
            c if c == quote => {
                // '' is an escaped quote inside single quotes.
                if quote == '\'' && text[idx + 1..].starts_with('\'') {
                    chars.next();
                } else {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn strip_comment(value: &str) -> &str {
    let content_start = value.len() - value.trim_start().len();
    let content = &value[content_start..];
    if content.starts_with('#') {
        return "";
    }

    let scan_from = match content.chars().next() {
        Some(quote @ ('\'' | '"')) => match closing_quote(&content[1..], quote) {
            Some(end) => content_start + end + 2,
            None => return value,
        },
        _ => content_start,
    };

    let bytes = value.as_bytes();
    for (idx, c) in value[scan_from..].char_indices() {
        let idx = scan_from + idx;
        if c == '#' && idx > 0 && bytes[idx - 1].is_ascii_whitespace() {
            return &value[..idx];
        }
    }
    value
}
