// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// In-memory form of a yaml document that keeps the raw text of every line so
// that it can be written back unchanged.

use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct YamlTree {
    pub nodes: Vec<YamlNode>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct YamlNode {
    // Lines found directly above the node, stored with their own indentation.
    pub top_comment: Vec<String>,
    pub key: Option<String>,
    // First item is the inline value (may be empty). The rest are block scalar
    // lines with their indentation baked in.
    pub value: Vec<String>,
    // Spaces prepended to the node's own line only.
    pub padding: usize,
    pub list_value: bool,
    pub comment_only: bool,
    pub children: Vec<YamlNode>,
}

impl YamlTree {
    pub fn new(nodes: Vec<YamlNode>) -> YamlTree {
        YamlTree { nodes }
    }

    /// Total number of nodes, including nested children.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(YamlNode::node_count).sum()
    }
}

impl YamlNode {
    pub fn new(padding: usize) -> YamlNode {
        YamlNode {
            padding,
            ..Default::default()
        }
    }

    /// Node holding nothing but a block of comment lines.
    pub fn comment<I, S>(lines: I) -> YamlNode
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        YamlNode {
            top_comment: lines.into_iter().map(Into::into).collect(),
            comment_only: true,
            ..Default::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> YamlNode {
        self.key = Some(key.into());
        self
    }

    pub fn with_value<I, S>(mut self, lines: I) -> YamlNode
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_list_value(mut self) -> YamlNode {
        self.list_value = true;
        self
    }

    pub fn with_top_comment<I, S>(mut self, lines: I) -> YamlNode
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.top_comment = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_child(mut self, child: YamlNode) -> YamlNode {
        self.children.push(child);
        self
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(YamlNode::node_count).sum::<usize>()
    }
}

// Short description used to point at a node in error messages.
impl fmt::Display for YamlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.comment_only {
            f.write_str("<comment>")?;
        } else {
            if self.list_value {
                f.write_str("- ")?;
            }
            match &self.key {
                Some(key) => write!(f, "'{}'", key.trim())?,
                None => f.write_str("<no key>")?,
            }
        }
        write!(f, " (padding {})", self.padding)?;
        if let Some(comment) = self.top_comment.iter().find(|line| !line.trim().is_empty()) {
            write!(f, " after comment '{}'", comment.trim())?;
        }
        Ok(())
    }
}
