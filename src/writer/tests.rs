use std::{
    cell::Cell,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

use super::*;
use crate::reader::read_str;

macro_rules! testlist {
    ($($name:ident,)*) => {
    $(
        #[test]
        fn $name() {
            run_test(stringify!($name))
        }
    )*
    }
}

testlist! {
    block_scalars,
    comments,
    document_markers,
    lists,
    multiline_plain,
    quoted_keys,
    simple_map,
    unresolved_vars,
}

fn test_data_dir() -> PathBuf {
    let rootdir = Path::new(env!("CARGO_MANIFEST_DIR"));
    rootdir.join("src/writer/tests/testdata")
}

fn run_test(name: &str) {
    let test_data_dir = test_data_dir();
    let test_file = test_data_dir.join(format!("tests/{}.yml", name));
    let actual_dir = test_data_dir.join("actual");
    let actual_file = actual_dir.join(format!("{}.yml", name));

    let test = fs::read_to_string(test_file).unwrap();

    let tree = read_str(&test).unwrap();
    let actual = write_to_string(&tree).unwrap();

    fs::create_dir_all(actual_dir).unwrap();
    fs::write(actual_file, &actual).unwrap();

    assert_eq!(normalize(&test), normalize(&actual));

    // Written text must still load as yaml.
    saphyr::YamlLoader::load_from_str(&actual).unwrap();
}

fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n")
}

// Expected output using the platform line separator.
fn lines(text: &str) -> String {
    text.replace('\n', LINE_SEPARATOR)
}

fn sample_tree() -> YamlTree {
    YamlTree::new(vec![
        YamlNode::new(0)
            .with_top_comment(["# header", ""])
            .with_key("server")
            .with_value([""])
            .with_child(YamlNode::new(2).with_key("port").with_value([" 8080"]))
            .with_child(
                YamlNode::new(2)
                    .with_key("motd")
                    .with_value([" |", "    hello", "    world"]),
            ),
        YamlNode::new(0)
            .with_key("items")
            .with_value([""])
            .with_child(YamlNode::new(2).with_list_value().with_value([" a"]))
            .with_child(YamlNode::new(2).with_list_value().with_key(" name").with_value([" b"])),
        YamlNode::comment(["# footer"]),
    ])
}

#[test]
fn writes_node_lines_in_order() {
    let actual = write_to_string(&sample_tree()).unwrap();
    let expected = lines(
        "# header\n\nserver:\n  port: 8080\n  motd: |\n    hello\n    world\nitems:\n  - a\n  - name: b\n# footer\n",
    );
    assert_eq!(expected, actual);
}

#[test]
fn empty_tree_writes_nothing() {
    assert_eq!("", write_to_string(&YamlTree::default()).unwrap());
}

#[test]
fn node_without_value_writes_key_only() {
    let tree = YamlTree::new(vec![YamlNode::new(0).with_key("key")]);
    assert_eq!(lines("key:\n"), write_to_string(&tree).unwrap());
}

#[test]
fn node_without_key_writes_value_only() {
    let tree = YamlTree::new(vec![YamlNode::new(4).with_value(["plain"])]);
    assert_eq!(lines("    plain\n"), write_to_string(&tree).unwrap());
}

#[test]
fn comment_only_node_ignores_payload() {
    let mut node = YamlNode::comment(["  # only this"]);
    node.key = Some("hidden".to_string());
    node.value = vec![" value".to_string(), "  more".to_string()];
    node.padding = 6;
    node.list_value = true;
    node.children.push(YamlNode::new(2).with_key("child"));

    let tree = YamlTree::new(vec![node]);
    assert_eq!(lines("  # only this\n"), write_to_string(&tree).unwrap());
}

#[test]
fn padding_applies_to_own_line_only() {
    let node = |padding| {
        YamlNode::new(padding)
            .with_top_comment(["# comment"])
            .with_key("text")
            .with_value([" >", "  folded"])
    };

    let narrow = write_to_string(&YamlTree::new(vec![node(0)])).unwrap();
    let wide = write_to_string(&YamlTree::new(vec![node(3)])).unwrap();

    assert_eq!(lines("# comment\ntext: >\n  folded\n"), narrow);
    assert_eq!(lines("# comment\n   text: >\n  folded\n"), wide);
}

#[test]
fn all_outputs_match() {
    let tree = sample_tree();
    let expected = write_to_string(&tree).unwrap();

    let mut borrowed = Vec::new();
    write_to(&tree, &mut borrowed).unwrap();
    assert_eq!(expected.as_bytes(), &borrowed[..]);

    let sink = RecordingSink::default();
    let written = sink.written.clone();
    write_into(&tree, sink).unwrap();
    assert_eq!(expected.as_bytes(), &written.take()[..]);

    let actual_dir = test_data_dir().join("actual");
    fs::create_dir_all(&actual_dir).unwrap();
    let file = actual_dir.join("all_outputs_match.yml");
    write_file(&tree, &file).unwrap();
    assert_eq!(expected, fs::read_to_string(file).unwrap());
}

#[test]
fn write_to_leaves_sink_open() {
    let tree = YamlTree::new(vec![YamlNode::new(0).with_key("a").with_value([" 1"])]);

    let mut out = Vec::new();
    write_to(&tree, &mut out).unwrap();
    out.write_all(b"tail").unwrap();

    assert_eq!(format!("a: 1{}tail", LINE_SEPARATOR).as_bytes(), &out[..]);
}

#[test]
fn write_into_flushes_and_closes_sink() {
    let sink = RecordingSink::default();
    let flushed = sink.flushed.clone();
    let closed = sink.closed.clone();

    write_into(&sample_tree(), sink).unwrap();

    assert!(flushed.get());
    assert!(closed.get());
}

#[test]
fn write_file_truncates_existing_content() {
    let actual_dir = test_data_dir().join("actual");
    fs::create_dir_all(&actual_dir).unwrap();
    let file = actual_dir.join("write_file_truncates.yml");
    fs::write(&file, "old: content\n".repeat(100)).unwrap();

    let tree = YamlTree::new(vec![YamlNode::new(0).with_key("new").with_value([" content"])]);
    write_file(&tree, &file).unwrap();

    assert_eq!(lines("new: content\n"), fs::read_to_string(file).unwrap());
}

#[test]
fn write_file_reports_open_failure() {
    let file = test_data_dir().join("missing-dir/nested/out.yml");

    let err = write_file(&sample_tree(), &file).unwrap_err();
    match err {
        Error::Open { path, source } => {
            assert_eq!(file, path);
            assert_eq!(io::ErrorKind::NotFound, source.kind());
        }
        err => panic!("unexpected error: {}", err),
    }
}

#[test]
fn node_failure_names_offending_node() {
    let tree = YamlTree::new(vec![YamlNode::new(0)
        .with_key("parent")
        .with_value([""])
        .with_child(
            YamlNode::new(2)
                .with_top_comment(["  # explains broken"])
                .with_key("broken")
                .with_value([" value"]),
        )]);

    let mut sink = FailingSink { trigger: "broken" };
    let err = write_to(&tree, &mut sink).unwrap_err();
    match err {
        Error::Node { node, source } => {
            assert_eq!("'broken' (padding 2) after comment '# explains broken'", node);
            assert_eq!(io::ErrorKind::Other, source.kind());
        }
        err => panic!("unexpected error: {}", err),
    }
}

#[test]
fn flush_failure_is_reported() {
    let mut sink = FailingSink { trigger: "" };
    let err = write_to(&YamlTree::default(), &mut sink).unwrap_err();
    assert!(matches!(err, Error::Output(_)));
}

#[derive(Default)]
struct RecordingSink {
    written: Rc<Cell<Vec<u8>>>,
    flushed: Rc<Cell<bool>>,
    closed: Rc<Cell<bool>>,
}

impl Write for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut written = self.written.take();
        written.extend_from_slice(buf);
        self.written.set(written);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushed.set(true);
        Ok(())
    }
}

impl Drop for RecordingSink {
    fn drop(&mut self) {
        self.closed.set(true);
    }
}

// Fails any write containing the trigger text. An empty trigger fails flushing.
struct FailingSink {
    trigger: &'static str,
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.trigger.is_empty() && String::from_utf8_lossy(buf).contains(self.trigger) {
            return Err(io::Error::new(io::ErrorKind::Other, "sink rejected write"));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.trigger.is_empty() {
            return Err(io::Error::new(io::ErrorKind::Other, "sink rejected flush"));
        }
        Ok(())
    }
}
