//! Text representation of a finished graph: one node per line, nodes
//! referenced by line number with the root on line 1 and 0 denoting the
//! sink. A leading `|` marks a final node, `_` separates edges, and each
//! edge is its label, a colon, and the child's line number. Within a
//! label, `|` is the embedded final marker.
//!
//! The graph from the twelve-word example set renders as:
//!
//! ```text
//! do:3_ca:2_ea:2
//! t|s:0_r|s:0
//! |_g|s:0_ne:0
//! ```

use std::io::{self, BufRead, Write};

use itertools::Itertools;
use thiserror::Error;

use crate::alphabet::{Alphabet, FINAL_MARKER};
use crate::dawg::{Dawg, Edge, Node};

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("failed to read graph text")]
    Io(#[from] io::Error),
    #[error("graph text is empty")]
    Empty,
    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
    #[error("line {line}: edge references node {id}, but the graph has {count} nodes")]
    DanglingReference { line: usize, id: usize, count: usize },
}

/// Write the graph in text form, one node per line.
pub fn write_text<W: Write>(dawg: &Dawg, out: &mut W) -> io::Result<()> {
    for node in dawg.nodes() {
        let mut parts = Vec::with_capacity(node.edges.len() + 1);
        if node.is_final {
            parts.push(FINAL_MARKER.to_string());
        }
        for edge in &node.edges {
            let id = edge.target.map_or(0, |t| t + 1);
            parts.push(format!("{}:{id}", edge.label));
        }
        writeln!(out, "{}", parts.iter().join("_"))?;
    }
    Ok(())
}

/// Read a graph previously produced by [`write_text`]. Labels are checked
/// against the alphabet and every edge must reference an existing line.
pub fn read_text<R: BufRead>(alphabet: &Alphabet, input: R) -> Result<Dawg, ReadError> {
    let malformed = |line: usize, reason: &str| ReadError::MalformedLine {
        line,
        reason: reason.to_string(),
    };

    let mut nodes = Vec::new();
    for (ix, line) in input.lines().enumerate() {
        let line = line?;
        let lineno = ix + 1;
        let mut rest = line.as_str();
        let mut is_final = false;
        if let Some(stripped) = rest.strip_prefix(FINAL_MARKER) {
            if lineno == 1 {
                return Err(malformed(lineno, "the root node cannot be final"));
            }
            is_final = true;
            rest = stripped.strip_prefix('_').unwrap_or(stripped);
        }

        let mut edges = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('_') {
                let Some((label, id)) = part.split_once(':') else {
                    return Err(malformed(lineno, &format!("edge \"{part}\" has no child id")));
                };
                if label.is_empty() {
                    return Err(malformed(lineno, "edge has an empty label"));
                }
                if label.starts_with(FINAL_MARKER) || label.ends_with(FINAL_MARKER) {
                    return Err(malformed(
                        lineno,
                        &format!("label \"{label}\" starts or ends with the final marker"),
                    ));
                }
                if let Some(bad) = label
                    .chars()
                    .find(|&c| c != FINAL_MARKER && !alphabet.contains(c))
                {
                    return Err(malformed(
                        lineno,
                        &format!("label \"{label}\" contains '{bad}', which is not a letter"),
                    ));
                }
                let id: usize = id
                    .parse()
                    .map_err(|_| malformed(lineno, &format!("\"{id}\" is not a node id")))?;
                let target = match id {
                    0 => None,
                    id => Some(id - 1),
                };
                edges.push(Edge {
                    label: label.to_string(),
                    target,
                });
            }
        }
        nodes.push(Node { is_final, edges });
    }
    if nodes.is_empty() {
        return Err(ReadError::Empty);
    }

    for (ix, node) in nodes.iter().enumerate() {
        for edge in &node.edges {
            if let Some(t) = edge.target {
                if t >= nodes.len() {
                    return Err(ReadError::DanglingReference {
                        line: ix + 1,
                        id: t + 1,
                        count: nodes.len(),
                    });
                }
            }
        }
    }

    Ok(Dawg::from_parts(alphabet.clone(), nodes))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::builder::test::build;
    use crate::dawg::test::SAMPLE_WORDS;

    const SAMPLE_TEXT: &str = "do:3_ca:2_ea:2\nt|s:0_r|s:0\n|_g|s:0_ne:0\n";

    #[test]
    fn reads_the_documented_example() {
        let dawg = read_text(&Alphabet::english(), SAMPLE_TEXT.as_bytes()).unwrap();
        let mut words = dawg.words();
        words.sort();
        assert_eq!(words, SAMPLE_WORDS);
    }

    #[test]
    fn built_graph_is_equivalent_to_the_documented_text() {
        // node numbering may differ, so compare accepted word sets
        let built = build(&SAMPLE_WORDS);
        let expected = read_text(&Alphabet::english(), SAMPLE_TEXT.as_bytes()).unwrap();
        let mut built_words = built.words();
        let mut expected_words = expected.words();
        built_words.sort();
        expected_words.sort();
        assert_eq!(built_words, expected_words);
        assert_eq!(built.node_count(), expected.node_count());
    }

    #[test]
    fn text_round_trip_preserves_the_graph() {
        let dawg = build(&SAMPLE_WORDS);
        let mut buf = Vec::new();
        write_text(&dawg, &mut buf).unwrap();
        let reloaded = read_text(dawg.alphabet(), buf.as_slice()).unwrap();
        assert_eq!(reloaded.node_count(), dawg.node_count());
        assert_eq!(reloaded.words(), dawg.words());
        // writing the reloaded graph reproduces the same bytes
        let mut again = Vec::new();
        write_text(&reloaded, &mut again).unwrap();
        assert_eq!(buf, again);
    }

    #[test]
    fn rejects_malformed_lines() {
        let al = Alphabet::english();
        assert!(matches!(read_text(&al, "".as_bytes()), Err(ReadError::Empty)));
        assert!(matches!(
            read_text(&al, "ab\n".as_bytes()),
            Err(ReadError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            read_text(&al, ":2\n".as_bytes()),
            Err(ReadError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            read_text(&al, "ab:x\n".as_bytes()),
            Err(ReadError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            read_text(&al, "|ab:0\n".as_bytes()),
            Err(ReadError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            read_text(&al, "a7:0\n".as_bytes()),
            Err(ReadError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            read_text(&al, "ab|:0\n".as_bytes()),
            Err(ReadError::MalformedLine { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_dangling_references() {
        let err = read_text(&Alphabet::english(), "ab:5\n".as_bytes());
        assert!(matches!(
            err,
            Err(ReadError::DanglingReference { line: 1, id: 5, count: 1 })
        ));
    }
}
