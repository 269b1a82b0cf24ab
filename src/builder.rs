use std::cmp::Ordering;
use std::collections::HashMap;

use itertools::Itertools;
use thiserror::Error;

use crate::alphabet::{Alphabet, FINAL_MARKER};
use crate::dawg::{Dawg, Edge, Node, NodeIndex};

/// Longest word the builder will accept.
pub const MAX_WORD_LEN: usize = 48;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("word \"{word}\" is not in ascending order after \"{previous}\"")]
    OutOfOrder { word: String, previous: String },
    #[error("word \"{0}\" exceeds the maximum length of {MAX_WORD_LEN} letters")]
    TooLong(String),
    #[error("word \"{word}\" contains '{letter}', which is not an alphabet letter")]
    UnknownLetter { word: String, letter: char },
}

#[derive(Clone, Debug)]
struct BuildNode {
    is_final: bool,
    edges: Vec<(String, Option<usize>)>,
}

/// Compiles a sorted word list into a [`Dawg`].
///
/// Words must arrive in strict ascending order under the alphabet's
/// collation; adjacent duplicates are counted and skipped. Minimization is
/// incremental: whenever a new word diverges from the previous one, the
/// subtrees that can no longer grow are collapsed bottom-up and
/// deduplicated against previously finished nodes by structural signature.
/// Single-child chains fold into multi-letter edge labels, with a final
/// marker spliced in wherever a folded node ended a word, and childless
/// final nodes are replaced by the shared sink.
pub struct DawgBuilder {
    alphabet: Alphabet,
    nodes: Vec<BuildNode>,
    // frontier[d] is the node reached after d letters of the previous word
    frontier: Vec<Option<usize>>,
    last_word: String,
    last_len: usize,
    // signature -> canonical node, plus the canonicals in first-seen order
    unique: HashMap<String, usize>,
    retained: Vec<usize>,
    word_count: usize,
    duplicate_count: usize,
}

const ROOT: usize = 0;

impl DawgBuilder {
    pub fn new(alphabet: Alphabet) -> Self {
        let mut frontier = vec![None; MAX_WORD_LEN + 1];
        frontier[0] = Some(ROOT);
        Self {
            alphabet,
            nodes: vec![BuildNode {
                is_final: false,
                edges: Vec::new(),
            }],
            frontier,
            last_word: String::new(),
            last_len: 0,
            unique: HashMap::new(),
            retained: Vec::new(),
            word_count: 0,
            duplicate_count: 0,
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Words accepted into the graph so far.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Adjacent duplicates that were skipped.
    pub fn duplicate_count(&self) -> usize {
        self.duplicate_count
    }

    /// Add the next word. Words must be strictly ascending; a repeat of the
    /// previous word is skipped silently.
    pub fn add_word(&mut self, word: &str) -> Result<(), BuildError> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > MAX_WORD_LEN {
            return Err(BuildError::TooLong(word.to_string()));
        }
        if let Some(&letter) = chars.iter().find(|&&c| !self.alphabet.contains(c)) {
            return Err(BuildError::UnknownLetter {
                word: word.to_string(),
                letter,
            });
        }
        match self.alphabet.cmp_words(word, &self.last_word) {
            Ordering::Less => {
                return Err(BuildError::OutOfOrder {
                    word: word.to_string(),
                    previous: self.last_word.clone(),
                });
            }
            Ordering::Equal => {
                self.duplicate_count += 1;
                return Ok(());
            }
            Ordering::Greater => {}
        }

        // collapse everything below the divergence point; those subtrees
        // are complete now that input is sorted
        let div = chars
            .iter()
            .zip(self.last_word.chars())
            .take_while(|&(&a, b)| a == b)
            .count();
        self.collapse_to(div);

        let mut node = self.frontier[div].unwrap_or(ROOT);
        for (i, &ch) in chars.iter().enumerate().skip(div) {
            let fresh = self.nodes.len();
            self.nodes.push(BuildNode {
                is_final: false,
                edges: Vec::new(),
            });
            self.nodes[node].edges.push((ch.to_string(), Some(fresh)));
            node = fresh;
            self.frontier[i + 1] = Some(fresh);
        }
        debug_assert!(div < chars.len());
        self.nodes[node].is_final = true;

        self.last_word = word.to_string();
        self.last_len = chars.len();
        self.word_count += 1;
        Ok(())
    }

    /// Finish the graph: collapse the remaining frontier and the root's own
    /// edges, then renumber the retained nodes into a frozen arena. The
    /// builder cannot be reused afterwards.
    pub fn finish(mut self) -> Dawg {
        self.collapse_to(0);
        self.last_word.clear();
        self.last_len = 0;
        self.collapse_children(ROOT);

        // root keeps index 0; canonical nodes follow in first-seen order
        let mut remap: HashMap<usize, NodeIndex> = HashMap::new();
        remap.insert(ROOT, 0);
        for (i, &ix) in self.retained.iter().enumerate() {
            remap.insert(ix, i + 1);
        }
        let mut nodes = Vec::with_capacity(self.retained.len() + 1);
        for &ix in std::iter::once(&ROOT).chain(self.retained.iter()) {
            let build = &self.nodes[ix];
            nodes.push(Node {
                is_final: build.is_final,
                edges: build
                    .edges
                    .iter()
                    .map(|(label, target)| Edge {
                        label: label.clone(),
                        target: target.map(|t| remap[&t]),
                    })
                    .collect(),
            });
        }
        Dawg::from_parts(self.alphabet, nodes)
    }

    fn collapse_to(&mut self, depth: usize) {
        for d in ((depth + 1)..=self.last_len).rev() {
            if let Some(node) = self.frontier[d].take() {
                self.collapse_children(node);
            }
        }
    }

    fn collapse_children(&mut self, parent: usize) {
        for e in 0..self.nodes[parent].edges.len() {
            if let Some(child) = self.nodes[parent].edges[e].1 {
                self.collapse_edge(parent, e, child);
            }
        }
    }

    fn collapse_edge(&mut self, parent: usize, e: usize, child: usize) {
        // a childless node must be final; its finality is implicit in
        // pointing the parent edge at the sink
        if self.nodes[child].edges.is_empty() {
            debug_assert!(self.nodes[child].is_final);
            self.nodes[parent].edges[e].1 = None;
            return;
        }

        let mut target = child;
        if self.nodes[child].edges.len() == 1 {
            // splice the chain link into the incoming label
            let child_final = self.nodes[child].is_final;
            let (tail, grand) = self.nodes[child].edges[0].clone();
            let edge = &mut self.nodes[parent].edges[e];
            if child_final {
                edge.0.push(FINAL_MARKER);
            }
            edge.0.push_str(&tail);
            edge.1 = grand;
            match grand {
                Some(g) => target = g,
                None => return,
            }
        }

        // structural dedup: children were canonicalized first, so a shallow
        // signature match means the whole subgraphs are equal
        let sig = self.signature(target);
        match self.unique.get(&sig) {
            Some(&canonical) => self.nodes[parent].edges[e].1 = Some(canonical),
            None => {
                self.unique.insert(sig, target);
                self.retained.push(target);
            }
        }
    }

    fn signature(&self, node: usize) -> String {
        let n = &self.nodes[node];
        let edges = n
            .edges
            .iter()
            .map(|(label, target)| format!("{label}:{}", target.map_or(0, |t| t + 1)))
            .join("_");
        if n.is_final {
            format!("{FINAL_MARKER}_{edges}")
        } else {
            edges
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use rand::prelude::*;

    use super::*;
    use crate::dawg::test::SAMPLE_WORDS;

    pub(crate) fn build(words: &[&str]) -> Dawg {
        let mut sorted: Vec<&str> = words.to_vec();
        sorted.sort();
        let mut builder = DawgBuilder::new(Alphabet::english());
        for word in sorted {
            builder.add_word(word).expect("valid test word");
        }
        builder.finish()
    }

    #[test]
    fn builds_the_documented_example() {
        let dawg = build(&SAMPLE_WORDS);
        let mut words = dawg.words();
        words.sort();
        assert_eq!(words, SAMPLE_WORDS);
        // shared suffixes and collapsed chains leave a root plus two nodes
        assert_eq!(dawg.node_count(), 3);
    }

    #[test]
    fn membership_round_trip() {
        let words = ["abbey", "abet", "bet", "beta", "bey"];
        let dawg = build(&words);
        for word in words {
            assert!(dawg.contains(word));
        }
        assert!(!dawg.contains("abbe"));
        assert!(!dawg.contains("betas"));
    }

    #[test]
    fn no_false_positives_on_random_strings() {
        let words = ["car", "cars", "cat", "cats", "cab", "do", "dot", "dote"];
        let dawg = build(&words);
        let alphabet = Alphabet::english();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..2000 {
            let len = rng.gen_range(1..=6);
            let s: String = (0..len)
                .map(|_| alphabet.letter_at(rng.gen_range(0..4)).unwrap())
                .collect();
            assert_eq!(dawg.contains(&s), words.contains(&s.as_str()), "{s}");
        }
    }

    #[test]
    fn graph_invariants_hold() {
        let dawg = build(&SAMPLE_WORDS);
        let nodes = dawg.nodes();
        let mut signatures = Vec::new();
        for (ix, node) in nodes.iter().enumerate() {
            // single-child chains must have been collapsed away
            assert!(ix == 0 || node.edges.len() > 1, "node {ix} is a chain link");
            let mut sig = vec![node.is_final.to_string()];
            for edge in &node.edges {
                // labels never start or end with the final marker
                assert!(!edge.label.starts_with(FINAL_MARKER));
                assert!(!edge.label.ends_with(FINAL_MARKER));
                assert!(!edge.label.is_empty());
                if let Some(t) = edge.target {
                    // trivial final leaves must have been folded into the sink
                    assert!(!nodes[t].edges.is_empty());
                }
                sig.push(format!("{}:{:?}", edge.label, edge.target));
            }
            signatures.push(sig.join("_"));
        }
        let unique: std::collections::HashSet<_> = signatures.iter().collect();
        assert_eq!(unique.len(), signatures.len(), "duplicate node signatures");
    }

    #[test]
    fn rejects_out_of_order_and_unknown_words() {
        let mut builder = DawgBuilder::new(Alphabet::english());
        builder.add_word("beta").unwrap();
        assert_eq!(
            builder.add_word("alpha"),
            Err(BuildError::OutOfOrder {
                word: "alpha".to_string(),
                previous: "beta".to_string(),
            })
        );
        assert!(matches!(
            builder.add_word("éclair"),
            Err(BuildError::UnknownLetter { letter: 'é', .. })
        ));
        let long = "z".repeat(MAX_WORD_LEN + 1);
        assert_eq!(builder.add_word(&long), Err(BuildError::TooLong(long)));
    }

    #[test]
    fn duplicates_are_counted_and_skipped() {
        let mut builder = DawgBuilder::new(Alphabet::english());
        builder.add_word("dog").unwrap();
        builder.add_word("dog").unwrap();
        builder.add_word("dogs").unwrap();
        assert_eq!(builder.word_count(), 2);
        assert_eq!(builder.duplicate_count(), 1);
        let dawg = builder.finish();
        assert_eq!(dawg.words(), ["dog", "dogs"]);
    }

    #[test]
    fn icelandic_collation_orders_input() {
        let mut builder = DawgBuilder::new(Alphabet::icelandic());
        // 'á' follows 'a' in the Icelandic order, so this is ascending
        builder.add_word("af").unwrap();
        builder.add_word("ár").unwrap();
        builder.add_word("bú").unwrap();
        let dawg = builder.finish();
        assert!(dawg.contains("ár"));
        assert!(!dawg.contains("ar"));
    }

    #[test]
    fn single_word_collapses_into_the_root() {
        let dawg = build(&["hello"]);
        assert_eq!(dawg.node_count(), 1);
        assert_eq!(dawg.words(), ["hello"]);
    }
}
