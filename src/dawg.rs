use crate::alphabet::{Alphabet, FINAL_MARKER, WILDCARD};

pub type NodeIndex = usize;

pub(crate) const ROOT: NodeIndex = 0;

/// An outgoing edge. The label is one or more letters with optional embedded
/// final markers; a `None` target is the shared sink, meaning the label
/// completes a word with no continuation.
#[derive(Clone, Debug)]
pub(crate) struct Edge {
    pub(crate) label: String,
    pub(crate) target: Option<NodeIndex>,
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) is_final: bool,
    pub(crate) edges: Vec<Edge>,
}

/// A finalized, read-only word graph.
///
/// Nodes live in an arena indexed by `NodeIndex`, with the root at index 0.
/// The graph never changes after construction, so it can be shared freely
/// across threads; all traversal state lives in the navigator.
#[derive(Clone, Debug)]
pub struct Dawg {
    alphabet: Alphabet,
    nodes: Vec<Node>,
}

/// Visitor contract driven by [`Dawg::navigate`].
///
/// The graph walks edges depth-first. For each edge it first offers the
/// label's first character via `push_edge`; once inside, each character is
/// offered through `accepts` (with `accepting` consulted first), and after
/// every consumed character the graph reports the position reached via
/// `accept` or, for resumable navigators, `accept_resumable`. Final markers
/// embedded in a label are never passed to `accepts`; they only flip the
/// `is_final` flag of the report preceding them.
pub trait Navigator {
    /// When true, the engine calls [`Navigator::accept_resumable`] instead
    /// of [`Navigator::accept`], handing over the position needed to resume.
    fn is_resumable(&self) -> bool {
        false
    }

    /// Offered the first character of an edge label; return true to enter.
    fn push_edge(&mut self, first: char) -> bool;

    /// Asked before each character whether the traversal should continue.
    fn accepting(&self) -> bool;

    /// Consume one label character; return false to abandon the edge.
    fn accepts(&mut self, ch: char) -> bool;

    /// Reports the letters matched so far and whether they form a word.
    fn accept(&mut self, matched: &str, is_final: bool);

    /// Resumable variant of `accept`: `offset` is the byte position of the
    /// next character to consume within `label`, and `target` is the node
    /// reached once the label is exhausted (`None` for the sink).
    fn accept_resumable(
        &mut self,
        label: &str,
        offset: usize,
        target: Option<NodeIndex>,
        matched: &str,
    ) {
        let _ = (label, offset, target, matched);
    }

    /// Called when an entered edge is left; return false to skip the
    /// remaining sibling edges.
    fn pop_edge(&mut self) -> bool;

    /// Called once when the traversal is over.
    fn done(&mut self) {}
}

impl Dawg {
    pub(crate) fn from_parts(alphabet: Alphabet, nodes: Vec<Node>) -> Self {
        Self { alphabet, nodes }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// Total letters stored in edge labels, final markers excluded.
    pub fn edge_char_count(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|n| &n.edges)
            .map(|e| e.label.chars().filter(|&c| c != FINAL_MARKER).count())
            .sum()
    }

    /// Run a full traversal from the root, driven by `nav`.
    pub fn navigate<N: Navigator>(&self, nav: &mut N) {
        let mut matched = String::new();
        self.walk_node(nav, ROOT, &mut matched);
        nav.done();
    }

    /// Continue a traversal from a position previously captured through
    /// [`Navigator::accept_resumable`]: the rest of `label` from `offset`
    /// is re-fed, then the walk proceeds from `target`. `matched` is the
    /// letter path that led to the saved position.
    pub fn resume<N: Navigator>(
        &self,
        nav: &mut N,
        label: &str,
        offset: usize,
        target: Option<NodeIndex>,
        matched: &str,
    ) {
        let mut matched = matched.to_string();
        self.walk_edge(nav, label, offset, target, &mut matched);
        nav.done();
    }

    fn walk_node<N: Navigator>(&self, nav: &mut N, node: NodeIndex, matched: &mut String) {
        for edge in &self.nodes[node].edges {
            let Some(first) = edge.label.chars().next() else {
                continue;
            };
            if nav.push_edge(first) {
                self.walk_edge(nav, &edge.label, 0, edge.target, matched);
                if !nav.pop_edge() {
                    break;
                }
            }
        }
    }

    fn walk_edge<N: Navigator>(
        &self,
        nav: &mut N,
        label: &str,
        start: usize,
        target: Option<NodeIndex>,
        matched: &mut String,
    ) {
        let depth = matched.len();
        let mut j = start;
        while j < label.len() && nav.accepting() {
            let Some(ch) = label[j..].chars().next() else {
                break;
            };
            if !nav.accepts(ch) {
                matched.truncate(depth);
                return;
            }
            matched.push(ch);
            j += ch.len_utf8();
            let mut is_final = false;
            if label[j..].starts_with(FINAL_MARKER) {
                // the marker is a finality signal, not a letter to consume
                is_final = true;
                j += FINAL_MARKER.len_utf8();
            } else if j >= label.len() {
                is_final = target.map_or(true, |t| self.nodes[t].is_final);
            }
            if nav.is_resumable() {
                nav.accept_resumable(label, j, target, matched);
            } else {
                nav.accept(matched, is_final);
            }
        }
        if j >= label.len() {
            if let Some(t) = target {
                if !self.nodes[t].edges.is_empty() && nav.accepting() {
                    self.walk_node(nav, t, matched);
                }
            }
        }
        matched.truncate(depth);
    }

    /// Exact word lookup.
    pub fn contains(&self, word: &str) -> bool {
        let mut nav = FindNavigator::new(word);
        self.navigate(&mut nav);
        nav.found
    }

    /// Every word whose length equals the pattern's and whose letters match
    /// it position by position; the wildcard matches any letter. With
    /// `sorted`, the result comes back in collation order.
    pub fn find_matches(&self, pattern: &str, sorted: bool) -> Vec<String> {
        let mut nav = MatchNavigator::new(pattern);
        self.navigate(&mut nav);
        let mut matches = nav.matches;
        if sorted {
            self.alphabet.sort(&mut matches);
        }
        matches
    }

    /// Expand the graph back into the full word set, in traversal order.
    pub fn words(&self) -> Vec<String> {
        let mut nav = WordCollector::default();
        self.navigate(&mut nav);
        nav.words
    }
}

/// Traces a single word through the graph by exact match.
struct FindNavigator {
    word: Vec<char>,
    index: usize,
    found: bool,
}

impl FindNavigator {
    fn new(word: &str) -> Self {
        Self {
            word: word.chars().collect(),
            index: 0,
            found: false,
        }
    }
}

impl Navigator for FindNavigator {
    fn push_edge(&mut self, first: char) -> bool {
        self.word.get(self.index) == Some(&first)
    }

    fn accepting(&self) -> bool {
        self.index < self.word.len() && !self.found
    }

    fn accepts(&mut self, ch: char) -> bool {
        if self.word.get(self.index) != Some(&ch) {
            return false;
        }
        self.index += 1;
        true
    }

    fn accept(&mut self, _matched: &str, is_final: bool) {
        if is_final && self.index == self.word.len() {
            self.found = true;
        }
    }

    fn pop_edge(&mut self) -> bool {
        // only one edge can match a given first letter
        false
    }
}

/// Collects all words matching a fixed-length pattern with wildcards.
struct MatchNavigator {
    pattern: Vec<char>,
    index: usize,
    stack: Vec<usize>,
    matches: Vec<String>,
}

impl MatchNavigator {
    fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.chars().collect(),
            index: 0,
            stack: Vec::new(),
            matches: Vec::new(),
        }
    }

    fn wants(&self, ch: char) -> bool {
        match self.pattern.get(self.index) {
            Some(&p) => p == WILDCARD || p == ch,
            None => false,
        }
    }
}

impl Navigator for MatchNavigator {
    fn push_edge(&mut self, first: char) -> bool {
        if !self.wants(first) {
            return false;
        }
        self.stack.push(self.index);
        true
    }

    fn accepting(&self) -> bool {
        self.index < self.pattern.len()
    }

    fn accepts(&mut self, ch: char) -> bool {
        if !self.wants(ch) {
            return false;
        }
        self.index += 1;
        true
    }

    fn accept(&mut self, matched: &str, is_final: bool) {
        if is_final && self.index == self.pattern.len() {
            self.matches.push(matched.to_string());
        }
    }

    fn pop_edge(&mut self) -> bool {
        if let Some(ix) = self.stack.pop() {
            self.index = ix;
        }
        true
    }
}

/// Accepts everything, recording each complete word it passes.
#[derive(Default)]
struct WordCollector {
    words: Vec<String>,
}

impl Navigator for WordCollector {
    fn push_edge(&mut self, _first: char) -> bool {
        true
    }

    fn accepting(&self) -> bool {
        true
    }

    fn accepts(&mut self, _ch: char) -> bool {
        true
    }

    fn accept(&mut self, matched: &str, is_final: bool) {
        if is_final {
            self.words.push(matched.to_string());
        }
    }

    fn pop_edge(&mut self) -> bool {
        true
    }
}
