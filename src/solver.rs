//! Move generation after "The World's Fastest Scrabble Program" (1988)
//! by Appel and Jacobson.
//!
//! Moves are found by examining each one-dimensional [`Axis`] of the board
//! in turn, 15 rows and 15 columns for 30 axes in total. Every empty square
//! adjacent to a tile is an anchor. For each anchor, the generator first
//! lays out every possible left part (either permuted from the rack via the
//! word graph, or read off the board), then extends right across the anchor
//! with [`ExtendRightNavigator`], constrained by the cross-check masks, the
//! tiles already on the board and the tiles remaining in the rack.

use log::debug;

use crate::alphabet::WILDCARD;
use crate::board::{Axis, Board, BOARD_SIZE, CENTER};
use crate::dawg::{Dawg, Navigator, NodeIndex};

/// One newly covered square: the tile taken from the rack (the wildcard
/// for a blank) and the letter it stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cover {
    pub row: usize,
    pub col: usize,
    pub tile: char,
    pub letter: char,
}

/// A candidate placement: the full word read along the axis, its starting
/// coordinate, its orientation, and the squares it newly covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub word: String,
    pub row: usize,
    pub col: usize,
    pub horizontal: bool,
    pub covers: Vec<Cover>,
}

/// Remove one tile matching `ch` from the rack, spending the exact letter
/// if present and a wildcard otherwise. Returns the tile actually spent.
fn spend_tile(rack: &mut String, ch: char) -> Option<char> {
    if let Some(pos) = rack.find(ch) {
        rack.remove(pos);
        Some(ch)
    } else if let Some(pos) = rack.find(WILDCARD) {
        rack.remove(pos);
        Some(WILDCARD)
    } else {
        None
    }
}

/// A saved graph position for one left part: the letters laid down, the
/// rack they leave behind, and where to resume the walk.
#[derive(Clone, Debug)]
pub struct LeftPart {
    matched: String,
    rack: String,
    label: String,
    offset: usize,
    target: Option<NodeIndex>,
}

/// Collects every rack permutation that forms a valid path from the root,
/// indexed by length. Run once per (board, rack) before anchors are
/// processed; each entry can later seed an [`ExtendRightNavigator`].
pub struct LeftPermutationNavigator {
    rack: String,
    stack: Vec<(String, usize)>,
    max_left: usize,
    index: usize,
    parts: Vec<Vec<LeftPart>>,
}

impl LeftPermutationNavigator {
    pub fn new(rack: &str) -> Self {
        // one tile must remain for the anchor square itself
        let max_left = rack.chars().count().saturating_sub(1);
        debug_assert!(max_left > 0);
        Self {
            rack: rack.to_string(),
            stack: Vec::new(),
            max_left,
            index: 0,
            parts: vec![Vec::new(); max_left],
        }
    }

    /// The left parts of exactly the requested length.
    pub fn parts_of_len(&self, len: usize) -> &[LeftPart] {
        if len > 0 && len <= self.max_left {
            &self.parts[len - 1]
        } else {
            &[]
        }
    }
}

impl Navigator for LeftPermutationNavigator {
    fn is_resumable(&self) -> bool {
        true
    }

    fn push_edge(&mut self, first: char) -> bool {
        if !self.rack.contains(first) && !self.rack.contains(WILDCARD) {
            return false;
        }
        self.stack.push((self.rack.clone(), self.index));
        true
    }

    fn accepting(&self) -> bool {
        self.index < self.max_left
    }

    fn accepts(&mut self, ch: char) -> bool {
        if !self.rack.contains(ch) && !self.rack.contains(WILDCARD) {
            return false;
        }
        self.index += 1;
        spend_tile(&mut self.rack, ch);
        true
    }

    fn accept(&mut self, _matched: &str, _is_final: bool) {}

    fn accept_resumable(
        &mut self,
        label: &str,
        offset: usize,
        target: Option<NodeIndex>,
        matched: &str,
    ) {
        // every position along the path is a usable left part, word or not
        let len = matched.chars().count();
        self.parts[len - 1].push(LeftPart {
            matched: matched.to_string(),
            rack: self.rack.clone(),
            label: label.to_string(),
            offset,
            target,
        });
    }

    fn pop_edge(&mut self) -> bool {
        if let Some((rack, index)) = self.stack.pop() {
            self.rack = rack;
            self.index = index;
        }
        true
    }
}

/// Traces a left part that already sits on the board and captures the
/// graph position where it ends, so extension can resume from there.
pub struct LeftFindNavigator {
    prefix: Vec<char>,
    pix: usize,
    state: Option<(String, String, usize, Option<NodeIndex>)>,
}

impl LeftFindNavigator {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.chars().collect(),
            pix: 0,
            state: None,
        }
    }

    /// The position where the prefix ended, if the whole prefix was found:
    /// `(matched, label, offset, target)`, ready for [`Dawg::resume`].
    pub fn into_state(self) -> Option<(String, String, usize, Option<NodeIndex>)> {
        self.state
    }
}

impl Navigator for LeftFindNavigator {
    fn is_resumable(&self) -> bool {
        true
    }

    fn push_edge(&mut self, first: char) -> bool {
        self.prefix.get(self.pix) == Some(&first)
    }

    fn accepting(&self) -> bool {
        self.pix < self.prefix.len()
    }

    fn accepts(&mut self, ch: char) -> bool {
        if self.prefix.get(self.pix) != Some(&ch) {
            return false;
        }
        self.pix += 1;
        true
    }

    fn accept(&mut self, _matched: &str, _is_final: bool) {}

    fn accept_resumable(
        &mut self,
        label: &str,
        offset: usize,
        target: Option<NodeIndex>,
        matched: &str,
    ) {
        if self.pix == self.prefix.len() {
            self.state = Some((matched.to_string(), label.to_string(), offset, target));
        }
    }

    fn pop_edge(&mut self) -> bool {
        // the prefix pins a single path through the graph
        false
    }
}

/// How a graph letter fits the current square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Match {
    No,
    BoardTile,
    RackTile,
}

/// Walks right from an anchor square, spending rack tiles on empty squares
/// and matching tiles already on the board, and emits a [`Move`] whenever
/// the graph reports a complete word that ends cleanly.
pub struct ExtendRightNavigator<'a> {
    axis: &'a Axis<'a>,
    rack: String,
    full_rack: String,
    index: usize,
    stack: Vec<(String, usize)>,
    last_check: Option<Match>,
    moves: Vec<Move>,
}

impl<'a> ExtendRightNavigator<'a> {
    pub fn new(axis: &'a Axis<'a>, anchor: usize, rack: String, full_rack: String) -> Self {
        Self {
            axis,
            rack,
            full_rack,
            index: anchor,
            stack: Vec::new(),
            last_check: None,
            moves: Vec::new(),
        }
    }

    pub fn into_moves(self) -> Vec<Move> {
        self.moves
    }

    fn check(&self, ch: char) -> Match {
        if self.index >= BOARD_SIZE {
            return Match::No;
        }
        if !self.axis.is_empty(self.index) {
            // a board tile must be matched exactly
            return if self.axis.letter_at(self.index) == Some(ch) {
                Match::BoardTile
            } else {
                Match::No
            };
        }
        if !self.axis.is_open_for(self.index, ch) {
            return Match::No;
        }
        if self.rack.contains(ch) || self.rack.contains(WILDCARD) {
            Match::RackTile
        } else {
            Match::No
        }
    }
}

impl Navigator for ExtendRightNavigator<'_> {
    fn push_edge(&mut self, first: char) -> bool {
        let check = self.check(first);
        self.last_check = Some(check);
        if check == Match::No {
            return false;
        }
        self.stack.push((self.rack.clone(), self.index));
        true
    }

    fn accepting(&self) -> bool {
        if self.index >= BOARD_SIZE {
            return false;
        }
        !self.rack.is_empty() || !self.axis.is_empty(self.index)
    }

    fn accepts(&mut self, ch: char) -> bool {
        let check = match self.last_check.take() {
            Some(cached) => cached,
            None => self.check(ch),
        };
        if check == Match::No {
            return false;
        }
        self.index += 1;
        if check == Match::RackTile {
            spend_tile(&mut self.rack, ch);
        }
        true
    }

    fn accept(&mut self, matched: &str, is_final: bool) {
        if !is_final {
            return;
        }
        let len = matched.chars().count();
        if len < 2 {
            return;
        }
        if self.index < BOARD_SIZE && !self.axis.is_empty(self.index) {
            // the word must end at the board edge or before an empty square
            return;
        }
        let Some(start) = self.index.checked_sub(len) else {
            return;
        };

        // replay the word against the original rack to record which squares
        // are newly covered and whether each used a letter tile or a blank
        let (row0, col0) = self.axis.coordinate_of(start);
        let (dr, dc) = self.axis.coordinate_step();
        let mut rack = self.full_rack.clone();
        let mut covers = Vec::new();
        let (mut row, mut col) = (row0, col0);
        for (i, ch) in matched.chars().enumerate() {
            if self.axis.is_empty(start + i) {
                if let Some(tile) = spend_tile(&mut rack, ch) {
                    covers.push(Cover {
                        row,
                        col,
                        tile,
                        letter: ch,
                    });
                }
            }
            row += dr;
            col += dc;
        }
        debug_assert_eq!(rack.chars().count(), self.rack.chars().count());

        self.moves.push(Move {
            word: matched.to_string(),
            row: row0,
            col: col0,
            horizontal: self.axis.is_horizontal(),
            covers,
        });
    }

    fn pop_edge(&mut self) -> bool {
        if let Some((rack, index)) = self.stack.pop() {
            self.rack = rack;
            self.index = index;
        }
        // sibling edges must be explored as well
        true
    }
}

/// Generates every legal placement for a (board, rack) pair.
pub struct MoveGenerator<'a> {
    dawg: &'a Dawg,
    board: &'a Board,
    rack: String,
    rack_mask: u32,
    candidates: Vec<Move>,
}

impl<'a> MoveGenerator<'a> {
    pub fn new(dawg: &'a Dawg, board: &'a Board, rack: &str) -> Self {
        let alphabet = dawg.alphabet();
        // with a blank in the rack every letter can be placed somewhere
        let rack_mask = if rack.contains(WILDCARD) {
            alphabet.all_bits_set()
        } else {
            alphabet.bit_pattern(rack)
        };
        Self {
            dawg,
            board,
            rack: rack.to_string(),
            rack_mask,
            candidates: Vec::new(),
        }
    }

    /// Run the generation and hand back all candidate moves.
    pub fn generate(mut self) -> Vec<Move> {
        let dawg = self.dawg;
        let rack_len = self.rack.chars().count();
        if rack_len == 0 {
            return self.candidates;
        }

        // permute rack left parts once; they are shared by all axes
        let lpn = if rack_len > 1 {
            let mut nav = LeftPermutationNavigator::new(&self.rack);
            dawg.navigate(&mut nav);
            Some(nav)
        } else {
            None
        };

        if self.board.is_empty() {
            // first move: a single designated axis through the center, with
            // the center square as the only anchor
            let mut axis = Axis::new(dawg.alphabet(), CENTER, true);
            axis.init_crosschecks(self.board, dawg, self.rack_mask);
            axis.mark_anchor(CENTER);
            self.generate_on_axis(&axis, lpn.as_ref());
        } else {
            for horizontal in [true, false] {
                for ix in 0..BOARD_SIZE {
                    let mut axis = Axis::new(dawg.alphabet(), ix, horizontal);
                    axis.init_crosschecks(self.board, dawg, self.rack_mask);
                    self.generate_on_axis(&axis, lpn.as_ref());
                }
            }
        }
        debug!(
            "rack \"{}\" produced {} candidate moves",
            self.rack,
            self.candidates.len()
        );
        self.candidates
    }

    /// Process the anchors of one axis from left to right.
    fn generate_on_axis(&mut self, axis: &Axis, lpn: Option<&LeftPermutationNavigator>) {
        let rack_len = self.rack.chars().count();
        let mut last_anchor: isize = -1;
        for anchor in 0..BOARD_SIZE {
            if !axis.is_anchor(anchor) {
                continue;
            }
            // consecutive open squares left of the anchor, stopping at the
            // previously processed anchor
            let mut open_left = 0;
            let mut left = anchor as isize;
            while left > 0 && left > last_anchor + 1 && axis.is_open(left as usize - 1) {
                open_left += 1;
                left -= 1;
            }
            let max_left = open_left.min(rack_len - 1);
            self.moves_from_anchor(axis, anchor, max_left, lpn);
            last_anchor = anchor as isize;
        }
    }

    fn moves_from_anchor(
        &mut self,
        axis: &Axis,
        anchor: usize,
        max_left: usize,
        lpn: Option<&LeftPermutationNavigator>,
    ) {
        if max_left == 0 && anchor > 0 && !axis.is_empty(anchor - 1) {
            // a left part already sits on the board: locate its graph
            // position and extend it through the anchor
            let mut start = anchor;
            while start > 0 && !axis.is_empty(start - 1) {
                start -= 1;
            }
            let left_part: String = (start..anchor).filter_map(|ix| axis.letter_at(ix)).collect();
            let mut finder = LeftFindNavigator::new(&left_part);
            self.dawg.navigate(&mut finder);
            if let Some((matched, label, offset, target)) = finder.into_state() {
                let mut nav =
                    ExtendRightNavigator::new(axis, anchor, self.rack.clone(), self.rack.clone());
                self.dawg.resume(&mut nav, &label, offset, target, &matched);
                self.candidates.append(&mut nav.into_moves());
            }
            return;
        }

        // extend with nothing to the left: tiles go on the anchor square
        // itself and to its right
        let mut nav = ExtendRightNavigator::new(axis, anchor, self.rack.clone(), self.rack.clone());
        self.dawg.navigate(&mut nav);
        self.candidates.append(&mut nav.into_moves());

        // then resume every rack-built left part that fits the open space
        if let Some(lpn) = lpn {
            for len in 1..=max_left {
                for part in lpn.parts_of_len(len) {
                    let mut nav = ExtendRightNavigator::new(
                        axis,
                        anchor,
                        part.rack.clone(),
                        self.rack.clone(),
                    );
                    self.dawg
                        .resume(&mut nav, &part.label, part.offset, part.target, &part.matched);
                    self.candidates.append(&mut nav.into_moves());
                }
            }
        }
    }
}
