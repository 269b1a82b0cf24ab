//! Core engine for a 15×15 crossword-tile board game: a DAWG compiler
//! for word lists and an Appel–Jacobson move generator on top of it.
//!
//! The [`DawgBuilder`] turns a sorted word stream into a compressed
//! [`Dawg`] with collapsed edge labels and shared suffixes; the
//! [`MoveGenerator`] walks that graph to enumerate every legal placement
//! of rack tiles on a partially filled [`Board`].

pub mod alphabet;
pub mod board;
pub mod builder;
pub mod dawg;
pub mod solver;
pub mod text;
pub mod wordlist;

pub use alphabet::{Alphabet, AlphabetError, FINAL_MARKER, WILDCARD};
pub use board::{Axis, Board, Square, BOARD_SIZE, CENTER};
pub use builder::{BuildError, DawgBuilder, MAX_WORD_LEN};
pub use dawg::{Dawg, Navigator, NodeIndex};
pub use solver::{
    Cover, ExtendRightNavigator, LeftFindNavigator, LeftPart, LeftPermutationNavigator, Move,
    MoveGenerator,
};
pub use text::{read_text, write_text, ReadError};
pub use wordlist::{feed, merge_words, read_words, WordListStats};
