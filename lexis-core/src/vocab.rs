//! Character vocabulary with a reserved CTC blank at index 0.
//!
//! The blank symbol is not part of the caller's alphabet — it is the CTC
//! "no new character this frame" token, fixed at index 0 so acoustic models
//! and decoders never have to negotiate its position. Alphabet symbols take
//! indices 1..=len in the order supplied.

use std::collections::HashMap;

use crate::error::{LexisError, Result};

/// The reserved blank symbol. Must not appear in a user-supplied alphabet.
pub const BLANK_SYMBOL: char = '^';

/// Index of the blank symbol. Always 0.
pub const BLANK_INDEX: usize = 0;

/// Immutable bidirectional mapping between symbols and vocabulary indices.
///
/// Construction is deterministic: the same alphabet always yields the same
/// index assignment. Share one instance across decode calls via `Arc`.
#[derive(Debug, Clone)]
pub struct CharacterVocabulary {
    /// index → symbol; slot 0 holds `BLANK_SYMBOL`.
    symbols: Vec<char>,
    /// symbol → index.
    indices: HashMap<char, usize>,
}

impl CharacterVocabulary {
    /// Build a vocabulary from an ordered alphabet of distinct symbols.
    ///
    /// # Errors
    /// `LexisError::InvalidVocabulary` if the alphabet contains duplicates
    /// or the reserved blank symbol.
    pub fn new(alphabet: &[char]) -> Result<Self> {
        let mut symbols = Vec::with_capacity(alphabet.len() + 1);
        let mut indices = HashMap::with_capacity(alphabet.len() + 1);
        symbols.push(BLANK_SYMBOL);
        indices.insert(BLANK_SYMBOL, BLANK_INDEX);

        for &symbol in alphabet {
            if symbol == BLANK_SYMBOL {
                return Err(LexisError::InvalidVocabulary(format!(
                    "alphabet must not contain the reserved blank symbol {BLANK_SYMBOL:?}"
                )));
            }
            if indices.insert(symbol, symbols.len()).is_some() {
                return Err(LexisError::InvalidVocabulary(format!(
                    "duplicate symbol {symbol:?}"
                )));
            }
            symbols.push(symbol);
        }

        Ok(Self { symbols, indices })
    }

    /// Convenience constructor from a string of alphabet characters.
    pub fn from_alphabet_str(alphabet: &str) -> Result<Self> {
        let chars: Vec<char> = alphabet.chars().collect();
        Self::new(&chars)
    }

    /// Total vocabulary size: alphabet length + 1 (blank).
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Index of a symbol.
    ///
    /// # Errors
    /// `LexisError::UnknownSymbol` if the symbol is not in the vocabulary.
    pub fn encode(&self, symbol: char) -> Result<usize> {
        self.indices
            .get(&symbol)
            .copied()
            .ok_or(LexisError::UnknownSymbol { symbol })
    }

    /// Symbol at an index.
    ///
    /// # Errors
    /// `LexisError::IndexOutOfRange` if `index >= size()`.
    pub fn decode(&self, index: usize) -> Result<char> {
        self.symbols
            .get(index)
            .copied()
            .ok_or(LexisError::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    /// All symbols in index order (slot 0 is the blank).
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Index of the blank symbol. Always 0.
    pub fn blank_index(&self) -> usize {
        BLANK_INDEX
    }

    /// The reserved blank symbol.
    pub fn blank_symbol(&self) -> char {
        BLANK_SYMBOL
    }

    /// True if `index` is the blank slot.
    pub fn is_blank(&self, index: usize) -> bool {
        index == BLANK_INDEX
    }
}
