//! CTC-style greedy sequence decoding.
//!
//! The recognizer emits one probability vector per timestep over an alphabet
//! that includes a reserved pad symbol. Greedy decoding picks the argmax
//! symbol per timestep (lowest index on ties), then collapses the sequence by
//! removing pads and merging adjacent repeats that are not separated by a
//! pad. Confidence is the product of every chosen per-timestep maximum,
//! including timesteps that decode to pad or are collapsed away, so a single
//! uncertain step lowers the confidence even when its symbol does not survive
//! collapsing.

use crate::core::errors::{SpotError, SpotResult};
use ndarray::Array2;
use tracing::debug;

/// The reserved pad/blank symbol appended to every alphabet.
pub const PAD_SYMBOL: char = '#';

/// The recognizer's symbol set plus the reserved pad symbol at the end.
#[derive(Debug, Clone)]
pub struct Alphabet {
    symbols: Vec<char>,
    pad_index: usize,
}

impl Alphabet {
    /// Builds an alphabet from the user-supplied symbols, appending the pad
    /// symbol.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`SpotError::Config`] if the symbols already contain
    /// the reserved pad symbol.
    pub fn new(symbols: &str) -> SpotResult<Self> {
        if symbols.contains(PAD_SYMBOL) {
            return Err(SpotError::config(format!(
                "symbol set must not contain the reserved pad symbol '{PAD_SYMBOL}'"
            )));
        }

        let mut symbols: Vec<char> = symbols.chars().collect();
        symbols.push(PAD_SYMBOL);
        let pad_index = symbols.len() - 1;

        Ok(Self { symbols, pad_index })
    }

    /// The alphabet length, pad symbol included. Must equal the width of the
    /// recognizer's probability vectors.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false: the pad symbol is present even for an empty symbol set.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The index of the pad symbol.
    pub fn pad_index(&self) -> usize {
        self.pad_index
    }

    /// The symbol at the given index.
    pub fn symbol(&self, index: usize) -> Option<char> {
        self.symbols.get(index).copied()
    }
}

/// A decoded string with the confidence of the full decoding path.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    /// The collapsed decoded string.
    pub text: String,
    /// Product of the chosen per-timestep maximum probabilities, in [0, 1].
    pub confidence: f64,
}

impl DecodedText {
    /// Applies the rejection threshold: below `min_confidence` the text is
    /// replaced with an empty string while the confidence is kept for
    /// diagnostics. The comparison is inclusive (`>=` keeps the text).
    pub fn thresholded(self, min_confidence: f64) -> Self {
        if self.confidence >= min_confidence {
            self
        } else {
            Self {
                text: String::new(),
                confidence: self.confidence,
            }
        }
    }
}

/// Greedy CTC decoder over a fixed alphabet.
#[derive(Debug, Clone)]
pub struct CtcGreedyDecoder {
    alphabet: Alphabet,
}

impl CtcGreedyDecoder {
    /// Creates a decoder for the given alphabet.
    pub fn new(alphabet: Alphabet) -> Self {
        Self { alphabet }
    }

    /// The decoder's alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Decodes a (timesteps, alphabet) probability sequence into a string and
    /// a confidence score.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`SpotError::Config`] when the probability vector
    /// width does not equal the alphabet length; this indicates a
    /// model/alphabet mismatch, not a per-frame condition.
    pub fn decode(&self, probs: &Array2<f32>) -> SpotResult<DecodedText> {
        if probs.ncols() != self.alphabet.len() {
            return Err(SpotError::config(format!(
                "recognition output width {} does not match alphabet length {}",
                probs.ncols(),
                self.alphabet.len()
            )));
        }

        let pad = self.alphabet.pad_index();
        let mut text = String::new();
        let mut confidence = 1.0f64;
        let mut previous: Option<usize> = None;

        for row in probs.outer_iter() {
            // Argmax with lowest-index tie-breaking: only a strictly greater
            // probability displaces the current best.
            let mut best_index = 0;
            let mut best_prob = f32::NEG_INFINITY;
            for (index, &prob) in row.iter().enumerate() {
                if prob > best_prob {
                    best_prob = prob;
                    best_index = index;
                }
            }

            confidence *= best_prob as f64;

            if best_index != pad && previous != Some(best_index) {
                if let Some(symbol) = self.alphabet.symbol(best_index) {
                    text.push(symbol);
                }
            }
            previous = Some(best_index);
        }

        debug!(
            "ctc decode: {} timesteps -> {} chars, confidence {:.4}",
            probs.nrows(),
            text.chars().count(),
            confidence
        );

        Ok(DecodedText { text, confidence })
    }
}
