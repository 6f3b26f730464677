//! Stateless candidate pattern generators.
//!
//! Each pattern is a pure function from a random source to a candidate
//! string; workers call their pattern independently with a thread-local RNG,
//! so generation needs no coordination.

use clap::ValueEnum;
use rand::Rng;

use crate::types::Candidate;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";

/// A candidate generation pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pattern {
    /// Five digits.
    FiveDigits,
    /// Five lowercase letters.
    FiveLetters,
    /// Four characters mixing letters and digits in one of three layouts.
    FourMixed,
    /// Four lowercase letters.
    FourLetters,
    /// Three digits.
    ThreeDigits,
}

impl Pattern {
    /// Generates one candidate from this pattern.
    pub fn generate(self, rng: &mut impl Rng) -> Candidate {
        let s = match self {
            Pattern::FiveDigits => sample(DIGITS, 5, rng),
            Pattern::FiveLetters => sample(LETTERS, 5, rng),
            Pattern::FourMixed => four_mixed(rng),
            Pattern::FourLetters => sample(LETTERS, 4, rng),
            Pattern::ThreeDigits => sample(DIGITS, 3, rng),
        };
        Candidate(s)
    }
}

fn sample(alphabet: &[u8], len: usize, rng: &mut impl Rng) -> String {
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

fn four_mixed(rng: &mut impl Rng) -> String {
    // Three fixed layouts, L = letter, D = digit.
    let layout = match rng.gen_range(0..3) {
        0 => "LDLL",
        1 => "DLLD",
        _ => "LLLD",
    };
    layout
        .chars()
        .map(|slot| {
            let alphabet = if slot == 'L' { LETTERS } else { DIGITS };
            alphabet[rng.gen_range(0..alphabet.len())] as char
        })
        .collect()
}
