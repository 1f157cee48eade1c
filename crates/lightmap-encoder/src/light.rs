//! Light-language encoder.
//!
//! Every whitespace-separated word of the input is mapped to one of the seven
//! spectral [`Color`]s:
//!
//! 1. keyword tables (spiritual vocabulary first, then technology vocabulary),
//!    matched as substrings of the lower-cased word;
//! 2. otherwise a category default (`spirituality`, `technology`, `science`,
//!    `philosophy`);
//! 3. otherwise `word_length % 7` indexes into the spectrum.
//!
//! The sequence carries per-token wavelengths and frequencies plus three
//! whole-text scores:
//!
//! ```text
//! energy    = min(100, 50 + 10·hits + category_bonus + min(chars / 100, 20))
//! coherence = min(1,   0.5 + 0.2·punctuated + 0.1·multi_sentence + 0.2·mid_length)
//! meaning   = meanings of the three most frequent colors, joined by " → "
//! ```
//!
//! # Example
//!
//! ```rust
//! use lightmap_encoder::{Encoder, LightEncoder};
//! use lightmap_types::Color;
//!
//! let encoder = LightEncoder::new();
//! let memory = encoder.encode("divine truth", "general", "neutral").unwrap();
//! assert_eq!(memory.symbolic_sequence.colors, vec![Color::Violet, Color::Blue]);
//!
//! // Violet = 110, Blue = 100 → 0b110100 = 0x34
//! let code = encoder.compact_code(&memory.symbolic_sequence);
//! assert!(code.ends_with("34"));
//! assert_eq!(code.len(), 66);
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::Utc;
use lightmap_types::{Color, EncodedMemory, MindMapError, SymbolicSequence};
use regex::Regex;
use tracing::debug;
use uuid::Uuid;

use crate::Encoder;

// ─────────────────────────────────────────────────────────────────────────────
// Spectral tables
// ─────────────────────────────────────────────────────────────────────────────

/// Wavelength in nanometres.
pub fn wavelength(color: Color) -> u32 {
    match color {
        Color::Red => 700,
        Color::Orange => 620,
        Color::Yellow => 580,
        Color::Green => 530,
        Color::Blue => 470,
        Color::Indigo => 450,
        Color::Violet => 400,
    }
}

/// Frequency in Hz.
pub fn frequency(color: Color) -> u64 {
    match color {
        Color::Red => 428_000_000_000_000,
        Color::Orange => 484_000_000_000_000,
        Color::Yellow => 517_000_000_000_000,
        Color::Green => 566_000_000_000_000,
        Color::Blue => 638_000_000_000_000,
        Color::Indigo => 667_000_000_000_000,
        Color::Violet => 750_000_000_000_000,
    }
}

/// The interpretation attached to each color.
pub fn meaning(color: Color) -> &'static str {
    match color {
        Color::Red => "Foundation/Security/Survival",
        Color::Orange => "Creativity/Emotion/Flow",
        Color::Yellow => "Power/Intelligence/Will",
        Color::Green => "Love/Healing/Growth",
        Color::Blue => "Truth/Communication/Expression",
        Color::Indigo => "Intuition/Vision/Insight",
        Color::Violet => "Consciousness/Transcendence/Unity",
    }
}

fn bits(color: Color) -> &'static str {
    match color {
        Color::Red => "000",
        Color::Orange => "001",
        Color::Yellow => "010",
        Color::Green => "011",
        Color::Blue => "100",
        Color::Indigo => "101",
        Color::Violet => "110",
    }
}

fn swatch(color: Color) -> &'static str {
    match color {
        Color::Red => "🔴",
        Color::Orange => "🟠",
        Color::Yellow => "🟡",
        Color::Green => "🟢",
        Color::Blue => "🔵",
        Color::Indigo => "🟣",
        Color::Violet => "🟪",
    }
}

/// Keyword tables, checked in order.  The first table whose keywords occur
/// in the word decides its color.
const KEYWORDS: &[(&[&str], Color)] = &[
    // spiritual
    (&["sacred", "divine", "spirit", "soul", "god", "holy", "transcend", "mystical"], Color::Violet),
    (&["wisdom", "insight", "vision", "see", "perceive", "understand"], Color::Indigo),
    (&["truth", "speak", "communicate", "express", "say", "tell"], Color::Blue),
    (&["love", "heal", "heart", "grow", "compassion", "care"], Color::Green),
    (&["power", "will", "think", "mind", "intelligence", "know"], Color::Yellow),
    (&["create", "emotion", "feel", "flow", "passion", "desire"], Color::Orange),
    (&["ground", "foundation", "secure", "safe", "survive", "protect"], Color::Red),
    // technology
    (&["quantum", "superposition", "entangle", "coherence"], Color::Violet),
    (&["neural", "network", "ai", "intelligence"], Color::Indigo),
    (&["data", "information", "knowledge", "learn"], Color::Blue),
    (&["blockchain", "chain", "link", "connect"], Color::Green),
    (&["compute", "process", "calculate", "algorithm"], Color::Yellow),
    (&["energy", "power", "force", "wave"], Color::Orange),
    (&["bitcoin", "crypto", "token", "secure"], Color::Red),
];

static HIGH_ENERGY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)breakthrough|discovery|revolution|advanced|quantum|transcend|enlighten")
        .expect("static high-energy pattern is valid")
});

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]").expect("static sentence pattern is valid"));

// ─────────────────────────────────────────────────────────────────────────────
// Scoring
// ─────────────────────────────────────────────────────────────────────────────

/// Map a single lower-cased word to its color.
pub fn word_to_color(word: &str, category: &str) -> Color {
    for (keywords, color) in KEYWORDS {
        if keywords.iter().any(|k| word.contains(k)) {
            return *color;
        }
    }

    match category {
        "spirituality" => Color::Violet,
        "technology" => Color::Blue,
        "science" => Color::Yellow,
        "philosophy" => Color::Indigo,
        _ => Color::ALL[word.chars().count() % 7],
    }
}

/// Importance of the text in `[0, 100]`.
pub fn energy_level(text: &str, category: &str) -> f64 {
    let mut energy = 50.0;
    energy += HIGH_ENERGY.find_iter(text).count() as f64 * 10.0;
    energy += match category {
        "technology" => 15.0,
        "spirituality" => 20.0,
        "science" => 10.0,
        _ => 0.0,
    };
    energy += (text.chars().count() as f64 / 100.0).min(20.0);
    energy.min(100.0)
}

/// Structural quality of the text in `[0, 1]`.
pub fn coherence(text: &str) -> f64 {
    let mut coherence: f64 = 0.5;
    if SENTENCE_END.is_match(text) {
        coherence += 0.2;
    }
    let sentences = SENTENCE_END
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count();
    if sentences > 1 {
        coherence += 0.1;
    }
    let len = text.chars().count();
    if len > 50 && len < 500 {
        coherence += 0.2;
    }
    coherence.min(1.0)
}

/// Meanings of the (up to) three most frequent colors, most frequent first.
/// Ties keep first-seen order.
pub fn extract_meaning(colors: &[Color]) -> String {
    let mut order: Vec<Color> = Vec::new();
    let mut counts: HashMap<Color, usize> = HashMap::new();
    for &c in colors {
        let n = counts.entry(c).or_insert(0);
        if *n == 0 {
            order.push(c);
        }
        *n += 1;
    }
    // Stable sort keeps first-seen order between equal counts.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order
        .into_iter()
        .take(3)
        .map(meaning)
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Build the symbolic sequence for `text`.
pub fn translate(text: &str, category: &str) -> SymbolicSequence {
    let lowered = text.to_lowercase();
    let colors: Vec<Color> = lowered
        .split_whitespace()
        .map(|w| word_to_color(w, category))
        .collect();

    SymbolicSequence {
        wavelengths: colors.iter().map(|&c| wavelength(c)).collect(),
        frequencies: colors.iter().map(|&c| frequency(c)).collect(),
        meaning: extract_meaning(&colors),
        energy_level: energy_level(text, category),
        coherence: coherence(text),
        colors,
    }
}

/// Render a sequence as `0x` + 64 (or more) lowercase hex digits.
///
/// Each color contributes three bits; the concatenated bit string is read as
/// one big-endian number.
pub fn to_hex(sequence: &SymbolicSequence) -> String {
    let mut bit_string: String = sequence.colors.iter().map(|&c| bits(c)).collect();
    let pad = (4 - bit_string.len() % 4) % 4;
    bit_string.insert_str(0, &"0".repeat(pad));

    let hex: String = bit_string
        .as_bytes()
        .chunks(4)
        .map(|nibble| {
            let v = nibble.iter().fold(0u32, |acc, b| (acc << 1) | u32::from(b - b'0'));
            std::char::from_digit(v, 16).unwrap_or('0')
        })
        .collect();
    let trimmed = hex.trim_start_matches('0');

    format!("0x{trimmed:0>64}")
}

fn bar(filled: usize) -> String {
    let filled = filled.min(10);
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

// ─────────────────────────────────────────────────────────────────────────────
// LightEncoder
// ─────────────────────────────────────────────────────────────────────────────

/// The reference [`Encoder`]: light-language translation of text.
#[derive(Debug, Default, Clone)]
pub struct LightEncoder;

impl LightEncoder {
    pub fn new() -> Self {
        Self
    }

    fn fresh_id() -> String {
        let entropy = Uuid::new_v4().simple().to_string();
        format!("light_{}_{}", Utc::now().timestamp_millis(), &entropy[..9])
    }
}

impl Encoder for LightEncoder {
    fn encode(
        &self,
        text: &str,
        category: &str,
        resonance: &str,
    ) -> Result<EncodedMemory, MindMapError> {
        let symbolic_sequence = translate(text, category);
        debug!(
            tokens = symbolic_sequence.colors.len(),
            energy = symbolic_sequence.energy_level,
            "encoded text into light sequence"
        );
        Ok(EncodedMemory {
            id: Self::fresh_id(),
            original_text: text.to_string(),
            symbolic_sequence,
            emotional_resonance: resonance.to_string(),
            category: category.to_string(),
            timestamp: Utc::now(),
        })
    }

    fn compact_code(&self, sequence: &SymbolicSequence) -> String {
        to_hex(sequence)
    }

    fn display(&self, memory: &EncodedMemory) -> String {
        let seq = &memory.symbolic_sequence;
        let swatches: String = seq.colors.iter().take(20).map(|&c| swatch(c)).collect();
        let energy_blocks = (seq.energy_level / 10.0).floor().max(0.0) as usize;
        let coherence_blocks = (seq.coherence * 10.0).floor().max(0.0) as usize;

        format!(
            "\n🌈 Light Memory: {id}\n{swatches}\n\
             ⚡ Energy: {energy_bar} {energy}%\n\
             🔗 Coherence: {coherence_bar} {coherence:.0}%\n\
             💫 Meaning: {meaning}\n\
             🎭 Resonance: {resonance}\n\
             📁 Category: {category}\n",
            id = memory.id,
            energy_bar = bar(energy_blocks),
            energy = seq.energy_level,
            coherence_bar = bar(coherence_blocks),
            coherence = seq.coherence * 100.0,
            meaning = seq.meaning,
            resonance = memory.emotional_resonance,
            category = memory.category,
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
