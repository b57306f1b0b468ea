//! Word catalog — leveled FRY sight-word lists and difficulty scoring.
//!
//! DESIGN
//! ======
//! Five static levels ordered by word frequency, Pre-K through Grade 5. The
//! lists are catalog data, kept verbatim from the published FRY groupings
//! (including the occasional repeat across and within levels). Lookup is
//! linear over small constant lists; nothing here allocates except the
//! cumulative `words_up_to_level` helper.

/// Highest catalog level.
pub const MAX_LEVEL: u8 = 5;

/// Level 1 (Pre-K to Grade 1) — the 100 most frequent sight words.
static LEVEL_1: &[&str] = &[
    "the", "of", "and", "a", "to", "in", "is", "you", "that", "it",
    "he", "was", "for", "on", "are", "as", "with", "his", "they", "i",
    "at", "be", "this", "have", "from", "or", "one", "had", "by", "word",
    "but", "not", "what", "all", "were", "we", "when", "your", "can", "said",
    "there", "each", "which", "she", "do", "how", "their", "if", "will", "up",
    "other", "about", "out", "many", "then", "them", "these", "so", "some", "her",
    "would", "make", "like", "into", "him", "has", "two", "more", "very", "what",
    "know", "just", "first", "get", "over", "think", "also", "its", "back", "after",
    "use", "two", "our", "work", "first", "well", "way", "even", "new", "want",
    "because", "any", "these", "give", "day", "most", "us",
];

/// Level 2 (Grades 1-2) — essential words for early reading fluency.
static LEVEL_2: &[&str] = &[
    "through", "much", "before", "line", "right", "too", "means", "old", "any", "same",
    "tell", "boy", "follow", "came", "want", "show", "also", "around", "farm", "three",
    "small", "set", "put", "end", "why", "again", "turn", "here", "off", "went",
    "old", "number", "great", "tell", "men", "say", "small", "every", "found", "still",
    "between", "name", "should", "home", "big", "give", "air", "line", "set", "own",
    "under", "read", "last", "never", "us", "left", "end", "along", "while", "might",
    "next", "sound", "below", "saw", "something", "thought", "both", "few", "those", "always",
    "looked", "show", "large", "often", "together", "asked", "house", "don't", "world", "going",
    "want", "school", "important", "until", "form", "food", "keep", "children", "feet", "land",
    "side", "without", "boy", "once", "animal", "life", "enough", "took", "sometimes", "four",
    "head", "above", "kind", "began", "almost", "live",
];

/// Level 3 (Grades 2-3) — intermediate words for developing readers.
static LEVEL_3: &[&str] = &[
    "example", "begin", "life", "always", "those", "both", "paper", "together", "got", "group",
    "often", "run", "important", "until", "children", "side", "feet", "car", "mile", "night",
    "walk", "white", "sea", "began", "grow", "took", "river", "four", "carry", "state",
    "once", "book", "hear", "stop", "without", "second", "later", "miss", "idea", "enough",
    "eat", "face", "watch", "far", "indian", "really", "almost", "let", "above", "girl",
    "sometimes", "mountain", "cut", "young", "talk", "soon", "list", "song", "being", "leave",
    "family", "it's", "body", "music", "color", "stand", "sun", "questions", "fish", "area",
    "mark", "dog", "horse", "birds", "problem", "complete", "room", "knew", "since", "ever",
    "piece", "told", "usually", "didn't", "friends", "easy", "heard", "order", "red", "door",
    "sure", "become", "top", "ship", "across", "today", "during", "short", "better", "best",
    "however", "low", "hours", "black", "products", "happened", "whole", "measure", "remember", "early",
    "waves", "reached",
];

/// Level 4 (Grades 3-4) — advanced words for fluent readers.
static LEVEL_4: &[&str] = &[
    "listen", "wind", "rock", "space", "covered", "fast", "several", "hold", "himself", "toward",
    "five", "step", "morning", "passed", "vowel", "true", "hundred", "against", "pattern", "numeral",
    "table", "north", "slowly", "money", "map", "farm", "pulled", "draw", "voice", "seen",
    "cold", "cried", "plan", "notice", "south", "sing", "war", "ground", "fall", "king",
    "town", "I'll", "unit", "figure", "certain", "field", "travel", "wood", "fire", "upon",
    "done", "English", "road", "half", "ten", "fly", "gave", "box", "finally", "wait",
    "correct", "oh", "quickly", "person", "became", "shown", "minutes", "strong", "verb", "stars",
    "front", "feel", "fact", "inches", "street", "decided", "contain", "course", "surface", "produce",
    "building", "ocean", "class", "note", "nothing", "rest", "carefully", "scientists", "inside", "wheels",
    "stay", "green", "known", "island", "week", "less", "machine", "base", "ago", "stood",
    "plane", "system", "behind", "ran", "round", "boat", "game", "force", "brought", "heat",
    "nothing", "quite", "broke", "case", "middle", "kill", "son", "lake", "moment", "scale",
    "loud", "spring", "observe", "child", "straight", "consonant", "nation", "dictionary", "milk", "speed",
    "method", "organ", "pay", "age", "section", "dress", "cloud", "surprise", "quiet", "stone",
    "tiny", "climb", "bad", "oil", "blood", "touch", "grew", "cent", "mix", "team",
    "wire", "cost", "lost", "brown", "wear", "garden", "equal", "sent", "choose", "fell",
    "fit", "flow", "fair", "bank", "collect", "save", "control", "decimal", "ear", "else",
    "quite", "broke", "case", "middle", "kill", "son", "lake",
];

/// Level 5 (Grades 4-5) — complex words for advanced readers.
static LEVEL_5: &[&str] = &[
    "general", "energy", "subject", "Europe", "moon", "region", "return", "believe", "dance", "members",
    "picked", "simple", "cells", "paint", "mind", "love", "cause", "rain", "exercise", "eggs",
    "train", "blue", "wish", "drop", "developed", "window", "difference", "distance", "heart", "site",
    "sum", "summer", "wall", "forest", "probably", "legs", "sat", "main", "winter", "wide",
    "written", "length", "reason", "kept", "interest", "arms", "brother", "race", "present", "beautiful",
    "store", "job", "edge", "past", "sign", "record", "finished", "discovered", "wild", "happy",
    "beside", "gone", "sky", "grass", "million", "west", "lay", "weather", "root", "instruments",
    "meet", "third", "months", "paragraph", "raised", "represent", "soft", "whether", "clothes", "flowers",
    "shall", "teacher", "held", "describe", "drive", "cross", "speak", "solve", "appear", "metal",
    "son", "either", "ice", "sleep", "village", "factors", "result", "jumped", "snow", "ride",
    "care", "floor", "hill", "pushed", "baby", "buy", "century", "outside", "everything", "tall",
    "already", "instead", "phrase", "soil", "bed", "copy", "free", "hope", "spring", "case",
    "laughed", "nation", "quite", "type", "themselves", "temperature", "bright", "lead", "everyone", "method",
    "section", "lake", "iron", "within", "dictionary", "hair", "age", "amount", "scale", "pounds",
    "although", "per", "broken", "moment", "tiny", "possible", "gold", "milk", "quiet", "natural",
    "lot", "stone", "act", "build", "middle", "speed", "count", "cat", "someone", "sail",
    "rolled", "bear", "wonder", "smiled", "angle", "fraction", "Africa", "killed", "melody", "bottom",
    "trip", "hole", "poor", "let's", "fight", "surprise", "French", "died", "beat", "exactly",
    "remain", "dress", "iron", "couldn't", "fingers", "row", "least", "catch", "climbed", "wrote",
    "shouted", "continued", "itself", "else", "plains", "gas", "England", "burning", "design", "joined",
];

/// Words whose spelling cannot be sounded out phonetically.
static IRREGULAR_PHONICS: &[&str] = &[
    "the", "of", "was", "one", "two", "said", "have", "what", "were", "you",
    "your", "said", "come", "some", "would", "could", "should", "though", "through",
    "enough", "laugh", "cough", "rough", "tough",
];

// =============================================================================
// LOOKUP
// =============================================================================

/// Words belonging to one level. Empty for levels outside `1..=MAX_LEVEL`.
#[must_use]
pub fn words_by_level(level: u8) -> &'static [&'static str] {
    match level {
        1 => LEVEL_1,
        2 => LEVEL_2,
        3 => LEVEL_3,
        4 => LEVEL_4,
        5 => LEVEL_5,
        _ => &[],
    }
}

/// All words from level 1 through `max_level` inclusive, in level order.
#[must_use]
pub fn words_up_to_level(max_level: u8) -> Vec<&'static str> {
    let mut all = Vec::new();
    for level in 1..=max_level.min(MAX_LEVEL) {
        all.extend_from_slice(words_by_level(level));
    }
    all
}

/// First level containing the word (case-insensitive), else `None`.
#[must_use]
pub fn word_level(word: &str) -> Option<u8> {
    let needle = word.to_lowercase();
    (1..=MAX_LEVEL).find(|&level| words_by_level(level).contains(&needle.as_str()))
}

// =============================================================================
// DIFFICULTY
// =============================================================================

/// Score a word's difficulty on a 1..=5 scale.
///
/// Combines length band, syllable estimate, consonant-cluster count, and an
/// irregular-phonics penalty, then halves, rounds, and clamps.
#[must_use]
pub fn assess_word_difficulty(word: &str) -> u8 {
    let length_factor = match word.chars().count() {
        0..=3 => 1.0,
        4..=5 => 2.0,
        6..=7 => 3.0,
        _ => 4.0,
    };

    #[allow(clippy::cast_precision_loss)]
    let score = length_factor
        + f64::from(estimate_syllables(word))
        + f64::from(consonant_clusters(word)) * 0.5
        + if is_irregular_phonic(word) { 2.0 } else { 0.0 };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        ((score / 2.0).round() as u8).clamp(1, 5)
    }
}

/// Rough syllable estimate: vowel groups, minus one for a trailing silent e.
#[must_use]
pub fn estimate_syllables(word: &str) -> u32 {
    let lower = word.to_lowercase();
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut groups = 0u32;
    let mut in_group = false;
    for c in lower.chars() {
        if is_vowel(c) {
            if !in_group {
                groups += 1;
            }
            in_group = true;
        } else {
            in_group = false;
        }
    }

    if lower.ends_with('e') && groups > 1 {
        groups -= 1;
    }
    groups.max(1)
}

/// Count runs of two or more consecutive consonants.
fn consonant_clusters(word: &str) -> u32 {
    let is_consonant =
        |c: char| c.is_ascii_alphabetic() && !matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u');

    let mut clusters = 0u32;
    let mut run = 0u32;
    for c in word.chars() {
        if is_consonant(c) {
            run += 1;
            if run == 2 {
                clusters += 1;
            }
        } else {
            run = 0;
        }
    }
    clusters
}

fn is_irregular_phonic(word: &str) -> bool {
    let lower = word.to_lowercase();
    IRREGULAR_PHONICS.contains(&lower.as_str())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
