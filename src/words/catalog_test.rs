use super::*;

#[test]
fn every_level_is_populated() {
    for level in 1..=MAX_LEVEL {
        assert!(!words_by_level(level).is_empty(), "level {level} empty");
    }
    assert!(words_by_level(0).is_empty());
    assert!(words_by_level(6).is_empty());
}

#[test]
fn cumulative_list_grows_with_level() {
    let mut previous = 0;
    for level in 1..=MAX_LEVEL {
        let count = words_up_to_level(level).len();
        assert!(count > previous, "level {level} did not add words");
        previous = count;
    }
    // Out-of-range maximum clamps to the full catalog.
    assert_eq!(words_up_to_level(9).len(), words_up_to_level(MAX_LEVEL).len());
}

#[test]
fn word_level_finds_first_occurrence() {
    assert_eq!(word_level("the"), Some(1));
    assert_eq!(word_level("THE"), Some(1));
    assert_eq!(word_level("through"), Some(2));
    // "life" appears in levels 2 and 3; first match wins.
    assert_eq!(word_level("life"), Some(2));
    assert_eq!(word_level("paragraph"), Some(5));
    assert_eq!(word_level("xylophone"), None);
}

#[test]
fn syllable_estimate_handles_silent_e() {
    assert_eq!(estimate_syllables("cat"), 1);
    assert_eq!(estimate_syllables("because"), 2);
    assert_eq!(estimate_syllables("table"), 1);
    assert_eq!(estimate_syllables("important"), 3);
    // No vowels still counts as one syllable.
    assert_eq!(estimate_syllables("shh"), 1);
}

#[test]
fn difficulty_is_clamped_to_scale() {
    for word in ["a", "the", "cat", "through", "temperature", "dictionary"] {
        let score = assess_word_difficulty(word);
        assert!((1..=5).contains(&score), "{word} scored {score}");
    }
}

#[test]
fn short_regular_words_score_low() {
    assert_eq!(assess_word_difficulty("cat"), 1);
    assert_eq!(assess_word_difficulty("a"), 1);
}

#[test]
fn irregular_phonics_raise_the_score() {
    // Same length band, but "through" carries the irregular penalty.
    let irregular = assess_word_difficulty("through");
    let regular = assess_word_difficulty("between");
    assert!(irregular > regular, "irregular {irregular} vs regular {regular}");
}
