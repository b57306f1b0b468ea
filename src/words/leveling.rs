//! Adaptive leveling — level estimation, word-set synthesis, recommendations.
//!
//! DESIGN
//! ======
//! Pure functions over assessment history. Nothing here touches the network
//! or the clock: callers pass history in and, where randomness or time is
//! involved, pass the RNG and the current timestamp so tests can pin both.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::profile::{AssessmentRecord, StudentProgress};
use crate::protocol::TestType;
use crate::words::catalog::{MAX_LEVEL, word_level, words_by_level, words_up_to_level};

const SEVEN_DAYS_MS: i64 = 7 * 24 * 60 * 60 * 1000;

// =============================================================================
// LEVEL ESTIMATION
// =============================================================================

/// How much history backs a level estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Recommended starting level for a student, with backing confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelEstimate {
    pub recommended_level: u8,
    pub confidence: Confidence,
}

/// Estimate the level a student should be tested at.
///
/// Walks levels in order and promotes past any level answered with at least
/// 80% accuracy over at least five responses. A level under 60% accuracy
/// stops the walk. Thin history caps the confidence regardless of accuracy.
#[must_use]
pub fn determine_student_level(history: &[AssessmentRecord]) -> LevelEstimate {
    if history.is_empty() {
        return LevelEstimate { recommended_level: 1, confidence: Confidence::Low };
    }

    // correct/total response counts per catalog level
    let mut by_level: [Option<(u32, u32)>; MAX_LEVEL as usize] = [None; MAX_LEVEL as usize];
    for assessment in history {
        let Some(level) = word_level(&assessment.word_tested) else {
            continue;
        };
        let correct = u32::try_from(assessment.responses.iter().filter(|r| r.is_correct).count())
            .unwrap_or(u32::MAX);
        let total = u32::try_from(assessment.responses.len().max(1)).unwrap_or(u32::MAX);
        let slot = &mut by_level[usize::from(level) - 1];
        let (c, t) = slot.get_or_insert((0, 0));
        *c += correct;
        *t += total;
    }

    let mut recommended_level = 1;
    let mut confidence = Confidence::High;
    for level in 1..=MAX_LEVEL {
        let Some((correct, total)) = by_level[usize::from(level) - 1] else {
            continue;
        };
        let accuracy = f64::from(correct) / f64::from(total);
        if accuracy >= 0.8 && total >= 5 {
            recommended_level = MAX_LEVEL.min(level + 1);
        } else if accuracy < 0.6 {
            confidence = Confidence::Medium;
            break;
        }
    }

    if history.len() < 10 {
        confidence = Confidence::Low;
    } else if history.len() < 20 {
        confidence = Confidence::Medium;
    }

    LevelEstimate { recommended_level, confidence }
}

// =============================================================================
// WORD SET SYNTHESIS
// =============================================================================

/// Knobs for [`generate_test_word_set`].
#[derive(Debug, Clone, Copy)]
pub struct WordSetOptions {
    /// Mix in words from completed lower levels.
    pub include_review: bool,
    /// Fraction of `count` drawn as review words.
    pub review_percentage: f64,
    /// Replace the tail of the set with next-level challenge words.
    pub difficulty_variation: bool,
}

impl Default for WordSetOptions {
    fn default() -> Self {
        Self { include_review: true, review_percentage: 0.3, difficulty_variation: true }
    }
}

/// Build a test word set for one level: current-level words plus a review
/// draw from lower levels, shuffled and truncated to `count`, with the last
/// tenth swapped for next-level challenge words when one exists.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn generate_test_word_set(
    level: u8,
    count: usize,
    options: WordSetOptions,
    rng: &mut impl Rng,
) -> Vec<String> {
    let mut available: Vec<&'static str> = words_by_level(level).to_vec();

    if options.include_review && level > 1 {
        let review_count = (count as f64 * options.review_percentage).floor() as usize;
        let mut review = words_up_to_level(level - 1);
        review.shuffle(rng);
        review.truncate(review_count);
        available.extend(review);
    }

    available.shuffle(rng);
    available.truncate(count);
    let mut selected: Vec<String> = available.into_iter().map(str::to_string).collect();

    if options.difficulty_variation && level < MAX_LEVEL {
        let challenge_count = (count as f64 * 0.1).floor() as usize;
        let mut challenge = words_by_level(level + 1).to_vec();
        if challenge_count > 0 && !challenge.is_empty() {
            challenge.shuffle(rng);
            challenge.truncate(challenge_count);
            let keep = selected.len().saturating_sub(challenge_count);
            selected.truncate(keep);
            selected.extend(challenge.into_iter().map(str::to_string));
        }
    }

    selected
}

// =============================================================================
// PRACTICE RECOMMENDATIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationKind {
    Start,
    Assessment,
    Review,
    Advance,
    Skill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
}

/// One actionable practice suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub message: String,
    pub action: String,
}

/// Derive practice recommendations from a student's history.
///
/// Only assessments completed within the last seven days of `now_ms` count.
/// An empty history yields the single "start here" suggestion.
#[must_use]
pub fn practice_recommendations(progress: &StudentProgress, now_ms: i64) -> Vec<Recommendation> {
    if progress.assessments.is_empty() {
        return vec![Recommendation {
            kind: RecommendationKind::Start,
            priority: Priority::High,
            message: "Begin with Level 1 basic sight words".into(),
            action: "Start assessment to determine reading level".into(),
        }];
    }

    let cutoff = now_ms - SEVEN_DAYS_MS;
    let recent: Vec<&AssessmentRecord> =
        progress.assessments.iter().filter(|a| a.date_completed > cutoff).collect();

    let mut recommendations = Vec::new();

    if recent.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Assessment,
            priority: Priority::Medium,
            message: "No recent assessments found".into(),
            action: "Schedule a new assessment to track progress".into(),
        });
    }

    let overall = overall_accuracy(&recent);
    if overall < 0.6 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Review,
            priority: Priority::High,
            message: "Accuracy below 60% - needs additional practice".into(),
            action: "Focus on reviewing previously learned words".into(),
        });
    } else if overall > 0.9 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Advance,
            priority: Priority::Medium,
            message: "High accuracy achieved - ready for next level".into(),
            action: "Introduce words from the next difficulty level".into(),
        });
    }

    for test_type in TestType::ALL {
        let typed: Vec<&AssessmentRecord> =
            recent.iter().copied().filter(|a| a.test_type == test_type).collect();
        let accuracy = overall_accuracy(&typed);
        if accuracy < 0.7 {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Skill,
                priority: Priority::Medium,
                message: format!(
                    "{test_type} skills need improvement ({:.1}% accuracy)",
                    accuracy * 100.0
                ),
                action: format!("Focus on {test_type} practice exercises"),
            });
        }
    }

    recommendations
}

/// Correct responses over total responses; 0.0 for empty input.
fn overall_accuracy(assessments: &[&AssessmentRecord]) -> f64 {
    let total: usize = assessments.iter().map(|a| a.responses.len()).sum();
    if total == 0 {
        return 0.0;
    }
    let correct: usize = assessments
        .iter()
        .map(|a| a.responses.iter().filter(|r| r.is_correct).count())
        .sum();
    #[allow(clippy::cast_precision_loss)]
    {
        correct as f64 / total as f64
    }
}

#[cfg(test)]
#[path = "leveling_test.rs"]
mod tests;
