use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::highlight::split_words;
use crate::metrics::{accuracy_percent, words_per_minute, words_typed};

/// Shortest synthesized per-word time
pub const MIN_SYNTHETIC_SECS: f64 = 0.1;
/// Half-width of the jitter applied to synthesized samples
pub const SYNTHETIC_JITTER_SECS: f64 = 0.05;
/// Used when neither capture nor synthesis produced any samples
pub const DEFAULT_WORD_TIMES: [f64; 3] = [0.5, 0.6, 0.4];
pub const DEFAULT_SLOWEST_SECS: f64 = 0.5;
pub const NO_WORD: &str = "N/A";

/// Final result of one session. Built once at the Finished transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub wpm: u32,
    pub accuracy: u32,
    pub time_seconds: u64,
    pub slowest_word: String,
    pub slowest_time: f64,
    /// Never empty
    pub word_times: Vec<f64>,
}

/// Fabricate `words_typed` per-word samples around the aggregate pace
pub fn synthesize_word_times<R: Rng + ?Sized>(
    elapsed_secs: f64,
    words_typed: usize,
    rng: &mut R,
) -> Vec<f64> {
    let avg = (elapsed_secs / words_typed.max(1) as f64).max(MIN_SYNTHETIC_SECS);

    (0..words_typed)
        .map(|_| avg + rng.gen_range(-SYNTHETIC_JITTER_SECS..=SYNTHETIC_JITTER_SECS))
        .collect()
}

/// Target word whose sample at the same index is the largest. Earliest wins
/// ties; indices without a sample are skipped.
pub fn find_slowest_word(target_words: &[&str], word_times: &[f64]) -> Option<(String, f64)> {
    let mut slowest: Option<(usize, f64)> = None;

    for (idx, &time) in word_times.iter().enumerate().take(target_words.len()) {
        let best = slowest.map_or(0.0, |(_, t)| t);
        if time > best {
            slowest = Some((idx, time));
        }
    }

    slowest.map(|(idx, time)| (target_words[idx].to_string(), time))
}

/// Consolidate the final metrics for a submitted transcription
pub fn aggregate<R: Rng + ?Sized>(
    target_text: &str,
    user_text: &str,
    elapsed_secs: f64,
    captured: &[f64],
    rng: &mut R,
) -> SessionStats {
    let typed = words_typed(user_text);
    let wpm = words_per_minute(typed, elapsed_secs);
    let accuracy = accuracy_percent(user_text, target_text);

    let mut word_times = captured.to_vec();
    if word_times.is_empty() {
        word_times = synthesize_word_times(elapsed_secs, typed, rng);
    }

    let target_words = split_words(target_text);
    let (slowest_word, slowest_time) = match find_slowest_word(&target_words, &word_times) {
        Some(found) => found,
        None => (
            target_words
                .first()
                .map_or_else(|| NO_WORD.to_string(), |w| w.to_string()),
            DEFAULT_SLOWEST_SECS,
        ),
    };

    if word_times.is_empty() {
        word_times = DEFAULT_WORD_TIMES.to_vec();
    }

    SessionStats {
        wpm,
        accuracy,
        time_seconds: elapsed_secs.max(0.0).round() as u64,
        slowest_word,
        slowest_time: slowest_time.max(MIN_SYNTHETIC_SECS),
        word_times,
    }
}
