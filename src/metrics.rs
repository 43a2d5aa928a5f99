use crate::highlight::split_words;

/// Floor for elapsed minutes (0.1 s) so WPM never divides by zero
pub const MIN_MINUTES: f64 = 1.0 / 600.0;

/// Count of non-empty words in the user's text
pub fn words_typed(user_text: &str) -> usize {
    split_words(user_text).len()
}

/// Number of positions where the user's word exactly matches the target word
pub fn correct_words(user_text: &str, target_text: &str) -> usize {
    let user_words = split_words(user_text);

    split_words(target_text)
        .iter()
        .enumerate()
        .filter(|(idx, target)| user_words.get(*idx) == Some(*target))
        .count()
}

/// Word-for-word accuracy against the whole target, 0..=100
pub fn accuracy_percent(user_text: &str, target_text: &str) -> u32 {
    let target_len = split_words(target_text).len().max(1);
    let correct = correct_words(user_text, target_text);

    (100.0 * correct as f64 / target_len as f64).round() as u32
}

pub fn words_per_minute(words_typed: usize, elapsed_secs: f64) -> u32 {
    let minutes = (elapsed_secs / 60.0).max(MIN_MINUTES);
    let wpm = (words_typed as f64 / minutes).round();

    if wpm.is_finite() && wpm > 0.0 {
        wpm as u32
    } else {
        0
    }
}

/// Live accuracy and speed, recomputed on every input event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveMetrics {
    pub accuracy_percent: u32,
    pub words_per_minute: u32,
}

impl LiveMetrics {
    pub fn compute(user_text: &str, target_text: &str, elapsed_secs: f64) -> Self {
        Self {
            accuracy_percent: accuracy_percent(user_text, target_text),
            words_per_minute: words_per_minute(words_typed(user_text), elapsed_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_transcription() {
        let target = "The quick brown fox";
        assert_eq!(accuracy_percent(target, target), 100);
        assert_eq!(words_typed(target), 4);
        assert_eq!(words_per_minute(4, 4.0), 60);
    }

    #[test]
    fn test_single_substitution() {
        assert_eq!(correct_words("a x c", "a b c"), 2);
        assert_eq!(accuracy_percent("a x c", "a b c"), 67);
    }

    #[test]
    fn test_missing_positions_never_count() {
        assert_eq!(correct_words("a", "a b c"), 1);
        assert_eq!(accuracy_percent("", "a b c"), 0);
    }

    #[test]
    fn test_extra_words_do_not_raise_accuracy() {
        assert_eq!(accuracy_percent("a b c d e f", "a b c"), 100);
    }

    #[test]
    fn test_accuracy_empty_target() {
        assert_eq!(accuracy_percent("anything", ""), 0);
        assert_eq!(accuracy_percent("", ""), 0);
    }

    #[test]
    fn test_accuracy_is_case_and_punctuation_sensitive() {
        assert_eq!(accuracy_percent("the fox", "The fox."), 0);
    }

    #[test]
    fn test_wpm_uses_floor_at_zero_elapsed() {
        // 1 word in 0.1 s is 600 wpm
        assert_eq!(words_per_minute(1, 0.0), 600);
        assert_eq!(words_per_minute(3, 0.0), 1800);
    }

    #[test]
    fn test_wpm_zero_words() {
        assert_eq!(words_per_minute(0, 0.0), 0);
        assert_eq!(words_per_minute(0, 30.0), 0);
    }

    #[test]
    fn test_wpm_rounds_to_nearest() {
        // 10 words in 7 s = 85.71...
        assert_eq!(words_per_minute(10, 7.0), 86);
    }

    #[test]
    fn test_live_metrics_compute() {
        let m = LiveMetrics::compute("a x c", "a b c", 6.0);
        assert_eq!(m.accuracy_percent, 67);
        assert_eq!(m.words_per_minute, 30);
        assert_eq!(LiveMetrics::default().words_per_minute, 0);
    }
}
