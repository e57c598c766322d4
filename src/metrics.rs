use itertools::{EitherOrBoth, Itertools};

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Derived statistics for one snapshot of typed text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Metrics {
    pub correct_chars: usize,
    pub total_chars: usize,
    pub words_per_minute: u32,
    pub accuracy_percent: u32,
}

impl Default for Metrics {
    /// Nothing typed yet: no speed, and no errors observed
    fn default() -> Self {
        Self {
            correct_chars: 0,
            total_chars: 0,
            words_per_minute: 0,
            accuracy_percent: 100,
        }
    }
}

/// How a single reference character should be highlighted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Correct,
    Incorrect,
    Cursor,
    Pending,
}

/// Recompute every metric from scratch.
///
/// Comparison is by absolute character index, so an insertion or deletion in
/// the middle of the typed text shifts everything after it out of alignment.
/// WPM is zero until something has been typed after a recorded start, and
/// whenever the elapsed time is not positive.
pub fn compute_metrics(
    reference: &str,
    typed: &str,
    started_at_millis: Option<i64>,
    now_millis: i64,
) -> Metrics {
    let total_chars = typed.chars().count();
    if total_chars == 0 {
        return Metrics::default();
    }

    let correct_chars = typed
        .chars()
        .zip(reference.chars())
        .filter(|(t, r)| t == r)
        .count();

    let words_per_minute = match started_at_millis {
        Some(started) => {
            let elapsed_minutes = (now_millis - started) as f64 / MILLIS_PER_MINUTE;
            words_per_minute(word_count(typed), elapsed_minutes)
        }
        None => 0,
    };

    let accuracy_percent =
        ((correct_chars as f64 / total_chars as f64) * 100.0).round() as u32;

    Metrics {
        correct_chars,
        total_chars,
        words_per_minute,
        accuracy_percent,
    }
}

/// Naive word count: trim, then split on single spaces.
///
/// A string without spaces (including the empty string) is one word, a
/// trailing partial word counts as a whole one, and a run of spaces yields
/// empty tokens that are counted too.
pub fn word_count(typed: &str) -> usize {
    typed.trim().split(' ').count()
}

fn words_per_minute(words: usize, elapsed_minutes: f64) -> u32 {
    let wpm = (words as f64 / elapsed_minutes).round();
    if elapsed_minutes > 0.0 && wpm.is_finite() {
        wpm as u32
    } else {
        0
    }
}

/// Classify every reference character against the typed text
pub fn classify_characters(reference: &str, typed: &str) -> Vec<CharClass> {
    let mut cursor_placed = false;

    reference
        .chars()
        .zip_longest(typed.chars())
        .filter_map(|pair| match pair {
            EitherOrBoth::Both(expected, actual) => Some(if expected == actual {
                CharClass::Correct
            } else {
                CharClass::Incorrect
            }),
            EitherOrBoth::Left(_) if !cursor_placed => {
                cursor_placed = true;
                Some(CharClass::Cursor)
            }
            EitherOrBoth::Left(_) => Some(CharClass::Pending),
            // typed text is never longer than the reference
            EitherOrBoth::Right(_) => None,
        })
        .collect()
}

pub fn wpm_badge(wpm: u32) -> &'static str {
    if wpm > 40 {
        "Fast!"
    } else if wpm > 25 {
        "Good"
    } else {
        "Keep going!"
    }
}

pub fn accuracy_badge(accuracy: u32) -> &'static str {
    if accuracy > 95 {
        "Perfect!"
    } else if accuracy > 85 {
        "Great"
    } else {
        "Focus!"
    }
}

/// Closing remark shown with the final results
pub fn verdict(wpm: u32) -> &'static str {
    if wpm > 60 {
        "Excellent typing speed!"
    } else if wpm > 40 {
        "Great job!"
    } else if wpm > 25 {
        "Good work!"
    } else {
        "Keep practicing!"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_empty_input_is_fully_accurate() {
        let metrics = compute_metrics("cat", "", Some(NOW - 1000), NOW);

        assert_eq!(metrics, Metrics::default());
        assert_eq!(metrics.accuracy_percent, 100);
        assert_eq!(metrics.words_per_minute, 0);
    }

    #[test]
    fn test_position_wise_accuracy() {
        let metrics = compute_metrics("cat", "cbt", Some(NOW - 1000), NOW);

        assert_eq!(metrics.correct_chars, 2);
        assert_eq!(metrics.total_chars, 3);
        assert_eq!(metrics.accuracy_percent, 67);
    }

    #[test]
    fn test_accuracy_ignores_realignment() {
        // a dropped character shifts every later position
        let metrics = compute_metrics("abcd", "acd", Some(NOW - 1000), NOW);

        assert_eq!(metrics.correct_chars, 1);
        assert_eq!(metrics.accuracy_percent, 33);
    }

    #[test]
    fn test_wpm_over_half_a_minute() {
        let metrics = compute_metrics(
            "one two three four five",
            "one two three four",
            Some(NOW - 30_000),
            NOW,
        );

        assert_eq!(metrics.words_per_minute, 8);
        assert_eq!(metrics.accuracy_percent, 100);
    }

    #[test]
    fn test_wpm_zero_elapsed_falls_back_to_zero() {
        let metrics = compute_metrics("hello", "he", Some(NOW), NOW);
        assert_eq!(metrics.words_per_minute, 0);
        assert_eq!(metrics.total_chars, 2);
    }

    #[test]
    fn test_wpm_negative_elapsed_falls_back_to_zero() {
        let metrics = compute_metrics("hello", "he", Some(NOW + 5_000), NOW);
        assert_eq!(metrics.words_per_minute, 0);
    }

    #[test]
    fn test_wpm_without_start_is_zero() {
        let metrics = compute_metrics("hello", "hello", None, NOW);
        assert_eq!(metrics.words_per_minute, 0);
        assert_eq!(metrics.accuracy_percent, 100);
    }

    #[test]
    fn test_word_count_is_naive() {
        assert_eq!(word_count(""), 1);
        assert_eq!(word_count("   "), 1);
        assert_eq!(word_count("hel"), 1);
        assert_eq!(word_count("one two"), 2);
        assert_eq!(word_count("  one two  "), 2);
        assert_eq!(word_count("one  two"), 3);
        assert_eq!(word_count("one tw"), 2);
    }

    #[test]
    fn test_metrics_count_chars_not_bytes() {
        let metrics = compute_metrics("naïve", "naïx", Some(NOW - 60_000), NOW);
        assert_eq!(metrics.total_chars, 4);
        assert_eq!(metrics.correct_chars, 3);
    }

    #[test]
    fn test_classify_characters() {
        use CharClass::*;

        assert_eq!(
            classify_characters("cats", "cb"),
            vec![Correct, Incorrect, Cursor, Pending]
        );
        assert_eq!(
            classify_characters("cat", ""),
            vec![Cursor, Pending, Pending]
        );
        assert_eq!(
            classify_characters("cat", "cat"),
            vec![Correct, Correct, Correct]
        );
    }

    #[test]
    fn test_classify_after_backspace() {
        use CharClass::*;

        let before = classify_characters("abc", "ax");
        assert_eq!(before, vec![Correct, Incorrect, Cursor]);

        let after = classify_characters("abc", "a");
        assert_eq!(after, vec![Correct, Cursor, Pending]);
    }

    #[test]
    fn test_badges() {
        assert_eq!(wpm_badge(41), "Fast!");
        assert_eq!(wpm_badge(40), "Good");
        assert_eq!(wpm_badge(25), "Keep going!");

        assert_eq!(accuracy_badge(96), "Perfect!");
        assert_eq!(accuracy_badge(95), "Great");
        assert_eq!(accuracy_badge(85), "Focus!");
    }

    #[test]
    fn test_verdict() {
        assert_eq!(verdict(61), "Excellent typing speed!");
        assert_eq!(verdict(60), "Great job!");
        assert_eq!(verdict(30), "Good work!");
        assert_eq!(verdict(0), "Keep practicing!");
    }
}
