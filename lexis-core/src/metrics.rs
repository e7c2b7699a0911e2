//! Edit-distance error rates over decoder output.
//!
//! CER counts character edits, WER counts whitespace-word edits, both
//! normalized by the target length. An empty target is defined as an error
//! rate of exactly 1.0 — a deliberate policy for scoring against missing
//! references, not a division-by-zero guard gone wrong.

/// Levenshtein distance between two sequences, single-row DP, O(|a|·|b|)
/// time and O(|b|) memory.
fn levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, item_a) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, item_b) in b.iter().enumerate() {
            let substitution = if item_a == item_b {
                diagonal
            } else {
                diagonal + 1
            };
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }
    row[b.len()]
}

/// Character error rate: char-level Levenshtein distance divided by the
/// target's character count. Empty target ⇒ 1.0 by convention.
pub fn calc_cer(target: &str, predicted: &str) -> f32 {
    let target_chars: Vec<char> = target.chars().collect();
    if target_chars.is_empty() {
        return 1.0;
    }
    let predicted_chars: Vec<char> = predicted.chars().collect();
    levenshtein(&predicted_chars, &target_chars) as f32 / target_chars.len() as f32
}

/// Word error rate: word-level Levenshtein distance divided by the target's
/// word count (whitespace-split). Empty target ⇒ 1.0 by convention.
pub fn calc_wer(target: &str, predicted: &str) -> f32 {
    let target_words: Vec<&str> = target.split_whitespace().collect();
    if target_words.is_empty() {
        return 1.0;
    }
    let predicted_words: Vec<&str> = predicted.split_whitespace().collect();
    levenshtein(&predicted_words, &target_words) as f32 / target_words.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn levenshtein_known_distances() {
        let to_chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(levenshtein(&to_chars(""), &to_chars("")), 0);
        assert_eq!(levenshtein(&to_chars("abc"), &to_chars("abc")), 0);
        assert_eq!(levenshtein(&to_chars("abc"), &to_chars("")), 3);
        assert_eq!(levenshtein(&to_chars(""), &to_chars("abc")), 3);
        assert_eq!(levenshtein(&to_chars("kitten"), &to_chars("sitting")), 3);
    }

    #[test]
    fn empty_target_is_one_by_convention() {
        assert_relative_eq!(calc_cer("", "anything"), 1.0);
        assert_relative_eq!(calc_wer("", "anything"), 1.0);
        assert_relative_eq!(calc_cer("", ""), 1.0);
        assert_relative_eq!(calc_wer("", ""), 1.0);
    }

    #[test]
    fn perfect_prediction_scores_zero() {
        assert_relative_eq!(calc_cer("the cat", "the cat"), 0.0);
        assert_relative_eq!(calc_wer("the cat", "the cat"), 0.0);
    }

    #[test]
    fn cer_normalizes_by_target_chars() {
        // One substitution against a 4-char target.
        assert_relative_eq!(calc_cer("abcd", "abxd"), 0.25);
    }

    #[test]
    fn wer_normalizes_by_target_words() {
        // One substituted word against a 2-word target.
        assert_relative_eq!(calc_wer("the cat", "the dog"), 0.5);
    }

    #[test]
    fn empty_prediction_against_nonempty_target() {
        assert_relative_eq!(calc_cer("abc", ""), 1.0);
        assert_relative_eq!(calc_wer("the cat sat", ""), 1.0);
    }

    #[test]
    fn error_rate_can_exceed_one() {
        // Predictions longer than the target can push the rate above 1.
        assert!(calc_cer("a", "xyz") > 1.0);
    }
}
