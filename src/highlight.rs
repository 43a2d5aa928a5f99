/// Split text into whitespace-delimited words. No punctuation normalization.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// One target word annotated for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedWord {
    pub word: String,
    /// The user has reached this word position. Presence only, not equality.
    pub satisfied: bool,
}

/// Annotate every target word with whether the user has typed something at
/// its position yet.
pub fn highlight(user_text: &str, target_text: &str) -> Vec<HighlightedWord> {
    let typed = split_words(user_text).len();

    split_words(target_text)
        .into_iter()
        .enumerate()
        .map(|(idx, word)| HighlightedWord {
            word: word.to_string(),
            satisfied: idx < typed,
        })
        .collect()
}
