//! Word extraction for the tag-aware search bar.
//!
//! A word is a maximal run of non-whitespace characters. The word "at" a
//! cursor is the run that contains the cursor or ends exactly at it, so a
//! cursor sitting right after `rune` in `rune axe` picks `rune`, while a
//! cursor in the middle of a whitespace run picks nothing.
//!
//! ## Join convention
//!
//! Removing a word leaves the text before it and the text after it. When the
//! text before it is empty or already ends with whitespace, one leading
//! whitespace character of the text after it is dropped, so removing the
//! first word of `hello world` leaves `world`, not ` world`. Nothing else is
//! trimmed: removing the last word of `hello world` leaves `hello `.

/// A word cut out of a text, and what is left of the text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordExtraction {
    pub word: String,
    pub remainder: String,
}

impl WordExtraction {
    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }
}

/// Extracts the word touching `cursor` (a character offset) from `text`.
///
/// Offsets past the end of `text` are treated as the end. Never fails: when
/// no word touches the cursor the word is empty and the remainder is `text`.
///
/// ```
/// use merch::search::word::extract_word_at;
///
/// let cut = extract_word_at("hello world", 6);
/// assert_eq!(cut.word, "world");
/// assert_eq!(cut.remainder, "hello ");
/// ```
pub fn extract_word_at(text: &str, cursor: usize) -> WordExtraction {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());

    let mut left = cursor;
    while left > 0 && !chars[left - 1].is_whitespace() {
        left -= 1;
    }

    let mut right = cursor;
    while right < chars.len() && !chars[right].is_whitespace() {
        right += 1;
    }

    if left == right {
        return WordExtraction {
            word: String::new(),
            remainder: text.to_string(),
        };
    }

    let before: String = chars[..left].iter().collect();
    let word: String = chars[left..right].iter().collect();
    let mut after = &chars[right..];

    let joins_on_space = before.is_empty() || before.ends_with(char::is_whitespace);
    if joins_on_space && after.first().is_some_and(|c| c.is_whitespace()) {
        after = &after[1..];
    }

    let mut remainder = before;
    remainder.extend(after.iter());

    WordExtraction { word, remainder }
}
