use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of the first `chars` characters of `text`
pub fn prefix_width(text: &str, chars: usize) -> usize {
    let end = text
        .char_indices()
        .nth(chars)
        .map_or(text.len(), |(idx, _)| idx);
    text[..end].width()
}

/// Row of every character when `text` is word-wrapped into `width` columns,
/// plus the row of the position right after the last character.
///
/// Greedy fill on spaces. A word moves to the next row together with its
/// trailing space, so every space stays a real cell on the row it ends.
/// Words wider than a row are broken per character.
fn layout(text: &str, width: usize) -> (Vec<usize>, usize) {
    if width == 0 {
        return (vec![0; text.chars().count()], 0);
    }

    let mut rows = Vec::with_capacity(text.len());
    let (mut row, mut col) = (0, 0);
    for word in text.split_inclusive(' ') {
        if col > 0 && col + word.width() > width {
            row += 1;
            col = 0;
        }
        for c in word.chars() {
            let w = c.width().unwrap_or(0);
            if col > 0 && col + w > width {
                row += 1;
                col = 0;
            }
            rows.push(row);
            col += w;
        }
    }

    let end_row = if col >= width { row + 1 } else { row };
    (rows, end_row)
}

/// Row assigned to each character of `text` wrapped into `width` columns
pub fn char_rows(text: &str, width: u16) -> Vec<usize> {
    layout(text, width as usize).0
}

/// Row on which character `index` lands when `text` is wrapped into `width`
/// columns. An index past the end maps to the position right after the last
/// character.
pub fn wrapped_row(text: &str, index: usize, width: u16) -> usize {
    let (rows, end_row) = layout(text, width as usize);
    rows.get(index).copied().unwrap_or(end_row)
}

/// Vertical scroll keeping `row` in view inside a box `inner_height` rows
/// tall, with one spare row below it.
pub fn scroll_for_row(row: usize, inner_height: u16) -> u16 {
    if inner_height < 2 {
        return row.min(u16::MAX as usize) as u16;
    }
    let visible_above = inner_height as usize - 2;
    row.saturating_sub(visible_above).min(u16::MAX as usize) as u16
}

/// Fraction of the countdown still remaining, for the time gauge
pub fn time_ratio(remaining_seconds: u32, total_seconds: u32) -> f64 {
    if total_seconds == 0 {
        return 0.0;
    }
    (remaining_seconds as f64 / total_seconds as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_width() {
        assert_eq!(prefix_width("hello", 0), 0);
        assert_eq!(prefix_width("hello", 3), 3);
        assert_eq!(prefix_width("hello", 10), 5);
        assert_eq!(prefix_width("naïve", 3), 3);
        assert_eq!(prefix_width("日本語", 2), 4);
    }

    #[test]
    fn test_wrapped_row_short_text() {
        assert_eq!(wrapped_row("hello world", 0, 20), 0);
        assert_eq!(wrapped_row("hello world", 8, 20), 0);
        assert_eq!(wrapped_row("hello world", 11, 20), 0);
        assert_eq!(wrapped_row("", 0, 20), 0);
    }

    #[test]
    fn test_wrapped_row_moves_whole_words() {
        // "hello " fills row 0, "world" does not fit after it
        assert_eq!(wrapped_row("hello world", 5, 8), 0);
        assert_eq!(wrapped_row("hello world", 6, 8), 1);
        assert_eq!(wrapped_row("hello world", 10, 8), 1);
    }

    #[test]
    fn test_wrapped_row_repeated_words() {
        // seven "word " tokens per 38 column row
        let text = "word ".repeat(200);
        assert_eq!(wrapped_row(&text, 34, 38), 0);
        assert_eq!(wrapped_row(&text, 35, 38), 1);
        assert_eq!(wrapped_row(&text, 950, 38), 27);
    }

    #[test]
    fn test_wrapped_row_breaks_long_words() {
        assert_eq!(wrapped_row("abcdefghij", 9, 4), 2);
    }

    #[test]
    fn test_line_ending_space_stays_on_its_row() {
        assert_eq!(char_rows("abc def", 4), vec![0, 0, 0, 0, 1, 1, 1]);
        assert_eq!(wrapped_row("abc def", 3, 4), 0);
        assert_eq!(wrapped_row("abc def", 7, 4), 1);
        // the cursor after a full last row moves to the next one
        assert_eq!(wrapped_row("ab cd", 5, 5), 1);
        assert_eq!(wrapped_row("ab cd", 5, 6), 0);
    }

    #[test]
    fn test_char_rows_matches_wrapped_row() {
        let text = "the quick brown fox jumps over the lazy dog";
        for width in [5, 9, 12, 20] {
            let rows = char_rows(text, width);
            assert_eq!(rows.len(), text.chars().count());
            for (index, row) in rows.iter().enumerate() {
                assert_eq!(wrapped_row(text, index, width), *row);
            }
            // rows only ever grow by one
            assert!(rows.windows(2).all(|w| w[1] == w[0] || w[1] == w[0] + 1));
        }
    }

    #[test]
    fn test_wrapped_row_zero_width() {
        assert_eq!(wrapped_row("hello", 3, 0), 0);
    }

    #[test]
    fn test_scroll_for_row() {
        assert_eq!(scroll_for_row(0, 10), 0);
        assert_eq!(scroll_for_row(8, 10), 0);
        assert_eq!(scroll_for_row(9, 10), 1);
        assert_eq!(scroll_for_row(27, 11), 18);
        assert_eq!(scroll_for_row(3, 1), 3);
    }

    #[test]
    fn test_time_ratio() {
        assert_eq!(time_ratio(60, 60), 1.0);
        assert_eq!(time_ratio(30, 60), 0.5);
        assert_eq!(time_ratio(0, 60), 0.0);
        assert_eq!(time_ratio(90, 60), 1.0);
        assert_eq!(time_ratio(5, 0), 0.0);
    }
}
