// Cursor positions are byte offsets into the comment text, always on a char boundary.

pub fn insert_char(text: &mut String, cursor: &mut usize, c: char) {
    *cursor = clamp_cursor(text, *cursor);
    text.insert(*cursor, c);
    *cursor += c.len_utf8();
}

pub fn insert_str(text: &mut String, cursor: &mut usize, s: &str) {
    *cursor = clamp_cursor(text, *cursor);
    // Pasted text from some terminals arrives with \r line endings
    let s = s.replace("\r\n", "\n").replace('\r', "\n");
    text.insert_str(*cursor, &s);
    *cursor += s.len();
}

pub fn backspace(text: &mut String, cursor: &mut usize) {
    *cursor = clamp_cursor(text, *cursor);
    if let Some((idx, _)) = text[..*cursor].char_indices().next_back() {
        text.remove(idx);
        *cursor = idx;
    }
}

pub fn delete(text: &mut String, cursor: &mut usize) {
    *cursor = clamp_cursor(text, *cursor);
    if *cursor < text.len() {
        text.remove(*cursor);
    }
}

pub fn move_left(text: &str, cursor: usize) -> usize {
    let cursor = clamp_cursor(text, cursor);
    text[..cursor].char_indices().next_back().map(|(idx, _)| idx).unwrap_or(0)
}

pub fn move_right(text: &str, cursor: usize) -> usize {
    let cursor = clamp_cursor(text, cursor);
    text[cursor..].chars().next().map(|c| cursor + c.len_utf8()).unwrap_or(cursor)
}

pub fn line_start(text: &str, cursor: usize) -> usize {
    let cursor = clamp_cursor(text, cursor);
    text[..cursor].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

pub fn line_end(text: &str, cursor: usize) -> usize {
    let cursor = clamp_cursor(text, cursor);
    text[cursor..].find('\n').map(|i| cursor + i).unwrap_or(text.len())
}

pub fn move_up(text: &str, cursor: usize) -> usize {
    let start = line_start(text, cursor);
    if start == 0 {
        return 0;
    }
    let column = text[start..clamp_cursor(text, cursor)].chars().count();
    let prev_start = line_start(text, start - 1);
    advance_chars(text, prev_start, start - 1, column)
}

pub fn move_down(text: &str, cursor: usize) -> usize {
    let start = line_start(text, cursor);
    let end = line_end(text, cursor);
    if end == text.len() {
        return end;
    }
    let column = text[start..clamp_cursor(text, cursor)].chars().count();
    let next_start = end + 1;
    advance_chars(text, next_start, line_end(text, next_start), column)
}

/// Row and column (in chars) of the cursor, for placing the terminal caret.
pub fn cursor_position(text: &str, cursor: usize) -> (u16, u16) {
    let cursor = clamp_cursor(text, cursor);
    let row = text[..cursor].matches('\n').count();
    let col = text[line_start(text, cursor)..cursor].chars().count();
    (u16::try_from(row).unwrap_or(u16::MAX), u16::try_from(col).unwrap_or(u16::MAX))
}

fn advance_chars(text: &str, from: usize, limit: usize, chars: usize) -> usize {
    text[from..limit].char_indices().nth(chars).map(|(i, _)| from + i).unwrap_or(limit)
}

fn clamp_cursor(text: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

/// Scroll limit for `content_rows` rendered rows inside a bordered box of `view_height`.
pub fn calculate_max_scroll(content_rows: usize, view_height: u16) -> u16 {
    let visible_lines = usize::from(view_height.saturating_sub(2));
    u16::try_from(content_rows.saturating_sub(visible_lines)).unwrap_or(u16::MAX)
}
