/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text field with a character-based cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    text: String,
    cursor: usize,
}

impl InputField {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Visible slice and cursor column for a field `width` cells wide,
    /// scrolled horizontally so the cursor stays in view.
    pub fn visible(&self, width: usize) -> (String, usize) {
        let offset = if width == 0 || self.cursor < width {
            0
        } else {
            self.cursor - width + 1
        };
        let text = self.text.chars().skip(offset).take(width).collect();
        (text, self.cursor - offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_multibyte_text() {
        let mut field = InputField::default();
        for c in "cláusula".chars() {
            field.insert(c);
        }
        field.left();
        field.left();
        field.backspace();
        assert_eq!(field.text(), "cláusla");
        assert_eq!(field.cursor(), 5);

        field.home();
        field.delete();
        assert_eq!(field.text(), "láusla");
        field.end();
        assert_eq!(field.cursor(), 6);
    }

    #[test]
    fn test_visible_scrolls_with_cursor() {
        let mut field = InputField::default();
        field.set("0123456789");
        let (text, col) = field.visible(4);
        assert_eq!(text, "789");
        assert_eq!(col, 3);

        field.home();
        let (text, col) = field.visible(4);
        assert_eq!(text, "0123");
        assert_eq!(col, 0);
    }
}
