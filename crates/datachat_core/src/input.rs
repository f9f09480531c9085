/// Single-line text entry owned by the input capture process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputField {
    buffer: String,
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn push(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Takes the trimmed text for sending. The field is always cleared, even
    /// when there is nothing to send.
    pub fn submit(&mut self) -> Option<String> {
        let text = self.buffer.trim().to_string();
        self.buffer.clear();
        (!text.is_empty()).then_some(text)
    }
}
