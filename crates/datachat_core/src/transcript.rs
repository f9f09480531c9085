use thiserror::Error;

/// Stable address of one transcript line.
///
/// Indices carry the generation of the buffer that issued them, so an index
/// handed out before [`Transcript::reset`] no longer addresses anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineIndex {
    generation: u32,
    position: usize,
}

impl LineIndex {
    pub fn position(&self) -> usize {
        self.position
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("line {position} is out of range for a transcript of {len} lines")]
    IndexOutOfRange { position: usize, len: usize },
}

/// Ordered, append-mostly sequence of display lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    generation: u32,
    lines: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, line: impl Into<String>) -> LineIndex {
        let position = self.lines.len();
        self.lines.push(line.into());
        LineIndex {
            generation: self.generation,
            position,
        }
    }

    /// Replaces the line at `index`.
    ///
    /// Indices from an earlier generation are ignored.
    pub fn rewrite(
        &mut self,
        index: LineIndex,
        line: impl Into<String>,
    ) -> Result<(), TranscriptError> {
        if index.generation != self.generation {
            return Ok(());
        }
        let len = self.lines.len();
        match self.lines.get_mut(index.position) {
            Some(slot) => {
                *slot = line.into();
                Ok(())
            }
            None => Err(TranscriptError::IndexOutOfRange {
                position: index.position,
                len,
            }),
        }
    }

    pub fn rendered_view(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drops every line. Indices issued so far become stale.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}
