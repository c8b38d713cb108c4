use serde::{Deserialize, Serialize};

/// A named protein or peptide sequence to scan for binders.
///
/// Sequences are uppercased on construction; input order of records is
/// preserved by the parsers and carries through to output ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub name: String,
    pub sequence: String,
}

impl SequenceRecord {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into().to_ascii_uppercase(),
        }
    }

    /// Residue count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The fixed-length window starting at `offset`, or `None` when the
    /// window would run past the end of the sequence.
    #[must_use]
    pub fn window(&self, offset: usize, length: usize) -> Option<&str> {
        let end = offset.checked_add(length)?;
        self.sequence.get(offset..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercased_on_construction() {
        let record = SequenceRecord::new("P1", "nlyiqwlkd");
        assert_eq!(record.sequence, "NLYIQWLKD");
        assert_eq!(record.len(), 9);
    }

    #[test]
    fn test_window() {
        let record = SequenceRecord::new("P1", "NLYIQWLKDG");
        assert_eq!(record.window(0, 9), Some("NLYIQWLKD"));
        assert_eq!(record.window(1, 9), Some("LYIQWLKDG"));
        assert_eq!(record.window(2, 9), None);
    }
}
