use serde::{Deserialize, Serialize};

/// One MHC allele as requested by the caller.
///
/// A "standard" allele carries only an identifier and is resolved by the
/// engine's built-in database. A custom allele additionally carries either a
/// pseudo-sequence or a full protein sequence; never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlleleSpec {
    /// Allele identifier (nomenclature string or opaque custom label)
    pub identifier: String,

    /// Short representative MHC subsequence, for engines that take one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pseudo_sequence: Option<String>,

    /// Full MHC protein sequence (FASTA-derived)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_sequence: Option<String>,
}

impl AlleleSpec {
    pub fn standard(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            pseudo_sequence: None,
            full_sequence: None,
        }
    }

    pub fn with_pseudo_sequence(identifier: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            pseudo_sequence: Some(sequence.into().to_ascii_uppercase()),
            full_sequence: None,
        }
    }

    pub fn with_full_sequence(identifier: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            pseudo_sequence: None,
            full_sequence: Some(sequence.into().to_ascii_uppercase()),
        }
    }

    /// True when the allele is resolved by the engine's built-in database.
    #[must_use]
    pub fn is_standard(&self) -> bool {
        self.custom_sequence().is_none()
    }

    /// The custom sequence payload, whichever kind it is.
    #[must_use]
    pub fn custom_sequence(&self) -> Option<&str> {
        self.pseudo_sequence
            .as_deref()
            .or(self.full_sequence.as_deref())
    }

    /// `identifier:sequence` directive for engines that take custom alleles
    /// inline. `None` for standard alleles.
    #[must_use]
    pub fn custom_directive(&self) -> Option<String> {
        self.custom_sequence()
            .map(|seq| format!("{}:{seq}", self.identifier))
    }
}

impl std::fmt::Display for AlleleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_allele() {
        let allele = AlleleSpec::standard("HLA-A*02:01");
        assert!(allele.is_standard());
        assert_eq!(allele.custom_sequence(), None);
        assert_eq!(allele.custom_directive(), None);
    }

    #[test]
    fn test_pseudo_sequence_allele() {
        let allele = AlleleSpec::with_pseudo_sequence("HLA-B*07:02", "msaqrv");
        assert!(!allele.is_standard());
        assert_eq!(allele.custom_sequence(), Some("MSAQRV"));
        assert_eq!(
            allele.custom_directive(),
            Some("HLA-B*07:02:MSAQRV".to_string())
        );
    }

    #[test]
    fn test_full_sequence_allele() {
        let allele = AlleleSpec::with_full_sequence("MHC1", "MSAQRVGSLADG");
        assert!(!allele.is_standard());
        assert_eq!(allele.custom_sequence(), Some("MSAQRVGSLADG"));
        assert_eq!(allele.pseudo_sequence, None);
    }
}
