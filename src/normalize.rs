//! Allele nomenclature normalization.
//!
//! The engine wants `HLA-A*01:01` style names, but callers write alleles in
//! many dialects: `hla-a0101`, `A*01:01`, `HLA-A02:01`, bare `A0201`.
//! Anything that looks like an HLA name is canonicalized; anything else
//! (custom labels like `USER_DEF` or `Custom_B*070201`) passes through
//! unchanged, since such identifiers key directly into the custom-sequence
//! map.
//!
//! Normalization never fails and is idempotent.

/// HLA gene names recognized for canonicalization, longest first so class II
/// names win over their single-letter prefixes.
const KNOWN_GENES: [&str; 15] = [
    "DRB1", "DRB3", "DRB4", "DRB5", "DQA1", "DQB1", "DPA1", "DPB1", "DRA", "A", "B", "C", "E",
    "F", "G",
];

/// Canonicalize an allele identifier, or return it unchanged when it does
/// not match a recognizable HLA-style pattern.
#[must_use]
pub fn normalize_allele(raw: &str) -> String {
    canonical_hla(raw).unwrap_or_else(|| raw.to_string())
}

/// The allele name in the form the external binary expects: canonical
/// nomenclature with the `*` removed (`HLA-A02:01`), or the trimmed input
/// unchanged when it is not HLA-style.
#[must_use]
pub fn engine_allele_name(raw: &str) -> String {
    match canonical_hla(raw) {
        Some(canonical) => canonical.replace('*', ""),
        None => raw.trim().to_string(),
    }
}

fn canonical_hla(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let body = strip_hla_prefix(trimmed).unwrap_or(trimmed);
    let upper = body.to_ascii_uppercase();

    let gene = KNOWN_GENES
        .iter()
        .find(|g| upper.starts_with(*g))
        .copied()?;

    let mut rest = &upper[gene.len()..];
    rest = rest.strip_prefix('*').unwrap_or(rest);
    if rest.is_empty() {
        return None;
    }

    let fields = digit_fields(rest)?;
    Some(format!("HLA-{gene}*{}", fields.join(":")))
}

fn strip_hla_prefix(s: &str) -> Option<&str> {
    if s.len() >= 4 && s[..4].eq_ignore_ascii_case("hla-") {
        Some(&s[4..])
    } else {
        None
    }
}

/// Split the numeric part of an allele name into two-digit-padded fields.
///
/// `01:01` stays field-per-colon; a bare digit run like `0101` is split into
/// two-digit chunks. Anything containing other characters is not HLA-style.
fn digit_fields(rest: &str) -> Option<Vec<String>> {
    if !rest.chars().all(|c| c.is_ascii_digit() || c == ':') {
        return None;
    }

    if rest.contains(':') {
        let parts: Vec<&str> = rest.split(':').collect();
        if parts.iter().any(|p| p.is_empty() || p.len() > 3) {
            return None;
        }
        Some(parts.iter().map(|p| pad_field(p)).collect())
    } else {
        // bare run: need at least group + protein, and an even split
        if rest.len() < 4 || rest.len() % 2 != 0 {
            return None;
        }
        Some(
            rest.as_bytes()
                .chunks(2)
                .map(|c| String::from_utf8_lossy(c).to_string())
                .collect(),
        )
    }
}

fn pad_field(field: &str) -> String {
    if field.len() == 1 {
        format!("0{field}")
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_forms_collapse() {
        for raw in ["hla-a0101", "HLA-A*01:01", "A*01:01", "HLA-A01:01", "A0101"] {
            assert_eq!(normalize_allele(raw), "HLA-A*01:01", "input: {raw}");
        }
    }

    #[test]
    fn test_class_two_genes() {
        assert_eq!(normalize_allele("DRB1*07:01"), "HLA-DRB1*07:01");
        assert_eq!(normalize_allele("hla-dqb10602"), "HLA-DQB1*06:02");
    }

    #[test]
    fn test_single_digit_fields_padded() {
        assert_eq!(normalize_allele("A*2:1"), "HLA-A*02:01");
    }

    #[test]
    fn test_extra_fields_preserved() {
        assert_eq!(normalize_allele("A*01:01:01"), "HLA-A*01:01:01");
        assert_eq!(normalize_allele("a01010101"), "HLA-A*01:01:01:01");
    }

    #[test]
    fn test_unrecognized_passes_through() {
        for raw in [
            "USER_DEF",
            "Custom_B*070201",
            "MHC1",
            "H-2-Kb",
            "A",
            "A*",
            "A010", // odd-length bare run
            "",
        ] {
            assert_eq!(normalize_allele(raw), raw, "input: {raw}");
        }
    }

    #[test]
    fn test_engine_allele_name_strips_star() {
        assert_eq!(engine_allele_name("hla-a0201"), "HLA-A02:01");
        assert_eq!(engine_allele_name("HLA-A*02:01"), "HLA-A02:01");
        assert_eq!(engine_allele_name("USER_DEF"), "USER_DEF");
        assert_eq!(engine_allele_name("Custom_B*070201"), "Custom_B*070201");
    }

    #[test]
    fn test_idempotent() {
        for raw in [
            "hla-a0101",
            "A*02:01",
            "HLA-A02:01",
            "DRB1*07:01",
            "USER_DEF",
            "Custom_B*070201",
            "MHC1",
        ] {
            let once = normalize_allele(raw);
            assert_eq!(normalize_allele(&once), once, "input: {raw}");
        }
    }
}
