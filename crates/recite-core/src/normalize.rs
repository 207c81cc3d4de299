use unicode_normalization::UnicodeNormalization;

/// Which steps [`normalize_with`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub fold_case: bool,
    pub collapse_spaces: bool,
    pub strip_diacritics: bool,
}

impl NormalizeOptions {
    /// Every step enabled.
    pub const ALL: Self = Self {
        fold_case: true,
        collapse_spaces: true,
        strip_diacritics: true,
    };

    /// Case and whitespace only, as used by fuzzy citation matching.
    pub const FUZZY: Self = Self {
        fold_case: true,
        collapse_spaces: true,
        strip_diacritics: false,
    };

    /// Case folding only. DOIs are case-insensitive but their punctuation is significant.
    pub const DOI: Self = Self {
        fold_case: true,
        collapse_spaces: false,
        strip_diacritics: false,
    };
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::ALL
    }
}

/// Normalize text for comparison with every step enabled.
pub fn normalize(text: &str) -> String {
    normalize_with(text, NormalizeOptions::ALL)
}

/// Normalize text for comparison.
///
/// Steps (order matters):
/// 1. Unicode NFKD decomposition, then drop everything outside ASCII
///    (lossy: `"Ångström"` → `"Angstrom"`, `"北京"` → `""`)
/// 2. Lowercase
/// 3. Split on whitespace runs and rejoin with single spaces
pub fn normalize_with(text: &str, options: NormalizeOptions) -> String {
    let mut out = if options.strip_diacritics {
        to_ascii(text)
    } else {
        text.to_string()
    };

    if options.fold_case {
        out = out.to_lowercase();
    }

    if options.collapse_spaces {
        out = out.split_whitespace().collect::<Vec<_>>().join(" ");
    }

    out
}

/// Normalize a DOI for set membership checks.
pub fn normalize_doi(doi: &str) -> String {
    normalize_with(doi, NormalizeOptions::DOI)
}

/// NFKD-decompose and keep only the ASCII remainder.
pub fn to_ascii(text: &str) -> String {
    text.nfkd().filter(|c| c.is_ascii()).collect()
}
