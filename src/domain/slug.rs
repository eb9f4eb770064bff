//! Slug derivation for post titles.
//!
//! Titles are lowercased and every run of characters outside `[a-z0-9]` is
//! collapsed into a single hyphen, with hyphens trimmed from both ends.
//! Accented letters are transliterated (`slug` crate), so "Déjà vu" becomes
//! `deja-vu` rather than `d-j-vu`. Symbols are separators and never spelled
//! out: "I ❤ Rust" is `i-rust`.

use slug::slugify;
use thiserror::Error;

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// Derive a slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let separated: String = input
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
        .collect();
    let candidate = slugify(separated);

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates_runs() {
        assert_eq!(derive_slug("Hello, World!!").unwrap(), "hello-world");
        assert_eq!(derive_slug("Top 10   Tips").unwrap(), "top-10-tips");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(derive_slug("  --Rust & Axum--  ").unwrap(), "rust-axum");
    }

    #[test]
    fn transliterates_accents() {
        assert_eq!(derive_slug("Déjà Vu").unwrap(), "deja-vu");
    }

    #[test]
    fn symbols_become_separators() {
        assert_eq!(derive_slug("I ❤ Rust").unwrap(), "i-rust");
        assert_eq!(derive_slug("5€ Deal").unwrap(), "5-deal");
        assert_eq!(derive_slug("C++ & Go").unwrap(), "c-go");
    }

    #[test]
    fn rejects_blank_and_symbol_only_titles() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
        assert_eq!(
            derive_slug("!!!"),
            Err(SlugError::Unrepresentable {
                input: "!!!".to_string()
            })
        );
    }
}
