//! URL slug derivation.
//!
//! The admin console mirrors this function for its live preview, so the rules
//! must stay stable: lowercase, drop Vietnamese diacritics (`đ` becomes `d`),
//! keep only `[a-z0-9]`, and join words with single hyphens.

use unicode_normalization::UnicodeNormalization;

/// Derive a URL-safe slug from a display name.
///
/// Deriving from a string that is already a valid slug returns it unchanged.
/// The result may be empty when the input has no usable characters.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase().replace('đ', "d");

    let mut slug = String::with_capacity(lowered.len());
    let mut pending_separator = false;

    for c in lowered.nfd() {
        match c {
            'a'..='z' | '0'..='9' => {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push(c);
            }
            '-' => pending_separator = true,
            c if c.is_whitespace() => pending_separator = true,
            // combining marks and everything else outside the slug alphabet
            _ => {}
        }
    }

    slug
}
