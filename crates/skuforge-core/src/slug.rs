//! URL-safe slugs.

/// Fallback for names that slug to nothing.
pub const ITEM_SLUG_FALLBACK: &str = "item";

/// Fallback for identifier/colour parts of image file names.
pub const PART_SLUG_FALLBACK: &str = "x";

/// Lowercase `s`, collapse each run of non-alphanumerics into one `-`, trim
/// separators at both ends, and use `fallback` when nothing is left.
pub fn slugify(s: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_sep = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        fallback.to_string()
    } else {
        out
    }
}

/// Slug keying a variation's rendered image: one file per (item, colour).
pub fn image_slug(item_id: &str, color: &str) -> String {
    format!(
        "{}-{}",
        slugify(item_id, PART_SLUG_FALLBACK),
        slugify(color, PART_SLUG_FALLBACK)
    )
}
