/// Derives the variable name for an external tool from its display name:
/// lowercase, runs of non-alphanumeric characters collapsed to `_`,
/// leading/trailing `_` trimmed.
pub fn slugify_tool_name(display_name: &str) -> String {
    let mut slug = String::with_capacity(display_name.len());
    let mut pending_separator = false;
    for ch in display_name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}
