//! Path-safe file and directory names for icons and category labels.

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Sanitizes one path component (a file name or a single directory name).
///
/// - Replaces NUL, `/`, `\`, and control characters with `_`
/// - Collapses consecutive underscores introduced by replacement
/// - Trims leading/trailing spaces and dots
/// - Limits length to 255 bytes
///
/// Returns None if nothing usable remains (empty, `.` or `..`).
pub fn sanitize_component(name: &str) -> Option<String> {
    let mut out = String::with_capacity(name.len());
    let mut prev_replaced = false;

    for c in name.chars() {
        if c == '\0' || c == '/' || c == '\\' || c.is_control() {
            if !prev_replaced {
                out.push('_');
            }
            prev_replaced = true;
        } else {
            out.push(c);
            prev_replaced = false;
        }
    }

    let trimmed = out.trim_matches(|c: char| c == ' ' || c == '.');
    let mut take = trimmed.len().min(NAME_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    let result = &trimmed[..take];
    if result.is_empty() || result == "." || result == ".." {
        None
    } else {
        Some(result.to_string())
    }
}

/// Splits a category label on `/` (nested categories) into sanitized
/// directory components. Unusable components are skipped.
pub fn category_components(label: &str) -> Vec<String> {
    label.split('/').filter_map(sanitize_component).collect()
}

/// `prefix-name.svg`, or `name.svg` when `no_prefix` is set.
pub fn icon_file_name(prefix: &str, name: &str, no_prefix: bool) -> String {
    let stem = if no_prefix {
        name.to_string()
    } else {
        format!("{}-{}", prefix, name)
    };
    let stem = sanitize_component(&stem).unwrap_or_else(|| "icon".to_string());
    format!("{}.svg", stem)
}
