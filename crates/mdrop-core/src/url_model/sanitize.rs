//! Filename-prefix sanitization.

/// Longest prefix kept in a stored filename.
const PREFIX_MAX: usize = 64;

/// Sanitizes a caller-supplied name prefix for use in a stored filename.
///
/// - Keeps ASCII letters, digits, `-` and `_`; everything else becomes `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing underscores, dashes and dots
/// - Limits length to 64 bytes
///
/// The result never contains a path separator, so joining it onto a
/// directory cannot escape that directory.
pub fn sanitize_prefix(name: &str) -> String {
    let mut out = String::with_capacity(name.len().min(PREFIX_MAX));
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = if c.is_ascii_alphanumeric() || c == '-' {
            c
        } else {
            '_'
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '_' || c == '-' || c == '.');
    let mut take = trimmed.len().min(PREFIX_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take]
        .trim_end_matches(|c| c == '_' || c == '-')
        .to_string()
}
