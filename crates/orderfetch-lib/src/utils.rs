/// Replaces every character outside `[A-Za-z0-9.-]` with an underscore.
///
/// The result has the same number of characters as the input, so extensions
/// survive untouched.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' => c,
            _ => '_',
        })
        .collect()
}

/// Returns the extension of `name` including the leading dot, if it has one.
pub fn dotted_extension(name: &str) -> Option<&str> {
    let idx = name.rfind('.')?;
    // Dotfiles and trailing dots have no usable extension.
    if idx == 0 || idx + 1 == name.len() {
        return None;
    }
    Some(&name[idx..])
}
