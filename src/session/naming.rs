/// Characters tmux rejects or misinterprets in a session target.
const INVALID_CHARS: [char; 15] = [
    ' ', '/', '\\', '$', '#', '&', '*', '(', ')', '{', '}', '[', ']', '@', '!',
];

/// Turn a directory or workspace name into a valid tmux session name.
///
/// `.` and `:` are tmux target separators; the rest confuse either tmux or
/// the shell. Every one of them becomes `_`.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c == '.' || c == ':' || INVALID_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}
