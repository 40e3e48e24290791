/// Trims and collapses interior whitespace runs to a single space,
/// leaving the characters themselves (diacritics included) untouched
pub fn sanitize_string(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
