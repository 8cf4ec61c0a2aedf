/// Length counter shown next to compared texts: single-byte characters count
/// once, each extra UTF-8 byte counts twice.
pub fn weighted_length(text: &str) -> usize {
    let bytes = text.len();
    let chars = text.chars().count();
    (bytes - chars) * 2 + chars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_counts_once() {
        assert_eq!(weighted_length(""), 0);
        assert_eq!(weighted_length("abc def"), 7);
    }

    #[test]
    fn multibyte_is_weighted() {
        // three bytes each: 1 + 2 * 2
        assert_eq!(weighted_length("가"), 5);
        assert_eq!(weighted_length("a가"), 6);
    }
}
