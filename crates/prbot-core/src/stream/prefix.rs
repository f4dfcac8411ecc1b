/// Longest prefix shared by `first` and every string in `rest`.
///
/// Always ends on a char boundary of `first`. With an empty `rest` the whole
/// of `first` is returned.
pub fn longest_common_prefix<'a, S: AsRef<str>>(first: &'a str, rest: &[S]) -> &'a str {
    let end = rest.iter().fold(first.len(), |end, other| {
        let shared = first
            .char_indices()
            .zip(other.as_ref().chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((i, c), _)| i + c.len_utf8());
        end.min(shared)
    });
    &first[..end]
}
