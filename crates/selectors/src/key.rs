/// Joins key components with `/`, using an empty string for missing ones.
///
/// Components are not escaped: `("a/b", "c")` and `("a", "b/c")` collide.
/// Callers pick components that cannot contain the delimiter, such as ids.
pub fn composite_key(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .map(|part| part.unwrap_or(""))
        .collect::<Vec<_>>()
        .join("/")
}
