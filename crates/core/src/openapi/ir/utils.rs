//! Naming helpers shared by the resolver and the declaration builders.

use std::collections::HashSet;
use std::sync::LazyLock;

use super::types::UnrealType;

/// C++ keywords that cannot be used as identifiers. Sanitized names matching one get a `Key` suffix.
pub static CPP_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "class",
        "struct",
        "const",
        "namespace",
        "if",
        "switch",
        "do",
        "for",
        "while",
        "fixed",
        "int",
        "long",
        "auto",
        "void",
        "public",
        "protected",
        "private",
    ]
    .into_iter()
    .collect()
});

/// Upper-case the first character.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn a name into a C++ identifier.
///
/// Walks from the second-to-last character back to the first, removing `-`,
/// `/`, `$` and `_` and upper-casing the character that followed. The last
/// character is never inspected. Reserved words get a `Key` suffix.
pub fn sanitize(name: &str) -> String {
    let mut chars: Vec<char> = name.chars().collect();
    if chars.len() >= 2 {
        for i in (0..chars.len() - 1).rev() {
            if matches!(chars[i], '-' | '/' | '$' | '_') {
                let next: Vec<char> = chars[i + 1].to_uppercase().collect();
                chars.splice(i..i + 2, next);
            }
        }
    }

    let sanitized: String = chars.into_iter().collect();
    if CPP_RESERVED_WORDS.contains(sanitized.as_str()) {
        format!("{sanitized}Key")
    } else {
        sanitized
    }
}

/// Display name for editor UI: capitalizes, then inserts a space before each
/// upper-case letter that follows a lower-case one or starts a new word.
///
/// `"userID"` becomes `"User ID"`, `"HTTPCall"` becomes `"HTTP Call"`.
pub fn space_out_on_upper_case(word: &str) -> String {
    let chars: Vec<char> = capitalize(word).chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        let prev_lower = i > 0 && chars[i - 1].is_lowercase();
        let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
        if c.is_uppercase() && (prev_lower || (i > 0 && next_lower)) {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Property name for a raw field: `$` stripped, split on `_`, each word
/// capitalized, and a `b` prefix for booleans (optional or not).
pub fn property_field_name(ty: &UnrealType, field_name: &str) -> String {
    let field_name = field_name.strip_prefix('$').unwrap_or(field_name);
    let mut name: String = field_name
        .split('_')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();

    if ty.is_bool_like() {
        name.insert(0, 'b');
    }
    name
}

/// `#include "{path}"`
pub fn include_statement(path: &str) -> String {
    format!("#include \"{path}\"")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::types::Primitive;

    #[test]
    fn test_sanitize() {
        let cases = [
            ("inventory", "inventory"),
            ("/api/items", "ApiItems"),
            ("object-id", "objectId"),
            ("user_name", "userName"),
            ("$value", "Value"),
            ("trailing-", "trailing-"),
            ("a--b", "aB"),
            ("class", "classKey"),
            ("", ""),
        ];
        for (input, expected) in cases {
            assert_eq!(sanitize(input), expected, "sanitize({input:?})");
        }
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("inventory"), "Inventory");
        assert_eq!(capitalize("X"), "X");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_space_out_on_upper_case() {
        let cases = [
            ("gamerTag", "Gamer Tag"),
            ("userID", "User ID"),
            ("HTTPCall", "HTTP Call"),
            ("value", "Value"),
            ("ABc", "A Bc"),
        ];
        for (input, expected) in cases {
            assert_eq!(space_out_on_upper_case(input), expected, "space_out({input:?})");
        }
    }

    #[test]
    fn test_property_field_name() {
        let string = UnrealType::STRING;
        let boolean = UnrealType::Primitive(Primitive::Bool);
        let optional_bool = UnrealType::Optional(Box::new(boolean.clone()));

        assert_eq!(property_field_name(&string, "gamer_tag"), "GamerTag");
        assert_eq!(property_field_name(&string, "_id"), "Id");
        assert_eq!(property_field_name(&string, "$type"), "Type");
        assert_eq!(property_field_name(&boolean, "active"), "bActive");
        assert_eq!(property_field_name(&optional_bool, "is_new"), "bIsNew");
    }
}
