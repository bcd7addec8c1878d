//! Template substitution.
//!
//! Templates mark their holes as `₢Name₢`. Substitution is a single literal
//! pass: a value that itself contains a token is copied verbatim and never
//! expanded again. Declarations flatten themselves into a replacement table
//! through [`ReplacementTable`].

use std::collections::{BTreeMap, BTreeSet};

use unreal_apigen_common::GeneratorConfig;

use crate::error::GenError;

use super::templates::Template;

/// Delimiter on both sides of a token name.
pub const TOKEN_SENTINEL: char = '₢';

/// Token name to replacement text.
pub type Replacements = BTreeMap<&'static str, String>;

/// Trait for declarations that can fill a template.
pub trait ReplacementTable {
    /// Flatten the declaration into token values.
    fn replacements(&self, config: &GeneratorConfig) -> Replacements;
}

/// Replace every `₢key₢` found in `table`. Unknown tokens are left in place.
pub fn process_replacement(template: &str, table: &Replacements) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find(TOKEN_SENTINEL) {
        out.push_str(&rest[..start]);
        let after = &rest[start + TOKEN_SENTINEL.len_utf8()..];
        match after.find(TOKEN_SENTINEL) {
            Some(end) => {
                let name = &after[..end];
                match table.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push(TOKEN_SENTINEL);
                        out.push_str(name);
                        out.push(TOKEN_SENTINEL);
                    }
                }
                rest = &after[end + TOKEN_SENTINEL.len_utf8()..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Names of every token a template references.
pub fn tokens(template: &str) -> BTreeSet<&str> {
    template
        .split(TOKEN_SENTINEL)
        .skip(1)
        .step_by(2)
        .collect()
}

/// Substitute `table` into `template`, failing on tokens the table lacks.
pub fn render(template: &Template, table: &Replacements) -> Result<String, GenError> {
    if let Some(missing) = tokens(template.text)
        .into_iter()
        .find(|token| !table.contains_key(token))
    {
        return Err(GenError::MissingTemplateToken {
            template: template.name.to_string(),
            token: missing.to_string(),
        });
    }
    Ok(process_replacement(template.text, table))
}

/// Render one sub-template per item and join the results.
pub fn render_each<'a, T, I>(
    template: &Template,
    items: I,
    config: &GeneratorConfig,
    separator: &str,
) -> Result<String, GenError>
where
    T: ReplacementTable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let rendered = items
        .into_iter()
        .map(|item| render(template, &item.replacements(config)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rendered.join(separator))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn table(pairs: &[(&'static str, &str)]) -> Replacements {
        pairs.iter().map(|(k, v)| (*k, (*v).to_string())).collect()
    }

    #[test]
    fn test_literal_replacement() {
        let out = process_replacement(
            "class ₢exportMacro₢ U₢Name₢ : ₢Name₢Base",
            &table(&[("exportMacro", "GAME_API"), ("Name", "Item")]),
        );
        assert_eq!(out, "class GAME_API UItem : ItemBase");
    }

    #[test]
    fn test_values_are_not_expanded_again() {
        let out = process_replacement("₢A₢ ₢B₢", &table(&[("A", "₢B₢"), ("B", "b")]));
        assert_eq!(out, "₢B₢ b");
    }

    #[test]
    fn test_unknown_and_unterminated_tokens_are_kept() {
        let out = process_replacement("₢Known₢ ₢Unknown₢ tail₢", &table(&[("Known", "k")]));
        assert_eq!(out, "k ₢Unknown₢ tail₢");
    }

    #[test]
    fn test_tokens() {
        let found = tokens("a ₢One₢ b ₢Two₢ c ₢One₢");
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["One", "Two"]);
    }

    #[test]
    fn test_render_reports_missing_token() {
        let template = Template {
            name: "sample",
            text: "₢Present₢ ₢Absent₢",
        };
        let err = render(&template, &table(&[("Present", "x")])).unwrap_err();
        assert!(matches!(
            err,
            GenError::MissingTemplateToken { ref template, ref token } if template == "sample" && token == "Absent"
        ));
    }
}
