//! Custom placeholder variables in library and license text.
//!
//! A library may declare variables through its definition resource, e.g.
//! `define_okhttp = "year;owner"`. Each variable's value lives under
//! `library_okhttp_year` and replaces `<<<YEAR>>>` in the text.

use crate::error::Result;
use crate::keys::{DEFINE_EXT, DEFINE_INT};
use crate::resources::ResourceProvider;
use std::collections::BTreeMap;

pub const VARIABLE_DELIMITER: char = ';';

const OPEN: &str = "<<<";
const CLOSE: &str = ">>>";

pub type CustomVariables = BTreeMap<String, String>;

/// Reads the variable manifest for a library and resolves every non-empty value.
pub fn collect_custom_variables(resources: &dyn ResourceProvider, id: &str) -> Result<CustomVariables> {
    let mut variables = CustomVariables::new();

    let mut manifest = resources.string(&format!("{}{}", DEFINE_EXT, id))?;
    if manifest.is_empty() {
        manifest = resources.string(&format!("{}{}", DEFINE_INT, id))?;
    }

    for name in manifest.split(VARIABLE_DELIMITER).filter(|n| !n.is_empty()) {
        let value = resources.string(&format!("library_{}_{}", id, name))?;
        if !value.is_empty() {
            variables.insert(name.to_string(), value);
        }
    }

    Ok(variables)
}

/// Replaces `<<<NAME>>>` tokens, in ascending key order, then removes any
/// placeholder left unresolved and any stray delimiter.
pub fn substitute(text: &str, variables: &CustomVariables) -> String {
    let mut result = text.to_string();

    for (key, value) in variables {
        if value.is_empty() {
            continue;
        }
        let token = format!("{}{}{}", OPEN, key.to_uppercase(), CLOSE);
        result = result.replace(&token, value);
    }

    strip_placeholders(&result)
}

/// Drops whole `<<<NAME>>>` tokens, then any lone delimiter. Text between a
/// `<<<` and `>>>` that is not a placeholder name is kept.
fn strip_placeholders(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        match after_open.find(CLOSE) {
            Some(end) if is_placeholder_name(&after_open[..end]) => {
                out.push_str(&rest[..start]);
                rest = &after_open[end + CLOSE.len()..];
            }
            Some(_) => {
                out.push_str(&rest[..start + OPEN.len()]);
                rest = after_open;
            }
            None => break,
        }
    }
    out.push_str(rest);

    out.replace(OPEN, "").replace(CLOSE, "")
}

fn is_placeholder_name(body: &str) -> bool {
    !body.is_empty() && body.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MapResources;

    fn vars(pairs: &[(&str, &str)]) -> CustomVariables {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_substitute_replaces_uppercase_token() {
        assert_eq!(substitute("<<<FOO>>> bar", &vars(&[("foo", "X")])), "X bar");
    }

    #[test]
    fn test_substitute_strips_unmatched_placeholders() {
        assert_eq!(substitute("<<<FOO>>>", &CustomVariables::new()), "");
        assert_eq!(substitute("Copyright <<<YEAR>>>", &vars(&[("owner", "Jane")])), "Copyright ");
        assert_eq!(substitute("a >>> b <<< c", &CustomVariables::new()), "a  b  c");
    }

    #[test]
    fn test_substitute_keeps_text_between_lone_delimiters() {
        assert_eq!(
            substitute("Shift with a <<< b, then compare x >>> y", &CustomVariables::new()),
            "Shift with a  b, then compare x  y"
        );
        assert_eq!(
            substitute("a <<< b\nc <<<OWNER>>> d >>> e", &CustomVariables::new()),
            "a  b\nc  d  e"
        );
        assert_eq!(substitute("<<<MY_VAR2>>>!", &CustomVariables::new()), "!");
    }

    #[test]
    fn test_substitute_ignores_empty_values_and_lowercase_tokens() {
        let v = vars(&[("year", ""), ("owner", "Jane")]);
        assert_eq!(substitute("<<<year>>> <<<OWNER>>>", &v), " Jane");
    }

    #[test]
    fn test_collect_prefers_external_manifest() {
        let res: MapResources = [
            ("define_lib", "year;owner;"),
            ("define_int_lib", "other"),
            ("library_lib_year", "2015"),
            ("library_lib_owner", ""),
            ("library_lib_other", "nope"),
        ]
        .into_iter()
        .collect();

        let collected = collect_custom_variables(&res, "lib").unwrap();
        assert_eq!(collected, vars(&[("year", "2015")]));
    }

    #[test]
    fn test_collect_falls_back_to_internal_manifest() {
        let res: MapResources = [("define_int_lib", "owner"), ("library_lib_owner", "Jane")]
            .into_iter()
            .collect();

        let collected = collect_custom_variables(&res, "lib").unwrap();
        assert_eq!(collected, vars(&[("owner", "Jane")]));
    }
}
