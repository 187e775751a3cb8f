//! Classification of raw resource names into license and library identifiers.

pub const DEFINE_LICENSE: &str = "define_license_";
pub const DEFINE_INT: &str = "define_int_";
pub const DEFINE_EXT: &str = "define_";

/// Identifiers found among the resource names, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierBuckets {
    pub licenses: Vec<String>,
    pub internal: Vec<String>,
    pub external: Vec<String>,
}

/// Splits resource names into buckets by prefix.
///
/// `define_` is a prefix of the other two, so it must be tried last.
/// Names without a recognized prefix are dropped; duplicates are kept.
pub fn classify<S: AsRef<str>>(fields: &[S]) -> IdentifierBuckets {
    let mut buckets = IdentifierBuckets::default();

    for field in fields {
        let field = field.as_ref();
        if let Some(id) = field.strip_prefix(DEFINE_LICENSE) {
            buckets.licenses.push(id.to_string());
        } else if let Some(id) = field.strip_prefix(DEFINE_INT) {
            buckets.internal.push(id.to_string());
        } else if let Some(id) = field.strip_prefix(DEFINE_EXT) {
            buckets.external.push(id.to_string());
        }
    }

    buckets
}

/// Keeps only the names that can carry a definition.
pub fn definition_fields<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| name.contains(DEFINE_EXT))
        .map(str::to_string)
        .collect()
}
