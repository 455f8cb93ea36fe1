//! # Composite Keys
//!
//! Secondary indexes live in the same key space as primary records. An index
//! entry's key combines a namespace tag with an ordered list of attributes:
//!
//! ```text
//! U+0000 <object_type> U+0000 <attr_0> U+0000 <attr_1> U+0000 ...
//! ```
//!
//! Attributes may not contain `U+0000` (the separator) or `U+10FFFF` (the
//! range-end marker), so the encoding is injective. `0x00` is the smallest
//! byte, so keys sort attribute by attribute and a key built from a leading
//! subset of attributes is a prefix of every key extending it.

use crate::domain::errors::RegistryError;

/// Namespace of the owner → document index.
pub const OWNER_DOCUMENT_INDEX: &str = "owner~document";

/// Value stored under every owner index key. Only its presence matters.
pub const OWNER_INDEX_SENTINEL: &[u8] = &[0x00];

const SEPARATOR: char = '\u{0000}';
const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

/// Build a composite key from a namespace and its attributes.
pub fn create_composite_key(object_type: &str, attributes: &[&str]) -> Result<String, RegistryError> {
    validate_component("objectType", object_type)?;

    let mut key = String::with_capacity(
        2 + object_type.len() + attributes.iter().map(|a| a.len() + 1).sum::<usize>(),
    );
    key.push(SEPARATOR);
    key.push_str(object_type);
    key.push(SEPARATOR);
    for attribute in attributes {
        validate_component("attribute", attribute)?;
        key.push_str(attribute);
        key.push(SEPARATOR);
    }
    Ok(key)
}

/// Split a composite key back into its namespace and attributes.
pub fn split_composite_key(key: &str) -> Result<(String, Vec<String>), RegistryError> {
    let malformed = |reason: &str| RegistryError::MalformedRecord {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let body = key
        .strip_prefix(SEPARATOR)
        .ok_or_else(|| malformed("composite key must start with U+0000"))?;
    let body = body
        .strip_suffix(SEPARATOR)
        .ok_or_else(|| malformed("composite key must end with U+0000"))?;

    let mut parts = body.split(SEPARATOR);
    let object_type = parts
        .next()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| malformed("composite key has no object type"))?;

    Ok((object_type.to_string(), parts.map(str::to_string).collect()))
}

/// Key of the owner index entry for one document.
pub fn build_owner_index_key(owner_id: &str, document_id: &str) -> Result<String, RegistryError> {
    create_composite_key(OWNER_DOCUMENT_INDEX, &[owner_id, document_id])
}

fn validate_component(field: &'static str, value: &str) -> Result<(), RegistryError> {
    if let Some(bad) = value
        .chars()
        .find(|c| *c == SEPARATOR || *c == MAX_UNICODE_RUNE)
    {
        return Err(RegistryError::InvalidArgument {
            field,
            reason: format!("contains reserved character U+{:04X}", bad as u32),
        });
    }
    Ok(())
}
