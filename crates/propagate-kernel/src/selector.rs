//! Textual selectors: which field of which struct holds the base interface,
//! and which interfaces to propagate.

use crate::error::GenerateError;
use crate::goast::syntax::is_identifier;

/// A parsed `"<receiver> [*]<StructName>.<FieldName>"` selector.
///
/// Resolution against package metadata happens later, in
/// [`Resolver::resolve_struct`](crate::resolve::Resolver::resolve_struct).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSpec {
    pub receiver: String,
    pub pointer_receiver: bool,
    pub struct_name: String,
    pub field_name: String,
}

impl SelectorSpec {
    pub fn parse(text: &str) -> Result<Self, GenerateError> {
        let Some((receiver, rest)) = text.split_once(' ') else {
            return Err(GenerateError::malformed(format!(
                "struct selector {text:?} must contain a space after the receiver name"
            )));
        };
        let rest = rest.trim();
        let (pointer_receiver, rest) = match rest.strip_prefix('*') {
            Some(stripped) => (true, stripped),
            None => (false, rest),
        };
        let Some((struct_name, field_name)) = rest.split_once('.') else {
            return Err(GenerateError::malformed(format!(
                "the struct selector must be of the form 'structName.Field', but {rest:?} did not have a dot"
            )));
        };

        if receiver.is_empty() || receiver == "_" || !is_identifier(receiver) {
            return Err(GenerateError::malformed(format!(
                "receiver name {receiver:?} is not a usable identifier"
            )));
        }
        if struct_name.is_empty() {
            return Err(GenerateError::malformed(format!(
                "struct selector {text:?} has an empty struct name"
            )));
        }
        if field_name.is_empty() {
            return Err(GenerateError::malformed(format!(
                "struct selector {text:?} has an empty field name"
            )));
        }

        Ok(Self {
            receiver: receiver.to_string(),
            pointer_receiver,
            struct_name: struct_name.to_string(),
            field_name: field_name.to_string(),
        })
    }
}

/// A parsed `["<package>."]<Name>` interface reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityPath {
    pub package: Option<String>,
    pub name: String,
}

impl CapabilityPath {
    /// Split on the last dot: package paths may contain dots, names never do.
    pub fn parse(text: &str) -> Result<Self, GenerateError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerateError::malformed("empty interface reference"));
        }
        let (package, name) = match text.rsplit_once('.') {
            Some((package, name)) => (Some(package), name),
            None => (None, text),
        };
        if name.is_empty() {
            return Err(GenerateError::malformed(format!(
                "interface reference {text:?} has an empty name"
            )));
        }
        if package.is_some_and(str::is_empty) {
            return Err(GenerateError::malformed(format!(
                "interface reference {text:?} has an empty package"
            )));
        }
        Ok(Self {
            package: package.map(str::to_string),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for CapabilityPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.package {
            Some(package) => write!(f, "{package}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Split a comma separated interface list, dropping surrounding whitespace.
///
/// An empty list (or one made only of separators) yields no references.
pub fn split_capability_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
