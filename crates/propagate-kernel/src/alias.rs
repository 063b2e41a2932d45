//! Collision-free local names for propagated interfaces.
//!
//! Every interface ends up as an embedded field of an anonymous struct, and
//! embedded fields are named after their type's simple name, so all simple
//! names in one combination must differ. Interfaces whose simple name is
//! already taken get a local alias:
//!
//! ```go
//! type ifacepropagateIfaceAlias0 interface {
//!     syscall.Conn
//! }
//! ```

use crate::capability::CapabilityRef;
use crate::goast::{Decl, TypeDecl, TypeExpr};
use crate::model::Package;
use std::collections::BTreeSet;
use tracing::debug;

pub const DEFAULT_ALIAS_PREFIX: &str = "ifacepropagateIfaceAlias";

/// One alias introduced for a colliding interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    /// The interface being aliased, as originally resolved.
    pub target: CapabilityRef,
}

impl Alias {
    pub fn decl(&self) -> Decl {
        Decl::Type(TypeDecl {
            name: self.name.clone(),
            ty: TypeExpr::Interface(vec![self.target.type_expr()]),
        })
    }
}

/// Request-scoped table of names already used in the generated scope.
#[derive(Debug, Clone)]
pub struct AliasTable {
    prefix: String,
    used: BTreeSet<String>,
    /// Package-scope names an alias must not shadow.
    reserved: BTreeSet<String>,
}

/// The interface list after aliasing, plus the aliases it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasOutcome {
    pub capabilities: Vec<CapabilityRef>,
    pub aliases: Vec<Alias>,
}

impl AliasTable {
    /// Start a table with the base interface's name already taken.
    pub fn new(prefix: &str, base: &CapabilityRef, package: &Package) -> Self {
        Self {
            prefix: prefix.to_string(),
            used: BTreeSet::from([base.name.clone()]),
            reserved: package.types.iter().map(|t| t.name.clone()).collect(),
        }
    }

    /// Smallest `<prefix><n>` that is neither used nor declared in the package.
    fn next_alias(&self) -> String {
        (0u64..)
            .map(|n| format!("{}{n}", self.prefix))
            .find(|candidate| !self.used.contains(candidate) && !self.reserved.contains(candidate))
            .unwrap_or_else(|| format!("{}_", self.prefix))
    }

    /// Process interfaces in order, aliasing any whose simple name is taken.
    pub fn assign(&mut self, capabilities: Vec<CapabilityRef>, package: &Package) -> AliasOutcome {
        let mut out = Vec::with_capacity(capabilities.len());
        let mut aliases = Vec::new();

        for capability in capabilities {
            if self.used.insert(capability.name.clone()) {
                out.push(capability);
                continue;
            }
            let name = self.next_alias();
            self.used.insert(name.clone());
            debug!(
                interface = %capability.display_name(),
                alias = %name,
                "aliased colliding interface"
            );
            out.push(capability.aliased(&name, &package.name, &package.path));
            aliases.push(Alias {
                name,
                target: capability,
            });
        }

        AliasOutcome {
            capabilities: out,
            aliases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NamedType, Package};

    fn cap(package: &str, name: &str) -> CapabilityRef {
        CapabilityRef {
            name: name.to_string(),
            package_name: package.rsplit('/').next().unwrap_or(package).to_string(),
            package_path: package.to_string(),
            is_local: false,
            methods: Vec::new(),
        }
    }

    fn pkg() -> Package {
        Package::new("example.com/example", "example")
    }

    #[test]
    fn distinct_names_pass_through() {
        let package = pkg();
        let base = cap("net", "Conn");
        let mut table = AliasTable::new(DEFAULT_ALIAS_PREFIX, &base, &package);
        let outcome = table.assign(vec![cap("io", "ReaderFrom"), cap("io", "Closer")], &package);
        assert!(outcome.aliases.is_empty());
        assert_eq!(outcome.capabilities[0].display_name(), "io.ReaderFrom");

        let later = table.assign(vec![cap("example.com/other", "Closer")], &package);
        assert_eq!(later.aliases.len(), 1);
        assert_eq!(later.aliases[0].target.display_name(), "other.Closer");
    }

    #[test]
    fn collision_with_base_gets_alias() {
        let package = pkg();
        let base = cap("net", "Conn");
        let mut table = AliasTable::new(DEFAULT_ALIAS_PREFIX, &base, &package);
        let outcome = table.assign(vec![cap("io", "ReaderFrom"), cap("syscall", "Conn")], &package);

        assert_eq!(outcome.aliases.len(), 1);
        let alias = &outcome.aliases[0];
        assert_eq!(alias.name, "ifacepropagateIfaceAlias0");
        assert_eq!(alias.target.display_name(), "syscall.Conn");

        let replaced = &outcome.capabilities[1];
        assert!(replaced.is_local);
        assert_eq!(replaced.display_name(), "ifacepropagateIfaceAlias0");
    }

    #[test]
    fn aliases_are_numbered_monotonically() {
        let package = pkg();
        let base = cap("net", "Conn");
        let mut table = AliasTable::new("alias", &base, &package);
        let outcome = table.assign(
            vec![cap("a", "Conn"), cap("b", "Conn"), cap("c", "Conn")],
            &package,
        );
        let names: Vec<&str> = outcome.aliases.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["alias0", "alias1", "alias2"]);
    }

    #[test]
    fn alias_skips_names_declared_in_package() {
        let package = pkg().with_type(NamedType::other("alias0"));
        let base = cap("net", "Conn");
        let mut table = AliasTable::new("alias", &base, &package);
        let outcome = table.assign(vec![cap("syscall", "Conn")], &package);
        assert_eq!(outcome.aliases[0].name, "alias1");
    }

    #[test]
    fn tables_do_not_share_state() {
        let package = pkg();
        let base = cap("net", "Conn");
        let mut first = AliasTable::new("alias", &base, &package);
        first.assign(vec![cap("syscall", "Conn")], &package);
        let mut second = AliasTable::new("alias", &base, &package);
        let outcome = second.assign(vec![cap("syscall", "Conn")], &package);
        assert_eq!(outcome.aliases[0].name, "alias0");
    }
}
