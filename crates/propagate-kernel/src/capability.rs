//! Resolved interfaces ("capabilities") and the struct selector that carries
//! the base one.

use crate::goast::TypeExpr;
use crate::model::MethodSig;

/// A resolved interface type with its flattened method set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRef {
    /// Simple (unqualified) name.
    pub name: String,
    /// Name of the declaring package as used in a qualifier.
    pub package_name: String,
    /// Import path of the declaring package.
    pub package_path: String,
    /// Declared in the package being generated into.
    pub is_local: bool,
    /// Method set, ordered by method name.
    pub methods: Vec<MethodSig>,
}

impl CapabilityRef {
    /// The type expression naming this interface from the output package.
    pub fn type_expr(&self) -> TypeExpr {
        if self.is_local {
            TypeExpr::name(&self.name)
        } else {
            TypeExpr::qualified(&self.package_name, &self.name)
        }
    }

    /// `pkg.Name` for external interfaces, `Name` for local ones.
    pub fn display_name(&self) -> String {
        if self.is_local {
            self.name.clone()
        } else {
            format!("{}.{}", self.package_name, self.name)
        }
    }

    /// A local stand-in with the same method set under a different name.
    pub fn aliased(&self, alias: &str, package_name: &str, package_path: &str) -> Self {
        Self {
            name: alias.to_string(),
            package_name: package_name.to_string(),
            package_path: package_path.to_string(),
            is_local: true,
            methods: self.methods.clone(),
        }
    }
}

/// A fully resolved struct selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructSelector {
    pub receiver: String,
    pub pointer_receiver: bool,
    pub struct_name: String,
    pub field_name: String,
    /// Methods already declared on the struct type.
    pub declared_methods: Vec<String>,
    /// The interface type of the selected field.
    pub base: CapabilityRef,
}

impl StructSelector {
    /// `T` or `*T`, as used in receiver position.
    pub fn receiver_type(&self) -> TypeExpr {
        let name = TypeExpr::name(&self.struct_name);
        if self.pointer_receiver {
            TypeExpr::pointer(name)
        } else {
            name
        }
    }

    pub fn declares_method(&self, name: &str) -> bool {
        self.declared_methods.iter().any(|m| m == name)
    }
}
