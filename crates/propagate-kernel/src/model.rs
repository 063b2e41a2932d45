//! Package metadata model.
//!
//! This is the shape in which a metadata provider hands over the types of one
//! Go package. Only what generation needs is modelled: named structs with
//! their fields, named interfaces with their method signatures, and the names
//! of methods already declared on each named type.
//!
//! Type references inside metadata (struct field types, embedded interfaces)
//! are written `[<package path>.]<Name>`. A reference without a package path
//! names a type of the declaring package. Method signature types are Go type
//! text exactly as it should appear in generated code, so they are written
//! with package *names* (`io.Reader`) and list the package paths they need in
//! [`MethodSig::imports`].

use serde::{Deserialize, Serialize};

/// Type metadata for a single package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Import path, e.g. `net/http`.
    pub path: String,
    /// Package name as used in a `package` clause.
    pub name: String,
    #[serde(default)]
    pub types: Vec<NamedType>,
}

impl Package {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Builder-style helper for assembling metadata in code.
    pub fn with_type(mut self, named: NamedType) -> Self {
        self.types.push(named);
        self
    }

    /// Look up a package-scope type by name.
    pub fn lookup(&self, name: &str) -> Option<&NamedType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Whether `path` refers to this package.
    pub fn is_path(&self, path: &str) -> bool {
        self.path == path
    }
}

/// A named package-scope type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NamedType {
    pub name: String,
    #[serde(flatten)]
    pub kind: TypeKind,
    /// Methods declared directly on this type (either receiver form).
    #[serde(default)]
    pub declared_methods: Vec<String>,
}

impl NamedType {
    pub fn interface(name: impl Into<String>, iface: InterfaceType) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Interface(iface),
            declared_methods: Vec::new(),
        }
    }

    pub fn structure(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Struct(StructType { fields }),
            declared_methods: Vec::new(),
        }
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Other,
            declared_methods: Vec::new(),
        }
    }

    pub fn with_declared_methods<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared_methods
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn declares_method(&self, name: &str) -> bool {
        self.declared_methods.iter().any(|m| m == name)
    }

    pub fn as_interface(&self) -> Option<&InterfaceType> {
        match &self.kind {
            TypeKind::Interface(iface) => Some(iface),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match &self.kind {
            TypeKind::Struct(st) => Some(st),
            _ => None,
        }
    }
}

/// The underlying kind of a named type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    Struct(StructType),
    Interface(InterfaceType),
    /// Any other named type. Never a capability.
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StructType {
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// One struct field. Embedded fields carry no explicit name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub embedded: bool,
}

impl Field {
    pub fn named(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ty: ty.into(),
            embedded: false,
        }
    }

    pub fn embedded(ty: impl Into<String>) -> Self {
        Self {
            name: None,
            ty: ty.into(),
            embedded: true,
        }
    }

    /// The name the field is selected by. For an embedded field that is the
    /// simple name of its type, pointer marker stripped.
    pub fn field_name(&self) -> Option<&str> {
        if let Some(name) = self.name.as_deref() {
            return Some(name);
        }
        let ty = self.ty.trim().trim_start_matches('*');
        TypeRef::parse(ty)?;
        ty.rsplit('.').next()
    }

    /// The named type an embedded field points through, if any.
    pub fn embedded_ref(&self) -> Option<TypeRef> {
        if !self.embedded {
            return None;
        }
        TypeRef::parse(self.ty.trim_start_matches('*'))
    }
}

/// A named interface: declared methods plus embedded interfaces.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceType {
    #[serde(default)]
    pub methods: Vec<MethodSig>,
    #[serde(default)]
    pub embeds: Vec<String>,
}

impl InterfaceType {
    pub fn new(methods: Vec<MethodSig>) -> Self {
        Self {
            methods,
            embeds: Vec::new(),
        }
    }

    pub fn embedding<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.embeds.extend(refs.into_iter().map(Into::into));
        self
    }
}

/// A method signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MethodSig {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub results: Vec<Param>,
    /// The final parameter is variadic; its `ty` is the element type.
    #[serde(default)]
    pub variadic: bool,
    /// Package paths referenced by the parameter and result types.
    #[serde(default)]
    pub imports: Vec<String>,
}

impl MethodSig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            results: Vec::new(),
            variadic: false,
            imports: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.params.push(Param::named(name, ty));
        self
    }

    pub fn unnamed_param(mut self, ty: impl Into<String>) -> Self {
        self.params.push(Param::unnamed(ty));
        self
    }

    pub fn result(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.results.push(Param::named(name, ty));
        self
    }

    pub fn unnamed_result(mut self, ty: impl Into<String>) -> Self {
        self.results.push(Param::unnamed(ty));
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn import(mut self, path: impl Into<String>) -> Self {
        self.imports.push(path.into());
        self
    }

    /// Two signatures are compatible when their parameter and result types
    /// line up; names are irrelevant.
    pub fn same_shape(&self, other: &MethodSig) -> bool {
        fn types(params: &[Param]) -> Vec<&str> {
            params.iter().map(|p| p.ty.trim()).collect()
        }
        self.variadic == other.variadic
            && types(&self.params) == types(&other.params)
            && types(&self.results) == types(&other.results)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
}

impl Param {
    pub fn named(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ty: ty.into(),
        }
    }

    pub fn unnamed(ty: impl Into<String>) -> Self {
        Self {
            name: None,
            ty: ty.into(),
        }
    }
}

/// A reference to a named type: `[<package path>.]<Name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeRef {
    pub package: Option<String>,
    pub name: String,
}

impl TypeRef {
    /// Parse a named type reference. Returns `None` for anything that is not
    /// a plain (optionally package-qualified) type name, e.g. `*T`, `[]T`,
    /// `map[K]V`.
    pub fn parse(text: &str) -> Option<TypeRef> {
        let text = text.trim();
        let (package, name) = match text.rsplit_once('.') {
            Some((package, name)) => (Some(package), name),
            None => (None, text),
        };
        if !crate::goast::syntax::is_identifier(name) {
            return None;
        }
        if let Some(package) = package {
            let valid_path = !package.is_empty()
                && !package
                    .chars()
                    .any(|c| c.is_whitespace() || "*[](){}\"'`,".contains(c));
            if !valid_path {
                return None;
            }
        }
        Some(TypeRef {
            package: package.map(str::to_string),
            name: name.to_string(),
        })
    }

    /// Whether this reference resolves inside the package with `path`.
    pub fn is_local_to(&self, path: &str) -> bool {
        match &self.package {
            None => true,
            Some(package) => package == path,
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.package {
            Some(package) => write!(f, "{package}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
