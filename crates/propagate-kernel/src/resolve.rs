//! Capability resolution against package metadata.

use crate::capability::{CapabilityRef, StructSelector};
use crate::error::GenerateError;
use crate::loader::PackageLoader;
use crate::model::{InterfaceType, MethodSig, NamedType, Package, StructType, TypeRef};
use crate::selector::{CapabilityPath, SelectorSpec};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use tracing::debug;

/// Resolves selectors and interface references for one generation request.
///
/// External packages are loaded at most once per resolver.
pub struct Resolver<'a> {
    current: Rc<Package>,
    loader: &'a dyn PackageLoader,
    loaded: BTreeMap<String, Rc<Package>>,
}

impl<'a> Resolver<'a> {
    pub fn new(current: &Package, loader: &'a dyn PackageLoader) -> Self {
        Self {
            current: Rc::new(current.clone()),
            loader,
            loaded: BTreeMap::new(),
        }
    }

    fn package(&mut self, path: &str) -> Result<Rc<Package>, GenerateError> {
        if self.current.is_path(path) {
            return Ok(Rc::clone(&self.current));
        }
        if let Some(package) = self.loaded.get(path) {
            return Ok(Rc::clone(package));
        }
        let package = self.loader.load(path)?;
        debug!(path, name = %package.name, "loaded package metadata");
        let package = Rc::new(package);
        self.loaded.insert(path.to_string(), Rc::clone(&package));
        Ok(package)
    }

    /// Package a type reference written inside `owner` points into.
    fn package_for(&mut self, owner: &Rc<Package>, r: &TypeRef) -> Result<Rc<Package>, GenerateError> {
        match &r.package {
            None => Ok(Rc::clone(owner)),
            Some(path) if owner.is_path(path) => Ok(Rc::clone(owner)),
            Some(path) => self.package(path),
        }
    }

    /// Resolve `["<package>."]<Name>` to an interface.
    pub fn resolve_capability(&mut self, text: &str) -> Result<CapabilityRef, GenerateError> {
        let path = CapabilityPath::parse(text)?;
        let package = match &path.package {
            None => Rc::clone(&self.current),
            Some(pkg) => self.package(pkg)?,
        };
        let Some(named) = package.lookup(&path.name) else {
            return Err(GenerateError::resolution(format!(
                "no interface named {:?} in package {:?}",
                path.name, package.path
            )));
        };
        let Some(iface) = named.as_interface() else {
            return Err(GenerateError::resolution(format!(
                "{:?} in package {:?} is not an interface",
                path.name, package.path
            )));
        };
        let capability = self.capability(&package, named, iface)?;
        debug!(
            capability = %capability.display_name(),
            methods = capability.methods.len(),
            "resolved interface"
        );
        Ok(capability)
    }

    /// Resolve a parsed struct selector: the struct, the member (including
    /// promoted members), and the member's interface type.
    pub fn resolve_struct(&mut self, spec: &SelectorSpec) -> Result<StructSelector, GenerateError> {
        let current = Rc::clone(&self.current);
        let Some(named) = current.lookup(&spec.struct_name) else {
            return Err(GenerateError::resolution(format!(
                "could not find any struct named {:?} in package {:?}",
                spec.struct_name, current.name
            )));
        };
        let Some(st) = named.as_struct() else {
            return Err(GenerateError::resolution(format!(
                "{:?} in package {:?} is not a struct",
                spec.struct_name, current.name
            )));
        };

        // Methods declared on the struct sit at depth 0 and hide promoted fields.
        if named.declares_method(&spec.field_name) {
            return Err(GenerateError::resolution(format!(
                "'{}.{}' in package {:?} is a method, not a field",
                spec.struct_name, spec.field_name, current.name
            )));
        }
        let Some(field_ty) = find_member(&current, st, &spec.field_name)? else {
            return Err(GenerateError::resolution(format!(
                "struct {:?} in package {:?} had no member {:?}",
                spec.struct_name, current.name, spec.field_name
            )));
        };

        let not_interface = || {
            GenerateError::resolution(format!(
                "'{}.{}' in package {:?} was not an interface",
                spec.struct_name, spec.field_name, current.name
            ))
        };
        let type_ref = TypeRef::parse(&field_ty).ok_or_else(not_interface)?;
        let package = self.package_for(&current, &type_ref)?;
        let field_named = package.lookup(&type_ref.name).ok_or_else(|| {
            GenerateError::resolution(format!(
                "type {type_ref} of '{}.{}' not found",
                spec.struct_name, spec.field_name
            ))
        })?;
        let iface = field_named.as_interface().ok_or_else(not_interface)?;
        let base = self.capability(&package, field_named, iface)?;
        debug!(
            selector = %format!("{}.{}", spec.struct_name, spec.field_name),
            base = %base.display_name(),
            "resolved struct selector"
        );

        Ok(StructSelector {
            receiver: spec.receiver.clone(),
            pointer_receiver: spec.pointer_receiver,
            struct_name: spec.struct_name.clone(),
            field_name: spec.field_name.clone(),
            declared_methods: named.declared_methods.clone(),
            base,
        })
    }

    fn capability(
        &mut self,
        package: &Rc<Package>,
        named: &NamedType,
        iface: &InterfaceType,
    ) -> Result<CapabilityRef, GenerateError> {
        let mut methods = BTreeMap::new();
        let mut visited = BTreeSet::new();
        visited.insert((package.path.clone(), named.name.clone()));
        self.flatten(package, iface, &mut methods, &mut visited)?;
        Ok(CapabilityRef {
            name: named.name.clone(),
            package_name: package.name.clone(),
            package_path: package.path.clone(),
            is_local: self.current.is_path(&package.path),
            methods: methods.into_values().collect(),
        })
    }

    /// Collect the method set of `iface`, following embedded interfaces.
    /// Directly declared methods win over embedded ones of the same name.
    fn flatten(
        &mut self,
        package: &Rc<Package>,
        iface: &InterfaceType,
        methods: &mut BTreeMap<String, MethodSig>,
        visited: &mut BTreeSet<(String, String)>,
    ) -> Result<(), GenerateError> {
        for method in &iface.methods {
            methods
                .entry(method.name.clone())
                .or_insert_with(|| method.clone());
        }
        for embed in &iface.embeds {
            let Some(r) = TypeRef::parse(embed) else {
                return Err(GenerateError::resolution(format!(
                    "embedded interface reference {embed:?} in package {:?} is not a type name",
                    package.path
                )));
            };
            let owner = self.package_for(package, &r)?;
            if !visited.insert((owner.path.clone(), r.name.clone())) {
                continue;
            }
            let embedded = owner
                .lookup(&r.name)
                .and_then(NamedType::as_interface)
                .ok_or_else(|| {
                    GenerateError::resolution(format!(
                        "embedded {embed:?} in package {:?} is not an interface",
                        package.path
                    ))
                })?
                .clone();
            self.flatten(&owner, &embedded, methods, visited)?;
        }
        Ok(())
    }
}

/// Find a field by name, searching promoted fields of embedded structs of the
/// same package breadth first. Returns the field's type text.
///
/// Two matches at the same depth are ambiguous and reported as an error.
fn find_member(
    package: &Package,
    root: &StructType,
    name: &str,
) -> Result<Option<String>, GenerateError> {
    let mut level: Vec<&StructType> = vec![root];
    let mut seen: BTreeSet<String> = BTreeSet::new();

    while !level.is_empty() {
        let matches: Vec<&str> = level
            .iter()
            .flat_map(|st| st.fields.iter())
            .filter(|field| field.field_name() == Some(name))
            .map(|field| field.ty.as_str())
            .collect();
        match matches.as_slice() {
            [ty] => return Ok(Some(ty.to_string())),
            [] => {}
            _ => {
                return Err(GenerateError::resolution(format!(
                    "member {name:?} is ambiguous: promoted from {} embedded fields at the same depth",
                    matches.len()
                )));
            }
        }

        let mut next = Vec::new();
        for st in &level {
            for field in &st.fields {
                let Some(r) = field.embedded_ref() else {
                    continue;
                };
                if !r.is_local_to(&package.path) || !seen.insert(r.name.clone()) {
                    continue;
                }
                if let Some(inner) = package.lookup(&r.name).and_then(NamedType::as_struct) {
                    next.push(inner);
                }
            }
        }
        level = next;
    }
    Ok(None)
}
