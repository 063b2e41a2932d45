//! Assembly of the output file.

use crate::capability::CapabilityRef;
use crate::error::GenerateError;
use crate::goast::printer::print_file;
use crate::goast::{Decl, File, Import};
use crate::model::Package;
use std::collections::{BTreeMap, BTreeSet};

/// The name a package gets when imported without an explicit name.
pub fn default_import_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Imports for the generated file, sorted by path.
///
/// Interfaces contribute their package with its known name; signature
/// imports contribute bare paths. The output package itself is never
/// imported.
pub fn collect_imports<'a>(
    package: &Package,
    capabilities: impl IntoIterator<Item = &'a CapabilityRef>,
    signature_paths: impl IntoIterator<Item = &'a str>,
) -> Vec<Import> {
    let mut paths: BTreeMap<String, Option<String>> = BTreeMap::new();
    for capability in capabilities {
        if capability.is_local || package.is_path(&capability.package_path) {
            continue;
        }
        paths.insert(
            capability.package_path.clone(),
            Some(capability.package_name.clone()),
        );
    }
    for path in signature_paths {
        if package.is_path(path) {
            continue;
        }
        paths.entry(path.to_string()).or_insert(None);
    }

    paths
        .into_iter()
        .map(|(path, name)| {
            let name = name.filter(|name| name != default_import_name(&path));
            Import { path, name }
        })
        .collect()
}

/// Assembles declarations into a file and renders it.
#[derive(Debug, Clone)]
pub struct Emitter {
    header: Option<String>,
}

impl Emitter {
    pub fn new(header: Option<String>) -> Self {
        Self { header }
    }

    pub fn emit(
        &self,
        package: &Package,
        imports: Vec<Import>,
        decls: Vec<Decl>,
    ) -> Result<String, GenerateError> {
        check_unique_methods(&decls)?;
        let file = File {
            header: self.header.clone(),
            package: package.name.clone(),
            imports,
            decls,
        };
        print_file(&file)
    }
}

/// Two methods with the same name on one receiver type never compile.
fn check_unique_methods(decls: &[Decl]) -> Result<(), GenerateError> {
    let mut seen = BTreeSet::new();
    for decl in decls {
        let Decl::Func(func) = decl else {
            continue;
        };
        if func.receiver.is_some() && !seen.insert(func.name.as_str()) {
            return Err(GenerateError::emission(format!(
                "method {:?} would be declared twice",
                func.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(path: &str, name: &str, package_name: &str) -> CapabilityRef {
        CapabilityRef {
            name: name.to_string(),
            package_name: package_name.to_string(),
            package_path: path.to_string(),
            is_local: false,
            methods: Vec::new(),
        }
    }

    #[test]
    fn imports_are_sorted_deduplicated_and_named_when_needed() {
        let package = Package::new("example.com/example", "example");
        let caps = [
            cap("net", "Conn", "net"),
            cap("io", "ReaderFrom", "io"),
            cap("gopkg.in/yaml.v2", "Marshaler", "yaml"),
            cap("io", "WriterTo", "io"),
        ];
        let imports = collect_imports(&package, caps.iter(), ["io", "example.com/example", "time"]);
        let rendered: Vec<(String, Option<String>)> = imports
            .into_iter()
            .map(|i| (i.path, i.name))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("gopkg.in/yaml.v2".to_string(), Some("yaml".to_string())),
                ("io".to_string(), None),
                ("net".to_string(), None),
                ("time".to_string(), None),
            ]
        );
    }

    #[test]
    fn duplicate_method_is_an_emission_error() {
        use crate::goast::{FuncDecl, Receiver, TypeExpr};
        let method = FuncDecl {
            receiver: Some(Receiver {
                name: "w".to_string(),
                ty: TypeExpr::name("wrapper"),
            }),
            name: "Close".to_string(),
            params: Vec::new(),
            results: Vec::new(),
            variadic: false,
            body: Vec::new(),
        };
        let package = Package::new("example.com/example", "example");
        let err = Emitter::new(None)
            .emit(
                &package,
                Vec::new(),
                vec![Decl::Func(method.clone()), Decl::Func(method)],
            )
            .unwrap_err();
        assert!(matches!(err, GenerateError::Emission(_)));
    }
}
