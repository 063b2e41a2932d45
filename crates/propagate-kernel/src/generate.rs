//! The generation pipeline.
//!
//! Selector parsing → struct and interface resolution → aliasing →
//! dispatch table → forwarders → emission. Each stage runs once over the
//! complete output of the previous one; all request state (loaded packages,
//! used names) lives in values created here and dropped on return.

use crate::alias::{Alias, AliasOutcome, AliasTable, DEFAULT_ALIAS_PREFIX};
use crate::capability::{CapabilityRef, StructSelector};
use crate::emit::{Emitter, collect_imports};
use crate::error::GenerateError;
use crate::forward::{ShadowedMethod, plan_forwarders};
use crate::goast::Decl;
use crate::loader::PackageLoader;
use crate::matrix::{DispatchTable, presence_flag};
use crate::model::Package;
use crate::resolve::Resolver;
use crate::selector::SelectorSpec;
use serde::{Deserialize, Serialize};
use std::iter;
use tracing::{debug, info};

pub const DEFAULT_DISPATCH_NAME: &str = "propagateInterfaces";
pub const GENERATED_HEADER: &str = "Code generated by ifacepropagate. DO NOT EDIT.";

/// Knobs for one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    /// Name of the generated dispatch method.
    pub dispatch_name: String,
    /// Prefix of synthetic interface aliases.
    pub alias_prefix: String,
    /// Emit the `Code generated ... DO NOT EDIT.` header.
    pub header: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            dispatch_name: DEFAULT_DISPATCH_NAME.to_string(),
            alias_prefix: DEFAULT_ALIAS_PREFIX.to_string(),
            header: true,
        }
    }
}

/// Generated source plus a summary of what went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub source: String,
    /// The base interface, as written in the output.
    pub base: String,
    /// Optional interfaces after aliasing, in input order.
    pub capabilities: Vec<String>,
    pub aliases: Vec<Alias>,
    /// Conditioned dispatch cases (the `default` case excluded).
    pub branches: usize,
    pub forwarded: Vec<String>,
    pub overridden: Vec<String>,
    pub shadowed: Vec<ShadowedMethod>,
}

/// Generate a dispatch method on the struct named by `struct_selector` that
/// propagates `interfaces` from its embedded interface field.
///
/// `package` is the package generated into; `loader` supplies any other
/// package an interface reference needs.
pub fn propagate_interfaces<S: AsRef<str>>(
    package: &Package,
    loader: &dyn PackageLoader,
    struct_selector: &str,
    interfaces: &[S],
    options: &GenerateOptions,
) -> Result<Generated, GenerateError> {
    let spec = SelectorSpec::parse(struct_selector)?;
    let mut resolver = Resolver::new(package, loader);
    let selector = resolver.resolve_struct(&spec)?;
    let optional = interfaces
        .iter()
        .map(|iface| resolver.resolve_capability(iface.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut names = AliasTable::new(&options.alias_prefix, &selector.base, package);
    let AliasOutcome {
        capabilities,
        aliases,
    } = names.assign(optional.clone(), package);

    check_receiver_name(&selector, &capabilities)?;
    let dispatch = DispatchTable::build(&selector, &capabilities)?;
    let branches = dispatch.branches.len();
    debug!(branches, "built dispatch table");

    let plan = plan_forwarders(&selector, &capabilities);
    debug!(
        forwarded = plan.forwarders.len(),
        overridden = plan.overridden.len(),
        "planned forwarding methods"
    );

    let imports = collect_imports(
        package,
        iter::once(&selector.base).chain(optional.iter()),
        plan.forwarders
            .iter()
            .flat_map(|f| f.imports.iter().map(String::as_str)),
    );

    let mut decls: Vec<Decl> = aliases.iter().map(Alias::decl).collect();
    decls.push(Decl::Func(dispatch.into_func(&selector, &options.dispatch_name)));
    decls.extend(plan.forwarders.iter().map(|f| Decl::Func(f.decl.clone())));

    if selector.declares_method(&options.dispatch_name) {
        return Err(GenerateError::emission(format!(
            "{:?} already declares a method named {:?}",
            selector.struct_name, options.dispatch_name
        )));
    }

    let header = options.header.then(|| GENERATED_HEADER.to_string());
    let source = Emitter::new(header).emit(package, imports, decls)?;

    info!(
        package = %package.path,
        wrapper = %selector.struct_name,
        interfaces = capabilities.len(),
        aliases = aliases.len(),
        "generated interface propagation"
    );

    Ok(Generated {
        source,
        base: selector.base.display_name(),
        capabilities: capabilities.iter().map(|c| c.display_name()).collect(),
        aliases,
        branches,
        forwarded: plan.forwarders.iter().map(|f| f.method.clone()).collect(),
        overridden: plan.overridden,
        shadowed: plan.shadowed,
    })
}

/// The receiver is in scope in every generated body, so it must not hide any
/// other name those bodies refer to.
fn check_receiver_name(
    selector: &StructSelector,
    capabilities: &[CapabilityRef],
) -> Result<(), GenerateError> {
    let receiver = selector.receiver.as_str();
    let qualifier = iter::once(&selector.base)
        .chain(capabilities)
        .find(|c| !c.is_local && c.package_name == receiver);
    if let Some(capability) = qualifier {
        return Err(GenerateError::emission(format!(
            "receiver {receiver:?} shadows the package qualifier of {}",
            capability.display_name()
        )));
    }
    let is_flag = (0..capabilities.len()).any(|i| presence_flag(i) == receiver);
    if is_flag || receiver == "panic" || (receiver == "true" && capabilities.is_empty()) {
        return Err(GenerateError::emission(format!(
            "receiver {receiver:?} shadows a name used by {:?}'s generated methods",
            selector.struct_name
        )));
    }
    Ok(())
}
