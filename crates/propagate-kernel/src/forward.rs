//! Forwarding methods.
//!
//! Every struct a dispatch case returns is initialised with the receiver for
//! each embedded interface, so the receiver's type must itself implement
//! every optional interface. For each method of the optional interfaces we
//! emit a method on the struct type that asserts the embedded field to the
//! owning interface and calls through:
//!
//! ```go
//! func (l *closeLoggedConn) ReadFrom(r io.Reader) (n int64, err error) {
//!     return l.Conn.(io.ReaderFrom).ReadFrom(r)
//! }
//! ```
//!
//! The assertion only succeeds when the caller uses the value the dispatch
//! function returned; calling a forwarder on a wrapper whose field lacks the
//! interface panics in the generated program.

use crate::capability::{CapabilityRef, StructSelector};
use crate::goast::{Expr, Field, FuncDecl, Receiver, Stmt, TypeExpr};
use crate::model::{MethodSig, Param};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// A generated forwarding method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forwarder {
    pub method: String,
    /// Display name of the (possibly aliased) interface asserted to.
    pub capability: String,
    pub decl: FuncDecl,
    /// Package paths the signature's types need.
    pub imports: Vec<String>,
}

/// A method name declared by more than one optional interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowedMethod {
    pub method: String,
    /// The interface whose declaration was forwarded.
    pub kept: String,
    /// The later interface whose declaration was skipped.
    pub dropped: String,
    /// Whether the two signatures have the same parameter and result types.
    pub compatible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardPlan {
    pub forwarders: Vec<Forwarder>,
    /// Methods the struct already declares; it keeps its own implementation.
    pub overridden: Vec<String>,
    pub shadowed: Vec<ShadowedMethod>,
}

/// Plan one forwarder per unique method name across `capabilities`.
///
/// The first interface (in input order) to declare a name wins. Later
/// declarations are skipped even when their signatures differ; such a
/// conflict only surfaces when the generated code is compiled.
pub fn plan_forwarders(selector: &StructSelector, capabilities: &[CapabilityRef]) -> ForwardPlan {
    let mut plan = ForwardPlan::default();
    let mut claimed: BTreeMap<&str, (&CapabilityRef, &MethodSig)> = BTreeMap::new();
    let mut overridden = BTreeSet::new();

    for capability in capabilities {
        for method in &capability.methods {
            if selector.declares_method(&method.name) {
                if overridden.insert(method.name.clone()) {
                    debug!(
                        method = %method.name,
                        on = %selector.struct_name,
                        "method already declared, not forwarding"
                    );
                    plan.overridden.push(method.name.clone());
                }
                continue;
            }
            if let Some((owner, first)) = claimed.get(method.name.as_str()) {
                let compatible = first.same_shape(method);
                if !compatible {
                    warn!(
                        method = %method.name,
                        kept = %owner.display_name(),
                        dropped = %capability.display_name(),
                        "method declared with different signatures; forwarding the first"
                    );
                }
                plan.shadowed.push(ShadowedMethod {
                    method: method.name.clone(),
                    kept: owner.display_name(),
                    dropped: capability.display_name(),
                    compatible,
                });
                continue;
            }
            claimed.insert(&method.name, (capability, method));
            plan.forwarders.push(Forwarder {
                method: method.name.clone(),
                capability: capability.display_name(),
                decl: forwarder(selector, capability, method),
                imports: method.imports.clone(),
            });
        }
    }
    plan
}

fn forwarder(selector: &StructSelector, capability: &CapabilityRef, method: &MethodSig) -> FuncDecl {
    // The body names the receiver and, for an imported interface, its package.
    let mut taken = BTreeSet::from([selector.receiver.clone()]);
    if !capability.is_local {
        taken.insert(capability.package_name.clone());
    }

    let params: Vec<Field> = method
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let base = match param.name.as_deref() {
                Some(name) if !name.is_empty() && name != "_" => name.to_string(),
                _ => format!("p{i}"),
            };
            let name = unique_name(&base, &taken);
            taken.insert(name.clone());
            Field {
                name: Some(name),
                ty: TypeExpr::verbatim(&param.ty),
            }
        })
        .collect();

    let args: Vec<Expr> = params
        .iter()
        .filter_map(|p| p.name.as_deref())
        .map(Expr::ident)
        .collect();

    let call = Expr::ident(&selector.receiver)
        .select(&selector.field_name)
        .assert(capability.type_expr())
        .select(&method.name);
    let call = if method.variadic && !args.is_empty() {
        call.call_spread(args)
    } else {
        call.call(args)
    };

    let body = if method.results.is_empty() {
        vec![Stmt::Expr(call)]
    } else {
        vec![Stmt::Return(vec![call])]
    };

    FuncDecl {
        receiver: Some(Receiver {
            name: selector.receiver.clone(),
            ty: selector.receiver_type(),
        }),
        name: method.name.clone(),
        params,
        results: result_fields(&method.results, &taken),
        variadic: method.variadic && !method.params.is_empty(),
        body,
    }
}

/// Results keep their names only if every one is named and none clashes
/// with the receiver, a parameter, or another result.
fn result_fields(results: &[Param], taken: &BTreeSet<String>) -> Vec<Field> {
    let mut seen = BTreeSet::new();
    let keep_names = results.iter().all(|r| match r.name.as_deref() {
        Some("_") => true,
        Some(name) if !name.is_empty() => !taken.contains(name) && seen.insert(name),
        _ => false,
    });
    results
        .iter()
        .map(|r| Field {
            name: if keep_names { r.name.clone() } else { None },
            ty: TypeExpr::verbatim(&r.ty),
        })
        .collect()
}

fn unique_name(base: &str, taken: &BTreeSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (1u64..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| format!("{base}_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goast::Decl;
    use crate::goast::printer::print_decl;

    fn selector(receiver: &str, declared: &[&str]) -> StructSelector {
        StructSelector {
            receiver: receiver.to_string(),
            pointer_receiver: true,
            struct_name: "wrapper".to_string(),
            field_name: "Inner".to_string(),
            declared_methods: declared.iter().map(|s| s.to_string()).collect(),
            base: local_cap("Inner", Vec::new()),
        }
    }

    fn local_cap(name: &str, methods: Vec<MethodSig>) -> CapabilityRef {
        CapabilityRef {
            name: name.to_string(),
            package_name: "wrap".to_string(),
            package_path: "example.com/wrap".to_string(),
            is_local: true,
            methods,
        }
    }

    fn printed(plan: &ForwardPlan, method: &str) -> String {
        let forwarder = plan
            .forwarders
            .iter()
            .find(|f| f.method == method)
            .unwrap_or_else(|| panic!("no forwarder for {method}"));
        print_decl(&Decl::Func(forwarder.decl.clone())).expect("should print")
    }

    fn method_names(plan: &ForwardPlan) -> Vec<&str> {
        plan.forwarders.iter().map(|f| f.method.as_str()).collect()
    }

    #[test]
    fn first_interface_wins_on_duplicate_names() {
        let a = local_cap("A", vec![MethodSig::new("Close").unnamed_result("error")]);
        let b = local_cap(
            "B",
            vec![
                MethodSig::new("Close").unnamed_result("error"),
                MethodSig::new("Flush"),
            ],
        );
        let plan = plan_forwarders(&selector("w", &[]), &[a, b]);
        assert_eq!(method_names(&plan), vec!["Close", "Flush"]);
        assert_eq!(plan.forwarders[0].capability, "A");
        assert_eq!(plan.shadowed.len(), 1);
        assert!(plan.shadowed[0].compatible);
        assert_eq!(plan.shadowed[0].dropped, "B");
    }

    #[test]
    fn incompatible_duplicate_is_recorded() {
        let a = local_cap("A", vec![MethodSig::new("Len").unnamed_result("int")]);
        let b = local_cap("B", vec![MethodSig::new("Len").unnamed_result("int64")]);
        let plan = plan_forwarders(&selector("w", &[]), &[a, b]);
        assert_eq!(plan.forwarders.len(), 1);
        assert!(!plan.shadowed[0].compatible);
    }

    #[test]
    fn declared_methods_are_not_forwarded() {
        let if2 = local_cap("If2", vec![MethodSig::new("Method3"), MethodSig::new("Method4")]);
        let plan = plan_forwarders(&selector("p", &["Method1", "Method3"]), &[if2]);
        assert_eq!(method_names(&plan), vec!["Method4"]);
        assert_eq!(plan.overridden, vec!["Method3".to_string()]);
    }

    #[test]
    fn void_method_is_a_call_statement() {
        let if2 = local_cap("If2", vec![MethodSig::new("Method4")]);
        let plan = plan_forwarders(&selector("p", &[]), &[if2]);
        assert_eq!(
            printed(&plan, "Method4"),
            "func (p *wrapper) Method4() {\n\tp.Inner.(If2).Method4()\n}\n"
        );
    }

    #[test]
    fn variadic_arguments_are_spread() {
        let logger = local_cap(
            "Logger",
            vec![
                MethodSig::new("Logf")
                    .param("format", "string")
                    .param("args", "interface{}")
                    .variadic(),
            ],
        );
        let plan = plan_forwarders(&selector("w", &[]), &[logger]);
        assert_eq!(
            printed(&plan, "Logf"),
            "func (w *wrapper) Logf(format string, args ...interface{}) {\n\tw.Inner.(Logger).Logf(format, args...)\n}\n"
        );
    }

    #[test]
    fn parameter_names_never_shadow_the_receiver() {
        let rf = local_cap(
            "ReaderFrom",
            vec![
                MethodSig::new("ReadFrom")
                    .param("r", "io.Reader")
                    .result("n", "int64")
                    .result("err", "error"),
            ],
        );
        let plan = plan_forwarders(&selector("r", &[]), &[rf]);
        assert_eq!(
            printed(&plan, "ReadFrom"),
            "func (r *wrapper) ReadFrom(r1 io.Reader) (n int64, err error) {\n\treturn r.Inner.(ReaderFrom).ReadFrom(r1)\n}\n"
        );
    }

    #[test]
    fn unnamed_parameters_get_synthesized_names() {
        let conn = local_cap(
            "Conn",
            vec![
                MethodSig::new("Control")
                    .unnamed_param("func(fd uintptr)")
                    .param("_", "int")
                    .unnamed_result("error"),
            ],
        );
        let plan = plan_forwarders(&selector("c", &[]), &[conn]);
        assert_eq!(
            printed(&plan, "Control"),
            "func (c *wrapper) Control(p0 func(fd uintptr), p1 int) error {\n\treturn c.Inner.(Conn).Control(p0, p1)\n}\n"
        );
    }

    #[test]
    fn clashing_result_names_are_dropped() {
        let m = local_cap(
            "Sizer",
            vec![
                MethodSig::new("Size")
                    .param("n", "int")
                    .result("n", "int")
                    .result("err", "error"),
            ],
        );
        let plan = plan_forwarders(&selector("s", &[]), &[m]);
        assert_eq!(
            printed(&plan, "Size"),
            "func (s *wrapper) Size(n int) (int, error) {\n\treturn s.Inner.(Sizer).Size(n)\n}\n"
        );
    }

    #[test]
    fn parameter_names_never_shadow_the_asserted_package() {
        let rf = CapabilityRef {
            name: "ReaderFrom".to_string(),
            package_name: "io".to_string(),
            package_path: "io".to_string(),
            is_local: false,
            methods: vec![
                MethodSig::new("ReadFrom")
                    .param("io", "io.Reader")
                    .result("n", "int64")
                    .result("err", "error"),
            ],
        };
        let plan = plan_forwarders(&selector("w", &[]), &[rf]);
        assert_eq!(
            printed(&plan, "ReadFrom"),
            "func (w *wrapper) ReadFrom(io1 io.Reader) (n int64, err error) {\n\treturn w.Inner.(io.ReaderFrom).ReadFrom(io1)\n}\n"
        );
    }

    #[test]
    fn local_interfaces_leave_package_named_parameters_alone() {
        let sink = local_cap("Sink", vec![MethodSig::new("Put").param("wrap", "int")]);
        let plan = plan_forwarders(&selector("w", &[]), &[sink]);
        assert_eq!(
            printed(&plan, "Put"),
            "func (w *wrapper) Put(wrap int) {\n\tw.Inner.(Sink).Put(wrap)\n}\n"
        );
    }
}
