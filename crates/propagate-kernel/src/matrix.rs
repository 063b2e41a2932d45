//! The combination dispatch table.
//!
//! For N optional interfaces the generated function type-asserts each one
//! once (`_, ok<i> := recv.Field.(Iface_i)`) and then switches over all 2^N
//! combinations of assertion results. Each case returns an anonymous struct
//! that embeds the base interface plus exactly the interfaces whose
//! assertion succeeded. The cases are pairwise exclusive and jointly exhaustive; the
//! trailing `default` only guards that construction.

use crate::capability::{CapabilityRef, StructSelector};
use crate::error::GenerateError;
use crate::goast::{CaseClause, Expr, Field, FuncDecl, Receiver, Stmt, TypeExpr};

/// Upper bound on optional interfaces; the table has 2^N cases.
pub const MAX_OPTIONAL_CAPABILITIES: usize = 16;

/// A subset of the optional interfaces: bit i set means interface i is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Combination {
    mask: u32,
    width: usize,
}

impl Combination {
    pub(crate) fn new(mask: u32, width: usize) -> Self {
        Self { mask, width }
    }

    /// All 2^width combinations, from the full set down to the empty set.
    ///
    /// Callers keep `width` at or below [`MAX_OPTIONAL_CAPABILITIES`].
    pub(crate) fn all(width: usize) -> impl Iterator<Item = Combination> {
        let count = 1u32 << width;
        (0..count).rev().map(move |mask| Combination::new(mask, width))
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.width && (self.mask >> index) & 1 == 1
    }

    /// Indices of the present interfaces, in input order.
    pub fn members(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.width).filter(|i| self.contains(*i))
    }

    /// Whether this combination's case is taken for the given assertion results.
    pub fn matches(&self, present: &[bool]) -> bool {
        present.len() == self.width && present.iter().enumerate().all(|(i, ok)| *ok == self.contains(i))
    }

    /// `ok0 && !ok1 && ...`, or `true` when there are no assertions.
    pub fn condition(&self) -> Expr {
        let parts = (0..self.width)
            .map(|i| {
                let flag = Expr::ident(presence_flag(i));
                if self.contains(i) { flag } else { flag.not() }
            })
            .collect();
        Expr::and_all(parts)
    }
}

/// Name of the boolean bound by the i-th type assertion.
pub fn presence_flag(index: usize) -> String {
    format!("ok{index}")
}

/// One conditioned case of the dispatch switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub combination: Combination,
    pub condition: Expr,
    pub result: Expr,
}

/// The dispatch function before it is turned into a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTable {
    pub assertions: Vec<Stmt>,
    pub branches: Vec<Branch>,
}

impl DispatchTable {
    /// Fails when the capabilities would need more than 2^16 cases.
    pub fn build(
        selector: &StructSelector,
        capabilities: &[CapabilityRef],
    ) -> Result<Self, GenerateError> {
        if capabilities.len() > MAX_OPTIONAL_CAPABILITIES {
            return Err(GenerateError::emission(format!(
                "too many optional interfaces: {} given, at most {MAX_OPTIONAL_CAPABILITIES} supported",
                capabilities.len()
            )));
        }

        let field = Expr::ident(&selector.receiver).select(&selector.field_name);

        let assertions = capabilities
            .iter()
            .enumerate()
            .map(|(i, capability)| Stmt::Define {
                names: vec!["_".to_string(), presence_flag(i)],
                value: field.clone().assert(capability.type_expr()),
            })
            .collect();

        let branches = Combination::all(capabilities.len())
            .map(|combination| {
                let mut embedded = vec![selector.base.type_expr()];
                embedded.extend(combination.members().map(|i| capabilities[i].type_expr()));
                let elems = vec![Expr::ident(&selector.receiver); embedded.len()];
                Branch {
                    combination,
                    condition: combination.condition(),
                    result: Expr::CompositeLit {
                        ty: TypeExpr::Struct(embedded),
                        elems,
                    },
                }
            })
            .collect();

        Ok(Self { assertions, branches })
    }

    /// `func (recv T) name() Base { ... }`
    pub fn into_func(self, selector: &StructSelector, name: &str) -> FuncDecl {
        let mut cases: Vec<CaseClause> = self
            .branches
            .into_iter()
            .map(|branch| CaseClause::case(branch.condition, vec![Stmt::Return(vec![branch.result])]))
            .collect();
        cases.push(CaseClause::default(vec![Stmt::Expr(
            Expr::ident("panic").call(vec![Expr::Str("unreachable".to_string())]),
        )]));

        let mut body = self.assertions;
        body.push(Stmt::Switch(cases));

        FuncDecl {
            receiver: Some(Receiver {
                name: selector.receiver.clone(),
                ty: selector.receiver_type(),
            }),
            name: name.to_string(),
            params: Vec::new(),
            results: vec![Field {
                name: None,
                ty: selector.base.type_expr(),
            }],
            variadic: false,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goast::printer::print_decl;
    use crate::goast::Decl;

    fn cap(package: &str, name: &str) -> CapabilityRef {
        CapabilityRef {
            name: name.to_string(),
            package_name: package.to_string(),
            package_path: package.to_string(),
            is_local: false,
            methods: Vec::new(),
        }
    }

    fn selector() -> StructSelector {
        StructSelector {
            receiver: "f".to_string(),
            pointer_receiver: true,
            struct_name: "foo".to_string(),
            field_name: "Reader".to_string(),
            declared_methods: Vec::new(),
            base: cap("io", "Reader"),
        }
    }

    #[test]
    fn enumerates_two_to_the_n_descending() {
        let masks: Vec<u32> = Combination::all(3).map(|c| c.mask()).collect();
        assert_eq!(masks, vec![7, 6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(Combination::all(0).count(), 1);
    }

    #[test]
    fn branches_are_exclusive_and_exhaustive() {
        for n in 0..=5 {
            let caps: Vec<CapabilityRef> = (0..n).map(|i| cap("p", &format!("I{i}"))).collect();
            let table = DispatchTable::build(&selector(), &caps).expect("table should build");
            assert_eq!(table.branches.len(), 1 << n);
            assert_eq!(table.assertions.len(), n);

            for assignment in 0u32..(1 << n) {
                let present: Vec<bool> = (0..n).map(|i| (assignment >> i) & 1 == 1).collect();
                let taken: Vec<&Branch> = table
                    .branches
                    .iter()
                    .filter(|b| b.combination.matches(&present))
                    .collect();
                assert_eq!(taken.len(), 1, "n={n} present={present:?}");
                assert_eq!(taken[0].combination.mask(), assignment);
            }
        }
    }

    #[test]
    fn zero_optional_interfaces_is_a_single_true_case() {
        let table = DispatchTable::build(&selector(), &[]).expect("table should build");
        assert_eq!(table.branches.len(), 1);
        assert_eq!(table.branches[0].condition, Expr::ident("true"));
        let func = table.into_func(&selector(), "propagateInterfaces");
        let text = print_decl(&Decl::Func(func)).expect("should print");
        assert_eq!(
            text,
            "func (f *foo) propagateInterfaces() io.Reader {\n\
             \tswitch {\n\
             \tcase true:\n\
             \t\treturn struct {\n\
             \t\t\tio.Reader\n\
             \t\t}{f}\n\
             \tdefault:\n\
             \t\tpanic(\"unreachable\")\n\
             \t}\n\
             }\n"
        );
    }

    #[test]
    fn case_embeds_present_interfaces_in_input_order() {
        let caps = vec![cap("io", "ReaderFrom"), cap("io", "WriterTo")];
        let table = DispatchTable::build(&selector(), &caps).expect("table should build");
        let first = &table.branches[0];
        assert_eq!(first.combination.mask(), 0b11);
        match &first.result {
            Expr::CompositeLit { ty: TypeExpr::Struct(fields), elems } => {
                assert_eq!(fields.len(), 3);
                assert_eq!(fields[1], TypeExpr::qualified("io", "ReaderFrom"));
                assert_eq!(fields[2], TypeExpr::qualified("io", "WriterTo"));
                assert_eq!(elems.len(), 3);
            }
            other => panic!("unexpected result {other:?}"),
        }
        let last = table.branches.last().expect("branches");
        assert_eq!(last.combination.mask(), 0);
        assert_eq!(
            last.condition,
            Expr::and_all(vec![Expr::ident("ok0").not(), Expr::ident("ok1").not()])
        );
    }

    #[test]
    fn more_than_sixteen_interfaces_is_an_emission_error() {
        for count in [17, 32, 40] {
            let caps: Vec<CapabilityRef> = (0..count).map(|i| cap("p", &format!("I{i}"))).collect();
            match DispatchTable::build(&selector(), &caps) {
                Err(GenerateError::Emission(message)) => {
                    assert!(message.contains(&format!("{count} given")), "{message}");
                }
                other => panic!("expected emission error for {count}, got {other:?}"),
            }
        }
    }
}
