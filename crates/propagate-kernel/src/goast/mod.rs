//! A small Go syntax tree.
//!
//! Only the constructs interface propagation emits are modelled. Generation
//! builds these nodes and [`printer::print_file`] renders them in gofmt
//! layout, validating identifiers and type text on the way out.

pub mod printer;
pub mod syntax;

/// A complete Go source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Leading line comment, without the `// ` prefix.
    pub header: Option<String>,
    pub package: String,
    pub imports: Vec<Import>,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Import {
    pub path: String,
    /// Explicit local name, when it differs from the path's last element.
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Type(TypeDecl),
    Func(FuncDecl),
}

/// `type Name <ty>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Name(String),
    Qualified { package: String, name: String },
    Pointer(Box<TypeExpr>),
    /// Interface type made only of embedded interfaces.
    Interface(Vec<TypeExpr>),
    /// Struct type made only of embedded fields.
    Struct(Vec<TypeExpr>),
    /// Type text taken from package metadata; checked when printed.
    Verbatim(String),
}

impl TypeExpr {
    pub fn name(name: impl Into<String>) -> Self {
        TypeExpr::Name(name.into())
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Qualified {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn verbatim(text: impl Into<String>) -> Self {
        TypeExpr::Verbatim(text.into())
    }
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub receiver: Option<Receiver>,
    pub name: String,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    /// The last parameter is `...T`.
    pub variadic: bool,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receiver {
    pub name: String,
    pub ty: TypeExpr,
}

/// A parameter or result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `a, b := value`
    Define { names: Vec<String>, value: Expr },
    Return(Vec<Expr>),
    Expr(Expr),
    /// Tagless `switch { ... }`.
    Switch(Vec<CaseClause>),
}

/// A `case` clause; no conditions means `default`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseClause {
    pub conditions: Vec<Expr>,
    pub body: Vec<Stmt>,
}

impl CaseClause {
    pub fn case(condition: Expr, body: Vec<Stmt>) -> Self {
        Self {
            conditions: vec![condition],
            body,
        }
    }

    pub fn default(body: Vec<Stmt>) -> Self {
        Self {
            conditions: Vec::new(),
            body,
        }
    }

    pub fn is_default(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(String),
    Selector(Box<Expr>, String),
    TypeAssert(Box<Expr>, TypeExpr),
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        /// Spread the last argument with `...`.
        spread: bool,
    },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Str(String),
    CompositeLit { ty: TypeExpr, elems: Vec<Expr> },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn select(self, name: impl Into<String>) -> Self {
        Expr::Selector(Box::new(self), name.into())
    }

    pub fn assert(self, ty: TypeExpr) -> Self {
        Expr::TypeAssert(Box::new(self), ty)
    }

    pub fn call(self, args: Vec<Expr>) -> Self {
        Expr::Call {
            func: Box::new(self),
            args,
            spread: false,
        }
    }

    pub fn call_spread(self, args: Vec<Expr>) -> Self {
        Expr::Call {
            func: Box::new(self),
            args,
            spread: true,
        }
    }

    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Left-associated `a && b && c`; `true` when there are no parts.
    pub fn and_all(parts: Vec<Expr>) -> Self {
        let mut parts = parts.into_iter();
        let Some(first) = parts.next() else {
            return Expr::ident("true");
        };
        parts.fold(first, |acc, part| Expr::And(Box::new(acc), Box::new(part)))
    }
}
