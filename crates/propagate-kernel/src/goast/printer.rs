//! Renders a [`File`] as gofmt-formatted Go source.

use super::syntax::{check_identifier, check_import_path, check_type_text};
use super::{CaseClause, Decl, Expr, Field, File, FuncDecl, Import, Stmt, TypeDecl, TypeExpr};
use crate::error::GenerateError;

/// Print a file, failing if any node would not be valid Go.
pub fn print_file(file: &File) -> Result<String, GenerateError> {
    let mut printer = Printer::default();
    printer.file(file)?;
    Ok(printer.out)
}

/// Print a single declaration (no trailing blank line).
pub fn print_decl(decl: &Decl) -> Result<String, GenerateError> {
    let mut printer = Printer::default();
    printer.decl(decl)?;
    Ok(printer.out)
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

fn ident(name: &str) -> Result<&str, GenerateError> {
    check_identifier(name).map_err(GenerateError::emission)?;
    Ok(name)
}

impl Printer {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn tabs(&mut self) {
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn file(&mut self, file: &File) -> Result<(), GenerateError> {
        if let Some(header) = &file.header {
            if header.contains('\n') {
                return Err(GenerateError::emission(
                    "file header must be a single line comment",
                ));
            }
            self.push("// ");
            self.push(header);
            self.push("\n\n");
        }
        self.push("package ");
        self.push(ident(&file.package)?);
        self.push("\n");

        match file.imports.as_slice() {
            [] => {}
            [single] => {
                self.push("\nimport ");
                self.import(single)?;
                self.push("\n");
            }
            many => {
                self.push("\nimport (\n");
                for import in many {
                    self.push("\t");
                    self.import(import)?;
                    self.push("\n");
                }
                self.push(")\n");
            }
        }

        for decl in &file.decls {
            self.push("\n");
            self.decl(decl)?;
        }
        Ok(())
    }

    fn import(&mut self, import: &Import) -> Result<(), GenerateError> {
        check_import_path(&import.path).map_err(GenerateError::emission)?;
        if let Some(name) = &import.name {
            self.push(ident(name)?);
            self.push(" ");
        }
        self.push("\"");
        self.push(&import.path);
        self.push("\"");
        Ok(())
    }

    fn decl(&mut self, decl: &Decl) -> Result<(), GenerateError> {
        match decl {
            Decl::Type(decl) => self.type_decl(decl),
            Decl::Func(decl) => self.func_decl(decl),
        }
    }

    fn type_decl(&mut self, decl: &TypeDecl) -> Result<(), GenerateError> {
        self.push("type ");
        self.push(ident(&decl.name)?);
        self.push(" ");
        self.type_expr(&decl.ty)?;
        self.push("\n");
        Ok(())
    }

    fn func_decl(&mut self, decl: &FuncDecl) -> Result<(), GenerateError> {
        self.push("func ");
        if let Some(receiver) = &decl.receiver {
            self.push("(");
            self.push(ident(&receiver.name)?);
            self.push(" ");
            self.type_expr(&receiver.ty)?;
            self.push(") ");
        }
        self.push(ident(&decl.name)?);
        self.fields(&decl.params, decl.variadic)?;

        match decl.results.as_slice() {
            [] => {}
            [single] if single.name.is_none() => {
                self.push(" ");
                self.type_expr(&single.ty)?;
            }
            results => {
                self.push(" ");
                self.fields(results, false)?;
            }
        }

        self.push(" {\n");
        self.indent += 1;
        for stmt in &decl.body {
            self.stmt(stmt)?;
        }
        self.indent -= 1;
        self.push("}\n");
        Ok(())
    }

    fn fields(&mut self, fields: &[Field], variadic: bool) -> Result<(), GenerateError> {
        let named = fields.iter().filter(|f| f.name.is_some()).count();
        if named != 0 && named != fields.len() {
            return Err(GenerateError::emission(
                "parameter list mixes named and unnamed entries",
            ));
        }
        self.push("(");
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            if let Some(name) = &field.name {
                self.push(ident(name)?);
                self.push(" ");
            }
            if variadic && i + 1 == fields.len() {
                self.push("...");
            }
            self.type_expr(&field.ty)?;
        }
        self.push(")");
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), GenerateError> {
        self.tabs();
        match stmt {
            Stmt::Define { names, value } => {
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.push(ident(name)?);
                }
                self.push(" := ");
                self.expr(value)?;
            }
            Stmt::Return(values) => {
                self.push("return");
                for (i, value) in values.iter().enumerate() {
                    self.push(if i == 0 { " " } else { ", " });
                    self.expr(value)?;
                }
            }
            Stmt::Expr(expr) => self.expr(expr)?,
            Stmt::Switch(cases) => {
                self.push("switch {\n");
                for case in cases {
                    self.case_clause(case)?;
                }
                self.tabs();
                self.push("}");
            }
        }
        self.push("\n");
        Ok(())
    }

    fn case_clause(&mut self, case: &CaseClause) -> Result<(), GenerateError> {
        self.tabs();
        if case.is_default() {
            self.push("default:\n");
        } else {
            self.push("case ");
            for (i, condition) in case.conditions.iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                self.expr(condition)?;
            }
            self.push(":\n");
        }
        self.indent += 1;
        for stmt in &case.body {
            self.stmt(stmt)?;
        }
        self.indent -= 1;
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> Result<(), GenerateError> {
        match expr {
            Expr::Ident(name) => self.push(ident(name)?),
            Expr::Selector(x, sel) => {
                self.expr(x)?;
                self.push(".");
                self.push(ident(sel)?);
            }
            Expr::TypeAssert(x, ty) => {
                self.expr(x)?;
                self.push(".(");
                self.type_expr(ty)?;
                self.push(")");
            }
            Expr::Call { func, args, spread } => {
                self.expr(func)?;
                self.push("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(arg)?;
                }
                if *spread {
                    if args.is_empty() {
                        return Err(GenerateError::emission("spread call without arguments"));
                    }
                    self.push("...");
                }
                self.push(")");
            }
            Expr::Not(x) => {
                self.push("!");
                self.operand(x)?;
            }
            Expr::And(x, y) => {
                self.expr(x)?;
                self.push(" && ");
                self.operand(y)?;
            }
            Expr::Str(value) => self.push(&quote(value)),
            Expr::CompositeLit { ty, elems } => {
                self.type_expr(ty)?;
                self.push("{");
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(elem)?;
                }
                self.push("}");
            }
        }
        Ok(())
    }

    /// Operands of `!` and right-hand sides of `&&` are parenthesized when
    /// they are themselves conjunctions.
    fn operand(&mut self, expr: &Expr) -> Result<(), GenerateError> {
        if matches!(expr, Expr::And(..)) {
            self.push("(");
            self.expr(expr)?;
            self.push(")");
            Ok(())
        } else {
            self.expr(expr)
        }
    }

    fn type_expr(&mut self, ty: &TypeExpr) -> Result<(), GenerateError> {
        match ty {
            TypeExpr::Name(name) => self.push(ident(name)?),
            TypeExpr::Qualified { package, name } => {
                self.push(ident(package)?);
                self.push(".");
                self.push(ident(name)?);
            }
            TypeExpr::Pointer(inner) => {
                self.push("*");
                self.type_expr(inner)?;
            }
            TypeExpr::Interface(embeds) => self.embedding_block("interface", embeds)?,
            TypeExpr::Struct(fields) => self.embedding_block("struct", fields)?,
            TypeExpr::Verbatim(text) => {
                let text = text.trim();
                check_type_text(text)
                    .map_err(|e| GenerateError::emission(format!("invalid type {text:?}: {e}")))?;
                self.push(text);
            }
        }
        Ok(())
    }

    fn embedding_block(&mut self, keyword: &str, members: &[TypeExpr]) -> Result<(), GenerateError> {
        self.push(keyword);
        if members.is_empty() {
            self.push("{}");
            return Ok(());
        }
        self.push(" {\n");
        self.indent += 1;
        for member in members {
            self.tabs();
            self.type_expr(member)?;
            self.push("\n");
        }
        self.indent -= 1;
        self.tabs();
        self.push("}");
        Ok(())
    }
}

/// Interpreted Go string literal.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
