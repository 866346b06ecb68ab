use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    Attribute, BinaryOp, Body, CompilationUnit, Expr, LambdaBody, Literal, Member, MemberKind,
    Param, ParamModifier, Stmt, TypeDecl, prec,
};

/// How the printer lays out generated source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// The number of spaces per indentation level.
    pub indentation: usize,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self { indentation: 4 }
    }
}

/// Writes C# syntax trees to `W`.
pub struct Printer<'w, W> {
    fmt: &'w mut W,
    config: PrinterConfig,
    indentation: usize,
    at_line_start: bool,
    /// While non-zero, line breaks are printed as spaces (block lambdas).
    inline: usize,
}

impl<'w, W> Printer<'w, W>
where
    W: fmt::Write,
{
    pub fn new(fmt: &'w mut W, config: PrinterConfig) -> Self {
        Self {
            fmt,
            config,
            indentation: 0,
            at_line_start: true,
            inline: 0,
        }
    }

    fn increment_indentation(&mut self) {
        self.indentation += self.config.indentation;
    }

    fn decrement_indentation(&mut self) {
        self.indentation = self.indentation.saturating_sub(self.config.indentation);
    }

    fn write(&mut self, contents: impl AsRef<str>) -> fmt::Result {
        let contents = contents.as_ref();
        if contents.is_empty() {
            return Ok(());
        }
        if self.at_line_start && self.inline == 0 {
            write!(self.fmt, "{:1$}", "", self.indentation)?;
        }
        self.at_line_start = false;
        self.fmt.write_str(contents)
    }

    fn terminate_line(&mut self) -> fmt::Result {
        if self.inline > 0 {
            if !self.at_line_start {
                self.fmt.write_char(' ')?;
            }
            return Ok(());
        }
        self.at_line_start = true;
        self.fmt.write_char('\n')
    }

    fn line(&mut self, contents: impl AsRef<str>) -> fmt::Result {
        self.write(contents)?;
        self.terminate_line()
    }

    fn separated<T>(
        &mut self,
        items: &[T],
        separator: &str,
        mut print: impl FnMut(&mut Self, &T) -> fmt::Result,
    ) -> fmt::Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(separator)?;
            }
            print(self, item)?;
        }
        Ok(())
    }

    pub fn print_unit(&mut self, unit: &CompilationUnit) -> fmt::Result {
        if let Some(banner) = &unit.banner {
            for line in banner.lines() {
                self.line(format!("// {line}"))?;
            }
        }
        self.line("#nullable enable")?;
        self.terminate_line()?;

        if !unit.usings.is_empty() {
            for using in &unit.usings {
                self.line(format!("using {using};"))?;
            }
            self.terminate_line()?;
        }

        match &unit.namespace {
            Some(namespace) => {
                self.line(format!("namespace {namespace}"))?;
                self.line("{")?;
                self.increment_indentation();
                self.print_type(&unit.declaration)?;
                self.decrement_indentation();
                self.line("}")
            }
            None => self.print_type(&unit.declaration),
        }
    }

    pub fn print_type(&mut self, decl: &TypeDecl) -> fmt::Result {
        self.write(&decl.header)?;
        if !decl.base_types.is_empty() {
            self.write(" : ")?;
            let bases: Vec<String> = decl.base_types.iter().map(ToString::to_string).collect();
            self.write(bases.join(", "))?;
        }
        self.terminate_line()?;
        self.line("{")?;
        self.increment_indentation();

        for (i, member) in decl.members.iter().enumerate() {
            if i > 0 {
                self.terminate_line()?;
            }
            self.print_member(member)?;
        }
        if let Some(nested) = &decl.nested {
            if !decl.members.is_empty() {
                self.terminate_line()?;
            }
            self.print_type(nested)?;
        }

        self.decrement_indentation();
        self.line("}")
    }

    fn print_attribute(&mut self, attribute: &Attribute) -> fmt::Result {
        self.write("[")?;
        self.write(&attribute.name)?;
        if !attribute.arguments.is_empty() {
            self.write("(")?;
            self.separated(&attribute.arguments, ", ", |this, argument| {
                this.print_expr(argument, prec::LAMBDA)
            })?;
            self.write(")")?;
        }
        self.write("]")
    }

    fn print_param(&mut self, param: &Param) -> fmt::Result {
        for attribute in &param.attributes {
            self.print_attribute(attribute)?;
            self.write(" ")?;
        }
        if let Some(ParamModifier::Out) = param.modifier {
            self.write("out ")?;
        }
        self.write(format!("{} {}", param.ty, param.name))?;
        if let Some(default) = &param.default {
            self.write(" = ")?;
            self.print_expr(default, prec::LAMBDA)?;
        }
        Ok(())
    }

    fn print_params(&mut self, params: &[Param]) -> fmt::Result {
        self.write("(")?;
        self.separated(params, ", ", Self::print_param)?;
        self.write(")")
    }

    pub fn print_member(&mut self, member: &Member) -> fmt::Result {
        if !member.doc.is_empty() {
            self.line("/// <summary>")?;
            for doc in &member.doc {
                self.line(format!("/// {doc}"))?;
            }
            self.line("/// </summary>")?;
        }
        for attribute in &member.attributes {
            self.print_attribute(attribute)?;
            self.terminate_line()?;
        }
        for modifier in &member.modifiers {
            self.write(modifier.keyword())?;
            self.write(" ")?;
        }

        match &member.kind {
            MemberKind::Field { ty, name } => self.line(format!("{ty} {name};")),
            MemberKind::Constructor { name, params, body } => {
                self.write(name)?;
                self.print_params(params)?;
                self.print_body(body)
            }
            MemberKind::Method {
                returns,
                name,
                type_parameters,
                params,
                where_clauses,
                body,
            } => {
                match returns {
                    Some(returns) => self.write(returns.to_string())?,
                    None => self.write("void")?,
                }
                self.write(" ")?;
                self.write(name)?;
                if !type_parameters.is_empty() {
                    self.write(format!("<{}>", type_parameters.join(", ")))?;
                }
                self.print_params(params)?;
                if !where_clauses.is_empty() {
                    self.increment_indentation();
                    for clause in where_clauses {
                        self.terminate_line()?;
                        let constraints: Vec<String> =
                            clause.constraints.iter().map(ToString::to_string).collect();
                        self.write(format!(
                            "where {} : {}",
                            clause.parameter,
                            constraints.join(", ")
                        ))?;
                    }
                    self.decrement_indentation();
                }
                self.print_body(body)
            }
            MemberKind::Property { ty, name, body } => {
                self.write(format!("{ty} {name}"))?;
                self.print_body(body)
            }
            MemberKind::Operator {
                returns,
                operator,
                params,
                body,
            } => {
                self.write(format!("{returns} operator {operator}"))?;
                self.print_params(params)?;
                self.print_body(body)
            }
            MemberKind::Conversion {
                target,
                param,
                body,
            } => {
                self.write(format!("implicit operator {target}"))?;
                self.print_params(std::slice::from_ref(param))?;
                self.print_body(body)
            }
        }
    }

    fn print_body(&mut self, body: &Body) -> fmt::Result {
        match body {
            Body::Expr(expr) => {
                self.write(" => ")?;
                self.print_expr(expr, prec::LAMBDA)?;
                self.line(";")
            }
            Body::Block(stmts) => {
                self.terminate_line()?;
                self.print_block(stmts)
            }
        }
    }

    fn print_block(&mut self, stmts: &[Stmt]) -> fmt::Result {
        self.line("{")?;
        self.increment_indentation();
        for stmt in stmts {
            self.print_stmt(stmt)?;
        }
        self.decrement_indentation();
        self.line("}")
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> fmt::Result {
        match stmt {
            Stmt::Expr(expr) => {
                self.print_expr(expr, prec::LAMBDA)?;
                self.line(";")
            }
            Stmt::Assign(target, value) => {
                self.print_expr(target, prec::PRIMARY)?;
                self.write(" = ")?;
                self.print_expr(value, prec::LAMBDA)?;
                self.line(";")
            }
            Stmt::Return(None) => self.line("return;"),
            Stmt::Return(Some(value)) => {
                self.write("return ")?;
                self.print_expr(value, prec::LAMBDA)?;
                self.line(";")
            }
            Stmt::Throw(value) => {
                self.write("throw ")?;
                self.print_expr(value, prec::LAMBDA)?;
                self.line(";")
            }
            Stmt::Break => self.line("break;"),
            Stmt::If { condition, then } => {
                self.write("if (")?;
                self.print_expr(condition, prec::LAMBDA)?;
                self.line(")")?;
                match then.as_slice() {
                    [single @ (Stmt::Throw(_) | Stmt::Return(_) | Stmt::Assign(..) | Stmt::Expr(_))] => {
                        self.increment_indentation();
                        self.print_stmt(single)?;
                        self.decrement_indentation();
                        Ok(())
                    }
                    _ => self.print_block(then),
                }
            }
            Stmt::Switch {
                subject,
                cases,
                default,
            } => {
                self.write("switch (")?;
                self.print_expr(subject, prec::LAMBDA)?;
                self.line(")")?;
                self.line("{")?;
                self.increment_indentation();
                for case in cases {
                    self.write("case ")?;
                    self.print_expr(&case.label, prec::LAMBDA)?;
                    self.line(":")?;
                    self.increment_indentation();
                    for stmt in &case.body {
                        self.print_stmt(stmt)?;
                    }
                    self.decrement_indentation();
                }
                if !default.is_empty() {
                    self.line("default:")?;
                    self.increment_indentation();
                    for stmt in default {
                        self.print_stmt(stmt)?;
                    }
                    self.decrement_indentation();
                }
                self.decrement_indentation();
                self.line("}")
            }
        }
    }

    fn print_literal(&mut self, literal: &Literal) -> fmt::Result {
        match literal {
            Literal::Int(value) => self.write(value.to_string()),
            Literal::Bool(value) => self.write(if *value { "true" } else { "false" }),
            Literal::Null => self.write("null"),
            Literal::Str(value) => {
                let mut escaped = String::with_capacity(value.len() + 2);
                escaped.push('"');
                for ch in value.chars() {
                    match ch {
                        '"' => escaped.push_str("\\\""),
                        '\\' => escaped.push_str("\\\\"),
                        '\n' => escaped.push_str("\\n"),
                        '\r' => escaped.push_str("\\r"),
                        '\t' => escaped.push_str("\\t"),
                        other => escaped.push(other),
                    }
                }
                escaped.push('"');
                self.write(escaped)
            }
        }
    }

    /// Prints `expr`, parenthesized when it binds looser than `min`.
    pub fn print_expr(&mut self, expr: &Expr, min: u8) -> fmt::Result {
        let parenthesize = expr.precedence() < min;
        if parenthesize {
            self.write("(")?;
        }

        match expr {
            Expr::Ident(name) => self.write(name)?,
            Expr::Literal(literal) => self.print_literal(literal)?,
            Expr::Default { suppressed } => {
                self.write(if *suppressed { "default!" } else { "default" })?
            }
            Expr::Member(target, name) => {
                self.print_expr(target, prec::PRIMARY)?;
                self.write(".")?;
                self.write(name)?;
            }
            Expr::ConditionalMember(target, name) => {
                self.print_expr(target, prec::PRIMARY)?;
                self.write("?.")?;
                self.write(name)?;
            }
            Expr::Call {
                target,
                type_arguments,
                arguments,
            } => {
                self.print_expr(target, prec::PRIMARY)?;
                if !type_arguments.is_empty() {
                    let arguments: Vec<String> =
                        type_arguments.iter().map(ToString::to_string).collect();
                    self.write(format!("<{}>", arguments.join(", ")))?;
                }
                self.write("(")?;
                self.separated(arguments, ", ", |this, argument| {
                    this.print_expr(argument, prec::LAMBDA)
                })?;
                self.write(")")?;
            }
            Expr::New { ty, arguments } => {
                self.write(format!("new {ty}("))?;
                self.separated(arguments, ", ", |this, argument| {
                    this.print_expr(argument, prec::LAMBDA)
                })?;
                self.write(")")?;
            }
            Expr::Binary(lhs, op, rhs) => {
                let precedence = op.precedence();
                // `??` is right associative, the rest are left associative
                let (left, right) = match op {
                    BinaryOp::Coalesce => (precedence + 1, precedence),
                    _ => (precedence, precedence + 1),
                };
                self.print_expr(lhs, left)?;
                self.write(format!(" {} ", op.token()))?;
                self.print_expr(rhs, right)?;
            }
            Expr::Not(inner) => {
                self.write("!")?;
                self.print_expr(inner, prec::UNARY)?;
            }
            Expr::SuppressNull(inner) => {
                self.print_expr(inner, prec::PRIMARY)?;
                self.write("!")?;
            }
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                self.print_expr(condition, prec::COALESCE)?;
                self.write(" ? ")?;
                self.print_expr(then, prec::CONDITIONAL)?;
                self.write(" : ")?;
                self.print_expr(otherwise, prec::CONDITIONAL)?;
            }
            Expr::IsNull(inner) => {
                self.print_expr(inner, prec::UNARY)?;
                self.write(" is null")?;
            }
            Expr::IsType { expr, ty, name } => {
                self.print_expr(expr, prec::UNARY)?;
                self.write(format!(" is {ty} {name}"))?;
            }
            Expr::Cast(ty, inner) => {
                self.write(format!("({ty})"))?;
                self.print_expr(inner, prec::UNARY)?;
            }
            Expr::TypeOf(ty) => self.write(format!("typeof({ty})"))?,
            Expr::NameOf(name) => self.write(format!("nameof({name})"))?,
            Expr::Await(inner) => {
                self.write("await ")?;
                self.print_expr(inner, prec::UNARY)?;
            }
            Expr::Lambda {
                is_async,
                parameters,
                body,
            } => {
                if *is_async {
                    self.write("async ")?;
                }
                match parameters.as_slice() {
                    [single] => self.write(single)?,
                    _ => self.write(format!("({})", parameters.join(", ")))?,
                }
                self.write(" => ")?;
                match body {
                    LambdaBody::Expr(body) => self.print_expr(body, prec::LAMBDA)?,
                    LambdaBody::Block(stmts) => {
                        self.write("{ ")?;
                        self.inline += 1;
                        for stmt in stmts {
                            self.print_stmt(stmt)?;
                        }
                        self.inline -= 1;
                        self.write("}")?;
                    }
                }
            }
            Expr::Throw(inner) => {
                self.write("throw ")?;
                self.print_expr(inner, prec::LAMBDA)?;
            }
            Expr::Switch { subject, arms } => {
                self.print_expr(subject, prec::PRIMARY)?;
                self.write(" switch")?;
                self.terminate_line()?;
                self.line("{")?;
                self.increment_indentation();
                for arm in arms {
                    match &arm.pattern {
                        Some(pattern) => self.print_expr(pattern, prec::LAMBDA)?,
                        None => self.write("_")?,
                    }
                    self.write(" => ")?;
                    self.print_expr(&arm.value, prec::LAMBDA)?;
                    self.line(",")?;
                }
                self.decrement_indentation();
                self.write("}")?;
            }
        }

        if parenthesize {
            self.write(")")?;
        }
        Ok(())
    }
}
