//! A small C# syntax tree. Synthesizers build these nodes and the
//! [`Printer`] is the only place that turns them into text.

mod printer;
pub mod types;

pub use printer::{Printer, PrinterConfig};

use eithergen_syntax::model::{Constraint, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Private,
    Static,
    Readonly,
    Override,
    Async,
}

impl Modifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Static => "static",
            Self::Readonly => "readonly",
            Self::Override => "override",
            Self::Async => "async",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Str(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    And,
    Or,
    Coalesce,
}

impl BinaryOp {
    fn token(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Coalesce => "??",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Self::Eq | Self::NotEq => prec::EQUALITY,
            Self::And => prec::AND,
            Self::Or => prec::OR,
            Self::Coalesce => prec::COALESCE,
        }
    }
}

/// C# operator precedence, loosest first.
pub(crate) mod prec {
    pub const LAMBDA: u8 = 1;
    pub const CONDITIONAL: u8 = 2;
    pub const COALESCE: u8 = 3;
    pub const OR: u8 = 4;
    pub const AND: u8 = 5;
    pub const EQUALITY: u8 = 6;
    pub const RELATIONAL: u8 = 7;
    pub const UNARY: u8 = 8;
    pub const PRIMARY: u8 = 9;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchArm {
    /// `None` is the discard pattern `_`.
    pub pattern: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(String),
    Literal(Literal),
    /// `default`, or `default!` when `suppressed`.
    Default { suppressed: bool },
    Member(Box<Expr>, String),
    /// `target?.name`
    ConditionalMember(Box<Expr>, String),
    Call {
        target: Box<Expr>,
        type_arguments: Vec<TypeRef>,
        arguments: Vec<Expr>,
    },
    New {
        ty: TypeRef,
        arguments: Vec<Expr>,
    },
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Not(Box<Expr>),
    /// `expr!`
    SuppressNull(Box<Expr>),
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    IsNull(Box<Expr>),
    /// `expr is Type name`
    IsType {
        expr: Box<Expr>,
        ty: TypeRef,
        name: String,
    },
    Cast(TypeRef, Box<Expr>),
    TypeOf(TypeRef),
    NameOf(String),
    Await(Box<Expr>),
    Lambda {
        is_async: bool,
        parameters: Vec<String>,
        body: LambdaBody,
    },
    Throw(Box<Expr>),
    Switch {
        subject: Box<Expr>,
        arms: Vec<SwitchArm>,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    pub fn int(value: impl Into<i64>) -> Self {
        Self::Literal(Literal::Int(value.into()))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::Literal(Literal::Str(value.into()))
    }

    pub fn default_value() -> Self {
        Self::Default { suppressed: false }
    }

    pub fn member(self, name: impl Into<String>) -> Self {
        Self::Member(Box::new(self), name.into())
    }

    pub fn conditional_member(self, name: impl Into<String>) -> Self {
        Self::ConditionalMember(Box::new(self), name.into())
    }

    pub fn call(self, arguments: Vec<Expr>) -> Self {
        Self::Call {
            target: Box::new(self),
            type_arguments: vec![],
            arguments,
        }
    }

    pub fn call_generic(self, type_arguments: Vec<TypeRef>, arguments: Vec<Expr>) -> Self {
        Self::Call {
            target: Box::new(self),
            type_arguments,
            arguments,
        }
    }

    /// `self.name(arguments)`
    pub fn method(self, name: impl Into<String>, arguments: Vec<Expr>) -> Self {
        self.member(name).call(arguments)
    }

    pub fn new_object(ty: TypeRef, arguments: Vec<Expr>) -> Self {
        Self::New { ty, arguments }
    }

    pub fn binary(self, op: BinaryOp, rhs: Expr) -> Self {
        Self::Binary(Box::new(self), op, Box::new(rhs))
    }

    pub fn eq(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Eq, rhs)
    }

    pub fn not_eq(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::NotEq, rhs)
    }

    pub fn and(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn coalesce(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Coalesce, rhs)
    }

    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn suppress_null(self) -> Self {
        Self::SuppressNull(Box::new(self))
    }

    pub fn is_null(self) -> Self {
        Self::IsNull(Box::new(self))
    }

    pub fn conditional(condition: Expr, then: Expr, otherwise: Expr) -> Self {
        Self::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn cast(self, ty: TypeRef) -> Self {
        Self::Cast(ty, Box::new(self))
    }

    pub fn awaited(self) -> Self {
        Self::Await(Box::new(self))
    }

    /// `.ConfigureAwait(false)`, awaited.
    pub fn await_unscheduled(self) -> Self {
        self.method("ConfigureAwait", vec![Expr::Literal(Literal::Bool(false))])
            .awaited()
    }

    pub fn lambda(parameters: Vec<String>, body: Expr) -> Self {
        Self::Lambda {
            is_async: false,
            parameters,
            body: LambdaBody::Expr(Box::new(body)),
        }
    }

    pub fn block_lambda(is_async: bool, parameters: Vec<String>, body: Vec<Stmt>) -> Self {
        Self::Lambda {
            is_async,
            parameters,
            body: LambdaBody::Block(body),
        }
    }

    pub fn throw(self) -> Self {
        Self::Throw(Box::new(self))
    }

    pub fn precedence(&self) -> u8 {
        match self {
            Self::Ident(_)
            | Self::Literal(_)
            | Self::Default { .. }
            | Self::Member(..)
            | Self::ConditionalMember(..)
            | Self::Call { .. }
            | Self::New { .. }
            | Self::SuppressNull(_)
            | Self::TypeOf(_)
            | Self::NameOf(_) => prec::PRIMARY,
            Self::Not(_) | Self::Cast(..) | Self::Await(_) => prec::UNARY,
            Self::IsNull(_) | Self::IsType { .. } => prec::RELATIONAL,
            Self::Switch { .. } => prec::RELATIONAL,
            Self::Binary(_, op, _) => op.precedence(),
            Self::Conditional { .. } => prec::CONDITIONAL,
            Self::Lambda { .. } | Self::Throw(_) => prec::LAMBDA,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchCase {
    pub label: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Expr(Expr),
    Assign(Expr, Expr),
    Return(Option<Expr>),
    Throw(Expr),
    Break,
    If {
        condition: Expr,
        then: Vec<Stmt>,
    },
    Switch {
        subject: Expr,
        cases: Vec<SwitchCase>,
        default: Vec<Stmt>,
    },
}

impl Stmt {
    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Self::Assign(Expr::ident(target), value)
    }

    pub fn ret(value: Expr) -> Self {
        Self::Return(Some(value))
    }

    /// `if (name is null) throw new ArgumentNullException(nameof(name));`
    pub fn guard_null(name: &str) -> Self {
        Self::If {
            condition: Expr::ident(name).is_null(),
            then: vec![Self::Throw(Expr::new_object(
                types::system("ArgumentNullException"),
                vec![Expr::NameOf(name.to_string())],
            ))],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Expr(Expr),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub arguments: Vec<Expr>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, arguments: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamModifier {
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub attributes: Vec<Attribute>,
    pub modifier: Option<ParamModifier>,
    pub ty: TypeRef,
    pub name: String,
    pub default: Option<Expr>,
}

impl Param {
    pub fn new(ty: TypeRef, name: impl Into<String>) -> Self {
        Self {
            attributes: vec![],
            modifier: None,
            ty,
            name: name.into(),
            default: None,
        }
    }

    pub fn out(mut self) -> Self {
        self.modifier = Some(ParamModifier::Out);
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    pub parameter: String,
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    Field {
        ty: TypeRef,
        name: String,
    },
    Constructor {
        name: String,
        params: Vec<Param>,
        body: Body,
    },
    Method {
        /// `None` is `void`.
        returns: Option<TypeRef>,
        name: String,
        type_parameters: Vec<String>,
        params: Vec<Param>,
        where_clauses: Vec<WhereClause>,
        body: Body,
    },
    Property {
        ty: TypeRef,
        name: String,
        body: Body,
    },
    Operator {
        returns: TypeRef,
        operator: &'static str,
        params: Vec<Param>,
        body: Body,
    },
    Conversion {
        target: TypeRef,
        param: Param,
        body: Body,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// XML documentation, one `<summary>` line per entry.
    pub doc: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub modifiers: Vec<Modifier>,
    pub kind: MemberKind,
}

impl Member {
    pub fn new(modifiers: Vec<Modifier>, kind: MemberKind) -> Self {
        Self {
            doc: vec![],
            attributes: vec![],
            modifiers,
            kind,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc.push(doc.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            MemberKind::Field { name, .. }
            | MemberKind::Constructor { name, .. }
            | MemberKind::Method { name, .. }
            | MemberKind::Property { name, .. } => name,
            MemberKind::Operator { operator, .. } => operator,
            MemberKind::Conversion { .. } => "implicit",
        }
    }
}

/// A (possibly nested) partial type declaration to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Everything before the base list, e.g. `readonly partial struct Shape<T1, T2>`.
    pub header: String,
    pub base_types: Vec<TypeRef>,
    pub members: Vec<Member>,
    pub nested: Option<Box<TypeDecl>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub banner: Option<String>,
    pub usings: Vec<String>,
    pub namespace: Option<String>,
    pub declaration: TypeDecl,
}
