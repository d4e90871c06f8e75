//! Abstract syntax tree nodes and literal-value boxes.
//!
//! The parser produces a [`CodeBox`] holding a sequence of [`Expr`]
//! nodes. Each node carries a [`Span`] so that downstream consumers
//! (error reporting, tooling) know the exact source location.
//!
//! Both node kinds and literal kinds are closed enums: every consumer
//! matches them exhaustively.
//!
//! # Textual form
//!
//! `Display` renders nodes as s-expressions, which is what the driver
//! prints for `--emit ast` and what the tests compare against:
//!
//! ```text
//! a + b + c   =>   (send (send self a) + (send (send self b) + (send self c)))
//! ```
use std::fmt;

use crate::span::Span;

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn myself(span: Span) -> Self {
        Self::new(ExprKind::Myself, span)
    }

    pub fn literal(value: LiteralBox, span: Span) -> Self {
        Self::new(ExprKind::Literal(value), span)
    }

    pub fn send(
        receiver: Expr,
        selector: UnfinishedSymbol,
        parameters: Vec<Expr>,
        span: Span,
    ) -> Self {
        Self::new(
            ExprKind::Send {
                receiver: Box::new(receiver),
                selector,
                parameters,
            },
            span,
        )
    }

    pub fn explicit_return(value: Expr, span: Span) -> Self {
        Self::new(ExprKind::ExplicitReturn(Box::new(value)), span)
    }
}

/// The different forms an expression can take.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A message send. The selector's arity is `parameters.len()`.
    Send {
        receiver: Box<Expr>,
        selector: UnfinishedSymbol,
        parameters: Vec<Expr>,
    },
    /// The implicit receiver.
    Myself,
    /// A literal stored in the enclosing code object's literal pool.
    Literal(LiteralBox),
    /// Return the value from the enclosing code body early.
    ExplicitReturn(Box<Expr>),
}

/// A literal value that knows its binary form.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralBox {
    Integer(i64),
    String(String),
    /// The absence value.
    None,
    UnfinishedSymbol(UnfinishedSymbol),
    CompleteSymbol(CompleteSymbol),
    Code(CodeBox),
    Object(ObjectBox),
}

/// A selector whose arity is fixed only once its send is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnfinishedSymbol {
    pub name: String,
}

impl UnfinishedSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn finish(&self, arity: u64) -> CompleteSymbol {
        CompleteSymbol::new(self.name.clone(), arity)
    }
}

/// A selector paired with its arity; `foo/0` and `foo/1` are different
/// messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteSymbol {
    pub name: String,
    pub arity: u64,
}

impl CompleteSymbol {
    pub fn new(name: impl Into<String>, arity: u64) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

/// A body of expressions compiled as a nested code object.
///
/// All but the last expression are evaluated for effect; the last one's
/// value is the result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CodeBox {
    pub body: Vec<Expr>,
}

impl CodeBox {
    pub fn new(body: Vec<Expr>) -> Self {
        Self { body }
    }
}

/// A prototype object literal: `(; name(arity) = value, ... ; body, ;)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectBox {
    pub slots: Vec<SlotDef>,
    pub code: Option<CodeBox>,
}

/// Reserved per-slot marker. Every slot currently carries the same one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SlotKind {
    #[default]
    Unspecified = 0,
}

impl SlotKind {
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotDef {
    pub name: CompleteSymbol,
    pub kind: SlotKind,
    /// Initial value; [`LiteralBox::None`] when no initializer was given.
    pub value: LiteralBox,
    pub span: Span,
}

// ═══════════════════════════════════════════════════════════════════
// S-expression rendering
// ═══════════════════════════════════════════════════════════════════

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Send {
                receiver,
                selector,
                parameters,
            } => {
                write!(f, "(send {} {}", receiver, selector.name)?;
                for p in parameters {
                    write!(f, " {}", p)?;
                }
                write!(f, ")")
            }
            ExprKind::Myself => write!(f, "self"),
            ExprKind::Literal(value) => write!(f, "{}", value),
            ExprKind::ExplicitReturn(value) => write!(f, "(return {})", value),
        }
    }
}

impl fmt::Display for LiteralBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralBox::Integer(v) => write!(f, "{}", v),
            LiteralBox::String(s) => write!(f, "{:?}", s),
            LiteralBox::None => write!(f, "none"),
            LiteralBox::UnfinishedSymbol(s) => write!(f, "#{}", s.name),
            LiteralBox::CompleteSymbol(s) => write!(f, "{}", s),
            LiteralBox::Code(code) => write!(f, "{}", code),
            LiteralBox::Object(object) => write!(f, "{}", object),
        }
    }
}

impl fmt::Display for CompleteSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}/{}", self.name, self.arity)
    }
}

impl fmt::Display for CodeBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(code")?;
        for e in &self.body {
            write!(f, " {}", e)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for ObjectBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(object")?;
        for slot in &self.slots {
            write!(f, " ({} {})", slot.name, slot.value)?;
        }
        if let Some(code) = &self.code {
            write!(f, " {}", code)?;
        }
        write!(f, ")")
    }
}

// ═══════════════════════════════════════════════════════════════════
// Graphviz export
// ═══════════════════════════════════════════════════════════════════

/// Render a program as a Graphviz digraph, one box per node.
pub fn to_dot(program: &CodeBox) -> String {
    let mut dot = Dot::default();
    dot.code(program, "Program");
    dot.render()
}

/// Graphviz statements collected during a walk. Node ids index `labels`.
#[derive(Default)]
struct Dot {
    labels: Vec<String>,
    edges: Vec<(usize, usize, String)>,
}

impl Dot {
    fn node(&mut self, label: impl Into<String>) -> usize {
        self.labels.push(label.into());
        self.labels.len() - 1
    }

    fn edge(&mut self, from: usize, to: usize, label: impl Into<String>) {
        self.edges.push((from, to, label.into()));
    }

    fn render(&self) -> String {
        let mut out = String::from("digraph AST {\n  node [shape=box];\n");
        for (id, label) in self.labels.iter().enumerate() {
            out.push_str(&format!("  n{id} [label=\"{}\"];\n", escape_label(label)));
        }
        for (from, to, label) in &self.edges {
            out.push_str(&format!(
                "  n{from} -> n{to} [label=\"{}\"];\n",
                escape_label(label)
            ));
        }
        out.push_str("}\n");
        out
    }

    fn code(&mut self, code: &CodeBox, title: &str) -> usize {
        let id = self.node(title);
        for (idx, expr) in code.body.iter().enumerate() {
            let child = self.expr(expr);
            self.edge(id, child, format!("expr[{idx}]"));
        }
        id
    }

    fn expr(&mut self, expr: &Expr) -> usize {
        match &expr.kind {
            ExprKind::Send {
                receiver,
                selector,
                parameters,
            } => {
                let id = self.node(format!(
                    "Send({}/{})",
                    selector.name,
                    parameters.len()
                ));
                let child = self.expr(receiver);
                self.edge(id, child, "receiver");
                for (idx, parameter) in parameters.iter().enumerate() {
                    let child = self.expr(parameter);
                    self.edge(id, child, format!("param[{idx}]"));
                }
                id
            }
            ExprKind::Myself => self.node("Myself"),
            ExprKind::Literal(value) => self.literal(value),
            ExprKind::ExplicitReturn(value) => {
                let id = self.node("ExplicitReturn");
                let child = self.expr(value);
                self.edge(id, child, "value");
                id
            }
        }
    }

    fn literal(&mut self, value: &LiteralBox) -> usize {
        match value {
            LiteralBox::Code(code) => self.code(code, "Code"),
            LiteralBox::Object(object) => {
                let id = self.node("Object");
                for slot in &object.slots {
                    let child = self.literal(&slot.value);
                    self.edge(id, child, slot.name.to_string());
                }
                if let Some(code) = &object.code {
                    let child = self.code(code, "Code");
                    self.edge(id, child, "code");
                }
                id
            }
            scalar => self.node(scalar.to_string()),
        }
    }
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Pos;

    fn span() -> Span {
        Span::point(Pos::origin())
    }

    fn implicit(name: &str) -> Expr {
        Expr::send(Expr::myself(span()), UnfinishedSymbol::new(name), vec![], span())
    }

    #[test]
    fn finish_attaches_arity() {
        let sym = UnfinishedSymbol::new("at");
        assert_eq!(sym.finish(2), CompleteSymbol::new("at", 2));
    }

    #[test]
    fn display_send_tree() {
        let e = Expr::send(
            implicit("a"),
            UnfinishedSymbol::new("+"),
            vec![Expr::literal(LiteralBox::Integer(1), span())],
            span(),
        );
        assert_eq!(e.to_string(), "(send (send self a) + 1)");
    }

    #[test]
    fn display_object_literal() {
        let obj = ObjectBox {
            slots: vec![SlotDef {
                name: CompleteSymbol::new("x", 0),
                kind: SlotKind::Unspecified,
                value: LiteralBox::String("hi".into()),
                span: span(),
            }],
            code: Some(CodeBox::new(vec![implicit("x")])),
        };
        assert_eq!(
            LiteralBox::Object(obj).to_string(),
            "(object (#x/0 \"hi\") (code (send self x)))"
        );
    }

    #[test]
    fn graphviz_export_basic() {
        let program = CodeBox::new(vec![Expr::explicit_return(
            implicit("a"),
            span(),
        )]);
        let dot = to_dot(&program);
        assert!(dot.starts_with("digraph AST {"));
        assert!(dot.contains("ExplicitReturn"));
        assert!(dot.contains("Send(a/0)"));
        assert!(dot.contains("n0 -> n1 [label=\"expr[0]\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn escape_quotes_in_labels() {
        assert_eq!(escape_label("a\"b\\c"), "a\\\"b\\\\c");
    }
}
