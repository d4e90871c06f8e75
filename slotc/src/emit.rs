//! Lowering of the AST into code objects.
//!
//! Expressions [`Compile`] into the current [`CodeBuilder`]; literal boxes
//! [`Encode`] into standalone literal blocks. A [`CodeBox`] does both: it
//! encodes by compiling its body into a fresh builder and rendering it.

use bytecode::{CodeBuilder, CompileError, LiteralWriter, StackAccounting};
use parser::ast::{
    CodeBox, CompleteSymbol, Expr, ExprKind, LiteralBox, ObjectBox,
};

/// Writes instructions into an emission context and hands it back.
pub trait Compile {
    fn compile<'c>(
        &self,
        ctx: &'c mut CodeBuilder,
    ) -> Result<&'c mut CodeBuilder, CompileError>;
}

/// Serializes a value as a self-contained literal block.
pub trait Encode {
    fn encode(
        &self,
        accounting: StackAccounting,
    ) -> Result<Vec<u8>, CompileError>;
}

impl Compile for Expr {
    fn compile<'c>(
        &self,
        ctx: &'c mut CodeBuilder,
    ) -> Result<&'c mut CodeBuilder, CompileError> {
        match &self.kind {
            ExprKind::Literal(value) => {
                let bytes = value.encode(ctx.accounting())?;
                ctx.load_literal(bytes)?;
            }
            ExprKind::Myself => ctx.push_myself(),
            ExprKind::Send {
                receiver,
                selector,
                parameters,
            } => {
                receiver.compile(ctx)?;
                for parameter in parameters {
                    parameter.compile(ctx)?;
                }
                let arity = parameters.len() as u64;
                let symbol = selector.finish(arity).encode(ctx.accounting())?;
                let idx = ctx.add_literal(symbol)?;
                ctx.send(idx, arity);
            }
            ExprKind::ExplicitReturn(value) => {
                value.compile(ctx)?;
                ctx.return_explicit();
            }
        }
        Ok(ctx)
    }
}

/// Every expression but the last is followed by `Pull`. An empty body
/// yields none.
impl Compile for CodeBox {
    fn compile<'c>(
        &self,
        ctx: &'c mut CodeBuilder,
    ) -> Result<&'c mut CodeBuilder, CompileError> {
        let Some((last, init)) = self.body.split_last() else {
            let none = LiteralBox::None.encode(ctx.accounting())?;
            ctx.load_literal(none)?;
            return Ok(ctx);
        };
        for expr in init {
            expr.compile(ctx)?;
            ctx.pull();
        }
        last.compile(ctx)
    }
}

impl Encode for CodeBox {
    fn encode(
        &self,
        accounting: StackAccounting,
    ) -> Result<Vec<u8>, CompileError> {
        let mut ctx = CodeBuilder::new(accounting);
        self.compile(&mut ctx)?;
        Ok(ctx.render())
    }
}

impl Encode for CompleteSymbol {
    fn encode(&self, _: StackAccounting) -> Result<Vec<u8>, CompileError> {
        let mut w = LiteralWriter::new();
        w.symbol(&self.name, self.arity)?;
        Ok(w.into_bytes())
    }
}

impl Encode for ObjectBox {
    fn encode(
        &self,
        accounting: StackAccounting,
    ) -> Result<Vec<u8>, CompileError> {
        let mut w = LiteralWriter::new();
        w.object(self.slots.len());
        for slot in &self.slots {
            w.symbol(&slot.name.name, slot.name.arity)?;
            w.slot_kind(slot.kind.as_byte());
            w.raw(&slot.value.encode(accounting)?);
        }
        match &self.code {
            Some(code) => w.raw(&code.encode(accounting)?),
            None => w.none(),
        };
        Ok(w.into_bytes())
    }
}

impl Encode for LiteralBox {
    fn encode(
        &self,
        accounting: StackAccounting,
    ) -> Result<Vec<u8>, CompileError> {
        let mut w = LiteralWriter::new();
        match self {
            LiteralBox::Integer(n) => {
                w.integer(*n);
            }
            LiteralBox::String(s) => {
                w.string(s);
            }
            LiteralBox::None => {
                w.none();
            }
            LiteralBox::UnfinishedSymbol(symbol) => {
                return Err(CompileError::UnfinishedSymbol(symbol.name.clone()));
            }
            LiteralBox::CompleteSymbol(symbol) => return symbol.encode(accounting),
            LiteralBox::Code(code) => return code.encode(accounting),
            LiteralBox::Object(object) => return object.encode(accounting),
        }
        Ok(w.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytecode::{CodeObject, Instruction, Literal, Slot, decode};
    use parser::ast::{SlotDef, SlotKind, UnfinishedSymbol};
    use parser::span::Span;
    use pretty_assertions::assert_eq;

    fn span() -> Span {
        Span::point(parser::Pos::origin())
    }

    fn int(n: i64) -> Expr {
        Expr::literal(LiteralBox::Integer(n), span())
    }

    fn send(receiver: Expr, selector: &str, parameters: Vec<Expr>) -> Expr {
        Expr::send(receiver, UnfinishedSymbol::new(selector), parameters, span())
    }

    fn code_of(body: Vec<Expr>) -> CodeObject {
        let bytes = CodeBox::new(body)
            .encode(StackAccounting::MaxDepth)
            .expect("compile");
        match decode(&bytes) {
            Ok(Literal::Code(code)) => code,
            other => panic!("expected code, got {:?}", other),
        }
    }

    #[test]
    fn send_pushes_receiver_then_arguments() {
        let code = code_of(vec![send(Expr::myself(span()), "at", vec![int(4)])]);
        assert_eq!(
            code.instructions,
            vec![
                Instruction::PushMyself,
                Instruction::PushLiteral { idx: 0 },
                Instruction::Send { selector_idx: 1 },
            ]
        );
        assert_eq!(
            code.literals[1],
            Literal::Symbol {
                name: "at".into(),
                arity: 1
            }
        );
        assert_eq!(code.stack_usage, 2);
    }

    #[test]
    fn same_selector_different_arity() {
        let code = code_of(vec![
            send(Expr::myself(span()), "x", vec![]),
            send(Expr::myself(span()), "x", vec![int(1)]),
        ]);
        let arities: Vec<u64> = code
            .literals
            .iter()
            .filter_map(|l| match l {
                Literal::Symbol { arity, .. } => Some(*arity),
                _ => None,
            })
            .collect();
        assert_eq!(arities, vec![0, 1]);
    }

    #[test]
    fn literals_are_not_deduplicated() {
        let code = code_of(vec![int(7), int(7)]);
        assert_eq!(code.literals, vec![Literal::Integer(7); 2]);
    }

    #[test]
    fn explicit_return() {
        let code = code_of(vec![Expr::explicit_return(int(1), span())]);
        assert_eq!(
            code.instructions,
            vec![
                Instruction::PushLiteral { idx: 0 },
                Instruction::ReturnExplicit,
            ]
        );
    }

    #[test]
    fn empty_code_yields_none() {
        let code = code_of(vec![]);
        assert_eq!(code.literals, vec![Literal::None]);
        assert_eq!(
            code.instructions,
            vec![Instruction::PushLiteral { idx: 0 }]
        );
    }

    #[test]
    fn object_serializes_real_slots() {
        let object = ObjectBox {
            slots: vec![SlotDef {
                name: CompleteSymbol::new("x", 0),
                kind: SlotKind::Unspecified,
                value: LiteralBox::Integer(3),
                span: span(),
            }],
            code: Some(CodeBox::new(vec![Expr::myself(span())])),
        };
        let bytes = object.encode(StackAccounting::MaxDepth).expect("compile");
        assert_eq!(
            decode(&bytes),
            Ok(Literal::Object {
                slots: vec![Slot {
                    name: "x".into(),
                    arity: 0,
                    kind: 0,
                    value: Literal::Integer(3),
                }],
                code: Some(CodeObject {
                    stack_usage: 1,
                    literals: vec![],
                    instructions: vec![Instruction::PushMyself],
                }),
            })
        );
    }

    #[test]
    fn unfinished_symbol_cannot_be_encoded() {
        let literal = LiteralBox::UnfinishedSymbol(UnfinishedSymbol::new("foo"));
        assert_eq!(
            literal.encode(StackAccounting::MaxDepth),
            Err(CompileError::UnfinishedSymbol("foo".into()))
        );
    }

    #[test]
    fn non_ascii_selector_is_rejected() {
        let mut ctx = CodeBuilder::default();
        let err = send(Expr::myself(span()), "größe", vec![])
            .compile(&mut ctx)
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, CompileError::NonAsciiSymbol("größe".into()));
    }
}
