//! Recursive-descent parser. Binary expressions are parsed by precedence
//! climbing rather than one hand-written function per grammar level; the
//! resulting tree still has one `Expr::Binary` node per operator use, so
//! downstream passes see exactly the structure the grammar describes.

use crate::ast::*;
use crate::error::CompileError;
use crate::lexer::{Token, TokenKind};

pub fn parse(tokens: Vec<Token>) -> Result<CompUnit, CompileError> {
    Parser {
        tokens,
        pos: 0,
    }
    .parse_comp_unit()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// Binding power table for binary operators, tightest last. Matches the
/// precedence cascade UnaryExp < MulExp < AddExp < RelExp < EqExp < LAndExp < LOrExp.
fn binop_power(kind: &TokenKind) -> Option<(BinOp, u8)> {
    use TokenKind::*;
    Some(match kind {
        OrOr => (BinOp::Or, 1),
        AndAnd => (BinOp::And, 2),
        Eq => (BinOp::Eq, 3),
        Ne => (BinOp::Ne, 3),
        Lt => (BinOp::Lt, 4),
        Gt => (BinOp::Gt, 4),
        Le => (BinOp::Le, 4),
        Ge => (BinOp::Ge, 4),
        Plus => (BinOp::Add, 5),
        Minus => (BinOp::Sub, 5),
        Star => (BinOp::Mul, 6),
        Slash => (BinOp::Div, 6),
        Percent => (BinOp::Mod, 6),
        _ => return None,
    })
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn line(&self) -> usize {
        self.tokens[self.pos].line
    }

    fn bump(&mut self) -> TokenKind {
        let tok = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, want: &TokenKind) -> Result<(), CompileError> {
        if self.peek() == want {
            self.bump();
            Ok(())
        } else {
            Err(CompileError::Syntax {
                line: self.line(),
                message: format!("expected {want:?}, found {}", self.peek()),
            })
        }
    }

    fn expect_ident(&mut self) -> Result<Ident, CompileError> {
        match self.bump() {
            TokenKind::Ident(s) => Ok(s),
            other => Err(CompileError::Syntax {
                line: self.line(),
                message: format!("expected identifier, found {other}"),
            }),
        }
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    // CompUnit -> (Decl | FuncDef)*
    fn parse_comp_unit(&mut self) -> Result<CompUnit, CompileError> {
        let mut items = Vec::new();
        while !self.at(&TokenKind::Eof) {
            items.push(self.parse_global_item()?);
        }
        Ok(CompUnit { items })
    }

    fn parse_global_item(&mut self) -> Result<GlobalItem, CompileError> {
        if self.at(&TokenKind::KwConst) {
            return Ok(GlobalItem::Decl(self.parse_decl()?));
        }
        // Both decls and func defs start with a base type; disambiguate by
        // looking past `ident` for `(`.
        let ret_ty = self.parse_btype_or_void()?;
        let name = self.expect_ident()?;
        if self.at(&TokenKind::LParen) {
            Ok(GlobalItem::FuncDef(self.parse_func_def_rest(ret_ty, name)?))
        } else {
            Ok(GlobalItem::Decl(Decl::Var(vec![
                self.parse_var_def_rest(name)?
            ])
            .chain_var_defs(self)?))
        }
    }

    fn parse_btype_or_void(&mut self) -> Result<FuncRetTy, CompileError> {
        match self.bump() {
            TokenKind::KwInt => Ok(FuncRetTy::Int),
            TokenKind::KwVoid => Ok(FuncRetTy::Void),
            other => Err(CompileError::Syntax {
                line: self.line(),
                message: format!("expected 'int' or 'void', found {other}"),
            }),
        }
    }

    fn parse_func_def_rest(
        &mut self,
        ret_ty: FuncRetTy,
        name: Ident,
    ) -> Result<FuncDef, CompileError> {
        let line = self.line();
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                params.push(self.parse_func_param()?);
                if self.at(&TokenKind::Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(FuncDef {
            ret_ty,
            name,
            params,
            body,
            line,
        })
    }

    fn parse_func_param(&mut self) -> Result<FuncParam, CompileError> {
        let line = self.line();
        self.expect(&TokenKind::KwInt)?;
        let name = self.expect_ident()?;
        if self.at(&TokenKind::LBracket) {
            self.bump();
            self.expect(&TokenKind::RBracket)?;
            let mut dims = Vec::new();
            while self.at(&TokenKind::LBracket) {
                self.bump();
                dims.push(self.parse_expr()?);
                self.expect(&TokenKind::RBracket)?;
            }
            Ok(FuncParam {
                name,
                array_dims: Some(dims),
                line,
            })
        } else {
            Ok(FuncParam {
                name,
                array_dims: None,
                line,
            })
        }
    }

    // Decl -> ConstDecl | VarDecl, both `int`-based, possibly many defs.
    fn parse_decl(&mut self) -> Result<Decl, CompileError> {
        if self.at(&TokenKind::KwConst) {
            self.bump();
            self.expect(&TokenKind::KwInt)?;
            let mut defs = vec![self.parse_const_def()?];
            while self.at(&TokenKind::Comma) {
                self.bump();
                defs.push(self.parse_const_def()?);
            }
            self.expect(&TokenKind::Semi)?;
            Ok(Decl::Const(defs))
        } else {
            self.expect(&TokenKind::KwInt)?;
            let name = self.expect_ident()?;
            let def = self.parse_var_def_rest(name)?;
            let mut defs = vec![def];
            while self.at(&TokenKind::Comma) {
                self.bump();
                let name = self.expect_ident()?;
                defs.push(self.parse_var_def_rest(name)?);
            }
            self.expect(&TokenKind::Semi)?;
            Ok(Decl::Var(defs))
        }
    }

    fn parse_const_def(&mut self) -> Result<ConstDef, CompileError> {
        let line = self.line();
        let name = self.expect_ident()?;
        let mut dims = Vec::new();
        while self.at(&TokenKind::LBracket) {
            self.bump();
            dims.push(self.parse_expr()?);
            self.expect(&TokenKind::RBracket)?;
        }
        self.expect(&TokenKind::Assign)?;
        let init = self.parse_const_init_val()?;
        Ok(ConstDef {
            name,
            dims,
            init,
            line,
        })
    }

    fn parse_const_init_val(&mut self) -> Result<ConstInitVal, CompileError> {
        if self.at(&TokenKind::LBrace) {
            self.bump();
            let mut items = Vec::new();
            if !self.at(&TokenKind::RBrace) {
                items.push(self.parse_const_init_val()?);
                while self.at(&TokenKind::Comma) {
                    self.bump();
                    items.push(self.parse_const_init_val()?);
                }
            }
            self.expect(&TokenKind::RBrace)?;
            Ok(ConstInitVal::List(items))
        } else {
            Ok(ConstInitVal::Exp(self.parse_expr()?))
        }
    }

    /// Parses a VarDef assuming `int` and the first identifier are consumed.
    fn parse_var_def_rest(&mut self, name: Ident) -> Result<VarDef, CompileError> {
        let line = self.line();
        let mut dims = Vec::new();
        while self.at(&TokenKind::LBracket) {
            self.bump();
            dims.push(self.parse_expr()?);
            self.expect(&TokenKind::RBracket)?;
        }
        let init = if self.at(&TokenKind::Assign) {
            self.bump();
            Some(self.parse_init_val()?)
        } else {
            None
        };
        Ok(VarDef {
            name,
            dims,
            init,
            line,
        })
    }

    fn parse_init_val(&mut self) -> Result<InitVal, CompileError> {
        if self.at(&TokenKind::LBrace) {
            self.bump();
            let mut items = Vec::new();
            if !self.at(&TokenKind::RBrace) {
                items.push(self.parse_init_val()?);
                while self.at(&TokenKind::Comma) {
                    self.bump();
                    items.push(self.parse_init_val()?);
                }
            }
            self.expect(&TokenKind::RBrace)?;
            Ok(InitVal::List(items))
        } else {
            Ok(InitVal::Exp(self.parse_expr()?))
        }
    }

    fn parse_block(&mut self) -> Result<Block, CompileError> {
        self.expect(&TokenKind::LBrace)?;
        let mut items = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            items.push(self.parse_block_item()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Block { items })
    }

    fn parse_block_item(&mut self) -> Result<BlockItem, CompileError> {
        if self.at(&TokenKind::KwConst) || self.at(&TokenKind::KwInt) {
            Ok(BlockItem::Decl(self.parse_decl()?))
        } else {
            Ok(BlockItem::Stmt(self.parse_stmt()?))
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, CompileError> {
        match self.peek() {
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Semi => {
                self.bump();
                Ok(Stmt::ExprStmt(None))
            }
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwBreak => {
                let line = self.line();
                self.bump();
                self.expect(&TokenKind::Semi)?;
                Ok(Stmt::Break { line })
            }
            TokenKind::KwContinue => {
                let line = self.line();
                self.bump();
                self.expect(&TokenKind::Semi)?;
                Ok(Stmt::Continue { line })
            }
            TokenKind::KwReturn => {
                let line = self.line();
                self.bump();
                if self.at(&TokenKind::Semi) {
                    self.bump();
                    Ok(Stmt::Return(None, line))
                } else {
                    let e = self.parse_expr()?;
                    self.expect(&TokenKind::Semi)?;
                    Ok(Stmt::Return(Some(e), line))
                }
            }
            _ => self.parse_assign_or_expr_stmt(),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, CompileError> {
        self.expect(&TokenKind::KwIf)?;
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let then_branch = Box::new(self.parse_stmt()?);
        // Dangling else binds to the nearest unmatched `if`.
        let else_branch = if self.at(&TokenKind::KwElse) {
            self.bump();
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(Stmt::If(cond, then_branch, else_branch))
    }

    fn parse_while(&mut self) -> Result<Stmt, CompileError> {
        self.expect(&TokenKind::KwWhile)?;
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::While(cond, body))
    }

    /// Disambiguates `LVal '=' Exp ';'` from `Exp ';'` by speculatively
    /// parsing the primary-expression prefix first.
    fn parse_assign_or_expr_stmt(&mut self) -> Result<Stmt, CompileError> {
        let checkpoint = self.pos;
        if let TokenKind::Ident(_) = self.peek().clone() {
            let line = self.line();
            let name = self.expect_ident()?;
            let mut indices = Vec::new();
            while self.at(&TokenKind::LBracket) {
                self.bump();
                indices.push(self.parse_expr()?);
                self.expect(&TokenKind::RBracket)?;
            }
            if self.at(&TokenKind::Assign) {
                self.bump();
                let rhs = self.parse_expr()?;
                self.expect(&TokenKind::Semi)?;
                return Ok(Stmt::Assign(
                    LVal {
                        name,
                        indices,
                        line,
                    },
                    rhs,
                ));
            }
        }
        self.pos = checkpoint;
        let e = self.parse_expr()?;
        self.expect(&TokenKind::Semi)?;
        Ok(Stmt::ExprStmt(Some(e)))
    }

    fn parse_expr(&mut self) -> Result<Expr, CompileError> {
        self.parse_binary_expr(0)
    }

    fn parse_binary_expr(&mut self, min_power: u8) -> Result<Expr, CompileError> {
        let mut lhs = self.parse_unary_expr()?;
        loop {
            let Some((op, power)) = binop_power(self.peek()) else {
                break;
            };
            if power < min_power {
                break;
            }
            self.bump();
            let rhs = self.parse_binary_expr(power + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, CompileError> {
        match self.peek() {
            TokenKind::Plus => {
                self.bump();
                Ok(Expr::Unary(UnaryOp::Pos, Box::new(self.parse_unary_expr()?)))
            }
            TokenKind::Minus => {
                self.bump();
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary_expr()?)))
            }
            TokenKind::Not => {
                self.bump();
                Ok(Expr::Unary(UnaryOp::Not, Box::new(self.parse_unary_expr()?)))
            }
            _ => self.parse_postfix_expr(),
        }
    }

    fn parse_postfix_expr(&mut self) -> Result<Expr, CompileError> {
        match self.peek().clone() {
            TokenKind::IntLit(v) => {
                self.bump();
                Ok(Expr::Number(v))
            }
            TokenKind::LParen => {
                self.bump();
                let e = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(e)
            }
            TokenKind::Ident(_) => {
                let line = self.line();
                let name = self.expect_ident()?;
                if self.at(&TokenKind::LParen) {
                    self.bump();
                    let mut args = Vec::new();
                    if !self.at(&TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        while self.at(&TokenKind::Comma) {
                            self.bump();
                            args.push(self.parse_expr()?);
                        }
                    }
                    self.expect(&TokenKind::RParen)?;
                    Ok(Expr::Call(name, args, line))
                } else {
                    let mut indices = Vec::new();
                    while self.at(&TokenKind::LBracket) {
                        self.bump();
                        indices.push(self.parse_expr()?);
                        self.expect(&TokenKind::RBracket)?;
                    }
                    Ok(Expr::LVal(LVal {
                        name,
                        indices,
                        line,
                    }))
                }
            }
            other => Err(CompileError::Syntax {
                line: self.line(),
                message: format!("unexpected token {other} in expression"),
            }),
        }
    }
}

/// Small helper so `parse_global_item` can build a multi-def `int a, b;`
/// the same way `parse_decl` does, without duplicating the comma loop.
trait ChainVarDefs {
    fn chain_var_defs(self, p: &mut Parser) -> Result<Decl, CompileError>;
}

impl ChainVarDefs for Decl {
    fn chain_var_defs(self, p: &mut Parser) -> Result<Decl, CompileError> {
        let Decl::Var(mut defs) = self else {
            unreachable!()
        };
        while p.at(&TokenKind::Comma) {
            p.bump();
            let name = p.expect_ident()?;
            defs.push(p.parse_var_def_rest(name)?);
        }
        p.expect(&TokenKind::Semi)?;
        Ok(Decl::Var(defs))
    }
}
