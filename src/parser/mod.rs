//! Parser for the Lore language.
//!
//! Recursive descent over the token buffer. Statements are distinguished
//! purely by the `text` of the next few tokens — the lexer never classifies
//! reserved words, so phrases like `the story ends at` are recognized here by
//! lookahead. On a parse error the offending statement is reported and
//! dropped, and parsing resumes at the next statement anchor.

use std::{error::Error, fmt::Display};

use crate::{
    ast::{Expr, Param, Stmt},
    lexer::{Token, TokenKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(String);

pub type ParseResult<T> = Result<T, ParseError>;

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Error for ParseError {}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// The token sequence must end with an `Eof` token, as produced by
    /// [`crate::lexer::Lexer::scan_tokens`].
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parses the whole token sequence into top-level statements. Errors are
    /// reported on standard error; the faulted statement is dropped and
    /// parsing continues after synchronization.
    pub fn parse(mut self) -> Vec<Stmt> {
        let mut statements = vec![];

        while !self.is_at_end() {
            match self.statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    eprintln!("Line {}: Parse Error: {}", self.peek().line, error);
                    self.synchronize();
                }
            }
        }

        statements
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.peek().text == "a" && self.peek_at(1).text == "value" {
            return self.declaration();
        }
        if self.peek().text == "for" && self.peek_at(1).text == "procedure" {
            return self.procedure_declaration();
        }
        if self.peek().text == "perform" {
            return self.procedure_call_statement();
        }
        if self.peek().text == "the" && self.peek_at(1).text == "result" {
            return self.return_statement();
        }
        if self.peek().text == "the" && self.peek_at(1).text == "story" && self.peek_at(2).text == "ends"
        {
            if self.peek_at(3).text == "at" {
                return self.break_statement();
            }

            return self.print_statement();
        }
        if self.peek().text == "the" && self.peek_at(1).text == "story" {
            return self.print_statement();
        }
        if self.peek().text == "if" {
            return self.if_statement();
        }
        if self.peek().text == "while" {
            return self.while_statement();
        }

        self.expression_statement()
    }

    fn declaration(&mut self) -> ParseResult<Stmt> {
        self.advance();
        self.advance();
        let name = self.consume_keyword("Expected variable name.")?;
        self.consume(",", "Expected ','.")?;
        self.consume("type", "Expected 'type'.")?;
        let ty = self.consume_keyword("Expected type name.")?;
        self.consume(",", "Expected ','.")?;

        let is_mutable = if self.match_phrase(&["begins", "at"]) {
            true
        } else if self.match_phrase(&["is", "revealed", "as"]) {
            false
        } else {
            return Err(ParseError("Expected 'begins at' or 'is revealed as'.".to_owned()));
        };

        let initializer = self.expression()?;
        self.consume(".", "Expected '.' after declaration.")?;

        Ok(Stmt::Declaration {
            name,
            ty,
            initializer,
            is_mutable,
        })
    }

    fn procedure_declaration(&mut self) -> ParseResult<Stmt> {
        self.consume("for", "Expected 'for'.")?;
        self.consume("procedure", "Expected 'procedure'.")?;
        self.consume("named", "Expected 'named'.")?;
        self.consume("'", "Expected single quote before procedure name.")?;
        let name = self.consume_keyword("Expected procedure name.")?;
        self.consume("'", "Expected single quote after procedure name.")?;

        let mut params = vec![];
        self.consume("accepting", "Expected 'accepting'.")?;
        self.consume("(", "Expected '(' for parameter list.")?;

        if self.peek().text != ")" {
            loop {
                let param_name = self.consume_keyword("Expected parameter name.")?;
                self.consume("as", "Expected 'as'.")?;
                let param_type = self.consume_keyword("Expected parameter type.")?;
                params.push(Param {
                    name: param_name,
                    ty: param_type,
                });

                if !self.match_phrase(&[","]) {
                    break;
                }
            }
        }

        self.consume(")", "Expected ')' after parameter list.")?;

        let return_type = if self.match_phrase(&["and", "yielding"]) {
            Some(self.consume_keyword("Expected return type.")?)
        } else {
            None
        };

        self.consume(",", "Expected ',' after procedure header.")?;
        self.consume("tell", "Expected 'tell'.")?;
        self.consume("the", "Expected 'the'.")?;
        self.consume("following", "Expected 'following'.")?;
        self.consume("story", "Expected 'story'.")?;
        self.consume(":", "Expected ':' after 'story'.")?;
        let body = self.block()?;

        Ok(Stmt::ProcedureDecl {
            name,
            params,
            return_type,
            body: Box::new(body),
        })
    }

    fn procedure_call_statement(&mut self) -> ParseResult<Stmt> {
        self.consume("perform", "Expected 'perform'.")?;
        self.consume("the", "Expected 'the'.")?;
        self.consume("story", "Expected 'story'.")?;
        self.consume("of", "Expected 'of'.")?;
        self.consume("'", "Expected single quote before procedure name.")?;
        let callee = self.consume_keyword("Expected procedure name to call.")?;
        self.consume("'", "Expected single quote after procedure name.")?;

        let mut arguments = vec![];
        self.consume("using", "Expected 'using'.")?;
        self.consume("(", "Expected '(' for arguments.")?;

        if self.peek().text != ")" {
            loop {
                arguments.push(self.expression()?);

                if !self.match_phrase(&[","]) {
                    break;
                }
            }
        }

        self.consume(")", "Expected ')' after arguments.")?;
        self.consume(".", "Expected '.' after procedure call.")?;

        Ok(Stmt::ProcedureCall { callee, arguments })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        self.consume("the", "Expected 'the'.")?;
        self.consume("result", "Expected 'result'.")?;
        self.consume("shall", "Expected 'shall'.")?;
        self.consume("be", "Expected 'be'.")?;
        let value = self.expression()?;
        self.consume(".", "Expected '.' after return value.")?;

        Ok(Stmt::Return(value))
    }

    fn break_statement(&mut self) -> ParseResult<Stmt> {
        self.consume("the", "Expected 'the'.")?;
        self.consume("story", "Expected 'story'.")?;
        self.consume("ends", "Expected 'ends'.")?;
        self.consume("at", "Expected 'at'.")?;
        self.consume("this", "Expected 'this'.")?;
        self.consume("moment", "Expected 'moment'.")?;
        self.consume(".", "Expected '.' after 'the story ends at this moment'.")?;

        Ok(Stmt::Break)
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        self.consume("the", "Expected 'the'.")?;
        self.consume("story", "Expected 'story'.")?;

        if self.peek().text == "tells" {
            self.advance();
            self.consume(":", "Expected ':' after 'tells'.")?;
            let value = self.expression()?;
            self.consume(".", "Expected '.' after print expression.")?;
            return Ok(Stmt::Print(value));
        }

        if self.peek().text == "ends" {
            self.advance();
            self.consume("a", "Expected 'a'.")?;
            self.consume("line", "Expected 'line'.")?;
            self.consume(".", "Expected '.' after 'ends a line'.")?;
            return Ok(Stmt::Newline);
        }

        Err(ParseError(
            "Unrecognized story action. Expected 'tells:' or 'ends a line'.".to_owned(),
        ))
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume("if", "Expected 'if'.")?;
        let condition = self.expression()?;

        self.consume("is", "Expected 'is' after the condition.")?;
        self.consume("met", "Expected 'met' after 'is'.")?;
        self.consume(",", "Expected ',' after 'met'.")?;
        self.consume("tell", "Expected 'tell'.")?;
        self.consume("the", "Expected 'the'.")?;
        self.consume("following", "Expected 'following'.")?;
        self.consume("story", "Expected 'story'.")?;
        self.consume(":", "Expected ':' after 'story'.")?;
        let then_branch = self.block()?;

        Ok(Stmt::If {
            condition,
            then_branch: Box::new(then_branch),
        })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume("while", "Expected 'while'.")?;
        let condition = self.expression()?;
        self.consume("holds", "Expected 'holds' after condition.")?;
        self.consume(",", "Expected ',' after 'holds'.")?;
        self.consume("tell", "Expected 'tell'.")?;
        self.consume("the", "Expected 'the'.")?;
        self.consume("following", "Expected 'following'.")?;
        self.consume("story", "Expected 'story'.")?;
        self.consume(":", "Expected ':' after 'story'.")?;
        let body = self.block()?;

        Ok(Stmt::While {
            condition,
            body: Box::new(body),
        })
    }

    fn block(&mut self) -> ParseResult<Stmt> {
        self.consume("beginning", "Expected 'beginning'.")?;
        self.consume("of", "Expected 'of'.")?;
        self.consume("the", "Expected 'the'.")?;
        self.consume("story", "Expected 'story'.")?;

        let mut statements = vec![];

        while self.peek().text != "end" {
            statements.push(self.statement()?);

            if self.is_at_end() {
                return Err(ParseError(
                    "Unterminated block statement, missing 'end of the story'.".to_owned(),
                ));
            }
        }

        self.consume("end", "Expected 'end'.")?;
        self.consume("of", "Expected 'of'.")?;
        self.consume("the", "Expected 'the'.")?;
        self.consume("story", "Expected 'story'.")?;
        self.consume(".", "Expected '.' after 'end of the story'.")?;

        Ok(Stmt::Block(statements))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(".", "Expected '.' after a statement.")?;

        Ok(Stmt::Expression(expr))
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        // Assignment reads `the value <name> continues as <expr>`; the name
        // position (offset 2) is deliberately not inspected here.
        if self.peek().text == "the"
            && self.peek_at(1).text == "value"
            && self.peek_at(3).text == "continues"
            && self.peek_at(4).text == "as"
        {
            self.advance();
            self.advance();
            let name = self.consume_keyword("Expected variable name in assignment.")?;
            self.consume("continues", "Expected 'continues as'.")?;
            self.consume("as", "Expected 'continues as'.")?;
            let value = self.expression()?;

            return Ok(Expr::Assign {
                name,
                value: Box::new(value),
            });
        }

        self.logic_or()
    }

    fn logic_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.logic_and()?;

        while self.match_phrase(&["or"]) {
            let op = self.previous();
            let right = self.logic_and()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while self.match_phrase(&["and"]) {
            let op = self.previous();
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.addition()?;

        while self.peek().text == "is" {
            // `is met` terminates an if condition, not a comparison.
            if self.peek_at(1).text == "met" {
                break;
            }

            let mut op = self.advance();

            if matches!(self.peek().text.as_str(), "greater" | "less" | "equal") {
                let op_part2 = self.advance();
                op.text.push(' ');
                op.text.push_str(&op_part2.text);

                if op_part2.text == "greater" || op_part2.text == "less" {
                    self.consume("than", "Expected 'than'.")?;
                    op.text.push_str(" than");
                } else {
                    self.consume("to", "Expected 'to'.")?;
                    op.text.push_str(" to");
                }

                let right = self.addition()?;
                expr = Expr::Comparison {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                };
            } else {
                // Not a comparison after all; give the 'is' back.
                self.current -= 1;
                break;
            }
        }

        Ok(expr)
    }

    fn addition(&mut self) -> ParseResult<Expr> {
        let mut expr = self.multiplication()?;

        while self.peek().text == "plus" || self.peek().text == "minus" {
            let op = self.advance();
            let right = self.multiplication()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn multiplication(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while self.peek().text == "multiplied" || self.peek().text == "divided" {
            let op = self.advance();
            self.consume("by", "Expected 'by'.")?;
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.match_phrase(&["not"]) {
            let op = self.previous();
            let right = self.unary()?;
            return Ok(Expr::Unary {
                op,
                right: Box::new(right),
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if matches!(
            self.peek().kind,
            TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
                | TokenKind::BoolLiteral
        ) {
            return Ok(Expr::Literal {
                value: self.advance(),
            });
        }

        if self.peek().text == "the" && self.peek_at(1).text == "story" {
            return self.function_call_expression();
        }

        if self.peek().kind == TokenKind::Keyword {
            return Ok(Expr::Variable {
                name: self.advance(),
            });
        }

        Err(ParseError(format!(
            "Expected an expression, got '{}'.",
            self.peek().text
        )))
    }

    fn function_call_expression(&mut self) -> ParseResult<Expr> {
        self.consume("the", "Expected 'the'.")?;
        self.consume("story", "Expected 'story'.")?;
        self.consume("of", "Expected 'of'.")?;
        self.consume("'", "Expected ' before function name.")?;
        let callee = self.consume_keyword("Expected function name.")?;
        self.consume("'", "Expected ' after function name.")?;

        let mut arguments = vec![];
        self.consume("using", "Expected 'using'.")?;
        self.consume("(", "Expected '(' for arguments.")?;

        if self.peek().text != ")" {
            loop {
                arguments.push(self.expression()?);

                if !self.match_phrase(&[","]) {
                    break;
                }
            }
        }

        self.consume(")", "Expected ')' after arguments.")?;

        Ok(Expr::FunctionCall { callee, arguments })
    }

    /// Advances past the whole phrase if every token text matches in order;
    /// otherwise leaves the cursor untouched.
    fn match_phrase(&mut self, texts: &[&str]) -> bool {
        for (offset, text) in texts.iter().enumerate() {
            match self.tokens.get(self.current + offset) {
                Some(token) if token.text == *text => {}
                _ => return false,
            }
        }

        self.current += texts.len();

        true
    }

    fn consume(&mut self, expected: &str, message: &str) -> ParseResult<Token> {
        if self.is_at_end() {
            return Err(ParseError(format!("Unexpected end of file. {message}")));
        }

        if self.peek().text == expected {
            return Ok(self.advance());
        }

        Err(ParseError(format!(
            "{message} Got '{}' instead of '{}'.",
            self.peek().text,
            expected
        )))
    }

    fn consume_keyword(&mut self, message: &str) -> ParseResult<Token> {
        if self.is_at_end() {
            return Err(ParseError(format!("Unexpected end of file. {message}")));
        }

        if self.peek().kind == TokenKind::Keyword {
            return Ok(self.advance());
        }

        Err(ParseError(format!(
            "{message} Got '{}' instead of '{}'.",
            self.peek().text,
            TokenKind::Keyword
        )))
    }

    /// Skips tokens until a statement anchor so one faulted statement cannot
    /// cascade into the next.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().text == "." {
                return;
            }

            if matches!(
                self.peek().text.as_str(),
                "a" | "for" | "if" | "while" | "perform" | "the"
            ) {
                return;
            }

            self.advance();
        }
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    fn previous(&self) -> Token {
        self.tokens[self.current - 1].clone()
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Looks ahead `offset` tokens, clamping at the trailing `Eof`.
    fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }
}
