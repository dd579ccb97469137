//! Análisis sintáctico.
//!
//! Parser descendente recursivo de una sola pasada. Además de construir
//! el árbol sintáctico, esta fase conduce el análisis semántico en línea
//! (ver [`crate::semantic`]) e infiere el tipo de cada expresión que
//! reconoce.
//!
//! # Recuperación de errores
//! La recuperación es local: un lexema inesperado se reporta y no se
//! consume, y la regla que lo esperaba continúa con lo que sigue. El
//! parser nunca aborta la pasada. Las sentencias que contienen errores
//! sintácticos se reportan pero no forman parte del árbol resultante,
//! por lo cual las fases posteriores solo observan sentencias completas.

use std::fmt::{self, Display};
use thiserror::Error;

use crate::{
    lex::{Category, Identifier, Lexed, Lexeme},
    semantic::{Analyzer, SemanticError, SymbolTable, Type},
    source::{Located, Location},
};

/// Literal entero máximo.
const INT_MAX: i32 = i32::MAX;

#[derive(Debug, Clone)]
pub struct Ast(Vec<Statement>);

impl Ast {
    pub fn statements(&self) -> &[Statement] {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub enum Statement {
    Declaration {
        name: Located<Identifier>,
        of: Type,
        value: Option<Located<Expr>>,
    },

    Assignment {
        target: Located<Identifier>,
        value: Located<Expr>,
    },

    If {
        condition: Condition,
        body: Vec<Statement>,
        otherwise: Option<Vec<Statement>>,
    },

    Print(Located<Expr>),
}

/// Comparación que controla a un `if`.
#[derive(Debug, Clone)]
pub struct Condition {
    pub lhs: Located<Expr>,
    pub op: RelOp,
    pub rhs: Located<Expr>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Integer(i32),
    Real(f64),
    Read(Identifier),
    Binary(Box<Located<Expr>>, BinOp, Box<Located<Expr>>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 0,
            BinOp::Mul | BinOp::Div => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RelOp {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Expr {
    /// Variable leída por esta expresión, si consiste únicamente de eso.
    pub fn as_variable(&self) -> Option<&Identifier> {
        match self {
            Expr::Read(id) => Some(id),
            _ => None,
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(_, op, _) => op.precedence(),
            _ => u8::MAX,
        }
    }
}

/// Forma textual normalizada, con los paréntesis mínimos necesarios.
impl Display for Expr {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(integer) => write!(fmt, "{}", integer),
            Expr::Real(real) => write!(fmt, "{:?}", real),
            Expr::Read(id) => write!(fmt, "{}", id),

            Expr::Binary(lhs, op, rhs) => {
                let (lhs, rhs) = (lhs.val(), rhs.val());

                // Asociatividad izquierda: el lado derecho requiere
                // paréntesis incluso con la misma precedencia
                if lhs.precedence() < op.precedence() {
                    write!(fmt, "({})", lhs)?;
                } else {
                    write!(fmt, "{}", lhs)?;
                }

                write!(fmt, " {} ", op)?;

                if rhs.precedence() <= op.precedence() {
                    write!(fmt, "({})", rhs)
                } else {
                    write!(fmt, "{}", rhs)
                }
            }
        }
    }
}

impl Display for BinOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        };

        fmt.write_str(op)
    }
}

impl Display for RelOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            RelOp::Equal => "==",
            RelOp::NotEqual => "!=",
            RelOp::Less => "<",
            RelOp::LessOrEqual => "<=",
            RelOp::Greater => ">",
            RelOp::GreaterOrEqual => ">=",
        };

        fmt.write_str(op)
    }
}

impl Display for Condition {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{} {} {}", self.lhs.val(), self.op, self.rhs.val())
    }
}

#[non_exhaustive]
#[derive(Error, Debug, PartialEq)]
pub enum ParserError {
    #[error("Expected {0}, found {1} instead")]
    UnexpectedToken(Category, Lexeme),

    #[error("Expected {0}, none was found instead")]
    MissingToken(Category),

    #[error("Missing `;` at the end of the statement")]
    MissingTerminator,

    #[error("Invalid statement starting with {0}")]
    ExpectedStatement(Lexeme),

    #[error("Expected an expression, found {0} instead")]
    ExpectedExpr(Lexeme),

    #[error("Expected an expression, none was found instead")]
    MissingExpr,

    #[error("Expected a relational or equality operator")]
    ExpectedRelOp,

    #[error("Integer literal overflow, valid range is [0, {}]", INT_MAX)]
    IntOverflow,
}

/// Resultado de una pasada completa del parser.
///
/// Es inmutable: los errores de cada fase pertenecen a esta pasada y a
/// ninguna otra.
pub struct Parsed {
    ast: Ast,
    syntax: Vec<Located<ParserError>>,
    semantic: Vec<Located<SemanticError>>,
    symbols: SymbolTable,
}

impl Parsed {
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn syntax_errors(&self) -> &[Located<ParserError>] {
        &self.syntax
    }

    /// Errores semánticos acumulados durante esta misma pasada.
    pub fn semantic_errors(&self) -> &[Located<SemanticError>] {
        &self.semantic
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Descompone en árbol, errores sintácticos y errores semánticos.
    pub fn split(
        self,
    ) -> (
        Ast,
        Vec<Located<ParserError>>,
        Vec<Located<SemanticError>>,
    ) {
        (self.ast, self.syntax, self.semantic)
    }
}

/// Analiza sintácticamente una secuencia completa de lexemas.
///
/// Siempre termina y nunca falla: todos los errores se reportan en
/// el resultado.
pub fn parse(lexed: &Lexed) -> Parsed {
    let mut parser = Parser {
        lexemes: &lexed.lexemes,
        cursor: 0,
        eof: lexed.eof.clone(),
        errors: Vec::new(),
        analyzer: Analyzer::default(),
    };

    let ast = parser.program();
    let (symbols, semantic) = parser.analyzer.finish();

    Parsed {
        ast,
        syntax: parser.errors,
        semantic,
        symbols,
    }
}

struct Parser<'a> {
    lexemes: &'a [Located<Lexeme>],
    cursor: usize,
    eof: Location,
    errors: Vec<Located<ParserError>>,
    analyzer: Analyzer,
}

/// Una expresión junto a su tipo inferido.
///
/// Cualquiera de las dos partes puede faltar: la expresión si hubo un
/// error sintáctico, el tipo si no se pudo determinar.
struct Typed {
    expr: Option<Located<Expr>>,
    typ: Option<Type>,
}

impl Typed {
    fn broken() -> Self {
        Typed {
            expr: None,
            typ: None,
        }
    }
}

impl<'a> Parser<'a> {
    fn program(&mut self) -> Ast {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            statements.extend(self.statement());
        }

        Ast(statements)
    }

    /// Toda invocación consume al menos un lexema.
    fn statement(&mut self) -> Option<Statement> {
        let category = self.peek()?.val().category();
        match category {
            Category::Int | Category::Float => self.declaration(),
            Category::Identifier => self.assignment(),
            Category::If => self.if_else(),
            Category::Print => self.print(),

            _ => {
                let (location, lexeme) = self.next()?.split();
                self.fail(ParserError::ExpectedStatement(lexeme), location);
                None
            }
        }
    }

    fn declaration(&mut self) -> Option<Statement> {
        let of = match self.next()?.val().category() {
            Category::Float => Type::Float,
            _ => Type::Int,
        };

        let name = self.id();
        let mut complete = name.is_some();

        let value = if self.peek_is(Category::Assign) {
            self.next();
            Some(self.expr())
        } else {
            None
        };

        // El tipo registrado es el del inicializador, si se conoce
        if let Some(name) = &name {
            let inferred = value.as_ref().and_then(|value| value.typ);
            if let Some(inferred) = inferred {
                self.analyzer.check_declaration(name, of, inferred);
            }

            self.analyzer.declare(name, inferred.unwrap_or(of));
        }

        let value = match value {
            Some(Typed { expr: None, .. }) => {
                complete = false;
                None
            }

            Some(Typed { expr, .. }) => expr,
            None => None,
        };

        complete &= self.terminator();

        let name = name?;
        Some(Statement::Declaration { name, of, value }).filter(|_| complete)
    }

    fn assignment(&mut self) -> Option<Statement> {
        let target = self.id()?;
        self.analyzer.check_variable(&target);

        let assign = self.expect(Category::Assign);
        let value = match self.peek() {
            Some(next) if next.val().category() != Category::Semicolon => self.expr(),

            Some(next) => {
                let error = ParserError::ExpectedExpr(next.val().clone());
                self.fail(error, next.location().clone());
                Typed::broken()
            }

            None => {
                self.fail(ParserError::MissingExpr, self.eof.clone());
                Typed::broken()
            }
        };

        if let Some(typ) = value.typ {
            self.analyzer.check_assignment(&target, typ);
        }

        let terminated = self.terminator();

        assign?;
        let value = value.expr?;
        Some(Statement::Assignment { target, value }).filter(|_| terminated)
    }

    fn if_else(&mut self) -> Option<Statement> {
        self.expect(Category::If)?;

        let open = self.expect(Category::OpenParen);
        let condition = self.condition();
        let close = self.expect(Category::CloseParen);
        let body = self.block();

        let otherwise = if self.peek_is(Category::Else) {
            self.next();
            Some(self.block()?)
        } else {
            None
        };

        open?;
        close?;

        Some(Statement::If {
            condition: condition?,
            body: body?,
            otherwise,
        })
    }

    fn block(&mut self) -> Option<Vec<Statement>> {
        let open = self.expect(Category::OpenCurly);

        let mut statements = Vec::new();
        while !self.peek_is(Category::CloseCurly) && self.peek().is_some() {
            statements.extend(self.statement());
        }

        let close = self.expect(Category::CloseCurly);

        open?;
        close?;
        Some(statements)
    }

    fn condition(&mut self) -> Option<Condition> {
        let lhs = self.expr().expr;

        let op = match self.peek().map(|next| next.val()) {
            Some(lexeme) if is_relational(lexeme.category()) => {
                let op = match lexeme.text() {
                    "==" => RelOp::Equal,
                    "!=" => RelOp::NotEqual,
                    "<" => RelOp::Less,
                    "<=" => RelOp::LessOrEqual,
                    ">" => RelOp::Greater,
                    _ => RelOp::GreaterOrEqual,
                };

                self.next();
                Some(op)
            }

            _ => {
                let location = self.here();
                self.fail(ParserError::ExpectedRelOp, location);
                None
            }
        };

        let rhs = self.expr().expr;

        Some(Condition {
            lhs: lhs?,
            op: op?,
            rhs: rhs?,
        })
    }

    fn print(&mut self) -> Option<Statement> {
        self.expect(Category::Print)?;

        let open = self.expect(Category::OpenParen);
        let value = self.expr().expr;
        let close = self.expect(Category::CloseParen);
        let terminated = self.terminator();

        open?;
        close?;
        Some(Statement::Print(value?)).filter(|_| terminated)
    }

    /// `Expression := Term (('+'|'-') Term)*`
    fn expr(&mut self) -> Typed {
        let mut lhs = self.term();
        loop {
            let op = match self.peek().map(|next| next.val().category()) {
                Some(Category::Plus) => BinOp::Add,
                Some(Category::Minus) => BinOp::Sub,
                _ => break lhs,
            };

            self.next();
            let rhs = self.term();
            lhs = binary(lhs, op, rhs);
        }
    }

    /// `Term := Factor (('*'|'/') Factor)*`
    fn term(&mut self) -> Typed {
        let mut lhs = self.factor();
        loop {
            let op = match self.peek().map(|next| next.val().category()) {
                Some(Category::Times) => BinOp::Mul,
                Some(Category::Divide) => BinOp::Div,
                _ => break lhs,
            };

            self.next();
            let rhs = self.factor();
            lhs = binary(lhs, op, rhs);
        }
    }

    fn factor(&mut self) -> Typed {
        let next = match self.peek() {
            Some(next) => next,
            None => {
                self.fail(ParserError::MissingExpr, self.eof.clone());
                return Typed::broken();
            }
        };

        let (location, lexeme) = next.clone().split();
        match lexeme.category() {
            Category::IntLiteral => {
                self.next();
                let expr = match lexeme.text().parse::<i32>() {
                    Ok(integer) => Some(Located::at(Expr::Integer(integer), location)),
                    Err(_) => {
                        self.fail(ParserError::IntOverflow, location);
                        None
                    }
                };

                Typed {
                    expr,
                    typ: Some(Type::Int),
                }
            }

            Category::RealLiteral => {
                self.next();
                let expr = lexeme
                    .text()
                    .parse::<f64>()
                    .ok()
                    .map(|real| Located::at(Expr::Real(real), location));

                Typed {
                    expr,
                    typ: Some(Type::Float),
                }
            }

            Category::Identifier => {
                self.next();
                let id = Located::at(Identifier::new(lexeme.text()), location);
                let typ = self.analyzer.check_variable(&id);

                Typed {
                    expr: Some(id.map(Expr::Read)),
                    typ,
                }
            }

            Category::OpenParen => {
                self.next();
                let Typed { expr, typ } = self.expr();
                let close = self.expect(Category::CloseParen);

                let expr = match (expr, close) {
                    (Some(expr), Some(close)) => {
                        let (_, expr) = expr.split();
                        Some(Located::at(expr, Location::span(location, &close)))
                    }

                    _ => None,
                };

                Typed { expr, typ }
            }

            _ => {
                self.fail(ParserError::ExpectedExpr(lexeme), location);
                Typed::broken()
            }
        }
    }

    fn id(&mut self) -> Option<Located<Identifier>> {
        let location = self.expect(Category::Identifier)?;
        let name = &self.lexemes[self.cursor - 1];

        Some(Located::at(Identifier::new(name.val().text()), location))
    }

    /// `;` al final de una sentencia. A diferencia de [`Parser::expect()`],
    /// su ausencia se reporta incluso al final de la entrada.
    fn terminator(&mut self) -> bool {
        if self.peek().is_none() {
            self.fail(ParserError::MissingTerminator, self.eof.clone());
            false
        } else {
            self.expect(Category::Semicolon).is_some()
        }
    }

    /// Consume el siguiente lexema si es de la categoría esperada.
    ///
    /// De lo contrario reporta un error y no consume nada. Al final de
    /// la entrada solo se reportan ausencias de paréntesis y llaves.
    fn expect(&mut self, category: Category) -> Option<Location> {
        match self.peek() {
            Some(found) if found.val().category() == category => {
                self.next().map(|lexeme| lexeme.location().clone())
            }

            Some(found) => {
                let (location, found) = found.clone().split();
                self.fail(ParserError::UnexpectedToken(category, found), location);
                None
            }

            None => {
                if category.is_structural() {
                    self.fail(ParserError::MissingToken(category), self.eof.clone());
                }

                None
            }
        }
    }

    fn peek_is(&self, category: Category) -> bool {
        matches!(self.peek(), Some(next) if next.val().category() == category)
    }

    fn peek(&self) -> Option<&'a Located<Lexeme>> {
        self.lexemes.get(self.cursor)
    }

    fn next(&mut self) -> Option<Located<Lexeme>> {
        let next = self.peek()?.clone();
        self.cursor += 1;

        Some(next)
    }

    /// Ubicación del siguiente lexema o del final de la entrada.
    fn here(&self) -> Location {
        self.peek()
            .map(|next| next.location().clone())
            .unwrap_or_else(|| self.eof.clone())
    }

    fn fail(&mut self, error: ParserError, location: Location) {
        self.errors.push(Located::at(error, location));
    }
}

fn binary(lhs: Typed, op: BinOp, rhs: Typed) -> Typed {
    let typ = Type::infer(lhs.typ, rhs.typ);
    let expr = match (lhs.expr, rhs.expr) {
        (Some(lhs), Some(rhs)) => {
            let location = Location::span(lhs.location().clone(), rhs.location());
            let expr = Expr::Binary(Box::new(lhs), op, Box::new(rhs));

            Some(Located::at(expr, location))
        }

        _ => None,
    };

    Typed { expr, typ }
}

fn is_relational(category: Category) -> bool {
    matches!(category, Category::Relational | Category::Equality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex, source::Source};

    fn parse_text(text: &str) -> Parsed {
        parse(&lex::analyse(&Source::new("test", text)))
    }

    fn symbol(parsed: &Parsed, name: &str) -> Option<Type> {
        parsed.symbols().get(&Identifier::new(name))
    }

    fn rendered(text: &str) -> String {
        let parsed = parse_text(text);
        match parsed.ast().statements().last() {
            Some(Statement::Assignment { value, .. }) => value.val().to_string(),
            other => panic!("expected an assignment, got {:?}", other),
        }
    }

    #[test]
    fn simple_declaration() {
        let parsed = parse_text("int x = 5;");

        assert!(parsed.syntax_errors().is_empty());
        assert!(parsed.semantic_errors().is_empty());
        assert_eq!(parsed.symbols().len(), 1);
        assert_eq!(symbol(&parsed, "x"), Some(Type::Int));
    }

    #[test]
    fn redeclaration() {
        let parsed = parse_text("int x = 5; int x = 6;");

        assert!(parsed.syntax_errors().is_empty());
        assert_eq!(parsed.semantic_errors().len(), 1);
        assert!(matches!(
            parsed.semantic_errors()[0].val(),
            SemanticError::Redeclared(x) if x == "x"
        ));
    }

    #[test]
    fn undeclared_assignment() {
        let parsed = parse_text("y = 1;");

        assert!(parsed.syntax_errors().is_empty());
        assert_eq!(parsed.semantic_errors().len(), 1);
        assert!(matches!(
            parsed.semantic_errors()[0].val(),
            SemanticError::Undeclared(y) if y == "y"
        ));
    }

    #[test]
    fn float_initializer_for_int() {
        let parsed = parse_text("int x = 2.5;");

        assert_eq!(parsed.semantic_errors().len(), 1);
        assert_eq!(
            parsed.semantic_errors()[0].val(),
            &SemanticError::DeclarationMismatch {
                name: Identifier::new("x"),
                declared: Type::Int,
                found: Type::Float,
            }
        );

        // Se registra el tipo inferido del inicializador
        assert_eq!(symbol(&parsed, "x"), Some(Type::Float));
    }

    #[test]
    fn missing_semicolon_keeps_declaration() {
        let parsed = parse_text("int x = 5");

        assert_eq!(parsed.syntax_errors().len(), 1);
        assert_eq!(
            parsed.syntax_errors()[0].val(),
            &ParserError::MissingTerminator
        );
        assert_eq!(symbol(&parsed, "x"), Some(Type::Int));
        assert!(parsed.ast().statements().is_empty());
    }

    #[test]
    fn missing_semicolon_before_next_statement() {
        let parsed = parse_text("int x = 5\nprint(x);");

        assert_eq!(parsed.syntax_errors().len(), 1);
        assert!(matches!(
            parsed.syntax_errors()[0].val(),
            ParserError::UnexpectedToken(Category::Semicolon, found) if found.text() == "print"
        ));
        assert_eq!(parsed.syntax_errors()[0].location().line(), 2);
        assert_eq!(parsed.ast().statements().len(), 1);
    }

    #[test]
    fn widening_and_narrowing() {
        let parsed = parse_text("float f; int i; f = 1 + 2; i = f * 2;");

        assert_eq!(parsed.semantic_errors().len(), 1);
        assert!(matches!(
            parsed.semantic_errors()[0].val(),
            SemanticError::AssignmentMismatch { name, .. } if name == "i"
        ));
    }

    #[test]
    fn undeclared_operand_does_not_cascade() {
        let parsed = parse_text("int x; x = y + 1;");

        assert_eq!(parsed.semantic_errors().len(), 1);
        assert!(matches!(
            parsed.semantic_errors()[0].val(),
            SemanticError::Undeclared(y) if y == "y"
        ));
    }

    #[test]
    fn precedence_and_associativity() {
        let decls = "int a; int b; int c; int x;";

        assert_eq!(rendered(&format!("{} x = a + b * c;", decls)), "a + b * c");
        assert_eq!(rendered(&format!("{} x = (a + b) * c;", decls)), "(a + b) * c");
        assert_eq!(rendered(&format!("{} x = a - (b - c);", decls)), "a - (b - c)");
        assert_eq!(rendered(&format!("{} x = (a - b) - c;", decls)), "a - b - c");
        assert_eq!(rendered(&format!("{} x = a / b / 2.5;", decls)), "a / b / 2.5");
    }

    #[test]
    fn if_else() {
        let text = "int a = 1;\nif (a <= 2) { print(a); } else { a = 3; print(a); }";
        let parsed = parse_text(text);

        assert!(parsed.syntax_errors().is_empty());
        match &parsed.ast().statements()[1] {
            Statement::If {
                condition,
                body,
                otherwise: Some(otherwise),
            } => {
                assert_eq!(condition.op, RelOp::LessOrEqual);
                assert_eq!(condition.to_string(), "a <= 2");
                assert_eq!(body.len(), 1);
                assert_eq!(otherwise.len(), 2);
            }

            other => panic!("expected if/else, got {:?}", other),
        }
    }

    #[test]
    fn if_without_relation() {
        let parsed = parse_text("int a; if (a) { a = 1; }");

        assert_eq!(parsed.syntax_errors().len(), 2);
        assert_eq!(parsed.syntax_errors()[0].val(), &ParserError::ExpectedRelOp);
        assert_eq!(parsed.ast().statements().len(), 1);
    }

    #[test]
    fn unclosed_block_at_eof() {
        let parsed = parse_text("int a; if (a == 1) { a = 2;");

        assert_eq!(parsed.syntax_errors().len(), 1);
        assert_eq!(
            parsed.syntax_errors()[0].val(),
            &ParserError::MissingToken(Category::CloseCurly)
        );
    }

    #[test]
    fn invalid_statements_are_skipped() {
        let parsed = parse_text("int a; ; void; a = 2;");

        let errors: Vec<_> = parsed
            .syntax_errors()
            .iter()
            .map(|error| error.val().to_string())
            .collect();

        assert_eq!(
            errors,
            [
                "Invalid statement starting with `;`",
                "Invalid statement starting with `void`",
                "Invalid statement starting with `;`",
            ]
        );

        assert_eq!(parsed.ast().statements().len(), 2);
    }

    #[test]
    fn assignment_without_equals() {
        let parsed = parse_text("int a; a 2;");

        assert_eq!(parsed.syntax_errors().len(), 1);
        assert!(matches!(
            parsed.syntax_errors()[0].val(),
            ParserError::UnexpectedToken(Category::Assign, found) if found.text() == "2"
        ));
        assert_eq!(parsed.ast().statements().len(), 1);
    }

    #[test]
    fn missing_expression() {
        let parsed = parse_text("int a; a = ;");

        assert_eq!(parsed.syntax_errors().len(), 1);
        assert!(matches!(
            parsed.syntax_errors()[0].val(),
            ParserError::ExpectedExpr(found) if found.text() == ";"
        ));
        assert!(parsed.semantic_errors().is_empty());
    }

    #[test]
    fn integer_overflow() {
        let parsed = parse_text("int a = 99999999999;");
        assert_eq!(parsed.syntax_errors()[0].val(), &ParserError::IntOverflow);
    }

    #[test]
    fn print_expression() {
        let parsed = parse_text("int a = 2; print(a * (a + 1));");
        assert!(parsed.syntax_errors().is_empty());

        match &parsed.ast().statements()[1] {
            Statement::Print(expr) => assert_eq!(expr.val().to_string(), "a * (a + 1)"),
            other => panic!("expected print, got {:?}", other),
        }
    }
}
