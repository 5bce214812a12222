//! Parser state - statements, declarations and module items.

use crate::state::{ParseResult, ParserState};
use crate::scanner::SyntaxKind;
use hegel_ast::*;
use hegel_common::Position;

impl ParserState {
    pub(crate) fn parse_program(&mut self) -> ParseResult<Program> {
        let start = Position::new(1, 0);
        let mut body = Vec::new();
        while !self.is_token(SyntaxKind::EndOfFile) {
            body.push(self.parse_statement()?);
        }
        let end = self.current.loc.end;
        Ok(Program {
            body,
            loc: hegel_common::SourceLocation::new(start, end),
        })
    }

    pub(crate) fn parse_statement(&mut self) -> ParseResult<Statement> {
        self.enter_recursion()?;
        let statement = self.parse_statement_inner();
        self.exit_recursion();
        statement
    }

    fn parse_statement_inner(&mut self) -> ParseResult<Statement> {
        if self.is_punct("{") {
            return Ok(Statement::Block(self.parse_block()?));
        }
        if self.is_punct(";") {
            let token = self.next_token()?;
            return Ok(Statement::Empty { loc: token.loc });
        }
        if !self.is_token(SyntaxKind::Identifier) {
            return self.parse_expression_statement();
        }

        let next = self.peek_token();
        let next_is_identifier_on_same_line = next
            .as_ref()
            .is_some_and(|t| t.kind == SyntaxKind::Identifier && !t.preceded_by_line_break);

        match self.current.value.as_str() {
            "const" | "var" | "let" => {
                let start = self.start();
                if next.as_ref().is_some_and(|t| t.is_punct("{") || t.is_punct("[")) {
                    return self.parse_unknown_statement("BindingPattern", start, false);
                }
                let mut declaration = self.parse_variable_declaration(false)?;
                self.consume_semicolon()?;
                declaration.loc = self.finish(start);
                Ok(Statement::VariableDeclaration(declaration))
            }
            "function" => Ok(Statement::FunctionDeclaration(self.parse_function(false)?)),
            "async" if next.as_ref().is_some_and(|t| t.is_identifier("function") && !t.preceded_by_line_break) => {
                Ok(Statement::FunctionDeclaration(self.parse_function(false)?))
            }
            "class" => Ok(Statement::ClassDeclaration(self.parse_class(false)?)),
            "type" if next_is_identifier_on_same_line => {
                Ok(Statement::TypeAlias(self.parse_type_alias()?))
            }
            "interface" if next_is_identifier_on_same_line => {
                Ok(Statement::TypeAlias(self.parse_interface()?))
            }
            "declare" if next_is_identifier_on_same_line => self.parse_declare(),
            "if" => self.parse_if_statement(),
            "while" => self.parse_while_statement(),
            "do" => self.parse_do_statement(),
            "for" => self.parse_for_statement(),
            "return" => self.parse_return_statement(),
            "throw" => self.parse_throw_statement(),
            "try" => self.parse_try_statement(),
            "break" | "continue" | "debugger" => {
                let start = self.start();
                self.next_token()?;
                if self.is_token(SyntaxKind::Identifier) && !self.current.preceded_by_line_break {
                    self.next_token()?;
                }
                self.consume_semicolon()?;
                Ok(Statement::Empty {
                    loc: self.finish(start),
                })
            }
            "switch" => {
                let start = self.start();
                self.parse_unknown_statement("SwitchStatement", start, true)
            }
            "import" if !next.as_ref().is_some_and(|t| t.is_punct("(") || t.is_punct(".")) => {
                Ok(Statement::Import(self.parse_import_declaration()?))
            }
            "export" => self.parse_export_declaration(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_unknown_statement(
        &mut self,
        kind: &str,
        start: Position,
        block_body: bool,
    ) -> ParseResult<Statement> {
        self.skip_statement(block_body)?;
        Ok(Statement::Unknown(UnknownNode {
            kind: kind.to_string(),
            loc: self.finish(start),
        }))
    }

    pub(crate) fn parse_block(&mut self) -> ParseResult<BlockStatement> {
        let start = self.start();
        self.parse_expected("{")?;
        let body = self.parse_statements_until_brace()?;
        self.parse_expected("}")?;
        Ok(BlockStatement {
            body,
            loc: self.finish(start),
        })
    }

    fn parse_statements_until_brace(&mut self) -> ParseResult<Vec<Statement>> {
        let mut body = Vec::new();
        while !self.is_punct("}") {
            if self.is_token(SyntaxKind::EndOfFile) {
                return Err(self.error_expected("}"));
            }
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let start = self.start();
        let expression = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::Expression(ExpressionStatement {
            expression,
            loc: self.finish(start),
        }))
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// `const a: T = init, b = init` without the terminator. Statement
    /// callers extend the range over it.
    pub(crate) fn parse_variable_declaration(
        &mut self,
        declare: bool,
    ) -> ParseResult<VariableDeclaration> {
        let start = self.start();
        let keyword = self.next_token()?;
        let kind = match keyword.value.as_str() {
            "const" => VariableKind::Const,
            "let" => VariableKind::Let,
            _ => VariableKind::Var,
        };
        let mut declarations = Vec::new();
        loop {
            let declarator_start = self.start();
            let id = self.parse_identifier()?;
            let type_annotation = if self.eat_punct(":")? {
                Some(self.parse_type()?)
            } else {
                None
            };
            let init = if self.eat_punct("=")? {
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };
            declarations.push(VariableDeclarator {
                id,
                type_annotation,
                init,
                loc: self.finish(declarator_start),
            });
            if !self.eat_punct(",")? {
                break;
            }
        }
        Ok(VariableDeclaration {
            kind,
            declarations,
            declare,
            loc: self.finish(start),
        })
    }

    /// `[async] function [*] name<T>(params): R { body }`.
    /// Without a body (`declare function`, overload signatures) the
    /// statement terminator is consumed instead.
    pub(crate) fn parse_function(&mut self, is_expression: bool) -> ParseResult<Function> {
        let start = self.start();
        let is_async = self.eat_keyword("async")?;
        self.parse_expected_keyword("function")?;
        self.eat_punct("*")?;
        let id = if self.is_token(SyntaxKind::Identifier) {
            Some(self.parse_identifier()?)
        } else if is_expression {
            None
        } else {
            return Err(self.error_unexpected());
        };
        self.parse_function_rest(start, id, is_async)
    }

    /// Everything after the function name.
    pub(crate) fn parse_function_rest(
        &mut self,
        start: Position,
        id: Option<Identifier>,
        is_async: bool,
    ) -> ParseResult<Function> {
        let type_parameters = self.parse_type_parameters_opt()?;
        let params = self.parse_parameters()?;
        let return_type = if self.eat_punct(":")? {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = if self.is_punct("{") {
            Some(FunctionBody::Block(self.parse_block()?))
        } else {
            self.consume_semicolon()?;
            None
        };
        Ok(Function {
            id,
            type_parameters,
            params,
            return_type,
            body,
            is_arrow: false,
            is_async,
            loc: self.finish(start),
        })
    }

    pub(crate) fn parse_parameters(&mut self) -> ParseResult<Vec<Param>> {
        self.parse_expected("(")?;
        let mut params = Vec::new();
        while !self.is_punct(")") {
            params.push(self.parse_parameter()?);
            if !self.eat_punct(",")? {
                break;
            }
        }
        self.parse_expected(")")?;
        Ok(params)
    }

    fn parse_parameter(&mut self) -> ParseResult<Param> {
        let start = self.start();
        let rest = self.eat_punct("...")?;
        if self.is_punct("{") || self.is_punct("[") {
            return Err(crate::ParseError::new(
                "Destructuring patterns are not supported",
                self.current.loc,
            ));
        }
        let name = self.parse_identifier()?;
        let optional = self.eat_punct("?")?;
        let type_annotation = if self.eat_punct(":")? {
            Some(self.parse_type()?)
        } else {
            None
        };
        let default = if self.eat_punct("=")? {
            Some(self.parse_assignment_expression()?)
        } else {
            None
        };
        Ok(Param {
            name,
            type_annotation,
            optional,
            rest,
            default,
            loc: self.finish(start),
        })
    }

    pub(crate) fn parse_class(&mut self, declare: bool) -> ParseResult<Class> {
        let start = self.start();
        self.parse_expected_keyword("class")?;
        let id = if self.is_token(SyntaxKind::Identifier)
            && !self.is_keyword("extends")
            && !self.is_keyword("implements")
        {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        let type_parameters = self.parse_type_parameters_opt()?;

        let mut super_class = None;
        let mut super_type_arguments = Vec::new();
        if self.eat_keyword("extends")? {
            super_class = Some(self.parse_identifier()?);
            if self.is_punct("<") {
                super_type_arguments = self.parse_type_arguments()?;
            }
        }
        if self.eat_keyword("implements")? {
            loop {
                self.parse_type()?;
                if !self.eat_punct(",")? {
                    break;
                }
            }
        }

        self.parse_expected("{")?;
        let mut body = Vec::new();
        while !self.is_punct("}") {
            if self.eat_punct(";")? {
                continue;
            }
            if self.is_token(SyntaxKind::EndOfFile) {
                return Err(self.error_expected("}"));
            }
            body.push(self.parse_class_member()?);
        }
        self.parse_expected("}")?;

        Ok(Class {
            id,
            type_parameters,
            super_class,
            super_type_arguments,
            body,
            declare,
            loc: self.finish(start),
        })
    }

    /// Whether the current identifier is a modifier rather than a member name.
    fn is_member_modifier(&mut self, modifier: &str) -> bool {
        if !self.is_keyword(modifier) {
            return false;
        }
        self.peek_token().is_some_and(|next| {
            !next.preceded_by_line_break
                && (next.kind == SyntaxKind::Identifier
                    || next.kind == SyntaxKind::StringLiteral
                    || next.kind == SyntaxKind::NumericLiteral
                    || next.is_punct("*")
                    || next.is_punct("["))
        })
    }

    fn parse_class_member(&mut self) -> ParseResult<ClassMember> {
        let start = self.start();
        let mut is_static = false;
        let mut is_async = false;
        let mut accessor = None;
        loop {
            if self.is_member_modifier("static") {
                self.next_token()?;
                is_static = true;
            } else if ["public", "private", "protected", "readonly", "declare", "abstract", "override"]
                .into_iter()
                .any(|m| self.is_member_modifier(m))
            {
                self.next_token()?;
            } else if self.is_member_modifier("async") {
                self.next_token()?;
                is_async = true;
            } else if self.is_member_modifier("get") {
                self.next_token()?;
                accessor = Some(MethodKind::Get);
            } else if self.is_member_modifier("set") {
                self.next_token()?;
                accessor = Some(MethodKind::Set);
            } else {
                break;
            }
        }
        self.eat_punct("*")?;

        if self.is_punct("[") {
            return Err(crate::ParseError::new(
                "Computed class members are not supported",
                self.current.loc,
            ));
        }
        let key = self.parse_property_key()?;
        self.eat_punct("?")?;

        if self.is_punct("(") || self.is_punct("<") {
            let kind = match accessor {
                Some(kind) => kind,
                None if key.name == "constructor" && !is_static => MethodKind::Constructor,
                None => MethodKind::Method,
            };
            let function = self.parse_function_rest(key.loc.start, Some(key.clone()), is_async)?;
            return Ok(ClassMember::Method(ClassMethod {
                key,
                kind,
                is_static,
                function,
                loc: self.finish(start),
            }));
        }

        let type_annotation = if self.eat_punct(":")? {
            Some(self.parse_type()?)
        } else {
            None
        };
        let value = if self.eat_punct("=")? {
            Some(self.parse_assignment_expression()?)
        } else {
            None
        };
        self.consume_semicolon()?;
        Ok(ClassMember::Property(ClassProperty {
            key,
            is_static,
            type_annotation,
            value,
            loc: self.finish(start),
        }))
    }

    pub(crate) fn parse_type_alias(&mut self) -> ParseResult<TypeAlias> {
        let start = self.start();
        self.parse_expected_keyword("type")?;
        let id = self.parse_identifier()?;
        let type_parameters = self.parse_type_parameters_opt()?;
        self.parse_expected("=")?;
        let right = self.parse_type()?;
        self.consume_semicolon()?;
        Ok(TypeAlias {
            id,
            type_parameters,
            right,
            loc: self.finish(start),
        })
    }

    /// `interface I<T> extends A, B { ... }` becomes an alias of the
    /// intersection of the parents and the body.
    pub(crate) fn parse_interface(&mut self) -> ParseResult<TypeAlias> {
        let start = self.start();
        self.parse_expected_keyword("interface")?;
        let id = self.parse_identifier()?;
        let type_parameters = self.parse_type_parameters_opt()?;
        let mut parents = Vec::new();
        if self.eat_keyword("extends")? {
            loop {
                parents.push(self.parse_type_reference()?);
                if !self.eat_punct(",")? {
                    break;
                }
            }
        }
        let body = TypeAnnotation::Object(self.parse_object_type()?);
        let right = if parents.is_empty() {
            body
        } else {
            parents.push(body);
            TypeAnnotation::Intersection {
                types: parents,
                loc: self.finish(start),
            }
        };
        Ok(TypeAlias {
            id,
            type_parameters,
            right,
            loc: self.finish(start),
        })
    }

    /// `declare const|let|var|function|class|type|interface|module|export ...`
    fn parse_declare(&mut self) -> ParseResult<Statement> {
        let start = self.start();
        self.parse_expected_keyword("declare")?;
        match self.current.value.as_str() {
            "const" | "let" | "var" => {
                let mut declaration = self.parse_variable_declaration(true)?;
                self.consume_semicolon()?;
                declaration.loc = self.finish(start);
                Ok(Statement::VariableDeclaration(declaration))
            }
            "function" | "async" => {
                let mut function = self.parse_function(false)?;
                function.loc.start = start;
                Ok(Statement::FunctionDeclaration(function))
            }
            "class" => {
                let mut class = self.parse_class(true)?;
                class.loc.start = start;
                Ok(Statement::ClassDeclaration(class))
            }
            "type" => Ok(Statement::TypeAlias(self.parse_type_alias()?)),
            "interface" => Ok(Statement::TypeAlias(self.parse_interface()?)),
            "module" => {
                self.next_token()?;
                if !self.is_token(SyntaxKind::StringLiteral) {
                    return self.parse_unknown_statement("NamespaceDeclaration", start, true);
                }
                let name = self.next_token()?;
                self.parse_expected("{")?;
                let body = self.parse_statements_until_brace()?;
                self.parse_expected("}")?;
                Ok(Statement::DeclareModule(DeclareModule {
                    name: StringLiteral {
                        value: name.value,
                        loc: name.loc,
                    },
                    body,
                    loc: self.finish(start),
                }))
            }
            "export" => self.parse_export_declaration(),
            _ => self.parse_unknown_statement("DeclareStatement", start, true),
        }
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn parse_parenthesized_expression(&mut self) -> ParseResult<Expression> {
        self.parse_expected("(")?;
        let expression = self.parse_expression()?;
        self.parse_expected(")")?;
        Ok(expression)
    }

    fn parse_if_statement(&mut self) -> ParseResult<Statement> {
        let start = self.start();
        self.parse_expected_keyword("if")?;
        let test = self.parse_parenthesized_expression()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat_keyword("else")? {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
            loc: self.finish(start),
        }))
    }

    fn parse_while_statement(&mut self) -> ParseResult<Statement> {
        let start = self.start();
        self.parse_expected_keyword("while")?;
        let test = self.parse_parenthesized_expression()?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::While(WhileStatement {
            test,
            body,
            loc: self.finish(start),
        }))
    }

    /// `do body while (test)` is analysed like a `while` loop.
    fn parse_do_statement(&mut self) -> ParseResult<Statement> {
        let start = self.start();
        self.parse_expected_keyword("do")?;
        let body = Box::new(self.parse_statement()?);
        self.parse_expected_keyword("while")?;
        let test = self.parse_parenthesized_expression()?;
        self.eat_punct(";")?;
        Ok(Statement::While(WhileStatement {
            test,
            body,
            loc: self.finish(start),
        }))
    }

    fn parse_for_statement(&mut self) -> ParseResult<Statement> {
        let start = self.start();
        self.parse_expected_keyword("for")?;
        if self.is_keyword("await") {
            return self.parse_unknown_statement("ForOfStatement", start, true);
        }
        self.parse_expected("(")?;

        self.no_in = true;
        let init = if self.is_punct(";") {
            Ok(None)
        } else if self.is_keyword("const") || self.is_keyword("let") || self.is_keyword("var") {
            self.parse_variable_declaration(false)
                .map(|declaration| Some(ForInit::Variable(declaration)))
        } else {
            self.parse_expression()
                .map(|expression| Some(ForInit::Expression(expression)))
        };
        self.no_in = false;
        let init = init?;

        if self.is_keyword("of") || self.is_keyword("in") {
            let kind = if self.is_keyword("of") {
                "ForOfStatement"
            } else {
                "ForInStatement"
            };
            self.next_token()?;
            self.parse_expression()?;
            self.parse_expected(")")?;
            self.parse_statement()?;
            return Ok(Statement::Unknown(UnknownNode {
                kind: kind.to_string(),
                loc: self.finish(start),
            }));
        }

        self.parse_expected(";")?;
        let test = if self.is_punct(";") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.parse_expected(";")?;
        let update = if self.is_punct(")") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.parse_expected(")")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::For(ForStatement {
            init,
            test,
            update,
            body,
            loc: self.finish(start),
        }))
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        let start = self.start();
        self.parse_expected_keyword("return")?;
        let argument = if self.is_punct(";")
            || self.is_punct("}")
            || self.is_token(SyntaxKind::EndOfFile)
            || self.current.preceded_by_line_break
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;
        Ok(Statement::Return(ReturnStatement {
            argument,
            loc: self.finish(start),
        }))
    }

    fn parse_throw_statement(&mut self) -> ParseResult<Statement> {
        let start = self.start();
        self.parse_expected_keyword("throw")?;
        let argument = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::Throw(ThrowStatement {
            argument,
            loc: self.finish(start),
        }))
    }

    fn parse_try_statement(&mut self) -> ParseResult<Statement> {
        let start = self.start();
        self.parse_expected_keyword("try")?;
        let block = self.parse_block()?;
        let handler = if self.is_keyword("catch") {
            let catch_start = self.start();
            self.next_token()?;
            let param = if self.eat_punct("(")? {
                let param = self.parse_identifier()?;
                if self.eat_punct(":")? {
                    self.parse_type()?;
                }
                self.parse_expected(")")?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause {
                param,
                body,
                loc: self.finish(catch_start),
            })
        } else {
            None
        };
        let finalizer = if self.eat_keyword("finally")? {
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.error_expected("catch"));
        }
        Ok(Statement::Try(TryStatement {
            block,
            handler,
            finalizer,
            loc: self.finish(start),
        }))
    }

    // =========================================================================
    // Modules
    // =========================================================================

    fn parse_module_source(&mut self) -> ParseResult<StringLiteral> {
        if !self.is_token(SyntaxKind::StringLiteral) {
            return Err(self.error_unexpected());
        }
        let token = self.next_token()?;
        Ok(StringLiteral {
            value: token.value,
            loc: token.loc,
        })
    }

    fn parse_import_declaration(&mut self) -> ParseResult<ImportDeclaration> {
        let start = self.start();
        self.parse_expected_keyword("import")?;

        let mut import_kind = ImportKind::Value;
        if (self.is_keyword("type") || self.is_keyword("typeof"))
            && self.peek_token().is_some_and(|next| {
                next.is_punct("{") || next.is_punct("*") || (next.kind == SyntaxKind::Identifier && !next.is_identifier("from"))
            })
        {
            self.next_token()?;
            import_kind = ImportKind::Type;
        }

        let mut specifiers = Vec::new();
        if self.is_token(SyntaxKind::StringLiteral) {
            let source = self.parse_module_source()?;
            self.consume_semicolon()?;
            return Ok(ImportDeclaration {
                specifiers,
                source,
                import_kind,
                loc: self.finish(start),
            });
        }

        if self.is_token(SyntaxKind::Identifier) {
            let local = self.parse_identifier()?;
            specifiers.push(ImportSpecifier::Default {
                loc: local.loc,
                local,
            });
            self.eat_punct(",")?;
        }
        if self.is_punct("*") {
            let namespace_start = self.start();
            self.next_token()?;
            self.parse_expected_keyword("as")?;
            let local = self.parse_identifier()?;
            specifiers.push(ImportSpecifier::Namespace {
                local,
                loc: self.finish(namespace_start),
            });
        } else if self.eat_punct("{")? {
            while !self.is_punct("}") {
                let specifier_start = self.start();
                // `import { type A }` narrows a single specifier; it is
                // resolved the same way as a value import.
                if self.is_keyword("type")
                    && self
                        .peek_token()
                        .is_some_and(|next| next.kind == SyntaxKind::Identifier)
                {
                    self.next_token()?;
                }
                let imported = self.parse_property_key()?;
                let local = if self.eat_keyword("as")? {
                    self.parse_identifier()?
                } else {
                    imported.clone()
                };
                specifiers.push(ImportSpecifier::Named {
                    imported,
                    local,
                    loc: self.finish(specifier_start),
                });
                if !self.eat_punct(",")? {
                    break;
                }
            }
            self.parse_expected("}")?;
        }

        self.parse_expected_keyword("from")?;
        let source = self.parse_module_source()?;
        self.consume_semicolon()?;
        Ok(ImportDeclaration {
            specifiers,
            source,
            import_kind,
            loc: self.finish(start),
        })
    }

    fn parse_export_declaration(&mut self) -> ParseResult<Statement> {
        let start = self.start();
        self.parse_expected_keyword("export")?;

        if self.eat_keyword("default")? {
            let declaration = if self.is_keyword("function")
                || (self.is_keyword("async")
                    && self.peek_token().is_some_and(|t| t.is_identifier("function")))
            {
                ExportDefaultKind::Function(self.parse_function(true)?)
            } else if self.is_keyword("class") {
                ExportDefaultKind::Class(self.parse_class(false)?)
            } else {
                let expression = self.parse_assignment_expression()?;
                self.consume_semicolon()?;
                ExportDefaultKind::Expression(expression)
            };
            return Ok(Statement::ExportDefault(ExportDefaultDeclaration {
                declaration,
                loc: self.finish(start),
            }));
        }

        if self.is_punct("*") {
            return self.parse_unknown_statement("ExportAllDeclaration", start, false);
        }

        let mut export_kind = ImportKind::Value;
        if self.is_keyword("type") && self.peek_token().is_some_and(|t| t.is_punct("{")) {
            self.next_token()?;
            export_kind = ImportKind::Type;
        }

        if self.eat_punct("{")? {
            let mut specifiers = Vec::new();
            while !self.is_punct("}") {
                let specifier_start = self.start();
                let local = self.parse_property_key()?;
                let exported = if self.eat_keyword("as")? {
                    self.parse_property_key()?
                } else {
                    local.clone()
                };
                specifiers.push(ExportSpecifier {
                    local,
                    exported,
                    loc: self.finish(specifier_start),
                });
                if !self.eat_punct(",")? {
                    break;
                }
            }
            self.parse_expected("}")?;
            let source = if self.eat_keyword("from")? {
                Some(self.parse_module_source()?)
            } else {
                None
            };
            self.consume_semicolon()?;
            return Ok(Statement::ExportNamed(ExportNamedDeclaration {
                declaration: None,
                specifiers,
                source,
                export_kind,
                loc: self.finish(start),
            }));
        }

        let declaration = self.parse_statement()?;
        let export_kind = match &declaration {
            Statement::TypeAlias(_) => ImportKind::Type,
            Statement::VariableDeclaration(_)
            | Statement::FunctionDeclaration(_)
            | Statement::ClassDeclaration(_) => ImportKind::Value,
            _ => return Err(crate::ParseError::new(
                "Only declarations can be exported",
                declaration.loc(),
            )),
        };
        Ok(Statement::ExportNamed(ExportNamedDeclaration {
            declaration: Some(Box::new(declaration)),
            specifiers: Vec::new(),
            source: None,
            export_kind,
            loc: self.finish(start),
        }))
    }
}
