//! Parser state - expressions.

use crate::ParseError;
use crate::scanner::SyntaxKind;
use crate::state::{ParseResult, ParserState};
use hegel_ast::*;
use hegel_common::Position;

/// Binding power of a binary operator token; `None` for non-operators.
fn binary_precedence(token: &crate::Token, no_in: bool) -> Option<u8> {
    match token.kind {
        SyntaxKind::Punctuation => Some(match token.value.as_str() {
            "??" => 1,
            "||" => 2,
            "&&" => 3,
            "|" => 4,
            "^" => 5,
            "&" => 6,
            "==" | "!=" | "===" | "!==" => 7,
            "<" | ">" | "<=" | ">=" => 8,
            "<<" | ">>" | ">>>" => 9,
            "+" | "-" => 10,
            "*" | "/" | "%" => 11,
            "**" => 12,
            _ => return None,
        }),
        SyntaxKind::Identifier => match token.value.as_str() {
            "instanceof" => Some(8),
            "in" if !no_in => Some(8),
            _ => None,
        },
        _ => None,
    }
}

enum Operator {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

fn operator_from(text: &str) -> Option<Operator> {
    use BinaryOperator as B;
    Some(Operator::Binary(match text {
        "??" => return Some(Operator::Logical(LogicalOperator::NullishCoalescing)),
        "||" => return Some(Operator::Logical(LogicalOperator::Or)),
        "&&" => return Some(Operator::Logical(LogicalOperator::And)),
        "|" => B::BitOr,
        "^" => B::BitXor,
        "&" => B::BitAnd,
        "==" => B::Equal,
        "!=" => B::NotEqual,
        "===" => B::StrictEqual,
        "!==" => B::StrictNotEqual,
        "<" => B::Less,
        ">" => B::Greater,
        "<=" => B::LessEqual,
        ">=" => B::GreaterEqual,
        "<<" => B::ShiftLeft,
        ">>" => B::ShiftRight,
        ">>>" => B::UnsignedShiftRight,
        "+" => B::Add,
        "-" => B::Subtract,
        "*" => B::Multiply,
        "/" => B::Divide,
        "%" => B::Remainder,
        "**" => B::Exponent,
        "instanceof" => B::InstanceOf,
        "in" => B::In,
        _ => return None,
    }))
}

fn assignment_operator(text: &str) -> Option<AssignmentOperator> {
    Some(match text {
        "=" => AssignmentOperator::Assign,
        "+=" => AssignmentOperator::AddAssign,
        "-=" => AssignmentOperator::SubtractAssign,
        "*=" => AssignmentOperator::MultiplyAssign,
        "/=" => AssignmentOperator::DivideAssign,
        "%=" => AssignmentOperator::RemainderAssign,
        _ => return None,
    })
}

const UNMODELLED_ASSIGNMENTS: &[&str] = &["**=", "<<=", ">>=", ">>>=", "&=", "|=", "^="];

/// Parsed `<T>(params): R =>` prefix of an arrow function.
struct ArrowHead {
    type_parameters: Vec<TypeParameter>,
    params: Vec<Param>,
    return_type: Option<TypeAnnotation>,
}

impl ParserState {
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expression> {
        let start = self.start();
        let first = self.parse_assignment_expression()?;
        if !self.is_punct(",") {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat_punct(",")? {
            expressions.push(self.parse_assignment_expression()?);
        }
        Ok(Expression::Sequence(SequenceExpression {
            expressions,
            loc: self.finish(start),
        }))
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> ParseResult<Expression> {
        self.enter_recursion()?;
        let result = self.parse_assignment_expression_inner();
        self.exit_recursion();
        result
    }

    fn parse_assignment_expression_inner(&mut self) -> ParseResult<Expression> {
        if let Some(arrow) = self.try_parse_arrow_function()? {
            return Ok(arrow);
        }

        let start = self.start();
        let left = self.parse_conditional_expression()?;

        if self.current.kind == SyntaxKind::Punctuation {
            if let Some(operator) = assignment_operator(&self.current.value) {
                self.check_assignment_target(&left)?;
                self.next_token()?;
                let right = self.parse_assignment_expression()?;
                return Ok(Expression::Assignment(AssignmentExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                    loc: self.finish(start),
                }));
            }
            if UNMODELLED_ASSIGNMENTS.contains(&self.current.value.as_str()) {
                self.check_assignment_target(&left)?;
                self.next_token()?;
                self.parse_assignment_expression()?;
                return Ok(Expression::Unknown(UnknownNode {
                    kind: "AssignmentExpression".to_string(),
                    loc: self.finish(start),
                }));
            }
        }
        Ok(left)
    }

    fn check_assignment_target(&self, target: &Expression) -> ParseResult<()> {
        match target {
            Expression::Identifier(_) | Expression::Member(_) => Ok(()),
            _ => Err(ParseError::new("Invalid left-hand side in assignment", target.loc())),
        }
    }

    // =========================================================================
    // Arrow functions
    // =========================================================================

    fn try_parse_arrow_function(&mut self) -> ParseResult<Option<Expression>> {
        let start = self.start();
        let is_async = self.is_keyword("async")
            && self.peek_token().is_some_and(|next| {
                !next.preceded_by_line_break
                    && (next.is_punct("(") || next.is_punct("<") || next.kind == SyntaxKind::Identifier)
            });

        let head = self.try_parse(|p| {
            if is_async {
                p.next_token()?;
            }
            p.parse_arrow_head()
        });
        let Some(head) = head else {
            return Ok(None);
        };

        let body = if self.is_punct("{") {
            FunctionBody::Block(self.parse_block()?)
        } else {
            let saved = self.no_in;
            self.no_in = false;
            let expression = self.parse_assignment_expression();
            self.no_in = saved;
            FunctionBody::Expression(Box::new(expression?))
        };

        Ok(Some(Expression::Function(Box::new(Function {
            id: None,
            type_parameters: head.type_parameters,
            params: head.params,
            return_type: head.return_type,
            body: Some(body),
            is_arrow: true,
            is_async,
            loc: self.finish(start),
        }))))
    }

    /// Everything up to and including `=>`. Fails without side effects on
    /// anything that is not an arrow function.
    fn parse_arrow_head(&mut self) -> ParseResult<ArrowHead> {
        if self.is_token(SyntaxKind::Identifier) {
            let name = self.parse_identifier()?;
            if self.current.preceded_by_line_break {
                return Err(self.error_unexpected());
            }
            self.parse_expected("=>")?;
            return Ok(ArrowHead {
                type_parameters: Vec::new(),
                params: vec![Param {
                    loc: name.loc,
                    name,
                    type_annotation: None,
                    optional: false,
                    rest: false,
                    default: None,
                }],
                return_type: None,
            });
        }
        if !self.is_punct("(") && !self.is_punct("<") {
            return Err(self.error_unexpected());
        }
        let type_parameters = self.parse_type_parameters_opt()?;
        let params = self.parse_parameters()?;
        let return_type = if self.eat_punct(":")? {
            Some(self.parse_type()?)
        } else {
            None
        };
        if self.current.preceded_by_line_break {
            return Err(self.error_unexpected());
        }
        self.parse_expected("=>")?;
        Ok(ArrowHead {
            type_parameters,
            params,
            return_type,
        })
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn parse_conditional_expression(&mut self) -> ParseResult<Expression> {
        let start = self.start();
        let test = self.parse_binary_expression(0)?;
        if !self.eat_punct("?")? {
            return Ok(test);
        }
        let saved = self.no_in;
        self.no_in = false;
        let consequent = self.parse_assignment_expression();
        self.no_in = saved;
        let consequent = consequent?;
        self.parse_expected(":")?;
        let alternate = self.parse_assignment_expression()?;
        Ok(Expression::Conditional(ConditionalExpression {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            loc: self.finish(start),
        }))
    }

    /// Precedence climbing over binary and logical operators.
    fn parse_binary_expression(&mut self, min_precedence: u8) -> ParseResult<Expression> {
        let start = self.start();
        let mut left = self.parse_unary_expression()?;
        loop {
            let Some(precedence) = binary_precedence(&self.current, self.no_in) else {
                break;
            };
            if precedence <= min_precedence {
                break;
            }
            let Some(operator) = operator_from(&self.current.value) else {
                break;
            };
            self.next_token()?;
            // `**` is right-associative.
            let next_min = if precedence == 12 { precedence - 1 } else { precedence };
            let right = self.parse_binary_expression(next_min)?;
            let loc = self.finish(start);
            left = match operator {
                Operator::Binary(operator) => Expression::Binary(BinaryExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                    loc,
                }),
                Operator::Logical(operator) => Expression::Logical(LogicalExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                    loc,
                }),
            };
        }
        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Expression> {
        let start = self.start();
        let operator = match self.current.kind {
            SyntaxKind::Punctuation => match self.current.value.as_str() {
                "!" => Some(UnaryOperator::Not),
                "-" => Some(UnaryOperator::Minus),
                "+" => Some(UnaryOperator::Plus),
                "~" => Some(UnaryOperator::BitwiseNot),
                "++" | "--" => {
                    let increment = self.is_punct("++");
                    self.next_token()?;
                    let argument = self.parse_unary_expression()?;
                    self.check_assignment_target(&argument)?;
                    return Ok(Expression::Update(UpdateExpression {
                        operator: if increment {
                            UpdateOperator::Increment
                        } else {
                            UpdateOperator::Decrement
                        },
                        prefix: true,
                        argument: Box::new(argument),
                        loc: self.finish(start),
                    }));
                }
                _ => None,
            },
            SyntaxKind::Identifier => match self.current.value.as_str() {
                "typeof" => Some(UnaryOperator::TypeOf),
                "void" => Some(UnaryOperator::Void),
                "delete" => Some(UnaryOperator::Delete),
                "await" => Some(UnaryOperator::Await),
                _ => None,
            },
            _ => None,
        };

        let Some(operator) = operator else {
            return self.parse_postfix_expression();
        };
        self.next_token()?;
        self.enter_recursion()?;
        let argument = self.parse_unary_expression();
        self.exit_recursion();
        Ok(Expression::Unary(UnaryExpression {
            operator,
            argument: Box::new(argument?),
            loc: self.finish(start),
        }))
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Expression> {
        let start = self.start();
        let expression = self.parse_left_hand_side_expression()?;
        if (self.is_punct("++") || self.is_punct("--")) && !self.current.preceded_by_line_break {
            self.check_assignment_target(&expression)?;
            let increment = self.is_punct("++");
            self.next_token()?;
            return Ok(Expression::Update(UpdateExpression {
                operator: if increment {
                    UpdateOperator::Increment
                } else {
                    UpdateOperator::Decrement
                },
                prefix: false,
                argument: Box::new(expression),
                loc: self.finish(start),
            }));
        }
        Ok(expression)
    }

    // =========================================================================
    // Calls and member access
    // =========================================================================

    fn parse_left_hand_side_expression(&mut self) -> ParseResult<Expression> {
        let start = self.start();
        let mut expression = if self.is_keyword("new") {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };

        loop {
            if self.is_punct(".") {
                self.next_token()?;
                let property = self.parse_property_key()?;
                expression = self.member(expression, MemberProperty::Named(property), false, start);
            } else if self.is_punct("?.") {
                self.next_token()?;
                if self.is_punct("(") {
                    let arguments = self.parse_arguments()?;
                    expression = Expression::Call(CallExpression {
                        callee: Box::new(expression),
                        type_arguments: Vec::new(),
                        arguments,
                        loc: self.finish(start),
                    });
                } else if self.eat_punct("[")? {
                    let property = self.parse_expression()?;
                    self.parse_expected("]")?;
                    expression = self.member(
                        expression,
                        MemberProperty::Computed(Box::new(property)),
                        true,
                        start,
                    );
                } else {
                    let property = self.parse_property_key()?;
                    expression = self.member(expression, MemberProperty::Named(property), true, start);
                }
            } else if self.is_punct("[") && !self.current.preceded_by_line_break {
                self.next_token()?;
                let saved = self.no_in;
                self.no_in = false;
                let property = self.parse_expression();
                self.no_in = saved;
                let property = property?;
                self.parse_expected("]")?;
                expression = self.member(
                    expression,
                    MemberProperty::Computed(Box::new(property)),
                    false,
                    start,
                );
            } else if self.is_punct("(") {
                let arguments = self.parse_arguments()?;
                expression = Expression::Call(CallExpression {
                    callee: Box::new(expression),
                    type_arguments: Vec::new(),
                    arguments,
                    loc: self.finish(start),
                });
            } else if self.is_punct("<") {
                // `f<T>(x)` versus `a < b`: only a type argument list directly
                // followed by an argument list makes a call.
                let type_arguments = self.try_parse(|p| {
                    let arguments = p.parse_type_arguments()?;
                    if p.is_punct("(") {
                        Ok(arguments)
                    } else {
                        Err(p.error_expected("("))
                    }
                });
                let Some(type_arguments) = type_arguments else {
                    break;
                };
                let arguments = self.parse_arguments()?;
                expression = Expression::Call(CallExpression {
                    callee: Box::new(expression),
                    type_arguments,
                    arguments,
                    loc: self.finish(start),
                });
            } else {
                break;
            }
        }
        Ok(expression)
    }

    fn member(
        &self,
        object: Expression,
        property: MemberProperty,
        optional: bool,
        start: Position,
    ) -> Expression {
        Expression::Member(MemberExpression {
            object: Box::new(object),
            property,
            optional,
            loc: self.finish(start),
        })
    }

    fn parse_new_expression(&mut self) -> ParseResult<Expression> {
        let start = self.start();
        self.parse_expected_keyword("new")?;
        if self.is_punct(".") {
            self.next_token()?;
            self.parse_identifier()?;
            return Ok(Expression::Unknown(UnknownNode {
                kind: "MetaProperty".to_string(),
                loc: self.finish(start),
            }));
        }

        let callee_start = self.start();
        let mut callee = if self.is_keyword("new") {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        while self.is_punct(".") {
            self.next_token()?;
            let property = self.parse_property_key()?;
            callee = self.member(callee, MemberProperty::Named(property), false, callee_start);
        }

        let type_arguments = if self.is_punct("<") {
            self.parse_type_arguments()?
        } else {
            Vec::new()
        };
        let arguments = if self.is_punct("(") {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expression::New(CallExpression {
            callee: Box::new(callee),
            type_arguments,
            arguments,
            loc: self.finish(start),
        }))
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        self.parse_expected("(")?;
        let saved = self.no_in;
        self.no_in = false;
        let mut arguments = Vec::new();
        let result = (|| {
            while !self.is_punct(")") {
                arguments.push(self.parse_spread_or_assignment()?);
                if !self.eat_punct(",")? {
                    break;
                }
            }
            self.parse_expected(")").map(|_| ())
        })();
        self.no_in = saved;
        result?;
        Ok(arguments)
    }

    /// `...expr` is kept as an unknown node so that positions stay aligned.
    fn parse_spread_or_assignment(&mut self) -> ParseResult<Expression> {
        if self.is_punct("...") {
            let start = self.start();
            self.next_token()?;
            self.parse_assignment_expression()?;
            return Ok(Expression::Unknown(UnknownNode {
                kind: "SpreadElement".to_string(),
                loc: self.finish(start),
            }));
        }
        self.parse_assignment_expression()
    }

    // =========================================================================
    // Primary expressions
    // =========================================================================

    fn parse_primary_expression(&mut self) -> ParseResult<Expression> {
        let start = self.start();
        match self.current.kind {
            SyntaxKind::NumericLiteral => {
                let token = self.next_token()?;
                let value = token
                    .value
                    .parse::<f64>()
                    .map_err(|_| ParseError::new("Invalid numeric literal", token.loc))?;
                Ok(Expression::NumericLiteral(NumericLiteral {
                    value,
                    raw: token.raw,
                    loc: token.loc,
                }))
            }
            SyntaxKind::StringLiteral => {
                let token = self.next_token()?;
                Ok(Expression::StringLiteral(StringLiteral {
                    value: token.value,
                    loc: token.loc,
                }))
            }
            SyntaxKind::NoSubstitutionTemplate | SyntaxKind::TemplateHead => {
                self.parse_template_literal()
            }
            SyntaxKind::Identifier => self.parse_identifier_expression(start),
            SyntaxKind::Punctuation => match self.current.value.as_str() {
                "(" => self.parse_parenthesized_or_cast(start),
                "[" => self.parse_array_literal(start),
                "{" => self.parse_object_literal(start),
                _ => Err(self.error_unexpected()),
            },
            _ => Err(self.error_unexpected()),
        }
    }

    fn parse_identifier_expression(&mut self, start: Position) -> ParseResult<Expression> {
        let async_function = self.current.value == "async"
            && self.peek_token().is_some_and(|t| t.is_identifier("function"));
        match self.current.value.as_str() {
            "true" | "false" => {
                let token = self.next_token()?;
                Ok(Expression::BooleanLiteral(BooleanLiteral {
                    value: token.value == "true",
                    loc: token.loc,
                }))
            }
            "null" => {
                let token = self.next_token()?;
                Ok(Expression::NullLiteral { loc: token.loc })
            }
            "this" => {
                let token = self.next_token()?;
                Ok(Expression::This { loc: token.loc })
            }
            "function" => Ok(Expression::Function(Box::new(self.parse_function(true)?))),
            "async" if async_function => {
                Ok(Expression::Function(Box::new(self.parse_function(true)?)))
            }
            "class" => {
                self.parse_class(false)?;
                Ok(Expression::Unknown(UnknownNode {
                    kind: "ClassExpression".to_string(),
                    loc: self.finish(start),
                }))
            }
            "super" => {
                self.next_token()?;
                Ok(Expression::Unknown(UnknownNode {
                    kind: "Super".to_string(),
                    loc: self.finish(start),
                }))
            }
            _ => Ok(Expression::Identifier(self.parse_identifier()?)),
        }
    }

    /// `(expr)` or the type cast `(expr: Type)`.
    fn parse_parenthesized_or_cast(&mut self, start: Position) -> ParseResult<Expression> {
        self.parse_expected("(")?;
        let saved = self.no_in;
        self.no_in = false;
        let inner = (|| {
            let expression = self.parse_expression()?;
            let cast = if self.eat_punct(":")? {
                Some(self.parse_type()?)
            } else {
                None
            };
            self.parse_expected(")")?;
            Ok::<_, ParseError>((expression, cast))
        })();
        self.no_in = saved;
        let (expression, cast) = inner?;
        match cast {
            Some(type_annotation) => Ok(Expression::TypeCast(TypeCastExpression {
                expression: Box::new(expression),
                type_annotation,
                loc: self.finish(start),
            })),
            None => Ok(expression),
        }
    }

    fn parse_array_literal(&mut self, start: Position) -> ParseResult<Expression> {
        self.parse_expected("[")?;
        let mut elements = Vec::new();
        while !self.is_punct("]") {
            // Holes are skipped.
            if self.eat_punct(",")? {
                continue;
            }
            elements.push(self.parse_spread_or_assignment()?);
            if !self.eat_punct(",")? {
                break;
            }
        }
        self.parse_expected("]")?;
        Ok(Expression::Array(ArrayExpression {
            elements,
            loc: self.finish(start),
        }))
    }

    fn parse_object_literal(&mut self, start: Position) -> ParseResult<Expression> {
        self.parse_expected("{")?;
        let mut properties = Vec::new();
        while !self.is_punct("}") {
            if let Some(member) = self.parse_object_member()? {
                properties.push(member);
            }
            if !self.eat_punct(",")? {
                break;
            }
        }
        self.parse_expected("}")?;
        Ok(Expression::Object(ObjectExpression {
            properties,
            loc: self.finish(start),
        }))
    }

    /// One object literal member. Spread and computed members are parsed
    /// and dropped.
    fn parse_object_member(&mut self) -> ParseResult<Option<ObjectMember>> {
        let start = self.start();
        if self.eat_punct("...")? {
            self.parse_assignment_expression()?;
            return Ok(None);
        }
        if self.is_punct("[") {
            self.skip_balanced()?;
            if self.eat_punct(":")? {
                self.parse_assignment_expression()?;
            } else {
                self.parse_function_rest(start, None, false)?;
            }
            return Ok(None);
        }

        let mut is_async = false;
        let is_modifier = |p: &mut Self| {
            p.peek_token().is_some_and(|next| {
                matches!(
                    next.kind,
                    SyntaxKind::Identifier | SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral
                ) || next.is_punct("*")
            })
        };
        if (self.is_keyword("get") || self.is_keyword("set")) && is_modifier(self) {
            self.next_token()?;
        } else if self.is_keyword("async") && is_modifier(self) {
            self.next_token()?;
            is_async = true;
        }
        self.eat_punct("*")?;

        let key = self.parse_property_key()?;
        if self.is_punct("(") || self.is_punct("<") {
            let function = self.parse_function_rest(key.loc.start, Some(key.clone()), is_async)?;
            return Ok(Some(ObjectMember::Method {
                key,
                function,
                loc: self.finish(start),
            }));
        }
        if self.eat_punct(":")? {
            let value = self.parse_assignment_expression()?;
            return Ok(Some(ObjectMember::Property {
                key,
                value,
                shorthand: false,
                loc: self.finish(start),
            }));
        }
        Ok(Some(ObjectMember::Property {
            value: Expression::Identifier(key.clone()),
            key,
            shorthand: true,
            loc: self.finish(start),
        }))
    }

    /// Template literal starting at a template head or a complete template.
    pub(crate) fn parse_template_literal(&mut self) -> ParseResult<Expression> {
        let start = self.start();
        if self.is_token(SyntaxKind::NoSubstitutionTemplate) {
            self.next_token()?;
            return Ok(Expression::TemplateLiteral(TemplateLiteral {
                expressions: Vec::new(),
                loc: self.finish(start),
            }));
        }
        if !self.is_token(SyntaxKind::TemplateHead) {
            return Err(self.error_unexpected());
        }

        let mut expressions = Vec::new();
        self.next_token()?;
        loop {
            expressions.push(self.parse_expression()?);
            if !self.is_punct("}") {
                return Err(self.error_expected("}"));
            }
            let brace = self.current.clone();
            self.current = self.scanner.scan_template_continuation(&brace)?;
            let tail = self.is_token(SyntaxKind::TemplateTail);
            self.next_token()?;
            if tail {
                break;
            }
        }
        Ok(Expression::TemplateLiteral(TemplateLiteral {
            expressions,
            loc: self.finish(start),
        }))
    }
}
