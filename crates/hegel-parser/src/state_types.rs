//! Parser state - type annotations

use crate::ParseError;
use crate::scanner::SyntaxKind;
use crate::state::{ParseResult, ParserState};
use hegel_ast::*;

impl ParserState {
    // =========================================================================
    // Parse Methods - Types
    // =========================================================================

    pub(crate) fn parse_type(&mut self) -> ParseResult<TypeAnnotation> {
        self.enter_recursion()?;
        let result = self.parse_union_type();
        self.exit_recursion();
        result
    }

    fn parse_union_type(&mut self) -> ParseResult<TypeAnnotation> {
        let start = self.start();
        self.eat_punct("|")?;
        let first = self.parse_intersection_type()?;
        if !self.is_punct("|") {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat_punct("|")? {
            types.push(self.parse_intersection_type()?);
        }
        Ok(TypeAnnotation::Union {
            types,
            loc: self.finish(start),
        })
    }

    fn parse_intersection_type(&mut self) -> ParseResult<TypeAnnotation> {
        let start = self.start();
        self.eat_punct("&")?;
        let first = self.parse_postfix_type()?;
        if !self.is_punct("&") {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat_punct("&")? {
            types.push(self.parse_postfix_type()?);
        }
        Ok(TypeAnnotation::Intersection {
            types,
            loc: self.finish(start),
        })
    }

    /// Primary type followed by any number of `[]`.
    fn parse_postfix_type(&mut self) -> ParseResult<TypeAnnotation> {
        let start = self.start();
        let mut ty = self.parse_primary_type()?;
        while self.is_punct("[") && !self.current.preceded_by_line_break {
            self.next_token()?;
            if !self.is_punct("]") {
                return Err(ParseError::new(
                    "Indexed access types are not supported",
                    self.current.loc,
                ));
            }
            self.next_token()?;
            ty = TypeAnnotation::Array {
                element: Box::new(ty),
                loc: self.finish(start),
            };
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> ParseResult<TypeAnnotation> {
        let start = self.start();
        match self.current.kind {
            SyntaxKind::StringLiteral => {
                let token = self.next_token()?;
                Ok(TypeAnnotation::Literal {
                    value: LiteralTypeValue::String(token.value),
                    loc: token.loc,
                })
            }
            SyntaxKind::NumericLiteral => self.parse_numeric_literal_type(false),
            SyntaxKind::NoSubstitutionTemplate => {
                let token = self.next_token()?;
                Ok(TypeAnnotation::Literal {
                    value: LiteralTypeValue::String(token.value),
                    loc: token.loc,
                })
            }
            SyntaxKind::Identifier => self.parse_type_identifier_or_keyword(),
            SyntaxKind::Punctuation => match self.current.value.as_str() {
                "?" => {
                    self.next_token()?;
                    let inner = self.parse_postfix_type()?;
                    Ok(TypeAnnotation::Nullable {
                        inner: Box::new(inner),
                        loc: self.finish(start),
                    })
                }
                "-" => {
                    self.next_token()?;
                    if !self.is_token(SyntaxKind::NumericLiteral) {
                        return Err(self.error_unexpected());
                    }
                    let mut literal = self.parse_numeric_literal_type(true)?;
                    if let TypeAnnotation::Literal { loc, .. } = &mut literal {
                        loc.start = start;
                    }
                    Ok(literal)
                }
                "(" => self.parse_parenthesized_type_or_function_type(),
                "<" => Ok(TypeAnnotation::Function(self.parse_function_type()?)),
                "{" => Ok(TypeAnnotation::Object(self.parse_object_type()?)),
                "[" => self.parse_tuple_type(),
                _ => Err(self.error_unexpected()),
            },
            _ => Err(self.error_unexpected()),
        }
    }

    fn parse_numeric_literal_type(&mut self, negative: bool) -> ParseResult<TypeAnnotation> {
        let token = self.next_token()?;
        let value: f64 = token
            .value
            .parse()
            .map_err(|_| ParseError::new("Invalid numeric literal", token.loc))?;
        Ok(TypeAnnotation::Literal {
            value: LiteralTypeValue::Number(if negative { -value } else { value }),
            loc: token.loc,
        })
    }

    fn parse_type_identifier_or_keyword(&mut self) -> ParseResult<TypeAnnotation> {
        match self.current.value.as_str() {
            "true" | "false" => {
                let token = self.next_token()?;
                Ok(TypeAnnotation::Literal {
                    value: LiteralTypeValue::Boolean(token.value == "true"),
                    loc: token.loc,
                })
            }
            "typeof" | "keyof" | "infer" | "unique" => Err(ParseError::new(
                format!("\"{}\" types are not supported", self.current.value),
                self.current.loc,
            )),
            text => {
                if let Some(keyword) = KeywordType::from_keyword(text) {
                    let token = self.next_token()?;
                    return Ok(TypeAnnotation::Keyword {
                        keyword,
                        loc: token.loc,
                    });
                }
                self.parse_type_reference()
            }
        }
    }

    /// `Name`, `Qualified.Name` or `Name<Args>`.
    pub(crate) fn parse_type_reference(&mut self) -> ParseResult<TypeAnnotation> {
        let start = self.start();
        let mut name = self.parse_identifier()?;
        while self.is_punct(".") {
            self.next_token()?;
            let part = self.parse_property_key()?;
            name = Identifier::new(format!("{}.{}", name.name, part.name), name.loc.to(part.loc));
        }
        let type_arguments = if self.is_punct("<") && !self.current.preceded_by_line_break {
            self.parse_type_arguments()?
        } else {
            Vec::new()
        };
        Ok(TypeAnnotation::Reference {
            name,
            type_arguments,
            loc: self.finish(start),
        })
    }

    fn parse_parenthesized_type_or_function_type(&mut self) -> ParseResult<TypeAnnotation> {
        if let Some(function) = self.try_parse(|p| p.parse_function_type()) {
            return Ok(TypeAnnotation::Function(function));
        }
        self.parse_expected("(")?;
        let inner = self.parse_type()?;
        self.parse_expected(")")?;
        Ok(inner)
    }

    /// `<T>(a: A, b?: B, ...rest: R[]) => Return`
    pub(crate) fn parse_function_type(&mut self) -> ParseResult<FunctionTypeAnnotation> {
        let start = self.start();
        let type_parameters = self.parse_type_parameters_opt()?;
        let params = self.parse_function_type_params()?;
        self.parse_expected("=>")?;
        let return_type = self.parse_type()?;
        Ok(FunctionTypeAnnotation {
            type_parameters,
            params,
            return_type: Box::new(return_type),
            loc: self.finish(start),
        })
    }

    fn parse_function_type_params(&mut self) -> ParseResult<Vec<FunctionTypeParam>> {
        self.parse_expected("(")?;
        let mut params = Vec::new();
        while !self.is_punct(")") {
            let rest = self.eat_punct("...")?;
            let named = self.is_token(SyntaxKind::Identifier)
                && self
                    .peek_token()
                    .is_some_and(|next| next.is_punct(":") || next.is_punct("?"));
            let (name, optional) = if named {
                let name = self.parse_identifier()?;
                let optional = self.eat_punct("?")?;
                self.parse_expected(":")?;
                (Some(name), optional)
            } else {
                (None, false)
            };
            let type_annotation = self.parse_type()?;
            params.push(FunctionTypeParam {
                name,
                type_annotation,
                optional,
                rest,
            });
            if !self.eat_punct(",")? {
                break;
            }
        }
        self.parse_expected(")")?;
        Ok(params)
    }

    /// `{ a: A, b?: B; method(x: X): R }`. Index and call signatures are
    /// parsed and dropped.
    pub(crate) fn parse_object_type(&mut self) -> ParseResult<ObjectTypeAnnotation> {
        let start = self.start();
        self.parse_expected("{")?;
        let mut properties = Vec::new();
        while !self.is_punct("}") {
            if let Some(property) = self.parse_object_type_member()? {
                properties.push(property);
            }
            if !self.eat_punct(",")? && !self.eat_punct(";")? && !self.current.preceded_by_line_break {
                break;
            }
        }
        self.parse_expected("}")?;
        Ok(ObjectTypeAnnotation {
            properties,
            exact: false,
            loc: self.finish(start),
        })
    }

    fn parse_object_type_member(&mut self) -> ParseResult<Option<ObjectTypeProperty>> {
        let start = self.start();
        if self.is_punct("[") {
            self.skip_balanced()?;
            self.eat_punct("?")?;
            if self.eat_punct(":")? {
                self.parse_type()?;
            } else {
                self.parse_function_type_params()?;
                self.parse_expected(":")?;
                self.parse_type()?;
            }
            return Ok(None);
        }
        if self.is_punct("(") || self.is_punct("<") {
            self.parse_type_parameters_opt()?;
            self.parse_function_type_params()?;
            self.parse_expected(":")?;
            self.parse_type()?;
            return Ok(None);
        }
        if self.is_keyword("readonly")
            && self
                .peek_token()
                .is_some_and(|next| next.kind == SyntaxKind::Identifier || next.kind == SyntaxKind::StringLiteral)
        {
            self.next_token()?;
        }

        let key = self.parse_property_key()?;
        let optional = self.eat_punct("?")?;

        if self.is_punct("(") || self.is_punct("<") {
            let signature_start = self.start();
            let type_parameters = self.parse_type_parameters_opt()?;
            let params = self.parse_function_type_params()?;
            self.parse_expected(":")?;
            let return_type = self.parse_type()?;
            return Ok(Some(ObjectTypeProperty {
                key,
                value: TypeAnnotation::Function(FunctionTypeAnnotation {
                    type_parameters,
                    params,
                    return_type: Box::new(return_type),
                    loc: self.finish(signature_start),
                }),
                optional,
                loc: self.finish(start),
            }));
        }

        self.parse_expected(":")?;
        let value = self.parse_type()?;
        Ok(Some(ObjectTypeProperty {
            key,
            value,
            optional,
            loc: self.finish(start),
        }))
    }

    fn parse_tuple_type(&mut self) -> ParseResult<TypeAnnotation> {
        let start = self.start();
        self.parse_expected("[")?;
        let mut elements = Vec::new();
        while !self.is_punct("]") {
            elements.push(self.parse_type()?);
            if !self.eat_punct(",")? {
                break;
            }
        }
        self.parse_expected("]")?;
        Ok(TypeAnnotation::Tuple {
            elements,
            loc: self.finish(start),
        })
    }

    // =========================================================================
    // Type parameters and arguments
    // =========================================================================

    /// `<T, U: Bound = Default>`; both `extends` and `:` introduce a bound.
    pub(crate) fn parse_type_parameters_opt(&mut self) -> ParseResult<Vec<TypeParameter>> {
        if !self.is_punct("<") {
            return Ok(Vec::new());
        }
        self.next_token()?;
        let mut parameters = Vec::new();
        while !self.is_punct(">") {
            let start = self.start();
            let name = self.parse_identifier()?;
            let constraint = if self.eat_keyword("extends")? || self.eat_punct(":")? {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default = if self.eat_punct("=")? {
                Some(self.parse_type()?)
            } else {
                None
            };
            parameters.push(TypeParameter {
                name,
                constraint,
                default,
                loc: self.finish(start),
            });
            if !self.eat_punct(",")? {
                break;
            }
        }
        self.parse_expected_greater_than()?;
        Ok(parameters)
    }

    pub(crate) fn parse_type_arguments(&mut self) -> ParseResult<Vec<TypeAnnotation>> {
        self.parse_expected("<")?;
        let mut arguments = Vec::new();
        while !self.is_punct(">") {
            arguments.push(self.parse_type()?);
            if !self.eat_punct(",")? {
                break;
            }
        }
        self.parse_expected_greater_than()?;
        Ok(arguments)
    }
}
