//! Statement and expression nodes.

use crate::types::{TypeAnnotation, TypeParameter};
use hegel_common::SourceLocation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Statement>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub loc: SourceLocation,
}

impl Identifier {
    pub fn new(name: impl Into<String>, loc: SourceLocation) -> Self {
        Identifier {
            name: name.into(),
            loc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,
    pub loc: SourceLocation,
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration(Function),
    ClassDeclaration(Class),
    TypeAlias(TypeAlias),
    Block(BlockStatement),
    If(IfStatement),
    While(WhileStatement),
    For(ForStatement),
    Return(ReturnStatement),
    Throw(ThrowStatement),
    Try(TryStatement),
    Expression(ExpressionStatement),
    Import(ImportDeclaration),
    ExportNamed(ExportNamedDeclaration),
    ExportDefault(ExportDefaultDeclaration),
    DeclareModule(DeclareModule),
    Empty { loc: SourceLocation },
    Unknown(UnknownNode),
}

impl Statement {
    pub fn loc(&self) -> SourceLocation {
        match self {
            Statement::VariableDeclaration(node) => node.loc,
            Statement::FunctionDeclaration(node) => node.loc,
            Statement::ClassDeclaration(node) => node.loc,
            Statement::TypeAlias(node) => node.loc,
            Statement::Block(node) => node.loc,
            Statement::If(node) => node.loc,
            Statement::While(node) => node.loc,
            Statement::For(node) => node.loc,
            Statement::Return(node) => node.loc,
            Statement::Throw(node) => node.loc,
            Statement::Try(node) => node.loc,
            Statement::Expression(node) => node.loc,
            Statement::Import(node) => node.loc,
            Statement::ExportNamed(node) => node.loc,
            Statement::ExportDefault(node) => node.loc,
            Statement::DeclareModule(node) => node.loc,
            Statement::Empty { loc } => *loc,
            Statement::Unknown(node) => node.loc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub kind: VariableKind,
    pub declarations: Vec<VariableDeclarator>,
    /// `declare const x: T;`
    pub declare: bool,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclarator {
    pub id: Identifier,
    pub type_annotation: Option<TypeAnnotation>,
    pub init: Option<Expression>,
    pub loc: SourceLocation,
}

/// Function declarations, function expressions and arrow functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: Option<Identifier>,
    pub type_parameters: Vec<TypeParameter>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    /// `None` for `declare function` signatures.
    pub body: Option<FunctionBody>,
    pub is_arrow: bool,
    pub is_async: bool,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "node")]
pub enum FunctionBody {
    Block(BlockStatement),
    Expression(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Identifier,
    pub type_annotation: Option<TypeAnnotation>,
    pub optional: bool,
    pub rest: bool,
    pub default: Option<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: Option<Identifier>,
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: Option<Identifier>,
    pub super_type_arguments: Vec<TypeAnnotation>,
    pub body: Vec<ClassMember>,
    pub declare: bool,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClassMember {
    Property(ClassProperty),
    Method(ClassMethod),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProperty {
    pub key: Identifier,
    pub is_static: bool,
    pub type_annotation: Option<TypeAnnotation>,
    pub value: Option<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMethod {
    pub key: Identifier,
    pub kind: MethodKind,
    pub is_static: bool,
    pub function: Function,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAlias {
    pub id: Identifier,
    pub type_parameters: Vec<TypeParameter>,
    pub right: TypeAnnotation,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStatement {
    pub body: Vec<Statement>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Box<Statement>,
    pub alternate: Option<Box<Statement>>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStatement {
    pub test: Expression,
    pub body: Box<Statement>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub test: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Box<Statement>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "node")]
pub enum ForInit {
    Variable(VariableDeclaration),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub argument: Option<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowStatement {
    pub argument: Expression,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryStatement {
    pub block: BlockStatement,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<BlockStatement>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub param: Option<Identifier>,
    pub body: BlockStatement,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportKind {
    Value,
    Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDeclaration {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: StringLiteral,
    pub import_kind: ImportKind,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImportSpecifier {
    Named {
        imported: Identifier,
        local: Identifier,
        loc: SourceLocation,
    },
    Default {
        local: Identifier,
        loc: SourceLocation,
    },
    Namespace {
        local: Identifier,
        loc: SourceLocation,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportNamedDeclaration {
    pub declaration: Option<Box<Statement>>,
    pub specifiers: Vec<ExportSpecifier>,
    /// `export { a } from "source"`
    pub source: Option<StringLiteral>,
    pub export_kind: ImportKind,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSpecifier {
    pub local: Identifier,
    pub exported: Identifier,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDefaultDeclaration {
    pub declaration: ExportDefaultKind,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "node")]
pub enum ExportDefaultKind {
    Function(Function),
    Class(Class),
    Expression(Expression),
}

/// `declare module "name" { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclareModule {
    pub name: StringLiteral,
    pub body: Vec<Statement>,
    pub loc: SourceLocation,
}

/// A construct the front-end recognised but does not model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownNode {
    pub kind: String,
    pub loc: SourceLocation,
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    Identifier(Identifier),
    NumericLiteral(NumericLiteral),
    StringLiteral(StringLiteral),
    BooleanLiteral(BooleanLiteral),
    NullLiteral { loc: SourceLocation },
    TemplateLiteral(TemplateLiteral),
    This { loc: SourceLocation },
    Array(ArrayExpression),
    Object(ObjectExpression),
    Function(Box<Function>),
    Call(CallExpression),
    New(CallExpression),
    Member(MemberExpression),
    Unary(UnaryExpression),
    Update(UpdateExpression),
    Binary(BinaryExpression),
    Logical(LogicalExpression),
    Conditional(ConditionalExpression),
    Assignment(AssignmentExpression),
    Sequence(SequenceExpression),
    TypeCast(TypeCastExpression),
    Unknown(UnknownNode),
}

impl Expression {
    pub fn loc(&self) -> SourceLocation {
        match self {
            Expression::Identifier(node) => node.loc,
            Expression::NumericLiteral(node) => node.loc,
            Expression::StringLiteral(node) => node.loc,
            Expression::BooleanLiteral(node) => node.loc,
            Expression::NullLiteral { loc } | Expression::This { loc } => *loc,
            Expression::TemplateLiteral(node) => node.loc,
            Expression::Array(node) => node.loc,
            Expression::Object(node) => node.loc,
            Expression::Function(node) => node.loc,
            Expression::Call(node) | Expression::New(node) => node.loc,
            Expression::Member(node) => node.loc,
            Expression::Unary(node) => node.loc,
            Expression::Update(node) => node.loc,
            Expression::Binary(node) => node.loc,
            Expression::Logical(node) => node.loc,
            Expression::Conditional(node) => node.loc,
            Expression::Assignment(node) => node.loc,
            Expression::Sequence(node) => node.loc,
            Expression::TypeCast(node) => node.loc,
            Expression::Unknown(node) => node.loc,
        }
    }

    /// The identifier this expression names directly, if any.
    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Expression::Identifier(ident) => Some(ident),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericLiteral {
    pub value: f64,
    pub raw: String,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanLiteral {
    pub value: bool,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLiteral {
    pub expressions: Vec<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayExpression {
    pub elements: Vec<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectExpression {
    pub properties: Vec<ObjectMember>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectMember {
    Property {
        key: Identifier,
        value: Expression,
        shorthand: bool,
        loc: SourceLocation,
    },
    Method {
        key: Identifier,
        function: Function,
        loc: SourceLocation,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub type_arguments: Vec<TypeAnnotation>,
    pub arguments: Vec<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: MemberProperty,
    pub optional: bool,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "node")]
pub enum MemberProperty {
    Named(Identifier),
    Computed(Box<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Minus,
    Plus,
    Not,
    BitwiseNot,
    TypeOf,
    Void,
    Delete,
    Await,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub argument: Box<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpression {
    pub operator: UpdateOperator,
    pub prefix: bool,
    pub argument: Box<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Exponent,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
    In,
    InstanceOf,
}

impl BinaryOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Exponent => "**",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::UnsignedShiftRight => ">>>",
            BinaryOperator::In => "in",
            BinaryOperator::InstanceOf => "instanceof",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
    NullishCoalescing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalExpression {
    pub operator: LogicalOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalExpression {
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
}

impl AssignmentOperator {
    /// The binary operator a compound assignment applies, if any.
    pub const fn binary(self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::Assign => None,
            AssignmentOperator::AddAssign => Some(BinaryOperator::Add),
            AssignmentOperator::SubtractAssign => Some(BinaryOperator::Subtract),
            AssignmentOperator::MultiplyAssign => Some(BinaryOperator::Multiply),
            AssignmentOperator::DivideAssign => Some(BinaryOperator::Divide),
            AssignmentOperator::RemainderAssign => Some(BinaryOperator::Remainder),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentExpression {
    pub operator: AssignmentOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceExpression {
    pub expressions: Vec<Expression>,
    pub loc: SourceLocation,
}

/// `(expression: Type)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCastExpression {
    pub expression: Box<Expression>,
    pub type_annotation: TypeAnnotation,
    pub loc: SourceLocation,
}
