use crate::parse;
use hegel_ast::*;
use hegel_common::Position;

fn single(text: &str) -> Statement {
    let mut program = parse(text).unwrap();
    assert_eq!(program.body.len(), 1, "expected one statement in {text:?}");
    program.body.remove(0)
}

fn expression(text: &str) -> Expression {
    match single(text) {
        Statement::Expression(statement) => statement.expression,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn initializer(text: &str) -> Expression {
    match single(text) {
        Statement::VariableDeclaration(mut declaration) => {
            declaration.declarations.remove(0).init.unwrap()
        }
        other => panic!("expected variable declaration, got {other:?}"),
    }
}

#[test]
fn test_variable_declaration_with_nested_generic_annotation() {
    let Statement::VariableDeclaration(declaration) =
        single("const a: Array<Array<number>> = [];")
    else {
        panic!("expected declaration");
    };
    assert_eq!(declaration.kind, VariableKind::Const);
    assert!(!declaration.declare);
    let declarator = &declaration.declarations[0];
    assert_eq!(declarator.id.name, "a");
    let Some(TypeAnnotation::Reference {
        name,
        type_arguments,
        ..
    }) = &declarator.type_annotation
    else {
        panic!("expected reference annotation");
    };
    assert_eq!(name.name, "Array");
    assert!(matches!(
        &type_arguments[0],
        TypeAnnotation::Reference { name, type_arguments, .. }
            if name.name == "Array" && type_arguments.len() == 1
    ));
}

#[test]
fn test_locations_are_line_one_based_and_column_zero_based() {
    let program = parse("\nlet x = 1;").unwrap();
    let loc = program.body[0].loc();
    assert_eq!((loc.start.line, loc.start.column), (2, 0));
    assert_eq!((loc.end.line, loc.end.column), (2, 10));

    // Statement ranges cover the terminator when there is one.
    let program = parse("let y = 2\nlet z = 3;").unwrap();
    assert_eq!(program.body[0].loc().end, Position::new(1, 9));
    assert_eq!(program.body[1].loc().end, Position::new(2, 10));
}

#[test]
fn test_arrow_functions_are_distinguished_from_parentheses() {
    let Expression::Function(arrow) = initializer("const f = (a: number, b?: string): number => a;")
    else {
        panic!("expected arrow function");
    };
    assert!(arrow.is_arrow);
    assert_eq!(arrow.params.len(), 2);
    assert!(arrow.params[1].optional);
    assert!(matches!(arrow.body, Some(FunctionBody::Expression(_))));

    assert!(matches!(initializer("const g = (a + b);"), Expression::Binary(_)));
    assert!(matches!(initializer("const h = x => x;"), Expression::Function(_)));

    let Expression::Function(generic) = initializer("const id = <T>(x: T): T => { return x; };")
    else {
        panic!("expected generic arrow");
    };
    assert_eq!(generic.type_parameters[0].name.name, "T");
}

#[test]
fn test_type_cast_in_parentheses() {
    let Expression::TypeCast(cast) = initializer("const a = (b: number);") else {
        panic!("expected cast");
    };
    assert!(matches!(
        cast.type_annotation,
        TypeAnnotation::Keyword {
            keyword: KeywordType::Number,
            ..
        }
    ));
}

#[test]
fn test_explicit_type_arguments_versus_comparison() {
    let Expression::Call(call) = expression("id<number>(1);") else {
        panic!("expected call");
    };
    assert_eq!(call.type_arguments.len(), 1);
    assert_eq!(call.arguments.len(), 1);

    let Expression::Binary(comparison) = expression("a < b;") else {
        panic!("expected comparison");
    };
    assert_eq!(comparison.operator, BinaryOperator::Less);
}

#[test]
fn test_operator_precedence_and_associativity() {
    // 1 + (2 * (3 ** (2 ** 1)))
    let Expression::Binary(sum) = expression("1 + 2 * 3 ** 2 ** 1;") else {
        panic!("expected binary");
    };
    assert_eq!(sum.operator, BinaryOperator::Add);
    let Expression::Binary(product) = *sum.right else {
        panic!("expected product");
    };
    assert_eq!(product.operator, BinaryOperator::Multiply);
    let Expression::Binary(power) = *product.right else {
        panic!("expected power");
    };
    assert_eq!(power.operator, BinaryOperator::Exponent);
    assert!(matches!(*power.right, Expression::Binary(_)));

    let Expression::Logical(logical) = expression("a || b && c;") else {
        panic!("expected logical");
    };
    assert_eq!(logical.operator, LogicalOperator::Or);
    assert!(matches!(*logical.right, Expression::Logical(_)));
}

#[test]
fn test_member_calls_and_optional_chains() {
    let Expression::Member(member) = expression("a.b?.c(1, 2)[0];") else {
        panic!("expected computed member at the top");
    };
    assert!(matches!(member.property, MemberProperty::Computed(_)));
    let Expression::Call(call) = *member.object else {
        panic!("expected call");
    };
    assert_eq!(call.arguments.len(), 2);
    let Expression::Member(callee) = *call.callee else {
        panic!("expected member callee");
    };
    assert!(callee.optional);
    assert!(matches!(callee.property, MemberProperty::Named(ref name) if name.name == "c"));
}

#[test]
fn test_template_literal_collects_substitutions() {
    let Expression::TemplateLiteral(template) = initializer("const s = `a${x}b${y + 1}c`;")
    else {
        panic!("expected template");
    };
    assert_eq!(template.expressions.len(), 2);
    assert!(matches!(template.expressions[1], Expression::Binary(_)));
}

#[test]
fn test_automatic_semicolon_insertion() {
    let program = parse("let a = 1\nlet b = a\nb = 2").unwrap();
    assert_eq!(program.body.len(), 3);
    assert!(parse("let a = 1 let b = 2").is_err());
}

#[test]
fn test_function_declaration_with_generics_and_defaults() {
    let Statement::FunctionDeclaration(function) =
        single("async function f<T: number>(a: T, ...rest: Array<T>): Promise<T> { return a; }")
    else {
        panic!("expected function");
    };
    assert!(function.is_async);
    assert_eq!(function.id.as_ref().unwrap().name, "f");
    assert!(function.type_parameters[0].constraint.is_some());
    assert!(function.params[1].rest);
    assert!(matches!(function.body, Some(FunctionBody::Block(_))));
}

#[test]
fn test_async_function_expression_and_async_identifier() {
    let Expression::Function(function) = initializer("const f = async function (x) { return x; };")
    else {
        panic!("expected function expression");
    };
    assert!(function.is_async);
    assert!(function.id.is_none());
    assert_eq!(function.params.len(), 1);

    let Expression::Identifier(name) = initializer("const b = async;") else {
        panic!("expected identifier");
    };
    assert_eq!(name.name, "async");
}

#[test]
fn test_class_with_heritage_and_members() {
    let source = "class Point<T> extends Base<T> {
        x: number = 1;
        static origin: Point<number>;
        constructor(x: number) { this.x = x; }
        get length(): number { return this.x; }
        move(dx: number) { this.x += dx; }
    }";
    let Statement::ClassDeclaration(class) = single(source) else {
        panic!("expected class");
    };
    assert_eq!(class.id.as_ref().unwrap().name, "Point");
    assert_eq!(class.super_class.as_ref().unwrap().name, "Base");
    assert_eq!(class.super_type_arguments.len(), 1);
    assert_eq!(class.body.len(), 5);
    let kinds: Vec<_> = class
        .body
        .iter()
        .filter_map(|member| match member {
            ClassMember::Method(method) => Some(method.kind),
            ClassMember::Property(_) => None,
        })
        .collect();
    assert_eq!(kinds, [MethodKind::Constructor, MethodKind::Get, MethodKind::Method]);
    assert!(matches!(&class.body[1], ClassMember::Property(p) if p.is_static));
}

#[test]
fn test_type_alias_and_interface() {
    let Statement::TypeAlias(alias) =
        single("type Handler<T> = (event: T, ...rest: Array<mixed>) => ?T | void;")
    else {
        panic!("expected alias");
    };
    let TypeAnnotation::Function(function) = alias.right else {
        panic!("expected function type");
    };
    assert_eq!(function.params.len(), 2);
    assert!(matches!(*function.return_type, TypeAnnotation::Union { .. }));

    let Statement::TypeAlias(interface) =
        single("interface User extends Named { id: number; save(force?: boolean): void }")
    else {
        panic!("expected interface");
    };
    let TypeAnnotation::Intersection { types, .. } = interface.right else {
        panic!("expected intersection with parent");
    };
    let TypeAnnotation::Object(body) = &types[1] else {
        panic!("expected object body");
    };
    assert_eq!(body.properties.len(), 2);
    assert_eq!(body.properties[1].key.name, "save");
}

#[test]
fn test_imports_of_every_shape() {
    let program = parse(
        "import def, { a, b as c } from './x';
         import * as ns from \"./y\";
         import type { T } from './types';
         import './side-effect';",
    )
    .unwrap();
    let imports: Vec<_> = program
        .body
        .iter()
        .map(|statement| match statement {
            Statement::Import(import) => import,
            other => panic!("expected import, got {other:?}"),
        })
        .collect();
    assert_eq!(imports[0].specifiers.len(), 3);
    assert!(matches!(
        &imports[0].specifiers[2],
        ImportSpecifier::Named { imported, local, .. } if imported.name == "b" && local.name == "c"
    ));
    assert!(matches!(&imports[1].specifiers[0], ImportSpecifier::Namespace { .. }));
    assert_eq!(imports[2].import_kind, ImportKind::Type);
    assert!(imports[3].specifiers.is_empty());
    assert_eq!(imports[3].source.value, "./side-effect");
}

#[test]
fn test_exports_and_reexports() {
    let program = parse(
        "export const a = 1;
         export type T = number;
         export { a as b };
         export { c } from './c';
         export default function () {}",
    )
    .unwrap();
    let Statement::ExportNamed(first) = &program.body[0] else {
        panic!("expected named export");
    };
    assert!(matches!(
        first.declaration.as_deref(),
        Some(Statement::VariableDeclaration(_))
    ));
    let Statement::ExportNamed(alias) = &program.body[1] else {
        panic!("expected type export");
    };
    assert_eq!(alias.export_kind, ImportKind::Type);
    let Statement::ExportNamed(reexport) = &program.body[3] else {
        panic!("expected re-export");
    };
    assert_eq!(reexport.source.as_ref().unwrap().value, "./c");
    assert!(matches!(
        &program.body[4],
        Statement::ExportDefault(ExportDefaultDeclaration {
            declaration: ExportDefaultKind::Function(_),
            ..
        })
    ));
    let specifiers: Vec<_> = import_requests(&program)
        .into_iter()
        .map(|request| request.specifier)
        .collect();
    assert_eq!(specifiers, ["./c"]);
}

#[test]
fn test_ambient_declarations() {
    let program = parse(
        "declare var console: { log(...args: Array<mixed>): void };
         declare function parseInt(text: string, radix?: number): number;
         declare class Map<K, V> { get(key: K): V | void; }
         declare module \"fs\" {
           declare export function readFileSync(path: string): string;
         }",
    )
    .unwrap();
    assert!(matches!(
        &program.body[0],
        Statement::VariableDeclaration(declaration) if declaration.declare
    ));
    assert!(matches!(
        &program.body[1],
        Statement::FunctionDeclaration(function) if function.body.is_none()
    ));
    let Statement::ClassDeclaration(class) = &program.body[2] else {
        panic!("expected class");
    };
    assert!(class.declare);
    let ClassMember::Method(get) = &class.body[0] else {
        panic!("expected method");
    };
    assert!(get.function.body.is_none());
    let Statement::DeclareModule(module) = &program.body[3] else {
        panic!("expected declare module");
    };
    assert_eq!(module.name.value, "fs");
    assert!(matches!(&module.body[0], Statement::ExportNamed(_)));
}

#[test]
fn test_unsupported_constructs_become_unknown_nodes() {
    let program = parse(
        "switch (x) {
           case 1: break;
         }
         for (const item of items) { use(item); }
         after();",
    )
    .unwrap();
    assert_eq!(program.body.len(), 3);
    assert!(matches!(&program.body[0], Statement::Unknown(node) if node.kind == "SwitchStatement"));
    assert!(matches!(&program.body[1], Statement::Unknown(node) if node.kind == "ForOfStatement"));
    assert!(matches!(&program.body[2], Statement::Expression(_)));
}

#[test]
fn test_skipped_block_statement_ends_at_its_closing_brace() {
    let program = parse("switch (x) { case 1: break; } const after = true;").unwrap();
    assert_eq!(program.body.len(), 2);
    assert!(matches!(&program.body[0], Statement::Unknown(node) if node.kind == "SwitchStatement"));
    assert!(
        matches!(&program.body[1], Statement::VariableDeclaration(d) if d.declarations[0].id.name == "after")
    );

    let pattern = parse("const { a } = source; next();").unwrap();
    assert_eq!(pattern.body.len(), 2);
    assert!(matches!(&pattern.body[0], Statement::Unknown(node) if node.kind == "BindingPattern"));
    assert!(matches!(&pattern.body[1], Statement::Expression(_)));
}

#[test]
fn test_control_flow_statements() {
    let program = parse(
        "if (a) { b(); } else c();
         while (i < 10) i++;
         for (let i = 0; i < n; i += 1) {}
         try { risky(); } catch (e) { handle(e); } finally { done(); }
         throw new Error('x');",
    )
    .unwrap();
    assert!(matches!(&program.body[0], Statement::If(statement) if statement.alternate.is_some()));
    assert!(matches!(&program.body[1], Statement::While(_)));
    let Statement::For(for_statement) = &program.body[2] else {
        panic!("expected for");
    };
    assert!(matches!(for_statement.init, Some(ForInit::Variable(_))));
    assert!(matches!(
        &program.body[3],
        Statement::Try(statement) if statement.handler.is_some() && statement.finalizer.is_some()
    ));
    assert!(matches!(
        &program.body[4],
        Statement::Throw(ThrowStatement {
            argument: Expression::New(_),
            ..
        })
    ));
}

#[test]
fn test_object_literal_members() {
    let Expression::Object(object) = initializer("const o = { a: 1, b, c() { return 2; }, 'd-e': 3 };")
    else {
        panic!("expected object");
    };
    assert_eq!(object.properties.len(), 4);
    assert!(matches!(&object.properties[1], ObjectMember::Property { shorthand: true, .. }));
    assert!(matches!(&object.properties[2], ObjectMember::Method { .. }));
    assert!(matches!(
        &object.properties[3],
        ObjectMember::Property { key, .. } if key.name == "d-e"
    ));
}

#[test]
fn test_parse_error_reports_location() {
    let err = parse("const a = ;").unwrap_err();
    assert_eq!(err.message, "Unexpected token \";\"");
    assert_eq!((err.loc.start.line, err.loc.start.column), (1, 10));

    let err = parse("function f( {").unwrap_err();
    assert_eq!(err.message, "Destructuring patterns are not supported");
}

#[test]
fn test_invalid_assignment_target() {
    let err = parse("1 = 2;").unwrap_err();
    assert_eq!(err.message, "Invalid left-hand side in assignment");
}
