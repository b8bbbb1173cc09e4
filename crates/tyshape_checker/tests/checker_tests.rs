//! Checker integration tests.
//!
//! Builds trees with `AstBuilder`, runs full passes and verifies diagnostics
//! and expression types.

use tyshape_ast::{AstBuilder, Expression, IndexKey, Program, Statement};
use tyshape_checker::{check_program, CallResolution, CheckResult, Checker};
use tyshape_diagnostics::DiagnosticKind;
use tyshape_options::CheckerOptions;
use tyshape_types::{ObjectShape, Property, TypeKind};

/// Helper: run a pass with default options.
fn check(statements: Vec<Statement>) -> CheckResult {
    check_program(&Program::new(statements), &CheckerOptions::default())
}

/// Helper: diagnostic codes in report order.
fn codes(result: &CheckResult) -> Vec<u32> {
    result.diagnostics.diagnostics().iter().map(|d| d.code).collect()
}

/// `interface HasEmail { name: string; email: string }` and
/// `interface HasPhoneNumber { name: string; phone: number }`.
fn contact_interfaces(b: &AstBuilder) -> Vec<Statement> {
    vec![
        b.interface(
            "HasEmail",
            &[],
            vec![b.prop("name", b.string_type()), b.prop("email", b.string_type())],
            None,
        ),
        b.interface(
            "HasPhoneNumber",
            &[],
            vec![b.prop("name", b.string_type()), b.prop("phone", b.number_type())],
            None,
        ),
    ]
}

fn email_contact(b: &AstBuilder) -> Expression {
    b.object(vec![("name", b.string("Ada")), ("email", b.string("ada@example.com"))])
}

fn phone_contact(b: &AstBuilder) -> Expression {
    b.object(vec![("name", b.string("Bob")), ("phone", b.number(5551234.0))])
}

// ============================================================================
// Literals and primitives
// ============================================================================

#[test]
fn test_literal_assignable_to_primitive() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.const_decl("a", Some(b.string_type()), Some(b.string("email"))),
        b.const_decl("n", Some(b.number_type()), Some(b.number(3.0))),
        b.const_decl("t", Some(b.boolean_type()), Some(b.boolean(true))),
    ]);
    assert!(result.diagnostics.is_empty(), "{}", result.diagnostics.render());
}

#[test]
fn test_primitive_not_assignable_to_literal() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.let_decl("s", None, Some(b.string("email"))),
        b.const_decl("e", Some(b.string_literal_type("email")), Some(b.name("s"))),
    ]);
    assert_eq!(codes(&result), vec![2322]);
    assert_eq!(result.diagnostics.kinds(), vec![DiagnosticKind::TypeMismatch]);
    assert_eq!(
        result.diagnostics.diagnostics()[0].message_text,
        "Type 'string' is not assignable to type '\"email\"'."
    );
}

#[test]
fn test_literal_primitive_grid() {
    let mut checker = Checker::new();
    let string = checker.type_table.string_type;
    let number = checker.type_table.number_type;
    let boolean = checker.type_table.boolean_type;
    let never = checker.type_table.never_type;
    let cases = [
        (checker.type_table.string_literal("x"), string),
        (checker.type_table.number_literal(42.0), number),
        (checker.type_table.boolean_literal(false), boolean),
    ];
    for (literal, primitive) in cases {
        assert!(checker.is_assignable(literal, primitive));
        assert!(!checker.is_assignable(primitive, literal));
        assert!(checker.is_assignable(never, literal));
    }
}

// ============================================================================
// Unions and intersections
// ============================================================================

#[test]
fn test_union_member_access() {
    let b = AstBuilder::new();
    let mut statements = contact_interfaces(&b);
    statements.push(b.const_decl(
        "someone",
        Some(b.union_type(vec![b.type_ref("HasEmail"), b.type_ref("HasPhoneNumber")])),
        None,
    ));
    let name = b.member(b.name("someone"), "name");
    let name_id = name.data.id;
    statements.push(b.expr_stmt(name));
    statements.push(b.expr_stmt(b.member(b.name("someone"), "phone")));
    statements.push(b.expr_stmt(b.member(b.name("someone"), "email")));

    let result = check(statements);
    assert_eq!(codes(&result), vec![2339, 2339]);
    assert_eq!(result.diagnostics.count_of(DiagnosticKind::TypeMismatch), 2);
    let name_type = result.expression_type(name_id).unwrap();
    assert_eq!(result.type_to_string(name_type), "string");
    assert_eq!(
        result.diagnostics.diagnostics()[0].message_text,
        "Property 'phone' does not exist on type 'HasEmail | HasPhoneNumber'."
    );
}

#[test]
fn test_intersection_member_access() {
    let b = AstBuilder::new();
    let mut statements = contact_interfaces(&b);
    statements.push(b.const_decl(
        "everyone",
        Some(b.intersection_type(vec![b.type_ref("HasEmail"), b.type_ref("HasPhoneNumber")])),
        None,
    ));
    let mut ids = Vec::new();
    for property in ["name", "email", "phone"] {
        let access = b.member(b.name("everyone"), property);
        ids.push(access.data.id);
        statements.push(b.expr_stmt(access));
    }

    let result = check(statements);
    assert!(result.diagnostics.is_empty(), "{}", result.diagnostics.render());
    let rendered: Vec<String> = ids
        .iter()
        .map(|&id| result.type_to_string(result.expression_type(id).unwrap()))
        .collect();
    assert_eq!(rendered, vec!["string", "string", "number"]);
}

#[test]
fn test_intersection_value_needs_every_member() {
    let b = AstBuilder::new();
    let mut statements = contact_interfaces(&b);
    let both = || b.intersection_type(vec![b.type_ref("HasEmail"), b.type_ref("HasPhoneNumber")]);
    statements.push(b.const_decl("partial", Some(both()), Some(email_contact(&b))));
    statements.push(b.const_decl(
        "full",
        Some(both()),
        Some(b.object(vec![
            ("name", b.string("Cy")),
            ("email", b.string("cy@example.com")),
            ("phone", b.number(1.0)),
        ])),
    ));
    let result = check(statements);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics.kinds(), vec![DiagnosticKind::MissingRequiredProperty]);
}

// ============================================================================
// Tuples and arrays
// ============================================================================

#[test]
fn test_tuple_length_mismatch() {
    let b = AstBuilder::new();
    let long = || {
        b.tuple_type(vec![b.number_type(), b.string_type(), b.string_type(), b.number_type()])
    };
    let short = || b.tuple_type(vec![b.number_type(), b.string_type()]);
    let result = check(vec![
        b.const_decl("a", Some(long()), Some(b.array(vec![b.number(1.0), b.string("x")]))),
        b.const_decl(
            "b",
            Some(short()),
            Some(b.array(vec![b.number(1.0), b.string("x"), b.string("y"), b.number(2.0)])),
        ),
    ]);
    assert_eq!(codes(&result), vec![2322, 2322]);
    assert_eq!(result.diagnostics.count_of(DiagnosticKind::TypeMismatch), 2);
    let first = &result.diagnostics.diagnostics()[0];
    assert_eq!(first.related_information[0].code, 2618);
    assert_eq!(
        first.related_information[0].message_text,
        "Source has 2 element(s) but target requires 4."
    );
}

#[test]
fn test_inferred_tuple_assignable_to_array() {
    let b = AstBuilder::new();
    let pair = b.array(vec![b.number(32.0), b.number(31.0)]);
    let pair_id = pair.data.id;
    let result = check(vec![
        b.const_decl("pair", None, Some(pair)),
        b.const_decl("numbers", Some(b.array_type(b.number_type())), Some(b.name("pair"))),
        b.const_decl("strings", Some(b.array_type(b.string_type())), Some(b.name("pair"))),
    ]);
    assert_eq!(result.type_to_string(result.expression_type(pair_id).unwrap()), "[number, number]");
    assert_eq!(codes(&result), vec![2322]);
}

// ============================================================================
// Objects
// ============================================================================

#[test]
fn test_optional_property_may_be_omitted() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.interface(
            "Address",
            &[],
            vec![
                b.prop("houseNumber", b.number_type()),
                b.optional_prop("streetName", b.string_type()),
            ],
            None,
        ),
        b.interface(
            "StrictAddress",
            &[],
            vec![
                b.prop("houseNumber", b.number_type()),
                b.prop("streetName", b.string_type()),
            ],
            None,
        ),
        b.const_decl(
            "ok",
            Some(b.type_ref("Address")),
            Some(b.object(vec![("houseNumber", b.number(33.0))])),
        ),
        b.const_decl(
            "bad",
            Some(b.type_ref("StrictAddress")),
            Some(b.object(vec![("houseNumber", b.number(33.0))])),
        ),
    ]);
    assert_eq!(codes(&result), vec![2741]);
    let diagnostic = &result.diagnostics.diagnostics()[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::MissingRequiredProperty);
    assert_eq!(
        diagnostic.message_text,
        "Property 'streetName' is missing in type '{ houseNumber: number; }' but required in type 'StrictAddress'."
    );
    assert!(diagnostic.expected.is_some());
    assert!(diagnostic.actual.is_some());
}

#[test]
fn test_extra_properties_are_permitted() {
    let b = AstBuilder::new();
    let mut statements = contact_interfaces(&b);
    statements.push(b.const_decl(
        "contact",
        Some(b.type_ref("HasEmail")),
        Some(b.object(vec![
            ("name", b.string("Di")),
            ("email", b.string("di@example.com")),
            ("age", b.number(40.0)),
        ])),
    ));
    assert!(check(statements).diagnostics.is_empty());
}

#[test]
fn test_nested_mismatch_reports_property_chain() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.type_alias(
            "Person",
            b.object_type(
                vec![b.prop(
                    "address",
                    b.object_type(vec![b.prop("zip", b.string_type())], None),
                )],
                None,
            ),
        ),
        b.const_decl(
            "p",
            Some(b.type_ref("Person")),
            Some(b.object(vec![("address", b.object(vec![("zip", b.number(1.0))]))])),
        ),
    ]);
    assert_eq!(codes(&result), vec![2322]);
    let related: Vec<u32> = result.diagnostics.diagnostics()[0]
        .related_information
        .iter()
        .map(|d| d.code)
        .collect();
    assert_eq!(related, vec![2326, 2326, 2322]);
}

#[test]
fn test_index_signature_violation_in_declaration() {
    let b = AstBuilder::new();
    let result = check(vec![b.interface(
        "Scores",
        &[],
        vec![b.prop("label", b.string_type()), b.prop("total", b.number_type())],
        Some(b.index_signature(IndexKey::String, b.number_type())),
    )]);
    assert_eq!(codes(&result), vec![2411]);
    assert_eq!(result.diagnostics.kinds(), vec![DiagnosticKind::IndexSignatureViolation]);
    assert_eq!(
        result.diagnostics.diagnostics()[0].message_text,
        "Property 'label' of type 'string' is not assignable to 'string' index type 'number'."
    );
}

#[test]
fn test_index_signature_target_checks_every_source_property() {
    let b = AstBuilder::new();
    let dict = || {
        b.object_type(
            Vec::new(),
            Some(b.index_signature(IndexKey::String, b.number_type())),
        )
    };
    let result = check(vec![
        b.const_decl("ok", Some(dict()), Some(b.object(vec![("a", b.number(1.0))]))),
        b.const_decl(
            "bad",
            Some(dict()),
            Some(b.object(vec![("a", b.number(1.0)), ("b", b.string("x"))])),
        ),
    ]);
    assert_eq!(result.diagnostics.kinds(), vec![DiagnosticKind::IndexSignatureViolation]);
}

#[test]
fn test_interface_extends_merges_members() {
    let b = AstBuilder::new();
    let mut statements = contact_interfaces(&b);
    statements.push(b.interface(
        "Contact",
        &["HasEmail", "HasPhoneNumber"],
        vec![b.optional_prop("nickname", b.string_type())],
        None,
    ));
    statements.push(b.const_decl(
        "c",
        Some(b.type_ref("Contact")),
        Some(b.object(vec![
            ("name", b.string("Eve")),
            ("email", b.string("eve@example.com")),
            ("phone", b.number(2.0)),
        ])),
    ));
    statements.push(b.const_decl("missing", Some(b.type_ref("Contact")), Some(email_contact(&b))));
    let result = check(statements);
    assert_eq!(codes(&result), vec![2741]);
}

#[test]
fn test_interface_cannot_extend_primitive() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.type_alias("Text", b.string_type()),
        b.interface("Bad", &["Text"], Vec::new(), None),
    ]);
    assert_eq!(codes(&result), vec![2312]);
}

#[test]
fn test_interface_extends_intersection_of_recursive_interfaces() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.type_alias("AB", b.intersection_type(vec![b.type_ref("A"), b.type_ref("B")])),
        b.interface("A", &[], vec![b.optional_prop("child", b.type_ref("C"))], None),
        b.interface("B", &[], vec![b.optional_prop("child", b.type_ref("D"))], None),
        b.interface("D", &[], vec![b.prop("tag", b.string_type())], None),
        b.interface("C", &["AB"], vec![b.prop("tag", b.string_type())], None),
        b.const_decl("c", Some(b.type_ref("C")), Some(b.object(vec![("tag", b.string("x"))]))),
        b.const_decl(
            "nested",
            Some(b.type_ref("C")),
            Some(b.object(vec![
                ("tag", b.string("x")),
                ("child", b.object(vec![("tag", b.string("y"))])),
            ])),
        ),
    ]);
    assert!(result.diagnostics.is_empty(), "{}", result.diagnostics.render());
}

#[test]
fn test_interface_bases_with_conflicting_property() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.interface("A", &[], vec![b.prop("id", b.string_type())], None),
        b.interface("B", &[], vec![b.prop("id", b.number_type())], None),
        b.interface("X", &["A", "B"], Vec::new(), None),
    ]);
    assert_eq!(codes(&result), vec![2320]);
    let diagnostic = &result.diagnostics.diagnostics()[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::TypeMismatch);
    assert_eq!(
        diagnostic.message_text,
        "Interface 'X' cannot simultaneously extend types 'A' and 'B'."
    );
    assert_eq!(diagnostic.related_information[0].code, 2319);
}

#[test]
fn test_interface_bases_with_compatible_property() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.interface("A", &[], vec![b.prop("id", b.string_type())], None),
        b.interface("B", &[], vec![b.prop("id", b.string_literal_type("fixed"))], None),
        b.interface("X", &["A", "B"], Vec::new(), None),
        b.const_decl("x", Some(b.type_ref("X")), Some(b.object(vec![("id", b.string("fixed"))]))),
    ]);
    assert!(result.diagnostics.is_empty(), "{}", result.diagnostics.render());
}

// ============================================================================
// Names and cycles
// ============================================================================

#[test]
fn test_unknown_names() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.const_decl("x", Some(b.type_ref("Missing")), Some(b.number(1.0))),
        b.expr_stmt(b.name("nowhere")),
    ]);
    assert_eq!(codes(&result), vec![2304, 2304]);
    assert_eq!(result.diagnostics.count_of(DiagnosticKind::UnresolvedReference), 2);
}

fn num_val_aliases(b: &AstBuilder, num_val_first: bool) -> Vec<Statement> {
    let num_arr = b.type_alias("NumArr", b.array_type(b.type_ref("NumVal")));
    let num_val = b.type_alias(
        "NumVal",
        b.union_type(vec![
            b.number_literal_type(1.0),
            b.number_literal_type(2.0),
            b.number_literal_type(3.0),
            b.type_ref("NumArr"),
        ]),
    );
    if num_val_first {
        vec![num_val, num_arr]
    } else {
        vec![num_arr, num_val]
    }
}

#[test]
fn test_self_reference_reports_one_circular_alias() {
    let b = AstBuilder::new();
    let result = check(num_val_aliases(&b, true));
    assert_eq!(result.diagnostics.count_of(DiagnosticKind::CircularAlias), 1);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(
        result.diagnostics.diagnostics()[0].message_text,
        "Type alias 'NumVal' circularly references itself."
    );
}

#[test]
fn test_self_reference_in_either_order_reports_once() {
    let b = AstBuilder::new();
    let result = check(num_val_aliases(&b, false));
    assert_eq!(result.diagnostics.count_of(DiagnosticKind::CircularAlias), 1);
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn test_direct_self_reference() {
    let b = AstBuilder::new();
    let result = check(vec![b.type_alias("A", b.array_type(b.type_ref("A")))]);
    assert_eq!(codes(&result), vec![2456]);
}

#[test]
fn test_long_alias_chain_resolves() {
    let b = AstBuilder::new();
    let mut statements: Vec<Statement> = (0..70)
        .map(|i| b.type_alias(&format!("A{i}"), b.type_ref(&format!("A{}", i + 1))))
        .collect();
    statements.push(b.type_alias("A70", b.string_type()));
    statements.push(b.const_decl("x", Some(b.type_ref("A0")), Some(b.string("s"))));
    statements.push(b.const_decl("y", Some(b.type_ref("A0")), Some(b.number(1.0))));
    let result = check(statements);
    assert_eq!(codes(&result), vec![2322]);
    assert!(result.diagnostics.diagnostics()[0].message_text.ends_with("type 'A0'."));
}

#[test]
fn test_circular_interfaces() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.interface("A", &["B"], Vec::new(), None),
        b.interface("B", &["A"], Vec::new(), None),
    ]);
    assert_eq!(codes(&result), vec![2310]);
}

#[test]
fn test_recursive_object_alias_is_legal() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.type_alias(
            "Tree",
            b.object_type(
                vec![
                    b.prop("value", b.number_type()),
                    b.prop("children", b.array_type(b.type_ref("Tree"))),
                ],
                None,
            ),
        ),
        b.const_decl(
            "leaf",
            Some(b.type_ref("Tree")),
            Some(b.object(vec![("value", b.number(1.0)), ("children", b.array(Vec::new()))])),
        ),
        b.const_decl(
            "root",
            Some(b.type_ref("Tree")),
            Some(b.object(vec![
                ("value", b.number(0.0)),
                ("children", b.array(vec![b.name("leaf")])),
            ])),
        ),
    ]);
    assert!(result.diagnostics.is_empty(), "{}", result.diagnostics.render());
}

// ============================================================================
// Overloads
// ============================================================================

/// `contactPeople(method: "email", ...people: HasEmail[])` declared before
/// `contactPeople(method: "phone", ...people: HasPhoneNumber[])`.
fn contact_people(b: &AstBuilder) -> Statement {
    let overload = |method: &str, contact: &str| {
        b.signature(
            vec![
                b.param("method", b.string_literal_type(method)),
                b.rest_param("people", b.array_type(b.type_ref(contact))),
            ],
            b.void_type(),
        )
    };
    let implementation = b.signature(
        vec![
            b.param(
                "method",
                b.union_type(vec![b.string_literal_type("email"), b.string_literal_type("phone")]),
            ),
            b.rest_param(
                "people",
                b.array_type(b.union_type(vec![b.type_ref("HasEmail"), b.type_ref("HasPhoneNumber")])),
            ),
        ],
        b.void_type(),
    );
    b.function_decl(
        "contactPeople",
        vec![overload("email", "HasEmail"), overload("phone", "HasPhoneNumber")],
        Some(implementation),
    )
}

#[test]
fn test_overload_first_match() {
    let b = AstBuilder::new();
    let mut statements = contact_interfaces(&b);
    statements.push(contact_people(&b));
    let call = b.call(b.name("contactPeople"), vec![b.string("email"), email_contact(&b)]);
    let call_id = call.data.id;
    statements.push(b.expr_stmt(call));

    let result = check(statements);
    assert!(result.diagnostics.is_empty(), "{}", result.diagnostics.render());
    assert_eq!(result.expression_type(call_id), Some(result.types.void_type));
}

#[test]
fn test_overload_no_match() {
    let b = AstBuilder::new();
    let mut statements = contact_interfaces(&b);
    statements.push(contact_people(&b));
    let call = b.call(b.name("contactPeople"), vec![b.string("email"), phone_contact(&b)]);
    let call_id = call.data.id;
    statements.push(b.expr_stmt(call));

    let result = check(statements);
    assert_eq!(codes(&result), vec![2769]);
    let diagnostic = &result.diagnostics.diagnostics()[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::NoMatchingOverload);
    assert_eq!(diagnostic.related_information.len(), 2);
    assert_eq!(
        diagnostic.related_information[0].message_text,
        "Overload 1 of 2, '(method: \"email\", ...people: HasEmail[]) => void', gave the following error."
    );
    assert_eq!(diagnostic.related_information[1].related_information[0].code, 2345);
    assert_eq!(result.expression_type(call_id), Some(result.types.never_type));
}

#[test]
fn test_resolve_call_returns_index() {
    let b = AstBuilder::new();
    let mut statements = contact_interfaces(&b);
    statements.push(contact_people(&b));
    let mut checker = Checker::new();
    checker.check_program(&Program::new(statements));

    let function = checker.value_type("contactPeople").unwrap();
    let TypeKind::Function(signatures) = checker.type_table.kind(function).clone() else {
        panic!("expected a function type");
    };
    let email = checker.type_table.string_literal("email");
    let phone = checker.type_table.string_literal("phone");
    let string = checker.type_table.string_type;
    let email_contact = checker
        .type_table
        .object(ObjectShape {
            properties: vec![
                Property { name: "name".to_string(), ty: string, optional: false },
                Property { name: "email".to_string(), ty: string, optional: false },
            ],
            index: None,
        })
        .unwrap();

    assert_eq!(checker.resolve_call(&signatures, &[email, email_contact]), CallResolution::Matched(0));
    assert_eq!(checker.resolve_call(&signatures, &[email]), CallResolution::Matched(0));
    assert_eq!(checker.resolve_call(&signatures, &[phone]), CallResolution::Matched(1));
    assert!(checker.resolve_call(&signatures, &[phone, email_contact]).matched().is_none());
}

#[test]
fn test_single_signature_argument_errors() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.function_decl(
            "greet",
            Vec::new(),
            Some(b.signature(vec![b.param("name", b.string_type())], b.void_type())),
        ),
        b.expr_stmt(b.call(b.name("greet"), vec![b.number(1.0)])),
        b.expr_stmt(b.call(b.name("greet"), Vec::new())),
    ]);
    assert_eq!(codes(&result), vec![2345, 2554]);
    assert_eq!(result.diagnostics.count_of(DiagnosticKind::NoMatchingOverload), 2);
    assert_eq!(
        result.diagnostics.diagnostics()[1].message_text,
        "Expected 1 arguments, but got 0."
    );
}

#[test]
fn test_incompatible_overload_is_reported() {
    let b = AstBuilder::new();
    let result = check(vec![b.function_decl(
        "f",
        vec![b.signature(vec![b.param("x", b.boolean_type())], b.void_type())],
        Some(b.signature(vec![b.param("x", b.string_type())], b.void_type())),
    )]);
    assert_eq!(codes(&result), vec![2394]);
}

#[test]
fn test_not_callable_and_not_constructable() {
    let b = AstBuilder::new();
    let result = check(vec![
        b.const_decl("n", None, Some(b.number(1.0))),
        b.expr_stmt(b.call(b.name("n"), Vec::new())),
        b.expr_stmt(b.new_expr(b.name("n"), Vec::new())),
    ]);
    assert_eq!(codes(&result), vec![2349, 2351]);
}

#[test]
fn test_new_expression_uses_constructor_signature() {
    let b = AstBuilder::new();
    let new = b.new_expr(b.name("Make"), vec![b.string("x")]);
    let new_id = new.data.id;
    let result = check(vec![
        b.const_decl(
            "Make",
            Some(b.constructor_type(b.signature(
                vec![b.param("label", b.string_type())],
                b.object_type(vec![b.prop("label", b.string_type())], None),
            ))),
            None,
        ),
        b.expr_stmt(new),
    ]);
    assert!(result.diagnostics.is_empty(), "{}", result.diagnostics.render());
    assert_eq!(
        result.type_to_string(result.expression_type(new_id).unwrap()),
        "{ label: string; }"
    );
}

// ============================================================================
// Receivers
// ============================================================================

/// `function sendMessage(this: HasEmail & HasPhoneNumber, preferred: "email" | "phone"): void`
fn send_message(b: &AstBuilder) -> Statement {
    b.function_decl(
        "sendMessage",
        Vec::new(),
        Some(b.signature_with_this(
            b.intersection_type(vec![b.type_ref("HasEmail"), b.type_ref("HasPhoneNumber")]),
            vec![b.param(
                "preferred",
                b.union_type(vec![b.string_literal_type("email"), b.string_literal_type("phone")]),
            )],
            b.void_type(),
        )),
    )
}

fn full_contact(b: &AstBuilder) -> Expression {
    b.object(vec![
        ("name", b.string("Fay")),
        ("phone", b.number(3.0)),
        ("email", b.string("fay@example.com")),
    ])
}

#[test]
fn test_unbound_receiver_is_rejected() {
    let b = AstBuilder::new();
    let mut statements = contact_interfaces(&b);
    statements.push(send_message(&b));
    statements.push(b.expr_stmt(b.call(b.name("sendMessage"), vec![b.string("email")])));

    let result = check(statements);
    assert_eq!(codes(&result), vec![2684]);
    let diagnostic = &result.diagnostics.diagnostics()[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::ThisContextUnsatisfied);
    assert_eq!(
        diagnostic.message_text,
        "The 'this' context of type 'void' is not assignable to method's 'this' of type 'HasEmail & HasPhoneNumber'."
    );
}

#[test]
fn test_bound_receiver_is_accepted() {
    let b = AstBuilder::new();
    let mut statements = contact_interfaces(&b);
    statements.push(send_message(&b));
    statements.push(b.expr_stmt(b.call_with_receiver(
        b.name("sendMessage"),
        full_contact(&b),
        vec![b.string("phone")],
    )));
    statements.push(b.expr_stmt(b.call_with_receiver(
        b.name("sendMessage"),
        email_contact(&b),
        vec![b.string("phone")],
    )));

    let result = check(statements);
    assert_eq!(codes(&result), vec![2684]);
    assert!(result.diagnostics.diagnostics()[0].message_text.starts_with(
        "The 'this' context of type '{ name: string; email: string; }'"
    ));
}

#[test]
fn test_method_call_binds_object_receiver() {
    let b = AstBuilder::new();
    let mut statements = contact_interfaces(&b);
    statements.push(send_message(&b));
    statements.push(b.const_decl(
        "person",
        None,
        Some(b.object(vec![
            ("name", b.string("Gus")),
            ("phone", b.number(4.0)),
            ("email", b.string("gus@example.com")),
            ("send", b.name("sendMessage")),
        ])),
    ));
    statements.push(b.expr_stmt(b.call(b.member(b.name("person"), "send"), vec![b.string("email")])));

    let result = check(statements);
    assert!(result.diagnostics.is_empty(), "{}", result.diagnostics.render());
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_function_value_parameters_are_contravariant() {
    let b = AstBuilder::new();
    let callback = || b.function_type(b.signature(vec![b.param("x", b.string_type())], b.void_type()));
    let result = check(vec![
        b.const_decl(
            "wide",
            Some(callback()),
            Some(b.function_expr(b.signature(Vec::new(), b.void_type()))),
        ),
        b.const_decl(
            "narrow",
            Some(callback()),
            Some(b.function_expr(b.signature(
                vec![b.param("x", b.string_literal_type("a"))],
                b.void_type(),
            ))),
        ),
    ]);
    assert_eq!(codes(&result), vec![2322]);
}

#[test]
fn test_bivariant_option_accepts_narrower_parameter() {
    let b = AstBuilder::new();
    let program = Program::new(vec![b.const_decl(
        "narrow",
        Some(b.function_type(b.signature(vec![b.param("x", b.string_type())], b.void_type()))),
        Some(b.function_expr(b.signature(
            vec![b.param("x", b.string_literal_type("a"))],
            b.void_type(),
        ))),
    )]);
    let options = tyshape_options::parse_options(r#"{ "strictFunctionTypes": false }"#).unwrap();
    let result = check_program(&program, &options);
    assert!(result.diagnostics.is_empty());
}

// ============================================================================
// Recovery and determinism
// ============================================================================

#[test]
fn test_independent_errors_are_all_reported() {
    let b = AstBuilder::new();
    let mut statements = num_val_aliases(&b, true);
    statements.push(b.const_decl("a", Some(b.type_ref("Missing")), None));
    statements.push(b.const_decl("s", Some(b.string_type()), Some(b.number(1.0))));
    statements.push(b.expr_stmt(b.member(b.name("s"), "nope")));
    statements.push(b.const_decl("s", None, Some(b.number(1.0))));

    let result = check(statements);
    assert_eq!(
        result.diagnostics.kinds(),
        vec![
            DiagnosticKind::CircularAlias,
            DiagnosticKind::UnresolvedReference,
            DiagnosticKind::TypeMismatch,
            DiagnosticKind::TypeMismatch,
            DiagnosticKind::DuplicateDeclaration,
        ]
    );
}

#[test]
fn test_repeated_passes_are_byte_identical() {
    let b = AstBuilder::new();
    let mut statements = contact_interfaces(&b);
    statements.extend(num_val_aliases(&b, true));
    statements.push(contact_people(&b));
    statements.push(send_message(&b));
    statements.push(b.expr_stmt(b.call(b.name("contactPeople"), vec![b.string("email"), phone_contact(&b)])));
    statements.push(b.expr_stmt(b.call(b.name("sendMessage"), vec![b.string("email")])));
    statements.push(b.const_decl("x", Some(b.type_ref("HasEmail")), Some(phone_contact(&b))));
    let program = Program::new(statements);

    let first = check_program(&program, &CheckerOptions::default());
    let second = check_program(&program, &CheckerOptions::default());
    assert!(!first.diagnostics.is_empty());
    assert_eq!(first.diagnostics.render(), second.diagnostics.render());
    assert_eq!(first.diagnostics.diagnostics(), second.diagnostics.diagnostics());
    assert_eq!(first.expression_types, second.expression_types);
}
