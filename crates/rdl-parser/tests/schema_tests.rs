use rdl_parser::{
    parse_file, HttpMethod, ParseError, ParseErrorKind, ParseOptions, Schema, Session, Type, Value,
};
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn parse(source: &str) -> Schema {
    Session::new(ParseOptions::default())
        .parse_source("test.rdl", source)
        .unwrap()
}

fn parse_err(source: &str) -> ParseError {
    Session::new(ParseOptions::default())
        .parse_source("test.rdl", source)
        .unwrap_err()
}

// ============================================================================
// Schema header
// ============================================================================

#[test]
fn test_minimal_schema() {
    let schema = parse("name X; version 1; type Foo String;");
    assert_eq!(schema.name.as_deref(), Some("X"));
    assert_eq!(schema.version, Some(1));
    assert_eq!(schema.types.len(), 1);

    let Type::String(foo) = &schema.types[0] else {
        panic!("expected a string type, got {:?}", schema.types[0]);
    };
    assert_eq!(foo.def.name, "Foo");
    assert_eq!(foo.def.supertype, "String");
    assert!(foo.pattern.is_none());
}

#[test]
fn test_statements_end_at_newlines() {
    let schema = parse("namespace com.example.api\nname api\nversion 7\ntype Foo Int32\n");
    assert_eq!(schema.namespace.as_deref(), Some("com.example.api"));
    assert_eq!(schema.name.as_deref(), Some("api"));
    assert_eq!(schema.version, Some(7));
    assert_eq!(schema.type_names(), vec!["Foo"]);
}

#[test]
fn test_namespace_with_digits() {
    let schema = parse("namespace com.example.v1;");
    assert_eq!(schema.namespace.as_deref(), Some("com.example.v1"));
}

#[test]
fn test_duplicate_header_declarations() {
    let err = parse_err("name A;\nname B;");
    assert_eq!(err.kind(), ParseErrorKind::Semantic);
    assert_eq!(err.message(), "duplicate name declaration");
    assert_eq!(err.line(), 2);

    assert_eq!(
        parse_err("namespace a.b;\nnamespace c.d;").message(),
        "duplicate namespace declaration"
    );
    assert_eq!(
        parse_err("version 1;\nversion 2;").message(),
        "duplicate version declaration"
    );
}

#[test]
fn test_version_must_be_an_integer() {
    let err = parse_err("version \"one\";");
    assert_eq!(err.kind(), ParseErrorKind::Syntax);
    assert!(err.message().starts_with("expected integer value"));
}

// ============================================================================
// Comments
// ============================================================================

#[test]
fn test_leading_comments_attach_to_next_declaration() {
    let schema = parse(
        "// The API.\nname api;\n\n// Leading comment\n// continues\ntype Foo String; // trailing\n",
    );
    assert_eq!(schema.comment.as_deref(), Some("The API."));
    assert_eq!(
        schema.types[0].comment(),
        Some("Leading comment continues trailing")
    );
}

#[test]
fn test_block_comments_are_discarded() {
    let schema = parse("/* not\n a doc comment */\ntype Foo Int32;");
    assert_eq!(schema.types[0].comment(), None);
}

// ============================================================================
// Errors and warnings
// ============================================================================

#[test]
fn test_unrecognized_keyword() {
    let err = parse_err("name X;\nbogus Foo;");
    assert_eq!(err.kind(), ParseErrorKind::Syntax);
    assert_eq!(err.message(), "Unrecognized keyword in schema: 'bogus'");
    assert_eq!(err.line(), 2);
    assert_eq!(
        err.to_string(),
        "Error(test.rdl:2): Unrecognized keyword in schema: 'bogus'"
    );
}

#[test]
fn test_unexpected_token() {
    assert_eq!(parse_err("{").message(), "unexpected token '{'");
}

#[test]
fn test_lexical_errors_are_syntax_errors() {
    let err = parse_err("name X;\ntype Foo String (pattern=\"abc);");
    assert_eq!(err.kind(), ParseErrorKind::Syntax);
    assert_eq!(err.line(), 2);
}

#[test]
fn test_stray_semicolon_warns() {
    let mut session = Session::new(ParseOptions::default());
    session.parse_source("test.rdl", "name X;;").unwrap();
    let warnings = session.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].to_string(), "Warning(test.rdl:1): stray ';' character");
}

#[test]
fn test_verbose_rendering_shows_source_window() {
    let err = parse_err("name X;\nbogus;\nversion 1;");
    let rendered = err.diagnostic().render(true);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(
        lines[0],
        "Error (test.rdl, line 2): Unrecognized keyword in schema: 'bogus'"
    );
    assert_eq!(&lines[1..], &["  1\tname X;", "  2\tbogus;", "  3\tversion 1;"]);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let err = Session::new(ParseOptions::default())
        .parse_file(fixtures_dir().join("no_such_file.rdl"))
        .unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Io);
}

// ============================================================================
// Whole files
// ============================================================================

#[test]
fn test_contacts_fixture() {
    let schema = parse_file(fixtures_dir().join("contacts.rdl"), false, false, true).unwrap();
    assert_eq!(schema.namespace.as_deref(), Some("com.example.contacts"));
    assert_eq!(schema.name.as_deref(), Some("contacts"));
    assert_eq!(schema.version, Some(2));
    assert_eq!(schema.comment.as_deref(), Some("Contacts service."));
    assert_eq!(
        schema.type_names(),
        vec!["Name", "Age", "Kind", "Contact", "Contacts"]
    );
    assert_eq!(schema.types[0].comment(), Some("A short display name."));

    let Some(Type::Struct(contact)) = schema.find_type("Contact") else {
        panic!("Contact should be a struct");
    };
    assert_eq!(contact.fields.len(), 4);
    assert!(contact.fields[1].optional);
    assert_eq!(contact.fields[2].default, Some(Value::Symbol("PERSON".into())));
    assert_eq!(contact.fields[3].items.as_deref(), Some("String"));

    assert_eq!(schema.resources.len(), 3);
    let put = &schema.resources[2];
    assert_eq!(put.method, HttpMethod::Put);
    assert_eq!(put.expected, "OK");
    assert_eq!(put.alternatives, vec!["CREATED"]);
    assert!(put.exceptions.contains_key("NOT_FOUND"));
}

#[test]
fn test_schema_json() {
    let schema = parse("name X;\ntype Name String (maxsize=64);");
    let json = serde_json::to_value(&schema).unwrap();
    assert_eq!(json["name"], "X");
    assert_eq!(
        json["types"][0],
        serde_json::json!({"kind": "String", "name": "Name", "type": "String", "maxSize": 64})
    );
    assert!(json.get("resources").is_none());

    let back: Schema = serde_json::from_value(json).unwrap();
    assert_eq!(back, schema);
}
