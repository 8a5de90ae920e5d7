use rdl_parser::{ParseErrorKind, ParseOptions, Session, Type};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

fn session() -> Session {
    Session::new(ParseOptions::default())
}

// ============================================================================
// include
// ============================================================================

#[test]
fn test_include_is_idempotent() {
    let schema = session()
        .parse_file(fixtures_dir().join("include/main.rdl"))
        .unwrap();
    assert_eq!(schema.type_names(), vec!["Id", "Deeper", "Leaf", "Ref"]);
    assert_eq!(schema.resources.len(), 1);
    assert_eq!(schema.find_type("Id").and_then(Type::comment), Some("Shared identifiers."));
}

#[test]
fn test_include_resolves_relative_to_including_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a/b/inner.rdl", "type Inner Int32;");
    write(dir.path(), "a/outer.rdl", "include \"b/inner.rdl\";\ntype Outer Inner;");
    let main = write(dir.path(), "main.rdl", "include \"a/outer.rdl\";\ntype Top Outer;");

    let schema = session().parse_file(&main).unwrap();
    assert_eq!(schema.type_names(), vec!["Inner", "Outer", "Top"]);
}

#[test]
fn test_included_types_are_visible_to_later_includes() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.rdl", "type Id String;");
    write(dir.path(), "user.rdl", "type User Struct { Id id; }");
    let main = write(dir.path(), "main.rdl", "include \"base.rdl\";\ninclude \"user.rdl\";");

    let schema = session().parse_file(&main).unwrap();
    assert_eq!(schema.type_names(), vec!["Id", "User"]);
}

#[test]
fn test_circular_include() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.rdl", "include \"b.rdl\";\ntype A Int32;");
    write(dir.path(), "b.rdl", "include \"a.rdl\";\ntype B Int32;");

    let err = session().parse_file(&a).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Semantic);
    assert!(err.message().starts_with("circular include of"));
    assert!(err.file().ends_with("b.rdl"));
}

#[test]
fn test_missing_include() {
    let dir = TempDir::new().unwrap();
    let main = write(dir.path(), "main.rdl", "name main;\ninclude \"missing.rdl\";");

    let err = session().parse_file(&main).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Io);
    assert!(err.message().starts_with("cannot read"));
    assert_eq!(err.line(), 2);
}

#[test]
fn test_errors_in_included_files_report_that_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bad.rdl", "type Ok Int32;\ntype Bad Nope;");
    let main = write(dir.path(), "main.rdl", "include \"bad.rdl\";");

    let err = session().parse_file(&main).unwrap_err();
    assert_eq!(err.to_string(), "Error(bad.rdl:2): Cannot derive from this type: Nope");
}

// ============================================================================
// use
// ============================================================================

#[test]
fn test_use_prefixes_types() {
    let schema = session()
        .parse_file(fixtures_dir().join("use/main.rdl"))
        .unwrap();
    assert_eq!(schema.type_names(), vec!["Other.Bar", "Holder"]);

    let Some(Type::Struct(bar)) = schema.find_type("Other.Bar") else {
        panic!("Other.Bar should be a struct");
    };
    assert_eq!(bar.def.supertype, "Struct");
    assert_eq!(bar.fields[0].field_type, "Array");
    assert_eq!(bar.fields[0].items.as_deref(), Some("Other.Bar"));

    let Some(Type::Struct(holder)) = schema.find_type("Holder") else {
        panic!("Holder should be a struct");
    };
    assert_eq!(holder.fields[0].field_type, "Other.Bar");
}

#[test]
fn test_use_drops_resources() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "svc.rdl",
        "name svc;\ntype Id String;\nresource Id GET \"/id\" {}",
    );
    let main = write(dir.path(), "main.rdl", "use \"svc.rdl\";\nuse \"svc.rdl\";");

    let schema = session().parse_file(&main).unwrap();
    assert_eq!(schema.type_names(), vec!["svc.Id"]);
    assert!(schema.resources.is_empty());
}

#[test]
fn test_use_requires_a_schema_name() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "anon.rdl", "type Id String;");
    let main = write(dir.path(), "main.rdl", "use \"anon.rdl\";");

    let err = session().parse_file(&main).unwrap_err();
    assert_eq!(err.message(), "used schema 'anon.rdl' does not declare a name");
}

#[test]
fn test_use_builtin_rdl() {
    let mut session = session();
    let schema = session
        .parse_source("main.rdl", "use \"rdl\";\ntype Field rdl.StructFieldDef;")
        .unwrap();
    assert!(session.warnings().is_empty());

    let Some(Type::Struct(struct_def)) = schema.find_type("rdl.StructTypeDef") else {
        panic!("rdl.StructTypeDef should be a struct");
    };
    assert_eq!(struct_def.def.supertype, "rdl.TypeDef");
    assert_eq!(struct_def.fields[0].items.as_deref(), Some("rdl.StructFieldDef"));

    let Some(Type::Alias(field)) = schema.find_type("Field") else {
        panic!("Field should be an alias");
    };
    assert_eq!(field.def.supertype, "rdl.StructFieldDef");
    assert!(schema.find_type("TypeDef").is_none());
}
