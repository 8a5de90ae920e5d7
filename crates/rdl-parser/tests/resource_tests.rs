use rdl_parser::{
    parse_path_template, HttpMethod, Number, ParseError, ParseOptions, Resource, Session, Value,
};

const TYPES: &str = "type Item Struct { String id; }\ntype Items Struct { Array<Item> items; }\n";

fn parse_resource(resource: &str) -> Resource {
    let source = format!("{}{}", TYPES, resource);
    let mut schema = Session::new(ParseOptions::default())
        .parse_source("test.rdl", &source)
        .unwrap();
    assert_eq!(schema.resources.len(), 1);
    schema.resources.remove(0)
}

fn parse_err(resource: &str) -> ParseError {
    let source = format!("{}{}", TYPES, resource);
    Session::new(ParseOptions::default())
        .parse_source("test.rdl", &source)
        .unwrap_err()
}

// ============================================================================
// Path templates
// ============================================================================

#[test]
fn test_path_template_inputs() {
    let r = parse_resource(
        "resource Items GET \"/users/{id}/items?active&sort={sortField}\" {\n\
             String id;\n\
             Bool active;\n\
             String sortField (optional, default=\"name\");\n\
         }",
    );
    assert_eq!(r.method, HttpMethod::Get);
    assert_eq!(r.path, "/users/{id}/items");
    assert_eq!(r.inputs.len(), 3);

    let id = r.input("id").unwrap();
    assert!(id.path_param);
    assert_eq!(id.input_type, "String");

    let active = r.input("active").unwrap();
    assert_eq!(active.query_param.as_deref(), Some("active"));
    assert!(active.flag);
    assert_eq!(active.input_type, "Bool");

    let sort = r.input("sortField").unwrap();
    assert_eq!(sort.query_param.as_deref(), Some("sort"));
    assert!(!sort.flag);
    assert!(sort.optional);
    assert_eq!(sort.default, Some(Value::String("name".into())));
}

#[test]
fn test_path_template_standalone() {
    let t = parse_path_template("/users/{id}/items?active&sort={sortField}").unwrap();
    let names: Vec<_> = t.inputs.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["id", "active", "sortField"]);
}

#[test]
fn test_path_pattern_placeholder() {
    let r = parse_resource("resource Item GET \"/items/{id:[a-z]{4}}\" {\n    String id;\n}");
    assert_eq!(r.inputs[0].pattern.as_deref(), Some("[a-z]{4}"));
}

#[test]
fn test_bad_path_template() {
    let err = parse_err("resource Item GET \"/items/{id\" {}");
    assert!(err.message().starts_with("bad path template syntax"));
}

#[test]
fn test_bound_input_needs_a_type() {
    assert_eq!(
        parse_err("resource Item GET \"/items/{id}\" {}").message(),
        "Resource input 'id' has no corresponding type declaration"
    );
}

// ============================================================================
// Request bodies
// ============================================================================

#[test]
fn test_put_requires_exactly_one_body() {
    assert_eq!(
        parse_err("resource Item PUT \"/items/{id}\" {\n    String id;\n}").message(),
        "PUT on a resource with no corresponding input parameter"
    );

    let r = parse_resource("resource Item PUT \"/items/{id}\" {\n    String id;\n    Item item;\n}");
    assert_eq!(r.inputs.iter().filter(|i| i.is_body()).count(), 1);

    assert_eq!(
        parse_err("resource Item PUT \"/items/{id}\" {\n    String id;\n    Item a;\n    Item b;\n}")
            .message(),
        "PUT on a resource with too many corresponding input parameters"
    );
}

#[test]
fn test_headers_and_context_are_not_bodies() {
    let mut session = Session::new(ParseOptions::default());
    let schema = session
        .parse_source(
            "test.rdl",
            &format!(
                "{}resource Item POST \"/items\" {{\n    Item item;\n    String etag (header=\"If-Match\");\n    String user (context=\"principal\");\n}}",
                TYPES
            ),
        )
        .unwrap();
    let r = &schema.resources[0];
    assert_eq!(r.input("etag").unwrap().header.as_deref(), Some("If-Match"));
    assert_eq!(r.input("user").unwrap().context.as_deref(), Some("principal"));

    let warnings = session.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].message(),
        "Deprecated resource param option: 'context=...'."
    );
}

#[test]
fn test_get_needs_no_body() {
    let r = parse_resource("resource Items GET \"/items\" {}");
    assert!(r.inputs.is_empty());
    assert_eq!(r.expected, "OK");
}

// ============================================================================
// Parameters and outputs
// ============================================================================

#[test]
fn test_output_headers() {
    let r = parse_resource(
        "resource Item POST \"/items\" {\n    Item item;\n    String location (header=\"Location\", out); // where it went\n}",
    );
    assert_eq!(r.inputs.len(), 1);
    assert_eq!(r.outputs.len(), 1);
    let out = &r.outputs[0];
    assert_eq!(out.name, "location");
    assert_eq!(out.output_type, "String");
    assert_eq!(out.header.as_deref(), Some("Location"));
    assert_eq!(out.comment.as_deref(), Some("where it went"));
}

#[test]
fn test_bound_inputs_cannot_be_outputs_or_headers() {
    assert_eq!(
        parse_err("resource Item GET \"/items/{id}\" {\n    String id (out);\n}").message(),
        "Cannot make a path or queryparam an output"
    );
    assert_eq!(
        parse_err("resource Item GET \"/items?q={q}\" {\n    String q (header=\"X-Q\");\n}").message(),
        "Cannot make a path or queryparam a header param"
    );
}

#[test]
fn test_param_options() {
    let r = parse_resource(
        "resource Items GET \"/items?limit={limit}\" {\n    Int32 limit (default=10, x_max=\"100\");\n}",
    );
    let limit = r.input("limit").unwrap();
    assert_eq!(limit.default, Some(Value::Number(Number::Int64(10))));
    assert_eq!(limit.annotations.get("x_max").map(String::as_str), Some("100"));

    assert_eq!(
        parse_err("resource Items GET \"/items\" {\n    String q (bogus);\n}").message(),
        "Unsupported resource parameter option: bogus"
    );
}

#[test]
fn test_param_errors() {
    assert_eq!(
        parse_err("resource Items GET \"/items\" {\n    Nope q;\n}").message(),
        "Undefined type: Nope"
    );
    assert_eq!(
        parse_err("resource Items GET \"/items\" {\n    Array<String> q;\n}").message(),
        "parameterized resource parameters are not supported"
    );
}

// ============================================================================
// Resource clauses
// ============================================================================

#[test]
fn test_authorization() {
    let r = parse_resource(
        "resource Item GET \"/items\" {\n    authorize(\"read\", \"item\", \"tenant\");\n}",
    );
    let auth = r.auth.unwrap();
    assert!(!auth.authenticate);
    assert_eq!(auth.action.as_deref(), Some("read"));
    assert_eq!(auth.resource.as_deref(), Some("item"));
    assert_eq!(auth.domain.as_deref(), Some("tenant"));

    let r = parse_resource("resource Item GET \"/items\" {\n    authenticate;\n}");
    assert!(r.auth.unwrap().authenticate);

    assert_eq!(
        parse_err("resource Item GET \"/items\" {\n    authenticate;\n    authorize(\"read\", \"item\");\n}")
            .message(),
        "Cannot specify more than one authorization permission per resource"
    );
    assert_eq!(
        parse_err("resource Item GET \"/items\" {\n    authorize(\"a\", \"b\", \"c\", \"d\");\n}").message(),
        "too many options for the authorize statement"
    );
}

#[test]
fn test_expected_and_exceptions() {
    let r = parse_resource(
        "resource Item DELETE \"/items/{id}\" {\n\
             String id;\n\
             expected NO_CONTENT, OK;\n\
             exceptions {\n\
                 // not there\n\
                 ResourceError NOT_FOUND;\n\
                 Item CONFLICT; // already gone\n\
             }\n\
         }",
    );
    assert_eq!(r.method, HttpMethod::Delete);
    assert_eq!(r.expected, "NO_CONTENT");
    assert_eq!(r.alternatives, vec!["OK"]);

    let not_found = &r.exceptions["NOT_FOUND"];
    assert_eq!(not_found.exception_type, "ResourceError");
    assert_eq!(not_found.comment.as_deref(), Some("not there"));
    let conflict = &r.exceptions["CONFLICT"];
    assert_eq!(conflict.exception_type, "Item");
    assert_eq!(conflict.comment.as_deref(), Some("already gone"));

    assert_eq!(
        parse_err("resource Item GET \"/items\" {\n    exceptions {\n        Nope BAD;\n    }\n}").message(),
        "No such type: Nope"
    );
}

#[test]
fn test_resource_options() {
    let r = parse_resource("resource Item get \"/items\" (async, x_owner=\"team\") {}");
    assert_eq!(r.method, HttpMethod::Get);
    assert!(r.is_async);
    assert_eq!(r.annotations.get("x_owner").map(String::as_str), Some("team"));

    let r = parse_resource("resource Item GET \"/items\" {\n    async;\n}");
    assert!(r.is_async);

    assert_eq!(
        parse_err("resource Item GET \"/items\" (cached) {}").message(),
        "Unsupported resource option: cached"
    );
}

#[test]
fn test_resource_comments() {
    let source = format!("{}// Fetch one item.\nresource Item GET \"/items\" {{}}", TYPES);
    let schema = Session::new(ParseOptions::default())
        .parse_source("test.rdl", &source)
        .unwrap();
    assert_eq!(schema.resources[0].comment.as_deref(), Some("Fetch one item."));
}

#[test]
fn test_resource_errors() {
    assert_eq!(
        parse_err("resource Nope GET \"/x\" {}").message(),
        "Type not found: Nope"
    );
    assert_eq!(
        parse_err("resource Item FETCH \"/x\" {}").message(),
        "Bad HTTP method in resource: FETCH"
    );
    assert_eq!(
        parse_err("resource Item GET \"/x\" {\n    responses {}\n}").message(),
        "resource 'responses' no longer supported"
    );
    assert_eq!(
        parse_err("resource Item GET \"/x\" {\n    String q;\n").message(),
        "Unterminated resource definition"
    );
}
