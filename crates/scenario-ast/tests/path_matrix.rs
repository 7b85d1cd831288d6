use scenario_ast::builders::{self, names};
use scenario_ast::{
    get_at_path, get_at_path_mut, get_parent_path, parse_path, AstError, AstNode, Path,
    PathSegment,
};
use serde_json::json;

#[test]
fn path_parse_format_roundtrip_matrix() {
    let cases = [
        "root",
        "root.children.0",
        "root.children.0.children.0.children.1",
        "root.namedChildren.filters",
        "root.namedChildren.filters.children.12.namedChildren.value",
        "root.children.3.namedChildren._private9",
    ];

    for text in cases {
        let path = parse_path(text).expect("valid path");
        assert_eq!(path.to_string(), text);
        assert_eq!(parse_path(&path.to_string()).unwrap(), path);
    }
}

#[test]
fn path_built_from_segments_roundtrips() {
    let built = [
        Path::root(),
        Path::root().child(0),
        Path::root().named_child("timestampField").child(7),
        Path::from_segments(vec![
            PathSegment::Child(2),
            PathSegment::NamedChild("divider".into()),
            PathSegment::Child(0),
        ]),
    ];

    for path in built {
        assert_eq!(parse_path(&path.to_string()).unwrap(), path);
        assert_eq!(path.to_string().parse::<Path>().unwrap(), path);
    }
}

#[test]
fn path_malformed_matrix() {
    let cases = [
        "",
        "Root",
        "root.",
        "root.children",
        "root.children.x",
        "root.children.-1",
        "root.children.1.5",
        "root.namedChildren.9lives",
        "root.namedChildren.with-dash",
        "root.items.0",
        "root.children.0.",
    ];

    for text in cases {
        let err = parse_path(text).expect_err(text);
        assert!(
            matches!(err, AstError::MalformedPath { ref input, .. } if input == text),
            "unexpected error for {text:?}: {err:?}"
        );
    }
}

#[test]
fn path_resolution_in_nested_rule() {
    let threshold = builders::constant(10).with_id("threshold");
    let root = AstNode::operator("Or").with_id("or").with_child(
        AstNode::operator("And").with_id("and").with_child(
            AstNode::operator(">")
                .with_id("gt")
                .with_child(builders::payload("amount"))
                .with_child(threshold),
        ),
    );

    let path = parse_path("root.children.0.children.0.children.1").unwrap();
    assert_eq!(get_at_path(&root, &path).unwrap().id, "threshold");
    assert_eq!(root.path_to("threshold"), Some(path.clone()));

    let (parent, segment) = get_parent_path(&path).unwrap();
    assert_eq!(get_at_path(&root, &parent).unwrap().id, "gt");
    assert_eq!(segment, PathSegment::Child(1));

    assert!(get_at_path(&root, &path.child(0)).is_none());
}

#[test]
fn path_mutable_resolution_through_named_children() {
    let mut root = builders::is_multiple_of(builders::payload("amount"), json!(5));
    let path = Path::root().named_child(names::DIVIDER);
    get_at_path_mut(&mut root, &path).unwrap().constant = Some(json!(7));
    assert_eq!(root.named(names::DIVIDER).unwrap().constant, Some(json!(7)));
    assert!(get_at_path_mut(&mut root, &Path::root().named_child("nope")).is_none());
}
