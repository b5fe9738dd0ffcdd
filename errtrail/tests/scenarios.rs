//! End-to-end behaviour of error chains: creation, wrapping, matching,
//! unpacking and rendering together.

use errtrail::{cause, is, unpack, wrap, Error, ErrorKind, Format, ResultExt};
use serde_json::json;
use std::io;
use std::sync::LazyLock;
use std::thread;

static NOT_FOUND: LazyLock<Error> = LazyLock::new(|| Error::new_global("not found"));

#[inline(never)]
fn read_file(_name: &str) -> errtrail::Result<String> {
    Err(Error::new("unexpected EOF"))
}

#[inline(never)]
fn parse_file(name: &str) -> errtrail::Result<String> {
    read_file(name).wrap_err_with(|| format!("error reading file '{}'", name))
}

#[inline(never)]
fn find_user(id: u32) -> errtrail::Result<()> {
    Err(NOT_FOUND.clone()).wrap_err_with(|| format!("user {} missing", id))
}

#[inline(never)]
fn find_team(id: u32) -> errtrail::Result<()> {
    Err(NOT_FOUND.clone()).wrap_err_with(|| format!("team {} missing", id))
}

#[inline(never)]
fn load_config() -> errtrail::Result<String> {
    let res = read_file("config.json");
    res.wrap_err("loading config")
}

fn root_stack_of(err: &Error) -> errtrail::CapturedStack {
    err.root_cause().as_root().unwrap().stack().clone()
}

#[test]
fn test_local_error_end_to_end() {
    let err = parse_file("x.json").unwrap_err();

    assert_eq!(err.to_string(), "error reading file 'x.json': unexpected EOF");

    let unpacked = err.unpack();
    assert_eq!(unpacked.chain.len(), 1);
    assert_eq!(unpacked.chain[0].message, "error reading file 'x.json'");
    assert_eq!(unpacked.root.as_ref().unwrap().message, "unexpected EOF");
    assert!(unpacked.external.is_none());

    let tree = unpacked.to_structured_tree(&Format::new(false));
    assert_eq!(
        tree,
        json!({
            "root": { "message": "unexpected EOF" },
            "chain": [{ "message": "error reading file 'x.json'" }]
        })
    );
}

#[test]
fn test_external_error_end_to_end() {
    let err = Error::from(io::Error::new(io::ErrorKind::UnexpectedEof, "unexpected EOF"));
    let unpacked = err.unpack();

    assert_eq!(unpacked.external.as_deref(), Some("unexpected EOF"));
    assert!(unpacked.root.is_none());
    assert!(unpacked.chain.is_empty());

    let tree = unpacked.to_structured_tree(&Format::new(false));
    assert_eq!(tree, json!({ "external error": "unexpected EOF" }));
    assert_eq!(
        serde_json::to_string(&tree).unwrap(),
        r#"{"external error":"unexpected EOF"}"#
    );
}

#[test]
fn test_tree_omits_empty_keys() {
    let tree = Error::new("x").unpack().to_structured_tree(&Format::new(true));
    let object = tree.as_object().unwrap();
    assert!(object.contains_key("root"));
    assert!(!object.contains_key("chain"));
    assert!(!object.contains_key("external error"));
    assert!(tree["root"]["stack"].as_array().is_some_and(|s| !s.is_empty()));
}

#[test]
fn test_absent_errors() {
    assert!(wrap(None, "context").is_none());
    assert!(cause(None).is_none());
    assert!(unpack(None).is_empty());
    assert!(is(None, None));
}

#[test]
fn test_cause_of_nested_wraps() {
    let root = Error::new("x");
    let err = root.clone().wrap("a").wrap("b");

    let found = err.root_cause();
    assert!(found.ptr_eq(&root));
    assert_eq!(found.message(), "x");
    assert!(cause(Some(&err)).unwrap().ptr_eq(&root));
}

#[test]
fn test_local_root_stack_unchanged_by_wrap() {
    let root = Error::new("x");
    let before = root_stack_of(&root);

    let err = root.clone().wrap("a");
    assert!(err.source().unwrap().ptr_eq(&root));
    assert_eq!(root_stack_of(&err), before);
    assert_eq!(root_stack_of(&root), before);
}

#[test]
fn test_global_error_reports_latest_wrap_site() {
    let user = find_user(1).unwrap_err();
    let team = find_team(2).unwrap_err();

    assert_ne!(root_stack_of(&user), root_stack_of(&team));
    assert_ne!(root_stack_of(&user), root_stack_of(&NOT_FOUND));

    assert!(user.is(&NOT_FOUND));
    assert!(team.is(&NOT_FOUND));
    assert_eq!(user.to_string(), "user 1 missing: not found");

    let user_trace = user.unpack().root.unwrap().stack;
    assert!(user_trace.iter().any(|f| f.name.contains("find_user")));
}

#[test]
fn test_global_error_wrapped_across_threads() {
    let errors: Vec<Error> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| scope.spawn(move || NOT_FOUND.clone().wrap(format!("worker {}", i))))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for err in &errors {
        assert!(err.is(&NOT_FOUND));
        assert_eq!(err.root_cause().message(), "not found");
    }
    assert!(NOT_FOUND.as_root().unwrap().is_global());
}

#[test]
fn test_wrapped_io_error_keeps_type() {
    let err = std::fs::read_to_string("/definitely/not/here.json")
        .wrap_err("error reading file 'here.json'")
        .wrap_err("loading settings")
        .unwrap_err();

    assert_eq!(err.chain().count(), 3);
    assert_eq!(err.root_cause().kind(), ErrorKind::Root);
    assert_eq!(
        err.downcast_ref::<io::Error>().unwrap().kind(),
        io::ErrorKind::NotFound
    );

    let unpacked = err.unpack();
    let messages: Vec<_> = unpacked.chain.iter().map(|l| l.message.as_str()).collect();
    assert_eq!(messages, vec!["loading settings", "error reading file 'here.json'"]);
}

#[test]
fn test_trace_output_lists_every_wrap_frame() {
    let err = parse_file("x.json").wrap_err("startup").unwrap_err();
    let unpacked = err.unpack();
    let root = unpacked.root.as_ref().unwrap();

    for link in &unpacked.chain {
        assert!(root.stack.contains(&link.frame));
    }

    let text = unpacked.to_plain_text(&Format::new(true));
    assert!(text.starts_with("startup\n\t"));
    assert!(text.contains("\nerror reading file 'x.json'\n\t"));
    assert!(text.contains("\nunexpected EOF\n\t"));
    assert!(!text.ends_with('\n'));
}

#[test]
fn test_wrap_frame_merged_before_its_caller() {
    let err = load_config().unwrap_err();
    let site = err.as_wrap().unwrap().site().resolve();
    assert_eq!(site.len(), 2);

    let unpacked = err.unpack();
    let stack = unpacked.root.unwrap().stack;
    let original = root_stack_of(&err).resolve();
    assert_eq!(stack.len(), original.len() + 1);

    let at = stack
        .iter()
        .position(|f| *f == unpacked.chain[0].frame)
        .unwrap();
    assert_eq!(stack.frames()[at + 1], site.frames()[1]);
    // the root's own frame in the same function stays right above it
    assert_eq!(stack.frames()[at - 1].name, stack.frames()[at].name);
    assert!(stack.frames()[at].name.contains("load_config"));
}

#[test]
fn test_unpack_is_repeatable() {
    let err = parse_file("x.json").wrap_err("startup").unwrap_err();
    let first = err.unpack();
    for _ in 0..3 {
        assert_eq!(err.unpack(), first);
    }
}

#[test]
fn test_unpacked_error_serializes() {
    let err = parse_file("x.json").unwrap_err();
    let value = serde_json::to_value(err.unpack()).unwrap();

    assert_eq!(value["root"]["message"], "unexpected EOF");
    assert_eq!(value["chain"][0]["message"], "error reading file 'x.json'");
    assert!(value.get("external").is_none());

    let back: errtrail::UnpackedError = serde_json::from_value(value).unwrap();
    assert_eq!(back, err.unpack());
}
