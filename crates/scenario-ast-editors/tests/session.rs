use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scenario_ast::builders::names::DURATION;
use scenario_ast::{builders, AstNode, Path};
use scenario_ast_editors::{
    DurationUnit, EditorContext, EditorError, EditorKind, EditorSession, NodeEditor,
};
use scenario_ast_store::{
    CancellationToken, EvaluationError, EvaluationRecord, NodeStore, ValidationOutcome,
    ValidationRequest, Validator, ValidatorError,
};
use serde_json::json;

/// Accepts only one-day durations and records every tree it was shown.
#[derive(Default)]
struct OneDayOnly {
    seen: Mutex<Vec<AstNode>>,
}

#[async_trait]
impl Validator for OneDayOnly {
    async fn validate(
        &self,
        request: ValidationRequest,
        _cancel: CancellationToken,
    ) -> Result<Vec<EvaluationRecord>, ValidatorError> {
        self.seen.lock().unwrap().push(request.node.clone());
        let node = request.node;
        let mut record = EvaluationRecord::new(node.id.clone(), vec![node.id.clone()]);
        let duration = node.named(DURATION).and_then(AstNode::constant_str);
        if duration != Some("P1D") {
            record = record.with_error(
                EvaluationError::new("DURATION_NOT_ALLOWED", "only one day is allowed")
                    .on_argument_name(DURATION),
            );
        }
        Ok(vec![record])
    }
}

fn parent_tree() -> AstNode {
    AstNode::operator(">")
        .with_id("cmp")
        .with_child(
            builders::time_add(builders::payload("created_at"), "+", "PT6H").with_id("shifted"),
        )
        .with_child(builders::payload("now"))
}

fn time_add_path() -> Path {
    Path::root().child(0)
}

#[tokio::test]
async fn session_edits_stay_detached_until_saved() {
    let validator = Arc::new(OneDayOnly::default());
    let parent = NodeStore::new(parent_tree(), validator.clone());
    let mut session =
        EditorSession::open(&parent, &time_add_path(), EditorContext::default()).unwrap();
    assert_eq!(session.editor().kind(), EditorKind::TimeAdd);

    let outcome = session.validate().await.unwrap();
    assert_eq!(outcome, ValidationOutcome::Applied { records: 1 });
    let NodeEditor::TimeAdd(editor) = session.editor_mut() else {
        panic!("expected a time arithmetic editor");
    };
    assert_eq!(editor.duration_errors[0].error, "DURATION_NOT_ALLOWED");

    editor.set_unit(DurationUnit::Days).unwrap();
    editor.set_amount(1).unwrap();
    assert!(editor.duration_errors.is_empty());

    session.validate().await.unwrap();
    assert!(!session.editor().has_errors());
    assert!(parent.evaluation().is_empty());

    // The validator only ever saw the detached subtree.
    let seen = validator.seen.lock().unwrap().clone();
    assert!(seen.iter().all(|node| node.id == "shifted"));

    let untouched = parent.get_node_at_path(&time_add_path()).unwrap();
    assert_eq!(untouched.named(DURATION).unwrap().constant, Some(json!("PT6H")));

    let saved = session.save().unwrap();
    assert_eq!(saved.id, "shifted");
    let merged = parent.get_node_at_path(&time_add_path()).unwrap();
    assert_eq!(merged.named(DURATION).unwrap().constant, Some(json!("P1D")));
    assert_eq!(parent.root().id, "cmp");
}

#[test]
fn open_rejects_missing_paths_and_plain_nodes() {
    let parent = NodeStore::new(parent_tree(), Arc::new(OneDayOnly::default()));
    let ctx = EditorContext::default();

    let missing = EditorSession::open(&parent, &Path::root().child(7), ctx.clone());
    assert!(matches!(missing, Err(EditorError::StalePath(_))));

    let plain = EditorSession::open(&parent, &Path::root().child(1), ctx);
    assert!(matches!(plain, Err(EditorError::UnsupportedShape { .. })));
}

#[test]
fn save_fails_when_parent_moved_on() {
    let parent = NodeStore::new(parent_tree(), Arc::new(OneDayOnly::default()));
    let session =
        EditorSession::open(&parent, &time_add_path(), EditorContext::default()).unwrap();

    parent.load(builders::constant(true), Vec::new());
    assert!(matches!(session.save(), Err(EditorError::StalePath(_))));
    assert_eq!(parent.root().constant, Some(json!(true)));
}
