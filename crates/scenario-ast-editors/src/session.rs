//! Editing one node in isolation from the rest of the tree.

use scenario_ast::{AstNode, Path};
use scenario_ast_store::{NodeStore, ValidationOutcome};
use tracing::debug;

use crate::editor::{EditorContext, NodeEditor};
use crate::error::EditorError;

/// A sub-editor running over a scoped child store.
///
/// The child store holds a detached copy of the node at `path`; validations
/// run there and never touch the parent. Nothing reaches the parent until
/// [`save`](Self::save).
#[derive(Debug)]
pub struct EditorSession {
    parent: NodeStore,
    path: Path,
    store: NodeStore,
    ctx: EditorContext,
    editor: NodeEditor,
}

impl EditorSession {
    pub fn open(parent: &NodeStore, path: &Path, ctx: EditorContext) -> Result<Self, EditorError> {
        let store = parent
            .scoped(path)
            .ok_or_else(|| EditorError::StalePath(path.to_string()))?;
        let editor = NodeEditor::adapt(&store.root(), &store.evaluation(), &ctx)?;
        debug!(%path, kind = ?editor.kind(), "editor session opened");
        Ok(Self {
            parent: parent.clone(),
            path: path.clone(),
            store,
            ctx,
            editor,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }

    pub fn editor(&self) -> &NodeEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut NodeEditor {
        &mut self.editor
    }

    /// The child store the session validates against.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    fn sync_child(&self) -> AstNode {
        let node = self.editor.unadapt();
        self.store.set_node_at_path(&Path::root(), node.clone());
        node
    }

    /// Write the view model into the child store and validate it there.
    ///
    /// When the response is applied the view model is rebuilt from the child
    /// store, which refreshes every field's errors.
    pub async fn validate(&mut self) -> Result<ValidationOutcome, EditorError> {
        self.sync_child();
        let outcome = self.store.validate().await?;
        if let ValidationOutcome::Applied { .. } = outcome {
            self.editor = NodeEditor::adapt(&self.store.root(), &self.store.evaluation(), &self.ctx)?;
        }
        Ok(outcome)
    }

    /// Merge the edited node back into the parent store at the session path.
    pub fn save(&self) -> Result<AstNode, EditorError> {
        let node = self.sync_child();
        if !self.parent.merge_scoped(&self.path, &self.store) {
            return Err(EditorError::StalePath(self.path.to_string()));
        }
        debug!(path = %self.path, node = %node.id, "editor session saved");
        Ok(node)
    }
}
