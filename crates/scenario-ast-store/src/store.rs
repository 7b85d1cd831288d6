//! The node store: one tree, one evaluation list, one clipboard slot.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use scenario_ast::{
    get_at_path, get_at_path_mut, get_parent_path, parse_path, AstNode, Path, PathSegment,
};
use tracing::{debug, trace, warn};

use crate::cancel::CancellationToken;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::evaluation::EvaluationRecord;
use crate::events::StoreEvent;
use crate::persist::PersistedState;
use crate::validator::{ValidationRequest, Validator, ValidatorError};

/// Read-only snapshot of a store for presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStoreState {
    pub root: AstNode,
    pub evaluation: Vec<EvaluationRecord>,
    pub clipboard: Option<AstNode>,
    pub validating: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The response replaced the evaluation list.
    Applied { records: usize },
    /// The call was superseded or cancelled; state is unchanged.
    Cancelled,
}

type Listener = Box<dyn FnMut(&StoreEvent) + Send>;

struct StoreState {
    root: AstNode,
    evaluation: Vec<EvaluationRecord>,
    clipboard: Option<AstNode>,
    in_flight: Option<CancellationToken>,
}

/// Retires a validation whose future is dropped before the response arrives.
///
/// While armed, dropping the guard cancels its token and, if the token is
/// still the store's current one, returns the store to idle.
struct InFlightGuard<'a> {
    store: &'a NodeStore,
    token: CancellationToken,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.token.cancel();
        let was_current = {
            let mut state = self.store.lock_state();
            let is_current = state
                .in_flight
                .as_ref()
                .is_some_and(|current| current.same_as(&self.token));
            if is_current {
                state.in_flight = None;
            }
            is_current
        };
        if was_current {
            debug!(store = %self.store.inner.config.label, "validation abandoned by caller");
            self.store.emit(StoreEvent::ValidationDiscarded);
        }
    }
}

struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, Listener>,
}

struct StoreInner {
    config: StoreConfig,
    validator: Arc<dyn Validator>,
    state: Mutex<StoreState>,
    listeners: Mutex<Listeners>,
}

/// Owns an expression tree during an edit session.
///
/// `NodeStore` is a handle: clones share the same tree. Mutations are
/// synchronous; only [`validate`](Self::validate) awaits, and at most one
/// validation per store is live at a time. Listeners are invoked after each
/// change and must not call back into the store synchronously.
#[derive(Clone)]
pub struct NodeStore {
    inner: Arc<StoreInner>,
}

impl fmt::Debug for NodeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeStore")
            .field("label", &self.inner.config.label)
            .finish_non_exhaustive()
    }
}

impl NodeStore {
    pub fn new(root: AstNode, validator: Arc<dyn Validator>) -> Self {
        Self::with_config(root, validator, StoreConfig::default())
    }

    pub fn with_config(root: AstNode, validator: Arc<dyn Validator>, config: StoreConfig) -> Self {
        Self::from_parts(root, Vec::new(), validator, config)
    }

    pub fn from_persisted(
        persisted: PersistedState,
        validator: Arc<dyn Validator>,
        config: StoreConfig,
    ) -> Self {
        Self::from_parts(persisted.root, persisted.evaluation, validator, config)
    }

    fn from_parts(
        root: AstNode,
        evaluation: Vec<EvaluationRecord>,
        validator: Arc<dyn Validator>,
        config: StoreConfig,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                config,
                validator,
                state: Mutex::new(StoreState {
                    root,
                    evaluation,
                    clipboard: None,
                    in_flight: None,
                }),
                listeners: Mutex::new(Listeners {
                    next_id: 1,
                    entries: BTreeMap::new(),
                }),
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: StoreEvent) {
        let mut listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.entries.values_mut() {
            listener(&event);
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn on_change<F>(&self, listener: F) -> u64
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        let mut listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = listeners.next_id;
        listeners.next_id = listeners.next_id.saturating_add(1);
        listeners.entries.insert(id, Box::new(listener));
        id
    }

    pub fn off_change(&self, listener_id: u64) -> bool {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .remove(&listener_id)
            .is_some()
    }

    pub fn state(&self) -> NodeStoreState {
        let state = self.lock_state();
        NodeStoreState {
            root: state.root.clone(),
            evaluation: state.evaluation.clone(),
            clipboard: state.clipboard.clone(),
            validating: state.in_flight.is_some(),
        }
    }

    pub fn root(&self) -> AstNode {
        self.lock_state().root.clone()
    }

    pub fn evaluation(&self) -> Vec<EvaluationRecord> {
        self.lock_state().evaluation.clone()
    }

    pub fn clipboard(&self) -> Option<AstNode> {
        self.lock_state().clipboard.clone()
    }

    pub fn is_validating(&self) -> bool {
        self.lock_state().in_flight.is_some()
    }

    pub fn get_node_at_path(&self, path: &Path) -> Option<AstNode> {
        get_at_path(&self.lock_state().root, path).cloned()
    }

    /// Write `node` at `path`.
    ///
    /// An empty path replaces the root. Returns `false` without touching the
    /// tree when the parent no longer resolves or the child index is out of
    /// range: the edit came from a view that is already obsolete.
    pub fn set_node_at_path(&self, path: &Path, node: AstNode) -> bool {
        {
            let mut state = self.lock_state();
            let Some((parent_path, segment)) = get_parent_path(path) else {
                state.root = node;
                drop(state);
                self.emit(StoreEvent::NodeReplaced { path: path.clone() });
                return true;
            };
            let Some(parent) = get_at_path_mut(&mut state.root, &parent_path) else {
                debug!(store = %self.inner.config.label, %path, "stale mutation dropped: parent missing");
                return false;
            };
            match segment {
                PathSegment::Child(index) => match parent.children.get_mut(index) {
                    Some(slot) => *slot = node,
                    None => {
                        debug!(store = %self.inner.config.label, %path, "stale mutation dropped: index out of range");
                        return false;
                    }
                },
                PathSegment::NamedChild(key) => {
                    parent.named_children.insert(key, node);
                }
            }
        }
        trace!(store = %self.inner.config.label, %path, "node replaced");
        self.emit(StoreEvent::NodeReplaced { path: path.clone() });
        true
    }

    /// Parse `path` and write `node` there. A malformed path is an error, a
    /// stale one is not.
    pub fn set_node_at_path_str(&self, path: &str, node: AstNode) -> Result<bool, StoreError> {
        let path = parse_path(path)?;
        Ok(self.set_node_at_path(&path, node))
    }

    /// Append `node` to the positional children of the node at `path`.
    pub fn append_child(&self, path: &Path, node: AstNode) -> bool {
        let index = {
            let mut state = self.lock_state();
            let Some(parent) = get_at_path_mut(&mut state.root, path) else {
                debug!(store = %self.inner.config.label, %path, "stale append dropped");
                return false;
            };
            parent.children.push(node);
            parent.children.len() - 1
        };
        self.emit(StoreEvent::NodeReplaced {
            path: path.child(index),
        });
        true
    }

    /// Detach and return the node at `path`. The root cannot be removed.
    pub fn remove_at_path(&self, path: &Path) -> Option<AstNode> {
        let (parent_path, segment) = get_parent_path(path)?;
        let removed = {
            let mut state = self.lock_state();
            let parent = get_at_path_mut(&mut state.root, &parent_path)?;
            match segment {
                PathSegment::Child(index) if index < parent.children.len() => {
                    Some(parent.children.remove(index))
                }
                PathSegment::Child(_) => None,
                PathSegment::NamedChild(key) => parent.named_children.shift_remove(&key),
            }
        };
        if removed.is_some() {
            self.emit(StoreEvent::NodeReplaced { path: parent_path });
        }
        removed
    }

    /// Replace root and evaluation wholesale, abandoning any live validation.
    pub fn load(&self, root: AstNode, evaluation: Vec<EvaluationRecord>) {
        {
            let mut state = self.lock_state();
            if let Some(token) = state.in_flight.take() {
                token.cancel();
            }
            state.root = root;
            state.evaluation = evaluation;
        }
        debug!(store = %self.inner.config.label, "tree loaded");
        self.emit(StoreEvent::Loaded);
    }

    pub fn persisted(&self) -> PersistedState {
        let state = self.lock_state();
        PersistedState {
            root: state.root.clone(),
            evaluation: state.evaluation.clone(),
        }
    }

    /// Put a deep copy of `node` (ids preserved) in the clipboard.
    pub fn copy_node(&self, node: &AstNode) {
        self.lock_state().clipboard = Some(node.clone());
        self.emit(StoreEvent::ClipboardChanged);
    }

    /// Write the clipboard content at `path`, with fresh ids so the tree
    /// never holds the same id twice.
    pub fn paste_at(&self, path: &Path) -> bool {
        let pasted = self.lock_state().clipboard.as_ref().map(AstNode::with_fresh_ids);
        match pasted {
            Some(node) => self.set_node_at_path(path, node),
            None => false,
        }
    }

    /// Validate the current tree.
    ///
    /// Any validation still running for this store is cancelled first. The
    /// returned future may be dropped at any point; a dropped call cancels
    /// its token and leaves the store idle if it was still current. The
    /// response is applied only if this call's token is still the store's
    /// current token when it arrives; otherwise the call resolves to
    /// [`ValidationOutcome::Cancelled`] and leaves the state untouched.
    ///
    /// # Errors
    ///
    /// [`StoreError::Transport`] when the validator fails for a reason other
    /// than cancellation.
    pub async fn validate(&self) -> Result<ValidationOutcome, StoreError> {
        let token = CancellationToken::new();
        let request = {
            let mut state = self.lock_state();
            if let Some(previous) = state.in_flight.replace(token.clone()) {
                debug!(store = %self.inner.config.label, "superseding in-flight validation");
                previous.cancel();
            }
            ValidationRequest {
                node: state.root.clone(),
                expected_type: self.inner.config.expected_type,
            }
        };
        let guard = InFlightGuard {
            store: self,
            token: token.clone(),
            armed: true,
        };
        self.emit(StoreEvent::ValidationStarted);

        let result = self.inner.validator.validate(request, token.clone()).await;
        guard.disarm();

        let outcome = {
            let mut state = self.lock_state();
            let is_current = state
                .in_flight
                .as_ref()
                .is_some_and(|current| current.same_as(&token));
            if is_current {
                state.in_flight = None;
            }
            if !is_current || token.is_cancelled() {
                trace!(store = %self.inner.config.label, "stale validation response ignored");
                Ok(ValidationOutcome::Cancelled)
            } else {
                match result {
                    Ok(records) => {
                        let count = records.len();
                        state.evaluation = records;
                        Ok(ValidationOutcome::Applied { records: count })
                    }
                    Err(ValidatorError::Cancelled) => Ok(ValidationOutcome::Cancelled),
                    Err(ValidatorError::Transport(reason)) => Err(StoreError::Transport(reason)),
                }
            }
        };

        match &outcome {
            Ok(ValidationOutcome::Applied { records }) => {
                debug!(store = %self.inner.config.label, records, "evaluation updated");
                self.emit(StoreEvent::Evaluated { records: *records });
            }
            Ok(ValidationOutcome::Cancelled) => self.emit(StoreEvent::ValidationDiscarded),
            Err(err) => {
                warn!(store = %self.inner.config.label, error = %err, "validation failed");
                self.emit(StoreEvent::ValidationDiscarded);
            }
        }
        outcome
    }

    /// A store over a detached copy of the subtree at `path`.
    ///
    /// The child shares this store's validator and starts with the
    /// evaluation records of the subtree. It is never synchronized with this
    /// store; see [`merge_scoped`](Self::merge_scoped).
    pub fn scoped(&self, path: &Path) -> Option<NodeStore> {
        let (node, evaluation) = {
            let state = self.lock_state();
            let node = get_at_path(&state.root, path)?.clone();
            let ids = node.ids();
            let evaluation: Vec<EvaluationRecord> = state
                .evaluation
                .iter()
                .filter(|record| ids.contains(&record.node_id.as_str()))
                .cloned()
                .collect();
            (node, evaluation)
        };
        let config = StoreConfig {
            label: format!("{}:{}", self.inner.config.label, path),
            expected_type: None,
        };
        Some(Self::from_parts(
            node,
            evaluation,
            Arc::clone(&self.inner.validator),
            config,
        ))
    }

    /// Write the root of `child` back at `path`.
    pub fn merge_scoped(&self, path: &Path, child: &NodeStore) -> bool {
        self.set_node_at_path(path, child.root())
    }
}
