use scenario_ast::Path;

/// Notification sent to store listeners after the state changed.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// A node was written at `path`.
    NodeReplaced { path: Path },
    /// Root and evaluation were replaced wholesale.
    Loaded,
    ClipboardChanged,
    ValidationStarted,
    /// A validation response was applied to the evaluation list.
    Evaluated { records: usize },
    /// A validation ended without touching the evaluation list.
    ValidationDiscarded,
}
