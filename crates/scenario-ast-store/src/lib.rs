//! Editing store for scenario expression trees.
//!
//! A [`NodeStore`] owns the tree being edited, the latest evaluation list
//! returned by the external [`Validator`], and a one-slot clipboard. All
//! structural edits go through path-addressed writes; validation is the only
//! asynchronous operation and is cancellable, with the last issued call
//! winning.
//!
//! The [`correlation`] module maps the flat evaluation list back onto nodes.

pub mod cancel;
pub mod config;
pub mod correlation;
pub mod error;
pub mod evaluation;
pub mod events;
pub mod persist;
pub mod store;
pub mod validator;

pub use cancel::CancellationToken;
pub use config::StoreConfig;
pub use correlation::{
    get_argument_errors, get_errors_for_node, get_unattributed_errors, get_validation_status,
    ValidationStatus,
};
pub use error::StoreError;
pub use evaluation::{Argument, EvaluationError, EvaluationRecord};
pub use events::StoreEvent;
pub use persist::PersistedState;
pub use store::{NodeStore, NodeStoreState, ValidationOutcome};
pub use validator::{ValidationRequest, Validator, ValidatorError};
