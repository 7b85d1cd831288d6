//! Expression tree for scenario rules.
//!
//! A scenario rule is a tree of [`AstNode`]s: literals carrying a JSON payload
//! and operator applications carrying ordered and named children. Locations in
//! the tree are addressed with [`Path`]s, which serialize to a dotted string
//! form so they can be compared and stored independently of the live tree.
//!
//! # Example
//!
//! ```
//! use scenario_ast::{get_at_path, parse_path, AstNode};
//! use serde_json::json;
//!
//! let root = AstNode::operator("Or").with_child(
//!     AstNode::operator(">")
//!         .with_child(AstNode::literal(json!(1)))
//!         .with_child(AstNode::literal(json!(2))),
//! );
//!
//! let path = parse_path("root.children.0.children.1").unwrap();
//! let node = get_at_path(&root, &path).unwrap();
//! assert_eq!(node.constant, Some(json!(2)));
//! assert_eq!(path.to_string(), "root.children.0.children.1");
//! ```

pub mod builders;
pub mod data_type;
pub mod error;
pub mod node;
pub mod path;

pub use data_type::DataType;
pub use error::AstError;
pub use node::{new_node_id, AstNode, NodeId, NodeKind};
pub use path::{
    get_at_path, get_at_path_mut, get_parent_path, parse_path, Path, PathSegment,
};
