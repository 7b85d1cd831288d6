//! `similarity(left, right) > threshold` comparisons.
//!
//! The comparison has a scalar form (`FuzzyMatch`) and a list form
//! (`FuzzyMatchAnyOf`, true when any element of the right operand matches).
//! Which one is written follows the data type of the right operand; the
//! editor recomputes it whenever that operand changes.

use scenario_ast::builders::names::{ALGORITHM, FUZZY_MATCH, FUZZY_MATCH_ANY_OF, GREATER, THRESHOLD};
use scenario_ast::{builders, AstNode, DataType, NodeId};
use scenario_ast_store::{Argument, EvaluationRecord};
use tracing::debug;

use crate::config::FuzzyLevels;
use crate::editor::{EditorContext, EditorKind, SubEditor};
use crate::error::EditorError;
use crate::field_errors::{argument_errors, indexed_errors, named_errors, node_errors, FieldErrors};
use crate::util::{expect_operator, finite_threshold, number_value, optional_str};

/// Named similarity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuzzyLevel {
    Low,
    Medium,
    High,
}

impl FuzzyLevel {
    pub fn threshold(self, levels: &FuzzyLevels) -> f64 {
        match self {
            FuzzyLevel::Low => levels.low,
            FuzzyLevel::Medium => levels.medium,
            FuzzyLevel::High => levels.high,
        }
    }

    /// The level whose threshold is exactly `threshold`, if any.
    pub fn of_threshold(threshold: f64, levels: &FuzzyLevels) -> Option<FuzzyLevel> {
        [FuzzyLevel::Low, FuzzyLevel::Medium, FuzzyLevel::High]
            .into_iter()
            .find(|level| level.threshold(levels) == threshold)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatchEditor {
    node_id: NodeId,
    function_id: NodeId,
    left: AstNode,
    right: AstNode,
    any_of: bool,
    algorithm: String,
    threshold: f64,
    pub errors: FieldErrors,
    pub left_errors: FieldErrors,
    pub right_errors: FieldErrors,
    pub algorithm_errors: FieldErrors,
    pub threshold_errors: FieldErrors,
}

impl FuzzyMatchEditor {
    pub fn left(&self) -> &AstNode {
        &self.left
    }

    pub fn right(&self) -> &AstNode {
        &self.right
    }

    /// Whether the list form is written.
    pub fn is_any_of(&self) -> bool {
        self.any_of
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn level(&self, ctx: &EditorContext) -> Option<FuzzyLevel> {
        FuzzyLevel::of_threshold(self.threshold, &ctx.config.fuzzy_match.levels)
    }

    pub fn set_left(&mut self, node: AstNode) {
        self.left = node;
        self.left_errors.clear();
    }

    pub fn set_right(&mut self, node: AstNode, ctx: &EditorContext) {
        self.right = node;
        self.right_errors.clear();
        self.recompute_variant(ctx);
    }

    /// Pick the scalar or list form from the right operand's type. Unknown
    /// types keep the current form.
    pub fn recompute_variant(&mut self, ctx: &EditorContext) {
        let data_type = ctx.types.data_type(&self.right);
        if data_type == DataType::Unknown {
            return;
        }
        let any_of = data_type.is_list();
        if any_of != self.any_of {
            debug!(node = %self.node_id, ?data_type, any_of, "fuzzy match variant switched");
            self.any_of = any_of;
        }
    }

    pub fn set_algorithm(
        &mut self,
        algorithm: impl Into<String>,
        ctx: &EditorContext,
    ) -> Result<(), EditorError> {
        let algorithm = algorithm.into();
        if !ctx.config.fuzzy_match.is_known_algorithm(&algorithm) {
            return Err(EditorError::invalid(&self.node_id, ALGORITHM));
        }
        self.algorithm = algorithm;
        self.algorithm_errors.clear();
        Ok(())
    }

    /// Non-finite thresholds cannot be written and are rejected.
    pub fn set_threshold(&mut self, threshold: f64) -> Result<(), EditorError> {
        self.threshold = finite_threshold(threshold)?;
        self.threshold_errors.clear();
        Ok(())
    }

    pub fn set_level(&mut self, level: FuzzyLevel, ctx: &EditorContext) -> Result<(), EditorError> {
        self.set_threshold(level.threshold(&ctx.config.fuzzy_match.levels))
    }
}

impl SubEditor for FuzzyMatchEditor {
    const KIND: EditorKind = EditorKind::FuzzyMatch;

    fn adapt(
        node: &AstNode,
        evaluation: &[EvaluationRecord],
        ctx: &EditorContext,
    ) -> Result<Self, EditorError> {
        expect_operator(node, &[GREATER])?;
        let function = node
            .children
            .first()
            .ok_or_else(|| EditorError::UnsupportedShape { id: node.id.clone() })?;
        expect_operator(function, &[FUZZY_MATCH, FUZZY_MATCH_ANY_OF])?;

        let threshold = match node.children.get(1) {
            None => ctx.config.fuzzy_match.levels.medium,
            Some(arg) => arg
                .constant_f64()
                .ok_or_else(|| EditorError::invalid(&node.id, THRESHOLD))?,
        };
        let algorithm = optional_str(function, ALGORITHM)?
            .unwrap_or_else(|| ctx.config.fuzzy_match.default_algorithm.clone());
        let operand = |index: usize| {
            function
                .children
                .get(index)
                .cloned()
                .unwrap_or_else(builders::undefined)
        };

        let mut errors = node_errors(evaluation, node);
        errors.extend(node_errors(evaluation, function));
        let mut threshold_errors = indexed_errors(evaluation, node, 1);
        threshold_errors.extend(argument_errors(
            evaluation,
            &node.id,
            Argument::Name(THRESHOLD),
            None,
        ));

        Ok(Self {
            node_id: node.id.clone(),
            function_id: function.id.clone(),
            left: operand(0),
            right: operand(1),
            any_of: function.is_operator(FUZZY_MATCH_ANY_OF),
            algorithm,
            threshold,
            errors,
            left_errors: indexed_errors(evaluation, function, 0),
            right_errors: indexed_errors(evaluation, function, 1),
            algorithm_errors: named_errors(evaluation, function, ALGORITHM),
            threshold_errors,
        })
    }

    fn unadapt(&self) -> AstNode {
        let mut node = builders::fuzzy_match_comparator(
            self.left.clone(),
            self.right.clone(),
            &self.algorithm,
            number_value(self.threshold),
            self.any_of,
        )
        .with_id(self.node_id.clone());
        node.children[0].id = self.function_id.clone();
        node
    }

    fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    fn node_errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn has_errors(&self) -> bool {
        [
            &self.errors,
            &self.left_errors,
            &self.right_errors,
            &self.algorithm_errors,
            &self.threshold_errors,
        ]
        .iter()
        .any(|errors| !errors.is_empty())
    }
}
