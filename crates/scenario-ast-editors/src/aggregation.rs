//! Aggregations over a table field, narrowed by a list of filters.
//!
//! Each filter's operator belongs to a family that fixes the shape of its
//! `value` argument: unary operators take none, binary operators take one
//! operand, and the fuzzy operator takes a `FuzzyMatchOptions` node. Moving a
//! filter to another family rebuilds its value from scratch.
//!
//! Errors on the filter list are attributed by position when the editor is
//! built. Afterwards a filter's errors travel with it. List errors without a
//! position, whether untagged or tagged by name, belong to the list as a
//! whole and are cleared by any add, remove or move.

use std::fmt;
use std::str::FromStr;

use scenario_ast::builders::names::{
    AGGREGATOR, AGGREGATOR_FN, ALGORITHM, FIELD_NAME, FILTER, FILTERS, FUZZY_MATCH_OPTIONS, LABEL,
    LIST, OPERATOR, TABLE_NAME, THRESHOLD, VALUE,
};
use scenario_ast::{builders, new_node_id, AstNode, NodeId};
use scenario_ast_store::{get_errors_for_node, Argument, EvaluationRecord};
use tracing::debug;

use crate::editor::{EditorContext, EditorKind, SubEditor};
use crate::error::EditorError;
use crate::field_errors::{argument_errors, named_errors, node_errors, FieldErrors};
use crate::util::{
    expect_operator, finite_threshold, number_value, operand, optional_f64, optional_str,
    required_str,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorFamily {
    Unary,
    Binary,
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    IsEmpty,
    IsNotEmpty,
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Lesser,
    LesserOrEqual,
    IsInList,
    IsNotInList,
    StringStartsWith,
    StringEndsWith,
    StringContains,
    FuzzyMatch,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 14] = [
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
        FilterOperator::Equal,
        FilterOperator::NotEqual,
        FilterOperator::Greater,
        FilterOperator::GreaterOrEqual,
        FilterOperator::Lesser,
        FilterOperator::LesserOrEqual,
        FilterOperator::IsInList,
        FilterOperator::IsNotInList,
        FilterOperator::StringStartsWith,
        FilterOperator::StringEndsWith,
        FilterOperator::StringContains,
        FilterOperator::FuzzyMatch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::IsEmpty => "IsEmpty",
            FilterOperator::IsNotEmpty => "IsNotEmpty",
            FilterOperator::Equal => "=",
            FilterOperator::NotEqual => "!=",
            FilterOperator::Greater => ">",
            FilterOperator::GreaterOrEqual => ">=",
            FilterOperator::Lesser => "<",
            FilterOperator::LesserOrEqual => "<=",
            FilterOperator::IsInList => "IsInList",
            FilterOperator::IsNotInList => "IsNotInList",
            FilterOperator::StringStartsWith => "StringStartsWith",
            FilterOperator::StringEndsWith => "StringEndsWith",
            FilterOperator::StringContains => "StringContains",
            FilterOperator::FuzzyMatch => "FuzzyMatch",
        }
    }

    pub fn family(self) -> OperatorFamily {
        match self {
            FilterOperator::IsEmpty | FilterOperator::IsNotEmpty => OperatorFamily::Unary,
            FilterOperator::FuzzyMatch => OperatorFamily::Fuzzy,
            _ => OperatorFamily::Binary,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|op| op.as_str() == s).ok_or(())
    }
}

/// The `value` argument of a filter, shaped by the operator family.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Absent,
    Operand(AstNode),
    Fuzzy {
        value: AstNode,
        threshold: f64,
        algorithm: String,
    },
}

impl FilterValue {
    /// Fresh value for an operator of `family`.
    pub fn empty(family: OperatorFamily, ctx: &EditorContext) -> Self {
        let fuzzy = &ctx.config.fuzzy_match;
        match family {
            OperatorFamily::Unary => FilterValue::Absent,
            OperatorFamily::Binary => FilterValue::Operand(builders::undefined()),
            OperatorFamily::Fuzzy => FilterValue::Fuzzy {
                value: builders::undefined(),
                threshold: fuzzy.levels.medium,
                algorithm: fuzzy.default_algorithm.clone(),
            },
        }
    }

    pub fn family(&self) -> OperatorFamily {
        match self {
            FilterValue::Absent => OperatorFamily::Unary,
            FilterValue::Operand(_) => OperatorFamily::Binary,
            FilterValue::Fuzzy { .. } => OperatorFamily::Fuzzy,
        }
    }

    fn to_node(&self) -> Option<AstNode> {
        match self {
            FilterValue::Absent => None,
            FilterValue::Operand(node) => Some(node.clone()),
            FilterValue::Fuzzy {
                value,
                threshold,
                algorithm,
            } => Some(builders::fuzzy_match_options(
                value.clone(),
                number_value(*threshold),
                algorithm,
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterModel {
    id: NodeId,
    table_name: String,
    field_name: String,
    operator: FilterOperator,
    value: FilterValue,
    pub errors: FieldErrors,
}

impl FilterModel {
    pub fn new(table_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            id: new_node_id(),
            table_name: table_name.into(),
            field_name: field_name.into(),
            operator: FilterOperator::Equal,
            value: FilterValue::Operand(builders::undefined()),
            errors: FieldErrors::new(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    pub fn set_field(&mut self, table_name: impl Into<String>, field_name: impl Into<String>) {
        self.table_name = table_name.into();
        self.field_name = field_name.into();
        self.errors.clear();
    }

    /// Change the operator; a change of family replaces the value.
    pub fn set_operator(&mut self, operator: FilterOperator, ctx: &EditorContext) {
        let family = operator.family();
        if family != self.operator.family() {
            debug!(filter = %self.id, from = %self.operator, to = %operator, "filter family switched");
            self.value = FilterValue::empty(family, ctx);
        }
        self.operator = operator;
        self.errors.clear();
    }

    /// Set the operand of a binary or fuzzy filter. Returns `false` for a
    /// unary filter, which has no operand.
    pub fn set_operand(&mut self, node: AstNode) -> bool {
        match &mut self.value {
            FilterValue::Absent => return false,
            FilterValue::Operand(operand) => *operand = node,
            FilterValue::Fuzzy { value, .. } => *value = node,
        }
        self.errors.clear();
        true
    }

    /// Set the matching parameters of a fuzzy filter. Returns `Ok(false)`
    /// for any other family and an error for a non-finite threshold.
    pub fn set_fuzzy_options(
        &mut self,
        new_threshold: f64,
        new_algorithm: impl Into<String>,
    ) -> Result<bool, EditorError> {
        let new_threshold = finite_threshold(new_threshold)?;
        let FilterValue::Fuzzy {
            threshold,
            algorithm,
            ..
        } = &mut self.value
        else {
            return Ok(false);
        };
        *threshold = new_threshold;
        *algorithm = new_algorithm.into();
        self.errors.clear();
        Ok(true)
    }

    fn adapt(
        node: &AstNode,
        evaluation: &[EvaluationRecord],
        mut errors: FieldErrors,
        ctx: &EditorContext,
    ) -> Result<Self, EditorError> {
        expect_operator(node, &[FILTER])?;
        let operator_text = required_str(node, OPERATOR)?;
        let operator: FilterOperator = operator_text
            .parse()
            .map_err(|()| EditorError::invalid(&node.id, OPERATOR))?;
        let value = match operator.family() {
            OperatorFamily::Unary => FilterValue::Absent,
            OperatorFamily::Binary => FilterValue::Operand(operand(node, VALUE)),
            OperatorFamily::Fuzzy => match node.named(VALUE) {
                Some(options) if options.is_operator(FUZZY_MATCH_OPTIONS) => {
                    let defaults = &ctx.config.fuzzy_match;
                    FilterValue::Fuzzy {
                        value: operand(options, VALUE),
                        threshold: optional_f64(options, THRESHOLD)?
                            .unwrap_or(defaults.levels.medium),
                        algorithm: optional_str(options, ALGORITHM)?
                            .unwrap_or_else(|| defaults.default_algorithm.clone()),
                    }
                }
                Some(_) => return Err(EditorError::invalid(&node.id, VALUE)),
                None => FilterValue::empty(OperatorFamily::Fuzzy, ctx),
            },
        };
        errors.extend(
            get_errors_for_node(evaluation, &[node.id.as_str()], false)
                .into_iter()
                .cloned(),
        );
        Ok(Self {
            id: node.id.clone(),
            table_name: required_str(node, TABLE_NAME)?,
            field_name: required_str(node, FIELD_NAME)?,
            operator,
            value,
            errors,
        })
    }

    fn unadapt(&self) -> AstNode {
        builders::filter(
            &self.table_name,
            &self.field_name,
            self.operator.as_str(),
            self.value.to_node(),
        )
        .with_id(self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationEditor {
    node_id: NodeId,
    filters_id: NodeId,
    aggregator: String,
    label: String,
    table_name: String,
    field_name: String,
    filters: Vec<FilterModel>,
    pub errors: FieldErrors,
    pub aggregator_errors: FieldErrors,
    pub label_errors: FieldErrors,
    pub field_errors: FieldErrors,
    /// Errors about the filter list itself rather than one filter.
    pub filters_errors: FieldErrors,
}

impl AggregationEditor {
    pub fn aggregator(&self) -> &str {
        &self.aggregator
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn filters(&self) -> &[FilterModel] {
        &self.filters
    }

    pub fn filter_mut(&mut self, index: usize) -> Option<&mut FilterModel> {
        self.filters.get_mut(index)
    }

    pub fn set_aggregator(
        &mut self,
        aggregator: impl Into<String>,
        ctx: &EditorContext,
    ) -> Result<(), EditorError> {
        let aggregator = aggregator.into();
        if !ctx.config.is_known_aggregator(&aggregator) {
            return Err(EditorError::invalid(&self.node_id, AGGREGATOR_FN));
        }
        self.aggregator = aggregator;
        self.aggregator_errors.clear();
        Ok(())
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
        self.label_errors.clear();
    }

    pub fn set_field(&mut self, table_name: impl Into<String>, field_name: impl Into<String>) {
        self.table_name = table_name.into();
        self.field_name = field_name.into();
        self.field_errors.clear();
    }

    pub fn add_filter(&mut self, filter: FilterModel) {
        self.filters.push(filter);
        self.filters_errors.clear();
    }

    pub fn remove_filter(&mut self, index: usize) -> Option<FilterModel> {
        if index >= self.filters.len() {
            return None;
        }
        self.filters_errors.clear();
        Some(self.filters.remove(index))
    }

    /// Move the filter at `from` so it ends up at `to`.
    pub fn move_filter(&mut self, from: usize, to: usize) -> bool {
        if from >= self.filters.len() || to >= self.filters.len() {
            return false;
        }
        let filter = self.filters.remove(from);
        self.filters.insert(to, filter);
        self.filters_errors.clear();
        true
    }
}

/// Errors on the filter list record that point at no filter position.
fn list_errors(evaluation: &[EvaluationRecord], list: &AstNode) -> FieldErrors {
    get_errors_for_node(evaluation, &[list.id.as_str()], true)
        .into_iter()
        .filter(|error| error.argument_index.is_none())
        .cloned()
        .collect()
}

impl SubEditor for AggregationEditor {
    const KIND: EditorKind = EditorKind::Aggregation;

    fn adapt(
        node: &AstNode,
        evaluation: &[EvaluationRecord],
        ctx: &EditorContext,
    ) -> Result<Self, EditorError> {
        expect_operator(node, &[AGGREGATOR])?;

        let list = node.named(FILTERS);
        if let Some(list) = list {
            expect_operator(list, &[LIST])?;
        }
        let mut filters_errors = argument_errors(evaluation, &node.id, Argument::Name(FILTERS), None);
        let mut filters = Vec::new();
        if let Some(list) = list {
            filters_errors.extend(list_errors(evaluation, list));
            for (index, filter) in list.children.iter().enumerate() {
                let positional: FieldErrors =
                    argument_errors(evaluation, &list.id, Argument::Index(index), None);
                filters.push(FilterModel::adapt(filter, evaluation, positional, ctx)?);
            }
        }

        let mut field_errors = named_errors(evaluation, node, TABLE_NAME);
        field_errors.extend(named_errors(evaluation, node, FIELD_NAME));

        Ok(Self {
            node_id: node.id.clone(),
            filters_id: list.map_or_else(new_node_id, |list| list.id.clone()),
            aggregator: optional_str(node, AGGREGATOR_FN)?
                .unwrap_or_else(|| ctx.config.default_aggregator.clone()),
            label: optional_str(node, LABEL)?.unwrap_or_default(),
            table_name: required_str(node, TABLE_NAME)?,
            field_name: required_str(node, FIELD_NAME)?,
            filters,
            errors: node_errors(evaluation, node),
            aggregator_errors: named_errors(evaluation, node, AGGREGATOR_FN),
            label_errors: named_errors(evaluation, node, LABEL),
            field_errors,
            filters_errors,
        })
    }

    fn unadapt(&self) -> AstNode {
        let mut node =
            builders::aggregator(&self.aggregator, &self.table_name, &self.field_name, &self.label)
                .with_id(self.node_id.clone());
        node.named_children.insert(
            FILTERS.to_string(),
            builders::list(self.filters.iter().map(FilterModel::unadapt))
                .with_id(self.filters_id.clone()),
        );
        node
    }

    fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    fn node_errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn has_errors(&self) -> bool {
        !(self.errors.is_empty()
            && self.aggregator_errors.is_empty()
            && self.label_errors.is_empty()
            && self.field_errors.is_empty()
            && self.filters_errors.is_empty()
            && self.filters.iter().all(|f| f.errors.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_ast_store::EvaluationError;
    use serde_json::json;

    fn aggregation() -> AstNode {
        let mut node = builders::aggregator("SUM", "transactions", "amount", "total").with_id("agg");
        node.named_children[FILTERS] = builders::list([
            builders::filter("transactions", "status", "=", Some(builders::constant("done")))
                .with_id("f0"),
            builders::filter("transactions", "note", "IsEmpty", None).with_id("f1"),
        ])
        .with_id("filters");
        node
    }

    #[test]
    fn test_operator_families() {
        for op in FilterOperator::ALL {
            assert_eq!(op.as_str().parse::<FilterOperator>(), Ok(op));
        }
        assert_eq!(FilterOperator::IsNotEmpty.family(), OperatorFamily::Unary);
        assert_eq!(FilterOperator::StringContains.family(), OperatorFamily::Binary);
        assert_eq!(FilterOperator::FuzzyMatch.family(), OperatorFamily::Fuzzy);
        assert!("LIKE".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn test_positional_errors_follow_filter_on_move() {
        let evaluation = vec![
            EvaluationRecord::new("filters", vec!["filters".into(), "agg".into()])
                .with_error(EvaluationError::new("BAD_FILTER", "").on_argument_index(1))
                .with_error(EvaluationError::new("TOO_MANY", ""))
                .with_error(EvaluationError::new("DUPLICATE_FIELD", "").on_argument_name("status")),
            EvaluationRecord::new("agg", vec!["agg".into()])
                .with_error(EvaluationError::new("REQUIRED", "").on_argument_name(LABEL)),
        ];
        let mut editor =
            AggregationEditor::adapt(&aggregation(), &evaluation, &EditorContext::default())
                .unwrap();
        assert_eq!(editor.filters()[1].errors[0].error, "BAD_FILTER");
        let list_codes: Vec<&str> = editor.filters_errors.iter().map(|e| e.error.as_str()).collect();
        assert_eq!(list_codes, ["TOO_MANY", "DUPLICATE_FIELD"]);
        assert_eq!(editor.label_errors[0].error, "REQUIRED");

        assert!(editor.move_filter(1, 0));
        assert_eq!(editor.filters()[0].id(), "f1");
        assert_eq!(editor.filters()[0].errors.len(), 1);
        assert!(editor.filters_errors.is_empty());
        assert!(!editor.move_filter(0, 2));
    }

    #[test]
    fn test_switch_to_fuzzy_builds_options() {
        let ctx = EditorContext::default();
        let mut editor = AggregationEditor::adapt(&aggregation(), &[], &ctx).unwrap();
        let filter = editor.filter_mut(0).unwrap();
        filter.set_operator(FilterOperator::FuzzyMatch, &ctx);
        assert!(filter.set_operand(builders::constant("acme")));
        assert!(filter.set_fuzzy_options(85.0, "token_set_ratio").unwrap());
        assert!(matches!(
            filter.set_fuzzy_options(f64::INFINITY, "ratio"),
            Err(EditorError::InvalidThreshold(_))
        ));

        let value = editor.unadapt().named(FILTERS).unwrap().children[0]
            .named(VALUE)
            .cloned()
            .unwrap();
        assert!(value.is_operator(FUZZY_MATCH_OPTIONS));
        assert_eq!(value.named(THRESHOLD).unwrap().constant, Some(json!(85)));
        assert_eq!(value.named(ALGORITHM).unwrap().constant, Some(json!("token_set_ratio")));
        assert_eq!(value.named(VALUE).unwrap().constant, Some(json!("acme")));
    }

    #[test]
    fn test_same_family_keeps_value() {
        let ctx = EditorContext::default();
        let mut editor = AggregationEditor::adapt(&aggregation(), &[], &ctx).unwrap();
        let filter = editor.filter_mut(0).unwrap();
        filter.set_operator(FilterOperator::NotEqual, &ctx);
        match filter.value() {
            FilterValue::Operand(node) => assert_eq!(node.constant, Some(json!("done"))),
            other => panic!("unexpected value {other:?}"),
        }
        let unary = editor.filter_mut(1).unwrap();
        assert!(!unary.set_operand(builders::constant(1)));
    }

    #[test]
    fn test_aggregator_must_be_known() {
        let ctx = EditorContext::default();
        let mut editor = AggregationEditor::adapt(&aggregation(), &[], &ctx).unwrap();
        assert!(editor.set_aggregator("MEDIAN", &ctx).is_err());
        editor.set_aggregator("COUNT", &ctx).unwrap();
        assert_eq!(editor.aggregator(), "COUNT");
    }
}
