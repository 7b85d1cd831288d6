use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use scenario_ast::builders::names::STRING_TEMPLATE;
use scenario_ast::{builders, AstNode, NodeId};
use scenario_ast_store::EvaluationRecord;

use crate::editor::{EditorContext, EditorKind, SubEditor};
use crate::error::EditorError;
use crate::field_errors::{indexed_errors, named_errors, node_errors, FieldErrors};
use crate::util::expect_operator;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"%([A-Za-z_][A-Za-z0-9_]*)%").expect("static placeholder regex")
    })
}

/// Placeholder names in order of first appearance, without duplicates.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder_re().captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateVariable {
    pub node: AstNode,
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringTemplateEditor {
    node_id: NodeId,
    template: String,
    variables: IndexMap<String, TemplateVariable>,
    pub errors: FieldErrors,
    pub template_errors: FieldErrors,
}

impl StringTemplateEditor {
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn variables(&self) -> &IndexMap<String, TemplateVariable> {
        &self.variables
    }

    /// Replace the template text and resync the variable set: names that
    /// appear get an Undefined slot, names that vanish are dropped.
    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = template.into();
        self.template_errors.clear();
        let mut previous = std::mem::take(&mut self.variables);
        self.variables = placeholders(&self.template)
            .into_iter()
            .map(|name| {
                let variable = previous.shift_remove(&name).unwrap_or_else(|| TemplateVariable {
                    node: builders::undefined(),
                    errors: FieldErrors::new(),
                });
                (name, variable)
            })
            .collect();
    }

    /// Assign the operand of an existing placeholder. Returns `false` for a
    /// name the template does not contain.
    pub fn set_variable(&mut self, name: &str, node: AstNode) -> bool {
        match self.variables.get_mut(name) {
            Some(variable) => {
                variable.node = node;
                variable.errors.clear();
                true
            }
            None => false,
        }
    }
}

impl SubEditor for StringTemplateEditor {
    const KIND: EditorKind = EditorKind::StringTemplate;

    fn adapt(
        node: &AstNode,
        evaluation: &[EvaluationRecord],
        _ctx: &EditorContext,
    ) -> Result<Self, EditorError> {
        expect_operator(node, &[STRING_TEMPLATE])?;
        let template = match node.children.first() {
            None => String::new(),
            Some(arg) => arg
                .constant_str()
                .ok_or_else(|| EditorError::invalid(&node.id, "template"))?
                .to_string(),
        };
        let variables = placeholders(&template)
            .into_iter()
            .map(|name| {
                let variable = TemplateVariable {
                    node: node.named(&name).cloned().unwrap_or_else(builders::undefined),
                    errors: named_errors(evaluation, node, &name),
                };
                (name, variable)
            })
            .collect();
        Ok(Self {
            node_id: node.id.clone(),
            template,
            variables,
            errors: node_errors(evaluation, node),
            template_errors: indexed_errors(evaluation, node, 0),
        })
    }

    fn unadapt(&self) -> AstNode {
        builders::string_template(
            &self.template,
            self.variables
                .iter()
                .map(|(name, variable)| (name.clone(), variable.node.clone())),
        )
        .with_id(self.node_id.clone())
    }

    fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    fn node_errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
            || !self.template_errors.is_empty()
            || self.variables.values().any(|v| !v.errors.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(
            placeholders("Hello %name%, %count% items for %name%"),
            ["name", "count"]
        );
        assert!(placeholders("100% sure, 5%").is_empty());
        assert!(placeholders("%1bad%").is_empty());
    }

    #[test]
    fn test_template_change_resyncs_variables() {
        let node = builders::string_template(
            "Dear %first%, ref %ref%",
            [
                ("first".to_string(), builders::payload("first_name")),
                ("ref".to_string(), builders::payload("reference")),
            ],
        );
        let mut editor = StringTemplateEditor::adapt(&node, &[], &EditorContext::default()).unwrap();

        editor.set_template("Ref %ref% for %amount%");
        let names: Vec<&str> = editor.variables().keys().map(String::as_str).collect();
        assert_eq!(names, ["ref", "amount"]);
        assert!(editor.variables()["ref"]
            .node
            .structurally_eq(&builders::payload("reference")));
        assert!(builders::is_undefined(&editor.variables()["amount"].node));

        assert!(editor.set_variable("amount", builders::payload("amount")));
        assert!(!editor.set_variable("first", builders::payload("first_name")));

        let out = editor.unadapt();
        assert!(out.named("first").is_none());
        assert_eq!(out.named_children.len(), 2);
    }
}
