//! Structural expansion of a markup tree.
//!
//! Every sibling list is handled in two passes. The planning pass reads the
//! siblings and decides what happens to each one; the apply pass then
//! builds the new list. Nothing is mutated while it is being iterated.

use std::mem;

use quick_xml::escape::escape;
use stencil_data::{Collection, DataSets, Scope};
use tracing::debug;

use super::dom::{Document, Element, Node};
use crate::config::RenderOptions;
use crate::error::Result;
use crate::resolve::{resolve, Lookup, Miss, TokenMiss};
use crate::token::{FieldReference, Token};

/// What the apply pass does with one sibling.
#[derive(Debug)]
enum Action {
    /// Strip structural markers and render as a plain node.
    Render,
    /// Replace the node with one rendered copy per member.
    Repeat {
        name: String,
        members: Collection,
    },
    Remove,
}

/// Outcome of a conditional, remembered until the next element sibling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Branch {
    Taken,
    NotTaken,
}

/// Renders a markup document against a set of data sets.
///
/// The expander is consumed by [`render`](MarkupExpander::render) and
/// carries the soft misses collected along the way.
pub struct MarkupExpander<'a> {
    data: &'a DataSets,
    options: &'a RenderOptions,
    misses: Vec<TokenMiss>,
}

impl<'a> MarkupExpander<'a> {
    pub fn new(data: &'a DataSets, options: &'a RenderOptions) -> Self {
        MarkupExpander {
            data,
            options,
            misses: Vec::new(),
        }
    }

    /// Renders `document` into a new document.
    ///
    /// # Errors
    ///
    /// Only strict aggregation can fail; unresolvable tokens are returned
    /// as misses.
    pub fn render(mut self, document: &Document) -> Result<(Document, Vec<TokenMiss>)> {
        let root = Scope::root(self.data);
        let nodes = self.render_siblings(document.nodes.clone(), &root, "")?;
        debug!(misses = self.misses.len(), "markup expanded");
        Ok((Document::new(nodes), self.misses))
    }

    fn render_siblings(
        &mut self,
        nodes: Vec<Node>,
        scope: &Scope<'_>,
        path: &str,
    ) -> Result<Vec<Node>> {
        let plan = self.plan(&nodes, scope)?;

        let mut output = Vec::with_capacity(nodes.len());
        for (node, action) in nodes.into_iter().zip(plan) {
            let mut element = match node {
                Node::Element(element) => element,
                other => {
                    output.push(other);
                    continue;
                }
            };
            let location = child_path(path, &element.name);

            match action {
                Action::Remove => {}
                Action::Render => {
                    self.strip_markers(&mut element);
                    self.render_element(&mut element, scope, &location)?;
                    output.push(Node::Element(element));
                }
                Action::Repeat { name, members } => {
                    self.strip_markers(&mut element);
                    debug!(
                        element = %location,
                        dataset = %name,
                        copies = members.len(),
                        "repeating element"
                    );
                    for member in members.iter() {
                        let member_scope = scope.push(&name, member.clone());
                        let mut copy = element.clone();
                        self.render_element(&mut copy, &member_scope, &location)?;
                        output.push(Node::Element(copy));
                    }
                }
            }
        }

        Ok(output)
    }

    /// Decides the fate of every sibling without touching any of them.
    fn plan(&self, nodes: &[Node], scope: &Scope<'_>) -> Result<Vec<Action>> {
        let markup = self.options.markup();
        let mut plan = Vec::with_capacity(nodes.len());
        let mut pending: Option<Branch> = None;

        for node in nodes {
            let Some(element) = node.as_element() else {
                plan.push(Action::Render);
                continue;
            };
            let previous = pending.take();

            if element.has_attribute(&markup.else_attribute) && previous == Some(Branch::Taken) {
                plan.push(Action::Remove);
                continue;
            }

            if let Some(value) = element.attribute_text(&markup.if_attribute) {
                let branch = self.evaluate_condition(&value, scope)?;
                pending = Some(branch);
                if branch == Branch::NotTaken {
                    plan.push(Action::Remove);
                    continue;
                }
            }

            let action = match element.attribute_text(&markup.for_attribute) {
                Some(value) => self.plan_loop(&value, scope)?,
                None => Action::Render,
            };
            plan.push(action);
        }

        Ok(plan)
    }

    fn evaluate_condition(&self, value: &str, scope: &Scope<'_>) -> Result<Branch> {
        let Some(reference) = self.options.syntax().parse_marker(value) else {
            return Ok(Branch::NotTaken);
        };
        let taken = match self.resolve(&reference, scope)? {
            Lookup::Value(value) => value.is_truthy(),
            Lookup::Collection(_) | Lookup::Aggregate(_) | Lookup::Miss(_) => false,
        };
        Ok(if taken { Branch::Taken } else { Branch::NotTaken })
    }

    fn plan_loop(&self, value: &str, scope: &Scope<'_>) -> Result<Action> {
        let Some(reference) = self.options.syntax().parse_marker(value) else {
            return Ok(Action::Render);
        };
        Ok(match self.resolve(&reference, scope)? {
            Lookup::Collection(members) if members.is_empty() => Action::Remove,
            Lookup::Collection(members) => Action::Repeat {
                name: reference.dataset_name().to_string(),
                members,
            },
            Lookup::Value(_) | Lookup::Aggregate(_) => Action::Remove,
            Lookup::Miss(_) => Action::Render,
        })
    }

    fn resolve(&self, reference: &FieldReference, scope: &Scope<'_>) -> Result<Lookup> {
        Ok(resolve(reference, scope, self.options.aggregation())?)
    }

    fn strip_markers(&self, element: &mut Element) {
        let markup = self.options.markup();
        for name in [
            &markup.if_attribute,
            &markup.for_attribute,
            &markup.else_attribute,
        ] {
            element.remove_attribute(name);
        }
    }

    /// Children first, then the element's own text and attribute values.
    fn render_element(
        &mut self,
        element: &mut Element,
        scope: &Scope<'_>,
        path: &str,
    ) -> Result<()> {
        let children = mem::take(&mut element.children);
        element.children = self.render_siblings(children, scope, path)?;

        for child in &mut element.children {
            if let Node::Text(raw) = child {
                if let Some(text) = self.substitute(raw, scope, path)? {
                    *raw = text;
                }
            }
        }

        for index in 0..element.attributes.len() {
            let location = format!("{}@{}", path, element.attributes[index].0);
            let raw = &element.attributes[index].1;
            if let Some(value) = self.substitute(raw, scope, &location)? {
                element.attributes[index].1 = value;
            }
        }

        Ok(())
    }

    /// Replaces the tokens of one escaped string. Returns `None` when the
    /// string holds no tokens.
    fn substitute(&mut self, raw: &str, scope: &Scope<'_>, location: &str) -> Result<Option<String>> {
        let tokens = self.options.syntax().scan(raw);
        if tokens.is_empty() {
            return Ok(None);
        }

        let mut output = String::with_capacity(raw.len());
        let mut cursor = 0;
        for token in tokens {
            let Some(reference) = &token.reference else {
                continue;
            };
            let replacement = match self.resolve(reference, scope)? {
                Lookup::Miss(reason) => {
                    self.record_miss(location, &token, reason);
                    None
                }
                lookup => lookup.to_text(),
            };
            if let Some(text) = replacement {
                output.push_str(&raw[cursor..token.range.start]);
                output.push_str(&escape(text.as_str()));
                cursor = token.range.end;
            }
        }
        output.push_str(&raw[cursor..]);

        Ok(Some(output))
    }

    fn record_miss(&mut self, location: &str, token: &Token, reason: Miss) {
        debug!(
            location,
            token = %token.text,
            reason = reason.describe(),
            "token left unresolved"
        );
        self.misses.push(TokenMiss {
            location: location.to_string(),
            token: token.text.clone(),
            reason,
        });
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}
