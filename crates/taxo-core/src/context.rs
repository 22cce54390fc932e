//! Context sequences for predicate-linked term relations
//!
//! A context records how two related terms appear together in a sentence:
//! free text spans, the two terms themselves and, when one was recovered,
//! the predicate linking them. Each element serializes as `"<Kind> <text>"`.
//! Term elements are written with an empty payload and are re-derived from
//! the owning relation's source and target when read back.

use serde::{Deserialize, Serialize};

use crate::{Result, TaxoError};

/// Kind tag of a context element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextKind {
    Span,
    Term,
    Pred,
}

impl ContextKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Span => "Span",
            Self::Term => "Term",
            Self::Pred => "Pred",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Span" => Some(Self::Span),
            "Term" => Some(Self::Term),
            "Pred" => Some(Self::Pred),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One element of a context sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextElement {
    pub kind: ContextKind,
    pub text: String,
}

impl ContextElement {
    pub fn span(text: impl Into<String>) -> Self {
        Self {
            kind: ContextKind::Span,
            text: text.into(),
        }
    }

    pub fn term(name: impl Into<String>) -> Self {
        Self {
            kind: ContextKind::Term,
            text: name.into(),
        }
    }

    pub fn pred(text: impl Into<String>) -> Self {
        Self {
            kind: ContextKind::Pred,
            text: text.into(),
        }
    }

    /// Serialized form; term names are not written out
    pub fn serialize(&self) -> String {
        match self.kind {
            ContextKind::Term => format!("{} ", self.kind),
            _ => format!("{} {}", self.kind, self.text),
        }
    }
}

/// Ordered sequence of context elements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    elements: Vec<ContextElement>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: ContextElement) {
        self.elements.push(element);
    }

    pub fn push_span(&mut self, text: impl Into<String>) {
        self.push(ContextElement::span(text));
    }

    pub fn push_term(&mut self, name: impl Into<String>) {
        self.push(ContextElement::term(name));
    }

    pub fn push_pred(&mut self, text: impl Into<String>) {
        self.push(ContextElement::pred(text));
    }

    pub fn elements(&self) -> &[ContextElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The recovered predicate, if the context carries one
    pub fn predicate(&self) -> Option<&str> {
        self.elements
            .iter()
            .find(|e| e.kind == ContextKind::Pred)
            .map(|e| e.text.as_str())
    }

    /// Serialize every element in order
    pub fn serialize(&self) -> Vec<String> {
        self.elements.iter().map(ContextElement::serialize).collect()
    }

    /// Rebuild a context from serialized elements.
    ///
    /// The first `Term` element is bound to `source`, the second to `target`.
    pub fn deserialize<I, S>(fields: I, source: &str, target: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut context = Self::new();
        let mut terms_seen = 0;

        for field in fields {
            let field = field.as_ref();
            let (kind, text) = field.split_once(' ').unwrap_or((field, ""));
            let kind = ContextKind::from_str(kind)
                .ok_or_else(|| TaxoError::InvalidContext(field.to_string()))?;

            match kind {
                ContextKind::Term => {
                    let name = match terms_seen {
                        0 => source,
                        1 => target,
                        _ => {
                            return Err(TaxoError::InvalidContext(format!(
                                "more than two term elements in context: {field}"
                            )))
                        }
                    };
                    terms_seen += 1;
                    context.push_term(name);
                }
                ContextKind::Span => context.push_span(text),
                ContextKind::Pred => context.push_pred(text),
            }
        }

        Ok(context)
    }
}

impl std::fmt::Display for Context {
    /// Human-readable rendering: `[term]` for terms, `<pred>` for predicates
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .elements
            .iter()
            .filter(|e| !(e.kind == ContextKind::Span && e.text.is_empty()))
            .map(|e| match e.kind {
                ContextKind::Span => e.text.clone(),
                ContextKind::Term => format!("[{}]", e.text),
                ContextKind::Pred => format!("<{}>", e.text),
            })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
