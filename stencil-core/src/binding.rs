//! Binding keys and how a record value binds to a node.

use serde_json::{Number, Value};

use crate::config::FillOptions;
use crate::dom;
use crate::Handle;

/// The binding key carried by `node`, if any.
///
/// A slot-style element with a non-empty name is keyed by that name;
/// otherwise the configured key attribute is read. Empty values count as
/// absent.
pub fn binding_key(node: &Handle, options: &FillOptions) -> Option<String> {
    let name = dom::local_name(node)?;
    if name == options.slot_element {
        if let Some(slot) = dom::attribute(node, &options.slot_name_attribute) {
            if !slot.is_empty() {
                return Some(slot);
            }
        }
    }
    dom::attribute(node, &options.key_attribute).filter(|key| !key.is_empty())
}

/// What `record[key]` asks the engine to do with a bound node.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding<'r> {
    /// Key missing (or `null`): the node is removed.
    Absent,
    /// String, number or boolean, already rendered as text.
    Scalar(String),
    /// The node is a stencil repeated once per entry.
    Array(&'r [Value]),
    /// The node's subtree is filled against this nested object.
    Object(&'r Value),
}

impl<'r> Binding<'r> {
    /// Look `key` up in `record`. Records that are not objects bind nothing.
    pub fn resolve(record: &'r Value, key: &str) -> Self {
        let Value::Object(fields) = record else {
            return Binding::Absent;
        };
        match fields.get(key) {
            None | Some(Value::Null) => Binding::Absent,
            Some(Value::Array(entries)) => Binding::Array(entries),
            Some(object @ Value::Object(_)) => Binding::Object(object),
            Some(scalar) => Binding::Scalar(scalar_text(scalar).unwrap_or_default()),
        }
    }
}

/// Text form of a scalar value; `None` for null, arrays and objects.
///
/// Integral numbers print without a fractional part (`3.0` renders `3`);
/// very large and very small magnitudes use exponent form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn number_text(n: &Number) -> String {
    if let Some(int) = n.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = n.as_u64() {
        return uint.to_string();
    }
    match n.as_f64() {
        Some(float) => float_text(float),
        None => n.to_string(),
    }
}

/// Shortest round-trip text, positional inside `[1e-6, 1e21)` and exponent
/// form (`1e+21`, `1.5e-8`) outside it. Negative zero prints `0`.
fn float_text(float: f64) -> String {
    if float == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&float.abs()) {
        return float.to_string();
    }
    let exponent = format!("{float:e}");
    match exponent.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exponent,
    }
}

/// A bound node seen through the template-collapsing rule: a `<template>`
/// stands for its wrapped content wherever it would be kept, inserted or
/// cloned.
#[derive(Debug, Clone)]
pub enum Stencil {
    Plain(Handle),
    Template { content: Handle },
}

impl Stencil {
    pub fn of(node: &Handle) -> Self {
        match dom::template_content(node) {
            Some(content) => Stencil::Template { content },
            None => Stencil::Plain(node.clone()),
        }
    }

    /// The node that takes the bound node's place.
    pub fn resolved(&self) -> Handle {
        match self {
            Stencil::Plain(node) => node.clone(),
            Stencil::Template { content } => content.clone(),
        }
    }

    /// A fresh, detached copy for one array entry.
    pub fn fresh_copy(&self) -> Handle {
        dom::deep_clone(&self.resolved())
    }
}
