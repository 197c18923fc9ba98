//! Field visitor for extracting the value an event is keyed by.
//!
//! The tracing front-end keys events either by the rendered `message` field
//! or by a caller-chosen field. This visitor pulls out that one value and
//! ignores everything else.

use std::fmt;
use tracing::field::{Field, Visit};

/// Visitor capturing the value of a single named field.
#[derive(Debug)]
pub(crate) struct FieldValueVisitor<'a> {
    name: &'a str,
    value: Option<String>,
}

impl<'a> FieldValueVisitor<'a> {
    /// Look for the field called `name`.
    pub fn new(name: &'a str) -> Self {
        Self { name, value: None }
    }

    /// The captured value, if the event carried the field.
    pub fn into_value(self) -> Option<String> {
        self.value
    }

    fn capture(&mut self, field: &Field, render: impl FnOnce() -> String) {
        if self.value.is_none() && field.name() == self.name {
            self.value = Some(render());
        }
    }
}

impl Visit for FieldValueVisitor<'_> {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.capture(field, || value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.capture(field, || value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.capture(field, || value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.capture(field, || value.to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.capture(field, || value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.capture(field, || value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.capture(field, || format!("{:?}", value));
    }
}
