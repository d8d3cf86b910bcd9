use std::collections::HashMap;
use std::fmt::{self, Write};

use crate::config::UnknownPlaceholderPolicy;
use crate::error::BindingError;
use crate::template::{PlaceholderStyle, Template};
use crate::types::{ParamCell, ParamType, TypedValue};

/// How a caller refers to a placeholder when binding.
///
/// Positional placeholders are addressed by their 0-based ordinal; named ones
/// by name, with or without the leading colon. Displayed the same way as
/// [`PlaceholderRef::label`](crate::template::PlaceholderRef::label): `?N`
/// (1-based) or `:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamRef {
    Index(usize),
    Name(String),
}

impl ParamRef {
    fn normalized(self) -> Self {
        match self {
            ParamRef::Name(name) => match name.strip_prefix(':') {
                Some(stripped) => ParamRef::Name(stripped.to_string()),
                None => ParamRef::Name(name),
            },
            index @ ParamRef::Index(_) => index,
        }
    }
}

impl From<usize> for ParamRef {
    fn from(value: usize) -> Self {
        ParamRef::Index(value)
    }
}

impl From<&str> for ParamRef {
    fn from(value: &str) -> Self {
        ParamRef::Name(value.to_string())
    }
}

impl From<String> for ParamRef {
    fn from(value: String) -> Self {
        ParamRef::Name(value)
    }
}

impl fmt::Display for ParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamRef::Index(i) => write!(f, "?{}", i + 1),
            ParamRef::Name(name) if name.starts_with(':') => f.write_str(name),
            ParamRef::Name(name) => write!(f, ":{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Value captured when bound.
    ByValue,
    /// Value read from a [`ParamCell`] at every execution.
    ByReference,
}

#[derive(Debug, Clone)]
enum ValueSource {
    Snapshot(TypedValue),
    Cell(ParamCell),
}

/// One bound parameter.
#[derive(Debug, Clone)]
pub struct Binding {
    declared: ParamType,
    source: ValueSource,
}

impl Binding {
    #[must_use]
    pub fn mode(&self) -> BindMode {
        match self.source {
            ValueSource::Snapshot(_) => BindMode::ByValue,
            ValueSource::Cell(_) => BindMode::ByReference,
        }
    }

    #[must_use]
    pub fn declared_type(&self) -> ParamType {
        self.declared
    }

    /// The value this binding would contribute if resolved now, before coercion.
    #[must_use]
    pub fn current(&self) -> TypedValue {
        match &self.source {
            ValueSource::Snapshot(value) => value.clone(),
            ValueSource::Cell(cell) => cell.get(),
        }
    }
}

/// Bound parameters for one template, resolved into a flat value list at
/// execution time.
#[derive(Debug, Clone)]
pub struct ParameterBinder {
    template: Template,
    bindings: HashMap<ParamRef, Binding>,
    unknown_policy: UnknownPlaceholderPolicy,
}

impl ParameterBinder {
    #[must_use]
    pub fn new(template: Template, unknown_policy: UnknownPlaceholderPolicy) -> Self {
        Self {
            template,
            bindings: HashMap::new(),
            unknown_policy,
        }
    }

    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Bind a snapshot of `value`, replacing any earlier binding for `param`.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::UnknownPlaceholder`] when the template has no
    /// such placeholder and the policy is `Reject`.
    pub fn bind_value(
        &mut self,
        param: impl Into<ParamRef>,
        value: impl Into<TypedValue>,
        declared: ParamType,
    ) -> Result<(), BindingError> {
        self.insert(
            param.into(),
            Binding {
                declared,
                source: ValueSource::Snapshot(value.into()),
            },
        )
    }

    /// Bind a live reference: whatever `cell` holds when the statement executes
    /// is what gets sent.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::UnknownPlaceholder`] when the template has no
    /// such placeholder and the policy is `Reject`.
    pub fn bind_param(
        &mut self,
        param: impl Into<ParamRef>,
        cell: &ParamCell,
        declared: ParamType,
    ) -> Result<(), BindingError> {
        self.insert(
            param.into(),
            Binding {
                declared,
                source: ValueSource::Cell(cell.clone()),
            },
        )
    }

    fn insert(&mut self, param: ParamRef, binding: Binding) -> Result<(), BindingError> {
        let key = param.normalized();
        if !self.declares(&key) {
            return match self.unknown_policy {
                UnknownPlaceholderPolicy::Reject => {
                    Err(BindingError::UnknownPlaceholder(key.to_string()))
                }
                UnknownPlaceholderPolicy::Ignore => {
                    tracing::warn!(placeholder = %key, "ignoring binding for unknown placeholder");
                    Ok(())
                }
            };
        }
        tracing::trace!(placeholder = %key, mode = ?binding.mode(), declared = %binding.declared, "bound parameter");
        self.bindings.insert(key, binding);
        Ok(())
    }

    fn declares(&self, key: &ParamRef) -> bool {
        match (self.template.style(), key) {
            (PlaceholderStyle::Positional, ParamRef::Index(i)) => {
                *i < self.template.placeholder_count()
            }
            (PlaceholderStyle::Named, ParamRef::Name(name)) => self.template.contains_name(name),
            _ => false,
        }
    }

    fn key_for(position_index: usize, name: Option<&str>) -> ParamRef {
        match name {
            Some(name) => ParamRef::Name(name.to_string()),
            None => ParamRef::Index(position_index),
        }
    }

    /// Look up the binding for `param`, if any.
    #[must_use]
    pub fn binding(&self, param: impl Into<ParamRef>) -> Option<&Binding> {
        self.bindings.get(&param.into().normalized())
    }

    #[must_use]
    pub fn has_bindings(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// Forget every binding; the template is kept.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Produce the value list the driver receives, one entry per placeholder
    /// occurrence in template order. Repeated named placeholders repeat their
    /// value; references are read now.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::UnboundPlaceholder`] if any placeholder lacks a
    /// binding, or [`BindingError::TypeMismatch`] if a value cannot be coerced
    /// to its declared type.
    pub fn resolve(&self) -> Result<Vec<TypedValue>, BindingError> {
        let mut values = Vec::with_capacity(self.template.placeholder_count());
        for placeholder in self.template.placeholders() {
            let key = Self::key_for(placeholder.position_index, placeholder.name.as_deref());
            let binding = self
                .bindings
                .get(&key)
                .ok_or_else(|| BindingError::UnboundPlaceholder(placeholder.label()))?;
            let raw = binding.current();
            let value = raw
                .clone()
                .coerce(binding.declared)
                .ok_or_else(|| BindingError::TypeMismatch {
                    placeholder: placeholder.label(),
                    declared: binding.declared,
                    value: raw,
                })?;
            values.push(value);
        }
        Ok(values)
    }

    /// Resolve one-shot execute arguments: each value is bound by value to its
    /// ordinal with its own type, without touching stored bindings.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::ConflictingBinding`] when explicit bindings
    /// exist, [`BindingError::ArgumentsForNamedTemplate`] for named templates
    /// and [`BindingError::ArgumentCount`] when the count differs from the
    /// placeholder count.
    pub fn resolve_args(&self, args: &[TypedValue]) -> Result<Vec<TypedValue>, BindingError> {
        if self.has_bindings() {
            return Err(BindingError::ConflictingBinding);
        }
        if self.template.style() == PlaceholderStyle::Named {
            return Err(BindingError::ArgumentsForNamedTemplate);
        }
        let expected = self.template.placeholder_count();
        if args.len() != expected {
            return Err(BindingError::ArgumentCount {
                expected,
                actual: args.len(),
            });
        }
        Ok(args.to_vec())
    }

    /// Human-readable listing of the template and its bindings.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let sql = self.template.sql();
        let _ = writeln!(out, "SQL: [{}] {sql}", sql.len());
        let _ = writeln!(out, "Params: {}", self.template.placeholder_count());
        for placeholder in self.template.placeholders() {
            let key = Self::key_for(placeholder.position_index, placeholder.name.as_deref());
            match self.bindings.get(&key) {
                Some(binding) => {
                    let mode = match binding.mode() {
                        BindMode::ByValue => "value",
                        BindMode::ByReference => "reference",
                    };
                    let _ = writeln!(
                        out,
                        "Key: {} by {mode} type={} current={}",
                        placeholder.label(),
                        binding.declared,
                        binding.current()
                    );
                }
                None => {
                    let _ = writeln!(out, "Key: {} unbound", placeholder.label());
                }
            }
        }
        out
    }
}
