use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use fractus_core::{FractusError, FractusResult};

use crate::ast::Expression;
use crate::lexer::TokenKind;

/// A user variable bound to the uniform slot `u<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserVariable {
    pub id: usize,
    pub real: f32,
    pub imag: f32,
}

impl UserVariable {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            real: 0.0,
            imag: 0.0,
        }
    }
}

/// Free identifiers of the current formulas, ordered by slot id.
///
/// Values are addressed by name so they survive recompiles that renumber
/// the slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableTable {
    entries: IndexMap<String, UserVariable>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&UserVariable> {
        self.entries.get(name)
    }

    /// Entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UserVariable)> {
        self.entries.iter().map(|(name, var)| (name.as_str(), var))
    }

    pub fn set_value(&mut self, name: &str, real: f32, imag: f32) -> FractusResult<()> {
        let var = self
            .entries
            .get_mut(name)
            .ok_or_else(|| FractusError::UnknownVariable(name.to_string()))?;
        var.real = real;
        var.imag = imag;
        Ok(())
    }

    /// Re-derive the table from the initial-value and iteration-step trees.
    ///
    /// Ids follow first occurrence across `initial` then `step`. Surviving
    /// names keep their values, new names start at zero, vanished names are
    /// dropped.
    pub fn reconcile(&mut self, initial: &Expression, step: &Expression) -> FractusResult<()> {
        let mut fresh: IndexMap<String, usize> = IndexMap::new();
        collect_identifiers(initial, &mut fresh)?;
        collect_identifiers(step, &mut fresh)?;

        for (name, id) in &fresh {
            self.entries
                .entry(name.clone())
                .and_modify(|var| var.id = *id)
                .or_insert_with(|| UserVariable::new(*id));
        }
        self.entries.retain(|name, _| fresh.contains_key(name));
        self.entries.sort_by(|_, a, _, b| a.id.cmp(&b.id));

        tracing::debug!(
            "variable table: {}",
            self.iter()
                .map(|(name, var)| format!("{}=u{}", name, var.id))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(())
    }
}

fn collect_identifiers(expr: &Expression, fresh: &mut IndexMap<String, usize>) -> FractusResult<()> {
    match expr {
        Expression::Unary { inner, .. } => collect_identifiers(inner, fresh),
        Expression::Binary { left, right, .. } => {
            collect_identifiers(left, fresh)?;
            collect_identifiers(right, fresh)
        }
        Expression::Literal { .. } => Ok(()),
        Expression::Variable { identifier } => {
            if identifier.kind == TokenKind::Identifier && !fresh.contains_key(identifier.text()) {
                let id = fresh.len();
                fresh.insert(identifier.text().to_string(), id);
            }
            Ok(())
        }
        Expression::ParseError { message } => Err(FractusError::parse(
            message.clone(),
            "variable allocation",
        )),
    }
}
