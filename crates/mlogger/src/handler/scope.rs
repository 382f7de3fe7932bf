//! Attributes and groups accumulated through `with_attrs`/`with_group`

use crate::{Attr, Record};

/// An attribute together with the groups that were open when it was added
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedAttr {
    pub groups: Vec<String>,
    pub attr: Attr,
}

/// Pre-attached attributes and currently open groups of a handler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    groups: Vec<String>,
    attrs: Vec<ScopedAttr>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this scope with `attrs` qualified by the open groups
    pub fn with_attrs(&self, attrs: &[Attr]) -> Self {
        let mut scope = self.clone();
        scope.attrs.extend(attrs.iter().map(|attr| ScopedAttr {
            groups: self.groups.clone(),
            attr: attr.clone(),
        }));
        scope
    }

    /// Copy of this scope with group `name` opened; an empty name changes nothing
    pub fn with_group(&self, name: &str) -> Self {
        let mut scope = self.clone();
        if !name.is_empty() {
            scope.groups.push(name.to_string());
        }
        scope
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn attrs(&self) -> &[ScopedAttr] {
        &self.attrs
    }

    /// Attributes in output order: pre-attached ones first, then the record's
    /// own attributes under the currently open groups
    pub fn resolve<'a>(
        &'a self,
        record: &'a Record,
    ) -> impl Iterator<Item = (&'a [String], &'a Attr)> + 'a {
        self.attrs
            .iter()
            .map(|scoped| (scoped.groups.as_slice(), &scoped.attr))
            .chain(
                record
                    .attrs()
                    .iter()
                    .map(move |attr| (self.groups.as_slice(), attr)),
            )
    }
}
