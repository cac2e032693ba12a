//! Route table and lookup.
//!
//! # Responsibilities
//! - Store routes per (template, method)
//! - Look up the entry for a request method and path
//! - Return matched entry or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First registration of a (template, method) pair wins
//! - Templates kept in registration order for deterministic matching
//! - Generic over the entry type so the table knows nothing about handlers

use std::collections::HashMap;

use axum::http::Method;

use crate::routing::matcher::{match_path, Params, RouteTemplate};

/// Outcome of inserting a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The entry was stored.
    Added,
    /// An entry for the same template and method already exists; kept as is.
    Duplicate,
}

/// A successful lookup.
#[derive(Debug)]
pub struct Resolved<'a, E> {
    pub template: &'a RouteTemplate,
    pub entry: &'a E,
    pub params: Params,
}

/// Mapping from route template to per-method entries.
#[derive(Debug)]
pub struct RouteTable<E> {
    routes: Vec<(RouteTemplate, HashMap<Method, E>)>,
}

impl<E> Default for RouteTable<E> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<E> RouteTable<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry` for `method` on `template`.
    pub fn insert(&mut self, template: RouteTemplate, method: Method, entry: E) -> Registration {
        let idx = match self.routes.iter().position(|(t, _)| *t == template) {
            Some(idx) => idx,
            None => {
                self.routes.push((template, HashMap::new()));
                self.routes.len() - 1
            }
        };

        let methods = &mut self.routes[idx].1;
        if methods.contains_key(&method) {
            return Registration::Duplicate;
        }
        methods.insert(method, entry);
        Registration::Added
    }

    /// Registered templates in registration order.
    pub fn templates(&self) -> impl Iterator<Item = &RouteTemplate> {
        self.routes.iter().map(|(t, _)| t)
    }

    /// Find the entry for `method` on the template matching `path`.
    ///
    /// A path recognized by a template that has no entry for `method` is a
    /// miss, same as an unrecognized path.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<Resolved<'_, E>> {
        let matched = match_path(self.templates(), path)?;
        let (template, methods) = self
            .routes
            .iter()
            .find(|(t, _)| std::ptr::eq(t, matched.template))?;
        let entry = methods.get(method)?;

        Some(Resolved {
            template,
            entry,
            params: matched.params,
        })
    }

    /// Total number of (template, method) entries.
    pub fn len(&self) -> usize {
        self.routes.iter().map(|(_, m)| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
