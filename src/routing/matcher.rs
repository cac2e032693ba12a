//! Route template parsing and path matching.
//!
//! # Responsibilities
//! - Parse endpoint templates such as `/api/users/:id`
//! - Match a request path against the registered templates
//! - Bind `:name` segments to the positional path segments
//!
//! # Design Decisions
//! - Segment count must match exactly (no wildcards or catch-alls)
//! - A literal template equal to the path always wins
//! - Otherwise the first parameterized template in registration order wins
//! - Literal segments are compared positionally, case-sensitive
//! - No regex to guarantee O(n) matching

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Path parameters extracted from a request path.
pub type Params = HashMap<String, String>;

/// Error raised when a template cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("route template {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("route template {template:?} has an unnamed parameter segment")]
    EmptyParamName { template: String },

    #[error("route template {template:?} repeats parameter {name:?}")]
    DuplicateParam { template: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed endpoint template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Parse a template. Segments beginning with `:` are parameters.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TemplateError> {
        let raw = raw.into();
        if !raw.starts_with('/') {
            return Err(TemplateError::MissingLeadingSlash(raw));
        }

        let mut segments = Vec::new();
        for part in raw.split('/') {
            match part.strip_prefix(':') {
                Some("") => {
                    return Err(TemplateError::EmptyParamName { template: raw });
                }
                Some(name) => {
                    if segments.contains(&Segment::Param(name.to_string())) {
                        let name = name.to_string();
                        return Err(TemplateError::DuplicateParam { template: raw.clone(), name });
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(part.to_string())),
            }
        }

        Ok(Self { raw, segments })
    }

    /// The template exactly as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of `/`-delimited segments, including the leading empty one.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// True if the template has no parameter segments.
    pub fn is_literal(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Bind this template against already-split path segments.
    fn bind(&self, parts: &[&str]) -> Option<Params> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(expected) if expected != part => return None,
                Segment::Literal(_) => {}
                Segment::Param(name) => {
                    params.insert(name.clone(), (*part).to_string());
                }
            }
        }
        Some(params)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Result of a successful match. One per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<'a> {
    /// The template that recognized the path.
    pub template: &'a RouteTemplate,
    /// Parameter bindings by name.
    pub params: Params,
}

/// Match `path` against `templates`, given in registration order.
pub fn match_path<'a, I>(templates: I, path: &str) -> Option<MatchResult<'a>>
where
    I: IntoIterator<Item = &'a RouteTemplate>,
{
    let parts: Vec<&str> = path.split('/').collect();
    let mut first_param: Option<MatchResult<'a>> = None;

    for template in templates {
        if template.segment_count() != parts.len() {
            continue;
        }
        let Some(params) = template.bind(&parts) else {
            continue;
        };
        if template.is_literal() {
            return Some(MatchResult { template, params });
        }
        if first_param.is_none() {
            first_param = Some(MatchResult { template, params });
        }
    }

    first_param
}
