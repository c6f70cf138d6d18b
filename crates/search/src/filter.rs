//! Boolean tag filters in conjunctive normal form.
//!
//! A filter is either a single disjunction of tag terms ([`OrClause`]) or
//! a conjunction of disjunctions ([`AndClause`]). Every combinator is
//! copy-on-write: the receiver is never mutated, and conjoining two
//! conjunctions flattens into one clause list, so a conjunction can never
//! nest. That keeps serialization canonical: one `tag` query parameter per
//! conjunctive clause, terms inside a clause percent-encoded and joined
//! with `" || "`.
//!
//! A term that starts with the exclusion marker `-` is escaped with a
//! leading backslash before any operator is prepended, so literal hyphens
//! in tag text are never confused with negation.

use serde::{Deserialize, Serialize};

/// Marker that negates a tag term.
const EXCLUSION_MARKER: char = '-';

/// Separator between terms of a disjunctive clause.
const OR_SEPARATOR: &str = " || ";

/// Query parameter name carrying tag constraints.
const TAG_PARAM: &str = "tag";

/// Percent-encode a single tag term (form style: space becomes `+`).
pub fn encode(term: &str) -> String {
    form_urlencoded::byte_serialize(term.as_bytes()).collect()
}

/// Escape a literal leading exclusion marker.
fn escape(term: &str) -> String {
    if term.starts_with(EXCLUSION_MARKER) {
        format!("\\{term}")
    } else {
        term.to_string()
    }
}

/// Escape a term and prepend the exclusion marker.
fn negate(term: &str) -> String {
    format!("{EXCLUSION_MARKER}{}", escape(term))
}

// ============================================================================
// Factories
// ============================================================================

/// A filter matching items that carry `tag`.
pub fn filter(tag: &str) -> OrClause {
    OrClause {
        terms: vec![escape(tag)],
    }
}

/// A filter matching items that carry at least one of `tags`.
pub fn any(tags: &[&str]) -> OrClause {
    OrClause {
        terms: tags.iter().map(|t| escape(t)).collect(),
    }
}

/// A filter matching items that carry every one of `tags`.
pub fn all(tags: &[&str]) -> AndClause {
    AndClause {
        clauses: tags
            .iter()
            .map(|t| OrClause {
                terms: vec![escape(t)],
            })
            .collect(),
    }
}

/// A filter matching items that do not carry `tag`.
pub fn not(tag: &str) -> AndClause {
    AndClause {
        clauses: vec![OrClause {
            terms: vec![negate(tag)],
        }],
    }
}

// ============================================================================
// OrClause
// ============================================================================

/// A disjunction of tag terms: matches items carrying any one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrClause {
    terms: Vec<String>,
}

impl OrClause {
    /// The terms of this clause, escaped but not yet percent-encoded.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// A new disjunction with `tag` appended. The receiver is unchanged.
    pub fn or(&self, tag: &str) -> OrClause {
        let mut terms = self.terms.clone();
        terms.push(escape(tag));
        OrClause { terms }
    }

    /// Conjoin `tag` as a fresh singleton clause, promoting this
    /// disjunction into a conjunction.
    pub fn and(&self, tag: &str) -> AndClause {
        self.and_filter(&filter(tag).into())
    }

    /// Conjoin another filter, flattening conjunction operands.
    pub fn and_filter(&self, other: &TagFilter) -> AndClause {
        match other {
            TagFilter::Disjunction(or) => AndClause {
                clauses: vec![self.clone(), or.clone()],
            },
            // Decompose the conjunction rather than nesting it; the
            // receiver stays the leading clause.
            TagFilter::Conjunction(and) => {
                let mut clauses = vec![self.clone()];
                clauses.extend(and.clauses.iter().cloned());
                AndClause { clauses }
            }
        }
    }

    /// Conjoin the negation of `tag`.
    pub fn exclude(&self, tag: &str) -> AndClause {
        self.and_filter(&not(tag).into())
    }

    /// Terms percent-encoded and joined with `" || "`.
    pub fn value(&self) -> String {
        self.terms
            .iter()
            .map(|t| encode(t))
            .collect::<Vec<_>>()
            .join(OR_SEPARATOR)
    }

    /// The clause rendered as a `tag=...` parameter string.
    pub fn build_parameters(&self) -> String {
        format!("{TAG_PARAM}={}", self.value())
    }
}

// ============================================================================
// AndClause
// ============================================================================

/// A conjunction of disjunctive clauses: matches items satisfying all of
/// them. Structurally flat: members are always disjunctions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndClause {
    clauses: Vec<OrClause>,
}

impl AndClause {
    /// The disjunctive clauses of this conjunction.
    pub fn clauses(&self) -> &[OrClause] {
        &self.clauses
    }

    /// A new conjunction with `tag` appended as a singleton clause.
    pub fn and(&self, tag: &str) -> AndClause {
        self.and_filter(&filter(tag).into())
    }

    /// A new conjunction extended with another filter. Conjoining two
    /// conjunctions concatenates their clause lists.
    pub fn and_filter(&self, other: &TagFilter) -> AndClause {
        let mut clauses = self.clauses.clone();
        match other {
            TagFilter::Disjunction(or) => clauses.push(or.clone()),
            TagFilter::Conjunction(and) => clauses.extend(and.clauses.iter().cloned()),
        }
        AndClause { clauses }
    }

    /// A new conjunction with the negation of `tag` appended.
    pub fn exclude(&self, tag: &str) -> AndClause {
        AndClause {
            clauses: self
                .clauses
                .iter()
                .cloned()
                .chain(std::iter::once(OrClause {
                    terms: vec![negate(tag)],
                }))
                .collect(),
        }
    }

    /// One `("tag", value)` pair per clause, in order.
    pub fn query_params(&self) -> Vec<(String, String)> {
        self.clauses
            .iter()
            .map(|c| (TAG_PARAM.to_string(), c.value()))
            .collect()
    }

    /// The conjunction rendered as repeated `tag=...` parameters joined
    /// with `&`.
    pub fn build_parameters(&self) -> String {
        self.clauses
            .iter()
            .map(OrClause::build_parameters)
            .collect::<Vec<_>>()
            .join("&")
    }
}

// ============================================================================
// TagFilter
// ============================================================================

/// A tag constraint in conjunctive normal form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagFilter {
    /// A single disjunctive clause.
    Disjunction(OrClause),
    /// A conjunction of disjunctive clauses.
    Conjunction(AndClause),
}

impl TagFilter {
    /// Conjoin `tag` onto this filter.
    pub fn and(&self, tag: &str) -> TagFilter {
        match self {
            TagFilter::Disjunction(or) => or.and(tag).into(),
            TagFilter::Conjunction(and) => and.and(tag).into(),
        }
    }

    /// Conjoin another filter onto this one.
    pub fn and_filter(&self, other: &TagFilter) -> TagFilter {
        match self {
            TagFilter::Disjunction(or) => or.and_filter(other).into(),
            TagFilter::Conjunction(and) => and.and_filter(other).into(),
        }
    }

    /// Conjoin the negation of `tag` onto this filter.
    pub fn exclude(&self, tag: &str) -> TagFilter {
        match self {
            TagFilter::Disjunction(or) => or.exclude(tag).into(),
            TagFilter::Conjunction(and) => and.exclude(tag).into(),
        }
    }

    /// One `("tag", value)` pair per conjunctive clause.
    pub fn query_params(&self) -> Vec<(String, String)> {
        match self {
            TagFilter::Disjunction(or) => vec![(TAG_PARAM.to_string(), or.value())],
            TagFilter::Conjunction(and) => and.query_params(),
        }
    }

    /// The filter rendered as a parameter string.
    pub fn build_parameters(&self) -> String {
        match self {
            TagFilter::Disjunction(or) => or.build_parameters(),
            TagFilter::Conjunction(and) => and.build_parameters(),
        }
    }

    /// Number of conjunctive clauses.
    pub fn clause_count(&self) -> usize {
        match self {
            TagFilter::Disjunction(_) => 1,
            TagFilter::Conjunction(and) => and.clauses.len(),
        }
    }
}

impl From<OrClause> for TagFilter {
    fn from(clause: OrClause) -> Self {
        TagFilter::Disjunction(clause)
    }
}

impl From<AndClause> for TagFilter {
    fn from(clause: AndClause) -> Self {
        TagFilter::Conjunction(clause)
    }
}
