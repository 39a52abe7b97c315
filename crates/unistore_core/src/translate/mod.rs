//! Predicate translation.
//!
//! Turns a clause's where tree into the active backend's native filter. The
//! result pairs the rendered filter text with the compiled [`MatchProgram`]
//! in-process backends evaluate; both derive from the same tree, so every
//! dialect yields the same logical row set.

mod document;
mod predicate;
mod program;
mod table;

pub use program::MatchProgram;

use crate::error::CoreResult;
use unistore_model::{EntitySchema, PropertyBag, QueryClause};
use unistore_storage::{FilterDialect, RowFilter};

/// A translated predicate: rendered native text plus the evaluable program.
#[derive(Debug, Clone)]
pub struct TranslatedQuery {
    text: String,
    program: MatchProgram,
}

impl TranslatedQuery {
    /// The filter rendered in the target dialect.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl RowFilter for TranslatedQuery {
    fn matches(&self, bag: &PropertyBag) -> bool {
        self.program.matches(bag)
    }

    fn native_text(&self) -> &str {
        &self.text
    }
}

/// Translates a built clause into the given backend dialect.
///
/// The clause must not be the no-op query; the store short-circuits that
/// case before translation.
pub fn translate(
    clause: &QueryClause,
    schema: &EntitySchema,
    dialect: FilterDialect,
) -> CoreResult<TranslatedQuery> {
    let text = match dialect {
        FilterDialect::Predicate => predicate::render(clause),
        FilterDialect::DocumentSql => document::render(clause),
        FilterDialect::TableFilter => table::render(clause, schema),
    };
    Ok(TranslatedQuery {
        text,
        program: MatchProgram::compile(clause),
    })
}
