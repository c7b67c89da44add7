//! Error reporting seam between the parser and its host
//!
//! A parse fails with exactly one [`ParseError`]. Hosts that want to see
//! errors as they happen, rather than only through the returned `Result`,
//! pass a [`Diagnostics`] sink to [`crate::parse_source_with`].

use crate::parser::parse::ParseError;

/// Receiver for parse errors
pub trait Diagnostics {
    fn report(&mut self, error: &ParseError);
}

/// Keeps every reported error in order
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    errors: Vec<ParseError>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&mut self, error: &ParseError) {
        self.errors.push(error.clone());
    }
}

/// Forwards errors to the `tracing` subscriber installed by the host
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&mut self, error: &ParseError) {
        let location = error.location();
        tracing::error!(
            line = location.line,
            column = location.column,
            kind = error.name(),
            "{}",
            error
        );
    }
}
