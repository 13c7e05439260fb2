use derive_more::Display;
use serde::Serialize;
use std::fmt;

///
/// Severity
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Severity {
    #[display("info")]
    Info,
    #[display("warning")]
    Warning,
    #[display("error")]
    Error,
}

///
/// DiagnosticCode
///
/// Stable identifiers so tooling can filter diagnostics by category.
/// Codes never change meaning once released.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[remain::sorted]
pub enum DiagnosticCode {
    #[display("MF0301")]
    AmbiguousMethodOverload,
    #[display("MF0203")]
    ConflictingDirective,
    #[display("MF0201")]
    ConflictingStrategy,
    #[display("MF0104")]
    ConflictingTargetName,
    #[display("MF0006")]
    DuplicateMapping,
    #[display("MF0602")]
    ExpressionOmission,
    #[display("MF0202")]
    IncompatibleStrategyNullability,
    #[display("MF9000")]
    InternalError,
    #[display("MF0502")]
    InvalidDelegate,
    #[display("MF0101")]
    LeftoverDestinationProperty,
    #[display("MF0302")]
    MethodNotFound,
    #[display("MF0204")]
    MisplacedDirective,
    #[display("MF0501")]
    MissingDelegateResolution,
    #[display("MF0001")]
    NoParameterlessConstructor,
    #[display("MF0005")]
    NoPropertyMappings,
    #[display("MF0401")]
    NullabilityMismatch,
    #[display("MF0303")]
    ParameterCollision,
    #[display("MF0105")]
    PropertyPathInvalid,
    #[display("MF0102")]
    UnclaimedSourceProperty,
    #[display("MF0103")]
    UnknownIgnoredTarget,
    #[display("MF0601")]
    UnresolvableProperty,
    #[display("MF0002")]
    UnresolvedDirectiveType,
}

impl DiagnosticCode {
    /// Severity a code is raised with unless a call site says otherwise.
    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::ExpressionOmission => Severity::Info,
            Self::MisplacedDirective => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

///
/// Location
///
/// Where a diagnostic points: the declaring type and, when known, the
/// property (or dotted property path) inside it.
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Location {
    pub type_path: String,
    pub property: Option<String>,
}

impl Location {
    #[must_use]
    pub fn ty(type_path: impl Into<String>) -> Self {
        Self {
            type_path: type_path.into(),
            property: None,
        }
    }

    #[must_use]
    pub fn property(type_path: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            type_path: type_path.into(),
            property: Some(property.into()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(property) => write!(f, "{}.{property}", self.type_path),
            None => write!(f, "{}", self.type_path),
        }
    }
}

///
/// Diagnostic
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    #[must_use]
    pub fn new(code: DiagnosticCode, location: Location, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            message: message.into(),
            location,
        }
    }

    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} ({})",
            self.severity, self.code, self.message, self.location
        )
    }
}

///
/// Diagnostics
///
/// Ordered accumulator; insertion order is preserved so output stays stable.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.0.extend(other);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    #[must_use]
    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.0.iter().any(|d| d.code == code)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.is_error())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Push a formatted diagnostic onto a `Diagnostics` accumulator.
#[macro_export]
macro_rules! diag {
    ($diags:expr, $code:ident, $location:expr, $($arg:tt)*) => {
        $diags.push($crate::diagnostic::Diagnostic::new(
            $crate::diagnostic::DiagnosticCode::$code,
            $location,
            format!($($arg)*),
        ))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_render_as_stable_identifiers() {
        assert_eq!(DiagnosticCode::LeftoverDestinationProperty.to_string(), "MF0101");
        assert_eq!(DiagnosticCode::NullabilityMismatch.to_string(), "MF0401");
        assert_eq!(DiagnosticCode::MissingDelegateResolution.to_string(), "MF0501");
    }

    #[test]
    fn codes_do_not_follow_declaration_order() {
        assert_eq!(DiagnosticCode::ConflictingDirective.to_string(), "MF0203");
        assert_eq!(DiagnosticCode::ConflictingStrategy.to_string(), "MF0201");
        assert_eq!(DiagnosticCode::UnresolvableProperty.to_string(), "MF0601");
        assert_eq!(DiagnosticCode::UnresolvedDirectiveType.to_string(), "MF0002");
    }

    #[test]
    fn info_and_warning_do_not_count_as_errors() {
        let mut diags = Diagnostics::new();
        diag!(diags, ExpressionOmission, Location::ty("a::A"), "omitted");
        diag!(diags, MisplacedDirective, Location::ty("a::A"), "misplaced");

        assert!(!diags.has_errors());

        diag!(diags, NullabilityMismatch, Location::property("a::A", "name"), "bad");
        assert!(diags.has_errors());
        assert_eq!(diags.errors().count(), 1);
    }

    #[test]
    fn display_includes_code_and_location() {
        let diagnostic = Diagnostic::new(
            DiagnosticCode::LeftoverDestinationProperty,
            Location::property("dto::PersonDto", "age"),
            "destination property 'age' is not mapped",
        );

        assert_eq!(
            diagnostic.to_string(),
            "error MF0101: destination property 'age' is not mapped (dto::PersonDto.age)"
        );
    }
}
