pub use hkanno_diagnostics::{Diagnostic, LineIndex, Severity, Span, codes};
