// Diagnostic system for the embedding-depth analyzer
// Turns violations, rewrite markers and engine errors into readable reports

use colored::Colorize;
use serde::Serialize;
use std::fmt;

/// What a diagnostic is about: a type, optionally one of its members,
/// and the embedding chain that led there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
}

impl Subject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            member: None,
            chain: Vec::new(),
        }
    }

    pub fn member(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            member: Some(member.into()),
            chain: Vec::new(),
        }
    }

    pub fn with_chain(mut self, chain: Vec<String>) -> Self {
        self.chain = chain;
        self
    }

    /// Subject for diagnostics that concern the whole graph
    pub fn graph() -> Self {
        Self::new("<graph>")
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{}.{}", self.type_name, member),
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// Severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLevel {
    Error,
    Warning,
    Info,
    Note,
    Help,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorLevel::Error => write!(f, "{}", "error".red().bold()),
            ErrorLevel::Warning => write!(f, "{}", "warning".yellow().bold()),
            ErrorLevel::Info => write!(f, "{}", "info".blue().bold()),
            ErrorLevel::Note => write!(f, "{}", "note".cyan().bold()),
            ErrorLevel::Help => write!(f, "{}", "help".green().bold()),
        }
    }
}

/// Structured diagnostic message
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub level: ErrorLevel,
    pub code: String, // e.g. "W0101" for an embedding chain over the limit
    pub message: String,
    pub subject: Subject,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

/// Suggested replacement for the subject (a type or member name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub message: String,
    pub replacement: String,
}

impl Diagnostic {
    pub fn new(level: ErrorLevel, code: &str, message: String, subject: Subject) -> Self {
        Self {
            level,
            code: code.to_string(),
            message,
            subject,
            notes: Vec::new(),
            help: None,
            suggestion: None,
        }
    }

    pub fn error(code: &str, message: String, subject: Subject) -> Self {
        Self::new(ErrorLevel::Error, code, message, subject)
    }

    pub fn warning(code: &str, message: String, subject: Subject) -> Self {
        Self::new(ErrorLevel::Warning, code, message, subject)
    }

    pub fn info(code: &str, message: String, subject: Subject) -> Self {
        Self::new(ErrorLevel::Info, code, message, subject)
    }

    pub fn note(message: String, subject: Subject) -> Self {
        Self::new(ErrorLevel::Note, "", message, subject)
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    pub fn with_suggestion(mut self, message: String, replacement: String) -> Self {
        self.suggestion = Some(Suggestion {
            message,
            replacement,
        });
        self
    }

    /// Format the diagnostic in compiler style:
    ///
    /// ```text
    /// warning[W0101]: embedding depth 2 exceeds the limit of 1
    ///  --> Camion
    ///   | Camion -> Auto -> Vehiculo
    ///  = note ...
    /// ```
    pub fn format(&self) -> String {
        let mut output = String::new();

        // Header: warning[W0101]: message
        if self.code.is_empty() {
            output.push_str(&format!("{}: {}\n", self.level, self.message.bold()));
        } else {
            output.push_str(&format!(
                "{}[{}]: {}\n",
                self.level,
                self.code,
                self.message.bold()
            ));
        }

        output.push_str(&format!(" {} {}\n", "-->".cyan().bold(), self.subject));

        if !self.subject.chain.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                "|".cyan().bold(),
                self.subject.chain.join(" -> ")
            ));
        }

        for note in &self.notes {
            output.push_str(&format!(" {} {}\n", "=".cyan().bold(), note.cyan()));
        }

        if let Some(help) = &self.help {
            output.push_str(&format!(" {} {}\n", "help:".green().bold(), help));
        }

        if let Some(suggestion) = &self.suggestion {
            output.push_str(&format!(
                " {} {}: `{}`\n",
                "help:".green().bold(),
                suggestion.message,
                suggestion.replacement.green()
            ));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// Diagnostic collection and reporting engine
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    info_count: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    diagnostics: &'a [Diagnostic],
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            ErrorLevel::Error => self.error_count += 1,
            ErrorLevel::Warning => self.warning_count += 1,
            ErrorLevel::Info => self.info_count += 1,
            _ => {}
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn emit_all(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }

    pub fn emit_error(&mut self, code: &str, message: String, subject: Subject) {
        self.emit(Diagnostic::error(code, message, subject));
    }

    pub fn emit_warning(&mut self, code: &str, message: String, subject: Subject) {
        self.emit(Diagnostic::warning(code, message, subject));
    }

    pub fn emit_info(&mut self, code: &str, message: String, subject: Subject) {
        self.emit(Diagnostic::info(code, message, subject));
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn info_count(&self) -> usize {
        self.info_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Print all diagnostics to stderr
    pub fn print_all(&self) {
        for diag in &self.diagnostics {
            eprintln!("{}", diag.format());
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        if self.error_count > 0 {
            eprintln!(
                "\n{}: {} error{} emitted",
                "error".red().bold(),
                self.error_count,
                if self.error_count == 1 { "" } else { "s" }
            );
        }

        if self.warning_count > 0 {
            eprintln!(
                "{}: {} warning{} emitted",
                "warning".yellow().bold(),
                self.warning_count,
                if self.warning_count == 1 { "" } else { "s" }
            );
        }

        if self.info_count > 0 {
            eprintln!(
                "{}: {} info message{} emitted",
                "info".blue().bold(),
                self.info_count,
                if self.info_count == 1 { "" } else { "s" }
            );
        }
    }

    /// Export diagnostics as JSON for external printers
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&JsonReport {
            diagnostics: &self.diagnostics,
        })
    }

    /// Clear all diagnostics
    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
        self.info_count = 0;
    }
}

/// Diagnostic codes
pub mod error_codes {
    // Graph errors (E0001-E0099)
    pub const CYCLIC_EMBEDDING: &str = "E0391";
    pub const UNKNOWN_TYPE: &str = "E0412";
    pub const DUPLICATE_TYPE: &str = "E0428";
    pub const DUPLICATE_MEMBER: &str = "E0124";
    pub const MISSING_EMBEDDING: &str = "E0433";

    // Rewrite errors (E0900-E0999)
    pub const PLAN_UNSOUND: &str = "E0901";

    // Warnings (W0101-W0199)
    pub const DEPTH_EXCEEDED: &str = "W0101";
    pub const AMBIGUOUS_RESOLUTION: &str = "W0102";
    pub const MANUAL_RESOLUTION_REQUIRED: &str = "W0103";
    pub const LEFT_UNFLATTENED: &str = "W0104";

    // Info messages (I0101-I0199)
    pub const AMBIGUITY_AUTO_RESOLVED: &str = "I0101";
    pub const TYPE_SYNTHESIZED: &str = "I0102";
    pub const EMBEDDING_REPLACED: &str = "I0103";
    pub const EMBEDDING_REMOVED: &str = "I0104";
}

/// Fuzzy matching utilities for "did you mean?" suggestions
pub mod fuzzy {
    use strsim::jaro_winkler;

    /// Find similar names using Jaro-Winkler similarity.
    /// Returns up to `max_suggestions` names scoring above `threshold`, best first.
    pub fn find_similar_names<S: AsRef<str>>(
        target: &str,
        candidates: &[S],
        threshold: f64,
        max_suggestions: usize,
    ) -> Vec<String> {
        let mut scored: Vec<(String, f64)> = candidates
            .iter()
            .map(|candidate| {
                let candidate = candidate.as_ref();
                (candidate.to_string(), jaro_winkler(target, candidate))
            })
            .filter(|(_, score)| *score > threshold)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored
            .into_iter()
            .take(max_suggestions)
            .map(|(name, _)| name)
            .collect()
    }

    /// Type names similar to `target`, using the default threshold
    pub fn find_similar_types<S: AsRef<str>>(target: &str, candidates: &[S]) -> Vec<String> {
        find_similar_names(target, candidates, 0.8, 3)
    }
}
