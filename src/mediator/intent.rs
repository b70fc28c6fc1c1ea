use regex::Regex;
use std::sync::LazyLock;

/// Verbs that turn a line into a code-generation request
pub const CODEGEN_VERBS: &[&str] = &["write", "create", "generate"];

/// Phrases that ask for a code explanation
pub const EXPLAIN_TRIGGERS: &[&str] = &[
    "what does this do",
    "explain this",
    "analyze",
    "line by line",
    "describe this code",
    "can you explain",
    "break this down",
];

/// Prefix that marks a literal shell command
pub const DIRECT_PREFIX: char = '!';

static REFACTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*refactor\s+(.+?)\s+to\s+(.+?)\s*$").expect("refactor pattern is valid")
});

static CODE_CUES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?m)^\s*def\s",
        r"(?m)^\s*import\s",
        r"(?m)^\s*class\s",
        r"\):",
        r"(?m)^\s*for\s",
        r"(?m)^\s*while\s",
        r"(?m)^\s*if\s",
        r"(?m)^\s*try\s",
        r"(?m)^\s*print\(",
        r"=\s*lambda",
        r"(?m)^\s*@\w+",
        r"(?m)^\s*#",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("code cue pattern is valid"))
    .collect()
});

/// What the operator is asking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellRequest {
    /// Plain English to be turned into a command by the model
    Describe(String),
    /// A command typed after `!`, used as-is
    Direct(String),
}

/// A closed set of intents, produced by [`classify`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedIntent {
    ShellCommand(ShellRequest),
    ExplainRequest { request: String },
    CodeGenerationRequest {
        description: String,
        filename: Option<String>,
    },
    RefactorRequest { filename: String, task: String },
    PastedCodeBlock { code: String },
}

/// Classify one line of operator input.
///
/// Rules are tried in this order and the first match wins:
///
/// 1. leading `!`: a literal shell command
/// 2. starts with `write`, `create` or `generate`: code generation. With an
///    ` in ` clause the text is split at the last ` in ` into description
///    and filename.
/// 3. `refactor <file> to <task>`: refactor request
/// 4. looks like source code: pasted code block
/// 5. contains an explanation phrase: explain request
/// 6. anything else: a description for the model to turn into a command
///
/// Code-generation and code-snippet checks run before the explanation and
/// shell fallbacks because they are the more specific signals.
pub fn classify(utterance: &str) -> ClassifiedIntent {
    let text = utterance.trim();
    let lower = text.to_lowercase();

    if let Some(command) = text.strip_prefix(DIRECT_PREFIX) {
        return ClassifiedIntent::ShellCommand(ShellRequest::Direct(command.trim().to_string()));
    }

    if CODEGEN_VERBS.iter().any(|verb| lower.starts_with(verb)) {
        return match text.rsplit_once(" in ") {
            Some((description, filename)) => ClassifiedIntent::CodeGenerationRequest {
                description: description.to_string(),
                filename: Some(filename.trim().to_string()),
            },
            None => ClassifiedIntent::CodeGenerationRequest {
                description: text.to_string(),
                filename: None,
            },
        };
    }

    if let Some(caps) = REFACTOR.captures(text) {
        return ClassifiedIntent::RefactorRequest {
            filename: caps[1].trim().to_string(),
            task: caps[2].trim().to_string(),
        };
    }

    if looks_like_code(text) {
        return ClassifiedIntent::PastedCodeBlock {
            code: text.to_string(),
        };
    }

    if is_explanation_request(&lower) {
        return ClassifiedIntent::ExplainRequest {
            request: text.to_string(),
        };
    }

    ClassifiedIntent::ShellCommand(ShellRequest::Describe(text.to_string()))
}

/// Source-code syntax cues: keywords at line start, decorators, comments
pub fn looks_like_code(text: &str) -> bool {
    CODE_CUES.iter().any(|cue| cue.is_match(text))
}

pub fn is_explanation_request(text: &str) -> bool {
    let lower = text.to_lowercase();
    EXPLAIN_TRIGGERS.iter().any(|trigger| lower.contains(trigger))
}
