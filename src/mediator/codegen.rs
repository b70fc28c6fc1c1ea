use std::path::Path;

/// Human-readable language for a file, from its extension
pub fn detect_language(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match ext.as_deref() {
        Some("py") => "Python",
        Some("js") => "JavaScript",
        Some("ts") => "TypeScript",
        Some("html") => "HTML",
        Some("css") => "CSS",
        Some("jsx") => "React (JSX)",
        Some("tsx") => "React (TSX)",
        Some("cpp") => "C++",
        Some("c") => "C",
        Some("java") => "Java",
        Some("cs") => "C#",
        Some("php") => "PHP",
        Some("rb") => "Ruby",
        Some("go") => "Go",
        Some("rs") => "Rust",
        Some("sh") => "Shell script",
        Some("json") => "JSON",
        Some("xml") => "XML",
        Some("sql") => "SQL",
        _ => "code",
    }
}

/// Extension for a bare language name typed at the filename prompt
fn default_extension(language: &str) -> &'static str {
    match language {
        "python" => "py",
        "react" => "jsx",
        "html" => "html",
        "javascript" => "js",
        "typescript" => "ts",
        "java" => "java",
        "c++" => "cpp",
        "c#" => "cs",
        "php" => "php",
        _ => "txt",
    }
}

/// Turn the answer to "what filename?" into a filename.
///
/// Anything with a dot is used as typed. A bare word is lowercased, stripped
/// of spaces and treated as a language name: `python` becomes `python.py`,
/// unknown words get `.txt`. Returns `None` for an empty answer.
pub fn normalize_filename(answer: &str) -> Option<String> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }

    if answer.contains('.') {
        return Some(answer.to_string());
    }

    let name: String = answer.to_lowercase().split_whitespace().collect();
    Some(format!("{}.{}", name, default_extension(&name)))
}

/// Only Python files can be run straight after generation
pub fn run_command_for(filename: &str) -> Option<(&'static str, Vec<String>)> {
    filename
        .ends_with(".py")
        .then(|| ("python3", vec![filename.to_string()]))
}
