//! Prompt templates for every request the assistant makes.

use crate::llm::client::GenerationRequest;
use std::path::Path;

/// Characters of page text sent for summarization
pub const SUMMARY_INPUT_CHARS: usize = 3000;

/// One raw shell command for a plain-English instruction
pub fn shell_command(description: &str, cwd: &Path) -> GenerationRequest {
    GenerationRequest::new(description)
        .with_system(format!(
            "You are an advanced Linux shell expert. Your job is to read a human's plain English \
             instruction and convert it into a safe, accurate bash command ONLY. Do not explain. \
             No markdown. No comments. Only the raw command, on a single line. \
             Assume the user is currently in this path: {}",
            cwd.display()
        ))
        .with_max_tokens(256)
}

pub fn generate_code(request: &str, filename: &str, language: &str) -> GenerationRequest {
    GenerationRequest::new(format!(
        "{}\n\nWrite valid code that belongs in the file: {}.",
        request.trim(),
        filename
    ))
    .with_system(format!(
        "You are an expert {} developer. Generate code based on the user's request. \
         Use best practices for that language. Be complete but concise. \
         Respond with only the code, no explanations.",
        language
    ))
    .with_max_tokens(8192)
}

pub fn refactor(task: &str, content: &str) -> GenerationRequest {
    GenerationRequest::new(format!(
        "{}\n\nRefactor the following file content accordingly:\n\n{}",
        task.trim(),
        content
    ))
    .with_system(
        "You are an expert developer. Respond with the complete new file content only, \
         no explanations.",
    )
    .with_max_tokens(8192)
}

/// `request` is the operator's own wording, e.g. "what does this loop do"
pub fn explain_code(request: Option<&str>, code: &str) -> GenerationRequest {
    let prompt = match request {
        Some(request) => format!("{}\n\n{}", request, code),
        None => code.to_string(),
    };
    GenerationRequest::new(prompt).with_system(
        "You're an expert programming mentor. Explain the following code line-by-line, \
         clearly and simply for beginners.",
    )
}

pub fn explain_failure(command: &str, output: &str) -> GenerationRequest {
    GenerationRequest::new(format!("Command: {}\n\nOutput:\n{}", command, output)).with_system(
        "You are a helpful coding assistant. Analyze the following command output and \
         explain any errors. Suggest concrete fixes if needed.",
    )
}

pub fn summarize_page(text: &str) -> GenerationRequest {
    let excerpt: String = text.chars().take(SUMMARY_INPUT_CHARS).collect();
    GenerationRequest::new(excerpt)
        .with_system("Summarize this page for a tech-savvy user.")
        .with_max_tokens(512)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_prompt_carries_cwd() {
        let request = shell_command("list files here", Path::new("/home/ray/projects"));
        assert_eq!(request.prompt, "list files here");
        let system = request.system.unwrap();
        assert!(system.contains("/home/ray/projects"));
        assert!(system.contains("Only the raw command"));
    }

    #[test]
    fn test_generate_code_prompt() {
        let request = generate_code("write a todo app", "app.jsx", "React (JSX)");
        assert!(request.prompt.contains("app.jsx"));
        assert!(request.system.unwrap().contains("React (JSX)"));
    }

    #[test]
    fn test_explain_prompt_keeps_operator_wording() {
        let request = explain_code(Some("what does this loop do"), "for i in x: pass");
        assert_eq!(request.prompt, "what does this loop do\n\nfor i in x: pass");
        assert_eq!(explain_code(None, "x = 1").prompt, "x = 1");
    }

    #[test]
    fn test_summary_input_is_truncated() {
        let text = "é".repeat(SUMMARY_INPUT_CHARS + 100);
        let request = summarize_page(&text);
        assert_eq!(request.prompt.chars().count(), SUMMARY_INPUT_CHARS);
    }
}
