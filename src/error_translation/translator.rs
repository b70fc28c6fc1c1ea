use crate::error::AppError;
use crate::llm::LLMError;
use crate::mediator::GenerationError;
use crate::shell::ExecError;

#[derive(Debug, Clone)]
pub struct UserFriendlyError {
    pub simple_message: String,
    pub suggestion: Option<String>,
    pub raw_error: String,
}

pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Translate an AppError into a user-friendly error message
    pub fn translate_app_error(error: &AppError) -> UserFriendlyError {
        match error {
            AppError::Llm(llm_err) => Self::translate_llm(llm_err),
            AppError::Generation(gen_err) => Self::translate_generation(gen_err),
            AppError::Exec(exec_err) => Self::translate_exec(exec_err),
            AppError::Config(config_err) => UserFriendlyError {
                simple_message: "Configuration error occurred.".to_string(),
                suggestion: Some("Check your config file at ~/.config/rayi/config.toml".to_string()),
                raw_error: config_err.to_string(),
            },
            AppError::Daemon(daemon_err) => UserFriendlyError {
                simple_message: "The trigger-file daemon hit a problem.".to_string(),
                suggestion: Some("Check that the trigger file is readable and writable".to_string()),
                raw_error: daemon_err.to_string(),
            },
            AppError::Scan(scan_err) => UserFriendlyError {
                simple_message: "Port scan could not run.".to_string(),
                suggestion: Some("Install nmap, rustscan or masscan and make sure it is on PATH".to_string()),
                raw_error: scan_err.to_string(),
            },
            AppError::Search(search_err) => UserFriendlyError {
                simple_message: "Web search failed.".to_string(),
                suggestion: Some("Check your network connection and try again".to_string()),
                raw_error: search_err.to_string(),
            },
            AppError::Io(io_err) => UserFriendlyError {
                simple_message: "I/O error occurred.".to_string(),
                suggestion: Some("Check file permissions and disk space".to_string()),
                raw_error: io_err.to_string(),
            },
        }
    }

    pub fn translate_generation(error: &GenerationError) -> UserFriendlyError {
        match error {
            GenerationError::Api(llm_err) => Self::translate_llm(llm_err),
            GenerationError::Empty => UserFriendlyError {
                simple_message: "The model returned nothing usable.".to_string(),
                suggestion: Some("Try rephrasing the request".to_string()),
                raw_error: error.to_string(),
            },
        }
    }

    pub fn translate_llm(error: &LLMError) -> UserFriendlyError {
        let raw_error = error.to_string();
        let (simple_message, suggestion) = match error {
            LLMError::Timeout => (
                "The model took too long to answer.".to_string(),
                Some("Try again, or raise llm.timeout_seconds in the config".to_string()),
            ),
            LLMError::RateLimitExceeded(secs) => (
                "Too many requests to the model.".to_string(),
                Some(format!("Wait about {}s before trying again", secs)),
            ),
            LLMError::MissingApiKey(var) => (
                "No API key is configured.".to_string(),
                Some(format!("Export {} or set llm.api_key in the config", var)),
            ),
            LLMError::ApiError(text) => Self::match_api_patterns(text),
            LLMError::NetworkError(_) => (
                "Could not reach the model API.".to_string(),
                Some("Check your network connection".to_string()),
            ),
            LLMError::InvalidResponse(_) | LLMError::JsonError(_) => (
                "The model API sent a response I could not read.".to_string(),
                None,
            ),
        };

        UserFriendlyError {
            simple_message,
            suggestion,
            raw_error,
        }
    }

    pub fn translate_exec(error: &ExecError) -> UserFriendlyError {
        let raw_error = error.to_string();
        let (simple_message, suggestion) = match error {
            ExecError::EmptyCommand => ("There was no command to run.".to_string(), None),
            ExecError::Spawn { program, .. } => (
                format!("Could not start '{}'.", program),
                Some(format!("Make sure {} is installed and on PATH", program)),
            ),
            ExecError::NonZeroExit { stderr, .. } => Self::match_exec_patterns(stderr),
        };

        UserFriendlyError {
            simple_message,
            suggestion,
            raw_error,
        }
    }

    /// Match common API failure bodies
    fn match_api_patterns(error_text: &str) -> (String, Option<String>) {
        let lower = error_text.to_lowercase();

        if lower.contains("401") || lower.contains("invalid api key") || lower.contains("unauthorized") {
            return (
                "The API key was rejected.".to_string(),
                Some("Check that the key is valid for the configured provider".to_string()),
            );
        }

        if lower.contains("404") || lower.contains("model not found") || lower.contains("does not exist") {
            return (
                "The configured model was not found.".to_string(),
                Some("Check llm.model in the config".to_string()),
            );
        }

        if lower.contains("500") || lower.contains("502") || lower.contains("503") || lower.contains("overloaded") {
            return (
                "The model API is having trouble right now.".to_string(),
                Some("Wait a moment and try again".to_string()),
            );
        }

        ("Error communicating with the model API.".to_string(), None)
    }

    /// Match common shell failure output
    fn match_exec_patterns(stderr: &str) -> (String, Option<String>) {
        let lower = stderr.to_lowercase();

        if lower.contains("command not found") {
            return (
                "The command is not installed.".to_string(),
                Some("Install the missing program or ask for an alternative".to_string()),
            );
        }

        if lower.contains("a password is required") || lower.contains("incorrect password") {
            return (
                "sudo could not authenticate.".to_string(),
                Some("Run 'sudo -v' first, or set shell.elevate = false".to_string()),
            );
        }

        if lower.contains("permission denied") {
            return (
                "Permission denied.".to_string(),
                Some("Check file permissions for the paths involved".to_string()),
            );
        }

        if lower.contains("no such file or directory") {
            return (
                "A file or directory in the command does not exist.".to_string(),
                Some("Check the paths and the current directory".to_string()),
            );
        }

        ("The command failed.".to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    fn failed(stderr: &str) -> ExecError {
        ExecError::NonZeroExit {
            code: 1,
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_translate_timeout() {
        let translated = ErrorTranslator::translate_llm(&LLMError::Timeout);
        assert!(translated.simple_message.contains("too long"));
        assert!(translated.suggestion.is_some());
    }

    #[test]
    fn test_translate_missing_key() {
        let translated =
            ErrorTranslator::translate_llm(&LLMError::MissingApiKey("OPENAI_API_KEY".to_string()));
        assert!(translated.suggestion.unwrap().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_translate_unauthorized() {
        let error = LLMError::ApiError("API returned status 401 Unauthorized: bad key".to_string());
        let translated = ErrorTranslator::translate_llm(&error);
        assert!(translated.simple_message.contains("rejected"));
    }

    #[test]
    fn test_translate_empty_generation() {
        let translated = ErrorTranslator::translate_generation(&GenerationError::Empty);
        assert!(translated.simple_message.contains("nothing usable"));
    }

    #[test]
    fn test_translate_generation_delegates_to_llm() {
        let translated = ErrorTranslator::translate_generation(&GenerationError::Api(LLMError::Timeout));
        assert!(translated.simple_message.contains("too long"));
    }

    #[test]
    fn test_translate_command_not_found() {
        let translated = ErrorTranslator::translate_exec(&failed("bash: foo: command not found"));
        assert!(translated.simple_message.contains("not installed"));
    }

    #[test]
    fn test_translate_sudo_password() {
        let translated = ErrorTranslator::translate_exec(&failed("sudo: a password is required"));
        assert!(translated.simple_message.contains("sudo"));
    }

    #[test]
    fn test_translate_unknown_exec_error() {
        let translated = ErrorTranslator::translate_exec(&failed("something odd"));
        assert_eq!(translated.simple_message, "The command failed.");
        assert!(translated.suggestion.is_none());
        assert!(translated.raw_error.contains("something odd"));
    }

    #[test]
    fn test_translate_app_error_config() {
        let error = AppError::Config(ConfigError::DirectoryNotFound);
        let translated = ErrorTranslator::translate_app_error(&error);
        assert!(translated.suggestion.unwrap().contains("config.toml"));
    }

    #[test]
    fn test_raw_error_preserved() {
        let error = AppError::Exec(failed("ls: cannot access 'x': No such file or directory"));
        let translated = ErrorTranslator::translate_app_error(&error);
        assert!(translated.raw_error.contains("cannot access 'x'"));
        assert!(translated.simple_message.contains("does not exist"));
    }
}
