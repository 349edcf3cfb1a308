//! Sandboxed execution of fenced code blocks
//!
//! Blocks run as child processes inside a private temporary directory that is
//! removed when the executor is dropped. Each block has its own timeout.

use agent_core::{Error, Result};
use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{info, warn};

/// Default per-block timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit code reported when a block exceeds its timeout
pub const TIMEOUT_EXIT_CODE: i32 = 124;

const FENCE_PATTERN: &str = r"(?s)```[ \t]*([A-Za-z0-9_+-]*)[ \t]*\r?\n(.*?)```";

/// A fenced block in a supported language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language tag after the opening fence (lowercased)
    pub language: String,
    /// Block body
    pub code: String,
}

impl CodeBlock {
    fn interpreter(&self) -> Option<(&'static str, &'static str)> {
        match self.language.as_str() {
            "sh" | "shell" => Some(("sh", "sh")),
            "bash" => Some(("bash", "sh")),
            "python" => Some(("python3", "py")),
            _ => None,
        }
    }
}

/// Outcome of running a message's blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code of the last block run
    pub exit_code: i32,
    /// Combined output of all blocks run
    pub output: String,
}

impl ExecutionResult {
    /// Text posted back to the conversation
    pub fn to_reply(&self) -> String {
        let status = if self.exit_code == 0 {
            "execution succeeded"
        } else {
            "execution failed"
        };
        format!(
            "exitcode: {} ({status})\nCode output: {}",
            self.exit_code, self.output
        )
    }
}

/// Runs code blocks in a temporary working directory
pub struct CodeExecutor {
    work_dir: TempDir,
    timeout: Duration,
    fence: Regex,
}

impl CodeExecutor {
    /// Create an executor with a fresh working directory
    pub fn new(timeout: Duration) -> Result<Self> {
        let work_dir = tempfile::Builder::new()
            .prefix("stock-analyst-")
            .tempdir()
            .map_err(|e| Error::InitializationFailed(format!("Cannot create work dir: {e}")))?;
        let fence = Regex::new(FENCE_PATTERN)
            .map_err(|e| Error::InitializationFailed(format!("Invalid fence pattern: {e}")))?;
        Ok(Self {
            work_dir,
            timeout,
            fence,
        })
    }

    /// Working directory of this executor
    pub fn work_dir(&self) -> &Path {
        self.work_dir.path()
    }

    /// Fenced blocks in `text` written in a supported language
    pub fn extract_blocks(&self, text: &str) -> Vec<CodeBlock> {
        self.fence
            .captures_iter(text)
            .map(|caps| CodeBlock {
                language: caps[1].to_ascii_lowercase(),
                code: caps[2].to_string(),
            })
            .filter(|block| block.interpreter().is_some())
            .collect()
    }

    /// Run blocks in order, stopping at the first failure
    pub async fn execute(&self, blocks: &[CodeBlock]) -> ExecutionResult {
        let mut output = String::new();
        let mut exit_code = 0;

        for (index, block) in blocks.iter().enumerate() {
            let Some((program, extension)) = block.interpreter() else {
                continue;
            };
            let (code, text) = self.run_block(index, program, extension, &block.code).await;
            info!(index, language = %block.language, exit_code = code, "Executed code block");
            output.push_str(&text);
            exit_code = code;
            if code != 0 {
                break;
            }
        }

        ExecutionResult { exit_code, output }
    }

    async fn run_block(&self, index: usize, program: &str, extension: &str, code: &str) -> (i32, String) {
        let path = self.work_dir().join(format!("block_{index}.{extension}"));
        if let Err(e) = tokio::fs::write(&path, code).await {
            return (1, format!("Cannot write code file: {e}\n"));
        }

        let child = Command::new(program)
            .arg(&path)
            .current_dir(self.work_dir())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(out)) => {
                let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&out.stderr));
                (out.status.code().unwrap_or(1), text)
            }
            Ok(Err(e)) => {
                warn!(program, error = %e, "Failed to start interpreter");
                (1, format!("Failed to start {program}: {e}\n"))
            }
            Err(_) => {
                warn!(program, timeout_secs = self.timeout.as_secs(), "Code block timed out");
                (TIMEOUT_EXIT_CODE, "Timeout\n".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor() -> CodeExecutor {
        CodeExecutor::new(DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn test_extract_supported_blocks_only() {
        let text = "Run this:\n```bash\necho hi\n```\nand\n```python\nprint(1)\n```\n```json\n{}\n```\n```\nplain\n```";
        let blocks = executor().extract_blocks(text);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, "bash");
        assert_eq!(blocks[0].code, "echo hi\n");
        assert_eq!(blocks[1].language, "python");
    }

    #[test]
    fn test_no_blocks_in_prose() {
        assert!(executor().extract_blocks("Buy MSFT, RSI is 55.").is_empty());
    }

    #[test]
    fn test_reply_format() {
        let result = ExecutionResult {
            exit_code: 0,
            output: "hi\n".into(),
        };
        assert_eq!(result.to_reply(), "exitcode: 0 (execution succeeded)\nCode output: hi\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_shell_block() {
        let executor = executor();
        let blocks = executor.extract_blocks("```sh\necho analysis\n```");
        let result = executor.execute(&blocks).await;

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "analysis\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let executor = executor();
        let blocks = executor.extract_blocks("```sh\nexit 3\n```\n```sh\necho unreachable\n```");
        let result = executor.execute(&blocks).await;

        assert_eq!(result.exit_code, 3);
        assert!(!result.output.contains("unreachable"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_block_timeout() {
        let executor = CodeExecutor::new(Duration::from_millis(200)).unwrap();
        let blocks = executor.extract_blocks("```sh\nsleep 5\n```");
        let result = executor.execute(&blocks).await;

        assert_eq!(result.exit_code, TIMEOUT_EXIT_CODE);
    }

    #[test]
    fn test_work_dir_removed_on_drop() {
        let executor = executor();
        let path = executor.work_dir().to_path_buf();
        assert!(path.exists());
        drop(executor);
        assert!(!path.exists());
    }
}
