//! Preprocessor compilers backed by external commands.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::debug;
use crate::error::RenderError;

use super::Compiler;

/// Placeholder in a command line replaced by the source path.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Runs a command per source file and serves its stdout.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    argv: Vec<String>,
    cwd: Option<PathBuf>,
}

impl CommandCompiler {
    /// `argv[0]` is the program. An argument equal to `{input}` is replaced by
    /// the source path; if none is, the path is appended.
    pub fn new(argv: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn command(&self, source: &Path) -> Option<Command> {
        let (program, args) = self.argv.split_first()?;
        let mut cmd = Command::new(program);

        let mut placed = false;
        for arg in args {
            if arg == INPUT_PLACEHOLDER {
                cmd.arg(source);
                placed = true;
            } else {
                cmd.arg(arg);
            }
        }
        if !placed {
            cmd.arg(source);
        }
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        Some(cmd)
    }
}

impl Compiler for CommandCompiler {
    fn compile(&self, source: &Path) -> Result<Vec<u8>, RenderError> {
        let fail = |message: String| RenderError::Compile {
            path: source.to_path_buf(),
            message,
        };

        let mut cmd = self
            .command(source)
            .ok_or_else(|| fail("empty compiler command".into()))?;
        debug!("compile"; "{} {}", self.argv.join(" "), source.display());

        let output = cmd
            .output()
            .map_err(|e| fail(format!("failed to run `{}`: {e}", self.argv[0])))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!("`{}` {}: {}", self.argv[0], output.status, stderr.trim())));
        }
        Ok(output.stdout)
    }
}
