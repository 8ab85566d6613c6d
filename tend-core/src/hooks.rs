//! Custom pre/post logic injected around tasks.

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::reporter::Display;
use crate::shell::ShellCommand;
use crate::task::Task;

/// Boxed future returned by callback hooks.
pub type HookFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

type HookFn = dyn Fn(HookContext) -> HookFuture + Send + Sync;

/// What a hook is given: the display handle and nothing else.
#[derive(Clone)]
pub struct HookContext {
    pub display: Display,
}

/// A single hook.
#[derive(Clone)]
pub enum Hook {
    /// Async closure supplied by an embedding program.
    Callback(Arc<HookFn>),
    /// Command line from `tend.toml`, run with `sh -c` in the repository root.
    Command(String),
}

impl Hook {
    pub fn callback<F, Fut>(f: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Hook::Callback(Arc::new(move |ctx| Box::pin(f(ctx)) as HookFuture))
    }

    pub fn command(line: impl Into<String>) -> Self {
        Hook::Command(line.into())
    }

    pub(crate) async fn invoke(&self, task: Task, display: &Display, root: &Path) -> Result<()> {
        match self {
            Hook::Callback(f) => {
                f(HookContext {
                    display: Arc::clone(display),
                })
                .await
            }
            Hook::Command(line) => {
                let succeeded = ShellCommand::shell(format!("{} hook", task), line.as_str())
                    .stream(root, display)
                    .await?;
                if succeeded {
                    Ok(())
                } else {
                    Err(Error::Hook {
                        task,
                        message: format!("'{}' exited with a non-zero status", line),
                    })
                }
            }
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Callback(_) => f.write_str("Hook::Callback(..)"),
            Hook::Command(line) => f.debug_tuple("Hook::Command").field(line).finish(),
        }
    }
}

/// Hooks for one task. Either side may be absent.
#[derive(Debug, Clone, Default)]
pub struct TaskHooks {
    pub pre_run: Option<Hook>,
    pub post_run: Option<Hook>,
}

impl TaskHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pre_run(mut self, hook: Hook) -> Self {
        self.pre_run = Some(hook);
        self
    }

    pub fn with_post_run(mut self, hook: Hook) -> Self {
        self.post_run = Some(hook);
        self
    }
}
