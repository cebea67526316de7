//! Render guard for console views.
//!
//! An [`ErrorBoundary`] runs a render function and turns any error or panic
//! it raises into a [`Fallback`]: the user-facing message, the suggested
//! remediation, and "try again" / "reload" actions. Technical details are
//! only attached outside production. The boundary never retries the failed
//! operation itself; it only recovers the render.

use crate::config::Environment;
use crate::errors::classify::{
    extract_technical_message, extract_user_message, format_for_logging,
};
use crate::errors::{AppError, ErrorCode};
use serde::Serialize;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryAction {
    /// Clear the caught state and render again.
    TryAgain,
    /// Hand off to the host for a full reload.
    Reload,
}

impl BoundaryAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::TryAgain => "Try again",
            Self::Reload => "Reload",
        }
    }
}

/// Performs a full reload of whatever hosts the boundary.
pub trait Reloader: Send + Sync {
    fn reload(&self);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fallback {
    pub code: u32,
    pub user_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub actions: Vec<BoundaryAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.user_message)?;
        if let Some(action) = &self.action {
            writeln!(f, "{action}")?;
        }
        let labels: Vec<String> = self
            .actions
            .iter()
            .map(|a| format!("[{}]", a.label()))
            .collect();
        write!(f, "{}", labels.join(" "))?;
        if let Some(diag) = &self.diagnostics {
            write!(f, "\n\n{}", diag.message)?;
            if let Some(stack) = &diag.stack {
                write!(f, "\n{stack}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<T> {
    View(T),
    Fallback(Fallback),
}

impl<T> Rendered<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

pub struct ErrorBoundary<F> {
    render: F,
    environment: Environment,
    reloader: Option<Arc<dyn Reloader>>,
    caught: Option<Fallback>,
}

impl<F, T> ErrorBoundary<F>
where
    F: FnMut() -> anyhow::Result<T>,
{
    pub fn new(render: F, environment: Environment) -> Self {
        Self {
            render,
            environment,
            reloader: None,
            caught: None,
        }
    }

    #[must_use]
    pub fn with_reloader(mut self, reloader: Arc<dyn Reloader>) -> Self {
        self.reloader = Some(reloader);
        self
    }

    pub fn has_error(&self) -> bool {
        self.caught.is_some()
    }

    /// Render the guarded view. Once a failure is caught the fallback is
    /// returned until [`reset`](Self::reset) or [`reload`](Self::reload).
    pub fn render(&mut self) -> Rendered<T> {
        if let Some(fallback) = &self.caught {
            return Rendered::Fallback(fallback.clone());
        }

        let render = &mut self.render;
        let err = match panic::catch_unwind(AssertUnwindSafe(render)) {
            Ok(Ok(view)) => return Rendered::View(view),
            Ok(Err(err)) => err,
            Err(payload) => {
                anyhow::Error::new(AppError::from_panic(payload.as_ref(), ErrorCode::Unknown))
            }
        };

        let fallback = self.catch(&err);
        self.caught = Some(fallback.clone());
        Rendered::Fallback(fallback)
    }

    fn catch(&self, err: &anyhow::Error) -> Fallback {
        let record = format_for_logging(err);
        error!(record = %record.to_value(), "Unhandled failure while rendering");

        let typed = AppError::from_anyhow_ref(err, ErrorCode::Unknown);
        let diagnostics = (!self.environment.is_production()).then(|| Diagnostics {
            message: extract_technical_message(err),
            stack: record.stack.clone(),
        });
        Fallback {
            code: typed.code(),
            user_message: extract_user_message(err),
            action: typed.action().map(str::to_string),
            actions: vec![BoundaryAction::TryAgain, BoundaryAction::Reload],
            diagnostics,
        }
    }

    /// Clear the caught failure and render the original view again.
    pub fn reset(&mut self) -> Rendered<T> {
        self.caught = None;
        self.render()
    }

    /// Clear the caught failure and ask the host to reload.
    pub fn reload(&mut self) {
        self.caught = None;
        if let Some(reloader) = &self.reloader {
            reloader.reload();
        }
    }

    /// Dispatch a fallback action. `Reload` yields `None`; the host takes
    /// over from there.
    pub fn handle(&mut self, action: BoundaryAction) -> Option<Rendered<T>> {
        match action {
            BoundaryAction::TryAgain => Some(self.reset()),
            BoundaryAction::Reload => {
                self.reload();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests;
