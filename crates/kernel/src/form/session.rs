//! Per-form CSRF token and flash message lifecycle.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::Method;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::session::SessionStore;
use crate::view::html_escape;

use super::entry::{Failure, FormKey, HandlerForms, SessionFormEntry};
use super::token::{TokenIssuer, tokens_match};

/// Name of the form field carrying the CSRF token.
pub const TOKEN_FIELD: &str = "token";

/// Recorded when a submitted token does not match the session.
pub const EXPIRED_MESSAGE: &str =
    "Your session has expired or the form was sent from another page. Please try again.";

/// The request a form is being handled for.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub method: Method,
    pub fields: BTreeMap<String, String>,
}

impl Submission {
    pub fn new(method: Method, fields: BTreeMap<String, String>) -> Self {
        Self { method, fields }
    }

    /// Whether the request may change state (anything but GET, HEAD, OPTIONS, TRACE).
    pub fn is_state_changing(&self) -> bool {
        !matches!(
            self.method,
            Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
        )
    }

    /// The submitted CSRF token, if any.
    pub fn token(&self) -> Option<&str> {
        self.fields.get(TOKEN_FIELD).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// Messages drained from a form entry for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub messages: Vec<String>,
}

impl Flash {
    /// `<ul class="success|error">` with one escaped `<li>` per message.
    pub fn to_html(&self) -> String {
        let class = match self.kind {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        };
        let items: String = self
            .messages
            .iter()
            .map(|m| format!("<li>{}</li>", html_escape(m)))
            .collect();
        format!(r#"<ul class="{class}">{items}</ul>"#)
    }
}

/// Form state handed to templates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormView {
    pub token: String,
    /// Fields with a recorded error.
    pub failed: Vec<String>,
    /// Preserved input for repopulating fields.
    pub data: BTreeMap<String, String>,
    pub status: Option<Flash>,
}

/// CSRF and flash protocol for one handler method.
///
/// The owning `(handler, method)` is fixed at construction. Entries are read
/// and written through the session on every call, so two tabs submitting the
/// same form race: whichever request writes last wins, and a reset in one tab
/// can discard input the other tab preserved. Tokens are deliberately not
/// rotated on submit so that a second tab's form stays valid.
pub struct FormSession {
    store: Arc<dyn SessionStore>,
    key: FormKey,
    issuer: TokenIssuer,
    submission: Submission,
}

impl FormSession {
    pub fn new(
        store: Arc<dyn SessionStore>,
        key: FormKey,
        issuer: TokenIssuer,
        submission: Submission,
    ) -> Self {
        Self {
            store,
            key,
            issuer,
            submission,
        }
    }

    pub fn key(&self) -> &FormKey {
        &self.key
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Current token, issued on first use.
    pub async fn token(&self) -> AppResult<String> {
        let mut entry = self.load().await?;
        if let Some(token) = &entry.csrf {
            return Ok(token.clone());
        }

        let token = self.issuer.issue();
        entry.csrf = Some(token.clone());
        self.save(entry).await?;
        debug!(form = %self.key, "issued form token");
        Ok(token)
    }

    /// Accept a submission if the request is state changing and `supplied`
    /// matches the stored token.
    ///
    /// Previous errors are cleared and the raw input preserved either way; a
    /// mismatch records a form-wide failure.
    pub async fn submit(&self, supplied: Option<&str>) -> AppResult<bool> {
        if !self.submission.is_state_changing() {
            return Ok(false);
        }

        let mut entry = self.load().await?;
        entry.failed = None;
        entry.preserved = Some(self.submission.fields.clone());

        let accepted = match (entry.csrf.as_deref(), supplied) {
            (Some(stored), Some(supplied)) => tokens_match(stored, supplied),
            _ => false,
        };

        if !accepted {
            warn!(
                handler = %self.key.handler,
                method = %self.key.method,
                token_present = supplied.is_some(),
                "form token mismatch"
            );
            entry.failed = Some(Failure::Message(EXPIRED_MESSAGE.to_string()));
        }

        self.save(entry).await?;
        Ok(accepted)
    }

    /// [`submit`](Self::submit) with the token taken from the request body.
    pub async fn submit_request(&self) -> AppResult<bool> {
        let supplied = self.submission.token().map(str::to_owned);
        self.submit(supplied.as_deref()).await
    }

    /// Record an error.
    ///
    /// With a value, `key` names a field and the error joins any other field
    /// errors. Without one, `key` is a form-wide message replacing every
    /// recorded error.
    pub async fn error(&self, key: &str, value: Option<&str>) -> AppResult<()> {
        let mut entry = self.load().await?;
        entry.failed = match (value, entry.failed.take()) {
            (Some(value), Some(Failure::Fields(mut fields))) => {
                fields.insert(key.to_string(), value.to_string());
                Some(Failure::Fields(fields))
            }
            (Some(value), _) => Some(Failure::Fields(BTreeMap::from([(
                key.to_string(),
                value.to_string(),
            )]))),
            (None, _) => Some(Failure::Message(key.to_string())),
        };
        self.save(entry).await
    }

    /// Record a success message. Takes precedence over errors when drained.
    pub async fn success(&self, message: &str) -> AppResult<()> {
        let mut entry = self.load().await?;
        entry.success = Some(message.to_string());
        self.save(entry).await
    }

    /// Drain messages for display.
    ///
    /// A success or a form-wide failure resets the entry to a fresh token.
    /// Field errors are returned but kept, so the form can be shown again with
    /// its context.
    pub async fn status(&self) -> AppResult<Option<Flash>> {
        let entry = self.load().await?;

        if let Some(message) = entry.success {
            self.reset().await?;
            return Ok(Some(Flash {
                kind: FlashKind::Success,
                messages: vec![message],
            }));
        }

        match entry.failed {
            Some(Failure::Fields(fields)) if !fields.is_empty() => Ok(Some(Flash {
                kind: FlashKind::Error,
                messages: fields.into_values().collect(),
            })),
            Some(Failure::Message(message)) => {
                self.reset().await?;
                Ok(Some(Flash {
                    kind: FlashKind::Error,
                    messages: vec![message],
                }))
            }
            _ => Ok(None),
        }
    }

    /// Preserved input from the last submission.
    pub async fn preserved(&self) -> AppResult<BTreeMap<String, String>> {
        Ok(self.load().await?.preserved.unwrap_or_default())
    }

    /// Fields with a recorded error.
    pub async fn failed_fields(&self) -> AppResult<Vec<String>> {
        Ok(self.load().await?.failed_fields())
    }

    /// Everything a template needs to draw the form, draining the status.
    pub async fn view_state(&self) -> AppResult<FormView> {
        let entry = self.load().await?;
        let mut failed = entry.failed_fields();
        let mut data = entry.preserved.unwrap_or_default();

        let status = self.status().await?;
        let was_reset = matches!(
            (&status, &entry.failed),
            (Some(Flash { kind: FlashKind::Success, .. }), _)
                | (Some(_), Some(Failure::Message(_)))
        );
        if was_reset {
            failed.clear();
            data.clear();
        }

        Ok(FormView {
            token: self.token().await?,
            failed,
            data,
            status,
        })
    }

    /// Drop the entry entirely.
    pub async fn forget(&self) -> AppResult<()> {
        self.save(SessionFormEntry::default()).await
    }

    async fn reset(&self) -> AppResult<()> {
        debug!(form = %self.key, "resetting form entry");
        self.save(SessionFormEntry {
            csrf: Some(self.issuer.issue()),
            ..Default::default()
        })
        .await
    }

    async fn load_all(&self) -> AppResult<HandlerForms> {
        let Some(value) = self.store.get(&self.key.session_key()).await? else {
            return Ok(HandlerForms::new());
        };
        match serde_json::from_value(value) {
            Ok(forms) => Ok(forms),
            Err(e) => {
                warn!(form = %self.key, error = %e, "discarding unreadable form state");
                Ok(HandlerForms::new())
            }
        }
    }

    async fn load(&self) -> AppResult<SessionFormEntry> {
        Ok(self
            .load_all()
            .await?
            .remove(&self.key.method)
            .unwrap_or_default())
    }

    async fn save(&self, entry: SessionFormEntry) -> AppResult<()> {
        let mut forms = self.load_all().await?;
        if entry.is_empty() {
            forms.remove(&self.key.method);
        } else {
            forms.insert(self.key.method.clone(), entry);
        }

        let session_key = self.key.session_key();
        if forms.is_empty() {
            self.store.delete(&session_key).await
        } else {
            let value = serde_json::to_value(&forms).map_err(anyhow::Error::from)?;
            self.store.set(&session_key, value).await
        }
    }
}
