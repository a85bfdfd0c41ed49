//! Transient per-user notifications ("toasts").
//!
//! Lifecycle: idle → visible → exiting → removed. A toast becomes visible as
//! soon as it is pushed; a timer moves it to exiting after its duration and
//! it is dropped once the exit delay has passed. Dismissing cancels the timer
//! and starts the exit right away.

pub mod handlers;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::AbortHandle;
use tracing::debug;
use uuid::Uuid;

pub const EXIT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastPhase {
    Idle,
    Visible,
    Exiting,
    Removed,
}

impl ToastPhase {
    /// The only forward step allowed from this phase.
    pub fn next(self) -> Option<ToastPhase> {
        match self {
            ToastPhase::Idle => Some(ToastPhase::Visible),
            ToastPhase::Visible => Some(ToastPhase::Exiting),
            ToastPhase::Exiting => Some(ToastPhase::Removed),
            ToastPhase::Removed => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub title: String,
    pub message: Option<String>,
    pub duration_ms: u64,
    pub phase: ToastPhase,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    fn advance_to(&mut self, target: ToastPhase) -> bool {
        if self.phase.next() == Some(target) {
            self.phase = target;
            true
        } else {
            false
        }
    }
}

struct Entry {
    toast: Toast,
    timer: Option<AbortHandle>,
}

type Inbox = HashMap<String, Vec<Entry>>;

#[derive(Clone)]
pub struct NotificationCenter {
    inboxes: Arc<Mutex<Inbox>>,
    duration: Duration,
}

impl NotificationCenter {
    pub fn new(duration: Duration) -> Self {
        Self {
            inboxes: Arc::new(Mutex::new(HashMap::new())),
            duration,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inbox> {
        self.inboxes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Shows a toast to `user` and arms its auto-dismiss timer.
    pub fn push(
        &self,
        user: &str,
        kind: ToastKind,
        title: impl Into<String>,
        message: Option<String>,
    ) -> Uuid {
        let mut toast = Toast {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            message,
            duration_ms: self.duration.as_millis() as u64,
            phase: ToastPhase::Idle,
            created_at: Utc::now(),
        };
        toast.advance_to(ToastPhase::Visible);
        let id = toast.id;

        // Held while arming the timer so it can never fire before the toast is stored.
        let mut inboxes = self.lock();
        let center = self.clone();
        let owner = user.to_string();
        let duration = self.duration;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            center.begin_exit(&owner, id);
        });
        inboxes.entry(user.to_string()).or_default().push(Entry {
            toast,
            timer: Some(timer.abort_handle()),
        });
        drop(inboxes);
        debug!("Toast {id} shown to {user}");
        id
    }

    pub fn success(&self, user: &str, title: &str, message: &str) -> Uuid {
        self.push(user, ToastKind::Success, title, Some(message.to_string()))
    }

    pub fn error(&self, user: &str, title: &str, message: &str) -> Uuid {
        self.push(user, ToastKind::Error, title, Some(message.to_string()))
    }

    pub fn warning(&self, user: &str, title: &str, message: &str) -> Uuid {
        self.push(user, ToastKind::Warning, title, Some(message.to_string()))
    }

    pub fn info(&self, user: &str, title: &str, message: &str) -> Uuid {
        self.push(user, ToastKind::Info, title, Some(message.to_string()))
    }

    /// Dismisses a toast early. Returns false when it is unknown or already leaving.
    pub fn dismiss(&self, user: &str, id: Uuid) -> bool {
        let timer = {
            let mut inboxes = self.lock();
            let Some(entry) = inboxes
                .get_mut(user)
                .and_then(|entries| entries.iter_mut().find(|e| e.toast.id == id))
            else {
                return false;
            };
            if entry.toast.phase != ToastPhase::Visible {
                return false;
            }
            entry.timer.take()
        };
        if let Some(timer) = timer {
            timer.abort();
        }
        self.begin_exit(user, id);
        true
    }

    /// Live toasts for `user`, oldest first.
    pub fn list(&self, user: &str) -> Vec<Toast> {
        self.lock()
            .get(user)
            .map(|entries| entries.iter().map(|e| e.toast.clone()).collect())
            .unwrap_or_default()
    }

    fn begin_exit(&self, user: &str, id: Uuid) {
        let started = {
            let mut inboxes = self.lock();
            inboxes
                .get_mut(user)
                .and_then(|entries| entries.iter_mut().find(|e| e.toast.id == id))
                .map(|entry| {
                    entry.timer = None;
                    entry.toast.advance_to(ToastPhase::Exiting)
                })
                .unwrap_or(false)
        };
        if !started {
            return;
        }

        let center = self.clone();
        let owner = user.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(EXIT_DELAY).await;
            center.remove(&owner, id);
        });
    }

    fn remove(&self, user: &str, id: Uuid) {
        let mut inboxes = self.lock();
        if let Some(entries) = inboxes.get_mut(user) {
            entries.retain_mut(|e| !(e.toast.id == id && e.toast.advance_to(ToastPhase::Removed)));
            if entries.is_empty() {
                inboxes.remove(user);
            }
        }
        debug!("Toast {id} removed for {user}");
    }
}
