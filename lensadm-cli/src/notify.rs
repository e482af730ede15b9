//! User-facing notifications and confirmation prompts

use crate::observable::Observable;
use crate::output;
use indicatif::MultiProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Sink for transient notifications (the dashboard's toasts)
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NoticeLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// Prints notifications to the terminal
///
/// Spinners registered on [`ConsoleNotifier::progress`] are hidden while a
/// message is printed so the two never share a line.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier {
    progress: MultiProgress,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> &MultiProgress {
        &self.progress
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.progress.suspend(|| match level {
            NoticeLevel::Success => output::print_success(message),
            NoticeLevel::Info => output::print_info(message),
            NoticeLevel::Warning => output::print_warning(message),
            NoticeLevel::Error => output::print_error(message),
        });
    }
}

/// Keeps every notification in an observable list
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    notices: Observable<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.get()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices
            .with(|n| n.iter().filter(|notice| notice.level == level).count())
    }

    /// Whether any notification contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.notices
            .with(|n| n.iter().any(|notice| notice.message.contains(needle)))
    }

    pub fn clear(&self) {
        self.notices.set(Vec::new());
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.update(|n| {
            n.push(Notice {
                level,
                message: message.to_string(),
            })
        });
    }
}

/// Yes/no confirmation asked before destructive operations
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Interactive prompt on the terminal
#[derive(Debug, Default)]
pub struct TerminalConfirm {
    /// Answer yes without asking (`--yes`)
    pub assume_yes: bool,
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        // A prompt that cannot be shown counts as a refusal
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// Fixed answer, for scripted use
#[derive(Debug, Clone, Copy)]
pub struct StaticConfirm(pub bool);

impl Confirm for StaticConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
