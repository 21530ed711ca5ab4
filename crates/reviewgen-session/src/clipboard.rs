use std::time::Instant;

use reviewgen_core::ItemId;
use thiserror::Error;
use tracing::{debug, warn};

use crate::state::{Event, SessionState};

/// Separator between reviews when copying a whole batch.
pub const BATCH_SEPARATOR: &str = "\n\n";

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("clipboard write failed: {0}")]
    Write(String),
}

/// Write-only access to a clipboard.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The platform clipboard.
///
/// On Linux the selection is served by this process and disappears when it
/// exits. Short-lived callers should use [`SystemClipboard::holding`], which
/// blocks each write until another application (usually a clipboard manager)
/// takes the contents over.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    hold: bool,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let inner =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        Ok(Self { inner, hold: false })
    }

    /// A clipboard whose writes outlive the process on Linux.
    pub fn holding() -> Result<Self, ClipboardError> {
        let mut clipboard = Self::new()?;
        clipboard.hold = true;
        Ok(clipboard)
    }

    #[cfg(target_os = "linux")]
    fn write(&mut self, text: &str) -> Result<(), arboard::Error> {
        use arboard::SetExtLinux;

        if self.hold {
            tracing::info!("holding clipboard contents until another application takes them over");
            self.inner.set().wait().text(text)
        } else {
            self.inner.set_text(text)
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn write(&mut self, text: &str) -> Result<(), arboard::Error> {
        self.inner.set_text(text)
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.write(text)
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

/// In-process clipboard that records every write. Used in tests and when
/// no platform clipboard is available.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Vec<String>,
    fail: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose every write fails.
    pub fn failing() -> Self {
        Self {
            writes: Vec::new(),
            fail: true,
        }
    }

    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    pub fn contents(&self) -> Option<&str> {
        self.writes.last().map(String::as_str)
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::Write("memory clipboard set to fail".into()));
        }
        self.writes.push(text.to_string());
        Ok(())
    }
}

/// Copy one item's text. Returns `true` when the clipboard write succeeded.
///
/// On success the item is marked copied as of `now`. Failures are logged
/// and leave the session untouched.
pub fn copy_item(
    state: &mut SessionState,
    clipboard: &mut dyn Clipboard,
    id: &ItemId,
    now: Instant,
) -> bool {
    let Some(item) = state.item(id) else {
        debug!(%id, "copy requested for unknown item");
        return false;
    };
    match clipboard.set_text(&item.text) {
        Ok(()) => {
            state.apply(Event::Copied { id: id.clone(), at: now });
            true
        }
        Err(e) => {
            warn!("failed to copy review {id}: {e}");
            false
        }
    }
}

/// Copy the latest batch as one blank-line separated block.
pub fn copy_batch(state: &mut SessionState, clipboard: &mut dyn Clipboard, now: Instant) -> bool {
    let batch = state.latest_batch();
    if batch.is_empty() {
        return false;
    }
    let text = batch
        .iter()
        .map(|i| i.text.as_str())
        .collect::<Vec<_>>()
        .join(BATCH_SEPARATOR);
    let ids: Vec<ItemId> = batch.iter().map(|i| i.id.clone()).collect();

    match clipboard.set_text(&text) {
        Ok(()) => {
            for id in ids {
                state.apply(Event::Copied { id, at: now });
            }
            true
        }
        Err(e) => {
            warn!("failed to copy batch: {e}");
            false
        }
    }
}

/// What a one-shot caller wants on the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyTarget {
    Item(ItemId),
    Batch,
}

/// Copy `target` through a clipboard that may have failed to open.
///
/// An unavailable clipboard is logged like any other copy failure; it never
/// turns into an error for the caller.
pub fn copy_target<C: Clipboard>(
    state: &mut SessionState,
    clipboard: Result<C, ClipboardError>,
    target: &CopyTarget,
    now: Instant,
) -> bool {
    let mut clipboard = match clipboard {
        Ok(c) => c,
        Err(e) => {
            warn!("nothing copied: {e}");
            return false;
        }
    };
    match target {
        CopyTarget::Item(id) => copy_item(state, &mut clipboard, id, now),
        CopyTarget::Batch => copy_batch(state, &mut clipboard, now),
    }
}
