//! Keyboard navigation over the suggestion panel
//!
//! The panel shows suggestions followed by recent searches; both share one
//! index space `0..suggestions + recents`. No selection is `None`.

/// Keys the suggestion panel reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Tab,
    Enter,
    Escape,
}

/// What a key press asks the controller to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Panel closed or nothing to act on
    Ignored,
    /// Active index moved
    Moved,
    /// Put the first suggestion's text in the input and select it
    AdoptFirst,
    /// Commit the entry at this merged index
    Commit(usize),
    /// Submit the raw input text
    Submit,
    /// Close the panel
    Close,
}

/// Active selection within the merged list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigator {
    active: Option<usize>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Active index with -1 for no selection
    pub fn active_index(&self) -> isize {
        self.active.map_or(-1, |i| i as isize)
    }

    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Apply a key press. `open` is the panel visibility; lengths describe
    /// the two halves of the merged list.
    pub fn handle(&mut self, key: Key, open: bool, suggestions: usize, recents: usize) -> KeyOutcome {
        if !open {
            return KeyOutcome::Ignored;
        }
        let total = suggestions + recents;

        match key {
            Key::ArrowDown => {
                if total == 0 {
                    return KeyOutcome::Ignored;
                }
                self.active = Some(match self.active {
                    Some(i) => (i + 1) % total,
                    None => 0,
                });
                KeyOutcome::Moved
            }
            Key::ArrowUp => {
                if total == 0 {
                    return KeyOutcome::Ignored;
                }
                // (active - 1 + N) mod N, with no selection counting as -1
                self.active = Some(match self.active {
                    Some(i) => (i + total - 1) % total,
                    None => (2 * total - 2) % total,
                });
                KeyOutcome::Moved
            }
            Key::Tab => {
                if suggestions == 0 {
                    return KeyOutcome::Ignored;
                }
                self.active = Some(0);
                KeyOutcome::AdoptFirst
            }
            Key::Enter => match self.active {
                Some(i) if i < total => KeyOutcome::Commit(i),
                _ => KeyOutcome::Submit,
            },
            Key::Escape => {
                self.active = None;
                KeyOutcome::Close
            }
        }
    }

    /// Keep the selection valid after the list shrank or grew
    pub fn clamp(&mut self, total: usize) {
        if let Some(i) = self.active {
            if total == 0 {
                self.active = None;
            } else if i >= total {
                self.active = Some(total - 1);
            }
        }
    }
}
