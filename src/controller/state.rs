//! Search session state and its transitions

use crate::navigator::{Key, KeyOutcome, Navigator};
use crate::suggest::SuggestionItem;
use tracing::debug;

/// Everything that can happen to a search session
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Input focused; show the panel
    Open,
    /// User edited the input; `generation` identifies the fetch it scheduled
    QueryChanged { text: String, generation: u64 },
    FetchStarted { generation: u64 },
    ResultsArrived {
        generation: u64,
        items: Vec<SuggestionItem>,
    },
    FetchFailed { generation: u64 },
    /// Pending fetch dropped; later events for older generations are stale
    FetchCancelled { generation: u64 },
    Key(Key),
    /// Entry at a merged index clicked
    Select(usize),
    ClickOutside,
    /// Form submitted with the raw input text
    Submit,
    Close,
    HistoryChanged(Vec<String>),
    LocaleChanged { prefer_alt: bool },
}

/// Follow-up work a transition asks of the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// A suggestion or recent search was chosen
    Commit(String),
    /// The typed text was submitted as is
    Submit(String),
}

/// Transient state of one search box
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    input: String,
    loading: bool,
    open: bool,
    nav: Navigator,
    suggestions: Vec<SuggestionItem>,
    recents: Vec<String>,
    generation: u64,
    revision: u64,
    prefer_alt: bool,
}

impl SessionState {
    pub fn new(recents: Vec<String>, prefer_alt: bool) -> Self {
        Self {
            recents,
            prefer_alt,
            ..Default::default()
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn active(&self) -> Option<usize> {
        self.nav.active()
    }

    /// Active index with -1 for no selection
    pub fn active_index(&self) -> isize {
        self.nav.active_index()
    }

    pub fn suggestions(&self) -> &[SuggestionItem] {
        &self.suggestions
    }

    pub fn recents(&self) -> &[String] {
        &self.recents
    }

    pub fn prefers_alt(&self) -> bool {
        self.prefer_alt
    }

    /// Length of the merged `[suggestions, recents]` list
    pub fn total(&self) -> usize {
        self.suggestions.len() + self.recents.len()
    }

    /// Bumped whenever the suggestion list is replaced
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Text an entry of the merged list commits to
    pub fn value_at(&self, index: usize) -> Option<&str> {
        match self.suggestions.get(index) {
            Some(item) => Some(item.label(self.prefer_alt)),
            None => self
                .recents
                .get(index - self.suggestions.len())
                .map(String::as_str),
        }
    }

    /// Apply an action, returning the effect it triggers
    pub fn apply(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::Open => {
                self.open = true;
                None
            }
            Action::QueryChanged { text, generation } => {
                if text.trim().is_empty() {
                    self.replace_suggestions(Vec::new());
                }
                self.input = text;
                self.generation = generation;
                self.loading = false;
                self.open = true;
                self.nav.reset();
                None
            }
            Action::FetchStarted { generation } => {
                if self.is_current(generation) {
                    self.loading = true;
                }
                None
            }
            Action::ResultsArrived { generation, items } => {
                if self.is_current(generation) {
                    self.replace_suggestions(items);
                    self.loading = false;
                }
                None
            }
            Action::FetchFailed { generation } => {
                if self.is_current(generation) {
                    self.replace_suggestions(Vec::new());
                    self.loading = false;
                }
                None
            }
            Action::FetchCancelled { generation } => {
                self.generation = generation;
                self.loading = false;
                None
            }
            Action::Key(key) => self.handle_key(key),
            Action::Select(index) => {
                if index < self.total() {
                    self.commit(index)
                } else {
                    None
                }
            }
            Action::ClickOutside | Action::Close => {
                self.open = false;
                self.nav.reset();
                None
            }
            Action::Submit => Some(self.submit()),
            Action::HistoryChanged(recents) => {
                self.recents = recents;
                self.nav.clamp(self.total());
                None
            }
            Action::LocaleChanged { prefer_alt } => {
                self.prefer_alt = prefer_alt;
                None
            }
        }
    }

    fn handle_key(&mut self, key: Key) -> Option<Effect> {
        let outcome = self
            .nav
            .handle(key, self.open, self.suggestions.len(), self.recents.len());

        match outcome {
            // A closed panel leaves Enter to the surrounding form
            KeyOutcome::Ignored if key == Key::Enter => Some(self.submit()),
            KeyOutcome::Ignored | KeyOutcome::Moved => None,
            KeyOutcome::AdoptFirst => {
                if let Some(first) = self.suggestions.first() {
                    self.input = first.label(self.prefer_alt).to_string();
                }
                None
            }
            KeyOutcome::Commit(index) => self.commit(index),
            KeyOutcome::Submit => Some(self.submit()),
            KeyOutcome::Close => {
                self.open = false;
                None
            }
        }
    }

    fn commit(&mut self, index: usize) -> Option<Effect> {
        let value = self.value_at(index)?.to_string();
        self.input = value.clone();
        self.open = false;
        self.nav.reset();
        Some(Effect::Commit(value))
    }

    fn submit(&mut self) -> Effect {
        self.open = false;
        self.nav.reset();
        Effect::Submit(self.input.trim().to_string())
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping stale fetch event for generation {} (current {})",
                generation, self.generation
            );
            return false;
        }
        true
    }

    fn replace_suggestions(&mut self, items: Vec<SuggestionItem>) {
        self.suggestions = items;
        self.revision = self.revision.wrapping_add(1);
        self.nav.clamp(self.total());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milk() -> SuggestionItem {
        SuggestionItem::new("1", "Milk", "حليب")
    }

    fn typed(state: &mut SessionState, text: &str, generation: u64) {
        state.apply(Action::QueryChanged {
            text: text.to_string(),
            generation,
        });
    }

    #[test]
    fn test_blank_query_clears_suggestions() {
        let mut state = SessionState::default();
        typed(&mut state, "mi", 1);
        state.apply(Action::ResultsArrived {
            generation: 1,
            items: vec![milk()],
        });
        assert_eq!(state.suggestions().len(), 1);

        typed(&mut state, "  ", 2);
        assert!(state.suggestions().is_empty());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let mut state = SessionState::default();
        typed(&mut state, "mi", 1);
        state.apply(Action::FetchStarted { generation: 1 });
        typed(&mut state, "milk", 2);
        state.apply(Action::FetchStarted { generation: 2 });
        state.apply(Action::ResultsArrived {
            generation: 2,
            items: vec![milk()],
        });

        // Older request answers last
        state.apply(Action::ResultsArrived {
            generation: 1,
            items: vec![SuggestionItem::new("9", "Mint", "")],
        });

        assert_eq!(state.suggestions(), [milk()]);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_loading_tracks_current_request() {
        let mut state = SessionState::default();
        typed(&mut state, "x", 1);
        state.apply(Action::FetchStarted { generation: 1 });
        assert!(state.is_loading());

        state.apply(Action::FetchFailed { generation: 1 });
        assert!(!state.is_loading());
        assert!(state.suggestions().is_empty());
    }

    #[test]
    fn test_commit_suggestion_uses_alt_name() {
        let mut state = SessionState::new(vec![], true);
        typed(&mut state, "milk", 1);
        state.apply(Action::ResultsArrived {
            generation: 1,
            items: vec![milk()],
        });
        state.apply(Action::Key(Key::ArrowDown));

        let effect = state.apply(Action::Key(Key::Enter));
        assert_eq!(effect, Some(Effect::Commit("حليب".to_string())));
        assert_eq!(state.input(), "حليب");
        assert!(!state.is_open());
        assert_eq!(state.active_index(), -1);
    }

    #[test]
    fn test_commit_recent_is_verbatim() {
        let mut state = SessionState::new(vec!["Rice ".to_string(), "oil".to_string()], false);
        state.apply(Action::Open);

        let effect = state.apply(Action::Select(0));
        assert_eq!(effect, Some(Effect::Commit("Rice ".to_string())));
    }

    #[test]
    fn test_enter_without_selection_submits_raw_text() {
        let mut state = SessionState::default();
        typed(&mut state, " sugar ", 1);
        let effect = state.apply(Action::Key(Key::Enter));
        assert_eq!(effect, Some(Effect::Submit("sugar".to_string())));

        // Panel is closed now; Enter still submits through the form
        let effect = state.apply(Action::Key(Key::Enter));
        assert_eq!(effect, Some(Effect::Submit("sugar".to_string())));
    }

    #[test]
    fn test_tab_adopts_first_suggestion() {
        let mut state = SessionState::new(vec!["tea".to_string()], false);
        typed(&mut state, "mi", 1);
        state.apply(Action::ResultsArrived {
            generation: 1,
            items: vec![milk(), SuggestionItem::new("2", "Mint", "نعناع")],
        });

        assert_eq!(state.apply(Action::Key(Key::Tab)), None);
        assert_eq!(state.input(), "Milk");
        assert_eq!(state.active(), Some(0));
        assert!(state.is_open());
    }

    #[test]
    fn test_escape_keeps_input() {
        let mut state = SessionState::new(vec!["tea".to_string()], false);
        typed(&mut state, "te", 1);
        state.apply(Action::Key(Key::ArrowDown));
        state.apply(Action::Key(Key::Escape));

        assert_eq!(state.input(), "te");
        assert!(!state.is_open());
        assert_eq!(state.active_index(), -1);

        // Closed panel swallows navigation
        state.apply(Action::Key(Key::ArrowDown));
        assert_eq!(state.active_index(), -1);
    }

    #[test]
    fn test_click_outside_resets() {
        let mut state = SessionState::new(vec!["tea".to_string()], false);
        state.apply(Action::Open);
        state.apply(Action::Key(Key::ArrowDown));
        state.apply(Action::ClickOutside);
        assert!(!state.is_open());
        assert_eq!(state.active(), None);
    }

    #[test]
    fn test_active_index_stays_in_bounds() {
        let mut state = SessionState::new(vec!["a".into(), "b".into()], false);
        typed(&mut state, "x", 1);
        state.apply(Action::ResultsArrived {
            generation: 1,
            items: vec![milk()],
        });
        state.apply(Action::Key(Key::ArrowUp));
        state.apply(Action::Key(Key::ArrowDown));
        assert_eq!(state.active(), Some(2));

        state.apply(Action::HistoryChanged(vec!["a".into()]));
        assert_eq!(state.active(), Some(1));
        assert!(state.active_index() < state.total() as isize);
    }

    #[test]
    fn test_cancelled_fetch_ignores_late_events() {
        let mut state = SessionState::default();
        typed(&mut state, "rice", 1);
        state.apply(Action::FetchStarted { generation: 1 });
        state.apply(Action::FetchCancelled { generation: 2 });
        assert!(!state.is_loading());

        state.apply(Action::ResultsArrived {
            generation: 1,
            items: vec![milk()],
        });
        assert!(state.suggestions().is_empty());
    }
}
