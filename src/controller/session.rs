//! Search controller wiring state, fetcher, history and navigation

use super::state::{Action, Effect, SessionState};
use crate::config::Settings;
use crate::events::{EventBus, StorageEvent, Subscription};
use crate::highlight::{Highlight, Highlighter};
use crate::history::{HistoryStorage, RecentHistory};
use crate::locales::LocaleSignal;
use crate::navigator::Key;
use crate::network::HttpClient;
use crate::suggest::{
    FetchEvent, RemoteSource, Scope, SearchDomain, SuggestionFetcher, SuggestionItem,
    SuggestionSource,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Request handed to the page when a search should run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub domain: SearchDomain,
    pub term: String,
    /// Always 1: a new search restarts pagination
    pub page: u32,
}

/// Receives navigation requests; the page owns turning them into a refetch
pub trait NavigationSink: Send {
    fn navigate(&mut self, request: NavigationRequest);
}

impl<F> NavigationSink for F
where
    F: FnMut(NavigationRequest) + Send,
{
    fn navigate(&mut self, request: NavigationRequest) {
        self(request)
    }
}

/// Notifications for whoever renders the panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    PanelToggled { open: bool },
    LoadingChanged { loading: bool },
    SuggestionsUpdated { count: usize },
    RecentsUpdated { count: usize },
    Navigated(NavigationRequest),
}

/// Per-instance configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub domain: SearchDomain,
    pub debounce: Duration,
    pub max_suggestions: usize,
    pub max_recent: usize,
    /// Locale whose item names come from the alternate field
    pub alternate_locale: String,
    pub scope: Option<Scope>,
}

impl ControllerConfig {
    pub fn new(domain: SearchDomain) -> Self {
        Self {
            domain,
            debounce: Duration::from_millis(crate::DEFAULT_DEBOUNCE_MS),
            max_suggestions: crate::MAX_SUGGESTIONS,
            max_recent: crate::MAX_RECENT_SEARCHES,
            alternate_locale: "ar".to_string(),
            scope: None,
        }
    }

    pub fn from_settings(settings: &Settings, domain: SearchDomain) -> Self {
        Self {
            domain,
            debounce: Duration::from_millis(settings.suggest.debounce_ms),
            max_suggestions: settings.suggest.max_suggestions,
            max_recent: settings.history.max_entries,
            alternate_locale: settings.locale.alternate_locale.clone(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// One entry of the rendered panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelEntry<'a> {
    pub index: usize,
    pub label: &'a str,
    pub is_recent: bool,
    pub active: bool,
    pub image_url: Option<&'a str>,
}

/// Typeahead controller for one search box.
///
/// Synchronous methods handle user input; [`pump`](Self::pump) awaits the
/// next fetch or storage event and folds it into the state. All state
/// changes go through [`SessionState::apply`].
pub struct SearchController {
    config: ControllerConfig,
    state: SessionState,
    fetcher: SuggestionFetcher,
    fetch_rx: mpsc::UnboundedReceiver<FetchEvent>,
    history: RecentHistory,
    navigation: Box<dyn NavigationSink>,
    locale: LocaleSignal,
    highlighter: Highlighter,
    events: EventBus<ControllerEvent>,
    storage_events: Option<Subscription<StorageEvent>>,
}

impl SearchController {
    pub fn new(
        config: ControllerConfig,
        source: Arc<dyn SuggestionSource>,
        history: RecentHistory,
        navigation: impl NavigationSink + 'static,
        locale: LocaleSignal,
    ) -> Self {
        let (tx, fetch_rx) = mpsc::unbounded_channel();
        let fetcher =
            SuggestionFetcher::new(source, config.debounce, tx).with_max_items(config.max_suggestions);
        let state = SessionState::new(
            history.list().to_vec(),
            locale.prefers_alt(&config.alternate_locale),
        );

        debug!(
            "Search controller for {} loaded {} recent searches",
            config.domain,
            history.len()
        );

        Self {
            config,
            state,
            fetcher,
            fetch_rx,
            history,
            navigation: Box::new(navigation),
            locale,
            highlighter: Highlighter::default(),
            events: EventBus::default(),
            storage_events: None,
        }
    }

    /// Build a controller against the remote API described by `settings`
    pub fn from_settings(
        settings: &Settings,
        domain: SearchDomain,
        client: HttpClient,
        storage: Arc<dyn HistoryStorage>,
        navigation: impl NavigationSink + 'static,
    ) -> anyhow::Result<Self> {
        let config = ControllerConfig::from_settings(settings, domain);
        let locale = LocaleSignal::new(&settings.locale.default_locale);

        let source = RemoteSource::new(
            client,
            &settings.api.base_url,
            settings.endpoint(domain),
            domain,
        )?
        .with_limit(config.max_suggestions)
        .with_language(locale.locale.clone());

        let history = RecentHistory::load(storage, domain.storage_key(), config.max_recent);

        Ok(Self::new(config, Arc::new(source), history, navigation, locale))
    }

    pub fn domain(&self) -> SearchDomain {
        self.config.domain
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn input(&self) -> &str {
        self.state.input()
    }

    pub fn suggestions(&self) -> &[SuggestionItem] {
        self.state.suggestions()
    }

    pub fn recents(&self) -> &[String] {
        self.state.recents()
    }

    pub fn locale(&self) -> &LocaleSignal {
        &self.locale
    }

    /// Subscribe to panel notifications
    pub fn subscribe(&self) -> Subscription<ControllerEvent> {
        self.events.subscribe()
    }

    /// Reload recents whenever storage reports a write to this domain's key
    pub fn watch_storage(&mut self, events: Subscription<StorageEvent>) {
        self.storage_events = Some(events);
    }

    pub fn set_scope(&mut self, scope: Option<Scope>) {
        self.config.scope = scope;
    }

    pub fn set_locale(&mut self, locale: LocaleSignal) {
        let prefer_alt = locale.prefers_alt(&self.config.alternate_locale);
        self.fetcher.source().set_language(&locale.locale);
        self.locale = locale;
        self.dispatch(Action::LocaleChanged { prefer_alt });
    }

    pub fn focus(&mut self) {
        self.dispatch(Action::Open);
    }

    /// The input text changed
    pub fn type_text(&mut self, text: &str) {
        let generation = self.fetcher.schedule(text, self.config.scope.clone());
        self.dispatch(Action::QueryChanged {
            text: text.to_string(),
            generation,
        });
    }

    pub fn key(&mut self, key: Key) {
        self.dispatch(Action::Key(key));
    }

    /// Entry at a merged index was clicked
    pub fn select(&mut self, index: usize) {
        self.dispatch(Action::Select(index));
    }

    pub fn click_outside(&mut self) {
        self.dispatch(Action::ClickOutside);
    }

    pub fn close(&mut self) {
        self.dispatch(Action::Close);
    }

    pub fn submit(&mut self) {
        self.dispatch(Action::Submit);
    }

    /// Delete one recent search from the panel
    pub fn remove_recent(&mut self, query: &str) {
        if self.history.remove(query) {
            self.dispatch(Action::HistoryChanged(self.history.list().to_vec()));
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.dispatch(Action::HistoryChanged(Vec::new()));
    }

    /// First match of the current input inside `text`
    pub fn highlight<'a>(&self, text: &'a str) -> Option<Highlight<'a>> {
        self.highlighter.find(text)
    }

    /// Panel entries in display order
    pub fn entries(&self) -> Vec<PanelEntry<'_>> {
        let active = self.state.active();
        let prefer_alt = self.state.prefers_alt();
        let offset = self.state.suggestions().len();

        let suggestions = self
            .state
            .suggestions()
            .iter()
            .enumerate()
            .map(|(index, item)| PanelEntry {
                index,
                label: item.label(prefer_alt),
                is_recent: false,
                active: active == Some(index),
                image_url: item.image_url.as_deref(),
            });
        let recents = self
            .state
            .recents()
            .iter()
            .enumerate()
            .map(|(i, recent)| PanelEntry {
                index: offset + i,
                label: recent.as_str(),
                is_recent: true,
                active: active == Some(offset + i),
                image_url: None,
            });

        suggestions.chain(recents).collect()
    }

    /// Wait for the next fetch or storage event and apply it.
    ///
    /// Returns `false` when the storage subscription closed instead.
    pub async fn pump(&mut self) -> bool {
        let incoming = match self.storage_events.as_mut() {
            Some(storage) => tokio::select! {
                event = self.fetch_rx.recv() => Incoming::Fetch(event),
                event = storage.recv() => Incoming::Storage(event),
            },
            None => Incoming::Fetch(self.fetch_rx.recv().await),
        };

        match incoming {
            Incoming::Fetch(Some(event)) => {
                self.apply_fetch_event(event);
                true
            }
            Incoming::Storage(Some(event)) => {
                self.apply_storage_event(event);
                true
            }
            Incoming::Storage(None) => {
                self.storage_events = None;
                false
            }
            // The fetcher owns a sender for as long as we exist
            Incoming::Fetch(None) => false,
        }
    }

    /// Apply every event that is already queued, without waiting
    pub fn drain(&mut self) {
        while let Ok(event) = self.fetch_rx.try_recv() {
            self.apply_fetch_event(event);
        }
        let mut changed = Vec::new();
        if let Some(storage) = self.storage_events.as_mut() {
            while let Some(event) = storage.try_recv() {
                changed.push(event);
            }
        }
        for event in changed {
            self.apply_storage_event(event);
        }
    }

    fn apply_fetch_event(&mut self, event: FetchEvent) {
        let action = match event {
            FetchEvent::Started { generation } => Action::FetchStarted { generation },
            FetchEvent::Finished { generation, items } => {
                Action::ResultsArrived { generation, items }
            }
            FetchEvent::Failed { generation } => Action::FetchFailed { generation },
        };
        self.dispatch(action);
    }

    fn apply_storage_event(&mut self, event: StorageEvent) {
        let StorageEvent::Changed { key } = event;
        if key == self.history.key() {
            self.history.reload();
            self.dispatch(Action::HistoryChanged(self.history.list().to_vec()));
        }
    }

    fn dispatch(&mut self, action: Action) {
        let before = Snapshot::of(&self.state);

        if let Some(effect) = self.state.apply(action) {
            self.run(effect);
        }
        if self.highlighter.query() != self.state.input() {
            self.highlighter = Highlighter::new(self.state.input());
        }

        self.publish_changes(before);
    }

    fn run(&mut self, effect: Effect) {
        let term = match effect {
            Effect::Commit(value) => {
                info!("Committed '{}' in {} search", value, self.config.domain);
                value
            }
            Effect::Submit(text) => {
                info!("Submitted '{}' in {} search", text, self.config.domain);
                text
            }
        };

        // The chosen value replaces the query; nothing pending is wanted
        self.fetcher.cancel();
        self.state.apply(Action::FetchCancelled {
            generation: self.fetcher.generation(),
        });

        self.history.record(&term);
        self.state
            .apply(Action::HistoryChanged(self.history.list().to_vec()));

        let request = NavigationRequest {
            domain: self.config.domain,
            term,
            page: 1,
        };
        self.navigation.navigate(request.clone());
        self.events.publish(ControllerEvent::Navigated(request));
    }

    fn publish_changes(&self, before: Snapshot) {
        let after = Snapshot::of(&self.state);

        if after.open != before.open {
            self.events
                .publish(ControllerEvent::PanelToggled { open: after.open });
        }
        if after.loading != before.loading {
            self.events.publish(ControllerEvent::LoadingChanged {
                loading: after.loading,
            });
        }
        if after.revision != before.revision {
            self.events.publish(ControllerEvent::SuggestionsUpdated {
                count: self.state.suggestions().len(),
            });
        }
        if after.recents != before.recents {
            self.events.publish(ControllerEvent::RecentsUpdated {
                count: self.state.recents().len(),
            });
        }
    }
}

enum Incoming {
    Fetch(Option<FetchEvent>),
    Storage(Option<StorageEvent>),
}

struct Snapshot {
    open: bool,
    loading: bool,
    revision: u64,
    recents: Vec<String>,
}

impl Snapshot {
    fn of(state: &SessionState) -> Self {
        Self {
            open: state.is_open(),
            loading: state.is_loading(),
            revision: state.revision(),
            recents: state.recents().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::history::MemoryStorage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedSource {
        items: Vec<SuggestionItem>,
        fail: bool,
        calls: Mutex<Vec<String>>,
        language: Mutex<Option<String>>,
    }

    impl FixedSource {
        fn new(items: Vec<SuggestionItem>) -> Arc<Self> {
            Arc::new(Self {
                items,
                fail: false,
                calls: Mutex::new(Vec::new()),
                language: Mutex::new(None),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                items: Vec::new(),
                fail: true,
                calls: Mutex::new(Vec::new()),
                language: Mutex::new(None),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SuggestionSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn suggest(
            &self,
            query: &str,
            _scope: Option<&Scope>,
        ) -> Result<Vec<SuggestionItem>, FetchError> {
            self.calls.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(FetchError::Status(500));
            }
            Ok(self.items.clone())
        }

        fn set_language(&self, language: &str) {
            *self.language.lock().unwrap() = Some(language.to_string());
        }
    }

    type Navigations = Arc<Mutex<Vec<NavigationRequest>>>;

    fn controller(
        source: Arc<FixedSource>,
        storage: Arc<MemoryStorage>,
        locale: &str,
    ) -> (SearchController, Navigations) {
        let navigations: Navigations = Arc::default();
        let sink = navigations.clone();
        let history = RecentHistory::load(storage, SearchDomain::Products.storage_key(), 5);
        let controller = SearchController::new(
            ControllerConfig::new(SearchDomain::Products),
            source,
            history,
            move |request: NavigationRequest| sink.lock().unwrap().push(request),
            LocaleSignal::new(locale),
        );
        (controller, navigations)
    }

    fn milk() -> SuggestionItem {
        SuggestionItem::new("1", "Milk", "حليب")
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_suggestion_in_arabic() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut ctrl, navigations) = controller(FixedSource::new(vec![milk()]), storage.clone(), "ar");

        ctrl.focus();
        ctrl.type_text("milk");
        assert!(ctrl.pump().await);
        assert!(ctrl.state().is_loading());
        assert!(ctrl.pump().await);
        assert!(!ctrl.state().is_loading());
        assert_eq!(ctrl.suggestions(), [milk()]);

        ctrl.key(Key::ArrowDown);
        ctrl.key(Key::Enter);

        assert_eq!(ctrl.input(), "حليب");
        assert!(!ctrl.state().is_open());
        assert_eq!(ctrl.state().active_index(), -1);
        assert_eq!(ctrl.recents()[0], "حليب");

        let stored = storage.read("recentProductSearches").unwrap().unwrap();
        assert_eq!(stored, r#"["حليب"]"#);

        let navigations = navigations.lock().unwrap();
        assert_eq!(
            *navigations,
            vec![NavigationRequest {
                domain: SearchDomain::Products,
                term: "حليب".to_string(),
                page: 1,
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_english_locale_commits_primary_name() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut ctrl, _) = controller(FixedSource::new(vec![milk()]), storage, "en");

        ctrl.type_text("mi");
        ctrl.pump().await;
        ctrl.pump().await;
        ctrl.select(0);
        assert_eq!(ctrl.input(), "Milk");
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_clears_suggestions() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut ctrl, _) = controller(FixedSource::failing(), storage, "ar");

        ctrl.type_text("x");
        ctrl.pump().await;
        assert!(ctrl.state().is_loading());
        ctrl.pump().await;

        assert!(ctrl.suggestions().is_empty());
        assert!(!ctrl.state().is_loading());
        assert!(ctrl.state().is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_issues_no_request() {
        let source = FixedSource::new(vec![milk()]);
        let storage = Arc::new(MemoryStorage::new());
        let (mut ctrl, _) = controller(source.clone(), storage, "ar");

        ctrl.type_text("milk");
        ctrl.type_text("   ");
        assert!(ctrl.suggestions().is_empty());

        tokio::time::sleep(Duration::from_secs(3)).await;
        ctrl.drain();
        assert!(source.calls().is_empty());
        assert!(!ctrl.state().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_fetches_final_text_once() {
        let source = FixedSource::new(vec![milk()]);
        let storage = Arc::new(MemoryStorage::new());
        let (mut ctrl, _) = controller(source.clone(), storage, "ar");

        for text in ["m", "mi", "mil", "milk"] {
            ctrl.type_text(text);
            tokio::time::sleep(Duration::from_millis(900)).await;
        }
        ctrl.pump().await;
        ctrl.pump().await;

        assert_eq!(source.calls(), vec!["milk".to_string()]);
        assert_eq!(ctrl.suggestions().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_without_selection_submits_typed_text() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut ctrl, navigations) = controller(FixedSource::new(vec![]), storage, "ar");

        ctrl.type_text("  basmati rice ");
        ctrl.key(Key::Enter);

        assert_eq!(ctrl.recents(), ["basmati rice"]);
        assert_eq!(navigations.lock().unwrap()[0].term, "basmati rice");

        // The cancelled fetch never reaches the source or the state
        tokio::time::sleep(Duration::from_secs(3)).await;
        ctrl.drain();
        assert!(!ctrl.state().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recent_entries_follow_suggestions() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .write("recentProductSearches", r#"["rice","oil"]"#)
            .unwrap();
        let (mut ctrl, navigations) = controller(FixedSource::new(vec![milk()]), storage, "en");

        ctrl.type_text("o");
        ctrl.pump().await;
        ctrl.pump().await;

        let entries = ctrl.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].label, "oil");
        assert!(entries[2].is_recent);

        ctrl.key(Key::ArrowUp);
        assert!(ctrl.entries()[1].active);
        ctrl.key(Key::ArrowDown);
        ctrl.key(Key::Enter);

        assert_eq!(navigations.lock().unwrap()[0].term, "oil");
        assert_eq!(ctrl.recents(), ["oil", "rice"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_recent_keeps_selection_valid() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .write("recentProductSearches", r#"["rice","oil"]"#)
            .unwrap();
        let (mut ctrl, _) = controller(FixedSource::new(vec![]), storage, "en");

        ctrl.focus();
        ctrl.key(Key::ArrowDown);
        ctrl.key(Key::ArrowDown);
        assert_eq!(ctrl.state().active(), Some(1));

        ctrl.remove_recent("oil");
        assert_eq!(ctrl.recents(), ["rice"]);
        assert_eq!(ctrl.state().active(), Some(0));

        ctrl.clear_history();
        assert!(ctrl.recents().is_empty());
        assert_eq!(ctrl.state().active(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_panel_events() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut ctrl, _) = controller(FixedSource::new(vec![milk()]), storage, "ar");
        let mut events = ctrl.subscribe();

        ctrl.type_text("milk");
        ctrl.pump().await;
        ctrl.pump().await;
        ctrl.click_outside();

        let mut seen = Vec::new();
        while let Some(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                ControllerEvent::PanelToggled { open: true },
                ControllerEvent::LoadingChanged { loading: true },
                ControllerEvent::LoadingChanged { loading: false },
                ControllerEvent::SuggestionsUpdated { count: 1 },
                ControllerEvent::PanelToggled { open: false },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_storage_reloads_recents() {
        let bus = EventBus::new(8);
        let storage = Arc::new(MemoryStorage::new().with_events(bus.clone()));
        let (mut ctrl, _) = controller(FixedSource::new(vec![]), storage.clone(), "ar");
        ctrl.watch_storage(bus.subscribe());

        // Another tab writes the list
        storage
            .write("recentProductSearches", r#"["flour"]"#)
            .unwrap();
        storage.write("recentOfferSearches", r#"["x"]"#).unwrap();

        assert!(ctrl.pump().await);
        assert_eq!(ctrl.recents(), ["flour"]);

        ctrl.drain();
        assert_eq!(ctrl.recents(), ["flour"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uppercase_locale_commits_alt_name() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut ctrl, _) = controller(FixedSource::new(vec![milk()]), storage, "AR-EG");

        ctrl.type_text("milk");
        ctrl.pump().await;
        ctrl.pump().await;
        ctrl.select(0);

        assert_eq!(ctrl.input(), "حليب");
        assert_eq!(ctrl.recents(), ["حليب"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_highlight_follows_input() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut ctrl, _) = controller(FixedSource::new(vec![milk()]), storage, "en");

        assert!(ctrl.highlight("Milk").is_none());
        ctrl.type_text("MI");
        assert_eq!(ctrl.highlight("Milk").unwrap().matched, "Mi");

        ctrl.pump().await;
        ctrl.pump().await;
        ctrl.select(0);
        assert_eq!(ctrl.highlight("Fresh milk powder").unwrap().matched, "milk");
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_locale_changes_committed_name() {
        let source = FixedSource::new(vec![milk()]);
        let storage = Arc::new(MemoryStorage::new());
        let (mut ctrl, _) = controller(source.clone(), storage, "en");

        ctrl.type_text("milk");
        ctrl.pump().await;
        ctrl.pump().await;
        ctrl.set_locale(LocaleSignal::new("ar"));
        assert!(ctrl.locale().is_rtl);
        assert_eq!(source.language.lock().unwrap().as_deref(), Some("ar"));

        ctrl.key(Key::Tab);
        assert_eq!(ctrl.input(), "حليب");
        assert!(ctrl.highlight("حليب طازج").is_some());
    }
}
