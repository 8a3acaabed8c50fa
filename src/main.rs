//! storefront-search console driver
//!
//! Drives a search controller from stdin against the configured storefront
//! API. Plain lines replace the input text; `:` commands stand in for keys
//! and clicks.

use anyhow::Result;
use std::sync::Arc;
use storefront_search::{
    config::{self, Settings},
    controller::{NavigationRequest, SearchController},
    events::{EventBus, StorageEvent},
    history::{FileStorage, HistoryStorage},
    locales::{Direction, LocaleSignal, Translations},
    navigator::Key,
    network::HttpClient,
    suggest::{Scope, SearchDomain},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let (settings, source) = config::load()?;

    // Initialize logging
    let level = if settings.general.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting storefront-search v{}", storefront_search::VERSION);
    match source {
        Some(path) => info!("Loaded settings from: {}", path.display()),
        None => info!("No settings file found, using defaults"),
    }

    config::init(settings)?;
    let settings =
        config::get().ok_or_else(|| anyhow::anyhow!("Settings not initialized"))?;

    let client = HttpClient::with_settings(&settings.api)?;
    let storage_events = EventBus::new(64);
    let storage: Arc<dyn HistoryStorage> = Arc::new(
        FileStorage::new(settings.history_dir()).with_events(storage_events.clone()),
    );
    info!("Recent searches stored in {}", settings.history_dir().display());

    let translations = Translations::new();
    let mut controller = build_controller(
        settings,
        SearchDomain::Products,
        &client,
        &storage,
        &storage_events,
    )?;

    print_usage(settings);
    render(&controller, &translations);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle_line(&line, &mut controller) {
                    Command::Continue => {}
                    Command::SwitchDomain(domain) => {
                        controller = build_controller(
                            settings,
                            domain,
                            &client,
                            &storage,
                            &storage_events,
                        )?;
                        info!("Switched to {} search", domain);
                    }
                    Command::Quit => break,
                }
                render(&controller, &translations);
            }
            applied = controller.pump() => {
                if applied {
                    render(&controller, &translations);
                }
            }
        }
    }

    Ok(())
}

fn build_controller(
    settings: &Settings,
    domain: SearchDomain,
    client: &HttpClient,
    storage: &Arc<dyn HistoryStorage>,
    storage_events: &EventBus<StorageEvent>,
) -> Result<SearchController> {
    let mut controller = SearchController::from_settings(
        settings,
        domain,
        client.clone(),
        Arc::clone(storage),
        |request: NavigationRequest| {
            println!(
                "-> navigate: {} search for '{}' (page {})",
                request.domain, request.term, request.page
            );
        },
    )?;
    controller.watch_storage(storage_events.subscribe());
    controller.focus();
    Ok(controller)
}

enum Command {
    Continue,
    SwitchDomain(SearchDomain),
    Quit,
}

fn handle_line(line: &str, controller: &mut SearchController) -> Command {
    let Some(command) = line.strip_prefix(':') else {
        controller.type_text(line);
        return Command::Continue;
    };

    let (name, arg) = match command.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "down" => controller.key(Key::ArrowDown),
        "up" => controller.key(Key::ArrowUp),
        "tab" => controller.key(Key::Tab),
        "enter" => controller.key(Key::Enter),
        "esc" => controller.key(Key::Escape),
        "focus" => controller.focus(),
        "click-outside" => controller.click_outside(),
        "submit" => controller.submit(),
        "pick" => match arg.parse() {
            Ok(index) => controller.select(index),
            Err(_) => warn!("Usage: :pick <index>"),
        },
        "rm" => controller.remove_recent(arg),
        "clear" => controller.clear_history(),
        "history" => {
            for (i, recent) in controller.recents().iter().enumerate() {
                println!("  {}. {}", i + 1, recent);
            }
        }
        "locale" => controller.set_locale(LocaleSignal::new(arg)),
        "scope" => controller.set_scope(parse_scope(arg)),
        "domain" => match arg.parse() {
            Ok(domain) => return Command::SwitchDomain(domain),
            Err(e) => warn!("{}", e),
        },
        "quit" | "q" => return Command::Quit,
        _ => warn!("Unknown command: :{}", name),
    }
    Command::Continue
}

/// `category <id>`, `factory <id>`, or empty to clear
fn parse_scope(arg: &str) -> Option<Scope> {
    match arg.split_once(' ') {
        Some(("category", id)) => Some(Scope::Category(id.trim().to_string())),
        Some(("factory", id)) => Some(Scope::Factory(id.trim().to_string())),
        _ => None,
    }
}

fn render(controller: &SearchController, t: &Translations) {
    let state = controller.state();
    let locale = controller.locale();
    let lang = locale.locale.as_str();

    let align = |text: String| match locale.direction() {
        Direction::Rtl => format!("{:>60}", text),
        Direction::Ltr => text,
    };

    let mut header = format!("[{}] > {}", controller.domain(), state.input());
    if state.is_loading() {
        header.push_str(&format!("  ({})", t.get(lang, "loading").unwrap_or("...")));
    }
    println!("{}", align(header));

    if !state.is_open() {
        return;
    }

    let entries = controller.entries();
    if state.suggestions().is_empty() && !state.input().trim().is_empty() && !state.is_loading() {
        println!("{}", align(format!("  {}", t.get(lang, "no_results").unwrap_or(""))));
    }

    let mut in_recents = false;
    for (i, entry) in entries.iter().enumerate() {
        if i == 0 && !entry.is_recent {
            println!("{}", align(format!("  {}", t.get(lang, "suggestions").unwrap_or(""))));
        }
        if entry.is_recent && !in_recents {
            in_recents = true;
            println!("{}", align(format!("  {}", t.get(lang, "recent_searches").unwrap_or(""))));
        }

        let label = match controller.highlight(entry.label) {
            Some(h) => format!("{}[{}]{}", h.before, h.matched, h.after),
            None => entry.label.to_string(),
        };
        let marker = if entry.active { '>' } else { ' ' };
        println!("{}", align(format!("  {} {}. {}", marker, entry.index, label)));
    }
}

/// Print usage information
fn print_usage(settings: &Settings) {
    println!(
        r#"
{} search v{}

Type a line to replace the search text. Commands:
    :down :up :tab :enter :esc    keyboard navigation
    :pick <index>                 click an entry
    :click-outside :focus         close / reopen the panel
    :submit                       submit the typed text
    :rm <query> :clear :history   manage recent searches
    :locale <code>                switch display locale (ar, en)
    :scope category|factory <id>  narrow suggestions (empty clears)
    :domain <name>                products, factories, offers, site
    :quit

ENVIRONMENT VARIABLES:
    STOREFRONT_SETTINGS_PATH  Path to settings.yml
    STOREFRONT_API_URL        Storefront API base URL
    STOREFRONT_DEBOUNCE_MS    Suggestion debounce in milliseconds
    STOREFRONT_HISTORY_DIR    Directory for recent searches
    STOREFRONT_LOCALE         Initial display locale
    STOREFRONT_DEBUG          Enable debug logging (true/false)
"#,
        settings.general.app_name,
        storefront_search::VERSION
    );
}
