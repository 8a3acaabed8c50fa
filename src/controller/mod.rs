//! Search suggestion controller
//!
//! One parameterised typeahead shared by every storefront search box:
//! products, factories, offers and the site-wide header search.

mod session;
mod state;

pub use session::{
    ControllerConfig, ControllerEvent, NavigationRequest, NavigationSink, PanelEntry,
    SearchController,
};
pub use state::{Action, Effect, SessionState};
