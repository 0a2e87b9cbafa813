//! Pager postbacks: requesting page N of an existing search session.

use super::common::{FormPayload, ViewState};

/// Control-name prefix of the results grid's pager links.
pub const PAGER_EVENT_TARGET_PREFIX: &str = "dgSearchResults$ctl24$ctl";

/// Builds the event target that asks the grid for the given page token.
pub fn pager_event_target(page_number: &str) -> String {
    format!("{}{}", PAGER_EVENT_TARGET_PREFIX, page_number)
}

/// Builds the payload for request #2 onward. The search filter itself is
/// not resent; the server keeps it in the view state.
pub fn pager_form(view_state: &ViewState, page_number: &str) -> FormPayload {
    let payload = FormPayload::new()
        .with_field("__EVENTTARGET", pager_event_target(page_number))
        .with_empty("__EVENTARGUMENT");
    view_state.append_to(payload)
}
