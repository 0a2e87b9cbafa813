//! Replay of the search form's hidden postback protocol.
//!
//! The walk is an explicit value: [`PaginationState::request`] says what to
//! send next and [`PaginationState::advance`] consumes the response, returning
//! the next state together with the detail links found on that page. Nothing
//! is kept between steps except what the state value carries.

use std::fmt;
use std::sync::LazyLock;

use mdprobate_api::form::{
    pager_form, EVENT_VALIDATION_FIELD, VIEWSTATE_FIELD, VIEWSTATE_GENERATOR_FIELD,
};
use mdprobate_api::{FormPayload, SearchFilter, ViewState};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::html::selector;
use crate::links::result_links;

/// Pager links are `javascript:__doPostBack('<target>','')` calls.
const PAGER_HREF_PREFIX: &str = "javascript:__doPostBack('dgSearchResults$ctl24$ctl";
const PAGER_HREF_SUFFIX: &str = "','')";

static VIEWSTATE_INPUT: LazyLock<Selector> =
    LazyLock::new(|| selector(&format!("input#{}", VIEWSTATE_FIELD)));
static GENERATOR_INPUT: LazyLock<Selector> =
    LazyLock::new(|| selector(&format!("input#{}", VIEWSTATE_GENERATOR_FIELD)));
static VALIDATION_INPUT: LazyLock<Selector> =
    LazyLock::new(|| selector(&format!("input#{}", EVENT_VALIDATION_FIELD)));
static CURRENT_PAGE_MARKER: LazyLock<Selector> = LazyLock::new(|| selector(".grid-pager span"));

/// Server state needed to ask for the next results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken {
    pub view_state: ViewState,
    /// Raw pager token (e.g. `"01"`); empty when there is no next page.
    pub page_number: String,
}

impl PageToken {
    pub fn has_next_page(&self) -> bool {
        !self.page_number.is_empty()
    }
}

/// Which request of the session a failure happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The initial GET of the bare search form.
    SearchForm,
    /// Request #1, the filter submission (results page 1).
    Search,
    /// A pager postback for the given results page (2 and up).
    Page(usize),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::SearchForm => write!(f, "search form"),
            Stage::Search => write!(f, "search"),
            Stage::Page(page) => write!(f, "results page {}", page),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The fetcher returned nothing.
    FetchFailed,
    /// The response lacked one of the three hidden state fields.
    MissingViewState,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::FetchFailed => write!(f, "no response"),
            FailureReason::MissingViewState => write!(f, "hidden view-state fields missing"),
        }
    }
}

/// Why a walk ended in [`PaginationState::Failed`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{stage}: {reason}")]
pub struct PaginationFailure {
    pub stage: Stage,
    pub reason: FailureReason,
}

/// What the next request of the session looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Get,
    Post(FormPayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationState {
    /// Nothing fetched yet; the bare form is requested next.
    Init,
    /// Holding the form's hidden tokens; the filter is submitted next.
    Searched { view_state: ViewState },
    /// Holding a token for `page`; a pager postback is sent next.
    Paging { token: PageToken, page: usize },
    /// The last results page has been read.
    Done { pages: usize },
    Failed(PaginationFailure),
}

/// Outcome of feeding one response into the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub state: PaginationState,
    /// Detail links on the page just read, in page order.
    pub urls: Vec<String>,
}

impl Step {
    fn to(state: PaginationState) -> Self {
        Self {
            state,
            urls: Vec::new(),
        }
    }

    fn failed(stage: Stage, reason: FailureReason) -> Self {
        Self::to(PaginationState::Failed(PaginationFailure { stage, reason }))
    }
}

impl PaginationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaginationState::Done { .. } | PaginationState::Failed(_))
    }

    /// The request to send in this state; `None` once terminal.
    pub fn request(&self, filter: &SearchFilter) -> Option<PageRequest> {
        match self {
            PaginationState::Init => Some(PageRequest::Get),
            PaginationState::Searched { view_state } => {
                Some(PageRequest::Post(filter.to_form(view_state)))
            }
            PaginationState::Paging { token, .. } => Some(PageRequest::Post(pager_form(
                &token.view_state,
                &token.page_number,
            ))),
            PaginationState::Done { .. } | PaginationState::Failed(_) => None,
        }
    }

    /// Consumes the response to [`request`](Self::request).
    ///
    /// A missing response or missing hidden fields fail the walk on every
    /// request. A results page without a next-page link ends it normally,
    /// keeping that page's links.
    pub fn advance(self, response: Option<&str>, results_base: &Url) -> Step {
        match self {
            PaginationState::Init => {
                let Some(html) = response else {
                    return Step::failed(Stage::SearchForm, FailureReason::FetchFailed);
                };
                let doc = Html::parse_document(html);
                match parse_view_state(&doc) {
                    Some(view_state) => Step::to(PaginationState::Searched { view_state }),
                    None => Step::failed(Stage::SearchForm, FailureReason::MissingViewState),
                }
            }
            PaginationState::Searched { .. } => read_results_page(1, response, results_base),
            PaginationState::Paging { page, .. } => {
                read_results_page(page, response, results_base)
            }
            terminal => Step::to(terminal),
        }
    }
}

fn read_results_page(page: usize, response: Option<&str>, results_base: &Url) -> Step {
    let stage = if page <= 1 {
        Stage::Search
    } else {
        Stage::Page(page)
    };
    let Some(html) = response else {
        return Step::failed(stage, FailureReason::FetchFailed);
    };
    let doc = Html::parse_document(html);
    let Some(token) = parse_page_token(&doc) else {
        return Step::failed(stage, FailureReason::MissingViewState);
    };

    let urls = result_links(&doc, results_base);
    let state = if token.has_next_page() {
        PaginationState::Paging {
            token,
            page: page + 1,
        }
    } else {
        PaginationState::Done { pages: page }
    };
    Step { state, urls }
}

fn hidden_value(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .next()
        .map(|input| input.value().attr("value").unwrap_or_default().to_string())
}

/// Reads the three hidden state fields. `None` if any element is missing;
/// an element without a `value` attribute reads as empty.
pub fn parse_view_state(doc: &Html) -> Option<ViewState> {
    Some(ViewState {
        view_state: hidden_value(doc, &VIEWSTATE_INPUT)?,
        generator: hidden_value(doc, &GENERATOR_INPUT)?,
        event_validation: hidden_value(doc, &VALIDATION_INPUT)?,
    })
}

/// Finds the pager link right after the current-page marker and recovers
/// its page token. Empty when there is no such link or its href does not
/// have the expected `__doPostBack` shape.
pub fn parse_next_page(doc: &Html) -> String {
    let Some(marker) = doc.select(&CURRENT_PAGE_MARKER).next() else {
        return String::new();
    };
    let next_link = marker
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a");
    next_link
        .and_then(|link| link.value().attr("href"))
        .map(page_number_from_href)
        .unwrap_or_default()
}

/// Strips the `__doPostBack` wrapper from a pager href.
pub fn page_number_from_href(href: &str) -> String {
    href.trim()
        .strip_prefix(PAGER_HREF_PREFIX)
        .and_then(|rest| rest.strip_suffix(PAGER_HREF_SUFFIX))
        .map(|token| token.trim().to_string())
        .unwrap_or_default()
}

/// Hidden state plus next-page token; `None` when hidden state is missing.
pub fn parse_page_token(doc: &Html) -> Option<PageToken> {
    let view_state = parse_view_state(doc)?;
    Some(PageToken {
        view_state,
        page_number: parse_next_page(doc),
    })
}
