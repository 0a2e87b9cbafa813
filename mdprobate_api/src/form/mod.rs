mod common;
pub use self::common::{
    FormPayload, ViewState, EVENT_VALIDATION_FIELD, VIEWSTATE_FIELD, VIEWSTATE_GENERATOR_FIELD,
};

mod search;
pub use self::search::{PartyType, SearchFilter, FORM_DATE_FORMAT};

mod pager;
pub use self::pager::{pager_event_target, pager_form, PAGER_EVENT_TARGET_PREFIX};
