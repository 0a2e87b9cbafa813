//! Detail page extraction: one estate page becomes one or more rows.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};
use serde::{Serialize, Serializer};

use crate::html::{element_text, normalize_whitespace, select_text, selector};
use crate::location::{parse_location, LocationParts};
use crate::names::{split_attorney_name, split_representative_name, strip_role};

static ESTATE_NUMBER: LazyLock<Selector> = LazyLock::new(|| selector("#lblEstateNumber"));
static DATE_OF_FILING: LazyLock<Selector> = LazyLock::new(|| selector("#lblDateOfFiling"));
static DATE_OF_WILL: LazyLock<Selector> = LazyLock::new(|| selector("#lblDateOfWill"));
static CASE_TYPE: LazyLock<Selector> = LazyLock::new(|| selector("#lblType"));
static STATUS: LazyLock<Selector> = LazyLock::new(|| selector("#lblStatus"));
static WILL: LazyLock<Selector> = LazyLock::new(|| selector("#lblWill"));
static DECEDENT: LazyLock<Selector> = LazyLock::new(|| selector("#lblName"));
static DATE_OF_DEATH: LazyLock<Selector> = LazyLock::new(|| selector("#lblDateOfDeath"));
static ATTORNEY: LazyLock<Selector> = LazyLock::new(|| selector("#lblAttorney"));
static ATTORNEY_LOCATION: LazyLock<Selector> = LazyLock::new(|| selector("#lblAttorney small"));
static REPRESENTATIVES: LazyLock<Selector> = LazyLock::new(|| selector("#lblPersonalReps"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));

const COUNTY_CELL_MARKER: &str = "Estate Record";

/// Case-level fields shared by every row of one detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaseRecord {
    pub estate_number: String,
    pub county: String,
    pub date_of_filing: String,
    pub date_of_will: String,
    #[serde(rename = "type")]
    pub case_type: String,
    pub status: String,
    pub will: String,
    pub decedent: String,
    pub date_of_death: String,
    /// Not published on the detail page; always blank.
    pub decedent_address: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attorney {
    pub first_name: String,
    pub last_name: String,
    pub location: LocationParts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Representative {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub location: LocationParts,
}

impl Representative {
    pub fn is_blank(&self) -> bool {
        self.first_name.is_empty()
            && self.middle_name.is_empty()
            && self.last_name.is_empty()
            && self.location.is_blank()
    }
}

/// One output row: a case joined with its attorney and one representative.
///
/// Serializes as a single flat object with `attorney_` and `pr_` prefixed
/// keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRow {
    pub case: CaseRecord,
    pub attorney: Attorney,
    pub representative: Representative,
}

#[derive(Serialize)]
struct FlatRow<'a> {
    #[serde(flatten)]
    case: &'a CaseRecord,
    attorney_first_name: &'a str,
    attorney_last_name: &'a str,
    attorney_address: &'a str,
    attorney_city: &'a str,
    attorney_state: &'a str,
    attorney_zip: &'a str,
    pr_first_name: &'a str,
    pr_middle_name: &'a str,
    pr_last_name: &'a str,
    pr_address: &'a str,
    pr_city: &'a str,
    pr_state: &'a str,
    pr_zip: &'a str,
}

impl Serialize for OutputRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let attorney = &self.attorney;
        let rep = &self.representative;
        FlatRow {
            case: &self.case,
            attorney_first_name: &attorney.first_name,
            attorney_last_name: &attorney.last_name,
            attorney_address: &attorney.location.address,
            attorney_city: &attorney.location.city,
            attorney_state: &attorney.location.state,
            attorney_zip: &attorney.location.zip,
            pr_first_name: &rep.first_name,
            pr_middle_name: &rep.middle_name,
            pr_last_name: &rep.last_name,
            pr_address: &rep.location.address,
            pr_city: &rep.location.city,
            pr_state: &rep.location.state,
            pr_zip: &rep.location.zip,
        }
        .serialize(serializer)
    }
}

/// Reduces an `Estate Record (Baltimore County)` label to `Baltimore`.
/// Labels without a parenthesis yield an empty county.
pub fn parse_county(label: &str) -> String {
    match label.split('(').nth(1) {
        Some(part) => part.replace("County)", "").replace(')', "").trim().to_string(),
        None => String::new(),
    }
}

/// Text of the innermost cell holding the record title. Layout tables nest
/// the title cell, so outer cells match too.
fn county_label(doc: &Html) -> String {
    let holds_marker = |cell: &ElementRef| element_text(*cell).contains(COUNTY_CELL_MARKER);
    doc.select(&CELL)
        .filter(holds_marker)
        .find(|cell| {
            !cell
                .select(&CELL)
                .any(|inner| inner.id() != cell.id() && holds_marker(&inner))
        })
        .map(element_text)
        .unwrap_or_default()
}

fn parse_case(doc: &Html, url: &str) -> CaseRecord {
    CaseRecord {
        estate_number: select_text(doc, &ESTATE_NUMBER),
        county: parse_county(&county_label(doc)),
        date_of_filing: select_text(doc, &DATE_OF_FILING),
        date_of_will: select_text(doc, &DATE_OF_WILL),
        case_type: select_text(doc, &CASE_TYPE),
        status: select_text(doc, &STATUS),
        will: select_text(doc, &WILL),
        decedent: select_text(doc, &DECEDENT),
        date_of_death: select_text(doc, &DATE_OF_DEATH),
        decedent_address: String::new(),
        url: url.to_string(),
    }
}

fn parse_attorney(doc: &Html) -> Attorney {
    let label = select_text(doc, &ATTORNEY);
    if label.is_empty() {
        return Attorney::default();
    }
    let name = split_attorney_name(strip_role(&label));
    Attorney {
        first_name: name.first,
        last_name: name.last,
        location: parse_location(&select_text(doc, &ATTORNEY_LOCATION)),
    }
}

/// Content of the representatives block between two `<br>` elements.
#[derive(Default)]
struct Segment {
    texts: Vec<String>,
    /// Text of the first `small` element, which holds the address.
    location: Option<String>,
}

impl Segment {
    fn text(&self) -> String {
        normalize_whitespace(&self.texts.join(" "))
    }

    fn location_text(&self) -> &str {
        self.location.as_deref().unwrap_or_default()
    }
}

/// Splits the block at every `<br>`, however deeply the entries are wrapped.
fn split_segments(container: ElementRef) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = Segment::default();
    walk_segments(container, &mut current, &mut segments);
    segments.push(current);
    segments
}

fn walk_segments(node: ElementRef, current: &mut Segment, segments: &mut Vec<Segment>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => current.texts.push(String::from(&**text)),
            Node::Element(el) if el.name() == "br" => {
                segments.push(std::mem::take(current));
            }
            Node::Element(_) => {
                let Some(el) = ElementRef::wrap(child) else {
                    continue;
                };
                if el.value().name() == "small" {
                    let text = element_text(el);
                    current.location.get_or_insert_with(|| text.clone());
                    current.texts.push(text);
                } else {
                    walk_segments(el, current, segments);
                }
            }
            _ => {}
        }
    }
}

fn parse_representatives(doc: &Html, url: &str) -> Vec<Representative> {
    let Some(container) = doc.select(&REPRESENTATIVES).next() else {
        return Vec::new();
    };

    let mut reps = Vec::new();
    for segment in split_segments(container) {
        let text = segment.text();
        if text.is_empty() {
            continue;
        }
        if !text.contains('[') {
            tracing::warn!("Skipping representative entry without role on {}: {:?}", url, text);
            continue;
        }
        let name = split_representative_name(strip_role(&text));
        reps.push(Representative {
            first_name: name.first,
            middle_name: name.middle,
            last_name: name.last,
            location: parse_location(segment.location_text()),
        });
    }
    reps
}

/// Extracts the rows of one detail page: one per listed representative, or
/// a single row with blank representative fields when none qualify.
/// Missing elements read as empty strings; this never fails.
pub fn extract_case_rows(html: &str, url: &str) -> Vec<OutputRow> {
    let doc = Html::parse_document(html);
    let case = parse_case(&doc, url);
    if case.estate_number.is_empty() {
        tracing::warn!("No estate number found on {}", url);
    }
    let attorney = parse_attorney(&doc);
    let reps = parse_representatives(&doc, url);

    if reps.is_empty() {
        return vec![OutputRow {
            case,
            attorney,
            representative: Representative::default(),
        }];
    }

    reps.into_iter()
        .map(|representative| OutputRow {
            case: case.clone(),
            attorney: attorney.clone(),
            representative,
        })
        .collect()
}
