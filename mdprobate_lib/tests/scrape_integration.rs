use std::time::Duration;

use chrono::NaiveDate;
use mdprobate_lib::mdprobate_api::ClientOptions;
use mdprobate_lib::pagination::{FailureReason, Stage};
use mdprobate_lib::{
    PaginationFailure, PartyType, ProbateScraper, ScrapeConfig, ScrapeError, SearchFilter,
};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/RowNetWeb/Estates/frmEstateSearch2.aspx";
const DETAIL_PATH: &str = "/RowNetWeb/Estates/frmDocketImages.aspx";

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../mdprobate_api/tests/fixtures/{}", name)).unwrap()
}

fn config_for(server: &MockServer) -> ScrapeConfig {
    ScrapeConfig {
        base_url: server.uri(),
        detail_delay: Duration::ZERO,
        client: ClientOptions {
            timeout: Duration::from_secs(5),
            max_retries: 0,
            retry_base_delay: Duration::from_millis(10),
            retry_max_delay: Duration::from_millis(20),
            accept_invalid_certs: false,
        },
    }
}

fn january_filter() -> SearchFilter {
    SearchFilter::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        PartyType::PersonalRepresentative,
    )
}

async fn mount_search(server: &MockServer, page_2: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("search_form.html")))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .and(body_string_contains("cmdSearch=Search"))
        .and(body_string_contains("DateOfFilingFrom=01%2F01%2F2024"))
        .and(body_string_contains("cboPartyType=Personal+Representative"))
        .and(body_string_contains("__VIEWSTATEGENERATOR=C2EE9ABB"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("results_page1.html")))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .and(body_string_contains(
            "__EVENTTARGET=dgSearchResults%24ctl24%24ctl01",
        ))
        .and(body_string_contains("__EVENTVALIDATION=%2FwEdAAxpage1"))
        .respond_with(page_2)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, record_id: &str, fixture: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .and(query_param("RecordId", record_id))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture(fixture)))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn two_page_search_end_to_end() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_string(load_fixture("results_page2.html")),
    )
    .await;
    mount_detail(&server, "1001", "detail_two_reps.html", 1).await;
    mount_detail(&server, "1002", "detail_no_reps.html", 1).await;
    mount_detail(&server, "1003", "detail_one_rep.html", 1).await;

    let scraper = ProbateScraper::from_config(&config_for(&server)).unwrap();
    let rows = scraper.scrape(&january_filter(), None).await.unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].case.county, "Baltimore");
    assert_eq!(rows[0].attorney.last_name, "KLEIN");
    assert_eq!(rows[1].representative.last_name, "DER BERG");
    assert!(rows[2].representative.is_blank());
    assert_eq!(rows[3].case.county, "Baltimore City");
    assert_eq!(
        rows[3].case.url,
        format!("{}{}?src=row&RecordId=1003", server.uri(), DETAIL_PATH)
    );
}

#[tokio::test]
async fn record_limit_skips_later_cases() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_string(load_fixture("results_page2.html")),
    )
    .await;
    mount_detail(&server, "1001", "detail_two_reps.html", 1).await;
    mount_detail(&server, "1002", "detail_no_reps.html", 0).await;
    mount_detail(&server, "1003", "detail_one_rep.html", 0).await;

    let scraper = ProbateScraper::from_config(&config_for(&server)).unwrap();
    let rows = scraper.scrape(&january_filter(), Some(1)).await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn server_error_mid_walk_aborts_before_details() {
    let server = MockServer::start().await;
    mount_search(&server, ResponseTemplate::new(500).set_body_string("boom")).await;
    mount_detail(&server, "1001", "detail_two_reps.html", 0).await;
    mount_detail(&server, "1002", "detail_no_reps.html", 0).await;

    let scraper = ProbateScraper::from_config(&config_for(&server)).unwrap();
    let err = scraper.scrape(&january_filter(), None).await.unwrap_err();
    assert!(matches!(
        err,
        ScrapeError::Pagination(PaginationFailure {
            stage: Stage::Page(2),
            reason: FailureReason::FetchFailed,
        })
    ));
}

#[tokio::test]
async fn error_page_mid_walk_is_not_end_of_results() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_string(load_fixture("error_page.html")),
    )
    .await;

    let scraper = ProbateScraper::from_config(&config_for(&server)).unwrap();
    let err = scraper.collect_case_urls(&january_filter()).await.unwrap_err();
    assert!(matches!(
        err,
        ScrapeError::Pagination(PaginationFailure {
            reason: FailureReason::MissingViewState,
            ..
        })
    ));
}

#[tokio::test]
async fn single_case_lookup() {
    let server = MockServer::start().await;
    mount_detail(&server, "1003", "detail_one_rep.html", 1).await;

    let scraper = ProbateScraper::from_config(&config_for(&server)).unwrap();
    let url = format!("{}{}?src=row&RecordId=1003", server.uri(), DETAIL_PATH);
    let rows = scraper.scrape_case(&url).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].case.estate_number, "24-0003");

    let missing = format!("{}{}?src=row&RecordId=9999", server.uri(), DETAIL_PATH);
    assert!(scraper.scrape_case(&missing).await.is_empty());
}
