#![cfg(feature = "mock")]

mod common;

use albumrip::{
    BrowserPage, ConversionDriver, ConverterSite, MockBrowserLauncher, MockBrowserPage, MockPageElement,
    PageElement, Pipeline, RipError, ScrollCollector, ScrollSettings,
};
use common::{test_config, StubImages};

#[test_log::test(tokio::test)]
async fn test_missing_submit_never_waits_for_navigation() {
    let mut input = MockPageElement::new();
    input
        .expect_type_text()
        .withf(|text| text == "https://sc.example/t1")
        .times(1)
        .returning(|_| Ok(()));

    let mut page = MockBrowserPage::new();
    page.expect_query()
        .withf(|selector| selector == "input[class=form-control]")
        .return_once(move |_| Ok(Some(Box::new(input) as Box<dyn PageElement>)));
    page.expect_query()
        .withf(|selector| selector == "button[type=submit]")
        .returning(|_| Ok(None));
    page.expect_wait_for_navigation().times(0);

    let site = ConverterSite::default();
    let result = ConversionDriver::new(&page, &site)
        .convert("https://sc.example/t1")
        .await;

    match result {
        Err(RipError::FormLayout { selector, .. }) => {
            assert_eq!(selector, "button[type=submit]");
        }
        other => panic!("Expected form layout error, got: {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_collect_all_skips_elements_without_attribute() {
    let mut page = MockBrowserPage::new();
    page.expect_evaluate()
        .times(1)
        .returning(|_| Ok(serde_json::json!({ "scrollHeight": 600, "innerHeight": 600 })));
    page.expect_query_all()
        .withf(|selector| selector == "a.trackItem__trackTitle")
        .returning(|_| {
            let mut with_href = MockPageElement::new();
            with_href
                .expect_read_attribute()
                .returning(|_| Ok(Some("https://sc.example/t1".to_string())));
            let mut without_href = MockPageElement::new();
            without_href.expect_read_attribute().returning(|_| Ok(None));
            Ok(vec![
                Box::new(with_href) as Box<dyn PageElement>,
                Box::new(without_href) as Box<dyn PageElement>,
            ])
        });

    let collector = ScrollCollector::new(&ScrollSettings {
        interval_ms: 0,
        ..ScrollSettings::default()
    });
    let tracks = collector
        .collect_all(&page, "https://sc.example/album", "a.trackItem__trackTitle", "href")
        .await
        .unwrap();

    assert_eq!(tracks, vec!["https://sc.example/t1"]);
}

#[test_log::test(tokio::test)]
async fn test_session_is_closed_when_album_page_fails_to_load() {
    let mut page = MockBrowserPage::new();
    page.expect_goto()
        .times(1)
        .returning(|_, _, timeout| Err(RipError::NavigationTimeout { timeout }));
    page.expect_close().times(1).returning(|| Ok(()));

    let mut launcher = MockBrowserLauncher::new();
    launcher
        .expect_launch()
        .times(1)
        .return_once(move |_| Ok(Box::new(page) as Box<dyn BrowserPage>));

    let root = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(launcher, Box::new(StubImages::ok()), test_config(root.path()));

    let result = pipeline.run_single("https://sc.example/artist/sets/album-1").await;
    assert!(matches!(result, Err(RipError::NavigationTimeout { .. })));
}
