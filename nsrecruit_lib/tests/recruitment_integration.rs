use std::sync::Arc;
use std::time::Duration;

use nsrecruit_lib::{
    Classifier, Client, EventFeed, FeedRetry, NationId, Paced, RecruitError, RecruitSession,
    SelectionWeights, SelectorSettings, TargetSelector, MIN_REQUEST_INTERVAL,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_PATH: &str = "/cgi-bin/api.cgi";

const FOUNDING_FEED: &str = r#"<WORLD>
<HAPPENINGS>
<EVENT id="3"><TIMESTAMP>1700000300</TIMESTAMP><TEXT><![CDATA[@@old_guard@@ was refounded in %%lazarus%%.]]></TEXT></EVENT>
<EVENT id="2"><TIMESTAMP>1700000200</TIMESTAMP><TEXT><![CDATA[@@nation_bot_7@@ was founded in %%the_pacific%%.]]></TEXT></EVENT>
<EVENT id="1"><TIMESTAMP>1700000100</TIMESTAMP><TEXT><![CDATA[@@green_hills@@ was founded in %%osiris%%.]]></TEXT></EVENT>
</HAPPENINGS>
</WORLD>"#;

fn can_recruit(value: &str) -> String {
    format!("<NATION><TGCANRECRUIT>{}</TGCANRECRUIT></NATION>", value)
}

fn selector_for(
    server: &MockServer,
    settings: SelectorSettings,
    optimization: bool,
) -> TargetSelector<Paced<Client>, StdRng> {
    let client =
        Client::with_base_url(&format!("{}{}", server.uri(), API_PATH), "nsrecruit-test").unwrap();
    let api = Arc::new(Paced::new(client, MIN_REQUEST_INTERVAL));
    let retry = FeedRetry {
        max_retries: 2,
        cooldown: Duration::from_millis(10),
    };
    TargetSelector::new(
        EventFeed::new(Arc::clone(&api), retry),
        Classifier::new(Arc::clone(&api), optimization).unwrap(),
        settings,
        StdRng::seed_from_u64(1),
    )
}

fn founding_only() -> SelectorSettings {
    SelectorSettings {
        weights: SelectionWeights::new(1.0, 0.0, 0.0),
        empty_round_max: 1,
        ..SelectorSettings::default()
    }
}

#[tokio::test]
async fn selects_first_eligible_founding_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("q", "happenings"))
        .and(query_param("filter", "founding"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FOUNDING_FEED))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("q", "tgcanrecruit"))
        .and(query_param("nation", "green_hills"))
        .respond_with(ResponseTemplate::new(200).set_body_string(can_recruit("1")))
        .expect(1)
        .mount(&server)
        .await;

    let mut selector = selector_for(&server, founding_only(), true);
    let mut session = RecruitSession::new();

    let nation = selector.next(&mut session).await.unwrap();
    assert_eq!(nation, NationId::new("green_hills"));
    assert_eq!(session.counters.found, 1);
    // nation_bot_7 was turned down by name alone
    assert_eq!(session.counters.rejected, 1);
    assert!(session.history.has(&NationId::new("nation_bot_7")));
}

#[tokio::test]
async fn transient_feed_status_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("q", "happenings"))
        .respond_with(ResponseTemplate::new(524).set_body_string("A timeout occurred"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("q", "happenings"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FOUNDING_FEED))
        .mount(&server)
        .await;

    let mut selector = selector_for(&server, founding_only(), false);
    let mut session = RecruitSession::new();

    let nation = selector.next(&mut session).await.unwrap();
    assert_eq!(nation.as_str(), "nation_bot_7");
}

#[tokio::test]
async fn ineligible_candidates_exhaust_the_round() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("q", "happenings"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FOUNDING_FEED))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("q", "tgcanrecruit"))
        .respond_with(ResponseTemplate::new(200).set_body_string(can_recruit("0")))
        .mount(&server)
        .await;

    let mut selector = selector_for(&server, founding_only(), true);
    let mut session = RecruitSession::new();

    let err = selector.next(&mut session).await.unwrap_err();
    assert!(matches!(err, RecruitError::NoCandidates { rounds: 1 }));
    assert_eq!(session.counters.rejected, 2);
}

#[tokio::test]
async fn pacer_counts_and_spaces_every_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("q", "happenings"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FOUNDING_FEED))
        .mount(&server)
        .await;

    let client =
        Client::with_base_url(&format!("{}{}", server.uri(), API_PATH), "nsrecruit-test").unwrap();
    let api = Arc::new(Paced::new(client, MIN_REQUEST_INTERVAL));
    let feed = EventFeed::new(Arc::clone(&api), FeedRetry::default());

    feed.fetch(nsrecruit_lib::types::HappeningsFilter::Founding)
        .await
        .unwrap();
    feed.fetch(nsrecruit_lib::types::HappeningsFilter::Founding)
        .await
        .unwrap();

    let stats = api.stats().await;
    assert_eq!(stats.requests, 2);
    assert_eq!(stats.failed, 0);
    assert!(stats.held > Duration::ZERO);
}
