//! Integration tests for `PiwikClient` over `HyperTransport` using wiremock.

use std::time::Duration;

use piwik::{
    CallOutput, DEFAULT_USER_AGENT, Error, Format, HyperTransport, NaiveDate, Params, PhpValue,
    PiwikClient,
};
use serde::Deserialize;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

const TOKEN: &str = "c0ffee";

fn client_for(server: &MockServer) -> PiwikClient<HyperTransport> {
    PiwikClient::new(
        HyperTransport::new(),
        format!("{}/index.php", server.uri()),
        TOKEN,
    )
    .expect("valid url")
}

fn php_site() -> &'static str {
    r#"a:3:{s:6:"idsite";i:1;s:4:"name";s:4:"Blog";s:7:"ts_used";d:0.5;}"#
}

#[tokio::test]
async fn test_php_call_sends_injected_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("module", "API"))
        .and(query_param("method", "SitesManager.getSiteFromId"))
        .and(query_param("token_auth", TOKEN))
        .and(query_param("format", "php"))
        .and(query_param("idSite", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(php_site()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let output = client_for(&mock_server)
        .call(
            "SitesManager.getSiteFromId",
            &Params::new().with("idSite", 1),
            Format::Php,
        )
        .await
        .expect("call succeeds");

    let CallOutput::Structured(site) = output else {
        panic!("php output is structured");
    };
    assert_eq!(site.get("name").and_then(PhpValue::as_str), Some("Blog"));
    assert_eq!(site.get("ts_used").and_then(PhpValue::as_f64), Some(0.5));
}

#[tokio::test]
async fn test_raw_query_keeps_order_and_brackets() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("i:5;"))
        .mount(&mock_server)
        .await;

    let params = Params::new()
        .with("siteName", "Example site 1")
        .with("urls[]", ["http://example.com", "https://www.example.com"])
        .with("excludedIps", ["127.0.*.*", "192.168.*.*"])
        .with("startDate", NaiveDate::from_ymd_opt(2013, 1, 1).expect("date"))
        .with("ecommerce", true);

    let id = client_for(&mock_server)
        .call_php("SitesManager.addSite", &params)
        .await
        .expect("call succeeds");
    assert_eq!(id.as_i64(), Some(5));

    let requests = mock_server.received_requests().await.expect("recording");
    assert_eq!(requests.len(), 1);
    insta::assert_snapshot!(
        requests[0].url.query().unwrap_or_default(),
        @"siteName=Example+site+1&urls[0]=http%3A%2F%2Fexample.com&urls[1]=https%3A%2F%2Fwww.example.com&excludedIps=127.0.%2A.%2A,192.168.%2A.%2A&startDate=2013-01-01&ecommerce=1&module=API&method=SitesManager.addSite&token_auth=c0ffee&format=php"
    );
}

#[tokio::test]
async fn test_injected_params_override_caller_values() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("format", "csv"))
        .and(query_param("token_auth", TOKEN))
        .and(query_param("module", "API"))
        .respond_with(ResponseTemplate::new(200).set_body_string("label,nb_visits\n"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let params = Params::new()
        .with("format", "xml")
        .with("token_auth", "someone-else")
        .with("module", "CoreHome");

    let text = client_for(&mock_server)
        .call_text("VisitsSummary.get", &params, Format::Csv)
        .await
        .expect("call succeeds");

    assert_eq!(text, "label,nb_visits\n");
}

#[tokio::test]
async fn test_php_error_envelope_becomes_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"a:2:{s:6:"result";s:5:"error";s:7:"message";s:1:"X";}"#,
        ))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .call("SitesManager.getSiteFromId", &Params::new(), Format::Php)
        .await
        .expect_err("api error");

    assert!(err.is_api());
    assert_eq!(err.api_message(), Some("X"));
}

#[tokio::test]
async fn test_json_error_envelope_passes_through_call() {
    let mock_server = MockServer::start().await;
    let body = r#"{"result":"error","message":"You can't access this resource"}"#;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let output = client
        .call("UsersManager.getUsers", &Params::new(), Format::Json)
        .await
        .expect("passes through");
    assert_eq!(output.as_text(), Some(body));

    let err = client
        .call_json::<serde_json::Value>("UsersManager.getUsers", &Params::new())
        .await
        .expect_err("typed decode surfaces the envelope");
    assert_eq!(err.api_message(), Some("You can't access this resource"));
}

#[tokio::test]
async fn test_call_json_decodes_typed_rows() {
    #[derive(Debug, Deserialize)]
    struct Site {
        idsite: String,
        name: String,
    }

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"idsite": "1", "name": "Blog"},
            {"idsite": "2", "name": "Shop"}
        ])))
        .mount(&mock_server)
        .await;

    let sites: Vec<Site> = client_for(&mock_server)
        .call_json("SitesManager.getAllSites", &Params::new())
        .await
        .expect("decodes");

    assert_eq!(sites.len(), 2);
    assert_eq!(sites[1].idsite, "2");
    assert_eq!(sites[1].name, "Shop");
}

#[tokio::test]
async fn test_call_json_reports_failing_path() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Site {
        idsite: u32,
    }

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{"idsite": "one"}])),
        )
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .call_json::<Vec<Site>>("SitesManager.getAllSites", &Params::new())
        .await
        .expect_err("type mismatch");

    let Error::JsonDeserialization { path, .. } = &err else {
        panic!("expected a json error, got {err:?}");
    };
    assert_eq!(path, "[0].idsite");
}

#[tokio::test]
async fn test_call_as_deserializes_php_value() {
    #[derive(Debug, Deserialize)]
    struct Site {
        idsite: i64,
        name: String,
    }

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("format", "php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(php_site()))
        .mount(&mock_server)
        .await;

    let site: Site = client_for(&mock_server)
        .call_as("SitesManager.getSiteFromId", &Params::new().with("idSite", 1))
        .await
        .expect("decodes");

    assert_eq!(site.idsite, 1);
    assert_eq!(site.name, "Blog");
}

#[tokio::test]
async fn test_malformed_php_body_is_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<?xml version=\"1.0\"?>"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .call_php("API.getPiwikVersion", &Params::new())
        .await
        .expect_err("not php");

    assert!(err.is_deserialization());
}

#[tokio::test]
async fn test_invalid_method_sends_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("i:1;"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .call("getSites", &Params::new(), Format::Php)
        .await
        .expect_err("invalid method");

    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
async fn test_non_success_status_is_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .call("API.getPiwikVersion", &Params::new(), Format::Xml)
        .await
        .expect_err("http error");

    assert!(err.is_transport());
    assert_eq!(err.status(), Some(503));
    assert_eq!(
        err.body(),
        Some(&bytes::Bytes::from_static(b"maintenance"))
    );
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("i:1;")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::builder()
        .timeout(Duration::from_millis(100))
        .build();
    let client = PiwikClient::new(transport, format!("{}/index.php", mock_server.uri()), TOKEN)
        .expect("valid url");

    let err = client
        .call_php("API.getPiwikVersion", &Params::new())
        .await
        .expect_err("timeout");

    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_connection_refused_is_connection_error() {
    let client = PiwikClient::anonymous(HyperTransport::new(), "http://127.0.0.1:9/index.php")
        .expect("valid url");

    let err = client
        .call_php("API.getPiwikVersion", &Params::new())
        .await
        .expect_err("nothing listens on the discard port");

    assert!(err.is_connection());
}

#[tokio::test]
async fn test_default_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("s:5:\"5.1.0\";"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let version = client_for(&mock_server)
        .call_php("API.getPiwikVersion", &Params::new())
        .await
        .expect("call succeeds");

    assert_eq!(version.as_str(), Some("5.1.0"));
}

#[tokio::test]
async fn test_builder_uses_anonymous_token_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("token_auth", "anonymous"))
        .respond_with(ResponseTemplate::new(200).set_body_string("b:1;"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = PiwikClient::builder()
        .base_url(format!("{}/index.php", mock_server.uri()))
        .with_logging()
        .build()
        .expect("builds");

    let value = client
        .call_php("UsersManager.hasSuperUserAccess", &Params::new())
        .await
        .expect("call succeeds");

    assert_eq!(value.as_bool(), Some(true));
}

#[tokio::test]
async fn test_shared_transport_through_arc() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("i:1;"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let transport = std::sync::Arc::new(HyperTransport::new());
    let base = format!("{}/index.php", mock_server.uri());
    let first = PiwikClient::new(transport.clone(), &base, "one").expect("valid url");
    let second = PiwikClient::new(transport, &base, "two").expect("valid url");

    let params = Params::new();
    let (a, b) = tokio::join!(
        first.call_php("API.getPiwikVersion", &params),
        second.call_php("API.getPiwikVersion", &params),
    );

    assert_eq!(a.expect("first").as_i64(), Some(1));
    assert_eq!(b.expect("second").as_i64(), Some(1));
}
