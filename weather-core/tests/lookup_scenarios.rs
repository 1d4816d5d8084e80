//! End-to-end lookups against a mock OpenWeather server.

use std::sync::Arc;

use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use weather_core::{
    LastQueryStore, LookupError, LookupState, WeatherLookupService,
    display::summary_line,
    provider::openweather::{OpenWeatherClient, OpenWeatherGeocoder},
};

fn service_for(server: &Server) -> WeatherLookupService {
    let geocoder = OpenWeatherGeocoder::new(format!("{}/geo/1.0", server.url())).expect("geocoder");
    let weather = OpenWeatherClient::new(format!("{}/data/2.5", server.url())).expect("weather");
    WeatherLookupService::new(Arc::new(geocoder), Arc::new(weather), "TEST_KEY")
}

#[tokio::test]
async fn paris_lookup_ends_in_success() {
    let mut server = Server::new_async().await;

    let geo = server
        .mock("GET", "/geo/1.0/direct")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "Paris".into()),
            Matcher::UrlEncoded("appid".into(), "TEST_KEY".into()),
            Matcher::UrlEncoded("limit".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"lat": 48.8566, "lon": 2.3522, "name": "Paris", "country": "FR"}]"#)
        .expect(1)
        .create_async()
        .await;

    let weather = server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lat".into(), "48.8566".into()),
            Matcher::UrlEncoded("lon".into(), "2.3522".into()),
            Matcher::UrlEncoded("appid".into(), "TEST_KEY".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"name": "Paris", "main": {"temp": 290.0, "humidity": 60},
                "weather": [{"description": "clear sky", "icon": "01d"}],
                "wind": {"speed": 3.0}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let svc = service_for(&server);
    let reading = svc.fetch_by_city("Paris").await.expect("lookup succeeds");

    geo.assert_async().await;
    weather.assert_async().await;

    assert_eq!(summary_line(&reading), "Weather in Paris: 16°C / 62°F");
    assert_eq!(reading.humidity_percent, 60);
    assert_eq!(reading.primary_condition().map(|c| c.icon_id.as_str()), Some("01d"));
    assert_eq!(svc.state(), LookupState::Success(reading));
}

#[tokio::test]
async fn unknown_city_never_reaches_weather_endpoint() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/geo/1.0/direct")
        .match_query(Matcher::UrlEncoded("q".into(), "Nowhereville".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let weather = server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let svc = service_for(&server);
    let result = svc.fetch_by_city("Nowhereville").await;

    weather.assert_async().await;
    assert_eq!(result, Err(LookupError::NotFound));
    assert_eq!(
        svc.state().error_message().as_deref(),
        Some("Could not find coordinates for the city.")
    );
}

#[tokio::test]
async fn coordinates_lookup_never_reaches_geocoder() {
    let mut server = Server::new_async().await;

    let geo = server
        .mock("GET", "/geo/1.0/direct")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lat".into(), "59.9139".into()),
            Matcher::UrlEncoded("lon".into(), "10.7522".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"name": "Oslo", "main": {"temp": 280.0, "humidity": 81},
                "weather": [{"description": "light rain", "icon": "10d"}],
                "wind": {"speed": 5.5}}"#,
        )
        .create_async()
        .await;

    let svc = service_for(&server);
    let reading = svc.fetch_by_coordinates(59.9139, 10.7522).await.expect("lookup succeeds");

    geo.assert_async().await;
    assert_eq!(reading.location_name, "Oslo");
    assert_eq!(summary_line(&reading), "Weather in Oslo: 6°C / 44°F");
}

#[tokio::test]
async fn server_error_is_reported_and_loading_ends() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let svc = service_for(&server);
    let err = svc.fetch_by_coordinates(0.0, 0.0).await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("500"), "{message}");
    assert!(!message.contains("TEST_KEY"), "{message}");
    assert!(!svc.state().is_loading());
}

#[tokio::test]
async fn last_query_is_remembered_across_store_instances() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("weather_prefs.toml");

    LastQueryStore::new(&path).save("Paris").expect("save");
    let reopened = LastQueryStore::new(&path);

    assert_eq!(reopened.get_last().expect("read").as_deref(), Some("Paris"));
}
