use std::{
    collections::{HashMap, HashSet},
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::{Credentials, Region, SharedCredentialsProvider};
use axum::{
    Router,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::get,
};
use dataset::ObjectStore;
use serde_json::{Value, json};
use server::{
    config::{CachePolicy, Config},
    router,
    state::AppState,
};
use tokio::net::TcpListener;

const DATASET: &str = include_str!("fixtures/farms.csv");
const BUCKET: &str = "farm-bucket";
const KEY: &str = "MVP/MVP_Dataframe.csv";
const ACCESS_KEY: &str = "AKIDFARMMAPTEST";

async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    addr
}

/// Object store serving the fixture at `/{BUCKET}/{KEY}` and counting fetches.
async fn spawn_store(hits: Arc<AtomicUsize>) -> String {
    let store = Router::new().route(
        &format!("/{BUCKET}/{KEY}"),
        get(move || {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                DATASET
            }
        }),
    );

    format!("http://{}", spawn(store).await)
}

fn config(endpoint: String) -> Config {
    Config {
        port: 0,
        object_store_endpoint: Some(endpoint),
        bucket: BUCKET.to_string(),
        key: KEY.to_string(),
        fetch_timeout: Duration::from_secs(5),
        cache: CachePolicy::Disabled,
    }
}

fn sdk_config() -> SdkConfig {
    let credentials = Credentials::new(ACCESS_KEY, "farm-map-test-secret", None, None, "tests");

    SdkConfig::builder()
        .region(Region::new("us-east-1"))
        .credentials_provider(SharedCredentialsProvider::new(credentials))
        .behavior_version(BehaviorVersion::latest())
        .build()
}

async fn spawn_backend(config: Config) -> String {
    let store = ObjectStore::new(
        &sdk_config(),
        config.object_store_endpoint.as_deref(),
        config.fetch_timeout,
    )
    .expect("store");
    let state = AppState::with_store(config, store);

    format!("http://{}", spawn(router(state)).await)
}

async fn get_json(url: &str) -> (StatusCode, Value) {
    let response = reqwest::get(url).await.expect("request");
    let status = StatusCode::from_u16(response.status().as_u16()).expect("status");

    (status, response.json().await.expect("json body"))
}

#[tokio::test]
async fn farmers_are_unique_in_first_seen_order() {
    let backend = spawn_backend(config(spawn_store(Arc::default()).await)).await;

    let (status, body) = get_json(&format!("{backend}/farmers")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {
                "farmer_id": 0,
                "first_name": "Kwame",
                "last_name": "Mensah",
                "farmer_image_url": "https://images.example.com/kwame.jpg",
                "nationality": "Ghanaian",
                "farm_location": "Kumasi",
                "crop_name": "Cocoa",
                "variety": "Amelonado"
            },
            {
                "farmer_id": 1,
                "first_name": "Ama",
                "last_name": "Owusu",
                "farmer_image_url": null,
                "nationality": "Ghanaian",
                "farm_location": "Techiman",
                "crop_name": "Maize",
                "variety": ""
            },
            {
                "farmer_id": 2,
                "first_name": "Yaw",
                "last_name": "Boateng",
                "farmer_image_url": "https://images.example.com/yaw.jpg",
                "nationality": "Ghanaian",
                "farm_location": "",
                "crop_name": "Cashew",
                "variety": ""
            }
        ])
    );
}

#[tokio::test]
async fn farms_carry_positional_ids_and_decoded_geo() {
    let backend = spawn_backend(config(spawn_store(Arc::default()).await)).await;

    let (status, body) = get_json(&format!("{backend}/farms")).await;
    assert_eq!(status, StatusCode::OK);

    let farms = body.as_array().expect("array");
    assert_eq!(farms.len(), 5);

    let farm_ids: Vec<u64> = farms.iter().map(|f| f["farm_id"].as_u64().unwrap()).collect();
    assert_eq!(farm_ids, vec![0, 1, 2, 3, 4]);
    assert_eq!(farm_ids.iter().collect::<HashSet<_>>().len(), farms.len());

    let farmer_ids: Vec<u64> = farms.iter().map(|f| f["farmer_id"].as_u64().unwrap()).collect();
    assert_eq!(farmer_ids, vec![0, 1, 0, 2, 1]);

    assert_eq!(
        farms[0]["geo_coordinates"],
        json!({ "latitude": 6.6885, "longitude": -1.6244 })
    );
    assert_eq!(farms[0]["geo_boundaries"].as_array().unwrap().len(), 3);
    assert_eq!(farms[0]["acreage"], json!(3.5));
    assert_eq!(farms[0]["farm_number"], json!(101.0));

    let default_point = json!({ "latitude": 6.11, "longitude": -0.11 });

    assert_eq!(farms[2]["geo_coordinates"], default_point);
    assert_eq!(farms[2]["geo_boundaries"], json!([]));
    assert_eq!(farms[2]["acreage"], json!(""));

    assert_eq!(farms[3]["geo_coordinates"], default_point);
    assert_eq!(
        farms[3]["geo_boundaries"],
        json!([
            { "latitude": 7.0, "longitude": -2.0 },
            { "latitude": 7.1, "longitude": -2.1 },
            { "latitude": 7.2, "longitude": -2.2 }
        ])
    );
    assert_eq!(farms[3]["farm_location"], json!("Location not specified"));
    assert_eq!(farms[3]["farm_number"], json!(""));
    assert_eq!(farms[3]["variety"], json!(""));

    assert!(farms.iter().all(|f| f.get("notes").is_none()));
}

#[tokio::test]
async fn farms_and_farmers_agree_on_ids() {
    let backend = spawn_backend(config(spawn_store(Arc::default()).await)).await;

    let (_, farmers) = get_json(&format!("{backend}/farmers")).await;
    let (_, farms) = get_json(&format!("{backend}/farms")).await;

    let by_name: HashMap<(String, String), u64> = farmers
        .as_array()
        .unwrap()
        .iter()
        .map(|f| {
            (
                (
                    f["first_name"].as_str().unwrap().to_string(),
                    f["last_name"].as_str().unwrap().to_string(),
                ),
                f["farmer_id"].as_u64().unwrap(),
            )
        })
        .collect();

    for farm in farms.as_array().unwrap() {
        let name = (
            farm["first_name"].as_str().unwrap().to_string(),
            farm["last_name"].as_str().unwrap().to_string(),
        );
        assert_eq!(by_name[&name], farm["farmer_id"].as_u64().unwrap());
    }
}

#[tokio::test]
async fn farmer_count_reports_placeholders() {
    let backend = spawn_backend(config(spawn_store(Arc::default()).await)).await;

    let (status, body) = get_json(&format!("{backend}/farmers/count")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "totalFarmers": 3,
            "usdaCertifiedCount": 0,
            "globalGapCertifiedCount": 0
        })
    );
}

#[tokio::test]
async fn every_request_refetches_dataset() {
    let hits = Arc::new(AtomicUsize::new(0));
    let backend = spawn_backend(config(spawn_store(hits.clone()).await)).await;

    for path in ["/farmers", "/farms", "/farmers/count", "/farmers"] {
        let (status, _) = get_json(&format!("{backend}{path}")).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn missing_object_is_server_error() {
    let mut config = config(spawn_store(Arc::default()).await);
    config.key = "MVP/missing.csv".to_string();
    let backend = spawn_backend(config).await;

    for path in ["/farmers", "/farms", "/farmers/count"] {
        let (status, body) = get_json(&format!("{backend}{path}")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("Data unavailable"));
    }
}

#[tokio::test]
async fn unreachable_store_is_server_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let closed = format!("http://{}", listener.local_addr().expect("addr"));
    drop(listener);

    let backend = spawn_backend(config(closed)).await;

    for path in ["/farmers", "/farms"] {
        let (status, body) = get_json(&format!("{backend}{path}")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn unparseable_dataset_is_server_error() {
    let store = Router::new().route(
        &format!("/{BUCKET}/{KEY}"),
        get(|| async { "first_name,last_name\nAma,Owusu\n" }),
    );
    let endpoint = format!("http://{}", spawn(store).await);
    let backend = spawn_backend(config(endpoint)).await;

    let (status, body) = get_json(&format!("{backend}/farms")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("farmer_image_url"));
}

#[tokio::test]
async fn store_requests_are_sigv4_signed() {
    let seen: Arc<Mutex<Option<String>>> = Arc::default();
    let recorded = seen.clone();

    let store = Router::new().route(
        &format!("/{BUCKET}/{KEY}"),
        get(move |headers: HeaderMap| {
            let recorded = recorded.clone();
            async move {
                let authorization = headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let dated = headers.contains_key("x-amz-date");
                *recorded.lock().unwrap() = authorization.clone();

                match authorization {
                    Some(value) if dated && value.starts_with("AWS4-HMAC-SHA256 ") => {
                        (StatusCode::OK, DATASET)
                    }
                    _ => (StatusCode::FORBIDDEN, ""),
                }
            }
        }),
    );
    let endpoint = format!("http://{}", spawn(store).await);
    let backend = spawn_backend(config(endpoint)).await;

    let (status, body) = get_json(&format!("{backend}/farmers/count")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalFarmers"], json!(3));

    let authorization = seen.lock().unwrap().clone().expect("authorization header");
    assert!(authorization.contains(&format!("Credential={ACCESS_KEY}/")));
    assert!(authorization.contains("/us-east-1/s3/aws4_request"));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let backend = spawn_backend(config(spawn_store(Arc::default()).await)).await;

    let response = reqwest::Client::new()
        .get(format!("{backend}/farmers/count"))
        .header("Origin", "https://map.example.org")
        .send()
        .await
        .expect("request");

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
