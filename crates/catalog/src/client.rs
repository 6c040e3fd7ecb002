use formats::{TerrainDocument, map_index_from_json};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use streaming::{CreateMarkerRequest, MarkerId, MoveMarkerRequest, PlayerRecord};
use tracing::{debug, warn};

use crate::{CatalogError, CatalogSource, ServerEndpoints};

/// Thin client over the terrain server's HTTP API. No retries.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoints: ServerEndpoints,
    source: CatalogSource,
}

impl ApiClient {
    pub fn new(endpoints: ServerEndpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints,
            source: CatalogSource::Api,
        }
    }

    pub fn with_source(mut self, source: CatalogSource) -> Self {
        self.source = source;
        self
    }

    pub fn endpoints(&self) -> &ServerEndpoints {
        &self.endpoints
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    /// Map ids the server offers, in the order served.
    ///
    /// Never fails: any fetch or decode problem is logged and reads as an
    /// empty catalog.
    pub async fn list_maps(&self) -> Vec<String> {
        let url = self.endpoints.map_list_url(self.source);
        match self.fetch_map_list(url.clone()).await {
            Ok(maps) => {
                debug!(%url, count = maps.len(), "map catalog fetched");
                maps
            }
            Err(err) => {
                warn!(%url, %err, "map catalog unavailable");
                Vec::new()
            }
        }
    }

    async fn fetch_map_list(&self, url: Url) -> Result<Vec<String>, CatalogError> {
        let bytes = checked(self.http.get(url).send().await?)?.bytes().await?;
        map_index_from_json(&bytes).map_err(CatalogError::Decode)
    }

    pub async fn load_map(&self, id: &str) -> Result<TerrainDocument, CatalogError> {
        let url = self.endpoints.map_url(id);
        let bytes = checked(self.http.get(url).send().await?)?.bytes().await?;
        let document = TerrainDocument::from_json_slice(&bytes)?;
        debug!(%id, chunks = document.terrains.len(), "map fetched");
        Ok(document)
    }

    /// Asks the server to place a marker. The marker appears locally only
    /// once the server broadcasts `player_created`.
    pub async fn create_marker(&self, x: f64, z: f64) -> Result<(), CatalogError> {
        let url = self.endpoints.http_url(&["api", "players"]);
        checked(self.http.post(url).json(&CreateMarkerRequest { x, z }).send().await?)?;
        Ok(())
    }

    pub async fn move_marker(&self, id: &str, x: f64, z: f64) -> Result<(), CatalogError> {
        let url = self.endpoints.http_url(&["api", "players", "move"]);
        let body = MoveMarkerRequest {
            id: MarkerId::from(id),
            x,
            z,
        };
        checked(self.http.post(url).json(&body).send().await?)?;
        Ok(())
    }

    pub async fn clear_markers(&self) -> Result<(), CatalogError> {
        let url = self.endpoints.http_url(&["api", "players", "clear"]);
        checked(self.http.post(url).send().await?)?;
        Ok(())
    }

    pub async fn list_markers(&self) -> Result<Vec<PlayerRecord>, CatalogError> {
        let url = self.endpoints.http_url(&["api", "players"]);
        json_body(checked(self.http.get(url).send().await?)?).await
    }
}

fn checked(resp: Response) -> Result<Response, CatalogError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(CatalogError::Status {
            url: resp.url().to_string(),
            status: status.as_u16(),
        })
    }
}

async fn json_body<T: DeserializeOwned>(resp: Response) -> Result<T, CatalogError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(CatalogError::Decode)
}

#[cfg(test)]
mod tests {
    use super::ApiClient;
    use crate::{CatalogError, CatalogSource, ServerEndpoints};
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use formats::TerrainFormatError;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use streaming::PlayerRecord;
    use tokio::net::TcpListener;

    type Posted = Arc<Mutex<Vec<(String, Value)>>>;

    async fn map_by_id(Path(id): Path<String>) -> Result<String, StatusCode> {
        match id.as_str() {
            "map_1.json" => Ok(json!({
                "terrains": [{
                    "x": 0.0, "z": 0.0, "y": 1.0, "width": 10.0, "depth": 10.0,
                    "resolution": 2, "heightMap": [0.0, 1.0, 2.0, 3.0]
                }]
            })
            .to_string()),
            "no_terrains.json" => Ok(json!({ "name": "empty" }).to_string()),
            "broken.json" => Ok("{ not json".to_string()),
            _ => Err(StatusCode::NOT_FOUND),
        }
    }

    fn app(posted: Posted) -> Router {
        let record = |route: &'static str| {
            move |State(posted): State<Posted>, body: Option<Json<Value>>| async move {
                let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
                posted.lock().expect("lock").push((route.to_string(), body));
                Json(json!({ "ok": true }))
            }
        };
        Router::new()
            .route("/api/maps", get(|| async { Json(json!(["map_1.json", "map_2.json"])) }))
            .route("/maps.json", get(|| async { Json(json!(["map_9.json"])) }))
            .route("/maps/:id", get(map_by_id))
            .route(
                "/api/players",
                post(record("create")).get(|| async {
                    Json(json!([{ "id": "player_1", "x": 1.5, "z": -2.0 }]))
                }),
            )
            .route("/api/players/move", post(record("move")))
            .route("/api/players/clear", post(record("clear")))
            .with_state(posted)
    }

    async fn spawn_fake_server(router: Router) -> Option<SocketAddr> {
        let listener = match TcpListener::bind("127.0.0.1:0").await {
            Ok(listener) => listener,
            Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                eprintln!("skipping http test: local bind not permitted ({err})");
                return None;
            }
            Err(err) => panic!("listener should bind: {err}"),
        };
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("fake server");
        });
        Some(addr)
    }

    async fn client_for(posted: Posted) -> Option<ApiClient> {
        let addr = spawn_fake_server(app(posted)).await?;
        let endpoints = ServerEndpoints::from_base(&format!("http://{addr}")).expect("endpoints");
        Some(ApiClient::new(endpoints))
    }

    #[tokio::test]
    async fn lists_maps_from_api_and_static_index() {
        let Some(client) = client_for(Posted::default()).await else {
            return;
        };
        assert_eq!(client.list_maps().await, vec!["map_1.json", "map_2.json"]);
        let client = client.with_source(CatalogSource::StaticIndex);
        assert_eq!(client.list_maps().await, vec!["map_9.json"]);
    }

    #[tokio::test]
    async fn list_maps_is_empty_when_server_is_unreachable_or_wrong() {
        let Some(addr) = spawn_fake_server(Router::new()).await else {
            return;
        };
        let endpoints = ServerEndpoints::from_base(&format!("http://{addr}")).expect("endpoints");
        assert!(ApiClient::new(endpoints).list_maps().await.is_empty());

        // Nothing listens on port 9 of the loopback interface.
        let endpoints = ServerEndpoints::from_base("http://127.0.0.1:9").expect("endpoints");
        assert!(ApiClient::new(endpoints).list_maps().await.is_empty());
    }

    #[tokio::test]
    async fn load_map_decodes_document() {
        let Some(client) = client_for(Posted::default()).await else {
            return;
        };
        let doc = client.load_map("map_1.json").await.expect("map loads");
        assert_eq!(doc.terrains.len(), 1);
        assert_eq!(doc.terrains[0].height_map, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn load_map_reports_each_failure_kind() {
        let Some(client) = client_for(Posted::default()).await else {
            return;
        };
        assert!(matches!(
            client.load_map("missing.json").await,
            Err(CatalogError::Status { status: 404, .. })
        ));
        assert!(matches!(
            client.load_map("no_terrains.json").await,
            Err(CatalogError::Format(TerrainFormatError::MissingTerrains))
        ));
        assert!(matches!(
            client.load_map("broken.json").await,
            Err(CatalogError::Format(TerrainFormatError::Json(_)))
        ));
    }

    #[tokio::test]
    async fn marker_mutations_post_expected_bodies() {
        let posted = Posted::default();
        let Some(client) = client_for(posted.clone()).await else {
            return;
        };
        client.create_marker(3.0, 4.5).await.expect("create");
        client.move_marker("player_1", -1.0, 2.0).await.expect("move");
        client.clear_markers().await.expect("clear");

        let posted = posted.lock().expect("lock").clone();
        assert_eq!(
            posted,
            vec![
                ("create".to_string(), json!({ "x": 3.0, "z": 4.5 })),
                ("move".to_string(), json!({ "id": "player_1", "x": -1.0, "z": 2.0 })),
                ("clear".to_string(), Value::Null),
            ]
        );
    }

    #[tokio::test]
    async fn lists_markers() {
        let Some(client) = client_for(Posted::default()).await else {
            return;
        };
        assert_eq!(
            client.list_markers().await.expect("markers"),
            vec![PlayerRecord::new("player_1", 1.5, -2.0)]
        );
    }
}
