use crate::{
    background::LoadOutcome,
    core::config::SourceConfig,
    data::geojson::{GeoCollection, MapKind},
    prelude::HashMap,
    traits::GeometrySource,
    MapError, Result,
};
use async_trait::async_trait;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use once_cell::sync::Lazy;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("grantmap/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {}", e);
            Client::new()
        })
});

/// Runs geometry loads as tokio tasks and hands the outcomes back over a channel.
///
/// Every request gets a new generation number; consumers compare an outcome's
/// generation with [`latest_generation`](Self::latest_generation) to discard
/// results that were overtaken by a later request. In-flight tasks are never
/// cancelled.
pub struct GeometryLoader {
    source: Arc<dyn GeometrySource>,
    handle: Handle,
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
    generation: u64,
}

impl GeometryLoader {
    pub fn new(source: Arc<dyn GeometrySource>, handle: Handle) -> Self {
        let (tx, rx) = unbounded();
        Self {
            source,
            handle,
            tx,
            rx,
            generation: 0,
        }
    }

    /// Uses the tokio runtime the caller is running in
    pub fn current(source: Arc<dyn GeometrySource>) -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| MapError::Load(format!("no tokio runtime for geometry loads: {}", e)))?;
        Ok(Self::new(source, handle))
    }

    /// Starts loading `kind` in the background and returns the request's generation
    pub fn request(&mut self, kind: MapKind) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        let source = self.source.clone();
        let tx = self.tx.clone();

        log::debug!("requesting {} (generation {})", source.describe(kind), generation);
        self.handle.spawn(async move {
            let result = source.load(kind).await;
            if let Err(e) = &result {
                log::warn!("{} failed: {}", source.describe(kind), e);
            }
            let _ = tx.send(LoadOutcome::new(generation, kind, result));
        });
        generation
    }

    /// Generation of the most recent request, if any was made
    pub fn latest_generation(&self) -> Option<u64> {
        (self.generation > 0).then_some(self.generation)
    }

    /// Outcomes that have arrived so far, in completion order
    pub fn drain(&self) -> Vec<LoadOutcome> {
        self.rx.try_iter().collect()
    }

    /// Blocks for the next outcome. Do not call from a current-thread runtime.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<LoadOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl std::fmt::Debug for GeometryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryLoader")
            .field("generation", &self.generation)
            .field("queued", &self.rx.len())
            .finish()
    }
}

/// Fetches GeoJSON over HTTP from the configured per-kind URLs
#[derive(Debug, Clone, Default)]
pub struct HttpGeometrySource {
    urls: SourceConfig,
}

impl HttpGeometrySource {
    pub fn new(urls: SourceConfig) -> Self {
        Self { urls }
    }
}

#[async_trait]
impl GeometrySource for HttpGeometrySource {
    async fn load(&self, kind: MapKind) -> Result<GeoCollection> {
        let url = self.urls.url_for(kind);
        let response = HTTP_CLIENT.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MapError::Load(format!("HTTP {} for {}", response.status(), url)));
        }
        let body = response.text().await?;
        log::info!("downloaded {} ({} bytes)", url, body.len());
        GeoCollection::from_str(kind, &body)
    }

    fn describe(&self, kind: MapKind) -> String {
        format!("{} geometry from {}", kind, self.urls.url_for(kind))
    }
}

/// Reads GeoJSON files from disk
#[derive(Debug, Clone)]
pub struct FileGeometrySource {
    state_path: PathBuf,
    district_path: PathBuf,
}

impl FileGeometrySource {
    pub fn new(state_path: impl Into<PathBuf>, district_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            district_path: district_path.into(),
        }
    }

    fn path_for(&self, kind: MapKind) -> &PathBuf {
        match kind {
            MapKind::State => &self.state_path,
            MapKind::District => &self.district_path,
        }
    }
}

#[async_trait]
impl GeometrySource for FileGeometrySource {
    async fn load(&self, kind: MapKind) -> Result<GeoCollection> {
        let text = tokio::fs::read_to_string(self.path_for(kind)).await?;
        GeoCollection::from_str(kind, &text)
    }

    fn describe(&self, kind: MapKind) -> String {
        format!("{} geometry from {}", kind, self.path_for(kind).display())
    }
}

/// Serves collections that are already in memory, optionally after a delay
#[derive(Debug, Clone, Default)]
pub struct StaticGeometrySource {
    collections: HashMap<MapKind, GeoCollection>,
    delays: HashMap<MapKind, Duration>,
}

impl StaticGeometrySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, collection: GeoCollection) -> Self {
        self.collections.insert(collection.kind, collection);
        self
    }

    /// Holds every load of `kind` back by `delay`
    pub fn with_delay(mut self, kind: MapKind, delay: Duration) -> Self {
        self.delays.insert(kind, delay);
        self
    }
}

#[async_trait]
impl GeometrySource for StaticGeometrySource {
    async fn load(&self, kind: MapKind) -> Result<GeoCollection> {
        if let Some(delay) = self.delays.get(&kind) {
            tokio::time::sleep(*delay).await;
        }
        self.collections
            .get(&kind)
            .cloned()
            .ok_or_else(|| MapError::Load(format!("no {} collection configured", kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    fn empty(kind: MapKind) -> GeoCollection {
        GeoCollection::new(kind, Vec::new())
    }

    #[test]
    fn test_generations_increase() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let source = StaticGeometrySource::new().with_collection(empty(MapKind::State));
        let mut loader = GeometryLoader::new(Arc::new(source), runtime.handle().clone());
        assert_eq!(loader.latest_generation(), None);

        assert_eq!(loader.request(MapKind::State), 1);
        assert_eq!(loader.request(MapKind::District), 2);
        assert_eq!(loader.latest_generation(), Some(2));

        let mut outcomes = vec![
            loader.recv_timeout(WAIT).unwrap(),
            loader.recv_timeout(WAIT).unwrap(),
        ];
        outcomes.sort_by_key(|o| o.generation);
        assert!(outcomes[0].result.is_ok());
        // District was never configured
        assert!(matches!(outcomes[1].result, Err(MapError::Load(_))));
        assert!(loader.drain().is_empty());
    }

    #[test]
    fn test_delayed_load_completes_last() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let source = StaticGeometrySource::new()
            .with_collection(empty(MapKind::State))
            .with_collection(empty(MapKind::District))
            .with_delay(MapKind::State, Duration::from_millis(200));
        let mut loader = GeometryLoader::new(Arc::new(source), runtime.handle().clone());

        loader.request(MapKind::State);
        loader.request(MapKind::District);
        let first = loader.recv_timeout(WAIT).unwrap();
        let second = loader.recv_timeout(WAIT).unwrap();
        assert_eq!((first.generation, first.kind), (2, MapKind::District));
        assert_eq!((second.generation, second.kind), (1, MapKind::State));
    }

    #[tokio::test]
    async fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let states = dir.path().join("states.geojson");
        std::fs::write(
            &states,
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"id": "51", "name": "Virginia"},
                 "geometry": {"type": "Polygon", "coordinates": [[[-80, 37], [-76, 37], [-76, 39], [-80, 37]]]}}
            ]}"#,
        )
        .unwrap();
        let source = FileGeometrySource::new(&states, dir.path().join("missing.geojson"));

        let collection = source.load(MapKind::State).await.unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.features[0].label(), "Virginia");
        assert!(matches!(source.load(MapKind::District).await, Err(MapError::Io(_))));
        assert!(source.describe(MapKind::State).ends_with("states.geojson"));
    }

    #[tokio::test]
    async fn test_current_handle() {
        let source = Arc::new(StaticGeometrySource::new());
        assert!(GeometryLoader::current(source).is_ok());
    }
}
