use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::core::config::TileLoadingConfig;
use crate::prelude::{Duration, HashSet};
use crate::{MapError, Result};
use once_cell::sync::Lazy;

/// Shared async HTTP client for tile fetching
static TILE_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("firemap/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(16)
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default tile client: {e}");
            reqwest::Client::new()
        })
});

/// Result of a tile loading operation
#[derive(Debug)]
pub struct TileResponse {
    pub url: String,
    pub data: Result<Vec<u8>>,
}

/// Fetches tile images in the background and hands the bytes back on the UI thread.
///
/// Requests are de-duplicated by URL while in flight and limited per frame.
pub struct TileLoader {
    tx: Sender<TileResponse>,
    rx: Receiver<TileResponse>,
    in_flight: HashSet<String>,
    batch_size: usize,
    started_this_frame: usize,
}

impl TileLoader {
    pub fn new(config: &TileLoadingConfig) -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            in_flight: HashSet::default(),
            batch_size: config.fetch_batch_size.max(1),
            started_this_frame: 0,
        }
    }

    /// Resets the per-frame request budget
    pub fn begin_frame(&mut self) {
        self.started_this_frame = 0;
    }

    /// Starts fetching `url` unless it is already loading or the frame budget is spent.
    pub fn request(&mut self, url: &str) -> bool {
        if self.in_flight.contains(url) || self.started_this_frame >= self.batch_size {
            return false;
        }

        self.in_flight.insert(url.to_string());
        self.started_this_frame += 1;

        let tx = self.tx.clone();
        let url = url.to_string();
        crate::runtime::spawn(async move {
            let data = fetch_tile(&url).await;
            // The receiver is gone once the map is torn down
            let _ = tx.send(TileResponse { url, data });
        });
        true
    }

    /// Responses that arrived since the last call
    pub fn drain(&mut self) -> Vec<TileResponse> {
        let responses: Vec<TileResponse> = self.rx.try_iter().collect();
        for response in &responses {
            self.in_flight.remove(&response.url);
        }
        responses
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

async fn fetch_tile(url: &str) -> Result<Vec<u8>> {
    let response = TILE_CLIENT.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(MapError::Layer(format!("tile {url} returned {status}")));
    }
    Ok(response.bytes().await?.to_vec())
}

/// Decodes PNG/JPEG tile bytes to straight RGBA
#[cfg(feature = "egui")]
pub fn decode_tile(bytes: &[u8]) -> Result<egui::ColorImage> {
    let image = image::load_from_memory(bytes).map_err(|e| MapError::Image(e.to_string()))?;
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_budget() {
        let config = TileLoadingConfig {
            fetch_batch_size: 1,
            ..TileLoadingConfig::default()
        };
        let mut loader = TileLoader::new(&config);
        // Exhaust the budget without spawning
        loader.started_this_frame = 1;
        assert!(!loader.request("http://tiles.test/1/0/0.png"));
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn test_drain_clears_in_flight() {
        let mut loader = TileLoader::new(&TileLoadingConfig::default());
        loader.in_flight.insert("u".to_string());
        loader
            .tx
            .send(TileResponse {
                url: "u".to_string(),
                data: Ok(vec![1, 2, 3]),
            })
            .unwrap();

        let responses = loader.drain();
        assert_eq!(responses.len(), 1);
        assert_eq!(loader.in_flight(), 0);
    }

    #[cfg(feature = "egui")]
    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_tile(b"not a png"), Err(MapError::Image(_))));
    }
}
