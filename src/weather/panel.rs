use super::{observation_time, WeatherError, WeatherObservation, WeatherRequest, WeatherSource};
use crate::prelude::Arc;
use crate::state::SelectedStation;
use chrono::Local;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// What the popup shows
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherState {
    /// Nothing selected
    Idle,
    Loading,
    /// `None` when the service had no observation for that hour
    Ready(Option<WeatherObservation>),
    Failed(String),
}

struct WeatherReply {
    generation: u64,
    result: std::result::Result<Option<WeatherObservation>, WeatherError>,
}

/// Fetches the observation for each new selection and tracks the popup state.
///
/// Every selection change starts a fetch tagged with a new generation. Fetches
/// are never cancelled, a reply whose generation is no longer current is
/// dropped when it arrives.
pub struct WeatherPanel {
    source: Arc<dyn WeatherSource>,
    state: WeatherState,
    station: Option<SelectedStation>,
    generation: u64,
    seen_seq: Option<u64>,
    tx: Sender<WeatherReply>,
    rx: Receiver<WeatherReply>,
}

impl WeatherPanel {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        let (tx, rx) = unbounded();
        Self {
            source,
            state: WeatherState::Idle,
            station: None,
            generation: 0,
            seen_seq: None,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &WeatherState {
        &self.state
    }

    /// Station the current state belongs to
    pub fn station(&self) -> Option<&SelectedStation> {
        self.station.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reacts to the selection identified by `seq`. Returns true if a fetch started.
    ///
    /// Calling again with the same `seq` does nothing, so this can run every frame.
    pub fn on_selection(&mut self, seq: u64, station: Option<&SelectedStation>) -> bool {
        if self.seen_seq == Some(seq) {
            return false;
        }
        self.seen_seq = Some(seq);
        self.generation += 1;

        match station {
            None => {
                self.station = None;
                self.state = WeatherState::Idle;
                false
            }
            Some(station) => {
                let request = WeatherRequest::new(&station.station_id, observation_time(Local::now()));
                self.station = Some(station.clone());
                self.state = WeatherState::Loading;
                self.start_fetch(request);
                true
            }
        }
    }

    fn start_fetch(&self, request: WeatherRequest) {
        let generation = self.generation;
        let source = self.source.clone();
        let tx = self.tx.clone();

        log::debug!(
            "weather fetch #{generation} for {} at {}",
            request.obsid,
            request.tm
        );
        crate::runtime::spawn(async move {
            let result = source.fetch(&request).await;
            // The panel may be gone
            let _ = tx.send(WeatherReply { generation, result });
        });
    }

    /// Applies replies that arrived since the last call. Returns true if the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(reply) = self.rx.try_recv() {
            if reply.generation != self.generation {
                log::debug!(
                    "dropping weather reply #{} (current #{})",
                    reply.generation,
                    self.generation
                );
                continue;
            }
            self.state = match reply.result {
                Ok(observation) => WeatherState::Ready(observation),
                Err(e) => {
                    log::warn!("weather fetch failed: {e}");
                    WeatherState::Failed(e.to_string())
                }
            };
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Answers with the requested id after a per-station delay
    struct SlowEcho {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherSource for SlowEcho {
        async fn fetch(
            &self,
            request: &WeatherRequest,
        ) -> std::result::Result<Option<WeatherObservation>, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = if request.obsid == "slow" { 200 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if request.obsid == "broken" {
                return Err(WeatherError::Api {
                    code: "03".into(),
                    message: "NO_DATA".into(),
                });
            }
            Ok(Some(WeatherObservation {
                obsid: Some(request.obsid.clone().into()),
                ..Default::default()
            }))
        }
    }

    fn panel() -> (WeatherPanel, Arc<SlowEcho>) {
        let source = Arc::new(SlowEcho {
            calls: AtomicUsize::new(0),
        });
        (WeatherPanel::new(source.clone()), source)
    }

    async fn settle(panel: &mut WeatherPanel) {
        for _ in 0..100 {
            if panel.poll() && panel.state() != &WeatherState::Loading {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_fetch_on_selection() {
        let (mut panel, source) = panel();
        let station = SelectedStation::new("1910", "X");

        assert!(panel.on_selection(1, Some(&station)));
        assert_eq!(panel.state(), &WeatherState::Loading);
        assert!(!panel.on_selection(1, Some(&station)));

        settle(&mut panel).await;
        match panel.state() {
            WeatherState::Ready(Some(obs)) => assert_eq!(obs.station_id(), "1910"),
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reselecting_refetches() {
        let (mut panel, source) = panel();
        let station = SelectedStation::new("1910", "X");

        panel.on_selection(1, Some(&station));
        settle(&mut panel).await;
        panel.on_selection(2, Some(&station));
        settle(&mut panel).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_reply_is_dropped() {
        let (mut panel, _) = panel();

        panel.on_selection(1, Some(&SelectedStation::new("slow", "S")));
        panel.on_selection(2, Some(&SelectedStation::new("fast", "F")));
        settle(&mut panel).await;
        match panel.state() {
            WeatherState::Ready(Some(obs)) => assert_eq!(obs.station_id(), "fast"),
            other => panic!("unexpected state {other:?}"),
        }

        // The slow reply lands later and must not overwrite the newer one
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!panel.poll());
        assert_eq!(panel.station().map(|s| s.station_id.as_str()), Some("fast"));
    }

    #[tokio::test]
    async fn test_error_is_reported() {
        let (mut panel, _) = panel();
        panel.on_selection(1, Some(&SelectedStation::new("broken", "B")));
        settle(&mut panel).await;
        assert_eq!(
            panel.state(),
            &WeatherState::Failed("API Error: NO_DATA (Code: 03)".into())
        );
    }

    #[tokio::test]
    async fn test_clearing_returns_to_idle() {
        let (mut panel, _) = panel();
        panel.on_selection(1, Some(&SelectedStation::new("slow", "S")));
        assert!(!panel.on_selection(2, None));
        assert_eq!(panel.state(), &WeatherState::Idle);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!panel.poll());
        assert_eq!(panel.state(), &WeatherState::Idle);
        assert!(panel.station().is_none());
    }
}
