use rand::Rng;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::types::{Millis, Team};
use crate::ingest::ingest_sample;
use crate::pipeline::lap_time::ms_to_lap_str;
use crate::shared::AppState;

const LAP_JITTER_MS: u64 = 600;
const ANOMALY_CHANCE: f64 = 0.02;
const POSITION_SWAP_CHANCE: f64 = 0.10;
const MIN_LAP_MS: u64 = 60_000;
const MAX_LAP_MS: u64 = 150_000;

struct SimPilot {
    id: &'static str,
    name: &'static str,
    team: Team,
    base_lap_ms: u64,
    position: u8,
}

fn grid() -> Vec<SimPilot> {
    let seeds: [(&'static str, &'static str, Team, u64); 8] = [
        ("lec16", "Charles Leclerc", Team::Ferrari, 78_400),
        ("sai55", "Carlos Sainz", Team::Ferrari, 79_100),
        ("ver33", "Max Verstappen", Team::RedBull, 78_000),
        ("per11", "Sergio Pérez", Team::RedBull, 80_200),
        ("ham44", "Lewis Hamilton", Team::Mercedes, 79_600),
        ("rus63", "George Russell", Team::Mercedes, 79_900),
        ("nor04", "Lando Norris", Team::McLaren, 78_800),
        ("pia81", "Oscar Piastri", Team::McLaren, 81_500),
    ];
    seeds
        .into_iter()
        .enumerate()
        .map(|(i, (id, name, team, base_lap_ms))| SimPilot {
            id,
            name,
            team,
            base_lap_ms,
            position: (i + 1) as u8,
        })
        .collect()
}

/// Synthetic telemetry source for local development. Drives the same
/// ingestion path as the HTTP endpoint, one payload per pilot per
/// period, so the store, the SSE stream and the metrics all light up
/// without an external feed.
pub struct Simulator {
    state: AppState,
    period: Duration,
    pilots: Vec<SimPilot>,
}

impl Simulator {
    pub fn new(state: AppState, period: Duration) -> Self {
        Self {
            state,
            period,
            pilots: grid(),
        }
    }

    /// Spawns the generator loop as a background task
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        info!(
            period_ms = self.period.as_millis() as u64,
            pilots = self.pilots.len(),
            "Telemetry simulator started"
        );

        let mut ticker = tokio::time::interval(self.period);
        loop {
            ticker.tick().await;
            let payloads = self.next_lap();
            for payload in payloads {
                if let Err(error) = ingest_sample(&self.state, &payload).await {
                    warn!(%error, "Simulator payload rejected");
                }
            }
        }
    }

    /// Produces one payload per pilot and advances the simulated race
    /// state. Payloads take the same raw wire shape a real feed sends.
    fn next_lap(&mut self) -> Vec<Value> {
        let mut rng = rand::rng();

        // Occasionally swap adjacent cars to make positions move
        for i in 1..self.pilots.len() {
            if rng.random_bool(POSITION_SWAP_CHANCE) {
                let front = self.pilots[i - 1].position;
                self.pilots[i - 1].position = self.pilots[i].position;
                self.pilots[i].position = front;
            }
        }

        self.pilots
            .iter()
            .map(|pilot| {
                let jitter = rng.random_range(0..=2 * LAP_JITTER_MS) as i64 - LAP_JITTER_MS as i64;
                let mut lap_ms = pilot.base_lap_ms.saturating_add_signed(jitter);

                let anomaly = rng.random_bool(ANOMALY_CHANCE);
                if anomaly {
                    lap_ms += rng.random_range(4_000..=6_000);
                }
                lap_ms = lap_ms.clamp(MIN_LAP_MS, MAX_LAP_MS);

                json!({
                    "pilotId": pilot.id,
                    "pilotName": pilot.name,
                    "team": pilot.team,
                    "currentPosition": pilot.position,
                    "lastLapTime": ms_to_lap_str(Millis(lap_ms)),
                    "anomalyDetected": anomaly,
                })
            })
            .collect()
    }
}
