//! Sensor simulation for testing.
//!
//! Drives the bridge's sensors with a bounded random walk so subscriptions
//! see realistic, slowly drifting values.

use crate::bridge::SensorBridge;
use log::info;
use parking_lot::RwLock as SyncRwLock;
use rand::Rng;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};
use tokio_util::sync::CancellationToken;

/// Largest temperature change per tick, °C
const TEMPERATURE_STEP: f64 = 0.5;
/// Fraction of the distance back to the baseline recovered per tick
const TEMPERATURE_PULL: f64 = 0.1;
/// Farthest the temperature wanders from its baseline, °C
const TEMPERATURE_SPREAD: f64 = 5.0;
/// Largest humidity change per tick, %
const HUMIDITY_STEP: f64 = 2.0;
/// Chance per tick that occupancy flips
const OCCUPANCY_FLIP_PROBABILITY: f64 = 0.2;

/// Current simulated readings.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorWalk {
    /// Temperature the walk drifts around
    pub baseline_celsius: f64,
    pub celsius: f64,
    pub percent: f64,
    pub occupied: bool,
}

impl SensorWalk {
    pub fn new(celsius: f64, percent: f64) -> Self {
        Self {
            baseline_celsius: celsius,
            celsius,
            percent,
            occupied: false,
        }
    }

    /// Advance one tick. Temperature is pulled back toward its baseline and
    /// stays within `TEMPERATURE_SPREAD` of it; humidity stays within
    /// 0..=100 %.
    pub fn step(&mut self, rng: &mut impl Rng) {
        let pull = (self.baseline_celsius - self.celsius) * TEMPERATURE_PULL;
        self.celsius = (self.celsius + pull + rng.gen_range(-TEMPERATURE_STEP..=TEMPERATURE_STEP))
            .clamp(
                self.baseline_celsius - TEMPERATURE_SPREAD,
                self.baseline_celsius + TEMPERATURE_SPREAD,
            );
        self.percent =
            (self.percent + rng.gen_range(-HUMIDITY_STEP..=HUMIDITY_STEP)).clamp(0.0, 100.0);
        if rng.gen_bool(OCCUPANCY_FLIP_PROBABILITY) {
            self.occupied = !self.occupied;
        }
    }
}

/// Spawn a task that feeds simulated readings into `bridge` every `period`
/// until `cancel` fires.
pub fn run_sensor_simulation(
    bridge: Arc<SyncRwLock<SensorBridge>>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut walk = {
            let bridge = bridge.read();
            SensorWalk::new(
                bridge.temperature().measured_value_celsius().unwrap_or(20.0),
                bridge.humidity().measured_value_percent().unwrap_or(50.0),
            )
        };
        let mut interval = interval(period);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            walk.step(&mut rand::thread_rng());

            let bridge = bridge.read();
            bridge.temperature().set_measured_value_celsius(walk.celsius);
            bridge.humidity().set_measured_value_percent(walk.percent);
            if bridge.occupancy().set_occupancy(walk.occupied) {
                info!("[Sim] Occupancy changed to: {}", walk.occupied);
            }
            log::debug!(
                "[Sim] temperature={:?} humidity={:?}",
                bridge.temperature().measured_value_celsius(),
                bridge.humidity().measured_value_percent()
            );
        }

        info!("[Sim] Sensor simulation stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::matter::endpoints::sensors::temperature_sensor::celsius_to_raw;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_walk_stays_within_step_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut walk = SensorWalk::new(20.0, 99.0);

        for _ in 0..1000 {
            walk.step(&mut rng);
            assert!((0.0..=100.0).contains(&walk.percent));
        }
    }

    #[test]
    fn test_temperature_keeps_moving_around_baseline() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut walk = SensorWalk::new(21.0, 45.0);

        let mut changes = 0;
        for _ in 0..100_000 {
            let before = walk.celsius;
            walk.step(&mut rng);
            assert!((walk.celsius - 21.0).abs() <= TEMPERATURE_SPREAD);
            if celsius_to_raw(walk.celsius) != celsius_to_raw(before) {
                changes += 1;
            }
        }
        // Still producing new readings late in a long run
        let late_start = walk.celsius;
        let moved = (0..50).any(|_| {
            walk.step(&mut rng);
            celsius_to_raw(walk.celsius) != celsius_to_raw(late_start)
        });
        assert!(moved);
        assert!(changes > 90_000);
    }

    #[tokio::test]
    async fn test_simulation_stops_on_cancel() {
        let mut bridge = SensorBridge::new(&Config::default());
        bridge.begin().unwrap();
        let bridge = Arc::new(SyncRwLock::new(bridge));

        let cancel = CancellationToken::new();
        let task = run_sensor_simulation(bridge.clone(), Duration::from_millis(5), cancel.clone());
        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();
        task.await.unwrap();

        let bridge = bridge.read();
        let celsius = bridge.temperature().measured_value_celsius().unwrap();
        assert!((-40.0..=100.0).contains(&celsius));
    }
}
