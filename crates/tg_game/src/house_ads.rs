//! Built-in ad network that serves local "house" creatives.
//!
//! Every request is answered from a short-lived worker thread after the
//! configured latency. Whether a load fails and which creative it carries are
//! decided up front on the caller's thread, so a seeded network replays the
//! same sequence of outcomes.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::ads::{AdEvent, AdNetwork, BannerAd, InterstitialAd};
use crate::config::HouseAdsConfig;

const FALLBACK_CREATIVE: &str = "Touch Game";

pub struct HouseAdNetwork {
    config: HouseAdsConfig,
    events: Sender<AdEvent>,
    rng: StdRng,
    next_id: u64,
    initialized: bool,
}

impl HouseAdNetwork {
    pub fn new(config: HouseAdsConfig, events: Sender<AdEvent>, seed: u64) -> Self {
        Self {
            config,
            events,
            rng: StdRng::seed_from_u64(seed),
            next_id: 1,
            initialized: false,
        }
    }

    fn latency(&self) -> Duration {
        Duration::from_millis(self.config.latency_ms)
    }

    fn roll_failure(&mut self) -> bool {
        let rate = self.config.failure_rate.clamp(0.0, 1.0);
        self.rng.gen::<f32>() < rate
    }

    fn pick_creative(&mut self) -> String {
        self.config
            .creatives
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| FALLBACK_CREATIVE.to_string())
    }

    /// Deliver `event` after the network latency.
    fn respond(&self, event: AdEvent) {
        let tx = self.events.clone();
        let delay = self.latency();
        thread::spawn(move || {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            // The manager may already be gone during shutdown.
            if tx.send(event).is_err() {
                log::trace!("Ad event dropped, receiver closed");
            }
        });
    }
}

impl AdNetwork for HouseAdNetwork {
    fn name(&self) -> &str {
        "house"
    }

    fn initialize(&mut self) {
        self.initialized = true;
        self.respond(AdEvent::Initialized);
    }

    fn load_interstitial(&mut self, unit_id: &str) {
        let event = if self.roll_failure() {
            AdEvent::InterstitialFailedToLoad {
                unit_id: unit_id.to_string(),
                error: "no fill".to_string(),
            }
        } else {
            let id = self.next_id;
            self.next_id += 1;
            AdEvent::InterstitialLoaded(InterstitialAd {
                id,
                unit_id: unit_id.to_string(),
                creative: self.pick_creative(),
            })
        };
        self.respond(event);
    }

    fn load_banner(&mut self, unit_id: &str) {
        let event = if self.roll_failure() {
            AdEvent::BannerFailedToLoad {
                unit_id: unit_id.to_string(),
                error: "no fill".to_string(),
            }
        } else {
            AdEvent::BannerLoaded(BannerAd {
                unit_id: unit_id.to_string(),
                creative: self.pick_creative(),
            })
        };
        self.respond(event);
    }

    fn show_interstitial(&mut self, ad: &InterstitialAd) -> Result<(), String> {
        if !self.initialized {
            return Err(format!(
                "Cannot show interstitial {}: network not initialized",
                ad.id
            ));
        }
        Ok(())
    }
}
