//! Ad orchestration: interstitial slot, banner lifecycle and display cadence.
//!
//! Networks do their work off the main thread and report back through an
//! [`AdEvent`] channel. [`AdManager::poll`] drains that channel on the main
//! thread, so the loaded ad handle only ever has one owner.
//!
//! All timing takes an explicit `now` so the state machine can be driven
//! from tests without sleeping.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crate::config::{AdCadence, AdsConfig};

/// A loaded full-screen ad, ready to be shown once.
#[derive(Debug, Clone, PartialEq)]
pub struct InterstitialAd {
    pub id: u64,
    pub unit_id: String,
    pub creative: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BannerAd {
    pub unit_id: String,
    pub creative: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdEvent {
    Initialized,
    InterstitialLoaded(InterstitialAd),
    InterstitialFailedToLoad { unit_id: String, error: String },
    BannerLoaded(BannerAd),
    BannerFailedToLoad { unit_id: String, error: String },
}

/// An ad provider. Loads are asynchronous and answer with [`AdEvent`]s on
/// the channel the network was built with.
pub trait AdNetwork {
    fn name(&self) -> &str;
    fn initialize(&mut self);
    fn load_interstitial(&mut self, unit_id: &str);
    fn load_banner(&mut self, unit_id: &str);
    /// Hand a loaded ad to the screen. An error means it could not be shown.
    fn show_interstitial(&mut self, ad: &InterstitialAd) -> Result<(), String>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterstitialSlot {
    Empty,
    Loading,
    Ready(InterstitialAd),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BannerState {
    NotLoaded,
    Loading,
    Loaded { ad: BannerAd, paused: bool },
    Failed,
    Destroyed,
}

/// Why an interstitial was not shown at an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    NotDue,
    Shown,
    SkippedNotReady,
    FailedToShow,
}

pub struct AdManager {
    config: AdsConfig,
    network: Box<dyn AdNetwork>,
    events: Receiver<AdEvent>,
    initialized: bool,
    slot: InterstitialSlot,
    retry_at: Option<Instant>,
    presenting: Option<InterstitialAd>,
    banner: BannerState,
    last_ad_round: Option<u32>,
    first_level_completed: bool,
    last_opportunity: Instant,
    next_delay: Duration,
    rng: StdRng,
}

impl AdManager {
    pub fn new(
        config: AdsConfig,
        network: Box<dyn AdNetwork>,
        events: Receiver<AdEvent>,
        seed: u64,
        now: Instant,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let next_delay = random_delay(&mut rng, config.cadence);
        Self {
            config,
            network,
            events,
            initialized: false,
            slot: InterstitialSlot::Empty,
            retry_at: None,
            presenting: None,
            banner: BannerState::NotLoaded,
            last_ad_round: None,
            first_level_completed: false,
            last_opportunity: now,
            next_delay,
            rng,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Kick off network initialisation. Loads start once it reports back.
    pub fn start(&mut self) {
        if !self.config.enabled {
            log::info!("Ads disabled by config");
            return;
        }
        log::info!("Initializing ad network '{}'", self.network.name());
        self.network.initialize();
    }

    /// Apply network events and fire a pending load retry when it is due.
    pub fn poll(&mut self, now: Instant) {
        while let Ok(event) = self.events.try_recv() {
            self.apply(event, now);
        }

        if let Some(at) = self.retry_at {
            if now >= at {
                self.retry_at = None;
                log::debug!("Retrying interstitial load");
                self.load_interstitial();
            }
        }
    }

    fn apply(&mut self, event: AdEvent, now: Instant) {
        if !self.config.enabled {
            return;
        }
        match event {
            AdEvent::Initialized => {
                log::info!("Ad network '{}' initialized", self.network.name());
                self.initialized = true;
                self.load_interstitial();
                self.load_banner();
            }
            AdEvent::InterstitialLoaded(ad) => {
                log::info!("Interstitial {} loaded for '{}'", ad.id, ad.unit_id);
                self.slot = InterstitialSlot::Ready(ad);
            }
            AdEvent::InterstitialFailedToLoad { unit_id, error } => {
                log::warn!(
                    "Interstitial '{}' failed to load: {}. Retrying in {}ms",
                    unit_id,
                    error,
                    self.config.retry_delay_ms
                );
                self.slot = InterstitialSlot::Empty;
                self.retry_at = Some(now + Duration::from_millis(self.config.retry_delay_ms));
            }
            AdEvent::BannerLoaded(ad) => {
                if self.banner == BannerState::Destroyed {
                    return;
                }
                log::info!("Banner '{}' loaded", ad.unit_id);
                self.banner = BannerState::Loaded { ad, paused: false };
            }
            AdEvent::BannerFailedToLoad { unit_id, error } => {
                if self.banner == BannerState::Destroyed {
                    return;
                }
                log::warn!("Banner '{}' failed to load: {}", unit_id, error);
                self.banner = BannerState::Failed;
            }
        }
    }

    fn load_interstitial(&mut self) {
        if !self.initialized {
            return;
        }
        self.slot = InterstitialSlot::Loading;
        let unit = self.config.interstitial_unit_id.clone();
        self.network.load_interstitial(&unit);
    }

    fn load_banner(&mut self) {
        if self.banner != BannerState::NotLoaded {
            return;
        }
        self.banner = BannerState::Loading;
        let unit = self.config.banner_unit_id.clone();
        self.network.load_banner(&unit);
    }

    /// Called whenever score or round is refreshed. Decides whether this is
    /// an ad opportunity and, if the slot is ready, shows the interstitial.
    pub fn on_progress(&mut self, round: u32, now: Instant) -> ShowOutcome {
        if !self.config.enabled || self.presenting.is_some() {
            return ShowOutcome::NotDue;
        }

        match self.config.cadence {
            AdCadence::RoundInterval { every } => {
                if every == 0 || round == 0 || round % every != 0 {
                    return ShowOutcome::NotDue;
                }
                if self.last_ad_round == Some(round) {
                    return ShowOutcome::NotDue;
                }
                let outcome = self.show_interstitial();
                if outcome == ShowOutcome::Shown {
                    self.last_ad_round = Some(round);
                }
                outcome
            }
            AdCadence::Timed { .. } => {
                // Stays enabled after a reset back to round 1.
                if round > 1 {
                    self.first_level_completed = true;
                }
                if !self.first_level_completed {
                    return ShowOutcome::NotDue;
                }
                if now.saturating_duration_since(self.last_opportunity) < self.next_delay {
                    return ShowOutcome::NotDue;
                }
                let outcome = self.show_interstitial();
                self.last_opportunity = now;
                self.next_delay = random_delay(&mut self.rng, self.config.cadence);
                log::debug!("Next ad opportunity in {:?}", self.next_delay);
                outcome
            }
        }
    }

    fn show_interstitial(&mut self) -> ShowOutcome {
        let ad = match std::mem::replace(&mut self.slot, InterstitialSlot::Empty) {
            InterstitialSlot::Ready(ad) => ad,
            other => {
                log::trace!("Interstitial not ready, skipping opportunity");
                self.slot = other;
                return ShowOutcome::SkippedNotReady;
            }
        };

        match self.network.show_interstitial(&ad) {
            Ok(()) => {
                log::info!("Showing interstitial {}", ad.id);
                self.presenting = Some(ad);
                ShowOutcome::Shown
            }
            Err(err) => {
                log::warn!("Interstitial {} failed to show: {}", ad.id, err);
                self.load_interstitial();
                ShowOutcome::FailedToShow
            }
        }
    }

    /// A new game started, so round-interval opportunities open again.
    pub fn on_game_reset(&mut self) {
        self.last_ad_round = None;
    }

    /// The player closed the interstitial.
    pub fn dismiss_interstitial(&mut self) {
        if let Some(ad) = self.presenting.take() {
            log::info!("Interstitial {} dismissed", ad.id);
            self.load_interstitial();
        }
    }

    pub fn presenting(&self) -> Option<&InterstitialAd> {
        self.presenting.as_ref()
    }

    /// Creative to draw in the banner strip, if one is loaded and active.
    pub fn banner_creative(&self) -> Option<&str> {
        match &self.banner {
            BannerState::Loaded { ad, paused: false } => Some(&ad.creative),
            _ => None,
        }
    }

    pub fn pause_banner(&mut self) {
        if let BannerState::Loaded { paused, .. } = &mut self.banner {
            if !*paused {
                log::debug!("Banner paused");
                *paused = true;
            }
        }
    }

    pub fn resume_banner(&mut self) {
        if let BannerState::Loaded { paused, .. } = &mut self.banner {
            if *paused {
                log::debug!("Banner resumed");
                *paused = false;
            }
        }
    }

    pub fn destroy_banner(&mut self) {
        if self.banner != BannerState::Destroyed {
            log::info!("Banner destroyed");
            self.banner = BannerState::Destroyed;
        }
    }

    pub fn status_label(&self) -> &'static str {
        if !self.config.enabled {
            return "disabled";
        }
        if self.presenting.is_some() {
            return "showing";
        }
        match self.slot {
            InterstitialSlot::Empty if self.retry_at.is_some() => "retry pending",
            InterstitialSlot::Empty => "empty",
            InterstitialSlot::Loading => "loading",
            InterstitialSlot::Ready(_) => "ready",
        }
    }
}

/// Next timed-cadence delay, whole seconds in `min_secs..=max_secs`.
fn random_delay<R: Rng>(rng: &mut R, cadence: AdCadence) -> Duration {
    match cadence {
        AdCadence::Timed { min_secs, max_secs } => {
            let hi = max_secs.max(min_secs);
            Duration::from_secs(rng.gen_range(min_secs..=hi) as u64)
        }
        AdCadence::RoundInterval { .. } => Duration::ZERO,
    }
}
