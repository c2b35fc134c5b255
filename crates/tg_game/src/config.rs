//! Game configuration file: window, rules, splash timing and ads.
//!
//! Every section and field has a default, so an empty object is a valid
//! config. Rule changes picked up by the watcher apply from the next round
//! that gets laid out.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tg_core::Rgb;

pub const DEFAULT_CONFIG_PATH: &str = "assets/config/touchgame.json";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub version: String,
    pub window: WindowSection,
    pub rules: GameRules,
    pub splash: SplashConfig,
    pub ads: AdsConfig,
    /// Fixed RNG seed; random per launch when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            window: WindowSection::default(),
            rules: GameRules::default(),
            splash: SplashConfig::default(),
            ads: AdsConfig::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowSection {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "Touch Game".to_string(),
            width: 480,
            height: 800,
        }
    }
}

/// Tunables for the engine. Distances are fractions of the smaller field
/// dimension; speeds are pixels per second.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameRules {
    pub base_speed: f32,
    pub speed_step_per_round: f32,
    pub base_radius_fraction: f32,
    pub min_radius_fraction: f32,
    pub shrink_per_round: f32,
    pub points_per_hit: u32,
    /// Tap tolerance as a multiple of the radius.
    pub hit_tolerance: f32,
    /// Up to this round the circle count equals the round number.
    pub max_sequential_round: u32,
    pub random_circles_min: u32,
    pub random_circles_max: u32,
    /// Score that ends the game. Endless when absent.
    pub target_score: Option<u32>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            base_speed: 500.0,
            speed_step_per_round: 0.2,
            base_radius_fraction: 0.10,
            min_radius_fraction: 0.03,
            shrink_per_round: 0.95,
            points_per_hit: 10,
            hit_tolerance: 1.5,
            max_sequential_round: 10,
            random_circles_min: 2,
            random_circles_max: 10,
            target_score: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SplashConfig {
    pub duration_ms: u64,
    /// Horizontal distance the ball travels each way.
    pub travel_px: f32,
    /// Time for one leg of the back-and-forth motion.
    pub period_ms: u64,
    pub ball_color: Rgb,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2500,
            travel_px: 100.0,
            period_ms: 1500,
            ball_color: Rgb::new(0.26, 0.52, 0.96),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AdCadence {
    /// Show on every round that is a multiple of `every`, once per round.
    RoundInterval { every: u32 },
    /// After the first cleared round, show whenever a random delay between
    /// `min_secs` and `max_secs` has elapsed since the last opportunity.
    Timed { min_secs: u32, max_secs: u32 },
}

impl Default for AdCadence {
    fn default() -> Self {
        Self::RoundInterval { every: 5 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AdsConfig {
    pub enabled: bool,
    pub banner_unit_id: String,
    pub interstitial_unit_id: String,
    pub retry_delay_ms: u64,
    pub cadence: AdCadence,
    pub house: HouseAdsConfig,
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            banner_unit_id: "house/banner".to_string(),
            interstitial_unit_id: "house/interstitial".to_string(),
            retry_delay_ms: 5000,
            cadence: AdCadence::default(),
            house: HouseAdsConfig::default(),
        }
    }
}

/// Settings for the built-in local ad network.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HouseAdsConfig {
    pub latency_ms: u64,
    /// Probability in `0.0..=1.0` that a load fails.
    pub failure_rate: f32,
    pub creatives: Vec<String>,
}

impl Default for HouseAdsConfig {
    fn default() -> Self {
        Self {
            latency_ms: 400,
            failure_rate: 0.1,
            creatives: vec![
                "Enjoying Touch Game? Tell a friend!".to_string(),
                "Try beating round 10 without a miss.".to_string(),
                "Circles get faster every round. Stay sharp!".to_string(),
            ],
        }
    }
}

pub struct ConfigWatcher {
    config_path: PathBuf,
    last_seen_modified: Option<SystemTime>,
}

impl ConfigWatcher {
    pub fn new(config_path: PathBuf) -> Self {
        let last_seen_modified = modified_time(&config_path);
        Self {
            config_path,
            last_seen_modified,
        }
    }

    pub fn should_reload(&mut self) -> bool {
        let current = modified_time(&self.config_path);
        match (self.last_seen_modified, current) {
            (Some(old), Some(now)) if now > old => {
                self.last_seen_modified = Some(now);
                true
            }
            (None, Some(now)) => {
                self.last_seen_modified = Some(now);
                true
            }
            _ => false,
        }
    }
}

pub fn load_config_from_path(config_path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read config file {}: {e}", config_path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", config_path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Startup variant: a missing file is not an error, the defaults are used.
pub fn load_config_or_default(config_path: &Path) -> Result<GameConfig, String> {
    if !config_path.exists() {
        log::warn!(
            "Config '{}' not found, using built-in defaults",
            config_path.display()
        );
        return Ok(GameConfig::default());
    }
    load_config_from_path(config_path)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.window.width == 0 || config.window.height == 0 {
        return Err("Config validation failed: window size must be non-zero".to_string());
    }
    validate_rules(&config.rules)?;

    if config.splash.duration_ms == 0 || config.splash.period_ms == 0 {
        return Err("Config validation failed: splash timings must be > 0".to_string());
    }
    let ball = config.splash.ball_color;
    if ![ball.r, ball.g, ball.b].iter().all(|c| (0.0..=1.0).contains(c)) {
        return Err("Config validation failed: splash.ball_color channels must be in 0..=1".to_string());
    }

    let ads = &config.ads;
    match ads.cadence {
        AdCadence::RoundInterval { every } if every == 0 => {
            return Err("Config validation failed: ads.cadence.every must be >= 1".to_string());
        }
        AdCadence::Timed { min_secs, max_secs } if min_secs > max_secs => {
            return Err(format!(
                "Config validation failed: ads.cadence min_secs ({min_secs}) exceeds max_secs ({max_secs})"
            ));
        }
        _ => {}
    }
    if !(0.0..=1.0).contains(&ads.house.failure_rate) {
        return Err(format!(
            "Config validation failed: ads.house.failure_rate {} is outside 0..=1",
            ads.house.failure_rate
        ));
    }
    if ads.enabled && ads.house.creatives.is_empty() {
        log::warn!("Ads are enabled but no house creatives are configured");
    }
    Ok(())
}

pub fn validate_rules(rules: &GameRules) -> Result<(), String> {
    if !(rules.base_speed > 0.0 && rules.speed_step_per_round >= 0.0) {
        return Err("Config validation failed: speeds must be positive".to_string());
    }
    if !(rules.base_radius_fraction > 0.0 && rules.base_radius_fraction <= 0.5) {
        return Err(format!(
            "Config validation failed: rules.base_radius_fraction {} is outside (0, 0.5]",
            rules.base_radius_fraction
        ));
    }
    if !(rules.min_radius_fraction > 0.0 && rules.min_radius_fraction <= rules.base_radius_fraction)
    {
        return Err(format!(
            "Config validation failed: rules.min_radius_fraction {} must be in (0, base_radius_fraction]",
            rules.min_radius_fraction
        ));
    }
    if !(rules.shrink_per_round > 0.0 && rules.shrink_per_round <= 1.0) {
        return Err("Config validation failed: rules.shrink_per_round must be in (0, 1]".to_string());
    }
    if rules.points_per_hit == 0 {
        return Err("Config validation failed: rules.points_per_hit must be >= 1".to_string());
    }
    if !(rules.hit_tolerance > 0.0 && rules.hit_tolerance.is_finite()) {
        return Err("Config validation failed: rules.hit_tolerance must be > 0".to_string());
    }
    if rules.random_circles_min == 0 || rules.random_circles_min > rules.random_circles_max {
        return Err(format!(
            "Config validation failed: rules.random_circles range {}..={} is invalid",
            rules.random_circles_min, rules.random_circles_max
        ));
    }
    Ok(())
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "tg_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn write_config_file(path: &Path, body: &str) {
        fs::write(path, body).expect("failed to write temp config file");
    }

    #[test]
    fn empty_object_yields_defaults() {
        let path = temp_file_path("empty");
        write_config_file(&path, "{}");
        let config = load_config_from_path(&path).expect("empty config should load");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.rules.points_per_hit, 10);
        assert_eq!(config.ads.cadence, AdCadence::RoundInterval { every: 5 });
        assert_eq!(config.splash.duration_ms, 2500);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let path = temp_file_path("partial");
        write_config_file(
            &path,
            r#"{
              "seed": 42,
              "rules": { "base_speed": 320.0, "target_score": 25 },
              "ads": { "cadence": { "mode": "timed", "min_secs": 10, "max_secs": 60 } }
            }"#,
        );
        let config = load_config_from_path(&path).expect("partial config should load");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.rules.base_speed, 320.0);
        assert_eq!(config.rules.target_score, Some(25));
        assert_eq!(config.rules.hit_tolerance, 1.5);
        assert_eq!(
            config.ads.cadence,
            AdCadence::Timed {
                min_secs: 10,
                max_secs: 60
            }
        );
        assert_eq!(config.ads.retry_delay_ms, 5000);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn splash_ball_color_is_configurable() {
        let path = temp_file_path("ball");
        write_config_file(
            &path,
            r#"{ "splash": { "ball_color": { "r": 1.0, "g": 0.5, "b": 0.0 } } }"#,
        );
        let config = load_config_from_path(&path).expect("ball colour should load");
        assert_eq!(config.splash.ball_color, Rgb::new(1.0, 0.5, 0.0));
        assert_eq!(config.splash.duration_ms, 2500);

        write_config_file(
            &path,
            r#"{ "splash": { "ball_color": { "r": 2.0, "g": 0.5, "b": 0.0 } } }"#,
        );
        let err = load_config_from_path(&path).unwrap_err();
        assert!(err.contains("ball_color"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_inverted_timed_cadence() {
        let path = temp_file_path("cadence");
        write_config_file(
            &path,
            r#"{ "ads": { "cadence": { "mode": "timed", "min_secs": 60, "max_secs": 10 } } }"#,
        );
        let err = load_config_from_path(&path).expect_err("inverted range should fail");
        assert!(err.contains("exceeds max_secs"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_zero_round_interval() {
        let path = temp_file_path("interval");
        write_config_file(
            &path,
            r#"{ "ads": { "cadence": { "mode": "round_interval", "every": 0 } } }"#,
        );
        let err = load_config_from_path(&path).expect_err("zero interval should fail");
        assert!(err.contains("every must be >= 1"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_min_radius_above_base() {
        let path = temp_file_path("radius");
        write_config_file(
            &path,
            r#"{ "rules": { "base_radius_fraction": 0.05, "min_radius_fraction": 0.08 } }"#,
        );
        let err = load_config_from_path(&path).expect_err("bad radius should fail");
        assert!(err.contains("min_radius_fraction"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_nan_rules() {
        let rules = GameRules {
            base_speed: f32::NAN,
            ..GameRules::default()
        };
        assert!(validate_rules(&rules).is_err());

        let rules = GameRules {
            hit_tolerance: f32::NAN,
            ..GameRules::default()
        };
        assert!(validate_rules(&rules).is_err());

        let rules = GameRules {
            speed_step_per_round: f32::NAN,
            ..GameRules::default()
        };
        assert!(validate_rules(&rules).is_err());
    }

    #[test]
    fn rejects_failure_rate_out_of_range() {
        let path = temp_file_path("failure");
        write_config_file(&path, r#"{ "ads": { "house": { "failure_rate": 1.5 } } }"#);
        let err = load_config_from_path(&path).expect_err("bad failure rate should fail");
        assert!(err.contains("failure_rate"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let path = temp_file_path("malformed");
        write_config_file(&path, "{ not json");
        let err = load_config_from_path(&path).expect_err("malformed config should fail");
        assert!(err.contains("Failed to parse config JSON"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = temp_file_path("missing");
        let _ = fs::remove_file(&path);
        let config = load_config_or_default(&path).expect("missing file uses defaults");
        assert_eq!(config, GameConfig::default());
        assert!(load_config_from_path(&path).is_err());
    }

    #[test]
    fn config_watcher_detects_newly_created_file() {
        let path = temp_file_path("watcher_create");
        let _ = fs::remove_file(&path);

        let mut watcher = ConfigWatcher::new(path.clone());
        assert!(!watcher.should_reload(), "missing file should not reload");

        write_config_file(&path, "{}");
        assert!(
            watcher.should_reload(),
            "creating file should trigger reload once"
        );
        assert!(
            !watcher.should_reload(),
            "without changes, second poll should not reload"
        );

        let _ = fs::remove_file(path);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/config/touchgame.json");
        let config = load_config_from_path(&path).expect("shipped config should load");
        assert_eq!(config, GameConfig::default());
    }
}
