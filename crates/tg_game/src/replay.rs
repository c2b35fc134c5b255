use crate::config::GameRules;
use crate::game::Game;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct TouchReplay {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub seed: u64,
    pub width: f32,
    pub height: f32,
    pub frames: Vec<TouchFrame>,
}

/// One simulation step, optionally preceded by a tap. `tap` is a field
/// position; `tap_circle` taps the centre of the circle at that index.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TouchFrame {
    #[serde(default)]
    pub tap: Option<[f32; 2]>,
    #[serde(default)]
    pub tap_circle: Option<usize>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub score: u32,
    pub round: u32,
    pub hits: u32,
    pub circles: Vec<(f32, f32)>,
}

impl TouchReplay {
    pub fn expanded_frames(&self) -> Vec<TouchFrame> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(TouchFrame {
                    repeat: 1,
                    ..frame.clone()
                });
            }
        }
        out
    }

    pub fn run(&self, rules: &GameRules) -> ReplayOutcome {
        let mut game = Game::new(rules.clone(), self.seed);
        game.init(self.width, self.height);
        let mut hits = 0;
        for frame in self.expanded_frames() {
            let target = frame.tap.map(|[x, y]| (x, y)).or_else(|| {
                frame
                    .tap_circle
                    .and_then(|i| game.circles().get(i))
                    .map(|c| (c.x, c.y))
            });
            if let Some((x, y)) = target {
                if game.handle_touch(x, y) {
                    hits += 1;
                }
            }
            game.update(self.fixed_dt);
        }
        ReplayOutcome {
            score: game.score(),
            round: game.round(),
            hits,
            circles: game.circles().iter().map(|c| (c.x, c.y)).collect(),
        }
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<TouchReplay, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: TouchReplay = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &TouchReplay) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.width <= 0.0 || replay.height <= 0.0 {
        return Err("Replay validation failed: field size must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "touchgame_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "seed": 7,
              "width": 400,
              "height": 600,
              "frames": [
                { "repeat": 3 },
                { "tap": [10.0, 20.0] }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_frames();
        assert_eq!(expanded.len(), 4);
        assert_eq!(expanded[3].tap, Some([10.0, 20.0]));
        assert!((replay.fixed_dt - 1.0 / 60.0).abs() < 1e-6);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn invalid_replay_is_rejected() {
        let path = temp_file_path("invalid");
        fs::write(
            &path,
            r#"{ "seed": 1, "width": 0, "height": 600, "frames": [{}] }"#,
        )
        .expect("write replay file");

        let err = load_replay_from_path(&path).expect_err("zero width must fail");
        assert!(err.contains("field size"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "seed": 12345,
              "width": 480,
              "height": 640,
              "frames": [
                { "repeat": 30 },
                { "tap_circle": 0 },
                { "repeat": 45 },
                { "tap_circle": 0 },
                { "tap": [240.0, 320.0], "repeat": 10 },
                { "tap_circle": 1 },
                { "repeat": 120 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let rules = GameRules::default();
        let run_a = replay.run(&rules);
        let run_b = replay.run(&rules);

        assert_eq!(run_a, run_b);
        assert!(run_a.hits >= 2);
        assert!(run_a.round >= 2);
        assert_eq!(run_a.score, run_a.hits * rules.points_per_hit);

        let _ = fs::remove_file(path);
    }
}
