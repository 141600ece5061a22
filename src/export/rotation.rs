//! Auto-rotating camera.
//!
//! [`RotationState`] is the same two-state machine that [`rotation_script`]
//! emits as JavaScript, driven here by an injected [`Clock`] so pause and
//! resume can be exercised without waiting on wall time.

use std::cell::Cell;
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

/// How long a manual camera change suspends rotation.
pub const INTERACTION_GRACE_MS: u64 = 3000;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RotationConfig {
    pub enabled: bool,
    pub rpm: f64,
    pub interval_ms: u64,
    /// Camera orbit radius in Plotly eye units, not AU.
    pub radius: f64,
    pub height: f64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        RotationConfig {
            enabled: true,
            rpm: 0.6,
            interval_ms: 50,
            radius: 2.2,
            height: 0.5,
        }
    }
}

impl RotationConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_rpm(mut self, rpm: f64) -> Self {
        self.rpm = rpm;
        self
    }

    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Radians advanced per tick.
    pub fn step(&self) -> f64 {
        TAU * self.rpm * (self.interval_ms as f64 / 60_000.0)
    }

    /// Ticks swallowed by one interaction landing just after a tick. An
    /// interaction on the same millisecond as a tick swallows one fewer, since
    /// the tick at exactly `paused_until` already rotates.
    pub fn pause_ticks(&self) -> u64 {
        INTERACTION_GRACE_MS.div_ceil(self.interval_ms.max(1))
    }

    pub fn eye_at(&self, angle: f64) -> [f64; 3] {
        [self.radius * angle.cos(), self.radius * angle.sin(), self.height]
    }
}

pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;
}

/// Clock advanced by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        ManualClock {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationPhase {
    Rotating,
    Paused,
}

#[derive(Clone, Debug)]
pub struct RotationState {
    config: RotationConfig,
    angle: f64,
    paused_until_ms: u64,
    phase: RotationPhase,
}

impl RotationState {
    pub fn new(config: RotationConfig) -> Self {
        RotationState {
            config,
            angle: 0.0,
            paused_until_ms: 0,
            phase: RotationPhase::Rotating,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn phase(&self) -> RotationPhase {
        self.phase
    }

    pub fn paused_until_ms(&self) -> u64 {
        self.paused_until_ms
    }

    /// One timer tick. Returns the new camera eye, or `None` while paused.
    pub fn tick<C: Clock + ?Sized>(&mut self, clock: &C) -> Option<[f64; 3]> {
        if clock.now_ms() < self.paused_until_ms {
            self.phase = RotationPhase::Paused;
            return None;
        }
        self.phase = RotationPhase::Rotating;
        self.angle = (self.angle + self.config.step()).rem_euclid(TAU);
        Some(self.config.eye_at(self.angle))
    }

    /// A user-initiated camera change; extends any pause already running.
    pub fn on_user_interaction<C: Clock + ?Sized>(&mut self, clock: &C) {
        self.paused_until_ms = clock.now_ms() + INTERACTION_GRACE_MS;
        self.phase = RotationPhase::Paused;
    }
}

/// Client-side loop for the exported page. Empty when rotation is disabled.
///
/// Relayouts issued by the loop itself are flagged so they are not mistaken
/// for user interaction; in-progress gestures pause regardless of the flag.
pub fn rotation_script(div_id: &str, config: &RotationConfig) -> String {
    if !config.enabled {
        return String::new();
    }
    format!(
        r#"<script>
(function() {{
  var div = document.getElementById({div_id});
  var interval = {interval};
  var rpm = {rpm};
  var R = {radius};
  var Z = {height};
  var grace = {grace};
  var angle = 0;
  var pausedUntil = 0;
  // Set while our own relayout is in flight so its plotly_relayout is not
  // read as user input. plotly_relayouting only fires for user gestures and
  // always pauses, so a drag starting inside that window is not lost.
  var spinning = false;

  function pause() {{
    pausedUntil = Date.now() + grace;
  }}
  div.on('plotly_relayout', function() {{
    if (!spinning) pause();
  }});
  div.on('plotly_relayouting', pause);

  setInterval(function() {{
    if (Date.now() < pausedUntil) return;
    angle = (angle + 2 * Math.PI * rpm * (interval / 60000.0)) % (2 * Math.PI);
    var cam = {{ eye: {{ x: R * Math.cos(angle), y: R * Math.sin(angle), z: Z }} }};
    spinning = true;
    Promise.resolve(Plotly.relayout(div, {{ 'scene.camera': cam }})).then(
      function() {{ spinning = false; }},
      function() {{ spinning = false; }}
    );
  }}, interval);
}})();
</script>
"#,
        div_id = js_string(div_id),
        interval = config.interval_ms,
        rpm = js_number(config.rpm),
        radius = js_number(config.radius),
        height = js_number(config.height),
        grace = INTERACTION_GRACE_MS,
    )
}

fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string().replace("</", "<\\/")
}

fn js_number(n: f64) -> String {
    if n.is_finite() {
        format!("{n:?}")
    } else {
        "0".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn starts_rotating_at_zero() {
        let state = RotationState::new(RotationConfig::default());
        assert_eq!(state.phase(), RotationPhase::Rotating);
        assert_eq!(state.angle(), 0.0);
    }

    #[test]
    fn angle_increases_every_tick_without_interaction() {
        let config = RotationConfig::default();
        let clock = ManualClock::new(1_000);
        let mut state = RotationState::new(config.clone());

        let mut previous = state.angle();
        for _ in 0..500 {
            clock.advance(config.interval_ms);
            let eye = state.tick(&clock).expect("rotating");
            assert!(state.angle() > previous);
            assert_approx_eq!(eye[2], config.height);
            previous = state.angle();
        }
        assert_approx_eq!(state.angle(), 500.0 * config.step(), 1e-9);
    }

    #[test]
    fn eye_follows_the_camera_orbit() {
        let config = RotationConfig::default().with_rpm(15.0).with_interval_ms(1000);
        // a quarter turn per tick
        let clock = ManualClock::new(0);
        let mut state = RotationState::new(config.clone());
        let eye = state.tick(&clock).unwrap();
        assert_approx_eq!(eye[0], 0.0, 1e-12);
        assert_approx_eq!(eye[1], config.radius, 1e-12);
        assert_approx_eq!(eye[2], config.height);
    }

    #[test]
    fn angle_wraps_after_a_full_turn() {
        let config = RotationConfig::default().with_rpm(15.0).with_interval_ms(1000);
        let clock = ManualClock::new(0);
        let mut state = RotationState::new(config);
        for _ in 0..5 {
            clock.advance(1000);
            state.tick(&clock);
        }
        assert!(state.angle() < TAU);
        assert_approx_eq!(state.angle(), TAU / 4.0, 1e-9);
    }

    #[test]
    fn interaction_pauses_for_the_grace_period() {
        let config = RotationConfig::default();
        let clock = ManualClock::new(0);
        let mut state = RotationState::new(config.clone());

        for _ in 0..10 {
            clock.advance(config.interval_ms);
            state.tick(&clock);
        }
        clock.advance(1);
        state.on_user_interaction(&clock);
        assert_eq!(state.phase(), RotationPhase::Paused);
        clock.advance(config.interval_ms - 1);

        let frozen = state.angle();
        for _ in 0..config.pause_ticks() {
            assert!(state.tick(&clock).is_none());
            assert_eq!(state.angle(), frozen);
            assert_eq!(state.phase(), RotationPhase::Paused);
            clock.advance(config.interval_ms);
        }
        assert!(state.tick(&clock).is_some());
        assert_eq!(state.phase(), RotationPhase::Rotating);
        assert!(state.angle() > frozen);
    }

    #[test]
    fn interaction_on_a_tick_resumes_at_the_deadline() {
        let config = RotationConfig::default();
        let clock = ManualClock::new(0);
        let mut state = RotationState::new(config.clone());

        for _ in 0..10 {
            clock.advance(config.interval_ms);
            state.tick(&clock);
        }
        state.on_user_interaction(&clock);
        let deadline = state.paused_until_ms();

        let frozen = state.angle();
        let mut paused = 0;
        loop {
            clock.advance(config.interval_ms);
            if state.tick(&clock).is_some() {
                break;
            }
            assert_eq!(state.angle(), frozen);
            paused += 1;
        }
        assert_eq!(paused, config.pause_ticks() - 1);
        assert_eq!(clock.now_ms(), deadline);
    }

    #[test]
    fn repeated_interaction_extends_the_pause() {
        let clock = ManualClock::new(10_000);
        let mut state = RotationState::new(RotationConfig::default());
        state.on_user_interaction(&clock);
        clock.advance(2_500);
        state.on_user_interaction(&clock);
        clock.advance(2_500);
        assert!(state.tick(&clock).is_none());
        assert_eq!(state.paused_until_ms(), 10_000 + 2_500 + INTERACTION_GRACE_MS);
    }

    #[test]
    fn pause_ticks_rounds_up() {
        assert_eq!(RotationConfig::default().pause_ticks(), 60);
        assert_eq!(RotationConfig::default().with_interval_ms(70).pause_ticks(), 43);
        assert_eq!(RotationConfig::default().with_interval_ms(0).pause_ticks(), 3000);
    }

    #[test]
    fn script_carries_parameters() {
        let config = RotationConfig::default().with_rpm(1.5).with_interval_ms(40);
        let js = rotation_script("scene-div", &config);
        assert!(js.contains("document.getElementById(\"scene-div\")"));
        assert!(js.contains("var interval = 40;"));
        assert!(js.contains("var rpm = 1.5;"));
        assert!(js.contains("var R = 2.2;"));
        assert!(js.contains("var Z = 0.5;"));
        assert!(js.contains("var grace = 3000;"));
        assert!(js.contains("plotly_relayout"));
    }

    #[test]
    fn gestures_pause_even_while_the_loop_relayouts() {
        let js = rotation_script("plotly-div", &RotationConfig::default());
        assert!(js.contains("div.on('plotly_relayouting', pause);"));
        assert!(js.contains("if (!spinning) pause();"));
        let pause_body = &js[js.find("function pause()").unwrap()..js.find("div.on(").unwrap()];
        assert!(!pause_body.contains("spinning"));
    }

    #[test]
    fn disabled_rotation_emits_nothing() {
        let config = RotationConfig::default().with_enabled(false);
        assert!(rotation_script("plotly-div", &config).is_empty());
    }
}
