//! Per-label fade transitions driven by collision outcomes.
//!
//! The stage is an explicit enumeration rather than being inferred from
//! opacity comparisons, and stepping is a pure function of the previous
//! state, the elapsed time and this frame's placement outcome.

use cartotext_core::TimeMs;

/// Discrete fade progression stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeStage {
    /// Opacity ramping up toward 1.
    FadingIn,
    /// Fully visible.
    FadedIn,
    /// Opacity ramping down toward 0.
    FadingOut,
    /// Invisible; the tracked entry is dropped after this stage.
    FadedOut,
}

/// Temporal fade state tracked across frames for one label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeState {
    /// Current stage.
    pub stage: FadeStage,
    /// Current opacity in [0,1]; monotonic within a single transition.
    pub opacity: f32,
    /// Start time of the active transition.
    pub start_ms: TimeMs,
    /// Transition length in milliseconds.
    pub duration_ms: f32,
}

impl FadeState {
    /// Initial state for a label that has not been shown yet.
    pub fn hidden(now_ms: TimeMs, duration_ms: f32) -> Self {
        Self {
            stage: FadeStage::FadedOut,
            opacity: 0.0,
            start_ms: now_ms,
            duration_ms,
        }
    }

    /// Fully visible state for labels that do not animate.
    pub fn shown(now_ms: TimeMs, duration_ms: f32) -> Self {
        Self {
            stage: FadeStage::FadedIn,
            opacity: 1.0,
            start_ms: now_ms,
            duration_ms,
        }
    }

    /// Whether the label contributes pixels this frame.
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    /// Whether the fade has fully completed in the out direction.
    pub fn is_done(&self) -> bool {
        self.stage == FadeStage::FadedOut
    }
}

/// Advance `state` by `dt_ms` given this frame's placement outcome.
///
/// Placement success enters FadingIn (holding the current opacity on the
/// entry frame, then ramping by `dt/duration`) and reaches FadedIn at
/// exactly 1.0. Placement failure ramps down from the current value and
/// reaches FadedOut at 0.0. Re-placement during FadingOut resumes the
/// fade-in from the current opacity instead of restarting at 0.
///
/// `snap_out` skips the out-direction ramp entirely: the first failed
/// frame lands on FadedOut at opacity 0. Fade-in still ramps. Path labels
/// use this; their fade-out is not animated.
pub fn step(state: FadeState, dt_ms: f64, placed: bool, now_ms: TimeMs, snap_out: bool) -> FadeState {
    let dt = dt_ms.max(0.0) as f32;
    let duration = state.duration_ms.max(1.0);

    match (state.stage, placed) {
        // entering the fade-in; the ramp starts on the next frame
        (FadeStage::FadedOut, true) => FadeState {
            stage: FadeStage::FadingIn,
            start_ms: now_ms,
            ..state
        },
        (FadeStage::FadingIn, true) => {
            let opacity = (state.opacity + dt / duration).min(1.0);
            FadeState {
                stage: if opacity >= 1.0 {
                    FadeStage::FadedIn
                } else {
                    FadeStage::FadingIn
                },
                opacity,
                ..state
            }
        }
        (FadeStage::FadedIn, true) => state,
        // resume rising from the current opacity, no restart from 0
        (FadeStage::FadingOut, true) => FadeState {
            stage: FadeStage::FadingIn,
            start_ms: now_ms,
            ..state
        },
        (FadeStage::FadedOut, false) => state,
        (_, false) if snap_out => FadeState {
            stage: FadeStage::FadedOut,
            opacity: 0.0,
            start_ms: now_ms,
            ..state
        },
        (FadeStage::FadingIn | FadeStage::FadedIn, false) => {
            let opacity = (state.opacity - dt / duration).max(0.0);
            FadeState {
                stage: if opacity <= 0.0 {
                    FadeStage::FadedOut
                } else {
                    FadeStage::FadingOut
                },
                opacity,
                start_ms: now_ms,
                duration_ms: state.duration_ms,
            }
        }
        (FadeStage::FadingOut, false) => {
            let opacity = (state.opacity - dt / duration).max(0.0);
            FadeState {
                stage: if opacity <= 0.0 {
                    FadeStage::FadedOut
                } else {
                    FadeStage::FadingOut
                },
                opacity,
                ..state
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATION: f32 = 500.0;

    fn run(mut state: FadeState, frames: &[(f64, bool)]) -> Vec<f32> {
        let mut opacities = Vec::new();
        let mut last = state.start_ms;
        for &(now, placed) in frames {
            state = step(state, now - last, placed, now, false);
            opacities.push(state.opacity);
            last = now;
        }
        opacities
    }

    #[test]
    fn fade_in_ramps_linearly_and_saturates() {
        let state = FadeState::hidden(0.0, DURATION);
        let opacities = run(
            state,
            &[(0.0, true), (250.0, true), (500.0, true), (750.0, true)],
        );
        assert_eq!(opacities, vec![0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn fade_in_reaches_faded_in_stage() {
        let mut state = FadeState::hidden(0.0, DURATION);
        state = step(state, 0.0, true, 0.0, false);
        assert_eq!(state.stage, FadeStage::FadingIn);
        state = step(state, 500.0, true, 500.0, false);
        assert_eq!(state.stage, FadeStage::FadedIn);
        assert_eq!(state.opacity, 1.0);
    }

    #[test]
    fn failure_ramps_down_from_current_value() {
        let mut state = FadeState::hidden(0.0, DURATION);
        state = step(state, 0.0, true, 0.0, false);
        state = step(state, 200.0, true, 200.0, false);
        assert!((state.opacity - 0.4).abs() < 1e-6);

        // failure mid fade-in decreases from 0.4, never resets to 0
        state = step(state, 100.0, false, 300.0, false);
        assert_eq!(state.stage, FadeStage::FadingOut);
        assert!((state.opacity - 0.2).abs() < 1e-6);

        state = step(state, 100.0, false, 400.0, false);
        assert_eq!(state.stage, FadeStage::FadedOut);
        assert_eq!(state.opacity, 0.0);
    }

    #[test]
    fn replacement_resumes_fade_in_without_restart() {
        let mut state = FadeState::hidden(0.0, DURATION);
        state = step(state, 0.0, true, 0.0, false);
        state = step(state, 400.0, true, 400.0, false);
        state = step(state, 100.0, false, 500.0, false);
        let dipped = state.opacity;
        assert!(dipped > 0.0 && dipped < 0.8);

        // placed again before reaching 0: rises from the dipped value
        state = step(state, 0.0, true, 500.0, false);
        assert_eq!(state.stage, FadeStage::FadingIn);
        assert_eq!(state.opacity, dipped);
        state = step(state, 100.0, true, 600.0, false);
        assert!(state.opacity > dipped);
    }

    #[test]
    fn snap_out_skips_the_ramp() {
        let mut state = FadeState::hidden(0.0, DURATION);
        state = step(state, 0.0, true, 0.0, true);
        state = step(state, 250.0, true, 250.0, true);
        assert_eq!(state.opacity, 0.5);

        state = step(state, 100.0, false, 350.0, true);
        assert_eq!(state.stage, FadeStage::FadedOut);
        assert_eq!(state.opacity, 0.0);
    }

    #[test]
    fn faded_out_stays_put_without_placement() {
        let state = FadeState::hidden(0.0, DURATION);
        let stepped = step(state, 100.0, false, 100.0, false);
        assert_eq!(stepped, state);
    }

    #[test]
    fn zero_dt_is_a_fixed_point() {
        let mut state = FadeState::hidden(0.0, DURATION);
        state = step(state, 0.0, true, 0.0, false);
        state = step(state, 250.0, true, 250.0, false);
        let frozen = step(state, 0.0, true, 250.0, false);
        assert_eq!(frozen.opacity, state.opacity);
        assert_eq!(frozen.stage, state.stage);
    }
}
