use cartotext_core::TimeMs;

/// A scalar style attribute value: fixed, or derived from zoom/time.
///
/// Dynamic variants must be re-evaluated every frame; the style cache
/// registers a per-frame refresh for entries that contain one.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleExpr {
    /// Fixed value.
    Value(f32),
    /// Piecewise-linear interpolation over (zoom, value) stops.
    /// Stops must be sorted by zoom; evaluation clamps at both ends.
    ZoomStops(Vec<(f32, f32)>),
    /// Sinusoidal oscillation between `min` and `max` over `period_ms`.
    Pulse {
        period_ms: f32,
        min: f32,
        max: f32,
    },
}

impl StyleExpr {
    /// Evaluate at the given zoom level and frame time.
    pub fn eval(&self, zoom: f32, time_ms: TimeMs) -> f32 {
        match self {
            StyleExpr::Value(v) => *v,
            StyleExpr::ZoomStops(stops) => eval_stops(stops, zoom),
            StyleExpr::Pulse {
                period_ms,
                min,
                max,
            } => {
                let period = period_ms.max(1.0) as f64;
                let phase = (time_ms / period).fract() * std::f64::consts::TAU;
                let t = 0.5 * (1.0 + phase.sin() as f32);
                min + (max - min) * t
            }
        }
    }

    /// Whether the value changes with continuous zoom or time and must be
    /// refreshed every frame.
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, StyleExpr::Value(_))
    }
}

fn eval_stops(stops: &[(f32, f32)], zoom: f32) -> f32 {
    let Some(first) = stops.first() else {
        return 0.0;
    };
    if zoom <= first.0 {
        return first.1;
    }
    for pair in stops.windows(2) {
        let (z0, v0) = pair[0];
        let (z1, v1) = pair[1];
        if zoom <= z1 {
            let span = (z1 - z0).max(f32::EPSILON);
            let t = (zoom - z0) / span;
            return v0 + (v1 - v0) * t;
        }
    }
    stops[stops.len() - 1].1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_ignores_inputs() {
        let expr = StyleExpr::Value(16.0);
        assert_eq!(expr.eval(3.0, 0.0), 16.0);
        assert_eq!(expr.eval(18.0, 5000.0), 16.0);
        assert!(!expr.is_dynamic());
    }

    #[test]
    fn zoom_stops_interpolate_and_clamp() {
        let expr = StyleExpr::ZoomStops(vec![(10.0, 12.0), (14.0, 24.0)]);
        assert_eq!(expr.eval(8.0, 0.0), 12.0);
        assert_eq!(expr.eval(12.0, 0.0), 18.0);
        assert_eq!(expr.eval(16.0, 0.0), 24.0);
        assert!(expr.is_dynamic());
    }

    #[test]
    fn pulse_stays_within_bounds_and_repeats() {
        let expr = StyleExpr::Pulse {
            period_ms: 1000.0,
            min: 0.2,
            max: 0.8,
        };
        for t in [0.0, 130.0, 250.0, 770.0, 999.0] {
            let v = expr.eval(10.0, t);
            assert!((0.2..=0.8).contains(&v), "t={t} -> {v}");
        }
        let a = expr.eval(10.0, 300.0);
        let b = expr.eval(10.0, 1300.0);
        assert!((a - b).abs() < 1e-5);
    }

    #[test]
    fn empty_stops_evaluate_to_zero() {
        assert_eq!(StyleExpr::ZoomStops(vec![]).eval(10.0, 0.0), 0.0);
    }
}
