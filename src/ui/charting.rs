use crate::feedback::Baseline;
use crate::session::TrialResult;

/// One bar of a results chart, in whole milliseconds
#[derive(Debug, Clone, PartialEq)]
pub struct BarPoint {
    pub label: String,
    pub value_ms: u64,
    pub hit: bool,
}

/// Per-trial response times, labelled by 1-based trial number
pub fn trial_bars(results: &[TrialResult]) -> Vec<BarPoint> {
    results
        .iter()
        .map(|r| BarPoint {
            label: (r.index + 1).to_string(),
            value_ms: r.elapsed_ms().round() as u64,
            hit: r.hit,
        })
        .collect()
}

/// The user's mean next to each reference time
pub fn baseline_bars(mean_ms: f64, baselines: &[Baseline]) -> Vec<BarPoint> {
    std::iter::once(BarPoint {
        label: "You".to_string(),
        value_ms: mean_ms.round() as u64,
        hit: true,
    })
    .chain(baselines.iter().map(|b| BarPoint {
        label: b.label.clone(),
        value_ms: b.mean_ms.round() as u64,
        hit: true,
    }))
    .collect()
}

/// Upper bound for the value axis, never zero so an all-zero chart still draws
pub fn compute_bar_max(bars: &[BarPoint]) -> u64 {
    bars.iter().map(|b| b.value_ms).max().unwrap_or(0).max(1)
}

/// Bar width that fits `count` bars and their gaps into `width` columns
pub fn fit_bar_width(width: u16, count: usize, gap: u16) -> u16 {
    if count == 0 {
        return 1;
    }
    let count = u16::try_from(count).unwrap_or(u16::MAX);
    let usable = width.saturating_sub(gap.saturating_mul(count.saturating_sub(1)));
    (usable / count).clamp(1, 9)
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

pub fn format_ms(val: f64) -> String {
    format!("{} ms", val.round())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(index: usize, hit: bool, ms: u64) -> TrialResult {
        TrialResult {
            index,
            hit,
            elapsed: Duration::from_millis(ms),
        }
    }

    #[test]
    fn test_trial_bars_keep_order_and_outcome() {
        let bars = trial_bars(&[result(0, true, 120), result(1, false, 340)]);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].label, "1");
        assert_eq!(bars[0].value_ms, 120);
        assert!(bars[0].hit);
        assert_eq!(bars[1].label, "2");
        assert!(!bars[1].hit);
    }

    #[test]
    fn test_baseline_bars_put_user_first() {
        let baselines = crate::feedback::default_baselines();
        let bars = baseline_bars(231.6, &baselines);

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].label, "You");
        assert_eq!(bars[0].value_ms, 232);
        assert_eq!(bars[1].label, "Average person");
        assert_eq!(bars[2].value_ms, 200);
    }

    #[test]
    fn test_compute_bar_max() {
        assert_eq!(compute_bar_max(&[]), 1);
        let bars = trial_bars(&[result(0, true, 0), result(1, true, 0)]);
        assert_eq!(compute_bar_max(&bars), 1);
        let bars = trial_bars(&[result(0, true, 90), result(1, true, 410)]);
        assert_eq!(compute_bar_max(&bars), 410);
    }

    #[test]
    fn test_fit_bar_width() {
        assert_eq!(fit_bar_width(70, 0, 1), 1);
        assert_eq!(fit_bar_width(70, 5, 1), 9);
        assert_eq!(fit_bar_width(70, 15, 1), 3);
        assert_eq!(fit_bar_width(10, 40, 1), 1);
        assert_eq!(fit_bar_width(70, 65_536, 1), 1);
        assert_eq!(fit_bar_width(70, usize::MAX, 1), 1);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(116.666), "117 ms");
        assert_eq!(format_ms(50.0), "50 ms");
    }
}
