use std::collections::VecDeque;

use serde::Serialize;

use crate::types::HistoryRecord;

/// Fixed-capacity plot window. Capacity is taken from the seeding history and
/// never changes afterwards: every push evicts exactly one oldest point.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartWindow {
    labels: Vec<f64>,
    #[serde(rename = "temp")]
    temps: VecDeque<Option<f64>>,
    #[serde(rename = "setpoint")]
    setpoints: VecDeque<Option<f64>>,
    revision: u64,
}

impl ChartWindow {
    pub fn seed(history: &HistoryRecord, lookback_min: f64) -> Self {
        let capacity = history.setpoint_history.len();

        Self {
            labels: elapsed_labels(capacity, lookback_min),
            temps: align_to(&history.temp_history, capacity),
            setpoints: history.setpoint_history.iter().copied().collect(),
            revision: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.labels.len()
    }

    pub fn len(&self) -> usize {
        self.setpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setpoints.is_empty()
    }

    pub fn push(&mut self, temp: f64, setpoint: f64) {
        if self.capacity() == 0 {
            return;
        }

        self.temps.pop_front();
        self.setpoints.pop_front();
        self.temps.push_back(Some(temp));
        self.setpoints.push_back(Some(setpoint));
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn temps(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.temps.iter().copied()
    }

    pub fn setpoints(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.setpoints.iter().copied()
    }

    /// Bumped on every change; renderers redraw when it moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Evenly spaced minutes from `-lookback` up to `0` (now).
fn elapsed_labels(count: usize, lookback_min: f64) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let last = (count - 1) as f64;
            (0..count)
                .map(|i| lookback_min * (i as f64 - last) / last)
                .collect()
        }
    }
}

// Keeps the newest `capacity` points, padding the old end with gaps.
fn align_to(series: &[Option<f64>], capacity: usize) -> VecDeque<Option<f64>> {
    let skip = series.len().saturating_sub(capacity);
    let missing = capacity.saturating_sub(series.len());

    std::iter::repeat(None)
        .take(missing)
        .chain(series.iter().skip(skip).copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn history(temps: &[f64], setpoints: &[f64]) -> HistoryRecord {
        HistoryRecord {
            temp_history: temps.iter().copied().map(Some).collect(),
            setpoint_history: setpoints.iter().copied().map(Some).collect(),
        }
    }

    #[test]
    fn seed_spans_lookback_ending_now() {
        let window = ChartWindow::seed(&history(&[90.0, 91.0, 92.0], &[93.0; 3]), 10.0);

        assert_eq!(window.capacity(), 3);
        assert_eq!(window.labels(), &[-10.0, -5.0, 0.0]);
    }

    #[test]
    fn push_shifts_series_and_keeps_labels() {
        let mut window = ChartWindow::seed(&history(&[90.0, 91.0, 92.0], &[93.0; 3]), 10.0);
        let labels = window.labels().to_vec();

        window.push(93.0, 93.0);

        assert_eq!(window.labels(), labels.as_slice());
        assert_eq!(
            window.temps().collect::<Vec<_>>(),
            vec![Some(91.0), Some(92.0), Some(93.0)]
        );
        assert_eq!(window.setpoints().collect::<Vec<_>>(), vec![Some(93.0); 3]);
    }

    #[test]
    fn length_is_constant_across_pushes() {
        for capacity in 2..12 {
            let setpoints = vec![90.0; capacity];
            let mut window = ChartWindow::seed(&history(&setpoints, &setpoints), 10.0);

            for step in 0..(capacity * 3) {
                window.push(step as f64, 94.0);
                assert_eq!(window.len(), capacity);
                assert_eq!(window.temps().count(), capacity);
                assert_eq!(window.setpoints().count(), capacity);
                assert_eq!(window.labels().len(), capacity);
            }
        }
    }

    #[test]
    fn single_point_history_gets_one_label_at_now() {
        let window = ChartWindow::seed(&history(&[91.0], &[93.0]), 10.0);
        assert_eq!(window.labels(), &[0.0]);

        let empty = ChartWindow::seed(&HistoryRecord::default(), 10.0);
        assert!(empty.labels().is_empty());
    }

    #[test]
    fn push_into_empty_window_is_ignored() {
        let mut window = ChartWindow::seed(&HistoryRecord::default(), 10.0);
        let revision = window.revision();

        window.push(93.0, 93.0);

        assert!(window.is_empty());
        assert_eq!(window.revision(), revision);
    }

    #[test]
    fn temp_series_is_aligned_to_setpoint_capacity() {
        let record = HistoryRecord {
            temp_history: vec![Some(88.0), Some(89.0), Some(90.0), None],
            setpoint_history: vec![None, Some(93.0), Some(93.0)],
        };
        let window = ChartWindow::seed(&record, 10.0);
        assert_eq!(
            window.temps().collect::<Vec<_>>(),
            vec![Some(89.0), Some(90.0), None]
        );

        let short = HistoryRecord {
            temp_history: vec![Some(92.0)],
            setpoint_history: vec![Some(93.0); 3],
        };
        let window = ChartWindow::seed(&short, 10.0);
        assert_eq!(
            window.temps().collect::<Vec<_>>(),
            vec![None, None, Some(92.0)]
        );
    }
}
