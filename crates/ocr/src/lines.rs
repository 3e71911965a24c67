use tracing::debug;

use crate::types::{Detection, Line};

pub const DEFAULT_Y_THRESHOLD: f64 = 10.0;

/// Groups a detection stream into reading-order lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineReconstructor {
    /// Largest top-left y gap between consecutive detections of one line.
    pub y_threshold: f64,
}

impl Default for LineReconstructor {
    fn default() -> Self {
        Self { y_threshold: DEFAULT_Y_THRESHOLD }
    }
}

impl LineReconstructor {
    pub fn new(y_threshold: f64) -> Self {
        Self { y_threshold }
    }

    /// Lines come out top to bottom, each ordered left to right.
    ///
    /// Detections are sorted by top-left y, then walked greedily: a detection
    /// joins the current line when its y is within the threshold of the last
    /// detection admitted, so a line may drift across a skewed scan.
    pub fn reconstruct(&self, mut detections: Vec<Detection>) -> Vec<Line> {
        if detections.is_empty() {
            return Vec::new();
        }

        // Stable: equal y keeps stream order ahead of the x sort.
        detections.sort_by(|a, b| a.top_left().y.total_cmp(&b.top_left().y));

        let mut lines = Vec::new();
        let mut iter = detections.into_iter();
        let mut current = iter.next().into_iter().collect::<Vec<_>>();

        for det in iter {
            let prev_y = current.last().map(|d| d.top_left().y).unwrap_or(det.top_left().y);
            if (det.top_left().y - prev_y).abs() <= self.y_threshold {
                current.push(det);
            } else {
                lines.push(close_line(std::mem::take(&mut current)));
                current.push(det);
            }
        }
        if !current.is_empty() {
            lines.push(close_line(current));
        }

        debug!(lines = lines.len(), "reconstructed lines");
        lines
    }
}

fn close_line(mut detections: Vec<Detection>) -> Line {
    detections.sort_by(|a, b| a.top_left().x.total_cmp(&b.top_left().x));
    Line { detections }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(text: &str, x: f64, y: f64) -> Detection {
        Detection::from_vertices(
            &[[x, y], [x + 30.0, y], [x + 30.0, y + 8.0], [x, y + 8.0]],
            text,
            1.0,
        )
        .unwrap()
    }

    fn texts(lines: &[Line]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|l| l.detections.iter().map(|d| d.text.clone()).collect())
            .collect()
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(LineReconstructor::default().reconstruct(vec![]).is_empty());
    }

    #[test]
    fn groups_rows_and_orders_left_to_right() {
        let dets = vec![
            det("100.00", 300.0, 101.0),
            det("JOHN TAN", 0.0, 130.0),
            det("01/01", 0.0, 100.0),
            det("PAYNOW", 100.0, 102.0),
        ];
        let lines = LineReconstructor::default().reconstruct(dets);
        assert_eq!(
            texts(&lines),
            vec![vec!["01/01", "PAYNOW", "100.00"], vec!["JOHN TAN"]]
        );
    }

    #[test]
    fn delta_equal_to_threshold_joins() {
        let r = LineReconstructor::new(10.0);
        let lines = r.reconstruct(vec![det("A", 0.0, 0.0), det("B", 50.0, 10.0)]);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn delta_above_threshold_splits() {
        let r = LineReconstructor::new(10.0);
        let lines = r.reconstruct(vec![det("A", 0.0, 0.0), det("B", 50.0, 11.0)]);
        assert_eq!(texts(&lines), vec![vec!["A"], vec!["B"]]);
    }

    #[test]
    fn chained_drift_stays_on_one_line() {
        // A..C is 10 apart, beyond the threshold, but each hop is 5.
        let r = LineReconstructor::new(7.0);
        let lines = r.reconstruct(vec![
            det("C", 200.0, 10.0),
            det("A", 0.0, 0.0),
            det("B", 100.0, 5.0),
        ]);
        assert_eq!(texts(&lines), vec![vec!["A", "B", "C"]]);

        let alone = r.reconstruct(vec![det("A", 0.0, 0.0), det("C", 200.0, 10.0)]);
        assert_eq!(alone.len(), 2);
    }

    #[test]
    fn equal_coordinates_keep_stream_order() {
        let lines = LineReconstructor::default().reconstruct(vec![
            det("first", 10.0, 50.0),
            det("second", 10.0, 50.0),
        ]);
        assert_eq!(texts(&lines), vec![vec!["first", "second"]]);
    }

    #[test]
    fn reconstruction_is_stable_under_reapplication() {
        let r = LineReconstructor::default();
        let once = r.reconstruct(vec![
            det("D", 0.0, 40.0),
            det("B", 90.0, 3.0),
            det("A", 0.0, 0.0),
            det("C", 40.0, 22.0),
            det("E", 70.0, 44.0),
        ]);
        let flattened: Vec<Detection> = once.iter().flat_map(|l| l.detections.clone()).collect();
        let twice = r.reconstruct(flattened);
        assert_eq!(once, twice);
        assert_eq!(texts(&once), vec![vec!["A", "B"], vec!["C"], vec!["D", "E"]]);
    }
}
