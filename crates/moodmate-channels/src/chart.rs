use moodmate_core::MoodSummary;
use serde::Serialize;

pub const CHART_TITLE: &str = "Your Mood Summary";
pub const DATASET_LABEL: &str = "Mood Frequency";

/// Bar chart data, one bar per mood that occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<usize>,
    pub legend: bool,
}

impl BarChart {
    pub fn from_summary(summary: &MoodSummary) -> Self {
        Self {
            title: CHART_TITLE.to_string(),
            label: DATASET_LABEL.to_string(),
            labels: summary
                .counts
                .iter()
                .map(|(mood, _)| mood.to_string())
                .collect(),
            values: summary.counts.iter().map(|(_, n)| *n).collect(),
            legend: false,
        }
    }

    /// Horizontal bars scaled so the tallest spans `width` cells.
    pub fn render_ascii(&self, width: usize) -> String {
        let max = self.values.iter().copied().max().unwrap_or(0).max(1);
        let label_width = self.labels.iter().map(|l| l.len()).max().unwrap_or(0);
        let width = width.max(1);

        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        for (label, value) in self.labels.iter().zip(&self.values) {
            let cells = (value * width).div_ceil(max);
            out.push_str(&format!(
                "  {label:<label_width$} │{} {value}\n",
                "█".repeat(cells)
            ));
        }
        out
    }
}
