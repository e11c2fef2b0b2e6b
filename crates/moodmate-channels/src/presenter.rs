//! Turns dialogue outputs into messages on a surface, plus optional speech.

use std::sync::Arc;

use anyhow::Result;
use moodmate_core::{MoodSummary, Output, SpeechOutput};
use serde::Serialize;

use crate::chart::BarChart;
use crate::markdown::strip_markup;

const NO_HISTORY: &str = "You don't have any mood history yet!";
const HISTORY_HEADER: &str = "**Your Mood History:**";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Bot,
    User,
}

/// Where messages end up. Newest message is always shown last.
pub trait Surface: Send {
    fn append(&mut self, sender: Sender, text: &str) -> Result<()>;

    fn chart(&mut self, chart: &BarChart) -> Result<()>;
}

pub struct Presenter<U> {
    surface: U,
    speech: Option<Arc<dyn SpeechOutput>>,
}

impl<U: Surface> Presenter<U> {
    pub fn new(surface: U, speech: Option<Arc<dyn SpeechOutput>>) -> Self {
        Self { surface, speech }
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn user(&mut self, text: &str) -> Result<()> {
        self.surface.append(Sender::User, text)
    }

    /// Show a bot line and speak it when speech output is available.
    pub fn bot(&mut self, text: &str) -> Result<()> {
        self.surface.append(Sender::Bot, text)?;
        if let Some(ref speech) = self.speech {
            speech.speak(&strip_markup(text));
        }
        Ok(())
    }

    pub fn present(&mut self, outputs: &[Output]) -> Result<()> {
        for output in outputs {
            match output {
                Output::Bot(text) => self.bot(text)?,
                Output::Summary(summary) => self.render_history_summary(summary)?,
            }
        }
        Ok(())
    }

    pub fn render_history_summary(&mut self, summary: &MoodSummary) -> Result<()> {
        if summary.is_empty() {
            return self.bot(NO_HISTORY);
        }
        self.bot(HISTORY_HEADER)?;
        for entry in &summary.recent_first {
            self.bot(&format!("{} — {}", entry.date, entry.mood))?;
        }
        self.surface.chart(&BarChart::from_summary(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use moodmate_core::{Conversation, HistoryStore, JokePicker, MemoryStore, Mood, MoodEntry};

    #[derive(Default)]
    struct RecordingSurface {
        messages: Vec<(Sender, String)>,
        charts: Vec<BarChart>,
    }

    impl Surface for RecordingSurface {
        fn append(&mut self, sender: Sender, text: &str) -> Result<()> {
            self.messages.push((sender, text.to_string()));
            Ok(())
        }

        fn chart(&mut self, chart: &BarChart) -> Result<()> {
            self.charts.push(chart.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSpeech {
        spoken: Mutex<Vec<String>>,
    }

    impl SpeechOutput for RecordingSpeech {
        fn speak(&self, text: &str) {
            self.spoken.lock().unwrap().push(text.to_string());
        }

        fn engine_name(&self) -> &str {
            "recording"
        }
    }

    struct NoJokes;

    impl JokePicker for NoJokes {
        fn pick(&mut self, _jokes: &[&'static str]) -> Option<&'static str> {
            None
        }
    }

    fn fixed_day() -> String {
        "10/14/2026".to_string()
    }

    #[test]
    fn test_empty_summary_single_message() {
        let mut presenter = Presenter::new(RecordingSurface::default(), None);
        presenter
            .render_history_summary(&MoodSummary::default())
            .unwrap();
        let surface = presenter.surface();
        assert_eq!(
            surface.messages,
            vec![(Sender::Bot, NO_HISTORY.to_string())]
        );
        assert!(surface.charts.is_empty());
    }

    #[test]
    fn test_summary_lines_then_chart() {
        let summary = MoodSummary {
            recent_first: vec![
                MoodEntry {
                    mood: Mood::Sad,
                    date: "10/14/2026".into(),
                },
                MoodEntry {
                    mood: Mood::Happy,
                    date: "10/13/2026".into(),
                },
            ],
            counts: vec![(Mood::Happy, 1), (Mood::Sad, 1)],
        };
        let mut presenter = Presenter::new(RecordingSurface::default(), None);
        presenter.render_history_summary(&summary).unwrap();

        let texts: Vec<&str> = presenter
            .surface()
            .messages
            .iter()
            .map(|(_, t)| t.as_str())
            .collect();
        assert_eq!(
            texts,
            vec![HISTORY_HEADER, "10/14/2026 — sad", "10/13/2026 — happy"]
        );
        assert_eq!(presenter.surface().charts.len(), 1);
        assert_eq!(presenter.surface().charts[0].labels, vec!["happy", "sad"]);
    }

    #[test]
    fn test_bot_lines_spoken_without_markup() {
        let speech = Arc::new(RecordingSpeech::default());
        let mut presenter = Presenter::new(
            RecordingSurface::default(),
            Some(speech.clone() as Arc<dyn SpeechOutput>),
        );
        presenter.bot("Nice to meet you, **Ann**!").unwrap();
        presenter.user("Ann").unwrap();

        assert_eq!(
            *speech.spoken.lock().unwrap(),
            vec!["Nice to meet you, Ann!".to_string()]
        );
        assert_eq!(presenter.surface().messages.len(), 2);
        assert_eq!(presenter.surface().messages[1].0, Sender::User);
    }

    #[test]
    fn test_check_in_renders_newest_first() {
        let history = HistoryStore::new(MemoryStore::new()).with_clock(fixed_day);
        let mut conversation = Conversation::new(history, Box::new(NoJokes));
        let mut presenter = Presenter::new(RecordingSurface::default(), None);

        presenter.present(&conversation.start()).unwrap();
        for input in ["hello", "Ann", "happy", "yes", "sad", "no"] {
            presenter.user(input).unwrap();
            let outputs = conversation.submit(input);
            presenter.present(&outputs).unwrap();
        }

        let bot: Vec<&str> = presenter
            .surface()
            .messages
            .iter()
            .filter(|(s, _)| *s == Sender::Bot)
            .map(|(_, t)| t.as_str())
            .collect();
        let sad = bot.iter().position(|t| *t == "10/14/2026 — sad").unwrap();
        let happy = bot.iter().position(|t| *t == "10/14/2026 — happy").unwrap();
        assert!(sad < happy);
        assert_eq!(bot.last(), Some(&"Thanks for chatting! Come back anytime. 😊"));
        assert!(!bot.iter().any(|t| t.contains("joke")));

        let chart = &presenter.surface().charts[0];
        assert_eq!(chart.labels, vec!["happy", "sad"]);
        assert_eq!(chart.values, vec![1, 1]);
    }
}
