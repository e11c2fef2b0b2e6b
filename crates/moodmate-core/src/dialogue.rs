//! The check-in conversation as a finite-state machine.
//!
//! [`step`] consumes one line of user text against a [`Session`] and returns
//! the updated session together with the bot's outputs. It never touches a
//! terminal, a socket or a clock directly: storage goes through the
//! session's [`HistoryStore`], randomness through a [`JokePicker`].

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::history::{HistoryStore, MoodSummary};
use crate::mood::Mood;
use crate::store::KeyValueStore;

pub const WELCOME: &str = "👋 Welcome! Type 'hello' to begin.";
const ASK_NAME: &str = "Hi there! What's your name?";
const INVALID_NAME: &str = "Please enter a valid name.";
const CONTINUE_PROMPT: &str = "Would you like to check in another mood? (yes/no)";
const ASK_AGAIN: &str = "How are you feeling now?";
const INVALID_YES_NO: &str = "Please type 'yes' or 'no'.";
const FAREWELL: &str = "Thanks for chatting! Come back anytime. 😊";
const RESTART: &str = "If you want to chat again, start a new session. 💬";

const GREETINGS: [&str; 3] = ["hi", "hello", "hey"];
const MIN_NAME_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogueState {
    #[default]
    Greet,
    AskName,
    AskMood,
    AskContinue,
    End,
}

/// One item the bot wants shown, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// A bot line. May carry `**bold**` and blank-line paragraph breaks.
    Bot(String),
    /// Render the mood history summary and chart here.
    Summary(MoodSummary),
}

impl Output {
    pub fn bot(text: impl Into<String>) -> Self {
        Output::Bot(text.into())
    }
}

/// Source of randomness for joke selection.
pub trait JokePicker: Send {
    /// Pick one joke, or `None` when the list is empty.
    fn pick(&mut self, jokes: &[&'static str]) -> Option<&'static str>;
}

/// Uniform draw backed by a seedable RNG.
pub struct RandomJokes {
    rng: StdRng,
}

impl RandomJokes {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomJokes {
    fn default() -> Self {
        Self::new()
    }
}

impl JokePicker for RandomJokes {
    fn pick(&mut self, jokes: &[&'static str]) -> Option<&'static str> {
        jokes.choose(&mut self.rng).copied()
    }
}

/// Per-visitor conversational context.
pub struct Session<S> {
    user_name: Option<String>,
    state: DialogueState,
    history: HistoryStore<S>,
}

/// Result of one transition.
pub struct Step<S> {
    pub session: Session<S>,
    pub outputs: Vec<Output>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(history: HistoryStore<S>) -> Self {
        Self {
            user_name: None,
            state: DialogueState::Greet,
            history,
        }
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore<S> {
        &mut self.history
    }

    /// Back to `Greet` with no name, wiping everything the store holds.
    pub fn restart(&mut self) {
        self.user_name = None;
        self.state = DialogueState::Greet;
        self.history.clear_all();
    }

    /// Apply one line of input in place. See [`step`].
    pub fn advance(&mut self, input: &str, jokes: &mut dyn JokePicker) -> Vec<Output> {
        let raw = input.trim();
        let text = raw.to_lowercase();
        let mut outputs = Vec::new();

        let next = match self.state {
            DialogueState::Greet => {
                if GREETINGS.contains(&text.as_str()) {
                    outputs.push(Output::bot(ASK_NAME));
                    DialogueState::AskName
                } else {
                    // Unrecognized openers are dropped without a reply.
                    DialogueState::Greet
                }
            }
            DialogueState::AskName => {
                // Measured in UTF-16 units, as a browser text field counts them
                if text.encode_utf16().count() < MIN_NAME_LEN {
                    outputs.push(Output::bot(INVALID_NAME));
                    DialogueState::AskName
                } else {
                    self.user_name = Some(raw.to_string());
                    self.history.clear();
                    outputs.push(Output::Bot(format!(
                        "Nice to meet you, **{raw}**! How are you feeling today? ({})",
                        Mood::menu()
                    )));
                    DialogueState::AskMood
                }
            }
            DialogueState::AskMood => match text.parse::<Mood>() {
                Ok(mood) => {
                    self.history.record(mood);
                    let joke = jokes.pick(mood.jokes());
                    outputs.push(Output::Bot(mood_reply(self.display_name(), mood, joke)));
                    outputs.push(Output::bot(CONTINUE_PROMPT));
                    DialogueState::AskContinue
                }
                Err(_) => {
                    outputs.push(Output::Bot(format!(
                        "I didn't recognize that mood. Please type one of: {}.",
                        Mood::menu()
                    )));
                    DialogueState::AskMood
                }
            },
            DialogueState::AskContinue => {
                if text.starts_with('y') {
                    outputs.push(Output::bot(ASK_AGAIN));
                    DialogueState::AskMood
                } else if text.starts_with('n') {
                    outputs.push(Output::Bot(format!(
                        "Alright, {}! Here's a summary of your mood history:",
                        self.display_name()
                    )));
                    outputs.push(Output::Summary(self.history.summarize()));
                    outputs.push(Output::bot(FAREWELL));
                    DialogueState::End
                } else {
                    outputs.push(Output::bot(INVALID_YES_NO));
                    DialogueState::AskContinue
                }
            }
            DialogueState::End => {
                outputs.push(Output::bot(RESTART));
                DialogueState::End
            }
        };

        if next != self.state {
            debug!("Dialogue {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        outputs
    }

    fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or("friend")
    }
}

/// Transition `session` on one line of raw user input.
pub fn step<S: KeyValueStore>(
    mut session: Session<S>,
    input: &str,
    jokes: &mut dyn JokePicker,
) -> Step<S> {
    let outputs = session.advance(input, jokes);
    Step { session, outputs }
}

fn mood_reply(name: &str, mood: Mood, joke: Option<&str>) -> String {
    let mut reply = format!(
        "Thanks for sharing, **{name}**! Here's a tip: \"{}\"",
        mood.tip()
    );
    if let Some(joke) = joke {
        reply.push_str(&format!("\n\nAnd a joke for you: \"{joke}\""));
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct FirstJoke;

    impl JokePicker for FirstJoke {
        fn pick(&mut self, jokes: &[&'static str]) -> Option<&'static str> {
            jokes.first().copied()
        }
    }

    fn fixed_day() -> String {
        "10/14/2026".to_string()
    }

    fn new_session() -> Session<MemoryStore> {
        Session::new(HistoryStore::new(MemoryStore::new()).with_clock(fixed_day))
    }

    fn run(session: Session<MemoryStore>, inputs: &[&str]) -> Step<MemoryStore> {
        let mut jokes = FirstJoke;
        let mut current = Step {
            session,
            outputs: Vec::new(),
        };
        for input in inputs {
            current = step(current.session, input, &mut jokes);
        }
        current
    }

    fn bot_texts(outputs: &[Output]) -> Vec<&str> {
        outputs
            .iter()
            .filter_map(|o| match o {
                Output::Bot(text) => Some(text.as_str()),
                Output::Summary(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_greet_accepts_greetings() {
        for greeting in ["hi", "hello", "hey", "  HeLLo  ", "HEY\n"] {
            let result = run(new_session(), &[greeting]);
            assert_eq!(result.session.state(), DialogueState::AskName);
            assert_eq!(bot_texts(&result.outputs), vec![ASK_NAME]);
        }
    }

    #[test]
    fn test_greet_ignores_other_input() {
        for input in ["yo", "hello there", "h i", "happy", "no", "hiya"] {
            let result = run(new_session(), &[input]);
            assert_eq!(result.session.state(), DialogueState::Greet);
            assert!(result.outputs.is_empty());
        }
    }

    #[test]
    fn test_short_name_rejected() {
        let result = run(new_session(), &["hello", "a"]);
        assert_eq!(result.session.state(), DialogueState::AskName);
        assert_eq!(bot_texts(&result.outputs), vec![INVALID_NAME]);
        assert!(result.session.user_name().is_none());

        let result = run(new_session(), &["hello", "   b   "]);
        assert_eq!(result.session.state(), DialogueState::AskName);
    }

    #[test]
    fn test_name_length_in_utf16_units() {
        // One unit: rejected
        let result = run(new_session(), &["hello", "é"]);
        assert_eq!(result.session.state(), DialogueState::AskName);
        assert_eq!(bot_texts(&result.outputs), vec![INVALID_NAME]);

        // Outside the BMP, two units: accepted
        let result = run(new_session(), &["hello", "😀"]);
        assert_eq!(result.session.state(), DialogueState::AskMood);
        assert_eq!(result.session.user_name(), Some("😀"));
    }

    #[test]
    fn test_name_accepted_keeps_case_and_resets_history() {
        let mut session = new_session();
        session.history_mut().record(Mood::Angry);

        let result = run(session, &["hello", "  Ann Marie "]);
        assert_eq!(result.session.state(), DialogueState::AskMood);
        assert_eq!(result.session.user_name(), Some("Ann Marie"));
        assert!(result.session.history().is_empty());
        assert_eq!(
            bot_texts(&result.outputs),
            vec![
                "Nice to meet you, **Ann Marie**! How are you feeling today? \
                 (happy, sad, anxious, stressed, calm, angry)"
            ]
        );
    }

    #[test]
    fn test_greeting_word_is_a_valid_name() {
        let result = run(new_session(), &["hi", "hi"]);
        assert_eq!(result.session.state(), DialogueState::AskMood);
        assert_eq!(result.session.user_name(), Some("hi"));
    }

    #[test]
    fn test_every_mood_recorded_with_tip() {
        for mood in Mood::ALL {
            let input = mood.as_str().to_uppercase();
            let result = run(new_session(), &["hello", "Ann", &input]);

            assert_eq!(result.session.state(), DialogueState::AskContinue);
            let entries = result.session.history().entries();
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].mood, mood);
            assert_eq!(entries[0].date, "10/14/2026");

            let texts = bot_texts(&result.outputs);
            assert_eq!(texts.len(), 2);
            assert!(texts[0].contains(mood.tip()));
            assert!(texts[0].contains(mood.jokes()[0]));
            assert_eq!(texts[1], CONTINUE_PROMPT);
        }
    }

    #[test]
    fn test_unknown_mood_reprompts() {
        let result = run(new_session(), &["hello", "Ann", "meh"]);
        assert_eq!(result.session.state(), DialogueState::AskMood);
        assert!(result.session.history().is_empty());
        assert_eq!(
            bot_texts(&result.outputs),
            vec![
                "I didn't recognize that mood. Please type one of: \
                 happy, sad, anxious, stressed, calm, angry."
            ]
        );
    }

    #[test]
    fn test_mood_reply_without_joke() {
        let reply = mood_reply("Ann", Mood::Calm, None);
        assert_eq!(
            reply,
            "Thanks for sharing, **Ann**! Here's a tip: \"Enjoy the peace. 🌸\""
        );
        assert!(!reply.contains("joke"));
    }

    #[test]
    fn test_random_jokes_empty_list() {
        let mut jokes = RandomJokes::seeded(7);
        assert!(jokes.pick(&[]).is_none());
        assert_eq!(jokes.pick(&["only"]), Some("only"));
    }

    #[test]
    fn test_seeded_jokes_are_deterministic() {
        let pool = ["a", "b", "c", "d", "e"];
        let mut first = RandomJokes::seeded(42);
        let mut second = RandomJokes::seeded(42);
        for _ in 0..10 {
            assert_eq!(first.pick(&pool), second.pick(&pool));
        }
    }

    #[test]
    fn test_continue_branches() {
        let result = run(new_session(), &["hello", "Ann", "calm", "Yep"]);
        assert_eq!(result.session.state(), DialogueState::AskMood);
        assert_eq!(bot_texts(&result.outputs), vec![ASK_AGAIN]);

        let result = run(new_session(), &["hello", "Ann", "calm", "maybe"]);
        assert_eq!(result.session.state(), DialogueState::AskContinue);
        assert_eq!(bot_texts(&result.outputs), vec![INVALID_YES_NO]);

        let result = run(new_session(), &["hello", "Ann", "calm", "Nope"]);
        assert_eq!(result.session.state(), DialogueState::End);
    }

    #[test]
    fn test_full_check_in_scenario() {
        let result = run(
            new_session(),
            &["hello", "Ann", "happy", "yes", "sad", "no"],
        );
        assert_eq!(result.session.state(), DialogueState::End);

        let moods: Vec<Mood> = result
            .session
            .history()
            .entries()
            .iter()
            .map(|e| e.mood)
            .collect();
        assert_eq!(moods, vec![Mood::Happy, Mood::Sad]);

        assert_eq!(result.outputs.len(), 3);
        assert_eq!(
            result.outputs[0],
            Output::bot("Alright, Ann! Here's a summary of your mood history:")
        );
        match &result.outputs[1] {
            Output::Summary(summary) => {
                assert_eq!(summary.recent_first[0].mood, Mood::Sad);
                assert_eq!(summary.recent_first[1].mood, Mood::Happy);
                assert_eq!(summary.counts, vec![(Mood::Happy, 1), (Mood::Sad, 1)]);
            }
            other => panic!("expected summary, got {other:?}"),
        }
        assert_eq!(result.outputs[2], Output::bot(FAREWELL));
    }

    #[test]
    fn test_end_always_restart_message() {
        let result = run(
            new_session(),
            &["hello", "Ann", "happy", "no", "hello", "happy"],
        );
        assert_eq!(result.session.state(), DialogueState::End);
        assert_eq!(bot_texts(&result.outputs), vec![RESTART]);
        assert_eq!(result.session.history().len(), 1);
    }

    #[test]
    fn test_new_name_after_checkins_clears_history() {
        // Only reachable by driving AskName again on a session with history
        let mut session = new_session();
        session.history_mut().record(Mood::Sad);
        session.history_mut().record(Mood::Happy);
        assert_eq!(session.history().len(), 2);

        let result = run(session, &["hey", "Bo"]);
        assert!(result.session.history().is_empty());
    }
}
