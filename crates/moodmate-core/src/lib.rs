pub mod conversation;
pub mod dialogue;
pub mod history;
pub mod mood;
pub mod ports;
pub mod store;

// Re-export key types
pub use conversation::{Conversation, ConversationHandle, Reply};
pub use dialogue::{step, DialogueState, JokePicker, Output, RandomJokes, Session, Step};
pub use history::{HistoryStore, MoodEntry, MoodSummary};
pub use mood::Mood;
pub use ports::{SpeechInput, SpeechOutput};
pub use store::{FileStore, KeyValueStore, MemoryStore};
