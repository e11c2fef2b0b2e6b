//! Text-to-speech through the platform speech command.
//!
//! macOS ships `say`; elsewhere `espeak-ng` or `espeak` is used when
//! installed. The command is resolved and the voice chosen once, at start-up.

use std::process::Stdio;

use moodmate_config::SpeechConfig;
use moodmate_core::SpeechOutput;
use tracing::{debug, info, warn};

const CANDIDATES: [&str; 3] = ["say", "espeak-ng", "espeak"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Say,
    Espeak,
}

impl Engine {
    fn for_program(program: &str) -> Self {
        let name = std::path::Path::new(program)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if name == "say" {
            Engine::Say
        } else {
            Engine::Espeak
        }
    }
}

/// A voice as listed by the engine: display name and the id passed to `-v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub id: String,
}

/// Parse `say -v ?` output.
///
/// Lines look like `Daniel              en_GB    # Hello! My name is Daniel.`
fn parse_say_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .filter_map(|line| {
            let head = line.split('#').next()?.trim_end();
            // Drop the trailing locale column; names may contain spaces
            let (name, _locale) = head.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Voice {
                name: name.to_string(),
                id: name.to_string(),
            })
        })
        .collect()
}

/// Parse `espeak --voices=<lang>` output.
///
/// Columns: `Pty Language Age/Gender VoiceName File Other Languages`.
fn parse_espeak_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 5 {
                return None;
            }
            Some(Voice {
                name: format!("{} {}", cols[3], gender_label(cols[2])),
                id: cols[4].to_string(),
            })
        })
        .collect()
}

fn gender_label(age_gender: &str) -> &'static str {
    match age_gender.rsplit('/').next() {
        Some("M") => "Male",
        Some("F") => "Female",
        _ => "",
    }
}

/// First voice, in listing order, whose name contains any preferred substring.
pub fn pick_voice<'a>(voices: &'a [Voice], preferred: &[String]) -> Option<&'a Voice> {
    voices
        .iter()
        .find(|v| preferred.iter().any(|want| v.name.contains(want.as_str())))
}

/// Spawns one speech process per utterance.
pub struct CommandSpeaker {
    program: String,
    engine: Engine,
    lang: String,
    voice: Option<Voice>,
}

impl CommandSpeaker {
    pub fn new(program: String, lang: String, voice: Option<Voice>) -> Self {
        let engine = Engine::for_program(&program);
        Self {
            program,
            engine,
            lang,
            voice,
        }
    }

    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    fn args(&self, text: &str) -> Vec<String> {
        let mut args = Vec::new();
        match (self.engine, &self.voice) {
            (_, Some(voice)) => {
                args.push("-v".to_string());
                args.push(voice.id.clone());
            }
            (Engine::Espeak, None) => {
                args.push("-v".to_string());
                args.push(self.lang.to_lowercase());
            }
            // say picks the system voice for its own locale
            (Engine::Say, None) => {}
        }
        args.push(text.to_string());
        args
    }
}

impl SpeechOutput for CommandSpeaker {
    /// Must be called from within a Tokio runtime.
    fn speak(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let spawned = tokio::process::Command::new(&self.program)
            .args(self.args(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(mut child) => {
                tokio::spawn(async move {
                    let _ = child.wait().await;
                });
            }
            Err(e) => warn!("Failed to spawn '{}': {e}", self.program),
        }
    }

    fn engine_name(&self) -> &str {
        &self.program
    }
}

fn list_voices(program: &str, engine: Engine, lang: &str) -> Vec<Voice> {
    let args = match engine {
        Engine::Say => vec!["-v".to_string(), "?".to_string()],
        Engine::Espeak => vec![format!("--voices={}", lang.to_lowercase())],
    };
    match std::process::Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(out) if out.status.success() => {
            let listing = String::from_utf8_lossy(&out.stdout);
            match engine {
                Engine::Say => parse_say_voices(&listing),
                Engine::Espeak => parse_espeak_voices(&listing),
            }
        }
        Ok(out) => {
            debug!("'{program} {}' exited with {}", args.join(" "), out.status);
            Vec::new()
        }
        Err(e) => {
            debug!("Failed to list voices with '{program}': {e}");
            Vec::new()
        }
    }
}

/// Resolve a speech command, or `None` when speech output is unavailable.
pub fn create_speech_output(config: &SpeechConfig) -> Option<CommandSpeaker> {
    if !config.enabled {
        info!("Speech output disabled in config");
        return None;
    }

    let program = match config.command.as_deref().filter(|c| !c.is_empty()) {
        Some(cmd) => match which::which(cmd) {
            Ok(_) => cmd.to_string(),
            Err(_) => {
                warn!("Configured speech command '{cmd}' not found, speech output unavailable");
                return None;
            }
        },
        None => match CANDIDATES.iter().find(|c| which::which(c).is_ok()) {
            Some(c) => c.to_string(),
            None => {
                info!("No speech command found (say, espeak-ng, espeak), speech output unavailable");
                return None;
            }
        },
    };

    let engine = Engine::for_program(&program);
    let voices = list_voices(&program, engine, &config.lang);
    let voice = pick_voice(&voices, &config.preferred_voices).cloned();
    match voice {
        Some(ref v) => info!("Speech output via '{program}' with voice '{}'", v.name),
        None => info!("Speech output via '{program}' with default voice"),
    }
    Some(CommandSpeaker::new(program, config.lang.clone(), voice))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> Vec<String> {
        vec!["Daniel".to_string(), "Male".to_string()]
    }

    #[test]
    fn test_parse_say_voices() {
        let listing = "\
Alex                en_US    # Most people recognize me by my voice.
Daniel              en_GB    # Hello, my name is Daniel.
Bad News            en_US    # The light you see at the end of the tunnel...
";
        let voices = parse_say_voices(listing);
        let names: Vec<&str> = voices.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Alex", "Daniel", "Bad News"]);
    }

    #[test]
    fn test_parse_espeak_voices() {
        let listing = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 2  en-gb           --/M      English_(Great_Britain) gmw/en               (en 2)
 5  en-gb-x-rp      --/F      English_(Received_Pronunciation) gmw/en-GB-x-rp       (en 4)
";
        let voices = parse_espeak_voices(listing);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].name, "English_(Great_Britain) Male");
        assert_eq!(voices[0].id, "gmw/en");
        assert_eq!(voices[1].name, "English_(Received_Pronunciation) Female");
    }

    #[test]
    fn test_pick_voice_first_match_in_listing_order() {
        let voices = vec![
            Voice {
                name: "Alice".into(),
                id: "alice".into(),
            },
            Voice {
                name: "Fred Male".into(),
                id: "fred".into(),
            },
            Voice {
                name: "Daniel".into(),
                id: "Daniel".into(),
            },
        ];
        assert_eq!(pick_voice(&voices, &prefs()).unwrap().id, "fred");
        assert_eq!(pick_voice(&voices[2..], &prefs()).unwrap().id, "Daniel");
    }

    #[test]
    fn test_pick_voice_falls_back_to_male_then_none() {
        let voices = vec![
            Voice {
                name: "Kate Female".into(),
                id: "kate".into(),
            },
            Voice {
                name: "Tom Male".into(),
                id: "tom".into(),
            },
        ];
        assert_eq!(pick_voice(&voices, &prefs()).unwrap().id, "tom");

        let none = vec![Voice {
            name: "Kate".into(),
            id: "kate".into(),
        }];
        assert!(pick_voice(&none, &prefs()).is_none());
    }

    #[test]
    fn test_args_with_and_without_voice() {
        let espeak = CommandSpeaker::new("espeak-ng".into(), "en-GB".into(), None);
        assert_eq!(espeak.args("hello"), vec!["-v", "en-gb", "hello"]);

        let say = CommandSpeaker::new("/usr/bin/say".into(), "en-GB".into(), None);
        assert_eq!(say.args("hello"), vec!["hello"]);

        let daniel = Voice {
            name: "Daniel".into(),
            id: "Daniel".into(),
        };
        let say = CommandSpeaker::new("say".into(), "en-GB".into(), Some(daniel));
        assert_eq!(say.args("hi"), vec!["-v", "Daniel", "hi"]);
    }

    #[test]
    fn test_disabled_config_gives_none() {
        let cfg = SpeechConfig {
            enabled: false,
            ..SpeechConfig::default()
        };
        assert!(create_speech_output(&cfg).is_none());
    }
}
