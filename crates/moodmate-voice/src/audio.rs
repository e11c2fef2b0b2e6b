//! Microphone capture via ffmpeg.
//!
//! Records a fixed-length clip from the default input device as 16kHz mono
//! WAV, the format Whisper-style backends expect.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tokio::process::Command;

/// Check if ffmpeg is available on the system.
pub fn ffmpeg_available() -> bool {
    which::which("ffmpeg").is_ok()
}

/// ffmpeg input format and default device for the current platform.
fn platform_input() -> (&'static str, &'static str) {
    if cfg!(target_os = "macos") {
        ("avfoundation", ":0")
    } else if cfg!(target_os = "windows") {
        ("dshow", "audio=default")
    } else {
        ("alsa", "default")
    }
}

/// Build the ffmpeg argument list for a capture of `secs` seconds.
pub fn capture_args(device: Option<&str>, secs: u64, output: &Path) -> Vec<String> {
    let (format, default_device) = platform_input();
    vec![
        "-y".into(),
        "-f".into(),
        format.into(),
        "-i".into(),
        device.unwrap_or(default_device).into(),
        "-t".into(),
        secs.max(1).to_string(),
        "-ar".into(),
        "16000".into(),
        "-ac".into(),
        "1".into(),
        "-loglevel".into(),
        "error".into(),
        output.to_string_lossy().to_string(),
    ]
}

/// Record one clip from the microphone.
///
/// Returns the path to a temporary WAV file. The caller is responsible for
/// cleaning it up.
pub async fn record_clip(device: Option<&str>, secs: u64) -> Result<PathBuf> {
    let output = std::env::temp_dir().join(format!("moodmate-mic-{}.wav", uuid::Uuid::new_v4()));

    let result = Command::new("ffmpeg")
        .args(capture_args(device, secs, &output))
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .output()
        .await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        bail!(
            "ffmpeg capture failed with status {}: {}",
            result.status,
            stderr.trim()
        );
    }

    Ok(output)
}
