//! External duration probing.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::trace;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to launch {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ffprobe exited with {0}")]
    ExitStatus(std::process::ExitStatus),

    #[error("unreadable ffprobe output: {0}")]
    Parse(String),

    #[error("ffprobe reported no duration for {0}")]
    MissingDuration(PathBuf),
}

/// Measures a media file's duration in (fractional) seconds.
#[async_trait]
pub trait DurationProbe: Send + Sync + fmt::Debug {
    async fn probe(&self, path: &Path) -> Result<f64, ProbeError>;
}

/// Runs `ffprobe` and reads `format.duration` from its JSON report.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProbe {
    binary: PathBuf,
}

impl Default for FfprobeDurationProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeDurationProbe {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
        trace!(path = %path.display(), "probing duration");

        let output = Command::new(&self.binary)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProbeError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::ExitStatus(output.status));
        }

        parse_format_duration(&output.stdout)?
            .ok_or_else(|| ProbeError::MissingDuration(path.to_path_buf()))
    }
}

/// Pull `format.duration` out of `ffprobe -print_format json -show_format`.
///
/// ffprobe prints the duration as a JSON string ("123.456000"), but a bare
/// number is accepted too.
pub fn parse_format_duration(stdout: &[u8]) -> Result<Option<f64>, ProbeError> {
    let json: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|err| ProbeError::Parse(err.to_string()))?;

    let duration = &json["format"]["duration"];
    let seconds = match duration {
        serde_json::Value::String(text) => Some(
            text.trim()
                .parse::<f64>()
                .map_err(|err| ProbeError::Parse(format!("{text:?}: {err}")))?,
        ),
        serde_json::Value::Number(number) => number.as_f64(),
        _ => None,
    };

    Ok(seconds.filter(|s| s.is_finite() && *s >= 0.0))
}

/// Round to whole seconds, ties to even. `None` for values that do not fit.
pub fn round_duration(seconds: f64) -> Option<u32> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let rounded = seconds.round_ties_even();
    (rounded <= u32::MAX as f64).then_some(rounded as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_string_duration() {
        let stdout = br#"{"format":{"filename":"a.mp4","duration":"93.480000"}}"#;
        assert_eq!(parse_format_duration(stdout).unwrap(), Some(93.48));
    }

    #[test]
    fn reads_numeric_duration() {
        let stdout = br#"{"format":{"duration":12.5}}"#;
        assert_eq!(parse_format_duration(stdout).unwrap(), Some(12.5));
    }

    #[test]
    fn missing_duration_is_none() {
        assert_eq!(parse_format_duration(br#"{"format":{}}"#).unwrap(), None);
        assert_eq!(parse_format_duration(b"{}").unwrap(), None);
        assert_eq!(
            parse_format_duration(br#"{"format":{"duration":"-1"}}"#).unwrap(),
            None
        );
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_format_duration(b"not json"),
            Err(ProbeError::Parse(_))
        ));
        assert!(matches!(
            parse_format_duration(br#"{"format":{"duration":"N/A"}}"#),
            Err(ProbeError::Parse(_))
        ));
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_duration(2.5), Some(2));
        assert_eq!(round_duration(3.5), Some(4));
        assert_eq!(round_duration(59.4), Some(59));
        assert_eq!(round_duration(59.6), Some(60));
        assert_eq!(round_duration(0.0), Some(0));
        assert_eq!(round_duration(f64::NAN), None);
        assert_eq!(round_duration(-3.0), None);
        assert_eq!(round_duration(1e12), None);
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let probe = FfprobeDurationProbe::new("/nonexistent/reelshelf-ffprobe");
        let err = probe.probe(Path::new("clip.mp4")).await.unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }
}
