//! yt-dlp caption source
//!
//! Runs yt-dlp once per request inside a private temporary directory. The
//! tool writes the video's info JSON and, when a track exists, the caption
//! file for the requested language. Both are read back and the directory is
//! removed when the call returns, whatever the outcome.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use super::{CaptionFetch, CaptionSource, VideoDetails, VideoMetadata};
use crate::config::SourceConfig;
use crate::error::SourceError;

/// Output template stem inside the temporary directory
const OUTPUT_STEM: &str = "subtitle";

/// Caption source backed by the yt-dlp command line tool
#[derive(Debug, Clone)]
pub struct YtDlpSource {
    config: SourceConfig,
}

impl YtDlpSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    /// Build the yt-dlp argument list for one request.
    pub fn build_args(&self, url: &str, language: &str, output_template: &Path) -> Vec<String> {
        let mut args = self.config.extra_args.clone();
        args.extend(
            [
                "--skip-download",
                "--no-playlist",
                "--no-progress",
                "--write-info-json",
                "--write-subs",
                "--write-auto-subs",
                "--sub-langs",
                language,
                "--sub-format",
                self.config.sub_format.as_str(),
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        if let Some(convert) = &self.config.convert_subs {
            args.push("--convert-subs".to_string());
            args.push(convert.clone());
        }
        args.push("-o".to_string());
        args.push(output_template.display().to_string());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Run yt-dlp, honouring the configured timeout.
    async fn run(&self, args: &[String]) -> Result<Output, SourceError> {
        let mut command = Command::new(&self.config.binary);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);
        let output = command.output();

        let result = match self.config.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), output)
                .await
                .map_err(|_| SourceError::Timeout(secs))?,
            None => output.await,
        };

        result.map_err(|source| SourceError::Spawn {
            program: self.config.binary.clone(),
            source,
        })
    }
}

#[async_trait]
impl CaptionSource for YtDlpSource {
    async fn fetch_captions(
        &self,
        url: &str,
        language: &str,
    ) -> Result<CaptionFetch, SourceError> {
        // The language ends up in a file name inside the work directory.
        if language.is_empty() || language.contains(['/', '\\']) || language.contains("..") {
            return Err(SourceError::Extraction(format!(
                "Invalid language code: {}",
                language
            )));
        }

        let workdir = tempfile::Builder::new().prefix("captions-").tempdir()?;
        let template = workdir.path().join(OUTPUT_STEM);
        let args = self.build_args(url, language, &template);
        tracing::debug!("Running {} {:?}", self.config.binary, args);

        let output = self.run(&args).await?;
        if !output.status.success() {
            let message = error_message(&output);
            tracing::warn!("{} failed for {}: {}", self.config.binary, url, message);
            return Err(SourceError::Extraction(message));
        }

        let info_path = workdir.path().join(format!("{}.info.json", OUTPUT_STEM));
        let info = tokio::fs::read(&info_path).await.map_err(|e| {
            SourceError::Metadata(format!("{}: {}", info_path.display(), e))
        })?;
        let video = parse_info_json(&info)?;

        let track_path = workdir
            .path()
            .join(format!("{}.{}.srt", OUTPUT_STEM, language));
        let raw_text = match tokio::fs::read(&track_path).await {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(SourceError::Io(e)),
        };

        tracing::debug!(
            "Fetched {} ({}), track {}: {}",
            video.id,
            video.title,
            language,
            if raw_text.is_some() { "found" } else { "missing" }
        );
        Ok(CaptionFetch { raw_text, video })
    }
}

/// Subset of the yt-dlp info JSON we read
#[derive(Debug, Deserialize)]
struct InfoJson {
    id: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    subtitles: Option<Map<String, Value>>,
    automatic_captions: Option<Map<String, Value>>,
    uploader: Option<String>,
    upload_date: Option<String>,
    view_count: Option<u64>,
    like_count: Option<u64>,
    description: Option<String>,
}

/// Parse the info JSON written by yt-dlp.
///
/// Absent or null fields fall back to empty strings and zero. Caption
/// language keys keep the order yt-dlp wrote them in.
fn parse_info_json(data: &[u8]) -> Result<VideoDetails, SourceError> {
    let info: InfoJson =
        serde_json::from_slice(data).map_err(|e| SourceError::Metadata(e.to_string()))?;

    let keys = |map: Option<Map<String, Value>>| -> Vec<String> {
        map.map(|m| m.into_iter().map(|(k, _)| k).collect())
            .unwrap_or_default()
    };

    Ok(VideoDetails {
        id: info.id.unwrap_or_default(),
        title: info.title.unwrap_or_default(),
        duration: info.duration.map(|d| d.max(0.0).round() as u64).unwrap_or(0),
        manual_languages: keys(info.subtitles),
        automatic_languages: keys(info.automatic_captions),
        metadata: VideoMetadata {
            uploader: info.uploader.unwrap_or_default(),
            upload_date: info.upload_date.unwrap_or_default(),
            view_count: info.view_count.unwrap_or(0),
            like_count: info.like_count.unwrap_or(0),
            description: info.description.unwrap_or_default(),
        },
    })
}

/// Pick the message to report from a failed run.
///
/// Prefers the last `ERROR:` line yt-dlp printed, then any stderr output,
/// then the exit status.
fn error_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if let Some(line) = stderr.lines().rev().find(|l| l.starts_with("ERROR:")) {
        return line.trim().to_string();
    }
    let trimmed = stderr.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    format!("yt-dlp exited with {}", output.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_build_args() {
        let source = YtDlpSource::new(SourceConfig::default());
        let args = source.build_args(
            "https://www.youtube.com/watch?v=abc",
            "en",
            Path::new("/tmp/x/subtitle"),
        );
        let expected = [
            "--skip-download",
            "--no-playlist",
            "--no-progress",
            "--write-info-json",
            "--write-subs",
            "--write-auto-subs",
            "--sub-langs",
            "en",
            "--sub-format",
            "srt/best",
            "--convert-subs",
            "srt",
            "-o",
            "/tmp/x/subtitle",
            "--",
            "https://www.youtube.com/watch?v=abc",
        ];
        assert_eq!(args, expected);
    }

    #[test]
    fn test_build_args_extra_first_and_no_conversion() {
        let source = YtDlpSource::new(SourceConfig {
            convert_subs: None,
            extra_args: vec!["--cookies".to_string(), "c.txt".to_string()],
            ..Default::default()
        });
        let args = source.build_args("u", "de", Path::new("out"));
        assert_eq!(&args[..2], ["--cookies", "c.txt"]);
        assert!(!args.iter().any(|a| a == "--convert-subs"));
        assert_eq!(args.last().map(String::as_str), Some("u"));
    }

    #[test]
    fn test_parse_info_json() {
        let json = br#"{
            "id": "abc123",
            "title": "A talk",
            "duration": 3601.4,
            "subtitles": {"en": [], "pt-BR": [], "de": []},
            "automatic_captions": {"fr": [], "en": []},
            "uploader": "Channel",
            "upload_date": "20230405",
            "view_count": 12,
            "like_count": null,
            "description": "About things"
        }"#;
        let video = parse_info_json(json).unwrap();
        assert_eq!(video.id, "abc123");
        assert_eq!(video.duration, 3601);
        assert_eq!(video.manual_languages, vec!["en", "pt-BR", "de"]);
        assert_eq!(video.automatic_languages, vec!["fr", "en"]);
        assert_eq!(
            video.available_languages(),
            vec!["en", "pt-BR", "de", "fr", "en"]
        );
        assert_eq!(video.metadata.view_count, 12);
        assert_eq!(video.metadata.like_count, 0);
        assert_eq!(video.metadata.uploader, "Channel");
    }

    #[test]
    fn test_parse_info_json_missing_fields() {
        let video = parse_info_json(b"{}").unwrap();
        assert_eq!(video, VideoDetails::default());
    }

    #[test]
    fn test_parse_info_json_invalid() {
        let err = parse_info_json(b"not json").unwrap_err();
        assert!(matches!(err, SourceError::Metadata(_)));
    }

    /// Write a shell script standing in for yt-dlp and configure a source to run it.
    #[cfg(unix)]
    fn scripted_source(dir: &Path, body: &str, timeout_secs: Option<u64>) -> YtDlpSource {
        let script = dir.join("fake-ytdlp.sh");
        std::fs::write(&script, body).unwrap();
        YtDlpSource::new(SourceConfig {
            binary: "sh".to_string(),
            extra_args: vec![script.display().to_string()],
            timeout_secs,
            ..Default::default()
        })
    }

    #[cfg(unix)]
    fn fake_ytdlp_script(marker: &Path) -> String {
        format!(
            r#"
out=""
lang=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    --sub-langs) lang="$2"; shift ;;
  esac
  shift
done
echo "$out" > "{marker}"
printf '%s' '{{"id":"vid1","title":"Fake","duration":61,"subtitles":{{"en":[]}},"automatic_captions":{{"es":[]}}}}' > "$out.info.json"
if [ "$lang" = "en" ]; then
  printf '1\n00:00:01,000 --> 00:00:02,000\nHi there\n' > "$out.en.srt"
fi
"#,
            marker = marker.display()
        )
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_with_track_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let source = scripted_source(dir.path(), &fake_ytdlp_script(&marker), None);

        let fetch = source.fetch_captions("https://v/1", "en").await.unwrap();
        assert_eq!(
            fetch.raw_text.as_deref(),
            Some("1\n00:00:01,000 --> 00:00:02,000\nHi there\n")
        );
        assert_eq!(fetch.video.id, "vid1");
        assert_eq!(fetch.video.duration, 61);
        assert_eq!(fetch.video.available_languages(), vec!["en", "es"]);

        let template = PathBuf::from(std::fs::read_to_string(&marker).unwrap().trim());
        assert!(!template.parent().unwrap().exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_without_track() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let source = scripted_source(dir.path(), &fake_ytdlp_script(&marker), None);

        let fetch = source.fetch_captions("https://v/1", "ja").await.unwrap();
        assert!(fetch.raw_text.is_none());
        assert_eq!(fetch.video.title, "Fake");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_failure_reports_error_line_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let body = format!(
            r#"
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then echo "$2" > "{}"; fi
  shift
done
echo "WARNING: something minor" >&2
echo "ERROR: [generic] nope: Unsupported URL: nope" >&2
exit 1
"#,
            marker.display()
        );
        let source = scripted_source(dir.path(), &body, None);

        let err = source.fetch_captions("nope", "en").await.unwrap_err();
        assert_eq!(err.to_string(), "ERROR: [generic] nope: Unsupported URL: nope");

        let template = PathBuf::from(std::fs::read_to_string(&marker).unwrap().trim());
        assert!(!template.parent().unwrap().exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let source = scripted_source(dir.path(), "sleep 5\n", Some(1));

        let err = source.fetch_captions("https://v/1", "en").await.unwrap_err();
        assert!(matches!(err, SourceError::Timeout(1)));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let source = YtDlpSource::new(SourceConfig {
            binary: "/nonexistent/yt-dlp-binary".to_string(),
            ..Default::default()
        });
        let err = source.fetch_captions("https://v/1", "en").await.unwrap_err();
        assert!(matches!(err, SourceError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_language_with_path_separator_is_rejected() {
        let source = YtDlpSource::new(SourceConfig::default());
        let err = source
            .fetch_captions("https://v/1", "../etc")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid language code: ../etc");
    }
}
