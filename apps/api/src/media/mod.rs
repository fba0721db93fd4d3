/// Audio extraction for uploaded interview chunks.
///
/// Shells out to ffmpeg to strip the video track and re-encode the audio as
/// mono 12kHz 16kbps mp3. That is the cheapest encoding the transcription
/// API handles reliably, and it keeps every chunk far below its 25 MB cap.
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

/// A stuck ffmpeg process would otherwise pin its request forever.
const EXTRACT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to spool chunk to disk: {0}")]
    Spool(#[from] std::io::Error),

    #[error("Failed to launch {bin}: {source}")]
    Launch {
        bin: String,
        source: std::io::Error,
    },

    #[error("ffmpeg exited with {status}: {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("ffmpeg timed out after {0:?}")]
    TimedOut(Duration),
}

/// Writes an uploaded chunk to a temp file so ffmpeg can read it.
/// The file is removed when the returned handle drops.
pub async fn spool_chunk(data: &[u8]) -> Result<NamedTempFile, ExtractionError> {
    let file = tempfile::Builder::new()
        .prefix("chunk_")
        .suffix(".webm")
        .tempfile()?;
    tokio::fs::write(file.path(), data).await?;
    Ok(file)
}

/// Extracted audio spooled to a temp file. Removed on drop, so the audio
/// never outlives the request that produced it, whichever way it exits.
pub struct TempAudio {
    file: NamedTempFile,
}

impl TempAudio {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Runs ffmpeg over a spooled chunk and returns the extracted audio.
pub async fn extract_audio(
    ffmpeg_bin: &str,
    video_path: &Path,
) -> Result<TempAudio, ExtractionError> {
    let output_file = tempfile::Builder::new()
        .prefix("audio_")
        .suffix(".mp3")
        .tempfile()?;

    let args = ffmpeg_args(video_path, output_file.path());
    debug!("Running {} {:?}", ffmpeg_bin, args);

    let output_future = tokio::process::Command::new(ffmpeg_bin).args(&args).output();

    // tokio kills the child if the output future is dropped, so a fired
    // timeout does not leak an ffmpeg process.
    let output = timeout(EXTRACT_TIMEOUT, output_future)
        .await
        .map_err(|_| ExtractionError::TimedOut(EXTRACT_TIMEOUT))?
        .map_err(|source| ExtractionError::Launch {
            bin: ffmpeg_bin.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ExtractionError::Failed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(TempAudio { file: output_file })
}

fn ffmpeg_args(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        OsString::from("-i"),
        input.as_os_str().to_os_string(),
        // No video, mono channel, 12kHz sampling, 16 kbps bitrate.
        OsString::from("-vn"),
        OsString::from("-ac"),
        OsString::from("1"),
        OsString::from("-ar"),
        OsString::from("12000"),
        OsString::from("-b:a"),
        OsString::from("16k"),
        // Overwrite the pre-created temp file without prompting.
        OsString::from("-y"),
        output.as_os_str().to_os_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_ffmpeg_args_shape() {
        let input = PathBuf::from("/tmp/chunk_abc.webm");
        let output = PathBuf::from("/tmp/audio_abc.mp3");
        let args = ffmpeg_args(&input, &output);

        assert_eq!(args[0], "-i");
        assert_eq!(args[1], input.as_os_str());
        assert_eq!(args.last().unwrap(), output.as_os_str());

        let flat: Vec<&str> = args.iter().filter_map(|a| a.to_str()).collect();
        assert!(flat.windows(2).any(|w| w == ["-ac", "1"]));
        assert!(flat.windows(2).any(|w| w == ["-ar", "12000"]));
        assert!(flat.windows(2).any(|w| w == ["-b:a", "16k"]));
        assert!(flat.contains(&"-vn"));
        assert!(flat.contains(&"-y"));
    }

    #[tokio::test]
    async fn test_spool_chunk_writes_bytes() {
        let data = b"webm bytes";
        let file = spool_chunk(data).await.unwrap();

        assert!(file.path().to_string_lossy().ends_with(".webm"));
        let on_disk = tokio::fs::read(file.path()).await.unwrap();
        assert_eq!(on_disk, data);
    }

    #[tokio::test]
    async fn test_spool_chunk_removed_on_drop() {
        let file = spool_chunk(b"short lived").await.unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());

        drop(file);
        assert!(!path.exists());
    }
}
