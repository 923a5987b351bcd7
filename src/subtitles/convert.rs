use std::io;
use std::path::{Path, PathBuf};

use futures::{stream::BoxStream, StreamExt};
use thiserror::Error;

use super::{normalize, SubtitleFormat};

#[derive(Error, Debug)]
pub enum SubtitleError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionEvent {
    Converted { input: PathBuf, output: PathBuf },
    Failed { input: PathBuf, error: String },
    Finished { converted: usize, failed: usize },
}

/// Where the plain-text version of `input` is written.
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension("txt")
}

/// Convert one caption file into a sibling `.txt`, overwriting any existing one.
/// Undecodable bytes become U+FFFD instead of failing the file.
pub async fn convert_file(input: &Path) -> Result<PathBuf, SubtitleError> {
    let bytes = tokio::fs::read(input)
        .await
        .map_err(|source| SubtitleError::Read {
            path: input.to_path_buf(),
            source,
        })?;

    let raw = String::from_utf8_lossy(&bytes);
    let text = normalize(&raw, SubtitleFormat::from_path(input));

    let output = output_path(input);
    tokio::fs::write(&output, text)
        .await
        .map_err(|source| SubtitleError::Write {
            path: output.clone(),
            source,
        })?;

    Ok(output)
}

/// Convert `paths` one after another. Emits one event per file, then a
/// single [`ConversionEvent::Finished`]. A failing file never stops the batch.
pub fn convert_batch(paths: Vec<PathBuf>) -> BoxStream<'static, ConversionEvent> {
    futures::stream::unfold(
        BatchState::Running {
            paths: paths.into_iter(),
            converted: 0,
            failed: 0,
        },
        |state| async move {
            match state {
                BatchState::Running {
                    mut paths,
                    mut converted,
                    mut failed,
                } => match paths.next() {
                    Some(input) => {
                        let event = match convert_file(&input).await {
                            Ok(output) => {
                                log::info!("Converted {} -> {}", input.display(), output.display());
                                converted += 1;
                                ConversionEvent::Converted { input, output }
                            }
                            Err(e) => {
                                log::warn!("Subtitle conversion failed: {}", e);
                                failed += 1;
                                ConversionEvent::Failed {
                                    input,
                                    error: e.to_string(),
                                }
                            }
                        };
                        Some((
                            event,
                            BatchState::Running {
                                paths,
                                converted,
                                failed,
                            },
                        ))
                    }
                    None => Some((
                        ConversionEvent::Finished { converted, failed },
                        BatchState::Finished,
                    )),
                },
                BatchState::Finished => None,
            }
        },
    )
    .boxed()
}

enum BatchState {
    Running {
        paths: std::vec::IntoIter<PathBuf>,
        converted: usize,
        failed: usize,
    },
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_convert_file_writes_sibling_txt() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("talk.en.srt");
        tokio::fs::write(
            &input,
            b"1\n00:00:01,000 --> 00:00:02,000\nHello <b>world</b>\n\nHello world\n",
        )
        .await
        .unwrap();
        std::fs::write(dir.path().join("talk.en.txt"), "stale").unwrap();

        let output = convert_file(&input).await.unwrap();
        assert_eq!(output, dir.path().join("talk.en.txt"));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Hello world\n");
    }

    #[tokio::test]
    async fn test_invalid_bytes_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.vtt");
        tokio::fs::write(&input, b"WEBVTT\n\n00:00.000 --> 00:01.000\ncaf\xe9\n")
            .await
            .unwrap();

        let output = convert_file(&input).await.unwrap();
        assert_eq!(std::fs::read_to_string(output).unwrap(), "caf\u{fffd}\n");
    }

    #[tokio::test]
    async fn test_batch_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.sbv");
        let missing = dir.path().join("missing.srt");
        std::fs::write(&good, "0:00:00.000,0:00:01.000\nHi\n").unwrap();

        let events: Vec<ConversionEvent> =
            convert_batch(vec![missing.clone(), good.clone()]).collect().await;

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], ConversionEvent::Failed { input, .. } if *input == missing));
        assert_eq!(
            events[1],
            ConversionEvent::Converted {
                input: good,
                output: dir.path().join("good.txt"),
            }
        );
        assert_eq!(
            events[2],
            ConversionEvent::Finished {
                converted: 1,
                failed: 1
            }
        );
    }
}
