use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::filter::MixGraph;

/// How much of ffmpeg's stderr is kept for error responses.
pub const STDERR_TAIL_CHARS: usize = 2000;

const SAMPLE_RATE: &str = "44100";
const CHANNELS: &str = "2";
const AUDIO_BITRATE: &str = "192k";

#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffmpeg binary not found: {0}")]
    NotFound(String),
    #[error("failed to run ffmpeg: {0}")]
    Io(#[from] io::Error),
    #[error("ffmpeg failed: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
    #[error("ffmpeg did not finish within {}s", .0.as_secs())]
    TimedOut(Duration),
    #[error("ffmpeg exited cleanly but wrote no output at {}", .0.display())]
    MissingOutput(PathBuf),
}

#[derive(Debug, Clone)]
pub struct MixJob<'a> {
    pub voice: &'a Path,
    pub music: &'a Path,
    pub output: &'a Path,
    pub graph: MixGraph,
}

/// Runs the ffmpeg binary, one child process per mix.
///
/// At most `max_concurrent` children run at once; later callers wait for a permit.
#[derive(Clone)]
pub struct FfmpegMixer {
    binary: String,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl FfmpegMixer {
    pub fn new(binary: impl Into<String>, timeout: Duration, max_concurrent: usize) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            permits: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    pub fn build_args(job: &MixJob<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(18);
        args.push("-y".into());
        args.push("-i".into());
        args.push(job.voice.as_os_str().to_owned());
        args.push("-i".into());
        args.push(job.music.as_os_str().to_owned());
        args.push("-filter_complex".into());
        args.push(job.graph.filter_complex().into());
        args.push("-map".into());
        args.push(job.graph.output_label().into());
        args.push("-ar".into());
        args.push(SAMPLE_RATE.into());
        args.push("-ac".into());
        args.push(CHANNELS.into());
        args.push("-b:a".into());
        args.push(AUDIO_BITRATE.into());
        args.push(job.output.as_os_str().to_owned());
        args
    }

    #[tracing::instrument(skip_all, fields(output = %job.output.display()))]
    pub async fn mix(&self, job: &MixJob<'_>) -> Result<(), FfmpegError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| io::Error::other("mix queue closed"))?;

        let args = Self::build_args(job);
        debug!(binary = %self.binary, ?args, "Spawning ffmpeg");

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => FfmpegError::NotFound(self.binary.clone()),
                _ => FfmpegError::Io(e),
            })?;

        let started = Instant::now();
        // Dropping the future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "ffmpeg timed out, killing it");
                return Err(FfmpegError::TimedOut(self.timeout));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = tail(&stderr, STDERR_TAIL_CHARS).to_string();
            warn!(code = ?output.status.code(), "ffmpeg exited with failure");
            return Err(FfmpegError::Failed {
                code: output.status.code(),
                stderr,
            });
        }

        if !tokio::fs::try_exists(job.output).await.unwrap_or(false) {
            return Err(FfmpegError::MissingOutput(job.output.to_path_buf()));
        }

        info!(elapsed_ms = started.elapsed().as_millis() as u64, "ffmpeg mix finished");
        Ok(())
    }
}

/// Last `max_chars` characters of `text`, cut on a char boundary.
fn tail(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max_chars - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job<'a>(voice: &'a Path, music: &'a Path, output: &'a Path, loudnorm: bool) -> MixJob<'a> {
        MixJob {
            voice,
            music,
            output,
            graph: MixGraph {
                music_volume: 0.18,
                duck: false,
                loudnorm,
            },
        }
    }

    #[test]
    fn args_follow_fixed_layout() {
        let (voice, music, out) = (
            Path::new("/tmp/job/voice"),
            Path::new("/tmp/job/music"),
            Path::new("/tmp/job/final.mp3"),
        );
        let args = FfmpegMixer::build_args(&job(voice, music, out, true));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "/tmp/job/voice",
                "-i",
                "/tmp/job/music",
                "-filter_complex",
                "[1:a]aloop=loop=-1:size=2147483647,volume=0.18[m];[0:a][m]amix=inputs=2:duration=first:dropout_transition=3[mix];[mix]loudnorm=I=-16:TP=-1.5:LRA=11[out]",
                "-map",
                "[out]",
                "-ar",
                "44100",
                "-ac",
                "2",
                "-b:a",
                "192k",
                "/tmp/job/final.mp3",
            ]
        );
    }

    #[test]
    fn paths_with_shell_metacharacters_stay_single_arguments() {
        let voice = Path::new("/tmp/a b; rm -rf $HOME/voice");
        let args = FfmpegMixer::build_args(&job(voice, Path::new("m"), Path::new("o.mp3"), false));

        assert_eq!(args[2], OsString::from("/tmp/a b; rm -rf $HOME/voice"));
        assert_eq!(args[8], OsString::from("[mix]"));
    }

    #[test]
    fn tail_keeps_last_chars_on_char_boundary() {
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("ab", 10), "ab");
        assert_eq!(tail("héllo wörld", 5), "wörld");
        assert_eq!(tail("abc", 0), "");
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("final.mp3");
        let mixer = FfmpegMixer::new(
            dir.path().join("no-such-ffmpeg").to_string_lossy().into_owned(),
            Duration::from_secs(5),
            1,
        );

        let err = mixer
            .mix(&job(Path::new("v"), Path::new("m"), &out, true))
            .await
            .unwrap_err();

        assert!(matches!(err, FfmpegError::NotFound(_)));
    }

    #[cfg(unix)]
    mod with_fake_binary {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, body: &str) -> String {
            let path = dir.join("fake-ffmpeg");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        }

        #[tokio::test]
        async fn non_zero_exit_carries_stderr_tail() {
            let dir = tempfile::tempdir().unwrap();
            let bin = script(dir.path(), "echo 'Invalid data found when processing input' >&2\nexit 1");
            let out = dir.path().join("final.mp3");
            let mixer = FfmpegMixer::new(bin, Duration::from_secs(10), 1);

            let err = mixer
                .mix(&job(Path::new("v"), Path::new("m"), &out, true))
                .await
                .unwrap_err();

            match err {
                FfmpegError::Failed { code, stderr } => {
                    assert_eq!(code, Some(1));
                    assert!(stderr.contains("Invalid data found when processing input"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn long_running_child_is_timed_out() {
            let dir = tempfile::tempdir().unwrap();
            let bin = script(dir.path(), "sleep 5");
            let out = dir.path().join("final.mp3");
            let mixer = FfmpegMixer::new(bin, Duration::from_millis(200), 1);

            let started = Instant::now();
            let err = mixer
                .mix(&job(Path::new("v"), Path::new("m"), &out, true))
                .await
                .unwrap_err();

            assert!(matches!(err, FfmpegError::TimedOut(_)));
            assert!(started.elapsed() < Duration::from_secs(4));
        }

        #[tokio::test]
        async fn clean_exit_without_output_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            let bin = script(dir.path(), "exit 0");
            let out = dir.path().join("final.mp3");
            let mixer = FfmpegMixer::new(bin, Duration::from_secs(10), 1);

            let err = mixer
                .mix(&job(Path::new("v"), Path::new("m"), &out, true))
                .await
                .unwrap_err();

            assert!(matches!(err, FfmpegError::MissingOutput(_)));
        }

        #[tokio::test]
        async fn writes_output_named_by_last_argument() {
            let dir = tempfile::tempdir().unwrap();
            let bin = script(dir.path(), "for last; do :; done\nprintf 'ID3' > \"$last\"");
            let out = dir.path().join("final.mp3");
            let mixer = FfmpegMixer::new(bin, Duration::from_secs(10), 1);

            mixer
                .mix(&job(Path::new("v"), Path::new("m"), &out, false))
                .await
                .unwrap();

            assert_eq!(std::fs::read(&out).unwrap(), b"ID3");
        }

        #[tokio::test]
        async fn runs_beyond_the_limit_wait_their_turn() {
            let dir = tempfile::tempdir().unwrap();
            let log = dir.path().join("runs.log");
            let bin = script(
                dir.path(),
                &format!(
                    "echo start >> '{log}'\nsleep 0.3\necho end >> '{log}'\nfor last; do :; done\nprintf 'ID3' > \"$last\"",
                    log = log.display()
                ),
            );
            let (out_a, out_b) = (dir.path().join("a.mp3"), dir.path().join("b.mp3"));
            let mixer = FfmpegMixer::new(bin, Duration::from_secs(10), 1);

            let started = Instant::now();
            let job_a = job(Path::new("v"), Path::new("m"), &out_a, false);
            let job_b = job(Path::new("v"), Path::new("m"), &out_b, false);
            let (a, b) = tokio::join!(mixer.mix(&job_a), mixer.mix(&job_b));
            a.unwrap();
            b.unwrap();

            let runs = std::fs::read_to_string(&log).unwrap();
            assert_eq!(runs.lines().collect::<Vec<_>>(), vec!["start", "end", "start", "end"]);
            assert!(started.elapsed() >= Duration::from_millis(600));
        }
    }
}
