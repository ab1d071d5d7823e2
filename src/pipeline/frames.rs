//! Frame extraction from uploaded videos.
//!
//! Video decoding is delegated to an external transcoder behind the
//! [`Transcoder`] trait; the ffmpeg implementation samples at a fixed rate
//! into `frame_%d.jpg` files.

use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::constants::FRAMES_PER_SECOND;
use crate::error::{ClassifyError, Result};

/// Pluggable video-to-frames capability
pub trait Transcoder: Send + Sync {
    /// Write `fps` frames per second of `video` into the existing `out_dir`
    fn extract_frames(&self, video: &Path, out_dir: &Path, fps: u32) -> Result<()>;
}

/// Runs the ffmpeg command-line tool
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: String,
    threads: usize,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<String>, threads: usize) -> Self {
        Self {
            binary: binary.into(),
            threads,
        }
    }

    fn args(&self, video: &Path, out_dir: &Path, fps: u32) -> Vec<String> {
        vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-threads".into(),
            self.threads.to_string(),
            "-i".into(),
            video.to_string_lossy().into_owned(),
            "-vf".into(),
            format!("fps={}", fps),
            "-y".into(),
            out_dir.join("frame_%d.jpg").to_string_lossy().into_owned(),
        ]
    }
}

impl Transcoder for FfmpegTranscoder {
    fn extract_frames(&self, video: &Path, out_dir: &Path, fps: u32) -> Result<()> {
        let args = self.args(video, out_dir, fps);
        log::info!("[frames] {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ClassifyError::Extraction {
                status: "failed to spawn".into(),
                output: format!("{}: {}", self.binary, e),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            log::warn!("[frames] {} failed: {}", self.binary, combined);
            return Err(ClassifyError::Extraction {
                status: output.status.to_string(),
                output: combined,
            });
        }

        if !combined.is_empty() {
            log::debug!("[frames] Output: {}", combined);
        }
        Ok(())
    }
}

/// Create `out_dir` and sample `video` into it at one frame per second
pub fn extract_frames(transcoder: &dyn Transcoder, video: &Path, out_dir: &Path) -> Result<()> {
    std::fs::create_dir(out_dir).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => ClassifyError::DirectoryExists(out_dir.to_path_buf()),
        _ => ClassifyError::Io(e),
    })?;

    transcoder.extract_frames(video, out_dir, FRAMES_PER_SECOND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTranscoder, scratch_dir};
    use std::path::PathBuf;

    #[test]
    fn test_ffmpeg_args() {
        let ffmpeg = FfmpegTranscoder::new("ffmpeg", 2);
        let args = ffmpeg.args(Path::new("/tmp/in.mp4"), Path::new("/tmp/abc"), 1);
        assert_eq!(
            args,
            vec![
                "-hide_banner",
                "-nostdin",
                "-threads",
                "2",
                "-i",
                "/tmp/in.mp4",
                "-vf",
                "fps=1",
                "-y",
                "/tmp/abc/frame_%d.jpg",
            ]
        );
    }

    #[test]
    fn test_extract_creates_directory() {
        let root = scratch_dir();
        let out_dir = root.join("frames");

        extract_frames(&FakeTranscoder::new(3), Path::new("video.mp4"), &out_dir).unwrap();

        let mut names: Vec<_> = std::fs::read_dir(&out_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        let _ = std::fs::remove_dir_all(&root);

        assert_eq!(names, vec!["frame_1.jpg", "frame_2.jpg", "frame_3.jpg"]);
    }

    #[test]
    fn test_extract_into_existing_directory_fails() {
        let root = scratch_dir();

        let result = extract_frames(&FakeTranscoder::new(1), Path::new("video.mp4"), &root);
        let _ = std::fs::remove_dir_all(&root);

        match result {
            Err(ClassifyError::DirectoryExists(dir)) => assert_eq!(dir, root),
            other => panic!("expected DirectoryExists, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_binary_is_extraction_error() {
        let root = scratch_dir();
        let ffmpeg = FfmpegTranscoder::new(
            format!("definitely-not-ffmpeg-{}", rand::random::<u64>()),
            1,
        );

        let result = ffmpeg.extract_frames(&PathBuf::from("in.mp4"), &root, 1);
        let _ = std::fs::remove_dir_all(&root);

        assert!(matches!(result, Err(ClassifyError::Extraction { .. })));
    }
}
