//! Animated GIF output.

use crate::render::{render, RenderConfig};
use fewbody::animation::{Frame, RenderSink};
use fewbody::config::RunConfig;
use fewbody::error::SinkError;
use fewbody::timeline::Timeline;
use image::codecs::gif::{GifEncoder, Repeat};
use image::Delay;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    pub path: PathBuf,
    pub fps: u32,
    /// 1 is the best quality and the slowest, 30 the fastest
    pub speed: i32,
    pub render: RenderConfig,
}

impl SinkConfig {
    pub fn from_run(config: &RunConfig, timeline: &Timeline) -> Self {
        let vis = &config.visualization;
        SinkConfig {
            path: config.output.path.clone(),
            fps: config.output.fps,
            speed: 10,
            render: RenderConfig {
                mode: vis.mode,
                width: config.output.width,
                height: config.output.height,
                grid: vis.grid,
                panels: vis.panels,
                time_scale: vis.time_scale,
                time_range: Some((timeline.start(), timeline.end())),
                ..Default::default()
            },
        }
    }
}

pub fn partial_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".partial");
    PathBuf::from(s)
}

fn encode_err(e: image::ImageError) -> SinkError {
    SinkError::Encode(e.to_string())
}

/// Buffered writer that remembers the first IO error it sees, including the
/// one from the final flush when it is dropped. The GIF trailer is written
/// while the encoder drops, where the error would otherwise be lost.
struct PartialFile<W: Write> {
    inner: BufWriter<W>,
    error: Arc<OnceLock<ErrorKind>>,
}

impl<W: Write> PartialFile<W> {
    fn new(inner: W, error: Arc<OnceLock<ErrorKind>>) -> Self {
        PartialFile {
            inner: BufWriter::new(inner),
            error,
        }
    }

    fn latch<T>(&self, r: std::io::Result<T>) -> std::io::Result<T> {
        if let Err(e) = &r {
            let _ = self.error.set(e.kind());
        }
        r
    }
}

impl<W: Write> Write for PartialFile<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let r = self.inner.write(buf);
        self.latch(r)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let r = self.inner.flush();
        self.latch(r)
    }
}

impl<W: Write> Drop for PartialFile<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Writes frames as they arrive to `<path>.partial` and moves the file into
/// place on `finish`. An aborted or dropped sink leaves nothing behind.
pub struct GifSink {
    config: SinkConfig,
    partial: PathBuf,
    encoder: Option<GifEncoder<PartialFile<File>>>,
    write_error: Arc<OnceLock<ErrorKind>>,
    frames: usize,
    finished: bool,
}

impl std::fmt::Debug for GifSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifSink")
            .field("path", &self.config.path)
            .field("frames", &self.frames)
            .field("open", &self.encoder.is_some())
            .finish()
    }
}

impl GifSink {
    pub fn new(config: SinkConfig) -> Self {
        let partial = partial_path(&config.path);
        GifSink {
            config,
            partial,
            encoder: None,
            write_error: Arc::new(OnceLock::new()),
            frames: 0,
            finished: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    fn delay(&self) -> Delay {
        Delay::from_numer_denom_ms(1000, self.config.fps.max(1))
    }

    fn encoder(&mut self) -> Result<&mut GifEncoder<PartialFile<File>>, SinkError> {
        if self.finished {
            return Err(SinkError::Closed);
        }
        if self.encoder.is_none() {
            if let Some(dir) = self.partial.parent() {
                if !dir.as_os_str().is_empty() {
                    std::fs::create_dir_all(dir)?;
                }
            }
            let file = PartialFile::new(File::create(&self.partial)?, self.write_error.clone());
            let mut encoder = GifEncoder::new_with_speed(file, self.config.speed.clamp(1, 30));
            encoder.set_repeat(Repeat::Infinite).map_err(encode_err)?;
            debug!(path = %self.partial.display(), "opened animation");
            self.encoder = Some(encoder);
        }
        self.encoder.as_mut().ok_or(SinkError::Closed)
    }

    fn discard(&mut self) {
        self.encoder = None;
        if self.partial.exists() {
            let _ = std::fs::remove_file(&self.partial);
        }
    }
}

impl RenderSink for GifSink {
    fn draw_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        let img = render(frame, &self.config.render);
        let delay = self.delay();
        self.encoder()?
            .encode_frame(image::Frame::from_parts(img, 0, 0, delay))
            .map_err(encode_err)?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        if self.finished {
            return Err(SinkError::Closed);
        }
        if self.frames == 0 {
            return Err(SinkError::Encode("no frames were drawn".into()));
        }
        // the trailer is written when the encoder is dropped
        self.encoder = None;
        if let Some(kind) = self.write_error.get() {
            return Err(SinkError::Io(std::io::Error::new(
                *kind,
                format!("unable to complete {}", self.partial.display()),
            )));
        }
        std::fs::rename(&self.partial, &self.config.path)?;
        self.finished = true;
        info!(path = %self.config.path.display(), frames = self.frames, "wrote animation");
        Ok(())
    }

    fn abort(&mut self) {
        if !self.finished {
            self.discard();
        }
    }
}

impl Drop for GifSink {
    fn drop(&mut self) {
        if !self.finished {
            self.discard();
        }
    }
}
