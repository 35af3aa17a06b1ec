use std::path::Path;
use std::time::Instant;

use crate::inpainting::domain::frame_inpainter::FrameInpainter;
use crate::pipeline::inpaint_pipeline::InpaintPipeline;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::run_config::RunConfig;
use crate::shared::error::{ConfigurationError, Result, UnburnError, VideoIoError};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::output_codec::OutputCodec;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

/// Lifecycle of one run. `Failed` is reachable from every other state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Opening,
    Streaming,
    Closing,
    Done,
    Failed,
}

/// Outcome of a successful run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub frames_processed: usize,
    /// Frames that had at least one active region.
    pub frames_inpainted: usize,
    pub codec: OutputCodec,
}

/// Streams a video through the inpaint pipeline, frame by frame.
///
/// Single-use: the reader and writer are opened once, and a second
/// `execute` returns [`UnburnError::AlreadyExecuted`].
pub struct VideoProcessor {
    reader: Box<dyn VideoReader>,
    writer: Box<dyn VideoWriter>,
    pipeline: InpaintPipeline,
    logger: Box<dyn PipelineLogger>,
    state: RunState,
}

impl VideoProcessor {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        inpainter: Box<dyn FrameInpainter>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            writer,
            pipeline: InpaintPipeline::new(inpainter),
            logger,
            state: RunState::Opening,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn execute(&mut self, config: &RunConfig) -> Result<RunReport> {
        if self.state != RunState::Opening {
            return Err(UnburnError::AlreadyExecuted);
        }

        let result = self.run(config);
        match &result {
            Ok(report) => {
                transition(&mut self.state, RunState::Done);
                log::debug!(
                    "Processed {} frames ({} inpainted)",
                    report.frames_processed,
                    report.frames_inpainted
                );
                self.logger.summary();
            }
            Err(e) => {
                log::debug!("Run aborted: {e}");
                transition(&mut self.state, RunState::Failed);
            }
        }
        result
    }

    fn run(&mut self, config: &RunConfig) -> Result<RunReport> {
        preflight(config)?;

        let Self {
            reader,
            writer,
            pipeline,
            logger,
            state,
        } = self;

        let mut handles = Handles::new(reader.as_mut(), writer.as_mut());

        let metadata = handles
            .reader
            .open(&config.input)
            .map_err(|e| VideoIoError::ReaderOpen {
                path: config.input.clone(),
                message: e.to_string(),
            })?;
        handles.reader_open = true;

        let codec = OutputCodec::from_path(&config.output);
        log_source(logger.as_mut(), &metadata, &config.output, codec);

        handles
            .writer
            .open(&config.output, &metadata, codec)
            .map_err(|e| VideoIoError::WriterOpen {
                path: config.output.clone(),
                message: e.to_string(),
            })?;
        handles.writer_open = true;

        transition(state, RunState::Streaming);

        let interval = progress_interval(&metadata);
        let mut processed = 0usize;
        let mut inpainted = 0usize;
        let mut last_reported = None;

        for item in handles.reader.frames() {
            let frame = item.map_err(|e| VideoIoError::Read {
                frame: processed,
                message: e.to_string(),
            })?;

            let t = metadata.timestamp(processed);
            let active = config.regions.active_at(t);
            logger.metric("active_regions", active.len() as f64);

            let output = if active.is_empty() {
                frame
            } else {
                let started = Instant::now();
                let result = pipeline
                    .apply(frame, &active)
                    .map_err(|e| UnburnError::Inpaint {
                        frame: processed,
                        message: e.to_string(),
                    })?;
                logger.timing("inpaint", started.elapsed().as_secs_f64() * 1000.0);
                inpainted += 1;
                result
            };

            handles
                .writer
                .write(&output)
                .map_err(|e| VideoIoError::Write {
                    frame: processed,
                    message: e.to_string(),
                })?;

            processed += 1;
            if processed % interval == 0 {
                logger.progress(processed, metadata.total_frames);
                last_reported = Some(processed);
            }
        }

        transition(state, RunState::Closing);
        handles.finish().map_err(|e| VideoIoError::Close {
            path: config.output.clone(),
            message: e.to_string(),
        })?;
        if last_reported != Some(processed) {
            logger.progress(processed, metadata.total_frames);
        }

        Ok(RunReport {
            frames_processed: processed,
            frames_inpainted: inpainted,
            codec,
        })
    }
}

/// Checks that need no open handles: the input must exist, and the output
/// must not unless overwriting was requested.
fn preflight(config: &RunConfig) -> Result<()> {
    if !config.input.exists() {
        return Err(VideoIoError::InputNotFound(config.input.clone()).into());
    }
    if config.output.exists() && !config.overwrite {
        return Err(ConfigurationError::OutputExists(config.output.clone()).into());
    }
    Ok(())
}

/// Frames between progress reports: one second of source video.
fn progress_interval(metadata: &VideoMetadata) -> usize {
    (metadata.effective_fps().round() as usize).max(1)
}

fn transition(state: &mut RunState, next: RunState) {
    log::debug!("Processor state: {state:?} -> {next:?}");
    *state = next;
}

fn log_source(
    logger: &mut dyn PipelineLogger,
    metadata: &VideoMetadata,
    output: &Path,
    codec: OutputCodec,
) {
    let frames = metadata
        .total_frames
        .map_or_else(|| "unknown".to_string(), |n| n.to_string());
    logger.info(&format!(
        "Input: {}x{} @ {:.2} fps, {frames} frames",
        metadata.width,
        metadata.height,
        metadata.effective_fps()
    ));
    logger.info(&format!("Output: {} ({codec})", output.display()));
}

/// Reader and writer borrowed for one run. Whatever is still open when
/// this is dropped gets closed, so every early return releases both.
struct Handles<'a> {
    reader: &'a mut dyn VideoReader,
    writer: &'a mut dyn VideoWriter,
    reader_open: bool,
    writer_open: bool,
}

impl<'a> Handles<'a> {
    fn new(reader: &'a mut dyn VideoReader, writer: &'a mut dyn VideoWriter) -> Self {
        Self {
            reader,
            writer,
            reader_open: false,
            writer_open: false,
        }
    }

    /// Closes both handles, reporting a writer finalisation failure.
    fn finish(mut self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        self.writer_open = false;
        let closed = self.writer.close();
        self.reader_open = false;
        self.reader.close();
        closed
    }
}

impl Drop for Handles<'_> {
    fn drop(&mut self) {
        if self.writer_open {
            if let Err(e) = self.writer.close() {
                log::warn!("Failed to close writer: {e}");
            }
        }
        if self.reader_open {
            self.reader.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inpainting::domain::mask::Mask;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::regions::domain::region::InpaintMethod;
    use crate::regions::domain::region_set::RegionSet;
    use crate::regions::domain::region_spec_parser::parse_region_spec;
    use crate::shared::frame::Frame;
    use rstest::rstest;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    const W: u32 = 32;
    const H: u32 = 24;

    // --- Stubs ---

    #[derive(Default)]
    struct ReaderLog {
        opened: bool,
        closed: usize,
    }

    type FrameResult = std::result::Result<Frame, Box<dyn std::error::Error>>;

    struct StubReader {
        count: usize,
        fps: f64,
        total_frames: Option<usize>,
        fail_open: bool,
        fail_at: Option<usize>,
        log: Arc<Mutex<ReaderLog>>,
    }

    impl StubReader {
        fn new(count: usize, fps: f64) -> Self {
            Self {
                count,
                fps,
                total_frames: Some(count),
                fail_open: false,
                fail_at: None,
                log: Arc::new(Mutex::new(ReaderLog::default())),
            }
        }
    }

    impl VideoReader for StubReader {
        fn open(
            &mut self,
            path: &Path,
        ) -> std::result::Result<VideoMetadata, Box<dyn std::error::Error>> {
            if self.fail_open {
                return Err("cannot demux".into());
            }
            self.log.lock().unwrap().opened = true;
            Ok(VideoMetadata {
                width: W,
                height: H,
                fps: self.fps,
                total_frames: self.total_frames,
                codec: "stub".to_string(),
                source_path: Some(path.to_path_buf()),
            })
        }

        fn frames(&mut self) -> Box<dyn Iterator<Item = FrameResult> + '_> {
            let fail_at = self.fail_at;
            Box::new((0..self.count).map(move |i| -> FrameResult {
                if Some(i) == fail_at {
                    return Err("corrupt packet".into());
                }
                // Index is deliberately not the position: the processor
                // must count frames itself.
                Ok(Frame::new(vec![100; (W * H * 3) as usize], W, H, 3, 1000 + i))
            }))
        }

        fn close(&mut self) {
            self.log.lock().unwrap().closed += 1;
        }
    }

    #[derive(Default)]
    struct WriterLog {
        opened_with: Option<OutputCodec>,
        written: Vec<Frame>,
        closed: usize,
    }

    struct StubWriter {
        fail_open: bool,
        fail_at: Option<usize>,
        fail_close: bool,
        log: Arc<Mutex<WriterLog>>,
    }

    impl StubWriter {
        fn new() -> Self {
            Self {
                fail_open: false,
                fail_at: None,
                fail_close: false,
                log: Arc::new(Mutex::new(WriterLog::default())),
            }
        }
    }

    impl VideoWriter for StubWriter {
        fn open(
            &mut self,
            _path: &Path,
            metadata: &VideoMetadata,
            codec: OutputCodec,
        ) -> std::result::Result<(), Box<dyn std::error::Error>> {
            assert_eq!((metadata.width, metadata.height), (W, H));
            if self.fail_open {
                return Err("no such encoder".into());
            }
            self.log.lock().unwrap().opened_with = Some(codec);
            Ok(())
        }

        fn write(&mut self, frame: &Frame) -> std::result::Result<(), Box<dyn std::error::Error>> {
            let mut log = self.log.lock().unwrap();
            if Some(log.written.len()) == self.fail_at {
                return Err("disk full".into());
            }
            log.written.push(frame.clone());
            Ok(())
        }

        fn close(&mut self) -> std::result::Result<(), Box<dyn std::error::Error>> {
            self.log.lock().unwrap().closed += 1;
            if self.fail_close {
                return Err("trailer failed".into());
            }
            Ok(())
        }
    }

    /// Counts calls and fills the mask with 0 so inpainted frames are
    /// distinguishable from pass-through ones.
    struct CountingInpainter {
        calls: Arc<Mutex<usize>>,
        fail: bool,
    }

    impl FrameInpainter for CountingInpainter {
        fn inpaint(
            &self,
            frame: &Frame,
            mask: &Mask,
            _radius: f64,
            _method: InpaintMethod,
        ) -> std::result::Result<Frame, Box<dyn std::error::Error>> {
            if self.fail {
                return Err("numerics".into());
            }
            *self.calls.lock().unwrap() += 1;
            let mut data = frame.data().to_vec();
            for y in 0..mask.height() {
                for x in 0..mask.width() {
                    if mask.get(x, y) {
                        let i = (y * mask.width() + x) * 3;
                        data[i..i + 3].fill(0);
                    }
                }
            }
            Ok(frame.with_data(data))
        }
    }

    struct RecordingLogger {
        progress: Arc<Mutex<Vec<(usize, Option<usize>)>>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn progress(&mut self, current: usize, total: Option<usize>) {
            self.progress.lock().unwrap().push((current, total));
        }
        fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
        fn metric(&mut self, _name: &str, _value: f64) {}
        fn info(&mut self, _message: &str) {}
    }

    // --- Harness ---

    struct Harness {
        reader: Arc<Mutex<ReaderLog>>,
        writer: Arc<Mutex<WriterLog>>,
        calls: Arc<Mutex<usize>>,
        processor: VideoProcessor,
    }

    fn harness(reader: StubReader, writer: StubWriter, fail_inpaint: bool) -> Harness {
        let calls = Arc::new(Mutex::new(0));
        let reader_log = reader.log.clone();
        let writer_log = writer.log.clone();
        let processor = VideoProcessor::new(
            Box::new(reader),
            Box::new(writer),
            Box::new(CountingInpainter {
                calls: calls.clone(),
                fail: fail_inpaint,
            }),
            Box::new(NullPipelineLogger),
        );
        Harness {
            reader: reader_log,
            writer: writer_log,
            calls,
            processor,
        }
    }

    struct Paths {
        _dir: tempfile::TempDir,
        input: PathBuf,
        output: PathBuf,
    }

    fn paths(output_name: &str) -> Paths {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"stub").unwrap();
        let output = dir.path().join(output_name);
        Paths {
            _dir: dir,
            input,
            output,
        }
    }

    fn run_config(paths: &Paths, specs: &[&str]) -> RunConfig {
        RunConfig {
            input: paths.input.clone(),
            output: paths.output.clone(),
            regions: RegionSet::new(specs.iter().map(|s| parse_region_spec(s).unwrap()).collect()),
            overwrite: false,
        }
    }

    fn assert_released(h: &Harness) {
        assert!(h.reader.lock().unwrap().closed >= 1, "reader not released");
        if h.writer.lock().unwrap().opened_with.is_some() {
            assert!(h.writer.lock().unwrap().closed >= 1, "writer not released");
        }
    }

    // --- Scenarios ---

    #[test]
    fn test_whole_clip_region_inpaints_every_frame() {
        let p = paths("out.mp4");
        let mut h = harness(StubReader::new(300, 30.0), StubWriter::new(), false);

        let report = h.processor.execute(&run_config(&p, &["@0,0,100,40"])).unwrap();

        assert_eq!(*h.calls.lock().unwrap(), 300);
        assert_eq!(report.frames_processed, 300);
        assert_eq!(report.frames_inpainted, 300);
        assert_eq!(h.writer.lock().unwrap().written.len(), 300);
        assert_eq!(h.processor.state(), RunState::Done);
    }

    #[test]
    fn test_existing_output_without_overwrite_fails_before_opening() {
        let p = paths("out.mp4");
        std::fs::write(&p.output, b"previous run").unwrap();
        let mut h = harness(StubReader::new(10, 30.0), StubWriter::new(), false);

        let err = h.processor.execute(&run_config(&p, &["0,0,10,10"])).unwrap_err();

        assert!(matches!(
            err,
            UnburnError::Configuration(ConfigurationError::OutputExists(_))
        ));
        assert!(!h.reader.lock().unwrap().opened);
        assert!(h.writer.lock().unwrap().opened_with.is_none());
        assert_eq!(h.processor.state(), RunState::Failed);
        assert_eq!(std::fs::read(&p.output).unwrap(), b"previous run");
    }

    #[test]
    fn test_existing_output_with_overwrite_runs() {
        let p = paths("out.mp4");
        std::fs::write(&p.output, b"previous run").unwrap();
        let mut h = harness(StubReader::new(3, 30.0), StubWriter::new(), false);
        let mut config = run_config(&p, &["0,0,10,10"]);
        config.overwrite = true;

        assert!(h.processor.execute(&config).is_ok());
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let p = paths("out.mp4");
        let mut h = harness(StubReader::new(3, 30.0), StubWriter::new(), false);
        let mut config = run_config(&p, &["0,0,10,10"]);
        config.input = p.input.with_file_name("missing.mp4");

        let err = h.processor.execute(&config).unwrap_err();

        assert!(matches!(err, UnburnError::Io(VideoIoError::InputNotFound(_))));
        assert!(!h.reader.lock().unwrap().opened);
    }

    // --- Streaming ---

    #[test]
    fn test_frames_outside_window_pass_through_unchanged() {
        // 1 fps: frame i has timestamp i seconds. Window 2..=3 covers two frames.
        let p = paths("out.mp4");
        let mut h = harness(StubReader::new(6, 1.0), StubWriter::new(), false);

        let report = h.processor.execute(&run_config(&p, &["2-3@0,0,4,4"])).unwrap();

        assert_eq!(*h.calls.lock().unwrap(), 2);
        assert_eq!(report.frames_inpainted, 2);
        let written = &h.writer.lock().unwrap().written;
        let touched: Vec<bool> = written.iter().map(|f| f.data()[0] == 0).collect();
        assert_eq!(touched, vec![false, false, true, true, false, false]);
    }

    #[test]
    fn test_output_order_matches_input_order() {
        let p = paths("out.mp4");
        let mut h = harness(StubReader::new(20, 10.0), StubWriter::new(), false);

        h.processor.execute(&run_config(&p, &["0.5-1.2@0,0,4,4"])).unwrap();

        let indices: Vec<usize> = h
            .writer
            .lock()
            .unwrap()
            .written
            .iter()
            .map(|f| f.index())
            .collect();
        assert_eq!(indices, (1000..1020).collect::<Vec<_>>());
    }

    #[test]
    fn test_non_positive_fps_uses_fallback_timestamps() {
        // At the 30 fps fallback, frames 0..=30 fall inside 0-1s.
        let p = paths("out.mp4");
        let mut h = harness(StubReader::new(45, 0.0), StubWriter::new(), false);

        h.processor.execute(&run_config(&p, &["0-1@0,0,4,4"])).unwrap();

        assert_eq!(*h.calls.lock().unwrap(), 31);
    }

    #[test]
    fn test_region_outside_frame_is_not_an_error() {
        let p = paths("out.mp4");
        let mut h = harness(StubReader::new(5, 30.0), StubWriter::new(), false);

        let report = h.processor.execute(&run_config(&p, &["500,500,10,10"])).unwrap();

        assert_eq!(*h.calls.lock().unwrap(), 0);
        assert_eq!(report.frames_processed, 5);
    }

    #[rstest]
    #[case::avi("out.avi", OutputCodec::Mjpeg)]
    #[case::mp4("out.mp4", OutputCodec::Mpeg4)]
    #[case::mov("out.mov", OutputCodec::Mpeg4)]
    #[case::fallback("out.webm", OutputCodec::Mpeg4)]
    fn test_codec_follows_output_extension(#[case] name: &str, #[case] expected: OutputCodec) {
        let p = paths(name);
        let mut h = harness(StubReader::new(1, 30.0), StubWriter::new(), false);

        let report = h.processor.execute(&run_config(&p, &["0,0,4,4"])).unwrap();

        assert_eq!(report.codec, expected);
        assert_eq!(h.writer.lock().unwrap().opened_with, Some(expected));
    }

    // --- Progress ---

    #[test]
    fn test_progress_once_per_second_plus_final() {
        let p = paths("out.mp4");
        let progress = Arc::new(Mutex::new(Vec::new()));
        let mut processor = VideoProcessor::new(
            Box::new(StubReader::new(75, 30.0)),
            Box::new(StubWriter::new()),
            Box::new(CountingInpainter {
                calls: Arc::new(Mutex::new(0)),
                fail: false,
            }),
            Box::new(RecordingLogger {
                progress: progress.clone(),
            }),
        );

        processor.execute(&run_config(&p, &["0,0,4,4"])).unwrap();

        assert_eq!(
            *progress.lock().unwrap(),
            vec![(30, Some(75)), (60, Some(75)), (75, Some(75))]
        );
    }

    #[test]
    fn test_progress_with_unknown_total() {
        let p = paths("out.mp4");
        let progress = Arc::new(Mutex::new(Vec::new()));
        let mut reader = StubReader::new(3, 2.0);
        reader.total_frames = None;
        let mut processor = VideoProcessor::new(
            Box::new(reader),
            Box::new(StubWriter::new()),
            Box::new(CountingInpainter {
                calls: Arc::new(Mutex::new(0)),
                fail: false,
            }),
            Box::new(RecordingLogger {
                progress: progress.clone(),
            }),
        );

        processor.execute(&run_config(&p, &["0,0,4,4"])).unwrap();

        assert_eq!(*progress.lock().unwrap(), vec![(2, None), (3, None)]);
    }

    #[test]
    fn test_progress_not_repeated_on_exact_multiple() {
        let p = paths("out.mp4");
        let progress = Arc::new(Mutex::new(Vec::new()));
        let mut processor = VideoProcessor::new(
            Box::new(StubReader::new(60, 30.0)),
            Box::new(StubWriter::new()),
            Box::new(CountingInpainter {
                calls: Arc::new(Mutex::new(0)),
                fail: false,
            }),
            Box::new(RecordingLogger {
                progress: progress.clone(),
            }),
        );

        processor.execute(&run_config(&p, &["0,0,4,4"])).unwrap();

        assert_eq!(*progress.lock().unwrap(), vec![(30, Some(60)), (60, Some(60))]);
    }

    // --- Release on every exit path ---

    #[test]
    fn test_success_releases_both_handles_once() {
        let p = paths("out.mp4");
        let mut h = harness(StubReader::new(4, 30.0), StubWriter::new(), false);

        h.processor.execute(&run_config(&p, &["0,0,4,4"])).unwrap();

        assert_eq!(h.reader.lock().unwrap().closed, 1);
        assert_eq!(h.writer.lock().unwrap().closed, 1);
    }

    #[test]
    fn test_reader_open_failure() {
        let p = paths("out.mp4");
        let mut reader = StubReader::new(4, 30.0);
        reader.fail_open = true;
        let mut h = harness(reader, StubWriter::new(), false);

        let err = h.processor.execute(&run_config(&p, &["0,0,4,4"])).unwrap_err();

        assert!(matches!(err, UnburnError::Io(VideoIoError::ReaderOpen { .. })));
        assert!(h.writer.lock().unwrap().opened_with.is_none());
        assert_eq!(h.writer.lock().unwrap().closed, 0);
    }

    #[test]
    fn test_writer_open_failure_releases_reader() {
        let p = paths("out.mp4");
        let mut writer = StubWriter::new();
        writer.fail_open = true;
        let mut h = harness(StubReader::new(4, 30.0), writer, false);

        let err = h.processor.execute(&run_config(&p, &["0,0,4,4"])).unwrap_err();

        assert!(matches!(err, UnburnError::Io(VideoIoError::WriterOpen { .. })));
        assert_eq!(h.reader.lock().unwrap().closed, 1);
        assert_eq!(h.writer.lock().unwrap().closed, 0);
    }

    #[test]
    fn test_read_failure_releases_both() {
        let p = paths("out.mp4");
        let mut reader = StubReader::new(10, 30.0);
        reader.fail_at = Some(4);
        let mut h = harness(reader, StubWriter::new(), false);

        let err = h.processor.execute(&run_config(&p, &["0,0,4,4"])).unwrap_err();

        assert!(matches!(err, UnburnError::Io(VideoIoError::Read { frame: 4, .. })));
        assert_eq!(h.writer.lock().unwrap().written.len(), 4);
        assert_released(&h);
        assert_eq!(h.processor.state(), RunState::Failed);
    }

    #[test]
    fn test_write_failure_releases_both() {
        let p = paths("out.mp4");
        let mut writer = StubWriter::new();
        writer.fail_at = Some(2);
        let mut h = harness(StubReader::new(10, 30.0), writer, false);

        let err = h.processor.execute(&run_config(&p, &["0,0,4,4"])).unwrap_err();

        assert!(matches!(err, UnburnError::Io(VideoIoError::Write { frame: 2, .. })));
        assert_released(&h);
    }

    #[test]
    fn test_inpaint_failure_releases_both() {
        let p = paths("out.mp4");
        let mut h = harness(StubReader::new(10, 30.0), StubWriter::new(), true);

        let err = h.processor.execute(&run_config(&p, &["0,0,4,4"])).unwrap_err();

        assert!(matches!(err, UnburnError::Inpaint { frame: 0, .. }));
        assert_released(&h);
    }

    #[test]
    fn test_close_failure_is_reported() {
        let p = paths("out.mp4");
        let mut writer = StubWriter::new();
        writer.fail_close = true;
        let mut h = harness(StubReader::new(2, 30.0), writer, false);

        let err = h.processor.execute(&run_config(&p, &["0,0,4,4"])).unwrap_err();

        assert!(matches!(err, UnburnError::Io(VideoIoError::Close { .. })));
        assert_eq!(h.writer.lock().unwrap().closed, 1);
        assert_eq!(h.reader.lock().unwrap().closed, 1);
    }

    // --- Real adapters ---

    #[test]
    fn test_end_to_end_with_ffmpeg() {
        use crate::inpainting::infrastructure::cpu_inpainter::CpuInpainter;
        use crate::video::infrastructure::ffmpeg_reader::tests::create_test_video;
        use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
        use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.avi");
        create_test_video(&input, 10, 64, 48, 10);

        let config = RunConfig {
            input,
            output: output.clone(),
            regions: RegionSet::new(vec![parse_region_spec("0-0.5@8,8,16,8:3:ns:1").unwrap()]),
            overwrite: false,
        };
        let mut processor = VideoProcessor::new(
            Box::new(FfmpegReader::new()),
            Box::new(FfmpegWriter::new()),
            Box::new(CpuInpainter::new()),
            Box::new(NullPipelineLogger),
        );

        let report = processor.execute(&config).unwrap();

        assert_eq!(report.frames_processed, 10);
        assert_eq!(report.frames_inpainted, 6);
        assert_eq!(report.codec, OutputCodec::Mjpeg);

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&output).unwrap();
        assert_eq!((meta.width, meta.height), (64, 48));
        assert_eq!(reader.frames().count(), 10);
        reader.close();
    }

    #[test]
    fn test_second_execute_rejected() {
        let p = paths("out.mp4");
        let mut h = harness(StubReader::new(1, 30.0), StubWriter::new(), false);
        let mut config = run_config(&p, &["0,0,4,4"]);
        config.overwrite = true;

        h.processor.execute(&config).unwrap();
        let err = h.processor.execute(&config).unwrap_err();

        assert!(matches!(err, UnburnError::AlreadyExecuted));
    }
}
