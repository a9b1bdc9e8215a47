//! Attendance session command.

use std::time::Duration;

use anyhow::Context as _;
use clap::Args;
use facelog_attendance::{FlushEvent, Session};
use facelog_faceid::{BBox, DetectedFace, FaceEmbedder, FaceError, Matcher};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::{
    feature_store, get_config, log_store, open_backend, output_result, print_error, print_info,
    print_success, print_verbose, print_warning, store_call,
};
use crate::Cli;

/// Run an attendance session over a stream of frames.
///
/// Each input line is one frame: a JSON array of faces, where a face is
/// either a bare embedding or `{"bbox": [x1, y1, x2, y2], "embedding": [...]}`.
/// Recognized people are logged at most once per flush interval. The session
/// ends at end of input or on Ctrl-C, after flushing what is pending.
#[derive(Args)]
pub struct RunCommand {
    /// Frames file (default: stdin)
    #[arg(short = 'f', long = "file")]
    file: Option<String>,

    /// Flush interval in seconds (overrides config file)
    #[arg(long)]
    interval: Option<u64>,

    /// Match threshold (overrides config file)
    #[arg(long)]
    threshold: Option<f32>,

    /// Delay between frames in milliseconds, to replay recorded input
    #[arg(long, default_value_t = 0)]
    frame_interval_ms: u64,
}

#[derive(Default, Serialize)]
struct RunSummary {
    frames: u64,
    bad_frames: u64,
    known: u64,
    unknown: u64,
    flushes: u64,
    written: u64,
    dropped: u64,
    failures: u64,
    timed_out: u64,
}

impl RunCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let kv = open_backend(&cfg)?;
        let store = feature_store(&cfg, kv.clone());
        let gallery = store_call(cfg.store_timeout(), "load", move || store.load()).await?;
        if gallery.is_empty() {
            print_warning("No registered people; every face will be unknown.");
        }
        print_verbose(cli, &format!("Loaded {} registrations", gallery.len()));

        let mut matcher = Matcher::new(cfg.matcher());
        if let Some(t) = self.threshold {
            matcher.set_threshold(t);
        }
        let mut flusher_cfg = cfg.flusher();
        if let Some(secs) = self.interval {
            anyhow::ensure!(secs > 0, "interval must be positive");
            flusher_cfg.interval = Duration::from_secs(secs);
        }

        let embedder = JsonLineEmbedder { dim: cfg.dim };
        let mut session = Session::start(gallery, matcher, log_store(&cfg, kv), flusher_cfg);

        let printer = session.take_events().map(|mut events| {
            tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    match event {
                        FlushEvent::Flushed { records } => {
                            print_success(&format!("Logged {records} attendance records."))
                        }
                        FlushEvent::Failed { dropped, error } => {
                            print_error(&format!("Lost {dropped} records: {error}"))
                        }
                        FlushEvent::TimedOut { records } => print_warning(&format!(
                            "Database is slow; {records} records still being written."
                        )),
                    }
                }
            })
        });

        let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &self.file {
            Some(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("open {path}"))?;
                Box::new(BufReader::new(file))
            }
            None => Box::new(BufReader::new(tokio::io::stdin())),
        };
        let mut lines = reader.lines();

        let mut summary = RunSummary::default();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            let line = tokio::select! {
                _ = &mut ctrl_c => {
                    print_info("Interrupted, flushing.");
                    break;
                }
                line = lines.next_line() => line.context("read frame")?,
            };
            let Some(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }

            summary.frames += 1;
            match session.process_frame(&embedder, line.as_str()) {
                Ok(matches) => {
                    for m in matches {
                        if m.outcome.resolution.is_known() {
                            summary.known += 1;
                        } else {
                            summary.unknown += 1;
                        }
                        print_verbose(
                            cli,
                            &format!(
                                "frame {}: {} ({:.3})",
                                summary.frames, m.outcome.resolution, m.outcome.score
                            ),
                        );
                    }
                }
                Err(e) => {
                    summary.bad_frames += 1;
                    print_warning(&format!("frame {}: {e}", summary.frames));
                }
            }

            if self.frame_interval_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.frame_interval_ms)).await;
            }
        }

        let stats = session.finish().await.context("final flush")?;
        if let Some(printer) = printer {
            let _ = printer.await;
        }

        summary.flushes = stats.ticks;
        summary.written = stats.written;
        summary.dropped = stats.dropped;
        summary.failures = stats.failures;
        summary.timed_out = stats.timed_out;
        output_result(&summary, cli.output.as_deref(), cli.json)
    }
}

/// Reads faces from one JSON line per frame.
struct JsonLineEmbedder {
    dim: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FaceInput {
    Vector(Vec<f32>),
    Detected {
        #[serde(default)]
        bbox: Option<[f32; 4]>,
        embedding: Vec<f32>,
    },
}

impl FaceEmbedder for JsonLineEmbedder {
    type Frame = str;

    fn extract(&self, frame: &str) -> Result<Vec<DetectedFace>, FaceError> {
        let faces: Vec<FaceInput> =
            serde_json::from_str(frame).map_err(|e| FaceError::Embedder(e.to_string()))?;
        Ok(faces
            .into_iter()
            .map(|face| match face {
                FaceInput::Vector(embedding) => DetectedFace {
                    bbox: BBox::default(),
                    embedding,
                },
                FaceInput::Detected { bbox, embedding } => DetectedFace {
                    bbox: bbox
                        .map(|[x1, y1, x2, y2]| BBox { x1, y1, x2, y2 })
                        .unwrap_or_default(),
                    embedding,
                },
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
