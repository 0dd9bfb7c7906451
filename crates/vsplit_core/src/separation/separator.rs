//! Separation orchestrator.
//!
//! Resolves a [`SeparationRequest`] into a [`SeparationJob`], builds both
//! filter graphs and drives the engine once per stem.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use super::errors::{SeparationError, SeparationResult};
use super::job::{SeparationJob, SeparationOutput, SeparationRequest, Stem};
use crate::codec;
use crate::config::{Merge, Settings, StemSettings};
use crate::engine::{AudioEngine, EngineError, EngineInvocation, FfmpegEngine};
use crate::filters::{build_instrumental_graph, build_vocal_graph, FilterGraph, GraphMode};
use crate::logging::{JobLogger, LogConfig};

/// Where per-job log files go.
#[derive(Debug, Clone)]
struct JobLogTarget {
    dir: PathBuf,
    config: LogConfig,
}

/// Runs separation jobs against an [`AudioEngine`].
///
/// Holds only read-only defaults, so one separator can serve any number of
/// jobs, from any number of threads. Two jobs writing the same output names
/// at the same time will race on those files; callers avoid that.
pub struct Separator<E: AudioEngine = FfmpegEngine> {
    engine: E,
    /// Stem parameters that request overrides are merged onto.
    defaults: StemSettings,
    graph_mode: GraphMode,
    /// Render both stems concurrently.
    parallel_stems: bool,
    job_logs: Option<JobLogTarget>,
}

impl Separator<FfmpegEngine> {
    /// Build a separator from application settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let engine = FfmpegEngine::new().with_program(&settings.engine.program);
        let separator = Separator::new(engine)
            .with_defaults(settings.stems.clone())
            .with_graph_mode(settings.engine.graph_mode)
            .with_parallel_stems(settings.engine.parallel_stems);

        if settings.logging.job_logs {
            separator.with_job_logs(
                &settings.paths.logs_folder,
                settings.logging.log_config(),
            )
        } else {
            separator
        }
    }
}

impl<E: AudioEngine> Separator<E> {
    /// Separator with compiled-in stem defaults, sequential rendering and
    /// no job logs.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            defaults: StemSettings::default(),
            graph_mode: GraphMode::default(),
            parallel_stems: false,
            job_logs: None,
        }
    }

    /// Replace the stem defaults.
    pub fn with_defaults(mut self, defaults: StemSettings) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_graph_mode(mut self, mode: GraphMode) -> Self {
        self.graph_mode = mode;
        self
    }

    pub fn with_parallel_stems(mut self, parallel: bool) -> Self {
        self.parallel_stems = parallel;
        self
    }

    /// Write a log file per job into `dir`.
    pub fn with_job_logs(mut self, dir: impl Into<PathBuf>, config: LogConfig) -> Self {
        self.job_logs = Some(JobLogTarget {
            dir: dir.into(),
            config,
        });
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn defaults(&self) -> &StemSettings {
        &self.defaults
    }

    /// Check the engine can be started.
    ///
    /// Front-ends call this once before accepting jobs and treat a failure
    /// as fatal.
    pub fn probe(&self) -> SeparationResult<()> {
        self.engine.probe().map_err(|e| match e {
            EngineError::NotFound { program, source } => {
                SeparationError::EngineNotFound { program, source }
            }
            EngineError::ExecutionFailed { exit_code } => SeparationError::EngineNotFound {
                program: self.engine.program().to_string(),
                source: std::io::Error::other(format!(
                    "version query exited with {:?}",
                    exit_code
                )),
            },
        })
    }

    /// Resolve a request into a job, creating the output folder.
    ///
    /// Fails with [`SeparationError::InputNotFound`] before touching the
    /// file system if the input is missing.
    pub fn prepare(&self, request: &SeparationRequest) -> SeparationResult<SeparationJob> {
        if !request.input.exists() {
            return Err(SeparationError::InputNotFound(request.input.clone()));
        }

        let output_dir = request.resolved_output_dir();
        fs::create_dir_all(&output_dir)
            .map_err(|e| SeparationError::io_error("creating output directory", e))?;

        let stems = self.defaults.merged(&request.overrides);

        let codec = codec::lookup(&request.format);
        if codec.format != request.format {
            tracing::warn!(
                "Unsupported output format '{}', falling back to {}",
                request.format,
                codec.format
            );
        }

        Ok(SeparationJob {
            input: request.input.clone(),
            output_dir,
            codec,
            stems,
        })
    }

    /// Run a job, writing a job log if the separator is configured to.
    pub fn separate(&self, request: &SeparationRequest) -> SeparationResult<SeparationOutput> {
        let job = self.prepare(request)?;

        let logger = match &self.job_logs {
            Some(target) => Some(
                JobLogger::new(job.log_name(), &target.dir, target.config.clone(), None)
                    .map_err(|e| SeparationError::io_error("creating job log", e))?,
            ),
            None => None,
        };

        self.run_job(&job, logger.as_ref())
    }

    /// Run a job, logging into a caller-supplied logger.
    pub fn separate_logged(
        &self,
        request: &SeparationRequest,
        logger: &JobLogger,
    ) -> SeparationResult<SeparationOutput> {
        let job = self.prepare(request)?;
        self.run_job(&job, Some(logger))
    }

    fn run_job(
        &self,
        job: &SeparationJob,
        logger: Option<&JobLogger>,
    ) -> SeparationResult<SeparationOutput> {
        let instrumental_path = job.output_path(Stem::Instrumental);
        let vocal_path = job.output_path(Stem::Vocals);

        let instrumental_graph = build_instrumental_graph(&job.stems, self.graph_mode);
        let vocal_graph = build_vocal_graph(&job.stems, self.graph_mode);

        tracing::info!(
            "Separating {} into {} ({})",
            job.input.display(),
            job.output_dir.display(),
            job.codec.format
        );
        if let Some(log) = logger {
            log.info(&format!("Input: {}", job.input.display()));
            log.info(&format!(
                "Output: {} ({}, {} graph)",
                job.output_dir.display(),
                job.codec.format,
                self.graph_mode
            ));
            log.progress(0);
        }

        let result = if self.parallel_stems {
            self.render_parallel(
                job,
                (&instrumental_graph, &instrumental_path),
                (&vocal_graph, &vocal_path),
                logger,
            )
        } else {
            self.render(job, Stem::Instrumental, &instrumental_graph, &instrumental_path, logger)
                .and_then(|()| {
                    if let Some(log) = logger {
                        log.progress(50);
                    }
                    self.render(job, Stem::Vocals, &vocal_graph, &vocal_path, logger)
                })
        };

        if let Err(e) = &result {
            tracing::debug!("Separation of {} failed: {}", job.input.display(), e);
            if let Some(log) = logger {
                log.error(&e.to_string());
            }
        }
        result?;

        if let Some(log) = logger {
            log.progress(100);
            log.success("Separation completed");
        }

        Ok(SeparationOutput {
            instrumental_path,
            vocal_path,
            output_dir: job.output_dir.clone(),
            mime: job.codec.mime.to_string(),
        })
    }

    /// Render both stems on scoped threads and wait for both.
    ///
    /// An instrumental failure is reported in preference to a vocal one.
    fn render_parallel(
        &self,
        job: &SeparationJob,
        instrumental: (&FilterGraph, &Path),
        vocals: (&FilterGraph, &Path),
        logger: Option<&JobLogger>,
    ) -> SeparationResult<()> {
        let (instrumental_result, vocal_result) = thread::scope(|scope| {
            let vocal_task =
                scope.spawn(|| self.render(job, Stem::Vocals, vocals.0, vocals.1, logger));
            let instrumental_result =
                self.render(job, Stem::Instrumental, instrumental.0, instrumental.1, logger);
            let vocal_result = vocal_task
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (instrumental_result, vocal_result)
        });

        instrumental_result.and(vocal_result)
    }

    /// Render one stem.
    fn render(
        &self,
        job: &SeparationJob,
        stem: Stem,
        graph: &FilterGraph,
        output: &Path,
        logger: Option<&JobLogger>,
    ) -> SeparationResult<()> {
        let invocation = EngineInvocation {
            input: &job.input,
            graph,
            codec: job.codec,
            output,
        };

        let command = invocation.command_line(self.engine.program());
        tracing::debug!("Rendering {} stem: {}", stem, command);
        if let Some(log) = logger {
            log.phase(&format!("Rendering {}", stem));
            log.command(&command);
            log.debug(&format!("Filter graph: {}", graph));
        }

        self.engine.run(&invocation).map_err(|e| match e {
            EngineError::NotFound { program, source } => {
                SeparationError::EngineNotFound { program, source }
            }
            EngineError::ExecutionFailed { exit_code } => {
                SeparationError::EngineExecutionFailed { stem, exit_code }
            }
        })?;

        tracing::info!("Wrote {}", output.display());
        if let Some(log) = logger {
            log.success(&format!("{} stem written: {}", stem, output.display()));
        }
        Ok(())
    }
}
