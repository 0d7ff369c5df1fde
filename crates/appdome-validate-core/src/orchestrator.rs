//! Sequencing of a validation run.
//!
//! acquire engine → resolve & compose → run engine → classify → clean up.
//!
//! [`ValidationOrchestrator::run`] never fails: every error is logged and
//! folded into a FAILURE [`RunReport`], and the run workspace is removed on
//! every path.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::artifact::read::fingerprint_artifact;
use crate::artifact::{
    ArtifactReference, ArtifactResolver, CurlDownloader, Downloader, EnvLookup,
};
use crate::classify::{Classification, ValidationOutcome, classify};
use crate::command::CommandComposer;
use crate::config::ValidateConfig;
use crate::engine::{Engine, EngineFetcher, GitEngineFetcher};
use crate::error::{ExecutionError, ValidateError};
use crate::process::{CancelToken, ProcessRunner, RunRequest, SystemRunner};
use crate::report::model::{RunReport, ToolInfo};
use crate::workspace::RunWorkspace;
use crate::{CLIENT_HEADER_ENV, CLIENT_HEADER_VALUE};

pub struct ValidationOrchestrator<F, D, R> {
    fetcher: F,
    downloader: D,
    runner: R,
    base_dir: PathBuf,
    tool: ToolInfo,
    cancel: CancelToken,
}

impl ValidationOrchestrator<GitEngineFetcher, CurlDownloader, SystemRunner> {
    /// Orchestrator backed by `git`, `curl` and real subprocesses, with run
    /// workspaces created under `base_dir`.
    pub fn system(base_dir: impl Into<PathBuf>) -> Self {
        Self::new(
            GitEngineFetcher::default(),
            CurlDownloader::default(),
            SystemRunner::default(),
            base_dir,
        )
    }
}

impl<F, D, R> ValidationOrchestrator<F, D, R>
where
    F: EngineFetcher,
    D: Downloader,
    R: ProcessRunner,
{
    pub fn new(fetcher: F, downloader: D, runner: R, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            downloader,
            runner,
            base_dir: base_dir.into(),
            tool: ToolInfo::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_tool(mut self, tool: ToolInfo) -> Self {
        self.tool = tool;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs one validation end to end.
    pub fn run(&self, config: &ValidateConfig, env: EnvLookup<'_>) -> RunReport {
        let mut report = RunReport::new(self.tool.clone(), Classification::failed("not run"));

        let workspace = match RunWorkspace::create_in(&self.base_dir) {
            Ok(ws) => ws,
            Err(e) => {
                let err = ValidateError::Io(e);
                error!("Couldn't create Appdome workspace: {err}");
                fail(&mut report, &err);
                return report;
            }
        };

        match self.run_in(&workspace, config, env, &mut report) {
            Ok(classification) => report.classification = classification,
            Err(err) => fail(&mut report, &err),
        }

        workspace.cleanup();

        match report.classification.outcome {
            ValidationOutcome::Success => info!("Appdome validation passed"),
            ValidationOutcome::Unstable => {
                warn!("Appdome validation unstable: {}", report.classification.reason)
            }
            ValidationOutcome::Failure => {
                error!("Appdome validation failed: {}", report.classification.reason)
            }
        }
        report
    }

    fn run_in(
        &self,
        workspace: &RunWorkspace,
        config: &ValidateConfig,
        env: EnvLookup<'_>,
        report: &mut RunReport,
    ) -> Result<Classification, ValidateError> {
        config.validate()?;
        self.check_cancelled()?;

        let engine = self.fetcher.fetch(workspace.path()).inspect_err(|e| {
            error!("Couldn't Update Appdome engine, read logs for more information. {e}");
        })?;

        self.execute(&engine, workspace, config, env, report)
            .inspect_err(|e| {
                error!(
                    "Couldn't run Appdome Verification, read logs for more information. error: {e}"
                );
            })
    }

    fn execute(
        &self,
        engine: &Engine,
        workspace: &RunWorkspace,
        config: &ValidateConfig,
        env: EnvLookup<'_>,
        report: &mut RunReport,
    ) -> Result<Classification, ValidateError> {
        let invocation = CommandComposer::new(config, ArtifactResolver::new(&self.downloader), env)
            .with_script(engine.script())
            .compose(workspace.path())?;

        report.record_invocation(&invocation);
        for artifact in &invocation.artifacts.items {
            match fingerprint_artifact(&artifact.path) {
                Ok(mut info) => {
                    if let ArtifactReference::RemoteUrl(url) = &artifact.reference {
                        info.source_url = Some(url.clone());
                    }
                    report.artifacts.push(info);
                }
                Err(e) => warn!("skipping artifact fingerprint: {e:#}"),
            }
        }

        self.check_cancelled()?;

        let argv = invocation.argv();
        let envs = [(CLIENT_HEADER_ENV, CLIENT_HEADER_VALUE)];
        let request = RunRequest {
            argv: &argv,
            cwd: &engine.dir,
            envs: &envs,
            timeout: config.timeout,
        };

        info!("Launching Appdome Validator");
        let output = self.runner.run(&request, &self.cancel)?;

        let classification = classify(output.exit_code, &output.lines);
        if output.exit_code != Some(0) {
            error!(
                "{}. Couldn't run Appdome Verification, read logs for more information.",
                classification.reason
            );
        }
        Ok(classification)
    }

    fn check_cancelled(&self) -> Result<(), ExecutionError> {
        if self.cancel.is_cancelled() {
            return Err(ExecutionError::Interrupted);
        }
        Ok(())
    }
}

fn fail(report: &mut RunReport, err: &ValidateError) {
    report.error = Some(err.to_string());
    report.classification = Classification::failed(err.to_string());
}
