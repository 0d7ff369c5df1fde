use std::path::Path;

use tracing::{info, warn};

use super::output::{OutputTarget, decide_output};
use super::{Invocation, NoticeLevel};
use crate::artifact::resolve::resolve_source;
use crate::artifact::{ArtifactResolver, EnvLookup};
use crate::config::ValidateConfig;
use crate::error::{ConfigError, ValidateError};

/// Engine entry point, relative to the cloned engine repository.
pub const ENGINE_SCRIPT: &str = "./appdome_api_bash/validate.sh";

pub struct CommandComposer<'a> {
    config: &'a ValidateConfig,
    resolver: ArtifactResolver<'a>,
    env: EnvLookup<'a>,
    script: String,
}

impl<'a> CommandComposer<'a> {
    pub fn new(
        config: &'a ValidateConfig,
        resolver: ArtifactResolver<'a>,
        env: EnvLookup<'a>,
    ) -> Self {
        Self {
            config,
            resolver,
            env,
            script: ENGINE_SCRIPT.to_string(),
        }
    }

    /// Overrides the engine entry point, e.g. with an absolute path into
    /// the cloned engine.
    pub fn with_script(mut self, script: impl AsRef<Path>) -> Self {
        self.script = script.as_ref().to_string_lossy().into_owned();
        self
    }

    /// Builds the engine invocation.
    ///
    /// Downloads remote artifacts into `work_dir`, checks that every
    /// artifact exists and settles the output flag. Notices are logged as
    /// they are produced and kept on the returned [`Invocation`].
    pub fn compose(&self, work_dir: &Path) -> Result<Invocation, ValidateError> {
        self.config.validate()?;

        let source = resolve_source(self.config.app_path(), self.env)?;
        let artifacts = self.resolver.resolve(source.raw(), work_dir)?;
        if artifacts.is_empty() {
            return Err(ConfigError::AppPathNotProvided.into());
        }
        artifacts.ensure_exist()?;

        for path in artifacts.paths() {
            let name = path.file_name().unwrap_or(path.as_os_str());
            info!("Validating app {}", name.to_string_lossy());
        }

        let target = OutputTarget::parse(self.config.output_location());
        let decision = decide_output(&target, &source, &artifacts)?;

        let mut notices = Vec::new();
        if let Some(notice) = decision.notice {
            match notice.level {
                NoticeLevel::Warning => warn!("{}", notice.message),
                NoticeLevel::Info => info!("{}", notice.message),
            }
            notices.push(notice);
        }

        Ok(Invocation {
            program: self.script.clone(),
            token: self.config.token.clone(),
            app: artifacts.joined(),
            output: decision.path,
            source,
            artifacts,
            notices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Downloader;
    use crate::error::ResolutionError;
    use std::fs;
    use std::path::PathBuf;

    struct NoNetwork;

    impl Downloader for NoNetwork {
        fn download(&self, url: &str, _dest_dir: &Path) -> Result<PathBuf, ResolutionError> {
            Err(ResolutionError::DownloadFailed {
                url: url.to_string(),
                reason: "offline".into(),
            })
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn compose(config: &ValidateConfig, work: &Path) -> Result<Invocation, ValidateError> {
        CommandComposer::new(config, ArtifactResolver::new(&NoNetwork), &no_env).compose(work)
    }

    fn app_in(dir: &Path, name: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, b"apk").unwrap();
        path.display().to_string()
    }

    #[test]
    fn composes_with_derived_output() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app_in(tmp.path(), "app.apk");
        let config = ValidateConfig::new("abc123").with_app_path(&app);

        let invocation = compose(&config, tmp.path()).unwrap();

        let expected_output = format!("{}/results.json", tmp.path().display());
        assert_eq!(
            invocation.argv(),
            vec![
                ENGINE_SCRIPT.to_string(),
                "--api_key".into(),
                "abc123".into(),
                "--app".into(),
                app,
                "--output".into(),
                expected_output,
            ]
        );
        assert_eq!(invocation.notices.len(), 1);
    }

    #[test]
    fn explicit_json_output_is_used_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app_in(tmp.path(), "app.ipa");
        let config = ValidateConfig::new("abc123")
            .with_app_path(&app)
            .with_output_location("/reports/run.json");

        let invocation = compose(&config, tmp.path()).unwrap();

        assert_eq!(
            invocation.output_path(),
            Some(&PathBuf::from("/reports/run.json"))
        );
        assert!(invocation.notices.is_empty());
    }

    #[test]
    fn missing_artifact_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ValidateConfig::new("abc123")
            .with_app_path(format!("{}/gone.apk", tmp.path().display()));

        let err = compose(&config, tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            ValidateError::Resolution(ResolutionError::ArtifactMissing(_))
        ));
    }

    #[test]
    fn list_of_separators_is_not_an_app_path() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ValidateConfig::new("abc123").with_app_path(",,");

        let err = compose(&config, tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            ValidateError::Config(ConfigError::AppPathNotProvided)
        ));
    }

    #[test]
    fn missing_app_and_env_names_variable() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ValidateConfig::new("abc123");

        let err = compose(&config, tmp.path()).unwrap_err();
        assert!(err.to_string().contains("VALIDATE_APP_PATH"));
    }

    #[test]
    fn redacted_forms_hide_the_token() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app_in(tmp.path(), "app.aab");
        let config = ValidateConfig::new("abc123").with_app_path(&app);

        let invocation = compose(&config, tmp.path()).unwrap();

        assert!(!invocation.to_string().contains("abc123"));
        assert!(invocation.redacted_argv().contains(&"****".to_string()));
    }

    #[test]
    fn script_override_is_first_token() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app_in(tmp.path(), "app.apk");
        let config = ValidateConfig::new("abc123").with_app_path(&app);

        let invocation =
            CommandComposer::new(&config, ArtifactResolver::new(&NoNetwork), &no_env)
                .with_script("/engine/appdome_api_bash/validate.sh")
                .compose(tmp.path())
                .unwrap();

        assert_eq!(invocation.program(), "/engine/appdome_api_bash/validate.sh");
    }
}
