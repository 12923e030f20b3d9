//! Standard stages built from configuration.

use anyhow::{Context, Result};

use super::stage::{PipelineStage, StageName, Step};
use super::transform::{
    CombineMediaQueries, CommandVars, CompileStyles, MinSuffix, MinifyCss, MinifyJs,
    OptimizeImage, Prefix, ResolveIncludes, SetExtension, SourceMap, StripDebug,
};
use crate::config::{ProjectConfig, SourceSet};
use crate::core::EnvironmentContext;
use crate::fileset::{FileSetRule, GlobSet};

/// Stages `build`, `watch` and `deploy` cover: styles, scripts, images,
/// plus fonts when enabled.
pub fn enabled_stages(config: &ProjectConfig) -> Vec<StageName> {
    StageName::ALL
        .into_iter()
        .filter(|name| *name != StageName::Fonts || config.fonts.enable)
        .collect()
}

/// Build one stage.
///
/// Every step is declared here; [`PipelineStage::plan`] drops the ones the
/// environment does not call for.
pub fn define(
    config: &ProjectConfig,
    name: StageName,
    env: &EnvironmentContext,
) -> Result<PipelineStage> {
    let stage = match name {
        StageName::Styles => {
            let styles = &config.styles;
            let browsers = styles
                .browser_targets()
                .map_err(|entry| anyhow::anyhow!("invalid styles.browsers entry `{entry}`"))?;
            let vars = CommandVars {
                root: config.root().to_path_buf(),
                environment: env.environment(),
            };

            let mut stage = base(config, name, styles.sources())?
                .with_step(Step::always(CompileStyles::new(styles.command.clone(), vars)))
                .with_step(Step::always(SetExtension::new("css")))
                .with_step(Step::always(Prefix::new(browsers)));
            if styles.combine_media_queries {
                stage = stage.with_step(Step::always(CombineMediaQueries));
            }
            stage
                .with_step(Step::production(MinifyCss::new(browsers)))
                .with_step(Step::production(MinSuffix))
                .with_step(Step::development(SourceMap))
        }
        StageName::Scripts => base(config, name, config.scripts.sources())?
            .with_step(Step::always(ResolveIncludes))
            .with_step(Step::production(StripDebug))
            .with_step(Step::production(MinifyJs)),
        StageName::Images => base(config, name, config.images.sources())?
            .with_step(Step::always(OptimizeImage::new(config.images.jpeg_quality)))
            .incremental(true),
        StageName::Fonts => base(config, name, config.fonts.sources())?,
    };
    Ok(stage)
}

/// Stage skeleton: directories, globs and failure policy.
fn base(config: &ProjectConfig, name: StageName, sources: SourceSet<'_>) -> Result<PipelineStage> {
    let inputs = FileSetRule::from_parts(sources.include, sources.exclude)
        .with_context(|| format!("invalid {name} include/exclude patterns"))?;
    let watch = GlobSet::new(sources.watch)
        .with_context(|| format!("invalid {name} watch patterns"))?;

    Ok(PipelineStage::new(
        name,
        config.root_join(sources.source),
        inputs,
        config.root_join(sources.output),
    )
    .with_watch(watch)
    .fail_on_error(config.build.fail_on_error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::core::Environment;
    use std::path::Path;

    fn env(environment: Environment) -> EnvironmentContext {
        EnvironmentContext::new(environment)
    }

    #[test]
    fn test_style_steps_per_environment() {
        let config = test_config_at(Path::new("/site"), "");
        let styles = define(&config, StageName::Styles, &env(Environment::Production)).unwrap();

        assert_eq!(
            styles.plan(&env(Environment::Production)).names(),
            vec!["compile", "rename", "prefix", "combine-mq", "minify", "rename"]
        );
        assert_eq!(
            styles.plan(&env(Environment::Development)).names(),
            vec!["compile", "rename", "prefix", "combine-mq", "sourcemap"]
        );
    }

    #[test]
    fn test_combine_media_queries_optional() {
        let config = test_config_at(Path::new("/site"), "[styles]\ncombine_media_queries = false\n");
        let styles = define(&config, StageName::Styles, &env(Environment::Development)).unwrap();
        assert!(!styles.plan(&env(Environment::Development)).names().contains(&"combine-mq"));
    }

    #[test]
    fn test_script_steps_per_environment() {
        let config = test_config_at(Path::new("/site"), "");
        let scripts = define(&config, StageName::Scripts, &env(Environment::Staging)).unwrap();

        assert_eq!(
            scripts.plan(&env(Environment::Staging)).names(),
            vec!["include", "strip-debug", "minify"]
        );
        assert_eq!(scripts.plan(&env(Environment::Development)).names(), vec!["include"]);
    }

    #[test]
    fn test_directories_and_policy() {
        let config = test_config_at(Path::new("/site"), "[build]\nfail_on_error = true\n");
        let images = define(&config, StageName::Images, &env(Environment::Development)).unwrap();

        assert_eq!(images.source_dir, Path::new("/site/src/img"));
        assert_eq!(images.output_dir, Path::new("/site/dist/img"));
        assert!(images.incremental);
        assert!(images.fail_on_error);
    }

    #[test]
    fn test_fonts_only_when_enabled() {
        let config = test_config_at(Path::new("/site"), "");
        assert_eq!(
            enabled_stages(&config),
            vec![StageName::Styles, StageName::Scripts, StageName::Images]
        );
        let config = test_config_at(Path::new("/site"), "[fonts]\nenable = true\n");
        assert_eq!(enabled_stages(&config), StageName::ALL);
    }

    #[test]
    fn test_partials_watched_not_compiled() {
        let config = test_config_at(Path::new("/site"), "");
        let styles = define(&config, StageName::Styles, &env(Environment::Development)).unwrap();

        assert!(styles.watches(Path::new("/site/src/styles/_grid.scss")));
        assert!(!styles.inputs.matches("_grid.scss"));
        assert!(styles.inputs.matches("main.scss"));
    }
}
