use anyhow::bail;
use models::promotion::EnvironmentPipeline;
use std::collections::HashSet;
use std::env;

#[derive(Debug)]
pub struct Config {
    /// Ordered promotion pipeline, format: "development,staging,production"
    pub pipeline: EnvironmentPipeline,
}

impl Config {
    pub fn new() -> anyhow::Result<Config> {
        _ = dotenvy::dotenv();

        Ok(Config {
            pipeline: match env::var("PIPELINE_ENVIRONMENTS") {
                Ok(csv) => pipeline_from_csv(&csv)?,
                Err(_) => EnvironmentPipeline::default(),
            },
        })
    }
}

fn pipeline_from_csv(csv: &str) -> anyhow::Result<EnvironmentPipeline> {
    let stages: Vec<String> = csv
        .split(',')
        .map(|stage| stage.trim().to_string())
        .filter(|stage| !stage.is_empty())
        .collect();

    if stages.is_empty() {
        bail!("PIPELINE_ENVIRONMENTS must name at least one environment.");
    }

    let distinct: HashSet<&String> = stages.iter().collect();
    if distinct.len() != stages.len() {
        bail!("PIPELINE_ENVIRONMENTS must not repeat an environment.");
    }

    Ok(EnvironmentPipeline::new(stages))
}
