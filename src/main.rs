use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use global_aurora_rds::deployment::ACCOUNT_ENV_VAR;
use global_aurora_rds::{Context, DeploymentConfig, RegionCapabilityTable};

#[derive(Parser, Debug)]
#[command(name = "global-aurora")]
#[command(about = "Synthesize Aurora global database stacks", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one CloudFormation template per stack of a deployment file
    Synth {
        /// Deployment file (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Directory for `<stack>.template.json` files (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List regions that support Aurora global databases
    Regions,
    /// Print the JSON Schema of the deployment file
    Schema,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("global_aurora_rds=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Synth { config, out } => {
            let account = std::env::var(ACCOUNT_ENV_VAR).ok();
            let deployment =
                DeploymentConfig::from_file(&config)?.with_default_account(account.as_deref());
            info!(config = %config.display(), "Synthesizing deployment");

            let synthesized = deployment.synthesize(&Context::default())?;
            match out {
                Some(dir) => {
                    let written = synthesized.write_templates(&dir)?;
                    info!(templates = written.len(), dir = %dir.display(), "Synthesis complete");
                }
                None => {
                    if synthesized.stacks.len() > 1 {
                        warn!("Printing several templates to stdout; use --out to split them");
                    }
                    for stack in &synthesized.stacks {
                        println!("{}", stack.to_json()?);
                    }
                }
            }
        }
        Command::Regions => {
            for region in RegionCapabilityTable::default().regions() {
                println!("{region}");
            }
        }
        Command::Schema => {
            let schema = schemars::schema_for!(DeploymentConfig);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}
