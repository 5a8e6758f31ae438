use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "terraform-wrapper")]
#[command(version)]
#[command(about = "Terraform orchestration toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Root directory containing Terraform stacks
    #[arg(long, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Environment name (required for most commands)
    #[arg(long, global = true)]
    pub environment: Option<String>,

    /// Environment name alias
    #[arg(long = "env", global = true)]
    pub env_alias: Option<String>,

    /// Optional exact Terraform version to enforce
    #[arg(long = "terraform-version", global = true)]
    pub terraform_version: Option<String>,

    /// AWS account ID used to derive backend state locations
    #[arg(long = "account-id", global = true)]
    pub account_id: Option<String>,

    /// AWS region
    #[arg(long, default_value = "eu-west-2", global = true)]
    pub region: String,

    /// Directory for generated superplan artifacts
    #[arg(long = "out", default_value = "superplan", global = true)]
    pub out: PathBuf,

    /// Number of stacks to run concurrently
    #[arg(long, default_value_t = 4, global = true)]
    pub parallelism: usize,

    /// Enable plan cache reuse
    #[arg(long, default_value_t = true, action = ArgAction::Set, global = true)]
    pub cache: bool,

    /// Comma separated list of stacks to force planning
    #[arg(long = "force-plan", value_delimiter = ',', global = true)]
    pub force_plan: Vec<String>,

    /// Preserve generated superplan artifacts
    #[arg(long = "keep-plan-artifacts", global = true)]
    pub keep_plan_artifacts: bool,

    /// Refresh state before planning
    #[arg(long, default_value_t = true, action = ArgAction::Set, global = true)]
    pub refresh: bool,

    /// Poll for the orchestration lock instead of failing when held
    #[arg(long, global = true)]
    pub wait: bool,

    /// Skip the orchestration lock entirely
    #[arg(long = "no-lock", global = true)]
    pub no_lock: bool,

    /// Assume yes on confirmation prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Verbosity level
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run terraform init for a specific stack
    Init(StackArgs),

    /// Run terraform plan for a single stack
    Plan(StackArgs),

    /// Run terraform apply for a specific stack
    Apply(StackArgs),

    /// Run terraform destroy for a specific stack
    Destroy(StackArgs),

    /// Initialise all stacks
    InitAll,

    /// Plan all stacks respecting dependencies
    PlanAll,

    /// Apply all stacks in dependency order
    ApplyAll,

    /// Destroy all stacks (honors skip_when_destroying)
    DestroyAll,

    /// Produce a single aggregate preview across every stack
    Superplan,

    /// Remove .terraform artifacts for a specific stack
    Clean(StackArgs),

    /// Remove .terraform artifacts for every stack
    CleanAll,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct StackArgs {
    /// Stack name or path
    #[arg(long)]
    pub stack: String,
}
