use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use sourcefile_url::rules::load_rule_set;
use sourcefile_url::{
    BranchProvider, Error, FixedBranch, GitBranch, Project, RewriteOptions, SourcefileUrlPlugin,
};

#[derive(Parser)]
#[command(
    name = "sourcefile-url",
    about = "Rewrite documentation source references into hosted links"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Only log errors
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Log debug details
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite the source references of a project dump
    Rewrite {
        /// Project JSON produced by the documentation generator
        project: PathBuf,
        /// Write the result here instead of overwriting PROJECT
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[command(flatten)]
        rule_args: RuleArgs,
    },
    /// Load the rules and print them in the order they are tried
    Rules {
        #[command(flatten)]
        rule_args: RuleArgs,
    },
}

/// Rule configuration flags shared by every subcommand.
#[derive(Args)]
struct RuleArgs {
    /// Branch name for `<branch_name>/` (default: the checked-out git branch)
    #[arg(long)]
    branch: Option<String>,
    /// JSON rule file, relative to the working directory
    #[arg(long = "sourcefile-url-map", value_name = "FILE")]
    map_file: Option<String>,
    /// URL prepended to every source path
    #[arg(long = "sourcefile-url-prefix", value_name = "URL")]
    url_prefix: Option<String>,
}

/// Where the branch name comes from for this run.
enum BranchSource {
    /// Given with `--branch`.
    Fixed(FixedBranch),
    /// Discovered from the repository around the working directory.
    Git(GitBranch),
}

impl BranchProvider for BranchSource {
    fn current_branch(&self) -> Option<String> {
        return match self {
            Self::Fixed(fixed) => fixed.current_branch(),
            Self::Git(git) => git.current_branch(),
        };
    }
}

impl RuleArgs {
    /// Pick the branch provider: `--branch` wins over git detection.
    fn branch_source(&self, cwd: &Path) -> BranchSource {
        return match &self.branch {
            Some(name) => BranchSource::Fixed(FixedBranch(Some(name.clone()))),
            None => BranchSource::Git(GitBranch::new(cwd)),
        };
    }

    /// Merge the flags over `.sourcefile-url.toml`.
    ///
    /// # Errors
    ///
    /// Returns errors from loading the config file.
    fn options(&self, cwd: &Path) -> Result<RewriteOptions, Error> {
        let from_flags = RewriteOptions {
            map_file: self.map_file.clone(),
            url_prefix: self.url_prefix.clone(),
        };
        return Ok(RewriteOptions::load(cwd)?.overridden_by(from_flags));
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Rewrite { project, output, rule_args } => {
            rewrite(project, output.as_deref(), rule_args)
        },
        Commands::Rules { rule_args } => rules(rule_args),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    };
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the flags.
fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_err| return EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run both build phases over a project dump and write it back.
/// A configuration error leaves the project untouched, like a build that
/// completes without link rewriting.
///
/// # Errors
///
/// Returns errors from reading or writing the project, or from the config file.
fn rewrite(project_path: &Path, output: Option<&Path>, rule_args: &RuleArgs) -> Result<ExitCode, Error> {
    let cwd = std::env::current_dir()?;
    let options = rule_args.options(&cwd)?;
    let mut project = read_project(project_path)?;

    let plugin = SourcefileUrlPlugin::new(rule_args.branch_source(&cwd));
    if let Some(pending) = plugin.on_build_begin(&options, &cwd) {
        let summary = pending.on_resolve_end(&mut project);
        println!(
            "Rewrote {} links and {} titles ({} references unchanged)",
            summary.urls, summary.titles, summary.unchanged
        );
    } else {
        println!("Source links not rewritten");
    }

    write_project(output.unwrap_or(project_path), &project)?;
    return Ok(ExitCode::SUCCESS);
}

/// Load the configured rules and list them.
///
/// # Errors
///
/// Returns any configuration or rule-file error, so a bad rule file fails loudly here.
fn rules(rule_args: &RuleArgs) -> Result<ExitCode, Error> {
    let cwd = std::env::current_dir()?;
    let options = rule_args.options(&cwd)?;
    let branch = rule_args.branch_source(&cwd).current_branch();

    let Some(rule_set) = load_rule_set(&options, &cwd, branch.as_deref())? else {
        println!("No rewrite configured");
        return Ok(ExitCode::SUCCESS);
    };

    for (index, rule) in rule_set.iter().enumerate() {
        let mode = if rule.only_title { "title" } else { "url" };
        println!("{index:>3}  {mode:<5}  {}  ->  {}", rule.pattern, rule.replace);
    }
    println!("{} rules", rule_set.len());
    return Ok(ExitCode::SUCCESS);
}

/// Parse a project dump.
///
/// # Errors
///
/// Returns `Error::Io` if the file can't be read, or `Error::ProjectJson` if it isn't a project.
fn read_project(path: &Path) -> Result<Project, Error> {
    let content = std::fs::read_to_string(path)?;
    return serde_json::from_str(&content).map_err(|source| {
        return Error::ProjectJson { path: path.to_path_buf(), source };
    });
}

/// Serialize a project dump as pretty JSON.
///
/// # Errors
///
/// Returns `Error::ProjectJson` if serialization fails, or `Error::Io` if writing fails.
fn write_project(path: &Path, project: &Project) -> Result<(), Error> {
    let mut content = serde_json::to_string_pretty(project).map_err(|source| {
        return Error::ProjectJson { path: path.to_path_buf(), source };
    })?;
    content.push('\n');
    std::fs::write(path, content)?;
    return Ok(());
}
