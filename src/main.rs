use std::io::IsTerminal;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use marquee_core::{DiffSnapshot, EventContext, MarqueeConfig, OutputFormat, PullRequestPayload};
use marquee_suggest::comment::{CommentPublisher, StdoutPublisher};
use marquee_suggest::github::{GitHubClient, PrCommenter};
use marquee_suggest::suggest::{SuggestOutcome, TitleSuggester};

#[derive(Parser)]
#[command(
    name = "marquee",
    version,
    about = "Conventional commit title suggestions for pull requests",
    long_about = "Marquee reads the changes of a pull request, leaves dependency lockfiles out\n\
                   of the picture, and asks an LLM for three conventional commit titles.\n\
                   The suggestions land in a single PR comment that is updated on every run.\n\n\
                   Examples:\n  \
                     marquee suggest --pr owner/repo#1       Suggest titles for a GitHub PR\n  \
                     git diff main | marquee suggest       Suggest titles for a local diff\n  \
                     marquee files --file changes.patch    Show which files would be analyzed\n  \
                     marquee init                          Create a .marquee.toml config file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .marquee.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text  Human-readable summaries (default)\n  \
                         json  Machine-readable JSON with camelCase keys"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// GitHub token (default: GITHUB_TOKEN or GH_TOKEN)
    #[arg(long, global = true)]
    github_token: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Suggest pull request titles
    #[command(long_about = "Suggest conventional commit titles for a pull request.\n\n\
        Reads changed files from a GitHub PR, from the GitHub Actions event that\n\
        triggered the job, or from a local unified diff (file or stdin). Lockfiles\n\
        are ignored unless nothing else changed. Suggestions are posted as a single\n\
        PR comment that later runs replace, or printed for local diffs.\n\n\
        Examples:\n  marquee suggest --pr owner/repo#123\n  git diff main | marquee suggest --title 'wip'\n  marquee suggest --file changes.patch")]
    Suggest {
        /// GitHub PR to analyze (format: owner/repo#123)
        #[arg(
            long,
            long_help = "GitHub PR to analyze.\n\nFormat: owner/repo#123\nRequires GITHUB_TOKEN or GH_TOKEN env var."
        )]
        pr: Option<String>,
        /// Read diff from file instead of stdin
        #[arg(long, conflicts_with = "pr")]
        file: Option<PathBuf>,
        /// Current title used for a local diff
        #[arg(long, default_value = "")]
        title: String,
        /// Current description used for a local diff
        #[arg(long)]
        body: Option<String>,
        /// Model override (default: [llm].model or INPUT_LIGHT_MODEL)
        #[arg(long)]
        model: Option<String>,
        /// Print the comment instead of posting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Show which changed files would be analyzed
    #[command(long_about = "Show which changed files would be analyzed.\n\n\
        Splits a unified diff into files and applies the lockfile filter. When every\n\
        changed file is a lockfile, all of them are analyzed instead.\n\n\
        Examples:\n  git diff | marquee files\n  marquee files --file changes.patch --format json")]
    Files {
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Create a default .marquee.toml configuration file
    #[command(long_about = "Create a default .marquee.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .marquee.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Where a suggestion run takes its pull request from.
enum Target {
    /// A pull request named on the command line.
    PullRequest {
        owner: String,
        repo: String,
        number: u64,
    },
    /// The GitHub Actions event that triggered the job.
    Actions { owner: String, repo: String },
    /// A local unified diff.
    Local { diff: String },
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!("marquee v{version}: conventional commit titles for your pull requests\n");

    println!("Quick start:");
    println!("  marquee init                     Create a .marquee.toml config file");
    println!("  git diff main | marquee suggest  Suggest titles for your local changes");
    println!("  marquee suggest --pr o/r#1       Comment suggestions on a GitHub PR\n");

    println!("All commands:");
    println!("  suggest  Suggest PR titles (stdin, file, GitHub PR, or Actions event)");
    println!("  files    Show which changed files would be analyzed");
    println!("  init     Create default configuration\n");

    println!("Run 'marquee <command> --help' for details.");
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn read_diff_input(file: &Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err(format!("reading {}", path.display())),
        None => {
            if std::io::stdin().is_terminal() {
                miette::bail!(miette::miette!(
                    help = "Pipe a diff to marquee, e.g.: git diff main | marquee suggest\n       Or use --file <path> or --pr owner/repo#123",
                    "No diff input provided"
                ));
            }
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .into_diagnostic()
                .wrap_err("reading stdin")?;
            Ok(input)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<MarqueeConfig> {
    let config = match path {
        Some(path) => MarqueeConfig::from_file(path)?,
        None => {
            let default_path = Path::new(".marquee.toml");
            if default_path.exists() {
                MarqueeConfig::from_file(default_path)?
            } else {
                MarqueeConfig::default()
            }
        }
    };
    Ok(config)
}

fn github_client(token: Option<&str>) -> Result<GitHubClient> {
    let action_token = env_var("INPUT_GITHUB_TOKEN").filter(|t| !t.trim().is_empty());
    let client = GitHubClient::new(token.or(action_token.as_deref())).map_err(|e| {
        miette::miette!(
            help = "Pass --github-token, or export GITHUB_TOKEN with access to the repository",
            "{e}"
        )
    })?;
    Ok(client)
}

fn resolve_target(pr: Option<&str>, file: &Option<PathBuf>) -> Result<Target> {
    if let Some(pr_ref) = pr {
        let (owner, repo, number) = marquee_suggest::github::parse_pr_reference(pr_ref)?;
        return Ok(Target::PullRequest {
            owner,
            repo,
            number,
        });
    }
    if file.is_none() && marquee_suggest::event::is_github_actions(env_var) {
        let (owner, repo) = marquee_suggest::event::repository_from_env(env_var)?;
        return Ok(Target::Actions { owner, repo });
    }
    Ok(Target::Local {
        diff: read_diff_input(file)?,
    })
}

fn targets_pull_request(event: &EventContext) -> bool {
    event.is_pull_request_event() && event.pull_request.is_some()
}

/// Fetch the changed files of the event's pull request, if it has one.
async fn remote_snapshot(
    github: &GitHubClient,
    owner: &str,
    repo: &str,
    event: &EventContext,
) -> Result<DiffSnapshot> {
    match &event.pull_request {
        Some(pr) if event.is_pull_request_event() => {
            Ok(github.list_pr_files(owner, repo, pr.number).await?)
        }
        _ => Ok(DiffSnapshot::default()),
    }
}

fn pr_publisher(
    github: GitHubClient,
    owner: &str,
    repo: &str,
    event: &EventContext,
    dry_run: bool,
) -> Arc<dyn CommentPublisher> {
    match &event.pull_request {
        Some(pr) if !dry_run => Arc::new(PrCommenter::new(github, owner, repo, pr.number)),
        _ => Arc::new(StdoutPublisher),
    }
}

const DEFAULT_CONFIG: &str = r#"# Marquee Configuration
# See: https://github.com/Meru143/marquee

[llm]
# LLM provider (OpenAI-compatible endpoint)
# provider = "openai"
# model = "gpt-4o-mini"
# base_url = "https://api.openai.com"
# temperature = 0.2

[suggest]
# Turn PR title suggestions off without removing the step
# enabled = true
# Custom minijinja prompt using {{ title }}, {{ description }} and {{ diff }}
# prompt_template = ".github/marquee-title-prompt.md"
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(format = %cli.format, "loaded configuration");

    match cli.command {
        None => {
            print_welcome();
            return Ok(());
        }
        Some(Command::Suggest {
            ref pr,
            ref file,
            ref title,
            ref body,
            ref model,
            dry_run,
        }) => {
            let mut config = config;
            config.apply_action_inputs(env_var)?;
            if let Some(model) = model {
                config.llm.model.clone_from(model);
            }

            if !config.suggest.enabled {
                tracing::debug!("{}", SuggestOutcome::Disabled);
                return Ok(());
            }

            let prompts: Arc<dyn marquee_suggest::prompt::PromptRenderer> =
                match &config.suggest.prompt_template {
                    Some(path) => Arc::new(
                        marquee_suggest::prompt::TemplatePrompts::from_file(path)
                            .wrap_err("loading suggest.prompt_template")?,
                    ),
                    None => Arc::new(marquee_suggest::prompt::TemplatePrompts::default()),
                };

            let (event, snapshot, commenter) = match resolve_target(pr.as_deref(), file)? {
                Target::PullRequest {
                    owner,
                    repo,
                    number,
                } => {
                    let github = github_client(cli.github_token.as_deref())?;
                    let event = EventContext::pull_request(
                        github.get_pull_request(&owner, &repo, number).await?,
                    );
                    let snapshot = remote_snapshot(&github, &owner, &repo, &event).await?;
                    let commenter = pr_publisher(github, &owner, &repo, &event, dry_run);
                    (event, snapshot, commenter)
                }
                Target::Actions { owner, repo } => {
                    let event = marquee_suggest::event::event_from_env()?;
                    if targets_pull_request(&event) {
                        let github = github_client(cli.github_token.as_deref())?;
                        let snapshot = remote_snapshot(&github, &owner, &repo, &event).await?;
                        let commenter = pr_publisher(github, &owner, &repo, &event, dry_run);
                        (event, snapshot, commenter)
                    } else {
                        let commenter: Arc<dyn CommentPublisher> = Arc::new(StdoutPublisher);
                        (event, DiffSnapshot::default(), commenter)
                    }
                }
                Target::Local { diff } => {
                    let files = marquee_difflens::parser::split_unified_diff(&diff)?;
                    let event = EventContext::pull_request(PullRequestPayload {
                        number: 0,
                        title: title.clone(),
                        body: body.clone(),
                    });
                    let commenter: Arc<dyn CommentPublisher> = Arc::new(StdoutPublisher);
                    (event, DiffSnapshot::from(files), commenter)
                }
            };

            // Only pull request events reach the chat backend.
            if targets_pull_request(&event)
                && !config.llm.resolve_api_key(env_var)
                && config.llm.base_url.is_none()
            {
                let llm_env_var = config.llm.api_key_env_var();
                miette::bail!(miette::miette!(
                    help = "Set {llm_env_var} or add api_key in your .marquee.toml under [llm]",
                    "No API key configured for the {} provider",
                    config.llm.provider
                ));
            }

            let chat = Arc::new(marquee_suggest::llm::LlmClient::new(&config.llm)?);
            tracing::debug!(model = chat.model(), "using chat backend");
            let suggester = TitleSuggester::new(chat, prompts, commenter);

            let is_tty = std::io::stderr().is_terminal();
            let spinner = if is_tty {
                let pb = indicatif::ProgressBar::new_spinner();
                pb.set_style(
                    indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                        .into_diagnostic()?,
                );
                pb.set_message("Suggesting PR titles...");
                pb.enable_steady_tick(std::time::Duration::from_millis(120));
                Some(pb)
            } else {
                None
            };

            let outcome = suggester.suggest(&config.suggest, &event, &snapshot).await;

            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            tracing::debug!(%outcome, "suggestion run finished");
        }
        Some(Command::Files { ref file }) => {
            let input = read_diff_input(file)?;
            let files = marquee_difflens::parser::split_unified_diff(&input)?;
            let selection = marquee_difflens::filter::select_for_analysis(&files);

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&selection).into_diagnostic()?
                    );
                }
                OutputFormat::Text => {
                    if selection.is_empty() {
                        println!("No changed files found.");
                        return Ok(());
                    }
                    println!("Analyzed ({}):", selection.files.len());
                    for f in &selection.files {
                        let note = if f.has_patch() { "" } else { "  (no patch)" };
                        println!("  {}{note}", f.filename);
                    }
                    if !selection.excluded.is_empty() {
                        println!("\nExcluded dependency files ({}):", selection.excluded.len());
                        for f in &selection.excluded {
                            println!("  {}", f.filename);
                        }
                    }
                    if selection.fell_back {
                        println!("\nOnly dependency files changed; all of them are analyzed.");
                    }
                }
            }
        }
        Some(Command::Init) => {
            let path = Path::new(".marquee.toml");
            if path.exists() {
                miette::bail!(".marquee.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .marquee.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "marquee", &mut std::io::stdout());
        }
    }

    Ok(())
}
