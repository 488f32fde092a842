use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use gitwrap::command;
use gitwrap::logger;
use gitwrap::repo::{
    CheckoutOptions, CleanOptions, CloneOptions, CommitOptions, FetchOptions, Location,
    LogOptions, MergeOptions, OpenOptions, PullOptions, PushOptions, RemoveOptions, Repository,
    TagOptions,
};
use gitwrap::settings::{self, parse_env_pair, Settings};

#[derive(Parser)]
#[command(name = "gitwrap")]
#[command(about = "Run git operations through a typed wrapper", long_about = None)]
#[command(version)]
struct Cli {
    /// Repository to operate on
    #[arg(short = 'C', long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Git executable to use for this run
    #[arg(long, global = true)]
    git: Option<PathBuf>,

    /// Extra environment variable for git (KEY=VALUE, repeatable)
    #[arg(short = 'e', long = "env", global = true)]
    env: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a repository at --repo
    Init {
        #[arg(long)]
        bare: bool,
    },

    /// Clone a URL or local repository into a new directory
    Clone {
        source: String,
        dest: PathBuf,

        #[arg(long)]
        bare: bool,

        /// Local repository to borrow objects from
        #[arg(long)]
        reference: Option<PathBuf>,
    },

    /// Stage files
    Add {
        paths: Vec<PathBuf>,

        /// Stage every change in the working tree
        #[arg(short = 'A', long)]
        all: bool,
    },

    /// Remove files from the working tree and index
    Rm {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long)]
        cached: bool,

        #[arg(short = 'r')]
        recursive: bool,

        #[arg(short, long)]
        force: bool,
    },

    /// Record staged changes
    Commit {
        #[arg(short, long)]
        message: String,

        #[arg(short, long)]
        all: bool,

        #[arg(long)]
        amend: bool,

        #[arg(long)]
        allow_empty: bool,
    },

    /// Show working tree status
    Status {
        #[arg(short, long)]
        short: bool,
    },

    /// Remove untracked files
    Clean {
        #[arg(short = 'd')]
        directories: bool,

        #[arg(short = 'x')]
        ignored: bool,

        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// List, create or delete branches
    Branch {
        #[command(subcommand)]
        action: Option<BranchAction>,
    },

    /// Switch branches or restore a commit
    Checkout {
        reference: String,

        #[arg(short = 'b')]
        create: bool,

        #[arg(short, long)]
        force: bool,
    },

    /// Merge a branch into the current one
    Merge {
        reference: String,

        #[arg(long)]
        no_ff: bool,

        #[arg(long)]
        ff_only: bool,

        #[arg(short, long)]
        message: Option<String>,
    },

    /// Download objects and refs from a remote
    Fetch {
        remote: Option<String>,
        refspec: Option<String>,

        #[arg(long)]
        all: bool,

        #[arg(long)]
        tags: bool,

        #[arg(long)]
        prune: bool,
    },

    /// Update a remote
    Push {
        remote: Option<String>,
        refspec: Option<String>,

        #[arg(long)]
        tags: bool,

        #[arg(short, long)]
        force: bool,

        #[arg(short = 'u', long)]
        set_upstream: bool,
    },

    /// Fetch and integrate a remote branch
    Pull {
        remote: Option<String>,
        refspec: Option<String>,

        #[arg(long)]
        rebase: bool,
    },

    /// Manage remotes
    Remote {
        #[command(subcommand)]
        action: Option<RemoteAction>,
    },

    /// List or create tags
    Tag {
        #[command(subcommand)]
        action: Option<TagAction>,
    },

    /// Show commit history
    Log {
        #[arg(short = 'n', long)]
        max_count: Option<usize>,

        /// Value for --pretty, e.g. oneline
        #[arg(long)]
        format: Option<String>,

        revision: Option<String>,

        #[arg(last = true)]
        paths: Vec<String>,
    },

    /// Show or set the repository description
    Describe { text: Option<String> },

    /// Check that the git executable can be run
    Probe,

    /// Configure gitwrap settings
    Config {
        /// Persist the git executable
        #[arg(long = "set-git")]
        set_git: Option<PathBuf>,

        /// Persist an environment override (KEY=VALUE, repeatable)
        #[arg(long = "set-env")]
        set_env: Vec<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
enum BranchAction {
    /// List local branches
    List,
    /// List remote-tracking branches
    Remote,
    /// Print the checked out branch
    Current,
    /// Create a branch
    Create {
        name: String,
        start_point: Option<String>,
    },
    /// Delete a branch
    Delete {
        name: String,

        #[arg(short = 'D', long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum RemoteAction {
    List,
    Add { name: String, url: String },
}

#[derive(Subcommand)]
enum TagAction {
    List,
    Add {
        name: String,
        target: Option<String>,

        /// Annotated tag message
        #[arg(short, long)]
        message: Option<String>,

        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let stored = Settings::load()?;
    logger::init_logger(stored.log_level.as_deref())?;
    if let Err(e) = logger::rotate_log_if_needed() {
        log::debug!("log rotation skipped: {e:#}");
    }
    if let Err(e) = logger::log_to_file(&format!(
        "gitwrap {} started in {}",
        env!("CARGO_PKG_VERSION"),
        cli.repo.display()
    )) {
        log::debug!("log file not written: {e:#}");
    }

    let result = run(cli, stored);
    if let Err(error) = &result {
        if let Err(e) = logger::log_command_failure(error) {
            log::debug!("log file not written: {e:#}");
        }
    }
    result
}

fn run(cli: Cli, stored: Settings) -> Result<()> {
    stored.apply();
    if let Some(git) = &cli.git {
        command::set_git_executable(git);
    }

    let mut env = stored.env.clone();
    for pair in &cli.env {
        let (key, value) = parse_env_pair(pair)?;
        env.insert(key, value);
    }

    let open = || -> Result<Repository> {
        let mut repo = Repository::open(&cli.repo)
            .with_context(|| format!("Failed to open repository at {}", cli.repo.display()))?;
        for (key, value) in &env {
            repo.set_env(key, value);
        }
        Ok(repo)
    };

    match cli.command {
        Commands::Init { bare } => {
            let mut repo = Repository::open_with(
                &cli.repo,
                OpenOptions::new().create(true).init(false).bare(bare),
            )?;
            for (key, value) in &env {
                repo.set_env(key, value);
            }
            print!("{}", repo.init()?);
        }
        Commands::Clone {
            source,
            dest,
            bare,
            reference,
        } => {
            let repo = Repository::create_new(
                &dest,
                Some(Location::parse(&source)),
                CloneOptions {
                    bare,
                    reference,
                    env: env.clone(),
                },
            )?;
            println!(
                "{}",
                format!("Cloned {} into {}", source, repo.path().display()).green()
            );
        }
        Commands::Add { paths, all } => {
            let repo = open()?;
            if all {
                print!("{}", repo.add_all()?);
            } else {
                print!("{}", repo.add(&paths)?);
            }
        }
        Commands::Rm {
            paths,
            cached,
            recursive,
            force,
        } => {
            let options = RemoveOptions {
                cached,
                recursive,
                force,
            };
            print!("{}", open()?.remove(&paths, &options)?);
        }
        Commands::Commit {
            message,
            all,
            amend,
            allow_empty,
        } => {
            let options = CommitOptions {
                all,
                amend,
                allow_empty,
                author: None,
            };
            print!("{}", open()?.commit(&message, &options)?);
        }
        Commands::Status { short } => {
            print!("{}", open()?.status(short)?);
        }
        Commands::Clean {
            directories,
            ignored,
            dry_run,
        } => {
            let options = CleanOptions {
                directories,
                ignored,
                dry_run,
            };
            print!("{}", open()?.clean(&options)?);
        }
        Commands::Branch { action } => {
            let repo = open()?;
            match action.unwrap_or(BranchAction::List) {
                BranchAction::List => {
                    for branch in repo.branches(false)? {
                        match branch.strip_prefix("* ") {
                            Some(active) => println!("* {}", active.green().bold()),
                            None => println!("  {branch}"),
                        }
                    }
                }
                BranchAction::Remote => {
                    for branch in repo.remote_branches(true)? {
                        println!("  {}", branch.red());
                    }
                }
                BranchAction::Current => println!("{}", repo.active_branch()?),
                BranchAction::Create { name, start_point } => {
                    print!("{}", repo.create_branch(&name, start_point.as_deref())?);
                }
                BranchAction::Delete { name, force } => {
                    print!("{}", repo.delete_branch(&name, force)?);
                }
            }
        }
        Commands::Checkout {
            reference,
            create,
            force,
        } => {
            let options = CheckoutOptions { create, force };
            print!("{}", open()?.checkout(&reference, &options)?);
        }
        Commands::Merge {
            reference,
            no_ff,
            ff_only,
            message,
        } => {
            let options = MergeOptions {
                no_ff,
                ff_only,
                message,
            };
            print!("{}", open()?.merge(&reference, &options)?);
        }
        Commands::Fetch {
            remote,
            refspec,
            all,
            tags,
            prune,
        } => {
            let options = FetchOptions {
                remote,
                refspec,
                all,
                tags,
                prune,
            };
            print!("{}", open()?.fetch(&options)?);
        }
        Commands::Push {
            remote,
            refspec,
            tags,
            force,
            set_upstream,
        } => {
            let options = PushOptions {
                remote,
                refspec,
                tags,
                force,
                set_upstream,
            };
            print!("{}", open()?.push(&options)?);
        }
        Commands::Pull {
            remote,
            refspec,
            rebase,
        } => {
            let options = PullOptions {
                remote,
                refspec,
                rebase,
            };
            print!("{}", open()?.pull(&options)?);
        }
        Commands::Remote { action } => {
            let repo = open()?;
            match action.unwrap_or(RemoteAction::List) {
                RemoteAction::List => {
                    for remote in repo.remotes()? {
                        println!("{remote}");
                    }
                }
                RemoteAction::Add { name, url } => {
                    print!("{}", repo.add_remote(&name, Location::parse(&url))?);
                }
            }
        }
        Commands::Tag { action } => {
            let repo = open()?;
            match action.unwrap_or(TagAction::List) {
                TagAction::List => {
                    for tag in repo.tags()? {
                        println!("{}", tag.yellow());
                    }
                }
                TagAction::Add {
                    name,
                    target,
                    message,
                    force,
                } => {
                    let options = TagOptions {
                        message,
                        target,
                        force,
                    };
                    print!("{}", repo.add_tag(&name, &options)?);
                }
            }
        }
        Commands::Log {
            max_count,
            format,
            revision,
            paths,
        } => {
            let options = LogOptions {
                max_count,
                format,
                revision,
                paths,
            };
            print!("{}", open()?.log(&options)?);
        }
        Commands::Describe { text } => {
            let repo = open()?;
            match text {
                Some(text) => repo.set_description(&text)?,
                None => println!("{}", repo.description()?),
            }
        }
        Commands::Probe => {
            let git = command::git_executable();
            if command::is_available() {
                println!("{} {}", git.display(), "is available".green());
            } else {
                println!("{} {}", git.display(), "is not available".red());
                std::process::exit(1);
            }
        }
        Commands::Config {
            set_git,
            set_env,
            show,
        } => {
            if show || (set_git.is_none() && set_env.is_empty()) {
                settings::show_settings()?;
            } else {
                settings::update_settings(set_git, set_env)?;
            }
        }
    }

    Ok(())
}
