use branch_notes::{
    format_listing, BranchArg, Config, EditorCommand, GitCli, NotesError, NotesStore, Resolver,
    CURRENT_BRANCH,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;

#[derive(Parser, Debug)]
#[command(name = "branch-notes")]
#[command(author, version)]
#[command(
    about = "Open and edit notes for the given git branch",
    long_about = "Open and edit notes for the given git branch.\n\n\
Notes are stored as NOTES_DIR/<toplevel>/<branch>.txt. NOTES_DIR is read from \
the environment variable 'NOTES_DIR' and defaults to ~/branch-notes."
)]
struct Cli {
    #[command(subcommand)]
    action: Action,

    /// The project directory name under which the note for the branch lives
    #[arg(short, long, global = true)]
    toplevel: Option<String>,

    /// Program used to create and open notes (default: $NOTES_EDITOR, then vi)
    #[arg(long, global = true)]
    editor: Option<String>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Open the note for a branch, creating its directory if needed
    Open {
        /// Branch to use; '-' or nothing means the current git branch
        #[arg(default_value = CURRENT_BRANCH)]
        branch: String,
    },

    /// List existing notes, grouped by toplevel
    List,

    /// Move the note for a branch into the ARCHIVE directory
    Archive {
        /// Branch to use; '-' or nothing means the current git branch
        #[arg(default_value = CURRENT_BRANCH)]
        branch: String,
    },

    /// Generate shell completion script
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), NotesError> {
    if let Action::Completion { shell } = cli.action {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "branch-notes", &mut io::stdout());
        return Ok(());
    }

    let config = Config::from_env(cli.editor.as_deref())?;
    log::debug!("notes root: {}", config.notes_root.display());
    let store = NotesStore::new(&config.notes_root);

    match cli.action {
        Action::List => {
            let groups = store.list(cli.toplevel.as_deref())?;
            print!("{}", format_listing(&groups));
        }
        Action::Open { branch } => {
            let editor = EditorCommand::parse(&config.editor)?;
            let git = GitCli::new();
            let location = Resolver::new(&store, &git)
                .resolve(cli.toplevel.as_deref(), &BranchArg::parse(Some(&branch)))?;
            let path = store.ensure_note_dir(&location)?;
            editor.open(&path)?;
        }
        Action::Archive { branch } => {
            let git = GitCli::new();
            let location = Resolver::new(&store, &git)
                .resolve(cli.toplevel.as_deref(), &BranchArg::parse(Some(&branch)))?;
            let archived = store.archive(&location)?;
            log::debug!("archived to {}", archived.display());
            println!("{}", "Done.".green());
        }
        Action::Completion { .. } => {}
    }
    Ok(())
}
