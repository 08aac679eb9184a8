use std::path::PathBuf;

use clap::Subcommand;

pub mod convert;
pub mod erf;

#[derive(Subcommand)]
pub enum Commands {
    /// Convert between binary resources and editable text forms
    Convert {
        /// Source file
        #[arg(short, long)]
        source: PathBuf,

        /// Destination file (format detected from both extensions)
        #[arg(short, long)]
        destination: PathBuf,
    },

    /// Work with ERF/MOD archives
    Erf {
        #[command(subcommand)]
        command: ErfCommands,
    },
}

#[derive(Subcommand)]
pub enum ErfCommands {
    /// List the resources in an archive
    List {
        /// Archive file
        archive: PathBuf,
    },

    /// Extract one resource from an archive
    Extract {
        /// Archive file
        archive: PathBuf,

        /// Resource to extract, as name.ext (e.g. "savenfo.res")
        resource: String,

        /// Output file (defaults to the resource name)
        #[arg(short, long)]
        destination: Option<PathBuf>,
    },

    /// Create an archive from resource files
    Create {
        /// Output archive; a .mod extension selects the MOD signature
        #[arg(short, long)]
        output: PathBuf,

        /// Resource files to pack; names and types come from the file names
        inputs: Vec<PathBuf>,
    },
}

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Convert {
                source,
                destination,
            } => convert::execute(source, destination),
            Commands::Erf { command } => command.execute(),
        }
    }
}

impl ErfCommands {
    /// Execute the selected ERF command.
    ///
    /// # Errors
    /// Returns an error if the underlying archive operation fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            ErfCommands::List { archive } => erf::list(archive),
            ErfCommands::Extract {
                archive,
                resource,
                destination,
            } => erf::extract(archive, resource, destination.as_deref()),
            ErfCommands::Create { output, inputs } => erf::create(output, inputs),
        }
    }
}
