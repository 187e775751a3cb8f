use aboutlibs_core::export::export_libraries;
use aboutlibs_core::keys::definition_fields;
use aboutlibs_core::overrides::load_modifications;
use aboutlibs_core::{ClassPathDetector, FileCache, JsonResources, Library, Libs, PrepareOptions};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Inspect the bundled-library metadata declared in a resource bundle
#[derive(Parser)]
#[command(name = "aboutlibs")]
#[command(version)]
struct Cli {
    /// Flat JSON resource bundle (`{"library_x_libraryName": "X", ...}`)
    #[arg(short, long)]
    resources: PathBuf,

    /// JSON file of field overrides keyed by library id
    #[arg(short, long)]
    modifications: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a resolution pass and print the result
    List {
        /// Resolution options as a JSON file
        #[arg(short, long)]
        options: Option<PathBuf>,

        /// Class paths present in the application, for auto-detection
        #[arg(long = "present", value_name = "CLASS_PATH")]
        present: Vec<String>,

        /// Application identity and version code for the detection cache
        #[arg(long, requires = "version_code")]
        app_id: Option<String>,

        #[arg(long)]
        version_code: Option<i32>,
    },
    /// Search libraries by name or id
    Search {
        term: String,

        /// Maximum number of results (-1 for all)
        #[arg(short, long, default_value = "-1", allow_hyphen_values = true)]
        limit: i32,
    },
    /// Write the full catalog as JSON into a directory
    Export { dir: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let resources = JsonResources::from_path(&cli.resources)?;
    let mut libs = Libs::new(&resources, &definition_fields(&resources.keys()));

    if let Some(path) = &cli.modifications {
        libs.modify_libraries(&load_modifications(path)?);
    }

    match cli.command {
        Commands::List {
            options,
            present,
            app_id,
            version_code,
        } => {
            let options = match options {
                Some(path) => PrepareOptions::from_path(&path)?,
                None => PrepareOptions::default(),
            };

            libs = libs.with_detector(ClassPathDetector::new(present)).with_app_version(version_code);
            if let Some(app_id) = app_id {
                libs = libs.with_cache(FileCache::for_app(&app_id)?);
            }

            print_libraries(&libs.prepare_libraries(&options));
        }
        Commands::Search { term, limit } => {
            print_libraries(&libs.find_library(&term, limit));
        }
        Commands::Export { dir } => {
            let path = export_libraries(&libs.libraries(), &dir)?;
            println!("Exported to {}", path.display());
        }
    }

    Ok(())
}

fn print_libraries(libraries: &[Library]) {
    for lib in libraries {
        let license = lib
            .license
            .as_ref()
            .map(|l| l.license_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("unknown license");
        println!(
            "{} {} ({}) - {}",
            lib.library_name, lib.library_version, lib.defined_name, license
        );
    }
    println!("Libraries: {}", libraries.len());
}
