use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use pkgscope::export::{self, ExportFormat};
use pkgscope::graph::PackageJson;
use pkgscope::parser::{ManifestReader, DEFAULT_MODULES_DIR};

mod logging;

#[derive(Parser)]
#[command(name = "pkgscope")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Inspect a project's package.json and installed dependency tree", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ProjectArgs {
    /// Project directory containing package.json
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Directory, relative to the project, holding installed packages
    #[arg(long, default_value = DEFAULT_MODULES_DIR)]
    modules_dir: PathBuf,
}

impl ProjectArgs {
    fn reader(&self) -> ManifestReader {
        ManifestReader::new(&self.path).with_modules_dir(&self.modules_dir)
    }

    fn read_root(&self) -> Result<PackageJson> {
        let mut pkg = PackageJson::root();
        pkg.read(&self.reader())
            .with_context(|| format!("reading dependency tree in {}", self.path.display()))?;
        Ok(pkg)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dependency tree
    Tree {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Export the dependency tree
    Export {
        #[command(flatten)]
        project: ProjectArgs,

        /// Output format: json or tree
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
    },
    /// Show one installed package
    Show {
        /// Package name as listed in node_modules
        name: String,

        #[command(flatten)]
        project: ProjectArgs,
    },
    /// List dependency cycles
    Cycles {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Some(Commands::Tree { project }) => {
            let pkg = project.read_root()?;
            export::export(ExportFormat::Tree, &pkg, &mut out)?;
        }
        Some(Commands::Export { project, format }) => {
            let pkg = project.read_root()?;
            export::export(format, &pkg, &mut out)?;
        }
        Some(Commands::Show { name, project }) => {
            let mut pkg = PackageJson::named(&name);
            pkg.read(&project.reader())
                .with_context(|| format!("reading manifest for {}", name))?;

            if !pkg.root_node().is_installed() {
                writeln!(out, "{} is not installed", name)?;
                return Ok(());
            }
            writeln!(
                out,
                "{}@{}",
                pkg.name().unwrap_or(&name),
                pkg.version().unwrap_or("(no version)")
            )?;
            for dep in pkg.manifest().declared_dependencies() {
                writeln!(out, "  {}", dep)?;
            }
        }
        Some(Commands::Cycles { project }) => {
            let graph = project.read_root()?.to_graph();
            let cycles = graph.detect_cycles();
            if cycles.is_empty() {
                writeln!(out, "No dependency cycles found")?;
            }
            for cycle in cycles {
                writeln!(out, "{}", cycle.cycle_path())?;
            }
        }
        Some(Commands::Version) => {
            writeln!(out, "pkgscope v{}", env!("CARGO_PKG_VERSION"))?;
        }
        None => {
            writeln!(out, "pkgscope - package.json dependency inspector")?;
            writeln!(out, "Run 'pkgscope tree' to print the dependency tree")?;
            writeln!(out, "Run 'pkgscope --help' for more information")?;
        }
    }

    Ok(())
}
