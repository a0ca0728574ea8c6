use clap::Parser;
use get_anycloud::install::{self, InstallOptions};
use get_anycloud::platform::Platform;
use get_anycloud::release::DEFAULT_BASE_URL;
use get_anycloud::runtime::RealRuntime;
use get_anycloud::stage::{self, DEFAULT_ALAN_BASE_URL, DEFAULT_ALAN_TAG, StageOptions};
use std::path::PathBuf;

/// get-anycloud - platform-resolving installer for the anycloud CLI
///
/// Detects the host platform, downloads the matching release archive into a
/// destination directory, and extracts it. Run with no arguments to install
/// the version this package was built for.
///
/// Exit codes: 0 success, 1 destination creation failed, 2 download failed,
/// 3 extraction failed.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    install: InstallArgs,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Stage the prebuilt alan toolchain into a build working directory
    Stage(StageArgs),
}

#[derive(clap::Args, Debug)]
struct InstallArgs {
    /// Destination directory for the release (must not already exist;
    /// also via GET_ANYCLOUD_DEST)
    #[arg(long, value_name = "PATH", default_value = "bin", env = "GET_ANYCLOUD_DEST")]
    dest: PathBuf,

    /// Release version to download (defaults to this package's version)
    #[arg(long, value_name = "VERSION", default_value = env!("CARGO_PKG_VERSION"))]
    tag: String,

    /// Release download base URL
    #[arg(long = "base-url", value_name = "URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Override the detected platform
    #[arg(long, value_enum, value_name = "PLATFORM")]
    platform: Option<Platform>,
}

#[derive(clap::Args, Debug)]
struct StageArgs {
    /// Build working directory (created if absent, reused if present)
    #[arg(long = "work-dir", value_name = "PATH", default_value = ".")]
    work_dir: PathBuf,

    /// alan release tag to stage
    #[arg(long, value_name = "VERSION", default_value = DEFAULT_ALAN_TAG)]
    tag: String,

    /// alan download base URL
    #[arg(long = "base-url", value_name = "URL", default_value = DEFAULT_ALAN_BASE_URL)]
    base_url: String,

    /// Override the detected platform
    #[arg(long, value_enum, value_name = "PLATFORM")]
    platform: Option<Platform>,
}

impl From<InstallArgs> for InstallOptions {
    fn from(args: InstallArgs) -> Self {
        Self {
            dest: args.dest,
            version: args.tag,
            base_url: args.base_url,
            platform: args.platform,
        }
    }
}

impl From<StageArgs> for StageOptions {
    fn from(args: StageArgs) -> Self {
        Self {
            work_dir: args.work_dir,
            tag: args.tag,
            base_url: args.base_url,
            platform: args.platform,
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    let code = match cli.command {
        Some(Commands::Stage(args)) => match stage::stage(runtime, args.into()).await {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{:#}", e);
                1
            }
        },
        None => match install::install(runtime, cli.install.into()).await {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{}", e);
                e.exit_code()
            }
        },
    };

    std::process::exit(code);
}
