use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ipfs_storage::config;
use ipfs_storage::storage::StorageManager;

const USAGE: &str = "Usage: ipfs-storage [--config <file>] <command> [args]

Commands:
  put <name> <file>    upload a local file
  get <name> [out]     download a file (stdout when out is omitted)
  rm <name>            delete a file
  stat <name>          show file information
  has <name>           check whether a file exists
  url <name>           print the public URL of a file
  upload-url           print the upload endpoint
  drivers              list registered driver types";

/// Parsed command line / 命令行参数
struct Cli {
    config: PathBuf,
    command: String,
    args: Vec<String>,
}

fn parse_args() -> Result<Option<Cli>> {
    let mut config_path = None;
    let mut rest = Vec::new();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args.next().ok_or_else(|| anyhow!("--config needs a value"))?;
                config_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Ok(None),
            "-V" | "--version" => {
                println!("ipfs-storage {} (built {})", env!("CARGO_PKG_VERSION"), env!("BUILD_TIME"));
                std::process::exit(0);
            }
            _ => rest.push(arg),
        }
    }

    if rest.is_empty() {
        return Ok(None);
    }
    let command = rest.remove(0);

    Ok(Some(Cli {
        config: config_path.unwrap_or_else(config::default_config_path),
        command,
        args: rest,
    }))
}

fn arg<'a>(args: &'a [String], idx: usize, what: &str) -> Result<&'a str> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing <{}>\n\n{}", what, USAGE))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipfs_storage=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = match parse_args()? {
        Some(cli) => cli,
        None => {
            println!("{}", USAGE);
            return Ok(());
        }
    };

    // Load configuration / 加载配置
    let app_config = config::load_config(&cli.config)?;

    let manager = StorageManager::new(app_config.driver_context()?);
    ipfs_storage::register_storage_drivers(&manager).await?;

    if cli.command == "drivers" {
        for driver_type in manager.list_driver_types().await {
            let marker = if driver_type == app_config.driver { " (configured)" } else { "" };
            println!("{}{}", driver_type, marker);
        }
        return Ok(());
    }

    let driver = manager.instance(&app_config.driver).await?;

    let args = &cli.args;
    match cli.command.as_str() {
        "put" => {
            let name = arg(args, 0, "name")?;
            let file = arg(args, 1, "file")?;
            let content = tokio::fs::read(file)
                .await
                .with_context(|| format!("Failed to read {}", file))?;
            let result = driver.store(name, Bytes::from(content), false, None).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "get" => {
            let name = arg(args, 0, "name")?;
            let content = driver.fetch(name, false).await?;
            match args.get(1) {
                Some(out) => tokio::fs::write(out, &content)
                    .await
                    .with_context(|| format!("Failed to write {}", out))?,
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&content).await?;
                    stdout.flush().await?;
                }
            }
        }
        "rm" => {
            let name = arg(args, 0, "name")?;
            let deleted = driver.delete(name, false).await?;
            println!("{}", deleted);
        }
        "stat" => {
            let name = arg(args, 0, "name")?;
            match driver.info(name, false, None).await? {
                Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
                None => bail!("File not found: {}", name),
            }
        }
        "has" => {
            let name = arg(args, 0, "name")?;
            println!("{}", driver.exists(name, false).await?);
        }
        "url" => {
            let name = arg(args, 0, "name")?;
            println!("{}", driver.url(name, false, None));
        }
        "upload-url" => println!("{}", driver.upload_endpoint()),
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }

    Ok(())
}
