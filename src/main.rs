#[macro_use]
extern crate log;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use filedash::config::{self, Config};
use filedash::{
    actions::UploadSource, auth, upload::UploadPanel, Client, Coordinator, Dialog, FileId,
    LoadState, SearchFilter, Session, ViewState,
};

/// browse and manage files kept on a filedash storage backend
#[derive(Parser, Debug)]
#[clap(name ="filedash", author, version = env!("GIT_VERSION"), about, long_about = None)]
struct Options {
    /// enable debugging logs
    #[clap(short, long, action=ArgAction::Count)]
    debug: u8,

    /// path to the client config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// backend url, overrides the one from the config file
    #[clap(short, long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// log in and keep the token for later commands
    Login(Credentials),
    /// create a new account
    Register(Credentials),
    /// forget the stored token
    Logout,
    /// list files, optionally filtered
    Ls(ListOptions),
    /// upload a local file
    Upload(UploadOptions),
    /// delete a file
    Rm(FileOptions),
    /// rename a file
    Mv(RenameOptions),
    /// get a temporary public link to a file
    Share(FileOptions),
    /// show the account summary
    Whoami,
}

#[derive(Args, Debug)]
struct Credentials {
    #[clap(short, long)]
    email: String,

    #[clap(short, long)]
    password: String,
}

#[derive(Args, Debug)]
struct ListOptions {
    /// match on the file name
    #[clap(short, long)]
    name: Option<String>,

    /// upload date in the format dd-mm-yyyy
    #[clap(long)]
    date: Option<String>,

    /// content type: all, pdf, image or document
    #[clap(short = 't', long = "type", default_value_t = String::from("all"))]
    content_type: String,

    /// page to show, starting at 1
    #[clap(short, long, default_value_t = 1)]
    page: usize,
}

impl ListOptions {
    fn filter(&self) -> Result<SearchFilter> {
        let filter = SearchFilter::from_form(
            self.name.as_deref().unwrap_or_default(),
            self.date.as_deref().unwrap_or_default(),
            &self.content_type,
        )?;

        Ok(filter)
    }
}

#[derive(Args, Debug)]
struct UploadOptions {
    /// file to upload
    path: PathBuf,
}

#[derive(Args, Debug)]
struct FileOptions {
    /// file id as shown by ls
    id: String,
}

#[derive(Args, Debug)]
struct RenameOptions {
    /// file id as shown by ls
    id: String,

    /// new file name
    name: String,
}

fn main() -> Result<()> {
    let opts = Options::parse();

    simple_logger::SimpleLogger::new()
        .with_utc_timestamps()
        .with_level({
            match opts.debug {
                0 => log::LevelFilter::Warn,
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            }
        })
        .with_module_level("reqwest", log::LevelFilter::Warn)
        .with_module_level("hyper", log::LevelFilter::Warn)
        .init()?;

    let mut cfg = match &opts.config {
        Some(path) => config::parse_config(path).context("failed to load config")?,
        None => Config::default(),
    };
    if let Some(url) = opts.url {
        cfg.base_url = url;
    }
    cfg.validate().context("invalid config")?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cfg, opts.command))
}

async fn run(cfg: Config, command: Commands) -> Result<()> {
    let session = match &cfg.token_file {
        Some(path) => load_token(path).await?,
        None => Session::new(),
    };
    let client = Client::new(&cfg, session).context("failed to create client")?;

    match command {
        Commands::Login(creds) => {
            auth::login(&client, &creds.email, &creds.password)
                .await
                .context("login failed")?;
            store_token(&cfg, &client).await?;
            println!("logged in as {}", creds.email);
        }
        Commands::Register(creds) => {
            auth::register(&client, &creds.email, &creds.password)
                .await
                .context("registration failed")?;
            println!("account created, you can log in now");
        }
        Commands::Logout => {
            auth::logout(&client);
            store_token(&cfg, &client).await?;
            println!("logged out");
        }
        Commands::Ls(opts) => list(&cfg, client, opts).await?,
        Commands::Upload(opts) => {
            let source = UploadSource::from_path(&opts.path)
                .await
                .with_context(|| format!("failed to read '{}'", opts.path.display()))?;
            let coord = Coordinator::from_config(Arc::new(client.clone()), &cfg);
            let mut panel = UploadPanel::new(Arc::new(client));
            panel.select(source);

            let receipt = panel
                .upload(|| async {
                    coord.notify_uploaded().await;
                })
                .await;
            if let Some(status) = panel.status() {
                println!("{}", status);
            }
            let receipt = receipt.context("upload failed")?;
            if let Some(name) = receipt.filename {
                println!("stored as {}", name);
            }
            print_view(&coord.snapshot());
        }
        Commands::Rm(opts) => {
            let coord = Coordinator::from_config(Arc::new(client), &cfg);
            coord.open(Dialog::Delete, FileId::new(opts.id));
            coord.confirm_delete().await.context("delete failed")?;
            print_view(&coord.snapshot());
        }
        Commands::Mv(opts) => {
            let coord = Coordinator::from_config(Arc::new(client), &cfg);
            coord.open(Dialog::Rename, FileId::new(opts.id));
            coord
                .confirm_rename(&opts.name)
                .await
                .context("rename failed")?;
            print_view(&coord.snapshot());
        }
        Commands::Share(opts) => {
            let coord = Coordinator::from_config(Arc::new(client), &cfg);
            coord.open(Dialog::Share, FileId::new(opts.id));
            let link = coord.confirm_share().await.context("share failed")?;
            println!("{}", link.public_url);
            println!("expires at {}", link.expires_at.to_rfc3339());
        }
        Commands::Whoami => {
            let summary = filedash::query::user_summary(&client)
                .await
                .context("failed to get account summary")?;
            println!("email:        {}", summary.email);
            match summary.total_files {
                Some(total) => println!("total files:  {}", total),
                None => println!("total files:  unknown"),
            }
            println!(
                "storage used: {}",
                filedash::models::display_size(summary.storage_used)
            );
        }
    }

    Ok(())
}

async fn list(cfg: &Config, client: Client, opts: ListOptions) -> Result<()> {
    let filter = opts.filter()?;
    let page = opts.page.saturating_sub(1);
    let coord = Coordinator::from_config(Arc::new(client), cfg);

    if filter.is_empty() && page == 0 {
        coord.mount().await;
    } else {
        coord.set_query(filter, page).await;
    }

    let view = coord.snapshot();
    print_view(&view);
    if view.state == LoadState::Failed {
        anyhow::bail!("listing failed");
    }

    Ok(())
}

fn print_view(view: &ViewState) {
    if let Some(error) = &view.error {
        eprintln!("{}", error);
        return;
    }

    if let Some(summary) = &view.summary {
        println!(
            "{}: {} files, {} used",
            summary.email,
            view.total_files,
            filedash::models::display_size(summary.storage_used)
        );
    }

    if view.files.is_empty() {
        println!("no files found");
        return;
    }

    println!(
        "{:<24} {:<40} {:>12} {:<24} {}",
        "ID", "NAME", "SIZE", "TYPE", "UPLOADED"
    );
    for file in &view.files {
        println!(
            "{:<24} {:<40} {:>12} {:<24} {}",
            file.id,
            file.display_name(),
            file.display_size(),
            file.content_type,
            file.uploaded_at.format("%d-%m-%Y %H:%M")
        );
    }
    println!("page {} of {}", view.page + 1, view.page_count());
}

async fn load_token(path: &Path) -> Result<Session> {
    match tokio::fs::read_to_string(path).await {
        Ok(token) if !token.trim().is_empty() => Ok(Session::with_token(token.trim())),
        Ok(_) => Ok(Session::new()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Session::new()),
        Err(err) => {
            Err(err).with_context(|| format!("failed to read token file '{}'", path.display()))
        }
    }
}

async fn store_token(cfg: &Config, client: &Client) -> Result<()> {
    let path = match &cfg.token_file {
        Some(path) => path,
        None => {
            warn!("no token file configured, the session ends with this command");
            return Ok(());
        }
    };

    match client.session().token() {
        Some(token) => tokio::fs::write(path, token)
            .await
            .with_context(|| format!("failed to write token file '{}'", path.display()))?,
        None => match tokio::fs::remove_file(path).await {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
                return Err(err)
                    .with_context(|| format!("failed to remove token file '{}'", path.display()))
            }
            _ => {}
        },
    }
    debug!("token file '{}' updated", path.display());

    Ok(())
}
