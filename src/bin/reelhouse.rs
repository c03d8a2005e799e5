use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Datelike;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use reelhouse::admin::{
    ContactSubmissions, DashboardOverview, ImageUpload, LoginForm, PortfolioManager,
    SiteSettings, SETTING_KEYS,
};
use reelhouse::error::{Error, Result};
use reelhouse::notice::{Notice, Notices};
use reelhouse::scope::ViewScope;
use reelhouse::site::{self, ContactForm, GalleryState, PortfolioGallery};
use reelhouse::Reelhouse;

#[derive(Parser)]
#[clap(name = "reelhouse", version, about = "Studio website and admin dashboard from the terminal")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the public page, gallery included
    Preview,
    /// Send a message through the contact form
    Contact {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        phone: Option<String>,
        /// wedding, corporate, portrait or other
        #[clap(long)]
        event_type: Option<String>,
        #[clap(long)]
        message: String,
    },
    /// Sign in and work with the admin panels
    Admin {
        #[clap(long, env = "REELHOUSE_ADMIN_EMAIL")]
        email: String,
        #[clap(long, env = "REELHOUSE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        #[clap(subcommand)]
        panel: AdminCommand,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    Dashboard,
    #[clap(subcommand)]
    Portfolio(PortfolioCommand),
    #[clap(subcommand)]
    Messages(MessagesCommand),
    #[clap(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand)]
enum PortfolioCommand {
    List,
    Add {
        #[clap(long)]
        title: String,
        #[clap(long)]
        category: String,
        #[clap(long, parse(from_os_str))]
        image: Option<PathBuf>,
        #[clap(long)]
        youtube_url: Option<String>,
        #[clap(long)]
        video: bool,
    },
    Edit {
        id: Uuid,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        category: Option<String>,
        #[clap(long, parse(from_os_str))]
        image: Option<PathBuf>,
        #[clap(long)]
        youtube_url: Option<String>,
        #[clap(long)]
        video: Option<bool>,
    },
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt
        #[clap(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum MessagesCommand {
    List,
    View { id: Uuid },
    Delete {
        id: Uuid,
        #[clap(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    reelhouse::logging::init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e.notice_text());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<()> {
    let client = Reelhouse::from_env()?;

    match command {
        Command::Preview => preview(client).await,
        Command::Contact {
            name,
            email,
            phone,
            event_type,
            message,
        } => {
            let mut form = ContactForm::new(client);
            if let Err(e) = form.load_contact_phone().await {
                tracing::debug!("using default contact phone: {}", e);
            }

            {
                let fields = form.fields_mut();
                fields.name = name;
                fields.email = email;
                fields.phone = phone.unwrap_or_default();
                fields.event_type = event_type.unwrap_or_default();
                fields.message = message;
            }

            let result = form.submit().await;
            print_notices(form.notices_mut());
            result?;

            if let Some(confirmation) = form.confirmation() {
                println!("{}", confirmation.message());
                println!("{} ({})", confirmation.call_prompt(), confirmation.tel_href());
            }
            Ok(())
        }
        Command::Admin {
            email,
            password,
            panel,
        } => {
            sign_in(&client, email, password).await?;
            let result = admin(client.clone(), panel).await;
            if let Err(e) = client.auth().sign_out().await {
                tracing::warn!("sign out failed: {}", e);
            }
            result
        }
    }
}

async fn preview(client: Reelhouse) -> Result<()> {
    let hero = site::hero();
    println!("{}\n{}\n\n{}\n", hero.tagline, hero.name, hero.intro);

    let about = site::about();
    println!("## {}", about.heading);
    for paragraph in about.paragraphs {
        println!("{}\n", paragraph);
    }
    for stat in about.stats {
        println!("  {} {}", stat.number, stat.label);
    }

    println!("\n## Services");
    for service in site::services() {
        println!("- {}: {}", service.title, service.description);
    }

    println!("\n## Featured Work");
    let mut gallery = PortfolioGallery::new(client);
    match gallery.mount().await? {
        GalleryState::Ready(tiles) => {
            for tile in tiles {
                let marker = if tile.is_video { " [video]" } else { "" };
                println!("- {} ({}){}  {}", tile.title, tile.category, marker, tile.image);
            }
        }
        _ => println!("Portfolio coming soon"),
    }

    let footer = site::footer(chrono::Utc::now().year());
    println!("\n{}", footer.copyright);
    Ok(())
}

async fn sign_in(client: &Reelhouse, email: String, password: String) -> Result<()> {
    let mut form = LoginForm::new(client.clone());
    form.email = email;
    form.password = password;

    let result = form.submit().await;
    print_notices(form.notices_mut());
    result.map(|_| ())
}

async fn admin(client: Reelhouse, command: AdminCommand) -> Result<()> {
    let scope = ViewScope::new();

    match command {
        AdminCommand::Dashboard => {
            let mut overview = DashboardOverview::new(client, scope);
            overview.load().await?;
            for card in overview.cards() {
                println!("{:<16} {}", card.label, card.value);
            }
            Ok(())
        }
        AdminCommand::Portfolio(command) => portfolio(PortfolioManager::new(client, scope), command).await,
        AdminCommand::Messages(command) => messages(ContactSubmissions::new(client, scope), command).await,
        AdminCommand::Settings(command) => settings(SiteSettings::new(client, scope), command).await,
    }
}

async fn portfolio(mut manager: PortfolioManager, command: PortfolioCommand) -> Result<()> {
    let mounted = manager.mount().await;
    print_notices(manager.notices_mut());
    mounted?;

    let result = match command {
        PortfolioCommand::List => {
            for item in manager.items() {
                let state = if item.is_active { "" } else { " (hidden)" };
                println!("{}  #{} {} [{}]{}", item.id, item.display_order, item.title, item.category, state);
            }
            Ok(())
        }
        PortfolioCommand::Add {
            title,
            category,
            image,
            youtube_url,
            video,
        } => {
            let upload = match image {
                Some(path) => Some(ImageUpload::from_path(&path).await?),
                None => None,
            };

            let draft = &mut manager.open_new().draft;
            draft.title = title;
            draft.category = category;
            draft.youtube_url = youtube_url.unwrap_or_default();
            draft.is_video = video;
            if let Some(upload) = upload {
                draft.set_image(upload);
            }
            manager.submit().await
        }
        PortfolioCommand::Edit {
            id,
            title,
            category,
            image,
            youtube_url,
            video,
        } => {
            let upload = match image {
                Some(path) => Some(ImageUpload::from_path(&path).await?),
                None => None,
            };

            let draft = &mut manager.open_edit(id)?.draft;
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(category) = category {
                draft.category = category;
            }
            if let Some(url) = youtube_url {
                draft.youtube_url = url;
            }
            if let Some(video) = video {
                draft.is_video = video;
            }
            if let Some(upload) = upload {
                draft.set_image(upload);
            }
            manager.submit().await
        }
        PortfolioCommand::Delete { id, yes } => manager.delete(id, |prompt| yes || confirm(prompt)).await.map(|_| ()),
    };

    print_notices(manager.notices_mut());
    result
}

async fn messages(mut inbox: ContactSubmissions, command: MessagesCommand) -> Result<()> {
    let mounted = inbox.mount().await;
    print_notices(inbox.notices_mut());
    mounted?;

    let result = match command {
        MessagesCommand::List => {
            println!("{} unread", inbox.unread_count());
            for submission in inbox.submissions() {
                let marker = if submission.is_read { ' ' } else { '*' };
                println!(
                    "{} {}  {} <{}>  {}",
                    marker,
                    submission.id,
                    submission.name,
                    submission.email,
                    submission.received_on()
                );
            }
            Ok(())
        }
        MessagesCommand::View { id } => {
            let submission = inbox.view(id).await?;
            println!("From:    {} <{}>", submission.name, submission.email);
            if let Some(phone) = &submission.phone {
                println!("Phone:   {}", phone);
            }
            if let Some(event_type) = &submission.event_type {
                println!("Event:   {}", event_type);
            }
            println!("Received {}\n\n{}", submission.received_on(), submission.message);
            Ok(())
        }
        MessagesCommand::Delete { id, yes } => inbox.delete(id, |prompt| yes || confirm(prompt)).await.map(|_| ()),
    };

    print_notices(inbox.notices_mut());
    result
}

async fn settings(mut editor: SiteSettings, command: SettingsCommand) -> Result<()> {
    let mounted = editor.mount().await.map(|_| ());
    print_notices(editor.notices_mut());
    mounted?;

    match command {
        SettingsCommand::Show => {
            for key in SETTING_KEYS {
                println!("{:<14} {}", key, editor.settings().get(key).unwrap_or_default());
            }
            Ok(())
        }
        SettingsCommand::Set { key, value } => {
            let slot = editor
                .settings_mut()
                .field_mut(&key)
                .ok_or_else(|| Error::validation(format!("Unknown setting: {}", key)))?;
            *slot = value;

            let report = editor.save().await;
            print_notices(editor.notices_mut());
            report.map(|_| ())
        }
    }
}

fn confirm(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn print_notices(notices: &mut Notices) {
    for Notice { title, description, .. } in notices.drain() {
        println!("{}: {}", title, description);
    }
}
