//! `quill-admin`: command-line front-end for the Quill content backend.
//!
//! ```bash
//! quill-admin login --email admin@example.com
//! quill-admin list blog --search launch
//! quill-admin edit blog launch-day --publish --set meta_title="Launch day"
//! quill-admin delete tag 4
//! ```

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use quill_admin::{AdminApp, DeleteOutcome, EditSession, SubmitOutcome, Toast, ToastLevel};
use quill_client::{ClientConfig, RequestBody};
use quill_core::error::CoreError;
use quill_core::models::{
    Blog, CreateEditor, CreateTag, EditableRecord, Editor, Industry, LoginRequest, Media, Project,
    Resource, Service, Tag,
};
use quill_core::pagination::ListParams;
use quill_core::payload::{Attachment, FileField, FormPayload};
use quill_core::roles::Role;
use quill_core::types::RecordId;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;

#[derive(Parser)]
#[command(name = "quill-admin")]
#[command(about = "Content administration for the Quill CMS backend", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session token
    ///
    /// The password is read from `QUILL_PASSWORD`, or from stdin.
    Login {
        #[arg(long)]
        email: String,

        /// Token from the CAPTCHA widget, required when `CAPTCHA_SITE_KEY` is set
        #[arg(long)]
        captcha_token: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the role of the stored session
    Whoami,

    /// List a collection
    List {
        kind: ResourceKind,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        search: Option<String>,

        /// Only published (`true`) or only drafts (`false`)
        #[arg(long)]
        published: Option<bool>,
    },

    /// Print one record as JSON
    Show { kind: FormKind, slug: String },

    /// Edit a record and save only what changed
    Edit {
        kind: FormKind,
        slug: String,

        #[command(flatten)]
        changes: FieldArgs,
    },

    /// Create a record from field values
    Create {
        kind: FormKind,

        #[command(flatten)]
        changes: FieldArgs,
    },

    /// Delete a record (asks for confirmation)
    Delete {
        kind: ResourceKind,
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Upload a file to the media library
    Upload {
        #[arg(value_name = "PATH")]
        path: PathBuf,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        alt: Option<String>,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        command: TagCommand,
    },

    /// Manage editor accounts (admins only)
    Editor {
        #[command(subcommand)]
        command: EditorCommand,
    },
}

#[derive(Subcommand)]
enum TagCommand {
    Create { name: String },
}

#[derive(Subcommand)]
enum EditorCommand {
    /// Create an account. The password is read from `QUILL_EDITOR_PASSWORD`.
    Create {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        #[arg(long, value_enum, default_value = "editor")]
        role: RoleArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ResourceKind {
    Blog,
    Service,
    Industry,
    Project,
    Tag,
    Media,
    Editor,
}

/// Resources edited through the form pipeline.
#[derive(Clone, Copy, ValueEnum)]
enum FormKind {
    Blog,
    Service,
    Industry,
    Project,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    Editor,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::Editor => Role::Editor,
        }
    }
}

#[derive(clap::Args)]
struct FieldArgs {
    /// `field=value`, stored as a string. Dotted paths reach into sections.
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    set: Vec<String>,

    /// `field=json`, for numbers, lists and whole sections
    #[arg(long = "set-json", value_name = "FIELD=JSON")]
    set_json: Vec<String>,

    #[arg(long, conflicts_with = "unpublish")]
    publish: bool,

    #[arg(long)]
    unpublish: bool,

    /// `form_field=path`, e.g. `og_image_file=cover.png`
    #[arg(long = "attach", value_name = "FIELD=PATH")]
    attach: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill_admin=info,quill_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // --- Configuration ---
    let config = ClientConfig::from_env()?;
    tracing::debug!(api = %config.api_base_url, "Loaded client configuration");

    let app = AdminApp::from_config(config)?;
    let mut toasts = app.toasts().subscribe();

    let result = run(&app, cli.command).await;
    print_toasts(&mut toasts);
    result
}

async fn run(app: &AdminApp, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login {
            email,
            captcha_token,
        } => {
            let password = match std::env::var("QUILL_PASSWORD") {
                Ok(password) => password,
                Err(_) => prompt("Password: ")?,
            };
            let session = app
                .auth()
                .login(&LoginRequest {
                    email,
                    password,
                    captcha_token,
                })
                .await?;
            println!("Logged in as {}", session.role);
        }
        Command::Logout => {
            app.auth().logout()?;
            println!("Logged out");
        }
        Command::Whoami => match app.auth().current()? {
            Some(session) => println!("{}", session.role),
            None => println!("Not logged in"),
        },
        Command::List {
            kind,
            page,
            search,
            published,
        } => {
            let params = ListParams {
                page,
                search,
                published,
            };
            match kind {
                ResourceKind::Blog => list::<Blog>(app, params).await?,
                ResourceKind::Service => list::<Service>(app, params).await?,
                ResourceKind::Industry => list::<Industry>(app, params).await?,
                ResourceKind::Project => list::<Project>(app, params).await?,
                ResourceKind::Tag => list::<Tag>(app, params).await?,
                ResourceKind::Media => list::<Media>(app, params).await?,
                ResourceKind::Editor => {
                    app.auth().require_admin()?;
                    list::<Editor>(app, params).await?
                }
            }
        }
        Command::Show { kind, slug } => match kind {
            FormKind::Blog => show::<Blog>(app, &slug).await?,
            FormKind::Service => show::<Service>(app, &slug).await?,
            FormKind::Industry => show::<Industry>(app, &slug).await?,
            FormKind::Project => show::<Project>(app, &slug).await?,
        },
        Command::Edit {
            kind,
            slug,
            changes,
        } => match kind {
            FormKind::Blog => save::<Blog>(app, Some(&slug), &changes).await?,
            FormKind::Service => save::<Service>(app, Some(&slug), &changes).await?,
            FormKind::Industry => save::<Industry>(app, Some(&slug), &changes).await?,
            FormKind::Project => save::<Project>(app, Some(&slug), &changes).await?,
        },
        Command::Create { kind, changes } => match kind {
            FormKind::Blog => save::<Blog>(app, None, &changes).await?,
            FormKind::Service => save::<Service>(app, None, &changes).await?,
            FormKind::Industry => save::<Industry>(app, None, &changes).await?,
            FormKind::Project => save::<Project>(app, None, &changes).await?,
        },
        Command::Delete { kind, id, yes } => {
            let id = RecordId::from(id);
            match kind {
                ResourceKind::Blog => delete::<Blog>(app, id, yes).await?,
                ResourceKind::Service => delete::<Service>(app, id, yes).await?,
                ResourceKind::Industry => delete::<Industry>(app, id, yes).await?,
                ResourceKind::Project => delete::<Project>(app, id, yes).await?,
                ResourceKind::Tag => delete::<Tag>(app, id, yes).await?,
                ResourceKind::Media => delete::<Media>(app, id, yes).await?,
                ResourceKind::Editor => {
                    app.auth().require_admin()?;
                    delete::<Editor>(app, id, yes).await?
                }
            }
        }
        Command::Upload { path, title, alt } => {
            let mut payload = FormPayload::new()
                .text("title", title.unwrap_or_default())
                .text("alt_text", alt.unwrap_or_default());
            payload.attach(read_attachment(FileField::MediaFile, &path).await?);
            let media: Media = app
                .query::<Media>()
                .create(RequestBody::Multipart(payload))
                .await?;
            println!("Uploaded {} ({})", media.file, media.id);
        }
        Command::Tag {
            command: TagCommand::Create { name },
        } => {
            let tag = CreateTag { name };
            tag.validate().map_err(CoreError::from)?;
            let created = app.query::<Tag>().create(RequestBody::json(&tag)?).await?;
            println!("Created tag {} ({})", created.name, created.id);
        }
        Command::Editor {
            command:
                EditorCommand::Create {
                    email,
                    username,
                    role,
                },
        } => {
            let editors = app.editors()?;
            let password = std::env::var("QUILL_EDITOR_PASSWORD")
                .context("QUILL_EDITOR_PASSWORD must be set")?;
            let input = CreateEditor {
                email,
                username,
                password,
                role: role.into(),
            };
            input.validate().map_err(CoreError::from)?;
            let created = editors.create(RequestBody::json(&input)?).await?;
            println!("Created {} account for {}", created.role, created.email);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn list<R: Resource>(app: &AdminApp, params: ListParams) -> anyhow::Result<()> {
    let rows = app.list_page::<R>(params).rows().await?;
    if rows.is_empty() {
        println!("No {} found", R::ENTITY);
    }
    for row in rows {
        let status = match row.published {
            Some(true) => "published",
            Some(false) => "draft",
            None => "",
        };
        let slug = row.slug.unwrap_or_default();
        println!("{:>6}  {:<40}  {:<30}  {status}", row.id.to_string(), row.title, slug);
    }
    Ok(())
}

async fn show<R: Resource>(app: &AdminApp, slug: &str) -> anyhow::Result<()> {
    let record = app.query::<R>().by_slug(slug).await?;
    println!("{}", serde_json::to_string_pretty(record.as_ref())?);
    Ok(())
}

/// Open (or start) a form, apply the requested changes and submit.
async fn save<R: EditableRecord>(
    app: &AdminApp,
    slug: Option<&str>,
    changes: &FieldArgs,
) -> anyhow::Result<()> {
    let mut session: EditSession<R> = app.edit_session();
    match slug {
        Some(slug) => session.load(slug).await?,
        None => session.new_record(),
    }
    apply_changes(&mut session, changes).await?;

    match session.submit().await {
        SubmitOutcome::Saved(record) => {
            println!("Saved {} {}", R::ENTITY, record.id());
            Ok(())
        }
        SubmitOutcome::NothingToSave => Ok(()),
        SubmitOutcome::Invalid(failure) => Err(anyhow!(
            "Not saved: `{}` on the {} tab is invalid",
            failure.field,
            failure.tab
        )),
        SubmitOutcome::Failed(_) => bail!("Not saved"),
    }
}

async fn apply_changes<R: EditableRecord>(
    session: &mut EditSession<R>,
    changes: &FieldArgs,
) -> anyhow::Result<()> {
    for pair in &changes.set {
        let (field, value) = split_pair(pair)?;
        session.set_field(field, Value::String(value.to_string()))?;
    }
    for pair in &changes.set_json {
        let (field, json) = split_pair(pair)?;
        let value: Value =
            serde_json::from_str(json).with_context(|| format!("Invalid JSON for `{field}`"))?;
        session.set_field(field, value)?;
    }
    if changes.publish || changes.unpublish {
        session.set_field("published", Value::Bool(changes.publish))?;
    }
    for pair in &changes.attach {
        let (name, path) = split_pair(pair)?;
        let field = FileField::from_form_name(name)
            .ok_or_else(|| anyhow!("Unknown file field `{name}`"))?;
        session.attach(read_attachment(field, Path::new(path)).await?)?;
    }
    Ok(())
}

async fn delete<R: Resource>(app: &AdminApp, id: RecordId, yes: bool) -> anyhow::Result<()> {
    let mut dialog = app.delete_dialog::<R>();
    dialog.open_for(id.clone());

    let confirmed = yes || {
        let answer = prompt(&format!("Delete {} {id}? This cannot be undone. [y/N] ", R::ENTITY))?;
        matches!(answer.trim(), "y" | "Y" | "yes")
    };
    if !confirmed {
        dialog.cancel();
        println!("Cancelled");
        return Ok(());
    }

    match dialog.confirm().await {
        DeleteOutcome::Deleted(_) | DeleteOutcome::NotOpen => Ok(()),
        DeleteOutcome::Failed(_) => bail!("Not deleted"),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn split_pair(pair: &str) -> anyhow::Result<(&str, &str)> {
    pair.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| anyhow!("Expected FIELD=VALUE, got `{pair}`"))
}

async fn read_attachment(field: FileField, path: &Path) -> anyhow::Result<Attachment> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".into());
    Ok(Attachment::new(field, file_name, bytes))
}

fn prompt(label: &str) -> anyhow::Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{label}")?;
    stderr.flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_toasts(rx: &mut broadcast::Receiver<Toast>) {
    while let Ok(toast) = rx.try_recv() {
        let tag = match toast.level {
            ToastLevel::Success => "ok",
            ToastLevel::Error => "error",
            ToastLevel::Info => "info",
        };
        eprintln!("[{tag}] {}", toast.message);
    }
}
