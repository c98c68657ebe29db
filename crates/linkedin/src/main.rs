use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod logger;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use linkedin_core::auth::{
    CredentialProvider, CredentialSource, CredentialStore, EnvCredentials, FileCredentialStore,
    StoredCredentials,
};
use linkedin_core::config::ClientConfig;
use linkedin_core::rest::{Distribution, MutationOutcome, PostAction};
use linkedin_core::services::{CreatePostOptions, PostService, PostUpdateOptions, ProfileService};
use linkedin_core::{LinkedInClient, LinkedInTools};
use serde_json::Value;

const DEFAULT_PROFILE: &str = "default";

#[derive(Parser, Debug)]
#[command(author, version, about = "LinkedIn posting tools for the terminal")]
struct Cli {
    /// Profile name for stored credentials
    #[arg(long, global = true, default_value = DEFAULT_PROFILE)]
    profile: String,
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long = "log-level", global = true)]
    log_level: Option<log::Level>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage stored credentials
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Show the profile of the authenticated member
    Me(MeArgs),
    /// Post operations
    #[command(subcommand)]
    Post(PostCommand),
    /// List or invoke the agent tools directly
    #[command(subcommand)]
    Tools(ToolsCommand),
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Store an access token or a pre-built header set for the profile
    Login(LoginArgs),
    /// Forget stored credentials for the profile
    Logout,
    /// Show where credentials for the profile come from
    Status,
}

#[derive(Args, Debug)]
struct LoginArgs {
    /// OAuth access token with w_member_social or w_organization_social scope
    #[arg(long = "access-token", required_unless_present = "headers_file")]
    access_token: Option<String>,
    /// JSON file holding the complete header set to send with every request
    #[arg(long = "headers-file", conflicts_with = "access_token")]
    headers_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MeArgs {
    /// Output raw JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum PostCommand {
    /// Publish a new post
    Create(PostCreateArgs),
    /// Delete a post by URN
    Delete(PostDeleteArgs),
    /// Change fields of an existing post
    Update(PostUpdateArgs),
}

#[derive(Args, Debug)]
struct PostCreateArgs {
    /// Author URN (urn:li:person:{id} or urn:li:organization:{id})
    #[arg(long)]
    author: String,
    /// Post text; mentions and hashtags are passed through
    #[arg(long)]
    commentary: String,
    /// PUBLIC or CONNECTIONS
    #[arg(long, default_value = "PUBLIC")]
    visibility: String,
    /// PUBLISHED, DRAFT, PUBLISH_REQUESTED or PUBLISH_FAILED
    #[arg(long = "lifecycle-state", default_value = "PUBLISHED")]
    lifecycle_state: String,
    /// Distribution settings as a JSON object (defaults to the main feed)
    #[arg(long)]
    distribution: Option<String>,
    /// Prevent other members from resharing the post
    #[arg(long = "disable-reshare")]
    disable_reshare: bool,
    /// Output raw JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct PostDeleteArgs {
    /// Post URN (urn:li:share:{id} or urn:li:ugcPost:{id})
    post_urn: String,
}

#[derive(Args, Debug)]
struct PostUpdateArgs {
    /// Post URN (urn:li:share:{id} or urn:li:ugcPost:{id})
    post_urn: String,
    #[arg(long)]
    commentary: Option<String>,
    #[arg(long = "call-to-action-label")]
    content_call_to_action_label: Option<String>,
    #[arg(long = "landing-page")]
    content_landing_page: Option<String>,
    #[arg(long = "lifecycle-state")]
    lifecycle_state: Option<String>,
    /// Name of the sponsored content
    #[arg(long = "ad-name")]
    ad_context_name: Option<String>,
    /// Status of the sponsored content
    #[arg(long = "ad-status")]
    ad_context_status: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ToolsCommand {
    /// Print the tool definitions as JSON
    List,
    /// Invoke a tool with JSON arguments and print its JSON result
    Call(ToolCallArgs),
}

#[derive(Args, Debug)]
struct ToolCallArgs {
    /// Tool name (create_post, get_your_info, delete_post, update_post)
    name: String,
    /// Arguments as a JSON object
    #[arg(long, default_value = "{}")]
    args: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.log_level);

    let profile = cli.profile;
    match cli.command {
        Commands::Auth(cmd) => match cmd {
            AuthCommand::Login(args) => auth_login(&profile, args)?,
            AuthCommand::Logout => auth_logout(&profile)?,
            AuthCommand::Status => auth_status(&profile)?,
        },
        Commands::Me(args) => user_me(&profile, args).await?,
        Commands::Post(cmd) => match cmd {
            PostCommand::Create(args) => post_create(&profile, args).await?,
            PostCommand::Delete(args) => post_delete(&profile, args).await?,
            PostCommand::Update(args) => post_update(&profile, args).await?,
        },
        Commands::Tools(cmd) => match cmd {
            ToolsCommand::List => tools_list()?,
            ToolsCommand::Call(args) => tools_call(&profile, args).await?,
        },
    }
    Ok(())
}

/// Wire the credential provider and client together. Environment credentials
/// take precedence over the stored profile.
fn build_client(profile: &str) -> Result<LinkedInClient> {
    let provider: Arc<dyn CredentialProvider> = if EnvCredentials::is_configured() {
        Arc::new(EnvCredentials::new())
    } else {
        let store = FileCredentialStore::open_default()
            .context("unable to initialise credential store")?;
        Arc::new(StoredCredentials::new(store, profile))
    };

    LinkedInClient::new(ClientConfig::from_env(), provider)
        .context("failed to build LinkedIn client")
}

fn auth_login(profile: &str, args: LoginArgs) -> Result<()> {
    let source = match (args.access_token, args.headers_file) {
        (_, Some(path)) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let headers: BTreeMap<String, String> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a JSON object of strings", path.display()))?;
            CredentialSource::PrebuiltHeaders(headers)
        }
        (Some(token), None) if !token.trim().is_empty() => {
            CredentialSource::bearer(token.trim())
        }
        _ => bail!("provide a non-empty --access-token or --headers-file"),
    };

    let store = FileCredentialStore::open_default()
        .context("unable to initialise credential store")?;
    store
        .save(profile, &source)
        .context("failed to store credentials")?;
    println!("Stored {} for profile '{}'.", source.describe(), profile);
    Ok(())
}

fn auth_logout(profile: &str) -> Result<()> {
    let store = FileCredentialStore::open_default()
        .context("unable to initialise credential store")?;
    store
        .delete(profile)
        .context("failed to delete credentials")?;
    println!("Deleted credentials for profile '{}'.", profile);
    Ok(())
}

fn auth_status(profile: &str) -> Result<()> {
    if EnvCredentials::is_configured() {
        let source = EnvCredentials::new()
            .credentials()
            .context("environment credentials are unusable")?;
        println!("Using {} from the environment.", source.describe());
        return Ok(());
    }

    let store = FileCredentialStore::open_default()
        .context("unable to initialise credential store")?;
    match store.load(profile)? {
        Some(stored) => println!(
            "Profile '{}': {} saved {}.",
            profile,
            stored.source.describe(),
            stored.saved_at.to_rfc3339()
        ),
        None => println!(
            "No credentials for profile '{}'. Run `linkedin auth login` or set LINKEDIN_ACCESS_TOKEN.",
            profile
        ),
    }
    Ok(())
}

async fn user_me(profile: &str, args: MeArgs) -> Result<()> {
    let service = ProfileService::new(build_client(profile)?);
    let info = service.me().await.context("failed to fetch profile info")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        render_profile(&info);
    }
    Ok(())
}

fn render_profile(info: &Value) {
    let field = |key: &str| info.get(key).and_then(Value::as_str);
    if let Some(sub) = field("sub") {
        println!("Member ID : {}", sub);
        println!("Author URN: urn:li:person:{}", sub);
    }
    if let Some(name) = field("name") {
        println!("Name      : {}", name);
    }
    if let Some(email) = field("email") {
        println!("Email     : {}", email);
    }
}

async fn post_create(profile: &str, args: PostCreateArgs) -> Result<()> {
    let distribution = args
        .distribution
        .as_deref()
        .map(|raw| serde_json::from_str::<Distribution>(raw))
        .transpose()
        .context("--distribution must be a JSON object")?;

    let options = CreatePostOptions {
        visibility: args.visibility,
        distribution,
        lifecycle_state: args.lifecycle_state,
        is_reshare_disabled: args.disable_reshare,
        ..CreatePostOptions::new(args.author, args.commentary)
    };

    let service = PostService::new(build_client(profile)?);
    let created = service
        .create(options)
        .await
        .context("failed to create post")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!("Created {}", created.post_urn);
        println!("{}", created.post_url);
    }
    Ok(())
}

async fn post_delete(profile: &str, args: PostDeleteArgs) -> Result<()> {
    let service = PostService::new(build_client(profile)?);
    let outcome = service
        .delete(&args.post_urn)
        .await
        .context("failed to delete post")?;
    render_outcome(&outcome)
}

async fn post_update(profile: &str, args: PostUpdateArgs) -> Result<()> {
    let options = PostUpdateOptions {
        commentary: args.commentary,
        content_call_to_action_label: args.content_call_to_action_label,
        content_landing_page: args.content_landing_page,
        lifecycle_state: args.lifecycle_state,
        ad_context_name: args.ad_context_name,
        ad_context_status: args.ad_context_status,
    };

    let service = PostService::new(build_client(profile)?);
    let outcome = service
        .update(&args.post_urn, options)
        .await
        .context("failed to update post")?;
    render_outcome(&outcome)
}

fn render_outcome(outcome: &MutationOutcome) -> Result<()> {
    match outcome {
        MutationOutcome::Applied(status) => {
            let verb = match status.status {
                PostAction::Deleted => "Deleted",
                PostAction::Updated => "Updated",
            };
            println!("{} {}", verb, status.post_urn);
        }
        MutationOutcome::Response(body) => {
            println!("{}", serde_json::to_string_pretty(body)?);
        }
    }
    Ok(())
}

fn tools_list() -> Result<()> {
    let client = LinkedInClient::without_credentials(ClientConfig::from_env())
        .context("failed to build LinkedIn client")?;
    let tools = LinkedInTools::new(client);
    println!("{}", serde_json::to_string_pretty(&tools.list_tools())?);
    Ok(())
}

async fn tools_call(profile: &str, args: ToolCallArgs) -> Result<()> {
    let arguments: Value =
        serde_json::from_str(&args.args).context("--args must be valid JSON")?;
    let tools = LinkedInTools::new(build_client(profile)?);
    let result = tools
        .call(&args.name, arguments)
        .await
        .with_context(|| format!("tool {} failed", args.name))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
