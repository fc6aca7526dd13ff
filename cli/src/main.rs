use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{ArgAction, Args, Parser, Subcommand};
use dashboard::config::{ApiConfig, CacheConfig, ConfigError, DEFAULT_API_BASE_URL};
use dashboard::models::{BannerUpload, PasswordChange, ResetPasswordRequest, SignInRequest};
use dashboard::resources::{
    ListParams, auth, banners, menu, offers, orders, permissions, preferences, referral, restaurants, roles,
    subscriptions, users,
};
use dashboard::session::{MemoryCookieStore, Session};
use dashboard::{ApiError, DataContext, QueryResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("backend returned no data")]
    NoData,
}

#[derive(Parser, Debug)]
#[command(name = "dashboard-cli", about = "Food delivery admin dashboard CLI")]
struct Cli {
    #[arg(long, env = "DASHBOARD_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    #[arg(long, env = "DASHBOARD_ACCESS_TOKEN")]
    access_token: Option<String>,

    #[arg(long, env = "DASHBOARD_REFRESH_TOKEN")]
    refresh_token: Option<String>,

    #[arg(long, env = "DASHBOARD_USER_ID")]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Session assembled from the credential flags, if an access token was given.
    fn session(&self) -> Option<Session> {
        let access_token = self.access_token.clone().filter(|t| !t.is_empty())?;
        Some(Session { access_token, refresh_token: self.refresh_token.clone(), user_id: self.user_id.clone() })
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange credentials for tokens and print them.
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long, env = "DASHBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Rotate the access token with the refresh token.
    Refresh,
    /// Show the signed-in admin.
    Me,
    ChangePassword {
        #[arg(long, env = "DASHBOARD_PASSWORD", hide_env_values = true)]
        current_password: String,
        #[arg(long, env = "DASHBOARD_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long, env = "DASHBOARD_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    Users(UsersCommand),
    Roles(RolesCommand),
    Permissions(PermissionsCommand),
    Restaurants(RestaurantsCommand),
    Menu(MenuCommand),
    Offers(OffersCommand),
    Banners(BannersCommand),
    Subscriptions(SubscriptionsCommand),
    Orders(OrdersCommand),
    Preferences(SettingsCommand),
    Referral(SettingsCommand),
}

/// Paging, sorting and filtering shared by list commands.
#[derive(Args, Debug, Clone)]
struct ListArgs {
    #[arg(long, default_value_t = 0)]
    page: u32,

    #[arg(long, default_value_t = 10)]
    size: u32,

    #[arg(long, help = "Sort expression, e.g. createdAt,desc")]
    sort: Option<String>,

    #[arg(long)]
    search: Option<String>,

    #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
}

impl ListArgs {
    fn params(&self) -> ListParams {
        let mut params = ListParams::default().page(self.page, self.size);
        if let Some(sort) = &self.sort {
            params = params.sort(sort.clone());
        }
        if let Some(search) = &self.search {
            params = params.search(search.clone());
        }
        for (name, value) in &self.filters {
            params = params.filter(name.clone(), value.clone());
        }
        params
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_owned(), value.to_owned())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List(ListArgs),
    Get {
        id: i64,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        data: String,
    },
    SetActive {
        id: i64,
        #[arg(long, action = ArgAction::Set)]
        active: bool,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct RolesCommand {
    #[command(subcommand)]
    command: RolesSubcommand,
}

#[derive(Subcommand, Debug)]
enum RolesSubcommand {
    List,
    Get {
        id: i64,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        data: String,
    },
    /// Replace the permissions granted by a role.
    AssignPermissions {
        id: i64,
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        permission_ids: Vec<i64>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct PermissionsCommand {
    #[command(subcommand)]
    command: PermissionsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PermissionsSubcommand {
    List,
}

#[derive(Args, Debug)]
struct RestaurantsCommand {
    #[command(subcommand)]
    command: RestaurantsSubcommand,
}

#[derive(Subcommand, Debug)]
enum RestaurantsSubcommand {
    List(ListArgs),
    Get {
        id: i64,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        data: String,
    },
    SetActive {
        id: i64,
        #[arg(long, action = ArgAction::Set)]
        active: bool,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct MenuCommand {
    #[command(subcommand)]
    command: MenuSubcommand,
}

#[derive(Subcommand, Debug)]
enum MenuSubcommand {
    List {
        restaurant_id: i64,
        #[command(flatten)]
        list: ListArgs,
    },
    Get {
        id: i64,
    },
    Create {
        restaurant_id: i64,
        #[arg(long)]
        data: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        data: String,
    },
    SetAvailable {
        id: i64,
        #[arg(long, action = ArgAction::Set)]
        available: bool,
    },
    Delete {
        id: i64,
    },
}

/// Commands for resources that only list, create, update and delete.
#[derive(Subcommand, Debug)]
enum CatalogSubcommand {
    List(ListArgs),
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct OffersCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Args, Debug)]
struct SubscriptionsCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Args, Debug)]
struct BannersCommand {
    #[command(subcommand)]
    command: BannersSubcommand,
}

#[derive(Subcommand, Debug)]
enum BannersSubcommand {
    List(ListArgs),
    /// Upload a new banner image.
    Create(BannerCreateArgs),
    Update {
        id: i64,
        #[arg(long)]
        data: String,
    },
    SetActive {
        id: i64,
        #[arg(long, action = ArgAction::Set)]
        active: bool,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct BannerCreateArgs {
    #[arg(long)]
    title: String,

    #[arg(long, help = "Image file to upload")]
    image: PathBuf,

    #[arg(long)]
    link_url: Option<String>,

    #[arg(long)]
    position: Option<i32>,

    #[arg(long, action = ArgAction::Set)]
    active: Option<bool>,
}

#[derive(Args, Debug)]
struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Subcommand, Debug)]
enum OrdersSubcommand {
    List(ListArgs),
    Get { id: i64 },
}

/// Singleton settings documents.
#[derive(Args, Debug)]
struct SettingsCommand {
    #[command(subcommand)]
    command: SettingsSubcommand,
}

#[derive(Subcommand, Debug)]
enum SettingsSubcommand {
    Show,
    /// Patch the document with a partial JSON object.
    Update {
        #[arg(long)]
        data: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_target(false).init();

    let cli = Cli::parse();
    let ctx = connect(&cli)?;

    match cli.command {
        Command::SignIn { email, password } => {
            let session = auth::sign_in(&ctx, &SignInRequest { email, password }).await?;
            print_json(&session_json(&session))
        }
        Command::Refresh => {
            let session = auth::refresh(&ctx).await?;
            print_json(&session_json(&session))
        }
        Command::Me => print_json(&*data(auth::current_admin(&ctx).await)?),
        Command::ChangePassword { current_password, new_password } => {
            auth::change_password(&ctx, &PasswordChange { current_password, new_password }).await?;
            Ok(())
        }
        Command::ForgotPassword { email } => Ok(auth::forgot_password(&ctx, &email).await?),
        Command::ResetPassword { token, new_password } => {
            Ok(auth::reset_password(&ctx, &ResetPasswordRequest { token, new_password }).await?)
        }
        Command::Users(cmd) => run_users(&ctx, cmd).await,
        Command::Roles(cmd) => run_roles(&ctx, cmd).await,
        Command::Permissions(cmd) => match cmd.command {
            PermissionsSubcommand::List => print_json(&*data(permissions::list(&ctx).await)?),
        },
        Command::Restaurants(cmd) => run_restaurants(&ctx, cmd).await,
        Command::Menu(cmd) => run_menu(&ctx, cmd).await,
        Command::Offers(cmd) => run_offers(&ctx, cmd.command).await,
        Command::Banners(cmd) => run_banners(&ctx, cmd).await,
        Command::Subscriptions(cmd) => run_subscriptions(&ctx, cmd.command).await,
        Command::Orders(cmd) => match cmd.command {
            OrdersSubcommand::List(list) => print_json(&*data(orders::list(&ctx, &list.params()).await)?),
            OrdersSubcommand::Get { id } => print_json(&*data(orders::get(&ctx, id).await)?),
        },
        Command::Preferences(cmd) => match cmd.command {
            SettingsSubcommand::Show => print_json(&*data(preferences::get(&ctx).await)?),
            SettingsSubcommand::Update { data } => {
                print_json(&preferences::update(&ctx, &parse_data(&data)?).await?)
            }
        },
        Command::Referral(cmd) => match cmd.command {
            SettingsSubcommand::Show => print_json(&*data(referral::get(&ctx).await)?),
            SettingsSubcommand::Update { data } => print_json(&referral::update(&ctx, &parse_data(&data)?).await?),
        },
    }
}

/// Build the data context from the global flags. Notices go to the log on
/// stderr so stdout stays machine-readable.
fn connect(cli: &Cli) -> Result<DataContext, CliError> {
    let base_url = cli.api_base_url.clone();
    let config = ApiConfig::from_lookup(|key| {
        if key == "DASHBOARD_API_BASE_URL" { Some(base_url.clone()) } else { std::env::var(key).ok() }
    })?;
    let cookies = match cli.session() {
        Some(session) => MemoryCookieStore::with_session(&session),
        None => MemoryCookieStore::new(),
    };
    Ok(DataContext::connect(&config, CacheConfig::from_env()?, Arc::new(cookies))?)
}

async fn run_users(ctx: &DataContext, cmd: UsersCommand) -> Result<(), CliError> {
    match cmd.command {
        UsersSubcommand::List(list) => print_json(&*data(users::list(ctx, &list.params()).await)?),
        UsersSubcommand::Get { id } => print_json(&*data(users::get(ctx, id).await)?),
        UsersSubcommand::Create { data } => print_json(&users::create(ctx, &parse_data(&data)?).await?),
        UsersSubcommand::Update { id, data } => print_json(&users::update(ctx, id, &parse_data(&data)?).await?),
        UsersSubcommand::SetActive { id, active } => print_json(&users::set_active(ctx, id, active).await?),
        UsersSubcommand::Delete { id } => Ok(users::delete(ctx, id).await?),
    }
}

async fn run_roles(ctx: &DataContext, cmd: RolesCommand) -> Result<(), CliError> {
    match cmd.command {
        RolesSubcommand::List => print_json(&*data(roles::list(ctx).await)?),
        RolesSubcommand::Get { id } => print_json(&*data(roles::get(ctx, id).await)?),
        RolesSubcommand::Create { data } => print_json(&roles::create(ctx, &parse_data(&data)?).await?),
        RolesSubcommand::Update { id, data } => print_json(&roles::update(ctx, id, &parse_data(&data)?).await?),
        RolesSubcommand::AssignPermissions { id, permission_ids } => {
            print_json(&roles::assign_permissions(ctx, id, &permission_ids).await?)
        }
        RolesSubcommand::Delete { id } => Ok(roles::delete(ctx, id).await?),
    }
}

async fn run_restaurants(ctx: &DataContext, cmd: RestaurantsCommand) -> Result<(), CliError> {
    match cmd.command {
        RestaurantsSubcommand::List(list) => print_json(&*data(restaurants::list(ctx, &list.params()).await)?),
        RestaurantsSubcommand::Get { id } => print_json(&*data(restaurants::get(ctx, id).await)?),
        RestaurantsSubcommand::Create { data } => print_json(&restaurants::create(ctx, &parse_data(&data)?).await?),
        RestaurantsSubcommand::Update { id, data } => {
            print_json(&restaurants::update(ctx, id, &parse_data(&data)?).await?)
        }
        RestaurantsSubcommand::SetActive { id, active } => {
            print_json(&restaurants::set_active(ctx, id, active).await?)
        }
        RestaurantsSubcommand::Delete { id } => Ok(restaurants::delete(ctx, id).await?),
    }
}

async fn run_menu(ctx: &DataContext, cmd: MenuCommand) -> Result<(), CliError> {
    match cmd.command {
        MenuSubcommand::List { restaurant_id, list } => {
            print_json(&*data(menu::list(ctx, restaurant_id, &list.params()).await)?)
        }
        MenuSubcommand::Get { id } => print_json(&*data(menu::get(ctx, id).await)?),
        MenuSubcommand::Create { restaurant_id, data } => {
            print_json(&menu::create(ctx, restaurant_id, &parse_data(&data)?).await?)
        }
        MenuSubcommand::Update { id, data } => print_json(&menu::update(ctx, id, &parse_data(&data)?).await?),
        MenuSubcommand::SetAvailable { id, available } => print_json(&menu::set_available(ctx, id, available).await?),
        MenuSubcommand::Delete { id } => Ok(menu::delete(ctx, id).await?),
    }
}

async fn run_offers(ctx: &DataContext, cmd: CatalogSubcommand) -> Result<(), CliError> {
    match cmd {
        CatalogSubcommand::List(list) => print_json(&*data(offers::list(ctx, &list.params()).await)?),
        CatalogSubcommand::Create { data } => print_json(&offers::create(ctx, &parse_data(&data)?).await?),
        CatalogSubcommand::Update { id, data } => print_json(&offers::update(ctx, id, &parse_data(&data)?).await?),
        CatalogSubcommand::Delete { id } => Ok(offers::delete(ctx, id).await?),
    }
}

async fn run_subscriptions(ctx: &DataContext, cmd: CatalogSubcommand) -> Result<(), CliError> {
    match cmd {
        CatalogSubcommand::List(list) => print_json(&*data(subscriptions::list(ctx, &list.params()).await)?),
        CatalogSubcommand::Create { data } => print_json(&subscriptions::create(ctx, &parse_data(&data)?).await?),
        CatalogSubcommand::Update { id, data } => {
            print_json(&subscriptions::update(ctx, id, &parse_data(&data)?).await?)
        }
        CatalogSubcommand::Delete { id } => Ok(subscriptions::delete(ctx, id).await?),
    }
}

async fn run_banners(ctx: &DataContext, cmd: BannersCommand) -> Result<(), CliError> {
    match cmd.command {
        BannersSubcommand::List(list) => print_json(&*data(banners::list(ctx, &list.params()).await)?),
        BannersSubcommand::Create(args) => {
            let upload = banner_upload(args).await?;
            print_json(&banners::create(ctx, upload).await?)
        }
        BannersSubcommand::Update { id, data } => print_json(&banners::update(ctx, id, &parse_data(&data)?).await?),
        BannersSubcommand::SetActive { id, active } => print_json(&banners::set_active(ctx, id, active).await?),
        BannersSubcommand::Delete { id } => Ok(banners::delete(ctx, id).await?),
    }
}

async fn banner_upload(args: BannerCreateArgs) -> Result<BannerUpload, CliError> {
    let image = tokio::fs::read(&args.image)
        .await
        .map_err(|source| CliError::ReadFile { path: args.image.clone(), source })?;
    let file_name = args
        .image
        .file_name()
        .map_or_else(|| "banner".to_owned(), |name| name.to_string_lossy().into_owned());
    Ok(BannerUpload {
        title: args.title,
        link_url: args.link_url,
        position: args.position,
        is_active: args.active,
        image,
        file_name,
        mime_type: guess_mime(&args.image).to_owned(),
    })
}

/// Content type for an image path, by extension.
fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Unwrap a cache read. Failures were already reported as notices.
fn data<T>(result: QueryResult<T>) -> Result<Arc<T>, CliError> {
    match (result.data, result.error) {
        (Some(data), _) => Ok(data),
        (None, Some(err)) => Err(CliError::Api(err)),
        (None, None) => Err(CliError::NoData),
    }
}

fn parse_data<T: DeserializeOwned>(raw: &str) -> Result<T, CliError> {
    Ok(serde_json::from_str(raw)?)
}

fn session_json(session: &Session) -> serde_json::Value {
    json!({
        "accessToken": session.access_token,
        "refreshToken": session.refresh_token,
        "userId": session.user_id,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
