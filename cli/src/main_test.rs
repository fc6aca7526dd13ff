use super::*;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["dashboard-cli", "--api-base-url", "http://backend.test"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("arguments should parse")
}

#[test]
fn list_args_become_list_params() {
    let cli = parse(&[
        "orders", "list", "--page", "2", "--size", "25", "--search", "pizza", "--filter", "status=PENDING", "--filter",
        "restaurantId=7",
    ]);
    let Command::Orders(OrdersCommand { command: OrdersSubcommand::List(list) }) = cli.command else {
        panic!("expected orders list");
    };
    let params = list.params();
    assert_eq!(params.page, 2);
    assert_eq!(params.size, 25);
    assert_eq!(params.search.as_deref(), Some("pizza"));
    assert_eq!(params.filters.get("status").map(String::as_str), Some("PENDING"));
    assert_eq!(params.filters.get("restaurantId").map(String::as_str), Some("7"));
}

#[test]
fn list_defaults_to_first_page_of_ten() {
    let cli = parse(&["users", "list"]);
    let Command::Users(UsersCommand { command: UsersSubcommand::List(list) }) = cli.command else {
        panic!("expected users list");
    };
    assert_eq!(list.params(), ListParams::default());
}

#[test]
fn filter_requires_key_value() {
    assert!(parse_filter("status").is_err());
    assert!(parse_filter("=PENDING").is_err());
    assert_eq!(parse_filter("q=a=b"), Ok(("q".to_owned(), "a=b".to_owned())));

    let result = Cli::try_parse_from(["dashboard-cli", "orders", "list", "--filter", "oops"]);
    assert!(result.is_err());
}

#[test]
fn credential_flags_seed_a_session() {
    let cli = parse(&["--access-token", "tok", "--user-id", "42", "me"]);
    let session = cli.session().expect("session");
    assert_eq!(session.access_token, "tok");
    assert_eq!(session.refresh_token, None);
    assert_eq!(session.user_id.as_deref(), Some("42"));
}

#[test]
fn empty_access_token_is_no_session() {
    let cli = parse(&["--access-token", "", "--user-id", "42", "me"]);
    assert!(cli.session().is_none());
}

#[test]
fn permission_ids_accept_a_comma_list() {
    let cli = parse(&["roles", "assign-permissions", "3", "--permission-ids", "1,2,5"]);
    let Command::Roles(RolesCommand { command: RolesSubcommand::AssignPermissions { id, permission_ids } }) =
        cli.command
    else {
        panic!("expected assign-permissions");
    };
    assert_eq!(id, 3);
    assert_eq!(permission_ids, vec![1, 2, 5]);
}

#[test]
fn set_active_takes_an_explicit_value() {
    let cli = parse(&["restaurants", "set-active", "9", "--active", "false"]);
    let Command::Restaurants(RestaurantsCommand { command: RestaurantsSubcommand::SetActive { id, active } }) =
        cli.command
    else {
        panic!("expected set-active");
    };
    assert_eq!(id, 9);
    assert!(!active);

    let missing = Cli::try_parse_from(["dashboard-cli", "restaurants", "set-active", "9"]);
    assert!(missing.is_err());
}

#[test]
fn menu_list_takes_restaurant_and_paging() {
    let cli = parse(&["menu", "list", "4", "--size", "50"]);
    let Command::Menu(MenuCommand { command: MenuSubcommand::List { restaurant_id, list } }) = cli.command else {
        panic!("expected menu list");
    };
    assert_eq!(restaurant_id, 4);
    assert_eq!(list.params().size, 50);
}

#[test]
fn image_mime_follows_extension() {
    assert_eq!(guess_mime(Path::new("hero.PNG")), "image/png");
    assert_eq!(guess_mime(Path::new("a/b/promo.jpeg")), "image/jpeg");
    assert_eq!(guess_mime(Path::new("banner.webp")), "image/webp");
    assert_eq!(guess_mime(Path::new("notes")), "application/octet-stream");
}

#[tokio::test]
async fn banner_upload_reads_the_image() {
    let path = std::env::temp_dir().join(format!("dashboard-cli-banner-{}.gif", std::process::id()));
    tokio::fs::write(&path, b"GIF89a").await.unwrap();

    let upload = banner_upload(BannerCreateArgs {
        title: "Summer".to_owned(),
        image: path.clone(),
        link_url: None,
        position: Some(1),
        active: Some(true),
    })
    .await
    .unwrap();
    tokio::fs::remove_file(&path).await.unwrap();

    assert_eq!(upload.image, b"GIF89a");
    assert_eq!(upload.mime_type, "image/gif");
    assert_eq!(upload.file_name, path.file_name().unwrap().to_string_lossy());
    assert_eq!(upload.position, Some(1));
}

#[tokio::test]
async fn missing_image_names_the_path() {
    let err = banner_upload(BannerCreateArgs {
        title: "Nope".to_owned(),
        image: PathBuf::from("/definitely/not/here.png"),
        link_url: None,
        position: None,
        active: None,
    })
    .await
    .unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.png"));
}

#[test]
fn failed_read_surfaces_the_api_error() {
    let result: QueryResult<u32> = QueryResult::failed(ApiError::backend(404, "Order not found"));
    let err = data(result).unwrap_err();
    assert!(matches!(err, CliError::Api(_)));
    assert!(err.to_string().contains("Order not found"));
}

#[test]
fn session_json_uses_cookie_names() {
    let session = Session { access_token: "a".to_owned(), refresh_token: None, user_id: Some("7".to_owned()) };
    assert_eq!(session_json(&session), json!({ "accessToken": "a", "refreshToken": null, "userId": "7" }));
}
