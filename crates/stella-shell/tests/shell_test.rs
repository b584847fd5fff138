//! Scripted shell sessions.

use stella_app::Phase;
use stella_core::RouteId;
use stella_shell::{Console, DEFAULT_ROUTES, Shell, ShellError, ShellOptions};

fn shell(options: ShellOptions) -> (Shell, stella_shell::Capture) {
    let (console, capture) = Console::capture();
    let shell = Shell::from_toml(DEFAULT_ROUTES, options, console).unwrap();
    (shell, capture)
}

#[tokio::test]
async fn customer_session_transcript() {
    let (mut shell, capture) = shell(ShellOptions::default());
    shell.start().await.unwrap();

    let script = "\
login customer
go product-grid storeId=5
back
state
history
link https://stella.app/order-tracking?orderId=42
logout
fly home
quit
state
";
    shell.run(script.as_bytes()).await.unwrap();

    insta::assert_snapshot!(capture.contents(), @r###"
    <main class="splash"><h1>Shop your neighbourhood</h1></main>
    [chrome] bottom-nav=off action=off
    [title] Welcome to Stella
    [url] #customer-home
    <main class="customer-home"><h1>Near you</h1></main>
    [chrome] bottom-nav=on action=on
    [title] Home
    [tab] customer-home
    [url] #product-grid/storeId=5
    <main class="product-grid" data-storeId="5"><h1>Products</h1></main>
    [chrome] bottom-nav=on action=off
    [title] Products
    [tab] product-grid
    <main class="customer-home"><h1>Near you</h1></main>
    [chrome] bottom-nav=on action=on
    [title] Home
    [tab] customer-home
    [state] route=customer-home phase=idle params=-
    [history] 0 #splash
    [url] #order-tracking/orderId=42
    <main class="order-tracking" data-orderId="42"><h1>Order status</h1></main>
    [chrome] bottom-nav=on action=off
    [title] My Orders
    [tab] order-tracking
    [url] #splash
    <main class="splash"><h1>Shop your neighbourhood</h1></main>
    [chrome] bottom-nav=off action=off
    [title] Welcome to Stella
    [error] unknown command: fly (try 'help')
    "###);
}

#[tokio::test]
async fn opens_at_address_bar_location() {
    let options = ShellOptions {
        role: Some("customer".into()),
        open: Some("#product-detail/productId=7/storeId=2".into()),
        ..ShellOptions::default()
    };
    let (mut shell, capture) = shell(options);
    shell.start().await.unwrap();

    assert_eq!(shell.controller().current_route().map(RouteId::as_str), Some("product-detail"));
    assert!(shell.controller().history().is_empty());
    assert!(!capture.contents().contains("[url]"));
}

#[tokio::test]
async fn guarded_routes_redirect() {
    let (mut shell, _capture) = shell(ShellOptions::default());
    shell.start().await.unwrap();

    shell.execute_line("go cart").await;
    assert_eq!(shell.controller().current_route().map(RouteId::as_str), Some("login"));

    shell.execute_line("login shopkeeper").await;
    shell.execute_line("tap cart").await;
    assert_eq!(
        shell.controller().current_route().map(RouteId::as_str),
        Some("shopkeeper-dashboard")
    );
    assert_eq!(shell.controller().phase(), Phase::Idle);
}

#[tokio::test]
async fn action_button_and_tabs_navigate() {
    let options = ShellOptions { role: Some("customer".into()), ..ShellOptions::default() };
    let (mut shell, capture) = shell(options);
    shell.start().await.unwrap();

    shell.execute_line("fab").await;
    assert_eq!(shell.controller().current_route().map(RouteId::as_str), Some("search"));

    shell.execute_line("tab cart").await;
    shell.execute_line("tab product-detail").await;
    assert_eq!(shell.controller().current_route().map(RouteId::as_str), Some("cart"));
    assert!(capture.contents().contains("[error] product-detail is not a tab\n"));

    shell.execute_line("fab").await;
    assert_eq!(shell.controller().current_route().map(RouteId::as_str), Some("cart"));
    assert!(capture.contents().ends_with("[info] Quick action not available for this screen\n"));
    let history: Vec<_> =
        shell.controller().history().into_iter().map(|e| e.route_id.to_string()).collect();
    assert_eq!(history, vec!["customer-home", "search"]);
}

#[tokio::test]
async fn preload_warms_common_routes() {
    let options = ShellOptions { role: Some("customer".into()), ..ShellOptions::default() };
    let (mut shell, capture) = shell(options);
    shell.start().await.unwrap();

    assert!(!shell.execute_line("preload").await);
    assert!(capture.contents().ends_with("[preload] 4/4 routes warmed\n"));
}

#[test]
fn unknown_screen_kind_is_rejected() {
    let config = DEFAULT_ROUTES.replace("screen = \"auth\"", "screen = \"hologram\"");
    let (console, _capture) = Console::capture();

    let result = Shell::from_toml(&config, ShellOptions::default(), console);
    assert!(matches!(result, Err(ShellError::Routes(_))));
}

#[test]
fn zero_history_override_is_rejected() {
    let (console, _capture) = Console::capture();
    let options = ShellOptions { history_limit: Some(0), ..ShellOptions::default() };

    let result = Shell::from_toml(DEFAULT_ROUTES, options, console);
    assert!(matches!(result, Err(ShellError::Config(_))));
}
