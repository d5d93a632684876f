use std::time::Duration;

/// Where the client sends the user next.
///
/// `open_external` leaves the app entirely (an OAuth provider's consent
/// page); `navigate` replaces the current in-app location.
pub trait Navigator: Send + Sync {
    fn open_external(&self, url: &str);

    fn navigate(&self, path: &str);
}

/// Opens provider pages in the system browser and reports in-app moves on stdout.
#[derive(Debug, Default, Clone)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn open_external(&self, url: &str) {
        if let Err(e) = open::that(url) {
            tracing::warn!(error = %e, "Failed to open browser");
            eprintln!("Failed to open browser automatically: {}", e);
            eprintln!("\nPlease open this URL in your browser:");
            eprintln!("{}\n", url);
        } else {
            tracing::info!("Opened authorization page in browser");
            println!("Browser opened. You can also open this URL directly:");
            println!("{}\n", url);
        }
    }

    fn navigate(&self, path: &str) {
        tracing::info!(path, "Navigating");
        println!("Returning to {}", path);
    }
}

/// A delayed in-app navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub to: &'static str,
    pub after: Duration,
}

/// Wait out the redirect delay, then navigate.
pub async fn follow_redirect(redirect: Redirect, navigator: &dyn Navigator) {
    tokio::time::sleep(redirect.after).await;
    navigator.navigate(redirect.to);
}
