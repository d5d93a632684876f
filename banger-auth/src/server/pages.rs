use banger_api::endpoints::MusicProvider;

use crate::callback::{CallbackStatus, CallbackView};
use crate::navigator::Redirect;
use crate::session::SessionState;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    {REFRESH}
    <title>{TITLE}</title>
    <style>
        body {
            margin: 0;
            padding: 0;
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            background: linear-gradient(135deg, #1DB954 0%, #191414 100%);
            display: flex;
            justify-content: center;
            align-items: center;
            min-height: 100vh;
        }
        .container {
            background: white;
            border-radius: 12px;
            padding: 48px;
            box-shadow: 0 8px 32px rgba(0, 0, 0, 0.1);
            text-align: center;
            max-width: 420px;
        }
        .icon {
            width: 64px;
            height: 64px;
            border-radius: 50%;
            color: white;
            display: inline-flex;
            align-items: center;
            justify-content: center;
            font-size: 32px;
            margin-bottom: 24px;
        }
        .loading { background: #6B7280; }
        .success { background: #10B981; }
        .error { background: #EF4444; }
        h1 {
            color: #1F2937;
            margin: 0 0 12px 0;
            font-size: 24px;
            font-weight: 600;
        }
        p {
            color: #6B7280;
            margin: 0 0 24px 0;
            line-height: 1.5;
        }
        ul { list-style: none; padding: 0; text-align: left; }
        li { padding: 6px 0; color: #374151; }
        a { color: #1DB954; font-weight: 600; }
        .footer {
            color: #9CA3AF;
            font-size: 14px;
        }
    </style>
</head>
<body>
    <div class="container">
        {BODY}
        <div class="footer">Banger</div>
    </div>
</body>
</html>"#;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn page(title: &str, refresh: Option<Redirect>, body: &str) -> String {
    let refresh = refresh
        .map(|r| {
            format!(
                r#"<meta http-equiv="refresh" content="{};url={}">"#,
                r.after.as_secs_f32(),
                r.to
            )
        })
        .unwrap_or_default();

    PAGE_TEMPLATE
        .replace("{REFRESH}", &refresh)
        .replace("{TITLE}", &escape(title))
        .replace("{BODY}", body)
}

/// The callback status panel. Errors get a manual way back; the rest refresh on their own.
pub fn status_page(view: &CallbackView, redirect: Option<Redirect>) -> String {
    let (icon, title) = match view.status {
        CallbackStatus::Loading => ("…", "Connecting"),
        CallbackStatus::Success => ("✓", "Success"),
        CallbackStatus::Error => ("✗", "Connection Failed"),
    };

    let mut body = format!(
        r#"<div class="icon {}">{}</div>
        <h1>{}</h1>
        <p>{}</p>"#,
        view.status.as_str(),
        icon,
        title,
        escape(&view.message)
    );

    if view.status == CallbackStatus::Error {
        body.push_str(r#"<p><a href="/">Return to App</a></p>"#);
    }

    page(title, redirect, &body)
}

/// Who is signed in and which providers are linked, with connect links for the rest.
pub fn home_page(state: &SessionState) -> String {
    let greeting = match &state.user {
        Some(user) => format!("Signed in as {}", escape(&user.display_name)),
        None => "Not signed in".to_string(),
    };

    let items: String = MusicProvider::ALL
        .into_iter()
        .map(|provider| {
            let integration = state.integrations.get(provider);
            let status = if integration.is_connected {
                "connected".to_string()
            } else {
                format!(r#"<a href="/connect/{}">Connect</a>"#, provider)
            };
            format!("<li>{}: {}</li>", provider.display_name(), status)
        })
        .collect();

    let error = state
        .error
        .as_deref()
        .map(|e| format!("<p>{}</p>", escape(e)))
        .unwrap_or_default();

    let body = format!("<h1>Banger</h1>\n        <p>{}</p>\n        {}<ul>{}</ul>", greeting, error, items);
    page("Banger", None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_success_page_refreshes_home() {
        let view = CallbackView {
            status: CallbackStatus::Success,
            message: "Successfully connected to Spotify!".to_string(),
        };
        let html = status_page(
            &view,
            Some(Redirect {
                to: "/",
                after: Duration::from_millis(1500),
            }),
        );

        assert!(html.contains(r#"content="1.5;url=/""#));
        assert!(html.contains("Successfully connected to Spotify!"));
        assert!(!html.contains("Return to App"));
    }

    #[test]
    fn test_error_page_links_back_without_refresh() {
        let view = CallbackView {
            status: CallbackStatus::Error,
            message: "<script>".to_string(),
        };
        let html = status_page(&view, None);

        assert!(html.contains("Return to App"));
        assert!(!html.contains("http-equiv"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_home_page_lists_every_provider() {
        let html = home_page(&SessionState::new());

        assert!(html.contains("Not signed in"));
        for provider in MusicProvider::ALL {
            assert!(html.contains(&format!("/connect/{}", provider)));
        }
    }
}
