//! Built-in pages the preview server renders itself.

use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Script that reloads the page whenever the server reports a rebuild.
pub const RELOAD_SCRIPT: &str = r#"<script>(function(){var s=new EventSource("/__livereload");s.addEventListener("reload",function(){window.location.reload();});})();</script>"#;

/// Wraps page content with the shared document structure.
fn page_wrapper(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - topicpress" }
                style {
                    "body{font-family:system-ui,sans-serif;margin:2rem auto;max-width:48rem;padding:0 1rem}"
                    "pre{background:#fdecea;border-left:4px solid #d93025;padding:1rem;overflow:auto;white-space:pre-wrap}"
                }
            }
            body {
                (body)
                (PreEscaped(RELOAD_SCRIPT))
            }
        }
    }
}

/// Page shown in place of site content while the last rebuild is failing.
///
/// Reloads on its own once a rebuild succeeds.
pub fn build_error_page(message: &str) -> Markup {
    page_wrapper(
        "Build failed",
        html! {
            h1 { "Build failed" }
            p { "The site will reload when the next build succeeds." }
            pre { (message) }
        },
    )
}

/// Page for request paths with no file behind them.
pub fn not_found_page(path: &str) -> Markup {
    page_wrapper(
        "Not found",
        html! {
            h1 { "Not found" }
            p { "Nothing is generated at " code { (path) } "." }
            p { a href="/index.html" { "Table of contents" } }
        },
    )
}

/// Inserts the reload script before the closing body tag.
///
/// Documents without `</body>` get the script appended.
pub fn inject_reload_script(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + RELOAD_SCRIPT.len());
    match html.rfind("</body>") {
        Some(pos) => {
            out.push_str(&html[..pos]);
            out.push_str(RELOAD_SCRIPT);
            out.push_str(&html[pos..]);
        }
        None => {
            out.push_str(html);
            out.push_str(RELOAD_SCRIPT);
        }
    }
    out
}
