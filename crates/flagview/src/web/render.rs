//! HTML rendering for the flag pages.
//!
//! Pages are plain strings with inline styles and a few lines of script for
//! the search box and the detail tabs. Code previews are emitted unchanged
//! (escaped) inside `<pre><code class="language-…">` for a client-side
//! highlighter.

use crate::config::RenderConfig;
use crate::flag::{Definition, FlagRecord, Reference};
use crate::group::{group_by_project, ProjectGroup};
use crate::search::matches;

const STYLE: &str = "\
body {
  font-family: system-ui, sans-serif;
  max-width: 72em;
  margin: 2em auto;
  padding: 0 1.5em;
  color: #1a1a1a;
}
a { color: inherit; }
h1 { font-size: 1.9em; margin-bottom: 0.4em; }
.toolbar { display: flex; align-items: center; gap: 1em; margin-bottom: 1.5em; }
.toolbar input { flex: 0 1 28em; padding: 0.5em; border: 1px solid #ccc; border-radius: 6px; }
.grid { display: grid; gap: 1em; }
.card { border: 1px solid #e4e4e7; border-radius: 8px; padding: 1em 1.25em; }
.card-title {
  display: flex;
  align-items: center;
  justify-content: space-between;
  font-size: 1.2em;
  font-weight: 600;
}
.badge {
  display: inline-block;
  font-size: 0.75em;
  font-weight: 500;
  padding: 0.15em 0.55em;
  border-radius: 999px;
  border: 1px solid #d4d4d8;
  margin-right: 0.4em;
}
.badge-project { background: #18181b; color: white; border-color: #18181b; }
.badge-method { background: #f4f4f5; }
.muted { color: #71717a; font-size: 0.9em; }
.definition { background: #f4f4f5; border-radius: 8px; padding: 1em; margin: 1em 0 0.5em; }
.references { border-left: 2px solid #e4e4e7; padding-left: 1em; }
.reference { background: #fafafa; border-radius: 8px; padding: 0.75em; margin-bottom: 0.5em; }
pre {
  background: #282c34;
  color: #abb2bf;
  padding: 0.75em;
  border-radius: 6px;
  overflow-x: auto;
  font-size: 0.85em;
}
.tabs button {
  padding: 0.4em 1em;
  border: 1px solid #d4d4d8;
  background: white;
  border-radius: 6px;
  cursor: pointer;
}
.tabs button[aria-selected=\"true\"] { background: #18181b; color: white; }
";

const LIST_SCRIPT: &str = "\
(function () {
  var input = document.getElementById('flag-search');
  var count = document.getElementById('flag-count');
  var cards = document.querySelectorAll('[data-flag]');
  function matches(card, q) {
    if (q === '' || card.dataset.name.indexOf(q) !== -1) { return true; }
    return card.dataset.projects.split('\\n').some(function (p) { return p.indexOf(q) !== -1; });
  }
  function apply() {
    var q = input.value.toLowerCase();
    var shown = 0;
    cards.forEach(function (card) {
      var hit = matches(card, q);
      card.hidden = !hit;
      if (hit) { shown += 1; }
    });
    count.textContent = shown + ' flags';
  }
  input.addEventListener('input', apply);
  apply();
})();
";

const TABS_SCRIPT: &str = "\
(function () {
  var buttons = document.querySelectorAll('.tabs button');
  function select(id) {
    buttons.forEach(function (b) {
      var on = b.dataset.tab === id;
      b.setAttribute('aria-selected', on ? 'true' : 'false');
      document.getElementById(b.dataset.tab).hidden = !on;
    });
  }
  buttons.forEach(function (b) {
    b.addEventListener('click', function () { select(b.dataset.tab); });
  });
  select('by-project');
})();
";

/// Render the list page.
///
/// Every flag gets a card so the search box can widen the filter again.
/// Cards not matching `query` start out hidden, and `query` pre-fills the
/// search box.
#[must_use]
pub fn list_page(flags: &[FlagRecord], query: &str, config: &RenderConfig) -> String {
    let visible: Vec<bool> = flags.iter().map(|flag| matches(flag, query)).collect();
    let shown = visible.iter().filter(|&&v| v).count();
    let mut body = String::new();

    body.push_str("<h1>Feature Flags</h1>\n");
    body.push_str("<form class=\"toolbar\" method=\"get\" action=\"/feature-flags\">\n");
    body.push_str(&format!(
        "  <input id=\"flag-search\" type=\"search\" name=\"q\" \
         placeholder=\"Search feature flags...\" value=\"{}\" autocomplete=\"off\">\n",
        html_escape(query)
    ));
    body.push_str(&format!(
        "  <span id=\"flag-count\" class=\"badge\">{shown} flags</span>\n"
    ));
    body.push_str("</form>\n<div class=\"grid\">\n");

    for (flag, visible) in flags.iter().zip(visible) {
        body.push_str(&render_flag_card(flag, visible, config.list_preview_definitions));
    }

    body.push_str("</div>\n");
    body.push_str(&format!("<script>\n{LIST_SCRIPT}</script>\n"));

    page("Feature Flags", &body)
}

fn render_flag_card(flag: &FlagRecord, visible: bool, preview_definitions: usize) -> String {
    let mut out = String::new();
    let projects: Vec<String> = flag
        .definitions
        .iter()
        .map(|d| d.project_name.to_lowercase())
        .collect();

    out.push_str(&format!(
        "<div class=\"card\" data-flag data-name=\"{}\" data-projects=\"{}\"{}>\n",
        html_escape(&flag.name.to_lowercase()),
        html_escape(&projects.join("\n")),
        if visible { "" } else { " hidden" }
    ));
    out.push_str(&format!(
        "  <div class=\"card-title\"><span>{} <span class=\"badge\">{}</span></span>",
        html_escape(&flag.name),
        count_label(flag.definitions.len(), "definition", "definitions")
    ));
    out.push_str(&format!(
        "<a href=\"{}\">View Details &rsaquo;</a></div>\n",
        html_escape(&flag_href(&flag.name))
    ));

    for def in flag.definitions.iter().take(preview_definitions) {
        out.push_str(&format!(
            "  <p><span class=\"badge badge-project\">{}</span>\
             <span class=\"muted\">{}</span></p>\n",
            html_escape(&def.project_name),
            html_escape(&def.location.path)
        ));
    }

    let hidden = flag.definitions.len().saturating_sub(preview_definitions);
    if hidden > 0 {
        out.push_str(&format!(
            "  <p class=\"muted\">And {hidden} more definitions...</p>\n"
        ));
    }

    out.push_str("</div>\n");
    out
}

/// Render the detail page of one merged flag.
#[must_use]
pub fn detail_page(flag: &FlagRecord, config: &RenderConfig) -> String {
    let groups = group_by_project(flag);
    let lang = &config.preview_language;
    let mut body = String::new();

    body.push_str("<p><a href=\"/feature-flags\">&lsaquo; All feature flags</a></p>\n");
    body.push_str(&format!("<h1>{}</h1>\n<p>", html_escape(&flag.name)));
    body.push_str(&format!(
        "<span class=\"badge\">{}</span>",
        count_label(flag.definitions.len(), "definition", "definitions")
    ));
    body.push_str(&format!(
        "<span class=\"badge\">{}</span>",
        count_label(groups.len(), "project", "projects")
    ));
    body.push_str(&format!(
        "<span class=\"badge\">{}</span></p>\n",
        count_label(groups.reference_count(), "reference", "references")
    ));

    body.push_str("<div class=\"tabs\">");
    body.push_str("<button type=\"button\" data-tab=\"by-project\">By Project</button> ");
    body.push_str("<button type=\"button\" data-tab=\"all-references\">All References</button>");
    body.push_str("</div>\n");

    body.push_str("<section id=\"by-project\">\n");
    for group in &groups {
        body.push_str(&render_project_group(group, lang));
    }
    body.push_str("</section>\n");

    body.push_str("<section id=\"all-references\">\n");
    for group in &groups {
        body.push_str(&format!(
            "<h3><span class=\"badge badge-project\">{}</span>\
             <span class=\"muted\">{}</span></h3>\n",
            html_escape(&group.project_name),
            count_label(group.references.len(), "reference", "references")
        ));
        body.push_str("<div class=\"grid\">\n");
        for reference in &group.references {
            body.push_str(&render_reference(reference, "card", lang));
        }
        body.push_str("</div>\n");
    }
    body.push_str("</section>\n");

    body.push_str(&format!("<script>\n{TABS_SCRIPT}</script>\n"));

    page(&flag.name, &body)
}

fn render_project_group(group: &ProjectGroup, lang: &str) -> String {
    let mut out = String::new();

    out.push_str("<div class=\"card\">\n");
    out.push_str(&format!(
        "<div class=\"card-title\"><span><span class=\"badge badge-project\">{}</span>",
        html_escape(&group.project_name)
    ));
    out.push_str(&format!(
        "<span class=\"badge\">{}</span><span class=\"badge\">{}</span></span></div>\n",
        count_label(group.definitions.len(), "definition", "definitions"),
        count_label(group.references.len(), "reference", "references")
    ));

    for (index, def) in group.definitions.iter().enumerate() {
        out.push_str(&render_definition(index + 1, def, lang));
    }

    out.push_str("</div>\n");
    out
}

fn render_definition(number: usize, def: &Definition, lang: &str) -> String {
    let mut out = String::new();

    out.push_str("<div class=\"definition\">\n");
    out.push_str(&format!(
        "  <div class=\"card-title\"><span>Definition {number}</span>\
         <span class=\"badge badge-method\">{}</span></div>\n",
        html_escape(&def.method.method_name)
    ));
    out.push_str(&format!(
        "  <p class=\"muted\">Location: {}</p>\n",
        html_escape(&def.location.path)
    ));
    out.push_str(&code_block(&def.method.preview, lang));
    out.push_str("</div>\n");

    if !def.references.is_empty() {
        out.push_str("<div class=\"references\">\n<h4>References</h4>\n");
        for reference in &def.references {
            out.push_str(&render_reference(reference, "reference", lang));
        }
        out.push_str("</div>\n");
    }

    out
}

fn render_reference(reference: &Reference, class: &str, lang: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("<div class=\"{class}\">\n"));
    out.push_str(&format!(
        "  <strong>{}</strong>\n  <p class=\"muted\">{}</p>\n",
        html_escape(&reference.file_name),
        html_escape(&reference.location.path)
    ));
    out.push_str(&code_block(&reference.preview, lang));
    out.push_str("</div>\n");
    out
}

/// Code preview block, or nothing for an empty preview.
fn code_block(code: &str, lang: &str) -> String {
    if code.is_empty() {
        return String::new();
    }
    format!(
        "<pre><code class=\"language-{}\">{}</code></pre>\n",
        html_escape(lang),
        html_escape(code)
    )
}

/// Render the page shown for an unknown flag or route.
#[must_use]
pub fn not_found_page(name: Option<&str>) -> String {
    let message = match name {
        Some(name) => format!(
            "No feature flag named <code>{}</code> was found.",
            html_escape(name)
        ),
        None => "The requested page does not exist.".to_string(),
    };
    let body = format!(
        "<h1>Not Found</h1>\n<p>{message}</p>\n\
         <p><a href=\"/feature-flags\">Back to all feature flags</a></p>\n"
    );
    page("Not Found", &body)
}

/// Render the page shown when the flag data cannot be loaded.
#[must_use]
pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h1>Feature flags unavailable</h1>\n\
         <p>The flag data could not be loaded.</p>\n<pre>{}</pre>\n",
        html_escape(message)
    );
    page("Error", &body)
}

fn page(title: &str, body: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    out.push_str(&format!("<style>\n{STYLE}</style>\n"));
    out.push_str("</head>\n<body>\n");
    out.push_str(body);
    out.push_str("</body>\n</html>\n");
    out
}

/// "1 definition", "3 definitions".
#[must_use]
pub fn count_label(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Link to a flag's detail page.
#[must_use]
pub fn flag_href(name: &str) -> String {
    format!("/feature-flags/{}", encode_path_segment(name))
}

/// Percent-encode everything except RFC 3986 unreserved characters.
fn encode_path_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
