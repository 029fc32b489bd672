//! Markdown to HTML.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use lectern_content::slugify;

/// Render Markdown to HTML, giving every heading an anchor id.
///
/// Ids match [`lectern_content::headings`], so an "on this page" list built
/// from the same body links to the rendered headings.
pub fn render_markdown(content: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut events: Vec<Event> = Parser::new_ext(content, options).collect();

    for start in 0..events.len() {
        if !matches!(events[start], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }

        let mut text = String::new();
        for event in &events[start + 1..] {
            match event {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
        }

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
            *id = Some(CowStr::from(slugify(&text)));
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    html_output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_markdown() {
        let html = render_markdown("# Hello\n\nWorld");

        assert!(html.contains("<h1 id=\"hello\">Hello</h1>"));
        assert!(html.contains("<p>World</p>"));
    }

    #[test]
    fn heading_ids_match_heading_list() {
        let body = "## Install `lectern`\n\ntext";

        let html = render_markdown(body);
        let headings = lectern_content::headings(body);

        assert!(html.contains(&format!("id=\"{}\"", headings[0].id)));
    }

    #[test]
    fn renders_tables() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |");

        assert!(html.contains("<table>"));
    }
}
