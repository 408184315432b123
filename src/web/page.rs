use super::history::History;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_posts(history: &History) -> String {
    if history.is_empty() {
        return r#"<p class="empty">Enter a topic above and click "Generate Blog Post" to get started!</p>"#
            .to_string();
    }

    let items: String = history
        .newest_first()
        .map(|entry| {
            format!(
                r#"<details class="post">
  <summary><strong>{topic}</strong> - {timestamp}</summary>
  <pre id="post-{id}">{content}</pre>
  <div class="actions">
    <button type="button" onclick="copyPost('{id}', this)">Copy to Clipboard</button>
    <a class="button" href="/posts/{id}/download">Download as Text</a>
  </div>
</details>"#,
                id = entry.id,
                topic = escape_html(&entry.topic),
                timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                content = escape_html(&entry.content),
            )
        })
        .collect();

    format!(
        r#"<h2>Your Blog Posts ({count})</h2>
{items}
<form method="post" action="/clear"><button type="submit" class="secondary">Clear History</button></form>"#,
        count = history.len(),
    )
}

pub fn render(history: &History, notice: Option<&str>, model: &str) -> String {
    let notice = notice
        .map(|n| format!(r#"<p class="notice">{}</p>"#, escape_html(n)))
        .unwrap_or_default();

    format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Blog Generator</title>
<style>
  body {{ font-family: system-ui, sans-serif; max-width: 860px; margin: 2rem auto; padding: 0 1rem; color: #222; }}
  h1 {{ color: #0066cc; margin-bottom: 0.25rem; }}
  .sub {{ color: #666; margin-top: 0; }}
  input[type=text] {{ width: 100%; padding: 0.6rem; font-size: 1rem; box-sizing: border-box; }}
  button, a.button {{ background: #0066cc; color: #fff; border: none; border-radius: 8px; padding: 0.5rem 1rem; font-size: 0.95rem; cursor: pointer; text-decoration: none; display: inline-block; }}
  button.secondary {{ background: #888; }}
  .notice {{ background: #fff4d6; padding: 0.5rem 0.75rem; border-radius: 4px; }}
  .post {{ border-left: 5px solid #1fd655; background: #f9f9f9; padding: 0.75rem 1rem; margin-bottom: 1rem; border-radius: 6px; }}
  .post pre {{ white-space: pre-wrap; font-family: inherit; }}
  .actions {{ display: flex; gap: 0.75rem; }}
  footer {{ color: #666; font-size: 0.85rem; margin-top: 2rem; }}
</style>
</head>
<body>
<h1>Blog Generator</h1>
<p class="sub">Create engaging, conversational blog posts from a single topic</p>
{notice}
<form method="post" action="/generate">
  <label for="topic">What would you like to blog about?</label>
  <input type="text" id="topic" name="topic" placeholder="e.g., AI trends for productivity">
  <p><button type="submit">Generate Blog Post</button></p>
</form>
{posts}
<footer>Model: {model}. Generation can take a minute or two depending on your hardware.</footer>
<script>
function copyPost(id, button) {{
  const text = document.getElementById("post-" + id).textContent;
  navigator.clipboard.writeText(text).then(() => {{ button.textContent = "Copied!"; }});
}}
</script>
</body>
</html>"####,
        posts = render_posts(history),
        model = escape_html(model),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn empty_history_shows_prompt() {
        let page = render(&History::new(), None, "llama3:latest");
        assert!(page.contains("to get started!"));
        assert!(!page.contains("Clear History"));
        assert!(page.contains("Model: llama3:latest"));
    }

    #[test]
    fn posts_are_escaped_and_downloadable() {
        let mut history = History::new();
        let id = history.push("<script>", "Body & more".into()).id;

        let page = render(&history, Some("Please enter a blog topic"), "m");
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("Body &amp; more"));
        assert!(page.contains(&format!("/posts/{}/download", id)));
        assert!(page.contains("Please enter a blog topic"));
        assert!(page.contains("Your Blog Posts (1)"));
    }
}
