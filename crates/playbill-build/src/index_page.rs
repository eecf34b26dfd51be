//! Generated index page for multi-target builds.

use minijinja::{context, Environment};

/// A link to one built target page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TargetLink {
    /// Target display title (projected `title`, or the target name)
    pub title: String,
    /// Page path relative to the output directory
    pub path: String,
}

/// Render the index page listing every built target.
pub fn render_index(site_title: &str, links: &[TargetLink]) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("index.html", INDEX_TEMPLATE)?;

    let tmpl = env.get_template("index.html")?;
    tmpl.render(context! {
        site_title => site_title,
        links => links,
    })
}

const INDEX_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ site_title }}</title>
</head>
<body>
  <h1>{{ site_title }}</h1>
  <ul class="target-list">
  {% for link in links %}
    <li><a href="{{ link.path }}">{{ link.title }}</a></li>
  {% endfor %}
  </ul>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_target_once() {
        let links = vec![
            TargetLink {
                title: "Asteroids".to_string(),
                path: "asteroids.html".to_string(),
            },
            TargetLink {
                title: "Pinball".to_string(),
                path: "pinball.html".to_string(),
            },
        ];

        let html = render_index("Test Player", &links).unwrap();

        assert!(html.contains("<title>Test Player</title>"));
        assert_eq!(html.matches("asteroids.html").count(), 1);
        assert_eq!(html.matches("pinball.html").count(), 1);
        assert!(html.contains(">Asteroids<"));
        assert!(html.contains(">Pinball<"));
    }

    #[test]
    fn renders_empty_list() {
        let html = render_index("Empty", &[]).unwrap();

        assert!(html.contains("<ul class=\"target-list\">"));
        assert!(!html.contains("<li>"));
    }
}
