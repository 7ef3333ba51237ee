//! Per-recipient email templating
//!
//! The body may contain `{{name}}`, `{{email}}`, and `{{unit}}`
//! tokens. Each recognized token is replaced with the recipient's
//! value, or the literal `N/A` when the value is absent. Tokens
//! outside the recognized set are left untouched. The substituted
//! body is wrapped in a fixed branded HTML shell shared by preview
//! and send.

use chrono::{Datelike, Utc};

use super::recipients::Recipient;

/// Substitution keys the renderer recognizes
pub const RECOGNIZED_KEYS: &[&str] = &["name", "email", "unit"];

/// Fallback for an absent value
const MISSING_VALUE: &str = "N/A";

/// Per-recipient substitution values
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    /// Recipient display name
    pub name: Option<String>,

    /// Recipient email
    pub email: Option<String>,

    /// Recipient unit name
    pub unit: Option<String>,
}

impl TemplateVars {
    /// Build substitution values for a resolved recipient
    #[must_use]
    pub fn for_recipient(recipient: &Recipient) -> Self {
        Self {
            name: Some(recipient.name.clone()),
            email: Some(recipient.email.clone()),
            unit: recipient.unit.clone(),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        match key {
            "name" => self.name.as_deref(),
            "email" => self.email.as_deref(),
            "unit" => self.unit.as_deref(),
            _ => None,
        }
    }
}

/// Substitute recognized `{{key}}` tokens in a body template
///
/// # Examples
///
/// ```rust
/// use cohort_portal::campaign::template::{render_body, TemplateVars};
///
/// let vars = TemplateVars {
///     name: Some("Jane".to_string()),
///     ..TemplateVars::default()
/// };
/// assert_eq!(render_body("Hello {{name}}", &vars), "Hello Jane");
/// assert_eq!(render_body("Hello {{email}}", &vars), "Hello N/A");
/// ```
#[must_use]
pub fn render_body(template: &str, vars: &TemplateVars) -> String {
    let mut result = template.to_string();

    for key in RECOGNIZED_KEYS {
        let token = format!("{{{{{key}}}}}");
        let value = vars.get(key).unwrap_or(MISSING_VALUE);
        result = result.replace(&token, value);
    }

    result
}

/// Wrap rendered body content in the branded HTML shell
///
/// The header shows `header_title`, falling back to the subject when
/// the title is blank.
#[must_use]
pub fn render_document(header_title: &str, subject: &str, body_content: &str) -> String {
    let title = if header_title.trim().is_empty() {
        subject
    } else {
        header_title
    };
    let year = Utc::now().year();

    format!(
        r##"<!DOCTYPE html>
<html>
<head>
  <style>
    body {{
      font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif;
      line-height: 1.55;
      color: #212121;
      max-width: 600px;
      margin: 0 auto;
      padding: 20px;
      background-color: #f9f9f9;
    }}
    .header {{
      background: #071936;
      color: #fff;
      padding: 24px 16px;
      text-align: center;
      border-radius: 8px 8px 0 0;
    }}
    .header h1 {{
      margin: 0;
      font-size: 24px;
    }}
    .content {{
      padding: 24px;
      background-color: #ffffff;
      border-radius: 0 0 8px 8px;
      box-shadow: 0 2px 5px rgba(0,0,0,0.1);
    }}
    .footer {{
      background: #faf7f8;
      padding: 16px;
      font-size: 14px;
      color: #444;
      border-top: 1px solid #D9E2EA;
      text-align: center;
      margin-top: 20px;
      border-radius: 8px;
    }}
  </style>
</head>
<body>
  <div class="header">
    <h1>{title}</h1>
  </div>
  <div class="content">
    {body_content}
  </div>
  <div class="footer">
    <p>&copy; {year} Admin Portal. All rights reserved.</p>
  </div>
</body>
</html>
"##
    )
}

/// Render the full per-recipient document for a campaign
#[must_use]
pub fn render_campaign(
    subject: &str,
    header_title: &str,
    body_template: &str,
    vars: &TemplateVars,
) -> String {
    render_document(header_title, subject, &render_body(body_template, vars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vars(name: Option<&str>, email: Option<&str>, unit: Option<&str>) -> TemplateVars {
        TemplateVars {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            unit: unit.map(str::to_string),
        }
    }

    #[test]
    fn substitutes_present_value() {
        assert_eq!(
            render_body("Hello {{name}}", &vars(Some("Jane"), None, None)),
            "Hello Jane"
        );
    }

    #[test]
    fn missing_value_becomes_na() {
        assert_eq!(
            render_body("Hello {{name}}", &vars(None, None, None)),
            "Hello N/A"
        );
    }

    #[test]
    fn substitutes_every_occurrence() {
        assert_eq!(
            render_body("{{name}} and {{name}}", &vars(Some("Jane"), None, None)),
            "Jane and Jane"
        );
    }

    #[test]
    fn substitutes_all_recognized_keys() {
        let rendered = render_body(
            "{{name}} <{{email}}> in {{unit}}",
            &vars(Some("Jane"), Some("jane@x.com"), Some("Engineering")),
        );
        assert_eq!(rendered, "Jane <jane@x.com> in Engineering");
    }

    #[test]
    fn unknown_tokens_are_left_untouched() {
        assert_eq!(
            render_body("Hi {{nickname}}", &vars(Some("Jane"), None, None)),
            "Hi {{nickname}}"
        );
    }

    #[test]
    fn absent_unit_becomes_na() {
        assert_eq!(
            render_body("Unit: {{unit}}", &vars(Some("Jane"), Some("j@x.com"), None)),
            "Unit: N/A"
        );
    }

    #[test]
    fn document_uses_header_title() {
        let html = render_document("Welcome Aboard", "Subject Line", "<p>hi</p>");
        assert!(html.contains("<h1>Welcome Aboard</h1>"));
        assert!(html.contains("<p>hi</p>"));
    }

    #[test]
    fn blank_header_title_falls_back_to_subject() {
        let html = render_document("   ", "Subject Line", "<p>hi</p>");
        assert!(html.contains("<h1>Subject Line</h1>"));
    }

    #[test]
    fn document_has_fixed_footer() {
        let html = render_document("T", "S", "<p>hi</p>");
        assert!(html.contains("Admin Portal. All rights reserved."));
    }

    #[test]
    fn render_campaign_composes_body_and_shell() {
        let html = render_campaign(
            "Subject",
            "",
            "Hello {{name}}",
            &vars(Some("Jane"), None, None),
        );
        assert!(html.contains("Hello Jane"));
        assert!(html.contains("<h1>Subject</h1>"));
    }

    proptest! {
        #[test]
        fn bodies_without_recognized_tokens_pass_through(
            body in "[a-zA-Z0-9 .,!?]{0,120}"
        ) {
            let rendered = render_body(&body, &vars(Some("Jane"), None, None));
            prop_assert_eq!(rendered, body);
        }
    }
}
