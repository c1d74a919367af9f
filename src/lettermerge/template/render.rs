//! Turning resolved letters into documents.
//!
//! Every output format implements [`DocumentRenderer`]. The batch generator
//! only sees the trait, so adding a format means adding one type here and
//! one arm in [`OutputFormat::renderer`].

use super::Letter;
use crate::error::{MergeError, Result};
use crate::model::{Record, ID_KEY};
use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use pulldown_cmark::{html::push_html, Options, Parser};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const DEFAULT_SIGNATURE: &str = "Sincerely,";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// To and Subject lines above the body.
    #[default]
    Email,
    /// Date line, body, signature block.
    Letter,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Email => write!(f, "email"),
            Layout::Letter => write!(f, "letter"),
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" => Ok(Layout::Email),
            "letter" => Ok(Layout::Letter),
            _ => Err(format!("Unknown layout: {} (expected email or letter)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Text,
    Mailto,
}

impl OutputFormat {
    pub fn renderer(self) -> Box<dyn DocumentRenderer> {
        match self {
            OutputFormat::Html => Box::new(HtmlRenderer),
            OutputFormat::Text => Box::new(TextRenderer),
            OutputFormat::Mailto => Box::new(MailtoRenderer),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Mailto => write!(f, "mailto"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "text" | "txt" => Ok(OutputFormat::Text),
            "mailto" => Ok(OutputFormat::Mailto),
            _ => Err(format!(
                "Unknown format: {} (expected html, text or mailto)",
                s
            )),
        }
    }
}

/// Page settings shared by every letter in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub layout: Layout,
    pub signature: String,
    pub date: NaiveDate,
}

impl RenderOptions {
    pub fn new(layout: Layout, signature: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            layout,
            signature: signature.into(),
            date,
        }
    }

    fn date_line(&self) -> String {
        self.date.format("%d %B %Y").to_string()
    }
}

pub trait DocumentRenderer {
    /// File extension for the rendered document, without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, letter: &Letter, options: &RenderOptions) -> Result<String>;
}

/// A standalone HTML page. The body is read as Markdown; inline HTML passes
/// through unchanged.
pub struct HtmlRenderer;

impl DocumentRenderer for HtmlRenderer {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, letter: &Letter, options: &RenderOptions) -> Result<String> {
        let title = if letter.subject.is_empty() {
            "Letter".to_string()
        } else {
            escape_html(&letter.subject)
        };

        let mut page = String::new();
        page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
        page.push_str(&format!("<title>{}</title>\n", title));
        page.push_str(
            "<style>\nbody { font-family: Arial, sans-serif; line-height: 1.6; \
             max-width: 800px; margin: 0 auto; padding: 20px; }\n\
             .letter-date { text-align: right; margin-bottom: 20px; }\n\
             .letter-signature { margin-top: 50px; }\n</style>\n",
        );
        page.push_str("</head>\n<body>\n");

        match options.layout {
            Layout::Email => {
                let to = or_placeholder(&letter.to, "N/A");
                let subject = or_placeholder(&letter.subject, "No Subject");
                page.push_str("<div class=\"letter-header\">\n");
                page.push_str(&format!(
                    "<div><strong>To:</strong> {}</div>\n",
                    escape_html(to)
                ));
                page.push_str(&format!(
                    "<div><strong>Subject:</strong> {}</div>\n",
                    escape_html(subject)
                ));
                page.push_str("</div>\n");
            }
            Layout::Letter => {
                page.push_str(&format!(
                    "<div class=\"letter-date\">{}</div>\n",
                    options.date_line()
                ));
            }
        }

        page.push_str("<div class=\"letter-content\">\n");
        page.push_str(&markdown_to_html(&letter.body));
        page.push_str("</div>\n");

        if options.layout == Layout::Letter {
            page.push_str("<div class=\"letter-signature\">\n");
            page.push_str(&format!("<p>{}</p>\n", escape_html(&options.signature)));
            page.push_str("<br><br>\n<p>_________________</p>\n</div>\n");
        }

        page.push_str("</body>\n</html>\n");
        Ok(page)
    }
}

/// Plain text with any HTML tags in the body removed.
pub struct TextRenderer;

impl DocumentRenderer for TextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, letter: &Letter, options: &RenderOptions) -> Result<String> {
        let body = strip_tags(&letter.body);
        let out = match options.layout {
            Layout::Email => format!(
                "To: {}\nSubject: {}\n\n{}\n",
                or_placeholder(&letter.to, "N/A"),
                or_placeholder(&letter.subject, "No Subject"),
                body.trim_end()
            ),
            Layout::Letter => format!(
                "{}\n\n{}\n\n{}\n\n_________________\n",
                options.date_line(),
                body.trim_end(),
                options.signature
            ),
        };
        Ok(out)
    }
}

/// A `mailto:` link carrying the subject and the tag-stripped body.
///
/// Fails when the resolved recipient is blank, since the link would open a
/// draft addressed to nobody.
pub struct MailtoRenderer;

impl DocumentRenderer for MailtoRenderer {
    fn extension(&self) -> &'static str {
        "url"
    }

    fn render(&self, letter: &Letter, _options: &RenderOptions) -> Result<String> {
        let to = letter.to.trim();
        if to.is_empty() {
            return Err(MergeError::Render("Recipient address is empty".to_string()));
        }
        Ok(format!(
            "mailto:{}?subject={}&body={}",
            to,
            utf8_percent_encode(&letter.subject, URI_COMPONENT),
            utf8_percent_encode(&strip_tags(&letter.body), URI_COMPONENT)
        ))
    }
}

pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = Parser::new_ext(markdown, options);
    let mut html = String::new();
    push_html(&mut html, parser);
    html
}

/// Drops everything between `<` and the next `>`. A `<` with no closing `>`
/// is kept as text.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                rest = &rest[open..];
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// `letter_<identifier>_<n>.<ext>`, where the identifier is the record's
/// `Full Name`, else `University Name`, else its id, else `record_<n>`.
pub fn output_file_name(record: &Record, n: usize, extension: &str) -> String {
    let identifier = ["Full Name", "University Name", ID_KEY]
        .iter()
        .find_map(|key| record.get(key).filter(|v| !v.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("record_{}", n));

    let safe: String = identifier
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("letter_{}_{}.{}", safe, n, extension)
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter() -> Letter {
        Letter {
            subject: "Visit & talk".into(),
            to: "asha@example.edu".into(),
            body: "Dear **Asha**,\n\n<p>See you soon.</p>".into(),
        }
    }

    fn options(layout: Layout) -> RenderOptions {
        RenderOptions::new(
            layout,
            DEFAULT_SIGNATURE,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        )
    }

    #[test]
    fn html_email_layout_has_header_and_markdown_body() {
        let page = HtmlRenderer.render(&letter(), &options(Layout::Email)).unwrap();
        assert!(page.contains("<strong>To:</strong> asha@example.edu"));
        assert!(page.contains("<strong>Subject:</strong> Visit &amp; talk"));
        assert!(page.contains("<strong>Asha</strong>"));
        assert!(page.contains("<p>See you soon.</p>"));
        assert!(!page.contains("<div class=\"letter-signature\">"));
    }

    #[test]
    fn html_letter_layout_has_date_and_signature() {
        let page = HtmlRenderer.render(&letter(), &options(Layout::Letter)).unwrap();
        assert!(page.contains("05 March 2024"));
        assert!(page.contains("<p>Sincerely,</p>"));
        assert!(!page.contains("<strong>To:</strong>"));
    }

    #[test]
    fn html_uses_fallbacks_for_blank_header_parts() {
        let blank = Letter {
            body: "Hi".into(),
            ..Letter::default()
        };
        let page = HtmlRenderer.render(&blank, &options(Layout::Email)).unwrap();
        assert!(page.contains("<title>Letter</title>"));
        assert!(page.contains("N/A"));
        assert!(page.contains("No Subject"));
    }

    #[test]
    fn text_strips_tags() {
        let text = TextRenderer.render(&letter(), &options(Layout::Email)).unwrap();
        assert!(text.starts_with("To: asha@example.edu\nSubject: Visit & talk\n\n"));
        assert!(text.contains("See you soon."));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn text_letter_layout_ends_with_signature() {
        let text = TextRenderer.render(&letter(), &options(Layout::Letter)).unwrap();
        assert!(text.starts_with("05 March 2024\n\n"));
        assert!(text.contains("Sincerely,"));
    }

    #[test]
    fn mailto_encodes_like_uri_components() {
        let link = MailtoRenderer
            .render(&letter(), &options(Layout::Email))
            .unwrap();
        assert!(link.starts_with("mailto:asha@example.edu?subject=Visit%20%26%20talk&body="));
        assert!(link.contains("See%20you%20soon."));
        assert!(!link.contains("%3Cp%3E"));
    }

    #[test]
    fn mailto_fails_without_recipient() {
        let mut l = letter();
        l.to = "  ".into();
        let err = MailtoRenderer.render(&l, &options(Layout::Email)).unwrap_err();
        assert!(matches!(err, MergeError::Render(_)));
    }

    #[test]
    fn strip_tags_keeps_unterminated_angle() {
        assert_eq!(strip_tags("<b>a</b> < b"), "a < b");
        assert_eq!(strip_tags("x<y"), "x<y");
        assert_eq!(strip_tags("<br/>line"), "line");
    }

    #[test]
    fn file_names_prefer_full_name_then_university() {
        let r = Record::new()
            .with("id", "abc")
            .with("University Name", "Kerala Univ.")
            .with("Full Name", "Dr. Asha Rao");
        assert_eq!(output_file_name(&r, 1, "html"), "letter_dr__asha_rao_1.html");

        let r = Record::new()
            .with("id", "abc")
            .with("Full Name", "")
            .with("University Name", "Kerala Univ.");
        assert_eq!(output_file_name(&r, 2, "txt"), "letter_kerala_univ__2.txt");

        let r = Record::new().with("id", "abc-1");
        assert_eq!(output_file_name(&r, 3, "url"), "letter_abc_1_3.url");

        assert_eq!(output_file_name(&Record::new(), 4, "txt"), "letter_record_4_4.txt");
    }

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("pdf".parse::<OutputFormat>().is_err());
        assert_eq!("Letter".parse::<Layout>().unwrap(), Layout::Letter);
    }
}
