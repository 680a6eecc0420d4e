//! Share targets for one prompt or a selection
//!
//! Share text is built by [`crate::library::export`]; this module turns it
//! into a clipboard payload or a `wa.me` / `mailto:` link.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::library::export::{share_dialog_text, share_text};
use crate::model::PromptRecord;

/// Subject used when sharing a selection by email
pub const SELECTION_SUBJECT: &str = "Shared Prompts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    Clipboard,
    WhatsApp,
    Email,
}

impl ShareTarget {
    pub const ALL: [ShareTarget; 3] = [ShareTarget::Clipboard, ShareTarget::WhatsApp, ShareTarget::Email];

    pub fn label(&self) -> &'static str {
        match self {
            ShareTarget::Clipboard => "Copy to clipboard",
            ShareTarget::WhatsApp => "WhatsApp",
            ShareTarget::Email => "Email",
        }
    }
}

impl fmt::Display for ShareTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShareTarget::Clipboard => "clipboard",
            ShareTarget::WhatsApp => "whatsapp",
            ShareTarget::Email => "email",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ShareTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "clipboard" | "copy" => Ok(ShareTarget::Clipboard),
            "whatsapp" | "wa" => Ok(ShareTarget::WhatsApp),
            "email" | "mail" => Ok(ShareTarget::Email),
            other => anyhow::bail!("Unknown share target '{}' (expected clipboard, whatsapp or email)", other),
        }
    }
}

/// What to share: the text, and the subject an email would carry
#[derive(Debug, Clone, PartialEq)]
pub struct SharePayload {
    pub subject: String,
    pub text: String,
}

impl SharePayload {
    pub fn single(record: &PromptRecord) -> Self {
        Self {
            subject: format!("Prompt Share: {}", record.title),
            text: share_text(record),
        }
    }

    pub fn selection<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a PromptRecord>,
    {
        Self {
            subject: SELECTION_SUBJECT.to_string(),
            text: share_dialog_text(records),
        }
    }

    /// Link for the target, `None` for the clipboard
    pub fn link(&self, target: ShareTarget) -> Option<String> {
        match target {
            ShareTarget::Clipboard => None,
            ShareTarget::WhatsApp => Some(whatsapp_link(&self.text)),
            ShareTarget::Email => Some(email_link(&self.subject, &self.text)),
        }
    }
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
pub fn encode_uri_component(text: &str) -> String {
    urlencoding::encode(text)
        .replace("%21", "!")
        .replace("%2A", "*")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
}

pub fn whatsapp_link(text: &str) -> String {
    format!("https://wa.me/?text={}", encode_uri_component(text))
}

pub fn email_link(subject: &str, body: &str) -> String {
    format!(
        "mailto:?subject={}&body={}",
        encode_uri_component(subject),
        encode_uri_component(body)
    )
}

/// Hand a link to the platform's default handler
pub fn open_link(url: &str) -> Result<()> {
    webbrowser::open(url).with_context(|| format!("Failed to open {}", url))?;
    tracing::debug!(url, "Opened link");
    Ok(())
}
