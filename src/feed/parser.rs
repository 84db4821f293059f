use feed_rs::model::{Link, Text};
use feed_rs::parser;
use thiserror::Error;

use super::model::{Channel, Item};

/// Reasons a downloaded document could not be turned into a [`Channel`].
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not a well-formed RSS/Atom/JSON feed.
    #[error("{0}")]
    Malformed(String),
    /// The document parsed but lacks an element every channel or entry needs.
    #[error("missing <{field}> in {location}")]
    MissingField {
        field: &'static str,
        location: &'static str,
    },
}

impl From<parser::ParseFeedError> for ParseError {
    fn from(err: parser::ParseFeedError) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Parse RSS, Atom or JSON Feed bytes into a [`Channel`].
///
/// Entry order follows the document. The channel and every entry must carry
/// both a title and a link.
///
/// feed-rs drops element text holding a broken entity (`A &amp B`), so such a
/// title surfaces as [`ParseError::MissingField`] rather than as a parser
/// message.
pub fn parse_channel(bytes: &[u8]) -> Result<Channel, ParseError> {
    let feed = parser::parse(bytes)?;

    let title = text_of(feed.title.as_ref()).ok_or(ParseError::MissingField {
        field: "title",
        location: "channel",
    })?;
    let link = link_of(&feed.links).ok_or(ParseError::MissingField {
        field: "link",
        location: "channel",
    })?;

    let items = feed
        .entries
        .iter()
        .map(|entry| {
            let title = text_of(entry.title.as_ref()).ok_or(ParseError::MissingField {
                field: "title",
                location: "item",
            })?;
            let link = link_of(&entry.links).ok_or(ParseError::MissingField {
                field: "link",
                location: "item",
            })?;
            Ok(Item { title, link })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    Ok(Channel { title, link, items })
}

fn text_of(text: Option<&Text>) -> Option<String> {
    text.map(|t| t.content.trim().to_string())
}

/// Prefer the `alternate` link (Atom), falling back to the first one listed.
fn link_of(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.trim().to_string())
}
