//! Message composition: turns caller input plus preset defaults into one or
//! more normalized `Payload`s.

use crate::core::{Attachment, ChannelTarget, Field, MessageInput, MessageOptions, Payload};
use serde_json::{Map, Value};

/// Fallback text of the attachment built from `fields`.
pub const FIELDS_FALLBACK: &str = "Alert details";

/// Values shorter than this many characters are flagged `short`.
pub const SHORT_FIELD_LIMIT: usize = 25;

/// Builds the payloads for one send.
///
/// Returns one payload per target channel when the merged options name a list
/// of channels, otherwise exactly one payload. An empty channel list yields no
/// payloads at all.
pub fn compose(input: MessageInput, defaults: &MessageOptions) -> Vec<Payload> {
    let merged = input.into_options().merged_over(defaults);
    let (payload, target) = normalize(merged);

    match target {
        None => vec![payload],
        Some(ChannelTarget::One(channel)) => vec![Payload {
            channel: Some(channel),
            ..payload
        }],
        Some(ChannelTarget::Many(channels)) => channels
            .into_iter()
            .map(|channel| Payload {
                channel: Some(channel),
                ..payload.clone()
            })
            .collect(),
    }
}

/// Applies the shape rules to merged options. The channel target is returned
/// separately so the caller can fan it out.
fn normalize(options: MessageOptions) -> (Payload, Option<ChannelTarget>) {
    let MessageOptions {
        channel,
        channels,
        username,
        mut icon_emoji,
        icon_url,
        text,
        mut attachments,
        unfurl_links,
        fields,
        extra,
    } = options;

    let target = channels.or(channel);

    if let Some(fields) = fields {
        attachments
            .get_or_insert_with(Vec::new)
            .push(fields_attachment(&fields));
    }

    // A URL icon is ignored by Slack whenever an emoji is also present.
    if icon_url.is_some() {
        icon_emoji = None;
    }

    let payload = Payload {
        channel: None,
        username,
        icon_emoji,
        icon_url,
        text: text.unwrap_or_default(),
        attachments,
        unfurl_links,
        extra,
    };
    (payload, target)
}

/// Renders a `title -> value` map as a single attachment, keeping map order.
pub fn fields_attachment(fields: &Map<String, Value>) -> Attachment {
    let fields = fields
        .iter()
        .map(|(title, value)| {
            let value = stringify_value(value);
            Field {
                title: title.clone(),
                short: is_short(&value),
                value,
            }
        })
        .collect();

    Attachment {
        fallback: FIELDS_FALLBACK.to_string(),
        fields,
        extra: Map::new(),
    }
}

/// Best-effort text form of a field value. Strings are used verbatim,
/// everything else uses its compact JSON text.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn is_short(value: &str) -> bool {
    value.chars().count() < SHORT_FIELD_LIMIT
}
