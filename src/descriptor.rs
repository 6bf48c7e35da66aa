//! Hardware descriptor parsing
//!
//! The overlay scan reports one descriptor string per installed overlay,
//! e.g. `Framos FPA-4.A/4.B`, `Framos IMX900-P0-4Lane` or `Framos GMSL-P0`.
//! A descriptor is a tag word followed by a single body token. The body is
//! tested against three structured matchers in order; the first one that
//! accepts it wins. Anything else (auxiliary headers, other vendors) is not
//! camera topology and yields `None`.

use crate::types::AddOnBoardId;

/// A typed fact extracted from one descriptor string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    /// `<tag> FPA-<id>`
    AddOnBoard(AddOnBoardId),
    /// `<tag> <sensor>-<port>-<lanes>Lane`
    SensorLane {
        sensor: String,
        port: String,
        lanes: u32,
    },
    /// `<tag> GMSL-<PORT><digits>`
    LinkBooster { port: String },
}

impl Descriptor {
    /// Classify a raw descriptor.
    pub fn parse(raw: &str) -> Option<Self> {
        let body = split_tag(raw)?;
        match_add_on_board(body)
            .or_else(|| match_sensor_lane(body))
            .or_else(|| match_link_booster(body))
    }
}

/// Strip the leading tag word and return the body token.
fn split_tag(raw: &str) -> Option<&str> {
    let (tag, body) = raw.trim().split_once(' ')?;
    if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    if body.is_empty() || body.chars().any(char::is_whitespace) {
        return None;
    }
    Some(body)
}

fn match_add_on_board(body: &str) -> Option<Descriptor> {
    let (prefix, id) = body.split_once('-')?;
    if !is_letters_from(prefix, "FPA") {
        return None;
    }
    let id_ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '/' || c == '.');
    id_ok.then(|| Descriptor::AddOnBoard(AddOnBoardId::new(id)))
}

fn match_sensor_lane(body: &str) -> Option<Descriptor> {
    let fields = body.strip_suffix("Lane")?;
    let mut parts = fields.split('-');
    let (sensor, port, lanes) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let sensor_ok = !sensor.is_empty()
        && sensor
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    let port_ok = !port.is_empty() && port.chars().all(|c| c.is_ascii_alphanumeric());
    let lanes_ok = !lanes.is_empty() && lanes.chars().all(|c| ('1'..='9').contains(&c));
    if !(sensor_ok && port_ok && lanes_ok) {
        return None;
    }

    Some(Descriptor::SensorLane {
        sensor: sensor.to_string(),
        port: port.to_string(),
        lanes: lanes.parse().ok()?,
    })
}

fn match_link_booster(body: &str) -> Option<Descriptor> {
    let (prefix, rest) = body.split_once('-')?;
    if !is_letters_from(prefix, "GMSL") {
        return None;
    }

    let letters = rest
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(rest.len());
    let digits = rest[letters..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(rest.len(), |end| letters + end);
    if letters == 0 || digits == letters {
        return None;
    }

    Some(Descriptor::LinkBooster {
        port: rest[..digits].to_string(),
    })
}

/// Non-empty and made only of characters from `allowed`.
fn is_letters_from(token: &str, allowed: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| allowed.contains(c))
}
