use url::Url;

use super::ParameterValidator;

pub const VIDEO_ID_LENGTH: usize = 11;
pub const VIDEO_ID_LAST_CHARACTERS: &str = "048AEIMQUYcgkosw";
pub const CHANNEL_ID_LAST_CHARACTERS: &str = "AQgw";
pub const PRIVACY_VALUES: &[&str] = &["PRIVATE", "PUBLIC", "UNLISTED"];
pub const PLAYLIST_BROWSE_PREFIX: &str = "VL";

pub fn existence() -> ParameterValidator {
    ParameterValidator::new("existence", true, |value| {
        if value.is_empty() {
            Err("parameter is required but was empty".to_string())
        } else {
            Ok(value.to_string())
        }
    })
}

pub fn video_id() -> ParameterValidator {
    ParameterValidator::new("video_id", false, |value| {
        if value.chars().count() != VIDEO_ID_LENGTH {
            return Err(format!(
                "a video id must be exactly {} characters long, got {}",
                VIDEO_ID_LENGTH,
                value.chars().count()
            ));
        }
        match value.chars().last() {
            Some(c) if VIDEO_ID_LAST_CHARACTERS.contains(c) => Ok(value.to_string()),
            _ => Err(format!(
                "the last character of a video id must be one of \"{}\"",
                VIDEO_ID_LAST_CHARACTERS
            )),
        }
    })
}

/// Accepts full channel ids (`UC` + 22 characters) and bare 22 character ids.
pub fn channel_id() -> ParameterValidator {
    ParameterValidator::new("channel_id", false, |value| {
        let length = value.chars().count();
        let well_formed = (length == 24 && value.starts_with("UC")) || length == 22;
        if !well_formed {
            return Err(format!(
                "a channel id must be 24 characters starting with \"UC\" or 22 characters, got {}",
                length
            ));
        }
        match value.chars().last() {
            Some(c) if CHANNEL_ID_LAST_CHARACTERS.contains(c) => Ok(value.to_string()),
            _ => Err(format!(
                "the last character of a channel id must be one of \"{}\"",
                CHANNEL_ID_LAST_CHARACTERS
            )),
        }
    })
}

pub fn url() -> ParameterValidator {
    ParameterValidator::new("url", false, |value| match Url::parse(value) {
        Ok(_) => Ok(value.to_string()),
        Err(e) => Err(format!("invalid URL: {}", e)),
    })
}

pub fn privacy() -> ParameterValidator {
    ParameterValidator::new("privacy", false, |value| {
        if PRIVACY_VALUES.contains(&value) {
            Ok(value.to_string())
        } else {
            Err(format!(
                "privacy must be one of {}, got \"{}\"",
                PRIVACY_VALUES.join(", "),
                value
            ))
        }
    })
}

/// Escapes backslashes and double quotes so the value can sit inside a
/// string literal of a hand-assembled body.
pub fn text_sanitizer() -> ParameterValidator {
    ParameterValidator::new("text_sanitizer", false, |value| Ok(escape_text(value)))
}

pub fn playlist_id_with_vl_prefix() -> ParameterValidator {
    ParameterValidator::new("playlist_id_with_vl_prefix", false, |value| {
        Ok(with_vl_prefix(value))
    })
}

pub fn playlist_id_without_vl_prefix() -> ParameterValidator {
    ParameterValidator::new("playlist_id_without_vl_prefix", false, |value| {
        Ok(without_vl_prefix(value).to_string())
    })
}

pub fn escape_text(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn with_vl_prefix(playlist_id: &str) -> String {
    if playlist_id.starts_with(PLAYLIST_BROWSE_PREFIX) {
        playlist_id.to_string()
    } else {
        format!("{}{}", PLAYLIST_BROWSE_PREFIX, playlist_id)
    }
}

pub fn without_vl_prefix(playlist_id: &str) -> &str {
    playlist_id
        .strip_prefix(PLAYLIST_BROWSE_PREFIX)
        .unwrap_or(playlist_id)
}
