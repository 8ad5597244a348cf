//! Image URL construction and identifier derivation.

use crate::config::DEFAULT_URL_TEMPLATE;
use crate::error::ConfigError;

/// Placeholder replaced by the image identifier in a URL template.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Length of the file extension (`.jpg`) stripped from a URL's last segment.
const EXTENSION_LEN: usize = 4;

/// Validated URL template such as `https://i.imgur.com/{id}.jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    /// Checks that the template contains `{id}` and renders to a parseable URL.
    pub fn new(template: &str) -> Result<Self, ConfigError> {
        if !template.contains(ID_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder(template.to_string()));
        }
        url::Url::parse(&template.replace(ID_PLACEHOLDER, "id")).map_err(|source| {
            ConfigError::InvalidTemplate {
                template: template.to_string(),
                source,
            }
        })?;
        Ok(Self(template.to_string()))
    }

    /// URL for one image identifier.
    pub fn render(&self, id: &str) -> String {
        self.0.replace(ID_PLACEHOLDER, id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UrlTemplate {
    fn default() -> Self {
        Self(DEFAULT_URL_TEMPLATE.to_string())
    }
}

/// Derives the image identifier from an annotation's source URL: the last
/// `/`-separated segment with its 4-character extension removed.
///
/// Segments shorter than the extension yield an empty identifier.
///
/// # Examples
///
/// - `identifier_from_url("https://i.imgur.com/a1.jpg")` → `"a1"`
pub fn identifier_from_url(url: &str) -> &str {
    let segment = url.rsplit('/').next().unwrap_or(url);
    let cut = segment
        .char_indices()
        .rev()
        .nth(EXTENSION_LEN - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &segment[..cut]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_identifier() {
        let t = UrlTemplate::default();
        assert_eq!(t.render("a1"), "https://i.imgur.com/a1.jpg");
        let t = UrlTemplate::new("http://127.0.0.1:8080/img/{id}.jpg").unwrap();
        assert_eq!(t.render("XyZ"), "http://127.0.0.1:8080/img/XyZ.jpg");
    }

    #[test]
    fn template_without_placeholder_rejected() {
        assert!(matches!(
            UrlTemplate::new("https://i.imgur.com/x.jpg"),
            Err(ConfigError::MissingPlaceholder(_))
        ));
    }

    #[test]
    fn template_that_is_not_a_url_rejected() {
        assert!(matches!(
            UrlTemplate::new("not a url {id}"),
            Err(ConfigError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn identifier_from_normal_url() {
        assert_eq!(identifier_from_url("https://i.imgur.com/a1.jpg"), "a1");
        assert_eq!(identifier_from_url("https://i.imgur.com/x/y/Ab3dE.png"), "Ab3dE");
    }

    #[test]
    fn identifier_from_short_or_bare_segment() {
        assert_eq!(identifier_from_url("https://i.imgur.com/.jpg"), "");
        assert_eq!(identifier_from_url("abc"), "");
        assert_eq!(identifier_from_url("abcde.jpg"), "abcde");
    }

    #[test]
    fn identifier_roundtrips_through_template() {
        let t = UrlTemplate::default();
        assert_eq!(identifier_from_url(&t.render("Qw9zR1t")), "Qw9zR1t");
    }
}
