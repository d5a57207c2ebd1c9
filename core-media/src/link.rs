//! Link classification
//!
//! Maps a raw public URL to `{provider, kind}` by host and path shape alone.
//! No network call is made; a link that looks right but points nowhere is
//! only discovered during traversal.

use tracing::warn;
use url::Url;

use crate::error::LinkError;
use crate::types::{LinkKind, NormalizedLink, Provider};

const YANDEX_DISK_HOSTS: &[&str] = &["disk.yandex.ru", "disk.yandex.com", "yadi.sk"];
const YANDEX_360_HOSTS: &[&str] = &["disk.360.yandex.ru"];
const MAILRU_HOSTS: &[&str] = &["cloud.mail.ru"];

/// Outcome of validating a batch of raw links
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkValidation {
    /// Links that classified, in input order
    pub valid: Vec<NormalizedLink>,
    /// Rejected inputs with the reason, in input order
    pub rejected: Vec<(String, LinkError)>,
}

impl LinkValidation {
    pub fn valid_urls(&self) -> Vec<&str> {
        self.valid.iter().map(|link| link.url.as_str()).collect()
    }
}

/// Classify a single raw URL.
///
/// # Errors
///
/// - [`LinkError::UnsupportedProvider`] when the host is not a known provider
///   (or the string is not a URL at all)
/// - [`LinkError::AmbiguousKind`] when the provider is known but the path does
///   not say whether the link is a file or a folder
pub fn classify_link(raw: &str) -> Result<NormalizedLink, LinkError> {
    let url = raw.trim();
    let unsupported = || LinkError::UnsupportedProvider {
        url: url.to_string(),
    };

    let parsed = Url::parse(url).map_err(|_| unsupported())?;
    let host = parsed.host_str().ok_or_else(unsupported)?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let provider = if YANDEX_360_HOSTS.contains(&host) {
        Provider::Yandex360
    } else if YANDEX_DISK_HOSTS.contains(&host) {
        Provider::YandexDisk
    } else if MAILRU_HOSTS.contains(&host) {
        Provider::MailRu
    } else {
        return Err(unsupported());
    };

    let kind = match provider {
        Provider::YandexDisk | Provider::Yandex360 => yandex_kind(parsed.path()),
        Provider::MailRu => mailru_weblink(url).map(|_| LinkKind::Folder),
    }
    .ok_or_else(|| LinkError::AmbiguousKind {
        provider,
        url: url.to_string(),
    })?;

    Ok(NormalizedLink {
        url: url.to_string(),
        provider,
        kind,
    })
}

/// Classify every input independently.
///
/// A rejected URL is logged and reported, never blocking the others.
pub fn validate_links<I, S>(urls: I) -> LinkValidation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut validation = LinkValidation::default();

    for raw in urls {
        let raw = raw.as_ref();
        if raw.trim().is_empty() {
            continue;
        }

        match classify_link(raw) {
            Ok(link) => validation.valid.push(link),
            Err(error) => {
                warn!(url = raw.trim(), error = %error, "Skipping link");
                validation.rejected.push((raw.trim().to_string(), error));
            }
        }
    }

    validation
}

/// `/i/<id>` is a shared file, `/d/<id>` a shared folder
fn yandex_kind(path: &str) -> Option<LinkKind> {
    let has_id = |prefix: &str| {
        path.strip_prefix(prefix)
            .map(|rest| !rest.trim_matches('/').is_empty())
            .unwrap_or(false)
    };

    if has_id("/i/") {
        Some(LinkKind::File)
    } else if has_id("/d/") {
        Some(LinkKind::Folder)
    } else {
        None
    }
}

/// Extract the Mail.ru weblink from `/public/<weblink>` or a `weblink` query.
///
/// The weblink is returned percent-decoded, without surrounding slashes.
pub fn mailru_weblink(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;

    if let Some(rest) = parsed.path().strip_prefix("/public/") {
        let rest = rest.trim_matches('/');
        if !rest.is_empty() {
            let decoded = urlencoding::decode(rest)
                .map(|value| value.into_owned())
                .unwrap_or_else(|_| rest.to_string());
            return Some(decoded);
        }
    }

    parsed
        .query_pairs()
        .find(|(key, _)| key == "weblink")
        .map(|(_, value)| value.trim_matches('/').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yandex_folder_and_file() {
        let folder = classify_link("https://disk.yandex.ru/d/xNv4Njt4wmH7xQ").unwrap();
        assert_eq!(folder.provider, Provider::YandexDisk);
        assert_eq!(folder.kind, LinkKind::Folder);

        let file = classify_link("https://yadi.sk/i/abcdef").unwrap();
        assert_eq!(file.provider, Provider::YandexDisk);
        assert_eq!(file.kind, LinkKind::File);
    }

    #[test]
    fn test_yandex_360() {
        let link = classify_link("  https://disk.360.yandex.ru/d/xNv4Njt4wmH7xQ\n").unwrap();
        assert_eq!(link.provider, Provider::Yandex360);
        assert_eq!(link.kind, LinkKind::Folder);
        assert_eq!(link.url, "https://disk.360.yandex.ru/d/xNv4Njt4wmH7xQ");
    }

    #[test]
    fn test_yandex_without_kind_is_ambiguous() {
        let err = classify_link("https://disk.yandex.ru/client/disk").unwrap_err();
        assert!(matches!(
            err,
            LinkError::AmbiguousKind {
                provider: Provider::YandexDisk,
                ..
            }
        ));

        assert!(classify_link("https://disk.yandex.ru/d/").is_err());
    }

    #[test]
    fn test_mailru_public_link() {
        let link = classify_link("https://cloud.mail.ru/public/P1ZJ/WGntm7zig").unwrap();
        assert_eq!(link.provider, Provider::MailRu);
        assert_eq!(link.kind, LinkKind::Folder);
        assert_eq!(
            mailru_weblink(&link.url).as_deref(),
            Some("P1ZJ/WGntm7zig")
        );
    }

    #[test]
    fn test_mailru_weblink_query_and_decoding() {
        assert_eq!(
            mailru_weblink("https://cloud.mail.ru/folder?weblink=abc/def").as_deref(),
            Some("abc/def")
        );
        assert_eq!(
            mailru_weblink("https://cloud.mail.ru/public/abc/My%20Photos/").as_deref(),
            Some("abc/My Photos")
        );
        assert_eq!(mailru_weblink("https://cloud.mail.ru/home"), None);
    }

    #[test]
    fn test_mailru_without_weblink_is_ambiguous() {
        let err = classify_link("https://cloud.mail.ru/home").unwrap_err();
        assert!(matches!(err, LinkError::AmbiguousKind { .. }));
    }

    #[test]
    fn test_unsupported_provider() {
        for url in [
            "https://drive.google.com/drive/folders/abc",
            "not a url",
            "mailto:someone@example.com",
        ] {
            assert!(matches!(
                classify_link(url),
                Err(LinkError::UnsupportedProvider { .. })
            ));
        }
    }

    #[test]
    fn test_validate_collects_rejections_without_blocking() {
        let validation = validate_links([
            "https://disk.yandex.ru/d/one",
            "https://example.com/two",
            "",
            "https://cloud.mail.ru/public/three/x",
        ]);

        assert_eq!(
            validation.valid_urls(),
            vec![
                "https://disk.yandex.ru/d/one",
                "https://cloud.mail.ru/public/three/x"
            ]
        );
        assert_eq!(validation.rejected.len(), 1);
        assert_eq!(validation.rejected[0].0, "https://example.com/two");
    }
}
