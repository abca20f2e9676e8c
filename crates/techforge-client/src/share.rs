use reqwest::Url;
use thiserror::Error;

const GRID_PARAM: &str = "grid";
const PLATFORM_PARAM: &str = "platform";

#[derive(Error, Debug)]
#[error("Not a valid base URL: {0}")]
pub struct ShareError(pub String);

/// Grid and platform carried by a share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedGrid {
    pub grid: String,
    pub platform: Option<String>,
}

/// `base` with `grid=<serialized>&platform=<ship>` set. Other query
/// parameters are kept.
pub fn share_url(base: &str, serialized: &str, ship_type: &str) -> Result<String, ShareError> {
    let mut url = Url::parse(base).map_err(|e| ShareError(format!("{base}: {e}")))?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != GRID_PARAM && k != PLATFORM_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(GRID_PARAM, serialized)
        .append_pair(PLATFORM_PARAM, ship_type);

    Ok(url.to_string())
}

/// `None` when `url` doesn't parse or has no `grid` parameter.
pub fn parse_share_url(url: &str) -> Option<SharedGrid> {
    let url = Url::parse(url).ok()?;
    let mut grid = None;
    let mut platform = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            GRID_PARAM => grid = Some(value.into_owned()),
            PLATFORM_PARAM => platform = Some(value.into_owned()),
            _ => {}
        }
    }
    Some(SharedGrid {
        grid: grid?,
        platform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const GRID: &str = "32|TF5|T3FT2|A3B.8BC|shield:A,hyper:B|Cb:A,Ca:B,HD:C";

    #[test]
    fn test_share_url_round_trip() {
        let url = share_url("https://nms-optimizer.app/", GRID, "freighter").unwrap();
        assert!(url.starts_with("https://nms-optimizer.app/?grid="));
        assert!(!url.contains('|'));

        let shared = parse_share_url(&url).unwrap();
        assert_eq!(shared.grid, GRID);
        assert_eq!(shared.platform.as_deref(), Some("freighter"));
    }

    #[test]
    fn test_share_url_replaces_existing_values() {
        let base = "https://x.test/?grid=old&lang=de&platform=standard";
        let url = share_url(base, GRID, "corvette").unwrap();
        let shared = parse_share_url(&url).unwrap();
        assert_eq!(shared.grid, GRID);
        assert_eq!(shared.platform.as_deref(), Some("corvette"));
        assert!(url.contains("lang=de"));
        assert!(!url.contains("old"));
    }

    #[rstest]
    #[case("https://x.test/?platform=standard")]
    #[case("https://x.test/")]
    #[case("not a url")]
    #[case("")]
    fn test_not_a_shared_grid(#[case] url: &str) {
        assert!(parse_share_url(url).is_none());
    }

    #[test]
    fn test_share_url_needs_absolute_base() {
        assert!(share_url("relative/path", GRID, "standard").is_err());
    }
}
