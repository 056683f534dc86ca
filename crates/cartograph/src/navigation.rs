use crate::error::Result;
use cartograph_core::{ActivityId, NavigationConfig};
use url::Url;

/// A full page navigation to an activity's detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub activity_id: ActivityId,
    pub url: Url,
}

/// Builds `<base_url>?<query_param>=<activity_id>`, keeping any other query pairs of the base URL
/// and replacing a previous value of the same parameter.
pub fn activity_url(config: &NavigationConfig, activity: ActivityId) -> Result<Url> {
    let mut url = Url::parse(&config.base_url)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != config.query_param.as_str())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(&config.query_param, &activity.to_string());
    }
    Ok(url)
}
