//! Built-in source registry

use crate::{FreeProxyListSource, GeonodeSource, ProxyScrapeSource, ProxySource, TextListSource};

/// Built-in sources in harvest priority order
pub fn default_sources() -> Vec<Box<dyn ProxySource>> {
    vec![
        Box::new(TextListSource::new(
            "thespeedx",
            vec!["https://raw.githubusercontent.com/TheSpeedX/SOCKS-List/master/http.txt".into()],
        )),
        Box::new(ProxyScrapeSource::new()),
        Box::new(GeonodeSource::new()),
        Box::new(FreeProxyListSource::new()),
        Box::new(TextListSource::new(
            "proxy-list-download",
            vec![
                "https://www.proxy-list.download/api/v1/get?type=http".into(),
                "https://www.proxy-list.download/api/v1/get?type=https".into(),
            ],
        )),
        Box::new(TextListSource::new(
            "sunny9577",
            vec!["https://raw.githubusercontent.com/sunny9577/proxy-scraper/master/proxies.txt"
                .into()],
        )),
        Box::new(TextListSource::new(
            "clarketm",
            vec!["https://raw.githubusercontent.com/clarketm/proxy-list/master/proxy-list-raw.txt"
                .into()],
        )),
    ]
}
