use reqwest::Url;

use crate::CatalogError;

/// Where the map list comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogSource {
    /// `GET /api/maps`, backed by a directory scan on the server.
    #[default]
    Api,
    /// `GET /maps.json`, a prebuilt index for static hosting.
    StaticIndex,
}

/// HTTP base plus the marker socket URL derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoints {
    http: Url,
    ws: Url,
}

impl ServerEndpoints {
    /// `http://host:port/anything` yields `ws://host:port/ws`; `https` yields `wss`.
    pub fn from_base(base: &str) -> Result<Self, CatalogError> {
        let mut http =
            Url::parse(base.trim()).map_err(|e| CatalogError::InvalidUrl(format!("{base}: {e}")))?;
        let ws_scheme = match http.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => {
                return Err(CatalogError::InvalidUrl(format!(
                    "{base}: unsupported scheme {other}"
                )));
            }
        };
        if http.cannot_be_a_base() || http.host_str().is_none() {
            return Err(CatalogError::InvalidUrl(format!("{base}: missing host")));
        }
        http.set_query(None);
        http.set_fragment(None);

        let mut ws = http.clone();
        ws.set_path("/ws");
        ws.set_scheme(ws_scheme)
            .map_err(|()| CatalogError::InvalidUrl(format!("{base}: cannot derive socket url")))?;
        http.set_path("/");
        Ok(Self { http, ws })
    }

    pub fn http_base(&self) -> &Url {
        &self.http
    }

    pub fn ws_url(&self) -> &Url {
        &self.ws
    }

    /// Joins path segments onto the base, escaping each one.
    pub fn http_url(&self, segments: &[&str]) -> Url {
        let mut url = self.http.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.clear();
            path.extend(segments);
        }
        url
    }

    pub fn map_list_url(&self, source: CatalogSource) -> Url {
        match source {
            CatalogSource::Api => self.http_url(&["api", "maps"]),
            CatalogSource::StaticIndex => self.http_url(&[formats::MAP_INDEX_FILE_NAME]),
        }
    }

    pub fn map_url(&self, id: &str) -> Url {
        self.http_url(&["maps", id])
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogSource, ServerEndpoints};
    use pretty_assertions::assert_eq;

    #[test]
    fn socket_url_follows_scheme_and_host() {
        let plain = ServerEndpoints::from_base("http://127.0.0.1:3000").expect("endpoints");
        assert_eq!(plain.ws_url().as_str(), "ws://127.0.0.1:3000/ws");

        let tls = ServerEndpoints::from_base("https://maps.example.org/viewer/?x=1").expect("endpoints");
        assert_eq!(tls.ws_url().as_str(), "wss://maps.example.org/ws");
        assert_eq!(tls.http_base().as_str(), "https://maps.example.org/");
    }

    #[test]
    fn rejects_non_http_bases() {
        assert!(ServerEndpoints::from_base("ftp://host/").is_err());
        assert!(ServerEndpoints::from_base("not a url").is_err());
    }

    #[test]
    fn map_urls_escape_ids() {
        let ep = ServerEndpoints::from_base("http://localhost:3000").expect("endpoints");
        assert_eq!(ep.map_url("map_2.json").as_str(), "http://localhost:3000/maps/map_2.json");
        assert_eq!(
            ep.map_url("a b/c.json").as_str(),
            "http://localhost:3000/maps/a%20b%2Fc.json"
        );
        assert_eq!(
            ep.map_list_url(CatalogSource::Api).as_str(),
            "http://localhost:3000/api/maps"
        );
        assert_eq!(
            ep.map_list_url(CatalogSource::StaticIndex).as_str(),
            "http://localhost:3000/maps.json"
        );
    }
}
