use super::*;

/// REST Countries (restcountries.com v3.1) provider
pub struct RestCountriesProvider {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl RestCountriesProvider {
    pub fn new(url: String, timeout: Duration) -> CountryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CountryLookupError::Request(e.to_string()))?;

        Ok(Self {
            url,
            timeout,
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawName {
    common: String,
}

#[derive(Debug, Deserialize)]
struct RawIdd {
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    suffixes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawCountry {
    name: RawName,
    #[serde(default)]
    idd: Option<RawIdd>,
    #[serde(default)]
    cca2: String,
    #[serde(default)]
    flag: String,
}

/// Keep entries that have a dial root, join root and first suffix, sort by name
fn into_countries(raw: Vec<RawCountry>) -> Vec<Country> {
    let mut countries: Vec<Country> = raw
        .into_iter()
        .filter_map(|c| {
            let idd = c.idd?;
            let root = idd.root.filter(|r| !r.is_empty())?;
            let suffix = idd.suffixes.first().map(String::as_str).unwrap_or("");
            Some(Country {
                name: c.name.common,
                dial_code: format!("{}{}", root, suffix),
                code: c.cca2,
                flag: c.flag,
            })
        })
        .collect();

    countries.sort_by_key(|c| c.name.to_lowercase());
    countries
}

#[async_trait]
impl DialCodeProvider for RestCountriesProvider {
    async fn fetch_countries(&self) -> CountryResult<Vec<Country>> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                CountryLookupError::Timeout(self.timeout)
            } else {
                CountryLookupError::Request(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(CountryLookupError::Status(response.status().as_u16()));
        }

        let raw: Vec<RawCountry> = response
            .json()
            .await
            .map_err(|e| CountryLookupError::Parse(e.to_string()))?;

        Ok(into_countries(raw))
    }

    fn name(&self) -> &str {
        "restcountries"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rest_payload() {
        let payload = r#"[
            {"name": {"common": "Norway"}, "idd": {"root": "+4", "suffixes": ["7"]}, "cca2": "NO", "flag": "🇳🇴"},
            {"name": {"common": "Antarctica"}, "idd": {}, "cca2": "AQ", "flag": "🇦🇶"},
            {"name": {"common": "Heard Island"}, "cca2": "HM", "flag": "🇭🇲"},
            {"name": {"common": "United States"}, "idd": {"root": "+1", "suffixes": ["201", "202"]}, "cca2": "US", "flag": "🇺🇸"},
            {"name": {"common": "Kosovo"}, "idd": {"root": "+3", "suffixes": []}, "cca2": "XK", "flag": "🇽🇰"}
        ]"#;

        let raw: Vec<RawCountry> = serde_json::from_str(payload).unwrap();
        let countries = into_countries(raw);

        let names: Vec<_> = countries.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Kosovo", "Norway", "United States"]);
        assert_eq!(countries[0].dial_code, "+3");
        assert_eq!(countries[1].dial_code, "+47");
        assert_eq!(countries[2].dial_code, "+1201");
        assert_eq!(countries[2].code, "US");
    }

    #[test]
    fn test_provider_builds() {
        let provider =
            RestCountriesProvider::new("http://localhost:1/all".to_string(), Duration::from_secs(1))
                .unwrap();
        assert_eq!(provider.name(), "restcountries");
    }
}
