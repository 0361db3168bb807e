use super::{WeatherError, WeatherRequest, WeatherSource};
use crate::core::config::WeatherConfig;
use crate::data::fetch::HTTP_CLIENT;
use crate::{MapError, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MISSING: &str = "N/A";

/// One station observation. The service sends numbers as strings or numbers
/// depending on the field, so values are kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub obsid: Option<Value>,
    pub obsname: Option<Value>,
    pub tm: Option<Value>,
    /// Temperature at 2m, °C
    pub tm2m: Option<Value>,
    /// Relative humidity at 2m, %
    pub hm2m: Option<Value>,
    /// Wind direction at 2m as text (e.g. "NW")
    pub wd2mstr: Option<Value>,
    /// Wind direction at 2m, degrees
    pub wd2m: Option<Value>,
    /// Wind speed at 2m, m/s
    pub ws2m: Option<Value>,
    /// Precipitation, mm
    pub cprn: Option<Value>,
}

fn value_text(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl WeatherObservation {
    /// Observation station name, or `fallback` when the service omits it
    pub fn station_name(&self, fallback: &str) -> String {
        value_text(&self.obsname).unwrap_or_else(|| fallback.to_string())
    }

    pub fn station_id(&self) -> String {
        value_text(&self.obsid).unwrap_or_else(|| MISSING.to_string())
    }

    pub fn observed_at(&self) -> String {
        value_text(&self.tm).unwrap_or_else(|| MISSING.to_string())
    }

    pub fn temperature(&self) -> String {
        value_text(&self.tm2m).unwrap_or_else(|| MISSING.to_string())
    }

    pub fn humidity(&self) -> String {
        value_text(&self.hm2m).unwrap_or_else(|| MISSING.to_string())
    }

    pub fn wind_direction(&self) -> String {
        value_text(&self.wd2mstr).unwrap_or_else(|| MISSING.to_string())
    }

    pub fn wind_degrees(&self) -> String {
        value_text(&self.wd2m).unwrap_or_else(|| MISSING.to_string())
    }

    pub fn wind_speed(&self) -> String {
        value_text(&self.ws2m).unwrap_or_else(|| MISSING.to_string())
    }

    /// No reading means no rain
    pub fn precipitation(&self) -> String {
        value_text(&self.cprn).unwrap_or_else(|| "0".to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<WeatherObservation>),
    One(WeatherObservation),
}

impl OneOrMany {
    fn first(self) -> Option<WeatherObservation> {
        match self {
            OneOrMany::One(item) => Some(item),
            OneOrMany::Many(items) => items.into_iter().next(),
        }
    }
}

fn first_text<'a>(header: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| header.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

fn code_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Interprets a response of the observation service.
///
/// A successful envelope (`resultCode == "00"`) yields its first item, or
/// `None` when it carries no items.
pub fn parse_weather_response(
    status: u16,
    body: &str,
) -> std::result::Result<Option<WeatherObservation>, WeatherError> {
    if !(200..300).contains(&status) {
        let header = serde_json::from_str::<Value>(body).ok().and_then(|json| {
            json.pointer("/response/header")
                .or_else(|| json.pointer("/OpenAPI_ServiceResponse/cmmMsgHeader"))
                .cloned()
        });
        let structured = header.as_ref().and_then(|header| {
            let message = first_text(header, &["returnAuthMsg", "errMsg", "resultMsg"])?;
            let code = first_text(header, &["returnReasonCode", "returnCode"])
                .map(str::to_string)
                .or_else(|| code_text(header.get("resultCode")))
                .unwrap_or_else(|| MISSING.to_string());
            Some(WeatherError::Api {
                code,
                message: message.to_string(),
            })
        });
        return Err(structured.unwrap_or_else(|| WeatherError::Http {
            status,
            body: body.to_string(),
        }));
    }

    let json: Value =
        serde_json::from_str(body).map_err(|e| WeatherError::Decode(e.to_string()))?;

    let code = code_text(json.pointer("/response/header/resultCode"));
    if code.as_deref() != Some("00") {
        let message = json
            .pointer("/response/header/resultMsg")
            .and_then(Value::as_str)
            .unwrap_or("unknown API response error")
            .to_string();
        log::warn!("weather API answered {:?}: {}", code, message);
        return Err(WeatherError::Api {
            code: code.unwrap_or_else(|| MISSING.to_string()),
            message,
        });
    }

    // An empty result set comes back as `"items": ""`
    let Some(items) = json
        .pointer("/response/body/items/item")
        .filter(|v| !v.is_null())
    else {
        log::warn!("weather API returned no items");
        return Ok(None);
    };

    let items: OneOrMany =
        serde_json::from_value(items.clone()).map_err(|e| WeatherError::Decode(e.to_string()))?;
    Ok(items.first())
}

/// HTTP client for the mountain weather observation service
#[derive(Debug, Clone)]
pub struct WeatherClient {
    endpoint: Url,
    service_key: String,
    page_no: u32,
    num_of_rows: u32,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            MapError::Config(format!("invalid weather endpoint {}: {e}", config.endpoint))
        })?;
        Ok(Self {
            endpoint,
            service_key: config.service_key.clone(),
            page_no: config.page_no,
            num_of_rows: config.num_of_rows,
        })
    }

    /// Full request URL. The service key goes in untouched, it is issued
    /// percent-encoded and encoding it again breaks authentication.
    pub fn request_url(&self, request: &WeatherRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(Some(&format!("serviceKey={}", self.service_key)));
        url.query_pairs_mut()
            .append_pair("pageNo", &self.page_no.to_string())
            .append_pair("numOfRows", &self.num_of_rows.to_string())
            .append_pair("_type", "json")
            .append_pair("obsid", &request.obsid)
            .append_pair("tm", &request.tm);
        url
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn fetch(
        &self,
        request: &WeatherRequest,
    ) -> std::result::Result<Option<WeatherObservation>, WeatherError> {
        let url = self.request_url(request);
        log::debug!("fetching weather for station {} at {}", request.obsid, request.tm);

        let response = HTTP_CLIENT
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        parse_weather_response(status, &body)
    }
}
